use crate::analytics::calendar::parse_day;
use crate::analytics::nutrition::{
    daily_totals, goal_comparison, group_by_meal, suggestions_from_history, FoodSuggestion,
    GoalComparison, MacroTotals, MealGroup,
};
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    CreateDietEntryPayload, DayQuery, DietEntry, NewDietEntry, NutritionGoal, SuggestQuery,
};
use crate::schema::diet_entries::{self, dsl::*};
use crate::schema::nutrition_goals;
use actix_web::{delete, get, post, web, HttpResponse};
use chrono::NaiveDate;
use diesel::expression_methods::PgTextExpressionMethods;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

const SUGGESTION_LIMIT: usize = 10;
// Rows scanned for suggestions before de-duplication.
const SUGGESTION_SCAN: i64 = 100;

#[derive(Serialize, Debug)]
pub struct DietDaySummary {
    pub date: NaiveDate,
    pub meals: Vec<MealGroup>,
    pub totals: MacroTotals,
    pub goal: Option<NutritionGoal>,
    pub goal_comparison: Option<GoalComparison>,
}

pub(crate) async fn load_diet_for_day(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
    day: NaiveDate,
) -> Result<Vec<DietEntry>, ServiceError> {
    diet_entries
        .filter(user_id.eq(user_uuid))
        .filter(date.eq(day))
        .order(created_at.asc())
        .select(DietEntry::as_select())
        .load::<DietEntry>(conn)
        .await
        .map_err(ServiceError::from)
}

pub(crate) async fn load_goal(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
) -> Result<Option<NutritionGoal>, ServiceError> {
    nutrition_goals::table
        .filter(nutrition_goals::user_id.eq(user_uuid))
        .select(NutritionGoal::as_select())
        .first::<NutritionGoal>(conn)
        .await
        .optional()
        .map_err(ServiceError::from)
}

pub(crate) async fn build_diet_summary(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
    day: NaiveDate,
) -> Result<DietDaySummary, ServiceError> {
    let entries = load_diet_for_day(conn, user_uuid, day).await?;
    let goal = load_goal(conn, user_uuid).await?;

    let totals = daily_totals(&entries);
    let comparison = goal.as_ref().map(|g| goal_comparison(&totals, g));
    log::debug!(
        "Diet summary for user {} on {}: {} entries, {} kcal",
        user_uuid,
        day,
        entries.len(),
        totals.kcal
    );

    Ok(DietDaySummary {
        date: day,
        meals: group_by_meal(&entries),
        totals,
        goal,
        goal_comparison: comparison,
    })
}

// Escapes LIKE wildcards typed by the user.
fn like_prefix(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("{}%", escaped)
}

// === POST /diet ===
#[post("")]
pub async fn create_diet_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateDietEntryPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_entry = NewDietEntry::build(authenticated_user.id, &payload)?;

    let mut conn = pool.get().await?;

    let entry = diesel::insert_into(diet_entries::table)
        .values(&new_entry)
        .get_result::<DietEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} logged {} ({} kcal) for {} on {}",
        authenticated_user.id,
        entry.food_name,
        entry.kcal,
        entry.meal,
        entry.date
    );
    Ok(HttpResponse::Created().json(entry))
}

// === GET /diet?date= ===
#[get("")]
pub async fn list_diet_entries_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<DayQuery>,
) -> Result<HttpResponse, ServiceError> {
    let day = parse_day(&query.date)?;

    let mut conn = pool.get().await?;
    let entries = load_diet_for_day(&mut conn, authenticated_user.id, day).await?;

    Ok(HttpResponse::Ok().json(entries))
}

// === GET /diet/summary/{day} ===
#[get("/summary/{day}")]
pub async fn diet_summary_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    day: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let day = parse_day(&day)?;

    let mut conn = pool.get().await?;
    let summary = build_diet_summary(&mut conn, authenticated_user.id, day).await?;

    Ok(HttpResponse::Ok().json(summary))
}

// === GET /diet/suggest?q= ===
#[get("/suggest")]
pub async fn suggest_food_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<SuggestQuery>,
) -> Result<HttpResponse, ServiceError> {
    let prefix = query.q.as_deref().map(str::trim).unwrap_or_default();
    if prefix.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<FoodSuggestion>::new()));
    }

    let mut conn = pool.get().await?;

    let history = diet_entries
        .filter(user_id.eq(authenticated_user.id))
        .filter(food_name.ilike(like_prefix(prefix)))
        .order(created_at.desc())
        .limit(SUGGESTION_SCAN)
        .select(DietEntry::as_select())
        .load::<DietEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(suggestions_from_history(&history, SUGGESTION_LIMIT)))
}

// === DELETE /diet/{entry_id} ===
#[delete("/{entry_id}")]
pub async fn delete_diet_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entry_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let entry_to_delete_id = entry_id.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        diet_entries
            .filter(user_id.eq(authenticated_user.id))
            .filter(id.eq(entry_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("DietEntry with id {} deleted successfully", entry_to_delete_id)
        })))
    } else {
        Err(ServiceError::not_owned("DietEntry", entry_to_delete_id))
    }
}

#[cfg(test)]
mod tests {
    use super::like_prefix;

    #[test]
    fn like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("egg"), "egg%");
        assert_eq!(like_prefix("100%_juice"), "100\\%\\_juice%");
    }
}

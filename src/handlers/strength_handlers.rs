use crate::analytics::calendar::parse_day;
use crate::analytics::exercise_catalog::ExerciseCatalog;
use crate::analytics::strength::{
    best_set_per_exercise, day_total_load, group_by_part_and_exercise, last_known_max,
    previous_session_comparison, strength_dates, BodyPartGroup, LastMax, SessionComparison,
};
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    CreateStrengthSetPayload, DayQuery, NewStrengthSet, StrengthSet, StrengthSetCreatedResponse,
};
use crate::schema::strength_sets::{self, dsl::*};
use actix_web::{delete, get, post, web, HttpResponse};
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Serialize, Debug)]
pub struct StrengthDaySummary {
    pub date: NaiveDate,
    pub total_load: f64,
    pub by_body_part: Vec<BodyPartGroup>,
    pub best_sets: BTreeMap<String, StrengthSet>,
    pub previous_session: Option<SessionComparison>,
    /// Only for exercises trained on `date`.
    pub last_known_max: BTreeMap<String, LastMax>,
}

pub(crate) async fn load_sets_for_day(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
    day: NaiveDate,
) -> Result<Vec<StrengthSet>, ServiceError> {
    strength_sets
        .filter(user_id.eq(user_uuid))
        .filter(date.eq(day))
        .order(created_at.asc())
        .select(StrengthSet::as_select())
        .load::<StrengthSet>(conn)
        .await
        .map_err(ServiceError::from)
}

/// Days between `start` and `end` (inclusive) with at least one set.
pub(crate) async fn load_strength_dates(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeSet<NaiveDate>, ServiceError> {
    let sets = strength_sets
        .filter(user_id.eq(user_uuid))
        .filter(date.between(start, end))
        .select(StrengthSet::as_select())
        .load::<StrengthSet>(conn)
        .await
        .map_err(ServiceError::from)?;
    Ok(strength_dates(&sets))
}

pub(crate) async fn build_strength_summary(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
    day: NaiveDate,
) -> Result<StrengthDaySummary, ServiceError> {
    let todays_sets = load_sets_for_day(conn, user_uuid, day).await?;

    let previous_date = strength_sets
        .filter(user_id.eq(user_uuid))
        .filter(date.lt(day))
        .select(diesel::dsl::max(date))
        .get_result::<Option<NaiveDate>>(conn)
        .await
        .map_err(ServiceError::from)?;

    let todays_exercises: BTreeSet<String> = todays_sets
        .iter()
        .map(|set| set.exercise_name.clone())
        .collect();

    // History needed by the comparisons: the previous session, plus every
    // earlier set of today's exercises.
    let mut all_sets = match previous_date {
        Some(previous) => {
            let names: Vec<String> = todays_exercises.iter().cloned().collect();
            strength_sets
                .filter(user_id.eq(user_uuid))
                .filter(date.lt(day))
                .filter(exercise_name.eq_any(names).or(date.eq(previous)))
                .order(created_at.asc())
                .select(StrengthSet::as_select())
                .load::<StrengthSet>(conn)
                .await
                .map_err(ServiceError::from)?
        }
        None => Vec::new(),
    };
    log::debug!(
        "Strength history for user {} before {}: {} sets (previous session: {:?})",
        user_uuid,
        day,
        all_sets.len(),
        previous_date
    );
    all_sets.extend(todays_sets.iter().cloned());

    let mut last_max = last_known_max(&all_sets, day);
    last_max.retain(|name, _| todays_exercises.contains(name));

    Ok(StrengthDaySummary {
        date: day,
        total_load: day_total_load(&todays_sets),
        by_body_part: group_by_part_and_exercise(&todays_sets),
        best_sets: best_set_per_exercise(&todays_sets),
        previous_session: previous_session_comparison(&all_sets, day),
        last_known_max: last_max,
    })
}

// === POST /strength ===
#[post("")]
pub async fn create_strength_set_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateStrengthSetPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_set = NewStrengthSet::build(authenticated_user.id, &payload)?;
    let warning = ExerciseCatalog::check_membership(payload.body_part, &new_set.exercise_name)?;
    if let Some(message) = &warning {
        log::info!("User {}: {}", authenticated_user.id, message);
    }

    let mut conn = pool.get().await?;

    let set = diesel::insert_into(strength_sets::table)
        .values(&new_set)
        .get_result::<StrengthSet>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} logged {} {}kg x {} on {}",
        authenticated_user.id,
        set.exercise_name,
        set.weight_kg,
        set.reps,
        set.date
    );
    Ok(HttpResponse::Created().json(StrengthSetCreatedResponse { set, warning }))
}

// === GET /strength?date= ===
#[get("")]
pub async fn list_strength_sets_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<DayQuery>,
) -> Result<HttpResponse, ServiceError> {
    let day = parse_day(&query.date)?;

    let mut conn = pool.get().await?;
    let sets = load_sets_for_day(&mut conn, authenticated_user.id, day).await?;

    Ok(HttpResponse::Ok().json(sets))
}

// === GET /strength/summary/{day} ===
#[get("/summary/{day}")]
pub async fn strength_summary_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    day: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let day = parse_day(&day)?;

    let mut conn = pool.get().await?;
    let summary = build_strength_summary(&mut conn, authenticated_user.id, day).await?;

    Ok(HttpResponse::Ok().json(summary))
}

// === GET /strength/catalog ===
#[get("/catalog")]
pub async fn exercise_catalog_handler(
    _authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(ExerciseCatalog::sections()))
}

// === DELETE /strength/{set_id} ===
#[delete("/{set_id}")]
pub async fn delete_strength_set_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    set_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let set_to_delete_id = set_id.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        strength_sets
            .filter(user_id.eq(authenticated_user.id))
            .filter(id.eq(set_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("StrengthSet with id {} deleted successfully", set_to_delete_id)
        })))
    } else {
        Err(ServiceError::not_owned("StrengthSet", set_to_delete_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn catalog_requires_a_user() {
        let app = test::init_service(
            App::new().service(web::scope("/strength").service(exercise_catalog_handler)),
        )
        .await;
        let req = test::TestRequest::get().uri("/strength/catalog").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn catalog_lists_every_body_part() {
        let app = test::init_service(
            App::new().service(web::scope("/strength").service(exercise_catalog_handler)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/strength/catalog")
            .insert_header(("X-User-Id", Uuid::new_v4().to_string()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().map(Vec::len), Some(7));
        assert_eq!(body[0]["body_part"], "chest");
    }
}

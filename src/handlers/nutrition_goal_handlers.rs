use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::handlers::diet_handlers::load_goal;
use crate::models::{NewNutritionGoal, NutritionGoal, SetNutritionGoalPayload};
use crate::schema::nutrition_goals::{self, dsl::*};
use actix_web::{delete, get, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;

// === GET /nutrition-goal ===
#[get("")]
pub async fn get_nutrition_goal_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = pool.get().await?;

    let goal = load_goal(&mut conn, authenticated_user.id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("No nutrition goal set".to_string()))?;

    Ok(HttpResponse::Ok().json(goal))
}

// === PUT /nutrition-goal ===
// One goal per user: the first PUT creates it, later ones overwrite it.
#[put("")]
pub async fn set_nutrition_goal_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<SetNutritionGoalPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_goal = NewNutritionGoal::build(authenticated_user.id, &payload)?;

    let mut conn = pool.get().await?;

    let goal = diesel::insert_into(nutrition_goals::table)
        .values(&new_goal)
        .on_conflict(user_id)
        .do_update()
        .set(&new_goal.changeset(Utc::now().naive_utc()))
        .get_result::<NutritionGoal>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} set nutrition goal: {} kcal, {}g carb, {}g protein, {}g fat",
        authenticated_user.id,
        goal.kcal,
        goal.carb_g,
        goal.protein_g,
        goal.fat_g
    );
    Ok(HttpResponse::Ok().json(goal))
}

// === DELETE /nutrition-goal ===
#[delete("")]
pub async fn delete_nutrition_goal_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(nutrition_goals.filter(user_id.eq(authenticated_user.id)))
        .execute(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Nutrition goal cleared"
        })))
    } else {
        Err(ServiceError::NotFound("No nutrition goal set".to_string()))
    }
}

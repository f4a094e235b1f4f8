use crate::analytics::calendar::parse_range;
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    required_text, CreateScheduleItemPayload, DateRangeQuery, NewScheduleItem, ScheduleItem,
    UpdateScheduleItemChangeset, UpdateScheduleItemPayload,
};
use crate::schema::schedule_items::{self, dsl::*};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::json;
use uuid::Uuid;

/// Items of one user between two dates (inclusive), by day then start time.
pub(crate) async fn load_items_between(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ScheduleItem>, ServiceError> {
    schedule_items
        .filter(user_id.eq(user_uuid))
        .filter(date.between(start, end))
        .order((date.asc(), start_time.asc()))
        .select(ScheduleItem::as_select())
        .load::<ScheduleItem>(conn)
        .await
        .map_err(ServiceError::from)
}

// === POST /schedule-items ===
#[post("")]
pub async fn create_schedule_item_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateScheduleItemPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_item = NewScheduleItem::build(authenticated_user.id, &payload)?;

    let mut conn = pool.get().await?;

    let item = diesel::insert_into(schedule_items::table)
        .values(&new_item)
        .get_result::<ScheduleItem>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} created schedule item {} on {}",
        authenticated_user.id,
        item.id,
        item.date
    );
    Ok(HttpResponse::Created().json(item))
}

// === GET /schedule-items?from=&to= ===
#[get("")]
pub async fn list_schedule_items_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let (from, to) = parse_range(query.from.as_deref(), query.to.as_deref())?;

    let mut conn = pool.get().await?;

    let mut query_builder = schedule_items
        .filter(user_id.eq(user_uuid))
        .select(ScheduleItem::as_select())
        .into_boxed();
    if let Some(from_date) = from {
        query_builder = query_builder.filter(date.ge(from_date));
    }
    if let Some(to_date) = to {
        query_builder = query_builder.filter(date.le(to_date));
    }

    let items = query_builder
        .order((date.asc(), start_time.asc()))
        .load::<ScheduleItem>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(items))
}

// === GET /schedule-items/{item_id} ===
#[get("/{item_id}")]
pub async fn get_schedule_item_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let item_to_find_id = item_id.into_inner();

    let mut conn = pool.get().await?;

    let item = schedule_items
        .filter(user_id.eq(authenticated_user.id))
        .filter(id.eq(item_to_find_id))
        .select(ScheduleItem::as_select())
        .first::<ScheduleItem>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::not_owned("ScheduleItem", item_to_find_id))?;

    Ok(HttpResponse::Ok().json(item))
}

// === PUT /schedule-items/{item_id} ===
#[put("/{item_id}")]
pub async fn update_schedule_item_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    item_id: web::Path<Uuid>,
    payload: web::Json<UpdateScheduleItemPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let item_to_update_id = item_id.into_inner();
    log::info!(
        "User {} updating schedule item {} with payload: {:?}",
        user_uuid,
        item_to_update_id,
        payload.0
    );

    let mut conn = pool.get().await?;

    // The time invariant spans two columns, so check it against the stored row.
    let current = schedule_items
        .filter(user_id.eq(user_uuid))
        .filter(id.eq(item_to_update_id))
        .select(ScheduleItem::as_select())
        .first::<ScheduleItem>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::not_owned("ScheduleItem", item_to_update_id))?;

    let effective_start = payload.start_time.unwrap_or(current.start_time);
    let effective_end = payload.end_time.unwrap_or(current.end_time);
    if effective_end <= effective_start {
        return Err(ServiceError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    let item_changes = UpdateScheduleItemChangeset {
        title: payload
            .title
            .as_deref()
            .map(|t| required_text(t, "title"))
            .transpose()?,
        category: payload.category.map(|c| c.as_str().to_string()),
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        content: payload.content.as_deref().map(|c| c.trim().to_string()),
        updated_at: Some(Utc::now().naive_utc()),
    };

    let updated_item = diesel::update(
        schedule_items
            .filter(id.eq(item_to_update_id))
            .filter(user_id.eq(user_uuid)),
    )
    .set(&item_changes)
    .get_result::<ScheduleItem>(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(updated_item))
}

// === DELETE /schedule-items/{item_id} ===
#[delete("/{item_id}")]
pub async fn delete_schedule_item_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let item_to_delete_id = item_id.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        schedule_items
            .filter(user_id.eq(authenticated_user.id))
            .filter(id.eq(item_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("ScheduleItem with id {} deleted successfully", item_to_delete_id)
        })))
    } else {
        Err(ServiceError::not_owned("ScheduleItem", item_to_delete_id))
    }
}

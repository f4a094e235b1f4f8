use crate::analytics::calendar::parse_range;
use crate::analytics::countdown::countdowns;
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    optional_text, required_text, CreateImportantItemPayload, DateRangeQuery, ImportantItem,
    NewImportantItem, UpdateImportantItemChangeset, UpdateImportantItemPayload,
};
use crate::schema::important_items::{self, dsl::*};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::json;
use uuid::Uuid;

/// Items dated on or after `today`, soonest first.
pub(crate) async fn load_upcoming(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
    today: NaiveDate,
) -> Result<Vec<ImportantItem>, ServiceError> {
    important_items
        .filter(user_id.eq(user_uuid))
        .filter(date.ge(today))
        .order((date.asc(), title.asc()))
        .select(ImportantItem::as_select())
        .load::<ImportantItem>(conn)
        .await
        .map_err(ServiceError::from)
}

// === POST /important-items ===
#[post("")]
pub async fn create_important_item_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateImportantItemPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_item = NewImportantItem {
        user_id: authenticated_user.id,
        date: payload.date,
        title: required_text(&payload.title, "title")?,
        note: optional_text(payload.note.as_deref()),
    };

    let mut conn = pool.get().await?;

    let item = diesel::insert_into(important_items::table)
        .values(&new_item)
        .get_result::<ImportantItem>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} marked {} as important on {}",
        authenticated_user.id,
        item.title,
        item.date
    );
    Ok(HttpResponse::Created().json(item))
}

// === GET /important-items?from=&to= ===
#[get("")]
pub async fn list_important_items_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ServiceError> {
    let (from, to) = parse_range(query.from.as_deref(), query.to.as_deref())?;

    let mut conn = pool.get().await?;

    let mut query_builder = important_items
        .filter(user_id.eq(authenticated_user.id))
        .select(ImportantItem::as_select())
        .into_boxed();
    if let Some(from_date) = from {
        query_builder = query_builder.filter(date.ge(from_date));
    }
    if let Some(to_date) = to {
        query_builder = query_builder.filter(date.le(to_date));
    }

    let items = query_builder
        .order((date.asc(), title.asc()))
        .load::<ImportantItem>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(items))
}

// === GET /important-items/countdown ===
#[get("/countdown")]
pub async fn countdown_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let today = Utc::now().date_naive();

    let mut conn = pool.get().await?;
    let upcoming = load_upcoming(&mut conn, authenticated_user.id, today).await?;

    Ok(HttpResponse::Ok().json(countdowns(&upcoming, today)))
}

// === PUT /important-items/{item_id} ===
#[put("/{item_id}")]
pub async fn update_important_item_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    item_id: web::Path<Uuid>,
    payload: web::Json<UpdateImportantItemPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let item_to_update_id = item_id.into_inner();
    log::info!(
        "User {} updating important item {} with payload: {:?}",
        user_uuid,
        item_to_update_id,
        payload.0
    );

    let item_changes = UpdateImportantItemChangeset {
        date: payload.date,
        title: payload
            .title
            .as_deref()
            .map(|t| required_text(t, "title"))
            .transpose()?,
        note: payload
            .note
            .as_ref()
            .map(|value| optional_text(value.as_deref())),
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_item = diesel::update(
        important_items
            .filter(id.eq(item_to_update_id))
            .filter(user_id.eq(user_uuid)),
    )
    .set(&item_changes)
    .get_result::<ImportantItem>(&mut conn)
    .await
    .optional()
    .map_err(ServiceError::from)?
    .ok_or_else(|| ServiceError::not_owned("ImportantItem", item_to_update_id))?;

    Ok(HttpResponse::Ok().json(updated_item))
}

// === DELETE /important-items/{item_id} ===
#[delete("/{item_id}")]
pub async fn delete_important_item_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    item_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let item_to_delete_id = item_id.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        important_items
            .filter(user_id.eq(authenticated_user.id))
            .filter(id.eq(item_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("ImportantItem with id {} deleted successfully", item_to_delete_id)
        })))
    } else {
        Err(ServiceError::not_owned("ImportantItem", item_to_delete_id))
    }
}

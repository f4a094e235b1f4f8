use crate::analytics::calendar::parse_range;
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    required_text, CreateDiaryEntryPayload, DateRangeQuery, DiaryEntry, NewDiaryEntry,
    UpdateDiaryEntryChangeset, UpdateDiaryEntryPayload,
};
use crate::schema::diary_entries::{self, dsl::*};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use uuid::Uuid;

// === POST /diary ===
#[post("")]
pub async fn create_diary_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateDiaryEntryPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_entry = NewDiaryEntry {
        user_id: authenticated_user.id,
        date: payload.date,
        content: required_text(&payload.content, "content")?,
    };

    let mut conn = pool.get().await?;

    let entry = diesel::insert_into(diary_entries::table)
        .values(&new_entry)
        .get_result::<DiaryEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} wrote diary entry {} for {}",
        authenticated_user.id,
        entry.id,
        entry.date
    );
    Ok(HttpResponse::Created().json(entry))
}

// === GET /diary?from=&to= ===
#[get("")]
pub async fn list_diary_entries_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ServiceError> {
    let (from, to) = parse_range(query.from.as_deref(), query.to.as_deref())?;

    let mut conn = pool.get().await?;

    let mut query_builder = diary_entries
        .filter(user_id.eq(authenticated_user.id))
        .select(DiaryEntry::as_select())
        .into_boxed();
    if let Some(from_date) = from {
        query_builder = query_builder.filter(date.ge(from_date));
    }
    if let Some(to_date) = to {
        query_builder = query_builder.filter(date.le(to_date));
    }

    // Newest first, like a journal.
    let entries = query_builder
        .order((date.desc(), created_at.desc()))
        .load::<DiaryEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(entries))
}

// === GET /diary/{entry_id} ===
#[get("/{entry_id}")]
pub async fn get_diary_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entry_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let entry_to_find_id = entry_id.into_inner();

    let mut conn = pool.get().await?;

    let entry = diary_entries
        .filter(user_id.eq(authenticated_user.id))
        .filter(id.eq(entry_to_find_id))
        .select(DiaryEntry::as_select())
        .first::<DiaryEntry>(&mut conn)
        .await
        .optional()
        .map_err(ServiceError::from)?
        .ok_or_else(|| ServiceError::not_owned("DiaryEntry", entry_to_find_id))?;

    Ok(HttpResponse::Ok().json(entry))
}

// === PUT /diary/{entry_id} ===
#[put("/{entry_id}")]
pub async fn update_diary_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entry_id: web::Path<Uuid>,
    payload: web::Json<UpdateDiaryEntryPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let entry_to_update_id = entry_id.into_inner();
    log::info!(
        "User {} updating diary entry {}",
        user_uuid,
        entry_to_update_id
    );

    let entry_changes = UpdateDiaryEntryChangeset {
        date: payload.date,
        content: payload
            .content
            .as_deref()
            .map(|text| required_text(text, "content"))
            .transpose()?,
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_entry = diesel::update(
        diary_entries
            .filter(id.eq(entry_to_update_id))
            .filter(user_id.eq(user_uuid)),
    )
    .set(&entry_changes)
    .get_result::<DiaryEntry>(&mut conn)
    .await
    .optional()
    .map_err(ServiceError::from)?
    .ok_or_else(|| ServiceError::not_owned("DiaryEntry", entry_to_update_id))?;

    Ok(HttpResponse::Ok().json(updated_entry))
}

// === DELETE /diary/{entry_id} ===
#[delete("/{entry_id}")]
pub async fn delete_diary_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entry_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let entry_to_delete_id = entry_id.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        diary_entries
            .filter(user_id.eq(authenticated_user.id))
            .filter(id.eq(entry_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("DiaryEntry with id {} deleted successfully", entry_to_delete_id)
        })))
    } else {
        Err(ServiceError::not_owned("DiaryEntry", entry_to_delete_id))
    }
}

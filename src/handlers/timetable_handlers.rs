use crate::analytics::timetable::{merge_timetable, period_code, TimetableRow, PERIODS};
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{
    optional_text, required_text, ClassDay, CreateTimetableEntryPayload, NewTimetableEntry,
    TimetableEntry, UpdateTimetableEntryChangeset, UpdateTimetableEntryPayload,
};
use crate::schema::timetable_entries::{self, dsl::*};
use actix_web::{delete, get, post, put, web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Serialize, Debug)]
pub struct TimetableGrid {
    pub weekdays: [ClassDay; 7],
    pub periods: [&'static str; 15],
    pub rows: Vec<TimetableRow>,
}

fn validated_period(raw: &str) -> Result<&'static str, ServiceError> {
    period_code(raw.trim())
        .ok_or_else(|| ServiceError::BadRequest(format!("Unknown class period: {}", raw)))
}

async fn load_timetable(
    conn: &mut AsyncPgConnection,
    user_uuid: Uuid,
) -> Result<Vec<TimetableEntry>, ServiceError> {
    timetable_entries
        .filter(user_id.eq(user_uuid))
        .order((weekday.asc(), period.asc(), created_at.asc()))
        .select(TimetableEntry::as_select())
        .load::<TimetableEntry>(conn)
        .await
        .map_err(ServiceError::from)
}

// === POST /timetable ===
#[post("")]
pub async fn create_timetable_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateTimetableEntryPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_entry = NewTimetableEntry {
        user_id: authenticated_user.id,
        weekday: payload.weekday.as_str().to_string(),
        period: validated_period(&payload.period)?.to_string(),
        course_name: required_text(&payload.course_name, "course_name")?,
        classroom: optional_text(payload.classroom.as_deref()),
        teacher: optional_text(payload.teacher.as_deref()),
        note: optional_text(payload.note.as_deref()),
    };

    let mut conn = pool.get().await?;

    let entry = diesel::insert_into(timetable_entries::table)
        .values(&new_entry)
        .get_result::<TimetableEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} added {} on {} period {}",
        authenticated_user.id,
        entry.course_name,
        entry.weekday,
        entry.period
    );
    Ok(HttpResponse::Created().json(entry))
}

// === GET /timetable ===
#[get("")]
pub async fn list_timetable_entries_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = pool.get().await?;
    let entries = load_timetable(&mut conn, authenticated_user.id).await?;

    Ok(HttpResponse::Ok().json(entries))
}

// === GET /timetable/layout ===
#[get("/layout")]
pub async fn timetable_layout_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
) -> Result<HttpResponse, ServiceError> {
    let mut conn = pool.get().await?;
    let entries = load_timetable(&mut conn, authenticated_user.id).await?;

    let layout = merge_timetable(&entries);
    log::debug!(
        "Timetable for user {}: {} entries, {} blocks, {} conflicts",
        authenticated_user.id,
        entries.len(),
        layout.blocks.len(),
        layout.conflicts.len()
    );

    Ok(HttpResponse::Ok().json(TimetableGrid {
        weekdays: ClassDay::ALL,
        periods: PERIODS,
        rows: layout.rows(),
    }))
}

// === PUT /timetable/{entry_id} ===
#[put("/{entry_id}")]
pub async fn update_timetable_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entry_id: web::Path<Uuid>,
    payload: web::Json<UpdateTimetableEntryPayload>,
) -> Result<HttpResponse, ServiceError> {
    let user_uuid = authenticated_user.id;
    let entry_to_update_id = entry_id.into_inner();
    log::info!(
        "User {} updating timetable entry {} with payload: {:?}",
        user_uuid,
        entry_to_update_id,
        payload.0
    );

    let entry_changes = UpdateTimetableEntryChangeset {
        weekday: payload.weekday.map(|day| day.as_str().to_string()),
        period: payload
            .period
            .as_deref()
            .map(validated_period)
            .transpose()?
            .map(str::to_string),
        course_name: payload
            .course_name
            .as_deref()
            .map(|name| required_text(name, "course_name"))
            .transpose()?,
        classroom: payload
            .classroom
            .as_ref()
            .map(|value| optional_text(value.as_deref())),
        teacher: payload
            .teacher
            .as_ref()
            .map(|value| optional_text(value.as_deref())),
        note: payload
            .note
            .as_ref()
            .map(|value| optional_text(value.as_deref())),
        updated_at: Some(Utc::now().naive_utc()),
    };

    let mut conn = pool.get().await?;

    let updated_entry = diesel::update(
        timetable_entries
            .filter(id.eq(entry_to_update_id))
            .filter(user_id.eq(user_uuid)),
    )
    .set(&entry_changes)
    .get_result::<TimetableEntry>(&mut conn)
    .await
    .optional()
    .map_err(ServiceError::from)?
    .ok_or_else(|| ServiceError::not_owned("TimetableEntry", entry_to_update_id))?;

    Ok(HttpResponse::Ok().json(updated_entry))
}

// === DELETE /timetable/{entry_id} ===
#[delete("/{entry_id}")]
pub async fn delete_timetable_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entry_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let entry_to_delete_id = entry_id.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        timetable_entries
            .filter(user_id.eq(authenticated_user.id))
            .filter(id.eq(entry_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("TimetableEntry with id {} deleted successfully", entry_to_delete_id)
        })))
    } else {
        Err(ServiceError::not_owned("TimetableEntry", entry_to_delete_id))
    }
}

#[cfg(test)]
mod tests {
    use super::validated_period;

    #[test]
    fn period_codes_are_checked() {
        assert_eq!(validated_period(" 10 ").unwrap(), "10");
        assert_eq!(validated_period("C").unwrap(), "C");
        assert!(validated_period("11").is_err());
        assert!(validated_period("c").is_err());
    }
}

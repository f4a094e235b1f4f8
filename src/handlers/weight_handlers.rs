use crate::analytics::calendar::parse_range;
use crate::auth_utils::AuthenticatedUser;
use crate::db::DbPool;
use crate::error_handler::ServiceError;
use crate::models::{CreateWeightEntryPayload, DateRangeQuery, NewWeightEntry, WeightEntry};
use crate::schema::weight_entries::{self, dsl::*};
use actix_web::{delete, get, post, web, HttpResponse};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use uuid::Uuid;

fn validated_weight(raw: f64) -> Result<f64, ServiceError> {
    if !raw.is_finite() || raw <= 0.0 {
        return Err(ServiceError::BadRequest(
            "weight_kg must be a positive number".to_string(),
        ));
    }
    Ok(raw)
}

// === POST /weights ===
#[post("")]
pub async fn create_weight_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    payload: web::Json<CreateWeightEntryPayload>,
) -> Result<HttpResponse, ServiceError> {
    let new_entry = NewWeightEntry {
        user_id: authenticated_user.id,
        date: payload.date,
        weight_kg: validated_weight(payload.weight_kg)?,
    };

    let mut conn = pool.get().await?;

    let entry = diesel::insert_into(weight_entries::table)
        .values(&new_entry)
        .get_result::<WeightEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    log::info!(
        "User {} recorded {}kg on {}",
        authenticated_user.id,
        entry.weight_kg,
        entry.date
    );
    Ok(HttpResponse::Created().json(entry))
}

// === GET /weights?from=&to= ===
#[get("")]
pub async fn list_weight_entries_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ServiceError> {
    let (from, to) = parse_range(query.from.as_deref(), query.to.as_deref())?;

    let mut conn = pool.get().await?;

    let mut query_builder = weight_entries
        .filter(user_id.eq(authenticated_user.id))
        .select(WeightEntry::as_select())
        .into_boxed();
    if let Some(from_date) = from {
        query_builder = query_builder.filter(date.ge(from_date));
    }
    if let Some(to_date) = to {
        query_builder = query_builder.filter(date.le(to_date));
    }

    let entries = query_builder
        .order((date.asc(), created_at.asc()))
        .load::<WeightEntry>(&mut conn)
        .await
        .map_err(ServiceError::from)?;

    Ok(HttpResponse::Ok().json(entries))
}

// === DELETE /weights/{entry_id} ===
#[delete("/{entry_id}")]
pub async fn delete_weight_entry_handler(
    pool: web::Data<DbPool>,
    authenticated_user: AuthenticatedUser,
    entry_id: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let entry_to_delete_id = entry_id.into_inner();

    let mut conn = pool.get().await?;

    let num_deleted = diesel::delete(
        weight_entries
            .filter(user_id.eq(authenticated_user.id))
            .filter(id.eq(entry_to_delete_id)),
    )
    .execute(&mut conn)
    .await
    .map_err(ServiceError::from)?;

    if num_deleted > 0 {
        Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "message": format!("WeightEntry with id {} deleted successfully", entry_to_delete_id)
        })))
    } else {
        Err(ServiceError::not_owned("WeightEntry", entry_to_delete_id))
    }
}

#[cfg(test)]
mod tests {
    use super::validated_weight;

    #[test]
    fn weight_must_be_positive() {
        assert_eq!(validated_weight(72.4).unwrap(), 72.4);
        assert!(validated_weight(0.0).is_err());
        assert!(validated_weight(-1.0).is_err());
        assert!(validated_weight(f64::NAN).is_err());
    }
}

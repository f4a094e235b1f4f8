use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::bb8::RunError as BB8RunError;
use diesel_async::pooled_connection::PoolError;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum ServiceError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
    DatabaseError(String), // already user-facing
    NotFound(String),
    PoolError(String), // already user-facing
}

impl ServiceError {
    /// Not-found error for a record missing from the caller's own data.
    pub fn not_owned(kind: &str, record_id: impl fmt::Display) -> ServiceError {
        ServiceError::NotFound(format!(
            "{} with id {} not found or not owned by user",
            kind, record_id
        ))
    }

    fn from_diesel_error(error: DieselError) -> ServiceError {
        match error {
            // Row-level CHECK constraints guard client-supplied values.
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                log::warn!("Check constraint rejected a write: {}", info.message());
                ServiceError::BadRequest("The submitted values are not allowed.".to_string())
            }
            DieselError::DatabaseError(kind, info) => {
                log::error!(
                    "Internal Database Error: {:?} - Info: {}",
                    kind,
                    info.message()
                );
                ServiceError::DatabaseError("A database operation failed.".to_string())
            }
            DieselError::NotFound => {
                ServiceError::NotFound("The requested record was not found.".to_string())
            }
            err => {
                log::error!("Unexpected Diesel error: {}", err);
                ServiceError::DatabaseError("An unexpected database error occurred.".to_string())
            }
        }
    }

    fn from_pool_error(error: PoolError) -> ServiceError {
        log::error!("Pool error: {:?}", error);
        ServiceError::PoolError("Could not connect to the database pool.".to_string())
    }

    fn from_bb8_run_error(error: BB8RunError) -> ServiceError {
        log::error!("BB8 connection pool error: {:?}", error);
        ServiceError::PoolError("Could not obtain connection from database pool.".to_string())
    }
}

impl From<DieselError> for ServiceError {
    fn from(error: DieselError) -> ServiceError {
        ServiceError::from_diesel_error(error)
    }
}

impl From<PoolError> for ServiceError {
    fn from(error: PoolError) -> ServiceError {
        ServiceError::from_pool_error(error)
    }
}

impl From<BB8RunError> for ServiceError {
    fn from(error: BB8RunError) -> ServiceError {
        ServiceError::from_bb8_run_error(error)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            ServiceError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ServiceError::PoolError(msg) => write!(f, "Pool Error: {}", msg),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ServiceError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::PoolError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        // Details of server errors were logged where they were converted; only mask here.
        let user_facing_message = match status_code.is_server_error() {
            false => self.to_string(),
            true => "An internal server error occurred. Please try again later.".to_string(),
        };

        if status_code.is_server_error() {
            log::error!(
                "Responding with server error ({}): {}",
                status_code,
                user_facing_message
            );
        } else {
            log::warn!(
                "Responding with client error ({}): {}",
                status_code,
                user_facing_message
            );
        }

        HttpResponse::build(status_code).json(json!({
            "status": "error",
            "statusCode": status_code.as_u16(),
            "message": user_facing_message
        }))
    }
}

use actix_web::{dev::Payload, Error as ActixWebError, FromRequest, HttpRequest};
use futures_util::future::{err, ok, Ready};
use serde::Deserialize;
use uuid::Uuid;

/// Header set by the frontend once the social login has completed upstream.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Owner of every record touched by the request.
#[derive(Debug, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
}

fn parse_user_header(req: &HttpRequest) -> Result<Uuid, ActixWebError> {
    let Some(header_value) = req.headers().get(USER_ID_HEADER) else {
        log::warn!("{} header was not found in request headers.", USER_ID_HEADER);
        return Err(actix_web::error::ErrorUnauthorized(
            "Missing X-User-Id header. Authentication required.",
        ));
    };

    let Ok(user_id_str) = header_value.to_str() else {
        log::warn!("{} header is not valid UTF-8.", USER_ID_HEADER);
        return Err(actix_web::error::ErrorBadRequest(
            "X-User-Id header contains invalid characters.",
        ));
    };

    if user_id_str.trim().is_empty() {
        log::warn!("{} header is present but empty.", USER_ID_HEADER);
        return Err(actix_web::error::ErrorBadRequest(
            "X-User-Id header cannot be empty.",
        ));
    }

    Uuid::parse_str(user_id_str.trim()).map_err(|parse_err| {
        log::warn!(
            "Failed to parse {} '{}' to UUID: {}",
            USER_ID_HEADER,
            user_id_str,
            parse_err
        );
        actix_web::error::ErrorBadRequest("Invalid X-User-Id header format (not a valid UUID).")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixWebError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match parse_user_header(req) {
            Ok(id) => {
                log::debug!("Request authenticated for user {}", id);
                ok(AuthenticatedUser { id })
            }
            Err(e) => err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    async fn extract(req: TestRequest) -> Result<AuthenticatedUser, ActixWebError> {
        let (req, mut payload) = req.to_http_parts();
        AuthenticatedUser::from_request(&req, &mut payload).await
    }

    #[actix_web::test]
    async fn accepts_a_valid_uuid() {
        let id = Uuid::new_v4();
        let user = extract(TestRequest::default().insert_header((USER_ID_HEADER, id.to_string())))
            .await
            .unwrap();
        assert_eq!(user.id, id);
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorized() {
        let error = extract(TestRequest::default()).await.unwrap_err();
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn malformed_header_is_bad_request() {
        let error = extract(TestRequest::default().insert_header((USER_ID_HEADER, "not-a-uuid")))
            .await
            .unwrap_err();
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn empty_header_is_bad_request() {
        let error = extract(TestRequest::default().insert_header((USER_ID_HEADER, "")))
            .await
            .unwrap_err();
        assert_eq!(
            error.as_response_error().status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}

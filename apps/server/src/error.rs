use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tobby_core::errors::{DatabaseError, Error};

/// Error type returned by API handlers. Wraps core errors and maps them to
/// HTTP status codes in `IntoResponse`.
pub struct ApiError(anyhow::Error);

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<Error>() {
            Some(Error::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(Error::Database(DatabaseError::NotFound(_))) => StatusCode::NOT_FOUND,
            Some(Error::Database(DatabaseError::UniqueViolation(_))) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("API error: {:#}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

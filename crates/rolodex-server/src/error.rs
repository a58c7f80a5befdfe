use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use rolodex_store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Phone number already registered")]
    PhoneConflict,

    #[error("Contact not found")]
    NotFound,

    #[error("Avatar too large: {size} bytes (max {max})")]
    AvatarTooLarge { size: usize, max: usize },

    #[error("Avatar storage error: {0}")]
    StorageUnavailable(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::PhoneConflict => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::AvatarTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ApiError::StorageUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Avatar storage error".to_string(),
            ),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::PhoneTaken => ApiError::PhoneConflict,
            StoreError::Invalid { field, message } => ApiError::Validation { field, message },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_api_taxonomy() {
        assert!(matches!(
            ApiError::from(StoreError::NotFound),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from(StoreError::PhoneTaken),
            ApiError::PhoneConflict
        ));
        assert!(matches!(
            ApiError::from(StoreError::Invalid {
                field: "name",
                message: "must be 1-50 characters".to_string(),
            }),
            ApiError::Validation { field: "name", .. }
        ));
        assert!(matches!(
            ApiError::from(StoreError::Migration("boom".to_string())),
            ApiError::Internal(_)
        ));
    }
}

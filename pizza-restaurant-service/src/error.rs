use axum::{http::StatusCode, response::Json};
use tracing::{error, info};

use crate::catalog::CatalogError;
use crate::serializer::{ApiErrorResponse, ValidationErrorResponse};
use crate::validation::{ValidationError, VALIDATION_MESSAGE};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Restaurant not found")]
    RestaurantNotFound,
    #[error("Validation failed: {0:?}")]
    Validation(Vec<ValidationError>),
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(vec![e])
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::RestaurantNotFound(_) => ApiError::RestaurantNotFound,
            CatalogError::Validation(errors) => ApiError::Validation(errors),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::RestaurantNotFound => (
                StatusCode::NOT_FOUND,
                Json(ApiErrorResponse {
                    error: "Restaurant not found".to_string(),
                }),
            )
                .into_response(),
            ApiError::Validation(errors) => {
                info!(?errors, "Rejected offering");
                let errors = vec![VALIDATION_MESSAGE.to_string(); errors.len().max(1)];
                (
                    StatusCode::BAD_REQUEST,
                    Json(ValidationErrorResponse { errors }),
                )
                    .into_response()
            }
            ApiError::InternalError(detail) => {
                error!(%detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorResponse {
                        error: "Internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use serde_json::json;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_errors_are_generic() {
        let (status, body) = body_json(ApiError::Validation(vec![
            ValidationError::PriceOutOfRange,
            ValidationError::UnknownPizza,
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"errors": ["validation errors", "validation errors"]}));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let (status, body) =
            body_json(CatalogError::Migration("disk I/O error".to_string()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[tokio::test]
    async fn test_not_found_from_catalog() {
        let (status, body) = body_json(CatalogError::RestaurantNotFound(9).into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Restaurant not found"}));
    }
}

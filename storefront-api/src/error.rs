use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Every failure the storefront reports is a 400 with a `{message}` body;
/// the detail only goes to the log.
#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    PaymentFailed(String),
    StorageError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::ValidationError(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                format!("Something went wrong: {}", msg)
            }
            AppError::PaymentFailed(msg) => {
                tracing::warn!("Payment failed: {}", msg);
                "Payment failed".to_string()
            }
            AppError::StorageError(msg) => {
                tracing::error!("Storage error: {}", msg);
                "Something went wrong".to_string()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Request failed: {}", err);
                "Something went wrong".to_string()
            }
        };

        (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

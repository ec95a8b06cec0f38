//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::logic::PredictionError;
use crate::models::describe_validation;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Input outside the form's domains
    ValidationError(String),

    // Recoverable pipeline failure
    Prediction(PredictionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, stage) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Prediction(err) => {
                tracing::warn!(stage = err.stage(), "Prediction failed: {}", err);
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string(), Some(err.stage()))
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16()
        });
        if let Some(stage) = stage {
            body["stage"] = json!(stage);
        }

        (status, Json(body)).into_response()
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        AppError::Prediction(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(describe_validation(&err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

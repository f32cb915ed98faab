//! Error kinds surfaced to a single form submission

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    InputOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("{0}")]
    Prediction(String),
}

pub type Result<T> = std::result::Result<T, FormError>;

impl FormError {
    /// Message shown in place of a verdict.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FormError::InputOutOfRange { .. }
            | FormError::UnknownCategory(_)
            | FormError::UnknownState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FormError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.user_message() });
        (self.status(), Json(body)).into_response()
    }
}

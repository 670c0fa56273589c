use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    /// Filters out potentially sensitive information
    pub fn log_safe(&self) -> String {
        match self {
            // Database errors might contain sensitive schema information
            Error::Database(_) => "Database operation failed".to_string(),
            Error::Migration(_) => "Database migration failed".to_string(),

            // reqwest errors carry the request URL, which may hold the API key
            Error::Http(_) => "External HTTP request failed".to_string(),

            Error::Internal(msg) | Error::Generation(msg) | Error::Embedding(msg) => {
                if contains_secret_hint(msg) {
                    "Upstream error (details redacted)".to_string()
                } else {
                    self.to_string()
                }
            }

            Error::Io(_) => "File system operation failed".to_string(),
            Error::Json(_) => "JSON (de)serialization failed".to_string(),
            Error::InvalidUrl(_) => "Invalid URL provided".to_string(),

            // These errors are generally safe to log as-is
            Error::Config(_)
            | Error::Store(_)
            | Error::Validation(_)
            | Error::PayloadTooLarge(_) => self.to_string(),
        }
    }

    /// HTTP status this error maps to at the handler boundary
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn contains_secret_hint(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.contains("password")
        || lower.contains("secret")
        || lower.contains("token")
        || lower.contains("key=")
        || lower.contains("api_key")
}

// Implement IntoResponse for API error handling
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = match &self {
            Error::Validation(msg) | Error::PayloadTooLarge(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                msg.clone()
            }
            _ => {
                tracing::error!("Request error: {}", self.log_safe());
                format!("Internal Server Error: {self}")
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_unprocessable() {
        let response = Error::Validation("ingredients must not be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_store_error_maps_to_internal() {
        let response = Error::Store("collection missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_log_safe_redacts_keys() {
        let err = Error::Internal("request to https://x/?key=abc failed".to_string());
        assert_eq!(err.log_safe(), "Upstream error (details redacted)");

        let err = Error::Store("dimension mismatch".to_string());
        assert_eq!(err.log_safe(), "Vector store error: dimension mismatch");
    }
}

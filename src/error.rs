// src/error.rs
use axum::{
    response::{Html, IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while serving a request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Constraint or integrity failure raised by a non-SQL store.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Template(_) | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Template(_) => "TEMPLATE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    fn log(&self) {
        if self.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Client error occurred");
        }
    }

    /// Message safe to show to a client. Server errors never leak their cause.
    fn public_message(&self) -> String {
        if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }

    /// JSON rendering used by the admin API.
    pub fn into_json_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.public_message(),
            }
        }));
        (status, body).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let (title, detail) = match self {
            Self::NotFound(_) => (
                "Not Found",
                "The requested resource was not found on this server.",
            ),
            Self::Forbidden(_) => ("Forbidden (403)", "CSRF verification failed. Request aborted."),
            Self::Unauthorized => ("Unauthorized (401)", ""),
            Self::Validation(_) => ("Bad Request (400)", ""),
            Self::Database(_) | Self::Template(_) | Self::Storage(_) => ("Server Error (500)", ""),
        };
        let page = format!(
            "<!doctype html>\n<html lang=\"en\">\n<head><title>{title}</title></head>\n\
             <body>\n<h1>{title}</h1>\n<p>{detail}</p>\n</body>\n</html>\n"
        );
        (status, Html(page)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

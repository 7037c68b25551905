use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::views;

/// Application-wide error type. Database and session failures are logged
/// server-side and surfaced to the client as a generic error page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("password hashing error: {0}")]
    Password(String),

    #[error("not found")]
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Session(e) => {
                tracing::error!(error = %e, "session error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Password(e) => {
                tracing::error!(error = %e, "password hashing error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound => StatusCode::NOT_FOUND,
        };
        (status, views::error_page(status)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

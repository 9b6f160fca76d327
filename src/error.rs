//! Error handling module
//!
//! Every failure a handler can hit is folded into [`AppError`]. Server-side
//! failures reach the client as HTTP 500 with the raw message as plain text;
//! only a missing request body gets a JSON envelope.

use crate::models::MessageResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use deadpool_postgres::PoolError;
use thiserror::Error;
use tracing::{error, warn};

/// Fixed message returned when a create/update request arrives without a body
pub const MISSING_BODY_MESSAGE: &str = "Bad Request. Please fill all field.";

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{}", database_message(.0))]
    Database(#[from] tokio_postgres::Error),

    #[error("{}", pool_message(.0))]
    Pool(#[from] PoolError),

    /// Path id that is not a 32-bit integer, worded like the server would
    #[error("invalid input syntax for type integer: \"{0}\"")]
    InvalidId(String),

    #[error("value \"{0}\" is out of range for type integer")]
    IdOutOfRange(String),

    #[error("No action plan details found for id {0}")]
    MissingDetails(i32),

    #[error("{0}")]
    Internal(String),

    #[error("Bad Request. Please fill all field.")]
    MissingBody,

    #[error("Failed to parse the request body as JSON: {0}")]
    MalformedBody(String),
}

/// Prefer the server's own message over the driver's "db error: ..." wrapper
fn database_message(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => db.message().to_string(),
        None => error_chain(err),
    }
}

fn pool_message(err: &PoolError) -> String {
    match err {
        PoolError::Backend(e) => database_message(e),
        other => error_chain(other),
    }
}

/// Display of `err` followed by every source not already spelled out in it
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingBody => (
                StatusCode::BAD_REQUEST,
                Json(MessageResponse::new(MISSING_BODY_MESSAGE)),
            )
                .into_response(),
            AppError::MalformedBody(_) => {
                warn!("Rejected request body: {}", self);
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            other => {
                error!("Request failed: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

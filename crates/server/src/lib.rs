use api_types::error::{ApiError, ErrorBody};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use auth::{AuthSettings, AuthUser};
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod accounts;
mod auth;
mod categories;
mod server;
mod transactions;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Malformed request: bad JSON, query string or path parameter.
    BadRequest {
        message: String,
        details: Option<String>,
    },
    Unauthorized(String),
    Internal(String),
}

impl ServerError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            details: None,
        }
    }
}

fn parts_for_engine_error(err: EngineError) -> (StatusCode, &'static str, String) {
    match err {
        EngineError::KeyNotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
        EngineError::ExistingKey(msg) | EngineError::Immutable(msg) => {
            (StatusCode::CONFLICT, "conflict", msg)
        }
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "db error".to_string(),
            )
        }
        EngineError::InvalidAmount(msg)
        | EngineError::InvalidName(msg)
        | EngineError::InvalidKind(msg)
        | EngineError::CategoryMismatch(msg)
        | EngineError::EmptyPatch(msg)
        | EngineError::InvalidId(msg)
        | EngineError::InvalidFilter(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message, details) = match self {
            ServerError::Engine(err) => {
                let (status, code, message) = parts_for_engine_error(err);
                (status, code, message, None)
            }
            ServerError::BadRequest { message, details } => {
                (StatusCode::BAD_REQUEST, "bad_request", message, details)
            }
            ServerError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", message, None)
            }
            ServerError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                None,
            ),
        };

        let body = ErrorBody {
            error: ApiError {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest {
            message: "invalid payload".to_string(),
            details: Some(value.body_text()),
        }
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest {
            message: "invalid query".to_string(),
            details: Some(value.body_text()),
        }
    }
}

impl From<PathRejection> for ServerError {
    fn from(_: PathRejection) -> Self {
        Self::bad_request("invalid id")
    }
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::error::{BatchFailureView, ErrorResponse};
pub use server::{ServerState, run_with_listener, spawn_with_listener};

mod pens;
mod schedule;
mod server;
mod suggestions;
mod templates;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Validation(_) | EngineError::BatchRejected(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorResponse {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorResponse {
                error: "internal server error".to_string(),
                failures: None,
            }
        }
        EngineError::BatchRejected(failures) => ErrorResponse {
            error: "batch rejected".to_string(),
            failures: Some(
                failures
                    .into_iter()
                    .map(|f| BatchFailureView {
                        index: f.index,
                        reason: f.reason,
                    })
                    .collect(),
            ),
        },
        other => ErrorResponse {
            error: other.to_string(),
            failures: None,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: err,
                    failures: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

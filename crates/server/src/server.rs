use axum::{
    Router,
    routing::{get, post},
};
use engine::{Engine, RecommendedEntry};

use std::sync::Arc;

use crate::{pens, schedule, suggestions, templates};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Externally supplied reference protocol, if configured.
    pub reference: Arc<Option<Vec<RecommendedEntry>>>,
}

pub(crate) fn router(state: ServerState) -> Router {
    Router::new()
        .route("/schedule", get(schedule::get_groups))
        .route("/schedule/complete", post(schedule::mark))
        .route("/schedule/{id}/revert", post(schedule::revert))
        .route(
            "/templates",
            get(templates::list).post(templates::save),
        )
        .route(
            "/templates/{id}",
            axum::routing::delete(templates::remove),
        )
        .route("/suggestions", get(suggestions::list))
        .route("/suggestions/accept", post(suggestions::accept))
        .route("/pens", get(pens::list))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    reference: Option<Vec<RecommendedEntry>>,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        reference: Arc::new(reference),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    reference: Option<Vec<RecommendedEntry>>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, reference, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

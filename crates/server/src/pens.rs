//! Read-only pen roster endpoint.

use api_types::pen::{PenView, PensResponse};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn list(State(state): State<ServerState>) -> Result<Json<PensResponse>, ServerError> {
    let pens = state.engine.list_pens().await?;

    Ok(Json(PensResponse {
        pens: pens
            .into_iter()
            .map(|pen| PenView {
                id: pen.id,
                name: pen.name,
                intake_date: pen.intake_date,
            })
            .collect(),
    }))
}

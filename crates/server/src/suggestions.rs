//! Gap analysis API endpoints.

use api_types::suggestion::{AcceptSuggestionRequest, SuggestionView, SuggestionsResponse};
use api_types::template::TemplateView;
use axum::{Json, extract::State};
use engine::{EngineError, RecommendedEntry, Suggestion};

use crate::{ServerError, server::ServerState, templates::map_template};

fn reference_of(state: &ServerState) -> Result<&[RecommendedEntry], ServerError> {
    match state.reference.as_ref() {
        Some(reference) => Ok(reference.as_slice()),
        None => Err(ServerError::Engine(EngineError::Unavailable(
            "reference protocol not configured".to_string(),
        ))),
    }
}

fn map_suggestion(suggestion: Suggestion) -> SuggestionView {
    SuggestionView {
        vaccine_id: suggestion.vaccine_id,
        vaccine_name: suggestion.vaccine_name,
        stage: suggestion.stage,
        days_old: suggestion.days_old,
        dosage: suggestion.dosage,
        notes: suggestion.notes,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<SuggestionsResponse>, ServerError> {
    let reference = reference_of(&state)?;
    let suggestions = state.engine.list_suggestions(reference).await?;

    Ok(Json(SuggestionsResponse {
        suggestions: suggestions.into_iter().map(map_suggestion).collect(),
    }))
}

pub async fn accept(
    State(state): State<ServerState>,
    Json(payload): Json<AcceptSuggestionRequest>,
) -> Result<Json<TemplateView>, ServerError> {
    let suggestion = Suggestion {
        vaccine_id: payload.suggestion.vaccine_id,
        vaccine_name: payload.suggestion.vaccine_name,
        stage: payload.suggestion.stage,
        days_old: payload.suggestion.days_old,
        dosage: payload.suggestion.dosage,
        notes: payload.suggestion.notes,
    };

    let item = state
        .engine
        .accept_suggestion(&suggestion, payload.days_old)
        .await?;
    Ok(Json(map_template(item)))
}

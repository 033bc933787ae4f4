//! Protocol template API endpoints.

use api_types::template::{TemplateSaveRequest, TemplateView, TemplatesResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::TemplateDraft;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_template(item: engine::TemplateItem) -> TemplateView {
    TemplateView {
        id: item.id,
        vaccine_id: item.vaccine_id,
        vaccine_name: item.vaccine_name,
        stage: item.stage,
        days_old: item.days_old,
        dosage: item.dosage,
        notes: item.notes,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<TemplatesResponse>, ServerError> {
    let templates = state.engine.list_templates().await?;

    Ok(Json(TemplatesResponse {
        templates: templates.into_iter().map(map_template).collect(),
    }))
}

pub async fn save(
    State(state): State<ServerState>,
    Json(payload): Json<TemplateSaveRequest>,
) -> Result<Json<TemplatesResponse>, ServerError> {
    let drafts: Vec<TemplateDraft> = payload
        .items
        .into_iter()
        .map(|item| TemplateDraft {
            id: item.id,
            vaccine_id: item.vaccine_id,
            stage: item.stage,
            days_old: item.days_old,
            dosage: item.dosage,
            notes: item.notes,
        })
        .collect();

    let templates = state.engine.save_templates(drafts).await?;
    Ok(Json(TemplatesResponse {
        templates: templates.into_iter().map(map_template).collect(),
    }))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(template_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_template(template_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Schedule API endpoints: the per-date reconciliation view, batch
//! confirmation and reversal.

use api_types::schedule::{
    MarkItem, MarkRequest, MarkResponse, PenStatusView, ScheduleQuery, ScheduleResponse,
    VaccinationGroupView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::VaccinationKey;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_status(status: engine::RecordStatus) -> api_types::RecordStatus {
    match status {
        engine::RecordStatus::Pending => api_types::RecordStatus::Pending,
        engine::RecordStatus::Completed => api_types::RecordStatus::Completed,
    }
}

fn map_group(group: engine::VaccinationGroup) -> VaccinationGroupView {
    VaccinationGroupView {
        vaccine_name: group.vaccine_name,
        stage: group.stage,
        total_pens: group.total_pens,
        pens: group
            .pens
            .into_iter()
            .map(|pen| PenStatusView {
                pen_id: pen.pen_id,
                pen_name: pen.pen_name,
                is_real: pen.is_real,
                schedule_id: pen.schedule_id,
                template_id: pen.template_id,
                status: map_status(pen.status),
                is_overdue: pen.is_overdue,
                original_due_date: pen.original_due_date,
            })
            .collect(),
    }
}

pub async fn get_groups(
    State(state): State<ServerState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, ServerError> {
    let groups = state.engine.get_vaccination_groups(query.date).await?;

    Ok(Json(ScheduleResponse {
        date: query.date,
        groups: groups.into_iter().map(map_group).collect(),
    }))
}

pub async fn mark(
    State(state): State<ServerState>,
    Json(payload): Json<MarkRequest>,
) -> Result<Json<MarkResponse>, ServerError> {
    if payload.items.is_empty() {
        return Err(ServerError::Generic("items must not be empty".to_string()));
    }

    let items: Vec<VaccinationKey> = payload
        .items
        .into_iter()
        .map(|item| match item {
            MarkItem::Real { schedule_id } => VaccinationKey::Real { schedule_id },
            MarkItem::Forecast {
                pen_id,
                template_id,
            } => VaccinationKey::Forecast {
                pen_id,
                template_id,
            },
        })
        .collect();
    let now = payload.completed_at.unwrap_or_else(Utc::now);

    let completed = state.engine.mark_vaccinated(&items, now).await?;
    Ok(Json(MarkResponse { completed }))
}

pub async fn revert(
    State(state): State<ServerState>,
    Path(schedule_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.revert_vaccination(schedule_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

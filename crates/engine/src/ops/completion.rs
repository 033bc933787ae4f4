//! The completion service: batch confirmation of administered doses and
//! reversal of completed records.
//!
//! Confirmation is all-or-nothing: the whole batch is validated up front and
//! rejected with the failing items identified, then applied inside a single
//! database transaction. Materialization is idempotent per
//! `(pen_id, template_id)`: the unique index on the pair is the arbiter, and
//! a create racing an existing record is treated as "already materialized"
//! rather than an error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    BatchFailure, Engine, EngineError, Pen, RecordStatus, ResultEngine, ScheduleRecord,
    TemplateItem, VaccinationKey, records,
};

use super::{forecast::due_date_for, with_tx};

impl Engine {
    /// Confirms a batch of vaccinations.
    ///
    /// Real pending records flip to completed; forecasts are materialized as
    /// completed records on first confirmation. Re-submitting an
    /// already-completed pair is a no-op, which makes retries safe. Returns
    /// the number of records actually transitioned.
    pub async fn mark_vaccinated(
        &self,
        items: &[VaccinationKey],
        now: DateTime<Utc>,
    ) -> ResultEngine<usize> {
        let mut failures: Vec<BatchFailure> = Vec::new();
        let mut resolved: HashMap<(Uuid, Uuid), (Pen, TemplateItem)> = HashMap::new();

        for (index, key) in items.iter().enumerate() {
            match key {
                VaccinationKey::Real { schedule_id } => {
                    match self.record_by_id(*schedule_id).await? {
                        None => failures.push(BatchFailure {
                            index,
                            reason: "schedule record not exists".to_string(),
                        }),
                        Some(record) if record.status != RecordStatus::Pending => {
                            failures.push(BatchFailure {
                                index,
                                reason: "schedule record is not pending".to_string(),
                            });
                        }
                        Some(_) => {}
                    }
                }
                VaccinationKey::Forecast {
                    pen_id,
                    template_id,
                } => {
                    let pen = self.pen_by_id(*pen_id).await?;
                    let template = self.template_by_id(*template_id).await?;
                    match (pen, template) {
                        (None, _) => failures.push(BatchFailure {
                            index,
                            reason: "pen not exists".to_string(),
                        }),
                        (_, None) => failures.push(BatchFailure {
                            index,
                            reason: "template not exists".to_string(),
                        }),
                        (Some(pen), Some(template)) => {
                            resolved.insert((*pen_id, *template_id), (pen, template));
                        }
                    }
                }
            }
        }

        if !failures.is_empty() {
            return Err(EngineError::BatchRejected(failures));
        }

        with_tx!(self, |tx| {
            let result: ResultEngine<usize> = async {
                let mut completed = 0usize;

                for key in items {
                    match key {
                        VaccinationKey::Real { schedule_id } => {
                            let record = find_record(&tx, *schedule_id).await?.ok_or_else(|| {
                                EngineError::NotFound("schedule record not exists".to_string())
                            })?;
                            // Validated as pending above; a concurrent
                            // completion in between is a no-op.
                            if record.status == RecordStatus::Pending {
                                set_status(&tx, record.id, RecordStatus::Completed, Some(now))
                                    .await?;
                                completed += 1;
                            }
                        }
                        VaccinationKey::Forecast {
                            pen_id,
                            template_id,
                        } => {
                            match find_record_for_pair(&tx, *pen_id, *template_id).await? {
                                Some(record) if record.status == RecordStatus::Completed => {}
                                Some(record) => {
                                    set_status(&tx, record.id, RecordStatus::Completed, Some(now))
                                        .await?;
                                    completed += 1;
                                }
                                None => {
                                    let (pen, template) = resolved
                                        .get(&(*pen_id, *template_id))
                                        .ok_or_else(|| {
                                            EngineError::NotFound(
                                                "template not exists".to_string(),
                                            )
                                        })?;
                                    if materialize(&tx, pen, template, now).await? {
                                        completed += 1;
                                    }
                                }
                            }
                        }
                    }
                }

                Ok(completed)
            }
            .await;
            result
        })
    }

    /// Reverts a completed record back to pending.
    ///
    /// The record is kept (not deleted), so a reverted dose shows up as a
    /// real pending entry from then on and the audit trail survives.
    pub async fn revert_vaccination(&self, schedule_id: Uuid) -> ResultEngine<()> {
        let record = self
            .record_by_id(schedule_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("schedule record not exists".to_string()))?;

        if record.status != RecordStatus::Completed {
            return Err(EngineError::Validation(
                "schedule record is not completed".to_string(),
            ));
        }

        set_status(&self.database, record.id, RecordStatus::Pending, None).await
    }

    pub(crate) async fn record_by_id(
        &self,
        schedule_id: Uuid,
    ) -> ResultEngine<Option<ScheduleRecord>> {
        find_record(&self.database, schedule_id).await
    }
}

/// Materializes a forecast into a completed record.
///
/// Returns `false` when a concurrent writer materialized the pair first and
/// that record is already completed.
async fn materialize(
    tx: &sea_orm::DatabaseTransaction,
    pen: &Pen,
    template: &TemplateItem,
    now: DateTime<Utc>,
) -> ResultEngine<bool> {
    let record = ScheduleRecord {
        id: Uuid::new_v4(),
        pen_id: pen.id,
        template_id: Some(template.id),
        vaccine_name: template.vaccine_name.clone(),
        stage: template.stage,
        scheduled_date: due_date_for(pen, template)?,
        status: RecordStatus::Completed,
        completed_at: Some(now),
    };

    match records::ActiveModel::from(&record).insert(tx).await {
        Ok(_) => Ok(true),
        Err(insert_err) => {
            // The unique index on (pen_id, template_id) fired: someone
            // materialized the pair first. Treat as already satisfied.
            match find_record_for_pair(tx, pen.id, template.id).await? {
                Some(existing) if existing.status == RecordStatus::Completed => Ok(false),
                Some(existing) => {
                    set_status(tx, existing.id, RecordStatus::Completed, Some(now)).await?;
                    Ok(true)
                }
                None => Err(insert_err.into()),
            }
        }
    }
}

async fn find_record<C: ConnectionTrait>(
    conn: &C,
    schedule_id: Uuid,
) -> ResultEngine<Option<ScheduleRecord>> {
    let model = records::Entity::find_by_id(schedule_id.to_string())
        .one(conn)
        .await?;

    model.map(ScheduleRecord::try_from).transpose()
}

async fn find_record_for_pair<C: ConnectionTrait>(
    conn: &C,
    pen_id: Uuid,
    template_id: Uuid,
) -> ResultEngine<Option<ScheduleRecord>> {
    let model = records::Entity::find()
        .filter(records::Column::PenId.eq(pen_id.to_string()))
        .filter(records::Column::TemplateId.eq(template_id.to_string()))
        .one(conn)
        .await?;

    model.map(ScheduleRecord::try_from).transpose()
}

async fn set_status<C: ConnectionTrait>(
    conn: &C,
    schedule_id: Uuid,
    status: RecordStatus,
    completed_at: Option<DateTime<Utc>>,
) -> ResultEngine<()> {
    let model = records::ActiveModel {
        id: ActiveValue::Set(schedule_id.to_string()),
        status: ActiveValue::Set(status.as_str().to_string()),
        completed_at: ActiveValue::Set(completed_at),
        ..Default::default()
    };
    model.update(conn).await?;
    Ok(())
}

//! Schedule record primitives.
//!
//! A `ScheduleRecord` is a persisted administration entry for one pen. It is
//! created either manually (ad hoc, `template_id` = `None`) or by the
//! completion service when a forecast is confirmed for the first time
//! (materialization, `template_id` set). For records with a template the pair
//! `(pen_id, template_id)` is unique; that unique index is the idempotency
//! key of the whole engine.
//!
//! `vaccine_name` and `stage` are snapshots taken at creation time, so a
//! record stays displayable in its original group even after the template it
//! came from is deleted.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Completed,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for RecordStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::Validation(format!(
                "invalid record status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: Uuid,
    pub pen_id: Uuid,
    pub template_id: Option<Uuid>,
    pub vaccine_name: String,
    pub stage: i32,
    pub scheduled_date: NaiveDate,
    pub status: RecordStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "schedule_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub pen_id: String,
    pub template_id: Option<String>,
    pub vaccine_name: String,
    pub stage: i32,
    pub scheduled_date: Date,
    pub status: String,
    pub completed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pens::Entity",
        from = "Column::PenId",
        to = "super::pens::Column::Id"
    )]
    Pens,
}

impl Related<super::pens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ScheduleRecord> for ActiveModel {
    fn from(record: &ScheduleRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            pen_id: ActiveValue::Set(record.pen_id.to_string()),
            template_id: ActiveValue::Set(record.template_id.map(|id| id.to_string())),
            vaccine_name: ActiveValue::Set(record.vaccine_name.clone()),
            stage: ActiveValue::Set(record.stage),
            scheduled_date: ActiveValue::Set(record.scheduled_date),
            status: ActiveValue::Set(record.status.as_str().to_string()),
            completed_at: ActiveValue::Set(record.completed_at),
        }
    }
}

impl TryFrom<Model> for ScheduleRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("schedule record not exists".to_string()))?,
            pen_id: Uuid::parse_str(&model.pen_id)
                .map_err(|_| EngineError::NotFound("pen not exists".to_string()))?,
            template_id: model.template_id.and_then(|s| Uuid::parse_str(&s).ok()),
            vaccine_name: model.vaccine_name,
            stage: model.stage,
            scheduled_date: model.scheduled_date,
            status: RecordStatus::try_from(model.status.as_str())?,
            completed_at: model.completed_at,
        })
    }
}

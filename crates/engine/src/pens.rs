//! Pen roster primitives.
//!
//! A `Pen` is an enclosure housing a cohort of animals that share a single
//! intake date. The roster is maintained outside the engine (see the admin
//! tool); the engine only reads it, and anchors every age computation on the
//! pen's intake date.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub id: Uuid,
    pub name: String,
    pub intake_date: NaiveDate,
}

impl Pen {
    pub fn new(name: String, intake_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            intake_date,
        }
    }

    /// Whole calendar days between the intake date and `reference`.
    ///
    /// Calendar-day truncation keeps an animal "due" for exactly one calendar
    /// day per protocol threshold.
    pub fn age_in_days(&self, reference: NaiveDate) -> ResultEngine<i64> {
        if reference < self.intake_date {
            return Err(EngineError::Validation(format!(
                "reference date {reference} precedes intake date {}",
                self.intake_date
            )));
        }
        Ok((reference - self.intake_date).num_days())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub intake_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::records::Entity")]
    ScheduleRecords,
}

impl Related<super::records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScheduleRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Pen> for ActiveModel {
    fn from(pen: &Pen) -> Self {
        Self {
            id: ActiveValue::Set(pen.id.to_string()),
            name: ActiveValue::Set(pen.name.clone()),
            intake_date: ActiveValue::Set(pen.intake_date),
        }
    }
}

impl TryFrom<Model> for Pen {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("pen not exists".to_string()))?,
            name: model.name,
            intake_date: model.intake_date,
        })
    }
}

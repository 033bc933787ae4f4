//! Protocol template primitives.
//!
//! A `TemplateItem` is one entry of the farm's vaccination protocol: which
//! vaccine, which dose ("stage") and at what age in days it is due. Items are
//! uniquely identified by id, but two items must never share the same
//! `(vaccine_id, stage)` pair; the store enforces that as a conflict.
//!
//! `vaccine_name` is denormalized from the catalog at save time so that
//! schedule records can keep a stable snapshot even after a template (or a
//! catalog entry) is deleted.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateItem {
    pub id: Uuid,
    pub vaccine_id: Uuid,
    pub vaccine_name: String,
    /// Ordinal dose number within the vaccine's protocol, starting at 1.
    pub stage: i32,
    /// Age threshold in days at which the dose becomes due.
    pub days_old: i32,
    pub dosage: String,
    pub notes: Option<String>,
}

/// Input shape for `save_templates`.
///
/// `id` absent means "create"; present means "update or create with this id".
/// The vaccine name is always re-resolved from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub id: Option<Uuid>,
    pub vaccine_id: Uuid,
    pub stage: i32,
    pub days_old: i32,
    pub dosage: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "protocol_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vaccine_id: String,
    pub vaccine_name: String,
    pub stage: i32,
    pub days_old: i32,
    pub dosage: String,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vaccines::Entity",
        from = "Column::VaccineId",
        to = "super::vaccines::Column::Id"
    )]
    Vaccines,
}

impl Related<super::vaccines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vaccines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TemplateItem> for ActiveModel {
    fn from(item: &TemplateItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id.to_string()),
            vaccine_id: ActiveValue::Set(item.vaccine_id.to_string()),
            vaccine_name: ActiveValue::Set(item.vaccine_name.clone()),
            stage: ActiveValue::Set(item.stage),
            days_old: ActiveValue::Set(item.days_old),
            dosage: ActiveValue::Set(item.dosage.clone()),
            notes: ActiveValue::Set(item.notes.clone()),
        }
    }
}

impl TryFrom<Model> for TemplateItem {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("template not exists".to_string()))?,
            vaccine_id: Uuid::parse_str(&model.vaccine_id)
                .map_err(|_| EngineError::NotFound("vaccine not exists".to_string()))?,
            vaccine_name: model.vaccine_name,
            stage: model.stage,
            days_old: model.days_old,
            dosage: model.dosage,
            notes: model.notes,
        })
    }
}

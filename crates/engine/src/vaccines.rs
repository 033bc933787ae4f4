//! Vaccine catalog primitives.
//!
//! The catalog is plain reference data owned outside the engine; it is read
//! only to resolve vaccine names and to validate the vaccine a template
//! refers to.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: Uuid,
    pub name: String,
}

impl Vaccine {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "vaccines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::templates::Entity")]
    Templates,
}

impl Related<super::templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Templates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Vaccine> for ActiveModel {
    fn from(vaccine: &Vaccine) -> Self {
        Self {
            id: ActiveValue::Set(vaccine.id.to_string()),
            name: ActiveValue::Set(vaccine.name.clone()),
        }
    }
}

impl TryFrom<Model> for Vaccine {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("vaccine not exists".to_string()))?,
            name: model.name,
        })
    }
}

//! Read access to the collaborator-owned roster and catalog tables.
//!
//! The engine never writes pens or vaccines; bootstrap happens through the
//! admin tool. A failing roster read propagates as an error instead of
//! producing a partial schedule view.

use sea_orm::{EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::{Engine, Pen, ResultEngine, Vaccine, pens, vaccines};

impl Engine {
    /// Lists the pen roster ordered by pen name.
    pub async fn list_pens(&self) -> ResultEngine<Vec<Pen>> {
        let models = pens::Entity::find()
            .order_by_asc(pens::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(Pen::try_from).collect()
    }

    /// Lists the vaccine catalog ordered by vaccine name.
    pub async fn list_vaccines(&self) -> ResultEngine<Vec<Vaccine>> {
        let models = vaccines::Entity::find()
            .order_by_asc(vaccines::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(Vaccine::try_from).collect()
    }

    pub(crate) async fn pen_by_id(&self, pen_id: Uuid) -> ResultEngine<Option<Pen>> {
        let model = pens::Entity::find_by_id(pen_id.to_string())
            .one(&self.database)
            .await?;

        model.map(Pen::try_from).transpose()
    }
}

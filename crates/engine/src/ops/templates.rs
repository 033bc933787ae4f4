//! Protocol store operations: list, batch upsert and delete of template
//! items.

use std::collections::{HashMap, HashSet};

use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, TransactionTrait};
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine, TemplateDraft, TemplateItem, templates,
};

use super::{normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Lists the configured protocol, ordered by stage then vaccine name.
    pub async fn list_templates(&self) -> ResultEngine<Vec<TemplateItem>> {
        let models = templates::Entity::find()
            .order_by_asc(templates::Column::Stage)
            .order_by_asc(templates::Column::VaccineName)
            .all(&self.database)
            .await?;

        models.into_iter().map(TemplateItem::try_from).collect()
    }

    /// Upserts a batch of template items and returns the resulting protocol.
    ///
    /// A draft without an id creates a new item; with an id it updates the
    /// existing item (or creates it under that id). The batch is rejected
    /// with a conflict when two items would share the same
    /// `(vaccine_id, stage)` pair under different ids.
    ///
    /// Protocol edits affect all future reconciliations immediately and never
    /// retroactively alter already-materialized schedule records.
    pub async fn save_templates(
        &self,
        drafts: Vec<TemplateDraft>,
    ) -> ResultEngine<Vec<TemplateItem>> {
        let vaccine_names: HashMap<Uuid, String> = self
            .list_vaccines()
            .await?
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();
        let existing = self.list_templates().await?;

        let mut prepared: Vec<TemplateItem> = Vec::with_capacity(drafts.len());
        let mut seen_pairs: HashSet<(Uuid, i32)> = HashSet::new();

        for draft in drafts {
            if draft.stage < 1 {
                return Err(EngineError::Validation(
                    "stage must be a positive dose index".to_string(),
                ));
            }
            if draft.days_old < 0 {
                return Err(EngineError::Validation(
                    "days_old must not be negative".to_string(),
                ));
            }
            let dosage = normalize_required_text(&draft.dosage, "dosage")?;
            let vaccine_name = vaccine_names
                .get(&draft.vaccine_id)
                .cloned()
                .ok_or_else(|| EngineError::NotFound("vaccine not exists".to_string()))?;
            let id = draft.id.unwrap_or_else(Uuid::new_v4);

            if !seen_pairs.insert((draft.vaccine_id, draft.stage)) {
                return Err(EngineError::Conflict(format!(
                    "duplicate template for {vaccine_name} stage {}",
                    draft.stage
                )));
            }
            if existing
                .iter()
                .any(|t| t.vaccine_id == draft.vaccine_id && t.stage == draft.stage && t.id != id)
            {
                return Err(EngineError::Conflict(format!(
                    "template for {vaccine_name} stage {} already exists",
                    draft.stage
                )));
            }

            prepared.push(TemplateItem {
                id,
                vaccine_id: draft.vaccine_id,
                vaccine_name,
                stage: draft.stage,
                days_old: draft.days_old,
                dosage,
                notes: normalize_optional_text(draft.notes.as_deref()),
            });
        }

        with_tx!(self, |tx| {
            let result: ResultEngine<()> = async {
                for item in &prepared {
                    let model = templates::ActiveModel::from(item);
                    if existing.iter().any(|t| t.id == item.id) {
                        model.update(&tx).await?;
                    } else {
                        model.insert(&tx).await?;
                    }
                }
                Ok(())
            }
            .await;
            result
        })?;

        self.list_templates().await
    }

    /// Removes a template item.
    ///
    /// Schedule records referencing the removed template are kept as-is;
    /// they stay visible under their stored name/stage snapshot and the
    /// forecast generator simply stops producing candidates for the pair.
    pub async fn delete_template(&self, template_id: Uuid) -> ResultEngine<()> {
        let model = templates::Entity::find_by_id(template_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("template not exists".to_string()))?;

        templates::Entity::delete_by_id(model.id)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    pub(crate) async fn template_by_id(
        &self,
        template_id: Uuid,
    ) -> ResultEngine<Option<TemplateItem>> {
        let model = templates::Entity::find_by_id(template_id.to_string())
            .one(&self.database)
            .await?;

        model.map(TemplateItem::try_from).transpose()
    }
}

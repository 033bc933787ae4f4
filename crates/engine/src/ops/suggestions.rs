//! The gap analyzer: diffs the configured protocol against an externally
//! supplied reference protocol.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    Engine, EngineError, RecommendedEntry, ResultEngine, Suggestion, TemplateDraft, TemplateItem,
};

impl Engine {
    /// Reference entries whose `(vaccine_id, stage)` pair is absent from the
    /// configured protocol.
    ///
    /// Entries referring to a vaccine missing from the catalog are skipped:
    /// a template cannot be authored for an unknown vaccine. The result is a
    /// pure consequence of the diff, so an accepted suggestion disappears on
    /// the next call without any extra state.
    pub async fn list_suggestions(
        &self,
        reference: &[RecommendedEntry],
    ) -> ResultEngine<Vec<Suggestion>> {
        let configured: HashSet<(Uuid, i32)> = self
            .list_templates()
            .await?
            .into_iter()
            .map(|t| (t.vaccine_id, t.stage))
            .collect();
        let vaccine_names: HashMap<Uuid, String> = self
            .list_vaccines()
            .await?
            .into_iter()
            .map(|v| (v.id, v.name))
            .collect();

        let suggestions = reference
            .iter()
            .filter(|entry| !configured.contains(&(entry.vaccine_id, entry.stage)))
            .filter_map(|entry| {
                let vaccine_name = vaccine_names.get(&entry.vaccine_id)?.clone();
                Some(Suggestion {
                    vaccine_id: entry.vaccine_id,
                    vaccine_name,
                    stage: entry.stage,
                    days_old: entry.recommended_days_old,
                    dosage: entry.dosage.clone(),
                    notes: entry.description.clone(),
                })
            })
            .collect();

        Ok(suggestions)
    }

    /// Appends a suggestion to the configured protocol, with an optional
    /// staff-supplied age override.
    pub async fn accept_suggestion(
        &self,
        suggestion: &Suggestion,
        days_old_override: Option<i32>,
    ) -> ResultEngine<TemplateItem> {
        let draft = TemplateDraft {
            id: None,
            vaccine_id: suggestion.vaccine_id,
            stage: suggestion.stage,
            days_old: days_old_override.unwrap_or(suggestion.days_old),
            dosage: suggestion.dosage.clone(),
            notes: suggestion.notes.clone(),
        };

        let saved = self.save_templates(vec![draft]).await?;
        saved
            .into_iter()
            .find(|t| t.vaccine_id == suggestion.vaccine_id && t.stage == suggestion.stage)
            .ok_or_else(|| EngineError::NotFound("template not exists".to_string()))
    }
}

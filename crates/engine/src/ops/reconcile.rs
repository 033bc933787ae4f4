//! The reconciler: merges forecast candidates with persisted schedule
//! records into grouped, status-tagged results for one date.
//!
//! The result is a pure function of current store state; nothing is cached,
//! so any protocol or record mutation is reflected by the next call.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    Engine, PenStatus, RecordStatus, ResultEngine, ScheduleRecord, VaccinationGroup, records,
    schedule::pen_status_rank,
};

use super::forecast::due_doses;

impl Engine {
    /// Builds the per-date vaccination view.
    ///
    /// For every `(vaccine_name, stage)` present on `date` the group lists
    /// each pen exactly once per obligation: forecasts as non-real pending
    /// rows, persisted records with their stored status. A completed or
    /// manually created record stays visible on its original due date, and
    /// records whose template was deleted keep showing under the name/stage
    /// snapshot captured at creation time.
    pub async fn get_vaccination_groups(
        &self,
        date: NaiveDate,
    ) -> ResultEngine<Vec<VaccinationGroup>> {
        let pens = self.list_pens().await?;
        let templates = self.list_templates().await?;

        let pair_records = records::Entity::find()
            .filter(records::Column::TemplateId.is_not_null())
            .all(&self.database)
            .await?
            .into_iter()
            .map(ScheduleRecord::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        let date_records = records::Entity::find()
            .filter(records::Column::ScheduledDate.eq(date))
            .all(&self.database)
            .await?
            .into_iter()
            .map(ScheduleRecord::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        let mut by_pair: HashMap<(Uuid, Uuid), &ScheduleRecord> = HashMap::new();
        for record in &pair_records {
            if let Some(template_id) = record.template_id {
                by_pair.insert((record.pen_id, template_id), record);
            }
        }
        let pen_names: HashMap<Uuid, &str> =
            pens.iter().map(|p| (p.id, p.name.as_str())).collect();

        // Groups keyed by (stage, vaccine_name) so the final ordering falls
        // out of the BTreeMap iteration.
        let mut groups: BTreeMap<(i32, String), Vec<PenStatus>> = BTreeMap::new();
        let mut seen_records: HashSet<Uuid> = HashSet::new();

        for dose in due_doses(&pens, &templates, date)? {
            let key = (dose.template.stage, dose.template.vaccine_name.clone());
            match by_pair.get(&(dose.pen.id, dose.template.id)) {
                Some(record) => {
                    if !seen_records.insert(record.id) {
                        continue;
                    }
                    // The stored scheduled_date is authoritative for a
                    // materialized record; later template edits must not
                    // shift it.
                    groups.entry(key).or_default().push(PenStatus {
                        pen_id: dose.pen.id,
                        pen_name: dose.pen.name.clone(),
                        is_real: true,
                        schedule_id: Some(record.id),
                        template_id: record.template_id,
                        status: record.status,
                        is_overdue: record.status == RecordStatus::Pending
                            && date > record.scheduled_date,
                        original_due_date: record.scheduled_date,
                    });
                }
                None => {
                    groups.entry(key).or_default().push(PenStatus {
                        pen_id: dose.pen.id,
                        pen_name: dose.pen.name.clone(),
                        is_real: false,
                        schedule_id: None,
                        template_id: Some(dose.template.id),
                        status: RecordStatus::Pending,
                        is_overdue: dose.is_overdue,
                        original_due_date: dose.due_date,
                    });
                }
            }
        }

        // Ad hoc records and orphaned-template records scheduled on this
        // date, grouped by their stored snapshot.
        for record in &date_records {
            if !seen_records.insert(record.id) {
                continue;
            }
            let Some(pen_name) = pen_names.get(&record.pen_id) else {
                continue;
            };
            groups
                .entry((record.stage, record.vaccine_name.clone()))
                .or_default()
                .push(PenStatus {
                    pen_id: record.pen_id,
                    pen_name: (*pen_name).to_string(),
                    is_real: true,
                    schedule_id: Some(record.id),
                    template_id: record.template_id,
                    status: record.status,
                    is_overdue: false,
                    original_due_date: record.scheduled_date,
                });
        }

        let result = groups
            .into_iter()
            .map(|((stage, vaccine_name), mut pens)| {
                pens.sort_by(|a, b| {
                    pen_status_rank(a)
                        .cmp(&pen_status_rank(b))
                        .then_with(|| a.pen_name.cmp(&b.pen_name))
                });
                VaccinationGroup {
                    vaccine_name,
                    stage,
                    total_pens: pens.len(),
                    pens,
                }
            })
            .collect();

        Ok(result)
    }
}

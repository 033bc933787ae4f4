//! Derived schedule views.
//!
//! Everything here is computed on demand from the durable stores and never
//! persisted: the reconciler re-derives the full view for a date on every
//! call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RecordStatus;

/// Key of a single selectable schedule row.
///
/// Confirmation batches mix real records and ephemeral forecasts; the tagged
/// union keeps the two addressable without ad hoc composite string keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VaccinationKey {
    /// A persisted pending record.
    Real { schedule_id: Uuid },
    /// A computed obligation not yet materialized.
    Forecast { pen_id: Uuid, template_id: Uuid },
}

/// One pen's standing inside a vaccination group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenStatus {
    pub pen_id: Uuid,
    pub pen_name: String,
    /// `true` when backed by a persisted record, `false` for a forecast.
    pub is_real: bool,
    pub schedule_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub status: RecordStatus,
    pub is_overdue: bool,
    pub original_due_date: NaiveDate,
}

/// All pens owing (or having received) one `(vaccine, stage)` dose on the
/// queried date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationGroup {
    pub vaccine_name: String,
    pub stage: i32,
    pub total_pens: usize,
    pub pens: Vec<PenStatus>,
}

/// Display rank inside a group: overdue work first, then the rest of the
/// pending rows, completed rows last.
pub(crate) fn pen_status_rank(status: &PenStatus) -> u8 {
    match (status.status, status.is_overdue) {
        (RecordStatus::Pending, true) => 0,
        (RecordStatus::Pending, false) => 1,
        (RecordStatus::Completed, _) => 2,
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Pending,
    Completed,
}

pub mod pen {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PenView {
        pub id: Uuid,
        pub name: String,
        pub intake_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PensResponse {
        pub pens: Vec<PenView>,
    }
}

pub mod schedule {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleQuery {
        /// Calendar date of the requested view (`YYYY-MM-DD`).
        pub date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PenStatusView {
        pub pen_id: Uuid,
        pub pen_name: String,
        /// `false` for a computed forecast, `true` for a persisted record.
        pub is_real: bool,
        pub schedule_id: Option<Uuid>,
        pub template_id: Option<Uuid>,
        pub status: RecordStatus,
        pub is_overdue: bool,
        pub original_due_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VaccinationGroupView {
        pub vaccine_name: String,
        pub stage: i32,
        pub total_pens: usize,
        pub pens: Vec<PenStatusView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleResponse {
        pub date: NaiveDate,
        pub groups: Vec<VaccinationGroupView>,
    }

    /// One selected row of a confirmation batch.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum MarkItem {
        Real { schedule_id: Uuid },
        Forecast { pen_id: Uuid, template_id: Uuid },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MarkRequest {
        pub items: Vec<MarkItem>,
        /// Optional administration timestamp; the server uses now() if absent.
        pub completed_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MarkResponse {
        /// Number of records actually transitioned to completed.
        pub completed: usize,
    }
}

pub mod template {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateView {
        pub id: Uuid,
        pub vaccine_id: Uuid,
        pub vaccine_name: String,
        pub stage: i32,
        pub days_old: i32,
        pub dosage: String,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplatesResponse {
        pub templates: Vec<TemplateView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateSaveItem {
        /// Absent for new items; present to update an existing item.
        pub id: Option<Uuid>,
        pub vaccine_id: Uuid,
        pub stage: i32,
        pub days_old: i32,
        pub dosage: String,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TemplateSaveRequest {
        pub items: Vec<TemplateSaveItem>,
    }
}

pub mod suggestion {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SuggestionView {
        pub vaccine_id: Uuid,
        pub vaccine_name: String,
        pub stage: i32,
        pub days_old: i32,
        pub dosage: String,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SuggestionsResponse {
        pub suggestions: Vec<SuggestionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AcceptSuggestionRequest {
        pub suggestion: SuggestionView,
        /// Staff-supplied override of the recommended age threshold.
        pub days_old: Option<i32>,
    }
}

pub mod error {
    use super::*;

    /// One rejected item of a confirmation batch, by batch position.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BatchFailureView {
        pub index: usize,
        pub reason: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub failures: Option<Vec<BatchFailureView>>,
    }
}

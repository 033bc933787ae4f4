//! Vaccination reconciliation engine.
//!
//! The engine synthesizes forecast obligations from the configured protocol
//! and each pen's age, merges them with persisted administration records into
//! a per-date view, materializes forecasts into durable records on
//! confirmation, supports reversal, and diffs the configured protocol against
//! an externally supplied reference set.

pub use error::{BatchFailure, EngineError};
pub use ops::{Engine, EngineBuilder};
pub use pens::Pen;
pub use records::{RecordStatus, ScheduleRecord};
pub use reference::{RecommendedEntry, Suggestion};
pub use schedule::{PenStatus, VaccinationGroup, VaccinationKey};
pub use templates::{TemplateDraft, TemplateItem};
pub use vaccines::Vaccine;

mod error;
mod ops;
pub mod pens;
pub mod records;
mod reference;
mod schedule;
pub mod templates;
pub mod vaccines;

type ResultEngine<T> = Result<T, EngineError>;

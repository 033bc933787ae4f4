//! The module contains the errors the engine can throw.
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single rejected item of a `mark_vaccinated` batch.
///
/// `index` is the position of the item in the submitted batch, so callers can
/// report exactly which entries failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub index: usize,
    pub reason: String,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Batch rejected: {}", format_failures(.0))]
    BatchRejected(Vec<BatchFailure>),
    #[error(transparent)]
    Database(#[from] DbErr),
}

fn format_failures(failures: &[BatchFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("item {}: {}", f.index, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Unavailable(a), Self::Unavailable(b)) => a == b,
            (Self::BatchRejected(a), Self::BatchRejected(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

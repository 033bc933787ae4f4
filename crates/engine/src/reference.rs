//! Reference protocol primitives.
//!
//! The reference protocol is a canonical set of recommended doses supplied
//! from outside the engine (the deployable loads it from a TOML file). The
//! gap analyzer diffs it against the configured templates; the engine never
//! stores it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recommended dose of the externally supplied reference protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedEntry {
    pub vaccine_id: Uuid,
    pub stage: i32,
    pub recommended_days_old: i32,
    pub dosage: String,
    pub description: Option<String>,
}

/// A reference entry missing from the configured protocol, shaped like a
/// template so it can be accepted as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub vaccine_id: Uuid,
    pub vaccine_name: String,
    pub stage: i32,
    pub days_old: i32,
    pub dosage: String,
    pub notes: Option<String>,
}

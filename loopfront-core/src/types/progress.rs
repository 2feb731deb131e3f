//! Progress and audit reporting types.

use serde::{Deserialize, Serialize};

/// Per-item failure detail accumulated during a backfill run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillError {
    pub id: String,
    pub title: String,
    pub reason: String,
}

/// Snapshot of a backfill run. Counters grow monotonically; the orchestrator
/// clones the snapshot before every callback emission so observers never see
/// it mutated out from under them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillProgress {
    pub total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Title of the in-flight item, if any.
    pub current: Option<String>,
    pub errors: Vec<BackfillError>,
}

impl BackfillProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }
}

/// One item violating the ready-thumbnail invariant, with the specific
/// conditions it fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidThumb {
    pub id: String,
    pub title: String,
    pub problems: Vec<String>,
}

/// Outcome of a read-only consistency sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: Vec<InvalidThumb>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

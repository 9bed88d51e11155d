//! Execution results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one `execute` call, recorded on its tracing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    /// Creates a new random execution ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a successful execution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A pass matched no rule and changed no variable.
    Converged,
    /// A rule completed the run.
    Halted,
}

/// Summary of a finished execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub execution_id: ExecutionId,
    pub knowledge_base: String,
    pub version: String,
    /// [`KnowledgeBase::fingerprint`](crate::KnowledgeBase::fingerprint) of the ruleset.
    pub fingerprint: String,
    pub outcome: Outcome,
    /// Number of evaluate-then-fire passes run.
    pub passes: u64,
    /// Number of rule firings whose actions all succeeded.
    pub rules_fired: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionReport {
    #[must_use]
    pub const fn converged(&self) -> bool {
        matches!(self.outcome, Outcome::Converged)
    }

    #[must_use]
    pub const fn halted(&self) -> bool {
        matches!(self.outcome, Outcome::Halted)
    }
}

//! Per-alarm outcomes and the aggregate run report.

use serde::{Deserialize, Serialize};

use crate::types::ComparisonOperator;

/// Why an alarm was considered but left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    /// No forward rule matched.
    #[serde(rename = "skip")]
    NoMatch,
    #[serde(rename = "skip(no-rollback-match)")]
    NoRollbackMatch,
    /// Memory alarm whose prior baseline cannot be determined.
    #[serde(rename = "skip(mem-ambiguous)")]
    Ambiguous,
    #[serde(rename = "skip(no-snapshot)")]
    NoSnapshot,
    /// Live alarm already matches the captured definition.
    #[serde(rename = "skip(already-reverted)")]
    AlreadyReverted,
    #[serde(rename = "skip(has-description)")]
    HasDescription,
    #[serde(rename = "skip(no-description)")]
    NoDescription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayStatus {
    Reverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStatus {
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    Migrated {
        name: String,
        from: f64,
        to: f64,
        dry_run: bool,
    },
    Restored {
        name: String,
        restored_to: f64,
        op: ComparisonOperator,
        dry_run: bool,
    },
    Reverted {
        name: String,
        status: ReplayStatus,
        dry_run: bool,
    },
    Described {
        name: String,
        desc_set: bool,
        dry_run: bool,
    },
    Skipped {
        name: String,
        status: SkipReason,
    },
    Failed {
        name: String,
        status: FailureStatus,
        detail: String,
    },
}

impl ItemOutcome {
    pub fn skipped(name: impl Into<String>, reason: SkipReason) -> Self {
        Self::Skipped {
            name: name.into(),
            status: reason,
        }
    }

    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            status: FailureStatus::Error,
            detail: detail.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Migrated { name, .. }
            | Self::Restored { name, .. }
            | Self::Reverted { name, .. }
            | Self::Described { name, .. }
            | Self::Skipped { name, .. }
            | Self::Failed { name, .. } => name,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// True when the item reached the mutation step (live or dry-run).
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Skipped { .. } | Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub result: String,
    pub count: usize,
    pub items: Vec<ItemOutcome>,
}

impl Report {
    pub fn new(result: impl Into<String>, items: Vec<ItemOutcome>) -> Self {
        Self {
            result: result.into(),
            count: items.len(),
            items,
        }
    }

    pub fn changed(&self) -> usize {
        self.items.iter().filter(|i| i.is_change()).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.iter().filter(|i| i.skip_reason().is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| i.is_failure()).count()
    }

    pub fn get(&self, name: &str) -> Option<&ItemOutcome> {
        self.items.iter().find(|i| i.name() == name)
    }
}

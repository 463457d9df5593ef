//! Engine settings resolved once at start-up.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alarmshift_core::{MemoryResolver, RuleSet};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEM_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_DESCRIPTION_DELAY: Duration = Duration::from_millis(30);

/// Rule families that the description pass never touches.
pub const UNDESCRIBED_FAMILIES: &[&str] = &["windows-service"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackStrategy {
    /// Re-apply the inverse rule table, resolving memory baselines by name.
    #[default]
    Inverse,
    /// Write back the captured `rollback` (or `before`) definition.
    Snapshot,
}

impl RollbackStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inverse => "inverse",
            Self::Snapshot => "snapshot",
        }
    }
}

impl fmt::Display for RollbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RollbackStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inverse" => Ok(Self::Inverse),
            "snapshot" => Ok(Self::Snapshot),
            other => Err(format!("unknown rollback strategy: {other}")),
        }
    }
}

/// Description text per rule family. Blank texts count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionTable {
    texts: BTreeMap<String, String>,
}

impl DescriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, family: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(family, text);
        self
    }

    pub fn insert(&mut self, family: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(family.into(), text.into());
    }

    pub fn get(&self, family: &str) -> Option<&str> {
        self.texts
            .get(family)
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub rules: RuleSet,
    pub memory: MemoryResolver,
    /// Also pin evaluation periods and datapoints-to-alarm to 1 on migrate.
    pub force_min_sensitivity: bool,
    pub item_delay: Duration,
    pub description_delay: Duration,
    pub rollback_strategy: RollbackStrategy,
    pub descriptions: DescriptionTable,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rules: RuleSet::builtin(),
            memory: MemoryResolver::default(),
            force_min_sensitivity: false,
            item_delay: DEFAULT_ITEM_DELAY,
            description_delay: DEFAULT_DESCRIPTION_DELAY,
            rollback_strategy: RollbackStrategy::default(),
            descriptions: DescriptionTable::default(),
        }
    }
}

impl EngineSettings {
    /// Same settings with both delays zeroed. Used by tests and dry tooling.
    pub fn without_delays(mut self) -> Self {
        self.item_delay = Duration::ZERO;
        self.description_delay = Duration::ZERO;
        self
    }
}

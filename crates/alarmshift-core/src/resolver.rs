//! Memory baseline resolver.
//!
//! Every `Memory Available Bytes` alarm was coerced to the same sentinel
//! threshold, so which baseline it had before cannot be read back from the
//! alarm itself. The alarm name usually says it; failing that a configured
//! fallback is used; failing that the alarm is unresolvable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{AlarmDefinition, ComparisonOperator};

pub const MEMORY_METRIC: &str = "Memory Available Bytes";
/// Threshold that effectively disables the memory alarm.
pub const MEMORY_SENTINEL: f64 = 1_000_000_000_000.0;
/// ≈1.6 GiB baseline.
pub const MEMORY_1_6G: f64 = 1_717_986_918.0;
/// ≈3.2 GiB baseline.
pub const MEMORY_3_2G: f64 = 3_435_973_836.0;

const HINTS_3_2G: &[&str] = &["3.2", "3200", "3g", "3gb", "3276", "3435"];
const HINTS_1_6G: &[&str] = &["1.6", "1600", "1g", "1gb", "1717"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryBaseline {
    #[serde(rename = "1.6G")]
    Gb1_6,
    #[serde(rename = "3.2G")]
    Gb3_2,
}

impl MemoryBaseline {
    pub fn threshold(self) -> f64 {
        match self {
            Self::Gb1_6 => MEMORY_1_6G,
            Self::Gb3_2 => MEMORY_3_2G,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gb1_6 => "1.6G",
            Self::Gb3_2 => "3.2G",
        }
    }

    /// Baseline hinted at by the alarm name. 3.2G hints are checked first.
    pub fn from_name(alarm_name: &str) -> Option<Self> {
        let name = alarm_name.to_lowercase();
        if HINTS_3_2G.iter().any(|h| name.contains(h)) {
            Some(Self::Gb3_2)
        } else if HINTS_1_6G.iter().any(|h| name.contains(h)) {
            Some(Self::Gb1_6)
        } else {
            None
        }
    }
}

impl fmt::Display for MemoryBaseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryBaseline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1.6G" => Ok(Self::Gb1_6),
            "3.2G" => Ok(Self::Gb3_2),
            other => Err(format!("expected 1.6G or 3.2G, got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryResolver {
    fallback: Option<MemoryBaseline>,
}

impl MemoryResolver {
    pub fn new(fallback: Option<MemoryBaseline>) -> Self {
        Self { fallback }
    }

    pub fn fallback(&self) -> Option<MemoryBaseline> {
        self.fallback
    }

    /// True for a memory alarm parked on the sentinel threshold.
    pub fn is_sentinel(&self, def: &AlarmDefinition) -> bool {
        def.metric_name == MEMORY_METRIC
            && def.comparison_operator == ComparisonOperator::LessThanOrEqual
            && def.threshold == MEMORY_SENTINEL
    }

    /// Prior threshold for the named alarm, or `None` when it cannot be
    /// determined. Never guesses.
    pub fn resolve(&self, alarm_name: &str) -> Option<f64> {
        MemoryBaseline::from_name(alarm_name)
            .or(self.fallback)
            .map(MemoryBaseline::threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hint_3_2_wins_over_fallback() {
        for fallback in [None, Some(MemoryBaseline::Gb1_6), Some(MemoryBaseline::Gb3_2)] {
            let resolver = MemoryResolver::new(fallback);
            assert_eq!(resolver.resolve("db-01 memory 3.2GB free"), Some(MEMORY_3_2G));
        }
    }

    #[test]
    fn name_hint_1_6() {
        let resolver = MemoryResolver::new(Some(MemoryBaseline::Gb3_2));
        assert_eq!(resolver.resolve("web-02-mem-1.6"), Some(MEMORY_1_6G));
        assert_eq!(resolver.resolve("WEB-02 MEM 1600MB"), Some(MEMORY_1_6G));
    }

    #[test]
    fn hint_matching_is_case_insensitive() {
        assert_eq!(MemoryBaseline::from_name("APP 3GB"), Some(MemoryBaseline::Gb3_2));
        assert_eq!(MemoryBaseline::from_name("APP 1G"), Some(MemoryBaseline::Gb1_6));
    }

    #[test]
    fn both_hints_prefers_3_2() {
        assert_eq!(MemoryBaseline::from_name("mem 1.6 to 3.2"), Some(MemoryBaseline::Gb3_2));
    }

    #[test]
    fn fallback_used_without_hint() {
        let resolver = MemoryResolver::new(Some(MemoryBaseline::Gb1_6));
        assert_eq!(resolver.resolve("web-02 memory"), Some(MEMORY_1_6G));
    }

    #[test]
    fn unresolvable_without_hint_or_fallback() {
        let resolver = MemoryResolver::default();
        for _ in 0..3 {
            assert_eq!(resolver.resolve("web-02 memory"), None);
        }
    }

    #[test]
    fn parses_fallback_setting() {
        assert_eq!("1.6G".parse::<MemoryBaseline>(), Ok(MemoryBaseline::Gb1_6));
        assert_eq!("3.2g".parse::<MemoryBaseline>(), Ok(MemoryBaseline::Gb3_2));
        assert!("2G".parse::<MemoryBaseline>().is_err());
    }
}

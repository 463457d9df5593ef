//! Declarative rule tables and the first-match matcher.
//!
//! A rule pairs a metric-name filter and an exact `(operator, threshold)`
//! predicate with the `(operator, threshold)` to write instead. Tables are
//! evaluated in declaration order and the first matching rule wins; table
//! authors order rules from most to least specific.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::RuleFileError;
use crate::resolver::{MEMORY_1_6G, MEMORY_3_2G, MEMORY_METRIC, MEMORY_SENTINEL};
use crate::types::{AlarmDefinition, ComparisonOperator};

// ─── Metric Filter ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFilter {
    /// Metric name must equal this string exactly.
    Exact(String),
    /// Every token must occur in the metric name (case-insensitive).
    Contains(Vec<String>),
}

impl MetricFilter {
    pub fn contains<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Contains(tokens.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, metric_name: &str) -> bool {
        match self {
            Self::Exact(name) => metric_name == name,
            Self::Contains(tokens) => {
                let lower = metric_name.to_lowercase();
                tokens.iter().all(|t| lower.contains(&t.to_lowercase()))
            }
        }
    }
}

// ─── Condition & Rule ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub op: ComparisonOperator,
    pub threshold: f64,
}

impl Condition {
    pub const fn new(op: ComparisonOperator, threshold: f64) -> Self {
        Self { op, threshold }
    }

    /// Exact equality, thresholds are machine-set literals.
    pub fn holds_for(&self, def: &AlarmDefinition) -> bool {
        def.comparison_operator == self.op && def.threshold == self.threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub family: String,
    pub metric: MetricFilter,
    #[serde(rename = "match")]
    pub when: Condition,
    pub set: Condition,
}

impl Rule {
    pub fn matches(&self, def: &AlarmDefinition) -> bool {
        self.metric.matches(&def.metric_name) && self.when.holds_for(def)
    }

    /// True when the alarm already sits on this rule's target.
    pub fn sits_on_target(&self, def: &AlarmDefinition) -> bool {
        self.metric.matches(&def.metric_name) && self.set.holds_for(def)
    }

    /// Copy of `def` with only operator and threshold rewritten.
    pub fn apply(&self, def: &AlarmDefinition) -> AlarmDefinition {
        AlarmDefinition {
            comparison_operator: self.set.op,
            threshold: self.set.threshold,
            ..def.clone()
        }
    }

    fn check(&self) -> Result<(), RuleFileError> {
        let invalid = |detail: &str| RuleFileError::Invalid {
            id: self.id.clone(),
            detail: detail.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        match &self.metric {
            MetricFilter::Exact(name) if name.is_empty() => {
                return Err(invalid("exact metric filter is empty"));
            }
            MetricFilter::Contains(tokens) if tokens.is_empty() || tokens.iter().any(String::is_empty) => {
                return Err(invalid("contains filter needs non-empty tokens"));
            }
            _ => {}
        }
        if !self.when.threshold.is_finite() || !self.set.threshold.is_finite() {
            return Err(invalid("thresholds must be finite"));
        }
        Ok(())
    }
}

// ─── Rule Table ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// First rule, in declaration order, matching the alarm.
    pub fn find_match(&self, def: &AlarmDefinition) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(def))
    }

    /// First rule whose target the alarm currently sits on.
    pub fn find_target(&self, def: &AlarmDefinition) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.sits_on_target(def))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ─── Rule Set ────────────────────────────────────────────────────

/// Forward table plus its hand-authored inverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub forward: RuleTable,
    #[serde(default)]
    pub inverse: RuleTable,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn rule(
    id: &str,
    family: &str,
    metric: MetricFilter,
    when: (ComparisonOperator, f64),
    set: (ComparisonOperator, f64),
) -> Rule {
    Rule {
        id: id.to_string(),
        family: family.to_string(),
        metric,
        when: Condition::new(when.0, when.1),
        set: Condition::new(set.0, set.1),
    }
}

impl RuleSet {
    pub fn builtin() -> Self {
        use ComparisonOperator::{GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual};

        let disk = MetricFilter::contains(["% Free Space"]);
        let memory = MetricFilter::Exact(MEMORY_METRIC.to_string());
        let cpu = MetricFilter::contains(["% Processor Time"]);
        let status_instance = MetricFilter::Exact("StatusCheckFailed_Instance".to_string());
        let status_system = MetricFilter::Exact("StatusCheckFailed_System".to_string());
        let windows_service = MetricFilter::contains(["windows", "service", "status"]);

        let forward = RuleTable::new(vec![
            rule("disk-free-space", "disk", disk.clone(), (LessThanOrEqual, 10.0), (LessThanOrEqual, 99.5)),
            rule("memory-available-1.6g", "memory", memory.clone(), (LessThanOrEqual, MEMORY_1_6G), (LessThanOrEqual, MEMORY_SENTINEL)),
            rule("memory-available-3.2g", "memory", memory, (LessThanOrEqual, MEMORY_3_2G), (LessThanOrEqual, MEMORY_SENTINEL)),
            rule("cpu-processor-time", "cpu", cpu.clone(), (GreaterThan, 90.0), (GreaterThan, 1.0)),
            rule("status-check-instance", "status-instance", status_instance.clone(), (GreaterThanOrEqual, 1.0), (GreaterThanOrEqual, 0.0)),
            rule("status-check-system", "status-system", status_system.clone(), (GreaterThanOrEqual, 1.0), (GreaterThanOrEqual, 0.0)),
            rule("windows-service-status", "windows-service", windows_service.clone(), (LessThan, 1.0), (GreaterThanOrEqual, 0.0)),
        ]);

        // Memory has no inverse row: its prior value is resolved from the name.
        let inverse = RuleTable::new(vec![
            rule("disk-free-space", "disk", disk, (LessThanOrEqual, 99.5), (LessThanOrEqual, 10.0)),
            rule("cpu-processor-time", "cpu", cpu, (GreaterThan, 1.0), (GreaterThan, 90.0)),
            rule("status-check-instance", "status-instance", status_instance, (GreaterThanOrEqual, 0.0), (GreaterThanOrEqual, 1.0)),
            rule("status-check-system", "status-system", status_system, (GreaterThanOrEqual, 0.0), (GreaterThanOrEqual, 1.0)),
            rule("windows-service-status", "windows-service", windows_service, (GreaterThanOrEqual, 0.0), (LessThan, 1.0)),
        ]);

        Self { forward, inverse }
    }

    /// Parse a rule file. Both tables are replaced; a table missing from
    /// the file is empty.
    pub fn from_toml(s: &str) -> Result<Self, RuleFileError> {
        let set: Self = toml::from_str(s)?;
        for rule in set.forward.rules().iter().chain(set.inverse.rules()) {
            rule.check()?;
        }
        Ok(set)
    }

    pub fn load(path: &Path) -> Result<Self, RuleFileError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlarmActions, StatisticSpec, TreatMissingData};

    fn alarm(metric: &str, op: ComparisonOperator, threshold: f64) -> AlarmDefinition {
        AlarmDefinition {
            name: "app-01".to_string(),
            metric_name: metric.to_string(),
            namespace: "CWAgent".to_string(),
            comparison_operator: op,
            threshold,
            dimensions: Vec::new(),
            period: 300,
            evaluation_periods: Some(3),
            datapoints_to_alarm: Some(2),
            statistic: StatisticSpec::Standard("Average".to_string()),
            unit: None,
            actions: AlarmActions::default(),
            actions_enabled: true,
            description: None,
            treat_missing_data: TreatMissingData::Missing,
            evaluate_low_sample_count_percentile: None,
        }
    }

    #[test]
    fn cpu_alarm_matches_rule_three() {
        let set = RuleSet::builtin();
        let def = alarm("Processor % Processor Time", ComparisonOperator::GreaterThan, 90.0);
        let rule = set.forward.find_match(&def).expect("match");
        assert_eq!(rule.id, "cpu-processor-time");
        assert_eq!(set.forward.rules()[3].id, rule.id);

        let migrated = rule.apply(&def);
        assert_eq!(migrated.threshold, 1.0);
        assert_eq!(migrated.comparison_operator, ComparisonOperator::GreaterThan);
        assert_eq!(migrated.evaluation_periods, Some(3));
        assert_eq!(migrated.datapoints_to_alarm, Some(2));
    }

    #[test]
    fn threshold_equality_is_exact() {
        let set = RuleSet::builtin();
        let near = alarm("Processor % Processor Time", ComparisonOperator::GreaterThan, 90.000_001);
        assert!(set.forward.find_match(&near).is_none());
        let wrong_op = alarm("Processor % Processor Time", ComparisonOperator::GreaterThanOrEqual, 90.0);
        assert!(set.forward.find_match(&wrong_op).is_none());
    }

    #[test]
    fn contains_filter_is_case_insensitive_and_requires_all_tokens() {
        let filter = MetricFilter::contains(["windows", "service", "status"]);
        assert!(filter.matches("Windows Service Status W3SVC"));
        assert!(!filter.matches("Windows Service Uptime"));
        assert!(!MetricFilter::Exact("Memory Available Bytes".to_string())
            .matches("memory available bytes"));
    }

    #[test]
    fn first_match_wins_on_overlap() {
        let broad = rule(
            "broad",
            "cpu",
            MetricFilter::contains(["processor"]),
            (ComparisonOperator::GreaterThan, 90.0),
            (ComparisonOperator::GreaterThan, 5.0),
        );
        let narrow = rule(
            "narrow",
            "cpu",
            MetricFilter::contains(["% processor time"]),
            (ComparisonOperator::GreaterThan, 90.0),
            (ComparisonOperator::GreaterThan, 1.0),
        );
        let def = alarm("Processor % Processor Time", ComparisonOperator::GreaterThan, 90.0);
        let table = RuleTable::new(vec![broad, narrow]);
        assert_eq!(table.find_match(&def).map(|r| r.id.as_str()), Some("broad"));
    }

    #[test]
    fn inverse_rows_mirror_forward_rows() {
        let set = RuleSet::builtin();
        for inv in set.inverse.rules() {
            let fwd = set.forward.get(&inv.id).expect("forward row");
            assert_eq!(inv.when, fwd.set);
            assert_eq!(inv.set, fwd.when);
            assert_eq!(inv.metric, fwd.metric);
        }
        assert!(set.inverse.rules().iter().all(|r| r.family != "memory"));
    }

    #[test]
    fn forward_then_inverse_restores_bit_for_bit() {
        let set = RuleSet::builtin();
        for fwd in set.forward.rules().iter().filter(|r| r.family != "memory") {
            let metric = match &fwd.metric {
                MetricFilter::Exact(name) => name.clone(),
                MetricFilter::Contains(tokens) => tokens.join(" "),
            };
            let original = alarm(&metric, fwd.when.op, fwd.when.threshold);
            let migrated = set.forward.find_match(&original).expect("forward").apply(&original);
            let restored = set.inverse.find_match(&migrated).expect("inverse").apply(&migrated);
            assert_eq!(restored.comparison_operator, original.comparison_operator, "{}", fwd.id);
            assert_eq!(
                restored.threshold.to_bits(),
                original.threshold.to_bits(),
                "{}",
                fwd.id
            );
        }
    }

    #[test]
    fn find_target_locates_migrated_alarm() {
        let set = RuleSet::builtin();
        let def = alarm("LogicalDisk % Free Space", ComparisonOperator::LessThanOrEqual, 99.5);
        assert_eq!(set.forward.find_target(&def).map(|r| r.family.as_str()), Some("disk"));
    }

    #[test]
    fn parses_rule_file() {
        let toml = r#"
            [[forward]]
            id = "cpu"
            family = "cpu"
            metric = { contains = ["% processor time"] }
            match = { op = "GreaterThanThreshold", threshold = 80.0 }
            set = { op = "GreaterThanThreshold", threshold = 1.0 }

            [[inverse]]
            id = "cpu"
            family = "cpu"
            metric = { contains = ["% processor time"] }
            match = { op = "GreaterThanThreshold", threshold = 1.0 }
            set = { op = "GreaterThanThreshold", threshold = 80.0 }
        "#;
        let set = RuleSet::from_toml(toml).expect("parse");
        assert_eq!(set.forward.len(), 1);
        assert_eq!(set.inverse.rules()[0].set.threshold, 80.0);
    }

    #[test]
    fn rule_file_without_inverse_has_empty_inverse() {
        let toml = r#"
            [[forward]]
            id = "status"
            family = "status-instance"
            metric = { exact = "StatusCheckFailed_Instance" }
            match = { op = "GreaterThanOrEqualToThreshold", threshold = 1.0 }
            set = { op = "GreaterThanOrEqualToThreshold", threshold = 0.0 }
        "#;
        let set = RuleSet::from_toml(toml).expect("parse");
        assert!(set.inverse.is_empty());
    }

    #[test]
    fn rule_file_with_empty_tokens_rejected() {
        let toml = r#"
            [[forward]]
            id = "bad"
            family = "cpu"
            metric = { contains = [] }
            match = { op = "GreaterThanThreshold", threshold = 80.0 }
            set = { op = "GreaterThanThreshold", threshold = 1.0 }
        "#;
        assert!(matches!(
            RuleSet::from_toml(toml),
            Err(RuleFileError::Invalid { id, .. }) if id == "bad"
        ));
    }

    #[test]
    fn malformed_rule_file_is_parse_error() {
        assert!(matches!(
            RuleSet::from_toml("[[forward]]\nid = 3"),
            Err(RuleFileError::Parse(_))
        ));
    }
}

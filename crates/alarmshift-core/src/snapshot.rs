//! Labeled snapshot documents.
//!
//! One document per alarm. Merging a label replaces that label only;
//! every other label already in the document is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::types::AlarmDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotLabel {
    Before,
    After,
    Rollback,
    Described,
}

impl SnapshotLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Rollback => "rollback",
            Self::Described => "described",
        }
    }
}

impl fmt::Display for SnapshotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub alarm_name: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: BTreeMap<SnapshotLabel, AlarmDefinition>,
}

impl SnapshotDocument {
    pub fn new(alarm_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            alarm_name: alarm_name.into(),
            updated_at: now,
            labels: BTreeMap::new(),
        }
    }

    pub fn merge(&mut self, label: SnapshotLabel, def: AlarmDefinition, now: DateTime<Utc>) {
        self.labels.insert(label, def);
        self.updated_at = now;
    }

    pub fn get(&self, label: SnapshotLabel) -> Option<&AlarmDefinition> {
        self.labels.get(&label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlarmActions, ComparisonOperator, StatisticSpec, TreatMissingData};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid")
            .with_timezone(&Utc)
    }

    fn def(threshold: f64) -> AlarmDefinition {
        AlarmDefinition {
            name: "web-01 cpu".to_string(),
            metric_name: "Processor % Processor Time".to_string(),
            namespace: "CWAgent".to_string(),
            comparison_operator: ComparisonOperator::GreaterThan,
            threshold,
            dimensions: Vec::new(),
            period: 60,
            evaluation_periods: Some(1),
            datapoints_to_alarm: None,
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
    fn merge_keeps_other_labels() {
        let mut doc = SnapshotDocument::new("web-01 cpu", ts("2026-10-01T00:00:00Z"));
        doc.merge(SnapshotLabel::Before, def(90.0), ts("2026-10-01T00:00:00Z"));
        doc.merge(SnapshotLabel::After, def(1.0), ts("2026-10-01T00:00:05Z"));

        assert_eq!(doc.get(SnapshotLabel::Before).map(|d| d.threshold), Some(90.0));
        assert_eq!(doc.get(SnapshotLabel::After).map(|d| d.threshold), Some(1.0));
        assert_eq!(doc.updated_at, ts("2026-10-01T00:00:05Z"));
    }

    #[test]
    fn merge_same_label_replaces() {
        let now = ts("2026-10-01T00:00:00Z");
        let mut doc = SnapshotDocument::new("web-01 cpu", now);
        doc.merge(SnapshotLabel::Rollback, def(90.0), now);
        doc.merge(SnapshotLabel::Rollback, def(80.0), now);
        assert_eq!(doc.labels.len(), 1);
        assert_eq!(doc.get(SnapshotLabel::Rollback).map(|d| d.threshold), Some(80.0));
    }

    #[test]
    fn labels_serialize_as_lowercase_keys() {
        let now = ts("2026-10-01T00:00:00Z");
        let mut doc = SnapshotDocument::new("web-01 cpu", now);
        doc.merge(SnapshotLabel::Before, def(90.0), now);
        let value = serde_json::to_value(&doc).expect("encode");
        assert_eq!(value["labels"]["before"]["threshold"], 90.0);
        assert_eq!(value["alarmName"], "web-01 cpu");

        let back: SnapshotDocument = serde_json::from_value(value).expect("decode");
        assert_eq!(back, doc);
    }
}

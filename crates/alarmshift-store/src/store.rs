//! Snapshot store: read-merge-write of labeled alarm captures.
//!
//! Writers to the same key are not coordinated. Two concurrent runs
//! touching one alarm can lose a label; runs are expected to be serial.

use alarmshift_core::{AlarmDefinition, SnapshotDocument, SnapshotLabel};
use chrono::Utc;

use crate::backend::SnapshotBackend;
use crate::error::StoreError;

/// Storage key for an alarm name. Bytes outside `[A-Za-z0-9._-]` are
/// escaped as `%XX`, so distinct names never share a key.
pub fn snapshot_key(alarm_name: &str) -> String {
    let mut key = String::with_capacity(alarm_name.len());
    for byte in alarm_name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            key.push(byte as char);
        } else {
            key.push_str(&format!("%{byte:02X}"));
        }
    }
    key
}

pub struct SnapshotStore<B> {
    backend: B,
}

impl<B: SnapshotBackend> SnapshotStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn read(&self, alarm_name: &str) -> Result<Option<SnapshotDocument>, StoreError> {
        match self.backend.get(&snapshot_key(alarm_name))? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Merge `def` under `label` into the stored document, keeping every
    /// other label. Returns the document as written.
    pub fn merge_write(
        &self,
        alarm_name: &str,
        label: SnapshotLabel,
        def: &AlarmDefinition,
    ) -> Result<SnapshotDocument, StoreError> {
        let now = Utc::now();
        let mut doc = self
            .read(alarm_name)?
            .unwrap_or_else(|| SnapshotDocument::new(alarm_name, now));
        doc.merge(label, def.clone(), now);

        let body = serde_json::to_string(&doc)?;
        self.backend.put(&snapshot_key(alarm_name), &body)?;
        tracing::debug!(alarm = %alarm_name, %label, "snapshot merged");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::parameter::ParameterBackend;
    use alarmshift_core::{
        AlarmActions, ComparisonOperator, StatisticSpec, TreatMissingData,
    };

    fn def(threshold: f64) -> AlarmDefinition {
        AlarmDefinition {
            name: "web-01 / cpu".to_string(),
            metric_name: "Processor % Processor Time".to_string(),
            namespace: "CWAgent".to_string(),
            comparison_operator: ComparisonOperator::GreaterThan,
            threshold,
            dimensions: Vec::new(),
            period: 300,
            evaluation_periods: Some(3),
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
    fn key_escaping() {
        assert_eq!(snapshot_key("web-01_cpu.v2"), "web-01_cpu.v2");
        assert_eq!(snapshot_key("web-01 / cpu"), "web-01%20%2F%20cpu");
        assert_ne!(snapshot_key("a/b"), snapshot_key("a_b"));
        assert_eq!(snapshot_key("メモリ"), "%E3%83%A1%E3%83%A2%E3%83%AA");
    }

    #[test]
    fn read_missing_is_none() {
        let store = SnapshotStore::new(MemoryBackend::new());
        assert!(store.read("nope").expect("read").is_none());
    }

    #[test]
    fn after_does_not_clobber_before() {
        let store = SnapshotStore::new(MemoryBackend::new());
        store
            .merge_write("web-01 / cpu", SnapshotLabel::Before, &def(90.0))
            .expect("before");
        store
            .merge_write("web-01 / cpu", SnapshotLabel::After, &def(1.0))
            .expect("after");

        let doc = store.read("web-01 / cpu").expect("read").expect("present");
        assert_eq!(doc.get(SnapshotLabel::Before).map(|d| d.threshold), Some(90.0));
        assert_eq!(doc.get(SnapshotLabel::After).map(|d| d.threshold), Some(1.0));
        assert_eq!(doc.alarm_name, "web-01 / cpu");
    }

    #[test]
    fn later_label_merges_into_existing_document() {
        let store = SnapshotStore::new(MemoryBackend::new());
        store
            .merge_write("web-01 / cpu", SnapshotLabel::Before, &def(90.0))
            .expect("before");
        store
            .merge_write("web-01 / cpu", SnapshotLabel::After, &def(1.0))
            .expect("after");
        let doc = store
            .merge_write("web-01 / cpu", SnapshotLabel::Described, &def(1.0))
            .expect("described");
        assert_eq!(doc.labels.len(), 3);
    }

    #[test]
    fn corrupt_document_is_decode_error() {
        let backend = MemoryBackend::new();
        backend.put(&snapshot_key("x"), "not json").expect("put");
        let store = SnapshotStore::new(backend);
        assert!(matches!(store.read("x"), Err(StoreError::Decode(_))));
        assert!(store.merge_write("x", SnapshotLabel::Before, &def(1.0)).is_err());
    }

    #[test]
    fn works_over_parameter_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(ParameterBackend::new(dir.path(), "snaps"));
        store
            .merge_write("web-01 / cpu", SnapshotLabel::Before, &def(90.0))
            .expect("before");
        store
            .merge_write("web-01 / cpu", SnapshotLabel::Rollback, &def(90.0))
            .expect("rollback");
        let doc = store.read("web-01 / cpu").expect("read").expect("present");
        assert_eq!(doc.labels.len(), 2);
    }
}

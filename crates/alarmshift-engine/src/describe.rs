//! Description pass: fill the empty description of alarms that already
//! sit on a migrated threshold.

use alarmshift_core::{AlarmDefinition, ItemOutcome, Report, SkipReason, SnapshotLabel};
use alarmshift_store::{AlarmApi, ListError, SnapshotBackend, list_alarms};

use crate::error::ItemError;
use crate::migrator::{Migrator, RunOptions};
use crate::settings::UNDESCRIBED_FAMILIES;

pub const RESULT_DESC_SET: &str = "desc_set";

impl<A: AlarmApi, B: SnapshotBackend> Migrator<A, B> {
    pub async fn set_descriptions(&self, opts: &RunOptions) -> Report {
        self.set_descriptions_for(list_alarms(&self.api), opts).await
    }

    pub async fn set_descriptions_for<I>(&self, alarms: I, opts: &RunOptions) -> Report
    where
        I: IntoIterator<Item = Result<AlarmDefinition, ListError>>,
    {
        let items = self
            .drive(alarms, opts, self.settings.description_delay, |def| {
                self.describe_one(def, opts.dry_run)
            })
            .await;
        self.finish(RESULT_DESC_SET, items, opts)
    }

    fn description_for(&self, def: &AlarmDefinition) -> Option<&str> {
        let rule = self.settings.rules.forward.find_target(def)?;
        if UNDESCRIBED_FAMILIES.contains(&rule.family.as_str()) {
            return None;
        }
        self.settings.descriptions.get(&rule.family)
    }

    fn describe_one(&self, def: &AlarmDefinition, dry_run: bool) -> Result<ItemOutcome, ItemError> {
        if !def.has_blank_description() {
            return Ok(ItemOutcome::skipped(&def.name, SkipReason::HasDescription));
        }
        let Some(text) = self.description_for(def) else {
            return Ok(ItemOutcome::skipped(&def.name, SkipReason::NoDescription));
        };

        let target = AlarmDefinition {
            description: Some(text.to_string()),
            ..def.clone()
        };
        let payload = self.prepare(&target)?;

        if !dry_run {
            let live = self.write_and_reread(&payload)?;
            self.capture(&def.name, SnapshotLabel::Described, live.as_ref())?;
            tracing::info!(alarm = %def.name, "description set");
        }

        Ok(ItemOutcome::Described {
            name: def.name.clone(),
            desc_set: true,
            dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{DescriptionTable, EngineSettings};
    use alarmshift_core::RawAlarm;
    use alarmshift_store::{MemoryBackend, MemoryFleet, SnapshotStore};

    fn alarm(name: &str, metric: &str, op: &str, threshold: f64, description: Option<&str>) -> RawAlarm {
        RawAlarm {
            alarm_name: name.to_string(),
            alarm_description: description.map(str::to_string),
            metric_name: Some(metric.to_string()),
            namespace: Some("CWAgent".to_string()),
            statistic: Some("Average".to_string()),
            period: Some(300),
            evaluation_periods: Some(1),
            threshold: Some(threshold),
            comparison_operator: Some(op.to_string()),
            ..RawAlarm::default()
        }
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            descriptions: DescriptionTable::new()
                .with("cpu", "CPU watch disabled")
                .with("windows-service", "never used"),
            ..EngineSettings::default()
        }
        .without_delays()
    }

    #[tokio::test]
    async fn describes_only_blank_alarms_on_target() {
        let fleet = MemoryFleet::new(vec![
            alarm("cpu-blank", "Processor % Processor Time", "GreaterThanThreshold", 1.0, None),
            alarm("cpu-set", "Processor % Processor Time", "GreaterThanThreshold", 1.0, Some("keep")),
            alarm("cpu-old", "Processor % Processor Time", "GreaterThanThreshold", 90.0, Some(" ")),
            alarm("disk", "LogicalDisk % Free Space", "LessThanOrEqualToThreshold", 99.5, None),
            alarm("svc", "Windows Service Status", "GreaterThanOrEqualToThreshold", 0.0, None),
        ]);
        let m = Migrator::new(&fleet, SnapshotStore::new(MemoryBackend::new()), settings());
        let report = m.set_descriptions(&RunOptions::live()).await;

        assert_eq!(report.result, "desc_set");
        assert_eq!(
            report.get("cpu-blank"),
            Some(&ItemOutcome::Described {
                name: "cpu-blank".to_string(),
                desc_set: true,
                dry_run: false,
            })
        );
        let skip = |name: &str| report.get(name).and_then(ItemOutcome::skip_reason);
        assert_eq!(skip("cpu-set"), Some(SkipReason::HasDescription));
        assert_eq!(skip("cpu-old"), Some(SkipReason::NoDescription));
        assert_eq!(skip("disk"), Some(SkipReason::NoDescription));
        assert_eq!(skip("svc"), Some(SkipReason::NoDescription));

        assert_eq!(
            fleet.get("cpu-blank").and_then(|a| a.alarm_description).as_deref(),
            Some("CPU watch disabled")
        );
        assert_eq!(fleet.get("cpu-blank").and_then(|a| a.threshold), Some(1.0));
        assert_eq!(fleet.write_count(), 1);

        let doc = m.store().read("cpu-blank").expect("read").expect("snapshot");
        assert!(doc.get(SnapshotLabel::Described).is_some());
    }
}

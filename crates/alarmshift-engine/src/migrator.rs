//! Migrator: owns the injected collaborators and the per-item loop shared
//! by the forward, rollback and description passes.

use std::time::Duration;

use alarmshift_core::{
    AlarmDefinition, ItemOutcome, Report, SnapshotLabel, WritePayload,
};
use alarmshift_store::{
    AlarmApi, ListError, SnapshotBackend, SnapshotStore, describe_definition,
};

use crate::error::ItemError;
use crate::settings::EngineSettings;

/// Report entry name used when enumeration itself fails.
pub const ENUMERATION_ITEM: &str = "(enumeration)";

/// Per-run modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Only alarms whose name starts with this prefix are considered.
    /// Empty means every alarm.
    pub name_prefix: Option<String>,
    /// Compute and report changes without writing anything.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn live() -> Self {
        Self::default()
    }

    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    pub fn admits(&self, alarm_name: &str) -> bool {
        self.name_prefix
            .as_deref()
            .is_none_or(|prefix| alarm_name.starts_with(prefix))
    }
}

pub struct Migrator<A, B> {
    pub(crate) api: A,
    pub(crate) store: SnapshotStore<B>,
    pub(crate) settings: EngineSettings,
}

impl<A: AlarmApi, B: SnapshotBackend> Migrator<A, B> {
    pub fn new(api: A, store: SnapshotStore<B>, settings: EngineSettings) -> Self {
        Self {
            api,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &SnapshotStore<B> {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // ─── Shared item loop ────────────────────────────────────────

    /// Run `step` over every admitted alarm, front to back.
    ///
    /// Item errors become `error` entries and the loop moves on. A failed
    /// page fetch is recorded once and ends the run, since nothing after it
    /// can be enumerated. `delay` follows every item that reached the
    /// mutation step.
    pub(crate) async fn drive<I, F>(
        &self,
        alarms: I,
        opts: &RunOptions,
        delay: Duration,
        mut step: F,
    ) -> Vec<ItemOutcome>
    where
        I: IntoIterator<Item = Result<AlarmDefinition, ListError>>,
        F: FnMut(&AlarmDefinition) -> Result<ItemOutcome, ItemError>,
    {
        let mut items = Vec::new();
        for listed in alarms {
            let def = match listed {
                Ok(def) => def,
                Err(e) => {
                    match e.alarm_name() {
                        Some(name) if !opts.admits(name) => {}
                        Some(name) => {
                            tracing::warn!(alarm = %name, error = %e, "alarm could not be read");
                            items.push(ItemOutcome::failed(name, e.to_string()));
                        }
                        None => {
                            let transient = matches!(&e, ListError::Page(api) if api.is_transient());
                            tracing::warn!(error = %e, transient, "alarm enumeration failed");
                            items.push(ItemOutcome::failed(ENUMERATION_ITEM, e.to_string()));
                            break;
                        }
                    }
                    continue;
                }
            };
            if !opts.admits(&def.name) {
                continue;
            }

            let outcome = match step(&def) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(alarm = %def.name, error = %e, transient = e.is_transient(), "alarm failed");
                    ItemOutcome::failed(&def.name, e.to_string())
                }
            };
            if let Some(reason) = outcome.skip_reason() {
                tracing::debug!(alarm = %def.name, ?reason, "alarm skipped");
            }
            let paced = outcome.skip_reason().is_none();
            items.push(outcome);

            if paced && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        items
    }

    pub(crate) fn finish(&self, result: &str, items: Vec<ItemOutcome>, opts: &RunOptions) -> Report {
        let report = Report::new(result, items);
        tracing::info!(
            result,
            count = report.count,
            changed = report.changed(),
            skipped = report.skipped(),
            failed = report.failed(),
            dry_run = opts.dry_run,
            "run finished"
        );
        report
    }

    // ─── Write helpers ───────────────────────────────────────────

    /// Build and validate the payload for `target`. Runs in dry-run too,
    /// so an unwritable definition is reported the same either way.
    pub(crate) fn prepare(&self, target: &AlarmDefinition) -> Result<WritePayload, ItemError> {
        let payload = WritePayload::from_definition(target);
        payload.validate()?;
        Ok(payload)
    }

    /// Write `payload`, then read the alarm back as it now stands. A failed
    /// read-back is reported as such, since the write already landed.
    pub(crate) fn write_and_reread(
        &self,
        payload: &WritePayload,
    ) -> Result<Option<AlarmDefinition>, ItemError> {
        self.api.put(payload).map_err(ItemError::Write)?;
        describe_definition(&self.api, &payload.alarm_name).map_err(ItemError::Reread)
    }

    /// Merge the re-read live state under `label`. An alarm that vanished
    /// between write and re-read leaves the snapshot untouched.
    pub(crate) fn capture(
        &self,
        alarm_name: &str,
        label: SnapshotLabel,
        live: Option<&AlarmDefinition>,
    ) -> Result<(), ItemError> {
        match live {
            Some(def) => {
                self.store.merge_write(alarm_name, label, def)?;
            }
            None => {
                tracing::warn!(alarm = %alarm_name, %label, "alarm missing on re-read; snapshot not captured");
            }
        }
        Ok(())
    }
}

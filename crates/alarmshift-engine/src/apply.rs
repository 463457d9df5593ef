//! Forward migration: match, capture `before`, rewrite, capture `after`.

use alarmshift_core::{AlarmDefinition, ItemOutcome, Report, SkipReason, SnapshotLabel};
use alarmshift_store::{AlarmApi, ListError, SnapshotBackend, list_alarms};

use crate::error::ItemError;
use crate::migrator::{Migrator, RunOptions};

pub const RESULT_UPDATED: &str = "updated";

impl<A: AlarmApi, B: SnapshotBackend> Migrator<A, B> {
    /// Forward-migrate every enumerated alarm.
    pub async fn apply(&self, opts: &RunOptions) -> Report {
        self.apply_alarms(list_alarms(&self.api), opts).await
    }

    /// Forward-migrate the given alarms in order.
    pub async fn apply_alarms<I>(&self, alarms: I, opts: &RunOptions) -> Report
    where
        I: IntoIterator<Item = Result<AlarmDefinition, ListError>>,
    {
        let items = self
            .drive(alarms, opts, self.settings.item_delay, |def| {
                self.migrate_one(def, opts.dry_run)
            })
            .await;
        self.finish(RESULT_UPDATED, items, opts)
    }

    fn migrate_one(&self, def: &AlarmDefinition, dry_run: bool) -> Result<ItemOutcome, ItemError> {
        let Some(rule) = self.settings.rules.forward.find_match(def) else {
            return Ok(ItemOutcome::skipped(&def.name, SkipReason::NoMatch));
        };

        let mut target = rule.apply(def);
        if self.settings.force_min_sensitivity {
            target.evaluation_periods = Some(1);
            target.datapoints_to_alarm = Some(1);
        }
        let payload = self.prepare(&target)?;

        if dry_run {
            tracing::info!(alarm = %def.name, rule = %rule.id, from = def.threshold, to = target.threshold, "would migrate");
        } else {
            self.store.merge_write(&def.name, SnapshotLabel::Before, def)?;
            let live = self.write_and_reread(&payload)?;
            self.capture(&def.name, SnapshotLabel::After, live.as_ref())?;
            tracing::info!(alarm = %def.name, rule = %rule.id, from = def.threshold, to = target.threshold, "migrated");
        }

        Ok(ItemOutcome::Migrated {
            name: def.name.clone(),
            from: def.threshold,
            to: target.threshold,
            dry_run,
        })
    }
}

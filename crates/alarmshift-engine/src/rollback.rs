//! Rollback: inverse rule table (with memory baseline resolution) or
//! snapshot replay. Both capture the re-read state under `rollback`.

use alarmshift_core::{
    AlarmDefinition, ItemOutcome, Report, SkipReason, SnapshotLabel, WritePayload,
    report::ReplayStatus,
};
use alarmshift_store::{AlarmApi, ListError, SnapshotBackend, list_alarms};

use crate::error::ItemError;
use crate::migrator::{Migrator, RunOptions};
use crate::settings::RollbackStrategy;

pub const RESULT_ROLLED_BACK: &str = "rolled_back";

impl<A: AlarmApi, B: SnapshotBackend> Migrator<A, B> {
    /// Roll back every enumerated alarm with the configured strategy.
    pub async fn rollback(&self, opts: &RunOptions) -> Report {
        self.rollback_alarms(list_alarms(&self.api), opts).await
    }

    pub async fn rollback_alarms<I>(&self, alarms: I, opts: &RunOptions) -> Report
    where
        I: IntoIterator<Item = Result<AlarmDefinition, ListError>>,
    {
        let strategy = self.settings.rollback_strategy;
        tracing::debug!(%strategy, dry_run = opts.dry_run, "rollback started");
        let delay = self.settings.item_delay;
        let items = match strategy {
            RollbackStrategy::Inverse => {
                self.drive(alarms, opts, delay, |def| self.restore_one(def, opts.dry_run))
                    .await
            }
            RollbackStrategy::Snapshot => {
                self.drive(alarms, opts, delay, |def| self.replay_one(def, opts.dry_run))
                    .await
            }
        };
        self.finish(RESULT_ROLLED_BACK, items, opts)
    }

    // ─── Inverse table ───────────────────────────────────────────

    /// Target for an inverse rollback. Memory alarms on the sentinel are
    /// resolved by name before the inverse table is consulted.
    fn inverse_target(&self, def: &AlarmDefinition) -> Result<AlarmDefinition, SkipReason> {
        if self.settings.memory.is_sentinel(def) {
            return match self.settings.memory.resolve(&def.name) {
                Some(threshold) => Ok(AlarmDefinition {
                    threshold,
                    ..def.clone()
                }),
                None => Err(SkipReason::Ambiguous),
            };
        }
        self.settings
            .rules
            .inverse
            .find_match(def)
            .map(|rule| rule.apply(def))
            .ok_or(SkipReason::NoRollbackMatch)
    }

    fn restore_one(&self, def: &AlarmDefinition, dry_run: bool) -> Result<ItemOutcome, ItemError> {
        let target = match self.inverse_target(def) {
            Ok(target) => target,
            Err(reason) => return Ok(ItemOutcome::skipped(&def.name, reason)),
        };
        let payload = self.prepare(&target)?;

        if !dry_run {
            let live = self.write_and_reread(&payload)?;
            self.capture(&def.name, SnapshotLabel::Rollback, live.as_ref())?;
            tracing::info!(alarm = %def.name, from = def.threshold, to = target.threshold, "restored");
        }

        Ok(ItemOutcome::Restored {
            name: def.name.clone(),
            restored_to: target.threshold,
            op: target.comparison_operator,
            dry_run,
        })
    }

    // ─── Snapshot replay ─────────────────────────────────────────

    /// Write back the captured `rollback` definition, falling back to
    /// `before` for alarms that were migrated but never rolled back.
    /// An alarm already equal to the capture is left alone.
    fn replay_one(&self, def: &AlarmDefinition, dry_run: bool) -> Result<ItemOutcome, ItemError> {
        let doc = self.store.read(&def.name)?;
        let captured = doc.as_ref().and_then(|doc| {
            doc.get(SnapshotLabel::Rollback)
                .or_else(|| doc.get(SnapshotLabel::Before))
        });
        let Some(captured) = captured else {
            return Ok(ItemOutcome::skipped(&def.name, SkipReason::NoSnapshot));
        };

        let target = AlarmDefinition {
            name: def.name.clone(),
            ..captured.clone()
        };
        let payload = self.prepare(&target)?;
        // Compared as payloads so unset defaults match their written form.
        if WritePayload::from_definition(def) == payload {
            return Ok(ItemOutcome::skipped(&def.name, SkipReason::AlreadyReverted));
        }

        if !dry_run {
            let live = self.write_and_reread(&payload)?;
            self.capture(&def.name, SnapshotLabel::Rollback, live.as_ref())?;
            tracing::info!(alarm = %def.name, to = target.threshold, "replayed snapshot");
        }

        Ok(ItemOutcome::Reverted {
            name: def.name.clone(),
            status: ReplayStatus::Reverted,
            dry_run,
        })
    }
}

//! Invocation surface: `{action, name_prefix, dry_run}` in,
//! `{result, count, items}` or `{error}` out.

use std::fmt;
use std::str::FromStr;

use alarmshift_core::Report;
use alarmshift_store::{AlarmApi, SnapshotBackend, SnapshotStore};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::migrator::{Migrator, RunOptions};
use crate::settings::{EngineSettings, RollbackStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Rollback,
    SetDescription,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Rollback => "rollback",
            Self::SetDescription => "set_description",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "update" => Ok(Self::Update),
            "rollback" => Ok(Self::Rollback),
            "set_description" => Ok(Self::SetDescription),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// Raw invocation event. The action stays a string so that unknown
/// values are answered with `{error}` instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
    /// Per-invocation override of the configured rollback strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<RollbackStrategy>,
}

impl Invocation {
    pub fn new(action: Action) -> Self {
        Self {
            action: Some(action.as_str().to_string()),
            ..Self::default()
        }
    }

    /// The requested action, or the `{error}` text for a missing or
    /// unknown one.
    pub fn action(&self) -> Result<Action, String> {
        match self.action.as_deref() {
            Some(raw) => raw.parse(),
            None => Err("missing action".to_string()),
        }
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            name_prefix: self.name_prefix.clone().filter(|p| !p.is_empty()),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvocationResponse {
    Completed(Report),
    Rejected { error: String },
}

impl InvocationResponse {
    pub fn rejected(error: impl fmt::Display) -> Self {
        Self::Rejected {
            error: error.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Rejected { .. } => None,
        }
    }
}

impl From<ConfigError> for InvocationResponse {
    fn from(e: ConfigError) -> Self {
        Self::rejected(e)
    }
}

/// Dispatch one invocation.
///
/// The action is checked first, then the snapshot destination. Both are
/// answered with `{error}` before any alarm is read.
pub async fn invoke<A: AlarmApi, B: SnapshotBackend>(
    api: A,
    store: Option<SnapshotStore<B>>,
    mut settings: EngineSettings,
    invocation: &Invocation,
) -> InvocationResponse {
    let action = match invocation.action() {
        Ok(action) => action,
        Err(e) => return InvocationResponse::rejected(e),
    };
    let Some(store) = store else {
        return ConfigError::MissingSnapshotDestination.into();
    };
    if let Some(strategy) = invocation.strategy {
        settings.rollback_strategy = strategy;
    }

    let opts = invocation.options();
    tracing::info!(%action, prefix = ?opts.name_prefix, dry_run = opts.dry_run, "invocation");
    let migrator = Migrator::new(api, store, settings);
    let report = match action {
        Action::Update => migrator.apply(&opts).await,
        Action::Rollback => migrator.rollback(&opts).await,
        Action::SetDescription => migrator.set_descriptions(&opts).await,
    };
    InvocationResponse::Completed(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alarmshift_core::RawAlarm;
    use alarmshift_store::{MemoryBackend, MemoryFleet};
    use serde_json::json;

    fn cpu(name: &str) -> RawAlarm {
        RawAlarm {
            alarm_name: name.to_string(),
            metric_name: Some("Processor % Processor Time".to_string()),
            namespace: Some("CWAgent".to_string()),
            statistic: Some("Average".to_string()),
            period: Some(300),
            evaluation_periods: Some(1),
            threshold: Some(90.0),
            comparison_operator: Some("GreaterThanThreshold".to_string()),
            ..RawAlarm::default()
        }
    }

    fn store() -> Option<SnapshotStore<MemoryBackend>> {
        Some(SnapshotStore::new(MemoryBackend::new()))
    }

    fn settings() -> EngineSettings {
        EngineSettings::default().without_delays()
    }

    #[test]
    fn event_decoding() {
        let inv: Invocation = serde_json::from_value(json!({
            "action": "rollback",
            "name_prefix": "prod-",
            "dry_run": true,
            "strategy": "snapshot",
        }))
        .expect("decode");
        assert_eq!(inv.action.as_deref(), Some("rollback"));
        assert_eq!(inv.strategy, Some(RollbackStrategy::Snapshot));
        assert_eq!(inv.options(), RunOptions::dry_run().with_prefix("prod-"));

        let bare: Invocation = serde_json::from_value(json!({})).expect("decode");
        assert_eq!(bare, Invocation::default());
        assert!(!bare.dry_run);
    }

    #[tokio::test]
    async fn unknown_and_missing_actions_are_errors() {
        let fleet = MemoryFleet::new(vec![cpu("a")]);
        let mut inv = Invocation::default();
        let resp = invoke(&fleet, store(), settings(), &inv).await;
        assert_eq!(serde_json::to_value(&resp).expect("encode"), json!({"error": "missing action"}));

        inv.action = Some("delete".to_string());
        let resp = invoke(&fleet, store(), settings(), &inv).await;
        assert_eq!(
            serde_json::to_value(&resp).expect("encode"),
            json!({"error": "unknown action: delete"})
        );
        assert_eq!(fleet.write_count(), 0);
    }

    #[tokio::test]
    async fn missing_store_rejected_before_processing() {
        let fleet = MemoryFleet::new(vec![cpu("a")]);
        let resp = invoke::<_, MemoryBackend>(&fleet, None, settings(), &Invocation::new(Action::Update)).await;
        assert!(resp.is_error());
        assert_eq!(fleet.write_count(), 0);
    }

    #[tokio::test]
    async fn update_reports_flat_items() {
        let fleet = MemoryFleet::new(vec![cpu("a")]);
        let mut inv = Invocation::new(Action::Update);
        inv.dry_run = true;
        let resp = invoke(&fleet, store(), settings(), &inv).await;
        assert_eq!(
            serde_json::to_value(&resp).expect("encode"),
            json!({
                "result": "updated",
                "count": 1,
                "items": [{"name": "a", "from": 90.0, "to": 1.0, "dry_run": true}],
            })
        );
    }

    #[test]
    fn action_names() {
        for action in [Action::Update, Action::Rollback, Action::SetDescription] {
            assert_eq!(action.as_str().parse::<Action>(), Ok(action));
        }
        assert!("Update".parse::<Action>().is_err());
    }
}

//! CLI definition using clap derive.

use std::path::PathBuf;

use alarmshift_engine::RollbackStrategy;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "alarmshift", about = "Bulk, reversible alarm threshold migrations")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a raw invocation event and print the JSON response
    Invoke(InvokeOpts),
    /// Forward-migrate matching alarms
    Update(RunOpts),
    /// Roll migrated alarms back
    Rollback(RollbackOpts),
    /// Fill empty descriptions of migrated alarms
    SetDescription(RunOpts),
    /// Inspect stored snapshots
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommand {
    /// Print the snapshot document stored for one alarm
    Show { alarm: String },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct InvokeOpts {
    /// Invocation event as inline JSON
    #[arg(long)]
    pub event: Option<String>,

    /// Read the invocation event from a JSON file
    #[arg(long)]
    pub event_file: Option<PathBuf>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunOpts {
    /// Only touch alarms whose name starts with this prefix
    #[arg(long)]
    pub name_prefix: Option<String>,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RollbackOpts {
    #[command(flatten)]
    pub run: RunOpts,

    /// Override the configured rollback strategy for this run
    #[arg(long)]
    pub strategy: Option<RollbackStrategy>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// One JSON document per alarm under <root>/<prefix>/
    #[default]
    Object,
    /// Shared parameter file at <root>/parameters.json
    Parameter,
    /// In-process only; nothing survives the run
    Memory,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// JSON fleet file holding the alarm descriptions
    #[arg(long, global = true, env = "ALARMSHIFT_FLEET_FILE", default_value = "alarms.json")]
    pub fleet_file: PathBuf,

    /// Alarms fetched per enumeration page
    #[arg(long, global = true, env = "ALARMSHIFT_PAGE_SIZE", default_value_t = 100)]
    pub page_size: usize,

    #[arg(long, global = true, env = "SNAPSHOT_BACKEND", value_enum, default_value_t = BackendKind::Object)]
    pub snapshot_backend: BackendKind,

    /// Snapshot destination directory (required for object/parameter backends)
    #[arg(long, global = true, env = "SNAPSHOT_ROOT")]
    pub snapshot_root: Option<PathBuf>,

    #[arg(long, global = true, env = "SNAPSHOT_PREFIX", default_value = "alarm-snapshots")]
    pub snapshot_prefix: String,

    /// TOML rule file replacing the built-in tables
    #[arg(long, global = true, env = "ALARMSHIFT_RULES")]
    pub rules: Option<PathBuf>,

    /// Memory baseline used when an alarm name carries no hint (1.6G or 3.2G)
    #[arg(long, global = true, env = "MEMORY_BASELINE_FALLBACK")]
    pub memory_baseline_fallback: Option<String>,

    /// Also pin evaluation periods and datapoints-to-alarm to 1
    #[arg(long, global = true, env = "FORCE_MIN_SENSITIVITY")]
    pub force_min_sensitivity: bool,

    /// Pause after each changed alarm, in milliseconds
    #[arg(long, global = true, env = "ITEM_DELAY_MS", default_value_t = 50)]
    pub item_delay_ms: u64,

    /// Pause after each described alarm, in milliseconds
    #[arg(long, global = true, env = "DESCRIPTION_DELAY_MS", default_value_t = 30)]
    pub description_delay_ms: u64,

    #[arg(long, global = true, env = "ROLLBACK_STRATEGY", default_value = "inverse")]
    pub rollback_strategy: RollbackStrategy,

    #[arg(long, global = true, env = "DESC_DISK")]
    pub desc_disk: Option<String>,

    #[arg(long, global = true, env = "DESC_MEMORY")]
    pub desc_memory: Option<String>,

    #[arg(long, global = true, env = "DESC_CPU")]
    pub desc_cpu: Option<String>,

    #[arg(long, global = true, env = "DESC_STATUS_INSTANCE")]
    pub desc_status_instance: Option<String>,

    #[arg(long, global = true, env = "DESC_STATUS_SYSTEM")]
    pub desc_status_system: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("alarmshift").chain(args.iter().copied()))
            .expect("parse")
    }

    #[test]
    fn update_with_run_options() {
        let cli = parse(&["update", "--name-prefix", "prod-", "--dry-run"]);
        match cli.command {
            Command::Update(run) => {
                assert_eq!(run.name_prefix.as_deref(), Some("prod-"));
                assert!(run.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.global.page_size, 100);
        assert_eq!(cli.global.snapshot_backend, BackendKind::Object);
    }

    #[test]
    fn rollback_strategy_flag() {
        let cli = parse(&["rollback", "--strategy", "snapshot", "--snapshot-backend", "parameter"]);
        match cli.command {
            Command::Rollback(opts) => {
                assert_eq!(opts.strategy, Some(RollbackStrategy::Snapshot));
                assert!(!opts.run.dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.global.snapshot_backend, BackendKind::Parameter);
        assert_eq!(cli.global.rollback_strategy, RollbackStrategy::Inverse);
    }

    #[test]
    fn invoke_needs_exactly_one_event_source() {
        let cli = parse(&["invoke", "--event", r#"{"action":"update"}"#]);
        assert!(matches!(cli.command, Command::Invoke(InvokeOpts { event: Some(_), .. })));

        let none = Cli::try_parse_from(["alarmshift", "invoke"]);
        assert!(none.is_err());
        let both = Cli::try_parse_from([
            "alarmshift",
            "invoke",
            "--event",
            "{}",
            "--event-file",
            "e.json",
        ]);
        assert!(both.is_err());
    }

    #[test]
    fn snapshot_show() {
        let cli = parse(&["snapshot", "show", "web-01 cpu", "--snapshot-root", "/data"]);
        assert!(matches!(cli.command, Command::Snapshot(SnapshotCommand::Show { ref alarm }) if alarm == "web-01 cpu"));
        assert_eq!(cli.global.snapshot_root, Some(PathBuf::from("/data")));
    }
}

//! Resolves global options into engine settings, the snapshot store and
//! the alarm API.

use std::time::Duration;

use alarmshift_core::{MemoryBaseline, MemoryResolver, RuleSet};
use alarmshift_engine::{ConfigError, DescriptionTable, EngineSettings};
use alarmshift_store::{
    FleetFile, MemoryBackend, ObjectBackend, ParameterBackend, SnapshotBackend, SnapshotStore,
};
use anyhow::Context;

use crate::cli::{BackendKind, GlobalOpts};

pub type DynStore = SnapshotStore<Box<dyn SnapshotBackend>>;

pub fn engine_settings(opts: &GlobalOpts) -> Result<EngineSettings, ConfigError> {
    let rules = match &opts.rules {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::builtin(),
    };

    let fallback = match opts.memory_baseline_fallback.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<MemoryBaseline>().map_err(|detail| {
            ConfigError::Invalid {
                name: "MEMORY_BASELINE_FALLBACK",
                detail,
            }
        })?),
    };

    Ok(EngineSettings {
        rules,
        memory: MemoryResolver::new(fallback),
        force_min_sensitivity: opts.force_min_sensitivity,
        item_delay: Duration::from_millis(opts.item_delay_ms),
        description_delay: Duration::from_millis(opts.description_delay_ms),
        rollback_strategy: opts.rollback_strategy,
        descriptions: descriptions(opts),
    })
}

fn descriptions(opts: &GlobalOpts) -> DescriptionTable {
    let mut table = DescriptionTable::new();
    let texts = [
        ("disk", &opts.desc_disk),
        ("memory", &opts.desc_memory),
        ("cpu", &opts.desc_cpu),
        ("status-instance", &opts.desc_status_instance),
        ("status-system", &opts.desc_status_system),
    ];
    for (family, text) in texts {
        if let Some(text) = text {
            table.insert(family, text.clone());
        }
    }
    table
}

/// Snapshot store for the configured backend, or `None` when the backend
/// needs a destination and none was given.
pub fn snapshot_store(opts: &GlobalOpts) -> Option<DynStore> {
    let backend: Box<dyn SnapshotBackend> = match (opts.snapshot_backend, &opts.snapshot_root) {
        (BackendKind::Memory, _) => Box::new(MemoryBackend::new()),
        (BackendKind::Object, Some(root)) => {
            Box::new(ObjectBackend::new(root.clone(), opts.snapshot_prefix.clone()))
        }
        (BackendKind::Parameter, Some(root)) => {
            Box::new(ParameterBackend::new(root, opts.snapshot_prefix.clone()))
        }
        (_, None) => return None,
    };
    Some(SnapshotStore::new(backend))
}

pub fn open_fleet(opts: &GlobalOpts) -> anyhow::Result<FleetFile> {
    if opts.page_size == 0 {
        anyhow::bail!("--page-size must be at least 1");
    }
    FleetFile::open(&opts.fleet_file, opts.page_size)
        .with_context(|| format!("opening fleet file {}", opts.fleet_file.display()))
}

//! alarmshift-store: IO boundary for the migration engine.
//! Alarm API trait with a fleet-file implementation, and the snapshot
//! store with its object, parameter and in-memory backends.
//! No rule logic here.

pub mod api;
pub mod backend;
pub mod error;
pub mod fleet;
mod fs_util;
pub mod memory;
pub mod object;
pub mod parameter;
pub mod store;

pub use api::{AlarmApi, AlarmPage, AlarmPages, ListError, describe_definition, list_alarms};
pub use backend::SnapshotBackend;
pub use error::{AlarmApiError, StoreError};
pub use fleet::{FleetFile, MemoryFleet};
pub use memory::MemoryBackend;
pub use object::ObjectBackend;
pub use parameter::ParameterBackend;
pub use store::{SnapshotStore, snapshot_key};

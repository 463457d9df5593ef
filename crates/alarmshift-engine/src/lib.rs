//! alarmshift-engine: forward migration, rollback and description passes
//! over an alarm fleet, plus the invocation dispatcher.
//!
//! Alarms are processed one at a time, front to back. Per-alarm failures
//! become report entries; only configuration errors reject an invocation.

pub mod apply;
pub mod describe;
pub mod error;
pub mod invoke;
pub mod migrator;
pub mod rollback;
pub mod settings;

pub use error::{ConfigError, ItemError};
pub use invoke::{Action, Invocation, InvocationResponse, invoke};
pub use migrator::{Migrator, RunOptions};
pub use settings::{DescriptionTable, EngineSettings, RollbackStrategy};

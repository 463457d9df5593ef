//! alarmshift-core: alarm record model, rule tables, memory baseline
//! resolver, snapshot documents and run reports.
//!
//! Pure data and pure functions. The IO boundary (alarm API, snapshot
//! backends) lives in alarmshift-store; orchestration in alarmshift-engine.

pub mod error;
pub mod payload;
pub mod raw;
pub mod report;
pub mod resolver;
pub mod rules;
pub mod snapshot;
pub mod types;

pub use error::{ModelError, PayloadError, RuleFileError};
pub use payload::WritePayload;
pub use raw::{RawAlarm, RawDimension};
pub use report::{ItemOutcome, Report, SkipReason};
pub use resolver::{MemoryBaseline, MemoryResolver};
pub use rules::{Condition, MetricFilter, Rule, RuleSet, RuleTable};
pub use snapshot::{SnapshotDocument, SnapshotLabel};
pub use types::{
    AlarmActions, AlarmDefinition, ComparisonOperator, Dimension, StatisticSpec, TreatMissingData,
};

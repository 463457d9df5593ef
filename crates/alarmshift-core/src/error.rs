//! Error types for the alarm model, write payloads and rule files.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("alarm {0:?} is a composite/metric-math alarm")]
    Composite(String),

    #[error("alarm {alarm:?} is missing required field {field}")]
    MissingField { alarm: String, field: &'static str },

    #[error("unknown comparison operator: {0}")]
    UnknownOperator(String),

    #[error("unknown treat-missing-data value: {0}")]
    UnknownTreatMissingData(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("alarm name must not be empty")]
    EmptyName,

    #[error("threshold must be finite, got {0}")]
    NonFiniteThreshold(f64),

    #[error("{field} must be at least 1")]
    ZeroPeriod { field: &'static str },

    #[error("datapoints_to_alarm ({datapoints}) exceeds evaluation_periods ({periods})")]
    DatapointsExceedPeriods { datapoints: u32, periods: u32 },
}

#[derive(Debug, Error)]
pub enum RuleFileError {
    #[error("rule file io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule file parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rule {id:?}: {detail}")]
    Invalid { id: String, detail: String },
}

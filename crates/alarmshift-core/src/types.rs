use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;
use crate::raw::{RawAlarm, RawDimension};

// ─── Comparison Operator ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "LessThanThreshold")]
    LessThan,
    #[serde(rename = "LessThanOrEqualToThreshold")]
    LessThanOrEqual,
    #[serde(rename = "GreaterThanThreshold")]
    GreaterThan,
    #[serde(rename = "GreaterThanOrEqualToThreshold")]
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    pub const ALL: [Self; 4] = [
        Self::LessThan,
        Self::LessThanOrEqual,
        Self::GreaterThan,
        Self::GreaterThanOrEqual,
    ];

    /// Wire name used by the alarm API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LessThan => "LessThanThreshold",
            Self::LessThanOrEqual => "LessThanOrEqualToThreshold",
            Self::GreaterThan => "GreaterThanThreshold",
            Self::GreaterThanOrEqual => "GreaterThanOrEqualToThreshold",
        }
    }

    pub fn is_or_equal(self) -> bool {
        matches!(self, Self::LessThanOrEqual | Self::GreaterThanOrEqual)
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = ModelError;

    /// Accepts the wire name or the short form (`GreaterThan`, `<=`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "LessThanThreshold" | "LessThan" | "<" => Ok(Self::LessThan),
            "LessThanOrEqualToThreshold" | "LessThanOrEqual" | "<=" => Ok(Self::LessThanOrEqual),
            "GreaterThanThreshold" | "GreaterThan" | ">" => Ok(Self::GreaterThan),
            "GreaterThanOrEqualToThreshold" | "GreaterThanOrEqual" | ">=" => {
                Ok(Self::GreaterThanOrEqual)
            }
            other => Err(ModelError::UnknownOperator(other.to_string())),
        }
    }
}

// ─── Treat Missing Data ───────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreatMissingData {
    #[default]
    Missing,
    Breaching,
    NotBreaching,
    Ignore,
}

impl TreatMissingData {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Breaching => "breaching",
            Self::NotBreaching => "notBreaching",
            Self::Ignore => "ignore",
        }
    }
}

impl FromStr for TreatMissingData {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missing" => Ok(Self::Missing),
            "breaching" => Ok(Self::Breaching),
            "notBreaching" => Ok(Self::NotBreaching),
            "ignore" => Ok(Self::Ignore),
            other => Err(ModelError::UnknownTreatMissingData(other.to_string())),
        }
    }
}

// ─── Statistic ────────────────────────────────────────────────────

/// Either a standard statistic (`Average`, `Maximum`, ...) or an extended
/// percentile statistic (`p99`). Never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatisticSpec {
    Standard(String),
    Extended(String),
}

// ─── Dimensions & Actions ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl From<RawDimension> for Dimension {
    fn from(raw: RawDimension) -> Self {
        Self {
            name: raw.name,
            value: raw.value,
        }
    }
}

impl From<&Dimension> for RawDimension {
    fn from(dim: &Dimension) -> Self {
        Self {
            name: dim.name.clone(),
            value: dim.value.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmActions {
    #[serde(default)]
    pub ok: Vec<String>,
    #[serde(default)]
    pub alarm: Vec<String>,
    #[serde(default)]
    pub insufficient_data: Vec<String>,
}

// ─── Alarm Definition ─────────────────────────────────────────────

/// Full addressable state of one single-metric alarm.
///
/// Built from a [`RawAlarm`] by normalization; this is also the shape
/// captured in snapshot documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDefinition {
    pub name: String,
    pub metric_name: String,
    pub namespace: String,
    pub comparison_operator: ComparisonOperator,
    pub threshold: f64,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    pub period: u32,
    #[serde(default)]
    pub evaluation_periods: Option<u32>,
    #[serde(default)]
    pub datapoints_to_alarm: Option<u32>,
    pub statistic: StatisticSpec,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub actions: AlarmActions,
    #[serde(default = "default_actions_enabled")]
    pub actions_enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub treat_missing_data: TreatMissingData,
    #[serde(default)]
    pub evaluate_low_sample_count_percentile: Option<String>,
}

fn default_actions_enabled() -> bool {
    true
}

impl AlarmDefinition {
    /// True when the description is absent or only whitespace.
    pub fn has_blank_description(&self) -> bool {
        self.description
            .as_deref()
            .is_none_or(|d| d.trim().is_empty())
    }
}

impl TryFrom<RawAlarm> for AlarmDefinition {
    type Error = ModelError;

    fn try_from(raw: RawAlarm) -> Result<Self, Self::Error> {
        if raw.is_composite() {
            return Err(ModelError::Composite(raw.alarm_name));
        }

        let name = raw.alarm_name;
        let missing = |field: &'static str| ModelError::MissingField {
            alarm: name.clone(),
            field,
        };

        let metric_name = raw.metric_name.ok_or_else(|| missing("MetricName"))?;
        let namespace = raw.namespace.ok_or_else(|| missing("Namespace"))?;
        let period = raw.period.ok_or_else(|| missing("Period"))?;
        let threshold = raw.threshold.ok_or_else(|| missing("Threshold"))?;
        let comparison_operator = raw
            .comparison_operator
            .as_deref()
            .ok_or_else(|| missing("ComparisonOperator"))?
            .parse()?;

        // Standard statistic wins when both are present.
        let statistic = match (raw.statistic, raw.extended_statistic) {
            (Some(stat), _) => StatisticSpec::Standard(stat),
            (None, Some(ext)) => StatisticSpec::Extended(ext),
            (None, None) => return Err(missing("Statistic")),
        };

        let treat_missing_data = match raw.treat_missing_data.as_deref() {
            Some(s) => s.parse()?,
            None => TreatMissingData::default(),
        };

        Ok(Self {
            name,
            metric_name,
            namespace,
            comparison_operator,
            threshold,
            dimensions: raw.dimensions.into_iter().map(Dimension::from).collect(),
            period,
            evaluation_periods: raw.evaluation_periods,
            datapoints_to_alarm: raw.datapoints_to_alarm,
            statistic,
            unit: raw.unit,
            actions: AlarmActions {
                ok: raw.ok_actions,
                alarm: raw.alarm_actions,
                insufficient_data: raw.insufficient_data_actions,
            },
            actions_enabled: raw.actions_enabled.unwrap_or(true),
            description: raw.alarm_description,
            treat_missing_data,
            evaluate_low_sample_count_percentile: raw.evaluate_low_sample_count_percentile,
        })
    }
}

//! Minimal valid write payload for the alarm-write API.
//!
//! Required fields are always present: name, metric name, namespace,
//! period, evaluation periods, threshold, comparison operator, plus
//! `ActionsEnabled` and `TreatMissingData`.
//! Optional fields are omitted when empty: description, unit,
//! datapoints-to-alarm, dimensions, the three action lists, and
//! evaluate-low-sample-count-percentile. Exactly one of statistic /
//! extended statistic is sent.

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::raw::{RawAlarm, RawDimension};
use crate::types::{AlarmDefinition, ComparisonOperator, StatisticSpec, TreatMissingData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WritePayload {
    pub alarm_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_description: Option<String>,
    pub actions_enabled: bool,
    #[serde(rename = "OKActions", default, skip_serializing_if = "Vec::is_empty")]
    pub ok_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alarm_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insufficient_data_actions: Vec<String>,
    pub metric_name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_statistic: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<RawDimension>,
    pub period: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub evaluation_periods: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datapoints_to_alarm: Option<u32>,
    pub threshold: f64,
    pub comparison_operator: ComparisonOperator,
    pub treat_missing_data: TreatMissingData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_low_sample_count_percentile: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

impl WritePayload {
    pub fn from_definition(def: &AlarmDefinition) -> Self {
        let (statistic, extended_statistic) = match &def.statistic {
            StatisticSpec::Standard(s) => (Some(s.clone()), None),
            StatisticSpec::Extended(s) => (None, Some(s.clone())),
        };

        Self {
            alarm_name: def.name.clone(),
            alarm_description: non_empty(&def.description),
            actions_enabled: def.actions_enabled,
            ok_actions: def.actions.ok.clone(),
            alarm_actions: def.actions.alarm.clone(),
            insufficient_data_actions: def.actions.insufficient_data.clone(),
            metric_name: def.metric_name.clone(),
            namespace: def.namespace.clone(),
            statistic,
            extended_statistic,
            dimensions: def.dimensions.iter().map(RawDimension::from).collect(),
            period: def.period,
            unit: non_empty(&def.unit),
            evaluation_periods: def.evaluation_periods.unwrap_or(1),
            datapoints_to_alarm: def.datapoints_to_alarm,
            threshold: def.threshold,
            comparison_operator: def.comparison_operator,
            treat_missing_data: def.treat_missing_data,
            evaluate_low_sample_count_percentile: non_empty(
                &def.evaluate_low_sample_count_percentile,
            ),
        }
    }

    /// Reject payloads the write API would refuse.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.alarm_name.trim().is_empty() {
            return Err(PayloadError::EmptyName);
        }
        if !self.threshold.is_finite() {
            return Err(PayloadError::NonFiniteThreshold(self.threshold));
        }
        if self.period == 0 {
            return Err(PayloadError::ZeroPeriod { field: "period" });
        }
        if self.evaluation_periods == 0 {
            return Err(PayloadError::ZeroPeriod {
                field: "evaluation_periods",
            });
        }
        if let Some(datapoints) = self.datapoints_to_alarm {
            if datapoints == 0 {
                return Err(PayloadError::ZeroPeriod {
                    field: "datapoints_to_alarm",
                });
            }
            if datapoints > self.evaluation_periods {
                return Err(PayloadError::DatapointsExceedPeriods {
                    datapoints,
                    periods: self.evaluation_periods,
                });
            }
        }
        Ok(())
    }

    /// Render the payload as the alarm the API would describe afterwards.
    /// `previous` carries server-owned fields (the ARN) across the upsert.
    pub fn to_raw(&self, previous: Option<&RawAlarm>) -> RawAlarm {
        RawAlarm {
            alarm_name: self.alarm_name.clone(),
            alarm_arn: previous.and_then(|p| p.alarm_arn.clone()),
            alarm_description: self.alarm_description.clone(),
            actions_enabled: Some(self.actions_enabled),
            ok_actions: self.ok_actions.clone(),
            alarm_actions: self.alarm_actions.clone(),
            insufficient_data_actions: self.insufficient_data_actions.clone(),
            metric_name: Some(self.metric_name.clone()),
            namespace: Some(self.namespace.clone()),
            statistic: self.statistic.clone(),
            extended_statistic: self.extended_statistic.clone(),
            dimensions: self.dimensions.clone(),
            period: Some(self.period),
            unit: self.unit.clone(),
            evaluation_periods: Some(self.evaluation_periods),
            datapoints_to_alarm: self.datapoints_to_alarm,
            threshold: Some(self.threshold),
            comparison_operator: Some(self.comparison_operator.as_str().to_string()),
            treat_missing_data: Some(self.treat_missing_data.as_str().to_string()),
            evaluate_low_sample_count_percentile: self.evaluate_low_sample_count_percentile.clone(),
            metrics: Vec::new(),
        }
    }
}

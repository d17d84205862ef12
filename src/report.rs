//! Statistics report encoding
//!
//! Packs per-habit summaries and the dashboard rollup into a single JSON
//! document stamped with producer metadata and the reference day every
//! number was computed against.

use crate::calendar::{format_date, serde_day};
use crate::error::StatsError;
use crate::types::{Frequency, Habit, OverallStatistics, StatisticsSummary};
use crate::{PRODUCER_NAME, STREAKLINE_VERSION};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Who produced a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Statistics for one habit within a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitReport {
    pub habit_id: String,
    pub name: String,
    pub frequency: Frequency,
    pub archived: bool,
    pub statistics: StatisticsSummary,
}

impl HabitReport {
    pub fn new(habit: &Habit, statistics: StatisticsSummary) -> Self {
        Self {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            frequency: habit.frequency,
            archived: habit.archived,
            statistics,
        }
    }
}

/// Complete statistics report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub report_version: String,
    pub producer: ReportProducer,
    /// Day all streaks and windows were evaluated against
    #[serde(with = "serde_day")]
    pub reference_day: NaiveDate,
    pub computed_at_utc: String,
    pub overall: OverallStatistics,
    pub habits: Vec<HabitReport>,
}

/// Encoder producing [`StatsReport`] documents
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(
        &self,
        reference_day: NaiveDate,
        overall: OverallStatistics,
        habits: Vec<HabitReport>,
    ) -> StatsReport {
        StatsReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: STREAKLINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            reference_day,
            computed_at_utc: Utc::now().to_rfc3339(),
            overall,
            habits,
        }
    }

    /// Encode to pretty-printed JSON
    pub fn encode_to_json(
        &self,
        reference_day: NaiveDate,
        overall: OverallStatistics,
        habits: Vec<HabitReport>,
    ) -> Result<String, StatsError> {
        let report = self.encode(reference_day, overall, habits);
        serde_json::to_string_pretty(&report)
            .map_err(|e| StatsError::EncodingError(format!("{}: {e}", format_date(reference_day))))
    }
}

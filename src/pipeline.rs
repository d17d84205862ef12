//! Pipeline orchestration
//!
//! This module provides the public JSON-facing API for Streakline. It runs
//! an export document through every stage:
//!
//! 1. DataExport - parse and check the host snapshot
//! 2. CompletionLog - normalize each habit's completions
//! 3. Streak / statistics - derive summaries against one reference day
//! 4. ReportEncoder - encode the report JSON

use crate::config::EngineConfig;
use crate::error::StatsError;
use crate::grid::{history_grid, month_calendar, HistoryGrid, MonthCalendar};
use crate::report::{HabitReport, ReportEncoder, StatsReport};
use crate::snapshot::DataExport;
use crate::statistics::{calculate_overall_statistics, calculate_statistics};
use crate::types::{OverallStatistics, StatisticsSummary};
use chrono::NaiveDate;
use tracing::debug;

/// Convert a host export document into a statistics report (stateless,
/// one-shot) using the default configuration.
///
/// # Arguments
/// * `export_json` - Export document (`version`, `habits`, `completions`)
/// * `today` - Reference day for every streak and window
///
/// # Example
/// ```ignore
/// let report_json = export_to_report(export_json, calendar::today())?;
/// ```
pub fn export_to_report(export_json: String, today: NaiveDate) -> Result<String, StatsError> {
    StatsProcessor::new().process_export(&export_json, today)
}

/// Statistics summary for a single habit of an export document, as JSON.
pub fn habit_statistics_json(
    export_json: &str,
    habit_id: &str,
    today: NaiveDate,
) -> Result<String, StatsError> {
    let export = DataExport::from_json(export_json)?;
    let summary = StatsProcessor::new().habit_statistics(&export, habit_id, today)?;
    serde_json::to_string(&summary).map_err(StatsError::JsonError)
}

/// Processor holding configuration and report identity across calls.
///
/// Use this when one host session computes several reports or views and the
/// reports should share an instance id.
pub struct StatsProcessor {
    config: EngineConfig,
    encoder: ReportEncoder,
}

impl Default for StatsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsProcessor {
    /// Create a processor with the default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with a validated configuration
    pub fn with_config(config: EngineConfig) -> Result<Self, StatsError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    /// Replace the report encoder (for a fixed instance id)
    pub fn with_encoder(mut self, encoder: ReportEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse an export document and return the report as JSON
    pub fn process_export(
        &self,
        export_json: &str,
        today: NaiveDate,
    ) -> Result<String, StatsError> {
        let export = DataExport::from_json(export_json)?;
        let report = self.build_report(&export, today);
        serde_json::to_string_pretty(&report).map_err(|e| StatsError::EncodingError(e.to_string()))
    }

    /// Compute the full report for an export
    pub fn build_report(&self, export: &DataExport, today: NaiveDate) -> StatsReport {
        let issues = export.validate();
        debug!(
            habits = export.habits.len(),
            issues = issues.len(),
            "building statistics report"
        );

        let habits = export
            .habits
            .iter()
            .map(|habit| {
                let summary = calculate_statistics(habit, &export.completions, today, &self.config);
                HabitReport::new(habit, summary)
            })
            .collect();

        let overall = self.overall_statistics(export, today);
        self.encoder.encode(today, overall, habits)
    }

    /// Summary for one habit of an export
    pub fn habit_statistics(
        &self,
        export: &DataExport,
        habit_id: &str,
        today: NaiveDate,
    ) -> Result<StatisticsSummary, StatsError> {
        let habit = export.habit(habit_id)?;
        Ok(calculate_statistics(habit, &export.completions, today, &self.config))
    }

    /// Dashboard rollup for an export
    pub fn overall_statistics(&self, export: &DataExport, today: NaiveDate) -> OverallStatistics {
        calculate_overall_statistics(&export.habits, &export.completions, today, &self.config)
    }

    /// History grid over the configured number of weeks
    pub fn history_grid(
        &self,
        export: &DataExport,
        habit_id: &str,
        today: NaiveDate,
    ) -> Result<HistoryGrid, StatsError> {
        let habit = export.habit(habit_id)?;
        Ok(history_grid(&habit.id, &export.completions, today, self.config.grid_weeks))
    }

    /// Calendar page for the month containing `day`
    pub fn month_calendar(
        &self,
        export: &DataExport,
        habit_id: &str,
        day: NaiveDate,
    ) -> Result<MonthCalendar, StatsError> {
        let habit = export.habit(habit_id)?;
        Ok(month_calendar(&habit.id, &export.completions, day))
    }
}

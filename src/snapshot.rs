//! Host data export document
//!
//! The host application persists habits, completions and settings as JSON
//! blobs under fixed storage keys, and exports them together as one
//! document:
//!
//! ```json
//! { "version": "1.0", "exportDate": "...", "habits": [...], "completions": [...], "settings": {} }
//! ```
//!
//! This module parses and checks that document so the engine can run over a
//! complete snapshot. Persistence itself stays with the host.

use crate::error::StatsError;
use crate::types::{CompletionRecord, Habit};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Export document version written by the host
pub const EXPORT_VERSION: &str = "1.0";

/// Storage key holding the habits array
pub const HABITS_KEY: &str = "@habithero_habits";

/// Storage key holding the completions array
pub const COMPLETIONS_KEY: &str = "@habithero_completions";

/// Storage key holding the settings object
pub const SETTINGS_KEY: &str = "@habithero_settings";

/// Full snapshot of the host's habit data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,
    pub habits: Vec<Habit>,
    pub completions: Vec<CompletionRecord>,
    #[serde(default)]
    pub settings: serde_json::Value,
}

/// Consistency problems found in an otherwise well-formed export
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Habit at index {index} has an empty id")]
    EmptyHabitId { index: usize },

    #[error("Habit id {habit_id} appears more than once")]
    DuplicateHabitId { habit_id: String },

    #[error("Completion at index {index} references unknown habit {habit_id}")]
    UnknownHabitReference { index: usize, habit_id: String },

    #[error("Habit {habit_id} has more than one record for {date}")]
    DuplicateCompletion { habit_id: String, date: NaiveDate },
}

impl DataExport {
    /// Build a snapshot from in-memory collections
    pub fn new(habits: Vec<Habit>, completions: Vec<CompletionRecord>) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            export_date: None,
            habits,
            completions,
            settings: serde_json::Value::Object(Default::default()),
        }
    }

    /// Parse an export document.
    ///
    /// `version`, `habits` and `completions` are required; a missing or empty
    /// one is an [`StatsError::InvalidExport`]. Malformed completion days
    /// fail the whole document.
    pub fn from_json(json: &str) -> Result<Self, StatsError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let has_version = value
            .get("version")
            .and_then(|v| v.as_str())
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        if !has_version {
            return Err(StatsError::InvalidExport("missing version".to_string()));
        }
        for field in ["habits", "completions"] {
            if !value.get(field).map(|v| v.is_array()).unwrap_or(false) {
                return Err(StatsError::InvalidExport(format!("missing {field} array")));
            }
        }

        let export: Self = serde_json::from_value(value).map_err(map_field_error)?;
        debug!(
            version = %export.version,
            habits = export.habits.len(),
            completions = export.completions.len(),
            "parsed data export"
        );
        Ok(export)
    }

    /// Assemble a snapshot from the raw values stored under
    /// [`HABITS_KEY`], [`COMPLETIONS_KEY`] and [`SETTINGS_KEY`]. An absent
    /// key reads as empty.
    pub fn from_storage_values(
        habits_json: Option<&str>,
        completions_json: Option<&str>,
        settings_json: Option<&str>,
    ) -> Result<Self, StatsError> {
        let habits: Vec<Habit> = match habits_json {
            Some(json) => serde_json::from_str(json).map_err(map_field_error)?,
            None => Vec::new(),
        };
        let completions: Vec<CompletionRecord> = match completions_json {
            Some(json) => serde_json::from_str(json).map_err(map_field_error)?,
            None => Vec::new(),
        };

        let mut export = Self::new(habits, completions);
        if let Some(json) = settings_json {
            export.settings = serde_json::from_str(json)?;
        }
        Ok(export)
    }

    pub fn with_export_date(mut self, export_date: impl Into<String>) -> Self {
        self.export_date = Some(export_date.into());
        self
    }

    pub fn to_json_pretty(&self) -> Result<String, StatsError> {
        serde_json::to_string_pretty(self).map_err(StatsError::JsonError)
    }

    /// Look up a habit by id
    pub fn habit(&self, habit_id: &str) -> Result<&Habit, StatsError> {
        self.habits
            .iter()
            .find(|h| h.id == habit_id)
            .ok_or_else(|| StatsError::UnknownHabit(habit_id.to_string()))
    }

    pub fn active_habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.iter().filter(|h| h.is_active())
    }

    /// Check cross-record consistency. Returns every problem found; an empty
    /// vector means the snapshot is consistent.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut ids: HashSet<&str> = HashSet::new();

        for (index, habit) in self.habits.iter().enumerate() {
            if habit.id.is_empty() {
                errors.push(ValidationError::EmptyHabitId { index });
            } else if !ids.insert(habit.id.as_str()) {
                errors.push(ValidationError::DuplicateHabitId {
                    habit_id: habit.id.clone(),
                });
            }
        }

        let mut seen: HashSet<(&str, NaiveDate)> = HashSet::new();
        for (index, record) in self.completions.iter().enumerate() {
            if !ids.contains(record.habit_id.as_str()) {
                errors.push(ValidationError::UnknownHabitReference {
                    index,
                    habit_id: record.habit_id.clone(),
                });
            }
            if !seen.insert((record.habit_id.as_str(), record.date)) {
                errors.push(ValidationError::DuplicateCompletion {
                    habit_id: record.habit_id.clone(),
                    date: record.date,
                });
            }
        }

        for error in &errors {
            warn!(%error, "export validation issue");
        }
        errors
    }
}

/// Day parse failures surface through serde as custom messages; keep them
/// distinguishable as malformed dates.
fn map_field_error(e: serde_json::Error) -> StatsError {
    let message = e.to_string();
    if message.starts_with("Malformed date") {
        StatsError::MalformedDate(message)
    } else {
        StatsError::JsonError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_date;
    use pretty_assertions::assert_eq;

    fn sample_export_json() -> &'static str {
        r##"{
            "version": "1.0",
            "exportDate": "2024-01-05T20:00:00.000Z",
            "habits": [
                {
                    "id": "read",
                    "name": "Read",
                    "icon": "book",
                    "color": "#4CAF50",
                    "frequency": "daily",
                    "createdAt": "2024-01-01T00:00:00.000Z"
                },
                {
                    "id": "gym",
                    "name": "Gym",
                    "frequency": "weekly",
                    "targetPerWeek": 2,
                    "createdAt": "2024-01-01T00:00:00.000Z",
                    "archived": true
                }
            ],
            "completions": [
                { "habitId": "read", "date": "2024-01-01", "completed": true },
                { "habitId": "read", "date": "2024-01-02", "completed": true },
                { "habitId": "gym", "date": "2024-01-03", "completed": false }
            ],
            "settings": { "theme": "dark" }
        }"##
    }

    #[test]
    fn test_parse_export() {
        let export = DataExport::from_json(sample_export_json()).unwrap();
        assert_eq!(export.version, "1.0");
        assert_eq!(export.habits.len(), 2);
        assert_eq!(export.completions.len(), 3);
        assert_eq!(export.settings["theme"], "dark");
        assert_eq!(export.habits[0].color.as_deref(), Some("#4CAF50"));
        assert_eq!(export.active_habits().count(), 1);
        assert!(export.validate().is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        for json in [
            r#"{ "habits": [], "completions": [] }"#,
            r#"{ "version": "", "habits": [], "completions": [] }"#,
            r#"{ "version": "1.0", "completions": [] }"#,
            r#"{ "version": "1.0", "habits": [] }"#,
        ] {
            let err = DataExport::from_json(json).unwrap_err();
            assert!(matches!(err, StatsError::InvalidExport(_)), "{json}");
        }
    }

    #[test]
    fn test_malformed_completion_date() {
        let json = r#"{
            "version": "1.0",
            "habits": [],
            "completions": [{ "habitId": "x", "date": "01/05/2024", "completed": true }]
        }"#;
        let err = DataExport::from_json(json).unwrap_err();
        assert!(matches!(err, StatsError::MalformedDate(_)), "{err}");
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            DataExport::from_json("not json"),
            Err(StatsError::JsonError(_))
        ));
    }

    #[test]
    fn test_validate_reports_issues() {
        let mut export = DataExport::from_json(sample_export_json()).unwrap();
        let mut dup = export.habits[0].clone();
        dup.name = "Read again".to_string();
        export.habits.push(dup);
        export.completions.push(CompletionRecord::done("ghost", parse_date("2024-01-04").unwrap()));
        export.completions.push(CompletionRecord::done("read", parse_date("2024-01-01").unwrap()));

        assert_eq!(
            export.validate(),
            vec![
                ValidationError::DuplicateHabitId { habit_id: "read".to_string() },
                ValidationError::UnknownHabitReference { index: 3, habit_id: "ghost".to_string() },
                ValidationError::DuplicateCompletion {
                    habit_id: "read".to_string(),
                    date: parse_date("2024-01-01").unwrap(),
                },
            ]
        );
    }

    #[test]
    fn test_from_storage_values() {
        let habits = r#"[{
            "id": "h",
            "frequency": "monthly",
            "targetPerMonth": 4,
            "createdAt": "2024-01-01"
        }]"#;
        let completions = r#"[{ "habitId": "h", "date": "2024-01-10", "completed": true }]"#;

        let export =
            DataExport::from_storage_values(Some(habits), Some(completions), None).unwrap();
        assert_eq!(export.version, EXPORT_VERSION);
        assert_eq!(export.habits[0].target_per_month, Some(4));
        assert_eq!(export.completions.len(), 1);

        let empty = DataExport::from_storage_values(None, None, None).unwrap();
        assert!(empty.habits.is_empty());
        assert!(empty.completions.is_empty());
    }

    #[test]
    fn test_round_trip_and_lookup() {
        let export = DataExport::from_json(sample_export_json()).unwrap();
        assert_eq!(export.export_date.as_deref(), Some("2024-01-05T20:00:00.000Z"));
        let reparsed = DataExport::from_json(&export.to_json_pretty().unwrap()).unwrap();
        assert_eq!(reparsed, export);

        assert_eq!(export.habit("gym").unwrap().name, "Gym");

        let stamped = DataExport::new(export.habits.clone(), vec![]).with_export_date("2024-02-01");
        let json = stamped.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["exportDate"], "2024-02-01");
        assert_eq!(value["version"], EXPORT_VERSION);
        assert!(matches!(export.habit("nope"), Err(StatsError::UnknownHabit(_))));
    }
}

//! Core types for the Streakline engine
//!
//! Habits and completion records arrive in the host application's camelCase
//! JSON shape. Everything derived from them (summaries, rollups) is an
//! ephemeral value recomputed per request.

use crate::calendar::{serde_day, serde_timestamp};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How often a habit is expected to be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Name of the period a streak of this frequency counts in
    pub fn period_label(&self) -> &'static str {
        match self {
            Frequency::Daily => "days",
            Frequency::Weekly => "weeks",
            Frequency::Monthly => "months",
        }
    }
}

/// A habit's cadence with its target resolved.
///
/// Built from a [`Habit`] so the frequency and its matching target can never
/// disagree: a weekly habit only ever carries `target_per_week`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Weekly { target: u32 },
    Monthly { target: u32 },
}

impl Cadence {
    pub fn frequency(&self) -> Frequency {
        match self {
            Cadence::Daily => Frequency::Daily,
            Cadence::Weekly { .. } => Frequency::Weekly,
            Cadence::Monthly { .. } => Frequency::Monthly,
        }
    }
}

/// A tracked habit as stored by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Opaque identifier, stable for the habit's lifetime
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub frequency: Frequency,
    /// Completions required per week (weekly habits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_per_week: Option<u32>,
    /// Completions required per month (monthly habits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_per_month: Option<u32>,
    /// Creation time, lower bound for rate denominators
    #[serde(with = "serde_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub archived: bool,
}

impl Habit {
    /// Create a habit with no display metadata
    pub fn new(id: impl Into<String>, frequency: Frequency, created_at: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            icon: None,
            color: None,
            frequency,
            target_per_week: None,
            target_per_month: None,
            created_at,
            archived: false,
        }
    }

    /// Resolve the cadence, substituting `default_target` for a missing or
    /// zero target.
    pub fn cadence_with_default(&self, default_target: u32) -> Cadence {
        let resolve = |target: Option<u32>| match target {
            Some(t) if t > 0 => t,
            _ => default_target.max(1),
        };

        match self.frequency {
            Frequency::Daily => Cadence::Daily,
            Frequency::Weekly => Cadence::Weekly {
                target: resolve(self.target_per_week),
            },
            Frequency::Monthly => Cadence::Monthly {
                target: resolve(self.target_per_month),
            },
        }
    }

    /// Resolve the cadence with the default target of 1
    pub fn cadence(&self) -> Cadence {
        self.cadence_with_default(1)
    }

    pub fn is_active(&self) -> bool {
        !self.archived
    }
}

/// One day's completion state for one habit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    /// Non-owning reference to [`Habit::id`]
    pub habit_id: String,
    /// Calendar day, `YYYY-MM-DD` on the wire
    #[serde(with = "serde_day")]
    pub date: NaiveDate,
    /// A record with `completed == false` is treated as absent
    pub completed: bool,
}

impl CompletionRecord {
    /// A completed record for `habit_id` on `date`
    pub fn done(habit_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            habit_id: habit_id.into(),
            date,
            completed: true,
        }
    }
}

/// Per-habit statistics summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    /// All completed days for the habit, unbounded
    pub total_completions: u32,
    /// Consecutive qualifying periods ending at (or next to) the reference day
    pub current_streak: u32,
    /// Longest run of qualifying periods
    pub longest_streak: u32,
    /// Completed days per day since creation, percent (0-100)
    pub completion_rate: u32,
    /// Completed days within the recent window
    pub last30_days: u32,
    /// Completions per week since creation, one decimal
    pub weekly_average: f64,
}

/// Dashboard-level rollup across every habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStatistics {
    pub total_habits: u32,
    /// Habits that are not archived
    pub active_habits: u32,
    pub total_completions: u32,
    pub completions_today: u32,
    /// Mean current streak over active habits, one decimal
    pub average_streak: f64,
}

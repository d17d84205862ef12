//! Streakline - On-device streak and statistics engine for habit tracking
//!
//! Streakline turns a host application's habits and completion records into
//! streaks and summary statistics through a deterministic pipeline: export
//! parsing → completion normalization → streak evaluation → statistics
//! aggregation → report encoding.
//!
//! Every computation takes an explicit reference day. Only
//! [`calendar::today`] reads the clock.
//!
//! ## Modules
//!
//! - **Calendar**: Day arithmetic, week/month boundaries and day formatting
//! - **Streaks**: Daily, weekly and monthly streak evaluation
//! - **Statistics**: Per-habit summaries and the dashboard rollup
//! - **Views**: History grids and month calendar pages

pub mod calendar;
pub mod completions;
pub mod config;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod report;
pub mod snapshot;
pub mod statistics;
pub mod streak;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use completions::{
    completion_count, is_completed_on_date, relevant_completions, toggle_completion, CompletionLog,
};
pub use config::{EngineConfig, LongestStreakMode};
pub use error::StatsError;
pub use grid::{history_grid, month_calendar, HistoryGrid, MonthCalendar};
pub use pipeline::{export_to_report, StatsProcessor};
pub use report::{ReportEncoder, StatsReport};
pub use snapshot::DataExport;
pub use statistics::{calculate_overall_statistics, calculate_statistics};
pub use streak::{current_streak, longest_streak};
pub use types::{
    Cadence, CompletionRecord, Frequency, Habit, OverallStatistics, StatisticsSummary,
};

/// Streakline version embedded in every report
pub const STREAKLINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "streakline";

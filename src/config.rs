//! Engine configuration
//!
//! Tunables for the statistics engine. The defaults reproduce the documented
//! behavior; hosts may load overrides from JSON.

use crate::error::StatsError;
use serde::{Deserialize, Serialize};

/// Default recent-activity window in days
pub const DEFAULT_RECENT_WINDOW_DAYS: u32 = 30;

/// Default number of weeks in the history grid
pub const DEFAULT_GRID_WEEKS: u32 = 12;

/// How `longest_streak` is computed for weekly and monthly habits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LongestStreakMode {
    /// Report the current streak as the longest streak
    #[default]
    MatchCurrent,
    /// Scan every period since the first completion for the longest run
    PeriodScan,
}

/// Statistics engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub longest_streak_mode: LongestStreakMode,
    /// Days back from the reference day counted by `last30Days`
    pub recent_window_days: u32,
    pub grid_weeks: u32,
    /// Target substituted when a weekly/monthly habit has none
    pub default_target: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            longest_streak_mode: LongestStreakMode::default(),
            recent_window_days: DEFAULT_RECENT_WINDOW_DAYS,
            grid_weeks: DEFAULT_GRID_WEEKS,
            default_target: 1,
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration from JSON. Missing fields keep
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, StatsError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| StatsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, StatsError> {
        serde_json::to_string_pretty(self).map_err(StatsError::JsonError)
    }

    pub fn validate(&self) -> Result<(), StatsError> {
        if self.recent_window_days == 0 {
            return Err(StatsError::InvalidConfig(
                "recent_window_days must be positive".to_string(),
            ));
        }
        if self.grid_weeks == 0 {
            return Err(StatsError::InvalidConfig(
                "grid_weeks must be positive".to_string(),
            ));
        }
        if self.default_target == 0 {
            return Err(StatsError::InvalidConfig(
                "default_target must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_longest_streak_mode(mut self, mode: LongestStreakMode) -> Self {
        self.longest_streak_mode = mode;
        self
    }
}

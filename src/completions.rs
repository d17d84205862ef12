//! Completion log filtering
//!
//! Turns the host's flat list of completion records into the per-habit view
//! the streak engine works on: only completed records for one habit, in
//! ascending day order, one entry per day.

use crate::types::CompletionRecord;
use chrono::NaiveDate;

/// Completed records for `habit_id`, sorted ascending by day.
///
/// Records with `completed == false` are dropped rather than treated as a
/// negative signal.
pub fn relevant_completions<'a>(
    habit_id: &str,
    completions: &'a [CompletionRecord],
) -> Vec<&'a CompletionRecord> {
    let mut relevant: Vec<&CompletionRecord> = completions
        .iter()
        .filter(|c| c.habit_id == habit_id && c.completed)
        .collect();
    relevant.sort_by_key(|c| c.date);
    relevant
}

/// Normalized per-habit log of completed days.
///
/// Days are sorted ascending and deduplicated, so duplicate records for the
/// same day count once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionLog {
    days: Vec<NaiveDate>,
}

impl CompletionLog {
    /// Build the log for one habit from the full record list
    pub fn for_habit(habit_id: &str, completions: &[CompletionRecord]) -> Self {
        let mut days: Vec<NaiveDate> = relevant_completions(habit_id, completions)
            .into_iter()
            .map(|c| c.date)
            .collect();
        days.dedup();
        Self { days }
    }

    /// Build a log directly from completed days in any order
    pub fn from_days(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut days: Vec<NaiveDate> = days.into_iter().collect();
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.days.first().copied()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.days.last().copied()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.days.binary_search(&day).is_ok()
    }

    /// Number of completed days in `[start, end]`
    pub fn count_between(&self, start: NaiveDate, end: NaiveDate) -> usize {
        if start > end {
            return 0;
        }
        let lo = self.days.partition_point(|d| *d < start);
        let hi = self.days.partition_point(|d| *d <= end);
        hi - lo
    }
}

/// Whether `habit_id` has a completed record on `day`
pub fn is_completed_on_date(
    habit_id: &str,
    day: NaiveDate,
    completions: &[CompletionRecord],
) -> bool {
    completions
        .iter()
        .any(|c| c.habit_id == habit_id && c.date == day && c.completed)
}

/// Completed days for `habit_id` within `[start, end]`. Duplicate records
/// for one day count once.
pub fn completion_count(
    habit_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    completions: &[CompletionRecord],
) -> usize {
    CompletionLog::for_habit(habit_id, completions).count_between(start, end)
}

/// Flip the completion state of `habit_id` on `day`.
///
/// An existing record has its `completed` flag inverted in place; otherwise a
/// new completed record is appended. Returns the resulting state.
pub fn toggle_completion(
    completions: &mut Vec<CompletionRecord>,
    habit_id: &str,
    day: NaiveDate,
) -> bool {
    match completions
        .iter_mut()
        .find(|c| c.habit_id == habit_id && c.date == day)
    {
        Some(existing) => {
            existing.completed = !existing.completed;
            existing.completed
        }
        None => {
            completions.push(CompletionRecord::done(habit_id, day));
            true
        }
    }
}

/// Drop every record belonging to `habit_id`, returning how many were removed
pub fn remove_habit_completions(completions: &mut Vec<CompletionRecord>, habit_id: &str) -> usize {
    let before = completions.len();
    completions.retain(|c| c.habit_id != habit_id);
    before - completions.len()
}

//! Statistics aggregation
//!
//! Combines streaks with windowed counts and creation-relative rates into a
//! [`StatisticsSummary`], and rolls every habit up into
//! [`OverallStatistics`] for the dashboard. One reference day is used for
//! every sub-calculation of a request.

use crate::calendar::{add_days, start_of_day};
use crate::completions::CompletionLog;
use crate::config::EngineConfig;
use crate::streak::{current_streak, longest_streak};
use crate::types::{CompletionRecord, Habit, OverallStatistics, StatisticsSummary};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

/// Whole days from the habit's creation to the start of `today`, at least 1
pub fn days_since_creation(habit: &Habit, today: NaiveDate) -> i64 {
    start_of_day(today)
        .signed_duration_since(habit.created_at)
        .num_days()
        .max(1)
}

/// Round to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the full statistics summary for one habit as of `today`
pub fn calculate_statistics(
    habit: &Habit,
    completions: &[CompletionRecord],
    today: NaiveDate,
    config: &EngineConfig,
) -> StatisticsSummary {
    let log = CompletionLog::for_habit(&habit.id, completions);
    summarize(habit, &log, today, config)
}

/// Compute the summary from an already-normalized log
pub fn summarize(
    habit: &Habit,
    log: &CompletionLog,
    today: NaiveDate,
    config: &EngineConfig,
) -> StatisticsSummary {
    let cadence = habit.cadence_with_default(config.default_target);
    let total_completions = log.len() as u32;

    let current = current_streak(cadence, log, today);
    let longest = longest_streak(cadence, log, today, config.longest_streak_mode);

    let window_start = add_days(today, -i64::from(config.recent_window_days));
    let last30_days = log.count_between(window_start, today) as u32;

    let days = days_since_creation(habit, today) as f64;
    let completion_rate = ((f64::from(total_completions) / days) * 100.0)
        .round()
        .clamp(0.0, 100.0) as u32;

    let weeks = (days / 7.0).max(1.0);
    let weekly_average = round_to_tenth(f64::from(total_completions) / weeks);

    debug!(
        habit_id = %habit.id,
        frequency = cadence.frequency().as_str(),
        total_completions,
        current_streak = current,
        longest_streak = longest,
        "computed habit statistics"
    );

    StatisticsSummary {
        total_completions,
        current_streak: current,
        longest_streak: longest,
        completion_rate,
        last30_days,
        weekly_average,
    }
}

/// Dashboard rollup across all habits as of `today`.
///
/// Completion totals count completed (habit, day) pairs across every habit,
/// so duplicate records count once as they do per habit. The average streak
/// only considers habits that are not archived.
pub fn calculate_overall_statistics(
    habits: &[Habit],
    completions: &[CompletionRecord],
    today: NaiveDate,
    config: &EngineConfig,
) -> OverallStatistics {
    let active: Vec<&Habit> = habits.iter().filter(|h| h.is_active()).collect();

    let completed_days: HashSet<(&str, NaiveDate)> = completions
        .iter()
        .filter(|c| c.completed)
        .map(|c| (c.habit_id.as_str(), c.date))
        .collect();
    let total_completions = completed_days.len() as u32;
    let completions_today = completed_days.iter().filter(|(_, date)| *date == today).count() as u32;

    let streaks: Vec<u32> = active
        .iter()
        .map(|habit| {
            let log = CompletionLog::for_habit(&habit.id, completions);
            current_streak(habit.cadence_with_default(config.default_target), &log, today)
        })
        .collect();

    let average_streak = if streaks.is_empty() {
        0.0
    } else {
        let sum: u32 = streaks.iter().sum();
        round_to_tenth(f64::from(sum) / streaks.len() as f64)
    };

    debug!(
        total_habits = habits.len(),
        active_habits = active.len(),
        total_completions,
        "computed overall statistics"
    );

    OverallStatistics {
        total_habits: habits.len() as u32,
        active_habits: active.len() as u32,
        total_completions,
        completions_today,
        average_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{days_in_range, parse_date, parse_timestamp};
    use crate::config::LongestStreakMode;
    use crate::types::Frequency;
    use pretty_assertions::assert_eq;

    fn day(raw: &str) -> NaiveDate {
        parse_date(raw).unwrap()
    }

    fn habit(id: &str, frequency: Frequency, created: &str) -> Habit {
        Habit::new(id, frequency, parse_timestamp(created).unwrap())
    }

    fn done_range(habit_id: &str, start: &str, end: &str) -> Vec<CompletionRecord> {
        days_in_range(day(start), day(end))
            .into_iter()
            .map(|d| CompletionRecord::done(habit_id, d))
            .collect()
    }

    #[test]
    fn test_five_day_scenario() {
        let habit = habit("h", Frequency::Daily, "2024-01-01");
        let completions = done_range("h", "2024-01-01", "2024-01-05");
        let today = day("2024-01-05");

        assert_eq!(days_since_creation(&habit, today), 4);

        let stats = calculate_statistics(&habit, &completions, today, &EngineConfig::default());
        assert_eq!(
            stats,
            StatisticsSummary {
                total_completions: 5,
                current_streak: 5,
                longest_streak: 5,
                completion_rate: 100,
                last30_days: 5,
                weekly_average: 5.0,
            }
        );
    }

    #[test]
    fn test_empty_log_yields_zeros() {
        let today = day("2024-06-01");
        for frequency in [Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            let habit = habit("h", frequency, "2024-01-01");
            let stats = calculate_statistics(&habit, &[], today, &EngineConfig::default());
            assert_eq!(stats.total_completions, 0);
            assert_eq!(stats.current_streak, 0);
            assert_eq!(stats.longest_streak, 0);
            assert_eq!(stats.completion_rate, 0);
            assert_eq!(stats.last30_days, 0);
            assert_eq!(stats.weekly_average, 0.0);
        }
    }

    #[test]
    fn test_created_today_floors_denominator() {
        let habit = habit("h", Frequency::Daily, "2024-01-05T09:00:00");
        let completions = done_range("h", "2024-01-05", "2024-01-05");
        let today = day("2024-01-05");

        assert_eq!(days_since_creation(&habit, today), 1);
        let stats = calculate_statistics(&habit, &completions, today, &EngineConfig::default());
        assert_eq!(stats.completion_rate, 100);
        assert_eq!(stats.weekly_average, 1.0);
    }

    #[test]
    fn test_completion_rate_clamped_for_backfilled_history() {
        // Completions logged before the creation date push the raw rate past 100
        let habit = habit("h", Frequency::Daily, "2024-03-01");
        let completions = done_range("h", "2024-01-01", "2024-03-05");
        let stats =
            calculate_statistics(&habit, &completions, day("2024-03-05"), &EngineConfig::default());
        assert_eq!(stats.completion_rate, 100);
    }

    #[test]
    fn test_partial_rate_and_weekly_average() {
        // 28 days since creation, 7 completions -> 25%, 1.75/week -> 1.8
        let habit = habit("h", Frequency::Daily, "2024-02-01");
        let completions: Vec<CompletionRecord> = [
            "2024-02-02",
            "2024-02-05",
            "2024-02-09",
            "2024-02-13",
            "2024-02-17",
            "2024-02-21",
            "2024-02-25",
        ]
        .iter()
        .map(|d| CompletionRecord::done("h", day(d)))
        .collect();
        let stats =
            calculate_statistics(&habit, &completions, day("2024-02-29"), &EngineConfig::default());
        assert_eq!(stats.completion_rate, 25);
        assert_eq!(stats.weekly_average, 1.8);
    }

    #[test]
    fn test_creation_time_of_day_floors_days() {
        // 3 days and 14 hours before the start of today floors to 3
        let habit = habit("h", Frequency::Daily, "2024-01-01T10:00:00.000Z");
        assert_eq!(days_since_creation(&habit, day("2024-01-05")), 3);
    }

    #[test]
    fn test_last30_window_is_inclusive() {
        let habit = habit("h", Frequency::Daily, "2023-01-01");
        let mut completions = vec![
            CompletionRecord::done("h", day("2024-02-29")), // today - 31
            CompletionRecord::done("h", day("2024-03-01")), // today - 30
            CompletionRecord::done("h", day("2024-03-31")), // today
        ];
        completions.push(CompletionRecord {
            habit_id: "h".to_string(),
            date: day("2024-03-20"),
            completed: false,
        });

        let stats =
            calculate_statistics(&habit, &completions, day("2024-03-31"), &EngineConfig::default());
        assert_eq!(stats.last30_days, 2);
        assert_eq!(stats.total_completions, 3);
    }

    #[test]
    fn test_weekly_habit_uses_period_scan_when_configured() {
        let mut habit = habit("h", Frequency::Weekly, "2024-01-01");
        habit.target_per_week = Some(1);
        let completions: Vec<CompletionRecord> =
            ["2024-01-07", "2024-01-14", "2024-01-21", "2024-03-10"]
                .iter()
                .map(|d| CompletionRecord::done("h", day(d)))
                .collect();
        let today = day("2024-03-12");

        let default_stats =
            calculate_statistics(&habit, &completions, today, &EngineConfig::default());
        assert_eq!(default_stats.longest_streak, default_stats.current_streak);

        let scan = EngineConfig::default().with_longest_streak_mode(LongestStreakMode::PeriodScan);
        let scan_stats = calculate_statistics(&habit, &completions, today, &scan);
        assert_eq!(scan_stats.current_streak, 1);
        assert_eq!(scan_stats.longest_streak, 3);
    }

    #[test]
    fn test_overall_statistics() {
        let daily = habit("daily", Frequency::Daily, "2024-01-01");
        let mut weekly = habit("weekly", Frequency::Weekly, "2024-01-01");
        weekly.target_per_week = Some(2);
        let mut archived = habit("old", Frequency::Daily, "2023-01-01");
        archived.archived = true;

        let today = day("2024-03-14");
        let mut completions = done_range("daily", "2024-03-10", "2024-03-14");
        completions.extend(done_range("weekly", "2024-03-10", "2024-03-11"));
        completions.extend(done_range("old", "2024-03-13", "2024-03-14"));
        completions.push(CompletionRecord {
            habit_id: "daily".to_string(),
            date: day("2024-03-01"),
            completed: false,
        });

        let overall = calculate_overall_statistics(
            &[daily, weekly, archived],
            &completions,
            today,
            &EngineConfig::default(),
        );

        assert_eq!(
            overall,
            OverallStatistics {
                total_habits: 3,
                active_habits: 2,
                total_completions: 9,
                completions_today: 2,
                // (5 + 1) / 2
                average_streak: 3.0,
            }
        );
    }

    #[test]
    fn test_duplicate_records_count_once_everywhere() {
        let habit = habit("h", Frequency::Daily, "2024-03-01");
        let today = day("2024-03-14");
        let completions = vec![
            CompletionRecord::done("h", today),
            CompletionRecord::done("h", today),
        ];
        let config = EngineConfig::default();

        let summary = calculate_statistics(&habit, &completions, today, &config);
        let habits = std::slice::from_ref(&habit);
        let overall = calculate_overall_statistics(habits, &completions, today, &config);

        assert_eq!(summary.total_completions, 1);
        assert_eq!(overall.total_completions, summary.total_completions);
        assert_eq!(overall.completions_today, 1);
    }

    #[test]
    fn test_overall_without_active_habits() {
        let overall =
            calculate_overall_statistics(&[], &[], day("2024-03-14"), &EngineConfig::default());
        assert_eq!(overall.average_streak, 0.0);
        assert_eq!(overall.active_habits, 0);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(1.75), 1.8);
        assert_eq!(round_to_tenth(2.0 / 3.0), 0.7);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }
}

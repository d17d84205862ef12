//! Streak computation
//!
//! Current and longest streaks for each cadence. Every function takes the
//! normalized [`CompletionLog`] and an explicit reference day; none of them
//! reads the clock or re-filters the log.
//!
//! - Daily: consecutive calendar days ending today, or yesterday while today
//!   is still open.
//! - Weekly: consecutive Sunday-anchored weeks meeting `target`, starting
//!   with the week that contains the reference day.
//! - Monthly: consecutive calendar months meeting `target`, same walk.

use crate::calendar::{add_days, days_between, month_end, month_start, week_start};
use crate::completions::CompletionLog;
use crate::config::LongestStreakMode;
use crate::types::Cadence;
use chrono::NaiveDate;

/// Calendar period a non-daily cadence is evaluated over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Week,
    Month,
}

impl Period {
    /// First day of the period containing `day`
    fn start_of(&self, day: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => week_start(day),
            Period::Month => month_start(day),
        }
    }

    /// Last day of the period starting at `start`
    fn end_of(&self, start: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => add_days(start, 6),
            Period::Month => month_end(start),
        }
    }

    fn previous(&self, start: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => add_days(start, -7),
            Period::Month => month_start(add_days(start, -1)),
        }
    }

    fn next(&self, start: NaiveDate) -> NaiveDate {
        add_days(self.end_of(start), 1)
    }

    fn is_met(&self, log: &CompletionLog, start: NaiveDate, target: u32) -> bool {
        log.count_between(start, self.end_of(start)) >= target as usize
    }
}

/// Current streak for `cadence` as of `today`
pub fn current_streak(cadence: Cadence, log: &CompletionLog, today: NaiveDate) -> u32 {
    match cadence {
        Cadence::Daily => daily_current_streak(log, today),
        Cadence::Weekly { target } => period_current_streak(Period::Week, log, today, target),
        Cadence::Monthly { target } => period_current_streak(Period::Month, log, today, target),
    }
}

/// Longest streak for `cadence`.
///
/// Daily habits always scan the full log. Weekly and monthly habits follow
/// `mode`: either the current streak is reported, or every period since the
/// first completion is scanned.
pub fn longest_streak(
    cadence: Cadence,
    log: &CompletionLog,
    today: NaiveDate,
    mode: LongestStreakMode,
) -> u32 {
    match (cadence, mode) {
        (Cadence::Daily, _) => daily_longest_streak(log),
        (_, LongestStreakMode::MatchCurrent) => current_streak(cadence, log, today),
        (Cadence::Weekly { target }, LongestStreakMode::PeriodScan) => {
            period_longest_streak(Period::Week, log, today, target)
        }
        (Cadence::Monthly { target }, LongestStreakMode::PeriodScan) => {
            period_longest_streak(Period::Month, log, today, target)
        }
    }
}

fn daily_current_streak(log: &CompletionLog, today: NaiveDate) -> u32 {
    let Some(latest) = log.latest() else {
        return 0;
    };

    let yesterday = add_days(today, -1);
    if latest != today && latest != yesterday {
        return 0;
    }

    // Today may still be open, in which case the run is anchored on yesterday
    let mut cursor = if log.contains(today) { today } else { yesterday };
    let mut streak = 0;
    while log.contains(cursor) {
        streak += 1;
        cursor = add_days(cursor, -1);
    }
    streak
}

fn daily_longest_streak(log: &CompletionLog) -> u32 {
    if log.is_empty() {
        return 0;
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in log.days().windows(2) {
        if days_between(pair[0], pair[1]) == 1 {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
    }
    longest
}

fn period_current_streak(
    period: Period,
    log: &CompletionLog,
    today: NaiveDate,
    target: u32,
) -> u32 {
    let Some(earliest) = log.earliest() else {
        return 0;
    };

    let mut start = period.start_of(today);
    let mut streak = 0;
    while start >= period.start_of(earliest) && period.is_met(log, start, target) {
        streak += 1;
        start = period.previous(start);
    }
    streak
}

fn period_longest_streak(
    period: Period,
    log: &CompletionLog,
    today: NaiveDate,
    target: u32,
) -> u32 {
    let (Some(earliest), Some(latest)) = (log.earliest(), log.latest()) else {
        return 0;
    };

    let last = period.start_of(today.max(latest));
    let mut start = period.start_of(earliest);
    let mut longest = 0;
    let mut run = 0;
    while start <= last {
        if period.is_met(log, start, target) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
        start = period.next(start);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::parse_date;

    fn day(raw: &str) -> NaiveDate {
        parse_date(raw).unwrap()
    }

    fn log(days: &[&str]) -> CompletionLog {
        CompletionLog::from_days(days.iter().map(|d| day(d)))
    }

    /// The last `n` days ending on `end`
    fn run_ending(end: &str, n: i64) -> Vec<NaiveDate> {
        (0..n).map(|i| add_days(day(end), -i)).collect()
    }

    const WEEKLY_3: Cadence = Cadence::Weekly { target: 3 };

    #[test]
    fn test_empty_log_is_zero_everywhere() {
        let empty = CompletionLog::default();
        let today = day("2024-03-15");
        for cadence in [Cadence::Daily, WEEKLY_3, Cadence::Monthly { target: 2 }] {
            for mode in [LongestStreakMode::MatchCurrent, LongestStreakMode::PeriodScan] {
                assert_eq!(current_streak(cadence, &empty, today), 0);
                assert_eq!(longest_streak(cadence, &empty, today, mode), 0);
            }
        }
    }

    #[test]
    fn test_daily_consecutive_days_through_today() {
        for n in 1..=10 {
            let log = CompletionLog::from_days(run_ending("2024-03-15", n));
            assert_eq!(current_streak(Cadence::Daily, &log, day("2024-03-15")), n as u32);
        }
    }

    #[test]
    fn test_daily_today_and_yesterday_with_gap() {
        let log = log(&["2024-03-10", "2024-03-12", "2024-03-14", "2024-03-15"]);
        assert_eq!(current_streak(Cadence::Daily, &log, day("2024-03-15")), 2);
    }

    #[test]
    fn test_daily_open_today_anchors_on_yesterday() {
        let log = log(&["2024-03-12", "2024-03-13", "2024-03-14"]);
        assert_eq!(current_streak(Cadence::Daily, &log, day("2024-03-15")), 3);
    }

    #[test]
    fn test_daily_broken_after_missed_day() {
        let log = log(&["2024-03-11", "2024-03-12", "2024-03-13"]);
        assert_eq!(current_streak(Cadence::Daily, &log, day("2024-03-15")), 0);
        assert_eq!(current_streak(Cadence::Daily, &log, day("2024-04-01")), 0);
    }

    #[test]
    fn test_daily_longest_tracks_best_run() {
        let log = log(&[
            "2024-01-01",
            "2024-01-02",
            "2024-01-03",
            "2024-01-04",
            "2024-01-10",
            "2024-01-20",
            "2024-01-21",
        ]);
        let today = day("2024-01-21");
        assert_eq!(longest_streak(Cadence::Daily, &log, today, LongestStreakMode::MatchCurrent), 4);
        assert_eq!(current_streak(Cadence::Daily, &log, today), 2);
    }

    #[test]
    fn test_daily_longest_single_day() {
        let log = log(&["2024-01-10"]);
        assert_eq!(
            longest_streak(Cadence::Daily, &log, day("2024-06-01"), LongestStreakMode::PeriodScan),
            1
        );
    }

    #[test]
    fn test_daily_longest_crosses_month_boundary() {
        let log = log(&["2024-02-28", "2024-02-29", "2024-03-01"]);
        assert_eq!(
            longest_streak(
                Cadence::Daily,
                &log,
                day("2024-03-01"),
                LongestStreakMode::MatchCurrent
            ),
            3
        );
    }

    #[test]
    fn test_weekly_two_weeks_meeting_target() {
        // Week of 2024-03-10 (current) and week of 2024-03-03
        let log = log(&[
            "2024-03-10",
            "2024-03-11",
            "2024-03-13",
            "2024-03-03",
            "2024-03-05",
            "2024-03-09",
        ]);
        assert_eq!(current_streak(WEEKLY_3, &log, day("2024-03-14")), 2);
    }

    #[test]
    fn test_weekly_in_progress_week_short_of_target_breaks() {
        let log = log(&["2024-03-10", "2024-03-11", "2024-03-03", "2024-03-05", "2024-03-09"]);
        assert_eq!(current_streak(WEEKLY_3, &log, day("2024-03-14")), 0);
    }

    #[test]
    fn test_weekly_default_target_one() {
        let log = log(&["2024-03-12", "2024-03-06", "2024-02-26"]);
        let weekly = Cadence::Weekly { target: 1 };
        // Weeks starting 03-10, 03-03 and 02-25 each have one completion
        assert_eq!(current_streak(weekly, &log, day("2024-03-16")), 3);
    }

    #[test]
    fn test_weekly_spans_year_boundary() {
        // Week of 2023-12-31 holds days in both years
        let log = log(&["2023-12-31", "2024-01-06", "2023-12-26"]);
        let weekly = Cadence::Weekly { target: 1 };
        assert_eq!(current_streak(weekly, &log, day("2024-01-03")), 2);
    }

    #[test]
    fn test_monthly_walks_previous_months() {
        let log = log(&["2024-03-01", "2024-03-20", "2024-02-10", "2024-02-29", "2024-01-15"]);
        let monthly = Cadence::Monthly { target: 2 };
        assert_eq!(current_streak(monthly, &log, day("2024-03-25")), 2);

        let monthly_one = Cadence::Monthly { target: 1 };
        assert_eq!(current_streak(monthly_one, &log, day("2024-03-25")), 3);
    }

    #[test]
    fn test_monthly_crosses_year() {
        let log = log(&["2023-11-30", "2023-12-01", "2024-01-31"]);
        let monthly = Cadence::Monthly { target: 1 };
        assert_eq!(current_streak(monthly, &log, day("2024-01-31")), 3);
        assert_eq!(current_streak(monthly, &log, day("2024-02-01")), 0);
    }

    #[test]
    fn test_longest_match_current_for_weekly() {
        // Three qualifying weeks in January, then nothing until a single week in March
        let log = log(&["2024-01-07", "2024-01-14", "2024-01-21", "2024-03-10"]);
        let weekly = Cadence::Weekly { target: 1 };
        let today = day("2024-03-12");
        assert_eq!(current_streak(weekly, &log, today), 1);
        assert_eq!(longest_streak(weekly, &log, today, LongestStreakMode::MatchCurrent), 1);
        assert_eq!(longest_streak(weekly, &log, today, LongestStreakMode::PeriodScan), 3);
    }

    #[test]
    fn test_period_scan_never_below_current() {
        let log = log(&["2024-01-05", "2024-02-05", "2024-04-05", "2024-05-05", "2024-06-05"]);
        let monthly = Cadence::Monthly { target: 1 };
        let today = day("2024-06-20");
        let current = current_streak(monthly, &log, today);
        let longest = longest_streak(monthly, &log, today, LongestStreakMode::PeriodScan);
        assert_eq!(current, 3);
        assert_eq!(longest, 3);
    }

    #[test]
    fn test_period_scan_monthly_history() {
        let log = log(&[
            "2023-01-02",
            "2023-01-03",
            "2023-02-02",
            "2023-02-03",
            "2023-03-02",
            "2023-03-03",
            "2023-04-02",
            "2023-04-03",
            "2024-01-10",
        ]);
        let monthly = Cadence::Monthly { target: 2 };
        let today = day("2024-01-12");
        assert_eq!(current_streak(monthly, &log, today), 0);
        assert_eq!(longest_streak(monthly, &log, today, LongestStreakMode::PeriodScan), 4);
    }
}

//! History grids
//!
//! Day-by-day completion views for display: a contribution-style grid of the
//! last N weeks laid out in Sunday-started columns, and a single month laid
//! out as a calendar page.

use crate::calendar::{
    day_of_week, days_in_range, last_weeks, month_end, month_start, serde_day,
};
use crate::completions::CompletionLog;
use crate::types::CompletionRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day in a grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    #[serde(with = "serde_day")]
    pub date: NaiveDate,
    pub completed: bool,
}

/// A Sunday-started column of up to seven days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridWeek {
    /// Empty slots before the first cell (only non-zero for a partial first week)
    pub leading_blanks: u32,
    pub cells: Vec<GridCell>,
}

/// Completion history for the weeks ending on a reference day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryGrid {
    pub habit_id: String,
    pub weeks: Vec<GridWeek>,
}

impl HistoryGrid {
    pub fn completed_days(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|w| w.cells.iter())
            .filter(|c| c.completed)
            .count()
    }

    /// Render as text rows, one per weekday, `#` for completed and `.` for
    /// missed days
    pub fn render_text(&self) -> String {
        const LABELS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

        let mut rows: Vec<String> = LABELS.iter().map(|l| format!("{l} ")).collect();
        for week in &self.weeks {
            for (weekday, row) in rows.iter_mut().enumerate() {
                let slot = weekday as i64 - i64::from(week.leading_blanks);
                let glyph = usize::try_from(slot)
                    .ok()
                    .and_then(|i| week.cells.get(i))
                    .map(|c| if c.completed { '#' } else { '.' })
                    .unwrap_or(' ');
                row.push(glyph);
            }
        }
        rows.join("\n")
    }
}

/// Build the history grid for `habit_id` covering `weeks` weeks up to `today`
pub fn history_grid(
    habit_id: &str,
    completions: &[CompletionRecord],
    today: NaiveDate,
    weeks: u32,
) -> HistoryGrid {
    let log = CompletionLog::for_habit(habit_id, completions);
    let mut columns: Vec<GridWeek> = Vec::new();

    for date in last_weeks(today, weeks) {
        let cell = GridCell {
            date,
            completed: log.contains(date),
        };
        match columns.last_mut() {
            Some(column) if day_of_week(date) != 0 => column.cells.push(cell),
            _ => columns.push(GridWeek {
                leading_blanks: day_of_week(date),
                cells: vec![cell],
            }),
        }
    }

    HistoryGrid {
        habit_id: habit_id.to_string(),
        weeks: columns,
    }
}

/// One month of completions laid out as a calendar page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCalendar {
    pub habit_id: String,
    pub year: i32,
    pub month: u32,
    /// Weekday index (0 = Sunday) of the first day of the month
    pub leading_blanks: u32,
    pub days: Vec<GridCell>,
}

impl MonthCalendar {
    /// Title such as `2024-02`
    pub fn title(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn completed_days(&self) -> usize {
        self.days.iter().filter(|c| c.completed).count()
    }
}

/// Build the calendar page for the month containing `day`
pub fn month_calendar(
    habit_id: &str,
    completions: &[CompletionRecord],
    day: NaiveDate,
) -> MonthCalendar {
    let log = CompletionLog::for_habit(habit_id, completions);
    let first = month_start(day);

    let days = days_in_range(first, month_end(first))
        .into_iter()
        .map(|date| GridCell {
            date,
            completed: log.contains(date),
        })
        .collect();

    MonthCalendar {
        habit_id: habit_id.to_string(),
        year: first.year(),
        month: first.month(),
        leading_blanks: day_of_week(first),
        days,
    }
}

impl std::fmt::Display for MonthCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title())?;
        writeln!(f, "Su Mo Tu We Th Fr Sa")?;

        let mut slot = self.leading_blanks;
        let mut line = "   ".repeat(self.leading_blanks as usize);
        for cell in &self.days {
            let mark = if cell.completed { '*' } else { ' ' };
            line.push_str(&format!("{:>2}{}", cell.date.day(), mark));
            slot += 1;
            if slot % 7 == 0 {
                writeln!(f, "{}", line.trim_end())?;
                line.clear();
            }
        }
        if !line.is_empty() {
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

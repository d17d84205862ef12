//! Streak CLI - Command-line interface for Streakline
//!
//! Commands:
//! - report: Compute the full statistics report for an export document
//! - habit: Compute statistics for a single habit
//! - grid: Render a habit's completion history
//! - validate: Check an export document for consistency problems
//! - doctor: Diagnose configuration and environment

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use streakline::calendar::{self, format_display_date, format_full_date};
use streakline::config::EngineConfig;
use streakline::pipeline::StatsProcessor;
use streakline::report::StatsReport;
use streakline::snapshot::{DataExport, EXPORT_VERSION};
use streakline::types::{Habit, StatisticsSummary};
use streakline::{StatsError, PRODUCER_NAME, STREAKLINE_VERSION};

/// Streak - On-device streak and statistics engine for habit tracking
#[derive(Parser)]
#[command(name = "streak")]
#[command(author = "Streakline Contributors")]
#[command(version = STREAKLINE_VERSION)]
#[command(about = "Compute habit streaks and statistics from an export", long_about = None)]
struct Cli {
    /// Reference day (YYYY-MM-DD); defaults to the local day
    #[arg(long, global = true)]
    today: Option<String>,

    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the statistics report for every habit
    Report {
        /// Export document path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Compute statistics for a single habit
    Habit {
        /// Habit id
        habit_id: String,

        /// Export document path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,
    },

    /// Render a habit's completion history
    Grid {
        /// Habit id
        habit_id: String,

        /// Export document path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Show the calendar page for the reference month instead of the week grid
        #[arg(long)]
        month: bool,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check an export document for consistency problems
    Validate {
        /// Export document path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable text
    Text,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let error = serde_json::to_string(&CliError::from(e))
                .unwrap_or_else(|_| "Unknown error".to_string());
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` overrides the
/// default level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), StreakCliError> {
    let today = resolve_today(cli.today.as_deref())?;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Report { input, format } => cmd_report(&input, today, config_path, &format),
        Commands::Habit {
            habit_id,
            input,
            format,
        } => cmd_habit(&input, &habit_id, today, config_path, &format),
        Commands::Grid {
            habit_id,
            input,
            month,
            format,
        } => cmd_grid(&input, &habit_id, today, config_path, month, &format),
        Commands::Validate { input, json } => cmd_validate(&input, json),
        Commands::Doctor { json } => cmd_doctor(config_path, json),
    }
}

fn cmd_report(
    input: &Path,
    today: NaiveDate,
    config: Option<&Path>,
    format: &OutputFormat,
) -> Result<(), StreakCliError> {
    let export = read_export(input)?;
    let processor = StatsProcessor::with_config(load_config(config)?)?;
    let report = processor.build_report(&export, today);

    match format {
        OutputFormat::Text => print!("{}", render_report(&report)),
        _ => println!("{}", to_json(&report, format)?),
    }
    Ok(())
}

fn cmd_habit(
    input: &Path,
    habit_id: &str,
    today: NaiveDate,
    config: Option<&Path>,
    format: &OutputFormat,
) -> Result<(), StreakCliError> {
    let export = read_export(input)?;
    let processor = StatsProcessor::with_config(load_config(config)?)?;
    let summary = processor.habit_statistics(&export, habit_id, today)?;

    match format {
        OutputFormat::Text => {
            let habit = export.habit(habit_id)?;
            print!("{}", render_summary(habit, &summary));
        }
        _ => println!("{}", to_json(&summary, format)?),
    }
    Ok(())
}

fn cmd_grid(
    input: &Path,
    habit_id: &str,
    today: NaiveDate,
    config: Option<&Path>,
    month: bool,
    format: &OutputFormat,
) -> Result<(), StreakCliError> {
    let export = read_export(input)?;
    let processor = StatsProcessor::with_config(load_config(config)?)?;

    if month {
        let calendar = processor.month_calendar(&export, habit_id, today)?;
        match format {
            OutputFormat::Text => print!("{}", calendar),
            _ => println!("{}", to_json(&calendar, format)?),
        }
    } else {
        let grid = processor.history_grid(&export, habit_id, today)?;
        match format {
            OutputFormat::Text => {
                println!("{} - last {} weeks", habit_id, processor.config().grid_weeks);
                println!("{}", grid.render_text());
                println!("{} completed days", grid.completed_days());
            }
            _ => println!("{}", to_json(&grid, format)?),
        }
    }
    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), StreakCliError> {
    let export = read_export(input)?;
    let issues = export.validate();

    let report = ValidationReport {
        total_habits: export.habits.len(),
        total_completions: export.completions.len(),
        issues: issues.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Habits:      {}", report.total_habits);
        println!("Completions: {}", report.total_completions);
        println!("Issues:      {}", report.issues.len());

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                println!("  - {}", issue);
            }
        }
    }

    if report.issues.is_empty() {
        Ok(())
    } else {
        Err(StreakCliError::ValidationFailed(report.issues.len()))
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), StreakCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "streakline_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Streakline version {}", STREAKLINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "export_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Export document version: {}", EXPORT_VERSION),
    });

    checks.push(DoctorCheck {
        name: "clock".to_string(),
        status: CheckStatus::Ok,
        message: format!("Local day is {}", format_full_date(calendar::today())),
    });

    if let Some(config_path) = config {
        let check = match fs::read_to_string(config_path) {
            Ok(content) => match EngineConfig::from_json(&content) {
                Ok(config) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid ({} week grid, {} day window)",
                        config.grid_weeks, config.recent_window_days
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read config file: {}", e),
            },
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: STREAKLINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Streak Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(StreakCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, StreakCliError> {
    match raw {
        Some(raw) => Ok(calendar::parse_date(raw)?),
        None => Ok(calendar::today()),
    }
}

fn read_input(input: &Path) -> Result<String, StreakCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn read_export(input: &Path) -> Result<DataExport, StreakCliError> {
    let export = DataExport::from_json(&read_input(input)?)?;
    debug!(input = %input.display(), habits = export.habits.len(), "loaded export");
    Ok(export)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, StreakCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

fn to_json<T: serde::Serialize>(
    value: &T,
    format: &OutputFormat,
) -> Result<String, StreakCliError> {
    match format {
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

fn render_summary(habit: &Habit, summary: &StatisticsSummary) -> String {
    let name = if habit.name.is_empty() { &habit.id } else { &habit.name };
    let period = habit.frequency.period_label();
    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", name, habit.frequency.as_str()));
    out.push_str(&format!("  Current streak:  {} {}\n", summary.current_streak, period));
    out.push_str(&format!("  Longest streak:  {} {}\n", summary.longest_streak, period));
    out.push_str(&format!("  Completions:     {}\n", summary.total_completions));
    out.push_str(&format!("  Completion rate: {}%\n", summary.completion_rate));
    out.push_str(&format!("  Last 30 days:    {}\n", summary.last30_days));
    out.push_str(&format!("  Weekly average:  {:.1}\n", summary.weekly_average));
    out
}

fn render_report(report: &StatsReport) -> String {
    let overall = &report.overall;
    let mut out = String::new();
    out.push_str(&format!("Statistics for {}\n", format_display_date(report.reference_day)));
    out.push_str("========================\n");
    out.push_str(&format!(
        "Habits: {} ({} active)\n",
        overall.total_habits, overall.active_habits
    ));
    out.push_str(&format!(
        "Completions: {} total, {} today\n",
        overall.total_completions, overall.completions_today
    ));
    out.push_str(&format!("Average streak: {:.1}\n", overall.average_streak));

    for habit in &report.habits {
        let name = if habit.name.is_empty() { &habit.habit_id } else { &habit.name };
        let archived = if habit.archived { " [archived]" } else { "" };
        let stats = &habit.statistics;
        out.push_str(&format!(
            "\n{}{} ({})\n  streak {} / best {} {}, {}% rate, {} in last 30 days\n",
            name,
            archived,
            habit.frequency.as_str(),
            stats.current_streak,
            stats.longest_streak,
            habit.frequency.period_label(),
            stats.completion_rate,
            stats.last30_days,
        ));
    }
    out
}

// Error types

#[derive(Debug)]
enum StreakCliError {
    Io(io::Error),
    Stats(StatsError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for StreakCliError {
    fn from(e: io::Error) -> Self {
        StreakCliError::Io(e)
    }
}

impl From<StatsError> for StreakCliError {
    fn from(e: StatsError) -> Self {
        StreakCliError::Stats(e)
    }
}

impl From<serde_json::Error> for StreakCliError {
    fn from(e: serde_json::Error) -> Self {
        StreakCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<StreakCliError> for CliError {
    fn from(e: StreakCliError) -> Self {
        match e {
            StreakCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            StreakCliError::Stats(e) => {
                let (code, hint) = match &e {
                    StatsError::MalformedDate(_) => ("MALFORMED_DATE", "Dates must be YYYY-MM-DD"),
                    StatsError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    StatsError::InvalidExport(_) => {
                        ("INVALID_EXPORT", "Export needs version, habits and completions")
                    }
                    StatsError::UnknownHabit(_) => {
                        ("UNKNOWN_HABIT", "Run 'streak report' to list habit ids")
                    }
                    StatsError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Run 'streak doctor --config <file>'")
                    }
                    StatsError::EncodingError(_) => ("ENCODING_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            StreakCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            StreakCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} consistency issues found", count),
                hint: Some("Fix the listed issues and retry".to_string()),
            },
            StreakCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_habits: usize,
    total_completions: usize,
    issues: Vec<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

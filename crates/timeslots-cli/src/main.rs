//! `timeslots` CLI — compute opening periods and bookable slots from rules.
//!
//! ## Usage
//!
//! ```sh
//! # Open periods for three days, office hours minus lunch
//! timeslots periods --from 2014-01-01 --to 2014-01-04 \
//!   --open 'p=540-1080;wd=1-5' --close 'p=720-780'
//!
//! # 15-minute slots aligned on the quarter hour, trimmed to the window
//! timeslots slots --from '2014-01-01T12:20' --to '2014-01-03T12:20' \
//!   --open 'p=600-700,800-900' --granularity 15 --midnight-alignment --adjust
//!
//! # Which days are open, with rules and config from a file
//! timeslots days --rules shop.json --from 2014-04-01 --to 2014-05-01
//!
//! # Slice a JSON list of periods read from stdin
//! echo '[{"begin":600,"end":700}]' | timeslots slice --granularity 20
//! ```
//!
//! Set `RUST_LOG=timeslots_engine=debug` to trace rule and cache activity on
//! stderr.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use timeslots_engine::{periods_from_json, Calendar, RuleFile};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "timeslots",
    version,
    about = "Opening periods and bookable time slots from declarative rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open periods (minutes of day) for each day of the window
    Periods {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Time slots for each day of the window
    Slots {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Whether each day of the window has any open period
    Days {
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Slice a JSON array of {"begin","end"} periods into slots
    Slice {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[command(flatten)]
        calendar: CalendarArgs,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Window start: YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS] or "YYYY-MM-DD HH:MM[:SS]"
    #[arg(long)]
    from: String,
    /// Window end (exclusive), same formats as --from
    #[arg(long)]
    to: String,
    /// Trim the first and last day to the window's times of day
    #[arg(long)]
    adjust: bool,
    #[command(flatten)]
    calendar: CalendarArgs,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct CalendarArgs {
    /// JSON rule file with "config", "open" and "close" entries
    #[arg(long)]
    rules: Option<String>,
    /// Opening rule, e.g. 'p=540-1080;wd=1-5' (repeatable)
    #[arg(long = "open")]
    open: Vec<String>,
    /// Closing rule, e.g. 'p=0-1440;sd=easter' (repeatable)
    #[arg(long = "close")]
    close: Vec<String>,
    /// Slot width in minutes
    #[arg(long)]
    granularity: Option<u32>,
    /// Align slot starts on multiples of the granularity from midnight
    #[arg(long)]
    midnight_alignment: bool,
    /// Memoized entries per operation (0 disables)
    #[arg(long)]
    cache_size: Option<usize>,
    /// strftime format of the per-day keys
    #[arg(long)]
    date_format: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Periods { query } => {
            let (mut calendar, begin, end) = query.resolve()?;
            let days = calendar.get_periods_of_days(begin, end, query.adjust);
            print_json(&days, query.pretty)?;
        }
        Commands::Slots { query } => {
            let (mut calendar, begin, end) = query.resolve()?;
            let days = calendar.get_time_slots_of_days(begin, end, query.adjust);
            print_json(&days, query.pretty)?;
        }
        Commands::Days { query } => {
            let (mut calendar, begin, end) = query.resolve()?;
            let days = calendar.get_days(begin, end);
            print_json(&days, query.pretty)?;
        }
        Commands::Slice {
            input,
            calendar,
            pretty,
        } => {
            let mut calendar = calendar.build()?;
            let raw = read_input(input.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&raw).context("Failed to parse periods JSON")?;
            let slots = calendar.get_time_slots_of_day_periods(&periods_from_json(&value));
            print_json(&slots, pretty)?;
        }
    }

    Ok(())
}

impl QueryArgs {
    fn resolve(&self) -> Result<(Calendar, NaiveDateTime, NaiveDateTime)> {
        let begin = parse_datetime(&self.from).context("Invalid --from")?;
        let end = parse_datetime(&self.to).context("Invalid --to")?;
        let calendar = self.calendar.build()?;
        Ok((calendar, begin, end))
    }
}

impl CalendarArgs {
    /// Load the rule file if any, then apply command-line overrides and rules.
    fn build(&self) -> Result<Calendar> {
        let file = match &self.rules {
            Some(path) => RuleFile::from_json(&read_input(Some(path))?)
                .with_context(|| format!("Failed to load rule file: {}", path))?,
            None => RuleFile::default(),
        };

        let mut calendar =
            Calendar::from_rule_file(&file).context("Invalid rules in rule file")?;

        if let Some(granularity) = self.granularity {
            calendar
                .set_granularity(granularity)
                .context("Invalid --granularity")?;
        }
        if self.midnight_alignment {
            calendar.set_midnight_alignment(true);
        }
        if let Some(size) = self.cache_size {
            calendar.set_cache_size(size);
        }
        if let Some(format) = &self.date_format {
            calendar
                .set_date_format(format.as_str())
                .context("Invalid --date-format")?;
        }

        calendar
            .add_open_rules(&self.open)
            .context("Invalid --open rule")?;
        calendar
            .add_close_rules(&self.close)
            .context("Invalid --close rule")?;

        tracing::debug!(
            open = calendar.open_rules().len(),
            close = calendar.close_rules().len(),
            granularity = calendar.config().granularity,
            "calendar ready"
        );
        Ok(calendar)
    }
}

/// Parse a wall-clock datetime; a bare date means midnight.
fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let s = s.trim();
    if let Some(dt) = FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .with_context(|| format!("Unrecognized datetime: '{}'", s))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

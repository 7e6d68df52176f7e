//! `outsps` CLI: convert recurrence and time-zone XML, expand series and replay
//! list edits from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # RecurrenceData XML to JSON (stdin -> stdout)
//! outsps decode-recurrence < recurrence.xml
//!
//! # JSON back to XML, file to file
//! outsps encode-recurrence -i rule.json -o recurrence.xml
//!
//! # XMLTZone XML to JSON
//! outsps decode-timezone -i timezone.xml
//!
//! # First 10 occurrence starts of a series
//! outsps expand --start 2024-01-01T17:00:00Z --limit 10 -i recurrence.xml --time-zone timezone.xml
//!
//! # Replay a script of submits and deletes
//! outsps replay -i script.json --behavior behavior.toml
//! ```
//!
//! Set `RUST_LOG=debug` to see list commits on stderr.

mod replay;

use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use outsps_engine::{expand_occurrences, ServerBehavior};
use outsps_xml::{recurrence, timezone, RecurrenceRule, TimeZoneRule};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "outsps",
    version,
    about = "Outlook/SharePoint recurring appointment tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode RecurrenceData XML to JSON
    DecodeRecurrence {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Encode a JSON recurrence rule as RecurrenceData XML
    EncodeRecurrence {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Decode XMLTZone XML to JSON
    DecodeTimezone {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Encode a JSON time-zone rule as XMLTZone XML
    EncodeTimezone {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Expand RecurrenceData XML into UTC occurrence starts
    Expand {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Start of the first occurrence (RFC 3339)
        #[arg(long)]
        start: String,
        /// Maximum number of occurrences
        #[arg(long, default_value_t = 50)]
        limit: u16,
        /// XMLTZone file for the series (UTC if omitted)
        #[arg(long)]
        time_zone: Option<String>,
    },
    /// Replay a JSON script of list submits and deletes
    Replay {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// TOML file with server behavior toggles
        #[arg(long)]
        behavior: Option<String>,
    },
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
        Commands::DecodeRecurrence { input, output } => {
            let xml = read_input(input.as_deref())?;
            let rule = recurrence::decode(&xml).context("Failed to decode RecurrenceData")?;
            write_json(output.as_deref(), &rule)?;
        }
        Commands::EncodeRecurrence { input, output } => {
            let json = read_input(input.as_deref())?;
            let rule: RecurrenceRule =
                serde_json::from_str(&json).context("Failed to parse recurrence rule JSON")?;
            let xml = recurrence::encode(&rule).context("Failed to encode RecurrenceData")?;
            write_output(output.as_deref(), &xml)?;
        }
        Commands::DecodeTimezone { input, output } => {
            let xml = read_input(input.as_deref())?;
            let rule = timezone::decode(&xml).context("Failed to decode XMLTZone")?;
            write_json(output.as_deref(), &rule)?;
        }
        Commands::EncodeTimezone { input, output } => {
            let json = read_input(input.as_deref())?;
            let rule: TimeZoneRule =
                serde_json::from_str(&json).context("Failed to parse time zone rule JSON")?;
            let xml = timezone::encode(&rule).context("Failed to encode XMLTZone")?;
            write_output(output.as_deref(), &xml)?;
        }
        Commands::Expand {
            input,
            output,
            start,
            limit,
            time_zone,
        } => {
            let xml = read_input(input.as_deref())?;
            let rule = recurrence::decode(&xml).context("Failed to decode RecurrenceData")?;
            let tz = match time_zone.as_deref() {
                Some(path) => timezone::decode(&read_input(Some(path))?)
                    .with_context(|| format!("Failed to decode XMLTZone from {}", path))?,
                None => TimeZoneRule::utc(),
            };
            let start: DateTime<Utc> = DateTime::parse_from_rfc3339(&start)
                .with_context(|| format!("Invalid --start: {}", start))?
                .with_timezone(&Utc);

            let starts: Vec<String> = expand_occurrences(&rule, &tz, start, Duration::zero(), limit)
                .context("Failed to expand recurrence")?
                .into_iter()
                .map(|o| recurrence::format_timestamp(&o.start))
                .collect();
            write_json(output.as_deref(), &starts)?;
        }
        Commands::Replay {
            input,
            output,
            behavior,
        } => {
            let behavior = match behavior.as_deref() {
                Some(path) => load_behavior(path)?,
                None => ServerBehavior::default(),
            };
            let script = read_input(input.as_deref())?;
            let result = replay::run(&script, behavior)?;
            write_json(output.as_deref(), &result)?;
        }
    }

    Ok(())
}

fn load_behavior(path: &str) -> Result<ServerBehavior> {
    let text = read_input(Some(path))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse behavior file: {}", path))
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

fn write_json<T: serde::Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    write_output(path, &pretty)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

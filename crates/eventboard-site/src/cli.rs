use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "eventboard",
    version,
    about = "Manage the ride calendar behind the event listing page"
)]
pub struct Cli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "set",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub overrides: Vec<KeyVal>,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long = "events-file", global = true)]
    pub events_file: Option<PathBuf>,

    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show events grouped into past, upcoming and future
    List(ListArgs),
    /// Add an event to the events document
    Add(AddArgs),
    /// Check external links in the built site
    CheckLinks(CheckLinksArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Classify against this day instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub today: Option<NaiveDate>,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub end: Option<String>,

    /// Also print the start and end location lists
    #[arg(long)]
    pub locations: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Beaverton,
    Tigard,
    Custom,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Existing,
    Skip,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(long, value_enum, default_value_t = EventKind::Custom)]
    pub kind: EventKind,

    /// MM/DD or MM/DD/YYYY
    #[arg(long)]
    pub date: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub end: Option<String>,

    /// Existing calendar URL, used with `--submit existing`
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub route: Option<String>,

    /// Comment line to insert after, e.g. "Beaverton Bike Happy Hours"
    #[arg(long)]
    pub section: Option<String>,

    #[arg(long, value_enum)]
    pub submit: Option<SubmitMode>,

    #[arg(long)]
    pub details: Option<String>,

    /// Start time, HH:MM:SS (24h)
    #[arg(long)]
    pub time: Option<String>,

    /// Human readable time, e.g. "10am to 2pm"
    #[arg(long)]
    pub time_details: Option<String>,

    #[arg(long)]
    pub venue: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// N, NE, NW, SE, SW, E or W
    #[arg(long)]
    pub area: Option<String>,

    #[arg(long)]
    pub loc_details: Option<String>,

    /// Print the block instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Write without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckLinksArgs {
    /// Built site directory; defaults to the configured `public_dir`
    pub dir: Option<PathBuf>,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "molcov - Audits how well a SMARTS pattern set covers a molecule dataset, with last-match-wins environment resolution.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Match the torsion patterns of a force-field parameter file (TOML)
    /// against a structure store.
    Query(QueryArgs),
    /// Match a plain pattern list (`SMARTS NAME` lines) against a
    /// structure store.
    Smarts(SmartsArgs),
}

/// Arguments for the `query` subcommand.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Path to the force-field parameter file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub params: PathBuf,

    /// Only count matches for the parameter identifiers listed in this
    /// file (one per line).
    #[arg(short, long, value_name = "PATH")]
    pub want: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Arguments for the `smarts` subcommand.
#[derive(Args, Debug)]
pub struct SmartsArgs {
    /// Path to the pattern list file, one `SMARTS NAME` pair per line.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub patterns: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Options shared by every matching run.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the structure store directory.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub store: PathBuf,

    /// Number of worker threads for the matching pool.
    #[arg(short = 'n', long, default_value_t = 8, value_name = "NUM")]
    pub workers: usize,

    /// Records per unit of work sent to the pool.
    #[arg(short = 'c', long, default_value_t = 32, value_name = "NUM")]
    pub chunk_size: usize,

    /// Record filter, `kind:argument` (elements:C,H,N,O | natoms:40 |
    /// inchi:keys.txt). Can be used multiple times.
    #[arg(short = 'x', long = "filter", value_name = "SPEC")]
    pub filters: Vec<String>,

    /// Only process the first N records of each store table.
    #[arg(short = 'l', long, value_name = "NUM")]
    pub limit: Option<usize>,
}

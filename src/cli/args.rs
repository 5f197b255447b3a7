use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find which published cloud and crawler IP ranges contain an IP address.",
    long_about = None
)]
pub struct Args {
    /// Print the category catalog
    #[arg(long)]
    pub categories: bool,

    /// Print the status of every source
    #[arg(long)]
    pub sources: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Do not download feeds; answer from the cached snapshots only
    #[arg(long)]
    pub offline: bool,

    /// Save the matches to a CSV file
    #[arg(long = "csv")]
    pub csv_file: Option<PathBuf>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,

    /// The IP address to look up
    #[arg(required_unless_present_any = ["categories", "sources"])]
    pub ip_address: Option<String>,
}

/*--------------------------------------------------------------------------------------
  Output Format
--------------------------------------------------------------------------------------*/

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,

    /// Formatted table
    Table,
}

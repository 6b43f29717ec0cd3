use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Track the Elastic Common Schema field CSV and compile it into PostgreSQL DDL",
    long_about = None
)]
pub struct Cli {
    /// YAML settings file providing defaults for any option below
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile the cached schema CSV into CREATE TABLE and INSERT statements
    Compile(CompileArgs),
    /// Download the latest schema CSV and rotate the cached copy when it changed
    Sync(SyncArgs),
    /// Compare two local schema CSV files and report whether they differ
    Check(CheckArgs),
    /// Preview the normalized rows of a schema CSV in a formatted table
    Preview(PreviewArgs),
}

/// Compatibility with files produced by earlier tooling.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CompatMode {
    /// Double apostrophes, parse `Indexed` as a boolean, compare versions as sets
    #[default]
    Strict,
    /// Strip apostrophes, treat any non-empty `Indexed` as true, compare versions by position
    Legacy,
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Schema CSV to compile [default: data/Elastic/ecs.csv]
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Destination SQL file, `-` for stdout [default: data/Elastic/DDL-ecs.sql]
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Database schema that owns the table [default: ecs]
    #[arg(long)]
    pub schema: Option<String>,
    /// Table name [default: elastic_log_schema]
    #[arg(long)]
    pub table: Option<String>,
    /// Role the table is assigned to [default: postgres]
    #[arg(long)]
    pub owner: Option<String>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Compatibility mode [default: strict]
    #[arg(long, value_enum)]
    pub compat: Option<CompatMode>,
}

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Location of the upstream CSV (http(s)://, file:// or a local path)
    #[arg(long)]
    pub url: Option<String>,
    /// Cached schema file that is rotated on change [default: data/Elastic/ecs.csv]
    #[arg(long)]
    pub cache: Option<PathBuf>,
    /// Scratch file for the download [default: data/Elastic/ecs-tempfile.csv]
    #[arg(long)]
    pub scratch: Option<PathBuf>,
    /// Report whether the upstream changed without touching the cache
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    /// Compatibility mode [default: strict]
    #[arg(long, value_enum)]
    pub compat: Option<CompatMode>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Previously cached schema CSV
    #[arg(long)]
    pub previous: PathBuf,
    /// Candidate schema CSV
    #[arg(long)]
    pub current: PathBuf,
    /// Compatibility mode [default: strict]
    #[arg(long, value_enum)]
    pub compat: Option<CompatMode>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Schema CSV to preview [default: data/Elastic/ecs.csv]
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Compatibility mode [default: strict]
    #[arg(long, value_enum)]
    pub compat: Option<CompatMode>,
}

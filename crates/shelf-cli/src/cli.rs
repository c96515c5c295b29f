//! CLI argument definitions using clap derive API

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Shelfstar - turn a retail listing feed into a validated star schema
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the star schema from the listing feed and persist it
    Run(RunArgs),

    /// Check the listing feed against the quality rules without building anything
    Validate(ValidateArgs),

    /// Run the warehouse tests against an existing database
    Test(TestArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the raw CSV feed
    #[arg(short, long)]
    pub input: Option<String>,

    /// Override the directory exported CSVs and the run summary are written to
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Date stamped on every fact row (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub ingestion_date: Option<NaiveDate>,

    /// Skip exporting the output tables to CSV
    #[arg(long)]
    pub no_export: bool,

    /// Skip the warehouse tests after persisting
    #[arg(long)]
    pub skip_tests: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Override the raw CSV feed
    #[arg(short, long)]
    pub input: Option<String>,
}

/// Arguments for the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Stop on first failure
    #[arg(long)]
    pub fail_fast: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

//! Validate command implementation

use anyhow::{Context, Result};
use chrono::Local;
use shelf_core::validate_only;
use shelf_db::{Database, DuckDbBackend};

use super::common::{print_quality_report, ExitCode, ProjectContext, EXIT_DATA};
use crate::cli::{GlobalArgs, ValidateArgs};

/// Execute the validate command
///
/// Reads the feed through a scratch in-memory database so the warehouse is
/// left untouched.
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;
    let input = project.input_path(args.input.as_deref());

    let scratch = DuckDbBackend::in_memory().context("Failed to open scratch database")?;
    let raw = scratch
        .load_raw_listings(&input)
        .await
        .with_context(|| format!("Failed to load listings from {}", input.display()))?;

    // The ingestion date plays no part in the quality checks
    let options = project.config.pipeline_options(Local::now().date_naive());
    let report = validate_only(&raw, &options).context("Normalization failed")?;

    print_quality_report(&report);
    println!("\n{}", report);

    if !report.passed() {
        return Err(ExitCode(EXIT_DATA).into());
    }
    Ok(())
}

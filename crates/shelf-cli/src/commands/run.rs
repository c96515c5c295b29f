//! Run command implementation

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use shelf_core::summary::RUN_SUMMARY_FILE;
use shelf_core::{run_pipeline, CoreError, RunSummary, StarSchema};
use shelf_db::{Database, DuckDbBackend};
use std::path::PathBuf;

use super::common::{
    print_quality_report, run_warehouse_tests, ExitCode, ProjectContext, EXIT_DATA, EXIT_TESTS,
};
use crate::cli::{GlobalArgs, RunArgs};

/// Rows shown per table after a run
const HEAD_ROWS: usize = 5;

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let started_at = Utc::now();
    let project = ProjectContext::load(global)?;
    let input = project.input_path(args.input.as_deref());
    let output_dir = args
        .output_dir
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| project.config.output_dir_absolute(&project.root));
    let ingestion_date = args
        .ingestion_date
        .unwrap_or_else(|| Local::now().date_naive());

    // The warehouse is opened only once the batch has passed its checks
    let scratch = DuckDbBackend::in_memory().context("Failed to open scratch database")?;
    let raw = scratch
        .load_raw_listings(&input)
        .await
        .with_context(|| format!("Failed to load listings from {}", input.display()))?;

    let options = project.config.pipeline_options(ingestion_date);
    let output = match run_pipeline(&raw, &options) {
        Ok(output) => output,
        Err(CoreError::QualityCheckFailed { report }) => {
            print_quality_report(&report);
            eprintln!("\nQuality checks failed; nothing was written.");
            return Err(ExitCode(EXIT_DATA).into());
        }
        Err(e) => return Err(e).context("Pipeline failed"),
    };

    print_tables(&output.star);
    println!(
        "\n{} listings -> {} products ({} duplicates removed, {} ratings coerced to 0)",
        output.stats.raw_rows,
        output.stats.canonical_rows,
        output.stats.duplicates_removed,
        output.stats.coerced_ratings
    );

    let db = project.open_database()?;
    db.write_star_schema(project.schema(), &output.star)
        .await
        .context("Failed to persist star schema")?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    if !args.no_export {
        for view in output.star.tables() {
            let table = match project.schema() {
                Some(schema) => format!("{}.{}", schema, view.name),
                None => view.name.to_string(),
            };
            let path = output_dir.join(format!("{}.csv", view.name));
            db.export_csv(&table, &path)
                .await
                .with_context(|| format!("Failed to export {}", view.name))?;
            log::info!("Exported {} to {}", view.name, path.display());
        }
    }

    if !args.skip_tests {
        println!();
        let summary = run_warehouse_tests(&project, &db, false).await?;
        if !summary.all_passed() {
            return Err(ExitCode(EXIT_TESTS).into());
        }
    }

    let summary = RunSummary::new(&project.config.name, ingestion_date, started_at, &output);
    let summary_path = output_dir.join(RUN_SUMMARY_FILE);
    summary
        .save(&summary_path)
        .context("Failed to write run summary")?;

    println!(
        "\nCompleted in {}ms; summary written to {}",
        summary.duration_ms(),
        summary_path.display()
    );
    Ok(())
}

/// Print the shape and first rows of each output table
fn print_tables(star: &StarSchema) {
    for view in star.tables() {
        println!("\n{} {}", view.name, view.shape());
        for line in view.head(HEAD_ROWS) {
            println!("  {}", line);
        }
    }
}

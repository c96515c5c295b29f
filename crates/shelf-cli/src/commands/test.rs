//! Test command implementation

use anyhow::{Context, Result};
use shelf_core::star::{BRIDGE_PRODUCT_CATEGORY, DIM_CATEGORY, DIM_PRODUCT, FACT_PRODUCT_SNAPSHOT};
use shelf_db::{Database, DbError};

use super::common::{run_warehouse_tests, ExitCode, ProjectContext, EXIT_TESTS};
use crate::cli::{GlobalArgs, TestArgs};

/// Execute the test command
pub(crate) async fn execute(args: &TestArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;
    let db = project.open_database()?;

    for table in [
        DIM_CATEGORY,
        DIM_PRODUCT,
        BRIDGE_PRODUCT_CATEGORY,
        FACT_PRODUCT_SNAPSHOT,
    ] {
        let name = match project.schema() {
            Some(schema) => format!("{}.{}", schema, table),
            None => table.to_string(),
        };
        let exists = db
            .relation_exists(&name)
            .await
            .context("Failed to inspect database")?;
        if !exists {
            return Err(DbError::TableNotFound(name)).context("Run `shelf run` first");
        }
    }

    let summary = run_warehouse_tests(&project, &db, args.fail_fast).await?;
    if !summary.all_passed() {
        // Exit code 2 = Test failures
        return Err(ExitCode(EXIT_TESTS).into());
    }

    Ok(())
}

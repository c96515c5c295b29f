//! Integration tests for Shelfstar

use shelf_core::summary::RUN_SUMMARY_FILE;
use shelf_core::{run_pipeline, Config, PipelineOptions, RunSummary};
use shelf_db::{Database, DuckDbBackend};
use shelf_test::{star_schema_tests, TestRunner};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const FEED: &str = "\
product_id,product_name,category,discounted_price,actual_price,discount_percentage,rating,rating_count,about_product,img_link,product_link
B07JW9H4J1,\"Wayona Nylon Braided USB to Lightning Cable\",Computers&Accessories|Accessories&Peripherals|Cables&Accessories|Cables|USBCables,₹399,\"₹1,099\",64%,4.2,\"24,269\",High compatibility,https://m.media-amazon.com/images/1.jpg,https://www.amazon.in/dp/B07JW9H4J1
B098NS6PVG,Ambrane Unbreakable 60W Cable,Computers&Accessories|Accessories&Peripherals|Cables&Accessories|Cables|USBCables,₹199,₹349,43%,4.0,\"43,994\",Fast charging,https://m.media-amazon.com/images/2.jpg,https://www.amazon.in/dp/B098NS6PVG
B098NS6PVG,Ambrane Unbreakable 60W Cable,Computers&Accessories|Accessories&Peripherals|Cables&Accessories|Cables|USBCables,₹199,₹349,43%,4.4,\"43,994\",Fast charging,https://m.media-amazon.com/images/2.jpg,https://www.amazon.in/dp/B098NS6PVG
B0B3RRWSF6,Pigeon Electric Kettle,Home&Kitchen|Kitchen&HomeAppliances|SmallKitchenAppliances|Kettles&HotWaterDispensers|ElectricKettles,₹599,₹895,33%,|,1,Boils water,https://m.media-amazon.com/images/3.jpg,https://www.amazon.in/dp/B0B3RRWSF6
B0BBMPH39N,Mystery Gadget,OfficeProducts,₹99,₹99,0%,3.9,,,https://m.media-amazon.com/images/4.jpg,https://www.amazon.in/dp/B0BBMPH39N
";

const BAD_FEED: &str = "\
product_id,product_name,category,discounted_price,actual_price,discount_percentage,rating,rating_count,about_product,img_link,product_link
X1,Overpriced,Toys|Puzzles,₹500,₹300,0%,4.0,10,,https://img/x1.jpg,https://shop/x1
X2,Stars,Toys,₹100,₹200,50%,6.5,10,,https://img/x2.jpg,https://shop/x2
";

/// A project directory with a feed under data/raw
fn project(feed: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("data/raw");
    std::fs::create_dir_all(&raw).unwrap();
    std::fs::write(raw.join("amazon.csv"), feed).unwrap();
    dir
}

fn shelf(project_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shelf"))
        .arg("--project-dir")
        .arg(project_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn processed(dir: &Path) -> PathBuf {
    dir.join("data/processed")
}

/// Load, build, persist and test the star schema through the library crates
#[tokio::test]
async fn test_end_to_end_through_libraries() {
    let dir = project(FEED);
    let db = DuckDbBackend::in_memory().unwrap();
    let raw = db
        .load_raw_listings(&dir.path().join("data/raw/amazon.csv"))
        .await
        .unwrap();
    assert_eq!(raw.len(), 5);

    let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let output = run_pipeline(&raw, &PipelineOptions::new(date)).unwrap();
    assert_eq!(output.stats.canonical_rows, 4);
    assert_eq!(output.stats.duplicates_removed, 1);
    assert_eq!(output.stats.coerced_ratings, 1);
    assert_eq!(output.star.levels.width(), 5);

    let ambrane = output
        .star
        .fact
        .iter()
        .find(|f| f.product_id == "B098NS6PVG")
        .unwrap();
    assert_eq!(ambrane.rating, 4.4);
    assert_eq!(ambrane.rating_count, 43_994);

    db.write_star_schema(None, &output.star).await.unwrap();
    let tests = star_schema_tests(None, &Config::default().quality).unwrap();
    let (_, summary) = TestRunner::new(&db).run_all(&tests).await;
    assert!(summary.all_passed());
}

#[test]
fn test_cli_run_writes_outputs() {
    let dir = project(FEED);
    let output = shelf(dir.path(), &["run", "--ingestion-date", "2024-06-01"]);
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fact_product_snapshot (4, 8)"));
    assert!(stdout.contains("dim_category (3, 9)"));

    let out = processed(dir.path());
    for table in [
        "dim_category",
        "dim_product",
        "bridge_product_category",
        "fact_product_snapshot",
    ] {
        assert!(out.join(format!("{}.csv", table)).is_file(), "{} not exported", table);
    }

    let summary = RunSummary::load(&out.join(RUN_SUMMARY_FILE)).unwrap();
    assert_eq!(summary.project, "shelfstar");
    assert_eq!(summary.stats.raw_rows, 5);
    assert_eq!(summary.stats.canonical_rows, 4);
    assert_eq!(summary.tables.len(), 4);
    assert!(dir.path().join("target/warehouse.duckdb").is_file());

    // The persisted warehouse passes its tests on its own
    let tested = shelf(dir.path(), &["test"]);
    assert!(tested.status.success());
}

#[test]
fn test_cli_run_no_export() {
    let dir = project(FEED);
    let output = shelf(
        dir.path(),
        &["run", "--ingestion-date", "2024-06-01", "--no-export", "--skip-tests"],
    );
    assert!(output.status.success());

    let out = processed(dir.path());
    assert!(!out.join("dim_category.csv").exists());
    assert!(out.join(RUN_SUMMARY_FILE).is_file());
}

#[test]
fn test_cli_run_quality_failure_writes_nothing() {
    let dir = project(BAD_FEED);
    let output = shelf(dir.path(), &["run", "--ingestion-date", "2024-06-01"]);
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("price_ordering"));
    assert!(stdout.contains("rating_range"));
    assert!(!processed(dir.path()).join(RUN_SUMMARY_FILE).exists());
    // The warehouse is never created for a rejected batch
    assert!(!dir.path().join("target").exists());
}

#[test]
fn test_cli_validate() {
    let good = project(FEED);
    let output = shelf(good.path(), &["validate"]);
    assert!(output.status.success());

    let bad = project(BAD_FEED);
    let output = shelf(bad.path(), &["validate"]);
    assert_eq!(output.status.code(), Some(1));
    // validate never creates the warehouse
    assert!(!bad.path().join("target").exists());
}

#[test]
fn test_cli_missing_input_is_database_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = shelf(dir.path(), &["run"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("[D004]"));
}

#[test]
fn test_cli_config_overrides() {
    let dir = project(FEED);
    std::fs::write(
        dir.path().join("shelf.yml"),
        "name: demo\noutput_dir: exports\ndatabase:\n  path: target/demo.duckdb\n  schema: mart\n",
    )
    .unwrap();

    let output = shelf(dir.path(), &["run", "--ingestion-date", "2024-06-01"]);
    assert!(output.status.success());
    assert!(dir.path().join("exports/fact_product_snapshot.csv").is_file());
    assert!(dir.path().join("target/demo.duckdb").is_file());

    let summary = RunSummary::load(&dir.path().join("exports").join(RUN_SUMMARY_FILE)).unwrap();
    assert_eq!(summary.project, "demo");
}

#[test]
fn test_cli_test_without_warehouse() {
    let dir = tempfile::tempdir().unwrap();
    let output = shelf(dir.path(), &["test"]);
    assert_eq!(output.status.code(), Some(4));
}

use super::*;
use crate::config::ParsingConfig;
use crate::hierarchy::extract_hierarchies;
use crate::normalize::normalize_records;
use crate::record::RawRecord;
use crate::test_utils::{listing, raw};

fn table(raw: &[RawRecord]) -> ProductTable {
    let parsing = ParsingConfig::default();
    let batch = normalize_records(raw, &parsing).unwrap();
    extract_hierarchies(batch.records, &parsing)
}

#[test]
fn test_clean_table_passes() {
    let t = table(&[
        listing("P1", "Electronics|Phones|Smartphones"),
        listing("P2", "Home|Kitchen"),
        listing("P3", ""),
    ]);
    let report = check_quality(&t, &QualityConfig::default());
    assert!(report.passed(), "{}", report);
    assert_eq!(report.rows_checked, 3);
    assert_eq!(report.level_width, 3);
    assert_eq!(report.results.len(), QualityCheck::ALL.len());

    let validated = validate(t.clone(), &QualityConfig::default()).unwrap();
    assert_eq!(validated.len(), 3);
    assert_eq!(validated.into_inner(), t);
}

#[test]
fn test_equal_prices_pass() {
    let t = table(&[raw("P1", "A", "₹500", "₹500", "3", "1")]);
    assert!(check_quality(&t, &QualityConfig::default()).passed());
}

#[test]
fn test_price_ordering_violation_aborts() {
    let t = table(&[
        raw("P1", "A", "₹100", "₹150", "4", "1"),
        listing("P2", "A"),
    ]);
    let err = validate(t, &QualityConfig::default()).unwrap_err();
    match err {
        CoreError::QualityCheckFailed { report } => {
            let price = report.result(QualityCheck::PriceOrdering).unwrap();
            assert_eq!(price.failing_rows, 1);
            assert!(price.samples[0].contains("P1"));
            assert_eq!(report.failures().count(), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_rating_bounds_inclusive() {
    let t = table(&[
        raw("P1", "A", "₹10", "₹5", "0", "1"),
        raw("P2", "A", "₹10", "₹5", "5", "1"),
        raw("P3", "A", "₹10", "₹5", "5.1", "1"),
    ]);
    let report = check_quality(&t, &QualityConfig::default());
    let rating = report.result(QualityCheck::RatingRange).unwrap();
    assert_eq!(rating.failing_rows, 1);
    assert!(rating.samples[0].contains("P3"));
}

#[test]
fn test_coerced_rating_is_in_range() {
    let t = table(&[raw("P1", "A", "₹10", "₹5", "not_a_number", "1")]);
    assert!(check_quality(&t, &QualityConfig::default()).passed());
}

#[test]
fn test_all_violations_collected() {
    let mut t = table(&[
        raw("P1", "A|B|C", "₹100", "₹150", "9", "1"),
        listing("P2", "A|B|C"),
    ]);
    t.rows[1].hierarchy.levels[0] = None;

    let report = check_quality(&t, &QualityConfig::default());
    let failed: Vec<QualityCheck> = report.failures().map(|r| r.check).collect();
    assert_eq!(
        failed,
        vec![
            QualityCheck::PriceOrdering,
            QualityCheck::RatingRange,
            QualityCheck::HierarchyContiguity,
            QualityCheck::DepthConsistency,
            QualityCheck::PathConsistency,
        ]
    );
    let message = report.to_string();
    assert!(message.contains("price_ordering (1 row"));
    assert!(message.contains("hierarchy_contiguity"));
}

#[test]
fn test_contiguity_gap_reported_with_levels() {
    let mut t = table(&[listing("P1", "A|B|C")]);
    t.rows[0].hierarchy = crate::hierarchy::CategoryHierarchy::from_slots(
        vec![Some("A".to_string()), None, Some("C".to_string())],
        '|',
    );
    let report = check_quality(&t, &QualityConfig::default());
    let contiguity = report.result(QualityCheck::HierarchyContiguity).unwrap();
    assert_eq!(contiguity.failing_rows, 1);
    assert!(contiguity.samples[0].contains("level_3 present without level_2"));
    // Leaf, depth and path were derived consistently from the gapped slots
    assert!(report.result(QualityCheck::DepthConsistency).unwrap().passed());
    assert!(report.result(QualityCheck::PathConsistency).unwrap().passed());
}

#[test]
fn test_stale_depth_detected() {
    let mut t = table(&[listing("P1", "A|B")]);
    t.rows[0].hierarchy.depth = 3;
    let report = check_quality(&t, &QualityConfig::default());
    assert!(!report.result(QualityCheck::DepthConsistency).unwrap().passed());
    assert!(!report.result(QualityCheck::PathConsistency).unwrap().passed());
}

#[test]
fn test_stale_path_detected() {
    let mut t = table(&[listing("P1", "A|B")]);
    t.rows[0].hierarchy.path = "A|X".to_string();
    let report = check_quality(&t, &QualityConfig::default());
    assert!(report.result(QualityCheck::DepthConsistency).unwrap().passed());
    assert!(!report.result(QualityCheck::PathConsistency).unwrap().passed());
}

#[test]
fn test_empty_path_is_consistent() {
    let t = table(&[listing("P1", "")]);
    let report = check_quality(&t, &QualityConfig::default());
    assert!(report.passed());
}

#[test]
fn test_depth_limit() {
    let t = table(&[listing("P1", "A|B|C"), listing("P2", "A")]);
    let quality = QualityConfig {
        max_category_depth: Some(2),
        ..QualityConfig::default()
    };
    let report = check_quality(&t, &quality);
    let limit = report.result(QualityCheck::DepthLimit).unwrap();
    assert_eq!(limit.failing_rows, 1);
    assert!(limit.samples[0].contains("P1"));
}

#[test]
fn test_samples_are_capped() {
    let rows: Vec<RawRecord> = (0..8)
        .map(|i| raw(&format!("P{}", i), "A", "₹1", "₹2", "1", "1"))
        .collect();
    let report = check_quality(&table(&rows), &QualityConfig::default());
    let price = report.result(QualityCheck::PriceOrdering).unwrap();
    assert_eq!(price.failing_rows, 8);
    assert_eq!(price.samples.len(), 5);
}

#[test]
fn test_empty_table_passes() {
    let report = check_quality(&table(&[]), &QualityConfig::default());
    assert!(report.passed());
    assert_eq!(report.rows_checked, 0);
}

#[test]
fn test_report_serializes() {
    let report = check_quality(&table(&[listing("P1", "A")]), &QualityConfig::default());
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"price_ordering\""));
}

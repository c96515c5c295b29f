use super::*;

#[test]
fn test_generate_unique_test() {
    let sql = generate_unique_test("\"dim_product\"", "product_id");
    assert!(sql.contains(r#"GROUP BY "product_id""#));
    assert!(sql.contains("HAVING COUNT(*) > 1"));
}

#[test]
fn test_generate_not_null_test() {
    let sql = generate_not_null_test("\"fact\"", "category_key");
    assert!(sql.contains(r#""category_key" IS NULL"#));
    assert!(sql.contains(r#"FROM "fact""#));
}

#[test]
fn test_generate_relationship_test() {
    let sql = generate_relationship_test("\"bridge\"", "category_key", "\"dim\"", "category_key");
    assert!(sql.contains(r#"FROM "bridge" AS src"#));
    assert!(sql.contains(r#"SELECT 1 FROM "dim" AS ref_tbl"#));
    assert!(sql.contains(r#"ref_tbl."category_key" = src."category_key""#));
}

#[test]
fn test_generate_range_test() {
    let sql = generate_range_test("\"fact\"", "rating", 0.0, 5.0).unwrap();
    assert!(sql.contains(r#""rating" < 0"#));
    assert!(sql.contains(r#""rating" > 5"#));
}

#[test]
fn test_generate_range_test_rejects_nan() {
    let err = generate_range_test("\"fact\"", "rating", f64::NAN, 5.0).unwrap_err();
    assert!(matches!(err, TestGenError::InvalidThreshold(_)));
}

#[test]
fn test_generate_expression_test() {
    let sql = generate_expression_test("\"fact\"", "a <= b");
    assert_eq!(sql, r#"SELECT * FROM "fact" WHERE NOT COALESCE((a <= b), FALSE)"#);
}

#[test]
fn test_generate_dense_key_test() {
    let sql = generate_dense_key_test("\"dim_category\"", "category_key");
    assert!(sql.contains(r#""category_key" < 1"#));
    assert!(sql.contains(r#"(SELECT COUNT(*) FROM "dim_category")"#));
}

#[test]
fn test_star_schema_suite_names_are_unique() {
    let tests = star_schema_tests(None, &QualityConfig::default()).unwrap();
    let mut names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();
    let total = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), total);
}

#[test]
fn test_star_schema_suite_covers_tables() {
    let tests = star_schema_tests(None, &QualityConfig::default()).unwrap();
    let names: Vec<&str> = tests.iter().map(|t| t.name.as_str()).collect();

    assert!(names.contains(&"unique_dim_category__category_key"));
    assert!(names.contains(&"dense_key_dim_category__category_key"));
    assert!(names.contains(&"not_null_dim_product__product_id"));
    assert!(names.contains(&"relationships_bridge_product_category__product_id__dim_product"));
    assert!(names.contains(&"relationships_bridge_product_category__category_key__dim_category"));
    assert!(names.contains(&"relationships_fact_product_snapshot__product_id__dim_product"));
    assert!(names.contains(&"relationships_fact_product_snapshot__category_key__dim_category"));
    assert!(names.contains(&"relationships_dim_product__product_id__bridge_product_category"));
    assert!(names.contains(&"relationships_dim_product__product_id__fact_product_snapshot"));
    assert!(names.contains(&"expression_fact_product_snapshot__discounted_price"));
    assert!(names.contains(&"range_fact_product_snapshot__rating"));
}

#[test]
fn test_star_schema_suite_qualifies_tables() {
    let tests = star_schema_tests(Some("mart"), &QualityConfig::default()).unwrap();
    for test in &tests {
        assert!(
            test.sql.contains(r#""mart"."#),
            "{} is not schema-qualified",
            test.name
        );
    }
    let fk = tests
        .iter()
        .find(|t| t.name == "relationships_fact_product_snapshot__category_key__dim_category")
        .unwrap();
    assert!(fk.sql.contains(r#""mart"."dim_category""#));
}

#[test]
fn test_star_schema_suite_uses_rating_bounds() {
    let quality = QualityConfig {
        rating_min: 1.0,
        rating_max: 10.0,
        ..QualityConfig::default()
    };
    let tests = star_schema_tests(None, &quality).unwrap();
    let range = tests.iter().find(|t| t.column == "rating").unwrap();
    assert_eq!(range.kind, TestKind::Range { min: 1.0, max: 10.0 });
    assert!(range.sql.contains("> 10"));
}

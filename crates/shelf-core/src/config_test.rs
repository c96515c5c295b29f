use super::*;
use std::io::Write;

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config: Config = serde_yaml::from_str("{}").unwrap();
    assert_eq!(config.name, "shelfstar");
    assert_eq!(config.input, "data/raw/amazon.csv");
    assert_eq!(config.output_dir, "data/processed");
    assert_eq!(config.parsing.currency_symbols, vec!["₹".to_string()]);
    assert_eq!(config.parsing.thousands_separator, ',');
    assert_eq!(config.parsing.category_delimiter, '|');
    assert_eq!(config.quality.rating_min, 0.0);
    assert_eq!(config.quality.rating_max, 5.0);
    assert_eq!(config.keys.category_order, KeyOrder::FirstAppearance);
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: amazon_sales
input: raw/listings.csv
output_dir: out
database:
  path: ":memory:"
  schema: analytics
parsing:
  currency_symbols: ["₹", "$"]
  thousands_separator: ","
  category_delimiter: ">"
  missing_tokens: ["", "n/a"]
quality:
  rating_min: 1.0
  rating_max: 10.0
  max_category_depth: 7
keys:
  category_order: path
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.name, "amazon_sales");
    assert_eq!(config.database.schema.as_deref(), Some("analytics"));
    assert_eq!(config.parsing.currency_symbols.len(), 2);
    assert_eq!(config.parsing.category_delimiter, '>');
    assert_eq!(config.quality.max_category_depth, Some(7));
    assert_eq!(config.keys.category_order, KeyOrder::Path);
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("nmae: typo");
    assert!(result.is_err());
}

#[test]
fn test_missing_token_matching_is_case_insensitive() {
    let parsing = ParsingConfig::default();
    assert!(parsing.is_missing_token(""));
    assert!(parsing.is_missing_token("NaN"));
    assert!(parsing.is_missing_token("Missing"));
    assert!(!parsing.is_missing_token("0"));
}

#[test]
fn test_validate_rating_bounds() {
    let mut config = Config::default();
    config.quality.rating_min = 6.0;
    let err = config.validate().unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_validate_zero_depth_ceiling() {
    let mut config = Config::default();
    config.quality.max_category_depth = Some(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_delimiter_clash() {
    let mut config = Config::default();
    config.parsing.category_delimiter = ',';
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_numeric_currency_symbol() {
    let mut config = Config::default();
    config.parsing.currency_symbols = vec!["1".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn test_load_missing_file() {
    let err = Config::load(Path::new("/nonexistent/shelf.yml")).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_or_default_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path()).unwrap();
    assert_eq!(config.name, "shelfstar");
}

#[test]
fn test_load_or_default_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
    writeln!(file, "name: from_disk\nkeys:\n  category_order: path").unwrap();

    let config = Config::load_or_default(dir.path()).unwrap();
    assert_eq!(config.name, "from_disk");
    assert_eq!(config.keys.category_order, KeyOrder::Path);
}

#[test]
fn test_load_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "quality: [not, a, map]").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
fn test_paths_resolve_against_root() {
    let config = Config::default();
    let root = PathBuf::from("/tmp/project");
    assert_eq!(
        config.input_path_absolute(&root),
        root.join("data/raw/amazon.csv")
    );
    assert_eq!(
        config.output_dir_absolute(&root),
        root.join("data/processed")
    );
    assert_eq!(
        config.database_path_absolute(&root),
        root.join("target/warehouse.duckdb").display().to_string()
    );
}

#[test]
fn test_memory_database_path_not_resolved() {
    let mut config = Config::default();
    config.database.path = ":memory:".to_string();
    assert_eq!(config.database_path_absolute(Path::new("/x")), ":memory:");
}

#[test]
fn test_pipeline_options_carry_settings() {
    let mut config = Config::default();
    config.keys.category_order = KeyOrder::Path;
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let options = config.pipeline_options(date);
    assert_eq!(options.key_order, KeyOrder::Path);
    assert_eq!(options.ingestion_date, date);
    assert_eq!(options.parsing, config.parsing);
}

#[test]
fn test_validate_rejects_ambiguous_thousands_separator() {
    for separator in ['.', '%', '0', '7'] {
        let mut config = Config::default();
        config.parsing.thousands_separator = separator;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::ConfigInvalid { .. }), "{separator}");
        assert!(err.to_string().starts_with("[E003]"));
    }
}

#[test]
fn test_dot_separator_from_yaml_is_rejected() {
    let yaml = "parsing:\n  thousands_separator: '.'\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert!(config.validate().is_err());
}

//! End-to-end analysis scenarios over in-memory tables.

use chrono::{NaiveDate, NaiveDateTime};
use flownix_engine::analysis::{Cardinality, QualityLevel};
use flownix_engine::orchestrator::{build_report, AnalysisOrchestrator};
use flownix_engine::registry::DatasetId;
use flownix_engine::report::AnalysisReport;
use flownix_engine::table::{Column, ContainerFormat, SourceMetadata, Table};

fn metadata(name: &str) -> SourceMetadata {
    SourceMetadata::new(name, ContainerFormat::Csv, 1024)
}

fn report_for(columns: Vec<Column>) -> AnalysisReport {
    let table = Table::try_new(columns).unwrap();
    build_report(DatasetId::new_random(), &table, &metadata("t.csv")).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// A mixed table resembling a typical customer export.
fn customers() -> Vec<Column> {
    vec![
        Column::integers("customer_id", (1..=8).map(Some)),
        Column::texts(
            "segment",
            [
                Some("retail"),
                Some("retail"),
                Some("wholesale"),
                None,
                Some("retail"),
                Some("online"),
                Some("online"),
                Some("retail"),
            ],
        ),
        Column::floats(
            "spend",
            [
                Some(120.0),
                Some(80.5),
                Some(-15.0),
                Some(0.0),
                None,
                Some(310.25),
                Some(42.0),
                Some(99.9),
            ],
        ),
        Column::booleans(
            "active",
            [true, true, false, true, false, true, true, false].map(Some),
        ),
        Column::timestamps(
            "signup",
            [
                Some(day(2023, 1, 15)),
                Some(day(2023, 3, 2)),
                None,
                Some(day(2023, 6, 30)),
                Some(day(2023, 2, 1)),
                Some(day(2024, 1, 15)),
                Some(day(2023, 12, 24)),
                Some(day(2023, 7, 7)),
            ],
        ),
    ]
}

#[test]
fn test_duplicate_and_missing_scenario() {
    let report = report_for(vec![
        Column::integers("id", [Some(1), Some(2), Some(2), Some(3)]),
        Column::texts("name", [Some("a"), Some("b"), Some("b"), None]),
    ]);

    assert_eq!(report.missing_values.total_missing, 1);
    assert_eq!(report.missing_values.missing_by_column["name"], 1);
    assert_eq!(report.missing_values.missing_percentage["name"], 25.0);
    assert_eq!(report.duplicates.duplicate_rows, 1);
    assert_eq!(report.duplicates.duplicate_percentage, 25.0);
}

#[test]
fn test_numeric_statistics_scenario() {
    let report = report_for(vec![Column::integers("v", [10, 20, 30, 40, 50].map(Some))]);
    let stats = &report.statistics.numeric["v"];

    assert_eq!(stats.count, 5);
    assert_eq!(stats.mean, Some(30.0));
    assert_eq!(stats.min, Some(10.0));
    assert_eq!(stats.p25, Some(20.0));
    assert_eq!(stats.p50, Some(30.0));
    assert_eq!(stats.p75, Some(40.0));
    assert_eq!(stats.max, Some(50.0));
    assert!((stats.std.unwrap() - 15.811388300841896).abs() < 1e-9);
}

#[test]
fn test_linear_correlation_scenario() {
    let report = report_for(vec![
        Column::integers("x", [1, 2, 3, 4, 5].map(Some)),
        Column::integers("y", [2, 4, 6, 8, 10].map(Some)),
    ]);

    assert_eq!(report.correlations.len(), 1);
    let pair = &report.correlations[0];
    assert_eq!((pair.column_a.as_str(), pair.column_b.as_str()), ("x", "y"));
    assert!((pair.coefficient - 1.0).abs() < 1e-12);
}

#[test]
fn test_perfect_score_scenario() {
    let report = report_for(vec![
        Column::integers("id", [1, 2, 3].map(Some)),
        Column::texts("code", ["a", "b", "c"].map(Some)),
    ]);

    assert_eq!(report.data_quality.overall_score, 100.0);
    assert_eq!(report.data_quality.completeness_score, 100.0);
    assert_eq!(report.data_quality.uniqueness_score, 100.0);
    assert_eq!(report.data_quality.quality_level, QualityLevel::Excellent);
}

#[test]
fn test_mixed_table_sections() {
    let report = report_for(customers());

    assert_eq!(report.basic_info.rows, 8);
    assert_eq!(report.basic_info.columns, 5);
    assert_eq!(report.column_types.numeric, vec!["customer_id", "spend"]);
    assert_eq!(report.column_types.categorical, vec!["segment"]);
    assert_eq!(report.column_types.datetime, vec!["signup"]);
    assert_eq!(report.column_types.boolean, vec!["active"]);

    assert_eq!(report.missing_values.columns_with_missing, vec!["segment", "spend", "signup"]);
    assert_eq!(report.missing_values.total_missing, 3);

    let spend = &report.statistics.numeric["spend"];
    assert_eq!(spend.count, 7);
    assert_eq!(spend.zeros_count, 1);
    assert_eq!(spend.negative_count, 1);

    let segment = &report.statistics.categorical["segment"];
    assert_eq!(segment.unique_values, 3);
    assert_eq!(segment.top_values[0].value, "retail");
    assert_eq!(segment.top_values[0].count, 4);
    assert_eq!(segment.top_values[1].value, "online");
    assert_eq!(segment.cardinality, Cardinality::Low);

    let signup = &report.statistics.datetime["signup"];
    assert_eq!(signup.min_date.as_deref(), Some("2023-01-15T00:00:00"));
    assert_eq!(signup.max_date.as_deref(), Some("2024-01-15T00:00:00"));
    assert_eq!(signup.range_days, Some(365));

    // Boolean columns are classified but carry no statistics
    assert!(!report.statistics.numeric.contains_key("active"));
    assert!(!report.statistics.categorical.contains_key("active"));

    // 3 of 40 cells missing, no duplicate rows
    assert_eq!(report.data_quality.completeness_score, 92.5);
    assert_eq!(report.data_quality.uniqueness_score, 100.0);
    assert_eq!(report.data_quality.overall_score, 96.25);
    assert_eq!(report.data_quality.quality_level, QualityLevel::Excellent);
}

#[test]
fn test_report_json_shape() {
    let report = report_for(customers());
    let json = report.to_value().unwrap();

    for section in [
        "dataset_id",
        "basic_info",
        "column_types",
        "missing_values",
        "duplicates",
        "memory_usage",
        "statistics",
        "correlations",
        "data_quality",
        "preview",
    ] {
        assert!(json.get(section).is_some(), "missing section {section}");
    }

    assert_eq!(json["data_quality"]["quality_level"], "excellent");
    assert_eq!(json["basic_info"]["dtypes"]["signup"], "timestamp");
    assert!(json["statistics"]["numeric"]["spend"].get("25%").is_some());
    assert!(json["statistics"]["numeric"]["spend"].get("50%").is_some());
    assert_eq!(json["statistics"]["categorical"]["segment"]["cardinality"], "low");
    assert_eq!(json["preview"]["head"][3][1], serde_json::Value::Null);
    assert_eq!(json["preview"]["tail"].as_array().unwrap().len(), 5);
}

#[test]
fn test_identical_input_gives_identical_json() {
    let id = DatasetId::new_random();
    let table = Table::try_new(customers()).unwrap();
    let meta = metadata("customers.csv");

    let first = build_report(id, &table, &meta).unwrap().to_json().unwrap();
    let second = build_report(id, &table, &meta).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_analyses_share_one_dataset() {
    let orchestrator = AnalysisOrchestrator::in_memory();
    let id = orchestrator
        .register(Table::try_new(customers()).unwrap(), metadata("customers.csv"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            orchestrator.analyze(&id).await.unwrap().to_json().unwrap()
        }));
    }

    let mut outputs = Vec::new();
    for handle in handles {
        outputs.push(handle.await.unwrap());
    }
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}

//! File-level exports, read back through the filesystem.

use chrono::{TimeZone, Utc};
use std::fs;
use std::path::Path;
use synthrec_core::{
    export_both, export_customers, export_patients, GenError, GenerateOptions, ModelConfig,
    ReferenceClock,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pinned(count: i64, seed: i64) -> GenerateOptions {
    GenerateOptions::new(count)
        .with_seed(seed)
        .with_clock(ReferenceClock::fixed(
            Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap(),
        ))
}

fn first_column(path: &Path) -> Vec<String> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader
        .records()
        .map(|r| r.unwrap().get(0).unwrap().to_string())
        .collect()
}

#[test]
fn five_seeded_customers_round_trip_through_disk() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.csv");
    let model = ModelConfig::default();

    let summary = export_customers(&path, &pinned(5, 42), &model).unwrap();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.entity, "customer");

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert!(text.starts_with("customer_id,"));
    assert!(text.ends_with('\n'));
    assert!(!text.contains("\r\n"));
    let first_ids = first_column(&path);

    export_customers(&path, &pinned(5, 42), &model).unwrap();
    assert_eq!(first_column(&path), first_ids);
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn three_seeded_patients_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.csv");
    let model = ModelConfig::default();

    export_patients(&path, &pinned(3, 7), &model).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("patient_id,"));
    let ids = first_column(&path);
    assert_eq!(ids.len(), 3);

    export_patients(&path, &pinned(3, 7), &model).unwrap();
    assert_eq!(first_column(&path), ids);
}

#[test]
fn zero_count_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    let summary = export_customers(&path, &pinned(0, 1), &ModelConfig::default()).unwrap();
    assert_eq!(summary.rows, 0);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("customer_id,first_name,last_name,email"));
}

#[test]
fn negative_count_fails_before_touching_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.csv");

    let err = export_patients(&path, &pinned(-3, 1), &ModelConfig::default()).unwrap_err();
    assert!(matches!(err, GenError::InvalidArgument { .. }), "got {err:?}");
    assert!(!path.exists());
}

#[test]
fn both_mode_writes_prefixed_pair() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("run1");

    let [customers, patients] =
        export_both(&out, "demo_", &pinned(5, 3), &ModelConfig::default()).unwrap();

    assert_eq!(customers.path, out.join("demo_customers.csv"));
    assert_eq!(patients.path, out.join("demo_patients.csv"));
    for summary in [&customers, &patients] {
        let text = fs::read_to_string(&summary.path).unwrap();
        assert_eq!(text.lines().count(), 6, "{}", summary.path.display());
    }
}

#[test]
fn both_mode_rejects_negative_count_without_creating_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never");

    assert!(export_both(&out, "", &pinned(-1, 3), &ModelConfig::default()).is_err());
    assert!(!out.exists());
}

#[test]
fn patient_list_columns_are_semicolon_joined() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patients.csv");
    export_patients(&path, &pinned(200, 12), &ModelConfig::default()).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    let conditions = headers.iter().position(|h| h == "chronic_conditions").unwrap();
    let next_visit = headers.iter().position(|h| h == "next_appointment_date").unwrap();

    let mut saw_list = false;
    let mut saw_empty_appointment = false;
    for row in reader.records() {
        let row = row.unwrap();
        saw_list |= row.get(conditions).unwrap().contains(';');
        saw_empty_appointment |= row.get(next_visit).unwrap().is_empty();
    }
    assert!(saw_list);
    assert!(saw_empty_appointment);
}

#[test]
fn custom_model_changes_categorical_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("customers.csv");
    let mut model = ModelConfig::default();
    model.customer.segments = vec!["Only".to_string()];
    model.customer.segment_weights = vec![1.0];

    export_customers(&path, &pinned(20, 5), &model).unwrap();
    let mut reader = csv::Reader::from_path(&path).unwrap();
    let segment = reader
        .headers()
        .unwrap()
        .iter()
        .position(|h| h == "segment")
        .unwrap();
    for row in reader.records() {
        assert_eq!(row.unwrap().get(segment), Some("Only"));
    }
}

//! File-level tests for the CSV writers.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use wavetab_model::{AggregateRow, CanonicalRecord, GapRow, Sex, WaveFrame};
use wavetab_report::{write_aggregate_table, write_gap_table, write_wave_analytic};

fn record(case_id: &str) -> CanonicalRecord {
    CanonicalRecord {
        wave_id: "wave1".to_string(),
        case_id: case_id.to_string(),
        age: Some(30),
        sex_code: Some(2),
        sex_label: Some(Sex::Female),
        birth_year: Some(1960),
        age_le_35: Some(true),
        num_marriages: Some(2.0),
        ever_married: Some(true),
        remarried_2plus: Some(true),
        num_cohab_partners: None,
        ever_cohabited: None,
        ever_partnered: Some(true),
        cohort_primary: Some("1957–60".to_string()),
        cohort_macro: Some("1960–69".to_string()),
        audit: BTreeMap::from([("src_M95".to_string(), Some("2".to_string()))]),
    }
}

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read table")
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn wave_analytic_renders_nulls_as_empty_cells() {
    let dir = TempDir::new().expect("tempdir");
    let frame = WaveFrame {
        wave_id: "wave1".to_string(),
        records: vec![record("1001")],
        source_file: None,
        audit_columns: vec!["src_M95".to_string()],
    };
    let written = write_wave_analytic(dir.path(), &frame).expect("write analytic");
    assert_eq!(written.name, "analytic_wave1");
    assert_eq!(written.rows, 1);

    let rows = lines(&written.path);
    assert!(rows[0].starts_with("wave_id,case_id,age,"));
    assert!(rows[0].ends_with(",src_M95"));
    // num_cohab_partners and ever_cohabited are unknown: empty, not zero.
    assert_eq!(
        rows[1],
        "wave1,1001,30,2,Female,1960,1,2,1,1,,,1,1957–60,1960–69,2"
    );
}

#[test]
fn aggregate_cells_keep_integer_valued_means_intact() {
    let dir = TempDir::new().expect("tempdir");
    let rows = vec![AggregateRow {
        wave: None,
        cohort: "1960–64".to_string(),
        sex: Sex::Female,
        n: 340,
        p_ever_partnered: Some(0.5),
        mean_cohab_partners_if_partnered: Some(10.0),
        mean_marriages_if_partnered: Some(1.25),
        p_remarried_2plus_if_partnered: None,
    }];
    let written =
        write_aggregate_table(dir.path(), "primary_all", &rows, false).expect("write aggregate");

    let lines = lines(&written.path);
    assert_eq!(lines[1], "1960–64,Female,340,0.5,10,1.25,");
}

#[test]
fn gap_table_carries_the_wave_column_and_null_intervals() {
    let dir = TempDir::new().expect("tempdir");
    let rows = vec![GapRow {
        wave: Some("wave2".to_string()),
        cohort: "≤1959".to_string(),
        gap: Some(0.25),
        se: None,
        lo: None,
        hi: None,
    }];
    let written = write_gap_table(dir.path(), "ever_partnered_gap_by_wave", &rows, true)
        .expect("write gaps");

    let lines = lines(&written.path);
    assert_eq!(lines[0], "wave,cohort,gap,se,lo,hi");
    assert_eq!(lines[1], "wave2,≤1959,0.25,,,");
}

//! Integration tests for delimited-extract loading.

use std::io::Write;

use wavetab_ingest::{build_column_hints, merge_on_key, read_raw_table};

fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write fixture");
    file
}

#[test]
fn reads_tab_delimited_extract() {
    let file = write_fixture("MCASEID\tM2BP01\tM2DP01\n1001\t34\t1\n1002\t28\t2\n");
    let table = read_raw_table(file.path(), '\t').expect("read table");

    assert_eq!(table.headers, vec!["MCASEID", "M2BP01", "M2DP01"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.cell(0, 1), "34");
    assert_eq!(table.cell(1, 2), "2");
}

#[test]
fn skips_blank_rows_and_pads_short_rows() {
    let file = write_fixture("A\tB\n\t\n1\n2\t3\n");
    let table = read_raw_table(file.path(), '\t').expect("read table");

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.cell(0, 0), "1");
    assert_eq!(table.cell(0, 1), "");
    assert_eq!(table.cell(1, 1), "3");
}

#[test]
fn comma_delimiter_is_respected() {
    let file = write_fixture("A,B\n1,2\n");
    let table = read_raw_table(file.path(), ',').expect("read table");
    assert_eq!(table.headers, vec!["A", "B"]);
    assert_eq!(table.cell(0, 1), "2");
}

#[test]
fn column_hints_profile_nullness_and_numeric() {
    let file = write_fixture("AGE\tNOTE\n34\tx\n\ty\n28\t\n");
    let table = read_raw_table(file.path(), '\t').expect("read table");
    let hints = build_column_hints(&table);

    let age = &hints["AGE"];
    assert!(age.is_numeric);
    assert!((age.null_ratio - 1.0 / 3.0).abs() < 1e-12);

    let note = &hints["NOTE"];
    assert!(!note.is_numeric);
    assert!((note.unique_ratio - 1.0).abs() < 1e-12);
}

#[test]
fn merge_appends_secondary_columns_on_the_key() {
    let primary_file = write_fixture("CASENUM\tTYPE\tAGE\n100\tR\t30\n200\tR\t41\n300\tH\t28\n");
    let aux_file = write_fixture("CASENUM\tNMAR\tNCOHAB\n100\t1\t0\n300\t0\t2\n300\t9\t9\n");
    let primary = read_raw_table(primary_file.path(), '\t').expect("primary");
    let aux = read_raw_table(aux_file.path(), '\t').expect("aux");

    let merged = merge_on_key(&primary, &aux, "CASENUM").expect("merge");
    assert_eq!(merged.headers, vec!["CASENUM", "TYPE", "AGE", "NMAR", "NCOHAB"]);
    assert_eq!(merged.rows.len(), 3);
    assert_eq!(merged.cell(0, 3), "1");
    // The first secondary row wins on a repeated key.
    assert_eq!(merged.cell(2, 3), "0");
    assert_eq!(merged.cell(2, 4), "2");
    // Unmatched primary rows keep empty cells for secondary columns.
    assert_eq!(merged.cell(1, 3), "");
    assert_eq!(merged.cell(1, 4), "");
}

#[test]
fn merge_without_the_key_column_fails() {
    let primary_file = write_fixture("CASENUM\tAGE\n100\t30\n");
    let aux_file = write_fixture("ID\tNMAR\n100\t1\n");
    let primary = read_raw_table(primary_file.path(), '\t').expect("primary");
    let aux = read_raw_table(aux_file.path(), '\t').expect("aux");

    let error = merge_on_key(&primary, &aux, "CASENUM").expect_err("must fail");
    assert!(error.to_string().contains("CASENUM"));
}

#[test]
fn empty_file_yields_empty_table() {
    let file = write_fixture("");
    let table = read_raw_table(file.path(), '\t').expect("read table");
    assert!(table.headers.is_empty());
    assert!(table.rows.is_empty());
}

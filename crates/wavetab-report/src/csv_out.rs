//! CSV serialization of analytic, aggregate, and gap tables.
//!
//! One file per logical sheet. Nulls serialize as empty cells; every float
//! goes through one shared formatter so that reruns on identical input
//! produce byte-identical files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use wavetab_model::{
    AggregateRow, CANONICAL_FIELDS, CanonicalRecord, Datum, GapRow, StackedDataset, WaveFrame,
};

/// A table written to disk, for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct WrittenTable {
    pub name: String,
    pub rows: usize,
    pub path: PathBuf,
}

/// Formats a float without trailing zeros ("10.50" -> "10.5", "10.0" -> "10").
/// Integer-valued floats already render without a decimal point; stripping
/// only applies when one is present, so "10" stays "10".
pub fn format_number(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn render(datum: &Datum) -> String {
    match datum {
        Datum::Null => String::new(),
        Datum::Int(v) => v.to_string(),
        Datum::Num(v) => format_number(*v),
        Datum::Bool(v) => if *v { "1" } else { "0" }.to_string(),
        Datum::Text(v) => v.clone(),
    }
}

fn render_opt(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_default()
}

fn write_rows(
    path: &Path,
    name: &str,
    header: &[String],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<WrittenTable> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    writer
        .write_record(header)
        .with_context(|| format!("write header: {}", path.display()))?;
    let mut count = 0usize;
    for row in rows {
        writer
            .write_record(&row)
            .with_context(|| format!("write row: {}", path.display()))?;
        count += 1;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(table = name, rows = count, path = %path.display(), "table written");
    Ok(WrittenTable {
        name: name.to_string(),
        rows: count,
        path: path.to_path_buf(),
    })
}

fn record_row(record: &CanonicalRecord, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|column| render(&record.field(column)))
        .collect()
}

/// Writes one wave's canonical table as `analytic_<wave>.csv`, canonical
/// fields first, then the wave's audit columns.
pub fn write_wave_analytic(out_dir: &Path, frame: &WaveFrame) -> Result<WrittenTable> {
    let name = format!("analytic_{}", frame.wave_id);
    let path = out_dir.join(format!("{name}.csv"));
    let columns: Vec<String> = CANONICAL_FIELDS
        .iter()
        .map(|field| (*field).to_string())
        .chain(frame.audit_columns.iter().cloned())
        .collect();
    write_rows(
        &path,
        &name,
        &columns,
        frame.records.iter().map(|record| record_row(record, &columns)),
    )
}

/// Writes the stacked union-schema table as `stacked_analytic.csv`, all
/// columns sorted by name for reproducibility.
pub fn write_stacked_analytic(out_dir: &Path, stacked: &StackedDataset) -> Result<WrittenTable> {
    let path = out_dir.join("stacked_analytic.csv");
    let columns = stacked.sorted_columns();
    write_rows(
        &path,
        "stacked_analytic",
        &columns,
        stacked
            .records
            .iter()
            .map(|record| record_row(record, &columns)),
    )
}

fn aggregate_header(by_wave: bool) -> Vec<String> {
    let mut header = Vec::new();
    if by_wave {
        header.push("wave".to_string());
    }
    header.extend(
        [
            "cohort",
            "sex",
            "n",
            "p_ever_partnered",
            "mean_cohab_partners_if_partnered",
            "mean_marriages_if_partnered",
            "p_remarried_2plus_if_partnered",
        ]
        .iter()
        .map(|column| (*column).to_string()),
    );
    header
}

/// Writes an aggregate table (`primary_all`, `primary_present`, or a
/// by-wave variant with a leading `wave` column).
pub fn write_aggregate_table(
    out_dir: &Path,
    name: &str,
    rows: &[AggregateRow],
    by_wave: bool,
) -> Result<WrittenTable> {
    let path = out_dir.join(format!("{name}.csv"));
    write_rows(
        &path,
        name,
        &aggregate_header(by_wave),
        rows.iter().map(|row| {
            let mut cells = Vec::new();
            if by_wave {
                cells.push(row.wave.clone().unwrap_or_default());
            }
            cells.push(row.cohort.clone());
            cells.push(row.sex.label().to_string());
            cells.push(row.n.to_string());
            cells.push(render_opt(row.p_ever_partnered));
            cells.push(render_opt(row.mean_cohab_partners_if_partnered));
            cells.push(render_opt(row.mean_marriages_if_partnered));
            cells.push(render_opt(row.p_remarried_2plus_if_partnered));
            cells
        }),
    )
}

/// Writes a gap table with its interval columns.
pub fn write_gap_table(
    out_dir: &Path,
    name: &str,
    rows: &[GapRow],
    by_wave: bool,
) -> Result<WrittenTable> {
    let path = out_dir.join(format!("{name}.csv"));
    let mut header = Vec::new();
    if by_wave {
        header.push("wave".to_string());
    }
    header.extend(
        ["cohort", "gap", "se", "lo", "hi"]
            .iter()
            .map(|column| (*column).to_string()),
    );
    write_rows(
        &path,
        name,
        &header,
        rows.iter().map(|row| {
            let mut cells = Vec::new();
            if by_wave {
                cells.push(row.wave.clone().unwrap_or_default());
            }
            cells.push(row.cohort.clone());
            cells.push(render_opt(row.gap));
            cells.push(render_opt(row.se));
            cells.push(render_opt(row.lo));
            cells.push(render_opt(row.hi));
            cells
        }),
    )
}

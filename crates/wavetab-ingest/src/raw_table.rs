use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use sha2::Digest;
use tracing::debug;

/// One wave's raw extract: header row plus string cells, as delivered by
/// the source instrument. Consumed by normalization and then discarded.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell<'a>(&'a self, row: usize, column: usize) -> &'a str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Per-column profiling hints, reported by the `check` command.
#[derive(Debug, Clone)]
pub struct ColumnHint {
    pub is_numeric: bool,
    pub unique_ratio: f64,
    pub null_ratio: f64,
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Reads a delimited extract. The first non-blank row is the header; blank
/// rows are skipped; short rows are padded with empty cells.
pub fn read_raw_table(path: &Path, delimiter: char) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read extract: {}", path.display()))?;
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("read record: {}", path.display()))?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(RawTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    }
    let headers: Vec<String> = raw_rows[0]
        .iter()
        .map(|value| normalize_header(value))
        .collect();
    let mut rows = Vec::with_capacity(raw_rows.len() - 1);
    for record in raw_rows.iter().skip(1) {
        let mut row = Vec::with_capacity(headers.len());
        for idx in 0..headers.len() {
            let value = record.get(idx).map(String::as_str).unwrap_or("");
            row.push(normalize_cell(value));
        }
        rows.push(row);
    }
    debug!(
        path = %path.display(),
        columns = headers.len(),
        rows = rows.len(),
        "extract loaded"
    );
    Ok(RawTable { headers, rows })
}

/// Left-merges a secondary extract onto the primary on a shared key
/// column. The secondary's columns (minus the key) are appended; primary
/// rows without a match get empty cells; when the secondary repeats a key,
/// the first occurrence wins.
pub fn merge_on_key(primary: &RawTable, aux: &RawTable, key: &str) -> Result<RawTable> {
    let primary_key = primary
        .column_index(key)
        .with_context(|| format!("merge key {key:?} not found in primary extract"))?;
    let aux_key = aux
        .column_index(key)
        .with_context(|| format!("merge key {key:?} not found in secondary extract"))?;

    let mut aux_by_key: BTreeMap<&str, &Vec<String>> = BTreeMap::new();
    for row in &aux.rows {
        let key_value = row.get(aux_key).map(String::as_str).unwrap_or("");
        aux_by_key.entry(key_value).or_insert(row);
    }

    let appended: Vec<usize> = (0..aux.headers.len()).filter(|idx| *idx != aux_key).collect();
    let mut headers = primary.headers.clone();
    headers.extend(appended.iter().map(|idx| aux.headers[*idx].clone()));

    let mut rows = Vec::with_capacity(primary.rows.len());
    for row in &primary.rows {
        let mut merged = row.clone();
        let key_value = row.get(primary_key).map(String::as_str).unwrap_or("");
        match aux_by_key.get(key_value) {
            Some(aux_row) => {
                merged.extend(
                    appended
                        .iter()
                        .map(|idx| aux_row.get(*idx).cloned().unwrap_or_default()),
                );
            }
            None => merged.extend(appended.iter().map(|_| String::new())),
        }
        rows.push(merged);
    }

    debug!(
        key,
        matched_columns = appended.len(),
        rows = rows.len(),
        "extracts merged"
    );
    Ok(RawTable { headers, rows })
}

/// Deterministic fallback case id for waves without an id column:
/// sha256("<source_id>\0<record_number>"), first 16 bytes, hex.
pub fn derive_case_id(source_id: &str, record_number: u64) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(source_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(record_number.to_string().as_bytes());
    let digest: [u8; 32] = hasher.finalize().into();
    digest[..16].iter().fold(
        String::with_capacity(32),
        |mut out, byte| {
            use std::fmt::Write;
            let _ = write!(out, "{byte:02x}");
            out
        },
    )
}

pub fn build_column_hints(table: &RawTable) -> BTreeMap<String, ColumnHint> {
    let mut hints = BTreeMap::new();
    let row_count = table.rows.len();
    for (col_idx, header) in table.headers.iter().enumerate() {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        let mut uniques = BTreeSet::new();
        for row in &table.rows {
            let value = row.get(col_idx).map(String::as_str).unwrap_or("");
            if value.is_empty() {
                continue;
            }
            non_null += 1;
            uniques.insert(value.to_string());
            if value.parse::<f64>().is_ok() {
                numeric += 1;
            }
        }
        let null_ratio = if row_count == 0 {
            1.0
        } else {
            (row_count.saturating_sub(non_null)) as f64 / row_count as f64
        };
        let unique_ratio = if non_null == 0 {
            0.0
        } else {
            uniques.len() as f64 / non_null as f64
        };
        let is_numeric = non_null > 0 && numeric == non_null;
        hints.insert(
            header.clone(),
            ColumnHint {
                is_numeric,
                unique_ratio,
                null_ratio,
            },
        );
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_id_is_deterministic() {
        let a = derive_case_id("data/wave2.tsv", 1);
        let b = derive_case_id("data/wave2.tsv", 1);
        let c = derive_case_id("data/wave2.tsv", 2);
        let d = derive_case_id("data/wave1.tsv", 1);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn header_normalization_strips_bom_and_whitespace() {
        assert_eq!(normalize_header("\u{feff} MCASEID "), "MCASEID");
        assert_eq!(normalize_header("two  words"), "two words");
    }
}

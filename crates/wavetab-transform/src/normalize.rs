//! Generic, configuration-driven wave normalization.
//!
//! One normalizer serves every wave: the per-wave [`WaveConfig`] names the
//! source columns and fallback signals, and the derivation order is fixed
//! (age, sex, birth year, age restriction, marriage block, cohabitation
//! block, partnership, cohorts, audit). New waves are onboarded by adding
//! configuration, not code paths.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, info};

use wavetab_ingest::{RawTable, derive_case_id};
use wavetab_model::{
    AgeSource, CanonicalRecord, CohabSignal, MarriageSignal, Result, Sex, WaveConfig, WaveFrame,
    WavetabError,
};

use crate::binner;
use crate::recode::recode_cell;

struct Columns<'a> {
    raw: &'a RawTable,
    index: BTreeMap<String, usize>,
    missing_codes: &'a [f64],
}

impl Columns<'_> {
    fn raw_cell(&self, row: usize, name: &str) -> &str {
        match self.index.get(name) {
            Some(idx) => self.raw.cell(row, *idx),
            None => "",
        }
    }

    fn num(&self, row: usize, name: &str) -> Option<f64> {
        recode_cell(self.raw_cell(row, name), self.missing_codes)
    }
}

fn resolve_columns<'a>(config: &'a WaveConfig, raw: &'a RawTable) -> Result<Columns<'a>> {
    let mut index = BTreeMap::new();
    let mut missing = BTreeSet::new();
    for column in config.source_columns() {
        match raw.column_index(column) {
            Some(idx) => {
                index.insert(column.to_string(), idx);
            }
            None => {
                missing.insert(column.to_string());
            }
        }
    }
    if !missing.is_empty() {
        return Err(WavetabError::MissingColumns {
            wave_id: config.wave_id.clone(),
            missing: missing.into_iter().collect(),
            present: raw.headers.clone(),
        });
    }
    Ok(Columns {
        raw,
        index,
        missing_codes: &config.missing_codes,
    })
}

/// Boolean OR over nullable signals: true if any signal is true, null iff
/// every signal is unknown, false otherwise. Genuinely unknown values are
/// never coalesced to false.
fn combine_or(signals: &[Option<bool>]) -> Option<bool> {
    if signals.iter().any(|signal| *signal == Some(true)) {
        return Some(true);
    }
    if signals.iter().all(Option::is_none) {
        return None;
    }
    Some(false)
}

fn derive_age(config: &WaveConfig, cols: &Columns<'_>, row: usize) -> Option<f64> {
    match &config.age {
        AgeSource::Column { column } => cols.num(row, column),
        AgeSource::DateOfBirth {
            dob_month,
            dob_year2,
            interview_year,
            interview_month,
            interview_day,
        } => {
            let y2 = cols.num(row, dob_year2)?;
            let iy = cols.num(row, interview_year)?;
            // Two-digit birth years map to the 1900s; day of birth is not
            // recorded, so mid-month is assumed on both sides of missing
            // date parts.
            let dob_m = cols.num(row, dob_month).unwrap_or(6.0);
            let iv_m = cols.num(row, interview_month).unwrap_or(6.0);
            let iv_d = cols.num(row, interview_day).unwrap_or(15.0);
            let dob = NaiveDate::from_ymd_opt(1900 + y2 as i32, dob_m as u32, 15)?;
            let interview = NaiveDate::from_ymd_opt(iy as i32, iv_m as u32, iv_d as u32)?;
            let days = (interview - dob).num_days();
            Some((days as f64 / 365.25).floor())
        }
    }
}

fn normalize_row(
    config: &WaveConfig,
    cols: &Columns<'_>,
    audit_sources: &[String],
    row: usize,
) -> CanonicalRecord {
    let age_f = derive_age(config, cols, row);
    let age = age_f.map(|a| a.floor() as i64);

    let sex_code = cols.num(row, &config.sex_column).and_then(|v| {
        if v == 1.0 {
            Some(1u8)
        } else if v == 2.0 {
            Some(2u8)
        } else {
            None
        }
    });
    let sex_label = sex_code.and_then(Sex::from_code);

    let birth_year = match &config.birth_year_column {
        Some(column) => cols.num(row, column).map(|v| v.floor() as i64),
        None => age.map(|a| config.reference_year - a),
    };

    let age_le_35 = age.map(|a| a <= 35);

    let mut num_marriages = None;
    let mut marriage_flags: Vec<Option<bool>> = Vec::new();
    for signal in &config.marriage {
        match signal {
            MarriageSignal::Count { column, .. } => {
                let count = cols.num(row, column);
                if num_marriages.is_none() {
                    num_marriages = count;
                }
                marriage_flags.push(count.map(|c| c >= 1.0));
            }
            MarriageSignal::SinceLastWave { column } => {
                marriage_flags.push(cols.num(row, column).map(|v| v == 1.0));
            }
            MarriageSignal::StatusCodes { column, ever_codes } => {
                marriage_flags.push(cols.num(row, column).map(|v| ever_codes.contains(&v)));
            }
        }
    }
    let ever_married = combine_or(&marriage_flags);

    let mut remarried_flags = vec![num_marriages.map(|c| c >= 2.0)];
    if let Some(mb) = &config.married_before {
        remarried_flags.push(cols.num(row, &mb.column).map(|v| v == mb.code));
    }
    let remarried_2plus = combine_or(&remarried_flags);

    // Waves with only status indicators still report a marriage count:
    // never married is 0, married once is 1, married before is 2. Waves
    // that configure a real count keep a null count null (unknown, not
    // synthesized).
    let has_count_signal = config
        .marriage
        .iter()
        .any(|signal| matches!(signal, MarriageSignal::Count { .. }));
    if !has_count_signal {
        num_marriages = match (ever_married, remarried_2plus) {
            (Some(false), _) => Some(0.0),
            (Some(true), Some(true)) => Some(2.0),
            (Some(true), Some(false)) => Some(1.0),
            _ => None,
        };
    }

    let mut num_cohab_partners = None;
    let mut cohab_flags: Vec<Option<bool>> = Vec::new();
    for signal in &config.cohabitation {
        match signal {
            CohabSignal::Count { column, .. } => {
                let count = cols.num(row, column);
                if num_cohab_partners.is_none() {
                    num_cohab_partners = count;
                }
                cohab_flags.push(count.map(|c| c >= 1.0));
            }
            CohabSignal::SinceLastWave { column } | CohabSignal::CurrentStatus { column } => {
                cohab_flags.push(cols.num(row, column).map(|v| v == 1.0));
            }
        }
    }
    let ever_cohabited = combine_or(&cohab_flags);

    let ever_partnered = combine_or(&[ever_married, ever_cohabited]);

    let birth_year_f = birth_year.map(|y| y as f64);
    let cohort_primary =
        binner::bin(birth_year_f, &config.primary_scheme).map(ToString::to_string);
    let cohort_macro = binner::bin(birth_year_f, &config.macro_scheme).map(ToString::to_string);

    let record_number = (row as u64) + 1;
    let case_id = match &config.case_id_column {
        Some(column) => {
            let raw_id = cols.raw_cell(row, column);
            if raw_id.is_empty() {
                derive_case_id(&config.wave_id, record_number)
            } else {
                raw_id.to_string()
            }
        }
        None => derive_case_id(&config.wave_id, record_number),
    };

    let mut audit = BTreeMap::new();
    for column in audit_sources {
        let raw_value = cols.raw_cell(row, column);
        audit.insert(
            format!("src_{column}"),
            if raw_value.is_empty() {
                None
            } else {
                Some(raw_value.to_string())
            },
        );
    }

    CanonicalRecord {
        wave_id: config.wave_id.clone(),
        case_id,
        age,
        sex_code,
        sex_label,
        birth_year,
        age_le_35,
        num_marriages,
        ever_married,
        remarried_2plus,
        num_cohab_partners,
        ever_cohabited,
        ever_partnered,
        cohort_primary,
        cohort_macro,
        audit,
    }
}

/// Normalizes one wave's raw extract into its canonical table.
///
/// Fails fatally when a configured source column is absent (naming the
/// columns actually present) or when, after all fallbacks, the wave yields
/// no usable age or sex signal at all.
pub fn normalize_wave(config: &WaveConfig, raw: &RawTable) -> Result<WaveFrame> {
    config.primary_scheme.validate()?;
    config.macro_scheme.validate()?;
    let cols = resolve_columns(config, raw)?;

    let audit_sources: Vec<String> = config
        .source_columns()
        .into_iter()
        .map(ToString::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    debug!(
        wave_id = %config.wave_id,
        rows = raw.rows.len(),
        source_columns = audit_sources.len(),
        "normalizing wave"
    );

    // Row numbers for derived case ids stay tied to the raw extract, so a
    // filter change never renumbers the rows that survive it.
    let records: Vec<CanonicalRecord> = (0..raw.rows.len())
        .filter(|row| match &config.respondent_filter {
            Some(filter) => cols.raw_cell(*row, &filter.column) == filter.value,
            None => true,
        })
        .map(|row| normalize_row(config, &cols, &audit_sources, row))
        .collect();

    if !records.is_empty() {
        if records.iter().all(|record| record.age.is_none()) {
            return Err(WavetabError::MissingSignal {
                wave_id: config.wave_id.clone(),
                signal: "age",
            });
        }
        if records.iter().all(|record| record.sex_label.is_none()) {
            return Err(WavetabError::MissingSignal {
                wave_id: config.wave_id.clone(),
                signal: "sex",
            });
        }
    }

    let audit_columns: Vec<String> = audit_sources
        .iter()
        .map(|column| format!("src_{column}"))
        .collect();

    info!(
        wave_id = %config.wave_id,
        records = records.len(),
        "wave normalized"
    );

    Ok(WaveFrame {
        wave_id: config.wave_id.clone(),
        records,
        source_file: Some(config.input.clone()),
        audit_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::combine_or;

    #[test]
    fn or_combination_is_three_valued() {
        assert_eq!(combine_or(&[Some(true), None]), Some(true));
        assert_eq!(combine_or(&[Some(true), Some(false)]), Some(true));
        assert_eq!(combine_or(&[Some(false), Some(false)]), Some(false));
        // A single known-false signal is enough to say false.
        assert_eq!(combine_or(&[Some(false), None]), Some(false));
        // Genuinely unknown stays unknown.
        assert_eq!(combine_or(&[None, None]), None);
        assert_eq!(combine_or(&[]), None);
    }
}

//! Run and per-wave normalization configuration.
//!
//! A wave is onboarded by adding configuration, not code: the generic
//! normalizer evaluates the source-field map and fallback signals declared
//! here. Instrument drift (e.g. a "since last interview" count instead of a
//! lifetime count) is declared as a semantics annotation on the signal and
//! carried through, never coerced to another wave's meaning.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cohort::CohortScheme;

/// The common run of missing-value sentinels used by the survey instruments
/// (7/8/9 repeated at each field width).
pub fn default_missing_codes() -> Vec<f64> {
    vec![
        7.0, 8.0, 9.0, 97.0, 98.0, 99.0, 997.0, 998.0, 999.0, 9997.0, 9998.0, 9999.0, 99997.0,
        99998.0, 99999.0,
    ]
}

fn default_delimiter() -> char {
    '\t'
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_min_n() -> usize {
    200
}

/// Top-level run configuration: wave inputs plus output controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub waves: Vec<WaveConfig>,
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Minimum per-sex group size before a cohort is published.
    #[serde(default = "default_min_n")]
    pub min_n: usize,
}

/// Where a wave's respondent age comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgeSource {
    /// A direct age-in-years column.
    Column { column: String },
    /// Derived from date of birth (month + two-digit year, mapped to
    /// 1900+yy) and the interview date. Day of birth is not recorded;
    /// mid-month (day 15) is assumed.
    DateOfBirth {
        dob_month: String,
        dob_year2: String,
        interview_year: String,
        interview_month: String,
        interview_day: String,
    },
}

/// Measurement semantics of a partner/marriage count column. Carried as an
/// annotation so cross-wave differences stay visible in output instead of
/// being papered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSemantics {
    Lifetime,
    SinceLastWave,
    SinceLastMarriage,
}

/// A source signal contributing to `ever_married` / `num_marriages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarriageSignal {
    /// A marriage count; also supplies `num_marriages`.
    Count {
        column: String,
        semantics: CountSemantics,
    },
    /// "Married since last interview" indicator (1 = yes).
    SinceLastWave { column: String },
    /// A marital-status column; any of `ever_codes` means ever married.
    StatusCodes { column: String, ever_codes: Vec<f64> },
}

/// A source signal contributing to `ever_cohabited` / `num_cohab_partners`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CohabSignal {
    /// A cohabiting-partner count; also supplies `num_cohab_partners`.
    Count {
        column: String,
        semantics: CountSemantics,
    },
    /// "Cohabited since last interview" indicator (1 = yes).
    SinceLastWave { column: String },
    /// "Currently living with a partner" status (1 = yes), used as a proxy
    /// for ever cohabited. Known to undercount; kept as documented.
    CurrentStatus { column: String },
}

/// "Married before current marriage" indicator, used for `remarried_2plus`
/// by waves that record no marriage count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarriedBefore {
    pub column: String,
    /// Code meaning "was married before" (e.g. 2).
    pub code: f64,
}

/// A secondary extract merged onto the primary on a shared key column
/// (e.g. a household roster carrying sex and marital status).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuxInput {
    pub input: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Key column present in both extracts.
    pub key_column: String,
}

/// Keeps only rows whose raw cell equals `value` (e.g. `TYPE == "R"` to
/// restrict a household file to primary respondents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

/// Per-wave normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveConfig {
    pub wave_id: String,
    pub input: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Secondary extract left-merged onto the primary before normalization.
    #[serde(default)]
    pub aux_input: Option<AuxInput>,
    /// Row restriction applied before normalization.
    #[serde(default)]
    pub respondent_filter: Option<RowFilter>,
    /// Interview year used when `birth_year` must be derived from age.
    pub reference_year: i64,
    /// Respondent id column; when absent, deterministic row ids are derived
    /// from the source path and record number.
    #[serde(default)]
    pub case_id_column: Option<String>,
    #[serde(default = "default_missing_codes")]
    pub missing_codes: Vec<f64>,
    pub age: AgeSource,
    /// Sex column, coded 1 = Male, 2 = Female.
    pub sex_column: String,
    /// Direct birth-year column; falls back to `reference_year - age`.
    #[serde(default)]
    pub birth_year_column: Option<String>,
    #[serde(default)]
    pub marriage: Vec<MarriageSignal>,
    #[serde(default)]
    pub cohabitation: Vec<CohabSignal>,
    #[serde(default)]
    pub married_before: Option<MarriedBefore>,
    pub primary_scheme: CohortScheme,
    #[serde(default = "CohortScheme::default_macro")]
    pub macro_scheme: CohortScheme,
}

impl WaveConfig {
    /// Every source column this configuration references, in a fixed order.
    /// Used for missing-column diagnostics and audit retention.
    pub fn source_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        if let Some(id) = &self.case_id_column {
            columns.push(id);
        }
        if let Some(filter) = &self.respondent_filter {
            columns.push(&filter.column);
        }
        match &self.age {
            AgeSource::Column { column } => columns.push(column),
            AgeSource::DateOfBirth {
                dob_month,
                dob_year2,
                interview_year,
                interview_month,
                interview_day,
            } => {
                columns.extend([
                    dob_month.as_str(),
                    dob_year2.as_str(),
                    interview_year.as_str(),
                    interview_month.as_str(),
                    interview_day.as_str(),
                ]);
            }
        }
        columns.push(&self.sex_column);
        if let Some(by) = &self.birth_year_column {
            columns.push(by);
        }
        for signal in &self.marriage {
            match signal {
                MarriageSignal::Count { column, .. }
                | MarriageSignal::SinceLastWave { column }
                | MarriageSignal::StatusCodes { column, .. } => columns.push(column),
            }
        }
        for signal in &self.cohabitation {
            match signal {
                CohabSignal::Count { column, .. }
                | CohabSignal::SinceLastWave { column }
                | CohabSignal::CurrentStatus { column } => columns.push(column),
            }
        }
        if let Some(mb) = &self.married_before {
            columns.push(&mb.column);
        }
        columns
    }
}

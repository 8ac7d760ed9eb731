//! Canonical per-respondent records and the tables built from them.
//!
//! Every analysis field is explicitly nullable: a wave that cannot supply a
//! value (or supplies a documented missing-sentinel) carries `None`, never a
//! silent zero. Downstream statistics use null-excluding means, so a single
//! missing datum only shrinks a group's effective denominator.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Respondent sex. Declaration order fixes the emission order of grouped
/// tables (Female rows before Male rows within a cohort).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Maps the fixed survey coding {1 -> Male, 2 -> Female}.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

/// A single rendered cell value, typed so that serializers can apply one
/// shared numeric formatter.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Int(i64),
    Num(f64),
    Text(String),
    Bool(bool),
    Null,
}

/// One respondent in one wave, after normalization.
///
/// Invariant: `ever_partnered` is `Some(true)` iff at least one of
/// `ever_married` / `ever_cohabited` is `Some(true)`, and `None` only when
/// both are `None` (unknown, not false).
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    pub wave_id: String,
    pub case_id: String,
    pub age: Option<i64>,
    pub sex_code: Option<u8>,
    pub sex_label: Option<Sex>,
    pub birth_year: Option<i64>,
    pub age_le_35: Option<bool>,
    pub num_marriages: Option<f64>,
    pub ever_married: Option<bool>,
    pub remarried_2plus: Option<bool>,
    pub num_cohab_partners: Option<f64>,
    pub ever_cohabited: Option<bool>,
    pub ever_partnered: Option<bool>,
    pub cohort_primary: Option<String>,
    pub cohort_macro: Option<String>,
    /// Wave-specific raw source values retained verbatim for traceability,
    /// keyed `src_<COLUMN>`. `None` means the raw cell was empty.
    pub audit: BTreeMap<String, Option<String>>,
}

/// Canonical (non-audit) field names, in declaration order.
pub const CANONICAL_FIELDS: [&str; 15] = [
    "wave_id",
    "case_id",
    "age",
    "sex_code",
    "sex_label",
    "birth_year",
    "age_le_35",
    "num_marriages",
    "ever_married",
    "remarried_2plus",
    "num_cohab_partners",
    "ever_cohabited",
    "ever_partnered",
    "cohort_primary",
    "cohort_macro",
];

impl CanonicalRecord {
    /// Name-based field access, covering canonical fields and audit columns.
    /// Unknown names (audit columns contributed by other waves) yield `Null`.
    pub fn field(&self, name: &str) -> Datum {
        fn opt_int(v: Option<i64>) -> Datum {
            v.map_or(Datum::Null, Datum::Int)
        }
        fn opt_bool(v: Option<bool>) -> Datum {
            v.map_or(Datum::Null, Datum::Bool)
        }
        fn opt_num(v: Option<f64>) -> Datum {
            v.map_or(Datum::Null, Datum::Num)
        }
        fn opt_text(v: Option<&String>) -> Datum {
            v.map_or(Datum::Null, |s| Datum::Text(s.clone()))
        }
        match name {
            "wave_id" => Datum::Text(self.wave_id.clone()),
            "case_id" => Datum::Text(self.case_id.clone()),
            "age" => opt_int(self.age),
            "sex_code" => opt_int(self.sex_code.map(i64::from)),
            "sex_label" => self
                .sex_label
                .map_or(Datum::Null, |s| Datum::Text(s.label().to_string())),
            "birth_year" => opt_int(self.birth_year),
            "age_le_35" => opt_bool(self.age_le_35),
            "num_marriages" => opt_num(self.num_marriages),
            "ever_married" => opt_bool(self.ever_married),
            "remarried_2plus" => opt_bool(self.remarried_2plus),
            "num_cohab_partners" => opt_num(self.num_cohab_partners),
            "ever_cohabited" => opt_bool(self.ever_cohabited),
            "ever_partnered" => opt_bool(self.ever_partnered),
            "cohort_primary" => opt_text(self.cohort_primary.as_ref()),
            "cohort_macro" => opt_text(self.cohort_macro.as_ref()),
            other => match self.audit.get(other) {
                Some(Some(raw)) => Datum::Text(raw.clone()),
                _ => Datum::Null,
            },
        }
    }
}

/// One wave's canonical table, with provenance metadata.
#[derive(Debug, Clone)]
pub struct WaveFrame {
    pub wave_id: String,
    pub records: Vec<CanonicalRecord>,
    /// The raw extract this frame was derived from.
    pub source_file: Option<PathBuf>,
    /// Audit column names produced by this wave, sorted by name.
    pub audit_columns: Vec<String>,
}

impl WaveFrame {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// The union of all waves' canonical tables.
///
/// Records keep wave order then original row order; `audit_columns` is the
/// sorted union of every wave's audit columns. Fields a wave never produced
/// read as null for its rows.
#[derive(Debug, Clone)]
pub struct StackedDataset {
    pub records: Vec<CanonicalRecord>,
    pub audit_columns: Vec<String>,
}

impl StackedDataset {
    /// Full stacked schema, all column names sorted for reproducibility.
    pub fn sorted_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = CANONICAL_FIELDS
            .iter()
            .map(|name| (*name).to_string())
            .chain(self.audit_columns.iter().cloned())
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }
}

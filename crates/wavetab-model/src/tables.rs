//! Derived aggregate and gap table rows.

use crate::record::Sex;

/// One cohort×sex summary row. `wave` is set for by-wave tables and `None`
/// for pooled tables.
///
/// `n` counts records with `age_le_35 = true` in the group. Conditional
/// metrics are computed over the `ever_partnered = true` subgroup and are
/// `None` when that subgroup is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub wave: Option<String>,
    pub cohort: String,
    pub sex: Sex,
    pub n: usize,
    pub p_ever_partnered: Option<f64>,
    pub mean_cohab_partners_if_partnered: Option<f64>,
    pub mean_marriages_if_partnered: Option<f64>,
    pub p_remarried_2plus_if_partnered: Option<f64>,
}

/// Female-minus-male partnership-prevalence gap for one retained cohort,
/// with its independent-proportions 95% Wald interval.
///
/// All statistics are `None` (never a panic) when either sex's prevalence
/// is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct GapRow {
    pub wave: Option<String>,
    pub cohort: String,
    pub gap: Option<f64>,
    pub se: Option<f64>,
    pub lo: Option<f64>,
    pub hi: Option<f64>,
}

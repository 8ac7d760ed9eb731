//! Cohort×sex aggregation over the canonical record set.

use std::collections::BTreeMap;

use tracing::debug;

use wavetab_model::{AggregateRow, CanonicalRecord, Sex};
use wavetab_transform::cohort_sort_key;

/// Grouping key shape for aggregate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// `(cohort, sex)` pooled across waves.
    Pooled,
    /// `(wave, cohort, sex)`.
    ByWave,
}

/// Null-excluding mean of nullable booleans (true = 1, false = 0).
fn mean_bool<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = Option<bool>>,
{
    mean_num(values.map(|v| v.map(|b| if b { 1.0 } else { 0.0 })))
}

/// Null-excluding arithmetic mean; `None` when no non-null value exists.
fn mean_num<I>(values: I) -> Option<f64>
where
    I: Iterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values.flatten() {
        sum += value;
        count += 1;
    }
    if count == 0 { None } else { Some(sum / count as f64) }
}

/// Computes one [`AggregateRow`] per group.
///
/// Restricts to records with `age_le_35 = true`; records whose cohort or
/// sex is null cannot form a group key and are excluded. Nulls are excluded
/// from every mean (they shrink the denominator, never count as zero).
/// Conditional metrics cover the `ever_partnered = true` subgroup and are
/// null when it is empty. No group is dropped for small size here;
/// suppression is a separate step. Groups emit sorted by wave, cohort
/// chronology, then Female before Male, independent of hash order.
pub fn aggregate(records: &[CanonicalRecord], grouping: Grouping) -> Vec<AggregateRow> {
    type Key = (Option<String>, (u8, u64), String, Sex);
    let mut groups: BTreeMap<Key, Vec<&CanonicalRecord>> = BTreeMap::new();
    for record in records {
        if record.age_le_35 != Some(true) {
            continue;
        }
        let Some(cohort) = record.cohort_primary.as_ref() else {
            continue;
        };
        let Some(sex) = record.sex_label else {
            continue;
        };
        let wave = match grouping {
            Grouping::Pooled => None,
            Grouping::ByWave => Some(record.wave_id.clone()),
        };
        groups
            .entry((wave, cohort_sort_key(cohort), cohort.clone(), sex))
            .or_default()
            .push(record);
    }

    debug!(groups = groups.len(), grouping = ?grouping, "aggregating");

    groups
        .into_iter()
        .map(|((wave, _, cohort, sex), members)| {
            let partnered: Vec<&&CanonicalRecord> = members
                .iter()
                .filter(|record| record.ever_partnered == Some(true))
                .collect();
            AggregateRow {
                wave,
                cohort,
                sex,
                n: members.len(),
                p_ever_partnered: mean_bool(members.iter().map(|r| r.ever_partnered)),
                mean_cohab_partners_if_partnered: mean_num(
                    partnered.iter().map(|r| r.num_cohab_partners),
                ),
                mean_marriages_if_partnered: mean_num(partnered.iter().map(|r| r.num_marriages)),
                p_remarried_2plus_if_partnered: mean_bool(
                    partnered.iter().map(|r| r.remarried_2plus),
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_num_excludes_nulls() {
        assert_eq!(
            mean_num([Some(1.0), None, Some(3.0)].into_iter()),
            Some(2.0)
        );
        assert_eq!(mean_num([None, None].into_iter()), None);
        assert_eq!(mean_num(std::iter::empty()), None);
    }

    #[test]
    fn mean_bool_treats_true_as_one() {
        assert_eq!(
            mean_bool([Some(true), Some(false), None, Some(true)].into_iter()),
            Some(2.0 / 3.0)
        );
    }
}

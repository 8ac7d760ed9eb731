//! Small-sample suppression of cohort groups.

use std::collections::BTreeMap;

use tracing::debug;

use wavetab_model::{AggregateRow, Sex};

/// Drops every cohort (within its wave, when waves are grouped) that does
/// not have both sexes present with `N >= threshold`. The whole cohort is
/// removed, not just the deficient sex, so gap computation never compares
/// an included sex against an excluded one.
pub fn suppress(rows: &[AggregateRow], threshold: usize) -> Vec<AggregateRow> {
    let mut counts: BTreeMap<(Option<String>, String), (Option<usize>, Option<usize>)> =
        BTreeMap::new();
    for row in rows {
        let entry = counts
            .entry((row.wave.clone(), row.cohort.clone()))
            .or_default();
        match row.sex {
            Sex::Female => entry.0 = Some(row.n),
            Sex::Male => entry.1 = Some(row.n),
        }
    }

    let retained: Vec<AggregateRow> = rows
        .iter()
        .filter(|row| {
            let (female, male) = counts[&(row.wave.clone(), row.cohort.clone())];
            matches!((female, male), (Some(f), Some(m)) if f >= threshold && m >= threshold)
        })
        .cloned()
        .collect();

    debug!(
        input_rows = rows.len(),
        retained_rows = retained.len(),
        threshold,
        "suppression applied"
    );
    retained
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(wave: Option<&str>, cohort: &str, sex: Sex, n: usize) -> AggregateRow {
        AggregateRow {
            wave: wave.map(String::from),
            cohort: cohort.to_string(),
            sex,
            n,
            p_ever_partnered: Some(0.5),
            mean_cohab_partners_if_partnered: None,
            mean_marriages_if_partnered: None,
            p_remarried_2plus_if_partnered: None,
        }
    }

    #[test]
    fn cohort_with_both_sexes_above_threshold_is_kept() {
        let rows = vec![
            row(None, "1960–69", Sex::Female, 220),
            row(None, "1960–69", Sex::Male, 250),
        ];
        assert_eq!(suppress(&rows, 200).len(), 2);
    }

    #[test]
    fn one_deficient_sex_drops_the_whole_cohort() {
        let rows = vec![
            row(None, "1970–79", Sex::Female, 300),
            row(None, "1970–79", Sex::Male, 180),
        ];
        assert!(suppress(&rows, 200).is_empty());
    }

    #[test]
    fn missing_sex_drops_the_cohort() {
        let rows = vec![row(None, "≥1980", Sex::Female, 500)];
        assert!(suppress(&rows, 200).is_empty());
    }

    #[test]
    fn suppression_is_per_wave() {
        let rows = vec![
            row(Some("wave1"), "1960–69", Sex::Female, 220),
            row(Some("wave1"), "1960–69", Sex::Male, 250),
            row(Some("wave2"), "1960–69", Sex::Female, 150),
            row(Some("wave2"), "1960–69", Sex::Male, 250),
        ];
        let retained = suppress(&rows, 200);
        assert_eq!(retained.len(), 2);
        assert!(retained.iter().all(|r| r.wave.as_deref() == Some("wave1")));
    }
}

//! Female-minus-male partnership-prevalence gap with Wald intervals.

use std::collections::BTreeMap;

use wavetab_model::{AggregateRow, GapRow, Sex};

const Z_95: f64 = 1.96;

/// Computes one [`GapRow`] per retained cohort from suppression output.
///
/// Uses the independent-proportions Wald standard error
/// `sqrt(p_F(1-p_F)/N_F + p_M(1-p_M)/N_M)`, not a pooled-proportion
/// formula. Suppression guarantees both sexes are present with N > 0, but
/// a prevalence can still be null when every individual value was unknown;
/// that yields a null gap row, never a panic. Cohorts emit in the input
/// (already sorted) order.
pub fn gaps(present: &[AggregateRow]) -> Vec<GapRow> {
    let mut order: Vec<(Option<String>, String)> = Vec::new();
    let mut by_sex: BTreeMap<(Option<String>, String), (Option<&AggregateRow>, Option<&AggregateRow>)> =
        BTreeMap::new();
    for row in present {
        let key = (row.wave.clone(), row.cohort.clone());
        if !by_sex.contains_key(&key) {
            order.push(key.clone());
        }
        let entry = by_sex.entry(key).or_default();
        match row.sex {
            Sex::Female => entry.0 = Some(row),
            Sex::Male => entry.1 = Some(row),
        }
    }

    order
        .into_iter()
        .map(|key| {
            let (female, male) = by_sex[&key];
            let (wave, cohort) = key;
            let stats = female.zip(male).and_then(|(f, m)| {
                let p_f = f.p_ever_partnered?;
                let p_m = m.p_ever_partnered?;
                let gap = p_f - p_m;
                let se = (p_f * (1.0 - p_f) / f.n as f64 + p_m * (1.0 - p_m) / m.n as f64).sqrt();
                Some((gap, se))
            });
            match stats {
                Some((gap, se)) => GapRow {
                    wave,
                    cohort,
                    gap: Some(gap),
                    se: Some(se),
                    lo: Some(gap - Z_95 * se),
                    hi: Some(gap + Z_95 * se),
                },
                None => GapRow {
                    wave,
                    cohort,
                    gap: None,
                    se: None,
                    lo: None,
                    hi: None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cohort: &str, sex: Sex, n: usize, p: Option<f64>) -> AggregateRow {
        AggregateRow {
            wave: None,
            cohort: cohort.to_string(),
            sex,
            n,
            p_ever_partnered: p,
            mean_cohab_partners_if_partnered: None,
            mean_marriages_if_partnered: None,
            p_remarried_2plus_if_partnered: None,
        }
    }

    #[test]
    fn wald_interval_matches_closed_form() {
        let present = vec![
            row("1960–69", Sex::Female, 220, Some(0.70)),
            row("1960–69", Sex::Male, 250, Some(0.60)),
        ];
        let gap_rows = gaps(&present);
        assert_eq!(gap_rows.len(), 1);
        let gap_row = &gap_rows[0];
        let gap = gap_row.gap.expect("gap");
        let se = gap_row.se.expect("se");
        assert!((gap - 0.10).abs() < 1e-12);
        let expected_se = (0.6 * 0.4 / 250.0 + 0.7 * 0.3 / 220.0_f64).sqrt();
        assert!((se - expected_se).abs() < 1e-12);
        assert!((gap_row.lo.expect("lo") - (gap - Z_95 * expected_se)).abs() < 1e-12);
        assert!((gap_row.hi.expect("hi") - (gap + Z_95 * expected_se)).abs() < 1e-12);
        // hi - gap == gap - lo == 1.96 * se
        assert!((gap_row.hi.unwrap() - gap - (gap - gap_row.lo.unwrap())).abs() < 1e-12);
        assert!((gap_row.hi.unwrap() - gap - Z_95 * se).abs() < 1e-12);
    }

    #[test]
    fn unknown_prevalence_yields_null_row() {
        let present = vec![
            row("≥1980", Sex::Female, 220, None),
            row("≥1980", Sex::Male, 250, Some(0.5)),
        ];
        let gap_rows = gaps(&present);
        assert_eq!(gap_rows.len(), 1);
        assert_eq!(gap_rows[0].gap, None);
        assert_eq!(gap_rows[0].se, None);
        assert_eq!(gap_rows[0].lo, None);
        assert_eq!(gap_rows[0].hi, None);
    }
}

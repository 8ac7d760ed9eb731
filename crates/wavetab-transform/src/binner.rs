//! Birth-year to cohort-label binning, plus chronological label ordering.

use wavetab_model::CohortScheme;

/// Returns the label of the unique right-closed bin containing `birth_year`.
/// Null or non-finite years yield `None`; finite years always bin because
/// the first and last labels are open-ended.
pub fn bin(birth_year: Option<f64>, scheme: &CohortScheme) -> Option<&str> {
    let year = birth_year?;
    if !year.is_finite() {
        return None;
    }
    for (idx, cut) in scheme.cuts.iter().enumerate() {
        if year <= *cut {
            return scheme.labels.get(idx).map(String::as_str);
        }
    }
    scheme.labels.last().map(String::as_str)
}

/// Chronological sort key for cohort labels: a leading `≤` sorts before all
/// interior labels, `≥` after them, and interior labels order by their
/// digits with non-digit characters stripped.
pub fn cohort_sort_key(label: &str) -> (u8, u64) {
    let rank = if label.starts_with('≤') {
        0
    } else if label.starts_with('≥') {
        2
    } else {
        1
    };
    let digits: String = label.chars().filter(char::is_ascii_digit).collect();
    (rank, digits.parse().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavetab_model::CohortScheme;

    fn primary() -> CohortScheme {
        CohortScheme::new(
            "primary",
            vec![1951.5, 1956.5, 1960.5, 1964.5, 1968.5, 1972.5],
            [
                "≤1951", "1952–56", "1957–60", "1961–64", "1965–68", "1969–72", "≥1973",
            ]
            .iter()
            .map(|label| (*label).to_string())
            .collect(),
        )
        .expect("valid scheme")
    }

    #[test]
    fn interior_years_bin_right_closed() {
        let scheme = primary();
        assert_eq!(bin(Some(1952.0), &scheme), Some("1952–56"));
        assert_eq!(bin(Some(1956.0), &scheme), Some("1952–56"));
        assert_eq!(bin(Some(1957.0), &scheme), Some("1957–60"));
        assert_eq!(bin(Some(1972.0), &scheme), Some("1969–72"));
    }

    #[test]
    fn extreme_years_hit_open_ended_bins() {
        let scheme = primary();
        assert_eq!(bin(Some(1900.0), &scheme), Some("≤1951"));
        assert_eq!(bin(Some(1951.0), &scheme), Some("≤1951"));
        assert_eq!(bin(Some(1973.0), &scheme), Some("≥1973"));
        assert_eq!(bin(Some(2050.0), &scheme), Some("≥1973"));
    }

    #[test]
    fn null_and_non_finite_years_stay_null() {
        let scheme = primary();
        assert_eq!(bin(None, &scheme), None);
        assert_eq!(bin(Some(f64::NAN), &scheme), None);
        assert_eq!(bin(Some(f64::INFINITY), &scheme), None);
    }

    #[test]
    fn labels_sort_chronologically_not_lexically() {
        let mut labels = vec!["≥1980", "1950–59", "≤1949", "1970–79", "1960–69"];
        labels.sort_by_key(|label| cohort_sort_key(label));
        assert_eq!(
            labels,
            vec!["≤1949", "1950–59", "1960–69", "1970–79", "≥1980"]
        );
    }
}

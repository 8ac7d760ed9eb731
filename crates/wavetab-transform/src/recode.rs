//! Value recoding: the sole point where instrument-specific missing-value
//! conventions are applied. Downstream logic never sees sentinel codes.

/// Lenient string-to-number parse. Empty cells and the "." placeholder are
/// missing; anything that fails to parse is missing. Never errors.
pub fn to_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Nulls any value equal to a documented missing-sentinel for its field.
pub fn recode_missing(value: Option<f64>, missing_codes: &[f64]) -> Option<f64> {
    let v = value?;
    if missing_codes.iter().any(|code| *code == v) {
        None
    } else {
        Some(v)
    }
}

/// Parse then apply sentinels in one step.
pub fn recode_cell(raw: &str, missing_codes: &[f64]) -> Option<f64> {
    recode_missing(to_number(raw), missing_codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavetab_model::default_missing_codes;

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(to_number("3"), Some(3.0));
        assert_eq!(to_number(" 2.5 "), Some(2.5));
        assert_eq!(to_number("-1"), Some(-1.0));
    }

    #[test]
    fn empty_dot_and_garbage_are_missing() {
        assert_eq!(to_number(""), None);
        assert_eq!(to_number("   "), None);
        assert_eq!(to_number("."), None);
        assert_eq!(to_number("N/A"), None);
    }

    #[test]
    fn sentinels_become_null() {
        let codes = default_missing_codes();
        assert_eq!(recode_cell("99", &codes), None);
        assert_eq!(recode_cell("9998", &codes), None);
        assert_eq!(recode_cell("3", &codes), Some(3.0));
        // Values not in the sentinel set pass through unchanged.
        assert_eq!(recode_cell("96", &codes), Some(96.0));
    }

    #[test]
    fn sentinel_sets_are_per_field_configuration() {
        // A field where 99 is a real value uses a narrower set.
        assert_eq!(recode_cell("99", &[999.0]), Some(99.0));
    }
}

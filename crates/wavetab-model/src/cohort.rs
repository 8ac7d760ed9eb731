//! Birth-cohort binning schemes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WavetabError};

/// An ordered, non-overlapping, boundary-exhaustive partition of the
/// birth-year number line.
///
/// `cuts` are ascending finite cut points; `labels` has `cuts.len() + 1`
/// entries. Bins are right-closed (`year <= cut`), and the first and last
/// labels are open-ended (`≤X`, `≥Y`), so every finite birth year maps to
/// exactly one label regardless of range. Midpoint cuts (e.g. 1951.5) keep
/// integer years away from bin boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortScheme {
    pub name: String,
    pub cuts: Vec<f64>,
    pub labels: Vec<String>,
}

impl CohortScheme {
    pub fn new(
        name: impl Into<String>,
        cuts: Vec<f64>,
        labels: Vec<String>,
    ) -> Result<Self> {
        let scheme = Self {
            name: name.into(),
            cuts,
            labels,
        };
        scheme.validate()?;
        Ok(scheme)
    }

    /// The fixed decade-scale macro scheme shared by all waves.
    pub fn default_macro() -> Self {
        Self {
            name: "macro".to_string(),
            cuts: vec![1949.5, 1959.5, 1969.5, 1979.5],
            labels: ["≤1949", "1950–59", "1960–69", "1970–79", "≥1980"]
                .iter()
                .map(|label| (*label).to_string())
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| WavetabError::InvalidScheme {
            name: self.name.clone(),
            reason,
        };
        if self.cuts.is_empty() {
            return Err(invalid("at least one cut point is required".to_string()));
        }
        if self.labels.len() != self.cuts.len() + 1 {
            return Err(invalid(format!(
                "expected {} labels for {} cut points, got {}",
                self.cuts.len() + 1,
                self.cuts.len(),
                self.labels.len()
            )));
        }
        for pair in self.cuts.windows(2) {
            if pair[0] >= pair[1] {
                return Err(invalid(format!(
                    "cut points must be strictly ascending ({} >= {})",
                    pair[0], pair[1]
                )));
            }
        }
        if self.cuts.iter().any(|cut| !cut.is_finite()) {
            return Err(invalid("cut points must be finite".to_string()));
        }
        Ok(())
    }
}

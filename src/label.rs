//! Risk label from port-call IUU assessments.
//!
//! Each port call of a vessel is assessed into one of four mutually exclusive
//! categories (no, low, medium, high IUU risk). The continuous label of a trip
//! weights the counts as
//!
//! ```text
//! risk = (1/3)·low + (2/3)·med + high − no
//! ```
//!
//! and is only defined when at least one assessment exists.

use serde::{Deserialize, Serialize};

/// Port assessment counts for one trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentCounts {
    pub no: f64,
    pub low: f64,
    pub med: f64,
    pub high: f64,
}

impl AssessmentCounts {
    /// Create counts from values.
    pub fn new(no: f64, low: f64, med: f64, high: f64) -> Self {
        Self { no, low, med, high }
    }

    /// Create counts from optional values. Missing or non-finite counts are zero.
    pub fn from_optional(no: Option<f64>, low: Option<f64>, med: Option<f64>, high: Option<f64>) -> Self {
        let clean = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0);
        Self::new(clean(no), clean(low), clean(med), clean(high))
    }

    /// Total number of assessments.
    #[inline]
    pub fn total(&self) -> f64 {
        self.no + self.low + self.med + self.high
    }

    /// Whether the trip carries a port risk assessment.
    #[inline]
    pub fn is_observed(&self) -> bool {
        self.total() > 0.0
    }

    /// Continuous risk label, `None` for trips without assessments.
    pub fn risk_score(&self) -> Option<f64> {
        if !self.is_observed() {
            return None;
        }
        Some(self.low / 3.0 + 2.0 * self.med / 3.0 + self.high - self.no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn weighted_label() {
        let counts = AssessmentCounts::new(2.0, 3.0, 1.0, 0.0);
        assert_abs_diff_eq!(counts.risk_score().unwrap(), -1.0 / 3.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(AssessmentCounts::new(0.0, 0.0, 0.0, 1.0), 1.0)]
    #[case(AssessmentCounts::new(0.0, 0.0, 3.0, 0.0), 2.0)]
    #[case(AssessmentCounts::new(4.0, 0.0, 0.0, 0.0), -4.0)]
    #[case(AssessmentCounts::new(1.0, 1.0, 1.0, 1.0), 1.0)]
    fn label_cases(#[case] counts: AssessmentCounts, #[case] expected: f64) {
        assert_abs_diff_eq!(counts.risk_score().unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn unobserved_has_no_label() {
        assert_eq!(AssessmentCounts::default().risk_score(), None);
        assert!(!AssessmentCounts::default().is_observed());
    }

    #[test]
    fn missing_and_nan_counts_are_zero() {
        let counts = AssessmentCounts::from_optional(None, Some(f64::NAN), Some(3.0), None);
        assert_eq!(counts, AssessmentCounts::new(0.0, 0.0, 3.0, 0.0));
        assert_abs_diff_eq!(counts.risk_score().unwrap(), 2.0, epsilon = 1e-12);
    }
}

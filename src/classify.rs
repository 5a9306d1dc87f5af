//! Discrete risk classes.
//!
//! The continuous score is bucketed by two ordered thresholds:
//! `score < low` is class 0, `score < high` is class 1, anything else class 2.

use serde::{Deserialize, Serialize};

/// Thresholds must be finite and ordered.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("risk thresholds must be finite with low <= high, got [{low}, {high}]")]
pub struct InvalidThresholds {
    pub low: f64,
    pub high: f64,
}

/// Ordinal risk class, written to tables as `0`, `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskClass {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl From<RiskClass> for u8 {
    fn from(class: RiskClass) -> Self {
        class as u8
    }
}

impl TryFrom<u8> for RiskClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Low),
            1 => Ok(Self::Medium),
            2 => Ok(Self::High),
            other => Err(format!("invalid risk class {other}")),
        }
    }
}

/// The two class boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    low: f64,
    high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { low: 0.0, high: 2.0 }
    }
}

impl RiskThresholds {
    /// Create thresholds, validating their order.
    pub fn new(low: f64, high: f64) -> Result<Self, InvalidThresholds> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(InvalidThresholds { low, high });
        }
        Ok(Self { low, high })
    }

    /// Lower boundary (start of class 1).
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper boundary (start of class 2).
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Class of a score.
    #[inline]
    pub fn classify(&self, score: f64) -> RiskClass {
        if score < self.low {
            RiskClass::Low
        } else if score < self.high {
            RiskClass::Medium
        } else {
            RiskClass::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1.0 / 3.0, RiskClass::Low)]
    #[case(0.0, RiskClass::Medium)]
    #[case(1.5, RiskClass::Medium)]
    #[case(2.0, RiskClass::High)]
    #[case(2.5, RiskClass::High)]
    fn default_thresholds(#[case] score: f64, #[case] expected: RiskClass) {
        assert_eq!(RiskThresholds::default().classify(score), expected);
    }

    #[test]
    fn rejects_unordered_thresholds() {
        assert!(RiskThresholds::new(2.0, 0.0).is_err());
        assert!(RiskThresholds::new(f64::NAN, 0.0).is_err());
        assert!(RiskThresholds::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn serializes_as_integer() {
        assert_eq!(serde_json::to_string(&RiskClass::High).unwrap(), "2");
        let parsed: RiskClass = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, RiskClass::Medium);
        assert!(serde_json::from_str::<RiskClass>("7").is_err());
    }
}

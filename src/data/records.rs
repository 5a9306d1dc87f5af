//! Row types for the input tables.
//!
//! Categorical columns are `Option<String>`: empty CSV fields read as `None`
//! and such rows are filtered out as incomplete before encoding. Assessment
//! counts are optional and a missing count reads as zero.

use serde::{Deserialize, Serialize};

use crate::label::AssessmentCounts;

/// Treat empty or whitespace-only strings as missing.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// FishingTrip
// =============================================================================

/// One fishing trip with its categorical predictors and port assessments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishingTrip {
    pub trip_id: String,
    #[serde(default)]
    pub ssvid: Option<String>,
    #[serde(default)]
    pub trip_start: Option<String>,
    #[serde(default)]
    pub trip_end: Option<String>,
    #[serde(default)]
    pub flag_group: Option<String>,
    #[serde(default)]
    pub vessel_class: Option<String>,
    #[serde(default)]
    pub time_at_sea: Option<String>,
    #[serde(default)]
    pub lon_mean: Option<f64>,
    #[serde(default)]
    pub lat_mean: Option<f64>,
    #[serde(default)]
    pub iuu_no_to: Option<f64>,
    #[serde(default)]
    pub iuu_low_to: Option<f64>,
    #[serde(default)]
    pub iuu_med_to: Option<f64>,
    #[serde(default)]
    pub iuu_high_to: Option<f64>,
}

impl FishingTrip {
    /// Flag group, vessel class and time at sea, if all are present.
    pub fn predictors(&self) -> Option<(&str, &str, &str)> {
        Some((
            present(&self.flag_group)?,
            present(&self.vessel_class)?,
            present(&self.time_at_sea)?,
        ))
    }

    /// Port assessment counts (missing counts are zero).
    pub fn assessments(&self) -> AssessmentCounts {
        AssessmentCounts::from_optional(
            self.iuu_no_to,
            self.iuu_low_to,
            self.iuu_med_to,
            self.iuu_high_to,
        )
    }

    /// Trip centroid, if both coordinates are present.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        Some((self.lon_mean?, self.lat_mean?))
    }
}

// =============================================================================
// EncounterRecord
// =============================================================================

/// One encounter between a carrier vessel and a fishing vessel.
///
/// A carrier trip has one record per encounter; trip-level fields (carrier
/// flag, time at sea, assessment counts) are taken from its first record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRecord {
    pub trip_id: String,
    #[serde(default)]
    pub ssvid: Option<String>,
    #[serde(default)]
    pub carrier_flag_group: Option<String>,
    #[serde(default)]
    pub neighbor_flag_group: Option<String>,
    #[serde(default)]
    pub neighbor_vessel_class: Option<String>,
    #[serde(default)]
    pub time_at_sea: Option<String>,
    #[serde(default)]
    pub lon_mean: Option<f64>,
    #[serde(default)]
    pub lat_mean: Option<f64>,
    #[serde(default)]
    pub to_iuu_no: Option<f64>,
    #[serde(default)]
    pub to_iuu_low: Option<f64>,
    #[serde(default)]
    pub to_iuu_med: Option<f64>,
    #[serde(default)]
    pub to_iuu_high: Option<f64>,
}

/// Predictors of one encounter record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterPredictors<'a> {
    pub carrier_flag: &'a str,
    pub neighbor_flag: &'a str,
    pub neighbor_class: &'a str,
    pub time_at_sea: &'a str,
}

impl EncounterRecord {
    /// Categorical predictors, if all four are present.
    pub fn predictors(&self) -> Option<EncounterPredictors<'_>> {
        Some(EncounterPredictors {
            carrier_flag: present(&self.carrier_flag_group)?,
            neighbor_flag: present(&self.neighbor_flag_group)?,
            neighbor_class: present(&self.neighbor_vessel_class)?,
            time_at_sea: present(&self.time_at_sea)?,
        })
    }

    /// Port assessment counts (missing counts are zero).
    pub fn assessments(&self) -> AssessmentCounts {
        AssessmentCounts::from_optional(
            self.to_iuu_no,
            self.to_iuu_low,
            self.to_iuu_med,
            self.to_iuu_high,
        )
    }

    /// Encounter position, if both coordinates are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.lon_mean?, self.lat_mean?))
    }
}

// =============================================================================
// LoiteringEvent
// =============================================================================

/// One loitering event of a carrier vessel during a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoiteringEvent {
    pub trip_id: String,
    #[serde(default)]
    pub ssvid: Option<String>,
    #[serde(default)]
    pub lon_mean: Option<f64>,
    #[serde(default)]
    pub lat_mean: Option<f64>,
}

impl LoiteringEvent {
    /// Event position, if both coordinates are present.
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.lon_mean?, self.lat_mean?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip() -> FishingTrip {
        FishingTrip {
            trip_id: "t1".into(),
            ssvid: Some("123".into()),
            trip_start: None,
            trip_end: None,
            flag_group: Some("china".into()),
            vessel_class: Some("trawlers".into()),
            time_at_sea: Some("1-3 months".into()),
            lon_mean: Some(10.0),
            lat_mean: None,
            iuu_no_to: Some(1.0),
            iuu_low_to: None,
            iuu_med_to: None,
            iuu_high_to: Some(2.0),
        }
    }

    #[test]
    fn predictors_require_all_columns() {
        let mut t = trip();
        assert_eq!(t.predictors(), Some(("china", "trawlers", "1-3 months")));
        t.vessel_class = Some("   ".into());
        assert_eq!(t.predictors(), None);
    }

    #[test]
    fn centroid_requires_both_coordinates() {
        let mut t = trip();
        assert_eq!(t.centroid(), None);
        t.lat_mean = Some(-3.5);
        assert_eq!(t.centroid(), Some((10.0, -3.5)));
    }

    #[test]
    fn missing_counts_read_as_zero() {
        let counts = trip().assessments();
        assert_eq!(counts.total(), 3.0);
        assert_eq!(counts.low, 0.0);
    }
}

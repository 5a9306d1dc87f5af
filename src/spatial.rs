//! Spatial binning of scored positions.
//!
//! Positions are snapped to a regular grid by rounding to the nearest cell
//! (ties to even) and aggregated per cell. Each cell carries its geodesic area
//! so that densities can be compared across latitudes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::classify::RiskClass;

/// WGS84 equatorial radius in metres.
pub const WGS84_RADIUS_M: f64 = 6_378_137.0;

// =============================================================================
// Geometry
// =============================================================================

/// Round a coordinate to the nearest whole degree, ties to even.
#[inline]
pub fn bin_coordinate(value: f64) -> f64 {
    value.round_ties_even()
}

/// Signed area in m² of a closed `(lon, lat)` ring given in degrees.
///
/// Spherical-excess approximation on a sphere of radius [`WGS84_RADIUS_M`]:
/// for each vertex, the longitude span of its neighbours times the sine of its
/// latitude. The ring must repeat its first vertex at the end.
pub fn ring_area_m2(ring: &[(f64, f64)]) -> f64 {
    let n = ring.len();
    if n <= 2 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let (lower, middle, upper) = if i == n - 2 {
            (n - 2, n - 1, 0)
        } else if i == n - 1 {
            (n - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };
        let p1 = ring[lower];
        let p2 = ring[middle];
        let p3 = ring[upper];
        area += (p3.0.to_radians() - p1.0.to_radians()) * p2.1.to_radians().sin();
    }
    area * WGS84_RADIUS_M * WGS84_RADIUS_M / 2.0
}

/// Area in km² of the grid cell `[lon, lon + size] × [lat, lat + size]`.
pub fn cell_area_km2(lon: f64, lat: f64, size: f64) -> f64 {
    let ring = [
        (lon, lat),
        (lon, lat + size),
        (lon + size, lat + size),
        (lon + size, lat),
        (lon, lat),
    ];
    ring_area_m2(&ring).abs() * 1e-6
}

// =============================================================================
// Aggregation
// =============================================================================

/// A scored position with its risk class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassPoint {
    pub lon: f64,
    pub lat: f64,
    pub class: RiskClass,
}

/// A position with an observed and a predicted score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePoint {
    pub lon: f64,
    pub lat: f64,
    pub observed: f64,
    pub predicted: f64,
}

/// Number of points of one risk class in one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassCountRow {
    pub lon_bin: f64,
    pub lat_bin: f64,
    pub risk_class: RiskClass,
    pub count: usize,
    pub km2: f64,
}

/// Observed and predicted score sums in one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSumRow {
    pub lon_bin: f64,
    pub lat_bin: f64,
    pub count: usize,
    pub risk_score: f64,
    pub risk_score_pred: f64,
    pub km2: f64,
}

/// Cell sizes must be finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("cell size must be a finite positive number of degrees, got {0}")]
pub struct InvalidCellSize(pub f64);

/// Grid binner with a fixed cell size in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialBinner {
    cell_size: f64,
}

impl Default for SpatialBinner {
    fn default() -> Self {
        Self { cell_size: 1.0 }
    }
}

impl SpatialBinner {
    /// Binner with the given cell size in degrees.
    pub fn new(cell_size: f64) -> Result<Self, InvalidCellSize> {
        if cell_size.is_finite() && cell_size > 0.0 {
            Ok(Self { cell_size })
        } else {
            Err(InvalidCellSize(cell_size))
        }
    }

    /// Cell size in degrees.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Grid index of a coordinate.
    #[inline]
    fn index(&self, value: f64) -> i64 {
        bin_coordinate(value / self.cell_size) as i64
    }

    #[inline]
    fn coordinate(&self, index: i64) -> f64 {
        index as f64 * self.cell_size
    }

    /// Count points per `(cell, class)`, sorted by longitude, latitude, class.
    ///
    /// Points with non-finite coordinates are skipped.
    pub fn class_counts(&self, points: &[ClassPoint]) -> Vec<ClassCountRow> {
        let mut cells: BTreeMap<(i64, i64, RiskClass), usize> = BTreeMap::new();
        for p in points.iter().filter(|p| p.lon.is_finite() && p.lat.is_finite()) {
            *cells.entry((self.index(p.lon), self.index(p.lat), p.class)).or_default() += 1;
        }

        cells
            .into_iter()
            .map(|((lon, lat, class), count)| {
                let (lon_bin, lat_bin) = (self.coordinate(lon), self.coordinate(lat));
                ClassCountRow {
                    lon_bin,
                    lat_bin,
                    risk_class: class,
                    count,
                    km2: cell_area_km2(lon_bin, lat_bin, self.cell_size),
                }
            })
            .collect()
    }

    /// Sum observed and predicted scores per cell, sorted by longitude, latitude.
    ///
    /// Points with non-finite coordinates are skipped.
    pub fn score_sums(&self, points: &[ScorePoint]) -> Vec<ScoreSumRow> {
        let mut cells: BTreeMap<(i64, i64), (usize, f64, f64)> = BTreeMap::new();
        for p in points.iter().filter(|p| p.lon.is_finite() && p.lat.is_finite()) {
            let entry = cells.entry((self.index(p.lon), self.index(p.lat))).or_default();
            entry.0 += 1;
            entry.1 += p.observed;
            entry.2 += p.predicted;
        }

        cells
            .into_iter()
            .map(|((lon, lat), (count, observed, predicted))| {
                let (lon_bin, lat_bin) = (self.coordinate(lon), self.coordinate(lat));
                ScoreSumRow {
                    lon_bin,
                    lat_bin,
                    count,
                    risk_score: observed,
                    risk_score_pred: predicted,
                    km2: cell_area_km2(lon_bin, lat_bin, self.cell_size),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn rounds_ties_to_even() {
        assert_eq!(bin_coordinate(0.5), 0.0);
        assert_eq!(bin_coordinate(1.5), 2.0);
        assert_eq!(bin_coordinate(-2.5), -2.0);
        assert_eq!(bin_coordinate(-2.6), -3.0);
    }

    #[test]
    fn equatorial_cell_area() {
        let area = cell_area_km2(0.0, 0.0, 1.0);
        assert_relative_eq!(area, 12_321.0, max_relative = 0.01);
    }

    #[test]
    fn cell_area_shrinks_with_latitude() {
        let equator = cell_area_km2(0.0, 0.0, 1.0);
        let north = cell_area_km2(0.0, 60.0, 1.0);
        let south = cell_area_km2(0.0, -61.0, 1.0);
        assert!(north < equator * 0.51);
        assert_relative_eq!(north, south, max_relative = 1e-9);
    }

    #[test]
    fn ring_area_matches_closed_form() {
        let ring = [(10.0, 20.0), (10.0, 22.0), (13.0, 22.0), (13.0, 20.0), (10.0, 20.0)];
        let expected = WGS84_RADIUS_M.powi(2)
            * 3f64.to_radians()
            * (22f64.to_radians().sin() - 20f64.to_radians().sin());
        assert_relative_eq!(ring_area_m2(&ring), expected, max_relative = 1e-12);
        assert_eq!(ring_area_m2(&ring[..2]), 0.0);
    }

    #[test]
    fn class_counts_group_by_cell_and_class() {
        let binner = SpatialBinner::default();
        let points = [
            ClassPoint { lon: 10.2, lat: -0.4, class: RiskClass::Low },
            ClassPoint { lon: 9.8, lat: 0.3, class: RiskClass::Low },
            ClassPoint { lon: 10.1, lat: 0.1, class: RiskClass::High },
            ClassPoint { lon: f64::NAN, lat: 0.0, class: RiskClass::High },
            ClassPoint { lon: -120.7, lat: 45.5, class: RiskClass::Medium },
        ];
        let rows = binner.class_counts(&points);
        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].lon_bin, rows[0].lat_bin, rows[0].risk_class), (-121.0, 46.0, RiskClass::Medium));
        assert_eq!((rows[1].lon_bin, rows[1].lat_bin, rows[1].count), (10.0, 0.0, 2));
        assert_eq!((rows[2].risk_class, rows[2].count), (RiskClass::High, 1));
        assert_relative_eq!(rows[1].km2, cell_area_km2(10.0, 0.0, 1.0));
    }

    #[test]
    fn score_sums_accumulate() {
        let binner = SpatialBinner::default();
        let points = [
            ScorePoint { lon: 1.1, lat: 1.2, observed: 1.0, predicted: 0.5 },
            ScorePoint { lon: 0.9, lat: 0.8, observed: -2.0, predicted: -1.0 },
        ];
        let rows = binner.score_sums(&points);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 2);
        assert_abs_diff_eq!(rows[0].risk_score, -1.0);
        assert_abs_diff_eq!(rows[0].risk_score_pred, -0.5);
    }

    #[test]
    fn custom_cell_size() {
        let binner = SpatialBinner::new(5.0).unwrap();
        let rows = binner.class_counts(&[ClassPoint { lon: 12.0, lat: -8.0, class: RiskClass::Low }]);
        assert_eq!((rows[0].lon_bin, rows[0].lat_bin), (10.0, -10.0));
    }

    #[rstest::rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn invalid_cell_size_is_rejected(#[case] size: f64) {
        assert!(SpatialBinner::new(size).is_err());
    }
}

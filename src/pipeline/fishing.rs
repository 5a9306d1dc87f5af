//! Fishing trip analysis: one row per trip, keyed on flag group, vessel
//! class and time at sea.

use serde::Serialize;

use super::stages::{self, file_names, Outputs, ScoreType};
use super::{PipelineConfig, PipelineError, PipelineReport};
use crate::classify::{RiskClass, RiskThresholds};
use crate::data::FishingTrip;
use crate::features::{CategoricalRow, FeatureGroupSpec};
use crate::label::AssessmentCounts;
use crate::spatial::{ClassPoint, ScorePoint};

/// Observed trip with its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedTripRow {
    pub trip_id: String,
    pub ssvid: Option<String>,
    pub trip_start: Option<String>,
    pub trip_end: Option<String>,
    pub risk_score: f64,
    pub risk_class: RiskClass,
}

/// Observed trip with its label and in-sample prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripFitRow {
    pub trip_id: String,
    pub ssvid: Option<String>,
    pub trip_start: Option<String>,
    pub trip_end: Option<String>,
    pub risk_score: f64,
    pub risk_score_pred: f64,
    /// Class of the prediction.
    pub risk_class: RiskClass,
}

/// Scored trip in the merged table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripScoreRow {
    pub trip_id: String,
    pub ssvid: Option<String>,
    pub trip_start: Option<String>,
    pub trip_end: Option<String>,
    pub lon_mean: Option<f64>,
    pub lat_mean: Option<f64>,
    pub risk_score: f64,
    #[serde(rename = "type")]
    pub score_type: ScoreType,
    pub risk_class: RiskClass,
}

/// Feature groups of a fishing trip, in column order.
pub fn feature_specs() -> Vec<FeatureGroupSpec> {
    vec![
        FeatureGroupSpec::one_hot("flag", Some("flag_group")),
        FeatureGroupSpec::one_hot("gear", Some("vessel_class")),
        FeatureGroupSpec::one_hot("tas", Some("time_at_sea")),
    ]
}

/// Complete trips and their categorical rows.
fn complete_trips(trips: Vec<FishingTrip>) -> (Vec<FishingTrip>, Vec<CategoricalRow>) {
    let mut kept = Vec::with_capacity(trips.len());
    let mut rows = Vec::with_capacity(trips.len());
    for trip in trips {
        let Some((flag, class, tas)) = trip.predictors() else {
            continue;
        };
        rows.push(CategoricalRow::new().level(flag).level(class).level(tas));
        kept.push(trip);
    }
    (kept, rows)
}

/// Fishing trip pipeline.
pub struct FishingPipeline;

impl FishingPipeline {
    /// Run every stage and write all outputs.
    pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
        let thresholds = config.risk_thresholds()?;
        let binner = config.spatial_binner()?;

        let records: Vec<FishingTrip> = stages::read_table(&config.input_path())?;
        let n_records = records.len();
        let (trips, rows) = complete_trips(records);
        if trips.len() < n_records {
            tracing::warn!(dropped = n_records - trips.len(), "incomplete trips excluded");
        }
        let counts: Vec<AssessmentCounts> = trips.iter().map(FishingTrip::assessments).collect();

        let fitted = stages::fit_and_predict(config, feature_specs(), &rows, &counts)?;
        let mut outputs = Outputs::new(config);

        // In-sample fit and observed labels
        let fit_rows: Vec<TripFitRow> = fitted
            .observed
            .iter()
            .zip(fitted.targets.iter().zip(&fitted.fitted))
            .map(|(&t, (&observed, &predicted))| {
                let trip = &trips[t];
                TripFitRow {
                    trip_id: trip.trip_id.clone(),
                    ssvid: trip.ssvid.clone(),
                    trip_start: trip.trip_start.clone(),
                    trip_end: trip.trip_end.clone(),
                    risk_score: observed,
                    risk_score_pred: predicted,
                    risk_class: thresholds.classify(predicted),
                }
            })
            .collect();
        outputs.records(file_names::FIT, &fit_rows)?;

        let observed_rows: Vec<ObservedTripRow> = fitted
            .observed
            .iter()
            .zip(&fitted.targets)
            .map(|(&t, &score)| {
                let trip = &trips[t];
                ObservedTripRow {
                    trip_id: trip.trip_id.clone(),
                    ssvid: trip.ssvid.clone(),
                    trip_start: trip.trip_start.clone(),
                    trip_end: trip.trip_end.clone(),
                    risk_score: score,
                    risk_class: thresholds.classify(score),
                }
            })
            .collect();
        outputs.records(file_names::OBSERVED, &observed_rows)?;

        // Merged scores and their spatial aggregates
        let scores = score_rows(&trips, fitted.scores(), &thresholds);
        outputs.records(file_names::SCORES, &scores)?;

        let class_points: Vec<ClassPoint> = scores
            .iter()
            .filter_map(|row| {
                Some(ClassPoint { lon: row.lon_mean?, lat: row.lat_mean?, class: row.risk_class })
            })
            .collect();
        outputs.records(&file_names::binned_classes(config.cell_size), &binner.class_counts(&class_points))?;

        let score_points: Vec<ScorePoint> = fitted
            .observed
            .iter()
            .zip(fitted.targets.iter().zip(&fitted.fitted))
            .filter_map(|(&t, (&observed, &predicted))| {
                let (lon, lat) = trips[t].centroid()?;
                Some(ScorePoint { lon, lat, observed, predicted })
            })
            .collect();
        outputs.records(&file_names::binned_scores(config.cell_size), &binner.score_sums(&score_points))?;

        // Attribution
        let explained = stages::explain(&fitted)?;
        outputs.model_artefacts(&fitted, &explained)?;

        let report = PipelineReport::new(config.analysis, n_records, trips.len(), &fitted, &explained, outputs.into_paths());
        report.log();
        Ok(report)
    }
}

fn score_rows(
    trips: &[FishingTrip],
    scores: impl Iterator<Item = (usize, f64, ScoreType)>,
    thresholds: &RiskThresholds,
) -> Vec<TripScoreRow> {
    scores
        .map(|(t, score, score_type)| {
            let trip = &trips[t];
            TripScoreRow {
                trip_id: trip.trip_id.clone(),
                ssvid: trip.ssvid.clone(),
                trip_start: trip.trip_start.clone(),
                trip_end: trip.trip_end.clone(),
                lon_mean: trip.lon_mean,
                lat_mean: trip.lat_mean,
                risk_score: score,
                score_type,
                risk_class: thresholds.classify(score),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(id: &str, flag: &str, class: &str, tas: &str) -> FishingTrip {
        FishingTrip {
            trip_id: id.into(),
            ssvid: None,
            trip_start: None,
            trip_end: None,
            flag_group: Some(flag.into()),
            vessel_class: Some(class.into()),
            time_at_sea: Some(tas.into()),
            lon_mean: None,
            lat_mean: None,
            iuu_no_to: None,
            iuu_low_to: None,
            iuu_med_to: None,
            iuu_high_to: None,
        }
    }

    #[test]
    fn incomplete_trips_are_excluded() {
        let trips = vec![trip("a", "g1", "trawlers", "short"), trip("b", "", "trawlers", "short"), trip("c", "g2", "squid", " ")];
        let (kept, rows) = complete_trips(trips);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].trip_id, "a");
        assert_eq!(rows[0], CategoricalRow::new().level("g1").level("trawlers").level("short"));
    }

    #[test]
    fn specs_use_source_column_prefixes() {
        let names: Vec<_> = feature_specs().iter().map(|s| s.column_name("x")).collect();
        assert_eq!(names, ["flag_group_x", "vessel_class_x", "time_at_sea_x"]);
    }
}

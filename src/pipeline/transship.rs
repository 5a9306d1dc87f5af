//! Transshipment analysis: one row per carrier trip.
//!
//! A carrier trip is the set of its complete encounter records. Trip-level
//! predictors (carrier flag, time at sea, assessments) come from the first
//! record; the flags and vessel classes of every encountered fishing vessel
//! are multi-hot; loitering is whether the trip has any loitering event.
//! Scores are mapped back onto encounter and loitering positions.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use super::stages::{self, file_names, FitRow, Outputs, ScoreType};
use super::{PipelineConfig, PipelineError, PipelineReport};
use crate::classify::RiskClass;
use crate::data::{EncounterRecord, LoiteringEvent};
use crate::features::{CategoricalRow, FeatureGroupSpec};
use crate::label::AssessmentCounts;
use crate::spatial::{ClassPoint, ScorePoint};

pub const LOITERING: &str = "loitering";
pub const NO_LOITERING: &str = "no_loitering";

/// Where a scored position comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSource {
    Encounter,
    Loitering,
}

/// A scored encounter or loitering position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPointRow {
    pub trip_id: String,
    pub source: PointSource,
    pub lon_mean: f64,
    pub lat_mean: f64,
    pub risk_score: f64,
    #[serde(rename = "type")]
    pub score_type: ScoreType,
    pub risk_class: RiskClass,
}

/// Feature groups of a carrier trip, in column order.
pub fn feature_specs() -> Vec<FeatureGroupSpec> {
    vec![
        FeatureGroupSpec::one_hot("is_tas", Some("tas")),
        FeatureGroupSpec::one_hot("is_flag", Some("flag")),
        FeatureGroupSpec::multi_hot("with_flag", Some("with_flag")),
        FeatureGroupSpec::multi_hot("with_gear", Some("with_gear")),
        FeatureGroupSpec::one_hot("loitering", None),
    ]
}

/// One carrier trip assembled from its encounters.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierTrip {
    pub trip_id: String,
    pub row: CategoricalRow,
    pub counts: AssessmentCounts,
}

/// Group complete encounter records by trip id (sorted).
pub fn carrier_trips(encounters: &[EncounterRecord], loitering_trips: &HashSet<&str>) -> Vec<CarrierTrip> {
    let mut by_trip: BTreeMap<&str, Vec<&EncounterRecord>> = BTreeMap::new();
    for record in encounters.iter().filter(|r| r.predictors().is_some()) {
        by_trip.entry(record.trip_id.as_str()).or_default().push(record);
    }

    by_trip
        .into_iter()
        .filter_map(|(trip_id, records)| {
            let first = records.first()?.predictors()?;
            let mut with_flags = BTreeSet::new();
            let mut with_gears = BTreeSet::new();
            for p in records.iter().filter_map(|r| r.predictors()) {
                with_flags.insert(p.neighbor_flag);
                with_gears.insert(p.neighbor_class);
            }
            let loitering = if loitering_trips.contains(trip_id) { LOITERING } else { NO_LOITERING };

            Some(CarrierTrip {
                trip_id: trip_id.to_string(),
                row: CategoricalRow::new()
                    .level(first.time_at_sea)
                    .level(first.carrier_flag)
                    .levels(with_flags)
                    .levels(with_gears)
                    .level(loitering),
                counts: records.first()?.assessments(),
            })
        })
        .collect()
}

/// Transshipment pipeline.
pub struct TransshipPipeline;

impl TransshipPipeline {
    /// Run every stage and write all outputs.
    pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
        let thresholds = config.risk_thresholds()?;
        let binner = config.spatial_binner()?;
        let loitering_path = config
            .loitering_path()
            .ok_or(PipelineError::MissingLoitering { analysis: config.analysis })?;

        let encounters: Vec<EncounterRecord> = stages::read_table(&config.input_path())?;
        let loitering: Vec<LoiteringEvent> = stages::read_table(&loitering_path)?;
        let loitering_trips: HashSet<&str> = loitering.iter().map(|e| e.trip_id.as_str()).collect();

        let trips = carrier_trips(&encounters, &loitering_trips);
        tracing::info!(encounters = encounters.len(), trips = trips.len(), "grouped encounters into carrier trips");
        let rows: Vec<CategoricalRow> = trips.iter().map(|t| t.row.clone()).collect();
        let counts: Vec<AssessmentCounts> = trips.iter().map(|t| t.counts).collect();

        let fitted = stages::fit_and_predict(config, feature_specs(), &rows, &counts)?;
        let mut outputs = Outputs::new(config);

        let fit_rows: Vec<FitRow> = fitted
            .observed
            .iter()
            .zip(fitted.targets.iter().zip(&fitted.fitted))
            .map(|(&t, (&observed, &predicted))| FitRow {
                trip_id: trips[t].trip_id.clone(),
                risk_score: observed,
                risk_score_pred: predicted,
                risk_class: thresholds.classify(predicted),
            })
            .collect();
        outputs.records(file_names::FIT, &fit_rows)?;

        // Scores mapped onto every encounter and loitering position of a scored trip
        let scores: HashMap<&str, (f64, ScoreType)> = fitted
            .scores()
            .map(|(t, score, score_type)| (trips[t].trip_id.as_str(), (score, score_type)))
            .collect();
        let positions = positions(&encounters, &loitering);

        let points: Vec<ScoredPointRow> = positions
            .iter()
            .filter_map(|&(trip_id, source, (lon, lat))| {
                let &(score, score_type) = scores.get(trip_id)?;
                Some(ScoredPointRow {
                    trip_id: trip_id.to_string(),
                    source,
                    lon_mean: lon,
                    lat_mean: lat,
                    risk_score: score,
                    score_type,
                    risk_class: thresholds.classify(score),
                })
            })
            .collect();
        outputs.records(file_names::SCORES, &points)?;

        let class_points: Vec<ClassPoint> = points
            .iter()
            .map(|p| ClassPoint { lon: p.lon_mean, lat: p.lat_mean, class: p.risk_class })
            .collect();
        outputs.records(&file_names::binned_classes(config.cell_size), &binner.class_counts(&class_points))?;

        let fits: HashMap<&str, (f64, f64)> = fit_rows
            .iter()
            .map(|r| (r.trip_id.as_str(), (r.risk_score, r.risk_score_pred)))
            .collect();
        let score_points: Vec<ScorePoint> = positions
            .iter()
            .filter_map(|&(trip_id, _, (lon, lat))| {
                let &(observed, predicted) = fits.get(trip_id)?;
                Some(ScorePoint { lon, lat, observed, predicted })
            })
            .collect();
        outputs.records(&file_names::binned_scores(config.cell_size), &binner.score_sums(&score_points))?;

        let explained = stages::explain(&fitted)?;
        outputs.model_artefacts(&fitted, &explained)?;

        let report =
            PipelineReport::new(config.analysis, encounters.len(), trips.len(), &fitted, &explained, outputs.into_paths());
        report.log();
        Ok(report)
    }
}

/// Positioned encounters followed by positioned loitering events.
fn positions<'a>(
    encounters: &'a [EncounterRecord],
    loitering: &'a [LoiteringEvent],
) -> Vec<(&'a str, PointSource, (f64, f64))> {
    let encounter_points = encounters
        .iter()
        .filter_map(|r| Some((r.trip_id.as_str(), PointSource::Encounter, r.position()?)));
    let loitering_points = loitering
        .iter()
        .filter_map(|e| Some((e.trip_id.as_str(), PointSource::Loitering, e.position()?)));
    encounter_points.chain(loitering_points).collect()
}

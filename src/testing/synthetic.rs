use std::path::{Path, PathBuf};

use rand::prelude::*;

use crate::data::{io, EncounterRecord, FishingTrip, IoError, LoiteringEvent};

pub const FLAGS: [&str; 5] = ["china", "group1", "group2", "group3", "other"];
pub const GEARS: [&str; 4] = ["drifting_longline", "purse_seine", "squid_jigger", "trawlers"];
pub const TIMES_AT_SEA: [&str; 3] = ["long", "medium", "short"];

/// Latent risk of a level combination.
fn latent_risk(flag: usize, gear: usize, tas: usize) -> f64 {
    let flag_risk = [1.5, 0.5, 0.0, -0.5, 0.0][flag];
    let gear_risk = [0.5, -0.5, 1.0, 0.0][gear];
    let tas_risk = [0.5, 0.0, -0.5][tas];
    // Long squid-jigger trips are disproportionately risky
    let interaction = if gear == 2 && tas == 0 { 1.0 } else { 0.0 };
    flag_risk + gear_risk + tas_risk + interaction
}

/// Integer assessment counts `(no, low, med, high)` centred on a latent risk.
fn assessments(rng: &mut StdRng, risk: f64) -> [f64; 4] {
    let n = rng.gen_range(1..=4);
    let mut counts = [0.0; 4];
    for _ in 0..n {
        let noisy = risk + rng.gen_range(-0.75..0.75);
        let class = if noisy < -0.25 {
            0
        } else if noisy < 0.5 {
            1
        } else if noisy < 1.25 {
            2
        } else {
            3
        };
        counts[class] += 1.0;
    }
    counts
}

fn coordinate(rng: &mut StdRng, centre: f64, spread: f64) -> f64 {
    centre + rng.gen_range(-spread..spread)
}

/// `n` fishing trips; roughly `observed_fraction` carry assessments and one
/// in twenty lacks a predictor.
pub fn fishing_trips(n: usize, observed_fraction: f64, seed: u64) -> Vec<FishingTrip> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let (flag, gear, tas) = (
                rng.gen_range(0..FLAGS.len()),
                rng.gen_range(0..GEARS.len()),
                rng.gen_range(0..TIMES_AT_SEA.len()),
            );
            let observed = rng.gen_bool(observed_fraction.clamp(0.0, 1.0));
            let counts = observed.then(|| assessments(&mut rng, latent_risk(flag, gear, tas)));
            let incomplete = i % 20 == 19;

            FishingTrip {
                trip_id: format!("trip-{i:05}"),
                ssvid: Some(format!("{}", 100_000_000 + i)),
                trip_start: Some("2020-01-01".to_string()),
                trip_end: Some("2020-01-15".to_string()),
                flag_group: (!incomplete).then(|| FLAGS[flag].to_string()),
                vessel_class: Some(GEARS[gear].to_string()),
                time_at_sea: Some(TIMES_AT_SEA[tas].to_string()),
                lon_mean: Some(coordinate(&mut rng, 150.0, 8.0)),
                lat_mean: Some(coordinate(&mut rng, -10.0, 5.0)),
                iuu_no_to: counts.map(|c| c[0]),
                iuu_low_to: counts.map(|c| c[1]),
                iuu_med_to: counts.map(|c| c[2]),
                iuu_high_to: counts.map(|c| c[3]),
            }
        })
        .collect()
}

/// Encounter records of `n_trips` carrier trips (one to three encounters
/// each) and loitering events for about half of them.
pub fn transship_trips(n_trips: usize, observed_fraction: f64, seed: u64) -> (Vec<EncounterRecord>, Vec<LoiteringEvent>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut encounters = Vec::new();
    let mut loitering = Vec::new();

    for i in 0..n_trips {
        let trip_id = format!("carrier-{i:05}");
        let ssvid = Some(format!("{}", 400_000_000 + i));
        let carrier = rng.gen_range(0..FLAGS.len());
        let tas = rng.gen_range(0..TIMES_AT_SEA.len());
        let n_encounters = rng.gen_range(1..=3);
        let neighbours: Vec<(usize, usize)> = (0..n_encounters)
            .map(|_| (rng.gen_range(0..FLAGS.len()), rng.gen_range(0..GEARS.len())))
            .collect();
        let loiters = rng.gen_bool(0.5);

        let risk = neighbours.iter().map(|&(f, g)| latent_risk(f, g, tas)).fold(f64::MIN, f64::max)
            + if loiters { 0.5 } else { 0.0 };
        let counts = rng.gen_bool(observed_fraction.clamp(0.0, 1.0)).then(|| assessments(&mut rng, risk));

        let (lon, lat) = (coordinate(&mut rng, 160.0, 10.0), coordinate(&mut rng, 0.0, 10.0));
        for (flag, gear) in neighbours {
            encounters.push(EncounterRecord {
                trip_id: trip_id.clone(),
                ssvid: ssvid.clone(),
                carrier_flag_group: Some(FLAGS[carrier].to_string()),
                neighbor_flag_group: Some(FLAGS[flag].to_string()),
                neighbor_vessel_class: Some(GEARS[gear].to_string()),
                time_at_sea: Some(TIMES_AT_SEA[tas].to_string()),
                lon_mean: Some(coordinate(&mut rng, lon, 1.0)),
                lat_mean: Some(coordinate(&mut rng, lat, 1.0)),
                to_iuu_no: counts.map(|c| c[0]),
                to_iuu_low: counts.map(|c| c[1]),
                to_iuu_med: counts.map(|c| c[2]),
                to_iuu_high: counts.map(|c| c[3]),
            });
        }
        if loiters {
            loitering.push(LoiteringEvent {
                trip_id,
                ssvid,
                lon_mean: Some(coordinate(&mut rng, lon, 1.0)),
                lat_mean: Some(coordinate(&mut rng, lat, 1.0)),
            });
        }
    }
    (encounters, loitering)
}

/// Write `fishing_trips.csv` into `dir`.
pub fn write_fishing_dataset(dir: &Path, n: usize, seed: u64) -> Result<PathBuf, IoError> {
    let path = dir.join("fishing_trips.csv");
    io::write_records(&path, &fishing_trips(n, 0.6, seed))?;
    Ok(path)
}

/// Write `transship_trips.csv` and `transship_trips_loitering.csv` into `dir`.
pub fn write_transship_dataset(dir: &Path, n_trips: usize, seed: u64) -> Result<(PathBuf, PathBuf), IoError> {
    let (encounters, loitering) = transship_trips(n_trips, 0.6, seed);
    let encounter_path = dir.join("transship_trips.csv");
    let loitering_path = dir.join("transship_trips_loitering.csv");
    io::write_records(&encounter_path, &encounters)?;
    io::write_records(&loitering_path, &loitering)?;
    Ok((encounter_path, loitering_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(fishing_trips(50, 0.5, 7), fishing_trips(50, 0.5, 7));
        assert_eq!(transship_trips(20, 0.5, 7), transship_trips(20, 0.5, 7));
    }

    #[test]
    fn fishing_trips_mix_observed_and_incomplete() {
        let trips = fishing_trips(200, 0.6, 1);
        let observed = trips.iter().filter(|t| t.assessments().is_observed()).count();
        let incomplete = trips.iter().filter(|t| t.predictors().is_none()).count();
        assert!(observed > 60 && observed < 180, "observed = {observed}");
        assert_eq!(incomplete, 10);
    }

    #[test]
    fn every_transship_trip_has_an_encounter() {
        let (encounters, loitering) = transship_trips(30, 0.6, 3);
        assert!(encounters.len() >= 30);
        assert!(loitering.iter().all(|e| encounters.iter().any(|r| r.trip_id == e.trip_id)));
    }
}

//! Synthetic datasets for tests, documentation and smoke runs.
//!
//! Generated tables follow the input schemas exactly, so they can be written
//! to CSV and fed through a full pipeline run. Risk is a deterministic
//! function of flag, gear and time at sea plus seeded noise, which gives the
//! model something to learn.

mod synthetic;

pub use synthetic::{
    fishing_trips, transship_trips, write_fishing_dataset, write_transship_dataset, FLAGS, GEARS, TIMES_AT_SEA,
};

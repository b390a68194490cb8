//! # cycledata_core
//!
//! Renser en rå telemetristrøm fra en sykkeltur og avleder fysiske størrelser
//! (luftmotstand, kinetisk/potensiell energi, stigning, effekt) uten wattmåler.
//! Fra effektserien estimeres FTP, PPO og VO2max.
//!
//! ```no_run
//! use cycledata_core::{CyclistProfile, Pipeline, RawRecord};
//!
//! let records: Vec<RawRecord> = (0..600i64)
//!     .map(|t| RawRecord::new().with("timestamp", 1_700_000_000 + t).with("distance", t as f64 * 8.0))
//!     .collect();
//! let profile = CyclistProfile::new(75.0, 1.75).unwrap();
//! let activity = Pipeline::new(profile).run(&records).unwrap();
//! println!("PPO: {:?}", activity.performance().ppo);
//! ```

pub mod error;
pub use error::{CycleDataError, ElevationError, Result};

pub mod models;
pub use models::{
    current_cyclist, cyclist_with_overrides, set_cyclist, CyclistProfile, FieldValue,
    HeartRateStatus, RawRecord, Sample, TrackPoint,
};

pub mod units;
pub use units::{parse_timestamp, semicircles_to_degrees, SEMICIRCLES_PER_DEGREE};

pub mod normalize;
pub use normalize::{normalize_records, records_from_json, NormalizedActivity, DEFAULT_HEART_RATE};

pub mod pause;
pub use pause::{is_moving, moving_steps, PauseReport, Step};

pub mod physics;
pub use physics::{air_density, compute_drag, frontal_area, instantaneous_power, RoundTo};

pub mod smoothing;

pub mod metrics;
pub use metrics::{
    estimate_ftp, estimate_ppo, min_periods, vo2max_from_ppo, PerformanceEstimates,
};

pub mod counters;
pub use counters::PipelineCounters;

pub mod elevation;
pub use elevation::{
    corrected_altitudes, CachedElevationProvider, ElevationProvider, StaticElevationProvider,
    ELEVATION_BATCH_SIZE,
};

pub mod elevation_api;
pub use elevation_api::IgnElevationClient;

pub mod pipeline;
pub use pipeline::{ActivityTimeSeries, Pipeline, PipelineOptions, PipelineWarning};

pub mod analyzer;
pub use analyzer::{ActivitySummary, EfficiencyPoint, EfficiencyReport};

pub mod storage;
pub use storage::{load_profile, save_profile};

pub mod cli;
pub use cli::{format_activity_report, print_activity_report};

#[cfg(feature = "python")]
mod py;

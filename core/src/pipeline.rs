// core/src/pipeline.rs
//! Batch-pipeline for én aktivitet:
//! normalisering → (høydekorrigering) → pausefilter → fysikk.
//!
//! Rytterprofilen kopieres inn ved oppstart, så samtidige kjøringer ser aldri
//! en profil som endres underveis. Resultatet er enten en komplett
//! [`ActivityTimeSeries`] eller en feil – aldri en halvferdig serie.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::counters::PipelineCounters;
use crate::elevation::{corrected_altitudes, ElevationProvider, ELEVATION_BATCH_SIZE};
use crate::error::{CycleDataError, Result};
use crate::metrics::{self, PerformanceEstimates};
use crate::models::{current_cyclist, CyclistProfile, HeartRateStatus, RawRecord, Sample};
use crate::normalize::{normalize_records, DEFAULT_HEART_RATE};
use crate::pause::{moving_steps, PauseReport};
use crate::physics::derive_samples;
use crate::units::seconds_between;

/// Forringet, men ikke-fatal, tilstand observert under byggingen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineWarning {
    /// Høydekorrigering feilet; registrert høyde er beholdt.
    AltitudeCorrectionFailed { reason: String },
    /// Records uten tid eller distanse ble hoppet over.
    RecordsSkipped { count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub correct_altitude: bool,
    pub elevation_batch_size: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            correct_altitude: false,
            elevation_batch_size: ELEVATION_BATCH_SIZE,
        }
    }
}

pub struct Pipeline<'a> {
    profile: CyclistProfile,
    options: PipelineOptions,
    elevation: Option<&'a dyn ElevationProvider>,
    counters: Option<&'a PipelineCounters>,
}

impl<'a> Pipeline<'a> {
    pub fn new(profile: CyclistProfile) -> Self {
        Self {
            profile,
            options: PipelineOptions::default(),
            elevation: None,
            counters: None,
        }
    }

    /// Pipeline med øyeblikksbilde av den globale profilen (se `set_cyclist`).
    pub fn from_current_cyclist() -> Self {
        Self::new(current_cyclist())
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Slår på høydekorrigering mot gitt tjeneste.
    pub fn with_elevation(mut self, provider: &'a dyn ElevationProvider) -> Self {
        self.elevation = Some(provider);
        self.options.correct_altitude = true;
        self
    }

    pub fn with_counters(mut self, counters: &'a PipelineCounters) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn profile(&self) -> &CyclistProfile {
        &self.profile
    }

    pub fn run(&self, records: &[RawRecord]) -> Result<ActivityTimeSeries> {
        self.profile.validate()?;
        let mut warnings = Vec::new();

        let normalized = normalize_records(records)?;
        if let Some(c) = self.counters {
            c.records_ingested.inc_by(records.len() as u64);
            c.records_skipped.inc_by(normalized.skipped_records as u64);
        }
        if normalized.skipped_records > 0 {
            warnings.push(PipelineWarning::RecordsSkipped {
                count: normalized.skipped_records,
            });
        }

        let mut points = normalized.points;
        let start = points
            .first()
            .map(|p| p.time)
            .ok_or_else(|| CycleDataError::Format("recording has no usable records".into()))?;

        if self.options.correct_altitude {
            match self.elevation {
                Some(provider) => match corrected_altitudes(
                    &points,
                    provider,
                    self.options.elevation_batch_size,
                    self.counters,
                ) {
                    Ok(altitudes) => {
                        for (p, z) in points.iter_mut().zip(altitudes) {
                            p.altitude = z;
                        }
                        info!("altitude replaced with elevation service data");
                    }
                    Err(e) => {
                        warn!("error while retrieving altitude data, keeping recorded altitude: {e}");
                        if let Some(c) = self.counters {
                            c.elevation_failures.inc();
                        }
                        warnings.push(PipelineWarning::AltitudeCorrectionFailed {
                            reason: e.to_string(),
                        });
                    }
                },
                None => {
                    warn!("altitude correction requested without an elevation provider");
                    warnings.push(PipelineWarning::AltitudeCorrectionFailed {
                        reason: "no elevation provider configured".into(),
                    });
                }
            }
        }

        let (steps, pauses) = moving_steps(&points);
        if let Some(c) = self.counters {
            c.samples_paused.inc_by(pauses.dropped as u64);
        }
        let samples = derive_samples(&points, &steps, &self.profile)?;

        info!(
            "activity built: {} samples kept of {} records, {:.0}s paused",
            samples.len(),
            records.len(),
            pauses.paused_seconds
        );

        Ok(ActivityTimeSeries {
            samples,
            heart_rate: normalized.heart_rate,
            profile: self.profile,
            start,
            pauses,
            warnings,
        })
    }
}

/// Renset tidsserie for én aktivitet. Uforanderlig etter bygging.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityTimeSeries {
    samples: Vec<Sample>,
    heart_rate: HeartRateStatus,
    profile: CyclistProfile,
    start: DateTime<Utc>,
    #[serde(skip)]
    pauses: PauseReport,
    warnings: Vec<PipelineWarning>,
}

impl ActivityTimeSeries {
    /// Bygger serien med øyeblikksbilde av den globale profilen.
    pub fn from_records(records: &[RawRecord]) -> Result<Self> {
        Pipeline::from_current_cyclist().run(records)
    }

    /// Uavhengig kopi av samplene.
    pub fn get_data(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn profile(&self) -> &CyclistProfile {
        &self.profile
    }

    pub fn heart_rate_status(&self) -> HeartRateStatus {
        self.heart_rate
    }

    /// Falsk når sensoren manglet, eller serien er ~konstant 180 bpm / bare nuller.
    pub fn has_heart_rate(&self) -> bool {
        if self.heart_rate == HeartRateStatus::Absent || self.samples.is_empty() {
            return false;
        }
        let hr: Vec<f64> = self.samples.iter().map(|s| s.heart_rate).collect();
        let max = hr.iter().copied().fold(f64::MIN, f64::max);
        if max < 1.0 {
            return false;
        }
        let near_default = hr.iter().all(|h| (h - DEFAULT_HEART_RATE).abs() < 1.0);
        !near_default
    }

    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }

    pub fn pause_report(&self) -> PauseReport {
        self.pauses
    }

    /// Tidsstempel for første rå-record.
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start
    }

    /// Kjøretid (s) uten pauser.
    pub fn activity_seconds(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.activity_time)
    }

    /// Veggklokketid (s) fra første rå-record til siste beholdte sample.
    pub fn wall_clock_seconds(&self) -> f64 {
        self.samples
            .last()
            .map_or(0.0, |s| seconds_between(self.start, s.time))
    }

    /// Minste antall samples for et vindu på `window_secs` (tetthetsbasert).
    pub fn min_periods(&self, window_secs: f64) -> usize {
        let deltas: Vec<f64> = self.samples.iter().map(|s| s.time_delta).collect();
        metrics::min_periods(&deltas, window_secs)
    }

    pub fn estimate_ftp(&self) -> Result<f64> {
        metrics::estimate_ftp(&self.samples)
    }

    pub fn estimate_ppo(&self) -> Result<f64> {
        metrics::estimate_ppo(&self.samples)
    }

    /// VO2max-estimat (mL/kg/min) – regresjon på PPO, ikke en måling.
    pub fn estimate_vo2max(&self) -> Result<f64> {
        let ppo = self.estimate_ppo()?;
        Ok(metrics::vo2max_from_ppo(ppo, self.profile.mass))
    }

    pub fn performance(&self) -> PerformanceEstimates {
        metrics::estimate_performance(&self.samples, self.profile.mass)
    }
}

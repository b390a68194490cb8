// core/src/analyzer.rs
use serde::{Deserialize, Serialize};

use crate::error::{CycleDataError, Result};
use crate::metrics::rolling_time_mean;
use crate::pipeline::ActivityTimeSeries;
use crate::smoothing::distance_window_mean;

/// Vindu for effekt/puls-korrelasjon.
pub const EFFICIENCY_WINDOW_S: f64 = 120.0;
/// Terskel (standardavvik over snitt) for "intens innsats".
const HIGH_EFFORT_Z: f64 = 0.5;

/// Sammendrag av en hel tur.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub duration_secs: f64,
    pub distance_m: f64,
    pub avg_speed_ms: f64,
    pub max_speed_ms: f64,
    /// Sum av positive høydeendringer (m).
    pub elevation_gain_m: f64,
    /// None når pulssensor mangler.
    pub avg_heart_rate: Option<f64>,
    /// Total mekanisk energi (kJ).
    pub total_energy_kj: f64,
    pub ppo: Option<f64>,
    pub ftp: Option<f64>,
    pub ftp_per_kg: Option<f64>,
    pub vo2max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyPoint {
    pub activity_time: f64,
    pub watts: f64,      // 2-min snitt
    pub heart_rate: f64, // 2-min snitt
    pub watts_per_bpm: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyReport {
    pub points: Vec<EfficiencyPoint>,
    /// Snitt W/bpm der både effekt og puls ligger > 0.5 σ over snittet.
    pub high_effort_watts_per_bpm: Option<f64>,
}

fn standardize(xs: &[f64]) -> Vec<f64> {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let std = if xs.len() < 2 {
        0.0
    } else {
        (xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    };
    xs.iter()
        .map(|x| if std > 0.0 { (x - mean) / std } else { 0.0 })
        .collect()
}

impl ActivityTimeSeries {
    pub fn summary(&self) -> ActivitySummary {
        let samples = self.samples();
        if samples.is_empty() {
            return ActivitySummary::default();
        }

        let duration_secs: f64 = samples.iter().map(|s| s.time_delta).sum();
        let distance_m = samples.iter().map(|s| s.position).fold(f64::MIN, f64::max);
        let max_speed_ms = samples.iter().map(|s| s.speed).fold(0.0, f64::max);
        let elevation_gain_m = samples
            .iter()
            .map(|s| s.altitude_delta)
            .filter(|d| *d > 0.0)
            .sum();
        let total_energy_kj = samples.iter().map(|s| s.watts * s.time_delta).sum::<f64>() / 1000.0;
        let avg_heart_rate = self
            .has_heart_rate()
            .then(|| samples.iter().map(|s| s.heart_rate).sum::<f64>() / samples.len() as f64);

        let perf = self.performance();
        let mass = self.profile().mass;

        ActivitySummary {
            duration_secs,
            distance_m,
            avg_speed_ms: if duration_secs > 0.0 { distance_m / duration_secs } else { 0.0 },
            max_speed_ms,
            elevation_gain_m,
            avg_heart_rate,
            total_energy_kj,
            ppo: perf.ppo,
            ftp: perf.ftp,
            ftp_per_kg: perf.ftp.map(|f| f / mass),
            vo2max: perf.vo2max,
        }
    }

    /// Effekt/puls over 2-minutters vinduer (kun vinduer med nok samples).
    pub fn efficiency(&self) -> Result<EfficiencyReport> {
        if !self.has_heart_rate() {
            return Err(CycleDataError::HeartRateUnavailable);
        }
        let samples = self.samples();
        let times: Vec<i64> = samples.iter().map(|s| s.time.timestamp_millis()).collect();
        let watts: Vec<f64> = samples.iter().map(|s| s.watts).collect();
        let hr: Vec<f64> = samples.iter().map(|s| s.heart_rate).collect();
        let periods = self.min_periods(EFFICIENCY_WINDOW_S);

        let w_mean = rolling_time_mean(&times, &watts, EFFICIENCY_WINDOW_S, periods);
        let hr_mean = rolling_time_mean(&times, &hr, EFFICIENCY_WINDOW_S, periods);

        let points: Vec<EfficiencyPoint> = samples
            .iter()
            .zip(w_mean.into_iter().zip(hr_mean))
            .filter_map(|(s, (w, h))| match (w, h) {
                (Some(w), Some(h)) if h > 0.0 => Some(EfficiencyPoint {
                    activity_time: s.activity_time,
                    watts: w,
                    heart_rate: h,
                    watts_per_bpm: w / h,
                }),
                _ => None,
            })
            .collect();

        if points.is_empty() {
            return Err(CycleDataError::InsufficientData {
                metric: "efficiency",
                window_secs: EFFICIENCY_WINDOW_S,
                min_periods: periods,
            });
        }

        let z_w = standardize(&points.iter().map(|p| p.watts).collect::<Vec<_>>());
        let z_hr = standardize(&points.iter().map(|p| p.heart_rate).collect::<Vec<_>>());
        let high: Vec<f64> = points
            .iter()
            .zip(z_w.iter().zip(&z_hr))
            .filter(|(_, (zw, zh))| **zw > HIGH_EFFORT_Z && **zh > HIGH_EFFORT_Z)
            .map(|(p, _)| p.watts_per_bpm)
            .collect();
        let high_effort_watts_per_bpm =
            (!high.is_empty()).then(|| high.iter().sum::<f64>() / high.len() as f64);

        Ok(EfficiencyReport {
            points,
            high_effort_watts_per_bpm,
        })
    }

    /// Stigning (forhold) snittet over ±window_m/2 rundt hvert sample.
    /// `uphill_only` klipper negative stigninger til 0 før snitting.
    pub fn averaged_slope(&self, window_m: f64, uphill_only: bool) -> Vec<f64> {
        let positions: Vec<f64> = self.samples().iter().map(|s| s.position).collect();
        let slopes: Vec<f64> = self
            .samples()
            .iter()
            .map(|s| if uphill_only { s.slope.max(0.0) } else { s.slope })
            .collect();
        distance_window_mean(&positions, &slopes, window_m)
    }

    /// Bratteste snittstigning over `window_m` (forhold).
    pub fn max_averaged_slope(&self, window_m: f64) -> Option<f64> {
        self.averaged_slope(window_m, true)
            .into_iter()
            .filter(|s| s.is_finite())
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
    }

    /// Rullende snitteffekt over `window_secs`, min. én måling per vindu.
    pub fn smoothed_power(&self, window_secs: f64) -> Vec<f64> {
        let samples = self.samples();
        let times: Vec<i64> = samples.iter().map(|s| s.time.timestamp_millis()).collect();
        let watts: Vec<f64> = samples.iter().map(|s| s.watts).collect();
        rolling_time_mean(&times, &watts, window_secs, 1)
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect()
    }
}

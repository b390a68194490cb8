// core/src/metrics.rs
//! Rullende ytelsesestimat: FTP, PPO og VO2max.
//!
//! Alle vinduer er tidsbaserte og bakoverskuende. Et vindu gir verdi kun når
//! det inneholder nok målinger – antallet avhenger av hvor tett opptaket er
//! samplet (se [`min_periods`]).

use serde::{Deserialize, Serialize};

use crate::error::{CycleDataError, Result};
use crate::models::Sample;

pub const FTP_WINDOW_S: f64 = 20.0 * 60.0;
pub const PPO_WINDOW_S: f64 = 150.0;
/// FTP ≈ 95 % av beste 20-minutters snitteffekt.
pub const FTP_FACTOR: f64 = 0.95;

/// Skalare ytelsesestimat. `None` = for lite data (aldri 0 som erstatning).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEstimates {
    pub ftp: Option<f64>,    // W
    pub ppo: Option<f64>,    // W
    /// Regresjonsestimat fra PPO (mL/kg/min), ikke en fysiologisk måling.
    pub vo2max: Option<f64>,
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Øvre statistisk grense for måleintervallet: snitt + 2·standardavvik.
pub fn sampling_interval_bound(time_deltas: &[f64]) -> Option<f64> {
    if time_deltas.is_empty() {
        return None;
    }
    let m = mean(time_deltas);
    let std = if time_deltas.len() < 2 {
        0.0
    } else {
        let var = time_deltas.iter().map(|x| (x - m).powi(2)).sum::<f64>()
            / (time_deltas.len() - 1) as f64;
        var.sqrt()
    };
    let bound = m + 2.0 * std;
    (bound.is_finite() && bound > 0.0).then_some(bound)
}

/// Minste antall målinger et vindu på `window_secs` må ha for å telle.
pub fn min_periods(time_deltas: &[f64], window_secs: f64) -> usize {
    match sampling_interval_bound(time_deltas) {
        Some(tau) => (window_secs / tau).floor() as usize,
        None => 0,
    }
}

/// Tidsbasert rullende snitt. Vinduet for punkt i er (t_i - window, t_i].
/// `times_ms` må være strengt stigende.
pub fn rolling_time_mean(
    times_ms: &[i64],
    values: &[f64],
    window_secs: f64,
    min_periods: usize,
) -> Vec<Option<f64>> {
    let n = times_ms.len().min(values.len());
    let window_ms = (window_secs * 1000.0).round() as i64;
    let required = min_periods.max(1);
    let mut out = Vec::with_capacity(n);

    let mut lo = 0usize;
    let mut sum = 0.0;
    for i in 0..n {
        sum += values[i];
        while lo <= i && times_ms[lo] <= times_ms[i] - window_ms {
            sum -= values[lo];
            lo += 1;
        }
        let count = i + 1 - lo;
        out.push((count >= required).then(|| sum / count as f64));
    }
    out
}

fn time_deltas(samples: &[Sample]) -> Vec<f64> {
    samples.iter().map(|s| s.time_delta).collect()
}

/// Rullende snitt av effekt over serien med tetthetsbasert min_periods.
pub fn rolling_power(samples: &[Sample], window_secs: f64) -> Vec<Option<f64>> {
    let times: Vec<i64> = samples.iter().map(|s| s.time.timestamp_millis()).collect();
    let watts: Vec<f64> = samples.iter().map(|s| s.watts).collect();
    let periods = min_periods(&time_deltas(samples), window_secs);
    rolling_time_mean(&times, &watts, window_secs, periods)
}

/// Høyeste rullende snitteffekt over `window_secs`.
pub fn best_mean_power(samples: &[Sample], window_secs: f64, metric: &'static str) -> Result<f64> {
    rolling_power(samples, window_secs)
        .into_iter()
        .flatten()
        .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
        .ok_or_else(|| CycleDataError::InsufficientData {
            metric,
            window_secs,
            min_periods: min_periods(&time_deltas(samples), window_secs),
        })
}

/// FTP = 0.95 × beste 20-minutters snitteffekt.
pub fn estimate_ftp(samples: &[Sample]) -> Result<f64> {
    Ok(best_mean_power(samples, FTP_WINDOW_S, "ftp")? * FTP_FACTOR)
}

/// Peak Power Output = beste 150-sekunders snitteffekt.
pub fn estimate_ppo(samples: &[Sample]) -> Result<f64> {
    best_mean_power(samples, PPO_WINDOW_S, "ppo")
}

/// VO2max-estimat (mL/kg/min) fra lineær regresjon på PPO.
#[inline]
pub fn vo2max_from_ppo(ppo: f64, rider_mass_kg: f64) -> f64 {
    (0.01141 * ppo + 0.435) * 1000.0 / rider_mass_kg
}

pub fn estimate_performance(samples: &[Sample], rider_mass_kg: f64) -> PerformanceEstimates {
    let ftp = estimate_ftp(samples).ok();
    let ppo = estimate_ppo(samples).ok();
    PerformanceEstimates {
        ftp,
        ppo,
        vo2max: ppo.map(|p| vo2max_from_ppo(p, rider_mass_kg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sampling_bound_is_the_interval() {
        let deltas = vec![1.0; 100];
        assert_eq!(sampling_interval_bound(&deltas), Some(1.0));
        assert_eq!(min_periods(&deltas, 150.0), 150);
    }

    #[test]
    fn irregular_sampling_lowers_min_periods() {
        let mut deltas = vec![1.0; 90];
        deltas.extend(vec![5.0; 10]);
        assert!(min_periods(&deltas, 150.0) < 150);
    }

    #[test]
    fn rolling_mean_respects_min_periods() {
        let times: Vec<i64> = (0..6).map(|i| i * 1000).collect();
        let vals = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = rolling_time_mean(&times, &vals, 3.0, 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        assert_eq!(out[5], Some(5.0));
    }

    #[test]
    fn vo2max_regression() {
        // 300 W, 75 kg → (3.423 + 0.435) * 1000 / 75
        assert!((vo2max_from_ppo(300.0, 75.0) - 51.44).abs() < 1e-9);
    }
}

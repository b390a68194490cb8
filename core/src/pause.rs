// core/src/pause.rs
use log::debug;

use crate::models::TrackPoint;
use crate::units::seconds_between;

/// Bevegelse under dette (m) regnes som GPS-støy, ikke fremdrift.
pub const MIN_MOVEMENT_M: f64 = 0.1;
/// Kortere måleintervall enn dette (s) regnes som kontinuerlig opptak.
pub const MAX_CONTINUOUS_GAP_S: f64 = 10.0;
/// Over lengre intervaller må snittfarten være over dette (m/s ≈ 3.6 km/t).
pub const MIN_MOVING_SPEED_MS: f64 = 1.0;

/// Ett par av påfølgende normaliserte punkter som overlevde pausefilteret.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub prev: usize,
    pub index: usize,
    pub time_delta: f64,
    pub position_delta: f64,
    /// Kumulativ kjøretid inkludert dette steget.
    pub activity_time: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PauseReport {
    /// Punkter fjernet som pause/støy (første punkt ikke medregnet).
    pub dropped: usize,
    /// Veggklokke-sekunder som ble fjernet.
    pub paused_seconds: f64,
}

/// Sann når steget representerer en rytter i bevegelse.
#[inline]
pub fn is_moving(time_delta: f64, position_delta: f64) -> bool {
    time_delta > 0.0
        && position_delta > MIN_MOVEMENT_M
        && (time_delta < MAX_CONTINUOUS_GAP_S || position_delta > time_delta * MIN_MOVING_SPEED_MS)
}

/// Deltas beregnes mot forrige *rå* punkt, også når det punktet selv faller bort.
/// Første punkt forkastes alltid (ingen delta). Punkter som ikke ligger etter
/// sist beholdte tidsstempel forkastes.
pub fn moving_steps(points: &[TrackPoint]) -> (Vec<Step>, PauseReport) {
    let mut steps = Vec::with_capacity(points.len().saturating_sub(1));
    let mut report = PauseReport::default();
    let mut activity_time = 0.0;
    // tid må øke strengt også etter et hopp bakover i opptaket
    let mut last_kept = points.first().map(|p| p.time);

    for (index, pair) in points.windows(2).enumerate() {
        let time_delta = seconds_between(pair[0].time, pair[1].time);
        let position_delta = pair[1].position - pair[0].position;
        let after_last_kept = last_kept.map_or(true, |t| pair[1].time > t);

        if !after_last_kept || !is_moving(time_delta, position_delta) {
            report.dropped += 1;
            report.paused_seconds += time_delta.max(0.0);
            continue;
        }

        last_kept = Some(pair[1].time);
        activity_time += time_delta;
        steps.push(Step {
            prev: index,
            index: index + 1,
            time_delta,
            position_delta,
            activity_time,
        });
    }

    debug!(
        "pause filter kept {} of {} steps ({:.0}s paused)",
        steps.len(),
        points.len().saturating_sub(1),
        report.paused_seconds
    );
    (steps, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds() {
        assert!(is_moving(1.0, 5.0));
        assert!(!is_moving(1.0, 0.1)); // under støygrensen
        assert!(!is_moving(30.0, 20.0)); // langt hull, < 1 m/s
        assert!(is_moving(30.0, 45.0)); // langt hull, > 1 m/s
        assert!(!is_moving(0.0, 5.0)); // duplisert tidsstempel
    }

    #[test]
    fn backwards_jump_never_reorders_kept_points() {
        use chrono::{TimeZone, Utc};
        let points: Vec<TrackPoint> = [0i64, 5, 3, 4, 6]
            .iter()
            .enumerate()
            .map(|(i, t)| TrackPoint {
                time: Utc.timestamp_opt(*t, 0).unwrap(),
                position: 8.0 * i as f64,
                altitude: 0.0,
                speed: 8.0,
                heart_rate: 120.0,
                lat: None,
                lon: None,
            })
            .collect();
        let (steps, report) = moving_steps(&points);
        let kept: Vec<usize> = steps.iter().map(|s| s.index).collect();
        assert_eq!(kept, vec![1, 4]);
        assert_eq!(report.dropped, 2);
    }
}

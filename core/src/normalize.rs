// core/src/normalize.rs
//! Record-normalisering: rå feltstrøm → kanoniske `TrackPoint`s.
//!
//! Feltnavn-varianter løses her (enhanced_* foretrekkes), posisjon konverteres
//! fra semicircles til grader og tidsstempler tolkes.

use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::error::{CycleDataError, Result};
use crate::models::{FieldValue, HeartRateStatus, RawRecord, TrackPoint};
use crate::units::{parse_timestamp, seconds_between, semicircles_to_degrees, to_f64};

/// Pulsverdi brukt når opptaket mangler pulssensor. Betyr "ingen sensor", ikke en måling.
pub const DEFAULT_HEART_RATE: f64 = 180.0;

const TIME_FIELD: &str = "timestamp";
const POSITION_FIELD: &str = "distance";
const ALTITUDE_FIELDS: [&str; 2] = ["enhanced_altitude", "altitude"];
const SPEED_FIELDS: [&str; 2] = ["enhanced_speed", "speed"];
const HEART_RATE_FIELD: &str = "heart_rate";
const LAT_FIELD: &str = "position_lat";
const LON_FIELD: &str = "position_long";

/// Resultat av normaliseringen for ett opptak.
#[derive(Debug, Clone)]
pub struct NormalizedActivity {
    pub points: Vec<TrackPoint>,
    pub heart_rate: HeartRateStatus,
    /// Records uten tid/distanse som ble hoppet over.
    pub skipped_records: usize,
}

/// Første felt i prioritert rekkefølge som finnes i recorden.
fn first_present<'a>(rec: &'a RawRecord, names: &[&'static str]) -> Option<(&'static str, &'a FieldValue)> {
    names
        .iter()
        .find_map(|name| rec.get(name).map(|v| (*name, v)))
}

fn optional_degrees(rec: &RawRecord, name: &str) -> Result<Option<f64>> {
    rec.get(name)
        .map(|v| to_f64(name, v).map(semicircles_to_degrees))
        .transpose()
}

pub fn normalize_records(records: &[RawRecord]) -> Result<NormalizedActivity> {
    let has_time = records.iter().any(|r| r.contains(TIME_FIELD));
    let has_position = records.iter().any(|r| r.contains(POSITION_FIELD));
    if !has_time || !has_position {
        let missing: Vec<&str> = [(TIME_FIELD, has_time), (POSITION_FIELD, has_position)]
            .iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();
        return Err(CycleDataError::Format(format!(
            "mandatory field(s) absent from recording: {}",
            missing.join(", ")
        )));
    }

    let heart_rate = if records.iter().any(|r| r.contains(HEART_RATE_FIELD)) {
        HeartRateStatus::Measured
    } else {
        debug!("no heart_rate field in recording, filling {DEFAULT_HEART_RATE} bpm");
        HeartRateStatus::Absent
    };

    let mut points: Vec<TrackPoint> = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    let mut last_altitude = 0.0;
    let mut last_heart_rate = DEFAULT_HEART_RATE;

    for (idx, rec) in records.iter().enumerate() {
        let (Some(time_v), Some(pos_v)) = (rec.get(TIME_FIELD), rec.get(POSITION_FIELD)) else {
            skipped += 1;
            continue;
        };
        let time = parse_timestamp(time_v)
            .map_err(|e| CycleDataError::Format(format!("record {idx}: {e}")))?;
        let position = to_f64(POSITION_FIELD, pos_v)
            .map_err(|e| CycleDataError::Format(format!("record {idx}: {e}")))?;

        if let Some((name, v)) = first_present(rec, &ALTITUDE_FIELDS) {
            last_altitude = to_f64(name, v)?;
        }
        let altitude = last_altitude;

        let speed = match first_present(rec, &SPEED_FIELDS) {
            Some((name, v)) => to_f64(name, v)?,
            None => match points.last() {
                Some(prev) => {
                    let dt = seconds_between(prev.time, time);
                    if dt > 0.0 {
                        ((position - prev.position) / dt).max(0.0)
                    } else {
                        prev.speed
                    }
                }
                None => 0.0,
            },
        };

        if let Some(v) = rec.get(HEART_RATE_FIELD) {
            last_heart_rate = to_f64(HEART_RATE_FIELD, v)?;
        }

        points.push(TrackPoint {
            time,
            position,
            altitude,
            speed,
            heart_rate: last_heart_rate,
            lat: optional_degrees(rec, LAT_FIELD)?,
            lon: optional_degrees(rec, LON_FIELD)?,
        });
    }

    if skipped > 0 {
        warn!("skipped {skipped} record(s) without timestamp or distance");
    }

    Ok(NormalizedActivity {
        points,
        heart_rate,
        skipped_records: skipped,
    })
}

/// Dekoder rå-records fra JSON (array av objekter) med sti i feilmeldingen.
pub fn records_from_json(json: &str) -> Result<Vec<RawRecord>> {
    decode_json(json)
}

pub(crate) fn decode_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    let mut de = serde_json::Deserializer::from_str(json);
    serde_path_to_error::deserialize(&mut de)
        .map_err(|e| CycleDataError::Format(format!("json parse at {}: {}", e.path(), e.inner())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(t: i64, d: f64) -> RawRecord {
        RawRecord::new().with("timestamp", t).with("distance", d)
    }

    #[test]
    fn enhanced_fields_win() {
        let records = vec![rec(0, 0.0)
            .with("altitude", 100.0)
            .with("enhanced_altitude", 101.5)
            .with("speed", 5.0)
            .with("enhanced_speed", 5.25)];
        let out = normalize_records(&records).unwrap();
        assert_eq!(out.points[0].altitude, 101.5);
        assert_eq!(out.points[0].speed, 5.25);
    }

    #[test]
    fn missing_speed_is_derived_from_distance() {
        let records = vec![rec(0, 0.0), rec(2, 10.0)];
        let out = normalize_records(&records).unwrap();
        assert_eq!(out.points[0].speed, 0.0);
        assert!((out.points[1].speed - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rows_without_position_are_skipped() {
        let records = vec![
            RawRecord::new().with("timestamp", 0i64),
            rec(1, 5.0),
            rec(2, 10.0),
        ];
        let out = normalize_records(&records).unwrap();
        assert_eq!(out.points.len(), 2);
        assert_eq!(out.skipped_records, 1);
    }

    #[test]
    fn json_errors_carry_the_path() {
        let err = records_from_json(r#"[{"timestamp": 1}, {"distance": [1]}]"#).unwrap_err();
        match err {
            CycleDataError::Format(msg) => assert!(msg.contains("[1]"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}

// core/src/units.rs
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{CycleDataError, Result};
use crate::models::FieldValue;

/// Semicircles per grad i opptaksformatet (2^31 / 180, avrundet).
/// Empirisk verdi fra én enhetsfamilie – ikke validert mot andre enheter.
pub const SEMICIRCLES_PER_DEGREE: f64 = 11_930_465.0;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[inline]
pub fn semicircles_to_degrees(raw: f64) -> f64 {
    raw / SEMICIRCLES_PER_DEGREE
}

/// Tolker en numerisk feltverdi. Tekst som ser ut som tall godtas.
pub fn to_f64(field: &str, value: &FieldValue) -> Result<f64> {
    let v = match value {
        FieldValue::Int(i) => *i as f64,
        FieldValue::Float(f) => *f,
        FieldValue::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            CycleDataError::Format(format!("field '{field}': '{s}' is not a number"))
        })?,
        FieldValue::Null => {
            return Err(CycleDataError::Format(format!("field '{field}' is null")));
        }
    };
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CycleDataError::Format(format!("field '{field}' is not finite")))
    }
}

/// Tidsstempel fra Unix-sekunder (heltall/flyttall), RFC 3339 eller naiv tekst (UTC).
pub fn parse_timestamp(value: &FieldValue) -> Result<DateTime<Utc>> {
    let parsed = match value {
        FieldValue::Int(secs) => DateTime::from_timestamp(*secs, 0),
        FieldValue::Float(secs) if secs.is_finite() => {
            DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
        }
        FieldValue::Text(s) => parse_timestamp_text(s.trim()),
        _ => None,
    };
    parsed.ok_or_else(|| {
        CycleDataError::Format(format!("field 'timestamp': cannot parse {value:?} as a timestamp"))
    })
}

fn parse_timestamp_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Sekunder mellom to tidsstempler (millisekund-oppløsning).
#[inline]
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicircles_roundtrip_known_point() {
        // 45° nord
        let raw = 45.0 * SEMICIRCLES_PER_DEGREE;
        assert!((semicircles_to_degrees(raw) - 45.0).abs() < 1e-12);
    }

    #[test]
    fn timestamps_from_all_encodings() {
        let a = parse_timestamp(&FieldValue::Int(1_700_000_000)).unwrap();
        let b = parse_timestamp(&FieldValue::Text("2023-11-14T22:13:20Z".into())).unwrap();
        let c = parse_timestamp(&FieldValue::Text("2023-11-14 22:13:20".into())).unwrap();
        let d = parse_timestamp(&FieldValue::Float(1_700_000_000.5)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!((seconds_between(a, d) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn garbage_is_a_format_error() {
        assert!(matches!(
            parse_timestamp(&FieldValue::Text("yesterday".into())),
            Err(CycleDataError::Format(_))
        ));
        assert!(matches!(
            to_f64("distance", &FieldValue::Text("far".into())),
            Err(CycleDataError::Format(_))
        ));
        assert_eq!(to_f64("distance", &FieldValue::Text(" 12.5 ".into())).unwrap(), 12.5);
    }
}

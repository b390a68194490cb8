use cycledata_core::{format_activity_report, CycleDataError, CyclistProfile, Pipeline, RawRecord};

/// Jevn stigning på 5 %, 1 Hz, med pulsvariasjon som følger farten.
fn climb(n: i64, with_hr: bool) -> Vec<RawRecord> {
    (0..n)
        .map(|t| {
            let speed = 6.0 + 1.5 * (t as f64 / 90.0).sin();
            let pos = 6.0 * t as f64;
            let mut r = RawRecord::new()
                .with("timestamp", 1_700_000_000 + t)
                .with("distance", pos)
                .with("speed", speed)
                .with("altitude", 200.0 + 0.05 * pos);
            if with_hr {
                r = r.with("heart_rate", 130.0 + 10.0 * (t as f64 / 90.0).sin());
            }
            r
        })
        .collect()
}

#[test]
fn test_summary_fields() {
    let activity = Pipeline::new(CyclistProfile::default()).run(&climb(1000, true)).unwrap();
    let s = activity.summary();

    assert!((s.duration_secs - 999.0).abs() < 1e-9);
    assert!((s.distance_m - 5994.0).abs() < 1e-9);
    assert!((s.elevation_gain_m - 0.05 * 5994.0).abs() < 1e-6);
    let hr = s.avg_heart_rate.expect("puls målt");
    assert!(hr > 120.0 && hr < 140.0);
    assert!(s.total_energy_kj > 0.0);
    assert!(s.ppo.is_some());
    assert!(s.ftp.is_none(), "under 20 min");
}

#[test]
fn test_efficiency_requires_heart_rate() {
    let with_hr = Pipeline::new(CyclistProfile::default()).run(&climb(600, true)).unwrap();
    let report = with_hr.efficiency().expect("effektivitet");
    assert!(!report.points.is_empty());
    assert!(report.points.iter().all(|p| p.watts_per_bpm > 0.0));

    let without = Pipeline::new(CyclistProfile::default()).run(&climb(600, false)).unwrap();
    assert!(matches!(without.efficiency(), Err(CycleDataError::HeartRateUnavailable)));
}

#[test]
fn test_constant_grade_slope_average() {
    let activity = Pipeline::new(CyclistProfile::default()).run(&climb(300, false)).unwrap();
    let slopes = activity.averaged_slope(100.0, false);
    assert_eq!(slopes.len(), activity.len());
    assert!(slopes.iter().all(|s| (s - 0.05).abs() < 1e-9));

    let steepest = activity.max_averaged_slope(100.0).expect("stigning");
    assert!((steepest - 0.05).abs() < 1e-9);
}

#[test]
fn test_smoothed_power_has_one_value_per_sample() {
    let activity = Pipeline::new(CyclistProfile::default()).run(&climb(300, false)).unwrap();
    let smooth = activity.smoothed_power(30.0);
    assert_eq!(smooth.len(), activity.len());
    assert!(smooth.iter().all(|w| *w > 0.0));
}

#[test]
fn test_report_text() {
    let activity = Pipeline::new(CyclistProfile::default()).run(&climb(120, false)).unwrap();
    let text = format_activity_report(&activity);
    assert!(text.contains("Activity Report"));
    assert!(text.contains("n/a (insufficient data)"), "{text}");
    assert!(text.contains("Avg heart rate:   n/a"));
    assert!(text.contains("Max slope/100 m:  5 %"), "{text}");
}

use cycledata_core::{CyclistProfile, Pipeline, RawRecord};

const T0: i64 = 1_700_000_000;

fn rec(t: i64, pos: f64, speed: f64) -> RawRecord {
    RawRecord::new()
        .with("timestamp", T0 + t)
        .with("distance", pos)
        .with("speed", speed)
        .with("altitude", 50.0)
}

/// 10 min kjøring, 5 min stillstand (300 × 1 s), 10 min kjøring.
fn ride_with_stop() -> Vec<RawRecord> {
    let mut out = Vec::new();
    for t in 0..=600 {
        out.push(rec(t, 8.0 * t as f64, 8.0));
    }
    for t in 601..=900 {
        out.push(rec(t, 4800.0, 0.0));
    }
    for t in 901..=1500 {
        out.push(rec(t, 4800.0 + 8.0 * (t - 900) as f64, 8.0));
    }
    out
}

#[test]
fn test_stationary_segment_removed() {
    let activity = Pipeline::new(CyclistProfile::default()).run(&ride_with_stop()).unwrap();

    assert_eq!(activity.pause_report().dropped, 300);
    assert_eq!(activity.len(), 1200);

    let paused = activity
        .samples()
        .iter()
        .filter(|s| {
            let t = s.time.timestamp() - T0;
            t > 600 && t <= 900
        })
        .count();
    assert_eq!(paused, 0);

    assert!((activity.activity_seconds() - 1200.0).abs() < 1e-9);
    assert!((activity.wall_clock_seconds() - 1500.0).abs() < 1e-9);
    assert!(activity.activity_seconds() < activity.wall_clock_seconds());
}

#[test]
fn test_activity_time_is_cumulative_time_delta() {
    let activity = Pipeline::new(CyclistProfile::default()).run(&ride_with_stop()).unwrap();
    let mut running = 0.0;
    let mut last_time = None;
    for s in activity.samples() {
        running += s.time_delta;
        assert!((s.activity_time - running).abs() < 1e-9);
        if let Some(prev) = last_time {
            assert!(s.time > prev, "tid skal være strengt stigende");
        }
        last_time = Some(s.time);
    }
}

#[test]
fn test_first_sample_always_dropped() {
    let records: Vec<RawRecord> = (0..5).map(|t| rec(t, 10.0 * t as f64, 10.0)).collect();
    let activity = Pipeline::new(CyclistProfile::default()).run(&records).unwrap();
    assert_eq!(activity.len(), 4);
    assert_eq!(activity.samples()[0].time.timestamp(), T0 + 1);
}

#[test]
fn test_slow_long_gap_is_a_stop_fast_long_gap_is_kept() {
    let records = vec![
        rec(0, 0.0, 5.0),
        rec(1, 5.0, 5.0),
        rec(31, 20.0, 0.5),  // 30 s, 15 m → 0.5 m/s: pause
        rec(32, 25.0, 5.0),
        rec(62, 200.0, 6.0), // 30 s, 175 m: tunnel/GPS-hull, kjøring
    ];
    let activity = Pipeline::new(CyclistProfile::default()).run(&records).unwrap();
    let kept: Vec<i64> = activity.samples().iter().map(|s| s.time.timestamp() - T0).collect();
    assert_eq!(kept, vec![1, 32, 62]);
    assert!((activity.activity_seconds() - 32.0).abs() < 1e-9);
}

#[test]
fn test_duplicate_timestamps_dropped() {
    let records = vec![
        rec(0, 0.0, 5.0),
        rec(1, 5.0, 5.0),
        rec(1, 6.0, 5.0),
        rec(2, 11.0, 5.0),
    ];
    let activity = Pipeline::new(CyclistProfile::default()).run(&records).unwrap();
    assert_eq!(activity.len(), 2);
    assert!(activity.samples().iter().all(|s| s.time_delta > 0.0));
}

#[test]
fn test_out_of_order_timestamps_keep_time_increasing() {
    let records: Vec<RawRecord> = [0i64, 5, 3, 4, 6]
        .iter()
        .enumerate()
        .map(|(i, t)| rec(*t, 8.0 * i as f64, 8.0))
        .collect();
    let activity = Pipeline::new(CyclistProfile::default()).run(&records).unwrap();
    let kept: Vec<i64> = activity.samples().iter().map(|s| s.time.timestamp() - T0).collect();
    assert_eq!(kept, vec![5, 6]);
    assert!(activity.samples().windows(2).all(|w| w[1].time > w[0].time));
    assert!(activity.estimate_ppo().is_err());
}

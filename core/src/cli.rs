use std::fmt::Write;

use crate::physics::RoundTo;
use crate::pipeline::{ActivityTimeSeries, PipelineWarning};

fn hms(secs: f64) -> String {
    let s = secs.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", s / 3600, (s % 3600) / 60, s % 60)
}

fn opt(v: Option<f64>, dp: u32, unit: &str) -> String {
    match v {
        Some(x) => format!("{} {unit}", x.round_to(dp)),
        None => "n/a (insufficient data)".to_string(),
    }
}

/// Tekstrapport for en aktivitet (samme felt som sammendragstabellen).
pub fn format_activity_report(activity: &ActivityTimeSeries) -> String {
    let s = activity.summary();
    let mut out = String::new();

    let _ = writeln!(out, "--- Activity Report ---");
    let _ = writeln!(out, "Samples:          {}", activity.len());
    let _ = writeln!(out, "Moving time:      {}", hms(s.duration_secs));
    let _ = writeln!(out, "Elapsed time:     {}", hms(activity.wall_clock_seconds()));
    let _ = writeln!(out, "Distance:         {} km", (s.distance_m / 1000.0).round_to(2));
    let _ = writeln!(out, "Avg speed:        {} km/h", (s.avg_speed_ms * 3.6).round_to(1));
    let _ = writeln!(out, "Max speed:        {} km/h", (s.max_speed_ms * 3.6).round_to(0));
    let _ = writeln!(out, "Elevation gain:   {} m", s.elevation_gain_m.round_to(0));
    let _ = writeln!(out, "Avg heart rate:   {}", opt(s.avg_heart_rate, 0, "bpm"));
    let _ = writeln!(out, "Energy:           {} kJ", s.total_energy_kj.round_to(0));
    let _ = writeln!(out, "PPO:              {}", opt(s.ppo, 0, "W"));
    let _ = writeln!(out, "FTP:              {}", opt(s.ftp, 0, "W"));
    let _ = writeln!(out, "FTP/kg:           {}", opt(s.ftp_per_kg, 1, "W/kg"));
    let _ = writeln!(out, "VO2max (est.):    {}", opt(s.vo2max, 0, "mL/kg/min"));
    if let Some(steepest) = activity.max_averaged_slope(100.0) {
        let _ = writeln!(out, "Max slope/100 m:  {} %", (steepest * 100.0).round_to(1));
    }

    for w in activity.warnings() {
        let line = match w {
            PipelineWarning::AltitudeCorrectionFailed { reason } => {
                format!("altitude correction failed, recorded altitude kept ({reason})")
            }
            PipelineWarning::RecordsSkipped { count } => {
                format!("{count} record(s) without timestamp/distance skipped")
            }
        };
        let _ = writeln!(out, "WARNING: {line}");
    }
    out
}

pub fn print_activity_report(activity: &ActivityTimeSeries) {
    print!("{}", format_activity_report(activity));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms_formats_hours() {
        assert_eq!(hms(3725.0), "1:02:05");
        assert_eq!(hms(59.6), "0:01:00");
    }
}

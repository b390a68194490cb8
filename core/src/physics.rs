// core/src/physics.rs
use crate::error::Result;
use crate::models::{check_size, CyclistProfile, Sample, TrackPoint};
use crate::pause::Step;

pub const G: f64 = 9.807;             // gravitasjon (m/s²)
pub const RHO0: f64 = 1.225;          // lufttetthet ved havnivå (kg/m³)
pub const LAPSE_RATE: f64 = 0.0065;   // temperaturgradient dT/dz (K/m)
pub const T0: f64 = 288.15;           // standard temperatur ved havnivå (K)
pub const R_AIR: f64 = 287.05;        // gasskonstant for tørr luft (J/(kg·K))
pub const DRAG_COEFFICIENT: f64 = 1.0;

// --- RoundTo trait (offentlig, brukt i rapporter) ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/// Projisert frontareal (m²) fra antropometrisk regresjon.
/// Gyldig kun for `size` i meter; `size >= 5` gir `Precondition`.
pub fn frontal_area(mass: f64, size: f64) -> Result<f64> {
    check_size(size)?;
    Ok(0.0293 * size.powf(0.725) * mass.powf(0.425) + 0.0604)
}

/// Lufttetthet (kg/m³) etter ISA barometrisk formel.
#[inline]
pub fn air_density(altitude_m: f64) -> f64 {
    let exponent = G / (R_AIR * LAPSE_RATE) - 1.0;
    RHO0 * (1.0 - LAPSE_RATE * altitude_m / T0).powf(exponent)
}

/// Luftmotstand (N) = Cd · A · ½ρv².
pub fn compute_drag(mass: f64, size: f64, speed: f64, altitude: f64) -> Result<f64> {
    let area = frontal_area(mass, size)?;
    Ok(drag_force(area, speed, altitude))
}

#[inline]
fn drag_force(area: f64, speed: f64, altitude: f64) -> f64 {
    let kinetic_pressure = 0.5 * air_density(altitude) * speed * speed;
    DRAG_COEFFICIENT * area * kinetic_pressure
}

#[inline]
pub fn kinetic_energy(total_mass: f64, speed: f64) -> f64 {
    0.5 * total_mass * speed * speed
}

#[inline]
pub fn potential_energy(total_mass: f64, altitude: f64) -> f64 {
    total_mass * G * altitude
}

/// Effekt (W) fra energibalanse: (ΔEk + ΔEp)/Δt + drag·v.
/// Negativt resultat (bremsing) klippes til 0 – modellen kan ikke gi negativ tråkkeffekt.
#[inline]
pub fn instantaneous_power(energy_delta: f64, time_delta: f64, drag: f64, speed: f64) -> f64 {
    let p = energy_delta / time_delta + drag * speed;
    if p.is_finite() { p.max(0.0) } else { 0.0 }
}

/// Absolutte størrelser for ett punkt.
#[derive(Debug, Clone, Copy)]
struct PointPhysics {
    drag: f64,
    kinetic: f64,
    potential: f64,
}

fn point_physics(p: &TrackPoint, profile: &CyclistProfile, area: f64) -> PointPhysics {
    let mass = profile.total_mass();
    PointPhysics {
        drag: drag_force(area, p.speed, p.altitude),
        kinetic: kinetic_energy(mass, p.speed),
        potential: potential_energy(mass, p.altitude),
    }
}

/// Bygger avledede samples for stegene som overlevde pausefilteret.
pub fn derive_samples(points: &[TrackPoint], steps: &[Step], profile: &CyclistProfile) -> Result<Vec<Sample>> {
    let area = frontal_area(profile.mass, profile.size)?;
    let mut out = Vec::with_capacity(steps.len());

    for step in steps {
        let prev = &points[step.prev];
        let cur = &points[step.index];
        let a = point_physics(prev, profile, area);
        let b = point_physics(cur, profile, area);

        let altitude_delta = cur.altitude - prev.altitude;
        let kinetic_energy_delta = b.kinetic - a.kinetic;
        let potential_energy_delta = b.potential - a.potential;

        out.push(Sample {
            time: cur.time,
            position: cur.position,
            altitude: cur.altitude,
            speed: cur.speed,
            heart_rate: cur.heart_rate,
            lat: cur.lat,
            lon: cur.lon,
            drag: b.drag,
            kinetic_energy: b.kinetic,
            potential_energy: b.potential,
            time_delta: step.time_delta,
            position_delta: step.position_delta,
            altitude_delta,
            speed_delta: cur.speed - prev.speed,
            kinetic_energy_delta,
            potential_energy_delta,
            activity_time: step.activity_time,
            slope: altitude_delta / step.position_delta,
            watts: instantaneous_power(
                kinetic_energy_delta + potential_energy_delta,
                step.time_delta,
                b.drag,
                cur.speed,
            ),
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sea_level_density() {
        assert!((air_density(0.0) - RHO0).abs() < 1e-12);
        assert!(air_density(2000.0) < air_density(0.0));
    }

    #[test]
    fn braking_is_clamped() {
        assert_eq!(instantaneous_power(-5000.0, 1.0, 2.0, 5.0), 0.0);
        assert!((instantaneous_power(100.0, 2.0, 2.0, 5.0) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn round_to_decimals() {
        assert_eq!(1.23456_f64.round_to(2), 1.23);
        assert_eq!(2.5_f64.round_to(0), 3.0);
    }
}

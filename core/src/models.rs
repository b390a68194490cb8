// core/src/models.rs
use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CycleDataError, Result};

/// Øvre grense for rytterens høyde i meter. Større verdi = enhetsfeil (cm).
pub const MAX_SIZE_M: f64 = 5.0;

/// Én verdi i en rå-record slik parseren leverer den.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

/// Rå telemetri-record: feltnavn → verdi. Feltsettet kan variere mellom opptak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-variant av `insert`, praktisk i tester og adaptere.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Feltverdi, der `Null` regnes som manglende.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match self.fields.get(name) {
            Some(FieldValue::Null) | None => None,
            Some(v) => Some(v),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Rytterprofil. Påvirker drag- og energiformlene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CyclistProfile {
    pub mass: f64,      // kg
    pub size: f64,      // m
    pub bike_mass: f64, // kg
}

impl Default for CyclistProfile {
    fn default() -> Self {
        Self {
            mass: 70.0,
            size: 1.80,
            bike_mass: 10.0,
        }
    }
}

impl CyclistProfile {
    pub fn new(mass: f64, size: f64) -> Result<Self> {
        let profile = Self {
            mass,
            size,
            ..Self::default()
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn with_bike_mass(mut self, bike_mass: f64) -> Self {
        self.bike_mass = bike_mass;
        self
    }

    /// Rytter + sykkel (kg).
    #[inline]
    pub fn total_mass(&self) -> f64 {
        self.mass + self.bike_mass
    }

    pub fn validate(&self) -> Result<()> {
        check_size(self.size)?;
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(CycleDataError::Precondition(format!(
                "mass must be a positive number of kg, got {}",
                self.mass
            )));
        }
        Ok(())
    }
}

pub(crate) fn check_size(size: f64) -> Result<()> {
    if size.is_finite() && size < MAX_SIZE_M {
        Ok(())
    } else {
        Err(CycleDataError::Precondition(format!(
            "size must be given in meters (< {MAX_SIZE_M}), got {size}"
        )))
    }
}

static CURRENT_CYCLIST: Lazy<RwLock<CyclistProfile>> =
    Lazy::new(|| RwLock::new(CyclistProfile::default()));

/// Setter prosess-global rytter (masse og høyde). Sykkelvekt beholdes.
pub fn set_cyclist(mass: f64, size: f64) -> Result<()> {
    let mut guard = CURRENT_CYCLIST
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let next = CyclistProfile {
        mass,
        size,
        bike_mass: guard.bike_mass,
    };
    next.validate()?;
    *guard = next;
    log::info!("cyclist profile set: mass={mass} kg, size={size} m");
    Ok(())
}

/// Kopi av gjeldende globale profil. Pipelinen tar dette øyeblikksbildet ved start.
pub fn current_cyclist() -> CyclistProfile {
    *CURRENT_CYCLIST
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Øyeblikksbilde av den globale profilen med valgfrie overstyringer.
/// Brukes av ytre grensesnitt der hvert felt kan utelates.
pub fn cyclist_with_overrides(
    mass: Option<f64>,
    size: Option<f64>,
    bike_mass: Option<f64>,
) -> Result<CyclistProfile> {
    let base = current_cyclist();
    let profile = CyclistProfile {
        mass: mass.unwrap_or(base.mass),
        size: size.unwrap_or(base.size),
        bike_mass: bike_mass.unwrap_or(base.bike_mass),
    };
    profile.validate()?;
    Ok(profile)
}

/// Om pulsdata kommer fra sensor eller er fylt med standardverdi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeartRateStatus {
    Measured,
    /// Ingen pulssensor; kolonnen er fylt med `DEFAULT_HEART_RATE`.
    Absent,
}

/// Normalisert målepunkt (etter feltoppløsning og enhetskonvertering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub time: DateTime<Utc>,
    pub position: f64,   // m, kumulativ distanse
    pub altitude: f64,   // m
    pub speed: f64,      // m/s
    pub heart_rate: f64, // bpm
    pub lat: Option<f64>, // grader
    pub lon: Option<f64>, // grader
}

/// Avledet sample, ett per beholdt målepunkt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: DateTime<Utc>,
    pub position: f64,
    pub altitude: f64,
    pub speed: f64,
    pub heart_rate: f64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    pub drag: f64,             // N
    pub kinetic_energy: f64,   // J
    pub potential_energy: f64, // J

    pub time_delta: f64, // s
    pub position_delta: f64,
    pub altitude_delta: f64,
    pub speed_delta: f64,
    pub kinetic_energy_delta: f64,
    pub potential_energy_delta: f64,

    /// Sek kjøretid siden start, pauser ekskludert.
    pub activity_time: f64,
    /// Stigning som forhold (×100 for prosent).
    pub slope: f64,
    /// Estimert effekt (W), aldri negativ.
    pub watts: f64,
}

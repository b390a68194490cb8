// core/src/elevation.rs
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use log::{debug, info};
use ordered_float::OrderedFloat;

use crate::counters::PipelineCounters;
use crate::error::ElevationError;
use crate::models::TrackPoint;
use crate::smoothing::rolling_median;

/// Maks antall punkter per forespørsel (tjenestens grense).
pub const ELEVATION_BATCH_SIZE: usize = 190;
/// Vindu for medianfilteret etter oppslag.
pub const ELEVATION_MEDIAN_WINDOW: usize = 5;

/// Høydetjeneste: parallelle lon/lat-lister inn, høyder i samme rekkefølge ut.
pub trait ElevationProvider {
    fn elevations(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<f64>, ElevationError>;
}

impl<P: ElevationProvider + ?Sized> ElevationProvider for &P {
    fn elevations(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<f64>, ElevationError> {
        (**self).elevations(lons, lats)
    }
}

/// Slår opp høyde for alle punkter i batcher og glatter resultatet.
/// Returnerer ny høydeserie med samme lengde som `points`; endrer ingenting selv.
pub fn corrected_altitudes(
    points: &[TrackPoint],
    provider: &dyn ElevationProvider,
    batch_size: usize,
    counters: Option<&PipelineCounters>,
) -> Result<Vec<f64>, ElevationError> {
    let mut lons = Vec::with_capacity(points.len());
    let mut lats = Vec::with_capacity(points.len());
    for (index, p) in points.iter().enumerate() {
        match (p.lon, p.lat) {
            (Some(lon), Some(lat)) => {
                lons.push(lon);
                lats.push(lat);
            }
            _ => return Err(ElevationError::MissingCoordinates { index }),
        }
    }

    let batch_size = batch_size.clamp(1, ELEVATION_BATCH_SIZE);
    let mut altitudes = Vec::with_capacity(points.len());
    for (lon_chunk, lat_chunk) in lons.chunks(batch_size).zip(lats.chunks(batch_size)) {
        if let Some(c) = counters {
            c.elevation_requests.inc();
        }
        let batch = provider.elevations(lon_chunk, lat_chunk)?;
        if batch.len() != lon_chunk.len() {
            return Err(ElevationError::LengthMismatch {
                expected: lon_chunk.len(),
                got: batch.len(),
            });
        }
        if let Some(bad) = batch.iter().position(|z| !z.is_finite()) {
            return Err(ElevationError::Malformed(format!(
                "non-finite elevation at batch offset {bad}"
            )));
        }
        altitudes.extend(batch);
    }

    debug!("elevation lookup returned {} points", altitudes.len());
    Ok(rolling_median(&altitudes, ELEVATION_MEDIAN_WINDOW))
}

/// Fast svar – brukes i tester og offline-kjøring.
#[derive(Debug, Clone)]
pub enum StaticElevationProvider {
    /// Samme høyde for alle punkter.
    Constant(f64),
    /// Feiler alltid (simulerer nettverksbrudd).
    Unavailable,
}

impl ElevationProvider for StaticElevationProvider {
    fn elevations(&self, lons: &[f64], _lats: &[f64]) -> Result<Vec<f64>, ElevationError> {
        match self {
            StaticElevationProvider::Constant(z) => Ok(vec![*z; lons.len()]),
            StaticElevationProvider::Unavailable => Err(ElevationError::Http {
                message: "elevation service unavailable".into(),
                status_code: None,
            }),
        }
    }
}

type CoordKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// Mellomlager rundt en annen tilbyder, nøkkel (lon, lat).
/// Kun punkter som mangler i cachen sendes videre.
pub struct CachedElevationProvider<P> {
    inner: P,
    cache: Mutex<HashMap<CoordKey, f64>>,
    counters: Option<PipelineCounters>,
}

impl<P: ElevationProvider> CachedElevationProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
            counters: None,
        }
    }

    pub fn with_counters(mut self, counters: PipelineCounters) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn cached_points(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<CoordKey, f64>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<P: ElevationProvider> ElevationProvider for CachedElevationProvider<P> {
    fn elevations(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<f64>, ElevationError> {
        let keys: Vec<CoordKey> = lons
            .iter()
            .zip(lats)
            .map(|(lon, lat)| (OrderedFloat(*lon), OrderedFloat(*lat)))
            .collect();

        let missing: Vec<CoordKey> = {
            let cache = self.lock_cache();
            let mut seen = HashSet::new();
            keys.iter()
                .filter(|k| !cache.contains_key(*k) && seen.insert(**k))
                .copied()
                .collect()
        };
        if let Some(c) = &self.counters {
            c.elevation_cache_hits.inc_by((keys.len() - missing.len()) as u64);
            c.elevation_cache_misses.inc_by(missing.len() as u64);
        }

        // låsen slippes under oppslaget (blokkerende HTTP)
        let mut fetched_now: HashMap<CoordKey, f64> = HashMap::new();
        if !missing.is_empty() {
            let miss_lons: Vec<f64> = missing.iter().map(|k| k.0.into_inner()).collect();
            let miss_lats: Vec<f64> = missing.iter().map(|k| k.1.into_inner()).collect();
            let fetched = self.inner.elevations(&miss_lons, &miss_lats)?;
            if fetched.len() != missing.len() {
                return Err(ElevationError::LengthMismatch {
                    expected: missing.len(),
                    got: fetched.len(),
                });
            }
            fetched_now.extend(missing.into_iter().zip(fetched));
        }

        let mut cache = self.lock_cache();
        if !fetched_now.is_empty() {
            cache.extend(fetched_now.iter().map(|(k, z)| (*k, *z)));
            info!("elevation cache now holds {} points", cache.len());
        }

        keys.iter()
            .map(|k| {
                fetched_now
                    .get(k)
                    .or_else(|| cache.get(k))
                    .copied()
                    .ok_or_else(|| ElevationError::Malformed("cache miss after fetch".into()))
            })
            .collect()
    }
}

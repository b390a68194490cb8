// core/src/elevation_api.rs
use serde::Deserialize;
use ureq::Agent;

use crate::elevation::ElevationProvider;
use crate::error::ElevationError;

pub const IGN_ELEVATION_URL: &str = "https://wxs.ign.fr/calcul/alti/rest/elevationLine.json";

#[derive(Debug, Clone, Deserialize)]
struct ElevationLineResp {
    elevations: Vec<ElevationPoint>,
}

#[derive(Debug, Clone, Deserialize)]
struct ElevationPoint {
    z: f64,
}

/// IGN altimetri-klient – enkel blocking-versjon (ureq).
pub struct IgnElevationClient {
    agent: Agent,
    url: String,
}

impl IgnElevationClient {
    pub fn new() -> Self {
        Self::with_url(IGN_ELEVATION_URL)
    }

    /// Egen URL (speil eller lokal testserver).
    pub fn with_url(url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(std::time::Duration::from_secs(10))
            .build();
        Self {
            agent,
            url: url.to_string(),
        }
    }
}

impl Default for IgnElevationClient {
    fn default() -> Self {
        Self::new()
    }
}

fn join_coords(xs: &[f64]) -> String {
    xs.iter().map(|x| x.to_string()).collect::<Vec<_>>().join("|")
}

/// Tolker `{"elevations":[{"z":..}, ...]}` i svarrekkefølge.
fn decode_elevations(body: &str) -> Result<Vec<f64>, ElevationError> {
    let resp: ElevationLineResp =
        serde_json::from_str(body).map_err(|e| ElevationError::Malformed(e.to_string()))?;
    Ok(resp.elevations.into_iter().map(|p| p.z).collect())
}

impl ElevationProvider for IgnElevationClient {
    fn elevations(&self, lons: &[f64], lats: &[f64]) -> Result<Vec<f64>, ElevationError> {
        let resp = self
            .agent
            .get(&self.url)
            .query("lon", &join_coords(lons))
            .query("lat", &join_coords(lats))
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => ElevationError::Http {
                    message: format!("status {code}"),
                    status_code: Some(code),
                },
                other => ElevationError::Http {
                    message: other.to_string(),
                    status_code: None,
                },
            })?;

        let body = resp
            .into_string()
            .map_err(|e| ElevationError::Malformed(e.to_string()))?;
        let elevations = decode_elevations(&body)?;

        log::debug!(
            "[IGN] {} points requested, {} elevations returned",
            lons.len(),
            elevations.len()
        );

        Ok(elevations)
    }
}

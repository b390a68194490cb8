// Python-binding (feature "python"). JSON inn, JSON ut – samme form som CLI-rapporten.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;
use serde_json::json;

use crate::elevation_api::IgnElevationClient;
use crate::error::CycleDataError;
use crate::models::cyclist_with_overrides;
use crate::normalize::records_from_json;
use crate::pipeline::Pipeline;

fn to_py_err(e: CycleDataError) -> PyErr {
    PyErr::new::<PyValueError, _>(e.to_string())
}

/// Kjører hele pipelinen på en JSON-array av rå-records.
/// Utelatte profilfelt hentes fra profilen satt med `set_cyclist`.
#[pyfunction]
#[pyo3(signature = (records_json, mass=None, size=None, bike_mass=None, reload_altitude=false))]
fn process_activity_json(
    records_json: &str,
    mass: Option<f64>,
    size: Option<f64>,
    bike_mass: Option<f64>,
    reload_altitude: bool,
) -> PyResult<String> {
    let profile = cyclist_with_overrides(mass, size, bike_mass).map_err(to_py_err)?;
    let records = records_from_json(records_json).map_err(to_py_err)?;

    let ign = IgnElevationClient::new();
    let mut pipeline = Pipeline::new(profile);
    if reload_altitude {
        pipeline = pipeline.with_elevation(&ign);
    }
    let activity = pipeline.run(&records).map_err(to_py_err)?;

    let out = json!({
        "samples": activity.get_data(),
        "summary": activity.summary(),
        "performance": activity.performance(),
        "heart_rate_status": activity.heart_rate_status(),
        "warnings": activity.warnings(),
        "source": "rust_binding",
    });
    serde_json::to_string(&out).map_err(|e| to_py_err(e.into()))
}

#[pyfunction]
fn set_cyclist(mass: f64, size: f64) -> PyResult<()> {
    crate::models::set_cyclist(mass, size).map_err(to_py_err)
}

#[pyfunction]
fn compute_drag(mass: f64, size: f64, speed: f64, altitude: f64) -> PyResult<f64> {
    crate::physics::compute_drag(mass, size, speed, altitude).map_err(to_py_err)
}

#[pymodule]
fn cycledata_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(process_activity_json, m)?)?;
    m.add_function(wrap_pyfunction!(set_cyclist, m)?)?;
    m.add_function(wrap_pyfunction!(compute_drag, m)?)?;
    Ok(())
}

//! Python binding
//!
//! A single JSON-in/JSON-out entry point so the Python side never has to
//! mirror the model types.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::orchestrator::{BatchSnapshot, EngineConfig, ScheduleEngine, ScheduleError};

fn to_py_err(err: ScheduleError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Compute schedules for a JSON array of agreement documents.
///
/// Returns a JSON `BatchSnapshot`. `config_json` is an optional
/// `EngineConfig` object; omitted fields take their defaults.
#[pyfunction]
#[pyo3(signature = (documents_json, config_json=None))]
pub fn compute_schedules(documents_json: &str, config_json: Option<&str>) -> PyResult<String> {
    let config = match config_json {
        Some(json) => EngineConfig::from_json(json).map_err(to_py_err)?,
        None => EngineConfig::default(),
    };
    let engine = ScheduleEngine::new(config).map_err(to_py_err)?;
    let schedules = engine.compute_batch_json(documents_json).map_err(to_py_err)?;
    BatchSnapshot::new(engine.config(), schedules)
        .and_then(|snapshot| snapshot.to_json(false))
        .map_err(to_py_err)
}

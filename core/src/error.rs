// core/src/error.rs
use thiserror::Error;

/// Feil fra høydetjenesten. Gjenopprettes i pipelinen (original høyde beholdes).
#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("elevation request failed: {message}")]
    Http {
        message: String,
        status_code: Option<u16>,
    },
    #[error("malformed elevation response: {0}")]
    Malformed(String),
    #[error("elevation response has {got} points, expected {expected}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("sample {index} has no GPS position")]
    MissingCoordinates { index: usize },
}

#[derive(Debug, Error)]
pub enum CycleDataError {
    /// Obligatorisk felt mangler eller kan ikke tolkes i rådataene.
    #[error("format error: {0}")]
    Format(String),

    /// Verdi utenfor modellens domene (typisk høyde oppgitt i cm).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Ingen rullende vindu hadde nok samples – estimatet er udefinert, ikke 0.
    #[error("insufficient data for {metric}: no {window_secs}s window with at least {min_periods} samples")]
    InsufficientData {
        metric: &'static str,
        window_secs: f64,
        min_periods: usize,
    },

    #[error("no heart rate sensor data in this activity")]
    HeartRateUnavailable,

    #[error("elevation service error: {0}")]
    ExternalService(#[from] ElevationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CycleDataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_metric() {
        let err = CycleDataError::InsufficientData {
            metric: "ppo",
            window_secs: 150.0,
            min_periods: 150,
        };
        let msg = err.to_string();
        assert!(msg.contains("ppo"));
        assert!(msg.contains("150s"));
    }

    #[test]
    fn elevation_error_converts() {
        let err: CycleDataError = ElevationError::LengthMismatch { expected: 3, got: 2 }.into();
        assert!(matches!(err, CycleDataError::ExternalService(_)));
    }
}

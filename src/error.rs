use std::path::PathBuf;

use thiserror::Error;

/// Rejected car configuration. Raised at construction or load time, never
/// from the per-tick update.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("suspension rest distance {rest} exceeds ray length {ray}")]
    RestBeyondRay { rest: f32, ray: f32 },

    #[error("`{field}` must be greater than zero")]
    NonPositive { field: String },

    #[error("`{field}` must not be negative")]
    Negative { field: String },

    #[error("`{field}` must be finite")]
    NonFinite { field: String },

    #[error("`{field}` must lie in [{min}, {max}], got {value}")]
    OutOfRange { field: String, value: f32, min: f32, max: f32 },

    #[error("a car needs at least one tire")]
    NoTires,

    #[error("curve `{field}` is invalid: {reason}")]
    InvalidCurve { field: String, reason: &'static str },

    #[error("failed to read car config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse car config")]
    Parse(#[from] toml::de::Error),
}

//! Error types for cadenza-core.
//!
//! Everything here is a configuration-time error: bad layer parameters,
//! weight tensors whose shape disagrees with the layer, or mismatched
//! boundaries when assembling a chain. They are surfaced synchronously so a
//! bad model never reaches the audio thread. The forward path itself has no
//! error surface (see the crate docs on hot-path preconditions).

use thiserror::Error;

/// Error type for cadenza-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid layer config: {0}")]
    InvalidConfig(String),

    #[error("Weight tensor shape mismatch: expected {expected}, got {actual}")]
    WeightShape { expected: String, actual: String },

    #[error("Bias length mismatch: expected {expected}, got {actual}")]
    BiasLength { expected: usize, actual: usize },

    #[error("Layer boundary mismatch: previous layer outputs {from} channels, next layer expects {to}")]
    LayerBoundary { from: usize, to: usize },
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

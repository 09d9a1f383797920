//! Error types for the Voltaic circuit simulator.
//!
//! This module provides a unified error type [`VoltaicError`] that covers
//! all error conditions that can occur while normalizing, validating and
//! simulating a circuit, plus the I/O failures of the CLI front end.

use thiserror::Error;

/// Result type alias using [`VoltaicError`].
pub type Result<T> = std::result::Result<T, VoltaicError>;

/// Unified error type for all Voltaic operations.
#[derive(Error, Debug)]
pub enum VoltaicError {
    // ============ Topology Errors ============
    /// A wire references a component index that does not exist
    #[error("Wire {edge} references component {index}, but the circuit has only {len} components")]
    EdgeOutOfRange { edge: usize, index: usize, len: usize },

    /// A wire connects a component to itself
    #[error("Wire {edge} connects component '{component}' to itself")]
    SelfLoop { edge: usize, component: String },

    /// A component has unfilled connection slots
    #[error("Component '{component}' has {connected} of {required} required connections")]
    IncompleteConnections {
        component: String,
        connected: usize,
        required: usize,
    },

    /// A component has more wires attached than it has slots
    #[error("Component '{component}' has {connected} connections but only {slots} slots")]
    OverConnected {
        component: String,
        connected: usize,
        slots: usize,
    },

    /// No junction is marked as ground
    #[error("Circuit has no ground junction")]
    MissingGround,

    /// More than one junction is marked as ground
    #[error("Circuit has {count} ground junctions, expected exactly one")]
    MultipleGrounds { count: usize },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    // ============ Validation Errors ============
    /// No EMF source sits on a closed loop with non-zero resistance
    #[error("Circuit is invalid: no EMF source lies on a closed loop with non-zero resistance")]
    CircuitInvalid,

    // ============ Simulation Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular {size}x{size} matrix at row {row} (component '{component}') - circuit may have a short or a floating junction")]
    SingularMatrix {
        size: usize,
        row: usize,
        component: String,
    },

    /// Numerical overflow detected
    #[error("Numerical overflow detected at component '{component}' (value: {value:.2e})")]
    NumericalOverflow { component: String, value: f64 },

    // ============ Configuration Errors ============
    /// Invalid simulation parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    /// Component parameter outside its allowed range
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    // ============ I/O Errors ============
    /// Error reading circuit file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing an output file
    #[error("Failed to write '{path}': {source}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed circuit description
    #[error("Invalid circuit description: {0}")]
    Json(#[from] serde_json::Error),

    /// Output stream error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl VoltaicError {
    /// Create an invalid topology error
    pub fn topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Create an invalid component parameter error
    pub fn param(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid simulation parameter error
    pub fn simulation_param(message: impl Into<String>) -> Self {
        Self::InvalidSimulationParam {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the topology family (checked before simulation).
    pub fn is_topology(&self) -> bool {
        matches!(
            self,
            Self::EdgeOutOfRange { .. }
                | Self::SelfLoop { .. }
                | Self::IncompleteConnections { .. }
                | Self::OverConnected { .. }
                | Self::MissingGround
                | Self::MultipleGrounds { .. }
                | Self::InvalidTopology { .. }
        )
    }
}

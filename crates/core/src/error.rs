//! Error types for the island-zoom core.

use thiserror::Error;

/// Errors produced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero when creating a Field or resolution.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Two fields had incompatible dimensions for an element-wise operation.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed or looked up.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// No engine is registered under the given name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// No noise backend is registered under the given name.
    #[error("unknown noise backend: {0}")]
    UnknownNoiseBackend(String),

    /// A run description file could not be parsed.
    #[error("invalid seed file: {0}")]
    InvalidSeed(String),

    /// A filesystem operation failed (snapshot write, scratch directory).
    #[error("i/o error: {0}")]
    Io(String),

    /// The external noise generator could not be run or reported failure.
    #[error("external generator failed: `{command}`: {reason}")]
    External { command: String, reason: String },

    /// An array file produced by the external generator was malformed.
    #[error("malformed npy data: {0}")]
    NpyFormat(String),
}

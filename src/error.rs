//! Error types for the bitinfo library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum BitinfoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported floating-point format '{dtype}': only 32-bit and 64-bit IEEE floats are supported")]
    UnsupportedFormat { dtype: String },

    #[error("Reduction dimension '{dim}' has {len} position(s); at least 2 are needed to form adjacent pairs")]
    EmptyReductionAxis { dim: String, len: usize },

    #[error("Invalid inflevel {0}: must lie in (0, 1]")]
    InvalidInflevel(f64),

    #[error("Invalid keepbits {keepbits}: must lie in [0, {max}]")]
    InvalidKeepbits { keepbits: i64, max: u32 },

    #[error("Variable '{0}' not found")]
    VariableNotFound(String),

    #[error("Variable '{variable}' has no dimension '{dim}'")]
    UnknownDimension { variable: String, dim: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Bit index {bit} out of range for a {width}-bit format")]
    BitIndexOutOfRange { bit: usize, width: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, BitinfoError>;

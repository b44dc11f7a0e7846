//! Error types for curve construction, table packing and configuration.

use thiserror::Error;

/// Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors that can occur while building or packing curves.
#[derive(Debug, Error)]
pub enum CurveError {
    /// Malformed control points (too few, or x decreasing).
    #[error("validation error: {0}")]
    Validation(String),

    /// Control point index out of range.
    #[error("there are {count} control points, index {index} is invalid")]
    Index {
        /// Requested index.
        index: usize,
        /// Number of control points in the curve.
        count: usize,
    },

    /// Registering a curve would overflow the table arenas.
    #[error(
        "curve table capacity exceeded: {knots} knots (max {max_knots}), \
         {coefs} coefficients (max {max_coefs})"
    )]
    Capacity {
        /// Knots the table would hold after registration.
        knots: usize,
        /// Knot arena size.
        max_knots: usize,
        /// Coefficients the table would hold after registration.
        coefs: usize,
        /// Coefficient arena size.
        max_coefs: usize,
    },

    /// I/O error reading a curve definition file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CurveError {
    /// Shorthand for a validation error.
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        CurveError::Validation(msg.into())
    }
}

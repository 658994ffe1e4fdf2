//! Crate-wide error taxonomy.
//!
//! Every fallible operation in `meos_core` returns a [`MeosResult`] rather
//! than panicking. Errors are never recoverable *inside* the core: they
//! carry enough context (operation name, short message) for an embedder to
//! report them to its own host mechanism, but the core itself never retries
//! or papers over a failed invariant check.

use std::error;
use std::fmt;

/// The kind of failure, matching the taxonomy of the MEOS core engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeosError {
    /// Malformed WKT: wrong keyword, missing bracket/paren, stray input.
    TextInput { op: &'static str, message: String },
    /// Operation requires a specific subtype or base type.
    InvalidArgType { op: &'static str, message: String },
    /// Non-increasing timestamps, incompatible bounds, empty input, etc.
    InvalidArgValue { op: &'static str, message: String },
    /// Two values (or a value and a geometry) have differing known SRIDs.
    SridMismatch { op: &'static str, lhs: i32, rhs: i32 },
    /// Mixing 2D with 3D, or geodetic with non-geodetic, where equality is required.
    DimensionMismatch { op: &'static str, message: String },
    /// Registry lookup failed for a base type that should exist.
    InternalTypeError { op: &'static str, message: String },
    /// A union that cannot be represented by a single contiguous box/span.
    ResultNotContiguous { op: &'static str, message: String },
}

impl MeosError {
    /// The operation name that raised this error, for embedder-side logging.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::TextInput { op, .. }
            | Self::InvalidArgType { op, .. }
            | Self::InvalidArgValue { op, .. }
            | Self::SridMismatch { op, .. }
            | Self::DimensionMismatch { op, .. }
            | Self::InternalTypeError { op, .. }
            | Self::ResultNotContiguous { op, .. } => op,
        }
    }

    pub(crate) fn text_input(op: &'static str, message: impl Into<String>) -> Self {
        Self::TextInput { op, message: message.into() }
    }

    pub(crate) fn invalid_arg_type(op: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgType { op, message: message.into() }
    }

    pub(crate) fn invalid_arg_value(op: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgValue { op, message: message.into() }
    }

    pub(crate) fn srid_mismatch(op: &'static str, lhs: i32, rhs: i32) -> Self {
        Self::SridMismatch { op, lhs, rhs }
    }

    pub(crate) fn dimension_mismatch(op: &'static str, message: impl Into<String>) -> Self {
        Self::DimensionMismatch { op, message: message.into() }
    }

    pub(crate) fn internal_type_error(op: &'static str, message: impl Into<String>) -> Self {
        Self::InternalTypeError { op, message: message.into() }
    }

    pub(crate) fn result_not_contiguous(op: &'static str, message: impl Into<String>) -> Self {
        Self::ResultNotContiguous { op, message: message.into() }
    }
}

impl fmt::Display for MeosError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TextInput { op, message } => write!(f, "{op}: malformed input: {message}"),
            Self::InvalidArgType { op, message } => write!(f, "{op}: invalid argument type: {message}"),
            Self::InvalidArgValue { op, message } => write!(f, "{op}: invalid argument value: {message}"),
            Self::SridMismatch { op, lhs, rhs } => {
                write!(f, "{op}: SRID mismatch ({lhs} vs {rhs})")
            }
            Self::DimensionMismatch { op, message } => write!(f, "{op}: dimension mismatch: {message}"),
            Self::InternalTypeError { op, message } => write!(f, "{op}: internal type error: {message}"),
            Self::ResultNotContiguous { op, message } => {
                write!(f, "{op}: result is not contiguous: {message}")
            }
        }
    }
}

impl error::Error for MeosError {}

/// The result type used throughout the core engine.
pub type MeosResult<T> = Result<T, MeosError>;

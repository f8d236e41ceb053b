//! Error type for analysis routines.

use ownaura_core::SignalError;
use thiserror::Error;

/// Errors that can occur in analysis routines.
///
/// Only precondition violations are errors. Numerical degeneracies such as
/// empty reference bins or flat decay curves are handled in place and
/// reported through `tracing` warnings.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An argument is outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two signals that must have equal length do not.
    #[error("length mismatch: {what} ({left} vs {right} samples)")]
    LengthMismatch {
        /// What was being compared.
        what: &'static str,
        /// Length of the first operand.
        left: usize,
        /// Length of the second operand.
        right: usize,
    },

    /// Two inputs were recorded or designed at different sample rates.
    #[error("sample rate mismatch: {what} ({left} Hz vs {right} Hz)")]
    SampleRateMismatch {
        /// What was being compared.
        what: &'static str,
        /// First sample rate.
        left: u32,
        /// Second sample rate.
        right: u32,
    },

    /// A multichannel input has the wrong number of channels.
    #[error("channel count mismatch: {what} (expected {expected}, found {found})")]
    ChannelCount {
        /// What was being checked.
        what: &'static str,
        /// Required channel count.
        expected: usize,
        /// Actual channel count.
        found: usize,
    },

    /// An input signal is empty.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// A data-model value could not be built.
    #[error(transparent)]
    Signal(#[from] SignalError),
}

/// Result alias for analysis routines.
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Shorthand for [`AnalysisError::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Fails with [`AnalysisError::LengthMismatch`] unless `left == right`.
pub(crate) fn ensure_same_len(what: &'static str, left: usize, right: usize) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(AnalysisError::LengthMismatch { what, left, right })
    }
}

/// Fails with [`AnalysisError::SampleRateMismatch`] unless `left == right`.
pub(crate) fn ensure_same_rate(what: &'static str, left: u32, right: u32) -> Result<()> {
    if left == right {
        Ok(())
    } else {
        Err(AnalysisError::SampleRateMismatch { what, left, right })
    }
}

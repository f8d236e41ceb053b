//! File I/O for the OwnAura measurement toolkit.
//!
//! This crate provides:
//!
//! - **Audio file I/O**: [`read_wav_channels`] reads multichannel WAV and
//!   AIFF recordings, [`write_wav_channels`] writes WAV filter banks
//! - **Response archives**: [`ResponseArchive`] for impulse responses and
//!   calibration filters stored as JSON
//! - **Tables**: [`read_early_reflections`] for simulation exports and
//!   [`Table`] for CSV results
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ownaura_io::{ResponseArchive, read_wav_channels, write_wav_channels};
//!
//! // Load a loudspeaker filter bank
//! let (bank, spec) = read_wav_channels("filters.wav")?;
//!
//! // Load a calibration filter
//! let filter = ResponseArchive::read("calibration_filter.json")?.to_filter()?;
//!
//! // Save the result as 32-bit float
//! write_wav_channels("filters_calibrated.wav", &bank, spec.sample_rate)?;
//! ```

mod aiff;
mod archive;
mod table;
mod wav;

pub use archive::ResponseArchive;
pub use table::{Table, format_value, parse_early_reflections, read_early_reflections};
pub use wav::{
    WavFormat, WavInfo, WavSpec, read_wav_channels, read_wav_info, write_wav_channels,
    write_wav_channels_with_spec,
};

/// Error types for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// AIFF decoding error.
    #[error("Decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    /// The file type is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Archive serialization error.
    #[error("Archive error: {0}")]
    Json(#[from] serde_json::Error),

    /// Archive content does not describe the requested value.
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// A text table could not be parsed.
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Loaded samples do not form a valid multichannel signal.
    #[error("Signal error: {0}")]
    Signal(#[from] ownaura_core::SignalError),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for file I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

//! JSON archives of impulse responses and calibration filters.
//!
//! One document format serves both artifacts:
//!
//! ```json
//! { "fs": 48000, "h": [[...], [...]], "n": 120, "x": [...], "docs": "..." }
//! ```
//!
//! `h` is channel-major. A calibration filter has exactly one channel and
//! carries the shift `n`; a measured response bank may carry the excitation
//! `x` it was measured with.

use crate::{Error, Result};
use ownaura_core::{CalibrationFilter, MultiChannel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const FILTER_DOCS: &str = "h: impulse response, n: samples to cut at beginning, fs: samplerate";

/// Numeric archive document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseArchive {
    /// Sample rate in Hz.
    pub fs: u32,
    /// Impulse responses, one per channel.
    pub h: Vec<Vec<f64>>,
    /// Samples to cut (positive) or pad (negative) after convolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<i64>,
    /// Excitation signal used for the measurement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<f64>>,
    /// Free-form description of the fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl ResponseArchive {
    /// Archive of a calibration filter.
    pub fn from_filter(filter: &CalibrationFilter) -> Self {
        Self {
            fs: filter.sample_rate,
            h: vec![filter.impulse_response.clone()],
            n: Some(filter.shift),
            x: None,
            docs: Some(FILTER_DOCS.to_string()),
        }
    }

    /// Archive of a response bank, optionally with its excitation.
    pub fn from_bank(bank: &MultiChannel, sample_rate: u32, excitation: Option<Vec<f64>>) -> Self {
        Self {
            fs: sample_rate,
            h: bank.channels().to_vec(),
            n: None,
            x: excitation,
            docs: None,
        }
    }

    /// The calibration filter stored in this archive. A missing shift reads
    /// as zero.
    pub fn to_filter(&self) -> Result<CalibrationFilter> {
        match self.h.as_slice() {
            [h] if !h.is_empty() => Ok(CalibrationFilter {
                impulse_response: h.clone(),
                shift: self.n.unwrap_or(0),
                sample_rate: self.fs,
            }),
            [_] => Err(Error::InvalidArchive(
                "calibration filter has no taps".to_string(),
            )),
            other => Err(Error::InvalidArchive(format!(
                "calibration filter needs one channel, found {}",
                other.len()
            ))),
        }
    }

    /// The response bank stored in this archive.
    pub fn to_bank(&self) -> Result<MultiChannel> {
        Ok(MultiChannel::new(self.h.clone())?)
    }

    /// Load an archive from a JSON file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let archive: Self = serde_json::from_str(&text)?;
        if archive.fs == 0 {
            return Err(Error::InvalidArchive(format!(
                "{} has a zero sample rate",
                path.display()
            )));
        }
        tracing::debug!(path = %path.display(), channels = archive.h.len(), "read archive");
        Ok(archive)
    }

    /// Save the archive as JSON.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = serde_json::to_string(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

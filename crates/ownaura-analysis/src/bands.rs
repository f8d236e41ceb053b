//! Frequency band definitions.
//!
//! Octave and third-octave bands use nominal centre frequencies with edges
//! at `c / 2^(1/2)`, `c · 2^(1/2)` (octave) and `c / 2^(1/6)`, `c · 2^(1/6)`
//! (third-octave). The fullband setting is a single 100 Hz to 8 kHz band.

use crate::error::{AnalysisError, Result};
use std::fmt;

/// Nominal octave band centres from 125 Hz to 8 kHz.
pub const OCTAVE_CENTERS: [f64; 7] = [125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0];

/// Nominal third-octave band centres from 125 Hz to 8 kHz.
pub const THIRD_OCTAVE_CENTERS: [f64; 19] = [
    125.0, 160.0, 200.0, 250.0, 315.0, 400.0, 500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0,
    2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0, 8000.0,
];

/// Octave centres used to band-average compensation gains. The outer
/// entries only delimit the 63 Hz and 8 kHz bands.
pub const CALIBRATION_CENTERS: [f64; 10] = [
    32.0, 63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// Lower edge of the fullband setting in Hz.
pub const FULLBAND_LOW: f64 = 100.0;
/// Upper edge of the fullband setting in Hz.
pub const FULLBAND_HIGH: f64 = 8000.0;

/// A frequency band with `low < center < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Centre frequency in Hz.
    pub center: f64,
    /// Lower edge in Hz.
    pub low: f64,
    /// Upper edge in Hz.
    pub high: f64,
}

impl Band {
    /// Band with edges `center / ratio` and `center · ratio`.
    pub fn around(center: f64, ratio: f64) -> Self {
        Self {
            center,
            low: center / ratio,
            high: center * ratio,
        }
    }
}

/// Band layout for per-band analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandSpec {
    /// Octave bands 125 Hz to 8 kHz.
    #[default]
    Octave,
    /// Third-octave bands 125 Hz to 8 kHz.
    Third,
    /// A single 100 Hz to 8 kHz band.
    Fullband,
}

impl BandSpec {
    /// The bands of this layout, in increasing frequency.
    pub fn bands(&self) -> Vec<Band> {
        match self {
            BandSpec::Octave => OCTAVE_CENTERS
                .iter()
                .map(|&c| Band::around(c, std::f64::consts::SQRT_2))
                .collect(),
            BandSpec::Third => THIRD_OCTAVE_CENTERS
                .iter()
                .map(|&c| Band::around(c, 2f64.powf(1.0 / 6.0)))
                .collect(),
            BandSpec::Fullband => vec![Band {
                center: (FULLBAND_LOW * FULLBAND_HIGH).sqrt(),
                low: FULLBAND_LOW,
                high: FULLBAND_HIGH,
            }],
        }
    }

    /// Column labels for result tables.
    pub fn labels(&self) -> Vec<String> {
        match self {
            BandSpec::Fullband => vec!["fullband".to_string()],
            _ => self
                .bands()
                .iter()
                .map(|b| format!("{}", b.center))
                .collect(),
        }
    }
}

impl fmt::Display for BandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BandSpec::Octave => "octave",
            BandSpec::Third => "third",
            BandSpec::Fullband => "fullband",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for BandSpec {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "octave" => Ok(BandSpec::Octave),
            "third" => Ok(BandSpec::Third),
            "fullband" => Ok(BandSpec::Fullband),
            other => Err(AnalysisError::invalid(format!(
                "unknown band specification '{other}' (expected octave, third or fullband)"
            ))),
        }
    }
}

/// Geometric midpoints `√(c_i · c_{i+1})` between consecutive centres.
pub fn geometric_midpoints(centers: &[f64]) -> Vec<f64> {
    centers.windows(2).map(|w| (w[0] * w[1]).sqrt()).collect()
}

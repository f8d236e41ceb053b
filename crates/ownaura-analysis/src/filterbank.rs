//! Band-pass filtering for per-band decay analysis.
//!
//! Each band is isolated with an 8th-order cascade: a 4th-order Butterworth
//! high-pass at the lower edge followed by a 4th-order Butterworth low-pass at
//! the upper edge, each built from two RBJ second-order sections.
//!
//! # Example
//!
//! ```rust
//! use ownaura_analysis::bands::BandSpec;
//! use ownaura_analysis::filterbank::BandpassFilter;
//!
//! let band = BandSpec::Octave.bands()[3];
//! let mut filter = BandpassFilter::new(48000.0, band);
//! let filtered = filter.filter(&vec![0.0; 480]);
//! assert_eq!(filtered.len(), 480);
//! ```

use crate::bands::Band;
use ownaura_core::biquad::{Biquad, butterworth_q, highpass_coefficients, lowpass_coefficients};

/// Order of each high-pass and low-pass half of the band-pass.
const HALF_ORDER: usize = 4;

/// Band-pass built from cascaded Butterworth high-pass and low-pass sections.
///
/// A low-pass edge at or above Nyquist is dropped, leaving a high-pass only.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    highpass: Vec<Biquad>,
    lowpass: Vec<Biquad>,
    band: Band,
}

impl BandpassFilter {
    /// Create a new band-pass filter for `band` at `sample_rate`.
    pub fn new(sample_rate: f64, band: Band) -> Self {
        let nyquist = sample_rate / 2.0;
        let sections = HALF_ORDER / 2;

        let highpass = (0..sections)
            .map(|k| {
                Biquad::from_coefficients(highpass_coefficients(
                    band.low,
                    butterworth_q(HALF_ORDER, k),
                    sample_rate,
                ))
            })
            .collect();

        let lowpass = if band.high < nyquist {
            (0..sections)
                .map(|k| {
                    Biquad::from_coefficients(lowpass_coefficients(
                        band.high,
                        butterworth_q(HALF_ORDER, k),
                        sample_rate,
                    ))
                })
                .collect()
        } else {
            tracing::debug!(high = band.high, nyquist, "band edge above Nyquist, high-pass only");
            Vec::new()
        };

        Self {
            highpass,
            lowpass,
            band,
        }
    }

    /// The band this filter passes.
    pub fn band(&self) -> Band {
        self.band
    }

    /// Process a single sample through the cascade.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let mut sample = input;
        for hp in &mut self.highpass {
            sample = hp.process(sample);
        }
        for lp in &mut self.lowpass {
            sample = lp.process(sample);
        }
        sample
    }

    /// Reset the filter state.
    pub fn reset(&mut self) {
        for section in self.highpass.iter_mut().chain(self.lowpass.iter_mut()) {
            section.clear();
        }
    }

    /// Filter a whole signal from a cleared state.
    pub fn filter(&mut self, signal: &[f64]) -> Vec<f64> {
        self.reset();
        signal.iter().map(|&s| self.process(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::BandSpec;
    use std::f64::consts::PI;

    fn tone_gain_db(band: Band, freq: f64) -> f64 {
        let fs = 48000.0;
        let n = 48000;
        let x: Vec<f64> = (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect();
        let y = BandpassFilter::new(fs, band).filter(&x);
        let rms = |s: &[f64]| (s.iter().map(|v| v * v).sum::<f64>() / s.len() as f64).sqrt();
        20.0 * (rms(&y[n / 2..]) / rms(&x[n / 2..])).log10()
    }

    #[test]
    fn test_passband_and_stopband() {
        let band = BandSpec::Octave.bands()[3]; // 1 kHz
        assert!(tone_gain_db(band, 1000.0).abs() < 1.0);
        assert!(tone_gain_db(band, 125.0) < -40.0);
        assert!(tone_gain_db(band, 8000.0) < -40.0);
    }

    #[test]
    fn test_edge_attenuation_near_3db() {
        let band = BandSpec::Octave.bands()[3];
        let g = tone_gain_db(band, band.low);
        assert!((-4.5..=-2.0).contains(&g), "edge gain {}", g);
    }

    #[test]
    fn test_high_edge_above_nyquist_is_highpass() {
        let band = BandSpec::Octave.bands()[6]; // 8 kHz, upper edge 11.3 kHz
        let mut filter = BandpassFilter::new(16000.0, band);
        assert!(filter.lowpass.is_empty());
        let out = filter.filter(&vec![1.0; 1000]);
        assert!(out.iter().all(|v| v.is_finite()));
    }
}

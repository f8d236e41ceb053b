//! Sound pressure calibration.
//!
//! A calibrator produces a tone of known level (94 dB SPL) at the
//! measurement microphone. The peak of the flat-top windowed amplitude
//! spectrum of that recording gives the gain that turns raw samples into
//! pascals. Headset recordings are then mapped to the measurement position
//! with the headset-to-microphone response.

use crate::conv::fir_filter;
use crate::error::{AnalysisError, Result};
use crate::fft::{Fft, Window};
use ownaura_core::{P_REF, power_to_db};
use rustfft::num_complex::Complex;

/// Nominal calibrator level in dB SPL.
pub const CALIBRATOR_LEVEL_DB: f64 = 94.0;

/// Equivalent continuous level `10·log10(mean(x²) / p_ref²)` of a pressure
/// signal in pascals.
///
/// # Errors
///
/// Fails on an empty signal.
pub fn average_sound_pressure_level(x: &[f64]) -> Result<f64> {
    if x.is_empty() {
        return Err(AnalysisError::EmptyInput("pressure signal"));
    }
    let mean_square = x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64;
    Ok(power_to_db(mean_square / (P_REF * P_REF)))
}

/// One-sided amplitude spectrum that preserves sinusoid amplitudes.
///
/// The spectrum is divided by the length and every bin except DC (and
/// Nyquist for even lengths) is doubled.
pub fn amplitude_spectrum(x: &[f64]) -> Vec<Complex<f64>> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }
    let mut spectrum = Fft::new(n).forward(x);
    let last = spectrum.len() - 1;
    for (k, c) in spectrum.iter_mut().enumerate() {
        *c /= n as f64;
        let single = k == 0 || (n % 2 == 0 && k == last);
        if !single {
            *c *= 2.0;
        }
    }
    spectrum
}

/// Gain that scales the calibrator recording to a peak of `level_db` SPL.
///
/// # Errors
///
/// Fails on an empty or silent recording.
pub fn calibrator_gain(recording: &[f64], level_db: f64) -> Result<f64> {
    if recording.is_empty() {
        return Err(AnalysisError::EmptyInput("calibrator recording"));
    }
    let window = Window::Flattop.symmetric(recording.len());
    let mean = window.iter().sum::<f64>() / window.len() as f64;
    let windowed: Vec<f64> = recording
        .iter()
        .zip(&window)
        .map(|(x, w)| x * w / mean)
        .collect();

    let measured = amplitude_spectrum(&windowed)
        .iter()
        .map(|c| c.norm())
        .fold(0.0, f64::max);
    if measured == 0.0 {
        return Err(AnalysisError::invalid("calibrator recording is silent"));
    }

    let pressure = 10f64.powf(level_db / 20.0) * P_REF * std::f64::consts::SQRT_2;
    let gain = pressure / measured;
    tracing::debug!(gain, measured, "calibrator gain");
    Ok(gain)
}

/// Sound pressure at the measurement position from a headset recording:
/// scale by `gain`, then filter with `headset_response`. The output has the
/// input's length.
pub fn headset_to_sound_pressure(x: &[f64], gain: f64, headset_response: &[f64]) -> Vec<f64> {
    let scaled: Vec<f64> = x.iter().map(|v| v * gain).collect();
    fir_filter(headset_response, &scaled)
}

/// Calibration of a two-microphone recording setup.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundPressureCalibration {
    /// Calibrator gain of the measurement microphone.
    pub gain: f64,
    /// Response from the headset to the measurement microphone.
    pub headset_response: Vec<f64>,
}

impl SoundPressureCalibration {
    /// Measurement microphone samples in pascals.
    pub fn measurement_mic(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|v| v * self.gain).collect()
    }

    /// Headset samples mapped to pascals at the measurement microphone.
    pub fn headset(&self, x: &[f64]) -> Vec<f64> {
        headset_to_sound_pressure(x, self.gain, &self.headset_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(amplitude: f64, freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| amplitude * (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn test_94_db_reference() {
        let x = sine(1.4175715661678836, 1000.0, 48000.0, 48000);
        let level = average_sound_pressure_level(&x).unwrap();
        assert!((level - 94.0).abs() < 1e-3, "{level}");
    }

    #[test]
    fn test_level_of_sinusoid() {
        let a = 0.3;
        let x = sine(a, 500.0, 48000.0, 4800);
        let expected = 20.0 * (a / 2f64.sqrt() / P_REF).log10();
        assert!((average_sound_pressure_level(&x).unwrap() - expected).abs() < 1e-9);
        assert!(average_sound_pressure_level(&[]).is_err());
    }

    #[test]
    fn test_amplitude_spectrum_preserves_amplitude() {
        let x = sine(0.7, 1000.0, 48000.0, 480);
        let spectrum = amplitude_spectrum(&x);
        assert_eq!(spectrum.len(), 241);
        assert!((spectrum[10].norm() - 0.7).abs() < 1e-9);

        let dc = amplitude_spectrum(&[2.0; 7]);
        assert_eq!(dc.len(), 4);
        assert!((dc[0].re - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_calibrator_gain_scales_to_level() {
        let raw = sine(0.05, 1000.0, 48000.0, 48000);
        let gain = calibrator_gain(&raw, CALIBRATOR_LEVEL_DB).unwrap();
        let expected = 10f64.powf(94.0 / 20.0) * P_REF * 2f64.sqrt() / 0.05;
        assert!((gain / expected - 1.0).abs() < 1e-3, "{gain} vs {expected}");

        let calibrated: Vec<f64> = raw.iter().map(|v| v * gain).collect();
        let level = average_sound_pressure_level(&calibrated).unwrap();
        assert!((level - 94.0).abs() < 0.01);
    }

    #[test]
    fn test_calibrator_gain_rejects_silence() {
        assert!(calibrator_gain(&[0.0; 100], 94.0).is_err());
        assert!(calibrator_gain(&[], 94.0).is_err());
    }

    #[test]
    fn test_headset_to_sound_pressure() {
        let x = [1.0, 0.0, 0.0, 2.0];
        let y = headset_to_sound_pressure(&x, 2.0, &[0.0, 0.5]);
        assert_eq!(y, vec![0.0, 1.0, 0.0, 0.0]);

        let cal = SoundPressureCalibration {
            gain: 3.0,
            headset_response: vec![1.0],
        };
        assert_eq!(cal.measurement_mic(&[1.0, -1.0]), vec![3.0, -3.0]);
        assert_eq!(cal.headset(&[1.0, -1.0]), vec![3.0, -3.0]);
    }
}

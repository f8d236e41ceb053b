//! Second-order IIR sections for the band-pass cascades.
//!
//! Coefficients follow the RBJ Audio EQ Cookbook and are evaluated in `f64`
//! so that low band edges at 48 kHz stay well conditioned.

use core::f64::consts::PI;
use libm::{cos, sin};

/// Unnormalised `(b0, b1, b2, a0, a1, a2)`.
pub type Coefficients = (f64, f64, f64, f64, f64, f64);

/// One Direct Form I section with its history.
///
/// ```text
/// y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]
/// ```
///
/// Coefficients are stored divided by `a0`.
#[derive(Debug, Clone)]
pub struct Biquad {
    b: [f64; 3],
    a: [f64; 2],
    // x[n-1], x[n-2]
    x: [f64; 2],
    // y[n-1], y[n-2]
    y: [f64; 2],
}

impl Biquad {
    /// Identity section.
    pub fn new() -> Self {
        Self {
            b: [1.0, 0.0, 0.0],
            a: [0.0, 0.0],
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    /// Section from cookbook coefficients, normalised by `a0`.
    pub fn from_coefficients(coefficients: Coefficients) -> Self {
        let (b0, b1, b2, a0, a1, a2) = coefficients;
        let norm = 1.0 / a0;
        Self {
            b: [b0 * norm, b1 * norm, b2 * norm],
            a: [a1 * norm, a2 * norm],
            ..Self::new()
        }
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let [b0, b1, b2] = self.b;
        let [a1, a2] = self.a;
        let output = b0 * input + b1 * self.x[0] + b2 * self.x[1] - a1 * self.y[0] - a2 * self.y[1];

        self.x = [input, self.x[0]];
        self.y = [output, self.y[0]];
        output
    }

    /// Zeroes the history.
    pub fn clear(&mut self) {
        self.x = [0.0; 2];
        self.y = [0.0; 2];
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Q factor of section `k` in an even-order Butterworth cascade.
///
/// An order-`n` Butterworth filter factors into `n / 2` second-order sections
/// with `Q_k = 1 / (2 sin((2k + 1) π / (2n)))`. For `n = 4` this gives
/// 1.3066 and 0.5412.
pub fn butterworth_q(order: usize, k: usize) -> f64 {
    let n = order as f64;
    1.0 / (2.0 * sin((2.0 * k as f64 + 1.0) * PI / (2.0 * n)))
}

/// `(cos ω, α)` at `frequency` for a section of quality `q`.
fn warp(frequency: f64, q: f64, sample_rate: f64) -> (f64, f64) {
    let omega = 2.0 * PI * frequency / sample_rate;
    (cos(omega), sin(omega) / (2.0 * q))
}

/// Low-pass section with cutoff `frequency` Hz.
pub fn lowpass_coefficients(frequency: f64, q: f64, sample_rate: f64) -> Coefficients {
    let (c, alpha) = warp(frequency, q, sample_rate);
    let edge = (1.0 - c) / 2.0;
    (edge, 1.0 - c, edge, 1.0 + alpha, -2.0 * c, 1.0 - alpha)
}

/// High-pass section with cutoff `frequency` Hz.
pub fn highpass_coefficients(frequency: f64, q: f64, sample_rate: f64) -> Coefficients {
    let (c, alpha) = warp(frequency, q, sample_rate);
    let edge = (1.0 + c) / 2.0;
    (edge, -(1.0 + c), edge, 1.0 + alpha, -2.0 * c, 1.0 - alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_section() {
        let mut section = Biquad::new();
        for &input in &[0.0, 1.0, -1.0, 0.5, -0.5] {
            assert!((section.process(input) - input).abs() < 1e-12);
        }
    }

    #[test]
    fn test_clear_resets_history() {
        let mut section = Biquad::from_coefficients(lowpass_coefficients(1000.0, 0.707, 48000.0));
        let first = section.process(1.0);
        section.process(0.5);
        section.clear();
        assert_eq!(section.x, [0.0; 2]);
        assert_eq!(section.y, [0.0; 2]);
        assert_eq!(section.process(1.0), first);
    }

    #[test]
    fn test_lowpass_unity_at_dc() {
        let mut section = Biquad::from_coefficients(lowpass_coefficients(1000.0, 0.707, 48000.0));
        let settled = (0..2000).map(|_| section.process(1.0)).last().unwrap_or(0.0);
        assert!((settled - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_highpass_rejects_dc() {
        let mut section = Biquad::from_coefficients(highpass_coefficients(100.0, 0.707, 48000.0));
        let settled = (0..48000).map(|_| section.process(1.0)).last().unwrap_or(1.0);
        assert!(settled.abs() < 1e-6, "DC leaked: {settled}");
    }

    #[test]
    fn test_butterworth_q_fourth_order() {
        assert!((butterworth_q(4, 0) - 1.306563).abs() < 1e-5);
        assert!((butterworth_q(4, 1) - 0.541196).abs() < 1e-5);
        assert!((butterworth_q(2, 0) - core::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }
}

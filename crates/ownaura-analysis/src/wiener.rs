//! Optimal (Wiener) filter between two recorded signals
//!
//! Estimates the FIR filter `h` of length `n` that best maps a reference `x`
//! onto a disturbance `y` in the least-squares sense, from Welch estimates of
//! the cross spectrum `Sxy` and the regularised auto spectrum `Sxx + reg`
//! (Elliott, *Signal Processing for Active Control*, eq. 3.3.26).
//!
//! The unconstrained solution is `h = Re(IFFT(Sxy / Sxx))`, which may be
//! non-causal. The causally constrained solution factors `Sxx = F·conj(F)`
//! with a minimum-phase spectral factor obtained through the cepstrum,
//!
//! ```text
//! F = exp(FFT(c · IFFT(ln Sxx)))      c = [½, 1, …, 1, ½ (even n), 0, …, 0]
//! h = Re(IFFT( FFT(u · IFFT(Sxy / conj F)) / F ))      u = [1, …, 1, 0, …, 0]
//! ```
//!
//! where `u` keeps the causal half.

use crate::error::{AnalysisError, Result, ensure_same_len};
use crate::fft::{fft, ifft};
use crate::spectrum::{Sides, csd, welch_psd};
use rustfft::num_complex::Complex;

/// Parameters of a Wiener filter estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WienerSettings {
    /// Filter length, also the Welch segment length.
    pub window_length: usize,
    /// Value added to the auto spectrum before division.
    pub regularization: f64,
    /// Restrict the filter to its causal part.
    pub constrained: bool,
}

impl Default for WienerSettings {
    fn default() -> Self {
        Self {
            window_length: 512,
            regularization: 1e-14,
            constrained: true,
        }
    }
}

/// Wiener filter of length `settings.window_length` from `x` to `y`.
///
/// # Errors
///
/// `x` and `y` must have equal length of at least `window_length`, and
/// `window_length` must be positive. A negative regularisation is rejected.
pub fn wiener_filter(
    x: &[f64],
    y: &[f64],
    sample_rate: f64,
    settings: &WienerSettings,
) -> Result<Vec<f64>> {
    let n = settings.window_length;
    ensure_same_len("wiener filter inputs", x.len(), y.len())?;
    if n == 0 {
        return Err(AnalysisError::invalid("wiener filter length must be positive"));
    }
    if n > x.len() {
        return Err(AnalysisError::invalid(format!(
            "wiener filter length {n} exceeds signal length {}",
            x.len()
        )));
    }
    if settings.regularization < 0.0 {
        return Err(AnalysisError::invalid("regularisation must not be negative"));
    }

    let sxy = csd(x, y, sample_rate, n, Sides::TwoSided)?.values;
    let mut sxx = welch_psd(x, sample_rate, n, Sides::TwoSided)?.values;
    for s in sxx.iter_mut() {
        *s += settings.regularization;
    }

    if !settings.constrained {
        let ratio: Vec<Complex<f64>> = sxy.iter().zip(&sxx).map(|(a, b)| a / b).collect();
        return Ok(ifft(&ratio, n).iter().map(|c| c.re).collect());
    }

    let mut floored = 0usize;
    let log_sxx: Vec<Complex<f64>> = sxx
        .iter()
        .map(|&s| {
            let s = if s > 0.0 {
                s
            } else {
                floored += 1;
                f64::MIN_POSITIVE
            };
            Complex::new(s.ln(), 0.0)
        })
        .collect();
    if floored > 0 {
        tracing::warn!(
            bins = floored,
            "auto spectrum has empty bins, flooring before spectral factorisation"
        );
    }

    let factor = spectral_factor(&log_sxx, n);

    let mut causal = vec![0.0; n];
    causal[..n / 2].fill(1.0);

    let whitened: Vec<Complex<f64>> = sxy
        .iter()
        .zip(&factor)
        .map(|(s, f)| s / f.conj())
        .collect();
    let projected: Vec<Complex<f64>> = ifft(&whitened, n)
        .iter()
        .zip(&causal)
        .map(|(v, u)| v * u)
        .collect();
    let shaped: Vec<Complex<f64>> = fft(&projected, n)
        .iter()
        .zip(&factor)
        .map(|(v, f)| v / f)
        .collect();

    Ok(ifft(&shaped, n).iter().map(|c| c.re).collect())
}

/// Minimum-phase spectral factor `exp(FFT(c · IFFT(ln S)))`.
fn spectral_factor(log_spectrum: &[Complex<f64>], n: usize) -> Vec<Complex<f64>> {
    let mut c = vec![0.0; n];
    c[..n / 2].fill(1.0);
    c[0] = 0.5;
    if n % 2 == 0 {
        c[n / 2] = 0.5;
    }

    let cepstrum: Vec<Complex<f64>> = ifft(log_spectrum, n)
        .iter()
        .zip(&c)
        .map(|(v, w)| v * w)
        .collect();
    fft(&cepstrum, n).iter().map(|v| v.exp()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::convolve;
    use crate::sweep::white_noise;

    fn filtered(x: &[f64], h: &[f64]) -> Vec<f64> {
        let mut y = convolve(x, h);
        y.truncate(x.len());
        y
    }

    #[test]
    fn test_unconstrained_recovers_fir() {
        let x = white_noise(1 << 16, 1.0, 21);
        let h = [0.0, 0.8, -0.3, 0.1];
        let y = filtered(&x, &h);
        let settings = WienerSettings {
            window_length: 256,
            regularization: 0.0,
            constrained: false,
        };
        let est = wiener_filter(&x, &y, 48000.0, &settings).unwrap();
        assert_eq!(est.len(), 256);
        for (i, &t) in h.iter().enumerate() {
            assert!((est[i] - t).abs() < 0.03, "tap {}: {} vs {}", i, est[i], t);
        }
    }

    #[test]
    fn test_constrained_recovers_causal_fir() {
        let x = white_noise(1 << 16, 1.0, 5);
        let h = [0.5, 0.25, 0.0, -0.2];
        let y = filtered(&x, &h);
        let settings = WienerSettings {
            window_length: 128,
            regularization: 1e-14,
            constrained: true,
        };
        let est = wiener_filter(&x, &y, 48000.0, &settings).unwrap();
        for (i, &t) in h.iter().enumerate() {
            assert!((est[i] - t).abs() < 0.03, "tap {}: {} vs {}", i, est[i], t);
        }
        // nothing in the non-causal half
        let tail_energy: f64 = est[64..].iter().map(|v| v * v).sum();
        assert!(tail_energy < 1e-3, "tail energy {}", tail_energy);
    }

    #[test]
    fn test_spectral_factor_magnitude() {
        // |F|² must reproduce the spectrum
        let n = 16;
        let s: Vec<f64> = (0..n)
            .map(|k| {
                let w = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
                1.25 + w.cos()
            })
            .collect();
        let log_s: Vec<Complex<f64>> = s.iter().map(|v| Complex::new(v.ln(), 0.0)).collect();
        let f = spectral_factor(&log_s, n);
        for (fk, sk) in f.iter().zip(&s) {
            assert!((fk.norm_sqr() - sk).abs() < 1e-9, "{} vs {}", fk.norm_sqr(), sk);
        }
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let x = vec![0.0; 100];
        let settings = WienerSettings {
            window_length: 200,
            ..WienerSettings::default()
        };
        assert!(wiener_filter(&x, &x, 48000.0, &settings).is_err());
        assert!(wiener_filter(&x, &x[..50], 48000.0, &WienerSettings::default()).is_err());
    }
}

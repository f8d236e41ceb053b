//! Welch spectral density estimates and magnitude-squared coherence
//!
//! Each signal is split into segments of `nperseg` samples with 50 % overlap.
//! Every segment has its mean removed, is multiplied by a periodic Hann
//! window and transformed; the per-segment products are averaged:
//!
//! ```text
//! Pxy(f) = mean_s[ conj(X_s(f)) · Y_s(f) ] / (fs · Σ w²)
//! ```
//!
//! The result is a power spectral *density* (units²/Hz). One-sided output
//! doubles every bin except DC and (for even `nperseg`) Nyquist. Two-sided
//! output keeps all `nperseg` bins in FFT order, which is what the Wiener
//! filter needs.
//!
//! Coherence is `|Pxy|² / (Pxx · Pyy)`, bounded to `[0, 1]`: 1 where `y` is a
//! linear function of `x` at that frequency.

use crate::error::{AnalysisError, Result, ensure_same_len};
use crate::fft::{Fft, Window};
use rustfft::num_complex::Complex;

/// Which half of the spectrum to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sides {
    /// DC to Nyquist, `nperseg / 2 + 1` bins, non-edge bins doubled.
    #[default]
    OneSided,
    /// All `nperseg` bins in FFT order (negative frequencies last).
    TwoSided,
}

/// Spectral estimate with its bin frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum<T> {
    /// Bin frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// Estimate per bin.
    pub values: Vec<T>,
}

/// Welch power spectral density of `x`.
pub fn welch_psd(x: &[f64], sample_rate: f64, nperseg: usize, sides: Sides) -> Result<Spectrum<f64>> {
    let cross = csd(x, x, sample_rate, nperseg, sides)?;
    Ok(Spectrum {
        frequencies: cross.frequencies,
        values: cross.values.iter().map(|c| c.re).collect(),
    })
}

/// Welch cross spectral density `conj(X)·Y` of `x` and `y`.
///
/// `nperseg` is clamped to the signal length.
///
/// # Errors
///
/// Signals must have equal, non-zero length and `nperseg` must be positive.
pub fn csd(
    x: &[f64],
    y: &[f64],
    sample_rate: f64,
    nperseg: usize,
    sides: Sides,
) -> Result<Spectrum<Complex<f64>>> {
    ensure_same_len("cross spectral density inputs", x.len(), y.len())?;
    if x.is_empty() {
        return Err(AnalysisError::EmptyInput("spectral density input"));
    }
    if nperseg == 0 {
        return Err(AnalysisError::invalid("segment length must be positive"));
    }
    if nperseg > x.len() {
        tracing::debug!(nperseg, len = x.len(), "segment length clamped to signal length");
    }
    let nperseg = nperseg.min(x.len());

    let full = averaged_cross_spectrum(x, y, sample_rate, nperseg);

    Ok(match sides {
        Sides::TwoSided => Spectrum {
            frequencies: two_sided_frequencies(nperseg, sample_rate),
            values: full,
        },
        Sides::OneSided => {
            let n_freq = nperseg / 2 + 1;
            let values = full
                .into_iter()
                .take(n_freq)
                .enumerate()
                .map(|(k, v)| {
                    let edge = k == 0 || (nperseg % 2 == 0 && k == nperseg / 2);
                    if edge { v } else { v * 2.0 }
                })
                .collect();
            Spectrum {
                frequencies: crate::fft::rfft_frequencies(nperseg, sample_rate),
                values,
            }
        }
    })
}

/// Magnitude-squared coherence of `x` and `y` (one-sided).
pub fn coherence(x: &[f64], y: &[f64], sample_rate: f64, nperseg: usize) -> Result<Spectrum<f64>> {
    let pxy = csd(x, y, sample_rate, nperseg, Sides::OneSided)?;
    let pxx = welch_psd(x, sample_rate, nperseg, Sides::OneSided)?;
    let pyy = welch_psd(y, sample_rate, nperseg, Sides::OneSided)?;

    let values = pxy
        .values
        .iter()
        .zip(pxx.values.iter().zip(&pyy.values))
        .map(|(sxy, (sxx, syy))| {
            let denom = sxx * syy;
            if denom > 0.0 {
                (sxy.norm_sqr() / denom).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect();

    Ok(Spectrum {
        frequencies: pxy.frequencies,
        values,
    })
}

fn segment_starts(len: usize, nperseg: usize) -> Vec<usize> {
    let step = (nperseg - nperseg / 2).max(1);
    let count = (len - nperseg) / step + 1;
    (0..count).map(|i| i * step).collect()
}

fn detrended_windowed(segment: &[f64], window: &[f64]) -> Vec<f64> {
    let mean = segment.iter().sum::<f64>() / segment.len() as f64;
    segment
        .iter()
        .zip(window)
        .map(|(s, w)| (s - mean) * w)
        .collect()
}

/// Mean of `conj(X)·Y` over segments, scaled to a two-sided density.
fn averaged_cross_spectrum(
    x: &[f64],
    y: &[f64],
    sample_rate: f64,
    nperseg: usize,
) -> Vec<Complex<f64>> {
    let window = Window::Hann.periodic(nperseg);
    let scale = 1.0 / (sample_rate * window.iter().map(|w| w * w).sum::<f64>());
    let fft = Fft::new(nperseg);
    let starts = segment_starts(x.len(), nperseg);

    let mut accum = vec![Complex::new(0.0, 0.0); nperseg];
    for &start in &starts {
        let sx = detrended_windowed(&x[start..start + nperseg], &window);
        let xs = fft.forward_full(&sx);
        if std::ptr::eq(x, y) {
            for (a, xk) in accum.iter_mut().zip(&xs) {
                *a += xk.norm_sqr();
            }
        } else {
            let sy = detrended_windowed(&y[start..start + nperseg], &window);
            let ys = fft.forward_full(&sy);
            for (a, (xk, yk)) in accum.iter_mut().zip(xs.iter().zip(&ys)) {
                *a += xk.conj() * yk;
            }
        }
    }

    let norm = scale / starts.len() as f64;
    accum.iter().map(|a| a * norm).collect()
}

fn two_sided_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    (0..n)
        .map(|k| {
            let signed = if k < n.div_ceil(2) {
                k as f64
            } else {
                k as f64 - n as f64
            };
            signed * sample_rate / n as f64
        })
        .collect()
}

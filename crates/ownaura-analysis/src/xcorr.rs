//! Cross-correlation, delay estimation and time alignment
//!
//! The full cross-correlation of `y` against `x` is
//!
//! ```text
//! R(τ) = Σ_l y[l] · x[l − τ]        τ ∈ [1 − len(x), len(y) − 1]
//! ```
//!
//! It peaks at `τ = d` when `y[n] ≈ x[n − d]`, i.e. when `y` lags `x` by `d`
//! samples. It is computed as the convolution of `y` with the time-reversed
//! `x`, which goes through the FFT for long signals.
//!
//! [`time_align`] uses the peak lag to shift the earlier signal forward and
//! zero-pads the other so both come out with the same length.

use crate::conv::convolve;
use crate::error::{AnalysisError, Result, ensure_same_len};
use crate::spectrum::{Spectrum, coherence};

/// Full cross-correlation of `y` against `x`.
///
/// Entry `k` holds `R(τ)` for `τ = k − (len(x) − 1)`. The output has
/// `len(x) + len(y) − 1` entries, or none if either input is empty.
pub fn correlate_full(y: &[f64], x: &[f64]) -> Vec<f64> {
    let reversed: Vec<f64> = x.iter().rev().copied().collect();
    convolve(y, &reversed)
}

/// Two signals brought into alignment, plus the delay that was removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// First signal, delayed or zero-padded.
    pub x: Vec<f64>,
    /// Second signal, delayed or zero-padded.
    pub y: Vec<f64>,
    /// Estimated lag of `y` behind `x` in seconds.
    pub delay_seconds: f64,
    /// Estimated lag of `y` behind `x` in samples.
    pub delay_samples: i64,
}

/// Estimate the delay between `x` and `y` and align them.
///
/// The delay is the lag maximising [`correlate_full`]`(y, x)`, restricted to
/// `search_range` (inclusive, in seconds) when given. On ties the earliest
/// lag wins. A non-negative delay means `y` lags `x`: `x` gets that many
/// leading zeros and `y` is zero-padded at the end to the same length.
/// A negative delay swaps the roles.
///
/// # Errors
///
/// The signals must have equal, non-zero length, and the search range must
/// contain at least one lag.
pub fn time_align(
    x: &[f64],
    y: &[f64],
    sample_rate: f64,
    search_range: Option<(f64, f64)>,
) -> Result<Alignment> {
    ensure_same_len("signals to align", x.len(), y.len())?;
    if x.is_empty() {
        return Err(AnalysisError::EmptyInput("signals to align"));
    }
    let n = x.len() as i64;
    let xcorr = correlate_full(y, x);

    let mut best: Option<(i64, f64)> = None;
    for (k, &r) in xcorr.iter().enumerate() {
        let lag = k as i64 - (n - 1);
        if let Some((lo, hi)) = search_range {
            let t = lag as f64 / sample_rate;
            if t < lo || t > hi {
                continue;
            }
        }
        if best.is_none_or(|(_, b)| r > b) {
            best = Some((lag, r));
        }
    }
    let (lag, _) = best.ok_or_else(|| {
        AnalysisError::invalid(format!("search range {search_range:?} contains no lag"))
    })?;

    let (x, y) = if lag >= 0 {
        let x = delayed(x, lag as usize);
        let y = padded(y, x.len());
        (x, y)
    } else {
        let y = delayed(y, lag.unsigned_abs() as usize);
        let x = padded(x, y.len());
        (x, y)
    };

    tracing::debug!(lag, "time aligned signals");
    Ok(Alignment {
        x,
        y,
        delay_seconds: lag as f64 / sample_rate,
        delay_samples: lag,
    })
}

fn delayed(signal: &[f64], samples: usize) -> Vec<f64> {
    let mut out = vec![0.0; samples];
    out.extend_from_slice(signal);
    out
}

fn padded(signal: &[f64], len: usize) -> Vec<f64> {
    let mut out = signal.to_vec();
    out.resize(len.max(signal.len()), 0.0);
    out
}

/// Lag in samples by which `delayed` trails `reference`.
///
/// The shorter signal is zero-padded to the longer one's length first.
/// Positive when `delayed` arrives later.
pub fn delay_between(reference: &[f64], delayed: &[f64]) -> Result<i64> {
    let len = reference.len().max(delayed.len());
    if len == 0 {
        return Err(AnalysisError::EmptyInput("signals to compare"));
    }
    let reference = padded(reference, len);
    let delayed = padded(delayed, len);
    Ok(time_align(&reference, &delayed, 1.0, None)?.delay_samples)
}

/// Magnitude-squared coherence of `x` and `y`, optionally after removing
/// their relative delay with [`time_align`].
pub fn coherence_aligned(
    x: &[f64],
    y: &[f64],
    sample_rate: f64,
    nperseg: usize,
    compensate_delay: bool,
) -> Result<Spectrum<f64>> {
    ensure_same_len("coherence inputs", x.len(), y.len())?;
    if compensate_delay {
        let aligned = time_align(x, y, sample_rate, None)?;
        coherence(&aligned.x, &aligned.y, sample_rate, nperseg)
    } else {
        coherence(x, y, sample_rate, nperseg)
    }
}

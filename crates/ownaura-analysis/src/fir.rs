//! Linear-phase FIR design and minimum-phase conversion.
//!
//! - [`firls`]: least-squares fit of piecewise-linear band gains. Solves
//!   `Q·a = b`, where `Q` is a Toeplitz-plus-Hankel matrix of band-integrated
//!   sincs, and mirrors `a` into a symmetric (type I) impulse response.
//! - [`firwin2`]: frequency sampling. Gains are interpolated on a uniform grid
//!   of `1 + 2^ceil(log2 N)` points from DC to Nyquist, phase-shifted by
//!   `(N − 1)/2` samples, inverse transformed and windowed with a symmetric
//!   Hamming window.
//! - [`minimum_phase`]: homomorphic conversion. The result has about half
//!   the length of the input and a magnitude close to the square root of the
//!   input magnitude.

use crate::error::{AnalysisError, Result};
use crate::fft::{Fft, Window};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be non-decreasing. Points outside `xp` take the nearest end
/// value.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // first index with xp[i] > x
    let i = xp[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xp[i - 1], xp[i]);
    let (f0, f1) = (fp[i - 1], fp[i]);
    if x1 == x0 {
        return f1;
    }
    f0 + (x - x0) * (f1 - f0) / (x1 - x0)
}

/// Normalised sinc, `sin(πx)/(πx)`.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

fn check_odd_taps(numtaps: usize) -> Result<()> {
    if numtaps == 0 || numtaps % 2 == 0 {
        return Err(AnalysisError::invalid(format!(
            "number of taps must be odd and positive, got {numtaps}"
        )));
    }
    Ok(())
}

/// Least-squares linear-phase FIR filter.
///
/// `bands` holds band edges in Hz as consecutive `(start, end)` pairs
/// (flattened, even length, non-decreasing, within `[0, fs/2]`), and
/// `desired` the gain at each edge. Inside a band the desired gain is
/// linear between its edges. All bands have unit weight.
///
/// # Errors
///
/// `numtaps` must be odd, `bands` and `desired` must have the same even
/// length, and the normal equations must be solvable.
pub fn firls(numtaps: usize, bands: &[f64], desired: &[f64], sample_rate: f64) -> Result<Vec<f64>> {
    check_odd_taps(numtaps)?;
    if bands.is_empty() || bands.len() % 2 != 0 {
        return Err(AnalysisError::invalid(format!(
            "band edges must come in pairs, got {}",
            bands.len()
        )));
    }
    if bands.len() != desired.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "band edges and desired gains",
            left: bands.len(),
            right: desired.len(),
        });
    }
    let nyquist = sample_rate / 2.0;
    let edges: Vec<f64> = bands.iter().map(|b| b / nyquist).collect();
    if edges.iter().any(|e| !(0.0..=1.0).contains(e)) || edges.windows(2).any(|w| w[0] > w[1]) {
        return Err(AnalysisError::invalid(
            "band edges must be non-decreasing and within [0, fs/2]",
        ));
    }

    let m = (numtaps - 1) / 2;
    let pairs: Vec<((f64, f64), (f64, f64))> = edges
        .chunks_exact(2)
        .zip(desired.chunks_exact(2))
        .map(|(e, d)| ((e[0], e[1]), (d[0], d[1])))
        .collect();

    // q[k] = Σ_bands f1·sinc(f1·k) − f0·sinc(f0·k)
    let q: Vec<f64> = (0..numtaps)
        .map(|k| {
            let k = k as f64;
            pairs
                .iter()
                .map(|&((f0, f1), _)| f1 * sinc(f1 * k) - f0 * sinc(f0 * k))
                .sum()
        })
        .collect();

    let mut matrix: Vec<Vec<f64>> = (0..=m)
        .map(|i| (0..=m).map(|j| q[i.abs_diff(j)] + q[i + j]).collect())
        .collect();

    let mut rhs: Vec<f64> = (0..=m)
        .map(|n| {
            let nf = n as f64;
            pairs
                .iter()
                .map(|&((f0, f1), (d0, d1))| {
                    let slope = if f1 > f0 { (d1 - d0) / (f1 - f0) } else { 0.0 };
                    let offset = d0 - f0 * slope;
                    let term = |f: f64| {
                        let mut v = f * (slope * f + offset) * sinc(f * nf);
                        if n == 0 {
                            v -= slope * f * f / 2.0;
                        } else {
                            v += slope * (nf * PI * f).cos() / (PI * nf).powi(2);
                        }
                        v
                    };
                    term(f1) - term(f0)
                })
                .sum()
        })
        .collect();

    let a = solve_linear(&mut matrix, &mut rhs)?;

    let mut coeffs = Vec::with_capacity(numtaps);
    coeffs.extend(a[1..].iter().rev());
    coeffs.push(2.0 * a[0]);
    coeffs.extend(&a[1..]);
    Ok(coeffs)
}

/// Gaussian elimination with partial pivoting. Consumes its inputs.
fn solve_linear(matrix: &mut [Vec<f64>], rhs: &mut [f64]) -> Result<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);
        if matrix[pivot][col] == 0.0 || !matrix[pivot][col].is_finite() {
            return Err(AnalysisError::invalid("least-squares system is singular"));
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * x[k]).sum();
        x[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Ok(x)
}

/// Frequency-sampling linear-phase FIR filter with a Hamming window.
///
/// `freqs` (Hz) must start at 0, end at `fs/2` and be non-decreasing;
/// `gains` gives the desired magnitude at each.
///
/// # Errors
///
/// `numtaps` must be odd and the frequency grid valid.
pub fn firwin2(numtaps: usize, freqs: &[f64], gains: &[f64], sample_rate: f64) -> Result<Vec<f64>> {
    check_odd_taps(numtaps)?;
    if freqs.len() != gains.len() {
        return Err(AnalysisError::LengthMismatch {
            what: "frequencies and gains",
            left: freqs.len(),
            right: gains.len(),
        });
    }
    let nyquist = sample_rate / 2.0;
    if freqs.len() < 2
        || freqs[0] != 0.0
        || (freqs[freqs.len() - 1] - nyquist).abs() > 1e-9 * nyquist
        || freqs.windows(2).any(|w| w[0] > w[1])
    {
        return Err(AnalysisError::invalid(
            "frequencies must increase from 0 to fs/2",
        ));
    }

    let grid = 1 + numtaps.next_power_of_two();
    let normalized: Vec<f64> = freqs.iter().map(|f| f / nyquist).collect();
    let delay = (numtaps - 1) as f64 / 2.0;
    let spectrum: Vec<Complex<f64>> = (0..grid)
        .map(|i| {
            let x = i as f64 / (grid - 1) as f64;
            let gain = interp(x, &normalized, gains);
            Complex::from_polar(gain, -delay * PI * x)
        })
        .collect();

    let full = Fft::new(2 * (grid - 1)).inverse(&spectrum);
    let window = Window::Hamming.symmetric(numtaps);
    Ok(full[..numtaps]
        .iter()
        .zip(&window)
        .map(|(h, w)| h * w)
        .collect())
}

/// Homomorphic minimum-phase version of a linear-phase filter.
///
/// Returns `len/2 + len%2` taps whose magnitude response approximates the
/// square root of the input's.
pub fn minimum_phase(h: &[f64]) -> Result<Vec<f64>> {
    if h.len() < 2 {
        return Err(AnalysisError::invalid(
            "minimum-phase conversion needs at least two taps",
        ));
    }
    let n_fft = ((2.0 * (h.len() - 1) as f64 / 0.01).ceil() as usize).next_power_of_two();
    let fft = Fft::new(n_fft);

    let mut magnitude: Vec<f64> = fft.forward_full(h).iter().map(|c| c.norm()).collect();
    let floor = magnitude
        .iter()
        .copied()
        .filter(|&m| m > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !floor.is_finite() {
        return Err(AnalysisError::invalid("filter has an all-zero spectrum"));
    }
    for m in &mut magnitude {
        *m = 0.5 * (*m + 1e-7 * floor).ln();
    }

    let mut cepstrum: Vec<Complex<f64>> = magnitude.iter().map(|&m| Complex::new(m, 0.0)).collect();
    fft.inverse_complex(&mut cepstrum);

    // fold the cepstrum onto positive quefrencies
    let stop = h.len().div_ceil(2);
    for (i, c) in cepstrum.iter_mut().enumerate() {
        let w = if i == 0 || (h.len() % 2 == 1 && i == stop) {
            1.0
        } else if i < stop {
            2.0
        } else {
            0.0
        };
        *c = Complex::new(c.re * w, 0.0);
    }

    fft.forward_complex(&mut cepstrum);
    for c in &mut cepstrum {
        *c = c.exp();
    }
    fft.inverse_complex(&mut cepstrum);

    let n_out = h.len() / 2 + h.len() % 2;
    Ok(cepstrum[..n_out].iter().map(|c| c.re).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_at(h: &[f64], freq: f64, fs: f64) -> f64 {
        let w = 2.0 * PI * freq / fs;
        let c: Complex<f64> = h
            .iter()
            .enumerate()
            .map(|(n, &v)| Complex::from_polar(v, -w * n as f64))
            .sum();
        c.norm()
    }

    #[test]
    fn test_interp() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 30.0];
        assert_eq!(interp(-1.0, &xp, &fp), 0.0);
        assert_eq!(interp(0.5, &xp, &fp), 5.0);
        assert_eq!(interp(1.5, &xp, &fp), 20.0);
        assert_eq!(interp(3.0, &xp, &fp), 30.0);
    }

    #[test]
    fn test_firls_lowpass() {
        let fs = 48000.0;
        let h = firls(101, &[0.0, 4000.0, 6000.0, 24000.0], &[1.0, 1.0, 0.0, 0.0], fs).unwrap();
        assert_eq!(h.len(), 101);
        for i in 0..50 {
            assert!((h[i] - h[100 - i]).abs() < 1e-12, "not symmetric at {i}");
        }
        assert!((response_at(&h, 1000.0, fs) - 1.0).abs() < 0.02);
        assert!(response_at(&h, 12000.0, fs) < 0.02);
    }

    #[test]
    fn test_firls_flat_gain_is_scaled_impulse() {
        let h = firls(11, &[0.0, 24000.0], &[0.5, 0.5], 48000.0).unwrap();
        assert!((h[5] - 0.5).abs() < 1e-9);
        assert!(h.iter().enumerate().all(|(i, v)| i == 5 || v.abs() < 1e-9));
    }

    #[test]
    fn test_firls_rejects_bad_input() {
        assert!(firls(10, &[0.0, 24000.0], &[1.0, 1.0], 48000.0).is_err());
        assert!(firls(11, &[0.0, 24000.0, 1.0], &[1.0, 1.0, 1.0], 48000.0).is_err());
        assert!(firls(11, &[0.0, 30000.0], &[1.0, 1.0], 48000.0).is_err());
    }

    #[test]
    fn test_firwin2_matches_gains() {
        let fs = 48000.0;
        let freqs = [0.0, 1000.0, 2000.0, 24000.0];
        let gains = [1.0, 1.0, 0.5, 0.5];
        let h = firwin2(255, &freqs, &gains, fs).unwrap();
        assert_eq!(h.len(), 255);
        assert!((h[0] - h[254]).abs() < 1e-12);
        assert!((response_at(&h, 200.0, fs) - 1.0).abs() < 0.02);
        assert!((response_at(&h, 10000.0, fs) - 0.5).abs() < 0.02);
        assert!(firwin2(256, &freqs, &gains, fs).is_err());
        assert!(firwin2(255, &[0.0, 1000.0], &[1.0, 1.0], fs).is_err());
    }

    #[test]
    fn test_minimum_phase_halves_magnitude_in_db() {
        let fs = 48000.0;
        let freqs = [0.0, 1000.0, 2000.0, 24000.0];
        let gains = [1.0, 1.0, 0.25, 0.25];
        let h = firwin2(127, &freqs, &gains, fs).unwrap();
        let hm = minimum_phase(&h).unwrap();
        assert_eq!(hm.len(), 64);

        // squared minimum-phase magnitude tracks the linear-phase magnitude
        let squared = crate::conv::convolve(&hm, &hm);
        assert_eq!(squared.len(), 127);
        for f in [100.0, 500.0, 5000.0, 15000.0] {
            let a = response_at(&h, f, fs);
            let b = response_at(&squared, f, fs);
            assert!((a - b).abs() < 0.1 * a.max(0.1), "at {f}: {a} vs {b}");
        }

        // linear phase peaks in the middle, minimum phase at the start
        let peak = |v: &[f64]| {
            v.iter()
                .enumerate()
                .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
                .map(|(i, _)| i)
                .unwrap()
        };
        assert_eq!(peak(&h), 63);
        assert!(peak(&hm) < 8);
    }

    #[test]
    fn test_minimum_phase_rejects_degenerate() {
        assert!(minimum_phase(&[1.0]).is_err());
        assert!(minimum_phase(&[0.0, 0.0, 0.0]).is_err());
    }
}

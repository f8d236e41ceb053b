//! Linear convolution.
//!
//! Short kernels are convolved directly; longer ones go through a zero-padded
//! FFT so that 5 s room responses and 64-channel filter banks stay tractable.

use crate::fft::Fft;

/// Below this product of lengths the direct sum is faster than the FFT path.
const DIRECT_LIMIT: usize = 4096;

/// Full linear convolution, length `a.len() + b.len() - 1`.
///
/// Returns an empty vector when either input is empty.
pub fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let out_len = a.len() + b.len() - 1;

    if a.len().min(b.len()) <= 8 || a.len() * b.len() <= DIRECT_LIMIT {
        return convolve_direct(a, b);
    }

    let n = out_len.next_power_of_two();
    let fft = Fft::new(n);
    let fa = fft.forward(a);
    let fb = fft.forward(b);
    let product: Vec<_> = fa.iter().zip(&fb).map(|(x, y)| x * y).collect();
    let mut out = fft.inverse(&product);
    out.truncate(out_len);
    out
}

fn convolve_direct(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0.0 {
            continue;
        }
        for (j, &h) in b.iter().enumerate() {
            out[i + j] += x * h;
        }
    }
    out
}

/// FIR filtering with `b` as the numerator and unit denominator.
///
/// Equivalent to the first `x.len()` samples of [`convolve`]`(x, b)`.
pub fn fir_filter(b: &[f64], x: &[f64]) -> Vec<f64> {
    if b.is_empty() {
        return vec![0.0; x.len()];
    }
    let mut out = convolve(x, b);
    out.truncate(x.len());
    out
}

//! FFT wrapper with windowing functions
//!
//! All transforms are `f64`. [`Fft::forward`] and [`Fft::inverse`] follow the
//! real-input conventions of `numpy.fft.rfft` / `irfft`: the one-sided
//! spectrum has `size / 2 + 1` bins and the inverse carries the `1 / size`
//! normalisation.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f64::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Hamming window
    Hamming,
    /// Five-term flat-top window (accurate sinusoid amplitudes)
    Flattop,
}

/// Flat-top cosine-sum coefficients.
const FLATTOP: [f64; 5] = [
    0.21557895,
    0.41663158,
    0.277263158,
    0.083578947,
    0.006947368,
];

impl Window {
    fn value(&self, phase: f64) -> f64 {
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 - 0.5 * phase.cos(),
            Window::Hamming => 0.54 - 0.46 * phase.cos(),
            Window::Flattop => {
                FLATTOP[0] - FLATTOP[1] * phase.cos() + FLATTOP[2] * (2.0 * phase).cos()
                    - FLATTOP[3] * (3.0 * phase).cos()
                    + FLATTOP[4] * (4.0 * phase).cos()
            }
        }
    }

    /// Periodic window coefficients (`phase = 2π i / n`), as used for
    /// spectral estimation.
    pub fn periodic(&self, size: usize) -> Vec<f64> {
        (0..size)
            .map(|i| self.value(2.0 * PI * i as f64 / size as f64))
            .collect()
    }

    /// Symmetric window coefficients (`phase = 2π i / (n - 1)`), as used for
    /// filter design and fades.
    pub fn symmetric(&self, size: usize) -> Vec<f64> {
        if size == 1 {
            return vec![1.0];
        }
        let denom = (size - 1) as f64;
        (0..size)
            .map(|i| self.value(2.0 * PI * i as f64 / denom))
            .collect()
    }

    /// Apply the periodic window to a buffer in place.
    pub fn apply(&self, buffer: &mut [f64]) {
        let coeffs = self.periodic(buffer.len());
        for (s, w) in buffer.iter_mut().zip(coeffs) {
            *s *= w;
        }
    }
}

/// FFT processor with caching
pub struct Fft {
    planner: FftPlanner<f64>,
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    size: usize,
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);

        Self {
            planner,
            fft,
            ifft,
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Resize the FFT (creates new plan if needed)
    pub fn resize(&mut self, size: usize) {
        if size != self.size {
            self.fft = self.planner.plan_fft_forward(size);
            self.ifft = self.planner.plan_fft_inverse(size);
            self.size = size;
        }
    }

    /// Forward FFT of real input, zero-padded or truncated to the FFT size.
    ///
    /// Returns the one-sided spectrum (`size / 2 + 1` bins, DC to Nyquist).
    pub fn forward(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer = self.forward_full(input);
        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Forward FFT of real input returning all `size` bins.
    pub fn forward_full(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));
        self.fft.process(&mut buffer);
        buffer
    }

    /// Perform forward FFT on complex input (in-place)
    pub fn forward_complex(&self, buffer: &mut [Complex<f64>]) {
        self.fft.process(buffer);
    }

    /// Inverse of [`forward`](Self::forward).
    ///
    /// Takes a one-sided spectrum and returns `size` real samples. Missing
    /// bins are treated as zero; the imaginary parts of the DC and Nyquist
    /// bins are ignored.
    pub fn inverse(&self, spectrum: &[Complex<f64>]) -> Vec<f64> {
        let n = self.size;
        let half = n / 2;
        let bin = |k: usize| spectrum.get(k).copied().unwrap_or_default();

        let mut buffer = Vec::with_capacity(n);
        for k in 0..n {
            if k <= half {
                buffer.push(bin(k));
            } else {
                // Mirror for negative frequencies (conjugate symmetry)
                buffer.push(bin(n - k).conj());
            }
        }

        self.ifft.process(&mut buffer);

        let scale = 1.0 / n as f64;
        buffer.iter().map(|c| c.re * scale).collect()
    }

    /// Perform inverse FFT on complex buffer (in-place, normalised)
    pub fn inverse_complex(&self, buffer: &mut [Complex<f64>]) {
        self.ifft.process(buffer);

        let scale = 1.0 / self.size as f64;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }
}

/// One-sided spectrum of `x` with an `n`-point transform.
pub fn rfft(x: &[f64], n: usize) -> Vec<Complex<f64>> {
    Fft::new(n).forward(x)
}

/// Real inverse of a one-sided spectrum, `n` output samples.
pub fn irfft(spectrum: &[Complex<f64>], n: usize) -> Vec<f64> {
    Fft::new(n).inverse(spectrum)
}

/// Full complex forward transform, zero-padded or truncated to `n` points.
pub fn fft(x: &[Complex<f64>], n: usize) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = x.iter().take(n).copied().collect();
    buffer.resize(n, Complex::new(0.0, 0.0));
    Fft::new(n).forward_complex(&mut buffer);
    buffer
}

/// Full complex inverse transform (normalised), zero-padded or truncated to
/// `n` points.
pub fn ifft(x: &[Complex<f64>], n: usize) -> Vec<Complex<f64>> {
    let mut buffer: Vec<Complex<f64>> = x.iter().take(n).copied().collect();
    buffer.resize(n, Complex::new(0.0, 0.0));
    Fft::new(n).inverse_complex(&mut buffer);
    buffer
}

/// Bin frequencies of an `n`-point one-sided spectrum.
pub fn rfft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    (0..=n / 2)
        .map(|k| k as f64 * sample_rate / n as f64)
        .collect()
}

/// Compute magnitude spectrum in dB
pub fn magnitude_db(spectrum: &[Complex<f64>]) -> Vec<f64> {
    spectrum
        .iter()
        .map(|c| 20.0 * c.norm().max(1e-300).log10())
        .collect()
}

/// Index of the element of `values` nearest to `target` (first on ties).
pub fn nearest_index(values: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &v) in values.iter().enumerate() {
        let d = (v - target).abs();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

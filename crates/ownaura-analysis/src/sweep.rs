//! Exponential sine sweep excitation and simple test signals.
//!
//! The sweep follows Farina's construction: the phase grows so that the
//! instantaneous frequency rises exponentially from `f_start` to `f_end`
//! over the sweep duration `T`:
//!
//! ```text
//! φ(t) = ω₁·T / ln(ω₂/ω₁) · (exp(t/T · ln(ω₂/ω₁)) − 1)
//! f(t) = f₁ · exp(t/T · ln(f₂/f₁))
//! ```
//!
//! Optional half-Hann fades at both ends suppress the broadband click of a
//! hard start, and trailing silence leaves room for the system's decay.

use crate::error::{AnalysisError, Result};
use crate::fft::Window;
use std::f64::consts::PI;

/// Exponential sine sweep generator.
///
/// # Example
///
/// ```rust
/// use ownaura_analysis::ExponentialSweep;
///
/// let sweep = ExponentialSweep::new(1.0, 48000.0)
///     .start_frequency(100.0)
///     .end_frequency(8000.0)
///     .fade(0.05)
///     .generate()
///     .unwrap();
/// assert_eq!(sweep.len(), 48000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialSweep {
    duration: f64,
    sample_rate: f64,
    fade: f64,
    start_frequency: Option<f64>,
    end_frequency: Option<f64>,
    amplitude: f64,
    post_silence: f64,
}

impl ExponentialSweep {
    /// A sweep of `duration` seconds at `sample_rate` Hz.
    ///
    /// Defaults: no fade, unit amplitude, no trailing silence, start
    /// frequency `fs / n` and end frequency `fs / 2`.
    pub fn new(duration: f64, sample_rate: f64) -> Self {
        Self {
            duration,
            sample_rate,
            fade: 0.0,
            start_frequency: None,
            end_frequency: None,
            amplitude: 1.0,
            post_silence: 0.0,
        }
    }

    /// Half-Hann fade length in seconds at each end.
    pub fn fade(mut self, seconds: f64) -> Self {
        self.fade = seconds;
        self
    }

    /// Start frequency in Hz.
    pub fn start_frequency(mut self, hz: f64) -> Self {
        self.start_frequency = Some(hz);
        self
    }

    /// End frequency in Hz.
    pub fn end_frequency(mut self, hz: f64) -> Self {
        self.end_frequency = Some(hz);
        self
    }

    /// Peak amplitude.
    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Seconds of zeros appended after the sweep.
    pub fn post_silence(mut self, seconds: f64) -> Self {
        self.post_silence = seconds;
        self
    }

    /// Number of sweep samples, excluding trailing silence.
    pub fn num_samples(&self) -> usize {
        (self.duration * self.sample_rate).round().max(0.0) as usize
    }

    /// Resolved `(f_start, f_end)` in Hz.
    pub fn frequencies(&self) -> (f64, f64) {
        let n = self.num_samples().max(1) as f64;
        (
            self.start_frequency.unwrap_or(self.sample_rate / n),
            self.end_frequency.unwrap_or(self.sample_rate / 2.0),
        )
    }

    /// Instantaneous frequency in Hz at time `t` seconds.
    pub fn instantaneous_frequency(&self, t: f64) -> f64 {
        let (f1, f2) = self.frequencies();
        f1 * (t / self.duration * (f2 / f1).ln()).exp()
    }

    fn validate(&self) -> Result<()> {
        if !(self.sample_rate > 0.0) {
            return Err(AnalysisError::invalid("sample rate must be positive"));
        }
        if !(self.duration > 0.0) || self.num_samples() == 0 {
            return Err(AnalysisError::invalid("sweep duration must cover at least one sample"));
        }
        let (f1, f2) = self.frequencies();
        if !(f1 > 0.0) {
            return Err(AnalysisError::invalid(format!(
                "start frequency must be positive, got {f1} Hz"
            )));
        }
        if !(f1 < f2) {
            return Err(AnalysisError::invalid(format!(
                "start frequency {f1} Hz must be below end frequency {f2} Hz"
            )));
        }
        if f2 > self.sample_rate / 2.0 {
            return Err(AnalysisError::invalid(format!(
                "end frequency {f2} Hz exceeds Nyquist ({} Hz)",
                self.sample_rate / 2.0
            )));
        }
        if self.fade < 0.0 || self.post_silence < 0.0 {
            return Err(AnalysisError::invalid(
                "fade and post-silence must not be negative",
            ));
        }
        let n_fade = (self.fade * self.sample_rate).round() as usize;
        if n_fade > self.num_samples() {
            return Err(AnalysisError::invalid(format!(
                "fade of {n_fade} samples is longer than the sweep"
            )));
        }
        Ok(())
    }

    /// Generate the sweep followed by its trailing silence.
    ///
    /// Output length is `round(T·fs) + round(post_silence·fs)`.
    pub fn generate(&self) -> Result<Vec<f64>> {
        self.validate()?;

        let n = self.num_samples();
        let (f1, f2) = self.frequencies();
        let w1 = 2.0 * PI * f1;
        let w2 = 2.0 * PI * f2;
        let k = (w2 / w1).ln();
        let t_total = self.duration;

        let mut sweep: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 * t_total / n as f64;
                let phase = w1 * t_total / k * ((t / t_total * k).exp() - 1.0);
                self.amplitude * phase.sin()
            })
            .collect();

        let n_fade = (self.fade * self.sample_rate).round() as usize;
        if n_fade > 0 {
            let window = Window::Hann.symmetric(2 * n_fade);
            for i in 0..n_fade {
                sweep[i] *= window[i];
                sweep[n - n_fade + i] *= window[n_fade + i];
            }
        }

        let silence = (self.post_silence * self.sample_rate).round() as usize;
        sweep.resize(n + silence, 0.0);

        tracing::debug!(samples = n, silence, f1, f2, "generated exponential sweep");
        Ok(sweep)
    }
}

/// A unit impulse of `length` samples at `position` (none if out of range).
pub fn impulse(length: usize, position: usize) -> Vec<f64> {
    let mut signal = vec![0.0; length];
    if let Some(s) = signal.get_mut(position) {
        *s = 1.0;
    }
    signal
}

/// Deterministic uniform white noise in `[-amplitude, amplitude]`.
///
/// Uses a 64-bit xorshift so test fixtures are reproducible across runs.
pub fn white_noise(length: usize, amplitude: f64, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..length)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            (unit * 2.0 - 1.0) * amplitude
        })
        .collect()
}

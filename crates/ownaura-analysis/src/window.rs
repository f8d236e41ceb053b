//! Hann fade windows in time and frequency.
//!
//! A [`FadeWindow`] has an optional fade-in `(start, end)` and fade-out
//! `(start, end)`. Before the fade-in everything is zeroed, the fade-in
//! follows the rising half of a Hann window, the middle passes unchanged,
//! the fade-out follows the falling half and everything after it is zeroed.
//!
//! [`time_window`] applies this over time in seconds, and
//! [`crop_time_window`] also cuts the response at the fade-out end.
//! [`frequency_window`] applies it over the one-sided spectrum in Hz.

use crate::error::{AnalysisError, Result};
use crate::fft::{Fft, Window, rfft_frequencies};

/// Fade-in and fade-out boundaries (seconds or Hz).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FadeWindow {
    /// Zero before `.0`, Hann rise to `.1`.
    pub fade_in: Option<(f64, f64)>,
    /// Hann fall from `.0`, zero after `.1`.
    pub fade_out: Option<(f64, f64)>,
}

impl FadeWindow {
    /// Window with both fades.
    pub fn new(fade_in: (f64, f64), fade_out: (f64, f64)) -> Result<Self> {
        let w = Self {
            fade_in: Some(fade_in),
            fade_out: Some(fade_out),
        };
        w.validate()?;
        Ok(w)
    }

    /// Fade-out only.
    pub fn fade_out(start: f64, end: f64) -> Result<Self> {
        let w = Self {
            fade_in: None,
            fade_out: Some((start, end)),
        };
        w.validate()?;
        Ok(w)
    }

    /// Fade-in only.
    pub fn fade_in(start: f64, end: f64) -> Result<Self> {
        let w = Self {
            fade_in: Some((start, end)),
            fade_out: None,
        };
        w.validate()?;
        Ok(w)
    }

    /// Boundaries must be non-negative and non-decreasing.
    pub fn validate(&self) -> Result<()> {
        let mut points = Vec::with_capacity(4);
        if let Some((a, b)) = self.fade_in {
            points.extend([a, b]);
        }
        if let Some((a, b)) = self.fade_out {
            points.extend([a, b]);
        }
        if points.iter().any(|p| !(*p >= 0.0)) {
            return Err(AnalysisError::invalid(format!(
                "window boundaries must be non-negative: {self:?}"
            )));
        }
        if points.windows(2).any(|w| w[0] > w[1]) {
            return Err(AnalysisError::invalid(format!(
                "window boundaries must be ordered: {self:?}"
            )));
        }
        Ok(())
    }

    /// Gain for each point of `axis` (seconds or Hz, increasing).
    pub fn gains(&self, axis: &[f64]) -> Vec<f64> {
        let mut gains = vec![1.0; axis.len()];

        if let Some((start, end)) = self.fade_in {
            let i0 = nearest_index(axis, start);
            let i1 = nearest_index(axis, end);
            let len = i1 - i0;
            let rise = Window::Hann.periodic(2 * len);
            gains[..i0].fill(0.0);
            gains[i0..i1].copy_from_slice(&rise[..len]);
        }

        if let Some((start, end)) = self.fade_out {
            let i0 = nearest_index(axis, start);
            let i1 = nearest_index(axis, end);
            let len = i1 - i0;
            let fall = Window::Hann.periodic(2 * len);
            for (g, w) in gains[i0..i1].iter_mut().zip(&fall[len..]) {
                *g *= w;
            }
            gains[i1..].fill(0.0);
        }

        gains
    }
}

fn nearest_index(axis: &[f64], value: f64) -> usize {
    crate::fft::nearest_index(axis, value)
}

/// Apply a Hann fade window over time (boundaries in seconds).
pub fn time_window(signal: &[f64], sample_rate: f64, window: &FadeWindow) -> Result<Vec<f64>> {
    window.validate()?;
    let times: Vec<f64> = (0..signal.len()).map(|i| i as f64 / sample_rate).collect();
    Ok(signal
        .iter()
        .zip(window.gains(&times))
        .map(|(s, g)| s * g)
        .collect())
}

/// Apply a Hann fade window over time and drop the zeroed tail.
///
/// The output ends at the fade-out end; without a fade-out it keeps the
/// input's length.
pub fn crop_time_window(
    signal: &[f64],
    sample_rate: f64,
    window: &FadeWindow,
) -> Result<Vec<f64>> {
    let windowed = time_window(signal, sample_rate, window)?;
    Ok(match window.fade_out {
        Some((_, end)) => crop(&windowed, sample_rate, 0.0, end),
        None => windowed,
    })
}

/// Apply a Hann fade window over frequency (boundaries in Hz).
///
/// The signal is transformed with a real FFT of its own length, weighted
/// bin by bin and transformed back, so the output has the input's length.
pub fn frequency_window(
    signal: &[f64],
    sample_rate: f64,
    window: &FadeWindow,
) -> Result<Vec<f64>> {
    window.validate()?;
    if signal.is_empty() {
        return Ok(Vec::new());
    }
    let fft = Fft::new(signal.len());
    let freqs = rfft_frequencies(signal.len(), sample_rate);
    let gains = window.gains(&freqs);
    let spectrum: Vec<_> = fft
        .forward(signal)
        .into_iter()
        .zip(gains)
        .map(|(c, g)| c * g)
        .collect();
    Ok(fft.inverse(&spectrum))
}

/// Keep the samples from `start` up to (excluding) `end` seconds.
pub fn crop(signal: &[f64], sample_rate: f64, start: f64, end: f64) -> Vec<f64> {
    let i0 = ((start * sample_rate).round().max(0.0) as usize).min(signal.len());
    let i1 = ((end * sample_rate).round().max(0.0) as usize).clamp(i0, signal.len());
    signal[i0..i1].to_vec()
}

//! Reverberation time from impulse responses
//!
//! Per band, the response is band-pass filtered and its envelope `|x|` is
//! normalised to its peak. Schroeder backward integration of the squared
//! envelope gives the energy decay curve in dB re its maximum. The samples
//! nearest the start and end levels of a [`DecayRange`] delimit a
//! least-squares line `L(t) = m·t + b` over the curve, and
//!
//! ```text
//! RT = 60 / (init − end) · ((end − b)/m − (init − b)/m)
//! ```
//!
//! scales the fitted decay time to an equivalent 60 dB decay.
//!
//! A flat or rising fit (slope near zero or positive) has no meaningful
//! crossing times. Such bands yield `None` and a warning instead of an
//! extreme value.

use crate::bands::{Band, BandSpec};
use crate::error::{AnalysisError, Result};
use crate::filterbank::BandpassFilter;
use ownaura_core::power_to_db;

/// Slopes flatter than this (dB/s) are treated as no decay.
const MIN_SLOPE_DB_PER_S: f64 = 1e-9;

/// Start and end levels (dB re peak) of the evaluated decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayRange {
    /// Start level in dB, e.g. `-5.0`.
    pub init: f64,
    /// End level in dB, e.g. `-35.0`.
    pub end: f64,
}

impl DecayRange {
    /// Early decay time, 0 to −10 dB.
    pub const EDT: DecayRange = DecayRange {
        init: 0.0,
        end: -10.0,
    };
    /// T20, −5 to −25 dB.
    pub const T20: DecayRange = DecayRange {
        init: -5.0,
        end: -25.0,
    };
    /// T30, −5 to −35 dB.
    pub const T30: DecayRange = DecayRange {
        init: -5.0,
        end: -35.0,
    };
    /// DT40, 0 to −40 dB.
    pub const DT40: DecayRange = DecayRange {
        init: 0.0,
        end: -40.0,
    };

    /// A custom range. `init` must be above `end`.
    pub fn new(init: f64, end: f64) -> Result<Self> {
        if init <= end {
            return Err(AnalysisError::invalid(format!(
                "decay start level {init} dB must be above end level {end} dB"
            )));
        }
        Ok(Self { init, end })
    }
}

/// Decay time of one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayTime {
    /// The analysed band.
    pub band: Band,
    /// Equivalent 60 dB decay time in seconds, `None` if the fit was
    /// degenerate.
    pub seconds: Option<f64>,
}

/// Least-squares line through the evaluated part of a decay curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayFit {
    /// Slope in dB/s.
    pub slope: f64,
    /// Intercept in dB at `t = 0`.
    pub intercept: f64,
    /// First sample of the fit.
    pub init_sample: usize,
    /// One past the last sample of the fit.
    pub end_sample: usize,
}

/// Schroeder energy decay curve of the peak-normalised envelope, in dB re its
/// maximum.
pub fn schroeder_curve_db(signal: &[f64]) -> Vec<f64> {
    let peak = signal.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if signal.is_empty() || peak == 0.0 {
        return Vec::new();
    }

    let mut curve = Vec::with_capacity(signal.len());
    let mut sum = 0.0;
    for &s in signal.iter().rev() {
        let env = s.abs() / peak;
        sum += env * env;
        curve.push(sum);
    }
    curve.reverse();

    let max = curve.iter().copied().fold(0.0, f64::max);
    curve.iter().map(|&e| power_to_db(e / max)).collect()
}

fn nearest(curve: &[f64], level: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &v) in curve.iter().enumerate() {
        let d = (v - level).abs();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Fit a line to `curve` between the samples nearest `range.init` and
/// `range.end`. `None` with fewer than two points.
pub fn fit_decay(curve: &[f64], sample_rate: f64, range: DecayRange) -> Option<DecayFit> {
    let init_sample = nearest(curve, range.init);
    let end_sample = nearest(curve, range.end);
    if end_sample < init_sample + 2 {
        return None;
    }

    let n = (end_sample - init_sample) as f64;
    let ts = (init_sample..end_sample).map(|i| i as f64 / sample_rate);
    let mean_t = ts.clone().sum::<f64>() / n;
    let mean_l = curve[init_sample..end_sample].iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (t, &l) in ts.zip(&curve[init_sample..end_sample]) {
        sxy += (t - mean_t) * (l - mean_l);
        sxx += (t - mean_t) * (t - mean_t);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(DecayFit {
        slope,
        intercept: mean_l - slope * mean_t,
        init_sample,
        end_sample,
    })
}

/// Decay time of an already band-limited signal.
///
/// Returns `None` (and logs a warning) for silent signals, fits with fewer
/// than two points, and slopes that are not clearly negative.
pub fn decay_time(signal: &[f64], sample_rate: f64, range: DecayRange) -> Option<f64> {
    let curve = schroeder_curve_db(signal);
    if curve.is_empty() {
        tracing::warn!("silent signal, decay time undefined");
        return None;
    }
    let Some(fit) = fit_decay(&curve, sample_rate, range) else {
        tracing::warn!(
            init = range.init,
            end = range.end,
            "decay range covers fewer than two samples"
        );
        return None;
    };
    if fit.slope >= 0.0 || fit.slope.abs() < MIN_SLOPE_DB_PER_S {
        tracing::warn!(slope = fit.slope, "decay slope is not negative, decay time undefined");
        return None;
    }

    let factor = 60.0 / (range.init - range.end);
    let t_init = (range.init - fit.intercept) / fit.slope;
    let t_end = (range.end - fit.intercept) / fit.slope;
    Some(factor * (t_end - t_init))
}

/// Per-band reverberation time of an impulse response.
///
/// # Errors
///
/// Fails on an empty response or a non-positive sample rate.
pub fn reverberation_time(
    sample_rate: f64,
    impulse_response: &[f64],
    bands: BandSpec,
    range: DecayRange,
) -> Result<Vec<DecayTime>> {
    if impulse_response.is_empty() {
        return Err(AnalysisError::EmptyInput("impulse response"));
    }
    if !(sample_rate > 0.0) {
        return Err(AnalysisError::invalid("sample rate must be positive"));
    }

    Ok(bands
        .bands()
        .into_iter()
        .map(|band| {
            let filtered = BandpassFilter::new(sample_rate, band).filter(impulse_response);
            let seconds = decay_time(&filtered, sample_rate, range);
            tracing::debug!(center = band.center, ?seconds, "band decay time");
            DecayTime { band, seconds }
        })
        .collect())
}

/// Element-wise mean of two per-band results (e.g. left and right ear).
///
/// A band is `None` if either input is.
pub fn mean_decay_times(a: &[DecayTime], b: &[DecayTime]) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x.seconds, y.seconds) {
            (Some(x), Some(y)) => Some((x + y) / 2.0),
            _ => None,
        })
        .collect()
}

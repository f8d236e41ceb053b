//! Transfer function estimation by regularised spectral division
//!
//! Given a reference (excitation) `r` and a measured response `y` of the same
//! length, the estimate is
//!
//! ```text
//! H(k) = Y(k) · conj(R(k)) / (|R(k)|² + reg(k))
//! ```
//!
//! `reg` is either a flat constant or, with [`Regularization::LimitDb`], a
//! per-bin floor that keeps the effective reference energy no more than
//! `lim` dB below the strongest reference bin. This bounds the gain applied
//! in bands the excitation never reached.

use crate::error::{AnalysisError, Result, ensure_same_len};
use crate::fft::Fft;
use ownaura_core::MultiChannel;
use rustfft::num_complex::Complex;

/// Largest plausible transfer gain (180 dB). Bins above it are zeroed.
pub const MAX_TRANSFER_GAIN: f64 = 1e9;

/// Regularisation of the spectral division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regularization {
    /// Flat value added to `|R|²` in every bin.
    Constant(f64),
    /// Energy floor this many dB below the peak reference bin.
    LimitDb(f64),
}

impl Default for Regularization {
    fn default() -> Self {
        Regularization::Constant(0.0)
    }
}

/// One-sided transfer function `Y·conj(R) / (|R|² + reg)`.
///
/// Zero reference bins are replaced by machine epsilon. Bins where
/// `|Y/R|` exceeds [`MAX_TRANSFER_GAIN`] have `Y` zeroed and a warning is
/// logged.
///
/// # Errors
///
/// [`AnalysisError::LengthMismatch`] if the signals differ in length and
/// [`AnalysisError::EmptyInput`] if they are empty.
pub fn transfer_function_spectrum(
    reference: &[f64],
    measured: &[f64],
    regularization: Regularization,
) -> Result<Vec<Complex<f64>>> {
    ensure_same_len("reference and measured signal", reference.len(), measured.len())?;
    if reference.is_empty() {
        return Err(AnalysisError::EmptyInput("reference signal"));
    }

    let fft = Fft::new(reference.len());
    let mut r = fft.forward(reference);
    let mut y = fft.forward(measured);

    for bin in r.iter_mut() {
        if bin.re == 0.0 && bin.im == 0.0 {
            *bin = Complex::new(f64::EPSILON, 0.0);
        }
    }

    let mut too_large = 0usize;
    for (yk, rk) in y.iter_mut().zip(&r) {
        if yk.norm() / rk.norm() > MAX_TRANSFER_GAIN {
            *yk = Complex::new(0.0, 0.0);
            too_large += 1;
        }
    }
    if too_large > 0 {
        tracing::warn!(
            bins = too_large,
            "transfer gains larger than {:.0} dB, setting to 0",
            20.0 * MAX_TRANSFER_GAIN.log10()
        );
    }

    let energy: Vec<f64> = r.iter().map(|c| c.norm_sqr()).collect();
    let reg = regularization_per_bin(&r, &energy, regularization);

    Ok(y.iter()
        .zip(&r)
        .zip(energy.iter().zip(&reg))
        .map(|((yk, rk), (e, g))| yk * rk.conj() / (e + g))
        .collect())
}

fn regularization_per_bin(
    r: &[Complex<f64>],
    energy: &[f64],
    regularization: Regularization,
) -> Vec<f64> {
    match regularization {
        Regularization::Constant(reg) => vec![reg; r.len()],
        Regularization::LimitDb(lim) => {
            let max_db = r
                .iter()
                .map(|c| 20.0 * c.norm().log10())
                .fold(f64::NEG_INFINITY, f64::max);
            let floor = 10f64.powf((max_db - lim) / 10.0);
            energy.iter().map(|&e| (floor - e).max(0.0)).collect()
        }
    }
}

/// Impulse response between `reference` and `measured`.
///
/// The inverse transform of [`transfer_function_spectrum`], with the same
/// length as the reference.
pub fn transfer_function(
    reference: &[f64],
    measured: &[f64],
    regularization: Regularization,
) -> Result<Vec<f64>> {
    let spectrum = transfer_function_spectrum(reference, measured, regularization)?;
    Ok(Fft::new(reference.len()).inverse(&spectrum))
}

/// Sample-wise mean of repeated equal-length responses.
///
/// Summation order does not affect the result beyond rounding.
pub fn average_responses(responses: &[Vec<f64>]) -> Result<Vec<f64>> {
    let first = responses
        .first()
        .ok_or(AnalysisError::EmptyInput("responses to average"))?;
    let mut sum = vec![0.0; first.len()];
    for response in responses {
        ensure_same_len("repeated responses", first.len(), response.len())?;
        for (s, &v) in sum.iter_mut().zip(response) {
            *s += v;
        }
    }
    let count = responses.len() as f64;
    Ok(sum.into_iter().map(|s| s / count).collect())
}

/// Averaged impulse responses from repeated multichannel recordings.
///
/// Each entry of `repetitions` holds one recording per channel (for example
/// one loudspeaker per channel), all captured while playing `excitation`.
/// Every channel is deconvolved against the excitation and the repetitions
/// are averaged, giving one impulse response per channel with the
/// excitation's length.
pub fn deconvolve_recordings(
    excitation: &[f64],
    repetitions: &[MultiChannel],
    regularization: Regularization,
) -> Result<MultiChannel> {
    let first = repetitions
        .first()
        .ok_or(AnalysisError::EmptyInput("recordings"))?;
    let num_channels = first.num_channels();

    let mut per_channel: Vec<Vec<Vec<f64>>> = vec![Vec::new(); num_channels];
    for recording in repetitions {
        if recording.num_channels() != num_channels {
            return Err(AnalysisError::ChannelCount {
                what: "repeated recordings",
                expected: num_channels,
                found: recording.num_channels(),
            });
        }
        for (responses, channel) in per_channel.iter_mut().zip(recording.iter()) {
            responses.push(transfer_function(excitation, channel, regularization)?);
        }
    }

    let averaged = per_channel
        .iter()
        .map(|responses| average_responses(responses))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(
        channels = num_channels,
        repetitions = repetitions.len(),
        "deconvolved recordings"
    );
    Ok(MultiChannel::new(averaged)?)
}

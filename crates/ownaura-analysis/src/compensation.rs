//! Compensation filter design.
//!
//! The compensation filter `C` makes a reproduction rig deliver the
//! reflection-to-direct ratio of a simulated reference room:
//!
//! ```text
//! C = (H_R / H_D) · H_direct / Σ_i (H_sim,i · W_ref,i)
//! ```
//!
//! The stages are:
//!
//! 1. [`target_ratio`]: least-squares FIR fit of the simulated band gains
//!    `H_R / H_D`, delayed to the reflection arrival time.
//! 2. [`direct_path_response`]: Wiener estimate of the rig's direct path
//!    `H_direct` between the headset and measurement microphones.
//! 3. [`design_compensation`]: band-averaged gain of target over current
//!    response, fitted with a linear-phase filter, converted to minimum phase
//!    and self-convolved, plus the delay between target and current.

use crate::bands::{CALIBRATION_CENTERS, geometric_midpoints};
use crate::conv::convolve;
use crate::error::{AnalysisError, Result, ensure_same_rate};
use crate::fft::{Fft, nearest_index, rfft_frequencies};
use crate::fir::{firls, firwin2, interp, minimum_phase};
use crate::wiener::{WienerSettings, wiener_filter};
use crate::xcorr::delay_between;
use ownaura_core::{
    CalibrationFilter, MultiChannel, ReflectionLevels, db_to_linear, power_to_db,
    seconds_to_samples,
};

/// Impulse response with the band gains of `levels`, delayed by
/// `levels.delay_seconds`.
///
/// The filter has `2·round(delay·fs) − 1` taps and is shifted so that its
/// centre lands at `round(delay·fs)`.
///
/// # Errors
///
/// Fails if the delay is shorter than one sample.
pub fn target_ratio(levels: &ReflectionLevels, sample_rate: f64) -> Result<Vec<f64>> {
    let delay = seconds_to_samples(levels.delay_seconds, sample_rate);
    if delay < 1 {
        return Err(AnalysisError::invalid(format!(
            "reflection delay {} s is shorter than one sample",
            levels.delay_seconds
        )));
    }
    let numtaps = 2 * delay - 1;

    let centers = levels.band_centers();
    let gains: Vec<f64> = levels.gain_db().iter().map(|&g| db_to_linear(g)).collect();

    let mut corners = vec![0.0];
    for mid in geometric_midpoints(centers) {
        corners.extend([mid, mid]);
    }
    corners.push(sample_rate / 2.0);
    let corner_gains: Vec<f64> = corners
        .iter()
        .map(|&f| interp(f, centers, &gains))
        .collect();

    let linear = firls(numtaps, &corners, &corner_gains, sample_rate)?;

    let mut dirac = vec![0.0; numtaps];
    if let Some(d) = dirac.get_mut(delay) {
        *d = 1.0;
    }
    let lag = delay_between(&linear, &dirac)?;
    tracing::debug!(numtaps, delay, lag, "target ratio filter");
    Ok(shifted(&linear, lag))
}

/// Shift by `lag` samples (positive delays), zero fill, same length.
fn shifted(signal: &[f64], lag: i64) -> Vec<f64> {
    let n = signal.len();
    let mut out = vec![0.0; n];
    let shift = lag.unsigned_abs() as usize;
    if shift >= n {
        return out;
    }
    if lag >= 0 {
        out[shift..].copy_from_slice(&signal[..n - shift]);
    } else {
        out[..n - shift].copy_from_slice(&signal[shift..]);
    }
    out
}

/// Direct-path response from the headset microphone to the measurement
/// microphone of a calibration recording.
pub fn direct_path_response(
    measurement_mic: &[f64],
    headset: &[f64],
    sample_rate: f64,
    settings: &WienerSettings,
) -> Result<Vec<f64>> {
    wiener_filter(headset, measurement_mic, sample_rate, settings)
}

/// Responses entering the compensation design, each with its sample rate.
#[derive(Debug, Clone, Copy)]
pub struct CompensationInputs<'a> {
    /// Simulated response of each loudspeaker at the listening position.
    pub simulated: &'a MultiChannel,
    /// Sample rate of `simulated`.
    pub simulated_rate: u32,
    /// Reference room filter per loudspeaker.
    pub reference: &'a MultiChannel,
    /// Sample rate of `reference`.
    pub reference_rate: u32,
    /// Output of [`target_ratio`].
    pub target_ratio: &'a [f64],
    /// Output of [`direct_path_response`].
    pub direct: &'a [f64],
}

/// Parameters of [`design_compensation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompensationSettings {
    /// Length of the final filter. Must be odd.
    pub filter_length: usize,
    /// Added to the current magnitude before division.
    pub regularization: f64,
    /// Required loudspeaker count, if any.
    pub expected_channels: Option<usize>,
}

impl Default for CompensationSettings {
    fn default() -> Self {
        Self {
            filter_length: 511,
            regularization: 1e-10,
            expected_channels: None,
        }
    }
}

/// A designed compensation filter with its band gains.
#[derive(Debug, Clone, PartialEq)]
pub struct CompensationDesign {
    /// Minimum-phase filter and the shift that aligns current to target.
    pub filter: CalibrationFilter,
    /// Band centres the gain was averaged over, in Hz.
    pub band_centers: Vec<f64>,
    /// Band-averaged gain in dB.
    pub band_gains_db: Vec<f64>,
}

/// Design the minimum-phase compensation filter and its delay.
///
/// # Errors
///
/// Fails on mismatched sample rates or channel counts, on an even or too
/// short filter length, on negative regularisation and on empty inputs.
pub fn design_compensation(
    inputs: &CompensationInputs<'_>,
    settings: &CompensationSettings,
    sample_rate: u32,
) -> Result<CompensationDesign> {
    ensure_same_rate("simulated responses", inputs.simulated_rate, sample_rate)?;
    ensure_same_rate("reference filters", inputs.reference_rate, sample_rate)?;
    let channels = inputs.simulated.num_channels();
    if inputs.reference.num_channels() != channels {
        return Err(AnalysisError::ChannelCount {
            what: "reference filters",
            expected: channels,
            found: inputs.reference.num_channels(),
        });
    }
    if let Some(expected) = settings.expected_channels.filter(|&e| e != channels) {
        return Err(AnalysisError::ChannelCount {
            what: "simulated responses",
            expected,
            found: channels,
        });
    }
    let m = settings.filter_length;
    if m < 3 || m % 2 == 0 {
        return Err(AnalysisError::invalid(format!(
            "filter length must be odd and at least 3, got {m}"
        )));
    }
    if settings.regularization < 0.0 {
        return Err(AnalysisError::invalid("regularisation must not be negative"));
    }
    if inputs.simulated.is_empty() || inputs.reference.is_empty() {
        return Err(AnalysisError::EmptyInput("loudspeaker responses"));
    }
    if inputs.target_ratio.is_empty() || inputs.direct.is_empty() {
        return Err(AnalysisError::EmptyInput("target responses"));
    }
    let fs = f64::from(sample_rate);

    // what comes out of the rig
    let mut current = vec![0.0; inputs.simulated.len() + inputs.reference.len() - 1];
    for (sim, reference) in inputs.simulated.iter().zip(inputs.reference.iter()) {
        for (c, v) in current.iter_mut().zip(convolve(sim, reference)) {
            *c += v;
        }
    }
    // what we want
    let mut target = convolve(inputs.target_ratio, inputs.direct);

    let nsamples = current.len().max(target.len());
    let fft = Fft::new(nsamples);
    let gain: Vec<f64> = fft
        .forward(&target)
        .iter()
        .zip(fft.forward(&current))
        .map(|(t, c)| t.norm() / (c.norm() + settings.regularization))
        .collect();

    let freqs = rfft_frequencies(nsamples, fs);
    let mut splits: Vec<usize> = geometric_midpoints(&CALIBRATION_CENTERS)
        .iter()
        .map(|&f| nearest_index(&freqs, f))
        .collect();
    splits.insert(0, 0);
    splits.push(gain.len());

    let band_gains_db = splits
        .windows(2)
        .zip(CALIBRATION_CENTERS)
        .map(|(w, center)| {
            let band = &gain[w[0]..w[1]];
            if band.is_empty() {
                return Err(AnalysisError::invalid(format!(
                    "{nsamples}-point spectrum too coarse to resolve the {center} Hz band"
                )));
            }
            Ok(band.iter().map(|&g| power_to_db(g)).sum::<f64>() / band.len() as f64)
        })
        .collect::<Result<Vec<f64>>>()?;
    let band_gains: Vec<f64> = band_gains_db.iter().map(|g| 10f64.powf(g / 10.0)).collect();

    // the outer bands only pin the ends of the frequency grid
    let mut grid = CALIBRATION_CENTERS.to_vec();
    grid[0] = 0.0;
    grid[CALIBRATION_CENTERS.len() - 1] = fs / 2.0;

    let linear_phase = firwin2(m, &grid, &band_gains, fs)?;
    let square_root = minimum_phase(&linear_phase)?;
    let impulse_response = convolve(&square_root, &square_root);

    current.resize(nsamples, 0.0);
    target.resize(nsamples, 0.0);
    let shift = delay_between(&target, &current)?;

    tracing::info!(
        "calibration will cut {} samples / {:.2} ms",
        shift,
        shift as f64 / fs * 1000.0
    );

    Ok(CompensationDesign {
        filter: CalibrationFilter {
            impulse_response,
            shift,
            sample_rate,
        },
        band_centers: CALIBRATION_CENTERS.to_vec(),
        band_gains_db,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::rfft;
    use crate::sweep::{impulse, white_noise};

    fn flat_levels(gain_db: f64, delay_seconds: f64) -> ReflectionLevels {
        ReflectionLevels {
            direct_db: [80.0; 8],
            reflected_db: [80.0 + gain_db; 8],
            delay_seconds,
        }
    }

    #[test]
    fn test_target_ratio_flat_gain_is_delayed_impulse() {
        let fs = 48000.0;
        let h = target_ratio(&flat_levels(-6.0, 0.001), fs).unwrap();
        // 48 sample delay, 95 taps
        assert_eq!(h.len(), 95);
        let expected = db_to_linear(-6.0);
        assert!((h[48] - expected).abs() < 1e-6, "{}", h[48]);
        let rest: f64 = h
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 48)
            .map(|(_, v)| v.abs())
            .sum();
        assert!(rest < 1e-6);
    }

    #[test]
    fn test_target_ratio_follows_band_gains() {
        let fs = 48000.0;
        let mut levels = flat_levels(0.0, 0.01);
        levels.reflected_db = [80.0, 80.0, 80.0, 80.0, 74.0, 74.0, 74.0, 74.0];
        let h = target_ratio(&levels, fs).unwrap();
        assert_eq!(h.len(), 959);
        let spectrum = rfft(&h, 48000);
        let db = |f: usize| 20.0 * spectrum[f].norm().log10();
        assert!(db(250).abs() < 1.0, "{}", db(250));
        assert!((db(4000) + 6.0).abs() < 1.0, "{}", db(4000));
    }

    #[test]
    fn test_target_ratio_rejects_zero_delay() {
        assert!(target_ratio(&flat_levels(0.0, 0.0), 48000.0).is_err());
    }

    #[test]
    fn test_shifted() {
        assert_eq!(shifted(&[1.0, 2.0, 3.0], 1), vec![0.0, 1.0, 2.0]);
        assert_eq!(shifted(&[1.0, 2.0, 3.0], -2), vec![3.0, 0.0, 0.0]);
        assert_eq!(shifted(&[1.0, 2.0, 3.0], 5), vec![0.0; 3]);
    }

    fn rig(channels: usize, len: usize) -> MultiChannel {
        MultiChannel::new(
            (0..channels)
                .map(|i| {
                    let mut h = impulse(len, 10);
                    h[11] = 0.1 * i as f64;
                    h
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_design_compensation_flat_gain() {
        let fs = 48000;
        let simulated = rig(4, 1024);
        let reference = MultiChannel::new(vec![impulse(256, 0); 4]).unwrap();
        // current is 4 impulses at 10 plus small echoes; the target is twice
        // the plain sum, 30 samples later
        let mut target_ratio = vec![0.0; 64];
        target_ratio[40] = 8.0;
        let direct = impulse(32, 0);

        let inputs = CompensationInputs {
            simulated: &simulated,
            simulated_rate: fs,
            reference: &reference,
            reference_rate: fs,
            target_ratio: &target_ratio,
            direct: &direct,
        };
        let settings = CompensationSettings {
            filter_length: 63,
            regularization: 0.0,
            expected_channels: Some(4),
        };
        let design = design_compensation(&inputs, &settings, fs).unwrap();
        assert_eq!(design.filter.impulse_response.len(), 63);
        assert_eq!(design.filter.sample_rate, fs);
        // current arrives 30 samples early, so 30 zeros get prepended
        assert_eq!(design.filter.shift, -30);
        assert_eq!(design.band_gains_db.len(), 10);
        // |current| stays within 4 ± 0.6, so the gain is close to 2
        for g in &design.band_gains_db[1..9] {
            assert!((g - 10.0 * 2f64.log10()).abs() < 1.0, "{g}");
        }
    }

    #[test]
    fn test_design_compensation_preconditions() {
        let simulated = rig(2, 256);
        let reference = MultiChannel::new(vec![impulse(64, 0); 3]).unwrap();
        let ratio = impulse(16, 4);
        let direct = white_noise(16, 1.0, 1);
        let mut inputs = CompensationInputs {
            simulated: &simulated,
            simulated_rate: 48000,
            reference: &reference,
            reference_rate: 48000,
            target_ratio: &ratio,
            direct: &direct,
        };
        let settings = CompensationSettings::default();
        assert!(matches!(
            design_compensation(&inputs, &settings, 48000),
            Err(AnalysisError::ChannelCount { .. })
        ));

        let reference2 = MultiChannel::new(vec![impulse(64, 0); 2]).unwrap();
        inputs.reference = &reference2;
        inputs.reference_rate = 44100;
        assert!(matches!(
            design_compensation(&inputs, &settings, 48000),
            Err(AnalysisError::SampleRateMismatch { .. })
        ));

        inputs.reference_rate = 48000;
        let even = CompensationSettings {
            filter_length: 512,
            ..settings
        };
        assert!(design_compensation(&inputs, &even, 48000).is_err());
        let wrong_count = CompensationSettings {
            expected_channels: Some(64),
            ..settings
        };
        assert!(matches!(
            design_compensation(&inputs, &wrong_count, 48000),
            Err(AnalysisError::ChannelCount { expected: 64, .. })
        ));
    }
}

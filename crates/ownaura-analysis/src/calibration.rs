//! Applying a compensation filter to a multichannel filter bank.
//!
//! Every channel is convolved with the calibration response. A positive
//! shift then drops that many leading samples from every channel, a
//! negative shift prepends that many zeros, so all channels keep their
//! relative alignment.

use crate::conv::convolve;
use crate::error::{AnalysisError, Result, ensure_same_rate};
use ownaura_core::{CalibrationFilter, MultiChannel};

/// A calibrated filter bank.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedBank {
    /// Calibrated channels.
    pub channels: MultiChannel,
    /// Fraction of the convolved energy removed by a positive shift.
    pub discarded_energy_fraction: f64,
}

/// Convolve every channel of `bank` with `filter` and apply its shift.
///
/// # Errors
///
/// Fails with [`AnalysisError::SampleRateMismatch`] if `bank_sample_rate`
/// differs from the filter's sample rate, and with
/// [`AnalysisError::InvalidArgument`] if a positive shift would remove every
/// sample of the convolved bank.
pub fn apply_calibration(
    bank: &MultiChannel,
    bank_sample_rate: u32,
    filter: &CalibrationFilter,
) -> Result<CalibratedBank> {
    ensure_same_rate("filter bank and calibration filter", bank_sample_rate, filter.sample_rate)?;

    let convolved = bank.map_channels(|ch| convolve(ch, &filter.impulse_response))?;
    let total = convolved.energy();

    let (channels, discarded) = match filter.shift {
        0 => (convolved, 0.0),
        cut if cut > 0 => {
            let cut = cut as usize;
            if cut >= convolved.len() {
                return Err(AnalysisError::invalid(format!(
                    "shift of {cut} samples removes the whole {}-sample calibrated response",
                    convolved.len()
                )));
            }
            let removed: f64 = convolved
                .iter()
                .flat_map(|ch| &ch[..cut])
                .map(|s| s * s)
                .sum();
            let kept = convolved.map_channels(|ch| ch[cut..].to_vec())?;
            let fraction = if total > 0.0 { removed / total } else { 0.0 };
            tracing::info!(
                "cutting {:.5}% of energy in filter ({} samples)",
                fraction * 100.0,
                cut
            );
            (kept, fraction)
        }
        pad => {
            let pad = pad.unsigned_abs() as usize;
            let padded = convolved.map_channels(|ch| {
                let mut out = vec![0.0; pad];
                out.extend_from_slice(ch);
                out
            })?;
            tracing::debug!(pad, "prepended zeros to filter");
            (padded, 0.0)
        }
    };

    Ok(CalibratedBank {
        channels,
        discarded_energy_fraction: discarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisError;

    fn bank() -> MultiChannel {
        MultiChannel::new(vec![vec![1.0, 2.0, 3.0, 0.0], vec![0.0, -1.0, 0.5, 0.25]]).unwrap()
    }

    #[test]
    fn test_identity_reproduces_bank() {
        let out = apply_calibration(&bank(), 48000, &CalibrationFilter::identity(48000)).unwrap();
        assert_eq!(out.channels, bank());
        assert_eq!(out.discarded_energy_fraction, 0.0);
    }

    #[test]
    fn test_positive_shift_cuts_and_reports_energy() {
        let filter = CalibrationFilter {
            impulse_response: vec![1.0, 0.0],
            shift: 1,
            sample_rate: 48000,
        };
        let out = apply_calibration(&bank(), 48000, &filter).unwrap();
        assert_eq!(out.channels.len(), 4);
        assert_eq!(out.channels.channel(0).unwrap(), &[2.0, 3.0, 0.0, 0.0]);
        // 1² of 1+4+9+1+0.25+0.0625
        let expected = 1.0 / 15.3125;
        assert!((out.discarded_energy_fraction - expected).abs() < 1e-12);
    }

    #[test]
    fn test_negative_shift_prepends_zeros() {
        let filter = CalibrationFilter {
            impulse_response: vec![0.5],
            shift: -2,
            sample_rate: 48000,
        };
        let out = apply_calibration(&bank(), 48000, &filter).unwrap();
        assert_eq!(
            out.channels.channel(1).unwrap(),
            &[0.0, 0.0, 0.0, -0.5, 0.25, 0.125]
        );
    }

    #[test]
    fn test_shift_beyond_length_rejected() {
        // identity filter keeps 4 samples; cutting 4 or more leaves nothing
        for shift in [4, 100] {
            let filter = CalibrationFilter {
                impulse_response: vec![1.0],
                shift,
                sample_rate: 48000,
            };
            let err = apply_calibration(&bank(), 48000, &filter);
            assert!(matches!(err, Err(AnalysisError::InvalidArgument(_))), "{err:?}");
        }

        let filter = CalibrationFilter {
            impulse_response: vec![1.0],
            shift: 3,
            sample_rate: 48000,
        };
        let out = apply_calibration(&bank(), 48000, &filter).unwrap();
        assert_eq!(out.channels.len(), 1);
    }

    #[test]
    fn test_sample_rate_mismatch() {
        let err = apply_calibration(&bank(), 44100, &CalibrationFilter::identity(48000));
        assert!(matches!(err, Err(AnalysisError::SampleRateMismatch { .. })));
    }
}

//! Room acoustic parameters from binaural head-and-torso recordings.
//!
//! A head-and-torso simulator (HATS) speaks through its mouth loudspeaker
//! while its ears and a headset microphone record. The transfer functions
//! from the headset to each ear are the binaural room responses, from which
//! this module derives:
//!
//! - `T30` per octave band and `DT40` over the full band, averaged over
//!   both ears
//! - room gain `G_RG = 10·log10(E_room / E_anechoic)`
//! - voice support `ST_V = 10·log10(E_reverb / E_direct)`, splitting each
//!   response with complementary Hann fades around 5 ms
//! - room gain predicted from voice support, `10·log10(10^(ST_V/10) + 1)`

use crate::bands::{BandSpec, OCTAVE_CENTERS};
use crate::error::{AnalysisError, Result, ensure_same_len};
use crate::reverb::{DecayRange, mean_decay_times, reverberation_time};
use crate::transfer_fn::{Regularization, transfer_function};
use crate::window::{FadeWindow, frequency_window, time_window};
use ownaura_core::{power_to_db, seconds_to_samples};

/// One recording of the two ears and the headset microphone.
#[derive(Debug, Clone, Copy)]
pub struct HatsRecording<'a> {
    /// Left ear microphone.
    pub left_ear: &'a [f64],
    /// Right ear microphone.
    pub right_ear: &'a [f64],
    /// Headset microphone, the reference.
    pub headset: &'a [f64],
}

/// Processing parameters for room analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomSettings {
    /// Band limits applied to the ear recordings before deconvolution.
    pub frequency_window: FadeWindow,
    /// Reference energy floor below its peak, in dB.
    pub regularization_db: f64,
    /// Length kept of each response, in seconds.
    pub response_seconds: f64,
    /// Fade separating direct from reverberant sound, in seconds.
    pub direct_split: (f64, f64),
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            frequency_window: FadeWindow {
                fade_in: Some((60.0, 88.0)),
                fade_out: Some((12000.0, 14000.0)),
            },
            regularization_db: 50.0,
            response_seconds: 5.0,
            direct_split: (0.0045, 0.0055),
        }
    }
}

/// Left and right ear impulse responses.
#[derive(Debug, Clone, PartialEq)]
pub struct BinauralResponse {
    /// Headset to left ear.
    pub left: Vec<f64>,
    /// Headset to right ear.
    pub right: Vec<f64>,
}

impl BinauralResponse {
    /// Energy averaged over both ears.
    pub fn energy(&self) -> f64 {
        (energy(&self.left) + energy(&self.right)) / 2.0
    }
}

fn energy(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// Binaural impulse responses of a HATS recording.
///
/// # Errors
///
/// The three channels must have equal, non-zero length.
pub fn binaural_response(
    recording: &HatsRecording<'_>,
    sample_rate: f64,
    settings: &RoomSettings,
) -> Result<BinauralResponse> {
    ensure_same_len("left ear and headset", recording.left_ear.len(), recording.headset.len())?;
    ensure_same_len("right ear and headset", recording.right_ear.len(), recording.headset.len())?;

    let keep = seconds_to_samples(settings.response_seconds, sample_rate);
    let regularization = Regularization::LimitDb(settings.regularization_db);
    let ear = |x: &[f64]| -> Result<Vec<f64>> {
        let windowed = frequency_window(x, sample_rate, &settings.frequency_window)?;
        let mut h = transfer_function(recording.headset, &windowed, regularization)?;
        h.truncate(keep);
        Ok(h)
    };

    Ok(BinauralResponse {
        left: ear(recording.left_ear)?,
        right: ear(recording.right_ear)?,
    })
}

/// Acoustic parameters of one room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomParameters {
    /// `T30` per octave band 125 Hz to 8 kHz, in seconds.
    pub t30: Vec<Option<f64>>,
    /// Full-band `DT40`, in seconds.
    pub dt40: Option<f64>,
    /// Room gain in dB.
    pub room_gain_db: f64,
    /// Voice support in dB.
    pub voice_support_db: f64,
    /// Room gain predicted from the voice support, in dB.
    pub room_gain_from_voice_support_db: f64,
}

impl RoomParameters {
    /// Column names matching [`values`](Self::values).
    pub fn column_names() -> Vec<String> {
        OCTAVE_CENTERS
            .iter()
            .map(|c| format!("T_30 {c} [s]"))
            .chain([
                "DT_40,ME [s]".to_string(),
                "Room Gain G_RG [dB]".to_string(),
                "Voice Support ST_V [dB]".to_string(),
                "G_RG from ST_V [dB]".to_string(),
            ])
            .collect()
    }

    /// All parameters as one row; undefined decay times are `None`.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.t30
            .iter()
            .copied()
            .chain([
                self.dt40,
                Some(self.room_gain_db),
                Some(self.voice_support_db),
                Some(self.room_gain_from_voice_support_db),
            ])
            .collect()
    }
}

/// Parameters of `room` relative to an anechoic reference energy.
///
/// # Errors
///
/// Fails on empty responses and when the anechoic or direct energy is zero.
pub fn room_parameters(
    room: &BinauralResponse,
    anechoic_energy: f64,
    sample_rate: f64,
    settings: &RoomSettings,
) -> Result<RoomParameters> {
    if !(anechoic_energy > 0.0) {
        return Err(AnalysisError::invalid("anechoic energy must be positive"));
    }

    let t30 = mean_decay_times(
        &reverberation_time(sample_rate, &room.left, BandSpec::Octave, DecayRange::T30)?,
        &reverberation_time(sample_rate, &room.right, BandSpec::Octave, DecayRange::T30)?,
    );
    let dt40 = mean_decay_times(
        &reverberation_time(sample_rate, &room.left, BandSpec::Fullband, DecayRange::DT40)?,
        &reverberation_time(sample_rate, &room.right, BandSpec::Fullband, DecayRange::DT40)?,
    )
    .first()
    .copied()
    .flatten();

    let room_gain_db = power_to_db(room.energy() / anechoic_energy);

    let (start, end) = settings.direct_split;
    let direct_window = FadeWindow {
        fade_in: None,
        fade_out: Some((start, end)),
    };
    let reverb_window = FadeWindow {
        fade_in: Some((start, end)),
        fade_out: None,
    };
    let split = |x: &[f64], w: &FadeWindow| time_window(x, sample_rate, w).map(|y| energy(&y));
    let direct = (split(&room.left, &direct_window)? + split(&room.right, &direct_window)?) / 2.0;
    let reverb = (split(&room.left, &reverb_window)? + split(&room.right, &reverb_window)?) / 2.0;
    if direct == 0.0 {
        return Err(AnalysisError::invalid(
            "response has no energy before the direct sound split",
        ));
    }
    let voice_support_db = power_to_db(reverb / direct);
    let room_gain_from_voice_support_db = power_to_db(10f64.powf(voice_support_db / 10.0) + 1.0);

    tracing::debug!(room_gain_db, voice_support_db, "room energy parameters");
    Ok(RoomParameters {
        t30,
        dt40,
        room_gain_db,
        voice_support_db,
        room_gain_from_voice_support_db,
    })
}

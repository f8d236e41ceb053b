//! Configuration file format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Measurement and analysis configuration.
///
/// Every field has a default, so an empty file (or no file at all) gives
/// the rig's standard settings.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
///
/// [calibration]
/// regularization = 1e-10
/// filter_length = 511
/// loudspeakers = 64
///
/// [calibration.channels]
/// measurement_mic = 0
/// headset = 1
///
/// [room]
/// regularization_db = 50.0
/// direct_split = [0.0045, 0.0055]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Sample rate of every recording and filter, in Hz.
    pub sample_rate: u32,
    /// Excitation for offline impulse-response measurements.
    pub sweep: SweepConfig,
    /// Compensation filter design.
    pub calibration: CalibrationConfig,
    /// Room acoustic parameters from HATS recordings.
    pub room: RoomConfig,
    /// Conversion of recordings to sound pressure.
    pub sound_pressure: SoundPressureConfig,
    /// Cropping of archived impulse responses.
    pub time_window: FadeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            sweep: SweepConfig::default(),
            calibration: CalibrationConfig::default(),
            room: RoomConfig::default(),
            sound_pressure: SoundPressureConfig::default(),
            time_window: FadeConfig {
                fade_in: Some((0.0195, 0.0197)),
                fade_out: Some((0.023, 0.024)),
            },
        }
    }
}

impl Config {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Hann fade edges in seconds (time windows) or Hz (frequency windows).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FadeConfig {
    /// Rising edge `(start, end)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_in: Option<(f64, f64)>,
    /// Falling edge `(start, end)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_out: Option<(f64, f64)>,
}

/// Exponential sweep excitation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    /// Sweep duration in seconds.
    pub duration: f64,
    /// Hann fade at both ends in seconds.
    pub fade: f64,
    /// Start frequency in Hz; derived from the duration when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_frequency: Option<f64>,
    /// End frequency in Hz; Nyquist when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_frequency: Option<f64>,
    /// Peak amplitude.
    pub amplitude: f64,
    /// Silence appended to capture the decay, in seconds.
    pub post_silence: f64,
    /// Recordings averaged per channel.
    pub repetitions: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            fade: 0.0,
            start_frequency: None,
            end_frequency: None,
            amplitude: 0.03,
            post_silence: 0.3,
            repetitions: 3,
        }
    }
}

/// Channel roles in a two-microphone recording.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalibrationChannels {
    /// Measurement microphone at the listening position.
    pub measurement_mic: usize,
    /// Headset microphone.
    pub headset: usize,
}

/// Channel roles in a head-and-torso recording.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HatsChannels {
    /// Left ear microphone.
    pub left_ear: usize,
    /// Right ear microphone.
    pub right_ear: usize,
    /// Headset microphone.
    pub headset: usize,
}

impl Default for HatsChannels {
    fn default() -> Self {
        Self {
            left_ear: 0,
            right_ear: 1,
            headset: 2,
        }
    }
}

/// Channel roles in a recording made through the convolver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConvolverChannels {
    /// Measurement microphone.
    pub measurement_mic: usize,
    /// Headset microphone.
    pub headset: usize,
}

impl Default for ConvolverChannels {
    fn default() -> Self {
        Self {
            measurement_mic: 0,
            headset: 1,
        }
    }
}

/// Compensation filter design settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Regularization of the band gain estimate.
    pub regularization: f64,
    /// Regularization of the direct-path Wiener filter.
    pub direct_regularization: f64,
    /// Welch segment length of the direct-path estimate.
    pub window_length: usize,
    /// Whether the direct-path filter is truncated to the window length.
    pub constrained: bool,
    /// Taps of the compensation filter (odd).
    pub filter_length: usize,
    /// Number of loudspeaker channels every filter bank must have.
    pub loudspeakers: usize,
    /// Channels of the calibration recording.
    pub channels: CalibrationChannels,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            regularization: 1e-10,
            direct_regularization: 1e-14,
            window_length: 512,
            constrained: true,
            filter_length: 511,
            loudspeakers: 64,
            channels: CalibrationChannels {
                measurement_mic: 0,
                headset: 1,
            },
        }
    }
}

/// Room acoustic parameter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoomConfig {
    /// Reference energy floor below its peak, in dB.
    pub regularization_db: f64,
    /// Length kept of each binaural response, in seconds.
    pub response_seconds: f64,
    /// Fade separating direct from reverberant sound, in seconds.
    pub direct_split: (f64, f64),
    /// Band limits applied to the ear recordings, in Hz.
    pub frequency_window: FadeConfig,
    /// Channels of the HATS recordings.
    pub channels: HatsChannels,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            regularization_db: 50.0,
            response_seconds: 5.0,
            direct_split: (0.0045, 0.0055),
            frequency_window: FadeConfig {
                fade_in: Some((60.0, 88.0)),
                fade_out: Some((12000.0, 14000.0)),
            },
            channels: HatsChannels::default(),
        }
    }
}

/// Sound pressure calibration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoundPressureConfig {
    /// Calibrator level in dB SPL.
    pub calibrator_level_db: f64,
    /// Welch segment length of the headset response.
    pub window_length: usize,
    /// Regularization of the headset response.
    pub regularization: f64,
    /// Channels of the headset calibration recording.
    pub calibration_channels: CalibrationChannels,
    /// Channels of recordings made through the convolver.
    pub convolver_channels: ConvolverChannels,
}

impl Default for SoundPressureConfig {
    fn default() -> Self {
        Self {
            calibrator_level_db: 94.0,
            window_length: 1024,
            regularization: 1e-13,
            calibration_channels: CalibrationChannels {
                measurement_mic: 1,
                headset: 2,
            },
            convolver_channels: ConvolverChannels::default(),
        }
    }
}

//! Measurement data model.
//!
//! Every pipeline stage consumes and produces these values by ownership;
//! operations return new values instead of editing buffers shared between
//! stages.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Octave band centres (Hz) covered by [`ReflectionLevels`].
pub const REFLECTION_BANDS: [f64; 8] = [63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0];

/// Errors raised when constructing data-model values.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalError {
    /// A multichannel value needs at least one channel.
    NoChannels,
    /// Channel `index` has `found` samples where `expected` were required.
    RaggedChannels {
        /// Offending channel index.
        index: usize,
        /// Length of channel 0.
        expected: usize,
        /// Length of the offending channel.
        found: usize,
    },
    /// Requested channel does not exist.
    ChannelOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of channels available.
        count: usize,
    },
    /// Interleaved buffer length is not a multiple of the channel count.
    InterleavedLength {
        /// Buffer length.
        len: usize,
        /// Channel count.
        channels: usize,
    },
}

impl core::fmt::Display for SignalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoChannels => write!(f, "multichannel signal needs at least one channel"),
            Self::RaggedChannels {
                index,
                expected,
                found,
            } => write!(
                f,
                "channel {index} has {found} samples, expected {expected}"
            ),
            Self::ChannelOutOfRange { index, count } => {
                write!(f, "channel {index} out of range ({count} channels)")
            }
            Self::InterleavedLength { len, channels } => write!(
                f,
                "interleaved length {len} is not a multiple of {channels} channels"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SignalError {}

/// Channel-major bank of equal-length signals.
///
/// Used for loudspeaker impulse responses, reference filter banks and raw
/// multichannel recordings. The channel count is fixed at construction and
/// all channels share one length.
///
/// # Example
///
/// ```rust
/// use ownaura_core::MultiChannel;
///
/// let bank = MultiChannel::new(vec![vec![1.0, 0.0], vec![0.5, 0.5]]).unwrap();
/// assert_eq!(bank.num_channels(), 2);
/// assert_eq!(bank.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MultiChannel {
    channels: Vec<Vec<f64>>,
}

impl MultiChannel {
    /// Builds a bank from per-channel sample vectors.
    pub fn new(channels: Vec<Vec<f64>>) -> Result<Self, SignalError> {
        let expected = channels.first().ok_or(SignalError::NoChannels)?.len();
        if let Some((index, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != expected)
        {
            return Err(SignalError::RaggedChannels {
                index,
                expected,
                found: ch.len(),
            });
        }
        Ok(Self { channels })
    }

    /// Builds a single-channel bank.
    pub fn from_mono(samples: Vec<f64>) -> Self {
        Self {
            channels: vec![samples],
        }
    }

    /// Builds a bank of `num_channels` zero-filled channels of `len` samples.
    pub fn zeros(num_channels: usize, len: usize) -> Result<Self, SignalError> {
        if num_channels == 0 {
            return Err(SignalError::NoChannels);
        }
        Ok(Self {
            channels: vec![vec![0.0; len]; num_channels],
        })
    }

    /// De-interleaves frame-major samples (`[c0, c1, c0, c1, ...]`).
    pub fn from_interleaved(samples: &[f64], num_channels: usize) -> Result<Self, SignalError> {
        if num_channels == 0 {
            return Err(SignalError::NoChannels);
        }
        if samples.len() % num_channels != 0 {
            return Err(SignalError::InterleavedLength {
                len: samples.len(),
                channels: num_channels,
            });
        }
        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in channels.iter_mut().zip(frame) {
                ch.push(s);
            }
        }
        Ok(Self { channels })
    }

    /// Interleaves the bank into frame-major order.
    pub fn to_interleaved(&self) -> Vec<f64> {
        let frames = self.len();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for i in 0..frames {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// True when every channel is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow one channel.
    pub fn channel(&self, index: usize) -> Result<&[f64], SignalError> {
        self.channels
            .get(index)
            .map(Vec::as_slice)
            .ok_or(SignalError::ChannelOutOfRange {
                index,
                count: self.channels.len(),
            })
    }

    /// Borrow all channels.
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Consume the bank, returning its channels.
    pub fn into_channels(self) -> Vec<Vec<f64>> {
        self.channels
    }

    /// Iterate over channels as slices.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.channels.iter().map(Vec::as_slice)
    }

    /// Applies `f` to every channel, producing a new bank.
    ///
    /// `f` must return the same length for every channel.
    pub fn map_channels<F>(&self, mut f: F) -> Result<Self, SignalError>
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        Self::new(self.channels.iter().map(|ch| f(ch)).collect())
    }

    /// Truncates or zero-pads every channel to `len` samples.
    pub fn resized(&self, len: usize) -> Self {
        let channels = self
            .channels
            .iter()
            .map(|ch| {
                let mut out = ch.clone();
                out.resize(len, 0.0);
                out
            })
            .collect();
        Self { channels }
    }

    /// Sum of squared samples over all channels.
    pub fn energy(&self) -> f64 {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|s| s * s)
            .sum()
    }
}

/// Compensation filter artifact.
///
/// Produced by the compensation designer and consumed by the calibration
/// applier. A positive `shift` cuts that many leading samples after
/// convolution; a negative `shift` pads that many leading zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationFilter {
    /// Minimum-phase impulse response.
    pub impulse_response: Vec<f64>,
    /// Samples to cut (positive) or pad (negative) at the start.
    pub shift: i64,
    /// Sample rate the filter was designed for, in Hz.
    pub sample_rate: u32,
}

impl CalibrationFilter {
    /// A pass-through filter: unit impulse, no shift.
    pub fn identity(sample_rate: u32) -> Self {
        Self {
            impulse_response: vec![1.0],
            shift: 0,
            sample_rate,
        }
    }

    /// The shift expressed in seconds.
    pub fn shift_seconds(&self) -> f64 {
        self.shift as f64 / self.sample_rate as f64
    }
}

/// Direct and first-reflection levels per octave band.
///
/// Levels are sound pressure levels in dB for the bands in
/// [`REFLECTION_BANDS`]; `delay_seconds` is the arrival time of the reflection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionLevels {
    /// Direct sound SPL per band.
    pub direct_db: [f64; 8],
    /// First reflection SPL per band.
    pub reflected_db: [f64; 8],
    /// Reflection arrival time in seconds.
    pub delay_seconds: f64,
}

impl ReflectionLevels {
    /// Band centre frequencies in Hz.
    pub fn band_centers(&self) -> &'static [f64; 8] {
        &REFLECTION_BANDS
    }

    /// Reflected-to-direct level difference per band in dB.
    pub fn gain_db(&self) -> [f64; 8] {
        let mut out = [0.0; 8];
        for (o, (r, d)) in out
            .iter_mut()
            .zip(self.reflected_db.iter().zip(self.direct_db.iter()))
        {
            *o = r - d;
        }
        out
    }
}

//! Multichannel WAV reading and writing.

use crate::aiff::{is_aiff, read_aiff_channels, read_aiff_info};
use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use ownaura_core::MultiChannel;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample; 32 is written as float.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read WAV or AIFF metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let path = path.as_ref();
    if is_aiff(path) {
        return read_aiff_info(path);
    }
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let num_frames = u64::from(reader.duration());
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// Read every channel of a WAV or AIFF file.
///
/// Integer PCM is scaled to `[-1, 1)`; float files are read as stored.
/// `.aif`, `.aiff` and `.aifc` paths are decoded as AIFF.
///
/// # Example
/// ```ignore
/// let (bank, spec) = read_wav_channels("filters.wav")?;
/// println!("{} channels at {} Hz", bank.num_channels(), spec.sample_rate);
/// ```
pub fn read_wav_channels<P: AsRef<Path>>(path: P) -> Result<(MultiChannel, WavSpec)> {
    let path = path.as_ref();
    if is_aiff(path) {
        return read_aiff_channels(path);
    }
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());

    let interleaved: Vec<f64> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let full_scale = f64::from(1u32 << (spec.bits_per_sample - 1));
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| f64::from(v) / full_scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let channels = MultiChannel::from_interleaved(&interleaved, usize::from(spec.channels))?;
    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        frames = channels.len(),
        sample_rate = spec.sample_rate,
        "read wav"
    );
    Ok((channels, spec))
}

/// Write all channels as 32-bit float samples.
pub fn write_wav_channels<P: AsRef<Path>>(
    path: P,
    signals: &MultiChannel,
    sample_rate: u32,
) -> Result<()> {
    let spec = WavSpec {
        sample_rate,
        ..WavSpec::default()
    };
    write_wav_channels_with_spec(path, signals, spec)
}

/// Write all channels with an explicit bit depth.
///
/// The channel count of `spec` is replaced by that of `signals`. Integer
/// output is clamped to full scale.
pub fn write_wav_channels_with_spec<P: AsRef<Path>>(
    path: P,
    signals: &MultiChannel,
    spec: WavSpec,
) -> Result<()> {
    let channels = u16::try_from(signals.num_channels()).map_err(|_| {
        Error::UnsupportedFormat(format!("{} channels", signals.num_channels()))
    })?;
    let spec = WavSpec { channels, ..spec };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    let interleaved = signals.to_interleaved();
    if spec.bits_per_sample == 32 {
        for &sample in &interleaved {
            writer.write_sample(sample as f32)?;
        }
    } else {
        let max_val = f64::from(1u32 << (spec.bits_per_sample - 1));
        for &sample in &interleaved {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

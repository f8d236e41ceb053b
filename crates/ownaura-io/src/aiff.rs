//! AIFF decoding.
//!
//! The measurement rig exports its recordings as big-endian AIFF. They are
//! decoded with symphonia into the same `[-1, 1)` scale the WAV reader uses.

use crate::wav::{WavFormat, WavInfo, WavSpec};
use crate::{Error, Result};
use ownaura_core::MultiChannel;
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{
    CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F64BE, CodecParameters, DecoderOptions,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// True for `.aif`, `.aiff` and `.aifc` paths.
pub(crate) fn is_aiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|e| matches!(e.as_str(), "aif" | "aiff" | "aifc"))
}

fn open(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let opened = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    Ok(opened.format)
}

fn missing(path: &Path, what: &str) -> Error {
    Error::UnsupportedFormat(format!("{} has no {what}", path.display()))
}

fn track_params(format: &dyn FormatReader, path: &Path) -> Result<(u32, CodecParameters)> {
    let track = format
        .default_track()
        .ok_or_else(|| missing(path, "audio track"))?;
    Ok((track.id, track.codec_params.clone()))
}

fn spec_of(params: &CodecParameters, path: &Path) -> Result<WavSpec> {
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| missing(path, "sample rate"))?;
    let channels = params
        .channels
        .map(|c| c.count())
        .ok_or_else(|| missing(path, "channel layout"))?;
    let channels = u16::try_from(channels)
        .map_err(|_| Error::UnsupportedFormat(format!("{channels} channels")))?;
    let bits_per_sample = params
        .bits_per_sample
        .and_then(|b| u16::try_from(b).ok())
        .unwrap_or(32);

    Ok(WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
    })
}

pub(crate) fn read_aiff_info(path: &Path) -> Result<WavInfo> {
    let format = open(path)?;
    let (_, params) = track_params(format.as_ref(), path)?;
    let spec = spec_of(&params, path)?;
    let num_frames = params.n_frames.unwrap_or(0);

    let format_kind = match params.codec {
        CODEC_TYPE_PCM_F32BE | CODEC_TYPE_PCM_F64BE => WavFormat::IeeeFloat,
        _ => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs: num_frames as f64 / f64::from(spec.sample_rate),
        format: format_kind,
    })
}

pub(crate) fn read_aiff_channels(path: &Path) -> Result<(MultiChannel, WavSpec)> {
    let mut format = open(path)?;
    let (track_id, params) = track_params(format.as_ref(), path)?;
    let spec = spec_of(&params, path)?;

    let mut decoder =
        symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

    let mut interleaved = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet)?;
        let mut buffer = SampleBuffer::<f64>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(buffer.samples());
    }

    let channels = MultiChannel::from_interleaved(&interleaved, usize::from(spec.channels))?;
    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        frames = channels.len(),
        sample_rate = spec.sample_rate,
        "read aiff"
    );
    Ok((channels, spec))
}

//! Transfer function estimation between an excitation and a recording.

use super::common::{channel, ensure_rate, read_bank};
use clap::Args;
use ownaura_analysis::{Regularization, transfer_function};
use ownaura_config::Config;
use ownaura_core::MultiChannel;
use ownaura_io::write_wav_channels;
use std::path::PathBuf;

#[derive(Args)]
pub struct TransferArgs {
    /// Excitation (reference) WAV file
    #[arg(value_name = "EXCITATION")]
    excitation: PathBuf,

    /// Recorded response; every channel is deconvolved
    #[arg(value_name = "RECORDING")]
    recording: PathBuf,

    /// Output impulse response WAV file
    #[arg(short, long)]
    output: PathBuf,

    /// Limit the reference energy floor to this many dB below its peak
    #[arg(long, conflicts_with = "regularization")]
    limit_db: Option<f64>,

    /// Constant added to the reference power spectrum
    #[arg(long)]
    regularization: Option<f64>,

    /// Keep only this many seconds of each response
    #[arg(long)]
    length: Option<f64>,
}

pub fn run(args: TransferArgs, config: &Config) -> anyhow::Result<()> {
    let (excitation, fs_x) = read_bank(&args.excitation)?;
    let (recording, fs_y) = read_bank(&args.recording)?;
    ensure_rate(&args.excitation, fs_x, config.sample_rate)?;
    ensure_rate(&args.recording, fs_y, config.sample_rate)?;

    // zero-pad the shorter file so both share one FFT length
    let len = excitation.len().max(recording.len());
    let excitation = excitation.resized(len);
    let recording = recording.resized(len);
    let reference = channel(&excitation, 0, "excitation")?;

    let regularization = match (args.limit_db, args.regularization) {
        (Some(db), _) => Regularization::LimitDb(db),
        (None, Some(eps)) => Regularization::Constant(eps),
        (None, None) => Regularization::default(),
    };

    println!(
        "Deconvolving {} channel(s), {} samples",
        recording.num_channels(),
        recording.len()
    );
    let mut responses = recording
        .iter()
        .map(|y| transfer_function(reference, y, regularization))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(seconds) = args.length {
        let keep = ownaura_core::seconds_to_samples(seconds, f64::from(fs_y));
        for h in &mut responses {
            h.truncate(keep);
        }
    }

    write_wav_channels(&args.output, &MultiChannel::new(responses)?, fs_y)?;
    println!("Saved {}", args.output.display());
    Ok(())
}

//! Offline impulse-response measurement from repeated sweep recordings.
//!
//! Each recording holds one channel per loudspeaker (or microphone) captured
//! while the excitation played. Responses are deconvolved per channel and
//! averaged over the repetitions.

use super::common::{channel, ensure_rate, progress_bar, read_bank};
use anyhow::bail;
use clap::Args;
use ownaura_analysis::Regularization;
use ownaura_analysis::transfer_fn::deconvolve_recordings;
use ownaura_config::Config;
use ownaura_io::ResponseArchive;
use std::path::PathBuf;

#[derive(Args)]
pub struct DeconvolveArgs {
    /// Excitation WAV file
    #[arg(value_name = "EXCITATION")]
    excitation: PathBuf,

    /// Repeated recordings of the same excitation
    #[arg(value_name = "RECORDINGS", required = true)]
    recordings: Vec<PathBuf>,

    /// Output archive (JSON)
    #[arg(short, long)]
    output: PathBuf,

    /// Limit the reference energy floor to this many dB below its peak
    #[arg(long)]
    limit_db: Option<f64>,
}

pub fn run(args: DeconvolveArgs, config: &Config) -> anyhow::Result<()> {
    let (excitation, fs) = read_bank(&args.excitation)?;
    ensure_rate(&args.excitation, fs, config.sample_rate)?;
    let x = channel(&excitation, 0, "excitation")?.to_vec();
    if args.recordings.len() != config.sweep.repetitions {
        tracing::warn!(
            found = args.recordings.len(),
            configured = config.sweep.repetitions,
            "number of recordings differs from configured repetitions"
        );
    }

    let pb = progress_bar(args.recordings.len() as u64)?;
    let mut repetitions = Vec::with_capacity(args.recordings.len());
    for path in &args.recordings {
        pb.set_message(path.display().to_string());
        let (recording, fs_rec) = read_bank(path)?;
        ensure_rate(path, fs_rec, fs)?;
        if recording.len() != x.len() {
            bail!(
                "{} has {} samples, the excitation has {}",
                path.display(),
                recording.len(),
                x.len()
            );
        }
        repetitions.push(recording);
        pb.inc(1);
    }
    pb.finish_with_message("loaded");

    let regularization = args
        .limit_db
        .map_or(Regularization::default(), Regularization::LimitDb);
    let responses = deconvolve_recordings(&x, &repetitions, regularization)?;
    println!(
        "Averaged {} repetition(s) into {} response(s) of {} samples",
        repetitions.len(),
        responses.num_channels(),
        responses.len()
    );

    ResponseArchive::from_bank(&responses, fs, Some(x)).write(&args.output)?;
    println!("Saved {}", args.output.display());
    Ok(())
}

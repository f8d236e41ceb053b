//! Exponential sweep generation.

use clap::Args;
use ownaura_analysis::ExponentialSweep;
use ownaura_config::Config;
use ownaura_core::MultiChannel;
use ownaura_io::write_wav_channels;
use std::path::PathBuf;

#[derive(Args)]
pub struct SweepArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Sweep duration in seconds
    #[arg(short = 't', long)]
    duration: Option<f64>,

    /// Start frequency in Hz
    #[arg(long)]
    start: Option<f64>,

    /// End frequency in Hz
    #[arg(long)]
    end: Option<f64>,

    /// Hann fade at both ends in seconds
    #[arg(long)]
    fade: Option<f64>,

    /// Peak amplitude
    #[arg(short = 'm', long)]
    amplitude: Option<f64>,

    /// Trailing silence in seconds
    #[arg(short = 'p', long)]
    post_silence: Option<f64>,
}

pub fn run(args: SweepArgs, config: &Config) -> anyhow::Result<()> {
    let defaults = &config.sweep;
    let fs = config.sample_rate;

    let mut sweep = ExponentialSweep::new(args.duration.unwrap_or(defaults.duration), f64::from(fs))
        .fade(args.fade.unwrap_or(defaults.fade))
        .amplitude(args.amplitude.unwrap_or(defaults.amplitude))
        .post_silence(args.post_silence.unwrap_or(defaults.post_silence));
    if let Some(f) = args.start.or(defaults.start_frequency) {
        sweep = sweep.start_frequency(f);
    }
    if let Some(f) = args.end.or(defaults.end_frequency) {
        sweep = sweep.end_frequency(f);
    }

    let (f1, f2) = sweep.frequencies();
    let samples = sweep.generate()?;
    println!(
        "Sweep {:.1} Hz to {:.1} Hz, {} samples at {} Hz",
        f1,
        f2,
        samples.len(),
        fs
    );

    write_wav_channels(&args.output, &MultiChannel::from_mono(samples), fs)?;
    println!("Saved {}", args.output.display());
    Ok(())
}

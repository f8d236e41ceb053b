//! Delay estimation and time alignment of two recordings.

use super::common::{channel, read_bank};
use anyhow::bail;
use clap::Args;
use ownaura_analysis::spectrum::coherence;
use ownaura_analysis::time_align;
use ownaura_core::MultiChannel;
use ownaura_io::write_wav_channels;
use std::path::PathBuf;

#[derive(Args)]
pub struct AlignArgs {
    /// Reference signal
    #[arg(value_name = "X")]
    x: PathBuf,

    /// Delayed signal
    #[arg(value_name = "Y")]
    y: PathBuf,

    /// Channel of the reference file
    #[arg(long, default_value = "0")]
    x_channel: usize,

    /// Channel of the delayed file
    #[arg(long, default_value = "0")]
    y_channel: usize,

    /// Smallest delay to consider, in seconds
    #[arg(long, requires = "max_delay", allow_negative_numbers = true)]
    min_delay: Option<f64>,

    /// Largest delay to consider, in seconds
    #[arg(long, requires = "min_delay", allow_negative_numbers = true)]
    max_delay: Option<f64>,

    /// Welch segment length for the coherence summary
    #[arg(long, default_value = "1024")]
    nperseg: usize,

    /// Write both aligned signals as a two-channel WAV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: AlignArgs) -> anyhow::Result<()> {
    let (x_bank, fs_x) = read_bank(&args.x)?;
    let (y_bank, fs_y) = read_bank(&args.y)?;
    if fs_x != fs_y {
        bail!("sample rates differ: {fs_x} Hz and {fs_y} Hz");
    }
    let len = x_bank.len().max(y_bank.len());
    let x_bank = x_bank.resized(len);
    let y_bank = y_bank.resized(len);
    let x = channel(&x_bank, args.x_channel, "reference")?;
    let y = channel(&y_bank, args.y_channel, "delayed")?;

    let range = args.min_delay.zip(args.max_delay);
    let fs = f64::from(fs_x);
    let aligned = time_align(x, y, fs, range)?;
    println!(
        "Delay:     {} samples ({:.3} ms)",
        aligned.delay_samples,
        aligned.delay_seconds * 1000.0
    );

    if len >= args.nperseg {
        let before = coherence(x, y, fs, args.nperseg)?;
        let after = coherence(&aligned.x, &aligned.y, fs, args.nperseg)?;
        println!(
            "Coherence: {:.3} before, {:.3} after alignment",
            mean(&before.values),
            mean(&after.values)
        );
    }

    if let Some(output) = args.output {
        let pair = MultiChannel::new(vec![aligned.x, aligned.y])?;
        write_wav_channels(&output, &pair, fs_x)?;
        println!("Saved {}", output.display());
    }
    Ok(())
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

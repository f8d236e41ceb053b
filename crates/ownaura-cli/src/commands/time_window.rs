//! Crop archived impulse responses with a Hann time window.

use super::common::{fade_window, parse_pair, sibling_with_suffix};
use clap::Args;
use ownaura_analysis::crop_time_window;
use ownaura_config::Config;
use ownaura_io::ResponseArchive;
use std::path::PathBuf;

#[derive(Args)]
pub struct TimeWindowArgs {
    /// Impulse response archive
    #[arg(value_name = "RESPONSE")]
    response: PathBuf,

    /// Fade-in edges in seconds, as `start,end`
    #[arg(long, value_parser = parse_pair)]
    fade_in: Option<(f64, f64)>,

    /// Fade-out edges in seconds, as `start,end`
    #[arg(long, value_parser = parse_pair)]
    fade_out: Option<(f64, f64)>,

    /// Output archive (defaults to `<stem>_windowed.json`)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: TimeWindowArgs, config: &Config) -> anyhow::Result<()> {
    let window = fade_window(&config.time_window, args.fade_in, args.fade_out)?;
    let archive = ResponseArchive::read(&args.response)?;
    let fs = f64::from(archive.fs);
    println!("Window {:?} / {:?}", window.fade_in, window.fade_out);

    let h: Vec<Vec<f64>> = archive
        .h
        .iter()
        .map(|h| crop_time_window(h, fs, &window))
        .collect::<Result<_, _>>()?;

    let output = args
        .output
        .unwrap_or_else(|| sibling_with_suffix(&args.response, "_windowed.json"));
    let windowed = ResponseArchive {
        fs: archive.fs,
        h,
        n: None,
        x: None,
        docs: None,
    };
    windowed.write(&output)?;
    println!("Created {}", output.display());
    Ok(())
}

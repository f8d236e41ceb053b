//! Apply a compensation filter to filter banks.

use super::common::{progress_bar, sibling_with_suffix};
use anyhow::{Context, bail};
use clap::Args;
use ownaura_analysis::apply_calibration;
use ownaura_core::CalibrationFilter;
use ownaura_io::{ResponseArchive, read_wav_channels, write_wav_channels};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct ApplyCalibrationArgs {
    /// Filter bank WAV file, or a folder of them
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Calibration filter archive
    #[arg(short, long, default_value = "calibration_filter.json")]
    calibration_file: PathBuf,

    /// Output file (single input only; defaults to `<stem>_calibrated.wav`)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn calibrate_file(input: &Path, output: &Path, filter: &CalibrationFilter) -> anyhow::Result<()> {
    let (bank, spec) =
        read_wav_channels(input).with_context(|| format!("reading {}", input.display()))?;
    let calibrated = apply_calibration(&bank, spec.sample_rate, filter)
        .with_context(|| format!("calibrating {}", input.display()))?;
    write_wav_channels(output, &calibrated.channels, spec.sample_rate)?;
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        discarded = calibrated.discarded_energy_fraction,
        "calibrated filter bank"
    );
    Ok(())
}

/// `*.wav` files directly inside `dir`, sorted, skipping earlier outputs.
fn wav_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        let is_output = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.ends_with("_calibrated"));
        if path.is_file() && is_wav && !is_output {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn run(args: ApplyCalibrationArgs) -> anyhow::Result<()> {
    let filter = ResponseArchive::read(&args.calibration_file)
        .and_then(|a| a.to_filter())
        .with_context(|| format!("loading {}", args.calibration_file.display()))?;

    if args.input.is_dir() {
        if args.output.is_some() {
            bail!("--output applies to a single file, not a folder");
        }
        let files = wav_files(&args.input)?;
        if files.is_empty() {
            bail!("no .wav files in {}", args.input.display());
        }

        let pb = progress_bar(files.len() as u64)?;
        for file in &files {
            pb.set_message(file.display().to_string());
            calibrate_file(file, &sibling_with_suffix(file, "_calibrated.wav"), &filter)?;
            pb.inc(1);
        }
        pb.finish_with_message("done");
        println!("Calibrated {} filter bank(s) in {}", files.len(), args.input.display());
    } else {
        let output = args
            .output
            .unwrap_or_else(|| sibling_with_suffix(&args.input, "_calibrated.wav"));
        calibrate_file(&args.input, &output, &filter)?;
        println!("Saved calibrated filter at {}", output.display());
    }
    Ok(())
}

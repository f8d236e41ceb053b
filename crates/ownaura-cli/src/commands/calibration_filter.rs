//! Compensation filter design.

use super::common::{channel, ensure_rate, read_bank};
use anyhow::Context;
use clap::Args;
use ownaura_analysis::{
    CompensationInputs, CompensationSettings, WienerSettings, design_compensation,
    direct_path_response, target_ratio,
};
use ownaura_config::Config;
use ownaura_io::{ResponseArchive, read_early_reflections};
use std::path::PathBuf;

#[derive(Args)]
pub struct CalibrationFilterArgs {
    /// Recording of the measurement microphone and the headset
    #[arg(value_name = "CALIBRATION_RECORDING")]
    calibration_recording: PathBuf,

    /// Measured loudspeaker responses of the rig (JSON archive or WAV)
    #[arg(long, value_name = "FILE")]
    simulated: PathBuf,

    /// Reference room filter bank exported from the room simulation
    #[arg(long, value_name = "WAV")]
    reference: PathBuf,

    /// Early-reflection export of the reference room
    #[arg(long, value_name = "TXT")]
    early_reflections: PathBuf,

    /// Output archive
    #[arg(short, long, default_value = "calibration_filter.json")]
    output: PathBuf,

    /// Taps of the compensation filter (odd)
    #[arg(long)]
    filter_length: Option<usize>,

    /// Regularization of the band gain estimate
    #[arg(long)]
    reg: Option<f64>,

    /// Regularization of the direct-path estimate
    #[arg(long)]
    reg_direct: Option<f64>,

    /// Welch segment length of the direct-path estimate
    #[arg(long)]
    window_length: Option<usize>,
}

pub fn run(args: CalibrationFilterArgs, config: &Config) -> anyhow::Result<()> {
    let cal = &config.calibration;
    let fs = config.sample_rate;

    println!("Computing target response from {}", args.early_reflections.display());
    let levels = read_early_reflections(&args.early_reflections)
        .with_context(|| format!("reading {}", args.early_reflections.display()))?;
    let ratio = target_ratio(&levels, f64::from(fs))?;

    println!("Computing direct path from {}", args.calibration_recording.display());
    let (recording, fs_rec) = read_bank(&args.calibration_recording)?;
    ensure_rate(&args.calibration_recording, fs_rec, fs)?;
    let wiener = WienerSettings {
        window_length: args.window_length.unwrap_or(cal.window_length),
        regularization: args.reg_direct.unwrap_or(cal.direct_regularization),
        constrained: cal.constrained,
    };
    let direct = direct_path_response(
        channel(&recording, cal.channels.measurement_mic, "measurement microphone")?,
        channel(&recording, cal.channels.headset, "headset")?,
        f64::from(fs),
        &wiener,
    )?;

    let (simulated, simulated_rate) = read_bank(&args.simulated)?;
    let (reference, reference_rate) = read_bank(&args.reference)?;

    println!("Computing calibration filter");
    let inputs = CompensationInputs {
        simulated: &simulated,
        simulated_rate,
        reference: &reference,
        reference_rate,
        target_ratio: &ratio,
        direct: &direct,
    };
    let settings = CompensationSettings {
        filter_length: args.filter_length.unwrap_or(cal.filter_length),
        regularization: args.reg.unwrap_or(cal.regularization),
        expected_channels: Some(cal.loudspeakers),
    };
    let design = design_compensation(&inputs, &settings, fs)?;

    println!("  {:>10}  {:>10}", "Band (Hz)", "Gain (dB)");
    for (center, gain) in design.band_centers.iter().zip(&design.band_gains_db) {
        println!("  {center:>10.0}  {gain:>10.2}");
    }
    println!(
        "  shift {} samples ({:.2} ms)",
        design.filter.shift,
        design.filter.shift_seconds() * 1000.0
    );

    ResponseArchive::from_filter(&design.filter).write(&args.output)?;
    println!("Created {}", args.output.display());
    Ok(())
}

//! Convert convolver recordings to calibrated sound pressure.

use super::common::{channel, ensure_rate, progress_bar, read_bank, sibling_with_suffix};
use clap::Args;
use ownaura_analysis::{
    SoundPressureCalibration, WienerSettings, average_sound_pressure_level, calibrator_gain,
    direct_path_response,
};
use ownaura_config::Config;
use ownaura_core::MultiChannel;
use ownaura_io::write_wav_channels;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct SoundPressureArgs {
    /// Recording of the calibrator at the measurement microphone
    #[arg(value_name = "CALIBRATOR_RECORDING")]
    calibrator_recording: PathBuf,

    /// Recording of the headset and measurement microphone together
    #[arg(value_name = "CALIBRATION_RECORDING")]
    calibration_recording: PathBuf,

    /// Two-channel convolver recordings to convert
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,
}

/// Calibrator gain and headset response from the two calibration recordings.
fn calibrate(args: &SoundPressureArgs, config: &Config) -> anyhow::Result<SoundPressureCalibration> {
    let sp = &config.sound_pressure;
    let roles = &sp.calibration_channels;

    let (calibrator, fs_cal) = read_bank(&args.calibrator_recording)?;
    ensure_rate(&args.calibrator_recording, fs_cal, config.sample_rate)?;
    let gain = calibrator_gain(
        channel(&calibrator, roles.measurement_mic, "measurement microphone")?,
        sp.calibrator_level_db,
    )?;

    let (recording, fs_rec) = read_bank(&args.calibration_recording)?;
    ensure_rate(&args.calibration_recording, fs_rec, config.sample_rate)?;
    let wiener = WienerSettings {
        window_length: sp.window_length,
        regularization: sp.regularization,
        constrained: true,
    };
    let headset_response = direct_path_response(
        channel(&recording, roles.measurement_mic, "measurement microphone")?,
        channel(&recording, roles.headset, "headset")?,
        f64::from(fs_rec),
        &wiener,
    )?;

    Ok(SoundPressureCalibration {
        gain,
        headset_response,
    })
}

fn convert(
    path: &Path,
    calibration: &SoundPressureCalibration,
    config: &Config,
) -> anyhow::Result<(PathBuf, f64)> {
    let (recording, fs) = read_bank(path)?;
    let roles = &config.sound_pressure.convolver_channels;

    channel(&recording, roles.headset, "headset")?;
    channel(&recording, roles.measurement_mic, "measurement microphone")?;

    let converted = MultiChannel::new(
        recording
            .iter()
            .enumerate()
            .map(|(index, x)| match index {
                i if i == roles.headset => calibration.headset(x),
                i if i == roles.measurement_mic => calibration.measurement_mic(x),
                _ => x.to_vec(),
            })
            .collect(),
    )?;
    let level = average_sound_pressure_level(channel(
        &converted,
        roles.measurement_mic,
        "measurement microphone",
    )?)?;

    let output = sibling_with_suffix(path, "_sound pressure at 1m.wav");
    write_wav_channels(&output, &converted, fs)?;
    Ok((output, level))
}

pub fn run(args: SoundPressureArgs, config: &Config) -> anyhow::Result<()> {
    println!("Computing calibration gain and headset response");
    let calibration = calibrate(&args, config)?;
    println!("  calibrator gain {:.6}", calibration.gain);

    let pb = progress_bar(args.files.len() as u64)?;
    for path in &args.files {
        pb.set_message(path.display().to_string());
        let (output, level) = convert(path, &calibration, config)?;
        pb.suspend(|| {
            println!(
                "{} -> {} (measurement microphone {level:.1} dB SPL)",
                path.display(),
                output.display()
            )
        });
        pb.inc(1);
    }
    pb.finish_with_message("done");
    Ok(())
}

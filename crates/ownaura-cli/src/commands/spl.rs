//! Average sound pressure level of calibrated convolver recordings.

use super::common::{channel, read_bank};
use clap::Args;
use ownaura_analysis::average_sound_pressure_level;
use ownaura_config::Config;
use std::path::PathBuf;

#[derive(Args)]
pub struct SplArgs {
    /// Recordings in pascals (outputs of `sound-pressure`)
    #[arg(value_name = "FILES", required = true)]
    files: Vec<PathBuf>,
}

pub fn run(args: SplArgs, config: &Config) -> anyhow::Result<()> {
    let roles = &config.sound_pressure.convolver_channels;

    println!("{:<40}  {:>12}  {:>12}", "File", "Headset", "Mic");
    for path in &args.files {
        let (recording, _) = read_bank(path)?;
        let headset = average_sound_pressure_level(channel(&recording, roles.headset, "headset")?)?;
        let mic = average_sound_pressure_level(channel(
            &recording,
            roles.measurement_mic,
            "measurement microphone",
        )?)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("{name:<40}  {headset:>9.1} dB  {mic:>9.1} dB");
    }
    Ok(())
}

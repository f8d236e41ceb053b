//! OwnAura CLI - measurement, calibration and analysis pipelines.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ownaura")]
#[command(author, version, about = "OwnAura measurement toolkit", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an exponential sweep
    Sweep(commands::sweep::SweepArgs),

    /// Deconvolve a recording against its excitation
    Transfer(commands::transfer::TransferArgs),

    /// Estimate and remove the delay between two signals
    Align(commands::align::AlignArgs),

    /// Reverberation time of impulse responses
    Reverb(commands::reverb::ReverbArgs),

    /// Room acoustic parameters from head-and-torso recordings
    RoomParams(commands::room_params::RoomParamsArgs),

    /// Averaged impulse responses from repeated sweep recordings
    Deconvolve(commands::deconvolve::DeconvolveArgs),

    /// Design a compensation filter
    CalibrationFilter(commands::calibration_filter::CalibrationFilterArgs),

    /// Apply a compensation filter to a filter bank or a folder of banks
    ApplyCalibration(commands::apply_calibration::ApplyCalibrationArgs),

    /// Crop archived impulse responses with a Hann time window
    TimeWindow(commands::time_window::TimeWindowArgs),

    /// Average sound pressure level of calibrated recordings
    Spl(commands::spl::SplArgs),

    /// Convert convolver recordings to calibrated sound pressure
    SoundPressure(commands::sound_pressure::SoundPressureArgs),

    /// Show WAV or archive metadata
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = commands::common::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Sweep(args) => commands::sweep::run(args, &config),
        Commands::Transfer(args) => commands::transfer::run(args, &config),
        Commands::Align(args) => commands::align::run(args),
        Commands::Reverb(args) => commands::reverb::run(args),
        Commands::RoomParams(args) => commands::room_params::run(args, &config),
        Commands::Deconvolve(args) => commands::deconvolve::run(args, &config),
        Commands::CalibrationFilter(args) => commands::calibration_filter::run(args, &config),
        Commands::ApplyCalibration(args) => commands::apply_calibration::run(args),
        Commands::TimeWindow(args) => commands::time_window::run(args, &config),
        Commands::Spl(args) => commands::spl::run(args, &config),
        Commands::SoundPressure(args) => commands::sound_pressure::run(args, &config),
        Commands::Info(args) => commands::info::run(args),
    }
}

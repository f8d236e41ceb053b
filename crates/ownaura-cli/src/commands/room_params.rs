//! Room acoustic parameters from head-and-torso recordings.

use super::common::{channel, ensure_rate, fade_window, progress_bar, read_bank};
use clap::Args;
use ownaura_analysis::{
    BinauralResponse, HatsRecording, RoomParameters, RoomSettings, binaural_response,
    room_parameters,
};
use ownaura_config::Config;
use ownaura_io::{Table, format_value};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct RoomParamsArgs {
    /// Recording of the HATS in the anechoic room
    #[arg(long, value_name = "WAV")]
    anechoic: PathBuf,

    /// Recordings of the HATS in the rooms to characterise
    #[arg(value_name = "ROOMS", required = true)]
    rooms: Vec<PathBuf>,

    /// Output CSV file
    #[arg(short, long, default_value = "room_acoustic_parameters.csv")]
    output: PathBuf,
}

fn settings(config: &Config) -> anyhow::Result<RoomSettings> {
    let room = &config.room;
    Ok(RoomSettings {
        frequency_window: fade_window(&room.frequency_window, None, None)?,
        regularization_db: room.regularization_db,
        response_seconds: room.response_seconds,
        direct_split: room.direct_split,
    })
}

fn load_binaural(
    path: &Path,
    config: &Config,
    settings: &RoomSettings,
) -> anyhow::Result<BinauralResponse> {
    let (recording, fs) = read_bank(path)?;
    ensure_rate(path, fs, config.sample_rate)?;
    let roles = &config.room.channels;
    let hats = HatsRecording {
        left_ear: channel(&recording, roles.left_ear, "left ear")?,
        right_ear: channel(&recording, roles.right_ear, "right ear")?,
        headset: channel(&recording, roles.headset, "headset")?,
    };
    Ok(binaural_response(&hats, f64::from(fs), settings)?)
}

fn room_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn run(args: RoomParamsArgs, config: &Config) -> anyhow::Result<()> {
    let settings = settings(config)?;
    let fs = f64::from(config.sample_rate);

    let anechoic = load_binaural(&args.anechoic, config, &settings)?;
    let anechoic_energy = anechoic.energy();
    tracing::info!(anechoic_energy, "anechoic reference");

    let mut header = vec!["Room".to_string()];
    header.extend(RoomParameters::column_names());
    let mut table = Table::new(header);

    let pb = progress_bar(args.rooms.len() as u64)?;
    for path in &args.rooms {
        let name = room_name(path);
        pb.set_message(name.clone());
        let room = load_binaural(path, config, &settings)?;
        let params = room_parameters(&room, anechoic_energy, fs, &settings)?;

        let mut row = vec![name];
        row.extend(params.values().into_iter().map(format_value));
        table.push_row(row)?;
        pb.inc(1);
    }
    pb.finish_with_message("done");

    for row in &table.rows {
        println!("{}", row.join("\t"));
    }
    table.write_csv(&args.output)?;
    println!("Saved {}", args.output.display());
    Ok(())
}

//! Reverberation time of impulse responses.

use super::common::read_bank;
use clap::{Args, ValueEnum};
use ownaura_analysis::{BandSpec, DecayRange, reverberation_time};
use ownaura_io::{Table, format_value};
use std::path::PathBuf;

#[derive(Clone, Copy, ValueEnum)]
enum Bands {
    Octave,
    Third,
    Fullband,
}

impl From<Bands> for BandSpec {
    fn from(bands: Bands) -> Self {
        match bands {
            Bands::Octave => BandSpec::Octave,
            Bands::Third => BandSpec::Third,
            Bands::Fullband => BandSpec::Fullband,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Range {
    Edt,
    T20,
    T30,
    Dt40,
}

impl Range {
    fn decay_range(self) -> DecayRange {
        match self {
            Range::Edt => DecayRange::EDT,
            Range::T20 => DecayRange::T20,
            Range::T30 => DecayRange::T30,
            Range::Dt40 => DecayRange::DT40,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Range::Edt => "EDT",
            Range::T20 => "T20",
            Range::T30 => "T30",
            Range::Dt40 => "DT40",
        }
    }
}

#[derive(Args)]
pub struct ReverbArgs {
    /// Impulse response (WAV or JSON archive); every channel is analysed
    #[arg(value_name = "RESPONSE")]
    input: PathBuf,

    /// Band layout
    #[arg(long, value_enum, default_value = "octave")]
    bands: Bands,

    /// Decay range of the regression
    #[arg(long, value_enum, default_value = "t30")]
    range: Range,

    /// Output CSV file (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: ReverbArgs) -> anyhow::Result<()> {
    let (bank, fs) = read_bank(&args.input)?;
    let spec = BandSpec::from(args.bands);

    let mut header = vec!["Channel".to_string()];
    header.extend(spec.labels().iter().map(|l| format!("{} {l} [s]", args.range.label())));
    let mut table = Table::new(header);

    for (index, h) in bank.iter().enumerate() {
        let times = reverberation_time(f64::from(fs), h, spec, args.range.decay_range())?;
        let mut row = vec![index.to_string()];
        row.extend(times.iter().map(|t| format_value(t.seconds)));
        table.push_row(row)?;
    }

    println!("{}", table.header.join("\t"));
    for row in &table.rows {
        println!("{}", row.join("\t"));
    }

    if let Some(output) = args.output {
        table.write_csv(&output)?;
        println!("Saved {}", output.display());
    }
    Ok(())
}

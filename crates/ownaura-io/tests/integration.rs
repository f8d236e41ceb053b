//! Integration tests for ownaura-io WAV, archive and table files.

use ownaura_core::{CalibrationFilter, MultiChannel};
use ownaura_io::{
    Error, ResponseArchive, Table, WavFormat, WavSpec, read_early_reflections, read_wav_channels,
    read_wav_info, write_wav_channels, write_wav_channels_with_spec,
};
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// WAV
// ---------------------------------------------------------------------------

/// One sine per channel, each at its own frequency.
fn sine_bank(sample_rate: u32, num_channels: usize, num_samples: usize) -> MultiChannel {
    let channels = (0..num_channels)
        .map(|c| {
            let freq = 100.0 * (c + 1) as f64;
            (0..num_samples)
                .map(|i| {
                    0.8 * (2.0 * std::f64::consts::PI * freq * i as f64 / f64::from(sample_rate))
                        .sin()
                })
                .collect()
        })
        .collect();
    MultiChannel::new(channels).unwrap()
}

#[test]
fn wav_roundtrip_many_channels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bank.wav");
    let bank = sine_bank(48000, 64, 2000);
    write_wav_channels(&path, &bank, 48000).unwrap();

    let (loaded, spec) = read_wav_channels(&path).unwrap();
    assert_eq!(spec.channels, 64);
    assert_eq!(loaded.num_channels(), 64);
    assert_eq!(loaded.len(), 2000);
    for (a, b) in loaded.iter().zip(bank.iter()) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-6, "{x} vs {y}");
        }
    }
}

#[test]
fn wav_i16_is_scaled_to_unit_range() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pcm16.wav");
    let bank = sine_bank(44100, 2, 4410);
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
    };
    write_wav_channels_with_spec(&path, &bank, spec).unwrap();

    let info = read_wav_info(&path).unwrap();
    assert_eq!(info.format, WavFormat::Pcm);
    assert_eq!(info.bits_per_sample, 16);

    let (loaded, _) = read_wav_channels(&path).unwrap();
    let peak = loaded
        .iter()
        .flat_map(|ch| ch.iter())
        .fold(0.0f64, |m, v| m.max(v.abs()));
    assert!((peak - 0.8).abs() < 1e-3, "peak {peak}");
}

#[test]
fn missing_wav_is_an_error() {
    let dir = tempdir().unwrap();
    let err = read_wav_channels(dir.path().join("nope.wav")).unwrap_err();
    assert!(matches!(err, Error::Wav(_)), "{err}");
}

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

#[test]
fn filter_archive_survives_disk_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("calibration_filter.json");
    let filter = CalibrationFilter {
        impulse_response: (0..511).map(|i| 0.9f64.powi(i)).collect(),
        shift: 37,
        sample_rate: 48000,
    };
    ResponseArchive::from_filter(&filter).write(&path).unwrap();
    let loaded = ResponseArchive::read(&path).unwrap().to_filter().unwrap();
    assert_eq!(loaded, filter);
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[test]
fn early_reflections_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("EarlyReflections.Txt");
    let text = "Early reflections\nRoom\nSource\n\
        Nr\tOrder\tTime\t63\t125\t250\t500\t1000\t2000\t4000\t8000\n\
        1\t0\t10,0\t80\t80\t80\t80\t80\t80\t80\t80\n\
        2\t1\t12,5\t74\t74\t74\t74\t74\t74\t74\t74,5\n";
    std::fs::write(&path, text).unwrap();

    let levels = read_early_reflections(&path).unwrap();
    assert!((levels.delay_seconds - 0.0125).abs() < 1e-12);
    assert!((levels.gain_db()[0] + 6.0).abs() < 1e-12);
    assert!((levels.gain_db()[7] + 5.5).abs() < 1e-12);
}

#[test]
fn table_written_as_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parameters.csv");
    let mut table = Table::new(vec!["Room".into(), "Room Gain G_RG [dB]".into()]);
    table.push_row(vec!["Office".into(), "1.25".into()]).unwrap();
    table.write_csv(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "Room,Room Gain G_RG [dB]\r\nOffice,1.25\r\n");
}

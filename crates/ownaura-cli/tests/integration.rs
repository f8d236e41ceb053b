//! Integration tests for ownaura-cli.
//!
//! Tests run the `ownaura` binary against synthetic recordings written to
//! temporary directories.

use ownaura_core::{CalibrationFilter, MultiChannel};
use ownaura_io::{ResponseArchive, write_wav_channels};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FS: u32 = 48000;

/// Helper to get the path to the `ownaura` binary built by cargo.
fn ownaura_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ownaura"))
}

fn run(args: &[&str]) -> Output {
    ownaura_bin()
        .args(args)
        .output()
        .expect("failed to run ownaura")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "ownaura failed:\nstdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Deterministic noise in [-amplitude, amplitude).
fn noise(len: usize, amplitude: f64, seed: u64) -> Vec<f64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            amplitude * (2.0 * unit - 1.0)
        })
        .collect()
}

/// Exponentially decaying noise with the given reverberation time.
fn decaying_noise(seconds: f64, rt60: f64, seed: u64) -> Vec<f64> {
    let len = (seconds * f64::from(FS)) as usize;
    let decay = 6.9078 / rt60;
    noise(len, 1.0, seed)
        .into_iter()
        .enumerate()
        .map(|(i, v)| v * (-decay * i as f64 / f64::from(FS)).exp())
        .collect()
}

fn write_bank(path: &Path, channels: Vec<Vec<f64>>) {
    let bank = MultiChannel::new(channels).unwrap();
    write_wav_channels(path, &bank, FS).unwrap();
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

/// `signal` delayed by `delay` samples, same length.
fn delayed(signal: &[f64], delay: usize) -> Vec<f64> {
    let mut out = vec![0.0; delay];
    out.extend_from_slice(&signal[..signal.len() - delay]);
    out
}

fn sine(amplitude: f64, frequency: f64, len: usize) -> Vec<f64> {
    let w = 2.0 * std::f64::consts::PI * frequency / f64::from(FS);
    (0..len).map(|i| amplitude * (w * i as f64).sin()).collect()
}

fn peak_index(h: &[f64]) -> usize {
    h.iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(i, _)| i)
        .unwrap()
}

/// 16-bit AIFF as exported by the recording rig.
fn write_aiff(path: &Path, channels: &[Vec<f64>]) {
    let frames = channels[0].len();
    let mut data = Vec::with_capacity(frames * channels.len() * 2);
    for i in 0..frames {
        for ch in channels {
            let v = (ch[i] * 32768.0).round().clamp(-32768.0, 32767.0) as i16;
            data.extend_from_slice(&v.to_be_bytes());
        }
    }

    // 80-bit extended sample rate
    let msb = 31 - FS.leading_zeros();
    let mut rate = (16383 + msb as u16).to_be_bytes().to_vec();
    rate.extend_from_slice(&(u64::from(FS) << (63 - msb)).to_be_bytes());

    let mut body = b"AIFFCOMM".to_vec();
    body.extend_from_slice(&18u32.to_be_bytes());
    body.extend_from_slice(&(channels.len() as u16).to_be_bytes());
    body.extend_from_slice(&(frames as u32).to_be_bytes());
    body.extend_from_slice(&16u16.to_be_bytes());
    body.extend_from_slice(&rate);
    body.extend_from_slice(b"SSND");
    body.extend_from_slice(&(data.len() as u32 + 8).to_be_bytes());
    body.extend_from_slice(&[0u8; 8]);
    body.extend_from_slice(&data);

    let mut file = b"FORM".to_vec();
    file.extend_from_slice(&(body.len() as u32).to_be_bytes());
    file.extend_from_slice(&body);
    std::fs::write(path, file).unwrap();
}

// ---------------------------------------------------------------------------
// sweep / info
// ---------------------------------------------------------------------------

#[test]
fn cli_sweep_writes_mono_wav() {
    let dir = TempDir::new().unwrap();
    let sweep = dir.path().join("sweep.wav");

    let output = run(&["sweep", path_str(&sweep), "--duration", "0.5"]);
    assert_success(&output);
    assert!(sweep.exists());

    let info = run(&["info", path_str(&sweep)]);
    assert_success(&info);
    let text = stdout(&info);
    assert!(text.contains("Channels:    1"), "{text}");
    assert!(text.contains("Sample Rate: 48000 Hz"), "{text}");
    assert!(text.contains("IEEE Float 32-bit"), "{text}");
}

#[test]
fn cli_info_reads_archive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("filter.json");
    let filter = CalibrationFilter {
        impulse_response: vec![0.5, 0.25, 0.125],
        shift: 48,
        sample_rate: FS,
    };
    ResponseArchive::from_filter(&filter).write(&path).unwrap();

    let output = run(&["info", path_str(&path)]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("response archive"), "{text}");
    assert!(text.contains("Channels:    1"), "{text}");
    assert!(text.contains("Shift:       48 samples (1.000 ms)"), "{text}");
}

#[test]
fn cli_info_reads_aiff() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calibration_recording.aif");
    write_aiff(&path, &[sine(0.1, 1000.0, 4800), noise(4800, 0.1, 8)]);

    let output = run(&["info", path_str(&path)]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("PCM 16-bit"), "{text}");
    assert!(text.contains("Channels:    2"), "{text}");
    assert!(text.contains("Sample Rate: 48000 Hz"), "{text}");
    assert!(text.contains("(4800 frames)"), "{text}");
}

#[test]
fn cli_info_missing_file_fails() {
    let output = run(&["info", "/nonexistent/recording.wav"]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// transfer / align / reverb
// ---------------------------------------------------------------------------

#[test]
fn cli_transfer_recovers_delay() {
    let dir = TempDir::new().unwrap();
    let sweep = dir.path().join("sweep.wav");
    assert_success(&run(&["sweep", path_str(&sweep), "--duration", "0.5"]));

    // recording: the sweep delayed by 100 samples on both channels
    let (bank, _) = ownaura_io::read_wav_channels(&sweep).unwrap();
    let late = delayed(bank.channel(0).unwrap(), 100);
    let recording = dir.path().join("recording.wav");
    write_bank(&recording, vec![late.clone(), late]);

    let ir = dir.path().join("ir.wav");
    let output = run(&[
        "transfer",
        path_str(&sweep),
        path_str(&recording),
        "-o",
        path_str(&ir),
        "--limit-db",
        "60",
        "--length",
        "0.1",
    ]);
    assert_success(&output);

    let (responses, spec) = ownaura_io::read_wav_channels(&ir).unwrap();
    assert_eq!(spec.sample_rate, FS);
    assert_eq!(responses.num_channels(), 2);
    assert_eq!(responses.len(), 4800);
    assert_eq!(peak_index(responses.channel(0).unwrap()), 100);
}

#[test]
fn cli_align_reports_delay() {
    let dir = TempDir::new().unwrap();
    let x = noise(4096, 0.5, 7);
    let y = delayed(&x, 24);

    let x_path = dir.path().join("x.wav");
    let y_path = dir.path().join("y.wav");
    write_bank(&x_path, vec![x]);
    write_bank(&y_path, vec![y]);
    let aligned = dir.path().join("aligned.wav");

    let output = run(&[
        "align",
        path_str(&x_path),
        path_str(&y_path),
        "-o",
        path_str(&aligned),
    ]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("Delay:     24 samples"), "{text}");

    let (pair, _) = ownaura_io::read_wav_channels(&aligned).unwrap();
    assert_eq!(pair.num_channels(), 2);
    assert_eq!(pair.len(), 4096 + 24);
}

#[test]
fn cli_reverb_writes_table() {
    let dir = TempDir::new().unwrap();
    let ir = dir.path().join("ir.wav");
    write_bank(&ir, vec![decaying_noise(1.5, 0.5, 3)]);
    let csv = dir.path().join("rt.csv");

    let output = run(&[
        "reverb",
        path_str(&ir),
        "--bands",
        "fullband",
        "--range",
        "t20",
        "-o",
        path_str(&csv),
    ]);
    assert_success(&output);
    assert!(stdout(&output).contains("T20 fullband [s]"));

    let table = std::fs::read_to_string(&csv).unwrap();
    let mut lines = table.lines();
    assert_eq!(lines.next(), Some("Channel,T20 fullband [s]"));
    let row = lines.next().unwrap();
    let value: f64 = row.split(',').nth(1).unwrap().parse().unwrap();
    assert!((value - 0.5).abs() < 0.05, "T20 = {value}");
}

// ---------------------------------------------------------------------------
// apply-calibration
// ---------------------------------------------------------------------------

#[test]
fn cli_apply_calibration_folder() {
    let dir = TempDir::new().unwrap();
    let filter = dir.path().join("calibration_filter.json");
    ResponseArchive::from_filter(&CalibrationFilter::identity(FS))
        .write(&filter)
        .unwrap();

    let banks = dir.path().join("banks");
    std::fs::create_dir(&banks).unwrap();
    write_bank(&banks.join("a.wav"), vec![noise(256, 0.1, 1), noise(256, 0.1, 2)]);
    write_bank(&banks.join("b.wav"), vec![noise(256, 0.1, 3), noise(256, 0.1, 4)]);

    let output = run(&[
        "apply-calibration",
        path_str(&banks),
        "-c",
        path_str(&filter),
    ]);
    assert_success(&output);
    assert!(banks.join("a_calibrated.wav").exists());
    assert!(banks.join("b_calibrated.wav").exists());

    // identity filter leaves the bank unchanged
    let (original, _) = ownaura_io::read_wav_channels(banks.join("a.wav")).unwrap();
    let (calibrated, _) = ownaura_io::read_wav_channels(banks.join("a_calibrated.wav")).unwrap();
    assert_eq!(calibrated.num_channels(), 2);
    assert_eq!(calibrated.len(), original.len());
    for (a, b) in original.iter().zip(calibrated.iter()) {
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    // a second run skips the earlier outputs
    assert_success(&run(&[
        "apply-calibration",
        path_str(&banks),
        "-c",
        path_str(&filter),
    ]));
    assert!(!banks.join("a_calibrated_calibrated.wav").exists());
}

#[test]
fn cli_apply_calibration_empty_folder_fails() {
    let dir = TempDir::new().unwrap();
    let filter = dir.path().join("calibration_filter.json");
    ResponseArchive::from_filter(&CalibrationFilter::identity(FS))
        .write(&filter)
        .unwrap();
    let empty = dir.path().join("empty");
    std::fs::create_dir(&empty).unwrap();

    let output = run(&[
        "apply-calibration",
        path_str(&empty),
        "-c",
        path_str(&filter),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no .wav files"));
}

#[test]
fn cli_apply_calibration_rate_mismatch_fails() {
    let dir = TempDir::new().unwrap();
    let filter = dir.path().join("calibration_filter.json");
    ResponseArchive::from_filter(&CalibrationFilter::identity(44100))
        .write(&filter)
        .unwrap();
    let bank = dir.path().join("bank.wav");
    write_bank(&bank, vec![noise(128, 0.1, 5)]);

    let output = run(&["apply-calibration", path_str(&bank), "-c", path_str(&filter)]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// time-window
// ---------------------------------------------------------------------------

#[test]
fn cli_time_window_crops_to_fade_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("responses.json");
    let archive = ResponseArchive {
        fs: FS,
        h: vec![vec![1.0; 4800], vec![0.5; 4800]],
        n: None,
        x: None,
        docs: None,
    };
    archive.write(&path).unwrap();

    let output = run(&["time-window", path_str(&path)]);
    assert_success(&output);

    let windowed = ResponseArchive::read(dir.path().join("responses_windowed.json")).unwrap();
    assert_eq!(windowed.fs, FS);
    assert_eq!(windowed.h.len(), 2);
    for h in &windowed.h {
        // cropped at the 24 ms fade-out end
        assert!((h.len() as i64 - 1152).abs() <= 1, "len {}", h.len());
        assert!(h[0].abs() < 1e-12);
        assert!(h[h.len() - 1].abs() < 1e-2);
    }
}

// ---------------------------------------------------------------------------
// deconvolve
// ---------------------------------------------------------------------------

#[test]
fn cli_deconvolve_averages_repetitions() {
    let dir = TempDir::new().unwrap();
    let sweep = dir.path().join("sweep.wav");
    assert_success(&run(&["sweep", path_str(&sweep), "--duration", "0.5"]));
    let (bank, _) = ownaura_io::read_wav_channels(&sweep).unwrap();
    let x = bank.channel(0).unwrap().to_vec();

    let mut recordings = Vec::new();
    for i in 0..3 {
        let path = dir.path().join(format!("recording_{i}.wav"));
        write_bank(&path, vec![delayed(&x, 10), delayed(&x, 20)]);
        recordings.push(path);
    }
    let out = dir.path().join("responses.json");

    let mut args = vec!["deconvolve", path_str(&sweep)];
    args.extend(recordings.iter().map(|p| path_str(p)));
    args.extend(["-o", path_str(&out), "--limit-db", "60"]);
    let output = run(&args);
    assert_success(&output);
    assert!(
        stdout(&output).contains("Averaged 3 repetition(s) into 2 response(s)"),
        "{}",
        stdout(&output)
    );

    let archive = ResponseArchive::read(&out).unwrap();
    assert_eq!(archive.fs, FS);
    assert_eq!(archive.h.len(), 2);
    assert_eq!(archive.x.as_ref().map(Vec::len), Some(x.len()));
    assert_eq!(archive.h[0].len(), x.len());
    assert_eq!(peak_index(&archive.h[0]), 10);
    assert_eq!(peak_index(&archive.h[1]), 20);
}

#[test]
fn cli_deconvolve_length_mismatch_fails() {
    let dir = TempDir::new().unwrap();
    let sweep = dir.path().join("sweep.wav");
    assert_success(&run(&["sweep", path_str(&sweep), "--duration", "0.25"]));
    let recording = dir.path().join("short.wav");
    write_bank(&recording, vec![noise(1000, 0.1, 9)]);

    let output = run(&[
        "deconvolve",
        path_str(&sweep),
        path_str(&recording),
        "-o",
        path_str(&dir.path().join("out.json")),
    ]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// calibration-filter
// ---------------------------------------------------------------------------

const EARLY_REFLECTIONS: &str = "Early reflections\n\
    Job 1\n\
    Source 1\n\
    Nr\tOrder\tTime [ms]\t63\t125\t250\t500\t1000\t2000\t4000\t8000\n\
    1\t0\t0,0\t70\t70\t70\t70\t70\t70\t70\t70\n\
    2\t1\t2,0\t64\t64\t64\t64\t64\t64\t64\t64\n";

#[test]
fn cli_calibration_filter_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[calibration]\nloudspeakers = 2\n").unwrap();

    // headset and measurement microphone hear the same signal
    let calibration = dir.path().join("calibration_recording.wav");
    let n = noise(48000, 0.3, 11);
    write_bank(&calibration, vec![n.clone(), n]);

    let rig: Vec<Vec<f64>> = (0..2)
        .map(|i| {
            let mut h = vec![0.0; 2048];
            h[10] = 1.0;
            h[11] = 0.1 * i as f64;
            h
        })
        .collect();
    let simulated = dir.path().join("simulated.json");
    ResponseArchive::from_bank(&MultiChannel::new(rig).unwrap(), FS, None)
        .write(&simulated)
        .unwrap();

    let mut dirac = vec![0.0; 2048];
    dirac[0] = 1.0;
    let reference = dir.path().join("reference.wav");
    write_bank(&reference, vec![dirac.clone(), dirac]);

    let reflections = dir.path().join("early_reflections.txt");
    std::fs::write(&reflections, EARLY_REFLECTIONS).unwrap();
    let filter = dir.path().join("calibration_filter.json");

    let output = run(&[
        "--config",
        path_str(&config),
        "calibration-filter",
        path_str(&calibration),
        "--simulated",
        path_str(&simulated),
        "--reference",
        path_str(&reference),
        "--early-reflections",
        path_str(&reflections),
        "-o",
        path_str(&filter),
    ]);
    assert_success(&output);
    assert!(stdout(&output).contains("Gain (dB)"));

    let archive = ResponseArchive::read(&filter).unwrap();
    assert_eq!(archive.fs, FS);
    assert_eq!(archive.h.len(), 1);
    assert_eq!(archive.h[0].len(), 511);
    assert!(archive.h[0].iter().all(|v| v.is_finite()));
    // the rig answers at 10 samples, the target at the 2 ms reflection
    let shift = archive.n.unwrap();
    assert!(shift < 0, "shift {shift}");

    let bank = dir.path().join("bank.wav");
    write_bank(&bank, vec![noise(1000, 0.1, 12), noise(1000, 0.1, 13)]);
    let calibrated = dir.path().join("bank_out.wav");
    assert_success(&run(&[
        "apply-calibration",
        path_str(&bank),
        "-c",
        path_str(&filter),
        "-o",
        path_str(&calibrated),
    ]));

    let (result, spec) = ownaura_io::read_wav_channels(&calibrated).unwrap();
    assert_eq!(spec.sample_rate, FS);
    assert_eq!(result.num_channels(), 2);
    let pad = shift.unsigned_abs() as usize;
    assert_eq!(result.len(), 1000 + 511 - 1 + pad);
    assert!(result.channel(0).unwrap()[..pad].iter().all(|v| *v == 0.0));
}

#[test]
fn cli_calibration_filter_channel_count_fails() {
    let dir = TempDir::new().unwrap();
    let calibration = dir.path().join("calibration_recording.wav");
    let n = noise(4800, 0.3, 14);
    write_bank(&calibration, vec![n.clone(), n]);
    let simulated = dir.path().join("simulated.wav");
    write_bank(&simulated, vec![vec![1.0; 256], vec![1.0; 256]]);
    let reflections = dir.path().join("early_reflections.txt");
    std::fs::write(&reflections, EARLY_REFLECTIONS).unwrap();

    // two loudspeakers against the default rig of 64
    let output = run(&[
        "calibration-filter",
        path_str(&calibration),
        "--simulated",
        path_str(&simulated),
        "--reference",
        path_str(&simulated),
        "--early-reflections",
        path_str(&reflections),
        "-o",
        path_str(&dir.path().join("calibration_filter.json")),
    ]);
    assert!(!output.status.success());
    assert!(!dir.path().join("calibration_filter.json").exists());
}

// ---------------------------------------------------------------------------
// sound-pressure / spl
// ---------------------------------------------------------------------------

#[test]
fn cli_sound_pressure_reports_level() {
    let dir = TempDir::new().unwrap();
    let tone = sine(0.05, 1000.0, 48000);

    // calibrator on the measurement microphone channel, AIFF like the rig
    let calibrator = dir.path().join("calibrator_recording.aif");
    write_aiff(&calibrator, &[vec![0.0; 48000], tone.clone(), vec![0.0; 48000]]);

    let calibration = dir.path().join("calibration_recording.wav");
    let n = noise(48000, 0.2, 21);
    write_bank(&calibration, vec![vec![0.0; 48000], n.clone(), n]);

    // convolver recording: measurement microphone first, headset second
    let recording = dir.path().join("convolver.wav");
    let mut headset = noise(24000, 0.1, 22);
    headset.resize(48000, 0.0);
    write_bank(&recording, vec![tone, headset]);

    let output = run(&[
        "sound-pressure",
        path_str(&calibrator),
        path_str(&calibration),
        path_str(&recording),
    ]);
    assert_success(&output);
    let text = stdout(&output);
    assert!(text.contains("calibrator gain"), "{text}");
    assert!(text.contains("measurement microphone 94.0 dB SPL"), "{text}");

    let converted = dir.path().join("convolver_sound pressure at 1m.wav");
    assert!(converted.exists());
    let (pressure, spec) = ownaura_io::read_wav_channels(&converted).unwrap();
    assert_eq!(spec.sample_rate, FS);
    assert_eq!(pressure.num_channels(), 2);
    assert_eq!(pressure.len(), 48000);

    let spl = run(&["spl", path_str(&converted)]);
    assert_success(&spl);
    let table = stdout(&spl);
    let row = table
        .lines()
        .find(|l| l.starts_with("convolver_sound pressure at 1m.wav"))
        .unwrap_or_else(|| panic!("no row in {table}"));
    assert!(row.trim_end().ends_with("94.0 dB"), "{row}");
}

#[test]
fn cli_spl_missing_channel_fails() {
    let dir = TempDir::new().unwrap();
    let mono = dir.path().join("mono.wav");
    write_bank(&mono, vec![noise(480, 0.1, 23)]);

    let output = run(&["spl", path_str(&mono)]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("headset channel 1"));
}

// ---------------------------------------------------------------------------
// room-params
// ---------------------------------------------------------------------------

#[test]
fn cli_room_params_writes_table() {
    let dir = TempDir::new().unwrap();
    let len = FS as usize;
    let mut headset = noise(len / 2, 0.5, 31);
    headset.resize(len, 0.0);

    // anechoic: both ears hear the headset 0.5 ms later
    let ear = delayed(&headset, 24);
    let anechoic = dir.path().join("anechoic.wav");
    write_bank(&anechoic, vec![ear.clone(), ear, headset.clone()]);

    // room: the same direct sound plus a tail starting after 10 ms
    let mut ir = vec![0.0; 480];
    ir[24] = 1.0;
    ir.extend(decaying_noise(0.4, 0.3, 32).into_iter().map(|v| 0.1 * v));
    let mut ear = ownaura_analysis::convolve(&headset, &ir);
    ear.truncate(len);
    let room = dir.path().join("Lecture hall.wav");
    write_bank(&room, vec![ear.clone(), ear, headset]);

    let csv = dir.path().join("room_acoustic_parameters.csv");
    let output = run(&[
        "room-params",
        "--anechoic",
        path_str(&anechoic),
        path_str(&room),
        "-o",
        path_str(&csv),
    ]);
    assert_success(&output);

    let table = std::fs::read_to_string(&csv).unwrap();
    let mut lines = table.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("Room,T_30 125 [s],"), "{header}");
    assert!(header.contains("\"DT_40,ME [s]\""), "{header}");
    assert!(header.ends_with("G_RG from ST_V [dB]"), "{header}");

    let row: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(row.len(), 12);
    assert_eq!(row[0], "Lecture hall");
    // room gain: the tail carries several times the direct energy
    let room_gain: f64 = row[9].parse().unwrap();
    assert!(room_gain > 3.0, "G_RG = {room_gain}");
    let voice_support: f64 = row[10].parse().unwrap();
    let from_support: f64 = row[11].parse().unwrap();
    let expected = 10.0 * (10f64.powf(voice_support / 10.0) + 1.0).log10();
    assert!((from_support - expected).abs() < 1e-9);
    assert!(lines.next().is_none());
}

// ---------------------------------------------------------------------------
// configuration
// ---------------------------------------------------------------------------

#[test]
fn cli_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "sample_rate = 0\n").unwrap();
    let sweep = dir.path().join("sweep.wav");

    let output = run(&["--config", path_str(&config), "sweep", path_str(&sweep)]);
    assert!(!output.status.success());
    assert!(!sweep.exists());
}

#[test]
fn cli_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let sweep = dir.path().join("sweep.wav");
    let output = run(&[
        "--config",
        "/nonexistent/ownaura.toml",
        "sweep",
        path_str(&sweep),
    ]);
    assert!(!output.status.success());
}

#[test]
fn cli_config_sets_sample_rate() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "sample_rate = 16000\n").unwrap();
    let sweep = dir.path().join("sweep.wav");

    let output = run(&[
        "--config",
        path_str(&config),
        "sweep",
        path_str(&sweep),
        "--duration",
        "0.25",
    ]);
    assert_success(&output);
    let (_, spec) = ownaura_io::read_wav_channels(&sweep).unwrap();
    assert_eq!(spec.sample_rate, 16000);
}

//! Shared CLI helpers used across multiple commands.

use anyhow::{Context, bail};
use indicatif::{ProgressBar, ProgressStyle};
use ownaura_analysis::FadeWindow;
use ownaura_config::{Config, FadeConfig};
use ownaura_core::MultiChannel;
use ownaura_io::{ResponseArchive, read_wav_channels};
use std::path::{Path, PathBuf};

/// Resolve and validate the configuration.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let config = ownaura_config::load_config(explicit).context("loading configuration")?;
    tracing::debug!(sample_rate = config.sample_rate, "configuration loaded");
    Ok(config)
}

/// Parse a `start,end` pair for clap's `value_parser`.
pub fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("Invalid pair: '{s}' (expected start,end)"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("Invalid number '{}' in '{s}'", v.trim()))
    };
    Ok((parse(a)?, parse(b)?))
}

/// Fade window from its configuration, overridden by explicit edges.
pub fn fade_window(
    config: &FadeConfig,
    fade_in: Option<(f64, f64)>,
    fade_out: Option<(f64, f64)>,
) -> anyhow::Result<FadeWindow> {
    let window = FadeWindow {
        fade_in: fade_in.or(config.fade_in),
        fade_out: fade_out.or(config.fade_out),
    };
    window.validate()?;
    Ok(window)
}

/// Borrow one channel of a recording, naming its role in the error.
pub fn channel<'a>(
    recording: &'a MultiChannel,
    index: usize,
    role: &str,
) -> anyhow::Result<&'a [f64]> {
    recording
        .channel(index)
        .with_context(|| format!("{role} channel {index}"))
}

/// Load a response bank from a WAV file or a JSON archive.
pub fn read_bank(path: &Path) -> anyhow::Result<(MultiChannel, u32)> {
    let is_archive = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_archive {
        let archive = ResponseArchive::read(path)
            .with_context(|| format!("reading archive {}", path.display()))?;
        Ok((archive.to_bank()?, archive.fs))
    } else {
        let (bank, spec) = read_wav_channels(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok((bank, spec.sample_rate))
    }
}

/// Fail unless a file's sample rate matches the configured one.
pub fn ensure_rate(path: &Path, found: u32, expected: u32) -> anyhow::Result<()> {
    if found != expected {
        bail!(
            "{} has sample rate {found} Hz, expected {expected} Hz",
            path.display()
        );
    }
    Ok(())
}

/// `<dir>/<stem><suffix>`, next to `path`.
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}"))
}

/// Progress bar for batch commands.
pub fn progress_bar(len: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

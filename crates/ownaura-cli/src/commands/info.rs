//! Display WAV/AIFF file or response archive metadata.

use clap::Args;
use ownaura_io::{ResponseArchive, WavFormat, read_wav_info};
use std::path::{Path, PathBuf};

/// Display file information.
#[derive(Args)]
pub struct InfoArgs {
    /// Path to a WAV or AIFF file, or a JSON response archive
    pub file: PathBuf,
}

/// Run the info command.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let is_archive = args
        .file
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    println!("File:        {}", args.file.display());
    if is_archive {
        archive_info(&args.file)?;
    } else {
        wav_info(&args.file)?;
    }

    let file_size = std::fs::metadata(&args.file)?.len();
    println!("File Size:   {}", format_bytes(file_size));

    Ok(())
}

fn wav_info(path: &Path) -> anyhow::Result<()> {
    let info = read_wav_info(path)?;

    let format_str = match info.format {
        WavFormat::Pcm => "PCM",
        WavFormat::IeeeFloat => "IEEE Float",
    };

    println!("Format:      {} {}-bit", format_str, info.bits_per_sample);
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!(
        "Duration:    {:.3}s ({} frames)",
        info.duration_secs, info.num_frames
    );
    Ok(())
}

fn archive_info(path: &Path) -> anyhow::Result<()> {
    let archive = ResponseArchive::read(path)?;
    let len = archive.h.iter().map(Vec::len).max().unwrap_or(0);

    println!("Format:      response archive");
    println!("Channels:    {}", archive.h.len());
    println!("Sample Rate: {} Hz", archive.fs);
    println!(
        "Duration:    {:.3}s ({} taps)",
        len as f64 / f64::from(archive.fs),
        len
    );
    if let Some(shift) = archive.n {
        println!(
            "Shift:       {} samples ({:.3} ms)",
            shift,
            shift as f64 * 1000.0 / f64::from(archive.fs)
        );
    }
    if let Some(x) = &archive.x {
        println!("Excitation:  {} samples", x.len());
    }
    if let Some(docs) = &archive.docs {
        println!("Notes:       {docs}");
    }
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}

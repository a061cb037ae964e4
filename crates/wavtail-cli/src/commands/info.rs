//! Info command implementation
//!
//! Reports the header of a capture and checks its size fields.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::process::ExitCode;

use wavtail_core::wav::{compute_pcm_hash, parse_header};

/// Summary of a WAV file as reported by `wavtail info`.
#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub path: String,
    pub file_len: u64,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub byte_rate: u32,
    pub block_align: u16,
    pub riff_size: u32,
    pub data_size: u32,
    pub num_samples: u64,
    pub duration_ms: u64,
    pub sizes_consistent: bool,
    pub pcm_hash: Option<String>,
}

/// Reads `path` and builds its report.
pub fn report(path: &str) -> Result<InfoReport> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read WAV file: {}", path))?;
    let header =
        parse_header(&bytes).with_context(|| format!("Not a wavtail capture: {}", path))?;
    let file_len = bytes.len() as u64;

    Ok(InfoReport {
        path: path.to_string(),
        file_len,
        channels: header.channels,
        sample_rate: header.sample_rate,
        bits_per_sample: header.bits_per_sample,
        byte_rate: header.byte_rate,
        block_align: header.block_align,
        riff_size: header.riff_size,
        data_size: header.data_size,
        num_samples: header.num_samples(),
        duration_ms: header.duration_millis(),
        sizes_consistent: header.sizes_match(file_len),
        pcm_hash: compute_pcm_hash(&bytes),
    })
}

/// Run the info command
///
/// # Returns
/// Exit code: 0 if the size fields match the file length, 1 otherwise
pub fn run(input: &str, json: bool) -> Result<ExitCode> {
    let report = report(input)?;
    let code = if report.sizes_consistent {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(code);
    }

    println!("{} {}", "File:".cyan().bold(), report.path);
    println!(
        "  {} {} Hz, {} ch, {}-bit PCM",
        "->".green(),
        report.sample_rate,
        report.channels,
        report.bits_per_sample
    );
    println!(
        "  {} {} samples ({} ms)",
        "->".green(),
        report.num_samples,
        report.duration_ms
    );
    if let Some(hash) = &report.pcm_hash {
        println!("  {} pcm blake3 {}", "->".green(), hash.dimmed());
    }

    if report.sizes_consistent {
        println!("{} size fields match file length", "ok".green());
    } else {
        println!(
            "{} size fields declare {} data bytes, file holds {}",
            "!!".red(),
            report.data_size,
            report.file_len.saturating_sub(44)
        );
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use wavtail_core::StreamingWavWriter;

    #[test]
    fn test_report_fresh_capture() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("take.wav");
        let mut writer = StreamingWavWriter::create(&path).unwrap();
        writer.append_all(&[1, 2, 3]).unwrap();
        writer.close().unwrap();

        let report = report(path.to_str().unwrap()).unwrap();
        assert_eq!(report.file_len, 50);
        assert_eq!(report.num_samples, 3);
        assert_eq!(report.riff_size, 42);
        assert!(report.sizes_consistent);
        assert!(report.pcm_hash.is_some());
    }

    #[test]
    fn test_report_flags_stale_sizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("take.wav");
        let mut writer = StreamingWavWriter::create(&path).unwrap();
        writer.close().unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes.extend_from_slice(&[0, 0]);
        fs::write(&path, &bytes).unwrap();

        let report = report(path.to_str().unwrap()).unwrap();
        assert!(!report.sizes_consistent);
        assert_eq!(run(path.to_str().unwrap(), true).unwrap(), ExitCode::from(1));
    }
}

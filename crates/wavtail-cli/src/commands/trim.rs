//! Trim command implementation
//!
//! Cuts a duration off the end of an existing capture in place.

use anyhow::{Context, Result};
use colored::Colorize;
use std::process::ExitCode;

use wavtail_core::StreamingWavWriter;

/// Run the trim command
///
/// # Arguments
/// * `input` - Path to a WAV file previously written by wavtail
/// * `ms` - Milliseconds to remove from the end
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(input: &str, ms: u64) -> Result<ExitCode> {
    println!("{} {}", "Trimming:".cyan().bold(), input);

    let mut writer = StreamingWavWriter::open_existing(input)
        .with_context(|| format!("Failed to open WAV file: {}", input))?;
    let before = writer.duration_millis();
    writer
        .truncate_tail(ms)
        .with_context(|| format!("Failed to trim: {}", input))?;
    let after = writer.duration_millis();
    writer.close().context("Failed to close WAV file")?;

    println!(
        "{} {} ms -> {} ms",
        "SUCCESS".green().bold(),
        before,
        after
    );
    Ok(ExitCode::SUCCESS)
}

//! Record command implementation
//!
//! Streams raw PCM from a file or stdin into a WAV capture session.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;

use wavtail_core::wav::bytes_to_pcm16;
use wavtail_core::{Recorder, RecorderConfig};

use crate::cli_args::RecordArgs;

/// Builds the recorder config from the optional config file and flags.
///
/// Flags override values from the file.
pub fn resolve_config(args: &RecordArgs) -> Result<RecorderConfig> {
    let mut config = match (&args.config, &args.output) {
        (Some(path), _) => RecorderConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        (None, Some(output)) => RecorderConfig::new(output),
        (None, None) => bail!("either --output or --config is required"),
    };

    if let Some(output) = &args.output {
        config.output_path = output.into();
    }
    if let Some(ms) = args.lead_in_ms {
        config.lead_in_ms = ms;
    }
    if let Some(ms) = args.end_margin_ms {
        config.end_margin_ms = ms;
    }
    if let Some(ms) = args.max_duration_ms {
        config.max_duration_ms = ms;
    }

    config.validate()?;
    Ok(config)
}

/// Run the record command
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(args: &RecordArgs) -> Result<ExitCode> {
    let config = resolve_config(args)?;
    println!(
        "{} {}",
        "Recording:".cyan().bold(),
        config.output_path.display()
    );

    let mut input: Box<dyn Read> = match args.input.as_deref() {
        None | Some("-") => Box::new(io::stdin().lock()),
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open input: {}", path))?,
        ),
    };

    let recorder = Recorder::spawn(config).context("Failed to start recorder")?;
    recorder.start().context("Failed to start recording")?;
    let pumped = pump(&mut input, &recorder, args.chunk_samples as usize)?;
    let summary = recorder.stop().context("Recording failed")?;
    recorder.shutdown();

    debug!("read {} samples from input", pumped);
    println!(
        "{} {} samples ({} ms) written to {}",
        "SUCCESS".green().bold(),
        summary.samples,
        summary.duration_ms,
        summary.path.display()
    );
    if summary.auto_stopped {
        println!("  {} maximum duration reached", "!!".yellow());
    }

    Ok(ExitCode::SUCCESS)
}

/// Feeds `reader` to the recorder in bursts of `chunk_samples` samples.
///
/// A sample split across two reads is carried over. Reading stops early if
/// the session ends on its own. Returns the number of samples read.
pub fn pump(reader: &mut dyn Read, recorder: &Recorder, chunk_samples: usize) -> Result<u64> {
    let mut buf = vec![0u8; chunk_samples.max(1) * 2];
    let mut carry: Option<u8> = None;
    let mut total = 0u64;

    loop {
        let start = match carry.take() {
            Some(byte) => {
                buf[0] = byte;
                1
            }
            None => 0,
        };

        let read = match reader.read(&mut buf[start..]) {
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                carry = (start == 1).then_some(buf[0]);
                continue;
            }
            Err(err) => return Err(err).context("Failed to read input"),
        };

        if read == 0 {
            if start == 1 {
                warn!("input ended mid-sample; dropping trailing byte");
            }
            break;
        }

        let filled = start + read;
        let whole = filled / 2 * 2;
        if whole < filled {
            carry = Some(buf[whole]);
        }

        if !recorder.is_recording()? {
            break;
        }
        let samples = bytes_to_pcm16(&buf[..whole]);
        total += samples.len() as u64;
        recorder.push(samples)?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn args(output: &str) -> RecordArgs {
        RecordArgs {
            output: Some(output.to_string()),
            input: None,
            config: None,
            lead_in_ms: None,
            end_margin_ms: None,
            max_duration_ms: None,
            chunk_samples: 4096,
        }
    }

    #[test]
    fn test_resolve_config_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("recorder.json");
        std::fs::write(
            &config_path,
            r#"{"output_path": "from_file.wav", "end_margin_ms": 100}"#,
        )
        .unwrap();

        let mut record = args("from_flag.wav");
        record.config = Some(config_path.to_string_lossy().into_owned());
        record.max_duration_ms = Some(0);

        let config = resolve_config(&record).unwrap();
        assert_eq!(config.output_path.to_string_lossy(), "from_flag.wav");
        assert_eq!(config.end_margin_ms, 100);
        assert_eq!(config.max_duration_ms, 0);
    }

    #[test]
    fn test_resolve_config_requires_output() {
        let mut record = args("x.wav");
        record.output = None;
        assert!(resolve_config(&record).is_err());
    }

    #[test]
    fn test_pump_handles_odd_reads() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("take.wav");
        let mut config = RecorderConfig::new(&output);
        config.end_margin_ms = 0;
        let recorder = Recorder::spawn(config).unwrap();
        recorder.start().unwrap();

        // 5 samples with a chunk size of 2 samples forces split reads.
        let raw: Vec<u8> = [1i16, -2, 3, i16::MIN, i16::MAX]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .chain([0xAA])
            .collect();
        let total = pump(&mut Cursor::new(raw), &recorder, 2).unwrap();
        assert_eq!(total, 5);

        let summary = recorder.stop().unwrap();
        assert_eq!(summary.samples, 5);
        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(
            bytes_to_pcm16(&bytes[44..]),
            vec![1, -2, 3, i16::MIN, i16::MAX]
        );
    }
}

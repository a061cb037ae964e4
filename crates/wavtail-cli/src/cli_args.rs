//! CLI argument definitions for the wavtail command-line interface.

use clap::{Args, Parser, Subcommand};

/// wavtail - streaming WAV capture with tail trimming
#[derive(Parser)]
#[command(name = "wavtail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record raw s16le mono PCM (44100 Hz) into a WAV file
    Record(RecordArgs),

    /// Cut a duration off the end of a WAV file written by wavtail
    Trim {
        /// Path to the WAV file to trim in place
        #[arg(short, long)]
        input: String,

        /// Milliseconds to remove from the end
        #[arg(long)]
        ms: u64,
    },

    /// Print header fields, duration and PCM hash of a WAV file
    Info {
        /// Path to the WAV file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RecordArgs {
    /// Output WAV path (overrides the config file)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Raw PCM input file, or '-' for stdin (default: stdin)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Recorder config file (JSON)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Milliseconds of audio discarded after start
    #[arg(long)]
    pub lead_in_ms: Option<u64>,

    /// Milliseconds trimmed from the end on stop
    #[arg(long)]
    pub end_margin_ms: Option<u64>,

    /// Stop automatically after this many milliseconds (0 = unlimited)
    #[arg(long)]
    pub max_duration_ms: Option<u64>,

    /// Samples read from the input per burst
    #[arg(long, default_value_t = 4096, value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk_samples: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_trim() {
        let cli = Cli::try_parse_from(["wavtail", "trim", "--input", "take.wav", "--ms", "600"])
            .unwrap();
        match cli.command {
            Commands::Trim { input, ms } => {
                assert_eq!(input, "take.wav");
                assert_eq!(ms, 600);
            }
            _ => panic!("expected trim command"),
        }
    }

    #[test]
    fn test_cli_rejects_negative_trim() {
        assert!(Cli::try_parse_from(["wavtail", "trim", "-i", "take.wav", "--ms", "-5"]).is_err());
    }

    #[test]
    fn test_cli_parses_record_defaults() {
        let cli = Cli::try_parse_from(["wavtail", "record", "-o", "take.wav"]).unwrap();
        match cli.command {
            Commands::Record(args) => {
                assert_eq!(args.output.as_deref(), Some("take.wav"));
                assert_eq!(args.input, None);
                assert_eq!(args.end_margin_ms, None);
                assert_eq!(args.chunk_samples, 4096);
            }
            _ => panic!("expected record command"),
        }
    }

    #[test]
    fn test_cli_rejects_zero_chunk() {
        assert!(
            Cli::try_parse_from(["wavtail", "record", "-o", "a.wav", "--chunk-samples", "0"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_parses_info_json() {
        let cli = Cli::try_parse_from(["wavtail", "info", "-i", "take.wav", "--json"]).unwrap();
        match cli.command {
            Commands::Info { input, json } => {
                assert_eq!(input, "take.wav");
                assert!(json);
            }
            _ => panic!("expected info command"),
        }
    }
}

//! wavtail CLI - streaming WAV capture from the command line
//!
//! Records raw PCM into a WAV file that stays playable while it grows, trims
//! trailing audio in place, and inspects capture headers.

use clap::Parser;
use std::process::ExitCode;

use wavtail_cli::cli_args::{Cli, Commands};
use wavtail_cli::commands;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Record(args) => commands::record::run(&args),
        Commands::Trim { input, ms } => commands::trim::run(&input, ms),
        Commands::Info { input, json } => commands::info::run(&input, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

mod commands;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::process::ExitCode;

use crate::commands::{ExtractArgs, StatsArgs};

/// Extract translatable text from HTML documents into placeholder-bearing artifacts.
#[derive(Debug, Parser)]
#[command(name = "markup-extractor", version, about)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run an extraction and write the four artifacts
    Extract(ExtractArgs),
    /// Report the language distribution of a structured map
    Stats(StatsArgs),
}

impl Cli {
    fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over the flags.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.level().as_str()))
        .format_timestamp(None)
        .init();

    let result = match &cli.command {
        Command::Extract(args) => args.execute(),
        Command::Stats(args) => args.execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

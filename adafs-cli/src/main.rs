//! AdaFS command-line interface.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "adafs", version, about = "Read-only package view over GNAT-crunched Ada sources")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mount a source directory as a virtual package hierarchy.
    Mount {
        /// Directory holding the crunched sources.
        source: PathBuf,
        /// Where to mount; defaults to `<source>.fuse`.
        mountpoint: Option<PathBuf>,
        /// Stay in the foreground instead of waiting on Ctrl+C.
        #[arg(short = 'f', long)]
        foreground: bool,
        /// Let other users browse the mount (fusermount allow_other).
        #[arg(long)]
        allow_other: bool,
        /// Explicit config file instead of the platform default.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Build the virtual tree and print it, without mounting.
    Tree {
        /// Directory holding the crunched sources.
        source: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Mount {
            source,
            mountpoint,
            foreground,
            allow_other,
            config,
        } => commands::mount::run(commands::mount::MountArgs {
            source,
            mountpoint,
            foreground,
            allow_other,
            config,
        }),
        Command::Tree { source } => commands::tree::run(&source),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            report_chain(&err);
            ExitCode::FAILURE
        }
    }
}

fn report_chain(err: &CliError) {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

mod catalog;
mod cli;
mod commands;
mod config;
mod engine;
mod error;
mod paths;
mod progress;
mod provider;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::process::ExitCode;

/// Global context for the application
#[derive(Debug, Default)]
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// `--file` override of the managed INI file
    pub file: Option<String>,
    pub create: bool,
    pub prune_empty_sections: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        file: cli.file,
        create: cli.create,
        prune_empty_sections: cli.prune_empty_sections,
    };

    let succeeded = match cli.command {
        Command::Apply(args) => commands::declarative::apply(&ctx, &args)?,
        Command::Diff(args) => commands::declarative::diff(&ctx, &args)?,
        Command::Status(args) => commands::declarative::status(&ctx, &args)?,
        Command::Get { identity } => commands::setting::get(&ctx, &identity)?,
        Command::Set {
            identity,
            value,
            dry_run,
        } => commands::setting::set(&ctx, &identity, &value, dry_run)?,
        Command::Unset { identity, dry_run } => {
            commands::setting::unset(&ctx, &identity, dry_run)?
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "neutron-plugin-ovs", &mut io::stdout());
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

//! Passvault CLI - a personal password vault
//!
//! This is the command-line interface for passvault. It resolves the user,
//! database and passphrase, then hands off to the core library.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{import, init, misc, profile, records};
use crate::constants::env_vars;
use crate::errors::exit_code_for;
use crate::ui::{error_message, OutputMode};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        let mode = OutputMode::from_env(false);
        eprintln!("{}", error_message(mode, &e.to_string()));
        std::process::exit(exit_code_for(&e));
    }
}

/// Log to stderr. `PASSVAULT_LOG` takes an `EnvFilter` directive;
/// `--verbose` overrides it with `debug`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(env_vars::LOG).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => {
            init::handle_init(ctx, args)?;
        }
        Some(Commands::Profile(args)) => {
            profile::handle_profile(ctx, args)?;
        }
        Some(Commands::Add(args)) => {
            records::handle_add(ctx, args)?;
        }
        Some(Commands::Edit(args)) => {
            records::handle_edit(ctx, args)?;
        }
        Some(Commands::List(args)) => {
            records::handle_list(ctx, args)?;
        }
        Some(Commands::Show(args)) => {
            records::handle_show(ctx, args)?;
        }
        Some(Commands::Delete(args)) => {
            records::handle_delete(ctx, args)?;
        }
        Some(Commands::Import(args)) => {
            import::handle_import(ctx, args)?;
        }
        Some(Commands::Completions(args)) => {
            misc::handle_completions(args);
        }
        None => {
            if !cli.quiet {
                println!("passvault {}", passvault_core::VERSION);
                println!("Run `passvault --help` for usage.");
            }
        }
    }
    Ok(())
}

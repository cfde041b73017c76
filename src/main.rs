use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use commands::{Env, OutputFmt};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fitlog={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let fmt = if cli.json { OutputFmt::Json } else { OutputFmt::Text };
    let mut env = Env::load(fmt, cli.remote, cli.db)?;

    match cli.cmd {
        Commands::Log(cmd) => commands::log::handle(cmd, &env).await?,
        Commands::Stats(args) => commands::stats::handle(args, &env).await?,
        Commands::Config(cmd) => commands::config::handle(cmd, &mut env).await?,
        Commands::Auth(cmd) => commands::auth::handle(cmd, &env).await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

mod archive;
mod assemble;
mod cli;
mod commands;
mod filename;
mod mcp;
mod page_range;
mod pdf;
mod upload;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays free for results and the MCP transport
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Info { inputs, keep_order } => {
            commands::info::run(&inputs, keep_order)?;
        }
        Commands::Merge {
            inputs,
            output,
            mode,
            pages,
            keep_order,
        } => {
            let options = commands::merge::MergeOptions {
                inputs,
                output,
                mode,
                pages: commands::parse_page_args(&pages)?,
                keep_order,
            };
            commands::merge::run(&options)?;
        }
        Commands::Split {
            inputs,
            output,
            mode,
            pages,
            consolidate,
            keep_order,
        } => {
            let options = commands::split::SplitOptions {
                inputs,
                output,
                mode,
                pages: commands::parse_page_args(&pages)?,
                consolidate,
                keep_order,
            };
            commands::split::run(&options)?;
        }
        Commands::Toc { path } => {
            commands::toc::run(&path)?;
        }
    }

    Ok(())
}

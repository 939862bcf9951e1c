//! quotedesk CLI - Freight quotation response processing
//!
//! Usage:
//!   quotedesk summary responses.json           Batch statistics
//!   quotedesk groups responses.json            Responses by service type
//!   quotedesk list responses.json --status X   Filtered, paginated list
//!   quotedesk costing responses.json -r ID     Product costing for a response
//!   quotedesk taxes --fob 1000                 CIF and import taxes

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Summary { file } => {
            let responses = commands::load_responses(&file, &config).await?;
            commands::cmd_summary(&responses, &config, cli.json)
        }
        Commands::Groups { file } => {
            let responses = commands::load_responses(&file, &config).await?;
            commands::cmd_groups(&responses, &config, cli.json)
        }
        Commands::List(args) => {
            let responses = commands::load_responses(&args.file, &config).await?;
            let options = commands::ListOptions::from_args(&args, &config)?;
            commands::cmd_list(&responses, &config, &options, cli.json)
        }
        Commands::Costing {
            file,
            response,
            total,
        } => {
            let responses = commands::load_responses(&file, &config).await?;
            commands::cmd_costing(&responses, &config, &response, total, cli.json)
        }
        Commands::Taxes(args) => commands::cmd_taxes(&config, &args, cli.json),
        Commands::Validate { file } => {
            let responses = commands::load_responses(&file, &config).await?;
            commands::cmd_validate(&responses, cli.json)
        }
        Commands::Config => commands::cmd_config(&config),
    }
}

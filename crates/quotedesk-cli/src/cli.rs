//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// quotedesk - Process and cost freight quotation responses
#[derive(Parser)]
#[command(name = "quotedesk")]
#[command(about = "Freight quotation response processing and costing", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.local/share/quotedesk/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a batch of quotation responses
    Summary {
        /// JSON file with an array of responses ("-" for stdin)
        file: PathBuf,
    },

    /// Group responses by service type
    Groups {
        /// JSON file with an array of responses ("-" for stdin)
        file: PathBuf,
    },

    /// List responses, optionally filtered and paginated
    List(ListArgs),

    /// Cost the products of one response
    Costing {
        /// JSON file with an array of responses ("-" for stdin)
        file: PathBuf,

        /// Unique id of the response (e.g. maritime-11)
        #[arg(short, long)]
        response: String,

        /// Total commercial value (defaults to the response's total value)
        #[arg(short, long)]
        total: Option<f64>,
    },

    /// Compute CIF and import taxes
    Taxes(TaxArgs),

    /// Validate a batch of responses
    Validate {
        /// JSON file with an array of responses ("-" for stdin)
        file: PathBuf,
    },

    /// Show the resolved configuration
    Config,
}

#[derive(Args)]
pub struct ListArgs {
    /// JSON file with an array of responses ("-" for stdin)
    pub file: PathBuf,

    /// Only this service type
    #[arg(long)]
    pub service_type: Option<String>,

    /// Only this response id
    #[arg(long)]
    pub response_id: Option<String>,

    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Only this status
    #[arg(long)]
    pub status: Option<String>,

    /// Mark this unique id as the active response
    #[arg(long)]
    pub activate: Option<String>,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Page size (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Keep input order instead of newest first
    #[arg(long)]
    pub no_sort: bool,
}

#[derive(Args)]
pub struct TaxArgs {
    /// FOB value
    #[arg(long)]
    pub fob: f64,

    /// Freight cost
    #[arg(long, default_value = "0")]
    pub freight: f64,

    /// Insurance cost
    #[arg(long, default_value = "0")]
    pub insurance: f64,

    /// Exempt from ad valorem duty
    #[arg(long)]
    pub exempt_ad_valorem: bool,

    /// Exempt from IGV
    #[arg(long)]
    pub exempt_igv: bool,

    /// Exempt from IPM
    #[arg(long)]
    pub exempt_ipm: bool,

    /// Exempt from perception
    #[arg(long)]
    pub exempt_perception: bool,
}

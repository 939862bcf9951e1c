//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve the configuration
//! - `load_responses` - Read a response batch (with retry)
//! - `print_json` - Shared JSON output
//! - `cmd_config` - Show the resolved configuration

use std::path::Path;

use anyhow::{Context, Result};
use quotedesk_core::config::default_config_path;
use quotedesk_core::{
    get_user_friendly_message, log_error, with_retry_policy, QuoteDeskConfig,
    RawQuotationResponse,
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

pub fn load_config(path: Option<&Path>) -> Result<QuoteDeskConfig> {
    QuoteDeskConfig::load(path).context("Failed to load configuration")
}

/// Read the raw input, from stdin when `path` is `-`
async fn read_input(path: &Path) -> quotedesk_core::Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin().read_to_string(&mut content).await?;
        Ok(content)
    } else {
        Ok(tokio::fs::read_to_string(path).await?)
    }
}

/// Parse a JSON array of raw quotation responses
pub fn parse_responses(content: &str) -> quotedesk_core::Result<Vec<RawQuotationResponse>> {
    Ok(serde_json::from_str(content)?)
}

/// Load a response batch, retrying transient failures per the config
pub async fn load_responses(
    path: &Path,
    config: &QuoteDeskConfig,
) -> Result<Vec<RawQuotationResponse>> {
    let context = format!("Loading {}", path.display());
    let result = with_retry_policy(
        || async { parse_responses(&read_input(path).await?) },
        &config.retry,
        Some(&context),
    )
    .await;

    match result {
        Ok(responses) => {
            tracing::debug!("Loaded {} responses from {}", responses.len(), path.display());
            Ok(responses)
        }
        Err(e) => {
            log_error("loader", &e.error_info);
            let friendly = get_user_friendly_message(&e.error_info);
            Err(anyhow::Error::new(e).context(friendly))
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn cmd_config(config: &QuoteDeskConfig) -> Result<()> {
    println!();
    println!("⚙️  Configuration");
    match &config.source {
        Some(path) => println!("   Source: {}", path.display()),
        None => {
            println!("   Source: built-in defaults");
            if let Some(path) = default_config_path() {
                println!("   Override: {} (not present)", path.display());
            }
        }
    }
    println!("   ─────────────────────────────────────────────");
    println!(
        "   Processing:  sort by date = {}, validate = {}",
        config.processing.sort_by_date, config.processing.validate_data
    );
    println!(
        "   Retry:       {} attempts, {}ms base, {}ms max",
        config.retry.max_attempts,
        config.retry.base_delay.as_millis(),
        config.retry.max_delay.as_millis()
    );
    println!("   Import pool: {:.2}", config.import_cost_pool);
    println!(
        "   Taxes:       ad valorem {:.1}%, IGV {:.1}%, IPM {:.1}%, perception {:.1}%",
        config.taxes.ad_valorem * 100.0,
        config.taxes.igv * 100.0,
        config.taxes.ipm * 100.0,
        config.taxes.perception * 100.0
    );
    println!(
        "   Display:     currency \"{}\", page size {}",
        config.display.currency_symbol, config.display.page_size
    );
    Ok(())
}

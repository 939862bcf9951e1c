//! Configuration for quotedesk
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/quotedesk/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::costing::DEFAULT_IMPORT_COST_POOL;
use crate::error::{Error, Result};
use crate::processor::ProcessOptions;
use crate::retry::RetryPolicy;
use crate::tax::TaxRates;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/quotedesk.toml");

/// Display settings
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    pub page_size: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            page_size: 20,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDeskConfig {
    pub processing: ProcessOptions,
    pub retry: RetryPolicy,
    pub import_cost_pool: f64,
    pub taxes: TaxRates,
    pub display: DisplayConfig,
    /// File the config was read from; `None` for embedded defaults
    pub source: Option<PathBuf>,
}

impl Default for QuoteDeskConfig {
    fn default() -> Self {
        Self {
            processing: ProcessOptions::default(),
            retry: RetryPolicy::default(),
            import_cost_pool: DEFAULT_IMPORT_COST_POOL,
            taxes: TaxRates::default(),
            display: DisplayConfig::default(),
            source: None,
        }
    }
}

impl QuoteDeskConfig {
    /// Load from `path`, the default override location, or embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(Error::NotFound(format!(
                    "Config file {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(default_path) if default_path.exists() => Self::from_file(&default_path),
            _ => parse_config(DEFAULT_CONFIG),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        let mut config = parse_config(&content)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("quotedesk").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    processing: Option<RawProcessing>,
    retry: Option<RawRetry>,
    costing: Option<RawCosting>,
    taxes: Option<RawTaxes>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawProcessing {
    sort_by_date: Option<bool>,
    validate_data: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawRetry {
    max_attempts: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCosting {
    import_cost_pool: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTaxes {
    ad_valorem: Option<f64>,
    igv: Option<f64>,
    ipm: Option<f64>,
    perception: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    currency_symbol: Option<String>,
    page_size: Option<usize>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<QuoteDeskConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = QuoteDeskConfig::default();

    if let Some(processing) = raw.processing {
        if let Some(sort) = processing.sort_by_date {
            config.processing.sort_by_date = sort;
        }
        if let Some(validate) = processing.validate_data {
            config.processing.validate_data = validate;
        }
    }

    if let Some(retry) = raw.retry {
        if let Some(attempts) = retry.max_attempts {
            config.retry.max_attempts = attempts;
        }
        if let Some(ms) = retry.base_delay_ms {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = retry.max_delay_ms {
            config.retry.max_delay = Duration::from_millis(ms);
        }
    }

    if let Some(pool) = raw.costing.and_then(|c| c.import_cost_pool) {
        config.import_cost_pool = pool;
    }

    if let Some(taxes) = raw.taxes {
        if let Some(rate) = taxes.ad_valorem {
            config.taxes.ad_valorem = rate;
        }
        if let Some(rate) = taxes.igv {
            config.taxes.igv = rate;
        }
        if let Some(rate) = taxes.ipm {
            config.taxes.ipm = rate;
        }
        if let Some(rate) = taxes.perception {
            config.taxes.perception = rate;
        }
    }

    if let Some(display) = raw.display {
        if let Some(symbol) = display.currency_symbol {
            config.display.currency_symbol = symbol;
        }
        if let Some(size) = display.page_size {
            config.display.page_size = size;
        }
    }

    Ok(config)
}

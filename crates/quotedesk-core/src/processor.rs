//! Response processor
//!
//! Assigns batch-unique identity to raw quotation responses, computes their
//! display metadata and orders them by date.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::format::parse_date;
use crate::models::{DisplayMetadata, ProcessedResponse, RawQuotationResponse};
use crate::numeric::round2;

/// Options for [`process_quotation_responses`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Most recent first
    pub sort_by_date: bool,
    /// Log validation findings (never aborts processing)
    pub validate_data: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            sort_by_date: true,
            validate_data: true,
        }
    }
}

/// Advisory validation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// `{serviceType}-{responseId}`, or `{serviceType}-temp-{index}` without an id
///
/// Unique within one batch. Not stable across batches when the backend omits
/// ids and the order changes.
pub fn generate_unique_id(response: &RawQuotationResponse, index: usize) -> String {
    match response
        .quotation_info
        .response_id
        .as_deref()
        .filter(|id| !id.is_empty())
    {
        Some(id) => format!("{}-{}", response.service_type, id),
        None => format!("{}-temp-{}", response.service_type, index),
    }
}

pub fn calculate_display_metadata(response: &RawQuotationResponse) -> DisplayMetadata {
    let products = &response.products;
    DisplayMetadata {
        product_count: products.len(),
        total_quantity: products.iter().map(|p| p.total_quantity()).sum(),
        total_value: round2(products.iter().map(|p| p.variants_price_total()).sum()),
        total_weight: products.iter().map(|p| p.weight()).sum(),
        total_volume: products.iter().map(|p| p.volume()).sum(),
        has_variants: products.iter().any(|p| !p.variants.is_empty()),
    }
}

pub fn validate_response_data(response: &RawQuotationResponse) -> ValidationReport {
    let mut errors = vec![];
    let mut warnings = vec![];

    if response.service_type.trim().is_empty() {
        errors.push("Missing service type".to_string());
    }

    if response.products.is_empty() {
        warnings.push("Response has no products".to_string());
    }

    for (index, product) in response.products.iter().enumerate() {
        if product.name.trim().is_empty() {
            errors.push(format!("Product {} is missing a name", index + 1));
        }
        if product.variants.is_empty() {
            let label = if product.name.trim().is_empty() {
                format!("Product {}", index + 1)
            } else {
                product.name.clone()
            };
            warnings.push(format!("{} has no variants", label));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Sort key for a response date; unparseable dates sort as the epoch
fn date_key(response: &ProcessedResponse) -> DateTime<Utc> {
    response
        .date()
        .and_then(parse_date)
        .unwrap_or_default()
}

pub fn process_quotation_responses(
    raw_responses: &[RawQuotationResponse],
    options: ProcessOptions,
) -> Vec<ProcessedResponse> {
    let processed_at = Utc::now();

    let mut processed: Vec<ProcessedResponse> = raw_responses
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let unique_id = generate_unique_id(raw, index);

            if options.validate_data {
                let report = validate_response_data(raw);
                if !report.is_valid || !report.warnings.is_empty() {
                    warn!(
                        unique_id = %unique_id,
                        errors = ?report.errors,
                        warnings = ?report.warnings,
                        "Quotation response failed validation"
                    );
                }
            }

            ProcessedResponse {
                response: raw.clone(),
                response_id: raw.quotation_info.response_id.clone(),
                unique_id,
                is_active: false,
                processed_at,
                display_metadata: calculate_display_metadata(raw),
            }
        })
        .collect();

    if options.sort_by_date {
        // Stable: equal dates keep batch order
        processed.sort_by_key(|r| std::cmp::Reverse(date_key(r)));
    }

    debug!("Processed {} quotation responses", processed.len());
    processed
}

//! Domain models for quotedesk
//!
//! Raw types mirror the backend's JSON exactly (camelCase wire names) and are
//! never mutated by the core. Derived types are rebuilt from raw data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::numeric::{to_number, LooseNumber};

/// Accept ids sent either as strings or as numbers
fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Treat an explicit `null` like a missing key
fn de_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Quote flags default to `true`, whether absent or `null`
fn de_null_true<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<bool>::deserialize(deserializer).map(|flag| flag.unwrap_or(true))
}

fn default_true() -> bool {
    true
}

/// One administrator response to a quotation for a given service type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawQuotationResponse {
    #[serde(default, deserialize_with = "de_null_default")]
    pub service_type: String,
    #[serde(default, deserialize_with = "de_null_default")]
    pub quotation_info: QuotationInfo,
    #[serde(default, deserialize_with = "de_null_default")]
    pub user: QuotationUser,
    #[serde(default, deserialize_with = "de_null_default")]
    pub products: Vec<RawProduct>,
}

/// Header data of a quotation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuotationInfo {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub correlative: Option<String>,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub response_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub cargo_type: Option<String>,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub incoterm: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Customer who requested the quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QuotationUser {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One product line in a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub product_id: Option<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    /// Authoritative total quantity when present
    #[serde(default)]
    pub quantity_total: Option<LooseNumber>,
    #[serde(default)]
    pub weight: Option<LooseNumber>,
    #[serde(default)]
    pub volume: Option<LooseNumber>,
    #[serde(default, rename = "number_of_boxes")]
    pub number_of_boxes: Option<LooseNumber>,
    #[serde(default)]
    pub admin_comment: Option<String>,
    /// Whether the product is included in the quote
    #[serde(
        default = "default_true",
        deserialize_with = "de_null_true",
        rename = "seCotizaProducto"
    )]
    pub is_quoted: bool,
    #[serde(default, deserialize_with = "de_null_default")]
    pub attachments: Vec<String>,
    #[serde(default, deserialize_with = "de_null_default")]
    pub variants: Vec<RawVariant>,
}

impl Default for RawProduct {
    fn default() -> Self {
        Self {
            product_id: None,
            name: String::new(),
            url: None,
            comment: None,
            quantity_total: None,
            weight: None,
            volume: None,
            number_of_boxes: None,
            admin_comment: None,
            is_quoted: true,
            attachments: vec![],
            variants: vec![],
        }
    }
}

impl RawProduct {
    /// Total quantity: `quantityTotal` when present, else the variant sum
    ///
    /// Shared by display metadata and pending totals so both agree.
    pub fn total_quantity(&self) -> f64 {
        match &self.quantity_total {
            Some(total) => total.value(),
            None => self.variants.iter().map(RawVariant::quantity).sum(),
        }
    }

    /// Sum of all variant prices
    pub fn variants_price_total(&self) -> f64 {
        self.variants.iter().map(RawVariant::price).sum()
    }

    pub fn weight(&self) -> f64 {
        to_number(self.weight.as_ref())
    }

    pub fn volume(&self) -> f64 {
        to_number(self.volume.as_ref())
    }

    pub fn boxes(&self) -> f64 {
        to_number(self.number_of_boxes.as_ref())
    }
}

/// One priced configuration of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub presentation: Option<String>,
    #[serde(default)]
    pub quantity: Option<LooseNumber>,
    #[serde(default)]
    pub price: Option<LooseNumber>,
    #[serde(default)]
    pub unit_cost: Option<LooseNumber>,
    #[serde(default)]
    pub import_costs: Option<LooseNumber>,
    #[serde(
        default = "default_true",
        deserialize_with = "de_null_true",
        rename = "seCotizaVariante"
    )]
    pub is_quoted: bool,
}

impl Default for RawVariant {
    fn default() -> Self {
        Self {
            variant_id: None,
            size: None,
            color: None,
            model: None,
            presentation: None,
            quantity: None,
            price: None,
            unit_cost: None,
            import_costs: None,
            is_quoted: true,
        }
    }
}

impl RawVariant {
    pub fn quantity(&self) -> f64 {
        to_number(self.quantity.as_ref())
    }

    pub fn price(&self) -> f64 {
        to_number(self.price.as_ref())
    }
}

/// Per-response summary shown in dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetadata {
    pub product_count: usize,
    pub total_quantity: f64,
    pub total_value: f64,
    pub total_weight: f64,
    pub total_volume: f64,
    pub has_variants: bool,
}

/// A raw response with identity and display metadata attached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResponse {
    #[serde(flatten)]
    pub response: RawQuotationResponse,
    pub unique_id: String,
    pub response_id: Option<String>,
    pub is_active: bool,
    pub processed_at: DateTime<Utc>,
    pub display_metadata: DisplayMetadata,
}

impl ProcessedResponse {
    pub fn service_type(&self) -> &str {
        &self.response.service_type
    }

    pub fn date(&self) -> Option<&str> {
        self.response.quotation_info.date.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.response.quotation_info.status.as_deref()
    }

    pub fn products(&self) -> &[RawProduct] {
        &self.response.products
    }

    /// Copy with a different active flag
    pub fn with_active(&self, is_active: bool) -> Self {
        Self {
            is_active,
            ..self.clone()
        }
    }
}

/// Responses sharing a service type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseGroup {
    pub service_type: String,
    pub responses: Vec<ProcessedResponse>,
    pub count: usize,
    /// First response of the group
    pub default_active: ProcessedResponse,
}

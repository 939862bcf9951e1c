//! quotedesk Core Library
//!
//! Data core of a freight-forwarding quotation desk:
//! - Raw quotation-response models with loose numeric coercion
//! - Response processing (unique ids, display metadata, date ordering)
//! - Grouping by service type, filtering and activation
//! - Product costing, unit cost tables and aggregate totals
//! - CIF valuation and import taxes
//! - Error classification and bounded retry with backoff
//! - Display formatters and pagination
//! - TOML configuration with embedded defaults

pub mod config;
pub mod costing;
pub mod error;
pub mod filter;
pub mod format;
pub mod grouping;
pub mod models;
pub mod numeric;
pub mod pagination;
pub mod processor;
pub mod response_error;
pub mod retry;
pub mod tax;

pub use config::{DisplayConfig, QuoteDeskConfig};
pub use costing::{
    calculate_factor_m, calculate_group_totals, calculate_pending_totals,
    calculate_product_costing, calculate_unit_costs_for_table, CostingCalculation,
    EnrichedProduct, GroupTotals, PendingTotals,
};
pub use error::{Error, Result};
pub use filter::{filter_responses, DateRange, FilterCriteria, ResponseFilter};
pub use grouping::{
    activate_response, calculate_response_statistics, find_response_by_unique_id,
    group_responses_by_service_type, GroupedResponses, ResponseStatistics,
};
pub use models::{
    DisplayMetadata, ProcessedResponse, QuotationInfo, QuotationUser, RawProduct,
    RawQuotationResponse, RawVariant, ResponseGroup,
};
pub use numeric::{round2, safe_div, to_number, LooseNumber};
pub use pagination::{paginate, Page};
pub use processor::{
    calculate_display_metadata, generate_unique_id, process_quotation_responses,
    validate_response_data, ProcessOptions, ValidationReport,
};
pub use response_error::{
    create_error_object, get_recovery_strategy, get_user_friendly_message, is_retryable_error,
    log_error, ErrorShape, ErrorSource, ErrorType, RecoveryStrategy, ResponseError,
    ResponseErrorBoundary, RetryHandle, Strategy,
};
pub use retry::{get_retry_delay, with_retry, with_retry_policy, RetryPolicy};
pub use tax::{calculate_cif, calculate_import_taxes, ImportTaxes, TaxExemptions, TaxRates};

//! Cost calculator
//!
//! Per-product costing (equivalence, import cost allocation, unit cost) and
//! aggregate totals over product lists and response groups.
//!
//! Two aggregation rules coexist on purpose:
//! - [`calculate_product_costing`], [`calculate_pending_totals`] and display
//!   metadata sum every variant of a product.
//! - [`calculate_unit_costs_for_table`] prices a product by its first variant
//!   only, so multi-variant products under-report in the unit cost table.

use serde::Serialize;

use crate::models::{ProcessedResponse, RawProduct};
use crate::numeric::{round2, safe_div};

/// Import cost pool allocated across products by equivalence.
///
/// The allocation base is not defined yet, so every product gets 0.
pub const DEFAULT_IMPORT_COST_POOL: f64 = 0.0;

/// Costing of one product
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CostingCalculation {
    pub commercial_value: f64,
    /// Share of the response's commercial value, in percent
    pub equivalence: f64,
    pub import_costs: f64,
    pub total_cost: f64,
    pub unit_cost: f64,
    pub quantity: f64,
}

/// Product row of the unit cost table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProduct {
    pub product_id: Option<String>,
    pub name: String,
    pub quantity: f64,
    /// Price of the first variant
    pub price: f64,
    pub equivalence: f64,
    pub import_costs: f64,
    pub total_cost: f64,
    pub unit_cost: f64,
}

/// Totals for the pending-quotation view
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PendingTotals {
    /// Sum of variant `price × quantity`
    pub total_express: f64,
    pub total_quantity: f64,
    #[serde(rename = "totalCBM")]
    pub total_cbm: f64,
    pub total_weight: f64,
    pub total_price: f64,
}

/// Aggregate of display metadata across a response group
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotals {
    pub total_responses: usize,
    pub total_products: usize,
    pub total_quantity: f64,
    pub total_value: f64,
    pub total_weight: f64,
    pub total_volume: f64,
    pub average_value: f64,
    pub average_quantity: f64,
}

/// Shared formula for a product priced at `commercial_value`
fn costing_for(
    commercial_value: f64,
    quantity: f64,
    total_commercial_value: f64,
    import_cost_pool: f64,
) -> CostingCalculation {
    let equivalence = safe_div(commercial_value, total_commercial_value) * 100.0;
    let import_costs = equivalence / 100.0 * import_cost_pool;
    let total_cost = commercial_value + import_costs;
    let unit_cost = safe_div(total_cost, quantity);

    CostingCalculation {
        commercial_value: round2(commercial_value),
        equivalence: round2(equivalence),
        import_costs: round2(import_costs),
        total_cost: round2(total_cost),
        unit_cost: round2(unit_cost),
        quantity,
    }
}

pub fn calculate_product_costing(
    product: &RawProduct,
    total_commercial_value: f64,
) -> CostingCalculation {
    calculate_product_costing_with_pool(product, total_commercial_value, DEFAULT_IMPORT_COST_POOL)
}

/// [`calculate_product_costing`] with an explicit import cost pool
pub fn calculate_product_costing_with_pool(
    product: &RawProduct,
    total_commercial_value: f64,
    import_cost_pool: f64,
) -> CostingCalculation {
    costing_for(
        product.variants_price_total(),
        product.total_quantity(),
        total_commercial_value,
        import_cost_pool,
    )
}

pub fn calculate_unit_costs_for_table(
    products: &[RawProduct],
    total_commercial_value: f64,
) -> Vec<EnrichedProduct> {
    calculate_unit_costs_for_table_with_pool(
        products,
        total_commercial_value,
        DEFAULT_IMPORT_COST_POOL,
    )
}

/// [`calculate_unit_costs_for_table`] with an explicit import cost pool
pub fn calculate_unit_costs_for_table_with_pool(
    products: &[RawProduct],
    total_commercial_value: f64,
    import_cost_pool: f64,
) -> Vec<EnrichedProduct> {
    products
        .iter()
        .map(|product| {
            let price = product.variants.first().map(|v| v.price()).unwrap_or(0.0);
            let costing = costing_for(
                price,
                product.total_quantity(),
                total_commercial_value,
                import_cost_pool,
            );
            EnrichedProduct {
                product_id: product.product_id.clone(),
                name: product.name.clone(),
                quantity: costing.quantity,
                price: costing.commercial_value,
                equivalence: costing.equivalence,
                import_costs: costing.import_costs,
                total_cost: costing.total_cost,
                unit_cost: costing.unit_cost,
            }
        })
        .collect()
}

pub fn calculate_pending_totals(products: &[RawProduct]) -> PendingTotals {
    let mut totals = PendingTotals::default();
    for product in products {
        totals.total_quantity += product.total_quantity();
        totals.total_cbm += product.volume();
        totals.total_weight += product.weight();
        totals.total_price += product.variants_price_total();
        totals.total_express += product
            .variants
            .iter()
            .map(|v| v.price() * v.quantity())
            .sum::<f64>();
    }

    PendingTotals {
        total_express: round2(totals.total_express),
        total_price: round2(totals.total_price),
        ..totals
    }
}

/// Factor M: mean of the products' total cost
pub fn calculate_factor_m(products: &[EnrichedProduct]) -> f64 {
    let sum: f64 = products.iter().map(|p| p.total_cost).sum();
    round2(safe_div(sum, products.len() as f64))
}

pub fn calculate_group_totals(responses: &[ProcessedResponse]) -> GroupTotals {
    let mut totals = GroupTotals {
        total_responses: responses.len(),
        ..Default::default()
    };
    for response in responses {
        let meta = &response.display_metadata;
        totals.total_products += meta.product_count;
        totals.total_quantity += meta.total_quantity;
        totals.total_value += meta.total_value;
        totals.total_weight += meta.total_weight;
        totals.total_volume += meta.total_volume;
    }
    totals.total_value = round2(totals.total_value);
    let count = responses.len() as f64;
    totals.average_value = round2(safe_div(totals.total_value, count));
    totals.average_quantity = safe_div(totals.total_quantity, count);
    totals
}

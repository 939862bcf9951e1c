//! Costing and tax command implementations

use anyhow::Result;
use quotedesk_core::costing::{
    calculate_product_costing_with_pool, calculate_unit_costs_for_table_with_pool,
};
use quotedesk_core::format::{
    format_currency, format_percentage, format_quantity, format_volume, format_weight,
};
use quotedesk_core::{
    calculate_cif, calculate_factor_m, calculate_import_taxes, calculate_pending_totals,
    find_response_by_unique_id, process_quotation_responses, CostingCalculation,
    EnrichedProduct, ImportTaxes, PendingTotals, QuoteDeskConfig, RawQuotationResponse,
    TaxExemptions,
};
use serde::Serialize;

use super::{print_json, truncate};
use crate::cli::TaxArgs;

/// Full costing breakdown for one response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingReport {
    pub unique_id: String,
    pub total_commercial_value: f64,
    pub products: Vec<ProductCosting>,
    pub unit_costs: Vec<EnrichedProduct>,
    pub factor_m: f64,
    pub pending_totals: PendingTotals,
}

#[derive(Debug, Serialize)]
pub struct ProductCosting {
    pub name: String,
    #[serde(flatten)]
    pub costing: CostingCalculation,
}

pub fn build_costing_report(
    responses: &[RawQuotationResponse],
    config: &QuoteDeskConfig,
    unique_id: &str,
    total: Option<f64>,
) -> Result<CostingReport> {
    let processed = process_quotation_responses(responses, config.processing);
    let response = find_response_by_unique_id(&processed, unique_id).ok_or_else(|| {
        let known: Vec<&str> = processed.iter().map(|r| r.unique_id.as_str()).collect();
        anyhow::anyhow!(
            "Response not found: {} (available: {})",
            unique_id,
            known.join(", ")
        )
    })?;

    let total_commercial_value = total.unwrap_or(response.display_metadata.total_value);
    let pool = config.import_cost_pool;

    let products = response
        .products()
        .iter()
        .map(|p| ProductCosting {
            name: p.name.clone(),
            costing: calculate_product_costing_with_pool(p, total_commercial_value, pool),
        })
        .collect();
    let unit_costs =
        calculate_unit_costs_for_table_with_pool(response.products(), total_commercial_value, pool);

    Ok(CostingReport {
        unique_id: response.unique_id.clone(),
        total_commercial_value,
        factor_m: calculate_factor_m(&unit_costs),
        products,
        unit_costs,
        pending_totals: calculate_pending_totals(response.products()),
    })
}

/// One line of the costing table
pub fn costing_row(product: &ProductCosting, symbol: &str) -> String {
    let c = &product.costing;
    format!(
        "   {:20} │ {:>9} │ {:>12} │ {:>8} │ {:>12} │ {:>10}",
        truncate(&product.name, 20),
        format_quantity(c.quantity),
        format_currency(c.commercial_value, symbol),
        format_percentage(c.equivalence),
        format_currency(c.total_cost, symbol),
        format_currency(c.unit_cost, symbol)
    )
}

pub fn cmd_costing(
    responses: &[RawQuotationResponse],
    config: &QuoteDeskConfig,
    unique_id: &str,
    total: Option<f64>,
    json: bool,
) -> Result<()> {
    let report = build_costing_report(responses, config, unique_id, total)?;

    if json {
        return print_json(&report);
    }

    let symbol = &config.display.currency_symbol;
    let money = |v: f64| format_currency(v, symbol);

    println!();
    println!("💰 Costing for {}", report.unique_id);
    println!("   Commercial value: {}", money(report.total_commercial_value));
    println!("   ─────────────────────────────────────────────────────────────────────────");

    if report.products.is_empty() {
        println!("   No products in this response.");
        return Ok(());
    }

    println!(
        "   {:20} │ {:>9} │ {:>12} │ {:>8} │ {:>12} │ {:>10}",
        "Product", "Qty", "Value", "Equiv", "Total cost", "Unit cost"
    );
    println!("   ─────────────────────┼───────────┼──────────────┼──────────┼──────────────┼───────────");
    for product in &report.products {
        println!("{}", costing_row(product, symbol));
    }

    println!();
    println!("🧾 Unit Cost Table");
    println!(
        "   {:20} │ {:>9} │ {:>10} │ {:>10}",
        "Product", "Qty", "Price", "Unit cost"
    );
    println!("   ─────────────────────┼───────────┼────────────┼───────────");
    for row in &report.unit_costs {
        println!(
            "   {:20} │ {:>9} │ {:>10} │ {:>10}",
            truncate(&row.name, 20),
            format_quantity(row.quantity),
            money(row.price),
            money(row.unit_cost)
        );
    }
    println!("   Factor M: {:.2}", report.factor_m);

    let pending = &report.pending_totals;
    println!();
    println!("📦 Pending Totals");
    println!("   Quantity:  {}", format_quantity(pending.total_quantity));
    println!("   Weight:    {}", format_weight(pending.total_weight));
    println!("   Volume:    {}", format_volume(pending.total_cbm));
    println!("   Price:     {}", money(pending.total_price));
    println!("   Express:   {}", money(pending.total_express));

    Ok(())
}

pub fn compute_taxes(config: &QuoteDeskConfig, args: &TaxArgs) -> Result<ImportTaxes> {
    if args.fob < 0.0 || args.freight < 0.0 || args.insurance < 0.0 {
        anyhow::bail!("FOB, freight and insurance must not be negative");
    }

    let exemptions = TaxExemptions {
        ad_valorem: args.exempt_ad_valorem,
        igv: args.exempt_igv,
        ipm: args.exempt_ipm,
        perception: args.exempt_perception,
    };
    let cif = calculate_cif(args.fob, args.freight, args.insurance);
    Ok(calculate_import_taxes(cif, &config.taxes, &exemptions))
}

pub fn cmd_taxes(config: &QuoteDeskConfig, args: &TaxArgs, json: bool) -> Result<()> {
    let taxes = compute_taxes(config, args)?;

    if json {
        return print_json(&taxes);
    }

    let symbol = &config.display.currency_symbol;
    let rates = &config.taxes;
    println!();
    println!("🏛️  Import Taxes");
    println!("   ─────────────────────────────────────────────");
    println!("   {:22} {:>14}", "CIF", format_currency(taxes.cif, symbol));
    println!(
        "   {:22} {:>14}",
        format!("Ad valorem ({:.1}%)", rates.ad_valorem * 100.0),
        format_currency(taxes.ad_valorem, symbol)
    );
    println!(
        "   {:22} {:>14}",
        format!("IGV ({:.1}%)", rates.igv * 100.0),
        format_currency(taxes.igv, symbol)
    );
    println!(
        "   {:22} {:>14}",
        format!("IPM ({:.1}%)", rates.ipm * 100.0),
        format_currency(taxes.ipm, symbol)
    );
    println!(
        "   {:22} {:>14}",
        format!("Perception ({:.1}%)", rates.perception * 100.0),
        format_currency(taxes.perception, symbol)
    );
    println!("   ─────────────────────────────────────────────");
    println!("   {:22} {:>14}", "Total taxes", format_currency(taxes.total, symbol));

    Ok(())
}

//! Response commands (summary, groups, list, validate)

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use quotedesk_core::format::{
    format_currency, format_date, format_quantity, format_volume, format_weight,
};
use quotedesk_core::{
    activate_response, calculate_group_totals, calculate_response_statistics, filter_responses,
    group_responses_by_service_type, paginate, process_quotation_responses,
    validate_response_data, DateRange, FilterCriteria, GroupTotals, ProcessOptions,
    ProcessedResponse, QuoteDeskConfig, RawQuotationResponse, ResponseFilter, ResponseStatistics,
};
use serde::Serialize;

use super::{print_json, truncate};
use crate::cli::ListArgs;

/// Parsed `list` arguments
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub criteria: FilterCriteria,
    pub activate: Option<String>,
    pub page: usize,
    pub page_size: usize,
    pub sort_by_date: bool,
}

impl ListOptions {
    pub fn from_args(args: &ListArgs, config: &QuoteDeskConfig) -> Result<Self> {
        let date_range = resolve_date_range(args.from.as_deref(), args.to.as_deref())?;
        let criteria = ResponseFilter::new()
            .service_type(args.service_type.as_deref())
            .response_id(args.response_id.as_deref())
            .date_range(date_range)
            .status(args.status.as_deref())
            .build();

        Ok(Self {
            criteria,
            activate: args.activate.clone(),
            page: args.page,
            page_size: args.page_size.unwrap_or(config.display.page_size),
            sort_by_date: config.processing.sort_by_date && !args.no_sort,
        })
    }
}

fn parse_day(raw: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// Turn `--from`/`--to` into an inclusive range covering whole days
///
/// A missing bound is left open.
pub fn resolve_date_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>> {
    if from.is_none() && to.is_none() {
        return Ok(None);
    }

    let start = match from {
        Some(raw) => Utc.from_utc_datetime(&parse_day(raw, "--from")?.and_time(NaiveTime::MIN)),
        None => chrono::DateTime::<Utc>::MIN_UTC,
    };
    let end = match to {
        Some(raw) => {
            let day = parse_day(raw, "--to")?;
            let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                .context("Invalid end-of-day time")?;
            Utc.from_utc_datetime(&day.and_time(last))
        }
        None => chrono::DateTime::<Utc>::MAX_UTC,
    };

    if start > end {
        anyhow::bail!("--from must not be after --to");
    }
    Ok(Some(DateRange::new(start, end)))
}

fn process(
    responses: &[RawQuotationResponse],
    config: &QuoteDeskConfig,
) -> Vec<ProcessedResponse> {
    process_quotation_responses(responses, config.processing)
}

/// Batch statistics plus totals per service type
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub statistics: ResponseStatistics,
    pub groups: Vec<ServiceTotals>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTotals {
    pub service_type: String,
    #[serde(flatten)]
    pub totals: GroupTotals,
}

pub fn build_summary(
    responses: &[RawQuotationResponse],
    config: &QuoteDeskConfig,
) -> BatchSummary {
    let processed = process(responses, config);
    let groups = group_responses_by_service_type(&processed)
        .into_iter()
        .map(|group| ServiceTotals {
            totals: calculate_group_totals(&group.responses),
            service_type: group.service_type,
        })
        .collect();

    BatchSummary {
        statistics: calculate_response_statistics(&processed),
        groups,
    }
}

pub fn cmd_summary(
    responses: &[RawQuotationResponse],
    config: &QuoteDeskConfig,
    json: bool,
) -> Result<()> {
    let summary = build_summary(responses, config);

    if json {
        return print_json(&summary);
    }

    let stats = &summary.statistics;
    let symbol = &config.display.currency_symbol;
    println!();
    println!("📊 Quotation Summary");
    println!("   ─────────────────────────────────────────────");

    if stats.total_responses == 0 {
        println!("   No responses found.");
        return Ok(());
    }

    println!("   Responses:      {}", stats.total_responses);
    println!("   Service types:  {}", stats.service_types.join(", "));
    println!("   Products:       {}", stats.total_products);
    println!("   Total quantity: {}", format_quantity(stats.total_quantity));
    println!("   Total value:    {}", format_currency(stats.total_value, symbol));
    println!(
        "   Per response:   {:.1} products, {}",
        stats.average_products_per_response,
        format_currency(stats.average_value_per_response, symbol)
    );

    println!();
    println!(
        "   {:12} │ {:>9} │ {:>14} │ {:>14} │ {:>12} │ {:>10}",
        "Service", "Quantity", "Total value", "Avg value", "Weight", "Volume"
    );
    println!("   ─────────────┼───────────┼────────────────┼────────────────┼──────────────┼───────────");
    for group in &summary.groups {
        let t = &group.totals;
        println!(
            "   {:12} │ {:>9} │ {:>14} │ {:>14} │ {:>12} │ {:>10}",
            truncate(&group.service_type, 12),
            format_quantity(t.total_quantity),
            format_currency(t.total_value, symbol),
            format_currency(t.average_value, symbol),
            format_weight(t.total_weight),
            format_volume(t.total_volume)
        );
    }

    Ok(())
}

pub fn cmd_groups(
    responses: &[RawQuotationResponse],
    config: &QuoteDeskConfig,
    json: bool,
) -> Result<()> {
    let processed = process(responses, config);
    let grouped = group_responses_by_service_type(&processed);

    if json {
        return print_json(&grouped);
    }

    let symbol = &config.display.currency_symbol;
    println!();
    println!("📦 Responses by Service Type");
    println!("   ─────────────────────────────────────────────────────────────");

    if grouped.is_empty() {
        println!("   No responses found.");
        return Ok(());
    }

    println!("   {} service type(s)", grouped.len());

    println!(
        "   {:12} │ {:>5} │ {:18} │ {:>14} │ {:>12}",
        "Service", "Count", "Active", "Total value", "Weight"
    );
    println!("   ─────────────┼───────┼────────────────────┼────────────────┼──────────────");

    for group in grouped.iter() {
        let totals = calculate_group_totals(&group.responses);
        println!(
            "   {:12} │ {:>5} │ {:18} │ {:>14} │ {:>12}",
            truncate(&group.service_type, 12),
            group.count,
            truncate(&group.default_active.unique_id, 18),
            format_currency(totals.total_value, symbol),
            format_weight(totals.total_weight)
        );
    }

    Ok(())
}

pub fn cmd_list(
    responses: &[RawQuotationResponse],
    config: &QuoteDeskConfig,
    options: &ListOptions,
    json: bool,
) -> Result<()> {
    let process_options = ProcessOptions {
        sort_by_date: options.sort_by_date,
        ..config.processing
    };
    let processed = process_quotation_responses(responses, process_options);
    let mut filtered = filter_responses(&processed, &options.criteria);

    if let Some(ref target) = options.activate {
        if !filtered.iter().any(|r| &r.unique_id == target) {
            tracing::warn!("No response with id {} to activate", target);
        }
        filtered = activate_response(&filtered, target);
    }

    let page = paginate(&filtered, options.page, options.page_size);

    if json {
        return print_json(&page);
    }

    let symbol = &config.display.currency_symbol;
    println!();
    println!("📋 Quotation Responses");
    println!("   ─────────────────────────────────────────────────────────────────────────");

    if page.total_items == 0 {
        println!("   No responses match.");
        return Ok(());
    }

    println!(
        "   {:1} {:18} │ {:10} │ {:10} │ {:12} │ {:>8} │ {:>14}",
        "", "Id", "Service", "Date", "Status", "Products", "Total value"
    );
    println!("   ───────────────────┼────────────┼────────────┼──────────────┼──────────┼────────────────");

    for response in &page.items {
        println!(
            "   {:1} {:18} │ {:10} │ {:10} │ {:12} │ {:>8} │ {:>14}",
            if response.is_active { "*" } else { "" },
            truncate(&response.unique_id, 18),
            truncate(response.service_type(), 10),
            format_date(response.date()),
            truncate(response.status().unwrap_or("-"), 12),
            response.display_metadata.product_count,
            format_currency(response.display_metadata.total_value, symbol)
        );
    }

    println!();
    println!(
        "   Page {} of {} ({} responses)",
        page.page, page.total_pages, page.total_items
    );
    if page.has_next() {
        println!("   Next: --page {}", page.page + 1);
    }

    Ok(())
}

pub fn cmd_validate(responses: &[RawQuotationResponse], json: bool) -> Result<()> {
    let reports: Vec<_> = responses.iter().map(validate_response_data).collect();
    let invalid = reports.iter().filter(|r| !r.is_valid).count();

    if json {
        print_json(&reports)?;
    } else {
        println!();
        println!("🔍 Validation");
        println!("   ─────────────────────────────────────────────");

        for (index, report) in reports.iter().enumerate() {
            let label = responses[index]
                .quotation_info
                .response_id
                .as_deref()
                .unwrap_or("(no id)");
            let icon = if !report.is_valid {
                "❌"
            } else if report.warnings.is_empty() {
                "✓"
            } else {
                "⚠️"
            };
            println!("   {} #{} {}", icon, index, label);
            for error in &report.errors {
                println!("      error: {}", error);
            }
            for warning in &report.warnings {
                println!("      warning: {}", warning);
            }
        }

        println!();
        println!(
            "   {} of {} responses valid",
            reports.len() - invalid,
            reports.len()
        );
    }

    if invalid > 0 {
        anyhow::bail!("{} invalid response(s)", invalid);
    }
    Ok(())
}

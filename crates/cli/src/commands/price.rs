use std::path::Path;

use ratecard_core::{
    ContextData, DeterministicPricingEngine, PricingContext, PricingEngine, PricingResult,
    QuotePricing, Quote,
};
use tracing::info;

use super::{load_json, CommandResult};

pub fn run(context_path: &Path, quote_path: &Path, json: bool) -> CommandResult {
    match price(context_path, quote_path) {
        Ok(pricing) => {
            info!(
                event_name = "pricing.quote.complete",
                quote_id = %pricing.quote_id.0,
                lines = pricing.lines.len(),
                "quote calculation complete"
            );
            render(&pricing, json)
        }
        Err(error) => CommandResult::failure("price", "pricing", format!("{error:#}"), 1),
    }
}

fn price(context_path: &Path, quote_path: &Path) -> anyhow::Result<QuotePricing> {
    let data: ContextData = load_json(context_path, "pricing context")?;
    let context = PricingContext::new(data)?;
    let quote: Quote = load_json(quote_path, "quote")?;

    info!(
        event_name = "pricing.quote.start",
        quote_id = %quote.id.0,
        packages = quote.packages.len(),
        aggregated = quote.use_aggregated_pricing,
        "starting quote calculation"
    );

    Ok(DeterministicPricingEngine::default().price_quote(&context, &quote)?)
}

fn render(pricing: &QuotePricing, json: bool) -> CommandResult {
    if json {
        return match serde_json::to_string_pretty(pricing) {
            Ok(output) => CommandResult::rendered(output),
            Err(error) => CommandResult::failure("price", "serialization", error.to_string(), 1),
        };
    }

    let mut lines = vec![format!("quote {}: {} lines", pricing.quote_id.0, pricing.lines.len())];
    for line in &pricing.lines {
        lines.push(render_line(line));
    }
    for totals in &pricing.package_totals {
        lines.push(format!(
            "package {}: monthly {} annual {}",
            totals.package_id.0, totals.monthly_total, totals.annual_total
        ));
    }
    lines.push(format!(
        "total: monthly {} annual {}",
        pricing.totals.monthly_total, pricing.totals.annual_total
    ));
    CommandResult::rendered(lines.join("\n"))
}

pub(crate) fn render_line(line: &PricingResult) -> String {
    let mut rendered = format!(
        "- {} x{} @ {} ({}% off list {}): monthly {} annual {}",
        line.entry_id,
        line.quantity,
        line.unit_price,
        line.combined_discount_pct,
        line.list_price,
        line.monthly_total,
        line.annual_total
    );
    if let Some(aggregate) = line.aggregate_quantity {
        rendered.push_str(&format!(" [aggregated at {aggregate}]"));
    }
    rendered
}

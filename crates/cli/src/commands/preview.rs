use std::path::Path;

use ratecard_core::{
    ContextData, DeterministicPricingEngine, PreviewItem, PricingContext, PricingEngine,
    PricingResult,
};
use rust_decimal::Decimal;
use tracing::info;

use super::{load_json, CommandResult};

pub fn run(
    context_path: &Path,
    items_path: &Path,
    json: bool,
    cost_split_ratio: Decimal,
) -> CommandResult {
    match preview(context_path, items_path, cost_split_ratio) {
        Ok(results) => {
            info!(
                event_name = "pricing.preview.complete",
                items = results.len(),
                "preview calculation complete"
            );
            render(&results, json)
        }
        Err(error) => CommandResult::failure("preview", "pricing", format!("{error:#}"), 1),
    }
}

fn preview(
    context_path: &Path,
    items_path: &Path,
    cost_split_ratio: Decimal,
) -> anyhow::Result<Vec<PricingResult>> {
    let data: ContextData = load_json(context_path, "pricing context")?;
    let context = PricingContext::new(data)?;
    let items: Vec<PreviewItem> = load_json(items_path, "preview items")?;

    Ok(DeterministicPricingEngine::default().price_preview(&context, &items, cost_split_ratio)?)
}

fn render(results: &[PricingResult], json: bool) -> CommandResult {
    if json {
        return match serde_json::to_string_pretty(results) {
            Ok(output) => CommandResult::rendered(output),
            Err(error) => CommandResult::failure("preview", "serialization", error.to_string(), 1),
        };
    }

    let mut lines = vec![format!("preview: {} items", results.len())];
    for line in results {
        lines.push(super::price::render_line(line));
    }
    CommandResult::rendered(lines.join("\n"))
}

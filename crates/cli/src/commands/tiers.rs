use std::path::Path;

use ratecard_core::{tier_preview, ContextData, EntryId, PricingContext};

use super::{load_json, CommandResult};

pub fn run(context_path: &Path, entry: &str) -> CommandResult {
    match tiers(context_path, entry) {
        Ok(output) => CommandResult::rendered(output),
        Err(error) => CommandResult::failure("tiers", "pricing", format!("{error:#}"), 1),
    }
}

fn tiers(context_path: &Path, entry: &str) -> anyhow::Result<String> {
    let data: ContextData = load_json(context_path, "pricing context")?;
    let context = PricingContext::new(data)?;
    let entry_id = EntryId(entry.to_owned());
    let tiers = tier_preview(&context, &entry_id)?;

    let mut lines = vec![format!("tiers for {entry}: {}", tiers.len())];
    for tier in &tiers {
        let upper = tier
            .max_quantity
            .map(|max| max.to_string())
            .unwrap_or_else(|| "unbounded".to_owned());
        lines.push(format!("- {}..{} @ {}", tier.min_quantity, upper, tier.unit_price));
    }
    Ok(lines.join("\n"))
}

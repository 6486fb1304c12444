use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::domain::catalog::EntryId;
use crate::domain::quote::{PackageId, Quote};
use crate::domain::result::PhaseTrace;
use crate::errors::PricingError;
use crate::pricing::context::PricingContext;
use crate::pricing::curve;
use crate::pricing::phases::TimePhase;
use crate::rounding::round_rate;

/// Duration-weighted average unit price for one (package, entry) pair, with
/// the per-phase trace retained for display.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedPrice {
    pub unit_price: Decimal,
    /// Aggregate quantity in the first phase the item overlaps, i.e. the
    /// full concurrent commitment it was priced against.
    pub aggregate_quantity: u64,
    pub phases: Vec<PhaseTrace>,
}

pub type WeightedPriceMap = HashMap<(PackageId, EntryId), WeightedPrice>;

/// Price every phase at its aggregate quantity, then blend per line item
/// across the phases its term overlaps, weighted by overlap months. Only
/// meaningful for quotes that opted into aggregated pricing.
pub fn weighted_prices(
    context: &PricingContext,
    quote: &Quote,
    phases_by_entry: &HashMap<EntryId, Vec<TimePhase>>,
) -> Result<WeightedPriceMap, PricingError> {
    let mut phase_prices: HashMap<EntryId, Vec<Decimal>> = HashMap::new();
    for (entry_id, phases) in phases_by_entry {
        let curve = context.curve(entry_id);
        let ladder = context.ladder(entry_id);
        let prices = phases
            .iter()
            .map(|phase| curve::unit_price(entry_id, curve, ladder, phase.quantity))
            .collect::<Result<Vec<_>, _>>()?;
        phase_prices.insert(entry_id.clone(), prices);
    }

    let mut weighted = WeightedPriceMap::new();
    for package in &quote.packages {
        for item in &package.items {
            let Some(phases) = phases_by_entry.get(&item.entry_id) else {
                continue;
            };
            let prices = &phase_prices[&item.entry_id];
            let term = item.effective_term(package.term_months);

            let mut price_months = Decimal::ZERO;
            let mut total_months = 0u32;
            let mut trace = Vec::new();
            let mut first_phase_quantity = None;

            for (phase, price) in phases.iter().zip(prices) {
                if phase.start_month > term {
                    continue;
                }
                let overlap = phase.end_month.min(term) - phase.start_month + 1;
                price_months += *price * Decimal::from(overlap);
                total_months += overlap;
                first_phase_quantity.get_or_insert(phase.quantity);
                trace.push(PhaseTrace {
                    phase: phase.key(),
                    months: overlap,
                    unit_price: *price,
                    aggregate_quantity: phase.quantity,
                });
            }

            if total_months == 0 {
                continue;
            }
            weighted
                .entry((package.id.clone(), item.entry_id.clone()))
                .or_insert_with(|| WeightedPrice {
                    unit_price: round_rate(price_months / Decimal::from(total_months)),
                    aggregate_quantity: first_phase_quantity.unwrap_or(item.quantity),
                    phases: trace,
                });
        }
    }

    Ok(weighted)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::weighted_prices;
    use crate::domain::catalog::{BillingKind, CatalogEntry, Category, EntryId};
    use crate::domain::quote::{
        default_cost_split_ratio, Environment, LineItem, Package, PackageId, Quote, QuoteId,
    };
    use crate::errors::PricingError;
    use crate::pricing::context::{ContextData, LadderTier, PricingContext};
    use crate::pricing::phases::decompose;

    fn entry_id() -> EntryId {
        EntryId("vm-standard".to_owned())
    }

    fn context_with_ladder(tiers: Vec<LadderTier>) -> PricingContext {
        let mut data = ContextData::default();
        data.entries.push(CatalogEntry {
            id: entry_id(),
            name: "Standard VM".to_owned(),
            category: Category::Compute,
            unit: "instance".to_owned(),
            billing: BillingKind::UsageMetered,
        });
        data.ladders.insert(entry_id(), tiers);
        PricingContext::new(data).expect("valid context")
    }

    fn three_term_quote() -> Quote {
        let package = |id: &str, term: u32, quantity: u64| Package {
            id: PackageId(id.to_owned()),
            term_months: term,
            items: vec![LineItem {
                entry_id: entry_id(),
                quantity,
                term_override_months: None,
                environment: Environment::Production,
            }],
        };
        Quote {
            id: QuoteId("Q-1".to_owned()),
            packages: vec![
                package("P-12", 12, 100),
                package("P-24", 24, 50),
                package("P-36", 36, 30),
            ],
            use_aggregated_pricing: true,
            cost_split_ratio: default_cost_split_ratio(),
            created_at: Utc::now(),
        }
    }

    fn ladder() -> Vec<LadderTier> {
        vec![
            LadderTier { min_quantity: 1, max_quantity: Some(49), unit_price: Decimal::new(1000, 2) },
            LadderTier {
                min_quantity: 50,
                max_quantity: Some(99),
                unit_price: Decimal::new(800, 2),
            },
            LadderTier { min_quantity: 100, max_quantity: None, unit_price: Decimal::new(600, 2) },
        ]
    }

    #[test]
    fn long_item_blends_all_three_phase_prices() {
        let context = context_with_ladder(ladder());
        let quote = three_term_quote();
        let phases = decompose(&context, &quote);
        let weighted = weighted_prices(&context, &quote, &phases).expect("weighted prices");

        // Phase quantities 180 / 80 / 30 price at 6.00 / 8.00 / 10.00.
        let thirty_six = &weighted[&(PackageId("P-36".to_owned()), entry_id())];
        let expected = (Decimal::new(600, 2) * Decimal::from(12)
            + Decimal::new(800, 2) * Decimal::from(12)
            + Decimal::new(1000, 2) * Decimal::from(12))
            / Decimal::from(36);
        assert_eq!(thirty_six.unit_price, expected.round_dp(4));
        assert_eq!(thirty_six.aggregate_quantity, 180);
        assert_eq!(thirty_six.phases.len(), 3);
        assert_eq!(thirty_six.phases[0].phase, "1-12");
        assert_eq!(thirty_six.phases[0].months, 12);
        assert_eq!(thirty_six.phases[2].aggregate_quantity, 30);
    }

    #[test]
    fn short_item_only_sees_its_own_phase() {
        let context = context_with_ladder(ladder());
        let quote = three_term_quote();
        let phases = decompose(&context, &quote);
        let weighted = weighted_prices(&context, &quote, &phases).expect("weighted prices");

        let twelve = &weighted[&(PackageId("P-12".to_owned()), entry_id())];
        assert_eq!(twelve.unit_price, Decimal::new(60000, 4));
        assert_eq!(twelve.phases.len(), 1);
        assert_eq!(twelve.phases[0].months, 12);
    }

    #[test]
    fn phase_price_failure_aborts_the_aggregation() {
        // Bounded ladder: the 180-unit first phase exceeds every tier.
        let bounded = vec![LadderTier {
            min_quantity: 1,
            max_quantity: Some(100),
            unit_price: Decimal::new(1000, 2),
        }];
        let context = context_with_ladder(bounded);
        let quote = three_term_quote();
        let phases = decompose(&context, &quote);

        let error = weighted_prices(&context, &quote, &phases).expect_err("no matching tier");
        assert!(matches!(error, PricingError::NoMatchingTier { quantity: 180, .. }));
    }
}

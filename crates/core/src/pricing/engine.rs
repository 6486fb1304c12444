use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogEntry, Category, EntryId};
use crate::domain::quote::{Environment, LineItem, PackageId, Quote};
use crate::domain::result::{
    CostSplitAdjustment, PackageTotals, PricingResult, QuotePricing, QuoteTotals,
};
use crate::errors::PricingError;
use crate::ids::{IdGenerator, UuidIdGenerator};
use crate::pricing::context::PricingContext;
use crate::pricing::curve::{self, TierQuote};
use crate::pricing::environment::environment_factor;
use crate::pricing::phases;
use crate::pricing::term::term_factor;
use crate::pricing::weighted::{weighted_prices, WeightedPrice, WeightedPriceMap};
use crate::rounding::{percent_off, round_currency, round_rate};

/// Fixed charges quote their list price at a 12-month reference term.
const REFERENCE_TERM_MONTHS: u32 = 12;
const MONTHS_PER_YEAR: i64 = 12;

/// Standalone pricing request without package/quote context; always priced
/// independently, never aggregated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewItem {
    pub entry_id: EntryId,
    pub quantity: u64,
    pub term_months: u32,
    pub environment: Environment,
}

pub trait PricingEngine: Send + Sync {
    fn price_quote(
        &self,
        context: &PricingContext,
        quote: &Quote,
    ) -> Result<QuotePricing, PricingError>;

    fn price_preview(
        &self,
        context: &PricingContext,
        items: &[PreviewItem],
        cost_split_ratio: Decimal,
    ) -> Result<Vec<PricingResult>, PricingError>;
}

pub struct DeterministicPricingEngine<G = UuidIdGenerator> {
    ids: G,
}

impl<G: IdGenerator> DeterministicPricingEngine<G> {
    pub fn new(ids: G) -> Self {
        Self { ids }
    }
}

impl Default for DeterministicPricingEngine<UuidIdGenerator> {
    fn default() -> Self {
        Self::new(UuidIdGenerator)
    }
}

impl<G: IdGenerator> PricingEngine for DeterministicPricingEngine<G> {
    /// Prices every line item, then reduces into package subtotals and quote
    /// totals. Any fatal error aborts the whole quote; callers keep their
    /// previously persisted totals untouched.
    fn price_quote(
        &self,
        context: &PricingContext,
        quote: &Quote,
    ) -> Result<QuotePricing, PricingError> {
        let weighted = if quote.use_aggregated_pricing {
            let phase_map = phases::decompose(context, quote);
            weighted_prices(context, quote, &phase_map)?
        } else {
            WeightedPriceMap::new()
        };

        let mut lines = Vec::new();
        let mut package_totals = Vec::new();
        for package in &quote.packages {
            let mut monthly = Decimal::ZERO;
            let mut annual = Decimal::ZERO;
            for item in &package.items {
                let result = self.price_item(
                    context,
                    item,
                    Some(&package.id),
                    item.effective_term(package.term_months),
                    weighted.get(&(package.id.clone(), item.entry_id.clone())),
                    quote.cost_split_ratio,
                )?;
                monthly += result.monthly_total;
                annual += result.annual_total;
                lines.push(result);
            }
            package_totals.push(PackageTotals {
                package_id: package.id.clone(),
                monthly_total: round_currency(monthly),
                annual_total: round_currency(annual),
            });
        }

        let totals = QuoteTotals {
            monthly_total: round_currency(
                package_totals.iter().map(|totals| totals.monthly_total).sum(),
            ),
            annual_total: round_currency(
                package_totals.iter().map(|totals| totals.annual_total).sum(),
            ),
        };

        Ok(QuotePricing { quote_id: quote.id.clone(), lines, package_totals, totals })
    }

    fn price_preview(
        &self,
        context: &PricingContext,
        items: &[PreviewItem],
        cost_split_ratio: Decimal,
    ) -> Result<Vec<PricingResult>, PricingError> {
        items
            .iter()
            .map(|preview| {
                let item = LineItem {
                    entry_id: preview.entry_id.clone(),
                    quantity: preview.quantity,
                    term_override_months: None,
                    environment: preview.environment,
                };
                self.price_item(context, &item, None, preview.term_months, None, cost_split_ratio)
            })
            .collect()
    }
}

impl<G: IdGenerator> DeterministicPricingEngine<G> {
    fn price_item(
        &self,
        context: &PricingContext,
        item: &LineItem,
        package_id: Option<&PackageId>,
        term_months: u32,
        weighted: Option<&WeightedPrice>,
        cost_split_ratio: Decimal,
    ) -> Result<PricingResult, PricingError> {
        let entry = context
            .entry(&item.entry_id)
            .ok_or_else(|| PricingError::EntryNotFound(item.entry_id.clone()))?;

        if entry.is_fixed_recurring() {
            self.price_fixed(context, entry, item, package_id, term_months, cost_split_ratio)
        } else {
            self.price_usage(
                context,
                entry,
                item,
                package_id,
                term_months,
                weighted,
                cost_split_ratio,
            )
        }
    }

    fn price_fixed(
        &self,
        context: &PricingContext,
        entry: &CatalogEntry,
        item: &LineItem,
        package_id: Option<&PackageId>,
        term_months: u32,
        cost_split_ratio: Decimal,
    ) -> Result<PricingResult, PricingError> {
        let charge = context
            .fixed_charge(&entry.id)
            .ok_or_else(|| PricingError::PricingUndefined(entry.id.clone()))?;

        let schedule = context.term_schedule(entry.category);
        let factor = if charge.apply_term_discount {
            term_factor(schedule, entry.category, term_months)
        } else {
            Decimal::ONE
        };
        let reference_factor = if charge.apply_term_discount {
            term_factor(schedule, entry.category, REFERENCE_TERM_MONTHS)
        } else {
            Decimal::ONE
        };

        let mut fixed_total = round_currency(charge.base_mrc * factor);
        let list_price = round_currency(charge.base_mrc * reference_factor);

        let cost_split = cost_split_for(entry.category, cost_split_ratio);
        if let Some(split) = &cost_split {
            fixed_total = round_currency(fixed_total * split.base_factor);
        }

        let term_discount_pct = percent_off(list_price, fixed_total);
        let monthly_total = fixed_total;
        let annual_total = round_currency(monthly_total * Decimal::from(MONTHS_PER_YEAR));

        Ok(PricingResult {
            cost_line_id: self.ids.next_id(),
            entry_id: entry.id.clone(),
            package_id: package_id.cloned(),
            quantity: item.quantity,
            term_months,
            environment: item.environment,
            list_price,
            volume_discount_pct: Decimal::ZERO,
            term_discount_pct,
            environment_factor: Decimal::ONE,
            unit_price: fixed_total,
            combined_discount_pct: term_discount_pct,
            usage_total: Decimal::ZERO,
            fixed_charge_total: fixed_total,
            monthly_total,
            annual_total,
            aggregate_quantity: None,
            pricing_phases: Vec::new(),
            cost_split,
        })
    }

    fn price_usage(
        &self,
        context: &PricingContext,
        entry: &CatalogEntry,
        item: &LineItem,
        package_id: Option<&PackageId>,
        term_months: u32,
        weighted: Option<&WeightedPrice>,
        cost_split_ratio: Decimal,
    ) -> Result<PricingResult, PricingError> {
        let curve = context.curve(&entry.id);
        let ladder = context.ladder(&entry.id);

        // List price is informational; a failed lookup becomes zero and the
        // discount percentages degrade to zero with it.
        let list_price = curve::list_price(curve, ladder).unwrap_or(Decimal::ZERO);

        let (price_at_quantity, aggregate_quantity, pricing_phases) = match weighted {
            Some(weighted) => {
                (weighted.unit_price, Some(weighted.aggregate_quantity), weighted.phases.clone())
            }
            None => {
                (curve::unit_price(&entry.id, curve, ladder, item.quantity)?, None, Vec::new())
            }
        };

        let term = round_rate(term_factor(
            context.term_schedule(entry.category),
            entry.category,
            term_months,
        ));
        let env = environment_factor(context.environment_factors(), &entry.id, item.environment);

        let unit_price = round_rate(price_at_quantity * term * env);
        let volume_discount_pct = percent_off(list_price, price_at_quantity);
        let term_discount_pct = round_currency((Decimal::ONE - term) * Decimal::ONE_HUNDRED);
        let combined_discount_pct = percent_off(list_price, unit_price);

        let mut usage_total = round_currency(unit_price * Decimal::from(item.quantity));
        let mut fixed_total = match context.fixed_charge(&entry.id) {
            Some(charge) => {
                let factor = if charge.apply_term_discount { term } else { Decimal::ONE };
                round_currency(charge.base_mrc * factor)
            }
            None => Decimal::ZERO,
        };

        let cost_split = cost_split_for(entry.category, cost_split_ratio);
        if let Some(split) = &cost_split {
            fixed_total = round_currency(fixed_total * split.base_factor);
            usage_total = round_currency(usage_total * split.usage_factor);
        }

        let monthly_total = round_currency(usage_total + fixed_total);
        let annual_total = round_currency(monthly_total * Decimal::from(MONTHS_PER_YEAR));

        Ok(PricingResult {
            cost_line_id: self.ids.next_id(),
            entry_id: entry.id.clone(),
            package_id: package_id.cloned(),
            quantity: item.quantity,
            term_months,
            environment: item.environment,
            list_price,
            volume_discount_pct,
            term_discount_pct,
            environment_factor: env,
            unit_price,
            combined_discount_pct,
            usage_total,
            fixed_charge_total: fixed_total,
            monthly_total,
            annual_total,
            aggregate_quantity,
            pricing_phases,
            cost_split,
        })
    }
}

/// Rebalancing factors for the one category whose reference prices were
/// calibrated at a 60/40 fixed-to-usage split. At a ratio of 0.60 both
/// factors are exactly 1.
pub fn cost_split_adjustment(ratio: Decimal) -> CostSplitAdjustment {
    CostSplitAdjustment {
        ratio,
        base_factor: round_rate(ratio / Decimal::new(60, 2)),
        usage_factor: round_rate((Decimal::ONE - ratio) / Decimal::new(40, 2)),
    }
}

fn cost_split_for(category: Category, ratio: Decimal) -> Option<CostSplitAdjustment> {
    (category == Category::Cas).then(|| cost_split_adjustment(ratio))
}

/// Tier table for one entry, for display by the caller.
pub fn tier_preview(
    context: &PricingContext,
    entry_id: &EntryId,
) -> Result<Vec<TierQuote>, PricingError> {
    context.entry(entry_id).ok_or_else(|| PricingError::EntryNotFound(entry_id.clone()))?;
    curve::tier_preview(entry_id, context.curve(entry_id), context.ladder(entry_id))
}

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::EntryId;
use crate::errors::PricingError;
use crate::pricing::context::{CurveMode, DiscountCurve, LadderTier};
use crate::rounding::round_rate;

/// One row of a tier preview: the quantity band and the unit price it buys.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierQuote {
    pub min_quantity: u64,
    pub max_quantity: Option<u64>,
    pub unit_price: Decimal,
}

/// Unit price for `quantity` under the entry's curve, falling back to its
/// ladder when the curve is absent or disabled. Fatal lookup failures
/// propagate; callers that only need a display price use [`list_price`].
pub fn unit_price(
    entry_id: &EntryId,
    curve: Option<&DiscountCurve>,
    ladder: Option<&[LadderTier]>,
    quantity: u64,
) -> Result<Decimal, PricingError> {
    match curve {
        Some(curve) if curve.mode != CurveMode::Disabled => Ok(curve_price(curve, quantity)),
        _ => ladder_price(entry_id, ladder, quantity),
    }
}

/// Reference price at quantity 1 (or the lowest ladder tier), used only for
/// discount-percentage display. `None` is recovered as zero by the caller,
/// never escalated: a missing list price must not abort a calculation.
pub fn list_price(curve: Option<&DiscountCurve>, ladder: Option<&[LadderTier]>) -> Option<Decimal> {
    match curve {
        Some(curve) if curve.mode != CurveMode::Disabled => Some(curve_price(curve, 1)),
        _ => ladder?.first().map(|tier| round_rate(tier.unit_price)),
    }
}

fn curve_price(curve: &DiscountCurve, quantity: u64) -> Decimal {
    // Pricing never improves below the base tier.
    let effective = quantity.max(curve.base_quantity);
    match curve.mode {
        CurveMode::Stepped => decay_price(curve, bucket_floor(curve, effective)),
        _ => decay_price(curve, effective),
    }
}

/// Continuous decay sampled at `quantity`: the base price loses
/// `per_double_discount` of itself for every doubling past the base
/// quantity, and never drops below the floor.
fn decay_price(curve: &DiscountCurve, quantity: u64) -> Decimal {
    let base_quantity = curve.base_quantity.max(1) as f64;
    let doublings = ((quantity.max(1) as f64) / base_quantity).log2().max(0.0);
    let retained = 1.0 - curve.per_double_discount.to_f64().unwrap_or(0.0);
    let raw = curve.base_unit_price.to_f64().unwrap_or(0.0) * retained.powf(doublings);
    let price = Decimal::from_f64(raw).unwrap_or(curve.base_unit_price);
    round_rate(price.max(curve.floor_price))
}

/// Lower boundary of the bucket containing `quantity`. At or above the last
/// bound the last bucket applies, so its lower boundary is the cap itself.
fn bucket_floor(curve: &DiscountCurve, quantity: u64) -> u64 {
    bucket_bounds(curve)
        .into_iter()
        .rev()
        .find(|&bound| bound <= quantity)
        .unwrap_or(curve.base_quantity)
}

/// Ordered quantity boundaries for a stepped curve. Custom breakpoints win
/// when present (deduplicated, capped, base and cap always included);
/// otherwise `bucket_count` bounds are spaced geometrically between the base
/// quantity and the cap, with the endpoints forced exact.
pub fn bucket_bounds(curve: &DiscountCurve) -> Vec<u64> {
    let cap = curve.quantity_cap.max(curve.base_quantity);

    if !curve.breakpoints.is_empty() {
        let mut bounds: Vec<u64> =
            curve.breakpoints.iter().copied().filter(|&bound| bound <= cap).collect();
        bounds.push(curve.base_quantity);
        bounds.push(cap);
        bounds.sort_unstable();
        bounds.dedup();
        return bounds;
    }

    let count = curve.bucket_count.max(2) as usize;
    let base = curve.base_quantity.max(1) as f64;
    let ratio = (cap as f64 / base).powf(1.0 / (count as f64 - 1.0));
    let mut bounds: Vec<u64> =
        (0..count).map(|step| (base * ratio.powi(step as i32)).round() as u64).collect();
    bounds[0] = curve.base_quantity;
    bounds[count - 1] = cap;
    bounds.sort_unstable();
    bounds.dedup();
    bounds
}

fn ladder_price(
    entry_id: &EntryId,
    ladder: Option<&[LadderTier]>,
    quantity: u64,
) -> Result<Decimal, PricingError> {
    let tiers = match ladder {
        Some(tiers) if !tiers.is_empty() => tiers,
        _ => return Err(PricingError::PricingUndefined(entry_id.clone())),
    };

    for tier in tiers {
        if quantity < tier.min_quantity {
            continue;
        }
        match tier.max_quantity {
            Some(max) if quantity > max => continue,
            // A bounded last tier does NOT absorb overflow quantities; only an
            // unbounded final tier does. Exceeding a bounded ladder is an error.
            _ => return Ok(round_rate(tier.unit_price)),
        }
    }

    Err(PricingError::NoMatchingTier { entry_id: entry_id.clone(), quantity })
}

/// Full tier table implied by the entry's pricing setup, for display.
/// Ladders are returned verbatim; stepped curves yield one tier per bucket;
/// continuous curves are sampled at successive doublings of the base quantity.
pub fn tier_preview(
    entry_id: &EntryId,
    curve: Option<&DiscountCurve>,
    ladder: Option<&[LadderTier]>,
) -> Result<Vec<TierQuote>, PricingError> {
    match curve {
        Some(curve) if curve.mode == CurveMode::Stepped => {
            Ok(bounds_to_tiers(curve, bucket_bounds(curve)))
        }
        Some(curve) if curve.mode == CurveMode::Continuous => {
            Ok(bounds_to_tiers(curve, doubling_bounds(curve)))
        }
        _ => {
            let tiers = match ladder {
                Some(tiers) if !tiers.is_empty() => tiers,
                _ => return Err(PricingError::PricingUndefined(entry_id.clone())),
            };
            Ok(tiers
                .iter()
                .map(|tier| TierQuote {
                    min_quantity: tier.min_quantity,
                    max_quantity: tier.max_quantity,
                    unit_price: round_rate(tier.unit_price),
                })
                .collect())
        }
    }
}

fn doubling_bounds(curve: &DiscountCurve) -> Vec<u64> {
    let cap = curve.quantity_cap.max(curve.base_quantity);
    let mut bounds = Vec::new();
    let mut bound = curve.base_quantity.max(1);
    while bound < cap {
        bounds.push(bound);
        bound = bound.saturating_mul(2);
    }
    bounds.push(cap);
    bounds.dedup();
    bounds
}

fn bounds_to_tiers(curve: &DiscountCurve, bounds: Vec<u64>) -> Vec<TierQuote> {
    bounds
        .iter()
        .enumerate()
        .map(|(index, &lower)| TierQuote {
            min_quantity: lower,
            max_quantity: bounds.get(index + 1).map(|&next| next - 1),
            unit_price: decay_price(curve, lower),
        })
        .collect()
}

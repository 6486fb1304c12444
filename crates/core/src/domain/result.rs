use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::EntryId;
use crate::domain::quote::{Environment, PackageId, QuoteId};

/// One slice of the aggregated-pricing audit trail: how many months of the
/// item's term fell into the phase, and what the shared quantity priced at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTrace {
    pub phase: String,
    pub months: u32,
    pub unit_price: Decimal,
    pub aggregate_quantity: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSplitAdjustment {
    pub ratio: Decimal,
    pub base_factor: Decimal,
    pub usage_factor: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub cost_line_id: String,
    pub entry_id: EntryId,
    pub package_id: Option<PackageId>,
    pub quantity: u64,
    pub term_months: u32,
    pub environment: Environment,
    pub list_price: Decimal,
    pub volume_discount_pct: Decimal,
    pub term_discount_pct: Decimal,
    pub environment_factor: Decimal,
    pub unit_price: Decimal,
    pub combined_discount_pct: Decimal,
    pub usage_total: Decimal,
    pub fixed_charge_total: Decimal,
    pub monthly_total: Decimal,
    pub annual_total: Decimal,
    pub aggregate_quantity: Option<u64>,
    #[serde(default)]
    pub pricing_phases: Vec<PhaseTrace>,
    pub cost_split: Option<CostSplitAdjustment>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PackageTotals {
    pub package_id: PackageId,
    pub monthly_total: Decimal,
    pub annual_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub monthly_total: Decimal,
    pub annual_total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotePricing {
    pub quote_id: QuoteId,
    pub lines: Vec<PricingResult>,
    pub package_totals: Vec<PackageTotals>,
    pub totals: QuoteTotals,
}

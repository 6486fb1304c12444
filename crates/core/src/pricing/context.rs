use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogEntry, Category, EntryId};
use crate::domain::quote::Environment;
use crate::errors::ContextError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveMode {
    /// Smooth decay, price falls with every doubling of quantity.
    Continuous,
    /// Step function sampling the continuous decay at bucket boundaries.
    Stepped,
    /// Curve is configured but switched off; the ladder prices instead.
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    pub base_quantity: u64,
    pub base_unit_price: Decimal,
    /// Fraction of the price shed per doubling of quantity, e.g. 0.10.
    pub per_double_discount: Decimal,
    pub floor_price: Decimal,
    pub bucket_count: u32,
    pub mode: CurveMode,
    /// Optional hand-picked bucket boundaries for stepped mode.
    #[serde(default)]
    pub breakpoints: Vec<u64>,
    pub quantity_cap: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LadderTier {
    pub min_quantity: u64,
    /// `None` marks the unbounded final tier.
    pub max_quantity: Option<u64>,
    pub unit_price: Decimal,
}

/// Contract-length discount factors for one category, keyed by term months.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TermSchedule {
    pub factors: BTreeMap<u32, Decimal>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedCharge {
    pub base_mrc: Decimal,
    pub apply_term_discount: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentFactors {
    #[serde(default)]
    pub defaults: HashMap<Environment, Decimal>,
    /// Entry-specific overrides, consulted before the defaults.
    #[serde(default)]
    pub overrides: HashMap<EntryId, HashMap<Environment, Decimal>>,
}

/// Raw lookup tables as supplied by the data-access collaborator. Everything
/// is keyed the way the caller stores it; validation happens when this is
/// turned into a [`PricingContext`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextData {
    pub entries: Vec<CatalogEntry>,
    #[serde(default)]
    pub curves: HashMap<EntryId, DiscountCurve>,
    #[serde(default)]
    pub ladders: HashMap<EntryId, Vec<LadderTier>>,
    #[serde(default)]
    pub term_schedules: HashMap<Category, TermSchedule>,
    #[serde(default)]
    pub default_term_schedule: Option<TermSchedule>,
    #[serde(default)]
    pub fixed_charges: HashMap<EntryId, FixedCharge>,
    #[serde(default)]
    pub environment: EnvironmentFactors,
}

/// Validated, read-only lookup tables for one calculation run. Constructed
/// once before any pricing call; the engine never mutates it.
#[derive(Clone, Debug)]
pub struct PricingContext {
    entries: HashMap<EntryId, CatalogEntry>,
    curves: HashMap<EntryId, DiscountCurve>,
    ladders: HashMap<EntryId, Vec<LadderTier>>,
    term_schedules: HashMap<Category, TermSchedule>,
    default_term_schedule: Option<TermSchedule>,
    fixed_charges: HashMap<EntryId, FixedCharge>,
    environment: EnvironmentFactors,
}

impl PricingContext {
    pub fn new(data: ContextData) -> Result<Self, ContextError> {
        for (entry_id, curve) in &data.curves {
            validate_curve(entry_id, curve)?;
        }

        let mut ladders = data.ladders;
        for (entry_id, tiers) in &mut ladders {
            tiers.sort_by_key(|tier| tier.min_quantity);
            validate_ladder(entry_id, tiers)?;
        }

        for (category, schedule) in &data.term_schedules {
            if schedule.factors.is_empty() {
                return Err(ContextError::EmptyTermSchedule { schedule: category.to_string() });
            }
        }
        if let Some(schedule) = &data.default_term_schedule {
            if schedule.factors.is_empty() {
                return Err(ContextError::EmptyTermSchedule { schedule: "default".to_owned() });
            }
        }

        let entries =
            data.entries.into_iter().map(|entry| (entry.id.clone(), entry)).collect();

        Ok(Self {
            entries,
            curves: data.curves,
            ladders,
            term_schedules: data.term_schedules,
            default_term_schedule: data.default_term_schedule,
            fixed_charges: data.fixed_charges,
            environment: data.environment,
        })
    }

    pub fn entry(&self, id: &EntryId) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn curve(&self, id: &EntryId) -> Option<&DiscountCurve> {
        self.curves.get(id)
    }

    pub fn ladder(&self, id: &EntryId) -> Option<&[LadderTier]> {
        self.ladders.get(id).map(Vec::as_slice)
    }

    /// Category schedule with fallback to the default-category schedule.
    pub fn term_schedule(&self, category: Category) -> Option<&TermSchedule> {
        self.term_schedules.get(&category).or(self.default_term_schedule.as_ref())
    }

    pub fn fixed_charge(&self, id: &EntryId) -> Option<&FixedCharge> {
        self.fixed_charges.get(id)
    }

    pub fn environment_factors(&self) -> &EnvironmentFactors {
        &self.environment
    }
}

fn validate_curve(entry_id: &EntryId, curve: &DiscountCurve) -> Result<(), ContextError> {
    if curve.base_quantity > curve.quantity_cap {
        return Err(ContextError::CurveBaseAboveCap {
            entry_id: entry_id.clone(),
            base_quantity: curve.base_quantity,
            cap: curve.quantity_cap,
        });
    }
    if curve.floor_price > curve.base_unit_price {
        return Err(ContextError::FloorAboveBasePrice {
            entry_id: entry_id.clone(),
            floor: curve.floor_price,
            base_price: curve.base_unit_price,
        });
    }
    if curve.mode == CurveMode::Stepped && curve.bucket_count < 2 {
        return Err(ContextError::TooFewBuckets {
            entry_id: entry_id.clone(),
            bucket_count: curve.bucket_count,
        });
    }
    Ok(())
}

fn validate_ladder(entry_id: &EntryId, tiers: &[LadderTier]) -> Result<(), ContextError> {
    for pair in tiers.windows(2) {
        let upper = pair[0].max_quantity.ok_or_else(|| ContextError::UnboundedTierNotLast {
            entry_id: entry_id.clone(),
        })?;
        if pair[1].min_quantity != upper + 1 {
            return Err(ContextError::MalformedLadder { entry_id: entry_id.clone() });
        }
    }
    Ok(())
}

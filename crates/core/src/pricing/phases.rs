use std::collections::{BTreeSet, HashMap};

use crate::domain::catalog::EntryId;
use crate::domain::quote::{PackageId, Quote};
use crate::pricing::context::PricingContext;

/// A contiguous month interval during which a fixed set of commitments is
/// active, with the aggregate quantity of one catalog entry over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimePhase {
    pub start_month: u32,
    pub end_month: u32,
    pub quantity: u64,
    pub contributions: Vec<PhaseContribution>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseContribution {
    pub package_id: PackageId,
    pub quantity: u64,
    pub term_months: u32,
}

impl TimePhase {
    pub fn key(&self) -> String {
        format!("{}-{}", self.start_month, self.end_month)
    }

    pub fn months(&self) -> u32 {
        self.end_month - self.start_month + 1
    }
}

/// Partition the quote's timeline into phases and compute, per usage-metered
/// catalog entry, the aggregate quantity active in each phase.
///
/// Phase boundaries are month 1 plus `term + 1` for every line item's
/// effective term; consecutive boundaries delimit inclusive phases. An item
/// contributes to every phase that starts no later than its term ends, so
/// shorter commitments drop out of later phases. Fixed-recurring entries are
/// excluded: their pricing does not depend on shared quantity.
pub fn decompose(context: &PricingContext, quote: &Quote) -> HashMap<EntryId, Vec<TimePhase>> {
    let mut boundaries = BTreeSet::new();
    boundaries.insert(1u32);
    for package in &quote.packages {
        for item in &package.items {
            boundaries.insert(item.effective_term(package.term_months) + 1);
        }
    }
    let bounds: Vec<u32> = boundaries.into_iter().collect();

    let mut entry_ids = BTreeSet::new();
    for package in &quote.packages {
        for item in &package.items {
            // Entries missing from the context are skipped here so the
            // per-item pricing path reports them as not found.
            let Some(entry) = context.entry(&item.entry_id) else {
                continue;
            };
            if !entry.is_fixed_recurring() {
                entry_ids.insert(item.entry_id.clone());
            }
        }
    }

    let mut phases_by_entry = HashMap::new();
    for entry_id in entry_ids {
        let mut phases = Vec::new();
        for pair in bounds.windows(2) {
            let (start, end) = (pair[0], pair[1] - 1);
            let mut contributions = Vec::new();
            for package in &quote.packages {
                for item in &package.items {
                    if item.entry_id != entry_id {
                        continue;
                    }
                    let term = item.effective_term(package.term_months);
                    if term >= start {
                        contributions.push(PhaseContribution {
                            package_id: package.id.clone(),
                            quantity: item.quantity,
                            term_months: term,
                        });
                    }
                }
            }
            if contributions.is_empty() {
                continue;
            }
            let quantity = contributions.iter().map(|c| c.quantity).sum();
            phases.push(TimePhase { start_month: start, end_month: end, quantity, contributions });
        }
        phases_by_entry.insert(entry_id, phases);
    }

    phases_by_entry
}

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product category. `Cas` is special-cased twice: its long-term contract
/// factors are capped differently, and it is the one category whose charges
/// are rebalanced by the cost-split ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cas,
    Compute,
    Storage,
    Network,
    Platform,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Cas => "cas",
            Category::Compute => "compute",
            Category::Storage => "storage",
            Category::Network => "network",
            Category::Platform => "platform",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingKind {
    /// Flat monthly recurring charge, priced from the fixed-charge table.
    FixedRecurring,
    /// Quantity-driven pricing from a discount curve or tiered ladder.
    UsageMetered,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: EntryId,
    pub name: String,
    pub category: Category,
    pub unit: String,
    pub billing: BillingKind,
}

impl CatalogEntry {
    pub fn is_fixed_recurring(&self) -> bool {
        self.billing == BillingKind::FixedRecurring
    }
}

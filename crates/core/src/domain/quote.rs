use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::EntryId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId(pub String);

/// Deployment environment a line item is quoted for. Factors are resolved
/// per entry with a fallback to the environment-wide default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Production,
    Reference,
    Test,
    Development,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub entry_id: EntryId,
    pub quantity: u64,
    #[serde(default)]
    pub term_override_months: Option<u32>,
    pub environment: Environment,
}

impl LineItem {
    /// Item-level term override wins over the owning package's term.
    pub fn effective_term(&self, package_term_months: u32) -> u32 {
        self.term_override_months.unwrap_or(package_term_months)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub term_months: u32,
    pub items: Vec<LineItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub packages: Vec<Package>,
    #[serde(default)]
    pub use_aggregated_pricing: bool,
    /// Fraction of a cas charge attributed to the fixed component. Reference
    /// prices were calibrated at 0.60, so that value leaves prices untouched.
    #[serde(default = "default_cost_split_ratio")]
    pub cost_split_ratio: Decimal,
    pub created_at: DateTime<Utc>,
}

pub fn default_cost_split_ratio() -> Decimal {
    Decimal::new(60, 2)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Environment, LineItem};
    use crate::domain::catalog::EntryId;

    #[test]
    fn item_term_override_beats_package_term() {
        let item = LineItem {
            entry_id: EntryId("vm-standard".to_owned()),
            quantity: 10,
            term_override_months: Some(12),
            environment: Environment::Production,
        };
        assert_eq!(item.effective_term(36), 12);
    }

    #[test]
    fn package_term_applies_without_override() {
        let item = LineItem {
            entry_id: EntryId("vm-standard".to_owned()),
            quantity: 10,
            term_override_months: None,
            environment: Environment::Production,
        };
        assert_eq!(item.effective_term(36), 36);
    }

    #[test]
    fn quote_deserializes_with_default_cost_split() {
        let raw = r#"{
            "id": "Q-1",
            "packages": [],
            "created_at": "2026-01-01T00:00:00Z"
        }"#;
        let quote: super::Quote = serde_json::from_str(raw).expect("quote json");
        assert_eq!(quote.cost_split_ratio, Decimal::new(60, 2));
        assert!(!quote.use_aggregated_pricing);
    }
}

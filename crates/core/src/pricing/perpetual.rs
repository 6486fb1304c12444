use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Category;
use crate::rounding::round_currency;

/// Inputs for turning a recurring subscription price into a one-time
/// perpetual license with maintenance and upgrade protection. Independent of
/// the rest of the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerpetualConversion {
    pub monthly_price: Decimal,
    pub quantity: u64,
    pub category: Category,
    /// Fraction of the recurring price attributed to the license itself.
    pub reduction_factor: Decimal,
    /// Months of subscription revenue the one-time license compensates for.
    pub compensation_term_months: u32,
    pub maintenance_term_years: u32,
    pub upgrade_protection_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerpetualQuote {
    pub license_only_monthly: Decimal,
    pub perpetual_license: Decimal,
    pub annual_maintenance: Decimal,
    pub total_maintenance: Decimal,
    pub upgrade_protection: Decimal,
    pub total: Decimal,
}

const DEFAULT_MAINTENANCE_PCT: i64 = 20;

/// Annual maintenance as a percentage of the perpetual license price.
fn maintenance_pct(category: Category) -> Decimal {
    match category {
        Category::Cas => Decimal::new(25, 0),
        Category::Platform => Decimal::new(18, 0),
        _ => Decimal::new(DEFAULT_MAINTENANCE_PCT, 0),
    }
}

pub fn convert(input: &PerpetualConversion) -> PerpetualQuote {
    let license_only_monthly = round_currency(input.monthly_price * input.reduction_factor);
    let perpetual_license = round_currency(
        license_only_monthly
            * Decimal::from(input.quantity)
            * Decimal::from(input.compensation_term_months),
    );
    let annual_maintenance = round_currency(
        perpetual_license * maintenance_pct(input.category) / Decimal::ONE_HUNDRED,
    );
    let total_maintenance =
        round_currency(annual_maintenance * Decimal::from(input.maintenance_term_years));
    let upgrade_protection =
        round_currency(perpetual_license * input.upgrade_protection_pct / Decimal::ONE_HUNDRED);
    let total = round_currency(perpetual_license + total_maintenance + upgrade_protection);

    PerpetualQuote {
        license_only_monthly,
        perpetual_license,
        annual_maintenance,
        total_maintenance,
        upgrade_protection,
        total,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{convert, PerpetualConversion};
    use crate::domain::catalog::Category;

    #[test]
    fn converts_subscription_into_license_and_maintenance() {
        let quote = convert(&PerpetualConversion {
            monthly_price: Decimal::new(10000, 2),
            quantity: 10,
            category: Category::Compute,
            reduction_factor: Decimal::new(80, 2),
            compensation_term_months: 24,
            maintenance_term_years: 3,
            upgrade_protection_pct: Decimal::new(10, 0),
        });

        assert_eq!(quote.license_only_monthly, Decimal::new(8000, 2));
        assert_eq!(quote.perpetual_license, Decimal::new(1920000, 2));
        // 20% default maintenance: 3840.00 per year, 11520.00 over 3 years.
        assert_eq!(quote.annual_maintenance, Decimal::new(384000, 2));
        assert_eq!(quote.total_maintenance, Decimal::new(1152000, 2));
        assert_eq!(quote.upgrade_protection, Decimal::new(192000, 2));
        assert_eq!(quote.total, Decimal::new(3264000, 2));
    }

    #[test]
    fn cas_category_uses_its_own_maintenance_rate() {
        let quote = convert(&PerpetualConversion {
            monthly_price: Decimal::new(10000, 2),
            quantity: 1,
            category: Category::Cas,
            reduction_factor: Decimal::ONE,
            compensation_term_months: 12,
            maintenance_term_years: 1,
            upgrade_protection_pct: Decimal::ZERO,
        });

        // 25% of 1200.00
        assert_eq!(quote.annual_maintenance, Decimal::new(30000, 2));
        assert_eq!(quote.total, Decimal::new(150000, 2));
    }
}

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency amounts carry two decimal places, per-unit rates and factors four.
/// Rounding is applied at each derived value, not just at final output, so
/// accumulated totals match what an operator sees line by line.
pub const CURRENCY_DP: u32 = 2;
pub const RATE_DP: u32 = 4;

pub fn round_currency(value: Decimal) -> Decimal {
    round_to(value, CURRENCY_DP)
}

pub fn round_rate(value: Decimal) -> Decimal {
    round_to(value, RATE_DP)
}

/// Round and pin the scale, so amounts serialize with a stable number of
/// decimal places regardless of how they were computed.
fn round_to(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Discount percentage of `actual` against `list`, zero when the list price
/// is unknown. List prices are informational only, so a missing one must not
/// poison the percentage into an error.
pub fn percent_off(list: Decimal, actual: Decimal) -> Decimal {
    if list.is_zero() {
        return Decimal::ZERO;
    }
    round_currency((Decimal::ONE - actual / list) * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{percent_off, round_currency, round_rate};

    #[test]
    fn currency_rounds_midpoint_away_from_zero() {
        assert_eq!(round_currency(Decimal::new(10125, 3)), Decimal::new(1013, 2));
        assert_eq!(round_currency(Decimal::new(-10125, 3)), Decimal::new(-1013, 2));
    }

    #[test]
    fn rates_keep_four_decimals() {
        assert_eq!(round_rate(Decimal::new(133333, 5)), Decimal::new(13333, 4));
    }

    #[test]
    fn percent_off_is_zero_for_unknown_list_price() {
        assert_eq!(percent_off(Decimal::ZERO, Decimal::new(500, 2)), Decimal::ZERO);
    }

    #[test]
    fn percent_off_reports_two_decimals() {
        let pct = percent_off(Decimal::new(1000, 2), Decimal::new(810, 2));
        assert_eq!(pct, Decimal::new(1900, 2));
    }
}

use rust_decimal::Decimal;

use crate::domain::catalog::Category;
use crate::pricing::context::TermSchedule;
use crate::rounding::round_rate;

/// Beyond this commitment length, cas factors stop improving.
pub const CAS_LONG_TERM_MONTHS: u32 = 60;

/// Contract-length discount factor for `term_months`. Stored terms are
/// returned verbatim; in-between terms interpolate linearly; terms past the
/// schedule extrapolate on the slope of the two highest points, clamped per
/// category. No schedule at all means no discount.
pub fn term_factor(
    schedule: Option<&TermSchedule>,
    category: Category,
    term_months: u32,
) -> Decimal {
    let Some(schedule) = schedule else {
        return Decimal::ONE;
    };
    let factors = &schedule.factors;

    if let Some(factor) = factors.get(&term_months) {
        return *factor;
    }
    let Some((&lowest_term, &lowest_factor)) = factors.iter().next() else {
        return Decimal::ONE;
    };
    // Shorter commitments than the schedule knows about earn nothing extra.
    if term_months < lowest_term {
        return lowest_factor;
    }

    let below = factors.range(..term_months).next_back();
    let above = factors.range(term_months..).next();
    match (below, above) {
        (Some((&t1, &f1)), Some((&t2, &f2))) => {
            let span = Decimal::from(t2 - t1);
            let offset = Decimal::from(term_months - t1);
            round_rate(f1 + (f2 - f1) * offset / span)
        }
        _ => extrapolate(factors, category, term_months),
    }
}

fn extrapolate(
    factors: &std::collections::BTreeMap<u32, Decimal>,
    category: Category,
    term_months: u32,
) -> Decimal {
    let mut stored = factors.iter().rev();
    let Some((&top_term, &top_factor)) = stored.next() else {
        return Decimal::ONE;
    };
    let Some((&prev_term, &prev_factor)) = stored.next() else {
        // Single-point schedule: nothing to take a slope from.
        return round_rate(top_factor);
    };

    let slope = (top_factor - prev_factor) / Decimal::from(top_term - prev_term);
    let raw = top_factor + slope * Decimal::from(term_months - top_term);

    let clamped = match category {
        Category::Cas if term_months >= CAS_LONG_TERM_MONTHS => raw.min(Decimal::new(52, 2)),
        Category::Cas => raw.max(top_factor * Decimal::new(25, 2)),
        _ => raw.max(top_factor * Decimal::new(50, 2)),
    };
    round_rate(clamped)
}

use rust_decimal::Decimal;

use crate::domain::catalog::EntryId;
use crate::domain::quote::Environment;
use crate::pricing::context::EnvironmentFactors;
use crate::rounding::round_rate;

/// Environment multiplier for one entry: entry-specific override first, then
/// the environment-wide default, then 1.
pub fn environment_factor(
    factors: &EnvironmentFactors,
    entry_id: &EntryId,
    environment: Environment,
) -> Decimal {
    if let Some(per_entry) = factors.overrides.get(entry_id) {
        if let Some(factor) = per_entry.get(&environment) {
            return round_rate(*factor);
        }
    }
    factors.defaults.get(&environment).map(|factor| round_rate(*factor)).unwrap_or(Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;

    use super::environment_factor;
    use crate::domain::catalog::EntryId;
    use crate::domain::quote::Environment;
    use crate::pricing::context::EnvironmentFactors;

    fn factors() -> EnvironmentFactors {
        let mut defaults = HashMap::new();
        defaults.insert(Environment::Reference, Decimal::new(50, 2));
        defaults.insert(Environment::Test, Decimal::new(30, 2));

        let mut per_entry = HashMap::new();
        per_entry.insert(Environment::Reference, Decimal::new(75, 2));
        let mut overrides = HashMap::new();
        overrides.insert(EntryId("vm-standard".to_owned()), per_entry);

        EnvironmentFactors { defaults, overrides }
    }

    #[test]
    fn entry_override_wins_over_environment_default() {
        let factor = environment_factor(
            &factors(),
            &EntryId("vm-standard".to_owned()),
            Environment::Reference,
        );
        assert_eq!(factor, Decimal::new(75, 2));
    }

    #[test]
    fn falls_back_to_environment_default() {
        let factor =
            environment_factor(&factors(), &EntryId("other".to_owned()), Environment::Reference);
        assert_eq!(factor, Decimal::new(50, 2));
    }

    #[test]
    fn unknown_environment_is_neutral() {
        let factor =
            environment_factor(&factors(), &EntryId("other".to_owned()), Environment::Production);
        assert_eq!(factor, Decimal::ONE);
    }
}

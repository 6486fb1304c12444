pub mod config;
pub mod domain;
pub mod errors;
pub mod ids;
pub mod pricing;
pub mod rounding;

pub use domain::catalog::{BillingKind, CatalogEntry, Category, EntryId};
pub use domain::quote::{Environment, LineItem, Package, PackageId, Quote, QuoteId};
pub use domain::result::{
    CostSplitAdjustment, PackageTotals, PhaseTrace, PricingResult, QuotePricing, QuoteTotals,
};
pub use errors::{ContextError, PricingError};
pub use ids::{IdGenerator, SequenceIdGenerator, UuidIdGenerator};
pub use pricing::context::{
    ContextData, CurveMode, DiscountCurve, EnvironmentFactors, FixedCharge, LadderTier,
    PricingContext, TermSchedule,
};
pub use pricing::curve::TierQuote;
pub use pricing::engine::{tier_preview, DeterministicPricingEngine, PreviewItem, PricingEngine};
pub use pricing::perpetual::{convert as convert_perpetual, PerpetualConversion, PerpetualQuote};
pub use pricing::phases::{decompose, PhaseContribution, TimePhase};
pub use pricing::weighted::{weighted_prices, WeightedPrice, WeightedPriceMap};

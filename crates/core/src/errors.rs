use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::catalog::EntryId;

/// Invariant violations caught while assembling a pricing context. A context
/// that fails validation never reaches the engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("curve for entry {entry_id}: base quantity {base_quantity} exceeds quantity cap {cap}")]
    CurveBaseAboveCap { entry_id: EntryId, base_quantity: u64, cap: u64 },
    #[error("curve for entry {entry_id}: floor price {floor} exceeds base unit price {base_price}")]
    FloorAboveBasePrice { entry_id: EntryId, floor: Decimal, base_price: Decimal },
    #[error("curve for entry {entry_id}: stepped mode needs at least 2 buckets, got {bucket_count}")]
    TooFewBuckets { entry_id: EntryId, bucket_count: u32 },
    #[error("ladder for entry {entry_id}: tiers must be contiguous and non-overlapping")]
    MalformedLadder { entry_id: EntryId },
    #[error("ladder for entry {entry_id}: only the last tier may be unbounded")]
    UnboundedTierNotLast { entry_id: EntryId },
    #[error("term schedule `{schedule}` has no entries")]
    EmptyTermSchedule { schedule: String },
}

/// Fatal calculation failures. Any of these aborts the whole quote; no
/// partial results are returned. The list-price lookup path deliberately
/// returns `Option` instead, because a missing list price is informational
/// and recovered as zero (see `pricing::curve::list_price`).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("catalog entry not found: {0}")]
    EntryNotFound(EntryId),
    #[error("no curve or ladder prices entry {0}")]
    PricingUndefined(EntryId),
    #[error("quantity {quantity} matches no ladder tier for entry {entry_id}")]
    NoMatchingTier { entry_id: EntryId, quantity: u64 },
}

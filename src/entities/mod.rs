//! Entity definitions for the five record collections.
//!
//! Each entity lives in one CSV-backed collection and carries its own derived
//! business predicates (status derivation, funding progress, tier availability).
//! The persistence mapping to and from CSV rows is implemented beside each
//! struct as a [`StoreRecord`](crate::store::StoreRecord) impl.

/// Category entity - static reference data for grouping projects
pub mod category;
/// Pledge entity - immutable record of a user's commitment to a project
pub mod pledge;
/// Project entity - a crowdfunding campaign with goal, deadline, and totals
pub mod project;
/// Reward tier entity - a limited-quantity perk above a minimum pledge
pub mod reward_tier;
/// User entity - read-only account data for authentication and attribution
pub mod user;

pub use category::Category;
pub use pledge::{Pledge, PledgeStatus};
pub use project::{Project, ProjectStatus};
pub use reward_tier::RewardTier;
pub use user::User;

use crate::errors::{Error, Result};
use csv::StringRecord;

/// Returns field `idx` of `record`, or a malformed-record error naming the column.
pub(crate) fn field<'a>(
    record: &'a StringRecord,
    idx: usize,
    file: &'static str,
    column: &str,
) -> Result<&'a str> {
    record.get(idx).ok_or_else(|| Error::MalformedRecord {
        file,
        message: format!("missing field '{column}' at index {idx}"),
    })
}

/// Parses a numeric or date-like field, mapping the parse failure to a
/// malformed-record error naming the column and the offending text.
pub(crate) fn parse_field<T>(value: &str, file: &'static str, column: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| Error::MalformedRecord {
        file,
        message: format!("field '{column}' = {value:?}: {e}"),
    })
}

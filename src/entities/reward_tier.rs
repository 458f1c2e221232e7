//! Reward tier entity - A limited-quantity perk offered by a project.
//!
//! A tier fixes its `total_quantity` at creation; `remaining_quantity` is
//! decremented by exactly one per accepted pledge that selects the tier and
//! never drops below zero.

use crate::errors::{Error, Result};
use crate::store::StoreRecord;
use csv::StringRecord;

/// A reward tier attached to a project.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTier {
    /// Unique identifier for the tier
    pub tier_id: String,
    /// Project this tier belongs to
    pub project_id: String,
    /// Display name
    pub name: String,
    /// Minimum pledge amount required to claim this tier, strictly positive
    pub minimum_amount: f64,
    /// Total quantity offered, fixed at creation
    pub total_quantity: u32,
    /// Quantity still available, in `0..=total_quantity`
    pub remaining_quantity: u32,
    /// Description of the perk
    pub description: String,
}

impl RewardTier {
    /// Whether any quantity is left to claim.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.remaining_quantity > 0
    }

    /// Whether a pledge of `amount` can claim this tier right now.
    #[must_use]
    pub fn can_pledge(&self, amount: f64) -> bool {
        amount >= self.minimum_amount && self.is_available()
    }

    /// Consumes one unit of remaining quantity. Returns false (and leaves the
    /// tier untouched) when nothing is left.
    pub const fn reduce_quantity(&mut self) -> bool {
        if self.remaining_quantity > 0 {
            self.remaining_quantity -= 1;
            true
        } else {
            false
        }
    }

    /// Units already claimed by accepted pledges.
    #[must_use]
    pub const fn quantity_sold(&self) -> u32 {
        self.total_quantity - self.remaining_quantity
    }
}

impl StoreRecord for RewardTier {
    const FILE_NAME: &'static str = "reward_tiers.csv";
    const HEADERS: &'static [&'static str] = &[
        "tierId",
        "projectId",
        "name",
        "minimumAmount",
        "totalQuantity",
        "remainingQuantity",
        "description",
    ];

    fn key(&self) -> &str {
        &self.tier_id
    }

    fn from_record(record: &StringRecord) -> Result<Self> {
        let f = |idx, column| super::field(record, idx, Self::FILE_NAME, column);
        let total_quantity: u32 = super::parse_field(
            f(4, "totalQuantity")?,
            Self::FILE_NAME,
            "totalQuantity",
        )?;
        let remaining_quantity: u32 = super::parse_field(
            f(5, "remainingQuantity")?,
            Self::FILE_NAME,
            "remainingQuantity",
        )?;
        // remaining_quantity <= total_quantity is an invariant of the
        // collection; a row breaking it is corrupt, not just unusual
        if remaining_quantity > total_quantity {
            return Err(Error::MalformedRecord {
                file: Self::FILE_NAME,
                message: format!(
                    "remainingQuantity {remaining_quantity} exceeds totalQuantity {total_quantity}"
                ),
            });
        }
        Ok(Self {
            tier_id: f(0, "tierId")?.to_string(),
            project_id: f(1, "projectId")?.to_string(),
            name: f(2, "name")?.to_string(),
            minimum_amount: super::parse_field(
                f(3, "minimumAmount")?,
                Self::FILE_NAME,
                "minimumAmount",
            )?,
            total_quantity,
            remaining_quantity,
            description: f(6, "description")?.to_string(),
        })
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.tier_id.clone(),
            self.project_id.clone(),
            self.name.clone(),
            self.minimum_amount.to_string(),
            self.total_quantity.to_string(),
            self.remaining_quantity.to_string(),
            self.description.clone(),
        ]
    }
}

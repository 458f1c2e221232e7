//! Pledge entity - An immutable record of a user's commitment to a project.
//!
//! Pledges are append-only: the transaction engine writes each one exactly once
//! and nothing in this core ever updates or deletes it afterwards. Rejected
//! attempts are persisted too, with `status = REJECTED` and the rejection reason
//! filled in, so the statistics layer can count them.

use crate::errors::{Error, Result};
use crate::store::StoreRecord;
use chrono::{Local, NaiveDateTime, Timelike};
use csv::StringRecord;

/// Wire format for pledge timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time truncated to whole seconds, so an in-memory pledge is
/// identical to its persisted form (the wire format has second precision).
#[must_use]
pub fn timestamp_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Outcome recorded on a pledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PledgeStatus {
    /// The pledge passed validation and mutated project/tier state
    Success,
    /// The pledge failed validation; project/tier state was left untouched
    Rejected,
}

impl PledgeStatus {
    /// Wire string, exactly as stored in `pledges.csv`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for PledgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single pledge record.
#[derive(Debug, Clone, PartialEq)]
pub struct Pledge {
    /// `P` followed by a 6-digit zero-padded counter, e.g. `P000042`
    pub pledge_id: String,
    /// User who made the pledge
    pub user_id: String,
    /// Project being supported
    pub project_id: String,
    /// Timestamp at acceptance (or rejection)
    pub pledge_time: NaiveDateTime,
    /// Amount pledged
    pub amount: f64,
    /// Reward tier claimed, if any
    pub reward_tier_id: Option<String>,
    /// Whether the pledge was accepted
    pub status: PledgeStatus,
    /// Reason for rejection; set iff `status` is `Rejected`
    pub rejection_reason: Option<String>,
}

impl Pledge {
    /// Formats a pledge counter value as a pledge ID (`P` + 6-digit zero-padded).
    #[must_use]
    pub fn format_id(counter: u64) -> String {
        format!("P{counter:06}")
    }

    /// Extracts the numeric counter from a pledge ID, if well-formed.
    #[must_use]
    pub fn id_number(pledge_id: &str) -> Option<u64> {
        pledge_id.strip_prefix('P')?.parse().ok()
    }

    /// Whether this pledge was accepted.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status == PledgeStatus::Success
    }

    /// Whether this pledge was rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.status == PledgeStatus::Rejected
    }
}

impl StoreRecord for Pledge {
    const FILE_NAME: &'static str = "pledges.csv";
    const HEADERS: &'static [&'static str] = &[
        "pledgeId",
        "userId",
        "projectId",
        "pledgeTime",
        "amount",
        "rewardTierId",
        "status",
        "rejectionReason",
    ];

    fn key(&self) -> &str {
        &self.pledge_id
    }

    fn from_record(record: &StringRecord) -> Result<Self> {
        let f = |idx, column| super::field(record, idx, Self::FILE_NAME, column);
        let pledge_time =
            NaiveDateTime::parse_from_str(f(3, "pledgeTime")?, DATETIME_FORMAT).map_err(|e| {
                Error::MalformedRecord {
                    file: Self::FILE_NAME,
                    message: format!("field 'pledgeTime': {e}"),
                }
            })?;
        let status = match f(6, "status")? {
            "SUCCESS" => PledgeStatus::Success,
            "REJECTED" => PledgeStatus::Rejected,
            other => {
                return Err(Error::MalformedRecord {
                    file: Self::FILE_NAME,
                    message: format!("field 'status' = {other:?}: expected SUCCESS or REJECTED"),
                });
            }
        };
        let reward_tier_id = f(5, "rewardTierId")?;
        let rejection_reason = f(7, "rejectionReason")?;
        Ok(Self {
            pledge_id: f(0, "pledgeId")?.to_string(),
            user_id: f(1, "userId")?.to_string(),
            project_id: f(2, "projectId")?.to_string(),
            pledge_time,
            amount: super::parse_field(f(4, "amount")?, Self::FILE_NAME, "amount")?,
            reward_tier_id: (!reward_tier_id.is_empty()).then(|| reward_tier_id.to_string()),
            status,
            rejection_reason: (!rejection_reason.is_empty()).then(|| rejection_reason.to_string()),
        })
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.pledge_id.clone(),
            self.user_id.clone(),
            self.project_id.clone(),
            self.pledge_time.format(DATETIME_FORMAT).to_string(),
            self.amount.to_string(),
            self.reward_tier_id.clone().unwrap_or_default(),
            self.status.as_str().to_string(),
            self.rejection_reason.clone().unwrap_or_default(),
        ]
    }
}

//! Project entity - A crowdfunding campaign.
//!
//! A project carries a funding goal, a calendar deadline, and a running
//! `current_amount` that the pledge transaction engine keeps equal to the sum of
//! all successful pledge amounts against it. Status is never stored: it is
//! derived from the goal, the running total, and the deadline, and the same
//! derivation is used by the transaction engine's deadline gate and by the
//! statistics layer.

use crate::errors::Result;
use crate::store::StoreRecord;
use chrono::{Local, NaiveDate};
use csv::StringRecord;

/// Wire format for project deadlines.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Derived lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Deadline not yet passed, goal not yet reached
    Active,
    /// Funding goal reached, independent of the deadline
    Success,
    /// Deadline passed without reaching the goal
    Failed,
}

impl ProjectStatus {
    /// Display string matching the original wire vocabulary.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crowdfunding project.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Unique identifier; 8 digits, first digit non-zero
    pub project_id: String,
    /// Display name
    pub name: String,
    /// Target funding amount, strictly positive
    pub goal_amount: f64,
    /// Last calendar day on which pledges are accepted (inclusive)
    pub deadline: NaiveDate,
    /// Sum of all successful pledge amounts; starts at 0, written only by the
    /// transaction engine
    pub current_amount: f64,
    /// Category this project belongs to
    pub category_id: String,
    /// Longer description shown to backers
    pub description: String,
    /// User who created the project
    pub creator_id: String,
}

impl Project {
    /// Checks the project-ID format: exactly 8 ASCII digits, first digit non-zero.
    #[must_use]
    pub fn is_valid_project_id(project_id: &str) -> bool {
        project_id.len() == 8
            && project_id.bytes().all(|b| b.is_ascii_digit())
            && !project_id.starts_with('0')
    }

    /// Funding progress as a percentage of the goal, capped at 100.
    #[must_use]
    pub fn funding_progress(&self) -> f64 {
        if self.goal_amount <= 0.0 {
            return 0.0;
        }
        ((self.current_amount / self.goal_amount) * 100.0).min(100.0)
    }

    /// Whether the project still accepts pledges on `today` (deadline inclusive).
    #[must_use]
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        today <= self.deadline
    }

    /// Whether the project still accepts pledges right now.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active_on(Local::now().date_naive())
    }

    /// Whether the running total has met or exceeded the goal.
    #[must_use]
    pub fn is_funding_goal_reached(&self) -> bool {
        self.current_amount >= self.goal_amount
    }

    /// Derives the project status as of `today`.
    ///
    /// `Success` takes precedence over the deadline: a project that reached its
    /// goal reports `Success` even after the deadline passes.
    #[must_use]
    pub fn status_on(&self, today: NaiveDate) -> ProjectStatus {
        if self.is_funding_goal_reached() {
            ProjectStatus::Success
        } else if self.is_active_on(today) {
            ProjectStatus::Active
        } else {
            ProjectStatus::Failed
        }
    }

    /// Derives the project status as of the current local date.
    #[must_use]
    pub fn status(&self) -> ProjectStatus {
        self.status_on(Local::now().date_naive())
    }

    /// Human-readable status line distinguishing a funded-but-still-open project
    /// from one that closed successfully.
    #[must_use]
    pub fn status_description_on(&self, today: NaiveDate) -> &'static str {
        if self.is_funding_goal_reached() {
            if self.is_active_on(today) {
                "Goal Reached (Still Accepting Pledges)"
            } else {
                "Project Successful"
            }
        } else if self.is_active_on(today) {
            "Active Fundraising"
        } else {
            "Project Failed"
        }
    }

    /// Days left until the deadline as of `today`; 0 once the deadline has passed.
    #[must_use]
    pub fn days_remaining_on(&self, today: NaiveDate) -> i64 {
        if self.is_active_on(today) {
            (self.deadline - today).num_days()
        } else {
            0
        }
    }
}

impl StoreRecord for Project {
    const FILE_NAME: &'static str = "projects.csv";
    const HEADERS: &'static [&'static str] = &[
        "projectId",
        "name",
        "goalAmount",
        "deadline",
        "currentAmount",
        "categoryId",
        "description",
        "creatorId",
    ];

    fn key(&self) -> &str {
        &self.project_id
    }

    fn from_record(record: &StringRecord) -> Result<Self> {
        let f = |idx, column| super::field(record, idx, Self::FILE_NAME, column);
        let deadline = NaiveDate::parse_from_str(f(3, "deadline")?, DATE_FORMAT).map_err(|e| {
            crate::errors::Error::MalformedRecord {
                file: Self::FILE_NAME,
                message: format!("field 'deadline': {e}"),
            }
        })?;
        Ok(Self {
            project_id: f(0, "projectId")?.to_string(),
            name: f(1, "name")?.to_string(),
            goal_amount: super::parse_field(f(2, "goalAmount")?, Self::FILE_NAME, "goalAmount")?,
            deadline,
            current_amount: super::parse_field(
                f(4, "currentAmount")?,
                Self::FILE_NAME,
                "currentAmount",
            )?,
            category_id: f(5, "categoryId")?.to_string(),
            description: f(6, "description")?.to_string(),
            creator_id: f(7, "creatorId")?.to_string(),
        })
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.project_id.clone(),
            self.name.clone(),
            self.goal_amount.to_string(),
            self.deadline.format(DATE_FORMAT).to_string(),
            self.current_amount.to_string(),
            self.category_id.clone(),
            self.description.clone(),
            self.creator_id.clone(),
        ]
    }
}

//! Shared test utilities for `Pledgebook`.
//!
//! This module provides common helper functions for setting up temporary
//! on-disk stores and creating test entities with sensible defaults.

use crate::core::pledge::PledgeEngine;
use crate::entities::{Pledge, PledgeStatus, Project, RewardTier, User};
use crate::errors::Result;
use crate::store::Store;
use chrono::{Duration, Local};
use tempfile::TempDir;

/// Creates a store rooted in a fresh temporary directory.
/// The `TempDir` must be kept alive for the duration of the test.
pub fn setup_test_store() -> Result<(TempDir, Store)> {
    let dir = TempDir::new()?;
    let store = Store::open(dir.path())?;
    Ok((dir, store))
}

/// Creates an engine over a fresh store seeded with one active project.
///
/// # Defaults
/// * deadline: 30 days from today
/// * `current_amount`: 0
pub fn setup_engine_with_project(project_id: &str, goal: f64) -> Result<(TempDir, PledgeEngine)> {
    let (dir, store) = setup_test_store()?;
    store.projects().save_all(&[test_project(project_id, goal)])?;
    Ok((dir, PledgeEngine::new(store)))
}

/// Creates a test user.
///
/// # Defaults
/// * email: `<username>@example.com`
/// * password: `"secret"`
#[must_use]
pub fn test_user(user_id: &str, username: &str) -> User {
    User {
        user_id: user_id.to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "secret".to_string(),
    }
}

/// Creates a test project with a deadline 30 days out and nothing raised yet.
///
/// # Defaults
/// * `category_id`: `"C01"`
/// * `creator_id`: `"U900"`
#[must_use]
pub fn test_project(project_id: &str, goal: f64) -> Project {
    Project {
        project_id: project_id.to_string(),
        name: format!("Project {project_id}"),
        goal_amount: goal,
        deadline: Local::now().date_naive() + Duration::days(30),
        current_amount: 0.0,
        category_id: "C01".to_string(),
        description: "A test project".to_string(),
        creator_id: "U900".to_string(),
    }
}

/// Creates a test reward tier with full remaining quantity.
#[must_use]
pub fn test_tier(tier_id: &str, project_id: &str, minimum: f64, quantity: u32) -> RewardTier {
    RewardTier {
        tier_id: tier_id.to_string(),
        project_id: project_id.to_string(),
        name: format!("Tier {tier_id}"),
        minimum_amount: minimum,
        total_quantity: quantity,
        remaining_quantity: quantity,
        description: "A test reward tier".to_string(),
    }
}

/// Creates a successful test pledge with no reward tier.
#[must_use]
pub fn test_pledge(counter: u64, user_id: &str, project_id: &str, amount: f64) -> Pledge {
    Pledge {
        pledge_id: Pledge::format_id(counter),
        user_id: user_id.to_string(),
        project_id: project_id.to_string(),
        pledge_time: crate::entities::pledge::timestamp_now(),
        amount,
        reward_tier_id: None,
        status: PledgeStatus::Success,
        rejection_reason: None,
    }
}

/// Creates a rejected test pledge carrying the given rejection reason.
#[must_use]
pub fn rejected_pledge(
    counter: u64,
    user_id: &str,
    project_id: &str,
    amount: f64,
    reason: &str,
) -> Pledge {
    Pledge {
        status: PledgeStatus::Rejected,
        rejection_reason: Some(reason.to_string()),
        ..test_pledge(counter, user_id, project_id, amount)
    }
}

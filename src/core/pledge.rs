//! Pledge transaction engine - Validates and applies pledges.
//!
//! This is the one writer of shared state in the system. A pledge is validated
//! against freshly loaded project and reward-tier state and, on acceptance,
//! three collections change together: the pledge is appended, the project's
//! running total grows by the pledged amount, and the selected tier (if any)
//! loses one unit of remaining quantity. The three flat files have no native
//! transaction support, so the engine serializes the whole validate-then-write
//! sequence behind a mutex and reverses earlier writes when a later one fails.
//!
//! Validation failures are business outcomes, not errors: they come back as the
//! rejected arm of [`PledgeResult`], and (when a user identity exists to
//! attribute them to) are persisted as `REJECTED` pledge rows without touching
//! project or tier state.

use crate::entities::{Pledge, PledgeStatus, Project, RewardTier, User};
use crate::errors::Result;
use crate::store::{Repository, Store};
use chrono::Local;
use std::sync::{Mutex, PoisonError};
use tracing::{error, info};

/// Outcome of a pledge attempt.
#[derive(Debug, Clone)]
pub struct PledgeResult {
    /// Whether the pledge passed validation and was applied
    pub accepted: bool,
    /// Human-readable acceptance or rejection message
    pub message: String,
    /// The persisted pledge record; present on acceptance, and on rejection
    /// when the attempt could be attributed to a user
    pub pledge: Option<Pledge>,
}

impl PledgeResult {
    fn accepted(pledge: Pledge) -> Self {
        Self {
            accepted: true,
            message: "Pledge successful! Thank you for your support.".to_string(),
            pledge: Some(pledge),
        }
    }

    fn rejected(message: impl Into<String>, pledge: Option<Pledge>) -> Self {
        Self {
            accepted: false,
            message: message.into(),
            pledge,
        }
    }
}

/// Validates and applies pledges against the store.
///
/// The critical section is the engine's own mutex, so exactly one engine must
/// exist per data directory: a second engine (or a second process) over the
/// same files would bypass it. Callers share one engine, not one directory.
#[derive(Debug)]
pub struct PledgeEngine {
    store: Store,
    // Guards the whole load-validate-write sequence. Without it two concurrent
    // pledges can both read a tier with remaining_quantity = 1, both pass
    // validation, and both decrement.
    write_lock: Mutex<()>,
}

impl PledgeEngine {
    /// Creates an engine over an opened store.
    ///
    /// Create one engine per data directory and share it between callers; the
    /// pledge critical section only serializes calls going through this
    /// engine's lock.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// The store this engine reads and writes.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Processes a pledge of `amount` by `user` against `project_id`, optionally
    /// claiming `reward_tier_id`.
    ///
    /// Validation order (first failure wins): authenticated user, project
    /// exists, deadline not passed (inclusive), positive amount, then for a
    /// requested tier: exists for that project, meets the minimum amount, and
    /// has remaining quantity - with the minimum-amount check taking precedence
    /// over availability when both fail.
    ///
    /// Returns `Ok` with a rejected [`PledgeResult`] for business-rule failures;
    /// returns `Err` only for storage failures.
    pub fn process_pledge(
        &self,
        user: Option<&User>,
        project_id: &str,
        amount: f64,
        reward_tier_id: Option<&str>,
    ) -> Result<PledgeResult> {
        // A poisoned lock only means another caller panicked mid-call; all
        // guarded state is re-read from disk, so recover the guard.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(user) = user else {
            // No identity to attribute a rejected row to, so nothing is persisted.
            return Ok(PledgeResult::rejected("User not logged in", None));
        };

        let tier_request = reward_tier_id.filter(|id| !id.is_empty());

        let projects = self.store.projects();
        let tiers = self.store.reward_tiers();

        let Some(project) = projects.find_by_id(project_id)? else {
            return self.reject(user, project_id, amount, tier_request, "Project not found");
        };

        let today = Local::now().date_naive();
        if !project.is_active_on(today) {
            return self.reject(
                user,
                project_id,
                amount,
                tier_request,
                "Project deadline has passed",
            );
        }

        if amount <= 0.0 || !amount.is_finite() {
            return self.reject(
                user,
                project_id,
                amount,
                tier_request,
                "Pledge amount must be greater than 0",
            );
        }

        let mut selected_tier: Option<RewardTier> = None;
        if let Some(tier_id) = tier_request {
            let tier = tiers
                .find_by_id(tier_id)?
                .filter(|t| t.project_id == project_id);
            let Some(tier) = tier else {
                return self.reject(
                    user,
                    project_id,
                    amount,
                    tier_request,
                    "Selected reward tier not found",
                );
            };

            if !tier.can_pledge(amount) {
                // Minimum-amount failure takes precedence over availability.
                let message = if amount < tier.minimum_amount {
                    format!(
                        "Minimum amount for '{}' is ${:.2}",
                        tier.name, tier.minimum_amount
                    )
                } else {
                    format!("Reward tier '{}' is no longer available", tier.name)
                };
                return self.reject(user, project_id, amount, tier_request, message);
            }
            selected_tier = Some(tier);
        }

        self.accept(user, project, amount, selected_tier)
    }

    /// Applies an accepted pledge: append the pledge row, grow the project
    /// total, decrement the tier. Later-write failures undo earlier writes
    /// best-effort before surfacing the storage error.
    fn accept(
        &self,
        user: &User,
        project: Project,
        amount: f64,
        selected_tier: Option<RewardTier>,
    ) -> Result<PledgeResult> {
        let pledges = self.store.pledges();
        let projects = self.store.projects();
        let tiers = self.store.reward_tiers();

        let mut all_pledges = pledges.load_all()?;
        let pledge = Pledge {
            pledge_id: allocate_pledge_id(&all_pledges),
            user_id: user.user_id.clone(),
            project_id: project.project_id.clone(),
            pledge_time: crate::entities::pledge::timestamp_now(),
            amount,
            reward_tier_id: selected_tier.as_ref().map(|t| t.tier_id.clone()),
            status: PledgeStatus::Success,
            rejection_reason: None,
        };
        all_pledges.push(pledge.clone());
        pledges.save_all(&all_pledges)?;

        let mut updated_project = project.clone();
        updated_project.current_amount += amount;
        if let Err(err) = projects.update(&updated_project) {
            remove_pledge_row(&pledges, &pledge.pledge_id);
            return Err(err);
        }

        if let Some(tier) = selected_tier {
            let mut updated_tier = tier.clone();
            updated_tier.reduce_quantity();
            if let Err(err) = tiers.update(&updated_tier) {
                if let Err(undo_err) = projects.update(&project) {
                    error!(
                        project_id = %project.project_id, %undo_err,
                        "failed to restore project total while compensating"
                    );
                }
                remove_pledge_row(&pledges, &pledge.pledge_id);
                return Err(err);
            }
        }

        info!(
            pledge_id = %pledge.pledge_id,
            project_id = %pledge.project_id,
            amount,
            "pledge accepted"
        );
        Ok(PledgeResult::accepted(pledge))
    }

    /// Records a rejected attempt as a `REJECTED` pledge row and returns the
    /// rejection. Rejected rows never touch project or tier state.
    fn reject(
        &self,
        user: &User,
        project_id: &str,
        amount: f64,
        reward_tier_id: Option<&str>,
        message: impl Into<String>,
    ) -> Result<PledgeResult> {
        let message = message.into();
        let pledges = self.store.pledges();

        let mut all_pledges = pledges.load_all()?;
        let pledge = Pledge {
            pledge_id: allocate_pledge_id(&all_pledges),
            user_id: user.user_id.clone(),
            project_id: project_id.to_string(),
            pledge_time: crate::entities::pledge::timestamp_now(),
            amount,
            reward_tier_id: reward_tier_id.map(ToString::to_string),
            status: PledgeStatus::Rejected,
            rejection_reason: Some(message.clone()),
        };
        all_pledges.push(pledge.clone());
        pledges.save_all(&all_pledges)?;

        info!(pledge_id = %pledge.pledge_id, project_id, %message, "pledge rejected");
        Ok(PledgeResult::rejected(message, Some(pledge)))
    }
}

/// Next pledge ID, derived from the highest persisted ID so that counters
/// survive restarts and never collide even if rows were pruned.
fn allocate_pledge_id(pledges: &[Pledge]) -> String {
    let max = pledges
        .iter()
        .filter_map(|p| Pledge::id_number(&p.pledge_id))
        .max()
        .unwrap_or(0);
    Pledge::format_id(max + 1)
}

/// Best-effort removal of a pledge row during compensation; failures are
/// logged, not propagated, because the original storage error is what the
/// caller needs to see.
fn remove_pledge_row(pledges: &Repository<Pledge>, pledge_id: &str) {
    let result = pledges
        .load_all()
        .and_then(|mut all| {
            all.retain(|p| p.pledge_id != pledge_id);
            pledges.save_all(&all)
        });
    if let Err(err) = result {
        error!(pledge_id, %err, "failed to remove pledge row while compensating");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    #[test]
    fn test_rejects_when_not_logged_in() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;

        let result = engine.process_pledge(None, "10000001", 50.0, None)?;
        assert!(!result.accepted);
        assert_eq!(result.message, "User not logged in");
        // Nothing to attribute the attempt to, so nothing is persisted
        assert!(engine.store().pledges().load_all()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_project() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");

        let result = engine.process_pledge(Some(&user), "99999999", 50.0, None)?;
        assert!(!result.accepted);
        assert_eq!(result.message, "Project not found");
        Ok(())
    }

    #[test]
    fn test_rejects_after_deadline() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");

        let mut expired = test_project("20000001", 500.0);
        expired.deadline = Local::now().date_naive() - Duration::days(1);
        engine.store().projects().append(&expired)?;

        let result = engine.process_pledge(Some(&user), "20000001", 50.0, None)?;
        assert!(!result.accepted);
        assert_eq!(result.message, "Project deadline has passed");
        Ok(())
    }

    #[test]
    fn test_accepts_on_deadline_day() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");

        let mut closing_today = test_project("20000001", 500.0);
        closing_today.deadline = Local::now().date_naive();
        engine.store().projects().append(&closing_today)?;

        let result = engine.process_pledge(Some(&user), "20000001", 50.0, None)?;
        assert!(result.accepted);
        Ok(())
    }

    #[test]
    fn test_rejects_non_positive_amount() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");

        for amount in [0.0, -25.0, f64::NAN] {
            let result = engine.process_pledge(Some(&user), "10000001", amount, None)?;
            assert!(!result.accepted);
            assert_eq!(result.message, "Pledge amount must be greater than 0");
        }
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_tier() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");

        let result = engine.process_pledge(Some(&user), "10000001", 100.0, Some("T999"))?;
        assert!(!result.accepted);
        assert_eq!(result.message, "Selected reward tier not found");
        Ok(())
    }

    #[test]
    fn test_rejects_tier_belonging_to_other_project() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");

        engine.store().projects().append(&test_project("20000001", 500.0))?;
        engine
            .store()
            .reward_tiers()
            .save_all(&[test_tier("T001", "20000001", 50.0, 10)])?;

        // T001 exists, but not for the pledged project
        let result = engine.process_pledge(Some(&user), "10000001", 100.0, Some("T001"))?;
        assert!(!result.accepted);
        assert_eq!(result.message, "Selected reward tier not found");
        Ok(())
    }

    #[test]
    fn test_rejects_below_tier_minimum_naming_the_minimum() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");
        engine
            .store()
            .reward_tiers()
            .save_all(&[test_tier("T001", "10000001", 100.0, 10)])?;

        let result = engine.process_pledge(Some(&user), "10000001", 50.0, Some("T001"))?;
        assert!(!result.accepted);
        assert_eq!(result.message, "Minimum amount for 'Tier T001' is $100.00");
        Ok(())
    }

    #[test]
    fn test_minimum_check_takes_precedence_over_availability() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");
        let mut sold_out = test_tier("T001", "10000001", 100.0, 10);
        sold_out.remaining_quantity = 0;
        engine.store().reward_tiers().save_all(&[sold_out])?;

        // Both rules fail; the minimum-amount message wins
        let result = engine.process_pledge(Some(&user), "10000001", 50.0, Some("T001"))?;
        assert!(!result.accepted);
        assert_eq!(result.message, "Minimum amount for 'Tier T001' is $100.00");
        Ok(())
    }

    #[test]
    fn test_rejects_sold_out_tier_with_qualifying_amount() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");
        let mut sold_out = test_tier("T001", "10000001", 100.0, 10);
        sold_out.remaining_quantity = 0;
        engine.store().reward_tiers().save_all(&[sold_out])?;

        let result = engine.process_pledge(Some(&user), "10000001", 150.0, Some("T001"))?;
        assert!(!result.accepted);
        assert_eq!(result.message, "Reward tier 'Tier T001' is no longer available");
        Ok(())
    }

    #[test]
    fn test_accepted_pledge_updates_all_three_collections() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");
        engine
            .store()
            .reward_tiers()
            .save_all(&[test_tier("T001", "10000001", 100.0, 10)])?;

        let result = engine.process_pledge(Some(&user), "10000001", 150.0, Some("T001"))?;
        assert!(result.accepted);
        assert_eq!(result.message, "Pledge successful! Thank you for your support.");

        let pledge = result.pledge.unwrap();
        assert_eq!(pledge.pledge_id, "P000001");
        assert_eq!(pledge.status, PledgeStatus::Success);
        assert_eq!(pledge.reward_tier_id.as_deref(), Some("T001"));

        let project = engine.store().projects().find_by_id("10000001")?.unwrap();
        assert_eq!(project.current_amount, 150.0);

        let tier = engine.store().reward_tiers().find_by_id("T001")?.unwrap();
        assert_eq!(tier.remaining_quantity, 9);

        let persisted = engine.store().pledges().load_all()?;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0], pledge);
        Ok(())
    }

    #[test]
    fn test_funding_additivity_over_pledge_sequence() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 10_000.0)?;
        let user = test_user("U001", "alice");

        let amounts = [100.0, 250.0, 50.0, 325.5];
        for amount in amounts {
            assert!(engine.process_pledge(Some(&user), "10000001", amount, None)?.accepted);
        }

        let project = engine.store().projects().find_by_id("10000001")?.unwrap();
        assert_eq!(project.current_amount, amounts.iter().sum::<f64>());
        Ok(())
    }

    #[test]
    fn test_tier_decrement_bound_over_pledge_sequence() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 10_000.0)?;
        let user = test_user("U001", "alice");
        engine
            .store()
            .reward_tiers()
            .save_all(&[test_tier("T001", "10000001", 10.0, 3)])?;

        let mut accepted = 0;
        for _ in 0..5 {
            if engine.process_pledge(Some(&user), "10000001", 25.0, Some("T001"))?.accepted {
                accepted += 1;
            }
        }

        // Exactly total_quantity pledges get through; remaining never goes negative
        assert_eq!(accepted, 3);
        let tier = engine.store().reward_tiers().find_by_id("T001")?.unwrap();
        assert_eq!(tier.remaining_quantity, 0);
        assert_eq!(tier.quantity_sold(), accepted);

        // The two overflow attempts were persisted as rejections
        assert_eq!(engine.store().pledges().find_rejected()?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_pledge_ids_are_monotonic_and_survive_restart() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");

        // Simulate pre-existing history from an earlier run
        engine
            .store()
            .pledges()
            .save_all(&[test_pledge(7, "U001", "10000001", 10.0)])?;

        let first = engine.process_pledge(Some(&user), "10000001", 20.0, None)?;
        let second = engine.process_pledge(Some(&user), "10000001", 30.0, None)?;
        assert_eq!(first.pledge.unwrap().pledge_id, "P000008");
        assert_eq!(second.pledge.unwrap().pledge_id, "P000009");
        Ok(())
    }

    #[test]
    fn test_rejection_is_persisted_without_touching_state() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");
        engine
            .store()
            .reward_tiers()
            .save_all(&[test_tier("T001", "10000001", 100.0, 5)])?;

        let result = engine.process_pledge(Some(&user), "10000001", 0.0, Some("T001"))?;
        assert!(!result.accepted);

        let persisted = engine.store().pledges().load_all()?;
        assert_eq!(persisted.len(), 1);
        assert!(persisted[0].is_rejected());
        assert_eq!(
            persisted[0].rejection_reason.as_deref(),
            Some("Pledge amount must be greater than 0")
        );

        // Project total and tier quantity are untouched
        let project = engine.store().projects().find_by_id("10000001")?.unwrap();
        assert_eq!(project.current_amount, 0.0);
        let tier = engine.store().reward_tiers().find_by_id("T001")?.unwrap();
        assert_eq!(tier.remaining_quantity, 5);
        Ok(())
    }

    #[test]
    fn test_failed_project_write_removes_pledge_row() -> Result<()> {
        let (_dir, store) = setup_test_store()?;
        let engine = PledgeEngine::new(store);
        let user = test_user("U001", "alice");

        // The project row is gone by the time the write phase runs, so the
        // project update fails after the pledge row has been appended
        let vanished = test_project("10000001", 1000.0);
        let result = engine.accept(&user, vanished, 50.0, None);
        assert!(matches!(
            result,
            Err(crate::errors::Error::RecordNotFound { file: "projects.csv", .. })
        ));

        // Compensation removed the pledge row; no orphan remains
        assert!(engine.store().pledges().load_all()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_failed_tier_write_restores_project_and_removes_pledge_row() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");
        let project = engine.store().projects().find_by_id("10000001")?.unwrap();

        // The tier row is gone by the time the write phase runs: the pledge is
        // appended and the project total grows before the tier update fails
        let vanished_tier = test_tier("T999", "10000001", 10.0, 5);
        let result = engine.accept(&user, project, 50.0, Some(vanished_tier));
        assert!(matches!(
            result,
            Err(crate::errors::Error::RecordNotFound { file: "reward_tiers.csv", .. })
        ));

        // Compensation restored the project total and removed the pledge row
        let project = engine.store().projects().find_by_id("10000001")?.unwrap();
        assert_eq!(project.current_amount, 0.0);
        assert!(engine.store().pledges().load_all()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_pledge_without_tier_leaves_tiers_alone() -> Result<()> {
        let (_dir, engine) = setup_engine_with_project("10000001", 1000.0)?;
        let user = test_user("U001", "alice");
        engine
            .store()
            .reward_tiers()
            .save_all(&[test_tier("T001", "10000001", 100.0, 5)])?;

        // Empty tier id means "no tier", matching the external interface
        let result = engine.process_pledge(Some(&user), "10000001", 40.0, Some(""))?;
        assert!(result.accepted);
        assert!(result.pledge.unwrap().reward_tier_id.is_none());

        let tier = engine.store().reward_tiers().find_by_id("T001")?.unwrap();
        assert_eq!(tier.remaining_quantity, 5);
        Ok(())
    }
}

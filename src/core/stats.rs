//! Aggregation and statistics over loaded collections.
//!
//! Pure functions: everything here takes already-loaded slices, mutates
//! nothing, and persists nothing. The business predicates are the same ones the
//! transaction engine uses (entity methods), so a pledge counted as successful
//! here is exactly one the engine accepted.

use crate::entities::{Pledge, Project, User};
use chrono::{Local, NaiveDate};
use std::collections::HashSet;

/// Counts the distinct values `f` extracts from the successful pledges in scope.
fn distinct_among_successful<'a>(
    pledges: &'a [Pledge],
    f: impl Fn(&'a Pledge) -> &'a str,
) -> usize {
    pledges
        .iter()
        .filter(|p| p.is_successful())
        .map(f)
        .collect::<HashSet<_>>()
        .len()
}

fn total_raised(pledges: &[Pledge]) -> f64 {
    pledges
        .iter()
        .filter(|p| p.is_successful())
        .map(|p| p.amount)
        .sum()
}

/// Summary statistics over a set of pledges.
#[derive(Debug, Clone, PartialEq)]
pub struct PledgeStatistics {
    /// All pledges in scope, successful and rejected
    pub total_pledges: usize,
    /// Pledges with `SUCCESS` status
    pub successful_pledges: usize,
    /// Pledges with `REJECTED` status
    pub rejected_pledges: usize,
    /// Sum of amounts over successful pledges
    pub total_amount_raised: f64,
    /// `total_amount_raised / successful_pledges`, 0 when there are none
    pub average_pledge_amount: f64,
    /// Distinct users among successful pledges
    pub unique_backers: usize,
}

impl PledgeStatistics {
    /// Computes pledge statistics over the given pledges.
    #[must_use]
    pub fn from_pledges(pledges: &[Pledge]) -> Self {
        let successful_pledges = pledges.iter().filter(|p| p.is_successful()).count();
        let total_amount_raised = total_raised(pledges);
        #[allow(clippy::cast_precision_loss)]
        let average_pledge_amount = if successful_pledges > 0 {
            total_amount_raised / successful_pledges as f64
        } else {
            0.0
        };

        Self {
            total_pledges: pledges.len(),
            successful_pledges,
            rejected_pledges: pledges.iter().filter(|p| p.is_rejected()).count(),
            total_amount_raised,
            average_pledge_amount,
            unique_backers: distinct_among_successful(pledges, |p| &p.user_id),
        }
    }
}

/// System-wide statistics across pledges, projects, and users.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemStatistics {
    /// Pledge-level summary across the whole system
    pub pledges: PledgeStatistics,
    /// Total number of projects
    pub total_projects: usize,
    /// Total number of registered users
    pub total_users: usize,
    /// Projects whose deadline has not yet passed
    pub active_projects: usize,
    /// Projects whose deadline has passed
    pub completed_projects: usize,
    /// Projects that reached their funding goal, independent of deadline
    pub successful_projects: usize,
    /// Projects past their deadline without reaching the goal
    pub failed_projects: usize,
}

impl SystemStatistics {
    /// Computes system statistics with project status derived as of `today`.
    #[must_use]
    pub fn new_on(
        pledges: &[Pledge],
        projects: &[Project],
        users: &[User],
        today: NaiveDate,
    ) -> Self {
        let active_projects = projects.iter().filter(|p| p.is_active_on(today)).count();
        Self {
            pledges: PledgeStatistics::from_pledges(pledges),
            total_projects: projects.len(),
            total_users: users.len(),
            active_projects,
            completed_projects: projects.len() - active_projects,
            successful_projects: projects
                .iter()
                .filter(|p| p.is_funding_goal_reached())
                .count(),
            failed_projects: projects
                .iter()
                .filter(|p| !p.is_active_on(today) && !p.is_funding_goal_reached())
                .count(),
        }
    }

    /// Computes system statistics as of the current local date.
    #[must_use]
    pub fn new(pledges: &[Pledge], projects: &[Project], users: &[User]) -> Self {
        Self::new_on(pledges, projects, users, Local::now().date_naive())
    }

    /// Share of all pledges that were accepted, as a percentage; 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.pledges.total_pledges > 0 {
            self.pledges.successful_pledges as f64 / self.pledges.total_pledges as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Share of all projects that reached their goal, as a percentage; 0 when
    /// there are no projects.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn project_success_rate(&self) -> f64 {
        if self.total_projects > 0 {
            self.successful_projects as f64 / self.total_projects as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Pledge performance of a single project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPerformance {
    /// The project being measured
    pub project: Project,
    /// All pledges against this project
    pub total_pledges: usize,
    /// Accepted pledges against this project
    pub successful_pledges: usize,
    /// Rejected pledges against this project
    pub rejected_pledges: usize,
    /// Sum of accepted pledge amounts against this project
    pub total_raised: f64,
    /// Distinct users among accepted pledges
    pub unique_backers: usize,
}

impl ProjectPerformance {
    /// Measures `project` against the full pledge collection; pledges for other
    /// projects are ignored.
    #[must_use]
    pub fn new(project: Project, all_pledges: &[Pledge]) -> Self {
        let pledges: Vec<&Pledge> = all_pledges
            .iter()
            .filter(|p| p.project_id == project.project_id)
            .collect();
        let total_raised: f64 = pledges
            .iter()
            .filter(|p| p.is_successful())
            .map(|p| p.amount)
            .sum();
        let unique_backers = pledges
            .iter()
            .filter(|p| p.is_successful())
            .map(|p| p.user_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_pledges: pledges.len(),
            successful_pledges: pledges.iter().filter(|p| p.is_successful()).count(),
            rejected_pledges: pledges.iter().filter(|p| p.is_rejected()).count(),
            total_raised,
            unique_backers,
            project,
        }
    }

    /// Raised amount as a percentage of the goal; 0 when the goal is not
    /// positive. Unlike [`Project::funding_progress`] this is not capped, so
    /// overfunded projects rank above exactly-funded ones.
    #[must_use]
    pub fn funding_percentage(&self) -> f64 {
        if self.project.goal_amount > 0.0 {
            self.total_raised / self.project.goal_amount * 100.0
        } else {
            0.0
        }
    }
}

/// Ranks every project by funding percentage, highest first.
#[must_use]
pub fn rank_projects(projects: &[Project], pledges: &[Pledge]) -> Vec<ProjectPerformance> {
    let mut performance: Vec<ProjectPerformance> = projects
        .iter()
        .map(|p| ProjectPerformance::new(p.clone(), pledges))
        .collect();
    performance.sort_by(|a, b| b.funding_percentage().total_cmp(&a.funding_percentage()));
    performance
}

/// Pledge activity of a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    /// The user being measured
    pub user: User,
    /// All pledges made by this user
    pub total_pledges: usize,
    /// Accepted pledges made by this user
    pub successful_pledges: usize,
    /// Rejected pledges made by this user
    pub rejected_pledges: usize,
    /// Sum of accepted pledge amounts
    pub total_pledged: f64,
    /// Distinct projects among accepted pledges
    pub projects_supported: usize,
}

impl UserActivity {
    /// Measures `user` against the full pledge collection; other users'
    /// pledges are ignored.
    #[must_use]
    pub fn new(user: User, all_pledges: &[Pledge]) -> Self {
        let pledges: Vec<&Pledge> = all_pledges
            .iter()
            .filter(|p| p.user_id == user.user_id)
            .collect();
        let total_pledged: f64 = pledges
            .iter()
            .filter(|p| p.is_successful())
            .map(|p| p.amount)
            .sum();
        let projects_supported = pledges
            .iter()
            .filter(|p| p.is_successful())
            .map(|p| p.project_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_pledges: pledges.len(),
            successful_pledges: pledges.iter().filter(|p| p.is_successful()).count(),
            rejected_pledges: pledges.iter().filter(|p| p.is_rejected()).count(),
            total_pledged,
            projects_supported,
            user,
        }
    }
}

/// Ranks every user by total successfully pledged amount, highest first.
#[must_use]
pub fn rank_users(users: &[User], pledges: &[Pledge]) -> Vec<UserActivity> {
    let mut activity: Vec<UserActivity> = users
        .iter()
        .map(|u| UserActivity::new(u.clone(), pledges))
        .collect();
    activity.sort_by(|a, b| b.total_pledged.total_cmp(&a.total_pledged));
    activity
}

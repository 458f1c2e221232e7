//! Core business logic - framework-agnostic pledge processing and statistics.

/// Pledge transaction engine - validates and applies pledges across collections
pub mod pledge;
/// Aggregation and statistics over loaded collections
pub mod stats;

pub use pledge::{PledgeEngine, PledgeResult};
pub use stats::{
    PledgeStatistics, ProjectPerformance, SystemStatistics, UserActivity, rank_projects,
    rank_users,
};

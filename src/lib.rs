//! `Pledgebook` - A flat-file crowdfunding record-keeper
//!
//! This crate provides the pledge-acceptance core of a small crowdfunding system:
//! users pledge money toward projects, optionally claiming a limited-quantity reward
//! tier, and the pledge must satisfy funding-goal, deadline, and tier-availability
//! rules before it mutates shared totals. Projects, reward tiers, and pledges live
//! in independent CSV files with no native transaction support, so the transaction
//! engine is the one place that keeps the three collections consistent.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::exit,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::enum_glob_use,
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Configuration management for storage paths and application settings
pub mod config;
/// Core business logic - the pledge transaction engine and statistics
pub mod core;
/// Entity definitions for the five record collections
pub mod entities;
/// Unified error types and result handling
pub mod errors;
/// CSV record store and typed collection repositories
pub mod store;

#[cfg(test)]
pub mod test_utils;

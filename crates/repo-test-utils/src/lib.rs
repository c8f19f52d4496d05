//! Shared test utilities for the repo-sync workspace.
//!
//! Fixtures shared by the crate test suites. Dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`git`]: real git repositories (bare upstream, helpers)
//! - [`dest`]: [`dest::Destination`] scratch checkout location
//! - [`doubles`]: scripted filesystem and process collaborators

pub mod dest;
pub mod doubles;
pub mod git;

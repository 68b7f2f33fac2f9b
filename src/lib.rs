//! Read-only GitLab reporting: merge requests, branches and commits of one project.
//!
//! The [`gitlab`] module is the API core. Everything else (configuration,
//! command line, console output) feeds it plain strings and prints its results.

pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod gitlab;
pub mod report;
pub mod utils;

pub use errors::{ApiError, TransportCause};
pub use gitlab::{fetch_branches, fetch_commits, fetch_merge_requests, GitLabApi, GitLabClient};

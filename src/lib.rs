//! AppVeyor test analyzer library.
//!
//! Walks a project's AppVeyor build history over a time window, pulls the
//! test results of every eligible build and aggregates them into per-test
//! pass/fail statistics with links to the failing builds.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod services;

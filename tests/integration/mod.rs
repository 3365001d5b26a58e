//! Integration test suite for taxform
//!
//! End-to-end tests that run the `taxform` binary against template, form-data
//! and configuration files in a temporary directory.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **parse**: `taxform parse` output, exit codes and the `--check` pre-check
//! - **validate**: template-only and full validation, business rules, JSON output
//! - **export**: document output, round-trip verification, `--require-valid`
//! - **config**: configuration file lookup and error reporting
//! - **catalogue**: form menu listing and dropdown pairings

mod common;

mod catalogue;
mod config;
mod export;
mod parse;
mod validate;

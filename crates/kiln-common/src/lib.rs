//! # kiln-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire Kiln workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the reserved document keys and build-context
//! settings that the template compiler and the CLI agree on.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

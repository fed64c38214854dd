//! Shared test utilities for the xpi-update workspace.
//!
//! This crate provides fixtures for building extension packages and scratch
//! directories. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`xpi`]: [`XpiBuilder`] for in-memory extension packages
//! - [`workspace`]: [`TestWorkspace`] temporary directory helpers

pub mod workspace;
pub mod xpi;

pub use workspace::TestWorkspace;
pub use xpi::{XpiBuilder, sha256_hex};

//! Elide project lockfiles
//!
//! Reads, writes, and fingerprints the project lockfile that records which
//! inputs each installer step last saw, so unchanged steps can be skipped.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Lockfile model, fingerprints, and codecs
//! - [`infra`] - Filesystem access, discovery, and file fingerprinting
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;

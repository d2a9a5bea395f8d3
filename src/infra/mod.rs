//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem access, file fingerprinting, and
//! lockfile discovery. This module is the only place where side effects occur.

pub mod filesystem;
pub mod fingerprint;
pub mod loader;

//! semtest version information.
//!
//! The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time so the CLI and
//! any report header agree on it.

/// The harness version string (for example, `0.1.0`).
pub const SEMTEST_VERSION: &str = env!("CARGO_PKG_VERSION");

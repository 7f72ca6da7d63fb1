#![forbid(unsafe_code)]
//! semtest: conformance harness for an external semantic analyzer
//!
//! The harness runs an analyzer executable over two fixture directories: programs it must accept and programs it
//! must reject, optionally annotated with the line the diagnostic belongs on (`/* error at 5 */`). Each case is
//! classified and reported; the analyzer itself is never reimplemented here.
//!
//! The classification policy lives in `semtest_core` (no IO). This crate adds configuration, process invocation,
//! the run driver and reporting.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod version;

pub use cli::invoker::{AnalyzerInvoker, InvokeError, ProcessInvoker};
pub use cli::reporter::{CaseReporter, ConsoleReporter, JsonReporter, RunSummary};
pub use cli::runner::{HarnessError, discover_fixtures, run_harness};
pub use config::HarnessConfig;

pub use semtest_core::{
    AnalyzerOutput, ClassifyPolicy, FailureKind, FixtureCase, Outcome, Partition, Termination, Verdict, classify,
};

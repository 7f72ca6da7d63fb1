#![forbid(unsafe_code)]
//! Provide the pure policy half of the semtest conformance harness.
//!
//! Everything in this crate is deterministic and free of IO: it turns fixture text and captured analyzer output
//! into verdicts. Process spawning, filesystem discovery and reporting live in the `semtest` crate.
//!
//! ## Notes
//!
//! - **Expectations**: failure fixtures may carry an `error at <line>` annotation (see [`expectation`]).
//! - **Diagnostics**: analyzer output is plain text; lines containing `error` are diagnostics and may start with
//!   `<line>:` (see [`diagnostics`]).
//! - **Classification**: a verdict is a pure function of the case and its captured output (see [`classify`]).

pub mod classify;
pub mod diagnostics;
pub mod expectation;
pub mod fixture;

pub use classify::{AnalyzerOutput, ClassifyPolicy, Classification, FailureKind, Outcome, Termination, Verdict, classify};
pub use diagnostics::{ERROR_MARKER, diagnostic_excerpt, error_lines, has_error_marker, reported_line};
pub use expectation::{ANNOTATION_MARKER, AnnotationError, extract_expected_line, parse_annotation};
pub use fixture::{FixtureCase, Partition};

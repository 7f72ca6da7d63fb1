//! CLI module for the semtest harness
//!
//! This module provides the command-line interface for running the conformance suite.
//!
//! ## Modules
//!
//! - `invoker` - Analyzer process invocation
//! - `runner` - Fixture discovery and the run driver
//! - `reporter` - Console and JSON-lines reporters
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.
//!
//! Running `semtest` with no arguments runs `./cminus_semantic` over `./test_case_s` and `./test_case_e`.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod invoker;
pub mod reporter;
pub mod runner;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use crate::config::{self, HarnessConfig};
use crate::version::SEMTEST_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one case failed, crashed the analyzer or timed out.
    pub const FAILURE: ExitCode = ExitCode(1);
    /// The run could not start (no fixtures, unreadable fixture directory).
    pub const SETUP_ERROR: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a setup error (exit code 2): the run could not start.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::SETUP_ERROR)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable, one line per case
    Console,
    /// One JSON object per case, then a summary object
    Json,
}

/// When to color console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

/// Conformance harness for an external semantic analyzer
#[derive(Parser, Debug)]
#[command(name = "semtest")]
#[command(version = SEMTEST_VERSION)]
#[command(about = "Run a semantic analyzer over success/failure fixtures and check its verdicts", long_about = None)]
pub struct Cli {
    /// Analyzer executable, invoked as `<ANALYZER> <fixture>`
    #[arg(long, value_name = "ANALYZER", default_value = config::DEFAULT_ANALYZER)]
    pub analyzer: PathBuf,

    /// Fixtures the analyzer must accept
    #[arg(long = "success-dir", value_name = "DIR", default_value = config::DEFAULT_SUCCESS_DIR)]
    pub success_dir: PathBuf,

    /// Fixtures the analyzer must reject
    #[arg(long = "failure-dir", value_name = "DIR", default_value = config::DEFAULT_FAILURE_DIR)]
    pub failure_dir: PathBuf,

    /// Seconds before a hung analyzer is killed (0 waits forever)
    #[arg(long, value_name = "SECS", default_value_t = config::DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Fail cases whose diagnostic is reported at a different line than annotated
    #[arg(long = "strict-line-check")]
    pub strict_line_check: bool,

    /// Only run fixtures whose file name contains EXPR
    #[arg(short = 'k', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    pub format: ReportFormat,

    /// Colorize console output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

impl Cli {
    /// Build the harness configuration described by the flags.
    pub fn to_config(&self) -> HarnessConfig {
        HarnessConfig::new()
            .with_analyzer(&self.analyzer)
            .with_fixture_dirs(&self.success_dir, &self.failure_dir)
            .with_timeout(runner::timeout_from_secs(self.timeout))
            .with_strict_line_check(self.strict_line_check)
            .with_filter(self.filter.clone())
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the parsed command line and return the run's exit code.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = cli.to_config();
    runner::run(&config, cli.format, cli.verbose, cli.color)
}

// ============================================================================
// Tests
// ============================================================================

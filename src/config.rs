//! Harness configuration
//!
//! Defaults reproduce the classic layout: `./cminus_semantic` run over `./test_case_s` and `./test_case_e`.

use std::path::PathBuf;
use std::time::Duration;

use semtest_core::ClassifyPolicy;

/// Analyzer executable used when none is given.
pub const DEFAULT_ANALYZER: &str = "./cminus_semantic";
/// Directory of fixtures the analyzer must accept.
pub const DEFAULT_SUCCESS_DIR: &str = "./test_case_s";
/// Directory of fixtures the analyzer must reject.
pub const DEFAULT_FAILURE_DIR: &str = "./test_case_e";
/// Per-invocation deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Analyzer executable, invoked as `<analyzer> <fixture>`
    pub analyzer: PathBuf,
    /// Success-partition fixture directory
    pub success_dir: PathBuf,
    /// Failure-partition fixture directory
    pub failure_dir: PathBuf,
    /// Deadline per invocation; `None` waits forever
    pub timeout: Option<Duration>,
    /// Classification knobs
    pub policy: ClassifyPolicy,
    /// Only run fixtures whose file name contains this keyword
    pub filter: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            analyzer: PathBuf::from(DEFAULT_ANALYZER),
            success_dir: PathBuf::from(DEFAULT_SUCCESS_DIR),
            failure_dir: PathBuf::from(DEFAULT_FAILURE_DIR),
            timeout: Some(DEFAULT_TIMEOUT),
            policy: ClassifyPolicy::default(),
            filter: None,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the analyzer executable
    pub fn with_analyzer(mut self, analyzer: impl Into<PathBuf>) -> Self {
        self.analyzer = analyzer.into();
        self
    }

    /// Set both fixture directories
    pub fn with_fixture_dirs(mut self, success_dir: impl Into<PathBuf>, failure_dir: impl Into<PathBuf>) -> Self {
        self.success_dir = success_dir.into();
        self.failure_dir = failure_dir.into();
        self
    }

    /// Set the per-invocation deadline
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Make line mismatches hard failures
    pub fn with_strict_line_check(mut self, strict: bool) -> Self {
        self.policy.strict_line_check = strict;
        self
    }

    /// Set the fixture name filter
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    /// Whether a fixture with this file name is selected by the filter
    pub fn selects(&self, file_name: &str) -> bool {
        self.filter.as_deref().is_none_or(|keyword| file_name.contains(keyword))
    }
}

//! Fixture cases and the partition they belong to.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::expectation::extract_expected_line;

/// Which verdict the analyzer is expected to reach for a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// The fixture is a valid program; any diagnostic is a regression.
    ExpectSuccess,
    /// The fixture is invalid; the analyzer must report at least one diagnostic.
    ExpectFailure,
}

impl Partition {
    /// Short label used in reports (`success` / `failure`).
    pub fn label(self) -> &'static str {
        match self {
            Partition::ExpectSuccess => "success",
            Partition::ExpectFailure => "failure",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One test input discovered in a partition directory.
///
/// Built once per fixture at the start of a run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCase {
    pub path: PathBuf,
    pub partition: Partition,
    /// Expected diagnostic line, only ever set for failure fixtures with a well-formed annotation.
    pub expected_line: Option<u32>,
}

impl FixtureCase {
    /// Create a success-partition case. Success fixtures carry no expectation.
    pub fn success(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            partition: Partition::ExpectSuccess,
            expected_line: None,
        }
    }

    /// Create a failure-partition case, extracting the expected line from the fixture text.
    pub fn failure(path: impl Into<PathBuf>, source: &str) -> Self {
        Self {
            path: path.into(),
            partition: Partition::ExpectFailure,
            expected_line: extract_expected_line(source),
        }
    }

    /// Identifier shown in reports: the fixture's file name, or the whole path if it has none.
    pub fn case_id(&self) -> String {
        case_id_for(&self.path)
    }
}

fn case_id_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_case_has_no_expectation() {
        let case = FixtureCase::success("test_case_s/valid_sum.c");
        assert_eq!(case.partition, Partition::ExpectSuccess);
        assert_eq!(case.expected_line, None);
        assert_eq!(case.case_id(), "valid_sum.c");
    }

    #[test]
    fn test_failure_case_reads_annotation() {
        let source = "int main(void) {\n  x = 1; /* error at 2 */\n}\n";
        let case = FixtureCase::failure("test_case_e/undeclared.c", source);
        assert_eq!(case.partition, Partition::ExpectFailure);
        assert_eq!(case.expected_line, Some(2));
    }

    #[test]
    fn test_failure_case_without_annotation() {
        let case = FixtureCase::failure("test_case_e/bad_syntax.c", "void main(void) { return 1; }");
        assert_eq!(case.expected_line, None);
    }

    #[test]
    fn test_case_id_falls_back_to_path() {
        let case = FixtureCase::success("..");
        assert_eq!(case.case_id(), "..");
    }

    #[test]
    fn test_partition_labels() {
        assert_eq!(Partition::ExpectSuccess.to_string(), "success");
        assert_eq!(Partition::ExpectFailure.to_string(), "failure");
    }
}

//! Decide a case's verdict from its partition, expectation and captured analyzer output.
//!
//! ## Policy
//!
//! 1. A timed-out analyzer is a [`Outcome::Timeout`]; one that could not be launched is a [`Outcome::ToolFailure`].
//! 2. An analyzer that exits unsuccessfully without printing a diagnostic crashed: [`Outcome::ToolFailure`].
//! 3. Success fixtures pass unless stdout contains [`ERROR_MARKER`](crate::ERROR_MARKER).
//! 4. Failure fixtures fail unless stdout contains it. When the fixture is annotated, the line reported by the first
//!    diagnostic must match; a mismatch is [`Outcome::PassWithLineMismatch`], or a hard failure under
//!    [`ClassifyPolicy::strict_line_check`].
//!
//! The outcome never depends on anything but these inputs, so reruns over the same fixtures and analyzer agree.

use std::fmt;
use std::time::Duration;

use crate::diagnostics::{diagnostic_excerpt, error_lines, has_error_marker, reported_line};
use crate::fixture::{FixtureCase, Partition};

/// How the analyzer process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The process exited by itself. `code` is `None` when it was killed by a signal.
    Exited { code: Option<i32> },
    /// The process outlived its deadline and was killed.
    TimedOut { after: Duration },
    /// The process could not be started or waited on.
    LaunchFailed { reason: String },
}

impl Termination {
    pub fn succeeded(&self) -> bool {
        matches!(self, Termination::Exited { code: Some(0) })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited { code: Some(code) } => write!(f, "exit status {code}"),
            Termination::Exited { code: None } => write!(f, "killed by signal"),
            Termination::TimedOut { after } => write!(f, "timed out after {:.1}s", after.as_secs_f64()),
            Termination::LaunchFailed { reason } => write!(f, "failed to launch: {reason}"),
        }
    }
}

/// Everything captured from one analyzer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOutput {
    pub stdout: String,
    pub stderr: String,
    pub termination: Termination,
}

impl AnalyzerOutput {
    /// Output of a process that exited with `code`.
    pub fn exited(stdout: impl Into<String>, stderr: impl Into<String>, code: Option<i32>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            termination: Termination::Exited { code },
        }
    }

    /// Output of a process that exited successfully with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self::exited(stdout, String::new(), Some(0))
    }

    /// Output captured before the process was killed at its deadline.
    pub fn timed_out(stdout: impl Into<String>, stderr: impl Into<String>, after: Duration) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            termination: Termination::TimedOut { after },
        }
    }

    pub fn launch_failed(reason: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            termination: Termination::LaunchFailed { reason: reason.into() },
        }
    }
}

/// Knobs for the classification policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyPolicy {
    /// Turn a line mismatch into a hard failure instead of a soft one.
    pub strict_line_check: bool,
}

/// Why a case failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A success fixture produced a diagnostic.
    UnexpectedDiagnostic,
    /// A failure fixture produced none.
    MissingDiagnostic,
    /// The reported line disagreed with the annotation (strict mode only).
    LineMismatch,
}

impl FailureKind {
    pub fn describe(self) -> &'static str {
        match self {
            FailureKind::UnexpectedDiagnostic => "unexpected diagnostic for a valid program",
            FailureKind::MissingDiagnostic => "no diagnostic for an invalid program",
            FailureKind::LineMismatch => "diagnostic reported at the wrong line",
        }
    }
}

/// Result of classifying one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(FailureKind),
    /// The diagnostic was emitted, but not at the annotated line. `reported` is `None` when the diagnostic carried
    /// no readable line number.
    PassWithLineMismatch { expected: u32, reported: Option<u32> },
    ToolFailure,
    Timeout,
}

impl Outcome {
    /// Whether this outcome should fail the run.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Fail(_) | Outcome::ToolFailure | Outcome::Timeout)
    }

    /// Status word used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASSED",
            Outcome::Fail(_) => "FAILED",
            Outcome::PassWithLineMismatch { .. } => "LINE MISMATCH",
            Outcome::ToolFailure => "TOOL FAILURE",
            Outcome::Timeout => "TIMEOUT",
        }
    }
}

/// Outcome plus the facts it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub outcome: Outcome,
    /// Line number read from the first diagnostic, if any.
    pub reported_line: Option<u32>,
    /// Diagnostic lines joined for display.
    pub excerpt: Option<String>,
}

/// Classify one case against its captured analyzer output.
///
/// ## Parameters
/// - `case`: the fixture, with its partition and optional expected line.
/// - `output`: what the analyzer printed and how it terminated.
/// - `policy`: classification knobs.
///
/// ## Returns
/// - (`Classification`): the outcome, the reported line and the diagnostic excerpt.
pub fn classify(case: &FixtureCase, output: &AnalyzerOutput, policy: ClassifyPolicy) -> Classification {
    let excerpt = diagnostic_excerpt(&output.stdout);
    let reported = error_lines(&output.stdout).first().and_then(|line| reported_line(line));
    let outcome = decide(case, output, reported, policy);

    Classification {
        outcome,
        reported_line: reported,
        excerpt,
    }
}

fn decide(case: &FixtureCase, output: &AnalyzerOutput, reported: Option<u32>, policy: ClassifyPolicy) -> Outcome {
    let marked = has_error_marker(&output.stdout);

    match &output.termination {
        Termination::TimedOut { .. } => return Outcome::Timeout,
        Termination::LaunchFailed { .. } => return Outcome::ToolFailure,
        Termination::Exited { .. } if !output.termination.succeeded() && !marked => return Outcome::ToolFailure,
        Termination::Exited { .. } => {}
    }

    match case.partition {
        Partition::ExpectSuccess if marked => Outcome::Fail(FailureKind::UnexpectedDiagnostic),
        Partition::ExpectSuccess => Outcome::Pass,
        Partition::ExpectFailure if !marked => Outcome::Fail(FailureKind::MissingDiagnostic),
        Partition::ExpectFailure => match case.expected_line {
            None => Outcome::Pass,
            Some(expected) if reported == Some(expected) => Outcome::Pass,
            Some(_) if policy.strict_line_check => Outcome::Fail(FailureKind::LineMismatch),
            Some(expected) => Outcome::PassWithLineMismatch { expected, reported },
        },
    }
}

/// Final, reportable result for one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub case_id: String,
    pub partition: Partition,
    pub outcome: Outcome,
    pub expected_line: Option<u32>,
    pub reported_line: Option<u32>,
    pub excerpt: Option<String>,
    pub output: AnalyzerOutput,
    pub duration: Duration,
}

impl Verdict {
    /// Classify `output` for `case` and keep everything the reporters need.
    pub fn new(case: &FixtureCase, output: AnalyzerOutput, policy: ClassifyPolicy, duration: Duration) -> Self {
        let Classification {
            outcome,
            reported_line,
            excerpt,
        } = classify(case, &output, policy);

        Self {
            case_id: case.case_id(),
            partition: case.partition,
            outcome,
            expected_line: case.expected_line,
            reported_line,
            excerpt,
            output,
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undeclared() -> FixtureCase {
        FixtureCase::failure("test_case_e/undeclared.c", "int main(void) {\n\n\n\n  x = 1; /* error at 5 */\n}\n")
    }

    fn outcome(case: &FixtureCase, output: AnalyzerOutput) -> Outcome {
        classify(case, &output, ClassifyPolicy::default()).outcome
    }

    #[test]
    fn test_valid_program_with_silent_analyzer_passes() {
        let case = FixtureCase::success("test_case_s/valid_sum.c");
        assert_eq!(outcome(&case, AnalyzerOutput::success("")), Outcome::Pass);
    }

    #[test]
    fn test_valid_program_with_diagnostic_fails() {
        let case = FixtureCase::success("test_case_s/valid_sum.c");
        assert_eq!(
            outcome(&case, AnalyzerOutput::success("3: error: undeclared identifier 'y'\n")),
            Outcome::Fail(FailureKind::UnexpectedDiagnostic)
        );
    }

    #[test]
    fn test_matching_line_passes_with_excerpt() {
        let result = classify(
            &undeclared(),
            &AnalyzerOutput::success("5: error: undeclared identifier 'x'\n"),
            ClassifyPolicy::default(),
        );
        assert_eq!(result.outcome, Outcome::Pass);
        assert_eq!(result.reported_line, Some(5));
        assert_eq!(result.excerpt.as_deref(), Some("5: error: undeclared identifier 'x'"));
    }

    #[test]
    fn test_other_line_is_soft_mismatch() {
        assert_eq!(
            outcome(&undeclared(), AnalyzerOutput::success("7: error: undeclared identifier 'x'\n")),
            Outcome::PassWithLineMismatch {
                expected: 5,
                reported: Some(7)
            }
        );
    }

    #[test]
    fn test_strict_policy_turns_mismatch_into_failure() {
        let result = classify(
            &undeclared(),
            &AnalyzerOutput::success("7: error: undeclared identifier 'x'\n"),
            ClassifyPolicy { strict_line_check: true },
        );
        assert_eq!(result.outcome, Outcome::Fail(FailureKind::LineMismatch));
    }

    #[test]
    fn test_unannotated_failure_skips_line_check() {
        let case = FixtureCase::failure("test_case_e/bad_syntax.c", "void f(void) { return 1 }");
        assert_eq!(outcome(&case, AnalyzerOutput::success("3: error: ...\n")), Outcome::Pass);
    }

    #[test]
    fn test_silent_analyzer_on_invalid_program_fails() {
        let case = FixtureCase::failure("test_case_e/should_fail.c", "/* error at 2 */");
        assert_eq!(
            outcome(&case, AnalyzerOutput::success("")),
            Outcome::Fail(FailureKind::MissingDiagnostic)
        );
    }

    #[test]
    fn test_malformed_annotation_behaves_as_unannotated() {
        let case = FixtureCase::failure("test_case_e/odd.c", "/* error at abc */");
        assert_eq!(outcome(&case, AnalyzerOutput::success("9: error: boom\n")), Outcome::Pass);
    }

    #[test]
    fn test_unreadable_reported_line_is_mismatch() {
        assert_eq!(
            outcome(&undeclared(), AnalyzerOutput::success("error: undeclared identifier 'x'\n")),
            Outcome::PassWithLineMismatch {
                expected: 5,
                reported: None
            }
        );
    }

    #[test]
    fn test_only_first_diagnostic_is_compared() {
        assert_eq!(
            outcome(&undeclared(), AnalyzerOutput::success("2: error: a\n5: error: b\n")),
            Outcome::PassWithLineMismatch {
                expected: 5,
                reported: Some(2)
            }
        );
    }

    #[test]
    fn test_crash_without_output_is_tool_failure() {
        let crashed = AnalyzerOutput::exited("", "segmentation fault", None);
        assert_eq!(outcome(&undeclared(), crashed.clone()), Outcome::ToolFailure);
        assert_eq!(outcome(&FixtureCase::success("ok.c"), crashed), Outcome::ToolFailure);
    }

    #[test]
    fn test_nonzero_exit_with_diagnostic_is_classified_normally() {
        let output = AnalyzerOutput::exited("5: error: undeclared identifier 'x'\n", "", Some(1));
        assert_eq!(outcome(&undeclared(), output), Outcome::Pass);
    }

    #[test]
    fn test_timeout_and_launch_failure() {
        let timed_out = AnalyzerOutput::timed_out("5: error: x\n", "", Duration::from_secs(2));
        assert_eq!(outcome(&undeclared(), timed_out), Outcome::Timeout);
        assert_eq!(
            outcome(&undeclared(), AnalyzerOutput::launch_failed("No such file or directory")),
            Outcome::ToolFailure
        );
    }

    #[test]
    fn test_failure_flags() {
        assert!(!Outcome::Pass.is_failure());
        assert!(
            !Outcome::PassWithLineMismatch {
                expected: 1,
                reported: None
            }
            .is_failure()
        );
        assert!(Outcome::Fail(FailureKind::MissingDiagnostic).is_failure());
        assert!(Outcome::ToolFailure.is_failure());
        assert!(Outcome::Timeout.is_failure());
    }

    #[test]
    fn test_verdict_carries_case_facts() {
        let verdict = Verdict::new(
            &undeclared(),
            AnalyzerOutput::success("7: error: undeclared identifier 'x'\n"),
            ClassifyPolicy::default(),
            Duration::from_millis(3),
        );
        assert_eq!(verdict.case_id, "undeclared.c");
        assert_eq!(verdict.partition, Partition::ExpectFailure);
        assert_eq!(verdict.expected_line, Some(5));
        assert_eq!(verdict.reported_line, Some(7));
    }

    #[test]
    fn test_termination_display() {
        assert_eq!(Termination::Exited { code: Some(2) }.to_string(), "exit status 2");
        assert_eq!(Termination::Exited { code: None }.to_string(), "killed by signal");
        assert_eq!(
            Termination::TimedOut {
                after: Duration::from_millis(1500)
            }
            .to_string(),
            "timed out after 1.5s"
        );
    }
}

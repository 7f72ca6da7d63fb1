//! Guardrails over the documented verdict scenarios.
//!
//! Each row is a fixture, the analyzer's stdout and the verdict the harness must reach. Changing any of these is a
//! change of test semantics, not a refactor.

use semtest_core::{AnalyzerOutput, ClassifyPolicy, FailureKind, FixtureCase, Outcome, classify};

struct Scenario {
    name: &'static str,
    case: FixtureCase,
    stdout: &'static str,
    expected: Outcome,
    excerpt: Option<&'static str>,
}

fn scenarios() -> Vec<Scenario> {
    let annotated = "int main(void) {\n  int y;\n  y = 0;\n\n  x = y; /* error at 5 */\n}\n";

    vec![
        Scenario {
            name: "valid_sum",
            case: FixtureCase::success("test_case_s/valid_sum.c"),
            stdout: "",
            expected: Outcome::Pass,
            excerpt: None,
        },
        Scenario {
            name: "undeclared at annotated line",
            case: FixtureCase::failure("test_case_e/undeclared.c", annotated),
            stdout: "5: error: undeclared identifier 'x'",
            expected: Outcome::Pass,
            excerpt: Some("5: error: undeclared identifier 'x'"),
        },
        Scenario {
            name: "undeclared at another line",
            case: FixtureCase::failure("test_case_e/undeclared.c", annotated),
            stdout: "7: error: undeclared identifier 'x'",
            expected: Outcome::PassWithLineMismatch {
                expected: 5,
                reported: Some(7),
            },
            excerpt: Some("7: error: undeclared identifier 'x'"),
        },
        Scenario {
            name: "unannotated failure",
            case: FixtureCase::failure("test_case_e/bad_syntax.c", "int main(void) { return; }\n"),
            stdout: "3: error: ...",
            expected: Outcome::Pass,
            excerpt: Some("3: error: ..."),
        },
        Scenario {
            name: "silent analyzer on invalid program",
            case: FixtureCase::failure("test_case_e/should_fail.c", "void main(void) { int a; int a; }\n"),
            stdout: "",
            expected: Outcome::Fail(FailureKind::MissingDiagnostic),
            excerpt: None,
        },
    ]
}

#[test]
fn documented_scenarios_hold() {
    for scenario in scenarios() {
        let result = classify(
            &scenario.case,
            &AnalyzerOutput::success(scenario.stdout),
            ClassifyPolicy::default(),
        );
        assert_eq!(result.outcome, scenario.expected, "outcome drifted for scenario `{}`", scenario.name);
        assert_eq!(
            result.excerpt.as_deref(),
            scenario.excerpt,
            "excerpt drifted for scenario `{}`",
            scenario.name
        );
    }
}

#[test]
fn line_mismatch_is_never_a_hard_failure_by_default() {
    let case = FixtureCase::failure("test_case_e/undeclared.c", "/* error at 5 */");
    for reported in [1u32, 4, 6, 500] {
        let stdout = format!("{reported}: error: undeclared identifier 'x'");
        let outcome = classify(&case, &AnalyzerOutput::success(stdout), ClassifyPolicy::default()).outcome;
        assert!(
            matches!(outcome, Outcome::PassWithLineMismatch { expected: 5, .. }),
            "line {reported} should be a soft mismatch, got {outcome:?}"
        );
    }
}

#[test]
fn failure_partition_fails_only_without_diagnostics() {
    let case = FixtureCase::failure("test_case_e/any.c", "");
    for stdout in ["", "ok\n", "checked 3 functions\n", "1: error: x", "warning\nerror\n"] {
        let outcome = classify(&case, &AnalyzerOutput::success(stdout), ClassifyPolicy::default()).outcome;
        if matches!(outcome, Outcome::Fail(_)) {
            assert!(!stdout.contains("error"), "`{stdout}` has a diagnostic but failed");
        }
    }
}

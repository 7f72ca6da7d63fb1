//! Case reporters
//!
//! The run driver hands every verdict to a [`CaseReporter`], in processing order. Two formats ship:
//!
//! - [`ConsoleReporter`]: pytest-style human-readable lines with diagnostic excerpts for anything that did not
//!   cleanly pass.
//! - [`JsonReporter`]: one JSON object per case plus a closing summary object (JSON lines).

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use semtest_core::{Outcome, Partition, Verdict};
use serde_json::json;

use super::ExitCode;

/// Trait for reporting harness progress and verdicts.
///
/// Implement this trait to customize the report format.
pub trait CaseReporter {
    /// Called once before any case runs
    fn on_run_start(&mut self, _analyzer: &Path, _fixture_count: usize) {}

    /// Called when the driver moves on to a partition
    fn on_partition_start(&mut self, _partition: Partition, _dir: &Path, _fixture_count: usize) {}

    /// Called when a case has been classified
    fn on_case_complete(&mut self, verdict: &Verdict);

    /// Called when all cases have completed
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Summary of a harness run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub mismatched: usize,
    pub tool_failures: usize,
    pub timeouts: usize,
    pub duration: Duration,
}

impl RunSummary {
    /// Count one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail(_) => self.failed += 1,
            Outcome::PassWithLineMismatch { .. } => self.mismatched += 1,
            Outcome::ToolFailure => self.tool_failures += 1,
            Outcome::Timeout => self.timeouts += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed + self.tool_failures + self.timeouts > 0
    }

    /// Exit code for the whole run. Line mismatches alone do not fail it.
    pub fn exit_code(&self) -> ExitCode {
        if self.has_failures() { ExitCode::FAILURE } else { ExitCode::SUCCESS }
    }

    fn parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if self.passed > 0 {
            parts.push(format!("{} passed", self.passed));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        if self.mismatched > 0 {
            parts.push(format!("{} line mismatch", self.mismatched));
        }
        if self.tool_failures > 0 {
            parts.push(format!("{} tool failure", self.tool_failures));
        }
        if self.timeouts > 0 {
            parts.push(format!("{} timed out", self.timeouts));
        }
        if parts.is_empty() {
            parts.push("no cases run".to_string());
        }
        parts
    }
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Default console reporter (pytest-style)
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    color: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool, color: bool) -> Self {
        Self { out, verbose, color }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write report");
        }
    }

    fn status(&self, verdict: &Verdict) -> String {
        let (color, detail) = match &verdict.outcome {
            Outcome::Pass => (GREEN, None),
            Outcome::Fail(kind) => (RED, Some(kind.describe().to_string())),
            Outcome::PassWithLineMismatch { expected, reported } => {
                let reported = match reported {
                    Some(line) => format!("reported {line}"),
                    None => "reported no line".to_string(),
                };
                (YELLOW, Some(format!("expected line {expected}, {reported}")))
            }
            Outcome::ToolFailure | Outcome::Timeout => (RED, Some(verdict.output.termination.to_string())),
        };

        let mut status = self.paint(verdict.outcome.label(), color);
        if let Some(detail) = detail {
            status.push_str(&format!(" ({detail})"));
        }
        if self.verbose {
            status.push_str(&format!(" [{}ms]", verdict.duration.as_millis()));
        }
        status
    }
}

/// Text shown under a case: the diagnostic excerpt, or the raw output when there is none.
fn case_body(verdict: &Verdict) -> String {
    if let Some(excerpt) = &verdict.excerpt {
        return excerpt.clone();
    }

    let stdout = verdict.output.stdout.trim_end();
    let stderr = verdict.output.stderr.trim_end();
    let mut body = Vec::new();
    if !stdout.is_empty() {
        body.push(stdout.to_string());
    }
    if !stderr.is_empty() {
        body.push(format!("stderr:\n{stderr}"));
    }
    if body.is_empty() {
        "(no output)".to_string()
    } else {
        body.join("\n")
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("    {line}\n")).collect()
}

impl<W: Write> CaseReporter for ConsoleReporter<W> {
    fn on_run_start(&mut self, analyzer: &Path, fixture_count: usize) {
        let banner = self.paint("=================== semtest session starts ===================", BOLD);
        let text = format!(
            "{banner}\nanalyzer: {}\ncollected {fixture_count} fixture(s)\n",
            analyzer.display()
        );
        self.emit(&text);
    }

    fn on_partition_start(&mut self, partition: Partition, dir: &Path, fixture_count: usize) {
        let text = format!("\n{partition} partition: {fixture_count} fixture(s) in {}\n", dir.display());
        self.emit(&text);
    }

    fn on_case_complete(&mut self, verdict: &Verdict) {
        let mut text = format!("{}/{} {}\n", verdict.partition, verdict.case_id, self.status(verdict));

        let show_body = match verdict.outcome {
            Outcome::Pass => verdict.partition == Partition::ExpectFailure && verdict.excerpt.is_some(),
            _ => true,
        };
        if show_body {
            text.push_str(&indent(&case_body(verdict)));
        }
        self.emit(&text);
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        let color = if summary.has_failures() {
            RED
        } else if summary.mismatched > 0 {
            YELLOW
        } else {
            GREEN
        };
        let line = format!(
            "=================== {} in {:.2}s ===================",
            summary.parts().join(", "),
            summary.duration.as_secs_f64()
        );
        let text = format!("\n{}\n", self.paint(&line, color));
        self.emit(&text);
    }
}

/// Machine-readable reporter emitting JSON lines
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, value: &serde_json::Value) {
        if let Err(e) = writeln!(self.out, "{value}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write report");
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn outcome_id(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Pass => "pass",
        Outcome::Fail(_) => "fail",
        Outcome::PassWithLineMismatch { .. } => "line_mismatch",
        Outcome::ToolFailure => "tool_failure",
        Outcome::Timeout => "timeout",
    }
}

impl<W: Write> CaseReporter for JsonReporter<W> {
    fn on_case_complete(&mut self, verdict: &Verdict) {
        let reason = match &verdict.outcome {
            Outcome::Fail(kind) => Some(kind.describe()),
            _ => None,
        };
        let value = json!({
            "event": "case",
            "partition": verdict.partition.label(),
            "case": verdict.case_id,
            "outcome": outcome_id(&verdict.outcome),
            "reason": reason,
            "expected_line": verdict.expected_line,
            "reported_line": verdict.reported_line,
            "excerpt": verdict.excerpt,
            "termination": verdict.output.termination.to_string(),
            "duration_ms": millis(verdict.duration),
        });
        self.emit(&value);
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        let value = json!({
            "event": "summary",
            "total": summary.total,
            "passed": summary.passed,
            "failed": summary.failed,
            "line_mismatch": summary.mismatched,
            "tool_failure": summary.tool_failures,
            "timeout": summary.timeouts,
            "duration_ms": millis(summary.duration),
        });
        self.emit(&value);
    }
}

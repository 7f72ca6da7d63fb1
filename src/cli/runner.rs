//! Run driver
//!
//! Discovers both fixture partitions, runs the analyzer on every fixture and hands each verdict to a
//! [`CaseReporter`]. The success partition runs first, then the failure partition, each in lexicographic file name
//! order. A case that cannot be read or whose analyzer cannot be launched still yields a verdict: the run never stops
//! early.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use semtest_core::{AnalyzerOutput, ClassifyPolicy, FixtureCase, Partition, Verdict};
use thiserror::Error;

use super::invoker::{AnalyzerInvoker, ProcessInvoker};
use super::reporter::{CaseReporter, ConsoleReporter, JsonReporter, RunSummary};
use super::{CliError, CliResult, ColorMode, ExitCode, ReportFormat};
use crate::config::HarnessConfig;

/// Errors that prevent a run from starting
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read fixture directory '{}': {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "No fixtures found in '{}' or '{}'\nSuccess fixtures go in the first directory, failure fixtures in the second",
        .success.display(),
        .failure.display()
    )]
    NoFixtures { success: PathBuf, failure: PathBuf },

    #[error("No fixtures match -k '{filter}'")]
    NoMatchingFixtures { filter: String },
}

/// Fixtures of one partition, in run order.
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    pub partition: Partition,
    pub dir: PathBuf,
    pub fixtures: Vec<PathBuf>,
}

/// List the fixtures in a partition directory, sorted by file name.
///
/// Hidden entries and subdirectories are skipped. A missing directory is an empty partition.
pub fn discover_fixtures(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "fixture directory does not exist; treating partition as empty");
        return Ok(Vec::new());
    }

    let read_err = |source| HarnessError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if !hidden && path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Discover both partitions and apply the name filter.
pub fn plan_run(config: &HarnessConfig) -> Result<Vec<PartitionPlan>, HarnessError> {
    let mut plans = Vec::new();

    for (partition, dir) in [
        (Partition::ExpectSuccess, &config.success_dir),
        (Partition::ExpectFailure, &config.failure_dir),
    ] {
        let fixtures = discover_fixtures(dir)?
            .into_iter()
            .filter(|path| {
                let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
                config.selects(&name)
            })
            .collect();
        plans.push(PartitionPlan {
            partition,
            dir: dir.clone(),
            fixtures,
        });
    }

    let total: usize = plans.iter().map(|plan| plan.fixtures.len()).sum();
    if total == 0 {
        return Err(match &config.filter {
            Some(filter) => HarnessError::NoMatchingFixtures { filter: filter.clone() },
            None => HarnessError::NoFixtures {
                success: config.success_dir.clone(),
                failure: config.failure_dir.clone(),
            },
        });
    }

    Ok(plans)
}

/// Build the case for a discovered fixture.
///
/// Failure fixtures are read to find their annotation. An unreadable fixture runs without an expectation.
pub fn load_case(path: PathBuf, partition: Partition) -> FixtureCase {
    match partition {
        Partition::ExpectSuccess => FixtureCase::success(path),
        Partition::ExpectFailure => match fs::read(&path) {
            Ok(bytes) => {
                let source = String::from_utf8_lossy(&bytes);
                FixtureCase::failure(path, &source)
            }
            Err(e) => {
                tracing::warn!(fixture = %path.display(), error = %e, "could not read fixture; running without an expected line");
                FixtureCase::failure(path, "")
            }
        },
    }
}

/// Invoke the analyzer on one case and classify the result.
#[tracing::instrument(skip_all, fields(case = %case.case_id(), partition = %case.partition))]
pub fn run_case<I: AnalyzerInvoker + ?Sized>(case: &FixtureCase, invoker: &I, policy: ClassifyPolicy) -> Verdict {
    let start = Instant::now();

    let output = invoker.invoke(&case.path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "analyzer invocation failed");
        AnalyzerOutput::launch_failed(e.to_string())
    });

    let verdict = Verdict::new(case, output, policy, start.elapsed());
    tracing::debug!(outcome = verdict.outcome.label(), "case classified");
    verdict
}

/// Run every planned case, reporting as it goes.
pub fn run_harness<I, R>(config: &HarnessConfig, invoker: &I, reporter: &mut R) -> Result<RunSummary, HarnessError>
where
    I: AnalyzerInvoker + ?Sized,
    R: CaseReporter + ?Sized,
{
    let start_time = Instant::now();
    let plans = plan_run(config)?;

    let fixture_count = plans.iter().map(|plan| plan.fixtures.len()).sum();
    reporter.on_run_start(&config.analyzer, fixture_count);

    let mut summary = RunSummary::default();
    for plan in plans {
        reporter.on_partition_start(plan.partition, &plan.dir, plan.fixtures.len());

        for path in plan.fixtures {
            let case = load_case(path, plan.partition);
            let verdict = run_case(&case, invoker, config.policy);
            summary.record(&verdict.outcome);
            reporter.on_case_complete(&verdict);
        }
    }

    summary.duration = start_time.elapsed();
    reporter.on_run_complete(&summary);
    Ok(summary)
}

/// Run the harness with the real analyzer process, reporting to stdout.
pub fn run(config: &HarnessConfig, format: ReportFormat, verbose: bool, color: ColorMode) -> CliResult<ExitCode> {
    let invoker = ProcessInvoker::from_config(config);
    tracing::info!(
        analyzer = %invoker.program().display(),
        timeout = ?config.timeout,
        strict = config.policy.strict_line_check,
        "starting harness run"
    );

    let result = match format {
        ReportFormat::Console => {
            let color = match color {
                ColorMode::Always => true,
                ColorMode::Never => false,
                ColorMode::Auto => io::stdout().is_terminal(),
            };
            let mut reporter = ConsoleReporter::new(io::stdout(), verbose, color);
            run_harness(config, &invoker, &mut reporter)
        }
        ReportFormat::Json => {
            let mut reporter = JsonReporter::new(io::stdout());
            run_harness(config, &invoker, &mut reporter)
        }
    };

    match result {
        Ok(summary) => Ok(summary.exit_code()),
        Err(e) => Err(CliError::setup(e.to_string())),
    }
}

/// Convert the `--timeout` flag into a deadline; `0` disables it.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 { None } else { Some(Duration::from_secs(secs)) }
}

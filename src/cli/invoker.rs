//! Analyzer invocation boundary
//!
//! The harness treats the semantic analyzer as an opaque executable: it is run once per fixture with the fixture
//! path as its only argument, and everything it writes is captured as text.
//!
//! The [`AnalyzerInvoker`] trait keeps process handling out of the run driver, so the driver can be exercised
//! with canned outputs and alternative execution strategies can be swapped in.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use semtest_core::AnalyzerOutput;
use thiserror::Error;

use crate::config::HarnessConfig;

/// How often a running analyzer is polled while a deadline is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output is still collected once the deadline has passed.
///
/// Processes forked by the analyzer can keep its pipes open after it was killed; their output is abandoned after
/// this grace period.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

const READ_CHUNK: usize = 8 * 1024;

/// Errors that occur while running the analyzer
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to start analyzer `{}`: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for analyzer: {0}")]
    Wait(#[source] io::Error),

    #[error("failed to capture analyzer {stream}: {reason}")]
    Capture { stream: &'static str, reason: String },
}

/// Run the analyzer against one fixture and capture what it printed.
pub trait AnalyzerInvoker {
    fn invoke(&self, fixture: &Path) -> Result<AnalyzerOutput, InvokeError>;
}

/// Child-process invoker with an optional deadline.
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ProcessInvoker {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(&config.analyzer, config.timeout)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl AnalyzerInvoker for ProcessInvoker {
    #[tracing::instrument(skip(self), fields(analyzer = %self.program.display()))]
    fn invoke(&self, fixture: &Path) -> Result<AnalyzerOutput, InvokeError> {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);

        let mut child = Command::new(&self.program)
            .arg(fixture)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InvokeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => {
                spawn_reader(stdout, Stream::Stdout, tx.clone());
                spawn_reader(stderr, Stream::Stderr, tx);
            }
            _ => {
                kill_and_reap(&mut child);
                return Err(InvokeError::Capture {
                    stream: "pipes",
                    reason: "child was spawned without piped output".to_string(),
                });
            }
        }

        let status = match wait_with_deadline(&mut child, deadline) {
            Ok(status) => status,
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(InvokeError::Wait(e));
            }
        };

        let drain_until = deadline.map(|deadline| deadline.max(Instant::now()) + DRAIN_GRACE);
        let captured = drain(&rx, drain_until)?;
        let stdout = String::from_utf8_lossy(&captured.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&captured.stderr).into_owned();

        let output = match status {
            Some(status) => AnalyzerOutput::exited(stdout, stderr, status.code()),
            None => {
                tracing::warn!(fixture = %fixture.display(), "analyzer exceeded its deadline and was killed");
                AnalyzerOutput::timed_out(stdout, stderr, self.timeout.unwrap_or_default())
            }
        };

        tracing::debug!(termination = %output.termination, stdout_len = output.stdout.len(), "analyzer finished");
        Ok(output)
    }
}

/// Wait for the child, killing it once `deadline` passes.
///
/// Returns `Ok(None)` when the deadline expired.
fn wait_with_deadline(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let now = Instant::now();
        if now >= deadline {
            kill_and_reap(child);
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "analyzer already exited before kill");
    }
    let _ = child.wait();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn name(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

enum ReadEvent {
    Data(Stream, Vec<u8>),
    Closed(Stream),
    Failed(Stream, io::Error),
}

/// Forward a pipe to `tx` chunk by chunk until it closes.
///
/// The thread is detached: if the receiver stops listening, it exits on its next send.
fn spawn_reader<R: Read + Send + 'static>(mut pipe: R, stream: Stream, tx: Sender<ReadEvent>) {
    thread::spawn(move || {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let event = match pipe.read(&mut buf) {
                Ok(0) => ReadEvent::Closed(stream),
                Ok(n) => ReadEvent::Data(stream, buf[..n].to_vec()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => ReadEvent::Failed(stream, e),
            };
            let last = !matches!(event, ReadEvent::Data(..));
            if tx.send(event).is_err() || last {
                break;
            }
        }
    });
}

#[derive(Debug, Default)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Collect both streams until they close or `until` passes, keeping whatever arrived.
fn drain(rx: &Receiver<ReadEvent>, until: Option<Instant>) -> Result<Captured, InvokeError> {
    let mut captured = Captured::default();
    let mut open = 2;

    while open > 0 {
        let event = match until {
            None => match rx.recv() {
                Ok(event) => event,
                Err(_) => break,
            },
            Some(until) => match rx.recv_timeout(until.saturating_duration_since(Instant::now())) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(open_streams = open, "analyzer output still open after its deadline; keeping partial output");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
        };

        match event {
            ReadEvent::Data(Stream::Stdout, bytes) => captured.stdout.extend_from_slice(&bytes),
            ReadEvent::Data(Stream::Stderr, bytes) => captured.stderr.extend_from_slice(&bytes),
            ReadEvent::Closed(_) => open -= 1,
            ReadEvent::Failed(stream, e) => {
                return Err(InvokeError::Capture {
                    stream: stream.name(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(captured)
}

//! Extract the expected diagnostic line from a failure fixture.
//!
//! Failure fixtures declare where the analyzer should complain with a comment such as `/* error at 5 */`.
//!
//! ## Notes
//! - **First match wins**: only the first line containing [`ANNOTATION_MARKER`] is considered, even when it is
//!   malformed and a later annotation is not.
//! - **Digits only**: every non-digit character after the marker is dropped before parsing, so `error at: 5`,
//!   `error at line 5` and `error at 5 */` all mean line 5.
//! - **Never fatal**: a malformed annotation means "no expectation". The reason is logged and dropped.

use thiserror::Error;

/// Substring that marks an annotation line in a failure fixture.
pub const ANNOTATION_MARKER: &str = "error at";

/// Why an annotation line did not produce a line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("line does not contain `error at`")]
    MissingMarker,

    #[error("no digits after `error at`")]
    NoDigits,

    #[error("line number `{0}` does not fit in 32 bits")]
    OutOfRange(String),

    #[error("line number 0 is not a valid source line")]
    ZeroLine,
}

/// Parse one annotation line into its expected line number.
///
/// ## Parameters
/// - `line`: a single fixture line, expected to contain [`ANNOTATION_MARKER`].
///
/// ## Returns
/// - `Ok(line)`: the positive line number written after the marker.
/// - `Err(AnnotationError)`: why the line could not be used.
pub fn parse_annotation(line: &str) -> Result<u32, AnnotationError> {
    let Some(at) = line.find(ANNOTATION_MARKER) else {
        return Err(AnnotationError::MissingMarker);
    };
    let tail = &line[at + ANNOTATION_MARKER.len()..];
    let digits: String = tail.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return Err(AnnotationError::NoDigits);
    }

    match digits.parse::<u32>() {
        Ok(0) => Err(AnnotationError::ZeroLine),
        Ok(n) => Ok(n),
        Err(_) => Err(AnnotationError::OutOfRange(digits)),
    }
}

/// Find the expected diagnostic line declared in a failure fixture.
///
/// ## Parameters
/// - `source`: full text of the fixture.
///
/// ## Returns
/// - `Some(line)`: the first annotation was well-formed.
/// - `None`: there is no annotation, or the first one is malformed.
pub fn extract_expected_line(source: &str) -> Option<u32> {
    let (index, line) = source
        .lines()
        .enumerate()
        .find(|(_, line)| line.contains(ANNOTATION_MARKER))?;

    match parse_annotation(line) {
        Ok(expected) => Some(expected),
        Err(err) => {
            tracing::debug!(fixture_line = index + 1, %err, "ignoring malformed error annotation");
            None
        }
    }
}

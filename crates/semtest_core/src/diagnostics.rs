//! Read diagnostics out of the analyzer's plain-text output.
//!
//! The analyzer has no structured output. A line is a diagnostic when it contains [`ERROR_MARKER`], and by
//! convention starts with the offending source line, e.g. `5: error: undeclared identifier 'x'`. Nothing here
//! relies on that convention holding.

/// Case-sensitive substring that identifies a diagnostic line.
pub const ERROR_MARKER: &str = "error";

/// Check whether the analyzer output contains any diagnostic.
pub fn has_error_marker(output: &str) -> bool {
    output.contains(ERROR_MARKER)
}

/// Collect every output line that contains [`ERROR_MARKER`], in output order.
pub fn error_lines(output: &str) -> Vec<&str> {
    output.lines().filter(|line| line.contains(ERROR_MARKER)).collect()
}

/// Join the diagnostic lines for display.
///
/// ## Returns
/// - `Some(excerpt)`: diagnostic lines joined with `\n`.
/// - `None`: the output holds no diagnostic line.
pub fn diagnostic_excerpt(output: &str) -> Option<String> {
    let lines = error_lines(output);
    if lines.is_empty() { None } else { Some(lines.join("\n")) }
}

/// Read the source line a diagnostic points at.
///
/// The digits found before the first `:` are the line number; anything else in that prefix is ignored, so
/// `line 5: error` reads as 5.
///
/// ## Returns
/// - `None` if the line has no colon, no digits before it, or a number that does not fit in `u32`.
pub fn reported_line(diagnostic: &str) -> Option<u32> {
    let (prefix, _) = diagnostic.split_once(':')?;
    let digits: String = prefix.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "checking undeclared.c\n5: error: undeclared identifier 'x'\n7: error: type mismatch\ndone\n";

    #[test]
    fn test_has_error_marker() {
        assert!(has_error_marker(OUTPUT));
        assert!(!has_error_marker(""));
        assert!(!has_error_marker("Error: capitalised does not count"));
    }

    #[test]
    fn test_error_lines_keep_order() {
        assert_eq!(
            error_lines(OUTPUT),
            vec!["5: error: undeclared identifier 'x'", "7: error: type mismatch"]
        );
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(
            diagnostic_excerpt(OUTPUT).as_deref(),
            Some("5: error: undeclared identifier 'x'\n7: error: type mismatch")
        );
        assert_eq!(diagnostic_excerpt("all good\n"), None);
    }

    #[test]
    fn test_reported_line() {
        assert_eq!(reported_line("5: error: undeclared identifier 'x'"), Some(5));
        assert_eq!(reported_line("  12 : error"), Some(12));
        assert_eq!(reported_line("line 3: error: oops"), Some(3));
    }

    #[test]
    fn test_reported_line_tolerates_missing_number() {
        assert_eq!(reported_line("error: something went wrong"), None);
        assert_eq!(reported_line("error without a colon 5"), None);
        assert_eq!(reported_line("99999999999: error"), None);
    }
}

//! Extraction of the expected-output annotation embedded in a spec file.
//!
//! The annotation is the first brace group, after flattening newlines, whose
//! body ends in one or more `<signed integer><whitespace>` tokens directly
//! followed by `}`:
//!
//! ```text
//! { program computes the following outputs: -3 42 0 }
//! ```
//!
//! Any text (including other braces) may sit between the opening `{` and the
//! first integer token. The integer run must reach the closing brace, so
//! `{2}` is not an annotation while `{ 2 }` is.

use crate::types::CaseError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Replace every newline with a single space.
pub fn flatten(text: &str) -> String {
    text.replace('\n', " ")
}

/// Expected output tokens of the first annotation in `text`.
pub fn extract_expected(text: &str) -> Result<Vec<String>, CaseError> {
    let flat: Vec<char> = flatten(text).chars().collect();
    let open = flat
        .iter()
        .position(|&c| c == '{')
        .ok_or(CaseError::MissingAnnotation)?;

    for start in open + 1..flat.len() {
        if let Some(end) = integer_run(&flat, start) {
            if flat.get(end) == Some(&'}') {
                let body: String = flat[start..end].iter().collect();
                let tokens: Vec<String> = body.split_whitespace().map(str::to_string).collect();
                debug!(count = tokens.len(), "found annotation");
                return Ok(tokens);
            }
        }
    }
    Err(CaseError::MissingAnnotation)
}

/// Read a spec file and extract its expected output.
pub fn parse_spec_file(path: &Path) -> Result<Vec<String>, CaseError> {
    let content = fs::read_to_string(path).map_err(|e| CaseError::ReadSpec(e.to_string()))?;
    extract_expected(&content)
}

/// Length of the longest run of `-?\d+\s+` tokens starting at `start`,
/// returned as the index just past it. `None` when not even one token fits.
fn integer_run(chars: &[char], start: usize) -> Option<usize> {
    let mut pos = start;
    let mut matched = None;
    loop {
        let mut i = pos;
        if chars.get(i) == Some(&'-') {
            i += 1;
        }
        let digits = i;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        if i == digits {
            return matched;
        }
        let spaces = i;
        while chars.get(i).is_some_and(|c| c.is_whitespace()) {
            i += 1;
        }
        if i == spaces {
            return matched;
        }
        pos = i;
        matched = Some(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flatten_is_idempotent() {
        let text = "a\nb\n\nc { 1\n2 }\n";
        let once = flatten(text);
        assert_eq!(flatten(&once), once);
        assert!(!once.contains('\n'));
    }

    #[test]
    fn extracts_signed_tokens_in_order() {
        let text = "{ program computes the following outputs: -3 42 0 }";
        assert_eq!(extract_expected(text).unwrap(), tokens(&["-3", "42", "0"]));
    }

    #[test]
    fn annotation_may_span_lines() {
        let text = "BEGIN\n  PRINT 1\nEND\n{\n  1\n  -20\n}\n";
        assert_eq!(extract_expected(text).unwrap(), tokens(&["1", "-20"]));
    }

    #[test]
    fn skips_brace_groups_without_integers() {
        let text = "int main() { return 1 + 1; } // expect: { 2 }";
        assert_eq!(extract_expected(text).unwrap(), tokens(&["2"]));
    }

    #[test]
    fn only_first_annotation_counts() {
        let text = "{ 1 2 } { 3 4 }";
        assert_eq!(extract_expected(text).unwrap(), tokens(&["1", "2"]));
    }

    #[test]
    fn closing_brace_needs_preceding_whitespace() {
        assert_eq!(extract_expected("{2}"), Err(CaseError::MissingAnnotation));
        assert_eq!(extract_expected("{2 }").unwrap(), tokens(&["2"]));
    }

    #[test]
    fn lone_minus_is_not_part_of_a_token() {
        assert_eq!(extract_expected("{ --5 }").unwrap(), tokens(&["-5"]));
        assert_eq!(extract_expected("{ - 5 }").unwrap(), tokens(&["5"]));
    }

    #[test]
    fn missing_annotation_is_an_error() {
        assert_eq!(extract_expected(""), Err(CaseError::MissingAnnotation));
        assert_eq!(extract_expected("no braces 1 2 3"), Err(CaseError::MissingAnnotation));
        assert_eq!(extract_expected("{ one two }"), Err(CaseError::MissingAnnotation));
        assert_eq!(extract_expected("{ 1 2 3"), Err(CaseError::MissingAnnotation));
    }

    #[test]
    fn leading_zeros_are_kept_verbatim() {
        assert_eq!(extract_expected("{ 007 }").unwrap(), tokens(&["007"]));
    }
}

use crate::annotation::parse_spec_file;
use crate::backend::Compiler;
use crate::types::{CaseError, CaseResult, Outcome, Summary, TestCase};
use tracing::{debug, warn};

/// Decode compiler output, rejecting anything outside ASCII.
pub fn decode_stdout(bytes: &[u8]) -> Result<String, CaseError> {
    if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(CaseError::NonAsciiOutput {
            offset,
            byte: bytes[offset],
        });
    }
    Ok(bytes.iter().map(|&b| b as char).collect())
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Evaluate one spec file end to end.
pub fn run_case<C: Compiler + ?Sized>(compiler: &C, case: &TestCase) -> CaseResult {
    let errored = |expected: Vec<String>, e: CaseError| {
        warn!(spec = %case.id, error = %e, "case could not be evaluated");
        CaseResult {
            case: case.clone(),
            expected,
            actual: vec![],
            outcome: Outcome::Error(e),
        }
    };

    let expected = match parse_spec_file(&case.path) {
        Ok(expected) => expected,
        Err(e) => return errored(vec![], e),
    };

    let output = match compiler.run(&case.path) {
        Ok(output) => output,
        Err(e) => return errored(expected, e),
    };
    let actual = match decode_stdout(&output.stdout) {
        Ok(text) => tokenize(&text),
        Err(e) => return errored(expected, e),
    };

    let outcome = if actual == expected {
        Outcome::Pass
    } else {
        Outcome::Mismatch
    };
    debug!(spec = %case.id, ?outcome, exit_code = ?output.exit_code, "case finished");
    CaseResult {
        case: case.clone(),
        expected,
        actual,
        outcome,
    }
}

/// Run every case in order, handing each result to `on_result` as soon as it
/// is known. All cases run even after a failure.
pub fn run_cases_with<C, F>(compiler: &C, cases: &[TestCase], mut on_result: F) -> Summary
where
    C: Compiler + ?Sized,
    F: FnMut(&CaseResult),
{
    let mut summary = Summary::default();
    for case in cases {
        let result = run_case(compiler, case);
        on_result(&result);
        summary.push(result);
    }
    summary
}

pub fn run_cases<C: Compiler + ?Sized>(compiler: &C, cases: &[TestCase]) -> Summary {
    run_cases_with(compiler, cases, |_| {})
}

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// One spec file from the corpus.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestCase {
    pub id: String,
    pub path: PathBuf,
}

impl TestCase {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    /// The identifier with its final extension removed, for display.
    pub fn base_name(&self) -> &str {
        base_name(&self.id)
    }
}

pub fn base_name(id: &str) -> &str {
    Path::new(id)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(id)
}

/// Errors scoped to a single test case. None of these abort the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("no expected-output annotation found")]
    MissingAnnotation,
    #[error("cannot read spec file: {0}")]
    ReadSpec(String),
    #[error("cannot start compiler '{cmd}': {reason}")]
    Spawn { cmd: String, reason: String },
    #[error("compiler did not finish within {} s", .0.as_secs())]
    Timeout(Duration),
    #[error("compiler output is not ASCII (byte 0x{byte:02x} at offset {offset})")]
    NonAsciiOutput { offset: usize, byte: u8 },
    #[error("I/O error while running compiler: {0}")]
    Io(String),
}

impl CaseError {
    /// Fixture problems as opposed to compiler problems.
    pub fn is_malformed_fixture(&self) -> bool {
        matches!(self, CaseError::MissingAnnotation | CaseError::ReadSpec(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Mismatch,
    Error(CaseError),
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub case: TestCase,
    pub expected: Vec<String>,
    pub actual: Vec<String>,
    pub outcome: Outcome,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    pub fn error(&self) -> Option<&CaseError> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total: usize,   // Total number of test cases
    pub passed: usize,  // Cases whose output matched
    pub failed: usize,  // Cases whose output did not match
    pub errored: usize, // Cases that could not be evaluated
    pub cases: Vec<CaseResult>,
}

impl Summary {
    pub fn push(&mut self, result: CaseResult) {
        self.total += 1;
        match result.outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Mismatch => self.failed += 1,
            Outcome::Error(_) => self.errored += 1,
        }
        self.cases.push(result);
    }

    /// True when every case passed; vacuously true for an empty run.
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

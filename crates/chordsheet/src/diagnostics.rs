use std::fmt;

use crate::error::Problem;

/// A recoverable problem together with where it was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub problem: Problem,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, line: usize, problem: Problem) -> Self {
        Self {
            file: file.into(),
            line,
            problem,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.line, self.problem)
    }
}

/// A single parse error with its source position.
///
/// The parser never throws: it records a diagnostic, synchronizes to the
/// next statement boundary and keeps going, so one run can surface several
/// independent problems. The caller inspects the accumulated list after
/// `parse()` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// Human-readable description of the problem.
    pub message:     String,
    /// The source line of the offending token.
    pub line:        usize,
    /// The source column of the offending token.
    pub column:      usize,
    /// Index of the offending token in the token stream.
    pub token_index: usize,
}

impl ParseDiagnostic {
    /// Creates a diagnostic for the given position.
    #[must_use]
    pub fn new(message: impl Into<String>, line: usize, column: usize, token_index: usize) -> Self {
        Self { message: message.into(),
               line,
               column,
               token_index }
    }
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,
               "Line {}, column {}: {}",
               self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseDiagnostic {}

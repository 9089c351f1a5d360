#[derive(Debug, Clone, PartialEq, Eq)]
/// Represents all fatal errors that can occur during tokenization.
///
/// Lexical errors abort the lex immediately; there is no recovery at this
/// stage. Unknown characters are not lexical errors — they surface as
/// `Invalid` tokens and are rejected later by the parser.
pub enum LexError {
    /// A string literal was still open at the end of a line or of the input.
    UnterminatedString {
        /// The source line where the string started.
        line: usize,
    },
    /// Tabs and spaces were mixed in leading indentation, or a line used a
    /// different indentation style than the one the program established.
    MixedIndentation {
        /// The source line where the mix occurred.
        line: usize,
    },
    /// The first indentation of the program is narrower than two columns.
    IndentTooNarrow {
        /// The source line where the indent occurred.
        line:  usize,
        /// The measured indentation width.
        width: usize,
    },
    /// A space-indented line is not an exact multiple of the base width.
    IndentNotMultiple {
        /// The source line where the indent occurred.
        line:  usize,
        /// The measured indentation width.
        width: usize,
        /// The established base indentation width.
        base:  usize,
    },
    /// A dedent did not land on any enclosing indentation level.
    InconsistentDedent {
        /// The source line where the dedent occurred.
        line:  usize,
        /// The measured indentation width.
        width: usize,
    },
}

impl LexError {
    /// Returns the source line the error was raised at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UnterminatedString { line }
            | Self::MixedIndentation { line }
            | Self::IndentTooNarrow { line, .. }
            | Self::IndentNotMultiple { line, .. }
            | Self::InconsistentDedent { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedString { line } => {
                write!(f, "Unterminated string literal at line {line}.")
            },
            Self::MixedIndentation { line } => write!(f,
                                                      "Mixed tabs and spaces in indentation at line {line}."),
            Self::IndentTooNarrow { line, width } => write!(f,
                                                            "Indentation of {width} column(s) at line {line} is too narrow; at least 2 are required."),
            Self::IndentNotMultiple { line, width, base } => write!(f,
                                                                    "Indentation of {width} columns at line {line} is not a multiple of the base width {base}."),
            Self::InconsistentDedent { line, width } => write!(f,
                                                               "Indentation error at line {line}: width {width} matches no enclosing block."),
        }
    }
}

impl std::error::Error for LexError {}

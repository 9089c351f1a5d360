#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during evaluation.
///
/// A runtime error unwinds the evaluator to the top level and stops the
/// program; further statements do not execute. Every variant carries the
/// source line of the node that raised it.
pub enum RuntimeError {
    /// Tried to read a variable that is not bound anywhere in scope.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Called a function that is neither built in nor user defined.
    UndefinedFunction {
        /// The name of the function.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An operation was applied to values of incompatible types.
    TypeMismatch {
        /// Details about the mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Matrix operands had incompatible shapes.
    DimensionMismatch {
        /// Details about the shapes involved.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Attempted division by zero.
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Attempted modulo by zero.
    ModuloByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to invert a matrix whose pivot vanished during elimination.
    SingularMatrix {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A row index fell outside the matrix.
    IndexOutOfBounds {
        /// Number of rows in the indexed matrix.
        rows:  usize,
        /// The requested row index.
        found: i64,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The iterable of a `for` loop did not evaluate to a matrix.
    NotIterable {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Accessed a member that the value does not provide.
    UnknownMember {
        /// The requested member name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A function received the wrong number of arguments.
    ArityMismatch {
        /// The name of the function.
        name:     String,
        /// The number of arguments the function accepts, as a phrase.
        expected: String,
        /// The number of arguments actually supplied.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// An argument had the right type but an unusable value.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Integer arithmetic overflowed 64 bits.
    Overflow {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Writing to the output sink failed.
    Io {
        /// The underlying I/O error message.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A node kind appeared in a position the evaluator cannot handle.
    Unsupported {
        /// Details about the unexpected construct.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl RuntimeError {
    /// Returns the source line the error was raised at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::UndefinedVariable { line, .. }
            | Self::UndefinedFunction { line, .. }
            | Self::TypeMismatch { line, .. }
            | Self::DimensionMismatch { line, .. }
            | Self::DivisionByZero { line }
            | Self::ModuloByZero { line }
            | Self::SingularMatrix { line }
            | Self::IndexOutOfBounds { line, .. }
            | Self::NotIterable { line }
            | Self::UnknownMember { line, .. }
            | Self::ArityMismatch { line, .. }
            | Self::InvalidArgument { line, .. }
            | Self::Overflow { line }
            | Self::Io { line, .. }
            | Self::Unsupported { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Runtime Error at line {}: ", self.line())?;
        match self {
            Self::UndefinedVariable { name, .. } => write!(f, "Undefined variable '{name}'"),
            Self::UndefinedFunction { name, .. } => write!(f, "Undefined function '{name}'"),
            Self::TypeMismatch { details, .. } => write!(f, "{details}"),
            Self::DimensionMismatch { details, .. } => write!(f, "{details}"),
            Self::DivisionByZero { .. } => write!(f, "Division by zero"),
            Self::ModuloByZero { .. } => write!(f, "Modulo by zero"),
            Self::SingularMatrix { .. } => write!(f, "Matrix is singular (not invertible)"),
            Self::IndexOutOfBounds { rows, found, .. } => write!(f,
                                                                 "Matrix index out of bounds: row {found} of a matrix with {rows} row(s)"),
            Self::NotIterable { .. } => write!(f, "For loop iterable must be a matrix"),
            Self::UnknownMember { name, .. } => {
                write!(f, "Unknown member '{name}' for this type")
            },
            Self::ArityMismatch { name,
                                  expected,
                                  found,
                                  .. } => {
                write!(f, "Function '{name}' expects {expected} argument(s), got {found}")
            },
            Self::InvalidArgument { details, .. } => write!(f, "{details}"),
            Self::Overflow { .. } => {
                write!(f, "Integer overflow while trying to compute result")
            },
            Self::Io { details, .. } => write!(f, "Output failed: {details}"),
            Self::Unsupported { details, .. } => write!(f, "{details}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

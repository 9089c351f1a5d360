/// Block parsing driven by INDENT/DEDENT tokens.
pub mod block;
/// The parser type, token cursor, diagnostics and synchronization.
pub mod core;
/// Expression parsing by precedence climbing, plus postfix tails.
pub mod expression;
/// The matrix-literal sub-parser.
pub mod matrix;
/// Statement dispatch and the individual statement parsers.
pub mod statement;

pub use self::core::Parser;

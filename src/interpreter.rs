/// Contiguous AST node storage addressed by 32-bit indices.
///
/// The arena owns every node the parser creates. Tree edges are
/// `first_child`/`next_sibling` index chains, which keeps the AST copyable
/// and cache-friendly and avoids aliasing between nodes.
pub mod arena;
/// Walks the AST and executes it.
///
/// The evaluator carries the environment chain for lexical scoping, the
/// user-function registry, the builtin dispatch table and the value
/// operations, including the linear-algebra kernels.
pub mod evaluator;
/// Converts source text into tokens.
///
/// The lexer honors the off-side rule: it measures leading whitespace,
/// validates the program's indentation style and emits synthetic
/// INDENT/DEDENT/NEWLINE tokens that the parser consumes like any other
/// delimiter.
pub mod lexer;
/// Builds the AST from the token stream.
///
/// Statements parse by recursive descent, expressions by precedence
/// climbing, and blocks are driven by the lexer's INDENT/DEDENT tokens.
/// Errors are collected as diagnostics with best-effort recovery.
pub mod parser;
/// Deduplicated-append string storage for names and literals.
pub mod string_table;
/// The polymorphic runtime value and the dense matrix type.
pub mod value;

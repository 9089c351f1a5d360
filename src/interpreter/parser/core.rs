use crate::{
    ast::{INVALID_INDEX, NodeData},
    error::ParseDiagnostic,
    interpreter::{
        arena::NodeArena,
        lexer::{Token, TokenKind},
        string_table::StringTable,
    },
};

/// Index of the root PROGRAM node; the parser creates it first.
pub const ROOT_NODE: u32 = 0;

/// Recursive-descent parser over a token stream.
///
/// The parser owns the AST arena and the string table it fills. Errors never
/// propagate as `Result`s through the descent: each one is recorded as a
/// [`ParseDiagnostic`] and the offending statement is skipped by
/// synchronizing to the next statement boundary, so a single run surfaces as
/// many independent problems as possible. Callers check [`Parser::has_errors`]
/// after [`Parser::parse`].
///
/// ## Example
/// ```
/// use dakota::interpreter::{lexer::Lexer, parser::Parser};
///
/// let tokens = Lexer::new("x = 1 + 2\n").tokenize().unwrap();
/// let mut parser = Parser::new(tokens);
/// parser.parse();
///
/// assert!(!parser.has_errors());
/// ```
pub struct Parser {
    tokens:  Vec<Token>,
    cursor:  usize,
    eof:     Token,
    arena:   NodeArena,
    strings: StringTable,

    diagnostics: Vec<ParseDiagnostic>,
    /// Set when the statement currently being parsed has failed.
    pub(crate) statement_failed: bool,
}

impl Parser {
    /// Creates a parser over a token stream and seeds the root PROGRAM node.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens.last()
                        .map_or(Token { kind:   TokenKind::Eof,
                                        lexeme: String::new(),
                                        line:   1,
                                        column: 1, },
                                |last| Token { kind:   TokenKind::Eof,
                                               lexeme: String::new(),
                                               line:   last.line,
                                               column: last.column, });

        let mut arena = NodeArena::new();
        arena.create(NodeData::Program { statements_start: INVALID_INDEX,
                                         statement_count:  0, },
                     0);

        Self { tokens,
               cursor: 0,
               eof,
               arena,
               strings: StringTable::new(),
               diagnostics: Vec::new(),
               statement_failed: false }
    }

    /// Parses the whole token stream into the arena.
    ///
    /// Returns the root node index. Statements that fail to parse are
    /// recorded as diagnostics and skipped; parsing always runs to the end
    /// of the stream.
    pub fn parse(&mut self) -> u32 {
        while !self.at_end() {
            if self.eat(TokenKind::Newline) {
                continue;
            }

            let start = self.cursor;
            self.statement_failed = false;
            self.parse_statement();

            // A statement that consumed nothing would loop forever.
            if self.cursor == start && !self.at_end() {
                self.error_at_current("Unexpected token in program");
                self.advance();
            }

            if self.statement_failed {
                self.synchronize();
            }
        }

        self.finalize_program();
        self.arena.shrink_to_fit();
        self.strings.shrink_to_fit();
        ROOT_NODE
    }

    /// Records the top-level statement chain in the root payload.
    #[allow(clippy::cast_possible_truncation)]
    fn finalize_program(&mut self) {
        let first = self.arena[ROOT_NODE].first_child;
        let count = self.arena.children(ROOT_NODE).count() as u32;

        self.arena[ROOT_NODE].data = NodeData::Program { statements_start: first,
                                                         statement_count:  count, };
    }

    /// The token under the cursor; EOF once the stream is exhausted.
    #[must_use]
    pub(crate) fn current(&self) -> &Token {
        self.tokens.get(self.cursor).unwrap_or(&self.eof)
    }

    /// Looks `offset` tokens past the cursor.
    #[must_use]
    pub(crate) fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.cursor + offset).unwrap_or(&self.eof)
    }

    /// Returns `true` once every meaningful token has been consumed.
    #[must_use]
    pub(crate) fn at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    /// Moves the cursor past the current token.
    pub(crate) fn advance(&mut self) {
        if !self.at_end() {
            self.cursor += 1;
        }
    }

    /// Tests the current token kind without consuming it.
    #[must_use]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consumes the current token when it matches `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Consumes the current token when it matches `kind`, otherwise records
    /// a diagnostic at the current position.
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error_at_current(message);
        false
    }

    /// The cursor as a 32-bit token index for node creation.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub(crate) fn cursor_index(&self) -> u32 {
        self.cursor as u32
    }

    /// Creates a node at the current token.
    pub(crate) fn create_node(&mut self, data: NodeData) -> u32 {
        let token_index = self.cursor_index();
        self.arena.create(data, token_index)
    }

    /// Creates a node at an explicit token index.
    pub(crate) fn create_node_at(&mut self, data: NodeData, token_index: u32) -> u32 {
        self.arena.create(data, token_index)
    }

    /// Links `child` under `parent`, reporting a diagnostic when the arena
    /// refuses the link.
    pub(crate) fn link(&mut self, parent: u32, child: u32) {
        if !self.arena.add_child(parent, child) {
            self.error_at_current("Internal error: AST sibling chain is cyclic");
        }
    }

    /// Attaches a completed statement to the root.
    ///
    /// Block parsing later re-parents statements that belong to a block; see
    /// `parse_block`.
    pub(crate) fn attach_to_root(&mut self, statement: u32) {
        self.link(ROOT_NODE, statement);
    }

    /// Interns a string and returns its handle.
    pub(crate) fn intern(&mut self, value: &str) -> u32 {
        self.strings.add(value)
    }

    /// Records a diagnostic at the current token and marks the statement as
    /// failed.
    pub(crate) fn error_at_current(&mut self, message: impl Into<String>) {
        let token = self.current().clone();
        self.diagnostics.push(ParseDiagnostic::new(message,
                                                   token.line,
                                                   token.column,
                                                   self.cursor));
        self.statement_failed = true;
    }

    /// Skips tokens until the next statement boundary.
    ///
    /// A newline is consumed; a statement-start keyword, a dedent or the end
    /// of input is left in place for the next statement parse.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            match self.current().kind {
                TokenKind::Newline => {
                    self.advance();
                    return;
                },
                TokenKind::Dedent
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Function
                | TokenKind::Return => return,
                _ => self.advance(),
            }
        }
    }

    /// Returns `true` when any diagnostic has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// The diagnostics recorded so far, in source order.
    #[must_use]
    pub fn diagnostics(&self) -> &[ParseDiagnostic] {
        &self.diagnostics
    }

    /// The parsed node arena.
    #[must_use]
    pub const fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Mutable access to the arena for the parsing modules.
    pub(crate) fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    /// The interned string table.
    #[must_use]
    pub const fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// The token stream the parser was built over.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of nodes created so far, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Bytes held by the arena and the string table together.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage() + self.strings.memory_usage()
    }

    /// Renders the AST as an indented tree, one node per line.
    #[must_use]
    pub fn ast_string(&self) -> String {
        let mut out = String::new();
        self.write_node(ROOT_NODE, 0, &mut out);
        out
    }

    fn write_node(&self, index: u32, depth: usize, out: &mut String) {
        use std::fmt::Write;

        let Some(node) = self.arena.get(index) else {
            return;
        };

        for _ in 0..depth {
            out.push_str("  ");
        }

        let _ = match &node.data {
            NodeData::Program { statement_count, .. } => {
                writeln!(out, "PROGRAM ({statement_count} statements)")
            },
            NodeData::Block { statement_count, .. } => {
                writeln!(out, "BLOCK ({statement_count} statements)")
            },
            NodeData::ExpressionStatement { .. } => writeln!(out, "EXPRESSION_STATEMENT"),
            NodeData::IntegerLiteral { value } => writeln!(out, "INTEGER: {value}"),
            NodeData::FloatLiteral { value } => writeln!(out, "FLOAT: {value}"),
            NodeData::StringLiteral { string, .. } => {
                writeln!(out, "STRING: \"{}\"", self.strings.get(*string))
            },
            NodeData::BooleanLiteral { value } => writeln!(out, "BOOLEAN: {value}"),
            NodeData::Identifier { name } => {
                writeln!(out, "IDENTIFIER: {}", self.strings.get(*name))
            },
            NodeData::BinaryOp { op, .. } => writeln!(out, "BINARY_OP: {op}"),
            NodeData::UnaryOp { op, .. } => writeln!(out, "UNARY_OP: {op:?}"),
            NodeData::Assignment { .. } => writeln!(out, "ASSIGNMENT"),
            NodeData::MatrixLiteral { rows, cols, .. } => {
                writeln!(out, "MATRIX: {rows}x{cols}")
            },
            NodeData::ArrayAccess { .. } => writeln!(out, "ARRAY_ACCESS"),
            NodeData::MemberAccess { member_name, .. } => {
                writeln!(out, "MEMBER_ACCESS: {}", self.strings.get(*member_name))
            },
            NodeData::IfStatement { .. } => writeln!(out, "IF_STATEMENT"),
            NodeData::WhileStatement { .. } => writeln!(out, "WHILE_STATEMENT"),
            NodeData::ForStatement { .. } => writeln!(out, "FOR_STATEMENT"),
            NodeData::FunctionDef { name, param_count, .. } => {
                writeln!(out,
                         "FUNCTION_DEF: {} ({param_count} parameters)",
                         self.strings.get(*name))
            },
            NodeData::FunctionCall { name, arg_count, .. } => {
                writeln!(out,
                         "FUNCTION_CALL: {} ({arg_count} arguments)",
                         self.strings.get(*name))
            },
            NodeData::ReturnStatement { .. } => writeln!(out, "RETURN_STATEMENT"),
        };

        for child in self.arena.children(index) {
            self.write_node(child, depth + 1, out);
        }
    }
}

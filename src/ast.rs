//! Flat AST node definitions.
//!
//! Nodes live in a contiguous arena and refer to each other through 32-bit
//! indices instead of pointers. Tree edges are `first_child`/`next_sibling`
//! chains; ordered sequences (block statements, call arguments, matrix
//! elements, parameters) are sibling lists rooted at a `*_start` index plus a
//! count.

/// Sentinel index meaning "no node".
///
/// Index 0 is the root [`NodeKind::Program`] node and therefore a legitimate
/// index everywhere else, so the maximum value is used as the single sentinel
/// throughout the crate.
pub const INVALID_INDEX: u32 = u32::MAX;

/// Discriminates the payload carried by a [`Node`].
///
/// Obtained from [`Node::kind`]; useful for fast dispatch without matching on
/// the full payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The root node holding all top-level statements.
    Program,
    /// An indented statement list introduced by `:`.
    Block,
    /// An expression evaluated for effect, result discarded.
    ExpressionStatement,
    /// A 64-bit integer literal.
    IntegerLiteral,
    /// A 64-bit floating-point literal.
    FloatLiteral,
    /// A double-quoted string literal.
    StringLiteral,
    /// `true` or `false`.
    BooleanLiteral,
    /// A variable reference.
    Identifier,
    /// A binary operation.
    BinaryOp,
    /// A unary operation.
    UnaryOp,
    /// `name = expression`.
    Assignment,
    /// `[a, b; c, d]`.
    MatrixLiteral,
    /// `object[index]`, selecting a matrix row.
    ArrayAccess,
    /// `object.member`.
    MemberAccess,
    /// `if`/`else`.
    IfStatement,
    /// `while`.
    WhileStatement,
    /// `for variable in iterable`.
    ForStatement,
    /// `function name(params):`.
    FunctionDef,
    /// `name(args)`.
    FunctionCall,
    /// `return` with an optional value.
    ReturnStatement,
}

/// A binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Exponentiation (`**`)
    Pow,
    /// Modulo (`%`)
    Mod,
    /// Matrix multiplication (`mult`)
    MatMul,
    /// Equal to (`==`)
    Eq,
    /// Not equal to (`!=`)
    Ne,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Le,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Ge,
    /// Logical and (`and`)
    And,
    /// Logical or (`or`)
    Or,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "**",
            Self::Mod => "%",
            Self::MatMul => "mult",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "and",
            Self::Or => "or",
        };
        write!(f, "{operator}")
    }
}

/// A unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation (`-x`).
    Negate,
    /// Logical inversion (`not x`).
    Not,
}

/// Validation state recorded on a matrix literal while parsing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MatrixError {
    /// The literal is rectangular.
    #[default]
    None,
    /// At least one row has a different length than the first row.
    IrregularRows,
}

/// Per-kind payload of a [`Node`].
///
/// All sub-node references are arena indices; [`INVALID_INDEX`] marks an
/// absent optional part (for example a missing `else` branch).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Top-level statement list.
    Program {
        /// First statement in the sibling chain.
        statements_start: u32,
        /// Number of statements in the chain.
        statement_count:  u32,
    },
    /// Indented statement list.
    Block {
        /// First statement in the sibling chain.
        statements_start: u32,
        /// Number of statements in the chain.
        statement_count:  u32,
    },
    /// Expression evaluated for effect.
    ExpressionStatement {
        /// The wrapped expression.
        expression: u32,
    },
    /// Integer literal with its decoded value.
    IntegerLiteral {
        /// The literal value.
        value: i64,
    },
    /// Float literal with its decoded value.
    FloatLiteral {
        /// The literal value.
        value: f64,
    },
    /// String literal stored in the string table.
    StringLiteral {
        /// Handle into the string table.
        string: u32,
        /// Length of the decoded string in bytes.
        length: u32,
    },
    /// Boolean literal.
    BooleanLiteral {
        /// The literal value.
        value: bool,
    },
    /// Variable reference.
    Identifier {
        /// Handle of the name in the string table.
        name: u32,
    },
    /// Binary operation over two sub-expressions.
    BinaryOp {
        /// The operator.
        op:    BinaryOp,
        /// Left operand index.
        left:  u32,
        /// Right operand index.
        right: u32,
    },
    /// Unary operation over one sub-expression.
    UnaryOp {
        /// The operator.
        op:      UnaryOp,
        /// Operand index.
        operand: u32,
    },
    /// Assignment of a value to an identifier target.
    Assignment {
        /// Target index; always resolves to an identifier node.
        target: u32,
        /// Value expression index.
        value:  u32,
    },
    /// Matrix literal with row-major element chain.
    MatrixLiteral {
        /// Number of rows.
        rows:             u32,
        /// Number of columns.
        cols:             u32,
        /// First element in the sibling chain, row-major.
        elements_start:   u32,
        /// Set for `[]`.
        is_empty:         bool,
        /// Validation state recorded during parsing.
        validation_error: MatrixError,
    },
    /// Row selection `object[index]`.
    ArrayAccess {
        /// The indexed expression.
        object: u32,
        /// The index expression.
        index:  u32,
    },
    /// Member selection `object.member`.
    MemberAccess {
        /// The accessed expression.
        object:      u32,
        /// Handle of the member name in the string table.
        member_name: u32,
    },
    /// Conditional statement.
    IfStatement {
        /// Condition expression index.
        condition:  u32,
        /// Block executed when the condition is truthy.
        then_block: u32,
        /// Optional else arm; [`INVALID_INDEX`] when absent. An `elif` arm
        /// desugars to an else arm holding a nested if-statement.
        else_block: u32,
    },
    /// Pre-checked loop.
    WhileStatement {
        /// Condition expression index.
        condition: u32,
        /// Loop body block index.
        body:      u32,
    },
    /// Row iteration loop.
    ForStatement {
        /// Loop variable identifier node.
        variable: u32,
        /// Iterable expression index.
        iterable: u32,
        /// Loop body block index.
        body:     u32,
    },
    /// Function definition.
    FunctionDef {
        /// Handle of the function name in the string table.
        name:         u32,
        /// First parameter identifier in the sibling chain.
        params_start: u32,
        /// Number of parameters.
        param_count:  u32,
        /// Body block index.
        body:         u32,
    },
    /// Function invocation.
    FunctionCall {
        /// Handle of the function name in the string table.
        name:       u32,
        /// First argument in the sibling chain.
        args_start: u32,
        /// Number of arguments.
        arg_count:  u32,
    },
    /// Early return from the enclosing function.
    ReturnStatement {
        /// Optional value expression; [`INVALID_INDEX`] for a bare `return`.
        value: u32,
    },
}

/// A fixed-size AST record stored in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Index of the token this node was created at, for error positions.
    pub token_index:  u32,
    /// Parent node, or [`INVALID_INDEX`] for a detached node and the root.
    pub parent:       u32,
    /// First child in the sibling chain, or [`INVALID_INDEX`].
    pub first_child:  u32,
    /// Next sibling, or [`INVALID_INDEX`].
    pub next_sibling: u32,
    /// Per-kind payload.
    pub data:         NodeData,
}

impl Node {
    /// Creates a detached node with the given payload.
    #[must_use]
    pub const fn new(data: NodeData, token_index: u32) -> Self {
        Self { token_index,
               parent: INVALID_INDEX,
               first_child: INVALID_INDEX,
               next_sibling: INVALID_INDEX,
               data }
    }

    /// Returns the kind discriminant of this node's payload.
    ///
    /// ## Example
    /// ```
    /// use dakota::ast::{Node, NodeData, NodeKind};
    ///
    /// let node = Node::new(NodeData::IntegerLiteral { value: 42 }, 0);
    /// assert_eq!(node.kind(), NodeKind::IntegerLiteral);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Program { .. } => NodeKind::Program,
            NodeData::Block { .. } => NodeKind::Block,
            NodeData::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NodeData::IntegerLiteral { .. } => NodeKind::IntegerLiteral,
            NodeData::FloatLiteral { .. } => NodeKind::FloatLiteral,
            NodeData::StringLiteral { .. } => NodeKind::StringLiteral,
            NodeData::BooleanLiteral { .. } => NodeKind::BooleanLiteral,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::BinaryOp { .. } => NodeKind::BinaryOp,
            NodeData::UnaryOp { .. } => NodeKind::UnaryOp,
            NodeData::Assignment { .. } => NodeKind::Assignment,
            NodeData::MatrixLiteral { .. } => NodeKind::MatrixLiteral,
            NodeData::ArrayAccess { .. } => NodeKind::ArrayAccess,
            NodeData::MemberAccess { .. } => NodeKind::MemberAccess,
            NodeData::IfStatement { .. } => NodeKind::IfStatement,
            NodeData::WhileStatement { .. } => NodeKind::WhileStatement,
            NodeData::ForStatement { .. } => NodeKind::ForStatement,
            NodeData::FunctionDef { .. } => NodeKind::FunctionDef,
            NodeData::FunctionCall { .. } => NodeKind::FunctionCall,
            NodeData::ReturnStatement { .. } => NodeKind::ReturnStatement,
        }
    }
}

use crate::{
    ast::{BinaryOp, INVALID_INDEX, NodeData, UnaryOp},
    interpreter::{lexer::TokenKind, parser::Parser},
};

/// One row of the operator precedence table.
struct OperatorInfo {
    op:                BinaryOp,
    precedence:        u8,
    right_associative: bool,
}

/// The binary operator precedence table.
///
/// Precedence climbs from `or` at 1 to `**` at 7; only `**` is
/// right-associative.
static OPERATOR_TABLE: &[OperatorInfo] = &[
    OperatorInfo { op: BinaryOp::Or, precedence: 1, right_associative: false },
    OperatorInfo { op: BinaryOp::And, precedence: 2, right_associative: false },
    OperatorInfo { op: BinaryOp::Eq, precedence: 3, right_associative: false },
    OperatorInfo { op: BinaryOp::Ne, precedence: 3, right_associative: false },
    OperatorInfo { op: BinaryOp::Lt, precedence: 4, right_associative: false },
    OperatorInfo { op: BinaryOp::Le, precedence: 4, right_associative: false },
    OperatorInfo { op: BinaryOp::Gt, precedence: 4, right_associative: false },
    OperatorInfo { op: BinaryOp::Ge, precedence: 4, right_associative: false },
    OperatorInfo { op: BinaryOp::Add, precedence: 5, right_associative: false },
    OperatorInfo { op: BinaryOp::Sub, precedence: 5, right_associative: false },
    OperatorInfo { op: BinaryOp::Mul, precedence: 6, right_associative: false },
    OperatorInfo { op: BinaryOp::Div, precedence: 6, right_associative: false },
    OperatorInfo { op: BinaryOp::Mod, precedence: 6, right_associative: false },
    OperatorInfo { op: BinaryOp::MatMul, precedence: 6, right_associative: false },
    OperatorInfo { op: BinaryOp::Pow, precedence: 7, right_associative: true },
];

/// Maps a token to its binary operator, when it is one.
#[must_use]
pub const fn binary_op_of(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Power => Some(BinaryOp::Pow),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::Matmul => Some(BinaryOp::MatMul),
        TokenKind::EqualEqual => Some(BinaryOp::Eq),
        TokenKind::NotEqual => Some(BinaryOp::Ne),
        TokenKind::Less => Some(BinaryOp::Lt),
        TokenKind::LessEqual => Some(BinaryOp::Le),
        TokenKind::Greater => Some(BinaryOp::Gt),
        TokenKind::GreaterEqual => Some(BinaryOp::Ge),
        TokenKind::And => Some(BinaryOp::And),
        TokenKind::Or => Some(BinaryOp::Or),
        _ => None,
    }
}

/// Looks up the table row for an operator.
fn operator_info(op: BinaryOp) -> &'static OperatorInfo {
    OPERATOR_TABLE.iter()
                  .find(|info| info.op == op)
                  .unwrap_or(&OPERATOR_TABLE[0])
}

impl Parser {
    /// Parses a full expression, starting at minimum precedence 0.
    pub(crate) fn parse_expression(&mut self) -> Option<u32> {
        self.parse_binary_expression(0)
    }

    /// Precedence-climbing binary expression parser.
    ///
    /// Consumes operators whose precedence is at least `min_precedence`. A
    /// left-associative operator parses its right operand one level higher;
    /// the right-associative `**` re-enters at its own level.
    fn parse_binary_expression(&mut self, min_precedence: u8) -> Option<u32> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let Some(op) = binary_op_of(self.current().kind) else {
                break;
            };
            let info = operator_info(op);
            if info.precedence < min_precedence {
                break;
            }

            let token_index = self.cursor_index();
            self.advance();

            let next_min = if info.right_associative {
                info.precedence
            } else {
                info.precedence + 1
            };
            let right = self.parse_binary_expression(next_min)?;

            let node = self.create_node_at(NodeData::BinaryOp { op, left, right }, token_index);
            self.link(node, left);
            self.link(node, right);
            left = node;
        }

        Some(left)
    }

    /// Parses unary `-` and `not`, which bind tighter than any binary
    /// operator.
    fn parse_unary_expression(&mut self) -> Option<u32> {
        let op = match self.current().kind {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_primary(),
        };

        let token_index = self.cursor_index();
        self.advance();

        let operand = self.parse_unary_expression()?;
        let node = self.create_node_at(NodeData::UnaryOp { op, operand }, token_index);
        self.link(node, operand);
        Some(node)
    }

    /// Parses a primary expression: a literal, a parenthesized expression, a
    /// matrix literal, or an identifier with an optional call and postfix
    /// tail.
    fn parse_primary(&mut self) -> Option<u32> {
        match self.current().kind {
            TokenKind::Integer => {
                let Ok(value) = self.current().lexeme.parse::<i64>() else {
                    self.error_at_current("Integer literal is too large");
                    return None;
                };
                let node = self.create_node(NodeData::IntegerLiteral { value });
                self.advance();
                Some(node)
            },
            TokenKind::Float => {
                let Ok(value) = self.current().lexeme.parse::<f64>() else {
                    self.error_at_current("Malformed float literal");
                    return None;
                };
                let node = self.create_node(NodeData::FloatLiteral { value });
                self.advance();
                Some(node)
            },
            TokenKind::Str => {
                let text = self.current().lexeme.clone();
                let handle = self.intern(&text);
                #[allow(clippy::cast_possible_truncation)]
                let node = self.create_node(NodeData::StringLiteral { string: handle,
                                                                      length: text.len() as u32, });
                self.advance();
                Some(node)
            },
            TokenKind::Boolean => {
                let value = self.current().lexeme == "true";
                let node = self.create_node(NodeData::BooleanLiteral { value });
                self.advance();
                Some(node)
            },
            TokenKind::LBracket => self.parse_matrix_literal(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                if !self.expect(TokenKind::RParen, "Expected ')' after expression") {
                    return None;
                }
                Some(inner)
            },
            TokenKind::Identifier => self.parse_identifier_expression(),
            TokenKind::Invalid => {
                let lexeme = self.current().lexeme.clone();
                self.error_at_current(format!("Unexpected character '{lexeme}'"));
                None
            },
            _ => {
                self.error_at_current("Expected expression");
                None
            },
        }
    }

    /// Parses an identifier head: a variable reference or a function call,
    /// either followed by a postfix tail.
    #[allow(clippy::cast_possible_truncation)]
    fn parse_identifier_expression(&mut self) -> Option<u32> {
        let token_index = self.cursor_index();
        let name = self.current().lexeme.clone();
        self.advance();

        let handle = self.intern(&name);

        if !self.check(TokenKind::LParen) {
            let node = self.create_node_at(NodeData::Identifier { name: handle }, token_index);
            return self.parse_postfix(node);
        }

        self.advance(); // '('

        let mut args = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                let arg = self.parse_expression()?;
                args.push(arg);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        if !self.expect(TokenKind::RParen, "Expected ')' after function arguments") {
            return None;
        }

        let node = self.create_node_at(NodeData::FunctionCall { name:       handle,
                                                                args_start:
                                                                    args.first().copied()
                                                                        .unwrap_or(INVALID_INDEX),
                                                                arg_count:  args.len() as u32, },
                                       token_index);
        for arg in args {
            self.link(node, arg);
        }

        self.parse_postfix(node)
    }

    /// Parses zero or more postfix tails: `[index]` row selection and
    /// `.member` access.
    fn parse_postfix(&mut self, mut node: u32) -> Option<u32> {
        loop {
            if self.check(TokenKind::LBracket) {
                let token_index = self.cursor_index();
                self.advance();

                let index = self.parse_expression()?;
                if !self.expect(TokenKind::RBracket, "Expected ']' after array index") {
                    return None;
                }

                let access =
                    self.create_node_at(NodeData::ArrayAccess { object: node, index }, token_index);
                self.link(access, node);
                self.link(access, index);
                node = access;
            } else if self.check(TokenKind::Dot) {
                let token_index = self.cursor_index();
                self.advance();

                if !self.check(TokenKind::Identifier) {
                    self.error_at_current("Expected member name after '.'");
                    return None;
                }
                let member = self.current().lexeme.clone();
                self.advance();

                let member_name = self.intern(&member);
                let access = self.create_node_at(NodeData::MemberAccess { object: node,
                                                                          member_name },
                                                 token_index);
                self.link(access, node);
                node = access;
            } else {
                return Some(node);
            }
        }
    }
}

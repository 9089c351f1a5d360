use crate::{
    ast::{INVALID_INDEX, NodeData},
    interpreter::{lexer::TokenKind, parser::Parser},
};

impl Parser {
    /// Parses one statement and attaches it to the root.
    ///
    /// The token under the cursor decides the statement form:
    /// `function`, `if`, `while`, `for` and `return` start their respective
    /// statements; an identifier followed by `=` is an assignment; anything
    /// else is an expression statement.
    ///
    /// Completed statements attach to the root PROGRAM node. When a
    /// statement actually belongs to a block, `parse_block` re-parents it
    /// afterwards.
    pub(crate) fn parse_statement(&mut self) {
        while self.eat(TokenKind::Newline) {}

        if self.at_end() {
            return;
        }

        match self.current().kind {
            TokenKind::Function => self.parse_function_definition(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Identifier if self.peek(1).kind == TokenKind::Assign => {
                self.parse_assignment();
            },
            _ => self.parse_expression_statement(),
        }
    }

    /// Parses `IDENT '=' expression`.
    ///
    /// The target is a freshly created identifier node, separate from any
    /// identifier the value expression may contain.
    fn parse_assignment(&mut self) {
        let token_index = self.cursor_index();
        let name = self.current().lexeme.clone();
        self.advance();
        self.advance(); // the '=' checked by the dispatcher

        let assign = self.create_node_at(NodeData::Assignment { target: INVALID_INDEX,
                                                                value:  INVALID_INDEX, },
                                         token_index);

        let handle = self.intern(&name);
        let target = self.create_node_at(NodeData::Identifier { name: handle }, token_index);

        let Some(value) = self.parse_expression() else {
            return;
        };

        self.arena_mut()[assign].data = NodeData::Assignment { target, value };
        self.link(assign, target);
        self.link(assign, value);
        self.attach_to_root(assign);
    }

    /// Parses an expression evaluated for effect.
    fn parse_expression_statement(&mut self) {
        let statement = self.create_node(NodeData::ExpressionStatement { expression:
                                                                             INVALID_INDEX, });

        let Some(expression) = self.parse_expression() else {
            return;
        };

        self.arena_mut()[statement].data = NodeData::ExpressionStatement { expression };
        self.link(statement, expression);
        self.attach_to_root(statement);
    }

    /// Parses an `if` statement with optional `elif` arms and `else`.
    fn parse_if_statement(&mut self) {
        if let Some(node) = self.parse_if_chain() {
            self.attach_to_root(node);
        }
    }

    /// Parses one `if`/`elif` arm and its continuation.
    ///
    /// An `elif` arm desugars to an `else` arm holding a single nested
    /// if-statement, so the evaluator only ever sees plain `if`/`else`.
    fn parse_if_chain(&mut self) -> Option<u32> {
        let token_index = self.cursor_index();
        self.advance(); // the 'if' or 'elif' keyword

        let node = self.create_node_at(NodeData::IfStatement { condition:  INVALID_INDEX,
                                                               then_block: INVALID_INDEX,
                                                               else_block: INVALID_INDEX, },
                                       token_index);

        let condition = self.parse_expression()?;
        if !self.expect(TokenKind::Colon, "Expected ':' after if condition") {
            return None;
        }
        let then_block = self.parse_block()?;

        let else_block = if self.check(TokenKind::Elif) {
            self.parse_if_chain()?
        } else if self.eat(TokenKind::Else) {
            if !self.expect(TokenKind::Colon, "Expected ':' after else") {
                return None;
            }
            self.parse_block()?
        } else {
            INVALID_INDEX
        };

        self.arena_mut()[node].data = NodeData::IfStatement { condition,
                                                              then_block,
                                                              else_block };
        self.link(node, condition);
        self.link(node, then_block);
        if else_block != INVALID_INDEX {
            self.link(node, else_block);
        }
        Some(node)
    }

    /// Parses `while condition : block`.
    fn parse_while_statement(&mut self) {
        let token_index = self.cursor_index();
        self.advance(); // 'while'

        let node = self.create_node_at(NodeData::WhileStatement { condition: INVALID_INDEX,
                                                                  body:      INVALID_INDEX, },
                                       token_index);

        let Some(condition) = self.parse_expression() else {
            return;
        };
        if !self.expect(TokenKind::Colon, "Expected ':' after while condition") {
            return;
        }
        let Some(body) = self.parse_block() else {
            return;
        };

        self.arena_mut()[node].data = NodeData::WhileStatement { condition, body };
        self.link(node, condition);
        self.link(node, body);
        self.attach_to_root(node);
    }

    /// Parses `for IDENT in iterable : block`.
    fn parse_for_statement(&mut self) {
        let token_index = self.cursor_index();
        self.advance(); // 'for'

        let node = self.create_node_at(NodeData::ForStatement { variable: INVALID_INDEX,
                                                                iterable: INVALID_INDEX,
                                                                body:     INVALID_INDEX, },
                                       token_index);

        if !self.check(TokenKind::Identifier) {
            self.error_at_current("Expected loop variable in for statement");
            return;
        }
        let var_token = self.cursor_index();
        let var_name = self.current().lexeme.clone();
        self.advance();

        if !self.expect(TokenKind::In, "Expected 'in' after for loop variable") {
            return;
        }

        let handle = self.intern(&var_name);
        let variable = self.create_node_at(NodeData::Identifier { name: handle }, var_token);

        let Some(iterable) = self.parse_expression() else {
            return;
        };
        if !self.expect(TokenKind::Colon, "Expected ':' after for loop iterable") {
            return;
        }
        let Some(body) = self.parse_block() else {
            return;
        };

        self.arena_mut()[node].data = NodeData::ForStatement { variable,
                                                               iterable,
                                                               body };
        self.link(node, variable);
        self.link(node, iterable);
        self.link(node, body);
        self.attach_to_root(node);
    }

    /// Parses `function IDENT ( params? ) : block`.
    #[allow(clippy::cast_possible_truncation)]
    fn parse_function_definition(&mut self) {
        let token_index = self.cursor_index();
        self.advance(); // 'function'

        if !self.check(TokenKind::Identifier) {
            self.error_at_current("Expected function name");
            return;
        }
        let name = self.current().lexeme.clone();
        self.advance();

        let handle = self.intern(&name);
        let node = self.create_node_at(NodeData::FunctionDef { name:         handle,
                                                               params_start: INVALID_INDEX,
                                                               param_count:  0,
                                                               body:         INVALID_INDEX, },
                                       token_index);

        if !self.expect(TokenKind::LParen, "Expected '(' after function name") {
            return;
        }

        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                if !self.check(TokenKind::Identifier) {
                    self.error_at_current("Expected parameter name");
                    return;
                }
                let param_token = self.cursor_index();
                let param_name = self.current().lexeme.clone();
                self.advance();

                let param_handle = self.intern(&param_name);
                let param =
                    self.create_node_at(NodeData::Identifier { name: param_handle }, param_token);
                params.push(param);

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        if !self.expect(TokenKind::RParen, "Expected ')' after parameters") {
            return;
        }
        if !self.expect(TokenKind::Colon, "Expected ':' after function signature") {
            return;
        }

        let Some(body) = self.parse_block() else {
            return;
        };

        self.arena_mut()[node].data =
            NodeData::FunctionDef { name:         handle,
                                    params_start: params.first().copied()
                                                        .unwrap_or(INVALID_INDEX),
                                    param_count:  params.len() as u32,
                                    body };
        for param in params {
            self.link(node, param);
        }
        self.link(node, body);
        self.attach_to_root(node);
    }

    /// Parses `return` with an optional value expression.
    fn parse_return_statement(&mut self) {
        let token_index = self.cursor_index();
        self.advance(); // 'return'

        let node =
            self.create_node_at(NodeData::ReturnStatement { value: INVALID_INDEX }, token_index);

        if !self.check(TokenKind::Newline) && !self.check(TokenKind::Dedent) && !self.at_end() {
            let Some(value) = self.parse_expression() else {
                return;
            };
            self.arena_mut()[node].data = NodeData::ReturnStatement { value };
            self.link(node, value);
        }

        self.attach_to_root(node);
    }
}

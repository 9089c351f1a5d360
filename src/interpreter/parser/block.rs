use crate::{
    ast::{INVALID_INDEX, NodeData},
    interpreter::{
        lexer::TokenKind,
        parser::{Parser, core::ROOT_NODE},
    },
};

impl Parser {
    /// Parses an indented block: `NEWLINE INDENT statement* DEDENT`.
    ///
    /// The statement parsers attach everything they complete to the root
    /// PROGRAM node, so after the block body has been parsed the new
    /// statements sit at the tail of the root's child chain. This function
    /// cuts that tail off and re-parents it under a fresh BLOCK node — the
    /// fix-up that turns the flat attachment scheme into a proper tree.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn parse_block(&mut self) -> Option<u32> {
        if !self.expect(TokenKind::Newline, "Expected newline after ':'") {
            return None;
        }
        if !self.expect(TokenKind::Indent, "Expected indentation for block") {
            return None;
        }

        let node = self.create_node(NodeData::Block { statements_start: INVALID_INDEX,
                                                      statement_count:  0, });

        // Tail of the root chain before any block statement is attached.
        let saved_tail = self.arena().children(ROOT_NODE).last();

        while !self.check(TokenKind::Dedent) && !self.at_end() {
            if self.eat(TokenKind::Newline) {
                continue;
            }

            let start = self.cursor_index();
            self.parse_statement();

            if self.cursor_index() == start && !self.at_end() && !self.check(TokenKind::Dedent) {
                self.error_at_current("Unexpected token in block");
                self.advance();
            }

            if self.statement_failed {
                self.synchronize();
                self.statement_failed = false;
            }
        }

        self.expect(TokenKind::Dedent, "Expected dedentation after block");

        // Cut the freshly attached statements off the root chain and hang
        // them under the block.
        let first_new = match saved_tail {
            Some(tail) => self.arena()[tail].next_sibling,
            None => self.arena()[ROOT_NODE].first_child,
        };

        let statements: Vec<u32> = if first_new == INVALID_INDEX {
            Vec::new()
        } else {
            self.arena().siblings_from(first_new).collect()
        };

        match saved_tail {
            Some(tail) => self.arena_mut()[tail].next_sibling = INVALID_INDEX,
            None => self.arena_mut()[ROOT_NODE].first_child = INVALID_INDEX,
        }

        for &statement in &statements {
            self.arena_mut().set_parent(statement, node);
        }

        self.arena_mut()[node].first_child = first_new;
        self.arena_mut()[node].data =
            NodeData::Block { statements_start: if statements.is_empty() {
                                  INVALID_INDEX
                              } else {
                                  first_new
                              },
                              statement_count:  statements.len() as u32, };

        Some(node)
    }
}

use crate::{
    ast::{INVALID_INDEX, MatrixError, NodeData},
    interpreter::{lexer::TokenKind, parser::Parser},
};

impl Parser {
    /// Parses a matrix literal.
    ///
    /// `,` separates columns and `;` separates rows. The first row fixes the
    /// column count; every later row must match it or the literal is marked
    /// with [`MatrixError::IrregularRows`] and a diagnostic is recorded.
    /// `[]` is a valid empty matrix. Elements are linked as one flat sibling
    /// chain in row-major order.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn parse_matrix_literal(&mut self) -> Option<u32> {
        let token_index = self.cursor_index();
        self.advance(); // '['

        let node = self.create_node_at(NodeData::MatrixLiteral { rows:             0,
                                                                 cols:             0,
                                                                 elements_start:   INVALID_INDEX,
                                                                 is_empty:         false,
                                                                 validation_error:
                                                                     MatrixError::None, },
                                       token_index);

        let mut elements = Vec::new();
        let mut rows = 0u32;
        let mut cols = 0u32;
        let mut validation_error = MatrixError::None;

        if !self.check(TokenKind::RBracket) {
            cols = self.parse_matrix_row(&mut elements)?;
            rows = 1;

            while self.eat(TokenKind::Semicolon) {
                let row_cols = self.parse_matrix_row(&mut elements)?;
                if row_cols != cols && validation_error == MatrixError::None {
                    validation_error = MatrixError::IrregularRows;
                    self.error_at_current("Inconsistent matrix row lengths");
                }
                rows += 1;
            }
        }

        if !self.expect(TokenKind::RBracket, "Expected ']' after matrix literal") {
            return None;
        }

        self.arena_mut()[node].data =
            NodeData::MatrixLiteral { rows,
                                      cols,
                                      elements_start: elements.first().copied()
                                                              .unwrap_or(INVALID_INDEX),
                                      is_empty: elements.is_empty(),
                                      validation_error };
        for element in elements {
            self.link(node, element);
        }

        Some(node)
    }

    /// Parses one comma-separated row and returns its length.
    #[allow(clippy::cast_possible_truncation)]
    fn parse_matrix_row(&mut self, elements: &mut Vec<u32>) -> Option<u32> {
        let mut count = 0u32;
        loop {
            let element = self.parse_expression()?;
            elements.push(element);
            count += 1;
            if !self.eat(TokenKind::Comma) {
                return Some(count);
            }
        }
    }
}

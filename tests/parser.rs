use std::collections::HashSet;

use dakota::{
    ast::{BinaryOp, INVALID_INDEX, NodeData, NodeKind},
    interpreter::{lexer::Lexer, parser::Parser},
};

fn parse(source: &str) -> Parser {
    let tokens = Lexer::new(source).tokenize().expect("lexing failed");
    let mut parser = Parser::new(tokens);
    parser.parse();
    parser
}

fn parse_clean(source: &str) -> Parser {
    let parser = parse(source);
    assert!(!parser.has_errors(),
            "unexpected parse errors: {:?}",
            parser.diagnostics());
    parser
}

/// Top-level statement indices, in order.
fn statements(parser: &Parser) -> Vec<u32> {
    parser.arena().children(0).collect()
}

#[test]
fn assignment_creates_fresh_target_identifier() {
    let parser = parse_clean("x = x + 1\n");
    let stmts = statements(&parser);
    assert_eq!(stmts.len(), 1);

    let NodeData::Assignment { target, value } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };

    let NodeData::Identifier { name } = parser.arena()[target].data else {
        panic!("target is not an identifier");
    };
    assert_eq!(parser.strings().get(name), "x");

    // The target node is distinct from the identifier inside the value
    // expression.
    let NodeData::BinaryOp { left, .. } = parser.arena()[value].data else {
        panic!("value is not a binary op");
    };
    assert_ne!(target, left);
    assert_eq!(parser.arena()[left].kind(), NodeKind::Identifier);
}

#[test]
fn precedence_shapes_the_tree() {
    let parser = parse_clean("r = 1 + 2 * 3\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::BinaryOp { op, left, right } = parser.arena()[value].data else {
        panic!("expected a binary op");
    };

    assert_eq!(op, BinaryOp::Add);
    assert_eq!(parser.arena()[left].kind(), NodeKind::IntegerLiteral);

    let NodeData::BinaryOp { op: inner, .. } = parser.arena()[right].data else {
        panic!("right side should be the multiplication");
    };
    assert_eq!(inner, BinaryOp::Mul);
}

#[test]
fn power_nests_to_the_right() {
    let parser = parse_clean("r = 2 ** 3 ** 2\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::BinaryOp { op, left, right } = parser.arena()[value].data else {
        panic!("expected a binary op");
    };

    assert_eq!(op, BinaryOp::Pow);
    assert_eq!(parser.arena()[left].kind(), NodeKind::IntegerLiteral);
    assert_eq!(parser.arena()[right].kind(), NodeKind::BinaryOp);
}

#[test]
fn unary_binds_tighter_than_binary() {
    let parser = parse_clean("r = -2 + 3\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::BinaryOp { op, left, .. } = parser.arena()[value].data else {
        panic!("expected addition at the top");
    };

    assert_eq!(op, BinaryOp::Add);
    assert_eq!(parser.arena()[left].kind(), NodeKind::UnaryOp);
}

#[test]
fn matrix_literal_element_chain_is_row_major() {
    let parser = parse_clean("M = [1,2,3;4,5,6]\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::MatrixLiteral { rows,
                                  cols,
                                  elements_start,
                                  is_empty,
                                  .. } = parser.arena()[value].data
    else {
        panic!("expected a matrix literal");
    };

    assert_eq!((rows, cols), (2, 3));
    assert!(!is_empty);

    // The sibling chain holds exactly rows * cols elements, in source
    // order.
    let elements: Vec<u32> = parser.arena()
                                   .siblings_from(elements_start)
                                   .take((rows * cols) as usize)
                                   .collect();
    assert_eq!(elements.len(), 6);

    let values: Vec<i64> = elements.iter()
                                   .map(|&e| match parser.arena()[e].data {
                                       NodeData::IntegerLiteral { value } => value,
                                       _ => panic!("element is not an integer"),
                                   })
                                   .collect();
    assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn empty_matrix_is_marked() {
    let parser = parse_clean("M = []\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::MatrixLiteral { rows,
                                  cols,
                                  is_empty,
                                  elements_start,
                                  .. } = parser.arena()[value].data
    else {
        panic!("expected a matrix literal");
    };

    assert!(is_empty);
    assert_eq!((rows, cols), (0, 0));
    assert_eq!(elements_start, INVALID_INDEX);
}

#[test]
fn irregular_matrix_rows_are_a_parse_error() {
    let parser = parse("M = [1,2;3,4,5]\n");
    assert!(parser.has_errors());
    assert!(parser.diagnostics()
                  .iter()
                  .any(|d| d.message.contains("Inconsistent matrix row lengths")));
}

#[test]
fn missing_closing_bracket_is_a_parse_error() {
    let parser = parse("M = [1,2;3,4\n");
    assert!(parser.has_errors());
    assert!(parser.diagnostics()
                  .iter()
                  .any(|d| d.message.contains("Expected ']'")));
}

#[test]
fn block_statements_are_reparented() {
    let source = concat!("if a:\n", "    x = 1\n", "    y = 2\n", "z = 3\n");
    let parser = parse_clean(source);
    let stmts = statements(&parser);

    // Only the if and the trailing assignment hang off the root.
    assert_eq!(stmts.len(), 2);
    assert_eq!(parser.arena()[stmts[0]].kind(), NodeKind::IfStatement);
    assert_eq!(parser.arena()[stmts[1]].kind(), NodeKind::Assignment);

    let NodeData::IfStatement { then_block, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an if statement");
    };
    let NodeData::Block { statements_start,
                          statement_count, } = parser.arena()[then_block].data
    else {
        panic!("then branch is not a block");
    };

    assert_eq!(statement_count, 2);
    for index in parser.arena()
                       .siblings_from(statements_start)
                       .take(statement_count as usize)
    {
        assert_eq!(parser.arena()[index].parent, then_block);
    }
}

#[test]
fn elif_parses_as_nested_if_in_else() {
    let source = concat!("if a:\n",
                         "    x = 1\n",
                         "elif b:\n",
                         "    x = 2\n",
                         "else:\n",
                         "    x = 3\n");
    let parser = parse_clean(source);
    let stmts = statements(&parser);
    assert_eq!(stmts.len(), 1);

    let NodeData::IfStatement { else_block, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an if statement");
    };
    assert_eq!(parser.arena()[else_block].kind(), NodeKind::IfStatement);

    let NodeData::IfStatement { else_block: tail, .. } = parser.arena()[else_block].data else {
        panic!("elif arm is not an if statement");
    };
    assert_eq!(parser.arena()[tail].kind(), NodeKind::Block);
}

#[test]
fn function_definition_records_parameters() {
    let source = concat!("function add(a, b, c):\n", "    return a + b + c\n");
    let parser = parse_clean(source);
    let stmts = statements(&parser);

    let NodeData::FunctionDef { name,
                                params_start,
                                param_count,
                                body, } = parser.arena()[stmts[0]].data
    else {
        panic!("expected a function definition");
    };

    assert_eq!(parser.strings().get(name), "add");
    assert_eq!(param_count, 3);
    assert_eq!(parser.arena()[body].kind(), NodeKind::Block);

    let params: Vec<&str> = parser.arena()
                                  .siblings_from(params_start)
                                  .take(param_count as usize)
                                  .map(|p| match parser.arena()[p].data {
                                      NodeData::Identifier { name } => parser.strings().get(name),
                                      _ => panic!("parameter is not an identifier"),
                                  })
                                  .collect();
    assert_eq!(params, vec!["a", "b", "c"]);
}

#[test]
fn call_arguments_are_sibling_linked() {
    let parser = parse_clean("r = f(1, 2 + 3, g(4))\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::FunctionCall { name,
                                 args_start,
                                 arg_count, } = parser.arena()[value].data
    else {
        panic!("expected a function call");
    };

    assert_eq!(parser.strings().get(name), "f");
    assert_eq!(arg_count, 3);

    let kinds: Vec<NodeKind> = parser.arena()
                                     .siblings_from(args_start)
                                     .take(arg_count as usize)
                                     .map(|a| parser.arena()[a].kind())
                                     .collect();
    assert_eq!(kinds,
               vec![NodeKind::IntegerLiteral,
                    NodeKind::BinaryOp,
                    NodeKind::FunctionCall]);
}

#[test]
fn postfix_tails_nest_left_to_right() {
    let parser = parse_clean("r = m[0].T\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::MemberAccess { object, member_name } = parser.arena()[value].data else {
        panic!("expected member access at the top");
    };

    assert_eq!(parser.strings().get(member_name), "T");
    assert_eq!(parser.arena()[object].kind(), NodeKind::ArrayAccess);
}

#[test]
fn postfix_attaches_to_call_results() {
    let parser = parse_clean("r = eye(2)[0]\n");
    let stmts = statements(&parser);

    let NodeData::Assignment { value, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected an assignment");
    };
    let NodeData::ArrayAccess { object, .. } = parser.arena()[value].data else {
        panic!("expected array access at the top");
    };
    assert_eq!(parser.arena()[object].kind(), NodeKind::FunctionCall);
}

#[test]
fn error_recovery_surfaces_multiple_diagnostics() {
    let source = concat!("x = \n", "y = ]\n", "z = 3\n");
    let parser = parse(source);

    assert!(parser.diagnostics().len() >= 2);

    // The good trailing statement still parsed.
    let stmts = statements(&parser);
    assert!(stmts.iter()
                 .any(|&s| parser.arena()[s].kind() == NodeKind::Assignment));
}

#[test]
fn invalid_character_is_rejected_with_position() {
    let parser = parse("x = 1 @ 2\n");
    assert!(parser.has_errors());

    let diagnostic = &parser.diagnostics()[0];
    assert!(diagnostic.message.contains('@'));
    assert_eq!(diagnostic.line, 1);
}

#[test]
fn every_node_is_reachable_from_the_root() {
    let source = concat!("x = 1 + 2 * 3\n",
                         "M = [x, 2; 3, 4]\n",
                         "function f(a, b):\n",
                         "    if a > b:\n",
                         "        return a\n",
                         "    return b\n",
                         "r = f(1, 2)\n",
                         "for i in range(3):\n",
                         "    x = x + i\n",
                         "while x > 100:\n",
                         "    x = x - 1\n",
                         "T = M.T\n");
    let parser = parse_clean(source);

    let mut visited = HashSet::new();
    let mut stack = vec![0u32];
    while let Some(index) = stack.pop() {
        if !visited.insert(index) {
            panic!("node {index} reachable through two parents");
        }
        for child in parser.arena().children(index) {
            assert_eq!(parser.arena()[child].parent, index);
            stack.push(child);
        }
    }

    assert_eq!(visited.len(), parser.node_count());
}

#[test]
fn return_without_value_is_allowed() {
    let source = concat!("function f():\n", "    return\n");
    let parser = parse_clean(source);
    let stmts = statements(&parser);

    let NodeData::FunctionDef { body, .. } = parser.arena()[stmts[0]].data else {
        panic!("expected a function definition");
    };
    let NodeData::Block { statements_start, .. } = parser.arena()[body].data else {
        panic!("expected a block body");
    };
    let NodeData::ReturnStatement { value } = parser.arena()[statements_start].data else {
        panic!("expected a return statement");
    };
    assert_eq!(value, INVALID_INDEX);
}

#[test]
fn program_payload_counts_top_level_statements() {
    let parser = parse_clean("a = 1\nb = 2\nc = 3\n");

    let NodeData::Program { statement_count, .. } = parser.arena()[0].data else {
        panic!("root is not a program node");
    };
    assert_eq!(statement_count, 3);
}

#[test]
fn ast_dump_names_the_nodes() {
    let parser = parse_clean("x = [1,2;3,4]\n");
    let dump = parser.ast_string();

    assert!(dump.contains("PROGRAM"));
    assert!(dump.contains("ASSIGNMENT"));
    assert!(dump.contains("MATRIX: 2x2"));
    assert!(dump.contains("IDENTIFIER: x"));
}

use dakota::{
    error::LexError,
    interpreter::lexer::{Lexer, Token, TokenKind},
};

fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize().expect("lexing failed")
}

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).iter().map(|t| t.kind).collect()
}

fn count_kind(tokens: &[Token], kind: TokenKind) -> usize {
    tokens.iter().filter(|t| t.kind == kind).count()
}

#[test]
fn simple_statement_tokens() {
    assert_eq!(kinds("x = 42\n"),
               vec![TokenKind::Identifier,
                    TokenKind::Assign,
                    TokenKind::Integer,
                    TokenKind::Newline,
                    TokenKind::Eof]);
}

#[test]
fn keywords_are_not_identifiers() {
    let tokens = tokenize("if else elif while for in function return and or not mult\n");
    let expected = [TokenKind::If,
                    TokenKind::Else,
                    TokenKind::Elif,
                    TokenKind::While,
                    TokenKind::For,
                    TokenKind::In,
                    TokenKind::Function,
                    TokenKind::Return,
                    TokenKind::And,
                    TokenKind::Or,
                    TokenKind::Not,
                    TokenKind::Matmul];

    for (token, kind) in tokens.iter().zip(expected) {
        assert_eq!(token.kind, kind, "token {}", token.lexeme);
    }
}

#[test]
fn keyword_prefixes_stay_identifiers() {
    let tokens = tokenize("iffy formula multiply\n");
    assert_eq!(count_kind(&tokens, TokenKind::Identifier), 3);
}

#[test]
fn boolean_literals() {
    let tokens = tokenize("a = true\nb = false\n");
    let booleans: Vec<&str> = tokens.iter()
                                    .filter(|t| t.kind == TokenKind::Boolean)
                                    .map(|t| t.lexeme.as_str())
                                    .collect();
    assert_eq!(booleans, vec!["true", "false"]);
}

#[test]
fn number_promotion_to_float() {
    let tokens = tokenize("1 2.5 3e4 1.5e-3 7\n");
    let numeric: Vec<TokenKind> = tokens.iter()
                                        .filter(|t| {
                                            matches!(t.kind,
                                                     TokenKind::Integer | TokenKind::Float)
                                        })
                                        .map(|t| t.kind)
                                        .collect();
    assert_eq!(numeric,
               vec![TokenKind::Integer,
                    TokenKind::Float,
                    TokenKind::Float,
                    TokenKind::Float,
                    TokenKind::Integer]);
}

#[test]
fn integer_dot_is_not_a_float() {
    // A dot not followed by a digit stays a member-access dot.
    assert_eq!(kinds("m.T\n"),
               vec![TokenKind::Identifier,
                    TokenKind::Dot,
                    TokenKind::Identifier,
                    TokenKind::Newline,
                    TokenKind::Eof]);
}

#[test]
fn two_character_operators_win_over_prefixes() {
    assert_eq!(kinds("a ** b == c <= d >= e != f\n"),
               vec![TokenKind::Identifier,
                    TokenKind::Power,
                    TokenKind::Identifier,
                    TokenKind::EqualEqual,
                    TokenKind::Identifier,
                    TokenKind::LessEqual,
                    TokenKind::Identifier,
                    TokenKind::GreaterEqual,
                    TokenKind::Identifier,
                    TokenKind::NotEqual,
                    TokenKind::Identifier,
                    TokenKind::Newline,
                    TokenKind::Eof]);
}

#[test]
fn string_escapes_are_decoded() {
    let tokens = tokenize("s = \"a\\tb\\n\\\"q\\\\\"\n");
    let string = tokens.iter()
                       .find(|t| t.kind == TokenKind::Str)
                       .expect("no string token");
    assert_eq!(string.lexeme, "a\tb\n\"q\\");
}

#[test]
fn unterminated_string_is_fatal() {
    let result = Lexer::new("s = \"oops\n").tokenize();
    assert!(matches!(result, Err(LexError::UnterminatedString { line: 1 })));
}

#[test]
fn comments_are_skipped_by_default() {
    let tokens = tokenize("x = 1 \\ trailing note\ny = 2\n");
    assert_eq!(count_kind(&tokens, TokenKind::Comment), 0);
    assert_eq!(count_kind(&tokens, TokenKind::Identifier), 2);
}

#[test]
fn comments_can_be_preserved() {
    let tokens = Lexer::new("x = 1 \\ note\n").preserve_comments(true)
                                              .tokenize()
                                              .expect("lexing failed");
    let comment = tokens.iter()
                        .find(|t| t.kind == TokenKind::Comment)
                        .expect("comment was dropped");
    assert_eq!(comment.lexeme, " note");
}

#[test]
fn indent_dedent_balance() {
    let source = concat!("if a:\n",
                         "    x = 1\n",
                         "    if b:\n",
                         "        y = 2\n",
                         "z = 3\n");
    let tokens = tokenize(source);

    assert_eq!(count_kind(&tokens, TokenKind::Indent), 2);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 2);
}

#[test]
fn dedents_are_synthesized_at_eof() {
    let source = concat!("if a:\n", "    if b:\n", "        x = 1\n");
    let tokens = tokenize(source);

    assert_eq!(count_kind(&tokens, TokenKind::Indent), 2);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 2);
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
}

#[test]
fn blank_lines_leave_indentation_alone() {
    let source = concat!("if a:\n", "    x = 1\n", "\n", "    \n", "    y = 2\n");
    let tokens = tokenize(source);

    assert_eq!(count_kind(&tokens, TokenKind::Indent), 1);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 1);
}

#[test]
fn tab_indentation_works() {
    let source = "if a:\n\tx = 1\n\tif b:\n\t\ty = 2\n";
    let tokens = tokenize(source);

    assert_eq!(count_kind(&tokens, TokenKind::Indent), 2);
    assert_eq!(count_kind(&tokens, TokenKind::Dedent), 2);
}

#[test]
fn mixed_tabs_and_spaces_on_one_line_is_fatal() {
    let result = Lexer::new("if a:\n \tx = 1\n").tokenize();
    assert!(matches!(result, Err(LexError::MixedIndentation { line: 2 })));
}

#[test]
fn switching_styles_is_fatal() {
    let source = "if a:\n    x = 1\nif b:\n\ty = 2\n";
    let result = Lexer::new(source).tokenize();
    assert!(matches!(result, Err(LexError::MixedIndentation { .. })));
}

#[test]
fn indent_must_be_multiple_of_base() {
    let source = concat!("if a:\n",
                         "    x = 1\n",
                         "    if b:\n",
                         "          y = 2\n"); // 10 spaces; base is 4
    let result = Lexer::new(source).tokenize();
    assert!(matches!(result, Err(LexError::IndentNotMultiple { width: 10, base: 4, .. })));
}

#[test]
fn single_space_indent_is_too_narrow() {
    let result = Lexer::new("if a:\n x = 1\n").tokenize();
    assert!(matches!(result, Err(LexError::IndentTooNarrow { width: 1, .. })));
}

#[test]
fn dedent_to_unknown_level_is_fatal() {
    let source = concat!("if a:\n",
                         "  x = 1\n", // base 2, level 2
                         "  if b:\n",
                         "      y = 2\n", // level 6
                         "    z = 3\n"); // 4 is a multiple but matches no level
    let result = Lexer::new(source).tokenize();
    assert!(matches!(result, Err(LexError::InconsistentDedent { width: 4, .. })));
}

#[test]
fn unknown_character_becomes_invalid_token() {
    let tokens = tokenize("x = 1 @ 2\n");
    let invalid = tokens.iter()
                        .find(|t| t.kind == TokenKind::Invalid)
                        .expect("no invalid token");
    assert_eq!(invalid.lexeme, "@");
}

#[test]
fn token_positions_are_one_based() {
    let tokens = tokenize("x = 1\ny = 2\n");

    let x = &tokens[0];
    assert_eq!((x.line, x.column), (1, 1));

    let y = tokens.iter()
                  .find(|t| t.lexeme == "y")
                  .expect("y not found");
    assert_eq!((y.line, y.column), (2, 1));

    let two = tokens.iter()
                    .find(|t| t.lexeme == "2")
                    .expect("2 not found");
    assert_eq!((two.line, two.column), (2, 5));
}

#[test]
fn matrix_punctuation() {
    assert_eq!(kinds("[1,2;3,4]\n"),
               vec![TokenKind::LBracket,
                    TokenKind::Integer,
                    TokenKind::Comma,
                    TokenKind::Integer,
                    TokenKind::Semicolon,
                    TokenKind::Integer,
                    TokenKind::Comma,
                    TokenKind::Integer,
                    TokenKind::RBracket,
                    TokenKind::Newline,
                    TokenKind::Eof]);
}

#[test]
fn carriage_returns_are_skipped() {
    let tokens = tokenize("x = 1\r\ny = 2\r\n");
    assert_eq!(count_kind(&tokens, TokenKind::Identifier), 2);
    assert_eq!(count_kind(&tokens, TokenKind::Newline), 2);
}

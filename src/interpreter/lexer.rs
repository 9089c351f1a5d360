use logos::Logos;

use crate::error::LexError;

/// The kind of a lexical token.
///
/// Layout tokens (`Newline`, `Indent`, `Dedent`) are synthesized by the
/// off-side layer; everything else comes straight from the raw scanner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Integer literal, such as `42`.
    Integer,
    /// Floating-point literal, such as `3.14` or `2.5e-3`.
    Float,
    /// Double-quoted string literal; the lexeme holds the decoded text.
    Str,
    /// `true` or `false`.
    Boolean,
    /// Variable or function name.
    Identifier,
    /// `if`
    If,
    /// `else`
    Else,
    /// `elif`
    Elif,
    /// `while`
    While,
    /// `for`
    For,
    /// `in`
    In,
    /// `function`
    Function,
    /// `return`
    Return,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `mult`, the matrix multiplication operator.
    Matmul,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `**`
    Power,
    /// `%`
    Percent,
    /// `=`
    Assign,
    /// `==`
    EqualEqual,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `,`
    Comma,
    /// `;`, the matrix row separator.
    Semicolon,
    /// `:`, the block introducer.
    Colon,
    /// `.`
    Dot,
    /// End of a source line.
    Newline,
    /// The indentation level increased.
    Indent,
    /// The indentation level decreased.
    Dedent,
    /// `\` comment text; only emitted when preservation is requested.
    Comment,
    /// End of input.
    Eof,
    /// A character no rule recognizes; rejected later by the parser.
    Invalid,
}

/// A lexical token with its source position.
///
/// Lines and columns are 1-based. For string literals the lexeme holds the
/// decoded content, with escape sequences already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token kind.
    pub kind:   TokenKind,
    /// The token text.
    pub lexeme: String,
    /// 1-based source line.
    pub line:   usize,
    /// 1-based source column.
    pub column: usize,
}

/// Raw scanner tokens produced by `logos`.
///
/// Whitespace and comments are real tokens here: the off-side layer needs
/// leading whitespace to measure indentation, and comments to know a line is
/// comment-only. Both are dropped from the public stream unless requested.
#[derive(Logos, Debug, Clone, PartialEq)]
enum RawToken {
    /// Floating-point literals, such as `3.14` or `2.5e-3`.
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,
    /// Integer literals, such as `42`.
    #[regex(r"[0-9]+")]
    Integer,
    /// Double-quoted strings with `\n \t \r \\ \"` escapes.
    #[regex(r#""([^"\\\n]|\\.)*""#, decode_string)]
    Str(String),
    /// `\ comment to end of line`
    #[regex(r"\\[^\n]*")]
    Comment,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `elif`
    #[token("elif")]
    Elif,
    /// `while`
    #[token("while")]
    While,
    /// `for`
    #[token("for")]
    For,
    /// `in`
    #[token("in")]
    In,
    /// `function`
    #[token("function")]
    Function,
    /// `return`
    #[token("return")]
    Return,
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `not`
    #[token("not")]
    Not,
    /// `mult`
    #[token("mult")]
    Matmul,
    /// Identifiers; ASCII letters, digits and underscore.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    /// `**`
    #[token("**")]
    Power,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `!=`
    #[token("!=")]
    NotEqual,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `=`
    #[token("=")]
    Assign,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// `\n`
    #[token("\n")]
    Newline,
    /// Intra-line whitespace; carriage returns are swallowed here.
    #[regex(r"[ \t\r]+")]
    Whitespace,
}

/// Decodes the escape sequences of a string literal.
///
/// Unknown escapes keep the escaped character as-is.
fn decode_string(lex: &mut logos::Lexer<RawToken>) -> String {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => out.push(other),
            None => {},
        }
    }
    out
}

/// The detected indentation style of a program.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum IndentStyle {
    /// No indented line has been seen yet.
    Unknown,
    /// Indentation uses spaces; the base width is the first indent seen.
    Spaces,
    /// Indentation uses tabs; each tab counts as the configured tab width.
    Tabs,
}

/// Tokenizes source text, honoring the off-side rule.
///
/// The lexer runs the raw scanner over the whole input and layers line
/// tracking, indentation measurement and INDENT/DEDENT synthesis on top. The
/// indentation state is a stack of integer widths; no per-line strings are
/// retained.
///
/// ## Example
/// ```
/// use dakota::interpreter::lexer::{Lexer, TokenKind};
///
/// let tokens = Lexer::new("x = 1\n").tokenize().unwrap();
/// let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
///
/// assert_eq!(kinds,
///            vec![TokenKind::Identifier,
///                 TokenKind::Assign,
///                 TokenKind::Integer,
///                 TokenKind::Newline,
///                 TokenKind::Eof]);
/// ```
pub struct Lexer<'src> {
    source:            &'src str,
    tab_width:         usize,
    preserve_comments: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a lexer with a tab width of 4 and comment preservation off.
    #[must_use]
    pub const fn new(source: &'src str) -> Self {
        Self { source,
               tab_width: 4,
               preserve_comments: false }
    }

    /// Sets how many columns a tab counts for when measuring indentation.
    #[must_use]
    pub const fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Keeps comment tokens in the output stream instead of discarding them.
    #[must_use]
    pub const fn preserve_comments(mut self, keep: bool) -> Self {
        self.preserve_comments = keep;
        self
    }

    /// Produces the full token stream for the source.
    ///
    /// # Errors
    /// Returns a [`LexError`] for unterminated strings and for indentation
    /// that mixes styles, is not a multiple of the base width, or dedents to
    /// a level that was never opened.
    #[allow(clippy::too_many_lines)]
    pub fn tokenize(&self) -> Result<Vec<Token>, LexError> {
        let raw: Vec<(Result<RawToken, ()>, std::ops::Range<usize>)> =
            RawToken::lexer(self.source).spanned().collect();

        let mut out = Vec::with_capacity(raw.len() + 8);
        let mut stack: Vec<usize> = vec![0];
        let mut style = IndentStyle::Unknown;
        let mut base = 0usize;

        let mut line = 1usize;
        let mut line_start = 0usize;
        let mut at_line_start = true;

        for (i, (result, span)) in raw.iter().enumerate() {
            let column = span.start - line_start + 1;

            match result {
                Ok(RawToken::Newline) => {
                    out.push(Token { kind:   TokenKind::Newline,
                                     lexeme: "\n".to_string(),
                                     line,
                                     column });
                    line += 1;
                    line_start = span.end;
                    at_line_start = true;
                },
                Ok(RawToken::Whitespace) => {
                    if at_line_start {
                        if measured_line_follows(raw.get(i + 1)) {
                            let (width, has_spaces, has_tabs) =
                                self.measure(&self.source[span.clone()]);
                            apply_indentation(&mut stack,
                                              &mut style,
                                              &mut base,
                                              width,
                                              has_spaces,
                                              has_tabs,
                                              line,
                                              column,
                                              &mut out)?;
                        }
                        at_line_start = false;
                    }
                },
                Ok(RawToken::Comment) => {
                    // Comment-only lines never open or close blocks.
                    at_line_start = false;
                    if self.preserve_comments {
                        let text = &self.source[span.start + 1..span.end];
                        out.push(Token { kind:   TokenKind::Comment,
                                         lexeme: text.to_string(),
                                         line,
                                         column });
                    }
                },
                Ok(token) => {
                    if at_line_start {
                        apply_indentation(&mut stack,
                                          &mut style,
                                          &mut base,
                                          0,
                                          false,
                                          false,
                                          line,
                                          column,
                                          &mut out)?;
                        at_line_start = false;
                    }

                    let slice = &self.source[span.clone()];
                    let (kind, lexeme) = public_token(token, slice);
                    out.push(Token { kind,
                                     lexeme,
                                     line,
                                     column });
                },
                Err(()) => {
                    let slice = &self.source[span.clone()];
                    if slice.starts_with('"') {
                        return Err(LexError::UnterminatedString { line });
                    }

                    if at_line_start {
                        apply_indentation(&mut stack,
                                          &mut style,
                                          &mut base,
                                          0,
                                          false,
                                          false,
                                          line,
                                          column,
                                          &mut out)?;
                        at_line_start = false;
                    }

                    out.push(Token { kind:   TokenKind::Invalid,
                                     lexeme: slice.to_string(),
                                     line,
                                     column });
                },
            }
        }

        // Close every block still open at end of input.
        let column = self.source.len() - line_start + 1;
        while stack.len() > 1 {
            stack.pop();
            out.push(Token { kind:   TokenKind::Dedent,
                             lexeme: String::new(),
                             line,
                             column });
        }

        out.push(Token { kind:   TokenKind::Eof,
                         lexeme: String::new(),
                         line,
                         column });
        Ok(out)
    }

    /// Measures a leading whitespace run.
    ///
    /// Spaces count one column, tabs count the configured tab width;
    /// carriage returns are ignored.
    fn measure(&self, slice: &str) -> (usize, bool, bool) {
        let mut width = 0;
        let mut has_spaces = false;
        let mut has_tabs = false;

        for c in slice.chars() {
            match c {
                ' ' => {
                    width += 1;
                    has_spaces = true;
                },
                '\t' => {
                    width += self.tab_width;
                    has_tabs = true;
                },
                _ => {},
            }
        }

        (width, has_spaces, has_tabs)
    }
}

/// Decides whether the token after a leading whitespace run makes the line
/// participate in indentation.
///
/// Blank lines, comment-only lines and lines starting with a continuation
/// operator leave the indentation stack untouched.
fn measured_line_follows(next: Option<&(Result<RawToken, ()>, std::ops::Range<usize>)>) -> bool {
    match next {
        None => false,
        Some((Ok(token), _)) => {
            !matches!(token,
                      RawToken::Newline
                      | RawToken::Comment
                      | RawToken::Plus
                      | RawToken::Minus
                      | RawToken::Star
                      | RawToken::Slash
                      | RawToken::Percent
                      | RawToken::Power
                      | RawToken::Assign
                      | RawToken::EqualEqual
                      | RawToken::NotEqual
                      | RawToken::Less
                      | RawToken::LessEqual
                      | RawToken::Greater
                      | RawToken::GreaterEqual)
        },
        Some((Err(()), _)) => true,
    }
}

/// Validates the indentation of one line and emits INDENT/DEDENT tokens.
///
/// The first non-zero indent fixes the program's indentation style and base
/// width; every later line must agree with it.
#[allow(clippy::too_many_arguments)]
fn apply_indentation(stack: &mut Vec<usize>,
                     style: &mut IndentStyle,
                     base: &mut usize,
                     width: usize,
                     has_spaces: bool,
                     has_tabs: bool,
                     line: usize,
                     column: usize,
                     out: &mut Vec<Token>)
                     -> Result<(), LexError> {
    if width > 0 {
        if has_spaces && has_tabs {
            return Err(LexError::MixedIndentation { line });
        }

        match *style {
            IndentStyle::Unknown => {
                if has_tabs {
                    *style = IndentStyle::Tabs;
                    *base = 1;
                } else {
                    *style = IndentStyle::Spaces;
                    *base = width;
                    if width < 2 {
                        return Err(LexError::IndentTooNarrow { line, width });
                    }
                    if !matches!(width, 2 | 4 | 8) {
                        log::warn!("unusual indentation base of {width} columns at line {line}");
                    }
                }
            },
            IndentStyle::Tabs => {
                if has_spaces {
                    return Err(LexError::MixedIndentation { line });
                }
            },
            IndentStyle::Spaces => {
                if has_tabs {
                    return Err(LexError::MixedIndentation { line });
                }
                if width % *base != 0 {
                    return Err(LexError::IndentNotMultiple { line,
                                                             width,
                                                             base: *base });
                }
            },
        }
    }

    let previous = stack.last().copied().unwrap_or(0);

    if width > previous {
        stack.push(width);
        out.push(Token { kind:   TokenKind::Indent,
                         lexeme: String::new(),
                         line,
                         column });
    } else if width < previous {
        while stack.last().copied().unwrap_or(0) > width {
            stack.pop();
            out.push(Token { kind:   TokenKind::Dedent,
                             lexeme: String::new(),
                             line,
                             column });
        }

        if stack.last().copied().unwrap_or(0) != width {
            return Err(LexError::InconsistentDedent { line, width });
        }
    }

    Ok(())
}

/// Maps a raw token to its public kind and lexeme.
fn public_token(token: &RawToken, slice: &str) -> (TokenKind, String) {
    let kind = match token {
        RawToken::Float => TokenKind::Float,
        RawToken::Integer => TokenKind::Integer,
        RawToken::Str(text) => return (TokenKind::Str, text.clone()),
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::Elif => TokenKind::Elif,
        RawToken::While => TokenKind::While,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Function => TokenKind::Function,
        RawToken::Return => TokenKind::Return,
        RawToken::True | RawToken::False => TokenKind::Boolean,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Not => TokenKind::Not,
        RawToken::Matmul => TokenKind::Matmul,
        RawToken::Identifier => TokenKind::Identifier,
        RawToken::Power => TokenKind::Power,
        RawToken::EqualEqual => TokenKind::EqualEqual,
        RawToken::NotEqual => TokenKind::NotEqual,
        RawToken::LessEqual => TokenKind::LessEqual,
        RawToken::GreaterEqual => TokenKind::GreaterEqual,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Assign => TokenKind::Assign,
        RawToken::Less => TokenKind::Less,
        RawToken::Greater => TokenKind::Greater,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Comment | RawToken::Newline | RawToken::Whitespace => TokenKind::Invalid,
    };

    (kind, slice.to_string())
}

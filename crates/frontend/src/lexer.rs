use colored::*;
use std::collections::VecDeque;
use thiserror::Error;

use tools::errors::ReportCodeErr;

#[derive(Debug, Error, PartialEq)]
pub enum LexerError {
    #[error("{0}")]
    GlobLexerError(String),

    #[error("unterminated string starting at line {0}.")]
    UnterminatedString(u64),

    #[error("unknown escape sequence in string: -\\{0}-.")]
    UnknownEscape(char),

    #[error("unsupported character: -{}-.", .0.to_string().cyan())]
    UnrecognizedToken(char),
}

impl LexerError {
    pub fn context(self, line: u64) -> LexerError {
        Self::GlobLexerError(format!("Line: {}, {}", line, self))
    }
}

impl ReportCodeErr for LexerError {
    fn kind(&self) -> &'static str {
        "SyntaxError"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    OpenParen,  // (
    CloseParen, // )
    // Tag, number, `null`, `true`, `false`
    Atom,
    // Back-quoted string, escapes already resolved
    Str,
    EOF,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: u64,
}

impl Token {
    pub fn new(kind: TokenKind, value: String, line: u64) -> Self {
        Self { kind, value, line }
    }

    fn new_open_paren(line: u64) -> Self {
        Self::new(TokenKind::OpenParen, "(".into(), line)
    }

    fn new_close_paren(line: u64) -> Self {
        Self::new(TokenKind::CloseParen, ")".into(), line)
    }

    fn new_eof(line: u64) -> Self {
        Self::new(TokenKind::EOF, "EOF".into(), line)
    }
}

fn is_skippable(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_atom_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '.')
}

#[derive(Default)]
pub struct Lexer {
    pub tokens: VecDeque<Token>,
}

impl Lexer {
    pub fn tokenize(&mut self, source_code: &str) -> Result<(), LexerError> {
        let mut chars = source_code.chars().peekable();

        // We keep the count of the current line
        let mut line: u64 = 0;

        self.tokens.clear();

        while let Some(c) = chars.next() {
            if is_skippable(c) {
                continue;
            }

            match c {
                '\n' => line += 1,
                '(' => self.tokens.push_back(Token::new_open_paren(line)),
                ')' => self.tokens.push_back(Token::new_close_paren(line)),
                '`' => {
                    let start = line;
                    let mut value = String::new();

                    loop {
                        match chars.next() {
                            Some('`') => break,
                            Some('\\') => {
                                let escaped = match chars.next() {
                                    Some('n') => '\n',
                                    Some('t') => '\t',
                                    Some('r') => '\r',
                                    Some('`') => '`',
                                    Some('\\') => '\\',
                                    Some(other) => {
                                        return Err(LexerError::UnknownEscape(other).context(line))
                                    }
                                    None => return Err(LexerError::UnterminatedString(start)),
                                };
                                value.push(escaped);
                            }
                            Some(other) => {
                                if other == '\n' {
                                    line += 1;
                                }
                                value.push(other);
                            }
                            None => return Err(LexerError::UnterminatedString(start)),
                        }
                    }

                    self.tokens.push_back(Token::new(TokenKind::Str, value, start));
                }
                _ if is_atom_char(c) => {
                    let mut value = c.to_string();

                    while let Some(&next) = chars.peek() {
                        if !is_atom_char(next) {
                            break;
                        }
                        value.push(next);
                        chars.next();
                    }

                    self.tokens.push_back(Token::new(TokenKind::Atom, value, line));
                }
                _ => return Err(LexerError::UnrecognizedToken(c).context(line)),
            }
        }

        self.tokens.push_back(Token::new_eof(line));

        Ok(())
    }
}

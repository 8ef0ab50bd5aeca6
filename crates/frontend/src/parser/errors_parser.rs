use colored::*;
use thiserror::*;

use super::{Token, TokenKind};
use tools::errors::ReportCodeErr;

#[derive(Error, Debug, PartialEq)]
pub enum ParserError {
    // Token
    #[error("expected token: -{0:?}-, token found: -{1:?}-")]
    FoundWrongToken(TokenKind, TokenKind),

    #[error("Tryed to use non existant token")]
    EmptyTokenBufferUsed,

    #[error("unexpected token -{}- at line {}", .0.value, .0.line + 1)]
    UnexpectedToken(Token),

    // Nodes
    #[error("unknown node tag: -{}-", .0.cyan())]
    UnknownTag(String),

    #[error("expected a node, found: {0}")]
    ExpectedNode(String),

    #[error("node -{}- expects {1} children, found {2}", .0.cyan())]
    WrongChildCount(String, usize, usize),

    #[error("in node -{}-: expected a parenthesised sequence, found: {1}", .0.cyan())]
    ExpectedSequence(String, String),

    #[error("in node -{}-: expected a back-quoted string, found: {1}", .0.cyan())]
    ExpectedString(String, String),

    #[error("in node -{}-: invalid literal: {1}", .0.cyan())]
    InvalidLiteral(String, String),

    #[error("in node -{}-: expected an identifier node", .0.cyan())]
    ExpectedIdentifier(String),

    #[error("statement -{}- can't be used as an expression", .0.cyan())]
    StatementAsExpression(String),
}

impl ReportCodeErr for ParserError {
    fn kind(&self) -> &'static str {
        "SyntaxError"
    }
}

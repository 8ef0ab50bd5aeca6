use std::collections::VecDeque;
use std::fmt::Display;

mod errors_parser;
mod expr_parser;
mod stmt_parser;

pub use crate::ast::{ASTNode, ASTNodeKind, ExpressionKind, StatementKind};
pub use crate::lexer::{Token, TokenKind};
pub use self::errors_parser::ParserError;

use tools::errors::{CodeErr, ReportCodeErr};


/// Untyped tree read from the prefix notation, before it becomes AST nodes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SExpr {
    Atom(String),
    Str(String),
    List(Vec<SExpr>),
}

impl Display for SExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SExpr::Atom(atom) => write!(f, "{}", atom),
            SExpr::Str(value) => write!(f, "{}", crate::dump::quote(value)),
            SExpr::List(items) => {
                let items = items.iter().map(|i| i.to_string()).collect::<Vec<String>>();
                write!(f, "({})", items.join(" "))
            }
        }
    }
}

impl SExpr {
    // Splits `(tag child ...)` into its tag and children
    pub(crate) fn tagged(&self) -> Result<(&str, &[SExpr]), ParserError> {
        match self {
            SExpr::List(items) => match items.split_first() {
                Some((SExpr::Atom(tag), children)) => Ok((tag.as_str(), children)),
                _ => Err(ParserError::ExpectedNode(self.to_string())),
            },
            _ => Err(ParserError::ExpectedNode(self.to_string())),
        }
    }

    pub(crate) fn sequence(&self, tag: &str) -> Result<&[SExpr], ParserError> {
        match self {
            SExpr::List(items) => Ok(items),
            _ => Err(ParserError::ExpectedSequence(tag.into(), self.to_string())),
        }
    }

    pub(crate) fn string(&self, tag: &str) -> Result<&str, ParserError> {
        match self {
            SExpr::Str(value) => Ok(value),
            _ => Err(ParserError::ExpectedString(tag.into(), self.to_string())),
        }
    }

    pub(crate) fn atom(&self, tag: &str) -> Result<&str, ParserError> {
        match self {
            SExpr::Atom(value) => Ok(value),
            _ => Err(ParserError::InvalidLiteral(tag.into(), self.to_string())),
        }
    }
}

pub(crate) fn check_children(tag: &str, children: &[SExpr], expected: usize) -> Result<(), ParserError> {
    if children.len() != expected {
        return Err(ParserError::WrongChildCount(tag.into(), expected, children.len()));
    }

    Ok(())
}


#[derive(Default)]
pub struct Parser {
    tokens: VecDeque<Token>,
    pub ast_nodes: Vec<ASTNode>,
}

impl Parser {
    pub fn build_ast(&mut self, tokens: VecDeque<Token>) -> Result<(), CodeErr> {
        self.ast_nodes.clear();
        self.tokens = tokens;

        while !self.is_eof() {
            let line = self.at().line;

            let form = self.parse_sexpr().map_err(|e| e.to_glob_err(line))?;
            let node = self.parse_node(&form).map_err(|e| e.to_glob_err(line))?;

            self.ast_nodes.push(ASTNode::new(node, line));
        }

        Ok(())
    }

    // A top-level form or body element: statement tags first, anything else
    // is an expression statement
    pub(crate) fn parse_node(&self, form: &SExpr) -> Result<ASTNodeKind, ParserError> {
        match self.parse_statement(form)? {
            Some(stmt) => Ok(ASTNodeKind::from(stmt)),
            None => Ok(ASTNodeKind::from(self.parse_expression(form)?)),
        }
    }

    pub(crate) fn parse_block(&self, tag: &str, form: &SExpr) -> Result<Vec<ASTNodeKind>, ParserError> {
        form.sequence(tag)?
            .iter()
            .map(|f| self.parse_node(f))
            .collect()
    }

    fn parse_sexpr(&mut self) -> Result<SExpr, ParserError> {
        let token = self.eat()?;

        match token.kind {
            TokenKind::Atom => Ok(SExpr::Atom(token.value)),
            TokenKind::Str => Ok(SExpr::Str(token.value)),
            TokenKind::OpenParen => {
                let mut items = vec![];

                while self.at().kind != TokenKind::CloseParen {
                    if self.is_eof() {
                        return Err(ParserError::FoundWrongToken(TokenKind::CloseParen, TokenKind::EOF));
                    }
                    items.push(self.parse_sexpr()?);
                }

                self.expect_token(TokenKind::CloseParen)?;

                Ok(SExpr::List(items))
            }
            TokenKind::CloseParen | TokenKind::EOF => Err(ParserError::UnexpectedToken(token)),
        }
    }

    // --------
    // Helpers
    // --------
    fn at(&self) -> &Token {
        // The lexer always ends the stream with EOF, which is never eaten
        &self.tokens[0]
    }

    fn eat(&mut self) -> Result<Token, ParserError> {
        if self.is_eof() {
            return Err(ParserError::EmptyTokenBufferUsed);
        }

        self.tokens.pop_front().ok_or(ParserError::EmptyTokenBufferUsed)
    }

    fn expect_token(&mut self, kind: TokenKind) -> Result<Token, ParserError> {
        let token = self.eat()?;

        if token.kind != kind {
            return Err(ParserError::FoundWrongToken(kind, token.kind));
        }

        Ok(token)
    }

    fn is_eof(&self) -> bool {
        self.tokens.is_empty() || self.tokens[0].kind == TokenKind::EOF
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ElifClause;
    use crate::lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(code: &str) -> Result<Vec<ASTNode>, CodeErr> {
        let mut lexer: Lexer = Default::default();
        lexer.tokenize(code).unwrap();

        let mut parser: Parser = Default::default();
        parser.build_ast(lexer.tokens)?;

        Ok(parser.ast_nodes)
    }

    #[test]
    fn parse_assignment() {
        let nodes = parse("(assign (identifier `a`) (int 5))").unwrap();

        assert_eq!(
            nodes,
            vec![ASTNode::new(
                StatementKind::Assign {
                    target: ExpressionKind::identifier("a"),
                    value: ExpressionKind::int(5),
                }
                .into(),
                0
            )]
        );
    }

    #[test]
    fn parse_lines_of_top_level_forms() {
        let nodes = parse("(pass)\n\n(call (primary (identifier `f`)) ())").unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].line, 2);
        assert_eq!(
            nodes[1].node,
            ASTNodeKind::Expression(ExpressionKind::call(ExpressionKind::name("f"), vec![]))
        );
    }

    #[test]
    fn parse_if_with_elifs() {
        let code = "(if (truth (primary (identifier `a`))) ((pass)) \
                    ((elif (bool false) ((break)))) ((continue)))";
        let nodes = parse(code).unwrap();

        assert_eq!(
            nodes[0].node,
            ASTNodeKind::Statement(StatementKind::If {
                condition: ExpressionKind::truth(ExpressionKind::name("a")),
                body: vec![StatementKind::Pass.into()],
                elifs: vec![ElifClause {
                    condition: ExpressionKind::BoolLiteral { value: false },
                    body: vec![StatementKind::Break.into()],
                }],
                else_body: vec![StatementKind::Continue.into()],
            })
        );
    }

    #[test]
    fn parse_def_and_class() {
        let code = "(class `Point` ((primary (identifier `object`))) \
                    ((def `get` (`self`) ((return null)))))";
        let nodes = parse(code).unwrap();

        assert_eq!(
            nodes[0].node,
            ASTNodeKind::Statement(StatementKind::Class {
                name: "Point".into(),
                bases: vec![ExpressionKind::name("object")],
                body: vec![StatementKind::Def {
                    name: "get".into(),
                    params: vec!["self".into()],
                    body: vec![StatementKind::Return { value: None }.into()],
                }
                .into()],
            })
        );
    }

    #[test]
    fn parse_containers() {
        let code = "(dict (((str `a`) (int 1)) ((NoneType) (set ((float 1.5))))))";
        let nodes = parse(code).unwrap();

        assert_eq!(
            nodes[0].node,
            ASTNodeKind::Expression(ExpressionKind::DictLiteral {
                entries: vec![
                    (ExpressionKind::str("a"), ExpressionKind::int(1)),
                    (
                        ExpressionKind::NoneLiteral,
                        ExpressionKind::SetLiteral {
                            values: vec![ExpressionKind::FloatLiteral { value: 1.5 }]
                        }
                    ),
                ]
            })
        );
    }

    #[test]
    fn read_back_dump() {
        let code = "(for (identifier `i`) (list ((int 1) (int -2))) \
                    ((del (subscription (primary (identifier `d`)) (str `k\\n`)))) ((pass)))\n\
                    (assign (attributeref (primary (identifier `p`)) (identifier `x`)) \
                    (conditional (is (NoneType) (NoneType)) (float 1e-7) (not (or (bool true) (and (int 1) (int 0))))))\n\
                    (while (bool false) () ())";
        let nodes = parse(code).unwrap();

        assert_eq!(crate::dump::dump_program(&nodes), code);
    }

    #[test]
    fn unknown_tag() {
        let err = parse("(lambda `x`)").unwrap_err();

        assert_eq!(err.kind(), "SyntaxError");
        assert_eq!(err.line(), 0);
    }

    #[test]
    fn wrong_child_count() {
        assert!(parse("(assign (identifier `a`))").is_err());
        assert!(parse("(int 1 2)").is_err());
    }

    #[test]
    fn unclosed_form() {
        assert!(parse("(pass").is_err());
        assert!(parse(")").is_err());
    }
}

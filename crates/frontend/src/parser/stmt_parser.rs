use super::{check_children, Parser, ParserError, SExpr, StatementKind};
use crate::ast::ElifClause;

pub(crate) const STATEMENT_TAGS: [&str; 11] = [
    "assign", "pass", "del", "return", "break", "continue", "def", "class", "for", "while", "if",
];

impl Parser {
    // Returns None when the form is not a statement, so it is read as an expression
    pub(crate) fn parse_statement(&self, form: &SExpr) -> Result<Option<StatementKind>, ParserError> {
        let (tag, children) = form.tagged()?;

        let stmt = match tag {
            "assign" => {
                check_children(tag, children, 2)?;

                StatementKind::Assign {
                    target: self.parse_expression(&children[0])?,
                    value: self.parse_expression(&children[1])?,
                }
            }
            "pass" => {
                check_children(tag, children, 0)?;
                StatementKind::Pass
            }
            "del" => {
                check_children(tag, children, 1)?;

                StatementKind::Del {
                    target: self.parse_expression(&children[0])?,
                }
            }
            "return" => {
                check_children(tag, children, 1)?;

                let value = match &children[0] {
                    SExpr::Atom(atom) if atom == "null" => None,
                    expr => Some(self.parse_expression(expr)?),
                };

                StatementKind::Return { value }
            }
            "break" => {
                check_children(tag, children, 0)?;
                StatementKind::Break
            }
            "continue" => {
                check_children(tag, children, 0)?;
                StatementKind::Continue
            }
            "def" => {
                check_children(tag, children, 3)?;

                let params = children[1]
                    .sequence(tag)?
                    .iter()
                    .map(|p| p.string(tag).map(String::from))
                    .collect::<Result<Vec<String>, ParserError>>()?;

                StatementKind::Def {
                    name: children[0].string(tag)?.into(),
                    params,
                    body: self.parse_block(tag, &children[2])?,
                }
            }
            "class" => {
                check_children(tag, children, 3)?;

                let bases = children[1]
                    .sequence(tag)?
                    .iter()
                    .map(|b| self.parse_expression(b))
                    .collect::<Result<Vec<_>, ParserError>>()?;

                StatementKind::Class {
                    name: children[0].string(tag)?.into(),
                    bases,
                    body: self.parse_block(tag, &children[2])?,
                }
            }
            "for" => {
                check_children(tag, children, 4)?;

                StatementKind::For {
                    target: self.parse_expression(&children[0])?,
                    iterable: self.parse_expression(&children[1])?,
                    body: self.parse_block(tag, &children[2])?,
                    else_body: self.parse_block(tag, &children[3])?,
                }
            }
            "while" => {
                check_children(tag, children, 3)?;

                StatementKind::While {
                    condition: self.parse_expression(&children[0])?,
                    body: self.parse_block(tag, &children[1])?,
                    else_body: self.parse_block(tag, &children[2])?,
                }
            }
            "if" => {
                check_children(tag, children, 4)?;

                let elifs = children[2]
                    .sequence(tag)?
                    .iter()
                    .map(|e| self.parse_elif(e))
                    .collect::<Result<Vec<ElifClause>, ParserError>>()?;

                StatementKind::If {
                    condition: self.parse_expression(&children[0])?,
                    body: self.parse_block(tag, &children[1])?,
                    elifs,
                    else_body: self.parse_block(tag, &children[3])?,
                }
            }
            _ => return Ok(None),
        };

        Ok(Some(stmt))
    }

    fn parse_elif(&self, form: &SExpr) -> Result<ElifClause, ParserError> {
        let (tag, children) = form.tagged()?;

        if tag != "elif" {
            return Err(ParserError::UnknownTag(tag.into()));
        }
        check_children(tag, children, 2)?;

        Ok(ElifClause {
            condition: self.parse_expression(&children[0])?,
            body: self.parse_block(tag, &children[1])?,
        })
    }
}

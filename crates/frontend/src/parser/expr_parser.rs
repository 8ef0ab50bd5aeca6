use super::stmt_parser::STATEMENT_TAGS;
use super::{check_children, ExpressionKind, Parser, ParserError, SExpr};

impl Parser {
    pub(crate) fn parse_expression(&self, form: &SExpr) -> Result<ExpressionKind, ParserError> {
        let (tag, children) = form.tagged()?;

        let expr = match tag {
            "identifier" => {
                check_children(tag, children, 1)?;
                ExpressionKind::Identifier {
                    symbol: children[0].string(tag)?.into(),
                }
            }
            "primary" => {
                check_children(tag, children, 1)?;
                ExpressionKind::Primary {
                    location: Box::new(self.parse_expression(&children[0])?),
                }
            }
            "int" => {
                check_children(tag, children, 1)?;
                let atom = children[0].atom(tag)?;

                ExpressionKind::IntLiteral {
                    value: atom
                        .parse::<i64>()
                        .map_err(|_| ParserError::InvalidLiteral(tag.into(), atom.into()))?,
                }
            }
            "float" => {
                check_children(tag, children, 1)?;
                let atom = children[0].atom(tag)?;

                ExpressionKind::FloatLiteral {
                    value: atom
                        .parse::<f64>()
                        .map_err(|_| ParserError::InvalidLiteral(tag.into(), atom.into()))?,
                }
            }
            "bool" => {
                check_children(tag, children, 1)?;

                let value = match children[0].atom(tag)? {
                    "true" => true,
                    "false" => false,
                    other => return Err(ParserError::InvalidLiteral(tag.into(), other.into())),
                };

                ExpressionKind::BoolLiteral { value }
            }
            "str" => {
                check_children(tag, children, 1)?;
                ExpressionKind::StrLiteral {
                    value: children[0].string(tag)?.into(),
                }
            }
            "NoneType" => {
                check_children(tag, children, 0)?;
                ExpressionKind::NoneLiteral
            }
            "list" => {
                check_children(tag, children, 1)?;
                ExpressionKind::ListLiteral {
                    values: self.parse_expressions(tag, &children[0])?,
                }
            }
            "set" => {
                check_children(tag, children, 1)?;
                ExpressionKind::SetLiteral {
                    values: self.parse_expressions(tag, &children[0])?,
                }
            }
            "dict" => {
                check_children(tag, children, 1)?;

                let mut entries = vec![];
                for pair in children[0].sequence(tag)? {
                    let pair = pair.sequence(tag)?;
                    check_children(tag, pair, 2)?;

                    entries.push((self.parse_expression(&pair[0])?, self.parse_expression(&pair[1])?));
                }

                ExpressionKind::DictLiteral { entries }
            }
            "attributeref" => {
                check_children(tag, children, 2)?;

                let attribute = match self.parse_expression(&children[1])? {
                    ExpressionKind::Identifier { symbol } => symbol,
                    _ => return Err(ParserError::ExpectedIdentifier(tag.into())),
                };

                ExpressionKind::AttributeRef {
                    member: Box::new(self.parse_expression(&children[0])?),
                    attribute,
                }
            }
            "subscription" => {
                check_children(tag, children, 2)?;
                ExpressionKind::Subscription {
                    member: Box::new(self.parse_expression(&children[0])?),
                    key: Box::new(self.parse_expression(&children[1])?),
                }
            }
            "call" => {
                check_children(tag, children, 2)?;
                ExpressionKind::Call {
                    caller: Box::new(self.parse_expression(&children[0])?),
                    args: self.parse_expressions(tag, &children[1])?,
                }
            }
            "truth" => {
                check_children(tag, children, 1)?;
                ExpressionKind::Truth {
                    operand: Box::new(self.parse_expression(&children[0])?),
                }
            }
            "not" => {
                check_children(tag, children, 1)?;
                ExpressionKind::Not {
                    operand: Box::new(self.parse_expression(&children[0])?),
                }
            }
            "conditional" => {
                check_children(tag, children, 3)?;
                ExpressionKind::Conditional {
                    condition: Box::new(self.parse_expression(&children[0])?),
                    then: Box::new(self.parse_expression(&children[1])?),
                    otherwise: Box::new(self.parse_expression(&children[2])?),
                }
            }
            "and" | "or" | "is" => {
                check_children(tag, children, 2)?;
                let left = Box::new(self.parse_expression(&children[0])?);
                let right = Box::new(self.parse_expression(&children[1])?);

                match tag {
                    "and" => ExpressionKind::And { left, right },
                    "or" => ExpressionKind::Or { left, right },
                    _ => ExpressionKind::Is { left, right },
                }
            }
            _ if STATEMENT_TAGS.contains(&tag) => {
                return Err(ParserError::StatementAsExpression(tag.into()))
            }
            _ => return Err(ParserError::UnknownTag(tag.into())),
        };

        Ok(expr)
    }

    fn parse_expressions(&self, tag: &str, form: &SExpr) -> Result<Vec<ExpressionKind>, ParserError> {
        form.sequence(tag)?
            .iter()
            .map(|f| self.parse_expression(f))
            .collect()
    }
}

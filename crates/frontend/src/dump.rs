//! Prefix-notation serialization of the AST.
//!
//! Every node prints as `(tag child ...)`. Strings are back-quoted, ordered
//! child sequences print as an untagged parenthesised list (`()` when empty)
//! and an absent value prints as `null`. Each top-level statement takes one
//! line, so the output can be read back by [`crate::parser::Parser`].

use std::fmt::{Display, Formatter, Result};

use crate::ast::{ASTNode, ASTNodeKind, ElifClause, ExpressionKind, StatementKind};

pub fn dump_program(nodes: &[ASTNode]) -> String {
    nodes
        .iter()
        .map(|n| n.node.to_string())
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('`');

    for c in value.chars() {
        match c {
            '`' => quoted.push_str("\\`"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }

    quoted.push('`');
    quoted
}

fn write_seq<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> Result {
    write!(f, "(")?;

    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
    }

    write!(f, ")")
}

impl Display for ASTNodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ASTNodeKind::Statement(stmt) => write!(f, "{}", stmt),
            ASTNodeKind::Expression(expr) => write!(f, "{}", expr),
        }
    }
}

impl Display for ElifClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "(elif {} ", self.condition)?;
        write_seq(f, &self.body)?;
        write!(f, ")")
    }
}

impl Display for StatementKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            StatementKind::Assign { target, value } => write!(f, "(assign {} {})", target, value),
            StatementKind::Pass => write!(f, "(pass)"),
            StatementKind::Del { target } => write!(f, "(del {})", target),
            StatementKind::Return { value: Some(value) } => write!(f, "(return {})", value),
            StatementKind::Return { value: None } => write!(f, "(return null)"),
            StatementKind::Break => write!(f, "(break)"),
            StatementKind::Continue => write!(f, "(continue)"),
            StatementKind::Def { name, params, body } => {
                let params = params.iter().map(|p| quote(p)).collect::<Vec<String>>();

                write!(f, "(def {} ", quote(name))?;
                write_seq(f, &params)?;
                write!(f, " ")?;
                write_seq(f, body)?;
                write!(f, ")")
            }
            StatementKind::Class { name, bases, body } => {
                write!(f, "(class {} ", quote(name))?;
                write_seq(f, bases)?;
                write!(f, " ")?;
                write_seq(f, body)?;
                write!(f, ")")
            }
            StatementKind::For {
                target,
                iterable,
                body,
                else_body,
            } => {
                write!(f, "(for {} {} ", target, iterable)?;
                write_seq(f, body)?;
                write!(f, " ")?;
                write_seq(f, else_body)?;
                write!(f, ")")
            }
            StatementKind::While {
                condition,
                body,
                else_body,
            } => {
                write!(f, "(while {} ", condition)?;
                write_seq(f, body)?;
                write!(f, " ")?;
                write_seq(f, else_body)?;
                write!(f, ")")
            }
            StatementKind::If {
                condition,
                body,
                elifs,
                else_body,
            } => {
                write!(f, "(if {} ", condition)?;
                write_seq(f, body)?;
                write!(f, " ")?;
                write_seq(f, elifs)?;
                write!(f, " ")?;
                write_seq(f, else_body)?;
                write!(f, ")")
            }
        }
    }
}

impl Display for ExpressionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ExpressionKind::Identifier { symbol } => write!(f, "(identifier {})", quote(symbol)),
            ExpressionKind::Primary { location } => write!(f, "(primary {})", location),
            ExpressionKind::IntLiteral { value } => write!(f, "(int {})", value),
            // Debug keeps a decimal point or exponent so the atom reads back as a float
            ExpressionKind::FloatLiteral { value } => write!(f, "(float {:?})", value),
            ExpressionKind::BoolLiteral { value } => write!(f, "(bool {})", value),
            ExpressionKind::StrLiteral { value } => write!(f, "(str {})", quote(value)),
            ExpressionKind::NoneLiteral => write!(f, "(NoneType)"),
            ExpressionKind::ListLiteral { values } => {
                write!(f, "(list ")?;
                write_seq(f, values)?;
                write!(f, ")")
            }
            ExpressionKind::DictLiteral { entries } => {
                let pairs = entries
                    .iter()
                    .map(|(k, v)| format!("({} {})", k, v))
                    .collect::<Vec<String>>();

                write!(f, "(dict ")?;
                write_seq(f, &pairs)?;
                write!(f, ")")
            }
            ExpressionKind::SetLiteral { values } => {
                write!(f, "(set ")?;
                write_seq(f, values)?;
                write!(f, ")")
            }
            ExpressionKind::AttributeRef { member, attribute } => {
                write!(f, "(attributeref {} (identifier {}))", member, quote(attribute))
            }
            ExpressionKind::Subscription { member, key } => {
                write!(f, "(subscription {} {})", member, key)
            }
            ExpressionKind::Call { caller, args } => {
                write!(f, "(call {} ", caller)?;
                write_seq(f, args)?;
                write!(f, ")")
            }
            ExpressionKind::Truth { operand } => write!(f, "(truth {})", operand),
            ExpressionKind::Conditional {
                condition,
                then,
                otherwise,
            } => write!(f, "(conditional {} {} {})", condition, then, otherwise),
            ExpressionKind::Not { operand } => write!(f, "(not {})", operand),
            ExpressionKind::And { left, right } => write!(f, "(and {} {})", left, right),
            ExpressionKind::Or { left, right } => write!(f, "(or {} {})", left, right),
            ExpressionKind::Is { left, right } => write!(f, "(is {} {})", left, right),
        }
    }
}

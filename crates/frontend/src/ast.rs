/// A top-level statement together with the line it was read from.
#[derive(Debug, PartialEq, Clone)]
pub struct ASTNode {
    pub node: ASTNodeKind,
    pub line: u64,
}

impl ASTNode {
    pub fn new(node: ASTNodeKind, line: u64) -> Self {
        Self { node, line }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ASTNodeKind {
    Statement(StatementKind),
    Expression(ExpressionKind),
}

impl From<ExpressionKind> for ASTNodeKind {
    fn from(value: ExpressionKind) -> Self {
        ASTNodeKind::Expression(value)
    }
}

impl From<StatementKind> for ASTNodeKind {
    fn from(value: StatementKind) -> Self {
        ASTNodeKind::Statement(value)
    }
}

/// Ordered sequence of statements: module, function, class or loop body.
pub type Block = Vec<ASTNodeKind>;

#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    Assign {
        target: ExpressionKind,
        value: ExpressionKind,
    },
    Pass,
    Del {
        target: ExpressionKind,
    },
    // A bare `return` carries no value and yields None
    Return {
        value: Option<ExpressionKind>,
    },
    Break,
    Continue,
    Def {
        name: String,
        params: Vec<String>,
        body: Block,
    },
    Class {
        name: String,
        bases: Vec<ExpressionKind>,
        body: Block,
    },
    For {
        target: ExpressionKind,
        iterable: ExpressionKind,
        body: Block,
        else_body: Block,
    },
    While {
        condition: ExpressionKind,
        body: Block,
        else_body: Block,
    },
    If {
        condition: ExpressionKind,
        body: Block,
        elifs: Vec<ElifClause>,
        else_body: Block,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct ElifClause {
    pub condition: ExpressionKind,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionKind {
    Identifier {
        symbol: String,
    },
    // Dereferences an assignable expression (identifier, attribute, subscription)
    Primary {
        location: Box<ExpressionKind>,
    },
    IntLiteral {
        value: i64,
    },
    FloatLiteral {
        value: f64,
    },
    BoolLiteral {
        value: bool,
    },
    StrLiteral {
        value: String,
    },
    NoneLiteral,
    ListLiteral {
        values: Vec<ExpressionKind>,
    },
    DictLiteral {
        entries: Vec<(ExpressionKind, ExpressionKind)>,
    },
    SetLiteral {
        values: Vec<ExpressionKind>,
    },
    AttributeRef {
        member: Box<ExpressionKind>,
        attribute: String,
    },
    Subscription {
        member: Box<ExpressionKind>,
        key: Box<ExpressionKind>,
    },
    // Operators reach the evaluator already rewritten as special method calls:
    // `a + b` is a call of `a.__add__` with `b` as argument
    Call {
        caller: Box<ExpressionKind>,
        args: Vec<ExpressionKind>,
    },
    Truth {
        operand: Box<ExpressionKind>,
    },
    Conditional {
        condition: Box<ExpressionKind>,
        then: Box<ExpressionKind>,
        otherwise: Box<ExpressionKind>,
    },
    Not {
        operand: Box<ExpressionKind>,
    },
    And {
        left: Box<ExpressionKind>,
        right: Box<ExpressionKind>,
    },
    Or {
        left: Box<ExpressionKind>,
        right: Box<ExpressionKind>,
    },
    Is {
        left: Box<ExpressionKind>,
        right: Box<ExpressionKind>,
    },
}

// Small constructors used to assemble trees by hand (self-hosted builtins, tests)
impl ExpressionKind {
    pub fn identifier(symbol: &str) -> Self {
        ExpressionKind::Identifier {
            symbol: symbol.into(),
        }
    }

    /// Value of a name: `primary(identifier)`.
    pub fn name(symbol: &str) -> Self {
        ExpressionKind::Primary {
            location: Box::new(Self::identifier(symbol)),
        }
    }

    pub fn int(value: i64) -> Self {
        ExpressionKind::IntLiteral { value }
    }

    pub fn str(value: &str) -> Self {
        ExpressionKind::StrLiteral {
            value: value.into(),
        }
    }

    /// Value of an attribute: `primary(attributeref(member, identifier))`.
    pub fn attribute(member: ExpressionKind, attribute: &str) -> Self {
        ExpressionKind::Primary {
            location: Box::new(ExpressionKind::AttributeRef {
                member: Box::new(member),
                attribute: attribute.into(),
            }),
        }
    }

    pub fn call(caller: ExpressionKind, args: Vec<ExpressionKind>) -> Self {
        ExpressionKind::Call {
            caller: Box::new(caller),
            args,
        }
    }

    /// `member.method(args)`, the shape every operator is rewritten to.
    pub fn method_call(member: ExpressionKind, method: &str, args: Vec<ExpressionKind>) -> Self {
        Self::call(Self::attribute(member, method), args)
    }

    pub fn truth(operand: ExpressionKind) -> Self {
        ExpressionKind::Truth {
            operand: Box::new(operand),
        }
    }

    pub fn not(operand: ExpressionKind) -> Self {
        ExpressionKind::Not {
            operand: Box::new(operand),
        }
    }

    /// Strips `primary` wrappers to get at the assignable expression beneath.
    pub fn as_location(&self) -> Option<&ExpressionKind> {
        match self {
            ExpressionKind::Primary { location } => location.as_location(),
            ExpressionKind::Identifier { .. }
            | ExpressionKind::AttributeRef { .. }
            | ExpressionKind::Subscription { .. } => Some(self),
            _ => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_call_shape() {
        let expr = ExpressionKind::method_call(ExpressionKind::name("x"), "__add__", vec![ExpressionKind::int(1)]);

        assert_eq!(
            expr,
            ExpressionKind::Call {
                caller: Box::new(ExpressionKind::Primary {
                    location: Box::new(ExpressionKind::AttributeRef {
                        member: Box::new(ExpressionKind::Primary {
                            location: Box::new(ExpressionKind::Identifier { symbol: "x".into() }),
                        }),
                        attribute: "__add__".into(),
                    }),
                }),
                args: vec![ExpressionKind::IntLiteral { value: 1 }],
            }
        );
    }

    #[test]
    fn as_location_peels_primary() {
        let name = ExpressionKind::name("planet");
        assert_eq!(name.as_location(), Some(&ExpressionKind::identifier("planet")));

        let attr = ExpressionKind::attribute(ExpressionKind::name("planet"), "mass");
        assert!(matches!(attr.as_location(), Some(ExpressionKind::AttributeRef { .. })));

        assert_eq!(ExpressionKind::int(4).as_location(), None);
    }
}

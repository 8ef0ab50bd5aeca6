//! Builtins written as statement trees and run by the evaluator itself. They
//! only reach values through special methods and calls, so user classes defining those methods
//! work with them unchanged.

use frontend::ast::{ASTNodeKind, Block, ExpressionKind, StatementKind};

use crate::values::RuntimeVal;

pub(crate) fn definitions() -> Vec<(&'static str, RuntimeVal)> {
    vec![
        (
            "pow",
            RuntimeVal::new_function(
                "pow",
                &["x", "y"],
                vec![ret(ExpressionKind::method_call(
                    ExpressionKind::name("x"),
                    "__pow__",
                    vec![ExpressionKind::name("y")],
                ))],
            ),
        ),
        (
            "bool",
            RuntimeVal::new_function("bool", &["x"], vec![ret(ExpressionKind::truth(ExpressionKind::name("x")))]),
        ),
        (
            "all",
            RuntimeVal::new_function(
                "all",
                &["iterable"],
                vec![
                    for_each(vec![when(
                        ExpressionKind::not(ExpressionKind::truth(ExpressionKind::name("item"))),
                        vec![ret(boolean(false))],
                    )]),
                    ret(boolean(true)),
                ],
            ),
        ),
        (
            "any",
            RuntimeVal::new_function(
                "any",
                &["iterable"],
                vec![
                    for_each(vec![when(
                        ExpressionKind::truth(ExpressionKind::name("item")),
                        vec![ret(boolean(true))],
                    )]),
                    ret(boolean(false)),
                ],
            ),
        ),
        (
            "filter",
            RuntimeVal::new_function(
                "filter",
                &["func", "iterable"],
                vec![
                    assign("result", ExpressionKind::ListLiteral { values: vec![] }),
                    for_each(vec![when(
                        ExpressionKind::truth(apply_func()),
                        vec![append_to_result(ExpressionKind::name("item"))],
                    )]),
                    ret(ExpressionKind::name("result")),
                ],
            ),
        ),
        (
            "map",
            RuntimeVal::new_function(
                "map",
                &["func", "iterable"],
                vec![
                    assign("result", ExpressionKind::ListLiteral { values: vec![] }),
                    for_each(vec![append_to_result(apply_func())]),
                    ret(ExpressionKind::name("result")),
                ],
            ),
        ),
        // Accumulates through `__iadd__`, which rebinds `result` for numbers
        (
            "sum",
            RuntimeVal::new_function(
                "sum",
                &["iterable"],
                vec![
                    assign("result", ExpressionKind::int(0)),
                    for_each(vec![ExpressionKind::method_call(
                        ExpressionKind::name("result"),
                        "__iadd__",
                        vec![ExpressionKind::name("item")],
                    )
                    .into()]),
                    ret(ExpressionKind::name("result")),
                ],
            ),
        ),
    ]
}

fn ret(value: ExpressionKind) -> ASTNodeKind {
    StatementKind::Return { value: Some(value) }.into()
}

fn boolean(value: bool) -> ExpressionKind {
    ExpressionKind::BoolLiteral { value }
}

fn assign(name: &str, value: ExpressionKind) -> ASTNodeKind {
    StatementKind::Assign {
        target: ExpressionKind::identifier(name),
        value,
    }
    .into()
}

// `for item in iterable: body`
fn for_each(body: Block) -> ASTNodeKind {
    StatementKind::For {
        target: ExpressionKind::identifier("item"),
        iterable: ExpressionKind::name("iterable"),
        body,
        else_body: vec![],
    }
    .into()
}

fn when(condition: ExpressionKind, body: Block) -> ASTNodeKind {
    StatementKind::If {
        condition,
        body,
        elifs: vec![],
        else_body: vec![],
    }
    .into()
}

// `func(item)`
fn apply_func() -> ExpressionKind {
    ExpressionKind::call(ExpressionKind::name("func"), vec![ExpressionKind::name("item")])
}

fn append_to_result(value: ExpressionKind) -> ASTNodeKind {
    ExpressionKind::method_call(ExpressionKind::name("result"), "append", vec![value]).into()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_definition_is_a_function() {
        for (name, value) in definitions() {
            match value {
                RuntimeVal::Function(func) => {
                    assert_eq!(func.name, name);
                    assert!(func.receiver.is_none());
                    assert!(!func.body.is_empty());
                }
                other => panic!("{} is not a function: {:?}", name, other),
            }
        }
    }
}

use pretty_assertions::assert_eq;

use super::*;
use frontend::ast::{ExpressionKind as E, StatementKind as S};
use frontend::read_program;

// --------
// Helpers
// --------

fn program(nodes: Vec<ASTNodeKind>) -> Vec<ASTNode> {
    nodes
        .into_iter()
        .enumerate()
        .map(|(line, node)| ASTNode::new(node, line as u64))
        .collect()
}

fn run(nodes: Vec<ASTNodeKind>) -> (String, Result<(), CodeErr>) {
    let mut interp = Interpreter::new();
    let res = interp.interpret(&program(nodes));

    (interp.output().to_string(), res)
}

fn output_of(nodes: Vec<ASTNodeKind>) -> String {
    let (out, res) = run(nodes);
    assert_eq!(res, Ok(()));

    out
}

fn fault_of(nodes: Vec<ASTNodeKind>) -> CodeErr {
    match run(nodes).1 {
        Err(e) => e,
        Ok(()) => panic!("program ran without fault"),
    }
}

fn int(value: i64) -> E {
    E::int(value)
}

fn name(symbol: &str) -> E {
    E::name(symbol)
}

fn op(lhs: E, method: &str, rhs: E) -> E {
    E::method_call(lhs, method, vec![rhs])
}

fn print(args: Vec<E>) -> ASTNodeKind {
    E::call(name("print"), args).into()
}

fn assign(target: &str, value: E) -> ASTNodeKind {
    S::Assign {
        target: E::identifier(target),
        value,
    }
    .into()
}

fn def(fn_name: &str, params: &[&str], body: Vec<ASTNodeKind>) -> ASTNodeKind {
    S::Def {
        name: fn_name.into(),
        params: params.iter().map(|p| p.to_string()).collect(),
        body,
    }
    .into()
}

fn class(class_name: &str, bases: Vec<E>, body: Vec<ASTNodeKind>) -> ASTNodeKind {
    S::Class {
        name: class_name.into(),
        bases,
        body,
    }
    .into()
}

fn ret(value: E) -> ASTNodeKind {
    S::Return { value: Some(value) }.into()
}

fn list(values: Vec<E>) -> E {
    E::ListLiteral { values }
}

fn bool_lit(value: bool) -> E {
    E::BoolLiteral { value }
}

// ----------
//  Tests
// ----------

#[test]
fn arithmetic_precedence() {
    // 1 + 2 * (3 + 4) % 5 - 6
    let expr = op(
        op(
            int(1),
            "__add__",
            op(op(int(2), "__mul__", op(int(3), "__add__", int(4))), "__mod__", int(5)),
        ),
        "__sub__",
        int(6),
    );

    assert_eq!(output_of(vec![print(vec![expr])]), "-1\n");
}

#[test]
fn power_is_right_associative() {
    let expr = op(int(2), "__pow__", op(int(3), "__pow__", int(3)));

    assert_eq!(output_of(vec![print(vec![expr])]), "134217728\n");
}

#[test]
fn bitwise_composition() {
    // 0x12 << 24 | 0b00110100 << 16 | 0o2547 << 4 | 8
    let shifted = |value: i64, shift: i64| op(int(value), "__lshift__", int(shift));
    let expr = op(
        op(op(shifted(0x12, 24), "__or__", shifted(0b00110100, 16)), "__or__", shifted(0o2547, 4)),
        "__or__",
        int(8),
    );

    assert_eq!(output_of(vec![print(vec![expr])]), "305419896\n");
}

#[test]
fn division_kinds() {
    let out = output_of(vec![
        print(vec![op(int(7), "__truediv__", int(2))]),
        print(vec![op(int(-7), "__floordiv__", int(2))]),
        print(vec![op(int(-7), "__mod__", int(2))]),
    ]);

    assert_eq!(out, "3.5\n-4\n1\n");

    let err = fault_of(vec![print(vec![op(int(1), "__truediv__", int(0))])]);
    assert_eq!(err.kind(), "ZeroDivisionError");
    assert_eq!(err.message(), "division by zero");
}

#[test]
fn logic_returns_operands() {
    let out = output_of(vec![
        print(vec![E::Or {
            left: Box::new(int(0)),
            right: Box::new(E::str("fallback")),
        }]),
        print(vec![E::And {
            left: Box::new(list(vec![])),
            right: Box::new(int(3)),
        }]),
        // not (1 < 2 and 3 >= 4 or 5 != 5)
        print(vec![E::not(E::Or {
            left: Box::new(E::And {
                left: Box::new(op(int(1), "__lt__", int(2))),
                right: Box::new(op(int(3), "__ge__", int(4))),
            }),
            right: Box::new(op(int(5), "__ne__", int(5))),
        })]),
    ]);

    assert_eq!(out, "fallback\n[]\nTrue\n");
}

#[test]
fn short_circuit_skips_right_operand() {
    let out = output_of(vec![
        def("loud", &[], vec![print(vec![E::str("called")]), ret(bool_lit(true))]),
        assign(
            "x",
            E::And {
                left: Box::new(bool_lit(false)),
                right: Box::new(E::call(name("loud"), vec![])),
            },
        ),
        assign(
            "y",
            E::Or {
                left: Box::new(bool_lit(true)),
                right: Box::new(E::call(name("loud"), vec![])),
            },
        ),
        print(vec![name("x"), name("y")]),
    ]);

    assert_eq!(out, "False True\n");
}

#[test]
fn list_round_trip() {
    let item = |index: i64| E::Subscription {
        member: Box::new(name("x")),
        key: Box::new(int(index)),
    };
    let values = [5, 4, 3, 2, 1].iter().map(|v| int(*v)).collect();

    let out = output_of(vec![
        assign("x", list(values)),
        S::Assign {
            target: item(4),
            value: int(10),
        }
        .into(),
        S::Del { target: item(1) }.into(),
        E::method_call(name("x"), "append", vec![int(6)]).into(),
        print(vec![name("x")]),
        E::method_call(name("x"), "sort", vec![]).into(),
        E::method_call(name("x"), "reverse", vec![]).into(),
        print(vec![name("x")]),
        print(vec![op(name("x"), "__contains__", int(10))]),
        print(vec![E::call(name("len"), vec![name("x")])]),
    ]);

    assert_eq!(out, "[5, 3, 2, 1, 10, 6]\n[10, 6, 5, 3, 2, 1]\nTrue\n6\n");
}

#[test]
fn list_aliasing_shares_mutation() {
    let out = output_of(vec![
        assign("a", list(vec![int(1)])),
        assign("b", name("a")),
        E::method_call(name("b"), "append", vec![int(2)]).into(),
        print(vec![name("a"), E::Is {
            left: Box::new(name("a")),
            right: Box::new(name("b")),
        }]),
    ]);

    assert_eq!(out, "[1, 2] True\n");
}

#[test]
fn unhashable_dict_key() {
    let err = fault_of(vec![assign(
        "d",
        E::DictLiteral {
            entries: vec![(list(vec![int(1)]), int(2))],
        },
    )]);

    assert_eq!(err.kind(), "TypeError");
    assert_eq!(err.message(), "unhashable type: 'list'");
}

#[test]
fn dict_subscription_and_missing_key() {
    let sub = |key: E| E::Subscription {
        member: Box::new(name("d")),
        key: Box::new(key),
    };

    let out = output_of(vec![
        assign(
            "d",
            E::DictLiteral {
                entries: vec![(E::str("a"), int(1))],
            },
        ),
        S::Assign {
            target: sub(E::str("b")),
            value: int(2),
        }
        .into(),
        print(vec![name("d"), E::Primary {
            location: Box::new(sub(E::str("b"))),
        }]),
    ]);
    assert_eq!(out, "{'a': 1, 'b': 2} 2\n");

    let err = fault_of(vec![
        assign("d", E::DictLiteral { entries: vec![] }),
        print(vec![E::Primary {
            location: Box::new(sub(E::str("zz"))),
        }]),
    ]);
    assert_eq!(err.kind(), "KeyError");
    assert_eq!(err.message(), "'zz'");
    assert_eq!(err.line(), 1);
}

#[test]
fn subscription_on_int() {
    let err = fault_of(vec![print(vec![E::Subscription {
        member: Box::new(int(3)),
        key: Box::new(int(0)),
    }])]);

    assert_eq!(err.kind(), "TypeError");
    assert_eq!(err.message(), "'int' object is not subscriptable");
}

#[test]
fn method_inheritance_and_override() {
    let out = output_of(vec![
        class(
            "Animal",
            vec![],
            vec![
                def("speak", &["self"], vec![ret(E::str("..."))]),
                def("name", &["self"], vec![ret(E::str("animal"))]),
            ],
        ),
        class("Dog", vec![name("Animal")], vec![def("speak", &["self"], vec![ret(E::str("woof"))])]),
        assign("d", E::call(name("Dog"), vec![])),
        assign("a", E::call(name("Animal"), vec![])),
        print(vec![
            E::method_call(name("d"), "speak", vec![]),
            E::method_call(name("d"), "name", vec![]),
        ]),
        print(vec![
            E::method_call(name("a"), "speak", vec![]),
            E::method_call(name("a"), "name", vec![]),
        ]),
        print(vec![E::call(name("type"), vec![name("d")])]),
    ]);

    assert_eq!(out, "woof animal\n... animal\nDog\n");
}

#[test]
fn init_and_instance_attributes() {
    let self_attr = |attr: &str| E::AttributeRef {
        member: Box::new(name("self")),
        attribute: attr.into(),
    };

    let out = output_of(vec![
        class(
            "Counter",
            vec![],
            vec![
                def(
                    "__init__",
                    &["self", "start"],
                    vec![S::Assign {
                        target: self_attr("count"),
                        value: name("start"),
                    }
                    .into()],
                ),
                def(
                    "tick",
                    &["self"],
                    vec![E::method_call(E::Primary { location: Box::new(self_attr("count")) }, "__iadd__", vec![int(1)]).into()],
                ),
            ],
        ),
        assign("c", E::call(name("Counter"), vec![int(41)])),
        E::method_call(name("c"), "tick", vec![]).into(),
        print(vec![E::attribute(name("c"), "count")]),
    ]);

    assert_eq!(out, "42\n");
}

#[test]
fn class_attribute_visible_on_type_and_instance() {
    let out = output_of(vec![
        class("Config", vec![], vec![assign("level", int(3))]),
        assign("c", E::call(name("Config"), vec![])),
        print(vec![E::attribute(name("c"), "level")]),
        S::Assign {
            target: E::AttributeRef {
                member: Box::new(name("c")),
                attribute: "level".into(),
            },
            value: int(9),
        }
        .into(),
        print(vec![E::attribute(name("c"), "level"), E::attribute(name("Config"), "level")]),
        print(vec![name("Config")]),
    ]);

    assert_eq!(out, "3\n9 3\n<class 'Config'>\n");
}

#[test]
fn user_special_methods_drive_builtins() {
    let out = output_of(vec![
        class(
            "Bag",
            vec![],
            vec![
                def("__len__", &["self"], vec![ret(int(0))]),
                def("__str__", &["self"], vec![ret(E::str("a bag"))]),
            ],
        ),
        assign("b", E::call(name("Bag"), vec![])),
        print(vec![name("b"), E::call(name("bool"), vec![name("b")])]),
    ]);

    assert_eq!(out, "a bag False\n");
}

#[test]
fn in_place_rebinds_scalars_only() {
    let out = output_of(vec![
        assign("n", int(1)),
        E::method_call(name("n"), "__iadd__", vec![int(2)]).into(),
        assign("xs", list(vec![int(1)])),
        assign("ys", name("xs")),
        E::method_call(name("xs"), "__iadd__", vec![list(vec![int(2)])]).into(),
        print(vec![name("n"), name("ys")]),
    ]);

    assert_eq!(out, "3 [1, 2]\n");
}

#[test]
fn loop_else_runs_without_break() {
    let search = |needle: i64| S::For {
        target: E::identifier("i"),
        iterable: E::call(name("range"), vec![int(3)]),
        body: vec![S::If {
            condition: op(name("i"), "__eq__", int(needle)),
            body: vec![print(vec![E::str("found")]), S::Break.into()],
            elifs: vec![],
            else_body: vec![],
        }
        .into()],
        else_body: vec![print(vec![E::str("missing")])],
    };

    assert_eq!(output_of(vec![search(1).into()]), "found\n");
    assert_eq!(output_of(vec![search(7).into()]), "missing\n");
}

#[test]
fn while_with_continue() {
    let out = output_of(vec![
        assign("i", int(0)),
        assign("total", int(0)),
        S::While {
            condition: op(name("i"), "__lt__", int(5)),
            body: vec![
                E::method_call(name("i"), "__iadd__", vec![int(1)]).into(),
                S::If {
                    condition: op(op(name("i"), "__mod__", int(2)), "__eq__", int(0)),
                    body: vec![S::Continue.into()],
                    elifs: vec![],
                    else_body: vec![],
                }
                .into(),
                E::method_call(name("total"), "__iadd__", vec![name("i")]).into(),
            ],
            else_body: vec![],
        }
        .into(),
        print(vec![name("total")]),
    ]);

    assert_eq!(out, "9\n");
}

#[test]
fn recursion() {
    let fact = def(
        "fact",
        &["n"],
        vec![
            S::If {
                condition: op(name("n"), "__le__", int(1)),
                body: vec![ret(int(1))],
                elifs: vec![],
                else_body: vec![],
            }
            .into(),
            ret(op(
                name("n"),
                "__mul__",
                E::call(name("fact"), vec![op(name("n"), "__sub__", int(1))]),
            )),
        ],
    );

    assert_eq!(
        output_of(vec![fact, print(vec![E::call(name("fact"), vec![int(10)])])]),
        "3628800\n"
    );
}

#[test]
fn self_hosted_builtins() {
    let nums = list(vec![int(3), int(-1), int(4)]);

    let out = output_of(vec![
        assign("xs", nums),
        def("positive", &["x"], vec![ret(op(name("x"), "__gt__", int(0)))]),
        print(vec![
            E::call(name("sum"), vec![name("xs")]),
            E::call(name("max"), vec![name("xs")]),
            E::call(name("min"), vec![name("xs")]),
        ]),
        print(vec![E::call(name("filter"), vec![name("positive"), name("xs")])]),
        print(vec![E::call(name("map"), vec![name("abs"), name("xs")])]),
        print(vec![
            E::call(name("all"), vec![name("xs")]),
            E::call(name("any"), vec![list(vec![int(0)])]),
        ]),
    ]);

    assert_eq!(out, "6 4 -1\n[3, 4]\n[3, 1, 4]\nTrue False\n");
}

#[test]
fn each_run_starts_fresh() {
    let mut interp = Interpreter::new();

    let first = program(vec![assign("seen", int(1))]);
    assert_eq!(interp.interpret(&first), Ok(()));

    let second = program(vec![print(vec![name("seen")])]);
    let err = interp.interpret(&second).unwrap_err();

    assert_eq!(err.kind(), "NameError");
    assert_eq!(err.message(), "name 'seen' is not defined");
}

#[test]
fn output_survives_fault() {
    let (out, res) = run(vec![
        print(vec![E::str("before")]),
        print(vec![name("missing")]),
        print(vec![E::str("after")]),
    ]);

    assert_eq!(out, "before\n");

    let err = res.unwrap_err();
    assert_eq!(err.kind(), "NameError");
    assert_eq!(err.line(), 1);
}

#[test]
fn missing_attribute() {
    let err = fault_of(vec![print(vec![E::method_call(int(1), "nope", vec![])])]);

    assert_eq!(err.kind(), "AttributeError");
    assert_eq!(err.message(), "'int' object has no attribute 'nope'");
}

#[test]
fn misplaced_control_flow() {
    let err = fault_of(vec![S::Break.into()]);
    assert_eq!((err.kind(), err.message()), ("SyntaxError", "'break' outside loop"));

    let err = fault_of(vec![ret(int(1))]);
    assert_eq!((err.kind(), err.message()), ("SyntaxError", "'return' outside function"));

    // A loop around the call does not count inside the function
    let err = fault_of(vec![
        def("f", &[], vec![S::Continue.into()]),
        S::While {
            condition: bool_lit(true),
            body: vec![E::call(name("f"), vec![]).into()],
            else_body: vec![],
        }
        .into(),
    ]);
    assert_eq!(err.message(), "'continue' not properly in loop");
}

#[test]
fn wrong_arity() {
    let err = fault_of(vec![
        def("f", &["a", "b"], vec![ret(name("a"))]),
        E::call(name("f"), vec![int(1)]).into(),
    ]);

    assert_eq!(err.kind(), "TypeError");
    assert_eq!(err.message(), "f() takes 2 positional arguments but 1 were given");
}

#[test]
fn type_attributes_are_read_only() {
    let err = fault_of(vec![
        class("K", vec![], vec![S::Pass.into()]),
        S::Assign {
            target: E::AttributeRef {
                member: Box::new(name("K")),
                attribute: "x".into(),
            },
            value: int(1),
        }
        .into(),
    ]);

    assert_eq!(err.kind(), "TypeError");
}

#[test]
fn conditional_evaluates_one_branch() {
    let pick = |condition: bool| E::Conditional {
        condition: Box::new(bool_lit(condition)),
        then: Box::new(E::call(name("loud"), vec![E::str("then")])),
        otherwise: Box::new(E::call(name("loud"), vec![E::str("else")])),
    };

    let out = output_of(vec![
        def("loud", &["tag"], vec![print(vec![name("tag")]), ret(name("tag"))]),
        assign("x", pick(true)),
        assign("y", pick(false)),
        print(vec![name("x"), name("y")]),
    ]);

    assert_eq!(out, "then\nelse\nthen else\n");
}

#[test]
fn bool_hook_must_return_bool() {
    let err = fault_of(vec![
        class("Odd", vec![], vec![def("__bool__", &["self"], vec![ret(int(1))])]),
        S::If {
            condition: E::call(name("Odd"), vec![]),
            body: vec![S::Pass.into()],
            elifs: vec![],
            else_body: vec![],
        }
        .into(),
    ]);

    assert_eq!(err.kind(), "TypeError");
    assert_eq!(err.message(), "__bool__ should return bool, returned int");
    assert_eq!(err.line(), 1);
}

#[test]
fn definitions_inside_function_body() {
    let nested = |inner: ASTNodeKind| {
        fault_of(vec![
            def("outer", &[], vec![inner]),
            E::call(name("outer"), vec![]).into(),
        ])
    };

    let err = nested(def("inner", &[], vec![S::Pass.into()]));
    assert_eq!(err.kind(), "SyntaxError");
    assert_eq!(err.message(), "function 'inner' cannot be defined inside a function body");

    let err = nested(class("Inner", vec![], vec![S::Pass.into()]));
    assert_eq!(err.kind(), "SyntaxError");
    assert_eq!(err.message(), "class 'Inner' cannot be defined inside a function body");
}

#[test]
fn set_elements_must_be_hashable() {
    let scalars = E::SetLiteral {
        values: vec![
            E::NoneLiteral,
            int(1),
            bool_lit(true),
            E::FloatLiteral { value: 1.5 },
            E::str("s"),
        ],
    };

    let out = output_of(vec![
        assign("s", scalars),
        E::method_call(name("s"), "add", vec![int(7)]).into(),
        print(vec![name("s")]),
    ]);
    // True is the same element as 1
    assert_eq!(out, "{None, 1, 1.5, 's', 7}\n");

    let err = fault_of(vec![
        assign("s", E::SetLiteral { values: vec![] }),
        E::method_call(name("s"), "add", vec![list(vec![int(1)])]).into(),
    ]);
    assert_eq!((err.kind(), err.message()), ("TypeError", "unhashable type: 'list'"));

    let err = fault_of(vec![assign(
        "s",
        E::SetLiteral {
            values: vec![int(1), list(vec![int(1)])],
        },
    )]);
    assert_eq!((err.kind(), err.message()), ("TypeError", "unhashable type: 'list'"));

    let err = fault_of(vec![assign(
        "s",
        E::SetLiteral {
            values: vec![E::DictLiteral { entries: vec![] }],
        },
    )]);
    assert_eq!(err.message(), "unhashable type: 'dict'");
}

#[test]
fn huge_repetition_is_a_fault() {
    let values = (1..=5).map(int).collect();

    let (out, res) = run(vec![
        print(vec![op(E::str("ab"), "__mul__", int(2))]),
        assign("xs", list(values)),
        assign("big", op(name("xs"), "__mul__", int(1 << 62))),
    ]);
    assert_eq!(out, "abab\n");

    let err = res.unwrap_err();
    assert_eq!((err.kind(), err.message()), ("ValueError", "repeated sequence is too long"));

    let err = fault_of(vec![
        assign("s", E::str("ab")),
        E::method_call(name("s"), "__imul__", vec![int(1 << 62)]).into(),
    ]);
    assert_eq!((err.kind(), err.message()), ("ValueError", "repeated sequence is too long"));
}

#[test]
fn protocol_builtins_on_type_values() {
    let out = output_of(vec![
        class(
            "Foo",
            vec![],
            vec![
                def("__str__", &["self"], vec![ret(E::str("a foo"))]),
                def("__len__", &["self"], vec![ret(int(2))]),
            ],
        ),
        print(vec![
            name("Foo"),
            E::call(name("str"), vec![name("Foo")]),
            E::call(name("repr"), vec![name("Foo")]),
        ]),
        print(vec![
            E::call(name("str"), vec![E::call(name("Foo"), vec![])]),
            E::call(name("len"), vec![E::call(name("Foo"), vec![])]),
        ]),
    ]);
    assert_eq!(out, "<class 'Foo'> <class 'Foo'> <class 'Foo'>\na foo 2\n");

    let err = fault_of(vec![
        class("Foo", vec![], vec![def("__len__", &["self"], vec![ret(int(2))])]),
        print(vec![E::call(name("len"), vec![name("Foo")])]),
    ]);
    assert_eq!((err.kind(), err.message()), ("TypeError", "object of type 'type' has no len()"));
}

#[test]
fn dict_update_from_pairs() {
    let pair = |key: &str, value: i64| list(vec![E::str(key), int(value)]);

    let out = output_of(vec![
        assign(
            "d",
            E::DictLiteral {
                entries: vec![(E::str("a"), int(1))],
            },
        ),
        E::method_call(name("d"), "update", vec![list(vec![pair("b", 2), pair("a", 3)])]).into(),
        E::method_call(
            name("d"),
            "update",
            vec![E::DictLiteral {
                entries: vec![(E::str("c"), int(4))],
            }],
        )
        .into(),
        print(vec![name("d")]),
    ]);
    assert_eq!(out, "{'a': 3, 'b': 2, 'c': 4}\n");

    let err = fault_of(vec![
        assign("d", E::DictLiteral { entries: vec![] }),
        E::method_call(name("d"), "update", vec![list(vec![list(vec![int(1)])])]).into(),
    ]);
    assert_eq!(err.kind(), "ValueError");
}

#[test]
fn reads_and_runs_prefix_source() {
    let source = "\
(assign (identifier `greeting`) (str `hello`))
(def `shout` (`s`) ((return (call (primary (attributeref (primary (identifier `s`)) (identifier `upper`))) ()))))
(call (primary (identifier `print`)) ((call (primary (identifier `shout`)) ((primary (identifier `greeting`))))))
(if (call (primary (attributeref (primary (identifier `greeting`)) (identifier `startswith`))) ((str `he`))) ((call (primary (identifier `print`)) ((float 2.5) (NoneType)))) () ())
";

    let nodes = read_program(source).unwrap();
    let mut interp = Interpreter::new();

    assert_eq!(interp.interpret(&nodes), Ok(()));
    assert_eq!(interp.output(), "HELLO\n2.5 None\n");
}

use super::{method, NativeFn, RuntimeVal};
use crate::environment::Env;
use crate::interpreter::{Interpreter, InterpreterError};
use crate::native_functions::{check_args_number, split_receiver};

/// Members every type inherits.
pub(crate) fn members() -> Vec<(&'static str, NativeFn)> {
    vec![
        method("__init__", |_, _, args| {
            let (receiver, rest) = split_receiver("__init__", args)?;

            if !rest.is_empty() {
                let name = match receiver {
                    RuntimeVal::Instance(inst) => inst.class.name.clone(),
                    other => other.type_name(),
                };

                return Err(InterpreterError::Type(format!("{}() takes no arguments", name)));
            }

            Ok(RuntimeVal::None)
        }),
        method("__str__", |interp, env, args| {
            let (receiver, rest) = split_receiver("__str__", args)?;
            check_args_number("__str__", rest, 0)?;

            Ok(RuntimeVal::new_str(&interp.repr_of(receiver, env)?))
        }),
        method("__repr__", |_, _, args| {
            let (receiver, rest) = split_receiver("__repr__", args)?;
            check_args_number("__repr__", rest, 0)?;

            let repr = match receiver {
                RuntimeVal::Type(t) => format!("<class '{}'>", t.name),
                RuntimeVal::Function(func) => format!("<function {}>", func.name),
                RuntimeVal::NativeFunction(func) => format!("<built-in function {}>", func.name),
                other => format!("<{} object>", other.type_name()),
            };

            Ok(RuntimeVal::new_str(&repr))
        }),
        method("__eq__", |_, _, args| {
            let (receiver, rest) = split_receiver("__eq__", args)?;
            check_args_number("__eq__", rest, 1)?;

            Ok(RuntimeVal::Bool(receiver.is_same(&rest[0])))
        }),
        // Negation of whatever `__eq__` the receiver resolves to
        method("__ne__", |interp, env, args| {
            let (receiver, rest) = split_receiver("__ne__", args)?;
            check_args_number("__ne__", rest, 1)?;

            Ok(RuntimeVal::Bool(!interp.equals(receiver, &rest[0], env)?))
        }),
    ]
}

pub(crate) fn none_members() -> Vec<(&'static str, NativeFn)> {
    let to_str = |_: &Interpreter, _: &mut Env, args: &[RuntimeVal]| -> Result<RuntimeVal, InterpreterError> {
        check_args_number("__repr__", args, 1)?;
        Ok(RuntimeVal::new_str("None"))
    };

    vec![
        method("__str__", to_str),
        method("__repr__", to_str),
        method("__bool__", |_, _, args| {
            check_args_number("__bool__", args, 1)?;
            Ok(RuntimeVal::Bool(false))
        }),
        method("__eq__", |_, _, args| {
            check_args_number("__eq__", args, 2)?;
            Ok(RuntimeVal::Bool(matches!(args[1], RuntimeVal::None)))
        }),
    ]
}

pub(crate) fn type_members() -> Vec<(&'static str, NativeFn)> {
    vec![method("__repr__", |_, _, args| {
        let (receiver, rest) = split_receiver("__repr__", args)?;
        check_args_number("__repr__", rest, 0)?;

        match receiver {
            RuntimeVal::Type(t) => Ok(RuntimeVal::new_str(&format!("<class '{}'>", t.name))),
            other => Err(InterpreterError::Type(format!(
                "descriptor '__repr__' requires a 'type' object but received a '{}'",
                other.type_name()
            ))),
        }
    })]
}

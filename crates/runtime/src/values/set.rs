use indexmap::IndexSet;

use super::{method, HashKey, NativeFn, RuntimeVal, SetRef};
use crate::environment::Env;
use crate::interpreter::{Interpreter, InterpreterError};
use crate::native_functions::{check_args_number, split_receiver};

pub(crate) fn members() -> Vec<(&'static str, NativeFn)> {
    vec![
        method("__str__", repr),
        method("__repr__", repr),
        method("__len__", |_, _, args| {
            let (set, _) = set_receiver("__len__", args, 0)?;
            let len = set.borrow().len();

            Ok(RuntimeVal::Int(len as i64))
        }),
        method("__contains__", |_, _, args| {
            let (set, args) = set_receiver("__contains__", args, 1)?;
            let key = HashKey::new(args[0].clone())?;
            let found = set.borrow().contains(&key);

            Ok(RuntimeVal::Bool(found))
        }),
        method("__eq__", |_, _, args| {
            let (set, args) = set_receiver("__eq__", args, 1)?;

            Ok(RuntimeVal::Bool(match &args[0] {
                RuntimeVal::Set(other) => *set.borrow() == *other.borrow(),
                _ => false,
            }))
        }),
        method("__ne__", |_, _, args| {
            let (set, args) = set_receiver("__ne__", args, 1)?;

            Ok(RuntimeVal::Bool(match &args[0] {
                RuntimeVal::Set(other) => *set.borrow() != *other.borrow(),
                _ => true,
            }))
        }),
        method("__or__", |_, _, args| {
            combine("__or__", "|", args, |a, b| a.union(b).cloned().collect())
        }),
        method("__and__", |_, _, args| {
            combine("__and__", "&", args, |a, b| a.intersection(b).cloned().collect())
        }),
        method("__sub__", |_, _, args| {
            combine("__sub__", "-", args, |a, b| a.difference(b).cloned().collect())
        }),

        // ----------
        //  Methods
        // ----------
        method("add", |_, _, args| {
            let (set, args) = set_receiver("add", args, 1)?;
            let key = HashKey::new(args[0].clone())?;
            set.borrow_mut().insert(key);

            Ok(RuntimeVal::None)
        }),
        method("clear", |_, _, args| {
            let (set, _) = set_receiver("clear", args, 0)?;
            set.borrow_mut().clear();

            Ok(RuntimeVal::None)
        }),
        method("copy", |_, _, args| {
            let (set, _) = set_receiver("copy", args, 0)?;
            let copy = set.borrow().clone();

            Ok(RuntimeVal::new_set(copy))
        }),
        method("discard", |_, _, args| {
            let (set, args) = set_receiver("discard", args, 1)?;
            let key = HashKey::new(args[0].clone())?;
            set.borrow_mut().shift_remove(&key);

            Ok(RuntimeVal::None)
        }),
        method("remove", |interp, env, args| {
            let (set, args) = set_receiver("remove", args, 1)?;
            let key = HashKey::new(args[0].clone())?;
            let removed = set.borrow_mut().shift_remove(&key);

            if removed {
                Ok(RuntimeVal::None)
            } else {
                Err(InterpreterError::Key(interp.repr_of(&args[0], env)?))
            }
        }),
    ]
}

// ----------
//  Helpers
// ----------

fn set_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
    nb_expected: usize,
) -> Result<(&'a SetRef, &'a [RuntimeVal]), InterpreterError> {
    let (receiver, rest) = split_receiver(fn_name, args)?;
    check_args_number(fn_name, rest, nb_expected)?;

    match receiver {
        RuntimeVal::Set(set) => Ok((set, rest)),
        other => Err(InterpreterError::Type(format!(
            "descriptor '{}' requires a 'set' object but received a '{}'",
            fn_name,
            other.type_name()
        ))),
    }
}

fn combine(
    fn_name: &str,
    symbol: &str,
    args: &[RuntimeVal],
    op: fn(&IndexSet<HashKey>, &IndexSet<HashKey>) -> IndexSet<HashKey>,
) -> Result<RuntimeVal, InterpreterError> {
    let (set, other) = set_receiver(fn_name, args, 1)?;

    match &other[0] {
        RuntimeVal::Set(o) => Ok(RuntimeVal::new_set(op(&set.borrow(), &o.borrow()))),
        o => Err(InterpreterError::unsupported_operand(symbol, "set", &o.type_name())),
    }
}

fn repr(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    let (set, _) = set_receiver("__repr__", args, 0)?;
    let keys = set.borrow().clone();

    if keys.is_empty() {
        return Ok(RuntimeVal::new_str("set()"));
    }

    let parts = keys
        .iter()
        .map(|key| interp.repr_of(key.value(), env))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuntimeVal::new_str(&format!("{{{}}}", parts.join(", "))))
}

use super::{method, DictRef, HashKey, NativeFn, RuntimeVal};
use crate::environment::Env;
use crate::interpreter::{Interpreter, InterpreterError};
use crate::native_functions::{check_args_number, check_args_range, split_receiver};

pub(crate) fn members() -> Vec<(&'static str, NativeFn)> {
    vec![
        method("__str__", repr),
        method("__repr__", repr),
        method("__len__", |_, _, args| {
            let (dict, _) = dict_receiver("__len__", args, 0)?;
            let len = dict.borrow().len();

            Ok(RuntimeVal::Int(len as i64))
        }),
        method("__getitem__", |interp, env, args| {
            let (dict, args) = dict_receiver("__getitem__", args, 1)?;
            let key = HashKey::new(args[0].clone())?;
            let found = dict.borrow().get(&key).cloned();

            match found {
                Some(value) => Ok(value),
                None => Err(missing_key(interp, env, &args[0])?),
            }
        }),
        method("__setitem__", |_, _, args| {
            let (dict, args) = dict_receiver("__setitem__", args, 2)?;
            let key = HashKey::new(args[0].clone())?;

            // An equal key already present keeps its original form
            dict.borrow_mut().insert(key, args[1].clone());

            Ok(RuntimeVal::None)
        }),
        method("__delitem__", |interp, env, args| {
            let (dict, args) = dict_receiver("__delitem__", args, 1)?;
            let key = HashKey::new(args[0].clone())?;
            let removed = dict.borrow_mut().shift_remove(&key);

            match removed {
                Some(_) => Ok(RuntimeVal::None),
                None => Err(missing_key(interp, env, &args[0])?),
            }
        }),
        method("__contains__", |_, _, args| {
            let (dict, args) = dict_receiver("__contains__", args, 1)?;
            let key = HashKey::new(args[0].clone())?;
            let found = dict.borrow().contains_key(&key);

            Ok(RuntimeVal::Bool(found))
        }),
        method("__eq__", |interp, env, args| {
            let (dict, args) = dict_receiver("__eq__", args, 1)?;

            match &args[0] {
                RuntimeVal::Dict(other) => Ok(RuntimeVal::Bool(dicts_equal(interp, env, dict, other)?)),
                _ => Ok(RuntimeVal::Bool(false)),
            }
        }),
        method("__ne__", |interp, env, args| {
            let (dict, args) = dict_receiver("__ne__", args, 1)?;

            match &args[0] {
                RuntimeVal::Dict(other) => Ok(RuntimeVal::Bool(!dicts_equal(interp, env, dict, other)?)),
                _ => Ok(RuntimeVal::Bool(true)),
            }
        }),

        // ----------
        //  Methods
        // ----------
        method("clear", |_, _, args| {
            let (dict, _) = dict_receiver("clear", args, 0)?;
            dict.borrow_mut().clear();

            Ok(RuntimeVal::None)
        }),
        method("copy", |_, _, args| {
            let (dict, _) = dict_receiver("copy", args, 0)?;
            let copy = dict.borrow().clone();

            Ok(RuntimeVal::new_dict(copy))
        }),
        method("get", |_, _, args| {
            let (dict, args) = split_dict_receiver("get", args)?;
            check_args_range("get", args, 1, 2)?;

            let key = HashKey::new(args[0].clone())?;
            let found = dict.borrow().get(&key).cloned();

            Ok(found.unwrap_or_else(|| args.get(1).cloned().unwrap_or(RuntimeVal::None)))
        }),
        method("keys", |_, _, args| {
            let (dict, _) = dict_receiver("keys", args, 0)?;
            let keys = dict.borrow().keys().map(|k| k.value().clone()).collect();

            Ok(RuntimeVal::new_list(keys))
        }),
        method("values", |_, _, args| {
            let (dict, _) = dict_receiver("values", args, 0)?;
            let values = dict.borrow().values().cloned().collect();

            Ok(RuntimeVal::new_list(values))
        }),
        // Pairs come out as two-element lists
        method("items", |_, _, args| {
            let (dict, _) = dict_receiver("items", args, 0)?;
            let items = dict
                .borrow()
                .iter()
                .map(|(k, v)| RuntimeVal::new_list(vec![k.value().clone(), v.clone()]))
                .collect();

            Ok(RuntimeVal::new_list(items))
        }),
        method("pop", |interp, env, args| {
            let (dict, args) = split_dict_receiver("pop", args)?;
            check_args_range("pop", args, 1, 2)?;

            let key = HashKey::new(args[0].clone())?;
            let removed = dict.borrow_mut().shift_remove(&key);

            match (removed, args.get(1)) {
                (Some(value), _) => Ok(value),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => Err(missing_key(interp, env, &args[0])?),
            }
        }),
        method("update", |_, _, args| {
            let (dict, args) = dict_receiver("update", args, 1)?;

            let entries: Vec<(HashKey, RuntimeVal)> = match &args[0] {
                RuntimeVal::Dict(other) => other.borrow().clone().into_iter().collect(),
                RuntimeVal::List(pairs) => update_pairs(&pairs.borrow())?,
                other => {
                    return Err(InterpreterError::Type(format!(
                        "'{}' object is not iterable",
                        other.type_name()
                    )))
                }
            };
            dict.borrow_mut().extend(entries);

            Ok(RuntimeVal::None)
        }),
    ]
}

// ----------
//  Helpers
// ----------

fn split_dict_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
) -> Result<(&'a DictRef, &'a [RuntimeVal]), InterpreterError> {
    let (receiver, rest) = split_receiver(fn_name, args)?;

    match receiver {
        RuntimeVal::Dict(dict) => Ok((dict, rest)),
        other => Err(InterpreterError::Type(format!(
            "descriptor '{}' requires a 'dict' object but received a '{}'",
            fn_name,
            other.type_name()
        ))),
    }
}

fn dict_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
    nb_expected: usize,
) -> Result<(&'a DictRef, &'a [RuntimeVal]), InterpreterError> {
    let (dict, rest) = split_dict_receiver(fn_name, args)?;
    check_args_number(fn_name, rest, nb_expected)?;

    Ok((dict, rest))
}

// Every element must be a two-element list. Nothing is inserted unless all are.
fn update_pairs(items: &[RuntimeVal]) -> Result<Vec<(HashKey, RuntimeVal)>, InterpreterError> {
    let mut entries = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let pair = match item {
            RuntimeVal::List(pair) => pair.borrow().clone(),
            _ => {
                return Err(InterpreterError::Type(format!(
                    "cannot convert dictionary update sequence element #{} to a sequence",
                    idx
                )))
            }
        };

        match pair.as_slice() {
            [key, value] => entries.push((HashKey::new(key.clone())?, value.clone())),
            _ => {
                return Err(InterpreterError::Value(format!(
                    "dictionary update sequence element #{} has length {}; 2 is required",
                    idx,
                    pair.len()
                )))
            }
        }
    }

    Ok(entries)
}

// KeyError carries the key's repr
fn missing_key(interp: &Interpreter, env: &mut Env, key: &RuntimeVal) -> Result<InterpreterError, InterpreterError> {
    Ok(InterpreterError::Key(interp.repr_of(key, env)?))
}

fn repr(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    let (dict, _) = dict_receiver("__repr__", args, 0)?;
    let entries = dict.borrow().clone();

    let mut parts = Vec::with_capacity(entries.len());
    for (key, value) in &entries {
        parts.push(format!(
            "{}: {}",
            interp.repr_of(key.value(), env)?,
            interp.repr_of(value, env)?
        ));
    }

    Ok(RuntimeVal::new_str(&format!("{{{}}}", parts.join(", "))))
}

fn dicts_equal(interp: &Interpreter, env: &mut Env, a: &DictRef, b: &DictRef) -> Result<bool, InterpreterError> {
    let (a, b) = (a.borrow().clone(), b.borrow().clone());

    if a.len() != b.len() {
        return Ok(false);
    }

    for (key, value) in &a {
        let equal = match b.get(key) {
            Some(other) => value.is_same(other) || interp.equals(value, other, env)?,
            None => false,
        };

        if !equal {
            return Ok(false);
        }
    }

    Ok(true)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: i64) -> RuntimeVal {
        RuntimeVal::new_list(vec![RuntimeVal::new_str(key), RuntimeVal::Int(value)])
    }

    #[test]
    fn update_pairs_reads_two_element_lists() {
        let entries = update_pairs(&[pair("a", 1), pair("b", 2)]).unwrap();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.value().clone()).collect();

        assert_eq!(keys, vec![RuntimeVal::new_str("a"), RuntimeVal::new_str("b")]);
        assert_eq!(entries[1].1, RuntimeVal::Int(2));
    }

    #[test]
    fn update_pairs_rejects_bad_elements() {
        assert_eq!(
            update_pairs(&[pair("a", 1), RuntimeVal::Int(3)]),
            Err(InterpreterError::Type(
                "cannot convert dictionary update sequence element #1 to a sequence".into()
            ))
        );
        assert_eq!(
            update_pairs(&[RuntimeVal::new_list(vec![RuntimeVal::Int(1)])]),
            Err(InterpreterError::Value(
                "dictionary update sequence element #0 has length 1; 2 is required".into()
            ))
        );

        let unhashable = RuntimeVal::new_list(vec![RuntimeVal::new_list(vec![]), RuntimeVal::Int(1)]);
        assert!(matches!(update_pairs(&[unhashable]), Err(InterpreterError::Type(_))));
    }
}

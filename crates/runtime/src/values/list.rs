use std::cmp::Ordering;

use super::{method, ListRef, NativeFn, RuntimeVal};
use crate::environment::Env;
use crate::interpreter::{Interpreter, InterpreterError};
use crate::native_functions::{check_args_number, check_args_range, split_receiver};

/// Resolves a possibly negative index against `len`. None when out of range.
pub(crate) fn check_and_get_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let id = if index < 0 { index + len } else { index };

    (0..len).contains(&id).then_some(id as usize)
}

pub(crate) fn members() -> Vec<(&'static str, NativeFn)> {
    vec![
        method("__str__", repr),
        method("__repr__", repr),
        method("__len__", |_, _, args| {
            let (list, _) = list_receiver("__len__", args, 0)?;
            let len = list.borrow().len();

            Ok(RuntimeVal::Int(len as i64))
        }),
        method("__getitem__", |_, _, args| {
            let (list, args) = list_receiver("__getitem__", args, 1)?;
            let index = index_arg(&args[0])?;
            let list = list.borrow();

            let id = check_and_get_index(index, list.len())
                .ok_or_else(|| InterpreterError::Index("list index out of range".into()))?;

            Ok(list[id].clone())
        }),
        method("__setitem__", |_, _, args| {
            let (list, args) = list_receiver("__setitem__", args, 2)?;
            let index = index_arg(&args[0])?;
            let mut list = list.borrow_mut();

            let id = check_and_get_index(index, list.len())
                .ok_or_else(|| InterpreterError::Index("list assignment index out of range".into()))?;
            list[id] = args[1].clone();

            Ok(RuntimeVal::None)
        }),
        method("__delitem__", |_, _, args| {
            let (list, args) = list_receiver("__delitem__", args, 1)?;
            let index = index_arg(&args[0])?;
            let mut list = list.borrow_mut();

            let id = check_and_get_index(index, list.len())
                .ok_or_else(|| InterpreterError::Index("list assignment index out of range".into()))?;
            list.remove(id);

            Ok(RuntimeVal::None)
        }),
        method("__contains__", |interp, env, args| {
            let (list, args) = list_receiver("__contains__", args, 1)?;

            Ok(RuntimeVal::Bool(position(interp, env, list, &args[0])?.is_some()))
        }),
        method("__add__", |_, _, args| {
            let (list, args) = list_receiver("__add__", args, 1)?;

            match &args[0] {
                RuntimeVal::List(other) => {
                    let mut res = list.borrow().clone();
                    res.extend(other.borrow().iter().cloned());

                    Ok(RuntimeVal::new_list(res))
                }
                other => Err(InterpreterError::Type(format!(
                    "can only concatenate list (not \"{}\") to list",
                    other.type_name()
                ))),
            }
        }),
        // Extends the list itself
        method("__iadd__", |interp, _, args| {
            let (list, rest) = list_receiver("__iadd__", args, 1)?;
            let items = interp.iterate(&rest[0])?;
            list.borrow_mut().extend(items);

            Ok(args[0].clone())
        }),
        method("__mul__", |_, _, args| {
            let (list, args) = list_receiver("__mul__", args, 1)?;
            let times = repeat_count(&args[0])?;

            Ok(RuntimeVal::new_list(repeated(&list.borrow(), times)?))
        }),
        method("__imul__", |_, _, args| {
            let (list, rest) = list_receiver("__imul__", args, 1)?;
            let times = repeat_count(&rest[0])?;

            let items = repeated(&list.borrow(), times)?;
            *list.borrow_mut() = items;

            Ok(args[0].clone())
        }),
        method("__eq__", |interp, env, args| {
            let (list, args) = list_receiver("__eq__", args, 1)?;

            match &args[0] {
                RuntimeVal::List(other) => Ok(RuntimeVal::Bool(lists_equal(interp, env, list, other)?)),
                _ => Ok(RuntimeVal::Bool(false)),
            }
        }),
        method("__ne__", |interp, env, args| {
            let (list, args) = list_receiver("__ne__", args, 1)?;

            match &args[0] {
                RuntimeVal::List(other) => Ok(RuntimeVal::Bool(!lists_equal(interp, env, list, other)?)),
                _ => Ok(RuntimeVal::Bool(true)),
            }
        }),
        comparison("__lt__", "<", Ordering::is_lt),
        comparison("__le__", "<=", Ordering::is_le),
        comparison("__gt__", ">", Ordering::is_gt),
        comparison("__ge__", ">=", Ordering::is_ge),

        // ----------
        //  Methods
        // ----------
        method("append", |_, _, args| {
            let (list, args) = list_receiver("append", args, 1)?;
            list.borrow_mut().push(args[0].clone());

            Ok(RuntimeVal::None)
        }),
        method("clear", |_, _, args| {
            let (list, _) = list_receiver("clear", args, 0)?;
            list.borrow_mut().clear();

            Ok(RuntimeVal::None)
        }),
        method("copy", |_, _, args| {
            let (list, _) = list_receiver("copy", args, 0)?;
            let copy = list.borrow().clone();

            Ok(RuntimeVal::new_list(copy))
        }),
        method("count", |interp, env, args| {
            let (list, args) = list_receiver("count", args, 1)?;
            let items = list.borrow().clone();

            let mut count = 0;
            for item in &items {
                if item.is_same(&args[0]) || interp.equals(item, &args[0], env)? {
                    count += 1;
                }
            }

            Ok(RuntimeVal::Int(count))
        }),
        method("extend", |interp, _, args| {
            let (list, args) = list_receiver("extend", args, 1)?;
            let items = interp.iterate(&args[0])?;
            list.borrow_mut().extend(items);

            Ok(RuntimeVal::None)
        }),
        method("index", |interp, env, args| {
            let (list, args) = list_receiver("index", args, 1)?;

            match position(interp, env, list, &args[0])? {
                Some(id) => Ok(RuntimeVal::Int(id as i64)),
                None => Err(InterpreterError::Value(format!(
                    "{} is not in list",
                    interp.repr_of(&args[0], env)?
                ))),
            }
        }),
        method("insert", |_, _, args| {
            let (list, args) = list_receiver("insert", args, 2)?;
            let index = index_arg(&args[0])?;
            let mut list = list.borrow_mut();

            // Out of range positions clamp to the ends
            let len = list.len() as i64;
            let id = if index < 0 { (index + len).max(0) } else { index.min(len) };
            list.insert(id as usize, args[1].clone());

            Ok(RuntimeVal::None)
        }),
        method("pop", |_, _, args| {
            let (list, args) = split_list_receiver("pop", args)?;
            check_args_range("pop", args, 0, 1)?;

            let mut list = list.borrow_mut();
            if list.is_empty() {
                return Err(InterpreterError::Index("pop from empty list".into()));
            }

            let index = match args.first() {
                Some(arg) => index_arg(arg)?,
                None => -1,
            };
            let id = check_and_get_index(index, list.len())
                .ok_or_else(|| InterpreterError::Index("pop index out of range".into()))?;

            Ok(list.remove(id))
        }),
        method("remove", |interp, env, args| {
            let (list, args) = list_receiver("remove", args, 1)?;

            match position(interp, env, list, &args[0])? {
                Some(id) => {
                    list.borrow_mut().remove(id);
                    Ok(RuntimeVal::None)
                }
                None => Err(InterpreterError::Value("list.remove(x): x not in list".into())),
            }
        }),
        method("reverse", |_, _, args| {
            let (list, _) = list_receiver("reverse", args, 0)?;
            list.borrow_mut().reverse();

            Ok(RuntimeVal::None)
        }),
        method("sort", |interp, env, args| {
            let (list, _) = list_receiver("sort", args, 0)?;
            let items = list.borrow().clone();

            let sorted = merge_sort(items, &mut |a: &RuntimeVal, b: &RuntimeVal| interp.less_than(a, b, env))?;
            *list.borrow_mut() = sorted;

            Ok(RuntimeVal::None)
        }),
    ]
}

// ----------
//  Helpers
// ----------

fn split_list_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
) -> Result<(&'a ListRef, &'a [RuntimeVal]), InterpreterError> {
    let (receiver, rest) = split_receiver(fn_name, args)?;

    match receiver {
        RuntimeVal::List(list) => Ok((list, rest)),
        other => Err(InterpreterError::Type(format!(
            "descriptor '{}' requires a 'list' object but received a '{}'",
            fn_name,
            other.type_name()
        ))),
    }
}

fn list_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
    nb_expected: usize,
) -> Result<(&'a ListRef, &'a [RuntimeVal]), InterpreterError> {
    let (list, rest) = split_list_receiver(fn_name, args)?;
    check_args_number(fn_name, rest, nb_expected)?;

    Ok((list, rest))
}

fn index_arg(arg: &RuntimeVal) -> Result<i64, InterpreterError> {
    arg.as_int().ok_or_else(|| {
        InterpreterError::Type(format!("list indices must be integers, not {}", arg.type_name()))
    })
}

pub(crate) fn repeat_count(arg: &RuntimeVal) -> Result<usize, InterpreterError> {
    match arg.as_int() {
        Some(nb) => Ok(nb.max(0) as usize),
        None => Err(InterpreterError::Type(format!(
            "can't multiply sequence by non-int of type '{}'",
            arg.type_name()
        ))),
    }
}

/// Longest sequence, in elements or bytes, a repetition may build.
const MAX_REPEATED_LEN: usize = 1 << 28;

/// Length of `len` items repeated `times` times, refused past
/// [`MAX_REPEATED_LEN`].
pub(crate) fn repeated_len(len: usize, times: usize) -> Result<usize, InterpreterError> {
    len.checked_mul(times)
        .filter(|total| *total <= MAX_REPEATED_LEN)
        .ok_or_else(|| InterpreterError::Value("repeated sequence is too long".into()))
}

fn repeated(items: &[RuntimeVal], times: usize) -> Result<Vec<RuntimeVal>, InterpreterError> {
    let total = repeated_len(items.len(), times)?;

    Ok(items.iter().cloned().cycle().take(total).collect())
}

fn repr(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    let (list, _) = list_receiver("__repr__", args, 0)?;
    // Elements may run user code, never hold the borrow across it
    let items = list.borrow().clone();

    let parts = items
        .iter()
        .map(|item| interp.repr_of(item, env))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuntimeVal::new_str(&format!("[{}]", parts.join(", "))))
}

// Index of the first element identical or equal to `value`
fn position(
    interp: &Interpreter,
    env: &mut Env,
    list: &ListRef,
    value: &RuntimeVal,
) -> Result<Option<usize>, InterpreterError> {
    let items = list.borrow().clone();

    for (id, item) in items.iter().enumerate() {
        if item.is_same(value) || interp.equals(item, value, env)? {
            return Ok(Some(id));
        }
    }

    Ok(None)
}

fn lists_equal(interp: &Interpreter, env: &mut Env, a: &ListRef, b: &ListRef) -> Result<bool, InterpreterError> {
    let (a, b) = (a.borrow().clone(), b.borrow().clone());

    if a.len() != b.len() {
        return Ok(false);
    }

    for (x, y) in a.iter().zip(b.iter()) {
        if !(x.is_same(y) || interp.equals(x, y, env)?) {
            return Ok(false);
        }
    }

    Ok(true)
}

// Lexicographic ordering: the first differing elements decide, then the lengths
fn lexicographic(interp: &Interpreter, env: &mut Env, a: &ListRef, b: &ListRef) -> Result<Ordering, InterpreterError> {
    let (a, b) = (a.borrow().clone(), b.borrow().clone());

    for (x, y) in a.iter().zip(b.iter()) {
        if x.is_same(y) || interp.equals(x, y, env)? {
            continue;
        }

        return Ok(if interp.less_than(x, y, env)? {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }

    Ok(a.len().cmp(&b.len()))
}

fn comparison(name: &'static str, symbol: &'static str, test: fn(Ordering) -> bool) -> (&'static str, NativeFn) {
    method(name, move |interp, env, args| {
        let (list, other) = list_receiver(name, args, 1)?;

        match &other[0] {
            RuntimeVal::List(o) => Ok(RuntimeVal::Bool(test(lexicographic(interp, env, list, o)?))),
            o => Err(InterpreterError::Type(format!(
                "'{}' not supported between instances of 'list' and '{}'",
                symbol,
                o.type_name()
            ))),
        }
    })
}

/// Stable merge sort driven by a fallible `less` comparison.
pub(crate) fn merge_sort<F>(mut items: Vec<RuntimeVal>, less: &mut F) -> Result<Vec<RuntimeVal>, InterpreterError>
where
    F: FnMut(&RuntimeVal, &RuntimeVal) -> Result<bool, InterpreterError>,
{
    if items.len() <= 1 {
        return Ok(items);
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, less)?;
    let right = merge_sort(right, less)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        // Equal elements keep their order: the left one goes first
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => less(r, l)?,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };

        merged.extend(if take_right { right.next() } else { left.next() });
    }

    Ok(merged)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_index() {
        assert_eq!(check_and_get_index(0, 3), Some(0));
        assert_eq!(check_and_get_index(-1, 3), Some(2));
        assert_eq!(check_and_get_index(-3, 3), Some(0));
        assert_eq!(check_and_get_index(-4, 3), None);
        assert_eq!(check_and_get_index(3, 3), None);
        assert_eq!(check_and_get_index(0, 0), None);
    }

    #[test]
    fn repetition_length_is_bounded() {
        let items = vec![RuntimeVal::Int(1), RuntimeVal::Int(2)];

        assert_eq!(repeated(&items, 2).map(|r| r.len()), Ok(4));
        assert_eq!(repeated(&items, 0), Ok(vec![]));
        assert_eq!(
            repeated(&items, 1 << 62),
            Err(InterpreterError::Value("repeated sequence is too long".into()))
        );
        assert!(repeated_len(usize::MAX, 2).is_err());
        assert_eq!(repeated_len(usize::MAX, 0), Ok(0));
    }

    #[test]
    fn merge_sort_is_stable() {
        // Sort pairs on their first element only
        let pair = |a: i64, b: i64| RuntimeVal::new_list(vec![RuntimeVal::Int(a), RuntimeVal::Int(b)]);
        let first = |v: &RuntimeVal| match v {
            RuntimeVal::List(l) => l.borrow()[0].as_int().unwrap(),
            _ => unreachable!(),
        };

        let items = vec![pair(2, 0), pair(1, 0), pair(2, 1), pair(1, 1), pair(0, 0)];
        let sorted = merge_sort(items, &mut |a, b| Ok(first(a) < first(b))).unwrap();

        assert_eq!(sorted, vec![pair(0, 0), pair(1, 0), pair(1, 1), pair(2, 0), pair(2, 1)]);
    }

    #[test]
    fn merge_sort_stops_on_error() {
        let items = vec![RuntimeVal::Int(2), RuntimeVal::Int(1)];
        let res = merge_sort(items, &mut |_, _| Err(InterpreterError::Type("boom".into())));

        assert_eq!(res, Err(InterpreterError::Type("boom".into())));
    }
}

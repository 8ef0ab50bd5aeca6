use std::cmp::Ordering;

use super::list::{check_and_get_index, repeat_count, repeated_len};
use super::{method, NativeFn, RuntimeVal};
use crate::interpreter::InterpreterError;
use crate::native_functions::{check_args_number, check_args_range, split_receiver};

/// `'text'` with the quote Python would pick and the usual escapes.
pub(crate) fn repr_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') { '"' } else { '\'' };
    let mut res = String::with_capacity(value.len() + 2);

    res.push(quote);
    for c in value.chars() {
        match c {
            '\\' => res.push_str("\\\\"),
            '\n' => res.push_str("\\n"),
            '\t' => res.push_str("\\t"),
            '\r' => res.push_str("\\r"),
            c if c == quote => {
                res.push('\\');
                res.push(c);
            }
            c => res.push(c),
        }
    }
    res.push(quote);

    res
}

pub(crate) fn members() -> Vec<(&'static str, NativeFn)> {
    vec![
        method("__str__", |_, _, args| {
            let (s, _) = str_receiver("__str__", args, 0)?;
            Ok(RuntimeVal::new_str(s))
        }),
        method("__repr__", |_, _, args| {
            let (s, _) = str_receiver("__repr__", args, 0)?;
            Ok(RuntimeVal::new_str(&repr_str(s)))
        }),
        method("__len__", |_, _, args| {
            let (s, _) = str_receiver("__len__", args, 0)?;
            Ok(RuntimeVal::Int(s.chars().count() as i64))
        }),
        method("__bool__", |_, _, args| {
            let (s, _) = str_receiver("__bool__", args, 0)?;
            Ok(RuntimeVal::Bool(!s.is_empty()))
        }),
        method("__getitem__", |_, _, args| {
            let (s, args) = str_receiver("__getitem__", args, 1)?;
            let index = args[0].as_int().ok_or_else(|| {
                InterpreterError::Type(format!("string indices must be integers, not '{}'", args[0].type_name()))
            })?;

            let chars: Vec<char> = s.chars().collect();
            let id = check_and_get_index(index, chars.len())
                .ok_or_else(|| InterpreterError::Index("string index out of range".into()))?;

            Ok(RuntimeVal::new_str(&chars[id].to_string()))
        }),
        method("__contains__", |_, _, args| {
            let (s, args) = str_receiver("__contains__", args, 1)?;

            match &args[0] {
                RuntimeVal::Str(sub) => Ok(RuntimeVal::Bool(s.contains(&**sub))),
                other => Err(InterpreterError::Type(format!(
                    "'in <string>' requires string as left operand, not {}",
                    other.type_name()
                ))),
            }
        }),
        method("__add__", |_, _, args| concat("__add__", args)),
        method("__iadd__", |_, _, args| concat("__iadd__", args)),
        method("__mul__", |_, _, args| repeat("__mul__", args)),
        method("__imul__", |_, _, args| repeat("__imul__", args)),
        method("__eq__", |_, _, args| {
            let (s, args) = str_receiver("__eq__", args, 1)?;
            Ok(RuntimeVal::Bool(matches!(&args[0], RuntimeVal::Str(o) if **o == *s)))
        }),
        method("__ne__", |_, _, args| {
            let (s, args) = str_receiver("__ne__", args, 1)?;
            Ok(RuntimeVal::Bool(!matches!(&args[0], RuntimeVal::Str(o) if **o == *s)))
        }),
        comparison("__lt__", "<", Ordering::is_lt),
        comparison("__le__", "<=", Ordering::is_le),
        comparison("__gt__", ">", Ordering::is_gt),
        comparison("__ge__", ">=", Ordering::is_ge),
        method("startswith", |_, _, args| {
            let (s, args) = str_receiver("startswith", args, 1)?;
            Ok(RuntimeVal::Bool(s.starts_with(str_arg("startswith", &args[0])?)))
        }),
        method("endswith", |_, _, args| {
            let (s, args) = str_receiver("endswith", args, 1)?;
            Ok(RuntimeVal::Bool(s.ends_with(str_arg("endswith", &args[0])?)))
        }),
        method("find", |_, _, args| {
            let (s, args) = str_receiver("find", args, 1)?;
            let found = s.find(str_arg("find", &args[0])?);

            Ok(RuntimeVal::Int(char_position(s, found)))
        }),
        method("rfind", |_, _, args| {
            let (s, args) = str_receiver("rfind", args, 1)?;
            let found = s.rfind(str_arg("rfind", &args[0])?);

            Ok(RuntimeVal::Int(char_position(s, found)))
        }),
        method("isalpha", |_, _, args| {
            let (s, _) = str_receiver("isalpha", args, 0)?;
            Ok(RuntimeVal::Bool(!s.is_empty() && s.chars().all(char::is_alphabetic)))
        }),
        method("isdecimal", |_, _, args| {
            let (s, _) = str_receiver("isdecimal", args, 0)?;
            Ok(RuntimeVal::Bool(!s.is_empty() && s.chars().all(|c| c.is_ascii_digit())))
        }),
        method("isspace", |_, _, args| {
            let (s, _) = str_receiver("isspace", args, 0)?;
            Ok(RuntimeVal::Bool(!s.is_empty() && s.chars().all(char::is_whitespace)))
        }),
        method("isidentifier", |_, _, args| {
            let (s, _) = str_receiver("isidentifier", args, 0)?;
            let mut chars = s.chars();

            let valid = chars.next().is_some_and(|c| c == '_' || c.is_alphabetic())
                && chars.all(|c| c == '_' || c.is_alphanumeric());

            Ok(RuntimeVal::Bool(valid))
        }),
        method("islower", |_, _, args| {
            let (s, _) = str_receiver("islower", args, 0)?;
            Ok(RuntimeVal::Bool(
                s.chars().any(char::is_lowercase) && !s.chars().any(char::is_uppercase),
            ))
        }),
        method("isupper", |_, _, args| {
            let (s, _) = str_receiver("isupper", args, 0)?;
            Ok(RuntimeVal::Bool(
                s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase),
            ))
        }),
        method("lower", |_, _, args| {
            let (s, _) = str_receiver("lower", args, 0)?;
            Ok(RuntimeVal::new_str(&s.to_lowercase()))
        }),
        method("upper", |_, _, args| {
            let (s, _) = str_receiver("upper", args, 0)?;
            Ok(RuntimeVal::new_str(&s.to_uppercase()))
        }),
        method("replace", |_, _, args| {
            let (s, args) = str_receiver("replace", args, 2)?;
            let (old, new) = (str_arg("replace", &args[0])?, str_arg("replace", &args[1])?);

            Ok(RuntimeVal::new_str(&s.replace(old, new)))
        }),
        method("strip", |_, _, args| {
            let (s, args) = split_str_receiver("strip", args)?;
            check_args_range("strip", args, 0, 1)?;

            let stripped = match args.first() {
                None | Some(RuntimeVal::None) => s.trim(),
                Some(chars) => {
                    let chars = str_arg("strip", chars)?;
                    s.trim_matches(|c: char| chars.contains(c))
                }
            };

            Ok(RuntimeVal::new_str(stripped))
        }),
        method("split", |_, _, args| {
            let (s, args) = split_str_receiver("split", args)?;
            check_args_range("split", args, 0, 1)?;

            let parts: Vec<RuntimeVal> = match args.first() {
                None | Some(RuntimeVal::None) => s.split_whitespace().map(RuntimeVal::new_str).collect(),
                Some(sep) => {
                    let sep = str_arg("split", sep)?;
                    if sep.is_empty() {
                        return Err(InterpreterError::Value("empty separator".into()));
                    }

                    s.split(sep).map(RuntimeVal::new_str).collect()
                }
            };

            Ok(RuntimeVal::new_list(parts))
        }),
        method("join", |interp, _, args| {
            let (sep, args) = str_receiver("join", args, 1)?;
            let mut parts = vec![];

            for (i, item) in interp.iterate(&args[0])?.iter().enumerate() {
                match item {
                    RuntimeVal::Str(s) => parts.push(s.to_string()),
                    other => {
                        return Err(InterpreterError::Type(format!(
                            "sequence item {}: expected str instance, {} found",
                            i,
                            other.type_name()
                        )))
                    }
                }
            }

            Ok(RuntimeVal::new_str(&parts.join(sep)))
        }),
    ]
}

// ----------
//  Helpers
// ----------

fn split_str_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
) -> Result<(&'a str, &'a [RuntimeVal]), InterpreterError> {
    let (receiver, rest) = split_receiver(fn_name, args)?;

    match receiver {
        RuntimeVal::Str(s) => Ok((&**s, rest)),
        other => Err(InterpreterError::Type(format!(
            "descriptor '{}' requires a 'str' object but received a '{}'",
            fn_name,
            other.type_name()
        ))),
    }
}

fn str_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
    nb_expected: usize,
) -> Result<(&'a str, &'a [RuntimeVal]), InterpreterError> {
    let (s, rest) = split_str_receiver(fn_name, args)?;
    check_args_number(fn_name, rest, nb_expected)?;

    Ok((s, rest))
}

fn str_arg<'a>(fn_name: &str, arg: &'a RuntimeVal) -> Result<&'a str, InterpreterError> {
    match arg {
        RuntimeVal::Str(s) => Ok(&**s),
        other => Err(InterpreterError::Type(format!(
            "{}() argument must be str, not {}",
            fn_name,
            other.type_name()
        ))),
    }
}

// Byte offset to character index, -1 when absent
fn char_position(s: &str, found: Option<usize>) -> i64 {
    found.map_or(-1, |byte| s[..byte].chars().count() as i64)
}

fn concat(fn_name: &str, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    let (s, args) = str_receiver(fn_name, args, 1)?;

    match &args[0] {
        RuntimeVal::Str(other) => Ok(RuntimeVal::new_str(&format!("{}{}", s, other))),
        other => Err(InterpreterError::Type(format!(
            "can only concatenate str (not \"{}\") to str",
            other.type_name()
        ))),
    }
}

fn repeat(fn_name: &str, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    let (s, args) = str_receiver(fn_name, args, 1)?;
    let times = repeat_count(&args[0])?;
    repeated_len(s.len(), times)?;

    Ok(RuntimeVal::new_str(&s.repeat(times)))
}

fn comparison(name: &'static str, symbol: &'static str, test: fn(Ordering) -> bool) -> (&'static str, NativeFn) {
    method(name, move |_, _, args| {
        let (s, other) = str_receiver(name, args, 1)?;

        match &other[0] {
            RuntimeVal::Str(o) => Ok(RuntimeVal::Bool(test(s.cmp(&**o)))),
            o => Err(InterpreterError::Type(format!(
                "'{}' not supported between instances of 'str' and '{}'",
                symbol,
                o.type_name()
            ))),
        }
    })
}

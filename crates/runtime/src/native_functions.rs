pub(crate) mod self_hosted;

use indexmap::IndexSet;

use crate::environment::Env;
use crate::interpreter::{Interpreter, InterpreterError};
use crate::values::numeric::{format_float, Number};
use crate::values::{HashKey, RuntimeVal};

pub(crate) fn natives() -> Vec<(&'static str, RuntimeVal)> {
    vec![
        ("print", RuntimeVal::new_native("print", native_print)),
        ("str", RuntimeVal::new_native("str", native_str)),
        ("repr", RuntimeVal::new_native("repr", native_repr)),
        ("len", RuntimeVal::new_native("len", native_len)),
        ("abs", RuntimeVal::new_native("abs", native_abs)),
        ("chr", RuntimeVal::new_native("chr", native_chr)),
        ("ord", RuntimeVal::new_native("ord", native_ord)),
        ("round", RuntimeVal::new_native("round", native_round)),
        ("type", RuntimeVal::new_native("type", native_type)),
        ("max", RuntimeVal::new_native("max", |i, e, a| extremum(i, e, a, "max", "__gt__"))),
        ("min", RuntimeVal::new_native("min", |i, e, a| extremum(i, e, a, "min", "__lt__"))),
        ("range", RuntimeVal::new_native("range", native_range)),
        ("globals", RuntimeVal::new_native("globals", native_globals)),
        ("locals", RuntimeVal::new_native("locals", native_locals)),
        ("int", RuntimeVal::new_native("int", native_int)),
        ("float", RuntimeVal::new_native("float", native_float)),
        ("list", RuntimeVal::new_native("list", native_list)),
        ("set", RuntimeVal::new_native("set", native_set)),
    ]
}

// Display strings of the values joined by a space, then a newline
fn native_print(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    let mut parts = Vec::with_capacity(args.len());
    for arg in args {
        parts.push(interp.str_of(arg, env)?);
    }

    env.write_output(&parts.join(" "));
    env.write_output("\n");

    Ok(RuntimeVal::None)
}

// str, repr, len and abs resolve their special method the way the protocols
// do, so a type value answers through `type` rather than its own members

fn native_str(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("str", args, 1)?;

    Ok(RuntimeVal::new_str(&interp.str_of(&args[0], env)?))
}

fn native_repr(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("repr", args, 1)?;

    Ok(RuntimeVal::new_str(&interp.repr_of(&args[0], env)?))
}

fn native_len(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("len", args, 1)?;

    interp.call_special(&args[0], "__len__", vec![], env)?.ok_or_else(|| {
        InterpreterError::Type(format!("object of type '{}' has no len()", args[0].type_name()))
    })
}

fn native_abs(interp: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("abs", args, 1)?;

    interp.call_special(&args[0], "__abs__", vec![], env)?.ok_or_else(|| {
        InterpreterError::Type(format!("bad operand type for abs(): '{}'", args[0].type_name()))
    })
}

fn native_chr(_: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("chr", args, 1)?;
    let code = int_arg(&args[0])?;

    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| RuntimeVal::new_str(&c.to_string()))
        .ok_or_else(|| InterpreterError::Value("chr() arg not in range(0x110000)".into()))
}

fn native_ord(_: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("ord", args, 1)?;

    match &args[0] {
        RuntimeVal::Str(s) => {
            let mut chars = s.chars();

            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(RuntimeVal::Int(c as i64)),
                _ => Err(InterpreterError::Value(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        other => Err(InterpreterError::Type(format!(
            "ord() expected string of length 1, but {} found",
            other.type_name()
        ))),
    }
}

// Ties go to the even neighbour. Without ndigits the result is an int.
fn native_round(_: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_range("round", args, 1, 2)?;

    let number = Number::from_value(&args[0]).ok_or_else(|| {
        InterpreterError::Type(format!(
            "type {} doesn't define __round__ method",
            args[0].type_name()
        ))
    })?;
    let ndigits = match args.get(1) {
        None | Some(RuntimeVal::None) => None,
        Some(arg) => Some(int_arg(arg)?),
    };

    match (number, ndigits) {
        (Number::Int(nb), None) => Ok(RuntimeVal::Int(nb)),
        (Number::Int(nb), Some(digits)) if digits >= 0 => Ok(RuntimeVal::Int(nb)),
        (Number::Int(nb), Some(digits)) => {
            let scale = 10f64.powi(digits.clamp(-308, 0).unsigned_abs() as i32);
            float_to_int((nb as f64 / scale).round_ties_even() * scale)
        }
        (Number::Float(f), None) => float_to_int(f.round_ties_even()),
        (Number::Float(f), Some(digits)) => {
            if !f.is_finite() {
                return Ok(RuntimeVal::Float(f));
            }

            let digits = digits.clamp(-308, 308) as i32;
            let scale = 10f64.powi(digits);
            let rounded = (f * scale).round_ties_even() / scale;

            Ok(RuntimeVal::Float(if rounded.is_finite() { rounded } else { f }))
        }
    }
}

// The name of the value's type, as a string
fn native_type(_: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("type", args, 1)?;

    Ok(RuntimeVal::new_str(&args[0].type_name()))
}

// Keeps the first candidate and replaces it whenever a later one compares
// strictly better through `method`
fn extremum(
    interp: &Interpreter,
    env: &mut Env,
    args: &[RuntimeVal],
    fn_name: &str,
    method: &str,
) -> Result<RuntimeVal, InterpreterError> {
    let candidates = match args {
        [] => {
            return Err(InterpreterError::Type(format!(
                "{} expected at least 1 argument, got 0",
                fn_name
            )))
        }
        [iterable] => interp.iterate(iterable)?,
        _ => args.to_vec(),
    };

    let mut candidates = candidates.into_iter();
    let mut best = candidates
        .next()
        .ok_or_else(|| InterpreterError::Value(format!("{}() arg is an empty sequence", fn_name)))?;

    for item in candidates {
        let better = interp.call_method(&item, method, vec![best.clone()], env)?;

        if interp.is_truthy(&better, env)? {
            best = item;
        }
    }

    Ok(best)
}

fn native_range(_: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_range("range", args, 1, 3)?;

    let ints = args.iter().map(int_arg).collect::<Result<Vec<_>, _>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [start, stop, step] => (*start, *stop, *step),
        [start, stop] => (*start, *stop, 1),
        [stop] => (0, *stop, 1),
        _ => (0, 0, 1),
    };

    if step == 0 {
        return Err(InterpreterError::Value("range() arg 3 must not be zero".into()));
    }

    let mut values = vec![];
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        values.push(RuntimeVal::Int(current));

        current = match current.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }

    Ok(RuntimeVal::new_list(values))
}

fn native_globals(_: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("globals", args, 0)?;

    env.globals_snapshot()
}

fn native_locals(_: &Interpreter, env: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_number("locals", args, 0)?;

    env.locals_snapshot()
}

fn native_int(_: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_range("int", args, 0, 1)?;

    match args.first() {
        None => Ok(RuntimeVal::Int(0)),
        Some(RuntimeVal::Bool(b)) => Ok(RuntimeVal::Int(i64::from(*b))),
        Some(RuntimeVal::Int(nb)) => Ok(RuntimeVal::Int(*nb)),
        Some(RuntimeVal::Float(f)) => float_to_int(f.trunc()),
        Some(RuntimeVal::Str(s)) => s
            .trim()
            .replace('_', "")
            .parse::<i64>()
            .map(RuntimeVal::Int)
            .map_err(|_| InterpreterError::Value(format!("invalid literal for int() with base 10: '{}'", s))),
        Some(other) => Err(InterpreterError::Type(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn native_float(_: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_range("float", args, 0, 1)?;

    match args.first() {
        None => Ok(RuntimeVal::Float(0.)),
        Some(RuntimeVal::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(RuntimeVal::Float)
            .map_err(|_| InterpreterError::Value(format!("could not convert string to float: '{}'", s))),
        Some(other) => match Number::from_value(other) {
            Some(nb) => Ok(RuntimeVal::Float(nb.as_f64())),
            None => Err(InterpreterError::Type(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))),
        },
    }
}

fn native_list(interp: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_range("list", args, 0, 1)?;

    match args.first() {
        None => Ok(RuntimeVal::new_list(vec![])),
        Some(iterable) => Ok(RuntimeVal::new_list(interp.iterate(iterable)?)),
    }
}

fn native_set(interp: &Interpreter, _: &mut Env, args: &[RuntimeVal]) -> Result<RuntimeVal, InterpreterError> {
    check_args_range("set", args, 0, 1)?;

    let mut keys = IndexSet::new();
    if let Some(iterable) = args.first() {
        for item in interp.iterate(iterable)? {
            keys.insert(HashKey::new(item)?);
        }
    }

    Ok(RuntimeVal::new_set(keys))
}

// --------
// Helpers
// --------
pub(crate) fn check_args_number(
    fn_name: &str,
    args: &[RuntimeVal],
    nb_expected: usize,
) -> Result<(), InterpreterError> {
    if args.len() != nb_expected {
        return Err(InterpreterError::wrong_arg_number(fn_name, nb_expected, args.len()));
    }

    Ok(())
}

pub(crate) fn check_args_range(
    fn_name: &str,
    args: &[RuntimeVal],
    min: usize,
    max: usize,
) -> Result<(), InterpreterError> {
    let plural = |nb: usize| if nb == 1 { "" } else { "s" };

    if args.len() < min {
        return Err(InterpreterError::Type(format!(
            "{}() takes at least {} argument{} ({} given)",
            fn_name,
            min,
            plural(min),
            args.len()
        )));
    }
    if args.len() > max {
        return Err(InterpreterError::Type(format!(
            "{}() takes at most {} argument{} ({} given)",
            fn_name,
            max,
            plural(max),
            args.len()
        )));
    }

    Ok(())
}

/// Splits the receiver of a bound native from its arguments.
pub(crate) fn split_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
) -> Result<(&'a RuntimeVal, &'a [RuntimeVal]), InterpreterError> {
    args.split_first()
        .ok_or_else(|| InterpreterError::Type(format!("descriptor '{}' needs an argument", fn_name)))
}

fn int_arg(arg: &RuntimeVal) -> Result<i64, InterpreterError> {
    arg.as_int().ok_or_else(|| {
        InterpreterError::Type(format!(
            "'{}' object cannot be interpreted as an integer",
            arg.type_name()
        ))
    })
}

fn float_to_int(value: f64) -> Result<RuntimeVal, InterpreterError> {
    if value.is_nan() {
        return Err(InterpreterError::Value("cannot convert float NaN to integer".into()));
    }
    if value.is_infinite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(InterpreterError::Value(format!(
            "cannot convert float {} to integer",
            format_float(value)
        )));
    }

    Ok(RuntimeVal::Int(value as i64))
}

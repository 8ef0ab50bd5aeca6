use std::cmp::Ordering;

use super::{method, NativeFn, RuntimeVal};
use crate::environment::Env;
use crate::interpreter::{Interpreter, InterpreterError};
use crate::native_functions::{check_args_number, split_receiver};

/// `int`, `bool` and `float` seen as one number. Bools count as 0 and 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn from_value(value: &RuntimeVal) -> Option<Number> {
        match value {
            RuntimeVal::Bool(b) => Some(Number::Int(i64::from(*b))),
            RuntimeVal::Int(nb) => Some(Number::Int(*nb)),
            RuntimeVal::Float(nb) => Some(Number::Float(*nb)),
            _ => None,
        }
    }

    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(nb) => nb as f64,
            Number::Float(nb) => nb,
        }
    }

    pub(crate) fn into_value(self) -> RuntimeVal {
        match self {
            Number::Int(nb) => RuntimeVal::Int(nb),
            Number::Float(nb) => RuntimeVal::Float(nb),
        }
    }

    pub(crate) fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    And,
    Xor,
    Or,
}

impl BinOp {
    pub(crate) const ALL: [BinOp; 12] = [
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::TrueDiv,
        BinOp::FloorDiv,
        BinOp::Mod,
        BinOp::Pow,
        BinOp::LShift,
        BinOp::RShift,
        BinOp::And,
        BinOp::Xor,
        BinOp::Or,
    ];

    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::TrueDiv => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "** or pow()",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
            BinOp::And => "&",
            BinOp::Xor => "^",
            BinOp::Or => "|",
        }
    }

    pub(crate) fn method(self) -> &'static str {
        match self {
            BinOp::Add => "__add__",
            BinOp::Sub => "__sub__",
            BinOp::Mul => "__mul__",
            BinOp::TrueDiv => "__truediv__",
            BinOp::FloorDiv => "__floordiv__",
            BinOp::Mod => "__mod__",
            BinOp::Pow => "__pow__",
            BinOp::LShift => "__lshift__",
            BinOp::RShift => "__rshift__",
            BinOp::And => "__and__",
            BinOp::Xor => "__xor__",
            BinOp::Or => "__or__",
        }
    }

    pub(crate) fn inplace_method(self) -> &'static str {
        match self {
            BinOp::Add => "__iadd__",
            BinOp::Sub => "__isub__",
            BinOp::Mul => "__imul__",
            BinOp::TrueDiv => "__itruediv__",
            BinOp::FloorDiv => "__ifloordiv__",
            BinOp::Mod => "__imod__",
            BinOp::Pow => "__ipow__",
            BinOp::LShift => "__ilshift__",
            BinOp::RShift => "__irshift__",
            BinOp::And => "__iand__",
            BinOp::Xor => "__ixor__",
            BinOp::Or => "__ior__",
        }
    }

    pub(crate) fn is_inplace(name: &str) -> bool {
        BinOp::ALL.iter().any(|op| op.inplace_method() == name)
    }
}

/// Applies `op` to two numbers. `Ok(None)` means the operation is not defined
/// for these operands (bitwise operators on floats).
pub(crate) fn compute(op: BinOp, lhs: Number, rhs: Number) -> Result<Option<Number>, InterpreterError> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => compute_int(op, a, b).map(Some),
        (a, b) => compute_float(op, a.as_f64(), b.as_f64()),
    }
}

// Overflowing results fall back to float arithmetic
fn compute_int(op: BinOp, a: i64, b: i64) -> Result<Number, InterpreterError> {
    let float = |f: fn(f64, f64) -> f64| Number::Float(f(a as f64, b as f64));

    let res = match op {
        BinOp::Add => a.checked_add(b).map(Number::Int).unwrap_or_else(|| float(|x, y| x + y)),
        BinOp::Sub => a.checked_sub(b).map(Number::Int).unwrap_or_else(|| float(|x, y| x - y)),
        BinOp::Mul => a.checked_mul(b).map(Number::Int).unwrap_or_else(|| float(|x, y| x * y)),
        BinOp::TrueDiv => {
            if b == 0 {
                return Err(InterpreterError::ZeroDivision("division by zero".into()));
            }
            float(|x, y| x / y)
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(InterpreterError::ZeroDivision("integer division or modulo by zero".into()));
            }
            floor_div(a, b).map(Number::Int).unwrap_or_else(|| float(|x, y| (x / y).floor()))
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(InterpreterError::ZeroDivision("integer modulo by zero".into()));
            }
            Number::Int(floor_mod(a, b))
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(InterpreterError::ZeroDivision(
                        "0.0 cannot be raised to a negative power".into(),
                    ));
                }
                float(f64::powf)
            } else {
                u32::try_from(b)
                    .ok()
                    .and_then(|exp| a.checked_pow(exp))
                    .map(Number::Int)
                    .unwrap_or_else(|| float(f64::powf))
            }
        }
        BinOp::LShift => {
            if b < 0 {
                return Err(InterpreterError::Value("negative shift count".into()));
            }

            if a == 0 {
                Number::Int(0)
            } else if b < 63 && (a << b) >> b == a {
                Number::Int(a << b)
            } else {
                Number::Float(a as f64 * 2f64.powf(b as f64))
            }
        }
        BinOp::RShift => {
            if b < 0 {
                return Err(InterpreterError::Value("negative shift count".into()));
            }

            if b >= 64 {
                Number::Int(if a < 0 { -1 } else { 0 })
            } else {
                Number::Int(a >> b)
            }
        }
        BinOp::And => Number::Int(a & b),
        BinOp::Xor => Number::Int(a ^ b),
        BinOp::Or => Number::Int(a | b),
    };

    Ok(res)
}

fn compute_float(op: BinOp, a: f64, b: f64) -> Result<Option<Number>, InterpreterError> {
    let res = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::TrueDiv => {
            if b == 0.0 {
                return Err(InterpreterError::ZeroDivision("float division by zero".into()));
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(InterpreterError::ZeroDivision("float floor division by zero".into()));
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(InterpreterError::ZeroDivision("float modulo".into()));
            }

            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(InterpreterError::ZeroDivision(
                    "0.0 cannot be raised to a negative power".into(),
                ));
            }
            a.powf(b)
        }
        BinOp::LShift | BinOp::RShift | BinOp::And | BinOp::Xor | BinOp::Or => return Ok(None),
    };

    Ok(Some(Number::Float(res)))
}

// Quotient rounded toward negative infinity. None on overflow (MIN // -1).
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;

    if a % b != 0 && ((a < 0) != (b < 0)) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

// Remainder with the sign of the divisor
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a.checked_rem(b).unwrap_or(0);

    if r != 0 && ((r < 0) != (b < 0)) {
        r + b
    } else {
        r
    }
}

/// Float display: `inf`, `nan`, exponent form outside `[1e-4, 1e16)`, and a
/// trailing `.0` on integral values.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".into() } else { "-inf".into() };
    }

    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let formatted = format!("{:e}", value);

        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                let sign = if exponent < 0 { '-' } else { '+' };

                format!("{}e{}{:02}", mantissa, sign, exponent.abs())
            }
            None => formatted,
        };
    }

    let mut res = value.to_string();
    if !res.contains('.') {
        res.push_str(".0");
    }

    res
}


// ----------
//  Members
// ----------

pub(crate) fn members() -> Vec<(&'static str, NativeFn)> {
    let mut members = vec![
        method("__eq__", |_, _, args| {
            let (lhs, other) = number_receiver("__eq__", args, 1)?;

            Ok(RuntimeVal::Bool(
                Number::from_value(&other[0]).is_some_and(|rhs| lhs.compare(rhs) == Some(Ordering::Equal)),
            ))
        }),
        method("__ne__", |_, _, args| {
            let (lhs, other) = number_receiver("__ne__", args, 1)?;

            Ok(RuntimeVal::Bool(
                !Number::from_value(&other[0]).is_some_and(|rhs| lhs.compare(rhs) == Some(Ordering::Equal)),
            ))
        }),
        comparison("__lt__", "<", Ordering::is_lt),
        comparison("__le__", "<=", Ordering::is_le),
        comparison("__gt__", ">", Ordering::is_gt),
        comparison("__ge__", ">=", Ordering::is_ge),
        method("__bool__", |_, _, args| {
            let (nb, _) = number_receiver("__bool__", args, 0)?;

            Ok(RuntimeVal::Bool(nb.as_f64() != 0.0))
        }),
        method("__pos__", |_, _, args| {
            let (nb, _) = number_receiver("__pos__", args, 0)?;

            Ok(nb.into_value())
        }),
        method("__neg__", |_, _, args| {
            let (nb, _) = number_receiver("__neg__", args, 0)?;

            Ok(match nb {
                Number::Int(i) => i.checked_neg().map_or(RuntimeVal::Float(-(i as f64)), RuntimeVal::Int),
                Number::Float(f) => RuntimeVal::Float(-f),
            })
        }),
        method("__abs__", |_, _, args| {
            let (nb, _) = number_receiver("__abs__", args, 0)?;

            Ok(match nb {
                Number::Int(i) => i.checked_abs().map_or(RuntimeVal::Float((i as f64).abs()), RuntimeVal::Int),
                Number::Float(f) => RuntimeVal::Float(f.abs()),
            })
        }),
        method("__invert__", |_, _, args| {
            let (nb, _) = number_receiver("__invert__", args, 0)?;

            match nb {
                Number::Int(i) => Ok(RuntimeVal::Int(!i)),
                Number::Float(_) => Err(InterpreterError::Type("bad operand type for unary ~: 'float'".into())),
            }
        }),
    ];

    for op in BinOp::ALL {
        members.push(binary(op, op.method(), op.symbol().to_string()));
        members.push(binary(op, op.inplace_method(), format!("{}=", op.symbol())));
    }

    members
}

pub(crate) fn int_members() -> Vec<(&'static str, NativeFn)> {
    let to_str = |_: &Interpreter, _: &mut Env, args: &[RuntimeVal]| -> Result<RuntimeVal, InterpreterError> {
        match number_receiver("__str__", args, 0)? {
            (Number::Int(i), _) => Ok(RuntimeVal::new_str(&i.to_string())),
            (Number::Float(f), _) => Ok(RuntimeVal::new_str(&format_float(f))),
        }
    };

    vec![method("__str__", to_str), method("__repr__", to_str)]
}

pub(crate) fn bool_members() -> Vec<(&'static str, NativeFn)> {
    let to_str = |_: &Interpreter, _: &mut Env, args: &[RuntimeVal]| match args.first() {
        Some(RuntimeVal::Bool(b)) if args.len() == 1 => {
            Ok(RuntimeVal::new_str(if *b { "True" } else { "False" }))
        }
        _ => Err(InterpreterError::Type("descriptor '__str__' requires a 'bool' object".into())),
    };

    vec![method("__str__", to_str), method("__repr__", to_str)]
}

pub(crate) fn float_members() -> Vec<(&'static str, NativeFn)> {
    let to_str = |_: &Interpreter, _: &mut Env, args: &[RuntimeVal]| -> Result<RuntimeVal, InterpreterError> {
        let (nb, _) = number_receiver("__str__", args, 0)?;

        Ok(RuntimeVal::new_str(&format_float(nb.as_f64())))
    };

    vec![
        method("__str__", to_str),
        method("__repr__", to_str),
        method("is_integer", |_, _, args| {
            let (nb, _) = number_receiver("is_integer", args, 0)?;
            let f = nb.as_f64();

            Ok(RuntimeVal::Bool(f.is_finite() && f.fract() == 0.0))
        }),
    ]
}

// ----------
//  Helpers
// ----------

fn number_receiver<'a>(
    fn_name: &str,
    args: &'a [RuntimeVal],
    nb_expected: usize,
) -> Result<(Number, &'a [RuntimeVal]), InterpreterError> {
    let (receiver, rest) = split_receiver(fn_name, args)?;
    check_args_number(fn_name, rest, nb_expected)?;

    let nb = Number::from_value(receiver).ok_or_else(|| {
        InterpreterError::Type(format!(
            "descriptor '{}' requires a number but received a '{}'",
            fn_name,
            receiver.type_name()
        ))
    })?;

    Ok((nb, rest))
}

fn comparison(name: &'static str, symbol: &'static str, test: fn(Ordering) -> bool) -> (&'static str, NativeFn) {
    method(name, move |_, _, args| {
        let (lhs, other) = number_receiver(name, args, 1)?;

        match Number::from_value(&other[0]) {
            // NaN compares false to everything
            Some(rhs) => Ok(RuntimeVal::Bool(lhs.compare(rhs).is_some_and(test))),
            None => Err(InterpreterError::Type(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                symbol,
                args[0].type_name(),
                other[0].type_name()
            ))),
        }
    })
}

fn binary(op: BinOp, name: &'static str, symbol: String) -> (&'static str, NativeFn) {
    method(name, move |_, _, args| {
        let (lhs, other) = number_receiver(name, args, 1)?;
        let unsupported =
            || InterpreterError::unsupported_operand(&symbol, &args[0].type_name(), &other[0].type_name());

        // bool & bool stays a bool
        if let (RuntimeVal::Bool(a), RuntimeVal::Bool(b)) = (&args[0], &other[0]) {
            match op {
                BinOp::And => return Ok(RuntimeVal::Bool(a & b)),
                BinOp::Or => return Ok(RuntimeVal::Bool(a | b)),
                BinOp::Xor => return Ok(RuntimeVal::Bool(a ^ b)),
                _ => {}
            }
        }

        let rhs = Number::from_value(&other[0]).ok_or_else(unsupported)?;

        compute(op, lhs, rhs)?
            .map(Number::into_value)
            .ok_or_else(unsupported)
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    fn int(op: BinOp, a: i64, b: i64) -> Result<Number, InterpreterError> {
        compute(op, Number::Int(a), Number::Int(b)).map(|r| r.unwrap())
    }

    #[test]
    fn int_arithmetic_stays_int() {
        assert_eq!(int(BinOp::Add, 2, 3), Ok(Number::Int(5)));
        assert_eq!(int(BinOp::Pow, 2, 27), Ok(Number::Int(134217728)));
        assert_eq!(int(BinOp::TrueDiv, 6, 3), Ok(Number::Float(2.)));
        assert_eq!(int(BinOp::Pow, 2, -1), Ok(Number::Float(0.5)));
    }

    #[test]
    fn floor_semantics() {
        assert_eq!(int(BinOp::FloorDiv, 7, 2), Ok(Number::Int(3)));
        assert_eq!(int(BinOp::FloorDiv, -7, 2), Ok(Number::Int(-4)));
        assert_eq!(int(BinOp::Mod, -7, 2), Ok(Number::Int(1)));
        assert_eq!(int(BinOp::Mod, 7, -2), Ok(Number::Int(-1)));
        assert_eq!(
            compute(BinOp::Mod, Number::Float(-7.5), Number::Int(2)),
            Ok(Some(Number::Float(0.5)))
        );
    }

    #[test]
    fn overflow_degrades_to_float() {
        assert_eq!(int(BinOp::Add, i64::MAX, 1), Ok(Number::Float(i64::MAX as f64 + 1.)));
        assert_eq!(int(BinOp::FloorDiv, i64::MIN, -1), Ok(Number::Float(-(i64::MIN as f64))));
        assert_eq!(int(BinOp::Mod, i64::MIN, -1), Ok(Number::Int(0)));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            int(BinOp::TrueDiv, 1, 0),
            Err(InterpreterError::ZeroDivision("division by zero".into()))
        );
        assert_eq!(
            int(BinOp::FloorDiv, 1, 0),
            Err(InterpreterError::ZeroDivision("integer division or modulo by zero".into()))
        );
        assert!(compute(BinOp::TrueDiv, Number::Float(1.), Number::Float(0.)).is_err());
        assert!(int(BinOp::Pow, 0, -2).is_err());
    }

    #[test]
    fn shifts_and_bitwise() {
        assert_eq!(int(BinOp::LShift, 1, 4), Ok(Number::Int(16)));
        assert_eq!(int(BinOp::RShift, -16, 2), Ok(Number::Int(-4)));
        assert_eq!(int(BinOp::RShift, 5, 200), Ok(Number::Int(0)));
        assert_eq!(
            int(BinOp::LShift, 1, -1),
            Err(InterpreterError::Value("negative shift count".into()))
        );
        assert_eq!(int(BinOp::Xor, 0b1100, 0b1010), Ok(Number::Int(0b0110)));
        assert_eq!(compute(BinOp::And, Number::Float(1.), Number::Int(1)), Ok(None));
    }

    #[test]
    fn mixed_comparison() {
        assert_eq!(Number::Int(1).compare(Number::Float(1.5)), Some(Ordering::Less));
        assert_eq!(Number::Int(2).compare(Number::Float(2.)), Some(Ordering::Equal));
        assert_eq!(Number::Float(f64::NAN).compare(Number::Int(0)), None);
    }

    #[test]
    fn float_display() {
        assert_eq!(format_float(1.), "1.0");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(123456789.0), "123456789.0");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }
}

use thiserror::Error;

use tools::errors::ReportCodeErr;

/// Language-level faults. Each one aborts the current `interpret` call only.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum InterpreterError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("TypeError: {0}")]
    Type(String),

    #[error("NameError: {0}")]
    Name(String),

    #[error("AttributeError: {0}")]
    Attribute(String),

    #[error("IndexError: {0}")]
    Index(String),

    #[error("KeyError: {0}")]
    Key(String),

    #[error("ValueError: {0}")]
    Value(String),

    #[error("ZeroDivisionError: {0}")]
    ZeroDivision(String),
}

impl InterpreterError {
    pub fn kind(&self) -> &'static str {
        match self {
            InterpreterError::Syntax(_) => "SyntaxError",
            InterpreterError::Type(_) => "TypeError",
            InterpreterError::Name(_) => "NameError",
            InterpreterError::Attribute(_) => "AttributeError",
            InterpreterError::Index(_) => "IndexError",
            InterpreterError::Key(_) => "KeyError",
            InterpreterError::Value(_) => "ValueError",
            InterpreterError::ZeroDivision(_) => "ZeroDivisionError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            InterpreterError::Syntax(msg)
            | InterpreterError::Type(msg)
            | InterpreterError::Name(msg)
            | InterpreterError::Attribute(msg)
            | InterpreterError::Index(msg)
            | InterpreterError::Key(msg)
            | InterpreterError::Value(msg)
            | InterpreterError::ZeroDivision(msg) => msg,
        }
    }

    // Shared messages

    pub(crate) fn wrong_arg_number(fn_name: &str, expected: usize, found: usize) -> Self {
        let plural = if expected == 1 { "" } else { "s" };

        InterpreterError::Type(format!(
            "{}() takes {} positional argument{} but {} were given",
            fn_name, expected, plural, found
        ))
    }

    pub(crate) fn unsupported_operand(symbol: &str, lhs: &str, rhs: &str) -> Self {
        InterpreterError::Type(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            symbol, lhs, rhs
        ))
    }

    pub(crate) fn no_attribute(type_name: &str, attribute: &str) -> Self {
        InterpreterError::Attribute(format!("'{}' object has no attribute '{}'", type_name, attribute))
    }
}

impl ReportCodeErr for InterpreterError {
    fn kind(&self) -> &'static str {
        InterpreterError::kind(self)
    }

    fn message(&self) -> String {
        InterpreterError::message(self).to_string()
    }
}

pub mod environment;
pub mod interpreter;
mod native_functions;
pub mod types;
pub mod values;

extern crate frontend;
extern crate tools;

pub use interpreter::{Interpreter, InterpreterError};
pub use values::RuntimeVal;

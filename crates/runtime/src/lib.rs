pub mod environment;
pub mod interpreter;
mod stack;
pub mod values;

extern crate frontend;

pub use frontend::ast::{Expr, Variable};
pub use environment::State;
pub use interpreter::{run, ErrorKind, Evaluation, Interpreter, InterpreterError};
pub use values::{Type, Value};

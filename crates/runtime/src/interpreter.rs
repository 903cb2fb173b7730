mod expr;
mod interp_errors;

use std::io::{self, Stdout, Write};

use tracing::debug;

pub use interp_errors::{ErrorKind, InterpreterError};

use super::{environment::State, values::{Type, Value}};
use crate::frontend::ast::Expr;


// Result of evaluating any expression: its value, its type and the state
// after every assignment it made
pub type Evaluation = (Value, Type, State);

/// Tree-walking evaluator.
///
/// Holds nothing between calls except the sink `Print` writes to. All the
/// program state is threaded through [`Interpreter::evaluate`] explicitly.
pub struct Interpreter<W: Write = Stdout> {
    out: W,
}

impl Interpreter<Stdout> {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for Interpreter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        Self { out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs a whole program from an empty state.
    pub fn run(&mut self, program: &Expr) -> Result<Evaluation, InterpreterError> {
        debug!(nodes = program.node_count(), "running {} program", program.kind_name());

        let (value, value_type, state) = self.evaluate(program, State::new())?;

        debug!("final_value: ({:?}, {})", value, value_type);
        debug!("final_state:\n{}", state);

        Ok((value, value_type, state))
    }
}

/// Runs `program` with an interpreter printing to stdout.
pub fn run(program: &Expr) -> Result<Evaluation, InterpreterError> {
    Interpreter::new().run(program)
}

use colored::*;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    // Arithmetic
    #[error("{} while computing value. Division by zero.", "Error".red().bold())]
    DivisionByZero,

    #[error("{} while computing value. Integer overflow in operation: {0}", "Error".red().bold())]
    IntegerOverflow(String),

    // Operands whose storage doesn't match each other. The evaluator checks the
    // type tags before computing so this only shows up on hand-built values.
    #[error("{} while computing value. Can't apply -{0}- to {1} and {2}.", "Error".red().bold())]
    InconsistentOperands(String, String, String),
}

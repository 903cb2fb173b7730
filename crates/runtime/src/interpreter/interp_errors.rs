use colored::*;
use thiserror::Error;

use crate::values::ValueError;

#[derive(Error, Debug, PartialEq)]
pub enum InterpreterError {
    // Variables
    #[error("{} cannot read from {0} before assignment.", "Error".red().bold())]
    UseBeforeAssignment(String),

    // Types
    #[error("{} mismatched types: {0}", "Error".red().bold())]
    TypeMismatch(String),

    // Malformed tree handed over by the AST builder
    #[error("{} unhandled expression: {0}", "Error".red().bold())]
    Unhandled(String),

    #[error("{0}")]
    Arithmetic(#[from] ValueError),

    #[error("{} while writing program output: {0}", "Error".red().bold())]
    Output(String),
}

// Error classes a driver can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UseBeforeAssignment,
    TypeMismatch,
    Syntax,
    Arithmetic,
    Output,
}

impl InterpreterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InterpreterError::UseBeforeAssignment(_) => ErrorKind::UseBeforeAssignment,
            InterpreterError::TypeMismatch(_) => ErrorKind::TypeMismatch,
            InterpreterError::Unhandled(_) => ErrorKind::Syntax,
            // Storage disagreeing with the tags is a typing problem too
            InterpreterError::Arithmetic(ValueError::InconsistentOperands(..)) => ErrorKind::TypeMismatch,
            InterpreterError::Arithmetic(_) => ErrorKind::Arithmetic,
            InterpreterError::Output(_) => ErrorKind::Output,
        }
    }
}

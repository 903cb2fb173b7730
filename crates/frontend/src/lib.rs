pub mod ast;
pub mod builder;

pub use ast::{Expr, Variable};

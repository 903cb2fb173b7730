// Shorthands to build trees by hand. Drivers and tests use them in place of a
// parser, which this workspace does not have.

use crate::ast::{Expr, Variable};

pub fn ren() -> Expr {
    Expr::Ren
}

pub fn int(value: i64) -> Expr {
    Expr::IntLiteral(value)
}

pub fn float(value: f64) -> Expr {
    Expr::FloatingPointLiteral(value)
}

pub fn string(value: impl Into<String>) -> Expr {
    Expr::StringLiteral(value.into())
}

pub fn boolean(value: bool) -> Expr {
    Expr::BooleanLiteral(value)
}

pub fn var(name: impl Into<String>) -> Expr {
    Expr::Variable(Variable::new(name))
}

pub fn assign(name: impl Into<String>, value: Expr) -> Expr {
    Expr::Assign {
        variable: Variable::new(name),
        value: Box::new(value),
    }
}

pub fn seq(exprs: Vec<Expr>) -> Expr {
    Expr::Sequence(exprs)
}

pub fn program(exprs: Vec<Expr>) -> Expr {
    Expr::Program(exprs)
}

pub fn print(expr: Expr) -> Expr {
    Expr::Print(Box::new(expr))
}

pub fn not(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

pub fn if_else(condition: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
    Expr::If {
        condition: Box::new(condition),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    }
}

pub fn while_loop(condition: Expr, body: Expr) -> Expr {
    Expr::While {
        condition: Box::new(condition),
        body: Box::new(body),
    }
}

// All binary nodes share the same shape
macro_rules! binary_builders {
    ($($fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            pub fn $fn_name(left: Expr, right: Expr) -> Expr {
                Expr::$variant {
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        )*
    };
}

binary_builders! {
    add => Add,
    sub => Subtract,
    mul => Multiply,
    div => Divide,
    and => And,
    or => Or,
    lt => Lt,
    lte => Lte,
    gt => Gt,
    gte => Gte,
    eq => Eq,
    ne => Ne,
}

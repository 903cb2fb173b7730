use std::fmt::{Debug, Display};

mod value_errors;

pub use value_errors::ValueError;


// Runtime type tag. Tracked next to every value, the evaluator only ever
// decides semantics from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Unit,
    Integer,
    FloatingPoint,
    String,
    Boolean,
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Unit => write!(f, "Unit"),
            Type::Integer => write!(f, "Integer"),
            Type::FloatingPoint => write!(f, "FloatingPoint"),
            Type::String => write!(f, "String"),
            Type::Boolean => write!(f, "Boolean"),
        }
    }
}

impl Type {
    // Types accepted by each family of operators
    pub fn supports_arith(&self, op: ArithOp) -> bool {
        match op {
            // Strings concatenate
            ArithOp::Add => matches!(self, Type::Integer | Type::FloatingPoint | Type::String),
            ArithOp::Sub | ArithOp::Mul | ArithOp::Div => {
                matches!(self, Type::Integer | Type::FloatingPoint)
            }
        }
    }

    pub fn supports_comparison(&self) -> bool {
        matches!(
            self,
            Type::Unit | Type::Integer | Type::FloatingPoint | Type::String | Type::Boolean
        )
    }
}


#[derive(Clone, PartialEq)]
pub enum Value {
    Unit,
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Debug for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Int(nb) => write!(f, "{}", nb),
            Value::Float(nb) => write!(f, "{:?}", nb),
            Value::Str(s) => write!(f, "{:?}", s),
            // Same spelling as the printed form
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
        }
    }
}

// Rendering used by the print construct
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Int(nb) => write!(f, "{}", nb),
            // Debug keeps the fractional part: 3.0, not 3
            Value::Float(nb) => write!(f, "{:?}", nb),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
        }
    }
}

impl Value {
    // Tag matching the storage. Only for diagnostics, the evaluator carries
    // its own tags.
    pub fn storage_type(&self) -> Type {
        match self {
            Value::Unit => Type::Unit,
            Value::Int(_) => Type::Integer,
            Value::Float(_) => Type::FloatingPoint,
            Value::Str(_) => Type::String,
            Value::Bool(_) => Type::Boolean,
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(nb) => *nb == 1,
            _ => false,
        }
    }

    pub fn calculate(self, rhs: Value, op: ArithOp) -> Result<Value, ValueError> {
        match (self, rhs) {
            (Value::Int(lhs), Value::Int(rhs)) => Ok(Value::Int(compute_int(lhs, rhs, op)?)),
            (Value::Float(lhs), Value::Float(rhs)) => Ok(Value::Float(compute_float(lhs, rhs, op)?)),
            (Value::Str(mut lhs), Value::Str(rhs)) if op == ArithOp::Add => {
                lhs.push_str(&rhs);
                Ok(Value::Str(lhs))
            }
            (lhs, rhs) => Err(inconsistent(op, &lhs, &rhs)),
        }
    }

    pub fn compare(&self, rhs: &Value, op: CmpOp) -> Result<bool, ValueError> {
        match (self, rhs) {
            (Value::Int(lhs), Value::Int(rhs)) => Ok(op.apply(lhs, rhs)),
            (Value::Float(lhs), Value::Float(rhs)) => Ok(op.apply(lhs, rhs)),
            (Value::Str(lhs), Value::Str(rhs)) => Ok(op.apply(lhs, rhs)),
            (Value::Bool(lhs), Value::Bool(rhs)) => Ok(op.apply(lhs, rhs)),
            // There is only one unit value
            (Value::Unit, Value::Unit) => Ok(op.on_equal()),
            (lhs, rhs) => Err(inconsistent(op, lhs, rhs)),
        }
    }

    pub fn logical(&self, rhs: &Value, op: LogicOp) -> Result<bool, ValueError> {
        match (self, rhs) {
            (Value::Bool(lhs), Value::Bool(rhs)) => Ok(match op {
                LogicOp::And => *lhs && *rhs,
                LogicOp::Or => *lhs || *rhs,
            }),
            (lhs, rhs) => Err(inconsistent(op, lhs, rhs)),
        }
    }
}

fn inconsistent(op: impl Display, lhs: &Value, rhs: &Value) -> ValueError {
    ValueError::InconsistentOperands(
        op.to_string(),
        lhs.storage_type().to_string(),
        rhs.storage_type().to_string(),
    )
}

fn compute_int(lhs: i64, rhs: i64, op: ArithOp) -> Result<i64, ValueError> {
    let res = match op {
        ArithOp::Add => lhs.checked_add(rhs),
        ArithOp::Sub => lhs.checked_sub(rhs),
        ArithOp::Mul => lhs.checked_mul(rhs),
        ArithOp::Div => return floor_div(lhs, rhs),
    };

    res.ok_or_else(|| ValueError::IntegerOverflow(format!("{} {} {}", lhs, op, rhs)))
}

// Integer division rounds toward negative infinity: -7 / 2 == -4
fn floor_div(lhs: i64, rhs: i64) -> Result<i64, ValueError> {
    if rhs == 0 {
        return Err(ValueError::DivisionByZero);
    }

    // Only i64::MIN / -1 fails here
    let quotient = lhs
        .checked_div(rhs)
        .ok_or_else(|| ValueError::IntegerOverflow(format!("{} / {}", lhs, rhs)))?;

    if lhs % rhs != 0 && ((lhs < 0) != (rhs < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn compute_float(lhs: f64, rhs: f64, op: ArithOp) -> Result<f64, ValueError> {
    match op {
        ArithOp::Add => Ok(lhs + rhs),
        ArithOp::Sub => Ok(lhs - rhs),
        ArithOp::Mul => Ok(lhs * rhs),
        ArithOp::Div if rhs == 0. => Err(ValueError::DivisionByZero),
        ArithOp::Div => Ok(lhs / rhs),
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Display for ArithOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Lte,
    Gt,
    Gte,
    Eq,
    Ne,
}

impl CmpOp {
    fn apply<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            CmpOp::Lt => lhs < rhs,
            CmpOp::Lte => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Gte => lhs >= rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }

    // Result when both sides are known to be equal
    fn on_equal(self) -> bool {
        matches!(self, CmpOp::Lte | CmpOp::Gte | CmpOp::Eq)
    }
}

impl Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CmpOp::Lt => write!(f, "<"),
            CmpOp::Lte => write!(f, "<="),
            CmpOp::Gt => write!(f, ">"),
            CmpOp::Gte => write!(f, ">="),
            CmpOp::Eq => write!(f, "=="),
            CmpOp::Ne => write!(f, "!="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl Display for LogicOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicOp::And => write!(f, "and"),
            LogicOp::Or => write!(f, "or"),
        }
    }
}

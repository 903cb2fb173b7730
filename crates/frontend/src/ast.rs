use std::fmt::Display;
use std::mem;


// Variable node. Used both for reads and as the target of an assignment, so
// an assignment can only ever target a variable.
#[derive(Debug, PartialEq, Clone)]
pub struct Variable {
    pub name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    // Unit literal
    Ren,
    IntLiteral(i64),
    FloatingPointLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    Variable(Variable),
    // Assignment is an expression, its value is the assigned value
    Assign {
        variable: Variable,
        value: Box<Expr>,
    },
    Sequence(Vec<Expr>),
    // Same semantics as a sequence, marks the root of a program
    Program(Vec<Expr>),
    Print(Box<Expr>),
    // Box needed to avoid recursion
    Add {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Subtract {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Multiply {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Divide {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    If {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Lt {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Lte {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Gt {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Gte {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Eq {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ne {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    While {
        condition: Box<Expr>,
        body: Box<Expr>,
    },
}

impl Expr {
    /// Name of the construct, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Ren => "Ren",
            Expr::IntLiteral(_) => "IntLiteral",
            Expr::FloatingPointLiteral(_) => "FloatingPointLiteral",
            Expr::StringLiteral(_) => "StringLiteral",
            Expr::BooleanLiteral(_) => "BooleanLiteral",
            Expr::Variable(_) => "Variable",
            Expr::Assign { .. } => "Assign",
            Expr::Sequence(_) => "Sequence",
            Expr::Program(_) => "Program",
            Expr::Print(_) => "Print",
            Expr::Add { .. } => "Add",
            Expr::Subtract { .. } => "Subtract",
            Expr::Multiply { .. } => "Multiply",
            Expr::Divide { .. } => "Divide",
            Expr::And { .. } => "And",
            Expr::Or { .. } => "Or",
            Expr::Not(_) => "Not",
            Expr::If { .. } => "If",
            Expr::Lt { .. } => "Lt",
            Expr::Lte { .. } => "Lte",
            Expr::Gt { .. } => "Gt",
            Expr::Gte { .. } => "Gte",
            Expr::Eq { .. } => "Eq",
            Expr::Ne { .. } => "Ne",
            Expr::While { .. } => "While",
        }
    }

    // Number of nodes in the tree, root included. Walks with an explicit
    // stack, trees can be deeper than the native one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];

        while let Some(expr) = pending.pop() {
            count += 1;
            expr.push_children(&mut pending);
        }

        count
    }

    fn push_children<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            Expr::Ren
            | Expr::IntLiteral(_)
            | Expr::FloatingPointLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BooleanLiteral(_)
            | Expr::Variable(_) => {}
            Expr::Assign { value: e, .. } | Expr::Print(e) | Expr::Not(e) => out.push(&**e),
            Expr::Sequence(exprs) | Expr::Program(exprs) => out.extend(exprs.iter()),
            Expr::Add { left, right }
            | Expr::Subtract { left, right }
            | Expr::Multiply { left, right }
            | Expr::Divide { left, right }
            | Expr::And { left, right }
            | Expr::Or { left, right }
            | Expr::Lt { left, right }
            | Expr::Lte { left, right }
            | Expr::Gt { left, right }
            | Expr::Gte { left, right }
            | Expr::Eq { left, right }
            | Expr::Ne { left, right } => out.extend([&**left, &**right]),
            Expr::If { condition, then_branch, else_branch } => {
                out.extend([&**condition, &**then_branch, &**else_branch])
            }
            Expr::While { condition, body } => out.extend([&**condition, &**body]),
        }
    }

    // Moves the children out, leaving unit literals in their place
    fn take_children(&mut self, out: &mut Vec<Expr>) {
        fn take(e: &mut Box<Expr>) -> Expr {
            mem::replace(&mut **e, Expr::Ren)
        }

        match self {
            Expr::Ren
            | Expr::IntLiteral(_)
            | Expr::FloatingPointLiteral(_)
            | Expr::StringLiteral(_)
            | Expr::BooleanLiteral(_)
            | Expr::Variable(_) => {}
            Expr::Assign { value: e, .. } | Expr::Print(e) | Expr::Not(e) => out.push(take(e)),
            Expr::Sequence(exprs) | Expr::Program(exprs) => out.append(exprs),
            Expr::Add { left, right }
            | Expr::Subtract { left, right }
            | Expr::Multiply { left, right }
            | Expr::Divide { left, right }
            | Expr::And { left, right }
            | Expr::Or { left, right }
            | Expr::Lt { left, right }
            | Expr::Lte { left, right }
            | Expr::Gt { left, right }
            | Expr::Gte { left, right }
            | Expr::Eq { left, right }
            | Expr::Ne { left, right } => out.extend([take(left), take(right)]),
            Expr::If { condition, then_branch, else_branch } => {
                out.extend([take(condition), take(then_branch), take(else_branch)])
            }
            Expr::While { condition, body } => out.extend([take(condition), take(body)]),
        }
    }
}

// The derived drop glue recurses once per level. Flatten the tree first so
// dropping a deep program doesn't overflow the stack.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);

        while let Some(mut expr) = pending.pop() {
            expr.take_children(&mut pending);
        }
    }
}

impl From<Variable> for Expr {
    fn from(value: Variable) -> Self {
        Expr::Variable(value)
    }
}

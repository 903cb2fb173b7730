use std::io::Write;

use tracing::trace;

use super::{Evaluation, Interpreter, InterpreterError};
use crate::environment::State;
use crate::frontend::ast::{Expr, Variable};
use crate::stack::ensure_sufficient_stack;
use crate::values::{ArithOp, CmpOp, LogicOp, Type, Value};


impl<W: Write> Interpreter<W> {
    /// Evaluates `expr` against `state`.
    ///
    /// Subexpressions are evaluated left to right, each one receiving the state
    /// returned by the previous one. The returned state holds every assignment
    /// made while evaluating `expr`.
    pub fn evaluate(&mut self, expr: &Expr, state: State) -> Result<Evaluation, InterpreterError> {
        ensure_sufficient_stack(|| self.evaluate_node(expr, state))
    }

    fn evaluate_node(&mut self, expr: &Expr, state: State) -> Result<Evaluation, InterpreterError> {
        match expr {
            Expr::Ren => Ok((Value::Unit, Type::Unit, state)),
            Expr::IntLiteral(value) => Ok((Value::Int(*value), Type::Integer, state)),
            Expr::FloatingPointLiteral(value) => Ok((Value::Float(*value), Type::FloatingPoint, state)),
            Expr::StringLiteral(value) => Ok((Value::Str(value.clone()), Type::String, state)),
            Expr::BooleanLiteral(value) => Ok((Value::Bool(*value), Type::Boolean, state)),
            Expr::Print(to_print) => {
                let (value, value_type, state) = self.evaluate(to_print, state)?;

                let text = match value_type {
                    Type::Unit => "Unit".to_string(),
                    _ => value.to_string(),
                };

                writeln!(self.out, "{}", text)
                    .and_then(|_| self.out.flush())
                    .map_err(|e| InterpreterError::Output(e.to_string()))?;

                Ok((value, value_type, state))
            }
            Expr::Variable(Variable { name }) => {
                let (value, value_type) = state
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| InterpreterError::UseBeforeAssignment(name.clone()))?;

                Ok((value, value_type, state))
            }
            Expr::Sequence(exprs) | Expr::Program(exprs) => {
                // Result of the last one, state of all of them
                let (last, init) = exprs.split_last().ok_or_else(|| {
                    InterpreterError::Unhandled(format!("{} with no expressions", expr.kind_name()))
                })?;

                let mut state = state;
                for e in init {
                    (_, _, state) = self.evaluate(e, state)?;
                }

                self.evaluate(last, state)
            }
            Expr::Assign { variable, value } => {
                let (value, value_type, state) = self.evaluate(value, state)?;

                // Once a variable has a type, it keeps it
                if let Some((_, declared_type)) = state.lookup(&variable.name) {
                    if *declared_type != value_type {
                        return Err(InterpreterError::TypeMismatch(format!(
                            "Assign: cannot assign {} to {} of type {}",
                            value_type, variable.name, declared_type
                        )));
                    }
                }

                trace!("{} := ({:?}, {})", variable.name, value, value_type);
                let state = state.bind(variable.name.clone(), value.clone(), value_type);

                Ok((value, value_type, state))
            }
            Expr::Add { left, right } => self.arithmetic(expr, ArithOp::Add, left, right, state),
            Expr::Subtract { left, right } => self.arithmetic(expr, ArithOp::Sub, left, right, state),
            Expr::Multiply { left, right } => self.arithmetic(expr, ArithOp::Mul, left, right, state),
            Expr::Divide { left, right } => self.arithmetic(expr, ArithOp::Div, left, right, state),
            Expr::And { left, right } => self.logical(expr, LogicOp::And, left, right, state),
            Expr::Or { left, right } => self.logical(expr, LogicOp::Or, left, right, state),
            Expr::Not(operand) => {
                let (value, value_type, state) = self.evaluate(operand, state)?;

                match (value, value_type) {
                    (Value::Bool(b), Type::Boolean) => Ok((Value::Bool(!b), Type::Boolean, state)),
                    (_, t) => Err(InterpreterError::TypeMismatch(format!(
                        "Not: cannot perform logical not on {} operand",
                        t
                    ))),
                }
            }
            Expr::If { condition, then_branch, else_branch } => {
                // Both branches always run, in order, and both of their
                // effects are kept. Only the result is selected.
                let (cond, cond_type, state) = self.evaluate(condition, state)?;
                let (then_value, then_type, state) = self.evaluate(then_branch, state)?;
                let (else_value, else_type, state) = self.evaluate(else_branch, state)?;

                expect_boolean(expr, cond_type)?;

                if cond.is_truthy() {
                    Ok((then_value, then_type, state))
                } else {
                    Ok((else_value, else_type, state))
                }
            }
            Expr::Lt { left, right } => self.comparison(expr, CmpOp::Lt, left, right, state),
            Expr::Lte { left, right } => self.comparison(expr, CmpOp::Lte, left, right, state),
            Expr::Gt { left, right } => self.comparison(expr, CmpOp::Gt, left, right, state),
            Expr::Gte { left, right } => self.comparison(expr, CmpOp::Gte, left, right, state),
            Expr::Eq { left, right } => self.comparison(expr, CmpOp::Eq, left, right, state),
            Expr::Ne { left, right } => self.comparison(expr, CmpOp::Ne, left, right, state),
            Expr::While { condition, body } => {
                let (mut cond, mut cond_type, mut state) = self.evaluate(condition, state)?;
                let mut iterations: u64 = 0;

                loop {
                    expect_boolean(expr, cond_type)?;

                    if !cond.is_truthy() {
                        break;
                    }

                    (_, _, state) = self.evaluate(body, state)?;
                    (cond, cond_type, state) = self.evaluate(condition, state)?;

                    iterations += 1;
                    trace!(iterations, "while loop iteration done");
                }

                Ok((Value::Bool(false), Type::Boolean, state))
            }
        }
    }

    // Left then right, the right side sees the assignments of the left one
    fn evaluate_operands(
        &mut self,
        left: &Expr,
        right: &Expr,
        state: State,
    ) -> Result<((Value, Type), (Value, Type), State), InterpreterError> {
        let (lhs, lhs_type, state) = self.evaluate(left, state)?;
        let (rhs, rhs_type, state) = self.evaluate(right, state)?;

        Ok(((lhs, lhs_type), (rhs, rhs_type), state))
    }

    fn arithmetic(
        &mut self,
        expr: &Expr,
        op: ArithOp,
        left: &Expr,
        right: &Expr,
        state: State,
    ) -> Result<Evaluation, InterpreterError> {
        let ((lhs, lhs_type), (rhs, rhs_type), state) = self.evaluate_operands(left, right, state)?;

        expect_same_type(expr, lhs_type, rhs_type)?;

        if !lhs_type.supports_arith(op) {
            return Err(InterpreterError::TypeMismatch(format!(
                "{}: cannot apply {} to {} operands",
                expr.kind_name(),
                op,
                lhs_type
            )));
        }

        Ok((lhs.calculate(rhs, op)?, lhs_type, state))
    }

    fn logical(
        &mut self,
        expr: &Expr,
        op: LogicOp,
        left: &Expr,
        right: &Expr,
        state: State,
    ) -> Result<Evaluation, InterpreterError> {
        let ((lhs, lhs_type), (rhs, rhs_type), state) = self.evaluate_operands(left, right, state)?;

        expect_same_type(expr, lhs_type, rhs_type)?;
        expect_boolean(expr, lhs_type)?;

        Ok((Value::Bool(lhs.logical(&rhs, op)?), Type::Boolean, state))
    }

    fn comparison(
        &mut self,
        expr: &Expr,
        op: CmpOp,
        left: &Expr,
        right: &Expr,
        state: State,
    ) -> Result<Evaluation, InterpreterError> {
        let ((lhs, lhs_type), (rhs, rhs_type), state) = self.evaluate_operands(left, right, state)?;

        expect_same_type(expr, lhs_type, rhs_type)?;

        if !lhs_type.supports_comparison() {
            return Err(InterpreterError::TypeMismatch(format!(
                "{}: cannot perform {} on {} operands",
                expr.kind_name(),
                op,
                lhs_type
            )));
        }

        Ok((Value::Bool(lhs.compare(&rhs, op)?), Type::Boolean, state))
    }
}

fn expect_same_type(expr: &Expr, lhs: Type, rhs: Type) -> Result<(), InterpreterError> {
    if lhs != rhs {
        return Err(InterpreterError::TypeMismatch(format!(
            "{}: cannot combine {} with {}",
            expr.kind_name(),
            lhs,
            rhs
        )));
    }

    Ok(())
}

fn expect_boolean(expr: &Expr, found: Type) -> Result<(), InterpreterError> {
    match found {
        Type::Boolean => Ok(()),
        _ => Err(InterpreterError::TypeMismatch(format!(
            "{}: expected Boolean, found {}",
            expr.kind_name(),
            found
        ))),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use frontend::builder::*;
    use pretty_assertions::assert_eq;

    fn interp() -> Interpreter<Vec<u8>> {
        Interpreter::with_output(Vec::new())
    }

    fn eval(expr: &Expr) -> Result<Evaluation, InterpreterError> {
        interp().evaluate(expr, State::new())
    }

    fn value_of(expr: &Expr) -> (Value, Type) {
        let (value, value_type, _) = eval(expr).unwrap();
        (value, value_type)
    }

    fn printed(interp: Interpreter<Vec<u8>>) -> String {
        String::from_utf8(interp.into_output()).unwrap()
    }

    fn is_type_mismatch(res: Result<Evaluation, InterpreterError>) -> bool {
        matches!(res, Err(InterpreterError::TypeMismatch(_)))
    }

    #[test]
    fn literals_leave_state_untouched() {
        let state = State::new().bind("x", Value::Int(1), Type::Integer);
        let cases = [
            (ren(), Value::Unit, Type::Unit),
            (int(42), Value::Int(42), Type::Integer),
            (float(2.5), Value::Float(2.5), Type::FloatingPoint),
            (string("hello"), Value::Str("hello".into()), Type::String),
            (boolean(true), Value::Bool(true), Type::Boolean),
        ];

        for (expr, value, value_type) in cases {
            let res = interp().evaluate(&expr, state.clone()).unwrap();
            assert_eq!(res, (value, value_type, state.clone()));
        }
    }

    #[test]
    fn read_unassigned_variable() {
        assert!(matches!(
            eval(&var("ghost")),
            Err(InterpreterError::UseBeforeAssignment(ref name)) if name == "ghost"
        ));
    }

    #[test]
    fn read_after_assign() {
        let (_, _, state) = eval(&assign("x", float(1.5))).unwrap();

        for _ in 0..3 {
            let (value, value_type, after) = interp().evaluate(&var("x"), state.clone()).unwrap();
            assert_eq!((value, value_type), (Value::Float(1.5), Type::FloatingPoint));
            assert_eq!(after, state);
        }
    }

    #[test]
    fn assign_returns_assigned_value() {
        let (value, value_type, state) = eval(&assign("name", string("mars"))).unwrap();

        assert_eq!((value, value_type), (Value::Str("mars".into()), Type::String));
        assert_eq!(state.lookup("name"), Some(&(Value::Str("mars".into()), Type::String)));
    }

    #[test]
    fn assign_keeps_variable_type() {
        let program = seq(vec![assign("x", int(1)), assign("x", string("one"))]);
        assert!(is_type_mismatch(eval(&program)));

        let program = seq(vec![assign("x", ren()), assign("x", boolean(false))]);
        assert!(is_type_mismatch(eval(&program)));
    }

    #[test]
    fn reassign_only_touches_target() {
        let state = State::new()
            .bind("x", Value::Int(1), Type::Integer)
            .bind("y", Value::Str("kept".into()), Type::String);

        let (_, _, after) = interp().evaluate(&assign("x", int(2)), state.clone()).unwrap();

        assert_eq!(after.lookup("x"), Some(&(Value::Int(2), Type::Integer)));
        assert_eq!(after.lookup("y"), state.lookup("y"));
        assert_eq!(after.len(), 2);
        // The input snapshot is unchanged
        assert_eq!(state.lookup("x"), Some(&(Value::Int(1), Type::Integer)));
    }

    #[test]
    fn sequence_threads_state() {
        let program = seq(vec![
            assign("a", int(2)),
            assign("b", mul(var("a"), int(10))),
            sub(var("b"), var("a")),
        ]);

        let (value, value_type, state) = eval(&program).unwrap();

        assert_eq!((value, value_type), (Value::Int(18), Type::Integer));
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(matches!(eval(&seq(vec![])), Err(InterpreterError::Unhandled(_))));
        assert!(matches!(eval(&program(vec![])), Err(InterpreterError::Unhandled(_))));
    }

    #[test]
    fn operands_see_earlier_assignments() {
        // (x := 4) + x
        let expr = add(assign("x", int(4)), var("x"));
        assert_eq!(value_of(&expr), (Value::Int(8), Type::Integer));
    }

    #[test]
    fn arithmetic() {
        assert_eq!(value_of(&add(int(2), int(3))), (Value::Int(5), Type::Integer));
        assert_eq!(value_of(&sub(float(2.5), float(0.5))), (Value::Float(2.), Type::FloatingPoint));
        assert_eq!(value_of(&mul(int(-4), int(3))), (Value::Int(-12), Type::Integer));
        assert_eq!(value_of(&div(float(7.), float(2.))), (Value::Float(3.5), Type::FloatingPoint));
        assert_eq!(
            value_of(&add(string("foo"), string("bar"))),
            (Value::Str("foobar".into()), Type::String)
        );
    }

    #[test]
    fn integer_division_floors() {
        assert_eq!(value_of(&div(int(7), int(2))), (Value::Int(3), Type::Integer));
        assert_eq!(value_of(&div(int(-7), int(2))), (Value::Int(-4), Type::Integer));
    }

    #[test]
    fn division_by_zero() {
        assert!(matches!(
            eval(&div(int(1), int(0))),
            Err(InterpreterError::Arithmetic(crate::values::ValueError::DivisionByZero))
        ));
        assert!(matches!(
            eval(&div(float(1.), float(0.))),
            Err(InterpreterError::Arithmetic(crate::values::ValueError::DivisionByZero))
        ));
    }

    #[test]
    fn mismatched_operands() {
        assert!(is_type_mismatch(eval(&add(int(1), boolean(true)))));
        assert!(is_type_mismatch(eval(&add(boolean(true), int(1)))));
        assert!(is_type_mismatch(eval(&sub(int(1), float(1.)))));
        assert!(is_type_mismatch(eval(&mul(string("a"), int(2)))));
        assert!(is_type_mismatch(eval(&div(float(1.), int(2)))));
        assert!(is_type_mismatch(eval(&lt(int(1), string("1")))));
    }

    #[test]
    fn unsupported_operands() {
        assert!(is_type_mismatch(eval(&add(boolean(true), boolean(false)))));
        assert!(is_type_mismatch(eval(&add(ren(), ren()))));
        assert!(is_type_mismatch(eval(&sub(string("a"), string("b")))));
        assert!(is_type_mismatch(eval(&mul(string("a"), string("b")))));
        assert!(is_type_mismatch(eval(&div(boolean(true), boolean(true)))));
        assert!(is_type_mismatch(eval(&and(int(1), int(1)))));
        assert!(is_type_mismatch(eval(&or(string("a"), string("b")))));
        assert!(is_type_mismatch(eval(&not(int(0)))));
    }

    #[test]
    fn boolean_logic() {
        assert_eq!(value_of(&and(boolean(true), boolean(false))), (Value::Bool(false), Type::Boolean));
        assert_eq!(value_of(&or(boolean(false), boolean(true))), (Value::Bool(true), Type::Boolean));
        assert_eq!(value_of(&not(boolean(false))), (Value::Bool(true), Type::Boolean));
    }

    #[test]
    fn logic_evaluates_both_operands() {
        let mut interp = interp();
        let expr = and(print(boolean(false)), print(boolean(true)));

        let (value, _, _) = interp.evaluate(&expr, State::new()).unwrap();

        assert_eq!(value, Value::Bool(false));
        assert_eq!(printed(interp), "False\nTrue\n");
    }

    #[test]
    fn comparisons() {
        assert_eq!(value_of(&lt(int(1), int(2))), (Value::Bool(true), Type::Boolean));
        assert_eq!(value_of(&gte(float(1.), float(2.))), (Value::Bool(false), Type::Boolean));
        assert_eq!(value_of(&lte(string("abc"), string("abd"))), (Value::Bool(true), Type::Boolean));
        assert_eq!(value_of(&gt(boolean(true), boolean(false))), (Value::Bool(true), Type::Boolean));
        assert_eq!(value_of(&eq(string("a"), string("a"))), (Value::Bool(true), Type::Boolean));
        assert_eq!(value_of(&ne(int(3), int(3))), (Value::Bool(false), Type::Boolean));
    }

    #[test]
    fn unit_comparisons() {
        let state = State::new();
        let (value, value_type, after) = interp().evaluate(&eq(ren(), ren()), state.clone()).unwrap();
        assert_eq!((value, value_type, after), (Value::Bool(true), Type::Boolean, state.clone()));

        let (value, _, _) = interp().evaluate(&lt(ren(), ren()), state).unwrap();
        assert_eq!(value, Value::Bool(false));

        assert_eq!(value_of(&lte(ren(), ren())).0, Value::Bool(true));
        assert_eq!(value_of(&gt(ren(), ren())).0, Value::Bool(false));
        assert_eq!(value_of(&gte(ren(), ren())).0, Value::Bool(true));
        assert_eq!(value_of(&ne(ren(), ren())).0, Value::Bool(false));
    }

    #[test]
    fn print_writes_values() {
        let mut interp = interp();
        let program = seq(vec![
            print(ren()),
            print(int(3)),
            print(float(3.)),
            print(string("hi there")),
            print(boolean(true)),
        ]);

        let (value, value_type, _) = interp.evaluate(&program, State::new()).unwrap();

        assert_eq!((value, value_type), (Value::Bool(true), Type::Boolean));
        assert_eq!(printed(interp), "Unit\n3\n3.0\nhi there\nTrue\n");
    }

    #[test]
    fn print_returns_operand_evaluation() {
        let (value, value_type, state) = eval(&print(assign("x", int(9)))).unwrap();

        assert_eq!((value, value_type), (Value::Int(9), Type::Integer));
        assert!(state.contains("x"));
    }

    #[test]
    fn if_selects_branch() {
        assert_eq!(
            value_of(&if_else(boolean(false), int(1), int(2))),
            (Value::Int(2), Type::Integer)
        );
        assert_eq!(
            value_of(&if_else(lt(int(1), int(2)), string("yes"), float(0.))),
            (Value::Str("yes".into()), Type::String)
        );
    }

    #[test]
    fn if_runs_both_branches() {
        let mut interp = interp();
        let expr = if_else(
            boolean(false),
            seq(vec![print(string("then")), assign("t", int(1))]),
            seq(vec![print(string("else")), assign("e", int(2))]),
        );

        let (value, value_type, state) = interp.evaluate(&expr, State::new()).unwrap();

        assert_eq!((value, value_type), (Value::Int(2), Type::Integer));
        assert!(state.contains("t"));
        assert!(state.contains("e"));
        assert_eq!(printed(interp), "then\nelse\n");
    }

    #[test]
    fn if_requires_boolean_condition() {
        assert!(is_type_mismatch(eval(&if_else(int(1), int(1), int(2)))));
    }

    #[test]
    fn while_counts_down() {
        let program = seq(vec![
            assign("i", int(3)),
            assign("steps", int(0)),
            while_loop(
                gt(var("i"), int(0)),
                seq(vec![
                    assign("i", sub(var("i"), int(1))),
                    assign("steps", add(var("steps"), int(1))),
                ]),
            ),
        ]);

        let (value, value_type, state) = eval(&program).unwrap();

        assert_eq!((value, value_type), (Value::Bool(false), Type::Boolean));
        assert_eq!(state.lookup("i"), Some(&(Value::Int(0), Type::Integer)));
        assert_eq!(state.lookup("steps"), Some(&(Value::Int(3), Type::Integer)));
    }

    #[test]
    fn while_never_entered() {
        let mut interp = interp();
        let expr = while_loop(boolean(false), print(string("body")));

        let (value, value_type, state) = interp.evaluate(&expr, State::new()).unwrap();

        assert_eq!((value, value_type), (Value::Bool(false), Type::Boolean));
        assert!(state.is_empty());
        assert_eq!(printed(interp), "");
    }

    #[test]
    fn while_reevaluates_condition_effects() {
        let mut interp = interp();
        // The condition prints on every evaluation
        let program = seq(vec![
            assign("n", int(2)),
            while_loop(
                print(gt(var("n"), int(0))),
                assign("n", sub(var("n"), int(1))),
            ),
        ]);

        interp.evaluate(&program, State::new()).unwrap();

        assert_eq!(printed(interp), "True\nTrue\nFalse\n");
    }

    #[test]
    fn while_requires_boolean_condition() {
        assert!(is_type_mismatch(eval(&while_loop(int(1), ren()))));
    }

    #[test]
    fn deep_nesting() {
        let mut expr = int(0);
        for _ in 0..200_000 {
            expr = add(expr, int(1));
        }

        assert_eq!(value_of(&expr), (Value::Int(200_000), Type::Integer));
        drop(expr);
    }

    // Sink refusing every write or every flush, counting the attempts
    #[derive(Default)]
    struct FailingSink {
        fail_on_flush: bool,
        writes: usize,
        written: Vec<u8>,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.writes += 1;
            if self.fail_on_flush {
                self.written.extend_from_slice(buf);
                Ok(buf.len())
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
            }
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if self.fail_on_flush {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn print_aborts_on_write_failure() {
        let mut interp = Interpreter::with_output(FailingSink::default());
        let program = seq(vec![print(int(1)), print(int(2))]);

        let err = interp.evaluate(&program, State::new()).unwrap_err();

        assert!(matches!(err, InterpreterError::Output(ref msg) if msg.contains("sink closed")));
        assert_eq!(err.kind(), crate::interpreter::ErrorKind::Output);
        // The second print never ran
        assert_eq!(interp.into_output().writes, 1);
    }

    #[test]
    fn print_aborts_on_flush_failure() {
        let mut interp = Interpreter::with_output(FailingSink {
            fail_on_flush: true,
            ..Default::default()
        });
        let program = seq(vec![print(string("once")), assign("x", int(1)), print(var("x"))]);

        let err = interp.evaluate(&program, State::new()).unwrap_err();

        assert_eq!(err.kind(), crate::interpreter::ErrorKind::Output);
        // Only the first print reached the sink
        assert_eq!(interp.into_output().written, b"once\n");

        // A fresh sink that accepts everything sees both prints
        let mut interp = Interpreter::with_output(Vec::new());
        interp.evaluate(&program, State::new()).unwrap();
        assert_eq!(printed(interp), "once\n1\n");
    }
}

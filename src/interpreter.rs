use crate::environment::Scope;
use crate::evaluator::{Forced, Interpreter};
use crate::failure::Failure;
use crate::types::{Expression, Value};
use std::rc::Rc;

pub type Result = std::result::Result<Value, Failure>;

/// Evaluate a whole program against an empty root scope with default limits.
pub fn interpret(expr: &Expression) -> Result {
    Interpreter::default().interpret(expr)
}

impl Interpreter {
    pub fn interpret(&mut self, expr: &Expression) -> Result {
        self.interpret_in(expr, &Scope::root())
    }

    /// Evaluate against a host-built root, e.g. one seeded with native methods.
    ///
    /// The result is forced: closures are run as zero-argument blocks until a
    /// value remains. A native method left over is handed back as a value
    /// wrapping the `NativeMethod`.
    pub fn interpret_in(&mut self, expr: &Expression, root: &Rc<Scope>) -> Result {
        self.steps = 0;
        let result = self.force_at(expr, root, 0);
        log::debug!("interpret finished after {} steps", self.steps);
        match result? {
            Forced::Value(value) => Ok(value),
            Forced::Native(method) => Ok(Value::new(method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LambdaBody, NativeMethod};
    use pretty_assertions::assert_eq;

    #[test]
    fn values_come_back_untouched() {
        let value = Value::new(String::from("hello"));
        let result = interpret(&Expression::Value(value.clone())).unwrap();
        assert!(result.ptr_eq(&value));
        assert_eq!(
            result.downcast_ref::<String>().map(String::as_str),
            Some("hello")
        );
    }

    #[test]
    fn failures_become_errors() {
        assert_eq!(
            interpret(&Expression::id("x")).unwrap_err(),
            Failure::MissingIdentifier("x".into())
        );
        assert_eq!(
            interpret(&Expression::Failure(Failure::native("bad"))).unwrap_err(),
            Failure::native("bad")
        );
    }

    #[test]
    fn leftover_natives_are_returned_as_values() {
        let result = interpret(&Expression::native("unused", |_, _| {
            Expression::value(0i64)
        }))
        .unwrap();
        assert_eq!(
            result.downcast_ref::<NativeMethod>().map(NativeMethod::name),
            Some("unused")
        );
    }

    #[test]
    fn hosts_can_seed_the_root() {
        let root = Scope::root_with(vec![("answer", Expression::value(42i64))]);
        let program = Expression::lambda(LambdaBody::bare(Expression::id("answer")));
        let result = Interpreter::new().interpret_in(&program, &root).unwrap();
        assert_eq!(result.downcast_ref::<i64>(), Some(&42));
    }

    #[test]
    fn forcing_nested_closures() {
        let program = Expression::lambda(LambdaBody::bare(Expression::lambda(
            LambdaBody::bare(Expression::value(7i64)),
        )));
        assert_eq!(interpret(&program).unwrap().downcast_ref::<i64>(), Some(&7));
    }
}

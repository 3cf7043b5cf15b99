use crate::environment::{Bindings, Scope};
use crate::evaluator::{ApplyOutcome, Interpreter, Result, WeakHead};
use crate::failure::Failure;
use crate::types::{Expression, LambdaBody};
use std::rc::Rc;

impl Interpreter {
    pub fn close(&mut self, lambda: &LambdaBody, scope: &Rc<Scope>) -> Expression {
        self.steps = 0;
        self.close_at(lambda, scope, 0)
            .map(Expression::Scope)
            .unwrap_or_else(Expression::Failure)
    }

    pub(crate) fn close_at(
        &mut self,
        lambda: &LambdaBody,
        scope: &Rc<Scope>,
        depth: usize,
    ) -> Result<Rc<Scope>> {
        let (items, body) = lambda.parts()?;

        // Names are worked out in the enclosing scope: the new frame does
        // not exist until every binding is known.
        let mut bindings = Bindings::with_capacity(items.len());
        for binding in items {
            let name = self.binding_name(&binding.name, scope, depth + 1)?;
            if let Some(previous) = bindings.insert(name.clone(), binding.value.clone()) {
                log::warn!("'{}' bound twice; dropping earlier value {}", name, previous);
            }
        }
        log::debug!(
            "close over {} binding(s) with body {}",
            bindings.len(),
            body
        );
        Ok(Scope::closure(bindings, body.clone(), scope))
    }

    // Step the name position until it lands on something that names a
    // binding. An identifier met along the way is the name itself and is
    // never looked up.
    fn binding_name(
        &mut self,
        expr: &Expression,
        scope: &Rc<Scope>,
        depth: usize,
    ) -> Result<String> {
        self.check_depth(depth)?;
        let mut ast = expr.clone();
        let mut env = scope.clone();
        loop {
            if let Expression::Identifier(id) = &ast {
                return match id.positional() {
                    Some(_) => Err(Failure::InvalidBindingName(id.0.clone())),
                    None => Ok(id.0.clone()),
                };
            }
            match self.step(&ast, &env, depth)? {
                ApplyOutcome::Finished(head) => {
                    if let WeakHead::Value(value) = &head {
                        if let Some(name) = value.as_name() {
                            return Ok(name.to_owned());
                        }
                    }
                    let culprit = Expression::from(head);
                    return Err(Failure::InvalidBindingName(culprit.to_string()));
                }
                ApplyOutcome::EvaluateFurther(next_ast, next_env)
                | ApplyOutcome::EvaluateBinding {
                    value: next_ast,
                    owner: next_env,
                    ..
                } => {
                    ast = next_ast;
                    env = next_env;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::environment::{Scope, ScopeKind};
    use crate::evaluator::Interpreter;
    use crate::failure::{Failure, LambdaShape};
    use crate::types::{Binding, Expression, Identifier, LambdaBody, LambdaItem};
    use pretty_assertions::assert_eq;

    fn int(expr: &Expression) -> Option<i64> {
        expr.as_value().and_then(|v| v.downcast_ref::<i64>()).copied()
    }

    #[test]
    fn bindings_are_stored_unevaluated() {
        let mut interpreter = Interpreter::new();
        let root = Scope::root();
        let lambda = LambdaBody::builder()
            .bind("later", Expression::id("not-yet-defined"))
            .returning(Expression::value(1i64));
        let closed = interpreter.close(&lambda, &root);
        let closure = closed.as_scope().unwrap();
        assert_eq!(closure.kind(), ScopeKind::Closure);
        assert!(matches!(
            closure.bindings().get("later"),
            Some(Expression::Identifier(id)) if id.0 == "not-yet-defined"
        ));
        assert_eq!(int(closure.body()), Some(1));
    }

    #[test]
    fn string_values_name_bindings() {
        let mut interpreter = Interpreter::new();
        let root = Scope::root();
        let lambda = LambdaBody::builder()
            .bind(Expression::value(String::from("x")), Expression::value(5i64))
            .returning(Expression::id("x"));
        assert_eq!(int(&interpreter.force(&Expression::lambda(lambda), &root)), Some(5));
    }

    #[test]
    fn names_can_be_computed() {
        let mut interpreter = Interpreter::new();
        let root = Scope::root_with(vec![(
            "name-of",
            Expression::native("name-of", |_, _| Expression::id("computed")),
        )]);
        let lambda = LambdaBody::builder()
            .bind(
                Expression::apply(Expression::id("name-of"), vec![]),
                Expression::value(8i64),
            )
            .returning(Expression::id("computed"));
        assert_eq!(int(&interpreter.force(&Expression::lambda(lambda), &root)), Some(8));
    }

    #[test]
    fn non_names_are_rejected() {
        let mut interpreter = Interpreter::new();
        let root = Scope::root();
        let lambda = LambdaBody::builder()
            .bind(Expression::value(3i64), Expression::value(5i64))
            .returning(Expression::value(0i64));
        assert!(matches!(
            interpreter.close(&lambda, &root).as_failure(),
            Some(Failure::InvalidBindingName(_))
        ));

        let positional = LambdaBody::builder()
            .bind("$0", Expression::value(5i64))
            .returning(Expression::value(0i64));
        assert_eq!(
            interpreter.close(&positional, &root).as_failure(),
            Some(&Failure::InvalidBindingName("$0".into()))
        );

        let lambda_name = LambdaBody::builder()
            .bind(
                Expression::lambda(LambdaBody::bare(Expression::value(1i64))),
                Expression::value(5i64),
            )
            .returning(Expression::value(0i64));
        assert!(matches!(
            interpreter.close(&lambda_name, &root).as_failure(),
            Some(Failure::InvalidBindingName(_))
        ));
    }

    #[test]
    fn later_duplicates_overwrite_earlier_ones() {
        let mut interpreter = Interpreter::new();
        let root = Scope::root();
        let lambda = LambdaBody::builder()
            .bind("x", Expression::value(1i64))
            .bind("x", Expression::value(2i64))
            .returning(Expression::id("x"));
        let closed = interpreter.close(&lambda, &root);
        assert_eq!(closed.as_scope().unwrap().bindings().len(), 1);
        assert_eq!(int(&interpreter.force(&closed, &root)), Some(2));
    }

    #[test]
    fn malformed_bodies_fail_to_close() {
        let mut interpreter = Interpreter::new();
        let root = Scope::root();
        let lambda = LambdaBody::new(vec![
            LambdaItem::Binding(Binding {
                name: Expression::from(Identifier::from("x")),
                value: Expression::value(1i64),
            }),
            LambdaItem::Bare(Expression::value(1i64)),
            LambdaItem::Bare(Expression::value(2i64)),
        ]);
        assert_eq!(
            interpreter.close(&lambda, &root).as_failure(),
            Some(&Failure::MalformedLambda(
                LambdaShape::MultipleReturnExpressions(2)
            ))
        );
    }
}

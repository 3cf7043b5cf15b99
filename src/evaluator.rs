use crate::environment::{Scope, ScopeKind};
use crate::failure::Failure;
use crate::types::{terminal, Application, Expression, NativeMethod, Value};
use itertools::Itertools;
use std::rc::Rc;

pub type Result<T = Expression> = std::result::Result<T, Failure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_steps: usize,
    /// Nested resolutions (operators, arguments, binding names) before giving up.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            max_depth: 256,
        }
    }
}

/// The reduction engine. Every scope is passed in explicitly, and each
/// public entry point starts a fresh step budget.
#[derive(Debug, Default)]
pub struct Interpreter {
    limits: Limits,
    pub(crate) steps: usize,
}

// Where resolution stops. Failures travel on the error side.
#[derive(Debug, Clone)]
pub(crate) enum WeakHead {
    Value(Value),
    Native(NativeMethod),
    Closure(Rc<Scope>),
}

impl From<WeakHead> for Expression {
    fn from(head: WeakHead) -> Self {
        match head {
            WeakHead::Value(value) => Expression::Value(value),
            WeakHead::Native(method) => Expression::Native(method),
            WeakHead::Closure(closure) => Expression::Scope(closure),
        }
    }
}

// Where forcing stops: closures have all been run as blocks.
#[derive(Debug, Clone)]
pub(crate) enum Forced {
    Value(Value),
    Native(NativeMethod),
}

impl From<Forced> for Expression {
    fn from(forced: Forced) -> Self {
        match forced {
            Forced::Value(value) => Expression::Value(value),
            Forced::Native(method) => Expression::Native(method),
        }
    }
}

// One step of reduction either finishes or names the next expression to
// reduce, and where. Looping over the latter keeps tail calls and identifier
// chains off the native stack. `EvaluateBinding` also asks the loop to record
// the final value under `name` in `owner`.
pub(crate) enum ApplyOutcome {
    Finished(WeakHead),
    EvaluateFurther(Expression, Rc<Scope>),
    EvaluateBinding {
        name: String,
        value: Expression,
        owner: Rc<Scope>,
    },
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self { limits, steps: 0 }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn steps_taken(&self) -> usize {
        self.steps
    }

    /// Reduce `expr` in `scope` to weak head form: a value, a native method,
    /// a closure, or a failure. Closures are not forced.
    pub fn resolve(&mut self, expr: &Expression, scope: &Rc<Scope>) -> Expression {
        self.steps = 0;
        self.resolve_at(expr, scope, 0)
            .map(Expression::from)
            .unwrap_or_else(Expression::Failure)
    }

    /// Like `resolve`, but closures are run as zero-argument blocks until a
    /// value or native method remains.
    pub fn force(&mut self, expr: &Expression, scope: &Rc<Scope>) -> Expression {
        self.steps = 0;
        self.force_at(expr, scope, 0)
            .map(Expression::from)
            .unwrap_or_else(Expression::Failure)
    }

    /// Dispatch `operator` on already resolved `arguments`.
    ///
    /// Applying a closure does not force it: the result is the new call
    /// frame as a `Scope` value. A native method's result is returned as the
    /// method produced it. A plain value ignores its arguments.
    pub fn apply(
        &mut self,
        operator: &Expression,
        arguments: &[Expression],
        scope: &Rc<Scope>,
    ) -> Expression {
        self.steps = 0;
        let applied = self.resolve_at(operator, scope, 0).and_then(|operator| {
            if let Some(failure) = first_failure(arguments) {
                return Err(failure);
            }
            Ok(match operator {
                WeakHead::Value(value) => Expression::Value(value),
                WeakHead::Native(method) => call_native(&method, arguments, scope),
                WeakHead::Closure(closure) => {
                    Expression::Scope(make_call_frame(&closure, arguments, scope))
                }
            })
        });
        applied.unwrap_or_else(Expression::Failure)
    }

    pub(crate) fn force_at(
        &mut self,
        expr: &Expression,
        scope: &Rc<Scope>,
        depth: usize,
    ) -> Result<Forced> {
        let mut ast = expr.clone();
        let mut env = scope.clone();
        loop {
            match self.resolve_at(&ast, &env, depth)? {
                WeakHead::Value(value) => return Ok(Forced::Value(value)),
                WeakHead::Native(method) => return Ok(Forced::Native(method)),
                WeakHead::Closure(closure) => {
                    log::trace!("force closure {}", closure);
                    ast = closure.body().clone();
                    env = closure;
                }
            }
        }
    }

    pub(crate) fn resolve_at(
        &mut self,
        expr: &Expression,
        scope: &Rc<Scope>,
        depth: usize,
    ) -> Result<WeakHead> {
        self.check_depth(depth)?;
        let mut ast = expr.clone();
        let mut env = scope.clone();
        // Every binding met on the way is in tail position, so all of them
        // resolve to whatever this loop finishes with.
        let mut pending: Vec<(Rc<Scope>, String)> = Vec::new();
        loop {
            match self.step(&ast, &env, depth)? {
                ApplyOutcome::Finished(head) => {
                    // A cached closure could hold its own owner alive.
                    if !matches!(head, WeakHead::Closure(_)) {
                        for (owner, name) in pending {
                            owner.memoize(name, head.clone().into());
                        }
                    }
                    return Ok(head);
                }
                ApplyOutcome::EvaluateFurther(next_ast, next_env) => {
                    ast = next_ast;
                    env = next_env;
                }
                ApplyOutcome::EvaluateBinding { name, value, owner } => {
                    pending.push((owner.clone(), name));
                    ast = value;
                    env = owner;
                }
            }
        }
    }

    pub(crate) fn step(
        &mut self,
        expr: &Expression,
        scope: &Rc<Scope>,
        depth: usize,
    ) -> Result<ApplyOutcome> {
        use ApplyOutcome::{EvaluateBinding, EvaluateFurther, Finished};
        self.tick()?;
        log::trace!("resolve {}", expr);
        match expr {
            Expression::Value(value) => Ok(Finished(WeakHead::Value(value.clone()))),
            Expression::Native(method) => Ok(Finished(WeakHead::Native(method.clone()))),
            Expression::Failure(failure) => Err(failure.clone()),
            Expression::Identifier(id) => {
                let (found, owner) = scope.find(id)?;
                Ok(match owner.memoized(id) {
                    Some(value) => EvaluateFurther(value, owner),
                    None => EvaluateBinding {
                        name: id.0.clone(),
                        value: found,
                        owner,
                    },
                })
            }
            Expression::Lambda(body) => self
                .close_at(body, scope, depth)
                .map(|closure| Finished(WeakHead::Closure(closure))),
            Expression::Scope(frame) => Ok(match frame.kind() {
                ScopeKind::Closure => Finished(WeakHead::Closure(frame.clone())),
                ScopeKind::Thunk => {
                    let env = frame.parent().unwrap_or(frame).clone();
                    EvaluateFurther(frame.body().clone(), env)
                }
                ScopeKind::Call | ScopeKind::Root => {
                    EvaluateFurther(frame.body().clone(), frame.clone())
                }
            }),
            Expression::Application(app) => self.step_application(app, scope, depth),
        }
    }

    fn step_application(
        &mut self,
        app: &Application,
        scope: &Rc<Scope>,
        depth: usize,
    ) -> Result<ApplyOutcome> {
        use ApplyOutcome::{EvaluateFurther, Finished};
        match self.resolve_at(app.operator(), scope, depth + 1)? {
            WeakHead::Value(value) => {
                log::trace!("{} used as an operator, arguments ignored", value);
                Ok(Finished(WeakHead::Value(value)))
            }
            WeakHead::Native(method) => {
                let arguments = self.resolve_arguments(app, scope, depth)?;
                Ok(EvaluateFurther(
                    call_native(&method, &arguments, scope),
                    scope.clone(),
                ))
            }
            WeakHead::Closure(closure) => {
                let arguments = self.resolve_arguments(app, scope, depth)?;
                let frame = make_call_frame(&closure, &arguments, scope);
                Ok(EvaluateFurther(frame.body().clone(), frame))
            }
        }
    }

    // The first failing argument stands in for the whole application.
    fn resolve_arguments(
        &mut self,
        app: &Application,
        scope: &Rc<Scope>,
        depth: usize,
    ) -> Result<Vec<Expression>> {
        app.arguments()
            .iter()
            .map(|arg| self.resolve_at(arg, scope, depth + 1).map(Expression::from))
            .collect()
    }

    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        match self.steps > self.limits.max_steps {
            true => Err(Failure::StepBudgetExhausted(self.limits.max_steps)),
            false => Ok(()),
        }
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<()> {
        match depth > self.limits.max_depth {
            true => Err(Failure::RecursionLimit(self.limits.max_depth)),
            false => Ok(()),
        }
    }
}

fn make_call_frame(closure: &Scope, arguments: &[Expression], calling: &Rc<Scope>) -> Rc<Scope> {
    let frame = Scope::call(closure, arguments, calling);
    log::debug!(
        "call {} with {}",
        closure.body(),
        pretty_print_args(arguments)
    );
    frame
}

fn call_native(method: &NativeMethod, arguments: &[Expression], scope: &Rc<Scope>) -> Expression {
    log::trace!("Call {} with {}", method.name(), pretty_print_args(arguments));
    let result = method.call(arguments, scope);
    match terminal(&result) {
        true => log::trace!("Call to {} resulted in {}", method.name(), result),
        false => log::trace!("Call to {} needs further resolution: {}", method.name(), result),
    }
    result
}

fn first_failure(arguments: &[Expression]) -> Option<Failure> {
    arguments.iter().find_map(|arg| arg.as_failure().cloned())
}

pub(crate) fn pretty_print_args(args: &[Expression]) -> String {
    match args.len() {
        0 => "no args".into(),
        1 => args[0].to_string(),
        _ => format!("\n\t{}", args.iter().join("\n\t")),
    }
}

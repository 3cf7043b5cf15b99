use crate::environment::Scope;
use crate::failure::{Failure, LambdaShape};
use derive_more::{Deref, From};
use regex::Regex;
use std::any::Any;
use std::rc::Rc;

#[derive(Clone)]
pub struct Value {
    payload: Rc<dyn Any>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any>(payload: T) -> Self {
        Self {
            payload: Rc::new(payload),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn as_name(&self) -> Option<&str> {
        self.downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| self.downcast_ref::<&'static str>().copied())
    }

    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::as_ptr(&self.payload) as *const () == Rc::as_ptr(&other.payload) as *const ()
    }
}

pub type NativeFn = dyn Fn(&[Expression], &Rc<Scope>) -> Expression;

/// A host-supplied capability, callable as an operator.
///
/// Receives its arguments already resolved to weak head form together with
/// the calling scope. Whatever it returns is resolved further in that scope.
#[derive(Clone)]
pub struct NativeMethod {
    name: Rc<str>,
    fn_ptr: Rc<NativeFn>,
}

impl NativeMethod {
    pub fn new<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Expression], &Rc<Scope>) -> Expression + 'static,
    {
        Self {
            name: name.into(),
            fn_ptr: Rc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Expression], scope: &Rc<Scope>) -> Expression {
        (self.fn_ptr)(args, scope)
    }
}

lazy_static! {
    static ref POSITIONAL_RE: Regex = Regex::new(r"^\$(\d+)$").unwrap();
}

#[derive(Deref, From, Debug, PartialEq, Eq, Hash, Clone)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn positional(&self) -> Option<usize> {
        POSITIONAL_RE
            .captures(&self.0)
            // Too many digits to index anything: out of range, never a plain name.
            .map(|caps| caps[1].parse().unwrap_or(usize::MAX))
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier(name.into())
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct Application {
    operator: Expression,
    arguments: Vec<Expression>,
}

impl Application {
    pub fn new(operator: Expression, arguments: Vec<Expression>) -> Self {
        Self {
            operator,
            arguments,
        }
    }

    pub fn from_elements(mut elements: Vec<Expression>) -> Option<Self> {
        if elements.is_empty() {
            return None;
        }
        let operator = elements.remove(0);
        Some(Self::new(operator, elements))
    }

    pub fn operator(&self) -> &Expression {
        &self.operator
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub name: Expression,
    pub value: Expression,
}

#[derive(Debug, Clone)]
pub enum LambdaItem {
    Binding(Binding),
    Bare(Expression),
}

/// Bindings, then one return expression. The shape is only checked when the
/// body is closed over a scope.
#[derive(Debug, Clone)]
pub struct LambdaBody {
    items: Vec<LambdaItem>,
}

impl LambdaBody {
    pub fn new(items: Vec<LambdaItem>) -> Self {
        Self { items }
    }

    pub fn bare(body: Expression) -> Self {
        Self::new(vec![LambdaItem::Bare(body)])
    }

    pub fn builder() -> LambdaBuilder {
        LambdaBuilder { items: Vec::new() }
    }

    pub fn items(&self) -> &[LambdaItem] {
        &self.items
    }

    /// The bindings in order and the single trailing return expression.
    pub fn parts(&self) -> Result<(Vec<&Binding>, &Expression), Failure> {
        let malformed = |shape| Err(Failure::MalformedLambda(shape));
        let bare_count = self
            .items
            .iter()
            .filter(|item| matches!(item, LambdaItem::Bare(_)))
            .count();
        if bare_count > 1 {
            return malformed(LambdaShape::MultipleReturnExpressions(bare_count));
        }

        let mut bindings = Vec::with_capacity(self.items.len());
        let mut body = None;
        for item in &self.items {
            match item {
                LambdaItem::Binding(_) if body.is_some() => {
                    return malformed(LambdaShape::BindingAfterReturn)
                }
                LambdaItem::Binding(binding) => bindings.push(binding),
                LambdaItem::Bare(expr) => body = Some(expr),
            }
        }
        match body {
            Some(body) => Ok((bindings, body)),
            None => malformed(LambdaShape::NoReturnExpression),
        }
    }
}

pub struct LambdaBuilder {
    items: Vec<LambdaItem>,
}

impl LambdaBuilder {
    pub fn bind<N: Into<Expression>>(mut self, name: N, value: Expression) -> Self {
        self.items.push(LambdaItem::Binding(Binding {
            name: name.into(),
            value,
        }));
        self
    }

    pub fn returning(mut self, body: Expression) -> LambdaBody {
        self.items.push(LambdaItem::Bare(body));
        LambdaBody::new(self.items)
    }
}

#[derive(Debug, Clone)]
pub enum Expression {
    Value(Value),
    Native(NativeMethod),
    Application(Rc<Application>),
    Lambda(Rc<LambdaBody>),
    Identifier(Identifier),
    Failure(Failure),
    Scope(Rc<Scope>),
}

impl Expression {
    pub fn value<T: Any>(payload: T) -> Self {
        Expression::Value(Value::new(payload))
    }

    pub fn id(name: &str) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn apply(operator: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Application(Rc::new(Application::new(operator, arguments)))
    }

    pub fn native<F>(name: &str, f: F) -> Self
    where
        F: Fn(&[Expression], &Rc<Scope>) -> Expression + 'static,
    {
        Expression::Native(NativeMethod::new(name, f))
    }

    pub fn lambda(body: LambdaBody) -> Self {
        Expression::Lambda(Rc::new(body))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Expression::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Expression::Failure(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_scope(&self) -> Option<&Rc<Scope>> {
        match self {
            Expression::Scope(s) => Some(s),
            _ => None,
        }
    }
}

// Values that never reduce any further.
pub(crate) fn terminal(expr: &Expression) -> bool {
    match expr {
        Expression::Value(_) | Expression::Native(_) | Expression::Failure(_) => true,
        Expression::Application(_) => false,
        Expression::Lambda(_) => false,
        Expression::Identifier(_) => false,
        Expression::Scope(_) => false,
    }
}

impl From<Failure> for Expression {
    fn from(f: Failure) -> Self {
        Expression::Failure(f)
    }
}

impl From<Identifier> for Expression {
    fn from(id: Identifier) -> Self {
        Expression::Identifier(id)
    }
}

impl From<&str> for Expression {
    fn from(name: &str) -> Self {
        Expression::id(name)
    }
}

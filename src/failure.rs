use derive_more::Display;

/// Why a lambda body could not be closed.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LambdaShape {
    #[display(fmt = "no return expression")]
    NoReturnExpression,
    #[display(fmt = "{} bare expressions where exactly one is allowed", _0)]
    MultipleReturnExpressions(usize),
    #[display(fmt = "binding after the return expression")]
    BindingAfterReturn,
}

/// Errors produced while reducing an expression.
///
/// These travel through the same channel as ordinary results: an
/// `Expression::Failure` is a value like any other, and `interpret` hands the
/// first one reached back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Failure {
    #[display(fmt = "'{}' not found", _0)]
    MissingIdentifier(String),
    #[display(fmt = "cannot bind to {}: not an identifier or string", _0)]
    InvalidBindingName(String),
    #[display(fmt = "root scope has no default value")]
    RootScopeMisuse,
    #[display(fmt = "${} out of range: {} arguments supplied", index, supplied)]
    PositionalOutOfRange { index: usize, supplied: usize },
    #[display(fmt = "malformed lambda body: {}", _0)]
    MalformedLambda(LambdaShape),
    #[display(fmt = "gave up after {} evaluation steps", _0)]
    StepBudgetExhausted(usize),
    #[display(fmt = "expressions nested more than {} levels deep", _0)]
    RecursionLimit(usize),
    #[display(fmt = "{}", _0)]
    Native(String),
}

impl Failure {
    /// A failure raised by host code, e.g. a native method rejecting its arguments.
    pub fn native<S: Into<String>>(message: S) -> Self {
        Failure::Native(message.into())
    }
}

impl std::error::Error for Failure {}

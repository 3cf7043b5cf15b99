//! A lazy, closure-based reduction engine for a small homoiconic expression
//! language.
//!
//! Programs arrive as already-built [`Expression`] trees. [`interpret`] forces
//! one to a host [`Value`] or a [`Failure`]; [`Interpreter`] exposes the
//! individual reduction operations for hosts that need finer control.

#[macro_use]
extern crate lazy_static;

pub mod cmdline;
pub mod environment;
pub mod evaluator;
pub mod failure;
pub mod interpreter;
mod lambda;
mod printer;
pub mod types;

pub use environment::{Scope, ScopeKind};
pub use evaluator::{Interpreter, Limits};
pub use failure::{Failure, LambdaShape};
pub use interpreter::interpret;
pub use types::{
    Application, Binding, Expression, Identifier, LambdaBody, LambdaItem, NativeMethod, Value,
};

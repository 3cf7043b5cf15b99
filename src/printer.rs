use crate::environment::{Scope, ScopeKind};
use crate::types::{Application, Expression, Identifier, LambdaBody, LambdaItem, NativeMethod, Value};
use itertools::Itertools;
use std::fmt;

// Print the payload with the first of the listed types it turns out to be.
macro_rules! print_as_first_of {
    ($value:expr, $f:expr; $($t:ty),*) => {
        $(
            if let Some(v) = $value.downcast_ref::<$t>() {
                return write!($f, "{}", v);
            }
        )*
    };
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.as_name() {
            return write!(f, "{:?}", name);
        }
        print_as_first_of!(self, f; i64, i32, u64, u32, usize, isize, f64, f32, bool, char);
        if let Some(method) = self.downcast_ref::<NativeMethod>() {
            return write!(f, "{}", method);
        }
        write!(f, "#<{}>", self.type_name())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({})", self)
    }
}

impl fmt::Display for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<native {}>", self.name())
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native method #<{}>", self.name())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arguments().is_empty() {
            return write!(f, "({})", self.operator());
        }
        write!(
            f,
            "({} {})",
            self.operator(),
            self.arguments().iter().join(" ")
        )
    }
}

impl fmt::Display for LambdaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LambdaItem::Binding(binding) => write!(f, "{}: {}", binding.name, binding.value),
            LambdaItem::Bare(expr) => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for LambdaBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.items().iter().join(", "))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ScopeKind::Root => write!(f, "#<root>"),
            ScopeKind::Closure => {
                let names = self.bindings().keys().sorted().join(" ");
                match names.is_empty() {
                    true => write!(f, "#<closure {}>", self.body()),
                    false => write!(f, "#<closure [{}] {}>", names, self.body()),
                }
            }
            ScopeKind::Call => write!(
                f,
                "#<call {} with {} argument(s)>",
                self.body(),
                self.arguments().map_or(0, <[_]>::len)
            ),
            ScopeKind::Thunk => write!(f, "#<thunk {}>", self.body()),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Value(value) => write!(f, "{}", value),
            Expression::Native(method) => write!(f, "{}", method),
            Expression::Application(app) => write!(f, "{}", app),
            Expression::Lambda(body) => write!(f, "{}", body),
            Expression::Identifier(id) => write!(f, "{}", id),
            Expression::Failure(failure) => write!(f, "#<failure: {}>", failure),
            Expression::Scope(scope) => write!(f, "{}", scope),
        }
    }
}

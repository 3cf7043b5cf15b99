use crate::failure::Failure;
use crate::types::{Expression, Identifier};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Unevaluated binding values, keyed by name.
pub type Bindings = HashMap<String, Expression>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Closure,
    Call,
    /// A deferred argument paired with the scope it was supplied in.
    Thunk,
}

/// An environment frame.
///
/// The binding table is filled before the frame exists and a frame can only
/// point at a parent that is already built, so parent chains are acyclic.
/// The only thing that changes afterwards is `values`, a write-once record
/// of what this frame's identifiers resolved to.
pub struct Scope {
    kind: ScopeKind,
    bindings: Rc<Bindings>,
    arguments: Option<Vec<Expression>>,
    body: Expression,
    parent: Option<Rc<Scope>>,
    values: RefCell<HashMap<String, Expression>>,
}

impl fmt::Debug for Scope {
    // Not derived: printing every ancestor gets unreadable quickly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scope{{kind: {:?}, bindings: {:?}, arguments: {:?}, body: {:?}}}",
            self.kind, self.bindings, self.arguments, self.body
        )
    }
}

impl Scope {
    pub fn root() -> Rc<Self> {
        Self::root_with(Vec::<(String, Expression)>::new())
    }

    /// A root frame pre-populated by the host, typically with native methods.
    pub fn root_with<I, K>(bindings: I) -> Rc<Self>
    where
        I: IntoIterator<Item = (K, Expression)>,
        K: Into<String>,
    {
        let bindings = bindings
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Rc::new(Self {
            kind: ScopeKind::Root,
            bindings: Rc::new(bindings),
            arguments: None,
            body: Failure::RootScopeMisuse.into(),
            parent: None,
            values: RefCell::default(),
        })
    }

    pub(crate) fn closure(bindings: Bindings, body: Expression, parent: &Rc<Scope>) -> Rc<Self> {
        Rc::new(Self {
            kind: ScopeKind::Closure,
            bindings: Rc::new(bindings),
            arguments: None,
            body,
            parent: Some(parent.clone()),
            values: RefCell::default(),
        })
    }

    /// Apply `closure` to `arguments` supplied from `calling`.
    ///
    /// The new frame hangs off the closure's own parent, never the calling
    /// scope. It shares the closure's binding table and pending body, and
    /// holds each argument as a thunk over the calling scope.
    pub fn call(closure: &Scope, arguments: &[Expression], calling: &Rc<Scope>) -> Rc<Self> {
        let arguments = arguments
            .iter()
            .map(|arg| Expression::Scope(Scope::thunk(arg.clone(), calling)))
            .collect();
        Rc::new(Self {
            kind: ScopeKind::Call,
            bindings: closure.bindings.clone(),
            arguments: Some(arguments),
            body: closure.body.clone(),
            parent: closure.parent.clone(),
            values: RefCell::default(),
        })
    }

    pub fn thunk(deferred: Expression, calling: &Rc<Scope>) -> Rc<Self> {
        Rc::new(Self {
            kind: ScopeKind::Thunk,
            bindings: Rc::new(Bindings::new()),
            arguments: None,
            body: deferred,
            parent: Some(calling.clone()),
            values: RefCell::default(),
        })
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn arguments(&self) -> Option<&[Expression]> {
        self.arguments.as_deref()
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn parent(&self) -> Option<&Rc<Scope>> {
        self.parent.as_ref()
    }

    /// Look `id` up along the parent chain.
    ///
    /// Returns the stored expression, still unevaluated, together with the
    /// frame that owns it: that frame is where the expression must be
    /// resolved. `$N` is answered by the nearest call frame (0-based).
    pub fn find(self: &Rc<Self>, id: &Identifier) -> Result<(Expression, Rc<Scope>), Failure> {
        let mut frame = self;
        match id.positional() {
            Some(index) => loop {
                if let Some(arguments) = &frame.arguments {
                    return match arguments.get(index) {
                        Some(arg) => Ok((arg.clone(), frame.clone())),
                        None => Err(Failure::PositionalOutOfRange {
                            index,
                            supplied: arguments.len(),
                        }),
                    };
                }
                frame = match &frame.parent {
                    Some(parent) => parent,
                    None => {
                        return Err(Failure::PositionalOutOfRange { index, supplied: 0 });
                    }
                };
            },
            None => loop {
                if let Some(value) = frame.bindings.get(id.as_str()) {
                    return Ok((value.clone(), frame.clone()));
                }
                frame = match &frame.parent {
                    Some(parent) => parent,
                    None => return Err(Failure::MissingIdentifier(id.0.clone())),
                };
            },
        }
    }

    pub fn lookup(self: &Rc<Self>, id: &Identifier) -> Expression {
        match self.find(id) {
            Ok((value, _owner)) => value,
            Err(failure) => Expression::Failure(failure),
        }
    }

    /// What `id` resolved to the last time it was resolved in this frame.
    pub fn memoized(&self, id: &Identifier) -> Option<Expression> {
        self.values.borrow().get(id.as_str()).cloned()
    }

    // Write-once. Only weak head values that cannot point back at a frame
    // are stored here.
    pub(crate) fn memoize(&self, name: String, value: Expression) {
        self.values.borrow_mut().entry(name).or_insert(value);
    }

    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = self;
        while let Some(parent) = &frame.parent {
            depth += 1;
            frame = parent;
        }
        depth
    }
}

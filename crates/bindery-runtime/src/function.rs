//! Callables and invocation records
//!
//! A [`Function`] is either a native callable (a Rust closure) or a bound
//! callable produced by [`crate::binder::bind`]. Every function carries its own
//! property table; the object stored under `prototype` is the member table that
//! instances it constructs delegate to.

use crate::api::runtime::Runtime;
use crate::binder::{BoundFunction, BOUND_NAME_PREFIX};
use crate::object::Object;
use crate::value::{RuntimeError, Value};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Native function body
///
/// Receives the runtime (for nested calls) and the invocation record. The call
/// kind is explicit in the record; a body never has to guess whether it is
/// running as a constructor.
pub type NativeBody =
    Arc<dyn Fn(&Runtime, &Invocation) -> Result<Value, RuntimeError> + Send + Sync>;

/// Property name of a callable's member table
pub const PROTOTYPE_KEY: &str = "prototype";

/// How a callable is being invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Call,
    Construct,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Call => write!(f, "call"),
            CallKind::Construct => write!(f, "construct"),
        }
    }
}

/// Per-call record handed to a function body
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Plain call with an explicit receiver
    Plain { this: Value, args: Vec<Value> },
    /// Constructor call against a freshly allocated instance
    Construct { instance: Object, args: Vec<Value> },
}

impl Invocation {
    pub fn plain(this: Value, args: Vec<Value>) -> Self {
        Invocation::Plain { this, args }
    }

    pub fn construct(instance: Object, args: Vec<Value>) -> Self {
        Invocation::Construct { instance, args }
    }

    pub fn kind(&self) -> CallKind {
        match self {
            Invocation::Plain { .. } => CallKind::Call,
            Invocation::Construct { .. } => CallKind::Construct,
        }
    }

    pub fn is_construct(&self) -> bool {
        matches!(self, Invocation::Construct { .. })
    }

    /// The receiver the body observes
    pub fn this(&self) -> Value {
        match self {
            Invocation::Plain { this, .. } => this.clone(),
            Invocation::Construct { instance, .. } => Value::Object(instance.clone()),
        }
    }

    /// Constructed instance, if this is a constructor call
    pub fn instance(&self) -> Option<&Object> {
        match self {
            Invocation::Plain { .. } => None,
            Invocation::Construct { instance, .. } => Some(instance),
        }
    }

    pub fn args(&self) -> &[Value] {
        match self {
            Invocation::Plain { args, .. } | Invocation::Construct { args, .. } => args,
        }
    }

    /// Argument at `index`, `Undefined` when missing
    pub fn arg(&self, index: usize) -> Value {
        self.args().get(index).cloned().unwrap_or_default()
    }

    /// Property lookup on the receiver
    pub fn this_get(&self, key: &str) -> Value {
        self.this().get(key)
    }

    /// Property write on the receiver; ignored when the receiver has no properties
    pub fn this_set(&self, key: &str, value: impl Into<Value>) {
        match self.this() {
            Value::Object(obj) => obj.set(key, value),
            Value::Function(func) => func.properties().set(key, value),
            _ => {}
        }
    }
}

/// Native callable state
pub(crate) struct NativeFunction {
    pub(crate) body: NativeBody,
    /// Declared parameter count; `None` for variadic natives
    pub(crate) arity: Option<usize>,
    pub(crate) constructor: bool,
}

pub(crate) enum FunctionKind {
    Native(NativeFunction),
    Bound(BoundFunction),
}

struct FunctionInner {
    /// Set at creation for natives; derived on first use for bound callables
    name: OnceLock<String>,
    length: usize,
    properties: Object,
    kind: FunctionKind,
}

/// Invocable value. Cloning aliases the same function.
#[derive(Clone)]
pub struct Function(Arc<FunctionInner>);

impl Function {
    /// Native callable; constructors get a fresh, empty member table
    pub(crate) fn native(
        name: String,
        arity: Option<usize>,
        constructor: bool,
        body: NativeBody,
    ) -> Self {
        let properties = Object::new();
        if constructor {
            properties.set(PROTOTYPE_KEY, Object::new());
        }
        Function(Arc::new(FunctionInner {
            name: OnceLock::from(name),
            length: arity.unwrap_or(0),
            properties,
            kind: FunctionKind::Native(NativeFunction {
                body,
                arity,
                constructor,
            }),
        }))
    }

    pub(crate) fn from_bound(length: usize, properties: Object, bound: BoundFunction) -> Self {
        Function(Arc::new(FunctionInner {
            name: OnceLock::new(),
            length,
            properties,
            kind: FunctionKind::Bound(bound),
        }))
    }

    pub(crate) fn kind(&self) -> &FunctionKind {
        &self.0.kind
    }

    /// Placeholder left behind when a bound chain is unlinked on drop
    pub(crate) fn detached() -> Function {
        static DETACHED: OnceLock<Function> = OnceLock::new();
        DETACHED
            .get_or_init(|| {
                let body: NativeBody = Arc::new(|_, _| Ok(Value::Undefined));
                Function::native("detached".to_string(), None, false, body)
            })
            .clone()
    }

    /// Take the bound state out of this handle if it is the last one
    pub(crate) fn try_unwrap_bound(self) -> Option<BoundFunction> {
        let inner = Arc::try_unwrap(self.0).ok()?;
        match inner.kind {
            FunctionKind::Bound(bound) => Some(bound),
            FunctionKind::Native(_) => None,
        }
    }

    /// Bound callables are named `"bound " + target name`
    pub fn name(&self) -> &str {
        self.0.name.get_or_init(|| {
            // walk down to the nearest layer whose name is known
            let mut layers = 0;
            let mut func = self;
            while let Some(bound) = func.as_bound() {
                layers += 1;
                func = bound.target();
                if let Some(name) = func.0.name.get() {
                    return format!("{}{}", BOUND_NAME_PREFIX.repeat(layers), name);
                }
            }
            String::new()
        })
    }

    /// Declared parameter count
    pub fn length(&self) -> usize {
        self.0.length
    }

    /// The function's own property table
    pub fn properties(&self) -> &Object {
        &self.0.properties
    }

    /// Current member table (`prototype` property), if it holds an object
    pub fn prototype(&self) -> Option<Object> {
        match self.0.properties.get_own(PROTOTYPE_KEY) {
            Some(Value::Object(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Replace the member table. Affects only instances constructed afterwards.
    pub fn set_prototype(&self, proto: Object) {
        self.0.properties.set(PROTOTYPE_KEY, proto);
    }

    /// Bound callables construct exactly when their innermost target does
    pub fn is_constructor(&self) -> bool {
        let mut func = self;
        loop {
            match &func.0.kind {
                FunctionKind::Native(native) => return native.constructor,
                FunctionKind::Bound(bound) => func = bound.target(),
            }
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.0.kind, FunctionKind::Bound(_))
    }

    pub fn as_bound(&self) -> Option<&BoundFunction> {
        match &self.0.kind {
            FunctionKind::Bound(bound) => Some(bound),
            FunctionKind::Native(_) => None,
        }
    }

    /// Bind this function. Infallible counterpart of [`crate::binder::bind`].
    pub fn bind(&self, this: Value, leading_args: Vec<Value>) -> Function {
        crate::binder::bind_function(self, this, leading_args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("length", &self.0.length)
            .field("bound", &self.is_bound())
            .finish()
    }
}

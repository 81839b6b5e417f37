//! Runtime value representation
//!
//! - Undefined, Null, Bools, Numbers: Immediate values
//! - Strings: Heap-allocated, reference-counted (Arc<str>), immutable
//! - Objects: Shared property tables with a delegation chain (reference semantics)
//! - Functions: Native callables and bound callables (reference semantics)

use crate::function::Function;
use crate::object::Object;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Explicit reference semantics wrapper.
///
/// All clones point to the same underlying value; mutation through any clone is
/// visible to all other clones. Objects and bound-callable state are built on it.
#[derive(Debug)]
pub struct Shared<T>(Arc<Mutex<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Arc::new(Mutex::new(value)))
    }

    /// Acquire the lock and apply a read function.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.0.lock().expect("Shared<T> lock poisoned");
        f(&*guard)
    }

    /// Acquire the lock and apply a mutation function.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.0.lock().expect("Shared<T> lock poisoned");
        f(&mut *guard)
    }

    /// Take the value out if this is the last handle to it.
    pub fn try_unwrap(self) -> Option<T> {
        let mutex = Arc::try_unwrap(self.0).ok()?;
        Some(mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    /// Identity comparison: same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

/// Runtime value type
#[derive(Clone, Default)]
pub enum Value {
    /// Absence of a value (missing property, missing argument, no receiver)
    #[default]
    Undefined,
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (IEEE 754 double-precision)
    Number(f64),
    /// String value (reference-counted, immutable)
    String(Arc<str>),
    /// Object with its own property table and delegation target
    Object(Object),
    /// Invocable value
    Function(Function),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Arc::from(s.as_ref()))
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Objects and functions; the values a constructor body may return in place of its instance.
    pub fn is_object_like(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Function(_))
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Property lookup through the delegation chain.
    ///
    /// Primitives have no properties and resolve everything to `Undefined`.
    pub fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(obj) => obj.get(key),
            Value::Function(func) => func.properties().get(key),
            _ => Value::Undefined,
        }
    }
}

impl PartialEq for Value {
    /// Primitives compare by content; objects and functions by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Function(func)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                // no trailing .0 for whole numbers
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Object(obj) => write!(f, "{}", obj),
            Value::Function(func) => write!(f, "<fn {}>", func.name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Object(obj) => write!(f, "Object({})", obj),
            Value::Function(func) => write!(f, "Function({:?})", func.name()),
        }
    }
}

/// Runtime error type
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    /// `bind` applied to something that cannot be invoked
    #[error("InvalidOperand: cannot bind a {type_name} value, what is being bound is not callable")]
    InvalidOperand { type_name: String },
    /// Type error (calling a non-function, constructing a non-constructor)
    #[error("Type error: {msg}")]
    TypeError { msg: String },
    /// Native callable invoked with the wrong number of arguments
    #[error("Function '{name}' expects {expected} argument{}, got {got}", plural(.expected))]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// Host invocation guard tripped
    #[error("Maximum call depth of {limit} exceeded")]
    CallDepthExceeded { limit: usize },
    /// Error raised by a callable body, carrying a value
    #[error("Uncaught {value}")]
    Thrown { value: Value },
}

fn plural(n: &usize) -> &'static str {
    if *n == 1 {
        ""
    } else {
        "s"
    }
}

impl RuntimeError {
    /// Raise a value from inside a callable body
    pub fn thrown(value: impl Into<Value>) -> Self {
        RuntimeError::Thrown {
            value: value.into(),
        }
    }
}

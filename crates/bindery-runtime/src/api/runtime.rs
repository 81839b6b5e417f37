//! Invocation runtime
//!
//! Provides the `Runtime` struct that invokes callables either plainly or as
//! constructors. The call kind is decided here, by the entry point used, and
//! travels to the body inside the [`Invocation`] record.
//!
//! # Examples
//!
//! ```
//! use bindery_runtime::api::native::NativeFunctionBuilder;
//! use bindery_runtime::api::Runtime;
//! use bindery_runtime::object::Object;
//! use bindery_runtime::value::Value;
//!
//! let runtime = Runtime::new();
//! let describe = NativeFunctionBuilder::new("describe")
//!     .with_arity(2)
//!     .with_implementation(|_, inv| {
//!         Ok(Value::Object(Object::from_entries([
//!             ("value", inv.this_get("value")),
//!             ("name", inv.arg(0)),
//!             ("age", inv.arg(1)),
//!         ])))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let receiver = Value::Object(Object::from_entries([("value", 1.0)]));
//! let bound = runtime
//!     .bind(&describe.into(), receiver, vec!["Libai".into()])
//!     .unwrap();
//! let result = runtime.call(&bound, Value::Undefined, vec![20.0.into()]).unwrap();
//! assert_eq!(result.to_string(), "{value: 1, name: Libai, age: 20}");
//! ```

use crate::binder;
use crate::function::{Function, FunctionKind, Invocation};
use crate::object::Object;
use crate::value::{RuntimeError, Value};
use bindery_config::{Config, ConfigLoader, ConfigResult, DEFAULT_MAX_CALL_DEPTH};
use std::cell::Cell;
use std::path::Path;
use tracing::{trace, warn};

/// Runtime settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Maximum nested invocations; each bound hop counts as one
    pub max_call_depth: usize,
    /// Reject native calls whose final argument count differs from the declared arity
    pub enforce_arity: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            enforce_arity: false,
        }
    }
}

impl RuntimeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_call_depth: config.max_call_depth(),
            enforce_arity: config.enforce_arity(),
        }
    }
}

/// Runtime instance
///
/// Holds per-thread invocation state. Values and functions are `Send + Sync`
/// and may be shared between runtimes on different threads.
#[derive(Debug, Default)]
pub struct Runtime {
    options: RuntimeOptions,
    depth: Cell<usize>,
}

/// Restores the call depth when an invocation exits, by any path
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl Runtime {
    /// Create a runtime with default options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RuntimeOptions) -> Self {
        Self {
            options,
            depth: Cell::new(0),
        }
    }

    /// Create a runtime configured from the nearest bindery.toml (and BINDERY_* env)
    pub fn from_directory(start_dir: &Path) -> ConfigResult<Self> {
        let config = ConfigLoader::new().load_from_directory(start_dir)?;
        Ok(Self::with_options(RuntimeOptions::from_config(&config)))
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Current invocation nesting
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Bind `target` to `this`, pre-applying `leading_args`
    pub fn bind(
        &self,
        target: &Value,
        this: Value,
        leading_args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        binder::bind(target, this, leading_args).map(Value::Function)
    }

    /// Invoke `callee` as a plain function with an explicit receiver
    pub fn call(
        &self,
        callee: &Value,
        this: Value,
        args: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let func = callee.as_function().ok_or_else(|| RuntimeError::TypeError {
            msg: format!("{} is not a function", callee.type_name()),
        })?;
        self.invoke(func, Invocation::plain(this, args))
    }

    /// Invoke `callee` as a constructor
    ///
    /// The new instance delegates to `callee`'s current member table. If the
    /// body returns an object or function, that value replaces the instance.
    pub fn construct(&self, callee: &Value, args: Vec<Value>) -> Result<Value, RuntimeError> {
        let func = match callee {
            Value::Function(func) if func.is_constructor() => func,
            Value::Function(func) => {
                return Err(RuntimeError::TypeError {
                    msg: format!("{} is not a constructor", func.name()),
                })
            }
            other => {
                return Err(RuntimeError::TypeError {
                    msg: format!("{} is not a constructor", other.type_name()),
                })
            }
        };

        let instance = Object::with_proto(func.prototype());
        let result = self.invoke(func, Invocation::construct(instance.clone(), args))?;

        if result.is_object_like() {
            Ok(result)
        } else {
            Ok(Value::Object(instance))
        }
    }

    /// Does `value` delegate to `ctor`'s member table?
    ///
    /// Bound callables answer for their target.
    pub fn instance_of(&self, value: &Value, ctor: &Value) -> Result<bool, RuntimeError> {
        let mut func = ctor.as_function().ok_or_else(|| RuntimeError::TypeError {
            msg: format!(
                "right-hand side of instance_of is a {}, not a function",
                ctor.type_name()
            ),
        })?;
        while let Some(bound) = func.as_bound() {
            func = bound.target();
        }

        let obj = match value {
            Value::Object(obj) => obj,
            _ => return Ok(false),
        };
        let proto = func.prototype().ok_or_else(|| RuntimeError::TypeError {
            msg: format!("{} has no member table", func.name()),
        })?;
        Ok(proto.is_prototype_of(obj))
    }

    /// Dispatch one invocation layer
    ///
    /// Bound callables forward to their target; natives run their body.
    /// Errors from bodies pass through untouched.
    fn invoke(&self, func: &Function, invocation: Invocation) -> Result<Value, RuntimeError> {
        let _guard = self.enter(func)?;

        trace!(
            callee = func.name(),
            kind = %invocation.kind(),
            argc = invocation.args().len(),
            depth = self.depth.get(),
            "invoke"
        );

        match func.kind() {
            FunctionKind::Bound(bound) => self.invoke(bound.target(), bound.forward(invocation)),
            FunctionKind::Native(native) => {
                if let (true, Some(expected)) = (self.options.enforce_arity, native.arity) {
                    let got = invocation.args().len();
                    if got != expected {
                        return Err(RuntimeError::ArityMismatch {
                            name: func.name().to_string(),
                            expected,
                            got,
                        });
                    }
                }
                (native.body)(self, &invocation)
            }
        }
    }

    fn enter(&self, func: &Function) -> Result<DepthGuard<'_>, RuntimeError> {
        let depth = self.depth.get();
        if depth >= self.options.max_call_depth {
            warn!(
                callee = func.name(),
                limit = self.options.max_call_depth,
                "call depth limit reached"
            );
            return Err(RuntimeError::CallDepthExceeded {
                limit: self.options.max_call_depth,
            });
        }
        self.depth.set(depth + 1);
        Ok(DepthGuard { depth: &self.depth })
    }
}

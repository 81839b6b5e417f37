//! Native function registration and builder
//!
//! Native functions can be declared with a fixed arity (which also becomes
//! their `length`) or as variadic. By default a native is usable both as a
//! plain function and as a constructor.
//!
//! # Examples
//!
//! ```rust
//! use bindery_runtime::api::native::NativeFunctionBuilder;
//! use bindery_runtime::value::Value;
//!
//! // person(name, age) copies its arguments onto the receiver
//! let person = NativeFunctionBuilder::new("person")
//!     .with_arity(2)
//!     .with_implementation(|_rt, inv| {
//!         inv.this_set("name", inv.arg(0));
//!         inv.this_set("age", inv.arg(1));
//!         Ok(Value::Undefined)
//!     })
//!     .build()
//!     .unwrap();
//! assert_eq!(person.length(), 2);
//! ```

use crate::api::runtime::Runtime;
use crate::function::{Function, Invocation, NativeBody};
use crate::value::{RuntimeError, Value};
use std::sync::Arc;
use thiserror::Error;

/// Builder for native callables
pub struct NativeFunctionBuilder {
    name: String,
    arity: Option<usize>,
    constructor: bool,
    implementation: Option<NativeBody>,
}

impl NativeFunctionBuilder {
    /// Create a new native function builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arity: None,
            constructor: true,
            implementation: None,
        }
    }

    /// Declare the parameter count
    ///
    /// Checked against the final argument list only when the runtime enforces
    /// arity.
    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    /// Accept any number of arguments
    pub fn variadic(mut self) -> Self {
        self.arity = None;
        self
    }

    /// Whether the function may be invoked as a constructor
    pub fn constructor(mut self, constructor: bool) -> Self {
        self.constructor = constructor;
        self
    }

    /// Set the function implementation
    pub fn with_implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(&Runtime, &Invocation) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.implementation = Some(Arc::new(implementation));
        self
    }

    /// Build the native function
    pub fn build(self) -> Result<Function, BuildError> {
        let implementation = self
            .implementation
            .ok_or_else(|| BuildError::MissingImplementation(self.name.clone()))?;

        Ok(Function::native(
            self.name,
            self.arity,
            self.constructor,
            implementation,
        ))
    }
}

/// Errors that can occur when building a native function
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// No implementation was provided
    #[error("Native function '{0}' missing implementation")]
    MissingImplementation(String),
}

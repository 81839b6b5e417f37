//! Receiver binding
//!
//! `bind(callable, receiver, leading...)` produces a bound callable that:
//! - on a plain call, runs the original with the captured receiver and
//!   `leading ++ call_args`;
//! - on a constructor call, runs the original against the freshly allocated
//!   instance (the captured receiver is ignored) with the same argument order.
//!
//! Instances constructed through a bound callable delegate to a fresh
//! delegation target, which in turn delegates to the original's member table.
//! The bound callable exposes that delegation target as its own `prototype`,
//! so writes made through the bound callable never reach the original.

use crate::function::{Function, Invocation};
use crate::object::Object;
use crate::value::{RuntimeError, Value};
use tracing::debug;

/// Prefix of a bound callable's name
pub const BOUND_NAME_PREFIX: &str = "bound ";

/// Captured state of a bound callable
pub struct BoundFunction {
    target: Function,
    bound_this: Value,
    bound_args: Vec<Value>,
    delegation_target: Object,
}

impl BoundFunction {
    /// The callable that was bound (may itself be bound)
    pub fn target(&self) -> &Function {
        &self.target
    }

    /// Receiver used for plain calls
    pub fn bound_this(&self) -> &Value {
        &self.bound_this
    }

    /// Leading arguments, in bind order
    pub fn bound_args(&self) -> &[Value] {
        &self.bound_args
    }

    /// The indirection object created at bind time
    ///
    /// Delegates to the target's member table as it was when bound.
    pub fn delegation_target(&self) -> &Object {
        &self.delegation_target
    }

    /// Rewrite an invocation of the bound callable into one of its target
    ///
    /// Plain calls swap in the captured receiver; constructor calls keep the
    /// instance. Both prepend the leading arguments.
    pub(crate) fn forward(&self, invocation: Invocation) -> Invocation {
        match invocation {
            Invocation::Plain { args, .. } => Invocation::Plain {
                this: self.bound_this.clone(),
                args: self.concat_args(args),
            },
            Invocation::Construct { instance, args } => Invocation::Construct {
                instance,
                args: self.concat_args(args),
            },
        }
    }

    fn concat_args(&self, call_args: Vec<Value>) -> Vec<Value> {
        let mut args = Vec::with_capacity(self.bound_args.len() + call_args.len());
        args.extend(self.bound_args.iter().cloned());
        args.extend(call_args);
        args
    }
}

impl Drop for BoundFunction {
    /// Unlinks the chain one layer at a time so long chains cannot overflow the stack.
    fn drop(&mut self) {
        let mut next = std::mem::replace(&mut self.target, Function::detached());
        while let Some(mut bound) = next.try_unwrap_bound() {
            next = std::mem::replace(&mut bound.target, Function::detached());
        }
    }
}

/// Bind `target` to `this` with leading arguments
///
/// The only failure is a non-callable `target`; nothing about the arguments
/// is validated here.
pub fn bind(
    target: &Value,
    this: Value,
    leading_args: Vec<Value>,
) -> Result<Function, RuntimeError> {
    match target {
        Value::Function(func) => Ok(bind_function(func, this, leading_args)),
        other => Err(RuntimeError::InvalidOperand {
            type_name: other.type_name().to_string(),
        }),
    }
}

pub(crate) fn bind_function(
    target: &Function,
    this: Value,
    leading_args: Vec<Value>,
) -> Function {
    let delegation_target = Object::with_proto(target.prototype());

    let properties = Object::new();
    properties.set(crate::function::PROTOTYPE_KEY, delegation_target.clone());

    let length = target.length().saturating_sub(leading_args.len());

    debug!(
        callee = target.name(),
        leading = leading_args.len(),
        chained = target.is_bound(),
        "bound callable created"
    );

    Function::from_bound(
        length,
        properties,
        BoundFunction {
            target: target.clone(),
            bound_this: this,
            bound_args: leading_args,
            delegation_target,
        },
    )
}

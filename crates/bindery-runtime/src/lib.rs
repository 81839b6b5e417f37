//! Bindery Runtime - receiver binding for a small dynamic object model
//!
//! This library provides:
//! - Dynamic values and objects with delegation (prototype) chains
//! - Native callables with member tables
//! - `bind`: fixed receiver, pre-applied arguments, constructor-safe
//! - A runtime performing plain and constructor invocations

/// Bindery runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod api;
pub mod binder;
pub mod function;
pub mod object;
pub mod value;

// Re-export commonly used types
pub use api::{BuildError, NativeFunctionBuilder, Runtime, RuntimeOptions};
pub use binder::{bind, BoundFunction};
pub use function::{CallKind, Function, Invocation};
pub use object::Object;
pub use value::{RuntimeError, Value};

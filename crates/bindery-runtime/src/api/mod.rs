//! Public embedding API for the bindery runtime
//!
//! - `Runtime`: plain calls, constructor calls, binding, and `instance_of`
//! - `NativeFunctionBuilder`: turning Rust closures into callables
//!
//! # Examples
//!
//! ```
//! use bindery_runtime::api::{NativeFunctionBuilder, Runtime};
//! use bindery_runtime::value::Value;
//!
//! let runtime = Runtime::new();
//! let greet = NativeFunctionBuilder::new("greet")
//!     .with_implementation(|_, inv| Ok(inv.this_get("name")))
//!     .build()
//!     .unwrap();
//! let result = runtime.call(&greet.into(), Value::Undefined, vec![]).unwrap();
//! assert!(result.is_undefined());
//! ```

pub mod native;
pub mod runtime;

// Re-export main types for convenience
pub use native::{BuildError, NativeFunctionBuilder};
pub use runtime::{Runtime, RuntimeOptions};

//! Shared test utilities for bindery runtime tests
//!
//! Builds the small cast of callables the binding tests revolve around.

#![allow(dead_code)]

use bindery_runtime::{Function, NativeFunctionBuilder, Object, Runtime, RuntimeError, Value};
use std::sync::{Arc, Mutex};

// Re-export testing utilities
pub use pretty_assertions::{assert_eq, assert_ne};

/// What a body observed while running: receiver and arguments, per call
pub type CallLog = Arc<Mutex<Vec<Observed>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Observed {
    pub this: Value,
    pub args: Vec<Value>,
    pub constructing: bool,
}

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn last_call(log: &CallLog) -> Observed {
    log.lock().unwrap().last().cloned().expect("no call recorded")
}

/// `{value: 1}`
pub fn receiver() -> Value {
    Value::Object(Object::from_entries([("value", 1.0)]))
}

/// `describe(name, age)` returns `{value: this.value, name, age}`
pub fn describe() -> Function {
    NativeFunctionBuilder::new("describe")
        .with_arity(2)
        .with_implementation(|_, inv| {
            Ok(Value::Object(Object::from_entries([
                ("value", inv.this_get("value")),
                ("name", inv.arg(0)),
                ("age", inv.arg(1)),
            ])))
        })
        .build()
        .unwrap()
}

/// `person(name, age)` sets `this.habit = 'shopping'`, copies `this.value`
/// into `this.seen_value`, stores its arguments, and returns nothing
pub fn person(log: &CallLog) -> Function {
    let log = log.clone();
    NativeFunctionBuilder::new("person")
        .with_arity(2)
        .with_implementation(move |_, inv| {
            log.lock().unwrap().push(Observed {
                this: inv.this(),
                args: inv.args().to_vec(),
                constructing: inv.is_construct(),
            });
            inv.this_set("habit", "shopping");
            inv.this_set("seen_value", inv.this_get("value"));
            inv.this_set("name", inv.arg(0));
            inv.this_set("age", inv.arg(1));
            Ok(Value::Undefined)
        })
        .build()
        .unwrap()
}

/// Variadic callable that records every call
pub fn recorder(log: &CallLog) -> Function {
    let log = log.clone();
    NativeFunctionBuilder::new("recorder")
        .variadic()
        .with_implementation(move |_, inv| {
            log.lock().unwrap().push(Observed {
                this: inv.this(),
                args: inv.args().to_vec(),
                constructing: inv.is_construct(),
            });
            Ok(Value::Undefined)
        })
        .build()
        .unwrap()
}

/// Always fails with a thrown string
pub fn failing(message: &'static str) -> Function {
    NativeFunctionBuilder::new("failing")
        .with_implementation(move |_, _| Err(RuntimeError::thrown(message)))
        .build()
        .unwrap()
}

/// Bind through the runtime, expecting success
pub fn bind(rt: &Runtime, target: &Function, this: Value, args: Vec<Value>) -> Value {
    rt.bind(&Value::Function(target.clone()), this, args)
        .expect("bind should succeed on a function")
}

pub fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().map(|s| Value::from(*s)).collect()
}

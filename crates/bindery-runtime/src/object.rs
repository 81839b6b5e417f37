//! Objects and delegation chains
//!
//! An object is a shared, insertion-ordered property table plus an optional
//! delegation target (`proto`). Reads walk the chain; writes always land on the
//! object itself, so a write through a derived object never reaches the
//! objects it delegates to.

use crate::value::{Shared, Value};
use indexmap::IndexMap;
use std::fmt;

/// Upper bound on chain walks, so a cyclic chain cannot hang a lookup.
const MAX_CHAIN_LENGTH: usize = 10_000;

#[derive(Debug, Default)]
struct ObjectData {
    properties: IndexMap<String, Value>,
    proto: Option<Object>,
}

impl Drop for ObjectData {
    /// Unlinks the delegation chain one object at a time so long chains cannot
    /// overflow the stack.
    fn drop(&mut self) {
        let mut next = self.proto.take();
        while let Some(obj) = next {
            next = obj.0.try_unwrap().and_then(|mut data| data.proto.take());
        }
    }
}

/// Reference to a heap object. Cloning aliases the same object.
#[derive(Clone)]
pub struct Object(Shared<ObjectData>);

impl Object {
    /// Empty object with no delegation target
    pub fn new() -> Self {
        Object(Shared::new(ObjectData::default()))
    }

    /// Empty object delegating to `proto`
    pub fn with_proto(proto: Option<Object>) -> Self {
        Object(Shared::new(ObjectData {
            properties: IndexMap::new(),
            proto,
        }))
    }

    /// Build an object from key/value pairs, preserving their order
    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let obj = Object::new();
        for (key, value) in entries {
            obj.set(key, value);
        }
        obj
    }

    /// Resolve `key` on this object or anything it delegates to
    pub fn get(&self, key: &str) -> Value {
        let mut current = Some(self.clone());
        let mut hops = 0;
        while let Some(obj) = current {
            let (found, next) = obj
                .0
                .with(|data| (data.properties.get(key).cloned(), data.proto.clone()));
            if let Some(value) = found {
                return value;
            }
            hops += 1;
            if hops > MAX_CHAIN_LENGTH {
                break;
            }
            current = next;
        }
        Value::Undefined
    }

    /// Own property only, ignoring the delegation chain
    pub fn get_own(&self, key: &str) -> Option<Value> {
        self.0.with(|data| data.properties.get(key).cloned())
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.with(|data| data.properties.contains_key(key))
    }

    /// True if `key` resolves anywhere along the chain
    pub fn has(&self, key: &str) -> bool {
        let mut current = Some(self.clone());
        let mut hops = 0;
        while let Some(obj) = current {
            if obj.has_own(key) {
                return true;
            }
            hops += 1;
            if hops > MAX_CHAIN_LENGTH {
                break;
            }
            current = obj.proto();
        }
        false
    }

    /// Write an own property
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let (key, value) = (key.into(), value.into());
        self.0.with_mut(|data| {
            data.properties.insert(key, value);
        });
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.with_mut(|data| data.properties.shift_remove(key))
    }

    /// Own property names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.0.with(|data| data.properties.keys().cloned().collect())
    }

    pub fn proto(&self) -> Option<Object> {
        self.0.with(|data| data.proto.clone())
    }

    pub fn set_proto(&self, proto: Option<Object>) {
        self.0.with_mut(|data| data.proto = proto);
    }

    /// True if this object appears anywhere on `other`'s delegation chain
    pub fn is_prototype_of(&self, other: &Object) -> bool {
        let mut current = other.proto();
        let mut hops = 0;
        while let Some(obj) = current {
            if obj.ptr_eq(self) {
                return true;
            }
            hops += 1;
            if hops > MAX_CHAIN_LENGTH {
                break;
            }
            current = obj.proto();
        }
        false
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        self.0.ptr_eq(&other.0)
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Object {
    /// Own properties only; nested objects are elided so cycles cannot recurse.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<(String, Value)> = self.0.with(|data| {
            data.properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        });
        if entries.is_empty() {
            return write!(f, "{{}}");
        }
        let rendered: Vec<String> = entries
            .iter()
            .map(|(k, v)| match v {
                Value::Object(_) => format!("{}: {{...}}", k),
                other => format!("{}: {}", k, other),
            })
            .collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self)
    }
}

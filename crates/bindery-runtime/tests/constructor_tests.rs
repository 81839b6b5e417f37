//! Constructor-invocation tests for bound callables
//!
//! The fixed receiver is ignored, the instance delegates through the bound
//! callable's delegation target to the original member table, and writes to
//! the bound callable's surface never leak back into the original.

mod common;

use bindery_runtime::{NativeFunctionBuilder, Object, Runtime, RuntimeError, Value};
use common::*;
use pretty_assertions::{assert_eq, assert_ne};

// ============================================================================
// Receiver override
// ============================================================================

#[test]
fn test_construct_ignores_fixed_receiver() {
    let rt = Runtime::new();
    let log = call_log();
    let fixed = receiver();
    let bound = bind(&rt, &person(&log), fixed.clone(), strings(&["Libai"]));

    let instance = rt.construct(&bound, strings(&["18"])).unwrap();

    // body ran against the fresh instance, which has no `value`
    assert!(instance.get("seen_value").is_undefined());
    assert_eq!(instance.get("habit"), Value::from("shopping"));

    let seen = last_call(&log);
    assert!(seen.constructing);
    assert_eq!(seen.this, instance);
    assert_ne!(seen.this, fixed);

    // the fixed receiver was not written to
    assert!(fixed.get("habit").is_undefined());
}

#[test]
fn test_construct_keeps_leading_arguments() {
    let rt = Runtime::new();
    let log = call_log();
    let bound = bind(&rt, &person(&log), receiver(), strings(&["Libai"]));

    let instance = rt.construct(&bound, strings(&["18"])).unwrap();

    assert_eq!(last_call(&log).args, strings(&["Libai", "18"]));
    assert_eq!(instance.get("name"), Value::from("Libai"));
    assert_eq!(instance.get("age"), Value::from("18"));
}

#[test]
fn test_plain_and_construct_alternate_without_memory() {
    let rt = Runtime::new();
    let log = call_log();
    let fixed = receiver();
    let bound = bind(&rt, &person(&log), fixed.clone(), vec![]);

    rt.call(&bound, Value::Undefined, vec![]).unwrap();
    rt.construct(&bound, vec![]).unwrap();
    rt.call(&bound, Value::Undefined, vec![]).unwrap();

    let calls = log.lock().unwrap().clone();
    let kinds: Vec<bool> = calls.iter().map(|c| c.constructing).collect();
    assert_eq!(kinds, vec![false, true, false]);
    assert_eq!(calls[2].this, fixed);
}

#[test]
fn test_bound_callable_used_as_method_is_still_plain() {
    let rt = Runtime::new();
    let log = call_log();
    let bound = bind(&rt, &recorder(&log), Value::Null, vec![]);

    // an instance built through the bound callable, then passed as receiver
    let instance = rt.construct(&bound, vec![]).unwrap();
    rt.call(&bound, instance, vec![]).unwrap();

    let seen = last_call(&log);
    assert!(!seen.constructing);
    assert_eq!(seen.this, Value::Null);
}

// ============================================================================
// Constructor return override
// ============================================================================

#[test]
fn test_returned_object_replaces_instance() {
    let rt = Runtime::new();
    let replacement = Object::from_entries([("replaced", true)]);
    let returned = replacement.clone();
    let factory = NativeFunctionBuilder::new("factory")
        .with_implementation(move |_, inv| {
            inv.this_set("ignored", true);
            Ok(Value::Object(returned.clone()))
        })
        .build()
        .unwrap();

    let bound = bind(&rt, &factory, receiver(), vec![]);
    let result = rt.construct(&bound, vec![]).unwrap();

    assert_eq!(result, Value::Object(replacement));
    assert!(result.get("ignored").is_undefined());
}

#[test]
fn test_returned_primitive_keeps_instance() {
    let rt = Runtime::new();
    let f = NativeFunctionBuilder::new("f")
        .with_implementation(|_, inv| {
            inv.this_set("built", true);
            Ok(Value::Number(7.0))
        })
        .build()
        .unwrap();

    let bound = bind(&rt, &f, receiver(), vec![]);
    let result = rt.construct(&bound, vec![]).unwrap();

    assert!(result.as_object().is_some());
    assert_eq!(result.get("built"), Value::Bool(true));
}

// ============================================================================
// Member table visibility and isolation
// ============================================================================

#[test]
fn test_member_table_visible_when_set_before_bind() {
    let rt = Runtime::new();
    let log = call_log();
    let f = person(&log);
    f.prototype().unwrap().set("friend", "Libai");

    let bound = bind(&rt, &f, receiver(), vec![]);
    let instance = rt.construct(&bound, strings(&["18"])).unwrap();

    assert_eq!(instance.get("friend"), Value::from("Libai"));
}

#[test]
fn test_member_table_visible_when_set_after_bind() {
    let rt = Runtime::new();
    let log = call_log();
    let f = person(&log);

    let bound = bind(&rt, &f, receiver(), vec![]);
    let instance = rt.construct(&bound, vec![]).unwrap();
    f.prototype().unwrap().set("friend", "Libai");

    assert_eq!(instance.get("friend"), Value::from("Libai"));
}

#[test]
fn test_bound_surface_writes_do_not_reach_original() {
    let rt = Runtime::new();
    let log = call_log();
    let f = person(&log);
    let bound = bind(&rt, &f, receiver(), vec![]);

    let bound_fn = bound.as_function().unwrap();
    bound_fn.prototype().unwrap().set("only_bound", "yes");

    let direct = rt.construct(&f.clone().into(), vec![]).unwrap();
    let via_bound = rt.construct(&bound, vec![]).unwrap();

    assert!(f.prototype().unwrap().get("only_bound").is_undefined());
    assert!(direct.get("only_bound").is_undefined());
    assert_eq!(via_bound.get("only_bound"), Value::from("yes"));
}

#[test]
fn test_replacing_bound_prototype_leaves_original_alone() {
    let rt = Runtime::new();
    let log = call_log();
    let f = person(&log);
    let original_table = f.prototype().unwrap();
    let bound = bind(&rt, &f, receiver(), vec![]);

    let replacement = Object::from_entries([("kind", "replacement")]);
    bound.as_function().unwrap().set_prototype(replacement.clone());

    assert!(f.prototype().unwrap().ptr_eq(&original_table));
    let instance = rt.construct(&bound, vec![]).unwrap();
    assert_eq!(instance.get("kind"), Value::from("replacement"));
    assert!(replacement.is_prototype_of(instance.as_object().unwrap()));
}

#[test]
fn test_instance_chain_passes_through_delegation_target() {
    let rt = Runtime::new();
    let log = call_log();
    let f = person(&log);
    let bound = bind(&rt, &f, receiver(), vec![]);

    let instance = rt.construct(&bound, vec![]).unwrap();
    let instance = instance.as_object().unwrap();
    let delegation_target = bound
        .as_function()
        .unwrap()
        .as_bound()
        .unwrap()
        .delegation_target()
        .clone();

    assert!(instance.proto().unwrap().ptr_eq(&delegation_target));
    assert!(f.prototype().unwrap().is_prototype_of(instance));
}

// ============================================================================
// instance_of
// ============================================================================

#[test]
fn test_instance_of_original_and_bound() {
    let rt = Runtime::new();
    let log = call_log();
    let f = person(&log);
    let f_value: Value = f.clone().into();
    let bound = bind(&rt, &f, receiver(), vec![]);

    let via_bound = rt.construct(&bound, vec![]).unwrap();
    let direct = rt.construct(&f_value, vec![]).unwrap();

    assert!(rt.instance_of(&via_bound, &f_value).unwrap());
    assert!(rt.instance_of(&via_bound, &bound).unwrap());
    assert!(rt.instance_of(&direct, &bound).unwrap());
    assert!(!rt.instance_of(&receiver(), &bound).unwrap());
    assert!(!rt.instance_of(&Value::Number(1.0), &f_value).unwrap());
}

#[test]
fn test_instance_of_requires_function() {
    let rt = Runtime::new();
    let err = rt.instance_of(&receiver(), &Value::Null).unwrap_err();
    assert!(matches!(err, RuntimeError::TypeError { .. }));
}

// ============================================================================
// Non-constructors
// ============================================================================

#[test]
fn test_bound_non_constructor_cannot_be_constructed() {
    let rt = Runtime::new();
    let helper = NativeFunctionBuilder::new("helper")
        .constructor(false)
        .with_implementation(|_, _| Ok(Value::Undefined))
        .build()
        .unwrap();

    let bound = bind(&rt, &helper, receiver(), vec![]);

    // binding itself succeeds; the failure belongs to construction
    let err = rt.construct(&bound, vec![]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TypeError {
            msg: "bound helper is not a constructor".to_string()
        }
    );
    assert!(rt.call(&bound, Value::Undefined, vec![]).is_ok());
}

#[test]
fn test_construct_non_function() {
    let rt = Runtime::new();
    let err = rt.construct(&receiver(), vec![]).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TypeError {
            msg: "object is not a constructor".to_string()
        }
    );
}

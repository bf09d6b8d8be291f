//! Integration tests for the spec merger and policy table
//!
//! Tests cover:
//! - Define-once enforcement across class and mixin sources
//! - Chain execution order for side-effecting hooks
//! - Merged-result union and collision for state-producing hooks
//! - Reserved-key handling (displayName, statics, type validators)
//! - Mixin-shape rejection

use std::cell::RefCell;
use std::rc::Rc;

use trellis_core::{
    mix_spec_into_component, ClassDef, ComponentSpec, Instance, MergeOrigin, NativeComponent,
    PropMap, SpecError, SpecFramework, SpecResult, TypeLocation, Value,
};

/// Predicates only; merging never builds.
struct Inert;

impl SpecFramework for Inert {
    fn build_native_component(&self, _spec: ComponentSpec) -> SpecResult<NativeComponent> {
        Err(SpecError::runtime("inert framework cannot build"))
    }
}

fn spec_map(entries: Vec<(&str, Value)>) -> Value {
    Value::map(PropMap::from_iter(
        entries.into_iter().map(|(k, v)| (k.to_string(), v)),
    ))
}

fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &str) -> Value {
    let log = log.clone();
    let tag = tag.to_string();
    Value::func(move |_, _| {
        log.borrow_mut().push(tag.clone());
        Ok(Value::Null)
    })
}

#[test]
fn test_should_component_update_defined_exactly_once_is_fine() {
    let mut spec = ComponentSpec::new();
    let source = spec_map(vec![(
        "shouldComponentUpdate",
        Value::func(|_, _| Ok(Value::Bool(false))),
    )]);
    mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap();
    assert!(spec.owns("shouldComponentUpdate"));
}

#[test]
fn test_should_component_update_twice_is_a_policy_violation() {
    let mut spec = ComponentSpec::new();
    let make = || spec_map(vec![("shouldComponentUpdate", Value::func(|_, _| Ok(Value::Bool(true))))]);
    mix_spec_into_component(&mut spec, &make(), MergeOrigin::Mixin, &Inert).unwrap();
    let err = mix_spec_into_component(&mut spec, &make(), MergeOrigin::Mixin, &Inert).unwrap_err();
    assert!(
        matches!(err, SpecError::DuplicateDefinition { ref key, .. } if key == "shouldComponentUpdate")
    );
}

#[test]
fn test_three_way_chain_preserves_source_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut spec = ComponentSpec::new();
    for tag in ["one", "two", "three"] {
        let source = spec_map(vec![("componentWillUnmount", recorder(&log, tag))]);
        mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap();
    }

    let hook = spec.prototype.own("componentWillUnmount").unwrap();
    hook.call(None, &[]).unwrap();
    assert_eq!(*log.borrow(), vec!["one", "two", "three"]);
}

#[test]
fn test_merged_hook_union_across_three_sources() {
    let mut spec = ComponentSpec::new();
    for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
        let source = spec_map(vec![(
            "getChildContext",
            Value::func(move |_, _| {
                Ok(Value::map(PropMap::from_iter([(
                    key.to_string(),
                    Value::Int(value),
                )])))
            }),
        )]);
        mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap();
    }

    let hook = spec.prototype.own("getChildContext").unwrap();
    let merged = hook.call(None, &[]).unwrap();
    let expected = Value::map(PropMap::from_iter([
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::Int(2)),
        ("c".to_string(), Value::Int(3)),
    ]));
    assert_eq!(merged, expected);
}

#[test]
fn test_null_result_passes_other_through() {
    let mut spec = ComponentSpec::new();
    let silent = spec_map(vec![("getDefaultProps", Value::func(|_, _| Ok(Value::Null)))]);
    let talkative = spec_map(vec![(
        "getDefaultProps",
        Value::func(|_, _| {
            Ok(Value::map(PropMap::from_iter([(
                "kind".to_string(),
                Value::str("plain"),
            )])))
        }),
    )]);
    mix_spec_into_component(&mut spec, &silent, MergeOrigin::Mixin, &Inert).unwrap();
    mix_spec_into_component(&mut spec, &talkative, MergeOrigin::Mixin, &Inert).unwrap();

    let hook = spec.prototype.own("getDefaultProps").unwrap();
    let out = hook.call(None, &[]).unwrap();
    assert_eq!(
        out,
        Value::map(PropMap::from_iter([(
            "kind".to_string(),
            Value::str("plain")
        )]))
    );
}

#[test]
fn test_prop_types_merge_mapping_wise() {
    let mut spec = ComponentSpec::new();
    let ok = Value::func(|_, _| Ok(Value::Bool(true)));
    let first = spec_map(vec![("propTypes", spec_map(vec![("title", ok.clone())]))]);
    let second = spec_map(vec![("propTypes", spec_map(vec![("count", ok)]))]);
    mix_spec_into_component(&mut spec, &first, MergeOrigin::Mixin, &Inert).unwrap();
    mix_spec_into_component(&mut spec, &second, MergeOrigin::Mixin, &Inert).unwrap();

    assert_eq!(spec.prop_types.len(), 2);
    assert!(spec.prop_types.contains_key("title"));
    assert!(spec.prop_types.contains_key("count"));
}

#[test]
fn test_child_context_validator_must_be_callable() {
    let mut spec = ComponentSpec::new();
    spec.display_name = Some("Provider".to_string());
    let source = spec_map(vec![(
        "childContextTypes",
        spec_map(vec![("store", Value::str("not a function"))]),
    )]);
    let err = mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap_err();
    assert_eq!(
        err,
        SpecError::InvalidValidator {
            location: TypeLocation::ChildContext,
            name: "store".to_string(),
            class_name: "Provider".to_string(),
        }
    );
}

#[test]
fn test_statics_key_delegates_to_static_merger() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut spec = ComponentSpec::new();
    let first = spec_map(vec![("statics", spec_map(vec![("refresh", recorder(&log, "class"))]))]);
    let second = spec_map(vec![("statics", spec_map(vec![("refresh", recorder(&log, "mixin"))]))]);
    mix_spec_into_component(&mut spec, &first, MergeOrigin::Mixin, &Inert).unwrap();
    mix_spec_into_component(&mut spec, &second, MergeOrigin::Mixin, &Inert).unwrap();

    spec.statics.get("refresh").unwrap().call(None, &[]).unwrap();
    assert_eq!(*log.borrow(), vec!["class", "mixin"]);
}

#[test]
fn test_instance_rejected_as_mixin() {
    let mut spec = ComponentSpec::new();
    let instance = Value::Instance(Instance::new("Widget", trellis_core::Prototype::root()));
    let err =
        mix_spec_into_component(&mut spec, &instance, MergeOrigin::Mixin, &Inert).unwrap_err();
    assert!(matches!(err, SpecError::InvalidMixin { .. }));
}

#[test]
fn test_class_rejected_as_mixin_value_in_mixin_list() {
    let mut spec = ComponentSpec::new();
    let class = Value::Class(ClassDef::new("Widget"));
    let source = spec_map(vec![("mixins", Value::list(vec![class]))]);
    let err = mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap_err();
    assert!(matches!(err, SpecError::InvalidMixin { .. }));
}

#[test]
fn test_scalar_rejected_as_mixin() {
    let mut spec = ComponentSpec::new();
    let err = mix_spec_into_component(&mut spec, &Value::Int(3), MergeOrigin::Mixin, &Inert)
        .unwrap_err();
    assert!(matches!(err, SpecError::InvalidMixin { .. }));
}

//! Spec merger
//!
//! Merges a source (a mixin, or one link of a class's prototype chain) into
//! the assembling spec, one own key at a time, under the policy table:
//! override validation, reserved-key handlers, auto-bind deferral, and
//! chained / merged-result composition for repeat definitions.
//!
//! Ordering rule: the existing (already-merged) implementation runs BEFORE
//! the newly merged one, for both chain and merged-result composition.

use tracing::trace;

use crate::autobind;
use crate::error::{SpecError, SpecResult, TypeLocation};
use crate::framework::SpecFramework;
use crate::policy::{self, SpecPolicy};
use crate::spec::ComponentSpec;
use crate::statics;
use crate::value::{Method, PropMap, Value};

/// Where a merge source came from.
///
/// Links of a class's own inheritance chain get ordinary override semantics
/// (a more-derived link replaces an earlier definition of a plain or
/// define-once key); mixin sources get the strict rules (a repeat definition
/// of such a key is an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOrigin {
    /// One link of the class's own prototype chain
    ChainLink,
    /// A mixin (or the class spec itself, relative to its mixins)
    Mixin,
}

/// Merge every own key of `source` into `spec`, in definition order.
pub fn mix_spec_into_component(
    spec: &mut ComponentSpec,
    source: &Value,
    origin: MergeOrigin,
    framework: &dyn SpecFramework,
) -> SpecResult<()> {
    if framework.is_component_class(source) {
        return Err(SpecError::InvalidMixin {
            detail: "a component class cannot be used as a mixin; use a plain spec object"
                .to_string(),
        });
    }
    if framework.is_component_instance(source) {
        return Err(SpecError::InvalidMixin {
            detail: "a component instance cannot be used as a mixin; use a plain spec object"
                .to_string(),
        });
    }
    let map = source.as_map().ok_or_else(|| SpecError::InvalidMixin {
        detail: format!("expected a plain spec object, got `{}`", source.type_name()),
    })?;

    let entries: Vec<(String, Value)> = map
        .borrow()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (name, property) in entries {
        merge_key(spec, &name, property, origin, framework)?;
    }
    Ok(())
}

fn merge_key(
    spec: &mut ComponentSpec,
    name: &str,
    property: Value,
    origin: MergeOrigin,
    framework: &dyn SpecFramework,
) -> SpecResult<()> {
    validate_override(spec, name, origin)?;
    trace!(key = name, "merging spec key");

    match name {
        "displayName" => {
            let display_name = property.as_str().ok_or_else(|| {
                SpecError::usage("`displayName` must be a string")
            })?;
            spec.display_name = Some(display_name.to_string());
        }
        "mixins" => {
            let list = property.as_list().ok_or_else(|| SpecError::InvalidMixin {
                detail: "`mixins` must be a list of spec objects".to_string(),
            })?;
            let mixins: Vec<Value> = list.borrow().clone();
            for mixin in &mixins {
                mix_spec_into_component(spec, mixin, MergeOrigin::Mixin, framework)?;
            }
        }
        "propTypes" => {
            let validators =
                validate_type_def(&spec.name_for_errors(), &property, TypeLocation::Prop)?;
            spec.prop_types.extend(validators);
        }
        "contextTypes" => {
            let validators =
                validate_type_def(&spec.name_for_errors(), &property, TypeLocation::Context)?;
            spec.context_types.extend(validators);
        }
        "childContextTypes" => {
            let validators = validate_type_def(
                &spec.name_for_errors(),
                &property,
                TypeLocation::ChildContext,
            )?;
            spec.child_context_types.extend(validators);
        }
        "statics" => {
            let map = property.as_map().ok_or_else(|| {
                SpecError::usage("`statics` must be a map of static properties")
            })?;
            let entries = map.borrow().clone();
            statics::merge_statics(spec, &entries)?;
        }
        _ => merge_ordinary_key(spec, name, property, origin)?,
    }
    Ok(())
}

/// Reject overrides the policy table forbids.
fn validate_override(spec: &ComponentSpec, name: &str, origin: MergeOrigin) -> SpecResult<()> {
    let policy = policy::policy_of(name);

    // Framework plumbing may never be redefined, with the single
    // override-base exception.
    if policy::is_framework_method(name) && policy != Some(SpecPolicy::OverrideBase) {
        return Err(SpecError::ReservedOverride {
            key: name.to_string(),
            class_name: spec.name_for_errors(),
        });
    }

    if spec.owns(name) {
        let chainable = matches!(
            policy,
            Some(SpecPolicy::DefineMany | SpecPolicy::DefineManyMerged)
        );
        if !chainable && origin == MergeOrigin::Mixin {
            return Err(SpecError::DuplicateDefinition {
                key: name.to_string(),
                class_name: spec.name_for_errors(),
            });
        }
    }
    Ok(())
}

fn merge_ordinary_key(
    spec: &mut ComponentSpec,
    name: &str,
    property: Value,
    origin: MergeOrigin,
) -> SpecResult<()> {
    match spec.prototype.own(name) {
        None => {
            if let Value::Function(method) = &property {
                if autobind::is_bind_candidate(name, method) {
                    autobind::bind_method(&spec.prototype, name, method.clone());
                    return Ok(());
                }
            }
            spec.prototype.define(name, property);
        }
        Some(existing) => match policy::policy_of(name) {
            Some(SpecPolicy::DefineManyMerged) => {
                let (one, two) = both_functions(&existing, &property, name)?;
                spec.prototype
                    .define(name, Value::Function(create_merged_function(one, two)));
            }
            Some(SpecPolicy::DefineMany) => {
                let (one, two) = both_functions(&existing, &property, name)?;
                spec.prototype
                    .define(name, Value::Function(create_chained_function(one, two)));
            }
            _ => {
                // chain-link replacement: the more-derived definition wins
                // (validate_override already rejected the mixin case)
                if let Value::Function(method) = &property {
                    if autobind::is_bind_candidate(name, method) {
                        autobind::bind_method(&spec.prototype, name, method.clone());
                        return Ok(());
                    }
                }
                spec.prototype.unregister_auto_bind(name);
                spec.prototype.define(name, property);
            }
        },
    }
    Ok(())
}

fn both_functions(existing: &Value, incoming: &Value, name: &str) -> SpecResult<(Method, Method)> {
    match (existing.as_function(), incoming.as_function()) {
        (Some(one), Some(two)) => Ok((one.clone(), two.clone())),
        _ => Err(SpecError::usage(format!(
            "lifecycle key `{}` must be a function to be combined",
            name
        ))),
    }
}

/// Chain two implementations: both run in order, results discarded.
pub(crate) fn create_chained_function(one: Method, two: Method) -> Method {
    Method::new(move |receiver, args| {
        one.call(receiver, args)?;
        two.call(receiver, args)?;
        Ok(Value::Null)
    })
}

/// Combine two implementations whose mapping results are merged.
///
/// Null results pass the other result through; a key carried by both
/// results raises a merge collision the first time the combined hook runs.
pub(crate) fn create_merged_function(one: Method, two: Method) -> Method {
    Method::new(move |receiver, args| {
        let a = one.call(receiver, args)?;
        let b = two.call(receiver, args)?;
        if a.is_null() {
            return Ok(b);
        }
        if b.is_null() {
            return Ok(a);
        }
        merge_results_no_duplicate_keys(&a, &b)
    })
}

/// Merge two mapping results, erroring on a key present in both.
pub(crate) fn merge_results_no_duplicate_keys(one: &Value, two: &Value) -> SpecResult<Value> {
    let (Some(a), Some(b)) = (one.as_map(), two.as_map()) else {
        return Err(SpecError::runtime(
            "cannot merge results that are not objects",
        ));
    };
    let mut merged = a.borrow().clone();
    for (key, value) in b.borrow().iter() {
        if merged.contains_key(key) {
            return Err(SpecError::MergeCollision { key: key.clone() });
        }
        merged.insert(key.clone(), value.clone());
    }
    Ok(Value::map(merged))
}

/// Check that every entry of a type table is callable and return the table.
pub(crate) fn validate_type_def(
    class_name: &str,
    type_def: &Value,
    location: TypeLocation,
) -> SpecResult<PropMap> {
    let map = type_def.as_map().ok_or_else(|| {
        SpecError::usage(format!("`{}Types` must be a map of validators", location))
    })?;
    let map = map.borrow();
    for (name, validator) in map.iter() {
        if !validator.is_callable() {
            return Err(SpecError::InvalidValidator {
                location,
                name: name.clone(),
                class_name: class_name.to_string(),
            });
        }
    }
    Ok(map.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::framework::{NativeComponent, SpecFramework};
    use crate::object::ClassDef;

    /// A framework that can never build anything; merge tests only need the
    /// introspection predicates.
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

    fn recording(calls: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Value {
        let calls = calls.clone();
        Value::Function(Method::new(move |_, _| {
            calls.borrow_mut().push(tag);
            Ok(Value::Null)
        }))
    }

    #[test]
    fn test_define_once_twice_errors() {
        let mut spec = ComponentSpec::new();
        let first = spec_map(vec![("render", Value::func(|_, _| Ok(Value::Null)))]);
        let second = spec_map(vec![("render", Value::func(|_, _| Ok(Value::Null)))]);

        mix_spec_into_component(&mut spec, &first, MergeOrigin::Mixin, &Inert).unwrap();
        let err =
            mix_spec_into_component(&mut spec, &second, MergeOrigin::Mixin, &Inert).unwrap_err();
        assert!(matches!(err, SpecError::DuplicateDefinition { key, .. } if key == "render"));
    }

    #[test]
    fn test_chain_link_may_replace_define_once() {
        let mut spec = ComponentSpec::new();
        let base = spec_map(vec![("render", Value::func(|_, _| Ok(Value::str("base"))))]);
        let derived = spec_map(vec![(
            "render",
            Value::func(|_, _| Ok(Value::str("derived"))),
        )]);

        mix_spec_into_component(&mut spec, &base, MergeOrigin::ChainLink, &Inert).unwrap();
        mix_spec_into_component(&mut spec, &derived, MergeOrigin::ChainLink, &Inert).unwrap();

        let render = spec.prototype.own("render").unwrap();
        assert_eq!(render.call(None, &[]).unwrap(), Value::str("derived"));
    }

    #[test]
    fn test_chained_hooks_run_in_merge_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut spec = ComponentSpec::new();

        let first = spec_map(vec![("componentDidMount", recording(&calls, "first"))]);
        let second = spec_map(vec![("componentDidMount", recording(&calls, "second"))]);
        mix_spec_into_component(&mut spec, &first, MergeOrigin::Mixin, &Inert).unwrap();
        mix_spec_into_component(&mut spec, &second, MergeOrigin::Mixin, &Inert).unwrap();

        let hook = spec.prototype.own("componentDidMount").unwrap();
        hook.call(None, &[]).unwrap();
        assert_eq!(*calls.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_merged_results_union() {
        let mut spec = ComponentSpec::new();
        let first = spec_map(vec![(
            "getInitialState",
            Value::func(|_, _| {
                Ok(Value::map(PropMap::from_iter([(
                    "count".to_string(),
                    Value::Int(0),
                )])))
            }),
        )]);
        let second = spec_map(vec![(
            "getInitialState",
            Value::func(|_, _| {
                Ok(Value::map(PropMap::from_iter([(
                    "editing".to_string(),
                    Value::Bool(false),
                )])))
            }),
        )]);
        mix_spec_into_component(&mut spec, &first, MergeOrigin::Mixin, &Inert).unwrap();
        mix_spec_into_component(&mut spec, &second, MergeOrigin::Mixin, &Inert).unwrap();

        let hook = spec.prototype.own("getInitialState").unwrap();
        let state = hook.call(None, &[]).unwrap();
        let expected = Value::map(PropMap::from_iter([
            ("count".to_string(), Value::Int(0)),
            ("editing".to_string(), Value::Bool(false)),
        ]));
        assert_eq!(state, expected);
    }

    #[test]
    fn test_merged_results_collision() {
        let mut spec = ComponentSpec::new();
        let make = || {
            Value::func(|_, _| {
                Ok(Value::map(PropMap::from_iter([(
                    "count".to_string(),
                    Value::Int(0),
                )])))
            })
        };
        let first = spec_map(vec![("getInitialState", make())]);
        let second = spec_map(vec![("getInitialState", make())]);
        mix_spec_into_component(&mut spec, &first, MergeOrigin::Mixin, &Inert).unwrap();
        mix_spec_into_component(&mut spec, &second, MergeOrigin::Mixin, &Inert).unwrap();

        let hook = spec.prototype.own("getInitialState").unwrap();
        let err = hook.call(None, &[]).unwrap_err();
        assert_eq!(
            err,
            SpecError::MergeCollision {
                key: "count".to_string()
            }
        );
    }

    #[test]
    fn test_framework_method_override_rejected() {
        let mut spec = ComponentSpec::new();
        let source = spec_map(vec![("mountComponent", Value::func(|_, _| Ok(Value::Null)))]);
        let err =
            mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap_err();
        assert!(matches!(err, SpecError::ReservedOverride { key, .. } if key == "mountComponent"));
    }

    #[test]
    fn test_update_component_is_overridable() {
        let mut spec = ComponentSpec::new();
        let source = spec_map(vec![("updateComponent", Value::func(|_, _| Ok(Value::Null)))]);
        mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap();
        assert!(spec.prototype.owns("updateComponent"));
    }

    #[test]
    fn test_class_and_instance_rejected_as_mixins() {
        let mut spec = ComponentSpec::new();
        let class = Value::Class(ClassDef::new("Widget"));
        let err =
            mix_spec_into_component(&mut spec, &class, MergeOrigin::Mixin, &Inert).unwrap_err();
        assert!(matches!(err, SpecError::InvalidMixin { .. }));
    }

    #[test]
    fn test_nested_mixins_expand_recursively() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let inner = spec_map(vec![("componentWillMount", recording(&calls, "inner"))]);
        let outer = spec_map(vec![
            ("componentWillMount", recording(&calls, "outer")),
            ("mixins", Value::list(vec![inner])),
        ]);

        let mut spec = ComponentSpec::new();
        mix_spec_into_component(&mut spec, &outer, MergeOrigin::Mixin, &Inert).unwrap();

        let hook = spec.prototype.own("componentWillMount").unwrap();
        hook.call(None, &[]).unwrap();
        // the outer hook merged first, so it runs first
        assert_eq!(*calls.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_ordinary_methods_are_auto_bound() {
        let mut spec = ComponentSpec::new();
        let source = spec_map(vec![("handleClick", Value::func(|_, _| Ok(Value::Null)))]);
        mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap();
        assert!(spec.prototype.owns("handleClick"));
        assert_eq!(spec.prototype.auto_bind_entries().len(), 1);
    }

    #[test]
    fn test_duplicate_ordinary_method_errors() {
        let mut spec = ComponentSpec::new();
        let first = spec_map(vec![("handleClick", Value::func(|_, _| Ok(Value::Null)))]);
        let second = spec_map(vec![("handleClick", Value::func(|_, _| Ok(Value::Null)))]);
        mix_spec_into_component(&mut spec, &first, MergeOrigin::Mixin, &Inert).unwrap();
        let err =
            mix_spec_into_component(&mut spec, &second, MergeOrigin::Mixin, &Inert).unwrap_err();
        assert!(matches!(err, SpecError::DuplicateDefinition { key, .. } if key == "handleClick"));
    }

    #[test]
    fn test_invalid_validator_reports_location() {
        let mut spec = ComponentSpec::new();
        spec.display_name = Some("TodoApp".to_string());
        let source = spec_map(vec![(
            "contextTypes",
            spec_map(vec![("model", Value::Int(1))]),
        )]);
        let err =
            mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidValidator {
                location: TypeLocation::Context,
                name: "model".to_string(),
                class_name: "TodoApp".to_string(),
            }
        );
    }

    #[test]
    fn test_display_name_assignment() {
        let mut spec = ComponentSpec::new();
        let source = spec_map(vec![("displayName", Value::str("Renamed"))]);
        mix_spec_into_component(&mut spec, &source, MergeOrigin::Mixin, &Inert).unwrap();
        assert_eq!(spec.display_name.as_deref(), Some("Renamed"));
    }
}

//! The spec-consuming runtime
//!
//! Implements the adapter's [`SpecFramework`] boundary: builds a native
//! component from an assembled spec and constructs instances. Every instance
//! gets one bound closure per method registered in the prototype's auto-bind
//! map; the adapter only registers intent, construction makes it physical.

use std::rc::Rc;

use tracing::{debug, warn};

use trellis_core::{
    BoundMethod, ComponentSpec, FactoryFn, Instance, NativeComponent, PropMap, Prototype, Method,
    SpecError, SpecFramework, SpecResult, Value,
};

use crate::lifecycle;

/// The reference runtime.
///
/// Holds the shared base prototype carrying the framework plumbing
/// (`setState`, `forceUpdate`, `mountComponent`, ...). Every native
/// component's prototype is a child of it.
pub struct Runtime {
    base_prototype: Rc<Prototype>,
}

impl Runtime {
    /// Create a runtime with a fresh base prototype
    pub fn new() -> Self {
        let base = Prototype::root();
        base.define("setState", Value::Function(Method::new(lifecycle::base_set_state)));
        base.define(
            "replaceState",
            Value::Function(Method::new(lifecycle::base_replace_state)),
        );
        base.define(
            "forceUpdate",
            Value::Function(Method::new(lifecycle::base_force_update)),
        );
        base.define(
            "isMounted",
            Value::Function(Method::new(lifecycle::base_is_mounted)),
        );
        base.define(
            "mountComponent",
            Value::Function(Method::new(lifecycle::base_mount_component)),
        );
        base.define(
            "unmountComponent",
            Value::Function(Method::new(lifecycle::base_unmount_component)),
        );
        base.define(
            "receiveComponent",
            Value::Function(Method::new(lifecycle::base_receive_component)),
        );
        base.define(
            "updateComponent",
            Value::Function(Method::new(lifecycle::base_update_component)),
        );
        base.define(
            "performUpdateIfNecessary",
            Value::Function(Method::new(lifecycle::base_perform_update_if_necessary)),
        );
        Self {
            base_prototype: base,
        }
    }

    /// The base prototype all native components inherit from
    pub fn base_prototype(&self) -> &Rc<Prototype> {
        &self.base_prototype
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecFramework for Runtime {
    fn build_native_component(&self, spec: ComponentSpec) -> SpecResult<NativeComponent> {
        if !spec.prototype.owns("render") {
            return Err(SpecError::usage(format!(
                "`{}` must define `render`",
                spec.name_for_errors()
            )));
        }

        let display_name = spec.name_for_errors();
        let prototype = Prototype::child_of(self.base_prototype.clone());
        for (name, value) in spec.prototype.own_entries() {
            prototype.define(name, value);
        }
        for (name, method) in spec.prototype.auto_bind_entries() {
            prototype.register_auto_bind(name, method);
        }

        debug!(component = display_name.as_str(), "built native component");

        let prop_types = Rc::new(spec.prop_types);
        let proto = prototype.clone();
        let name = display_name.clone();
        let create: FactoryFn =
            Rc::new(move |props| construct(&name, &proto, &prop_types, props));

        Ok(NativeComponent {
            create,
            prototype,
            statics: spec.statics,
        })
    }
}

/// Construct one instance: default props, prop validation, per-instance
/// bound closures, initial state.
fn construct(
    display_name: &str,
    prototype: &Rc<Prototype>,
    prop_types: &PropMap,
    incoming: Value,
) -> SpecResult<Rc<Instance>> {
    let instance = Instance::new(display_name, prototype.clone());

    let props = if prototype.has("getDefaultProps") {
        let defaults = instance.call_method("getDefaultProps", &[])?;
        merge_props(defaults, incoming)
    } else {
        incoming
    };
    instance.set_props(props);
    check_prop_types(&instance, prop_types);

    for (name, method) in prototype.auto_bind_entries() {
        let bound = BoundMethod::new(name.clone(), &instance, method);
        instance.set_own(name, Value::Bound(Rc::new(bound)));
    }

    if prototype.has("getInitialState") {
        let state = instance.call_method("getInitialState", &[])?;
        instance.replace_state(state);
    }

    Ok(instance)
}

/// Incoming props win over defaults, key by key.
fn merge_props(defaults: Value, incoming: Value) -> Value {
    if incoming.is_null() {
        return defaults;
    }
    let merged = match (defaults.as_map(), incoming.as_map()) {
        (Some(d), Some(i)) => {
            let mut merged = d.borrow().clone();
            for (key, value) in i.borrow().iter() {
                merged.insert(key.clone(), value.clone());
            }
            Some(Value::map(merged))
        }
        _ => None,
    };
    merged.unwrap_or(incoming)
}

/// Run each prop validator as `(props, propName, componentName)`.
///
/// A validator that returns anything but `true`, or fails outright, logs a
/// warning; construction proceeds. Definition-time validation (entries must
/// be callable) already happened in the merger.
fn check_prop_types(instance: &Rc<Instance>, prop_types: &PropMap) {
    for (name, validator) in prop_types {
        let args = [
            instance.props(),
            Value::str(name.clone()),
            Value::str(instance.display_name()),
        ];
        match validator.call(None, &args) {
            Ok(Value::Bool(true)) => {}
            Ok(_) => warn!(
                component = instance.display_name(),
                prop = name.as_str(),
                "prop validation failed"
            ),
            Err(err) => warn!(
                component = instance.display_name(),
                prop = name.as_str(),
                error = %err,
                "prop validator raised"
            ),
        }
    }
}

//! Class-to-spec translator
//!
//! Walks a class's prototype chain, assembles a policy-merged spec, diverts
//! accessor pairs into a side table, hands the spec to the framework's
//! native builder, re-applies the accessors onto the native prototype, and
//! wraps the native factory so the original class constructor still runs on
//! every instantiation.

use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use crate::error::{SpecError, SpecResult, TypeLocation};
use crate::framework::{FactoryFn, NativeComponent, SpecFramework};
use crate::merge::{self, MergeOrigin};
use crate::object::{Accessor, ClassDef, Instance, Prototype};
use crate::spec::ComponentSpec;
use crate::statics;
use crate::value::{Method, PropMap, Value};

/// A translated component factory, call-compatible with a native one.
///
/// Constructing through it first constructs through the native factory, then
/// runs the original class constructor bodies (root-first) against the fresh
/// instance, so field initializers written as constructor statements still
/// execute. The native factory's entire static surface is copied over.
pub struct ComponentFactory {
    display_name: String,
    native: FactoryFn,
    constructors: Vec<Method>,
    statics: PropMap,
    prototype: Rc<Prototype>,
}

impl ComponentFactory {
    /// Construct an instance
    pub fn create(&self, props: Value) -> SpecResult<Rc<Instance>> {
        let instance = (self.native)(props)?;
        for constructor in &self.constructors {
            constructor.call(Some(&instance), &[])?;
        }
        Ok(instance)
    }

    /// Component display name
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The component's native prototype (accessors already re-applied)
    pub fn prototype(&self) -> &Rc<Prototype> {
        &self.prototype
    }

    /// The factory's static surface
    pub fn statics(&self) -> &PropMap {
        &self.statics
    }

    /// A static property by name
    pub fn get_static(&self, name: &str) -> Option<Value> {
        self.statics.get(name).cloned()
    }

    /// Invoke a function static
    pub fn call_static(&self, name: &str, args: &[Value]) -> SpecResult<Value> {
        match self.statics.get(name) {
            Some(value) => value.call(None, args),
            None => Err(SpecError::runtime(format!(
                "`{}` has no static `{}`",
                self.display_name, name
            ))),
        }
    }
}

impl std::fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("display_name", &self.display_name)
            .field("constructors", &self.constructors)
            .field("statics", &self.statics)
            .field("prototype", &self.prototype)
            .finish_non_exhaustive()
    }
}

/// Translate a class-based component definition into a native factory.
pub fn translate(
    class: &Rc<ClassDef>,
    framework: &dyn SpecFramework,
) -> SpecResult<ComponentFactory> {
    let mut spec = ComponentSpec::new();
    spec.display_name = Some(class.name().to_string());

    // Most-base ancestor first, so derived definitions are the later merge
    // source. Shared-base links contribute nothing and are skipped.
    let mut chain = class.chain();
    chain.retain(|link| !link.is_shared_base());
    chain.reverse();
    debug!(class = class.name(), links = chain.len(), "translating class");

    let mut accessor_table: IndexMap<String, Accessor, FxBuildHasher> = IndexMap::default();
    for link in &chain {
        for (name, accessor) in link.prototype().own_accessors() {
            // the spec format cannot carry accessors; divert them, most
            // derived definition winning per name
            accessor_table.insert(name, accessor);
        }
        let source = Value::map(PropMap::from_iter(link.prototype().own_entries()));
        merge::mix_spec_into_component(&mut spec, &source, MergeOrigin::ChainLink, framework)?;
    }

    fold_static_surface(&mut spec, class, framework)?;
    let display_name = spec.name_for_errors();

    let NativeComponent {
        create,
        prototype,
        statics,
    } = framework.build_native_component(spec)?;

    for (name, accessor) in accessor_table {
        prototype.define_accessor(name, accessor);
    }

    let constructors: Vec<Method> = chain.iter().filter_map(|link| link.constructor()).collect();

    Ok(ComponentFactory {
        display_name,
        native: create,
        constructors,
        statics,
        prototype,
    })
}

/// Fold the class's own static surface into the spec, then expand its
/// mixins.
///
/// `mixins` and `propTypes` get their dedicated handling whether they were
/// declared through the typed builder calls or as free statics; everything
/// else goes through the static merger. The class's own methods were merged
/// first, so they take lowest precedence relative to the mixins.
fn fold_static_surface(
    spec: &mut ComponentSpec,
    class: &Rc<ClassDef>,
    framework: &dyn SpecFramework,
) -> SpecResult<()> {
    let class_name = spec.name_for_errors();

    let own_prop_types = class.prop_types();
    for (name, validator) in &own_prop_types {
        if !validator.is_callable() {
            return Err(SpecError::InvalidValidator {
                location: TypeLocation::Prop,
                name: name.clone(),
                class_name,
            });
        }
    }
    spec.prop_types.extend(own_prop_types);

    let mut mixins = class.mixins();
    let mut free_statics = PropMap::default();
    for (name, value) in class.statics() {
        match name.as_str() {
            "mixins" => {
                let list = value.as_list().ok_or_else(|| SpecError::InvalidMixin {
                    detail: "the `mixins` static must be a list of spec objects".to_string(),
                })?;
                mixins.extend(list.borrow().iter().cloned());
            }
            "propTypes" => {
                let validators =
                    merge::validate_type_def(&spec.name_for_errors(), &value, TypeLocation::Prop)?;
                spec.prop_types.extend(validators);
            }
            _ => {
                free_statics.insert(name, value);
            }
        }
    }
    statics::merge_statics(spec, &free_statics)?;

    for mixin in &mixins {
        merge::mix_spec_into_component(spec, mixin, MergeOrigin::Mixin, framework)?;
    }
    Ok(())
}

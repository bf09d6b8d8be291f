//! Framework boundary
//!
//! The adapter programs against this trait without depending on any concrete
//! framework. The framework side implements spec consumption and instance
//! construction; the adapter prepares its input and wraps its output.

use std::rc::Rc;

use crate::error::SpecResult;
use crate::object::{Instance, Prototype};
use crate::spec::ComponentSpec;
use crate::value::{PropMap, Value};

/// A native factory: constructs an instance from a props value.
pub type FactoryFn = Rc<dyn Fn(Value) -> SpecResult<Rc<Instance>>>;

/// The product of the framework's spec-to-factory builder.
pub struct NativeComponent {
    /// Constructs instances of the component
    pub create: FactoryFn,
    /// The component's native prototype, onto which the translator
    /// re-applies diverted accessors
    pub prototype: Rc<Prototype>,
    /// The factory's own static surface
    pub statics: PropMap,
}

/// The spec-consuming component framework, as seen by the adapter.
pub trait SpecFramework {
    /// Build a native component from an assembled spec.
    ///
    /// The spec's method surface is already policy-merged and its auto-bind
    /// registry already populated; the framework installs the methods,
    /// produces per-instance bound closures at construction time, and
    /// returns the factory.
    fn build_native_component(&self, spec: ComponentSpec) -> SpecResult<NativeComponent>;

    /// Whether `value` is a component class (illegal as a mixin)
    fn is_component_class(&self, value: &Value) -> bool {
        matches!(value, Value::Class(_))
    }

    /// Whether `value` is a constructed component instance (illegal as a
    /// mixin)
    fn is_component_instance(&self, value: &Value) -> bool {
        matches!(value, Value::Instance(_))
    }
}

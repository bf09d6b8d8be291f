//! Object model: prototypes, class definitions, and instances
//!
//! The class-based component model is reified as [`ClassDef`] (constructor +
//! prototype + statics). Prototypes form parent-linked chains; method lookup
//! walks the chain, most-derived link first. [`Instance`] is the shared
//! vocabulary type constructed by the spec-consuming framework and handed
//! back through the adapter's wrapping factory.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap};

use crate::error::{SpecError, SpecResult, TypeLocation};
use crate::value::{Method, PropMap, Value};

type AccessorMap = IndexMap<String, Accessor, FxBuildHasher>;

/// A getter/setter pair.
///
/// Accessor descriptors are not representable in the spec format, so the
/// translator collects them into a side table and re-installs them on the
/// native prototype after the framework builds it.
#[derive(Clone, Debug, Default)]
pub struct Accessor {
    /// Invoked on property read, with the instance as receiver
    pub getter: Option<Method>,
    /// Invoked on property write, with the instance as receiver and the
    /// assigned value as the single argument
    pub setter: Option<Method>,
}

/// One link in a prototype chain.
///
/// Owns its methods, accessors, and (lazily) an auto-bind map. The auto-bind
/// map is inherited copy-on-first-own-write: a link that does not yet own a
/// map shallow-copies its parent's entries down before adding its own, and
/// the parent is never mutated.
pub struct Prototype {
    parent: Option<Rc<Prototype>>,
    methods: RefCell<PropMap>,
    accessors: RefCell<AccessorMap>,
    auto_bind: RefCell<Option<FxHashMap<String, Method>>>,
}

impl Prototype {
    /// Create a root prototype with no parent
    pub fn root() -> Rc<Prototype> {
        Rc::new(Prototype {
            parent: None,
            methods: RefCell::new(PropMap::default()),
            accessors: RefCell::new(AccessorMap::default()),
            auto_bind: RefCell::new(None),
        })
    }

    /// Create a prototype whose lookups fall back to `parent`
    pub fn child_of(parent: Rc<Prototype>) -> Rc<Prototype> {
        Rc::new(Prototype {
            parent: Some(parent),
            methods: RefCell::new(PropMap::default()),
            accessors: RefCell::new(AccessorMap::default()),
            auto_bind: RefCell::new(None),
        })
    }

    /// Parent link, if any
    pub fn parent(&self) -> Option<&Rc<Prototype>> {
        self.parent.as_ref()
    }

    /// Define (or replace) an own property
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.methods.borrow_mut().insert(name.into(), value);
    }

    /// Define (or replace) an own accessor
    pub fn define_accessor(&self, name: impl Into<String>, accessor: Accessor) {
        self.accessors.borrow_mut().insert(name.into(), accessor);
    }

    /// Own property by name
    pub fn own(&self, name: &str) -> Option<Value> {
        self.methods.borrow().get(name).cloned()
    }

    /// Whether this link itself defines `name` (property or accessor)
    pub fn owns(&self, name: &str) -> bool {
        self.methods.borrow().contains_key(name) || self.accessors.borrow().contains_key(name)
    }

    /// Own properties in definition order
    pub fn own_entries(&self) -> Vec<(String, Value)> {
        self.methods
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Own accessors in definition order
    pub fn own_accessors(&self) -> Vec<(String, Accessor)> {
        self.accessors
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Resolve a property through the chain, most-derived link first
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.methods.borrow().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Resolve an accessor through the chain
    pub fn lookup_accessor(&self, name: &str) -> Option<Accessor> {
        if let Some(accessor) = self.accessors.borrow().get(name) {
            return Some(accessor.clone());
        }
        self.parent.as_ref().and_then(|p| p.lookup_accessor(name))
    }

    /// Whether `name` resolves anywhere on the chain
    pub fn has(&self, name: &str) -> bool {
        self.owns(name) || self.parent.as_ref().is_some_and(|p| p.has(name))
    }

    /// Register a method in the auto-bind map.
    ///
    /// On the first own write the parent's entries are shallow-copied down;
    /// the parent map is never touched afterwards.
    pub fn register_auto_bind(&self, name: impl Into<String>, method: Method) {
        let mut slot = self.auto_bind.borrow_mut();
        if slot.is_none() {
            let mut own = FxHashMap::default();
            if let Some(parent) = &self.parent {
                for (k, v) in parent.auto_bind_entries() {
                    own.insert(k, v);
                }
            }
            *slot = Some(own);
        }
        if let Some(own) = slot.as_mut() {
            own.insert(name.into(), method);
        }
    }

    /// Drop a method from the auto-bind map (copying the parent's entries
    /// down first, like [`Prototype::register_auto_bind`])
    pub fn unregister_auto_bind(&self, name: &str) {
        let mut slot = self.auto_bind.borrow_mut();
        if slot.is_none() {
            let mut own = FxHashMap::default();
            if let Some(parent) = &self.parent {
                for (k, v) in parent.auto_bind_entries() {
                    own.insert(k, v);
                }
            }
            *slot = Some(own);
        }
        if let Some(own) = slot.as_mut() {
            own.remove(name);
        }
    }

    /// Whether this link owns its auto-bind map (as opposed to inheriting
    /// the parent's view)
    pub fn owns_auto_bind_map(&self) -> bool {
        self.auto_bind.borrow().is_some()
    }

    /// The auto-bind map visible from this link: its own map if it has one,
    /// otherwise the nearest ancestor's
    pub fn auto_bind_entries(&self) -> Vec<(String, Method)> {
        if let Some(own) = self.auto_bind.borrow().as_ref() {
            return own.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        }
        self.parent
            .as_ref()
            .map(|p| p.auto_bind_entries())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prototype")
            .field("methods", &self.methods.borrow().len())
            .field("accessors", &self.accessors.borrow().len())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

/// A class-based component definition: constructor + prototype + statics.
///
/// Read-only to the translator; translation assembles a fresh spec and never
/// mutates the definition itself. The only sanctioned mutations are the
/// definition-time builder calls below ([`ClassDef::define_method`],
/// [`ClassDef::apply_mixins`], ...).
pub struct ClassDef {
    name: String,
    parent: Option<Rc<ClassDef>>,
    prototype: Rc<Prototype>,
    constructor: RefCell<Option<Method>>,
    mixins: RefCell<Vec<Value>>,
    prop_types: RefCell<PropMap>,
    statics: RefCell<PropMap>,
    shared_base: bool,
}

impl ClassDef {
    /// Define a new root class
    pub fn new(name: impl Into<String>) -> Rc<ClassDef> {
        Rc::new(ClassDef {
            name: name.into(),
            parent: None,
            prototype: Prototype::root(),
            constructor: RefCell::new(None),
            mixins: RefCell::new(Vec::new()),
            prop_types: RefCell::new(PropMap::default()),
            statics: RefCell::new(PropMap::default()),
            shared_base: false,
        })
    }

    /// Define a class extending `parent`
    pub fn extends(name: impl Into<String>, parent: &Rc<ClassDef>) -> Rc<ClassDef> {
        Rc::new(ClassDef {
            name: name.into(),
            parent: Some(parent.clone()),
            prototype: Prototype::child_of(parent.prototype.clone()),
            constructor: RefCell::new(None),
            mixins: RefCell::new(Vec::new()),
            prop_types: RefCell::new(PropMap::default()),
            statics: RefCell::new(PropMap::default()),
            shared_base: false,
        })
    }

    /// Define a shared base class.
    ///
    /// The shared base must stay mixin-free: every consumer derives from it,
    /// so [`ClassDef::apply_mixins`] and [`ClassDef::add_prop_types`] reject
    /// it, and the translator skips its (empty) prototype link.
    pub fn shared_base(name: impl Into<String>) -> Rc<ClassDef> {
        Rc::new(ClassDef {
            name: name.into(),
            parent: None,
            prototype: Prototype::root(),
            constructor: RefCell::new(None),
            mixins: RefCell::new(Vec::new()),
            prop_types: RefCell::new(PropMap::default()),
            statics: RefCell::new(PropMap::default()),
            shared_base: true,
        })
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class, if any
    pub fn parent(&self) -> Option<&Rc<ClassDef>> {
        self.parent.as_ref()
    }

    /// The class's own prototype link
    pub fn prototype(&self) -> &Rc<Prototype> {
        &self.prototype
    }

    /// Whether this is the shared base definition
    pub fn is_shared_base(&self) -> bool {
        self.shared_base
    }

    /// Install a method on the prototype
    pub fn define_method(&self, name: impl Into<String>, method: Method) {
        self.prototype.define(name, Value::Function(method));
    }

    /// Install a plain (non-function) prototype property
    pub fn define_value(&self, name: impl Into<String>, value: Value) {
        self.prototype.define(name, value);
    }

    /// Install a getter/setter pair on the prototype
    pub fn define_accessor(
        &self,
        name: impl Into<String>,
        getter: Option<Method>,
        setter: Option<Method>,
    ) {
        self.prototype.define_accessor(name, Accessor { getter, setter });
    }

    /// Set the constructor body (field initializers and default values)
    pub fn set_constructor(&self, body: Method) {
        *self.constructor.borrow_mut() = Some(body);
    }

    /// Constructor body, if any
    pub fn constructor(&self) -> Option<Method> {
        self.constructor.borrow().clone()
    }

    /// Set a static property (free-form; name collisions are resolved at
    /// translation time by the static merger)
    pub fn static_value(&self, name: impl Into<String>, value: Value) {
        self.statics.borrow_mut().insert(name.into(), value);
    }

    /// Append mixins to this definition's mixin list.
    ///
    /// Accumulates across calls. Rejected on the shared base definition and
    /// when called with no mixins at all.
    pub fn apply_mixins(&self, mixins: &[Value]) -> SpecResult<()> {
        if self.shared_base {
            return Err(SpecError::usage(format!(
                "mixins may not be defined on the shared base `{}`",
                self.name
            )));
        }
        if mixins.is_empty() {
            return Err(SpecError::usage("at least one mixin must be provided"));
        }
        self.mixins.borrow_mut().extend_from_slice(mixins);
        Ok(())
    }

    /// Merge validators into this definition's `propTypes`.
    ///
    /// Every entry must be callable. Rejected on the shared base definition.
    pub fn add_prop_types(&self, prop_types: PropMap) -> SpecResult<()> {
        if self.shared_base {
            return Err(SpecError::usage(format!(
                "propTypes may not be defined on the shared base `{}`",
                self.name
            )));
        }
        for (name, validator) in &prop_types {
            if !validator.is_callable() {
                return Err(SpecError::InvalidValidator {
                    location: TypeLocation::Prop,
                    name: name.clone(),
                    class_name: self.name.clone(),
                });
            }
        }
        self.prop_types.borrow_mut().extend(prop_types);
        Ok(())
    }

    /// This definition's own mixin list, in application order
    pub fn mixins(&self) -> Vec<Value> {
        self.mixins.borrow().clone()
    }

    /// This definition's own `propTypes`
    pub fn prop_types(&self) -> PropMap {
        self.prop_types.borrow().clone()
    }

    /// This definition's own free-form statics
    pub fn statics(&self) -> PropMap {
        self.statics.borrow().clone()
    }

    /// The inheritance chain, most-derived first, including `self`
    pub fn chain(self: &Rc<Self>) -> Vec<Rc<ClassDef>> {
        let mut links = vec![self.clone()];
        let mut cursor = self.parent.clone();
        while let Some(link) = cursor {
            cursor = link.parent.clone();
            links.push(link);
        }
        links
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("shared_base", &self.shared_base)
            .field("mixins", &self.mixins.borrow().len())
            .finish()
    }
}

/// A constructed component instance.
///
/// Created by the spec-consuming framework; the adapter's wrapping factory
/// runs the original class constructor against it after construction.
/// Property resolution order: own slot, then accessor (chain), then
/// prototype property (chain).
pub struct Instance {
    display_name: String,
    prototype: Rc<Prototype>,
    props: RefCell<Value>,
    state: RefCell<Value>,
    own: RefCell<PropMap>,
    mounted: Cell<bool>,
}

impl Instance {
    /// Create a fresh, unmounted instance
    pub fn new(display_name: impl Into<String>, prototype: Rc<Prototype>) -> Rc<Instance> {
        Rc::new(Instance {
            display_name: display_name.into(),
            prototype,
            props: RefCell::new(Value::Null),
            state: RefCell::new(Value::Null),
            own: RefCell::new(PropMap::default()),
            mounted: Cell::new(false),
        })
    }

    /// Component display name (for diagnostics)
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The instance's prototype
    pub fn prototype(&self) -> &Rc<Prototype> {
        &self.prototype
    }

    /// Current props
    pub fn props(&self) -> Value {
        self.props.borrow().clone()
    }

    /// Replace props wholesale
    pub fn set_props(&self, props: Value) {
        *self.props.borrow_mut() = props;
    }

    /// Current state
    pub fn state(&self) -> Value {
        self.state.borrow().clone()
    }

    /// Replace state wholesale
    pub fn replace_state(&self, state: Value) {
        *self.state.borrow_mut() = state;
    }

    /// Whether the instance is mounted
    pub fn is_mounted(&self) -> bool {
        self.mounted.get()
    }

    /// Mark the instance mounted or unmounted
    pub fn set_mounted(&self, mounted: bool) {
        self.mounted.set(mounted);
    }

    /// Own slot by name (fields and per-instance bound methods)
    pub fn get_own(&self, name: &str) -> Option<Value> {
        self.own.borrow().get(name).cloned()
    }

    /// Write an own slot
    pub fn set_own(&self, name: impl Into<String>, value: Value) {
        self.own.borrow_mut().insert(name.into(), value);
    }

    /// Read a property: own slot, then accessor getter, then prototype
    pub fn get(self: &Rc<Self>, name: &str) -> SpecResult<Option<Value>> {
        if let Some(v) = self.get_own(name) {
            return Ok(Some(v));
        }
        if let Some(accessor) = self.prototype.lookup_accessor(name) {
            return match accessor.getter {
                Some(getter) => getter.call(Some(self), &[]).map(Some),
                None => Ok(Some(Value::Null)),
            };
        }
        Ok(self.prototype.lookup(name))
    }

    /// Write a property: accessor setter if one exists, else an own slot
    pub fn set(self: &Rc<Self>, name: &str, value: Value) -> SpecResult<()> {
        if let Some(accessor) = self.prototype.lookup_accessor(name) {
            return match accessor.setter {
                Some(setter) => setter.call(Some(self), &[value]).map(|_| ()),
                None => Err(SpecError::runtime(format!(
                    "property `{}` of `{}` has no setter",
                    name, self.display_name
                ))),
            };
        }
        self.set_own(name, value);
        Ok(())
    }

    /// Resolve and invoke a method with this instance as receiver.
    ///
    /// Bound methods ignore the passed receiver; their own stays fixed.
    pub fn call_method(self: &Rc<Self>, name: &str, args: &[Value]) -> SpecResult<Value> {
        match self.get(name)? {
            Some(callable) => callable.call(Some(self), args),
            None => Err(SpecError::runtime(format!(
                "`{}` has no method `{}`",
                self.display_name, name
            ))),
        }
    }

    /// Whether `name` resolves to anything callable or not
    pub fn has(self: &Rc<Self>, name: &str) -> bool {
        self.own.borrow().contains_key(name) || self.prototype.has(name)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("display_name", &self.display_name)
            .field("mounted", &self.mounted.get())
            .finish()
    }
}

//! Dynamic value representation
//!
//! The two component models being bridged are both dynamically shaped, so the
//! adapter operates on a small dynamic value model: plain data, ordered
//! property maps, callable methods, and references to classes and instances.
//!
//! Everything here is single-threaded by design. Translation runs once per
//! class, synchronously, with no suspension points, so values are shared with
//! `Rc` and mutated through `RefCell`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::{SpecError, SpecResult};
use crate::object::{ClassDef, Instance};

/// Insertion-ordered property map.
///
/// Key order is semantic: merge sources are processed in definition order and
/// chained hooks execute in the order their sources were merged.
pub type PropMap = IndexMap<String, Value, FxBuildHasher>;

/// Native method implementation.
///
/// The receiver is `None` when the callable has no instance to speak of
/// (statics, prop validators).
pub type NativeFn = Rc<dyn Fn(Option<&Rc<Instance>>, &[Value]) -> SpecResult<Value>>;

/// A callable method value.
///
/// Carries the "do not auto-bind" marker consulted by the auto-binder: a
/// marked method stays on the prototype instead of being bound per-instance.
#[derive(Clone)]
pub struct Method {
    func: NativeFn,
    no_autobind: bool,
}

impl Method {
    /// Create a method from a native closure
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(Option<&Rc<Instance>>, &[Value]) -> SpecResult<Value> + 'static,
    {
        Self {
            func: Rc::new(func),
            no_autobind: false,
        }
    }

    /// Create a method carrying the "do not auto-bind" marker
    pub fn no_bind<F>(func: F) -> Self
    where
        F: Fn(Option<&Rc<Instance>>, &[Value]) -> SpecResult<Value> + 'static,
    {
        Self {
            func: Rc::new(func),
            no_autobind: true,
        }
    }

    /// Whether this method is exempt from auto-binding
    pub fn is_no_autobind(&self) -> bool {
        self.no_autobind
    }

    /// Invoke the method
    pub fn call(&self, receiver: Option<&Rc<Instance>>, args: &[Value]) -> SpecResult<Value> {
        (self.func)(receiver, args)
    }

    /// Identity comparison (two methods are equal only if they share the
    /// same underlying closure)
    pub fn ptr_eq(&self, other: &Method) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("no_autobind", &self.no_autobind)
            .finish_non_exhaustive()
    }
}

/// A method whose receiver is permanently fixed to one instance.
///
/// Produced during instance construction for every method registered in the
/// prototype's auto-bind map. Holds the receiver weakly so an instance and
/// its own bound methods do not keep each other alive.
pub struct BoundMethod {
    name: String,
    receiver: Weak<Instance>,
    method: Method,
}

impl BoundMethod {
    /// Bind `method` to `receiver` under `name`
    pub fn new(name: impl Into<String>, receiver: &Rc<Instance>, method: Method) -> Self {
        Self {
            name: name.into(),
            receiver: Rc::downgrade(receiver),
            method,
        }
    }

    /// Name the method was bound under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke with the fixed receiver, regardless of call site
    pub fn call(&self, args: &[Value]) -> SpecResult<Value> {
        let receiver = self.receiver.upgrade().ok_or_else(|| SpecError::DeadReceiver {
            method: self.name.clone(),
        })?;
        self.method.call(Some(&receiver), args)
    }
}

impl fmt::Debug for BoundMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundMethod({})", self.name)
    }
}

/// Dynamic value
#[derive(Clone, Debug)]
pub enum Value {
    /// Absent / no value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Ordered list
    List(Rc<RefCell<Vec<Value>>>),
    /// Ordered string-keyed map
    Map(Rc<RefCell<PropMap>>),
    /// Unbound callable
    Function(Method),
    /// Instance-bound callable
    Bound(Rc<BoundMethod>),
    /// A component class definition
    Class(Rc<ClassDef>),
    /// A constructed component instance
    Instance(Rc<Instance>),
}

impl Value {
    /// Build a string value
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(Rc::from(s.into()))
    }

    /// Build a list value
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Build a map value
    pub fn map(entries: PropMap) -> Self {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    /// Build a function value from a native closure
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(Option<&Rc<Instance>>, &[Value]) -> SpecResult<Value> + 'static,
    {
        Value::Function(Method::new(f))
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value can be invoked
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Bound(_))
    }

    /// Extract string contents
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract integer contents
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract boolean contents
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract the shared map cell
    pub fn as_map(&self) -> Option<&Rc<RefCell<PropMap>>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Extract the shared list cell
    pub fn as_list(&self) -> Option<&Rc<RefCell<Vec<Value>>>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Extract the method of a function value
    pub fn as_function(&self) -> Option<&Method> {
        match self {
            Value::Function(m) => Some(m),
            _ => None,
        }
    }

    /// Invoke this value as a callable
    pub fn call(&self, receiver: Option<&Rc<Instance>>, args: &[Value]) -> SpecResult<Value> {
        match self {
            Value::Function(m) => m.call(receiver, args),
            Value::Bound(b) => b.call(args),
            other => Err(SpecError::runtime(format!(
                "value of type `{}` is not callable",
                other.type_name()
            ))),
        }
    }

    /// Get type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
            Value::Bound(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Map(a), Value::Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v == w))
            }
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Bound(a), Value::Bound(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => write!(f, "[list of {}]", items.borrow().len()),
            Value::Map(entries) => write!(f, "[map of {}]", entries.borrow().len()),
            Value::Function(_) | Value::Bound(_) => write!(f, "[function]"),
            Value::Class(c) => write!(f, "[class {}]", c.name()),
            Value::Instance(i) => write!(f, "[instance of {}]", i.display_name()),
        }
    }
}

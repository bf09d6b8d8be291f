//! Auto-binder
//!
//! Registers the intent to bind a method's receiver at construction time.
//! The registry lives on the prototype (inherited copy-on-first-own-write);
//! physically producing one bound closure per instance per registered method
//! happens on the framework side during instance construction.

use std::rc::Rc;

use crate::object::{ClassDef, Prototype};
use crate::policy;
use crate::value::{Method, Value};

/// Register `method` for per-instance binding and install it on `prototype`.
pub fn bind_method(prototype: &Rc<Prototype>, name: &str, method: Method) {
    prototype.register_auto_bind(name, method.clone());
    prototype.define(name, Value::Function(method));
}

/// Whether a method named `name` is an auto-bind candidate at all.
///
/// Lifecycle-interface names, framework plumbing, and methods carrying the
/// "do not auto-bind" marker are exempt.
pub fn is_bind_candidate(name: &str, method: &Method) -> bool {
    !policy::is_interface_key(name)
        && !policy::is_framework_method(name)
        && !method.is_no_autobind()
}

/// Apply only the auto-binding step to an already-defined class prototype.
///
/// For callers who assemble specs by other means: every own function
/// property of the class's prototype that is not exempt gets registered in
/// the prototype's auto-bind map.
pub fn auto_bind_methods(class: &ClassDef) {
    let prototype = class.prototype();
    for (name, value) in prototype.own_entries() {
        if let Value::Function(method) = value {
            if is_bind_candidate(&name, &method) {
                bind_method(prototype, &name, method);
            }
        }
    }
}

//! The assembling component spec
//!
//! A [`ComponentSpec`] is the single mutable aggregate built up during
//! translation: one fresh value per `translate` call, fed source by source
//! through the merger, and finally handed to the framework's native builder.
//! The source class definition is never mutated.

use std::rc::Rc;

use crate::object::Prototype;
use crate::value::PropMap;

/// A plain component spec in the shape the framework's builder consumes.
pub struct ComponentSpec {
    /// Component display name (defaults to the class name at translation)
    pub display_name: Option<String>,
    /// The assembling method surface, including the auto-bind registry
    pub prototype: Rc<Prototype>,
    /// Prop validators, name to callable
    pub prop_types: PropMap,
    /// Context validators
    pub context_types: PropMap,
    /// Child context validators
    pub child_context_types: PropMap,
    /// Free-form statics for the produced factory
    pub statics: PropMap,
}

impl ComponentSpec {
    /// Create an empty spec
    pub fn new() -> Self {
        Self {
            display_name: None,
            prototype: Prototype::root(),
            prop_types: PropMap::default(),
            context_types: PropMap::default(),
            child_context_types: PropMap::default(),
            statics: PropMap::default(),
        }
    }

    /// Whether the spec's method surface already defines `key`
    pub fn owns(&self, key: &str) -> bool {
        self.prototype.owns(key)
    }

    /// Display name for error reporting
    pub fn name_for_errors(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| "Component".to_string())
    }
}

impl Default for ComponentSpec {
    fn default() -> Self {
        Self::new()
    }
}

//! Adapter errors
//!
//! Every failure in this crate is a synchronous, definition-time invariant
//! violation. Translation either fully succeeds or aborts with one of these
//! errors before a native factory is built.

use std::fmt;
use thiserror::Error;

/// Where a type validator was declared (`propTypes`, `contextTypes`, or
/// `childContextTypes`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLocation {
    /// `propTypes`
    Prop,
    /// `contextTypes`
    Context,
    /// `childContextTypes`
    ChildContext,
}

impl fmt::Display for TypeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeLocation::Prop => write!(f, "prop"),
            TypeLocation::Context => write!(f, "context"),
            TypeLocation::ChildContext => write!(f, "childContext"),
        }
    }
}

/// Errors raised while merging specs, binding methods, or translating a class
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpecError {
    /// A key governed by a define-once policy (or no policy at all) was
    /// supplied by more than one source
    #[error(
        "`{key}` is defined more than once on `{class_name}`; \
         this conflict may be due to a mixin"
    )]
    DuplicateDefinition {
        /// Offending spec key
        key: String,
        /// Display name of the component being assembled
        class_name: String,
    },

    /// A framework-reserved method was redefined by a class or mixin
    #[error(
        "`{key}` on `{class_name}` overlaps a framework method and may not \
         be redefined"
    )]
    ReservedOverride {
        /// Offending spec key
        key: String,
        /// Display name of the component being assembled
        class_name: String,
    },

    /// A component class or instance was supplied where a plain mixin object
    /// was expected
    #[error("invalid mixin: {detail}")]
    InvalidMixin {
        /// Description of the illegal value
        detail: String,
    },

    /// Illegal use of the adapter API
    #[error("{message}")]
    Usage {
        /// Description of the illegal usage
        message: String,
    },

    /// A `propTypes`/`contextTypes`/`childContextTypes` entry was not callable
    #[error("`{class_name}`: {location} type `{name}` is invalid; it must be a function")]
    InvalidValidator {
        /// Which type table the entry came from
        location: TypeLocation,
        /// Name of the invalid entry
        name: String,
        /// Display name of the component being assembled
        class_name: String,
    },

    /// Two statics with the same name where at least one is not a function
    #[error(
        "`{name}` is defined as a static more than once; only function \
         statics may be redefined (they are chained)"
    )]
    StaticConflict {
        /// Name of the colliding static
        name: String,
    },

    /// Two merged hook results carried the same key
    #[error("tried to merge two returned objects with the same key: `{key}`")]
    MergeCollision {
        /// The duplicated key
        key: String,
    },

    /// A bound method was invoked after its instance was dropped
    #[error("bound method `{method}` outlived its instance")]
    DeadReceiver {
        /// Name of the bound method
        method: String,
    },

    /// Runtime error
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl SpecError {
    /// Shorthand for a [`SpecError::Usage`] error
    pub fn usage(message: impl Into<String>) -> Self {
        SpecError::Usage {
            message: message.into(),
        }
    }

    /// Shorthand for a [`SpecError::Runtime`] error
    pub fn runtime(message: impl Into<String>) -> Self {
        SpecError::Runtime(message.into())
    }
}

/// Adapter result
pub type SpecResult<T> = Result<T, SpecError>;

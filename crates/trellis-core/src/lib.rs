//! Trellis adapter core
//!
//! This crate lets components written as classes (constructor + prototype +
//! statics) run on a component framework that consumes plain spec objects
//! built by a factory function. It provides:
//! - Dynamic value and object model (values, prototypes, classes, instances)
//! - Policy table driving per-key merge semantics
//! - Spec merger with mixin composition and conflict policies
//! - Static merger with function-chaining semantics
//! - Auto-binder (per-prototype registry, bound at construction time)
//! - Class-to-spec translator producing drop-in native factories
//!
//! The framework itself (rendering, mounting, instance construction) is an
//! external collaborator consumed through the [`SpecFramework`] trait; a
//! reference implementation lives in the `trellis-runtime` crate.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod autobind;
pub mod error;
pub mod framework;
pub mod merge;
pub mod object;
pub mod policy;
pub mod spec;
pub mod statics;
pub mod translate;
pub mod value;

pub use autobind::auto_bind_methods;
pub use error::{SpecError, SpecResult, TypeLocation};
pub use framework::{FactoryFn, NativeComponent, SpecFramework};
pub use merge::{mix_spec_into_component, MergeOrigin};
pub use object::{Accessor, ClassDef, Instance, Prototype};
pub use policy::SpecPolicy;
pub use spec::ComponentSpec;
pub use statics::merge_statics;
pub use translate::{translate, ComponentFactory};
pub use value::{BoundMethod, Method, NativeFn, PropMap, Value};

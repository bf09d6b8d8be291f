//! Trellis reference runtime
//!
//! A minimal spec-consuming component runtime implementing the
//! [`trellis_core::SpecFramework`] boundary: native component building,
//! instance construction (default props, prop validation, per-instance
//! auto-binding, initial state), and synchronous lifecycle dispatch.
//!
//! There is no rendering engine here: "rendering" means invoking the
//! component's `render` hook and handing back its value. The runtime exists
//! so the adapter can be exercised end-to-end.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod lifecycle;
pub mod runtime;

pub use lifecycle::{mount, perform_update, receive_props, render, set_state, unmount};
pub use runtime::Runtime;

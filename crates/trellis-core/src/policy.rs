//! Merge policy table
//!
//! A static mapping from lifecycle-interface key to merge policy, plus the
//! set of framework-owned plumbing methods that may never be redefined.
//! Pure data; the merger and auto-binder consult it.

use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

/// How repeated definitions of a spec key are reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecPolicy {
    /// Exactly one source across the whole merge may define the key
    DefineOnce,
    /// Any number of sources may define the key; implementations are chained
    /// in source order and their results discarded
    DefineMany,
    /// Any number of sources may define the key; mapping results are merged,
    /// erroring on a key carried by more than one result
    DefineManyMerged,
    /// Redefinition of a framework base method, allowed for this key alone
    OverrideBase,
}

/// The lifecycle interface: spec keys with a fixed merge policy
static COMPONENT_INTERFACE: Lazy<FxHashMap<&'static str, SpecPolicy>> = Lazy::new(|| {
    FxHashMap::from_iter([
        ("mixins", SpecPolicy::DefineMany),
        ("statics", SpecPolicy::DefineMany),
        ("propTypes", SpecPolicy::DefineMany),
        ("contextTypes", SpecPolicy::DefineMany),
        ("childContextTypes", SpecPolicy::DefineMany),
        ("getDefaultProps", SpecPolicy::DefineManyMerged),
        ("getInitialState", SpecPolicy::DefineManyMerged),
        ("getChildContext", SpecPolicy::DefineManyMerged),
        ("render", SpecPolicy::DefineOnce),
        ("componentWillMount", SpecPolicy::DefineMany),
        ("componentDidMount", SpecPolicy::DefineMany),
        ("componentWillReceiveProps", SpecPolicy::DefineMany),
        ("shouldComponentUpdate", SpecPolicy::DefineOnce),
        ("componentWillUpdate", SpecPolicy::DefineMany),
        ("componentDidUpdate", SpecPolicy::DefineMany),
        ("componentWillUnmount", SpecPolicy::DefineMany),
        ("updateComponent", SpecPolicy::OverrideBase),
    ])
});

/// Framework-owned plumbing installed on the base prototype. Redefining any
/// of these is forbidden unless its policy is [`SpecPolicy::OverrideBase`].
static FRAMEWORK_METHODS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    FxHashSet::from_iter([
        "construct",
        "mountComponent",
        "unmountComponent",
        "receiveComponent",
        "performUpdateIfNecessary",
        "updateComponent",
        "setState",
        "replaceState",
        "forceUpdate",
        "isMounted",
        "bindAutoBindMethods",
        "checkPropTypes",
        "processContext",
        "processChildContext",
    ])
});

/// Merge policy for `key`, if it is part of the lifecycle interface
pub fn policy_of(key: &str) -> Option<SpecPolicy> {
    COMPONENT_INTERFACE.get(key).copied()
}

/// Whether `key` is a lifecycle-interface key (and therefore exempt from
/// auto-binding)
pub fn is_interface_key(key: &str) -> bool {
    COMPONENT_INTERFACE.contains_key(key)
}

/// Whether `key` names framework-owned plumbing
pub fn is_framework_method(key: &str) -> bool {
    FRAMEWORK_METHODS.contains(key)
}

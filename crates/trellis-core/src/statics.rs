//! Static merger
//!
//! Merges static (class-level) properties across sources. Same-named
//! function statics are chained, existing body first; any other name
//! collision is an error. Statics are not lifecycle-governed, so this is
//! independent of the policy table.

use crate::error::{SpecError, SpecResult};
use crate::merge::create_chained_function;
use crate::spec::ComponentSpec;
use crate::value::{PropMap, Value};

/// Merge `statics` into the spec's static surface.
pub fn merge_statics(spec: &mut ComponentSpec, statics: &PropMap) -> SpecResult<()> {
    for (name, property) in statics {
        if property.is_null() {
            continue;
        }
        let merged = match spec.statics.get(name) {
            None => property.clone(),
            Some(existing) => match (existing.as_function(), property.as_function()) {
                (Some(one), Some(two)) => {
                    Value::Function(create_chained_function(one.clone(), two.clone()))
                }
                _ => return Err(SpecError::StaticConflict { name: name.clone() }),
            },
        };
        spec.statics.insert(name.clone(), merged);
    }
    Ok(())
}

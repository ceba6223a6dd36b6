//! Subtarget catalog and resolution.
//!
//! Subtargets are declared through program metadata. Resolution scans the
//! declarations in order and keeps the last match, so a later declaration can
//! override an earlier one by reusing its name or alias.

use javelin_core::error::{Error, Result};
use javelin_core::model::{Metadata, ProgramModel, SubtargetSpec};

/// All declared subtargets, flattening list-valued declarations, in
/// metadata declaration order.
pub fn available_subtargets(model: &ProgramModel) -> Vec<&SubtargetSpec> {
    let mut specs = Vec::new();
    for metadata in model.all_metadata() {
        match metadata {
            Metadata::Subtarget(spec) => specs.push(spec),
            Metadata::Subtargets(list) => specs.extend(list.iter()),
            _ => {}
        }
    }
    specs
}

/// Resolve a requested subtarget by canonical name or alias.
///
/// Last match wins. Fails with [`Error::UnknownSubtarget`] when nothing
/// matches; there is no default fallback.
pub fn resolve(model: &ProgramModel, requested: &str) -> Result<SubtargetSpec> {
    available_subtargets(model)
        .into_iter()
        .filter(|spec| spec.name == requested || spec.aliases.iter().any(|a| a == requested))
        .next_back()
        .cloned()
        .ok_or_else(|| Error::UnknownSubtarget(requested.to_string()))
}

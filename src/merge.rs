//! Combining global fragments with the fragments local to one deployment.
//!
//! The merge is a stable concatenation: every global fragment, in file order,
//! followed by every local fragment, in file order. Nothing is sorted,
//! deduplicated or overridden. When a global and a local fragment share a
//! name, both end up in the generated file as two blocks with the same
//! label; [`duplicate_names`] lets callers report that.

use std::collections::BTreeSet;

use crate::terragrunt::{DependencyConfig, IncludeConfig};

/// A fragment identified by its block label.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for IncludeConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for DependencyConfig {
    fn name(&self) -> &str {
        &self.name
    }
}

/// `global ++ local`, cloning both sides.
pub fn concat<T: Clone>(global: &[T], local: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(global.len() + local.len());
    merged.extend_from_slice(global);
    merged.extend_from_slice(local);
    merged
}

pub fn merge_includes(global: &[IncludeConfig], local: &[IncludeConfig]) -> Vec<IncludeConfig> {
    concat(global, local)
}

pub fn merge_dependencies(
    global: &[DependencyConfig],
    local: &[DependencyConfig],
) -> Vec<DependencyConfig> {
    concat(global, local)
}

/// Names appearing more than once, in order of their second occurrence.
pub fn duplicate_names<T: Named>(fragments: &[T]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut duplicates = Vec::new();
    for fragment in fragments {
        let name = fragment.name();
        if !seen.insert(name) && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_string());
        }
    }
    duplicates
}

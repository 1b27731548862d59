//! Response key synthesis.
//!
//! Every answer slot of a form is addressed by one string key:
//!
//! * a field's base identity is its persisted id, or
//!   `"<parent path>-<name with whitespace runs replaced by '_'>"` when it has none;
//! * descending into rule `r`, child `c` extends the parent path to
//!   `"<parent base>-rule<r>-field<c>"`;
//! * a single-typed field's slot key is its base identity, a multi-typed
//!   field's slot keys are `"<base>-<type>"`.
//!
//! Keys depend only on the field, its branch path from the root and the slot
//! type, never on sibling branches or traversal order.

use crate::schema::{BranchStep, FieldNode, FieldPath, FieldType, FieldTypes, Form};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

mod catalog;

pub use catalog::{CatalogEntry, KeyCatalog};

/// The address of one answer slot in the response store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseKey(String);

impl ResponseKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResponseKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResponseKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for ResponseKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Replaces every run of whitespace with a single underscore.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// The base identity of a field reached through `parent_path` (empty for roots).
pub fn base_identity(node: &FieldNode, parent_path: &str) -> String {
    match node.id {
        Some(id) => id.to_string(),
        None => format!("{}-{}", parent_path, sanitize_name(&node.name)),
    }
}

/// The parent path handed to the `step.child`-th field of rule `step.rule`.
pub fn branch_path(parent_base: &str, step: BranchStep) -> String {
    format!("{}-rule{}-field{}", parent_base, step.rule, step.child)
}

/// The slot key of `field_type` on a field with the given base identity.
pub fn slot_key(base: &str, types: &FieldTypes, field_type: FieldType) -> ResponseKey {
    if types.is_multi() {
        ResponseKey(format!("{}-{}", base, field_type))
    } else {
        ResponseKey(base.to_string())
    }
}

/// All slot keys of a field, primary type first.
pub fn slot_keys(node: &FieldNode, base: &str) -> Vec<(FieldType, ResponseKey)> {
    node.types
        .iter()
        .map(|t| (t, slot_key(base, &node.types, t)))
        .collect()
}

/// Resolves the base identity of the field at `path`.
///
/// Follows the raw rule lists, so it also names fields that traversal would
/// never reach. Returns `None` when the path does not resolve.
pub fn resolve_base(form: &Form, path: &FieldPath) -> Option<String> {
    let mut node = form.fields.get(path.root_index())?;
    let mut base = base_identity(node, "");
    for step in path.steps() {
        node = node.rules.get(step.rule)?.children.get(step.child)?;
        base = base_identity(node, &branch_path(&base, *step));
    }
    Some(base)
}

/// Synthesizes the key of the `field_type` slot of the field at `path`.
pub fn synthesize(form: &Form, path: &FieldPath, field_type: FieldType) -> Option<ResponseKey> {
    let node = form.node(path)?;
    if !node.types.contains(field_type) {
        return None;
    }
    let base = resolve_base(form, path)?;
    Some(slot_key(&base, &node.types, field_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(sanitize_name("Defect  Description"), "Defect_Description");
        assert_eq!(sanitize_name(" Lead\tgap "), "_Lead_gap_");
        assert_eq!(sanitize_name("Plain"), "Plain");
    }

    #[test]
    fn branch_path_format() {
        let step = BranchStep { rule: 2, child: 5 };
        assert_eq!(branch_path("7", step), "7-rule2-field5");
    }
}

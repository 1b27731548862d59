use super::{ResponseKey, base_identity, branch_path, slot_keys};
use crate::schema::{FieldPath, FieldType, Form};
use ahash::AHashMap;
use itertools::Itertools;

/// One answer slot the form can ever materialize.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub key: ResponseKey,
    pub path: FieldPath,
    pub field_type: FieldType,
    pub field_name: String,
}

/// Every slot key of a form across all honored branches, whether or not the
/// branch is currently active.
#[derive(Debug, Clone, Default)]
pub struct KeyCatalog {
    entries: Vec<CatalogEntry>,
    index: AHashMap<ResponseKey, Vec<usize>>,
}

impl KeyCatalog {
    pub fn build(form: &Form) -> Self {
        let mut catalog = Self::default();
        // Base identities are derived top-down, so keep them per path.
        let mut bases: AHashMap<FieldPath, String> = AHashMap::new();

        form.visit(|path, node| {
            let parent_path = match path.parent() {
                Some((parent, step)) => bases
                    .get(&parent)
                    .map(|parent_base| branch_path(parent_base, step))
                    .unwrap_or_default(),
                None => String::new(),
            };
            let base = base_identity(node, &parent_path);
            for (field_type, key) in slot_keys(node, &base) {
                catalog
                    .index
                    .entry(key.clone())
                    .or_default()
                    .push(catalog.entries.len());
                catalog.entries.push(CatalogEntry {
                    key,
                    path: path.clone(),
                    field_type,
                    field_name: node.name.clone(),
                });
            }
            bases.insert(path.clone(), base);
        });

        catalog
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.index
            .get(key)
            .and_then(|positions| positions.first())
            .map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys synthesized for more than one slot, sorted.
    pub fn collisions(&self) -> Vec<ResponseKey> {
        self.index
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(key, _)| key.clone())
            .sorted()
            .collect()
    }
}

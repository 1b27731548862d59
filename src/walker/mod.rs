//! Traversal of the conditional field tree.
//!
//! The walker reads the live response store and decides which fields are
//! active: every root, plus the children of the single matching rule of each
//! active conditional field. The result is a pure function of the form and the
//! store snapshot.

use crate::key::{ResponseKey, base_identity, branch_path, slot_keys};
use crate::schema::{BranchStep, FieldNode, FieldPath, FieldType, Form};
use crate::store::{ResponseRecord, ResponseStore};
use ahash::AHashMap;
use log::debug;

mod display;

pub use display::DisplayTree;

/// A field that is reachable given the current answers.
#[derive(Debug, Clone)]
pub struct ActiveNode<'f> {
    pub path: FieldPath,
    pub node: &'f FieldNode,
    pub base: String,
    /// Slot keys, primary type first.
    pub slots: Vec<(FieldType, ResponseKey)>,
    /// Index of the rule whose children are active beneath this field.
    pub matched_rule: Option<usize>,
    pub depth: usize,
}

impl ActiveNode<'_> {
    /// The key of the slot whose answer drives branching.
    pub fn primary_key(&self) -> &ResponseKey {
        // `slot_keys` yields the primary type first and never an empty list.
        &self.slots[0].1
    }

    pub fn key_for(&self, field_type: FieldType) -> Option<&ResponseKey> {
        self.slots
            .iter()
            .find(|(t, _)| *t == field_type)
            .map(|(_, key)| key)
    }
}

/// The active fields of a form in pre-order.
#[derive(Debug, Clone, Default)]
pub struct ActiveTree<'f> {
    nodes: Vec<ActiveNode<'f>>,
    index: AHashMap<ResponseKey, (usize, FieldType)>,
}

impl<'f> ActiveTree<'f> {
    fn push(&mut self, node: ActiveNode<'f>) {
        let position = self.nodes.len();
        for (field_type, key) in &node.slots {
            self.index.insert(key.clone(), (position, *field_type));
        }
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[ActiveNode<'f>] {
        &self.nodes
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// The active field owning `key`, with the type of that slot.
    pub fn slot(&self, key: &str) -> Option<(&ActiveNode<'f>, FieldType)> {
        self.index
            .get(key)
            .map(|&(position, field_type)| (&self.nodes[position], field_type))
    }

    /// Every active slot key in traversal order.
    pub fn keys(&self) -> impl Iterator<Item = &ResponseKey> {
        self.nodes
            .iter()
            .flat_map(|node| node.slots.iter().map(|(_, key)| key))
    }

    pub fn find_by_path(&self, path: &FieldPath) -> Option<&ActiveNode<'f>> {
        self.nodes.iter().find(|node| &node.path == path)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Values pre-filled into freshly materialized text slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prefill<'a> {
    pub doc_number: Option<&'a str>,
    pub doc_field_patterns: &'a [String],
}

impl<'a> Prefill<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    fn value_for(&self, node: &FieldNode, field_type: FieldType) -> Option<&'a str> {
        if field_type != FieldType::Text {
            return None;
        }
        self.doc_number
            .filter(|_| node.is_doc_number_field(self.doc_field_patterns))
    }
}

pub struct TreeWalker<'f> {
    form: &'f Form,
}

impl<'f> TreeWalker<'f> {
    pub fn new(form: &'f Form) -> Self {
        Self { form }
    }

    /// Computes the active tree for a store snapshot.
    pub fn walk(&self, store: &ResponseStore) -> ActiveTree<'f> {
        let mut tree = ActiveTree::default();
        // (path, node, parent path used for key synthesis)
        let mut stack: Vec<(FieldPath, &'f FieldNode, String)> = self
            .form
            .roots_in_order()
            .map(|(idx, node)| (FieldPath::root(idx), node, String::new()))
            .collect();
        stack.reverse();

        while let Some((path, node, parent_path)) = stack.pop() {
            let base = base_identity(node, &parent_path);
            let slots = slot_keys(node, &base);
            let Some((_, primary)) = slots.first() else {
                continue;
            };
            let captured = store.text(primary.as_str());
            let matched = node.matching_rule(captured);

            if let Some((rule_idx, rule)) = matched {
                debug!(
                    "'{}' matched rule #{} on '{}', activating {} field(s)",
                    node.name,
                    rule_idx,
                    rule.trigger,
                    rule.children.len()
                );
                for (child_idx, child) in rule.children.iter().enumerate().rev() {
                    let step = BranchStep {
                        rule: rule_idx,
                        child: child_idx,
                    };
                    stack.push((
                        path.child(rule_idx, child_idx),
                        child,
                        branch_path(&base, step),
                    ));
                }
            }

            let depth = path.depth();
            tree.push(ActiveNode {
                path,
                node,
                base,
                slots,
                matched_rule: matched.map(|(idx, _)| idx),
                depth,
            });
        }

        tree
    }

    /// Ensures every active slot has a record, seeding subform instance lists.
    ///
    /// Existing records, active or not, are never touched. Returns a store
    /// sharing `store`'s maps when nothing was missing.
    pub fn sync(&self, store: &ResponseStore, prefill: &Prefill<'_>) -> ResponseStore {
        let tree = self.walk(store);
        let mut missing = Vec::new();
        let mut subforms = Vec::new();

        for active in tree.nodes() {
            for (field_type, key) in &active.slots {
                if !store.contains(key.as_str()) {
                    let mut record = ResponseRecord::empty(active.node.id, *field_type);
                    if let Some(value) = prefill.value_for(active.node, *field_type) {
                        debug!("Pre-filling '{}' with document number {}", key, value);
                        record = record.with_text(value);
                    }
                    missing.push((key.clone(), record));
                }
                if *field_type == FieldType::Subform && store.subform(key.as_str()).is_none() {
                    if let Some(spec) = &active.node.options.subform {
                        subforms.push((key.clone(), spec));
                    }
                }
            }
        }

        if !missing.is_empty() {
            debug!("Materializing {} response record(s)", missing.len());
        }
        subforms
            .into_iter()
            .fold(store.with_records(missing), |next, (key, spec)| {
                next.seed_subform(&key, spec)
            })
    }
}

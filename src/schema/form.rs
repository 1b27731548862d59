use super::conversion::{IntoForm, WireForm};
use super::field::{ConditionalRule, FieldNode};
use super::path::FieldPath;
use crate::error::{PathError, SchemaError};
use crate::key::KeyCatalog;
use itertools::Itertools;

/// An inspection form: an ordered list of root fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    /// Root fields in declared order. `FieldPath` root indices refer to this list.
    pub fields: Vec<FieldNode>,
}

impl Form {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldNode) -> Self {
        self.fields.push(field);
        self
    }

    /// Parses a form in the backend's JSON shape.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let wire: WireForm =
            serde_json::from_str(json).map_err(|e| SchemaError::JsonParseError(e.to_string()))?;
        wire.into_form()
    }

    /// Root fields sorted by `order`; ties keep declared order.
    pub fn roots_in_order(&self) -> impl Iterator<Item = (usize, &FieldNode)> {
        self.fields
            .iter()
            .enumerate()
            .sorted_by_key(|(_, field)| field.order)
    }

    /// Visits every field reachable through any honored branch, pre-order.
    pub fn visit(&self, mut f: impl FnMut(&FieldPath, &FieldNode)) {
        let mut stack: Vec<(FieldPath, &FieldNode)> = self
            .roots_in_order()
            .map(|(idx, node)| (FieldPath::root(idx), node))
            .collect();
        stack.reverse();

        while let Some((path, node)) = stack.pop() {
            f(&path, node);
            for (rule_idx, rule) in node.branches().iter().enumerate().rev() {
                for (child_idx, child) in rule.children.iter().enumerate().rev() {
                    stack.push((path.child(rule_idx, child_idx), child));
                }
            }
        }
    }

    /// Checks the structural rules a form designer must respect.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut problem = None;
        self.visit_all(&mut |_, node| {
            if problem.is_some() {
                return;
            }
            problem = validate_node(node).err();
        });
        if let Some(err) = problem {
            return Err(err);
        }

        if let Some(key) = KeyCatalog::build(self).collisions().into_iter().next() {
            return Err(SchemaError::DuplicateKey {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// Like `visit`, but also descends into rules that traversal would ignore.
    fn visit_all(&self, f: &mut impl FnMut(&FieldPath, &FieldNode)) {
        fn recurse(path: FieldPath, node: &FieldNode, f: &mut impl FnMut(&FieldPath, &FieldNode)) {
            f(&path, node);
            for (rule_idx, rule) in node.rules.iter().enumerate() {
                for (child_idx, child) in rule.children.iter().enumerate() {
                    recurse(path.child(rule_idx, child_idx), child, f);
                }
            }
        }
        for (idx, node) in self.fields.iter().enumerate() {
            recurse(FieldPath::root(idx), node, f);
        }
    }

    pub fn node(&self, path: &FieldPath) -> Option<&FieldNode> {
        let mut node = self.fields.get(path.root_index())?;
        for step in path.steps() {
            node = node.rules.get(step.rule)?.children.get(step.child)?;
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &FieldPath) -> Option<&mut FieldNode> {
        let mut node = self.fields.get_mut(path.root_index())?;
        for step in path.steps() {
            node = node.rules.get_mut(step.rule)?.children.get_mut(step.child)?;
        }
        Some(node)
    }

    fn require_node_mut(&mut self, path: &FieldPath) -> Result<&mut FieldNode, PathError> {
        self.node_mut(path).ok_or_else(|| PathError::NodeNotFound {
            path: path.to_string(),
        })
    }

    /// Adds a rule to a choice field and returns its index.
    pub fn add_rule(
        &mut self,
        path: &FieldPath,
        trigger: impl Into<String>,
    ) -> Result<usize, PathError> {
        let node = self.require_node_mut(path)?;
        let primary = node.types.primary();
        if !primary.is_choice() {
            return Err(PathError::NotChoice {
                path: path.to_string(),
                field_type: primary,
            });
        }
        node.has_conditional = true;
        node.rules.push(ConditionalRule::new(trigger, Vec::new()));
        Ok(node.rules.len() - 1)
    }

    pub fn set_trigger(
        &mut self,
        path: &FieldPath,
        rule: usize,
        trigger: impl Into<String>,
    ) -> Result<(), PathError> {
        let node = self.require_node_mut(path)?;
        let target = node.rules.get_mut(rule).ok_or_else(|| PathError::RuleNotFound {
            path: path.to_string(),
            rule,
        })?;
        target.trigger = trigger.into();
        Ok(())
    }

    /// Appends a field to a rule and returns the new field's path.
    pub fn push_child(
        &mut self,
        path: &FieldPath,
        rule: usize,
        child: FieldNode,
    ) -> Result<FieldPath, PathError> {
        let node = self.require_node_mut(path)?;
        let target = node.rules.get_mut(rule).ok_or_else(|| PathError::RuleNotFound {
            path: path.to_string(),
            rule,
        })?;
        target.children.push(child);
        Ok(path.child(rule, target.children.len() - 1))
    }

    /// Removes a rule. A field left with no rules stops being conditional.
    pub fn remove_rule(
        &mut self,
        path: &FieldPath,
        rule: usize,
    ) -> Result<ConditionalRule, PathError> {
        let node = self.require_node_mut(path)?;
        if rule >= node.rules.len() {
            return Err(PathError::RuleNotFound {
                path: path.to_string(),
                rule,
            });
        }
        let removed = node.rules.remove(rule);
        if node.rules.is_empty() {
            node.has_conditional = false;
        }
        Ok(removed)
    }

    /// Removes the field at `path` along with its whole subtree.
    pub fn remove(&mut self, path: &FieldPath) -> Result<FieldNode, PathError> {
        let not_found = || PathError::NodeNotFound {
            path: path.to_string(),
        };
        match path.parent() {
            None => {
                if path.root_index() < self.fields.len() {
                    Ok(self.fields.remove(path.root_index()))
                } else {
                    Err(not_found())
                }
            }
            Some((parent, step)) => {
                let node = self.node_mut(&parent).ok_or_else(not_found)?;
                let rule = node.rules.get_mut(step.rule).ok_or_else(not_found)?;
                if step.child < rule.children.len() {
                    Ok(rule.children.remove(step.child))
                } else {
                    Err(not_found())
                }
            }
        }
    }
}

fn validate_node(node: &FieldNode) -> Result<(), SchemaError> {
    if node.name.trim().is_empty() {
        return Err(SchemaError::MissingName {
            context: "form".to_string(),
        });
    }
    let primary = node.types.primary();
    if !node.rules.is_empty() && !primary.is_choice() {
        return Err(SchemaError::ConditionalOnNonChoice {
            field: node.name.clone(),
            field_type: primary,
        });
    }
    if node.types.iter().any(|t| t.is_choice()) && node.options.choices.is_empty() {
        return Err(SchemaError::MissingChoices {
            field: node.name.clone(),
        });
    }
    Ok(())
}

use super::ResponseKey;
use serde::{Deserialize, Serialize};

/// The live instances of one subform slot.
///
/// Instance ids are handed out from a counter and never reused, so removing
/// an instance leaves the keys of every other instance untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubformInstances {
    ids: Vec<u32>,
    next_id: u32,
}

impl SubformInstances {
    pub fn with_minimum(minimum: usize) -> Self {
        let mut instances = Self::default();
        for _ in 0..minimum {
            instances.push();
        }
        instances
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub(crate) fn push(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.ids.push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: u32) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&existing| existing != id);
        self.ids.len() != before
    }
}

/// Key of the `name` sub-field answer of instance `instance` of a subform slot.
pub fn instance_key(slot: &ResponseKey, instance: u32, name: &str) -> ResponseKey {
    ResponseKey::new(format!("{}_instance_{}_{}", slot, instance, name))
}

/// Splits a sub-field key of `slot` back into `(instance, name)`.
pub fn parse_instance_key<'k>(slot: &ResponseKey, key: &'k str) -> Option<(u32, &'k str)> {
    let rest = key.strip_prefix(slot.as_str())?.strip_prefix("_instance_")?;
    let (id, name) = rest.split_once('_')?;
    Some((id.parse().ok()?, name))
}

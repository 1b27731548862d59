//! The flat response store.
//!
//! Every edit produces a new `ResponseStore` value; the previous value is left
//! untouched. Two stores that share their backing maps compare equal through
//! [`ResponseStore::same_as`], which is how callers detect that nothing changed.

use crate::error::StoreError;
pub use crate::key::ResponseKey;
use crate::schema::SubformSpec;
use ahash::AHashMap;
use itertools::Itertools;
use std::sync::Arc;

mod draft;
mod record;
mod subform;

pub use draft::Draft;
pub use record::{Answer, PassHold, ResponseRecord};
pub use subform::{SubformInstances, instance_key, parse_instance_key};

#[derive(Debug, Clone, Default)]
pub struct ResponseStore {
    records: Arc<AHashMap<ResponseKey, ResponseRecord>>,
    subforms: Arc<AHashMap<ResponseKey, SubformInstances>>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ResponseRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// The text answer held under `key`, if any.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|record| record.answer.as_text())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&ResponseKey, &ResponseRecord)> {
        self.records.iter().sorted_by(|a, b| a.0.cmp(b.0))
    }

    pub fn subform(&self, key: &str) -> Option<&SubformInstances> {
        self.subforms.get(key)
    }

    pub(crate) fn subforms(&self) -> impl Iterator<Item = (&ResponseKey, &SubformInstances)> {
        self.subforms.iter()
    }

    /// True when both values share the same backing maps.
    pub fn same_as(&self, other: &ResponseStore) -> bool {
        Arc::ptr_eq(&self.records, &other.records) && Arc::ptr_eq(&self.subforms, &other.subforms)
    }

    /// Returns a store with `record` placed under `key`.
    pub fn with_record(&self, key: ResponseKey, record: ResponseRecord) -> Self {
        self.with_records([(key, record)])
    }

    /// Returns a store with all given records inserted. Hands back a clone of
    /// `self` sharing its maps when there is nothing to insert.
    pub fn with_records(&self, records: impl IntoIterator<Item = (ResponseKey, ResponseRecord)>) -> Self {
        let mut incoming = records.into_iter().peekable();
        if incoming.peek().is_none() {
            return self.clone();
        }
        let mut next = (*self.records).clone();
        next.extend(incoming);
        Self {
            records: Arc::new(next),
            subforms: Arc::clone(&self.subforms),
        }
    }

    /// Returns a store where the record under `key` has been passed through `edit`.
    pub fn update<F>(&self, key: &str, edit: F) -> Result<Self, StoreError>
    where
        F: FnOnce(&mut ResponseRecord) -> Result<(), StoreError>,
    {
        let mut record = self
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::UnknownKey {
                key: key.to_string(),
            })?;
        edit(&mut record)?;
        Ok(self.with_record(ResponseKey::from(key), record))
    }

    pub(crate) fn with_subform(&self, key: ResponseKey, instances: SubformInstances) -> Self {
        let mut next = (*self.subforms).clone();
        next.insert(key, instances);
        Self {
            records: Arc::clone(&self.records),
            subforms: Arc::new(next),
        }
    }

    /// Adds an instance to the subform under `slot`, creating empty records for
    /// each template field. Returns the new store and the instance id.
    pub fn add_subform_instance(
        &self,
        slot: &ResponseKey,
        spec: &SubformSpec,
    ) -> Result<(Self, u32), StoreError> {
        let mut instances = self
            .subform(slot.as_str())
            .cloned()
            .unwrap_or_else(|| SubformInstances::with_minimum(spec.min_instances));
        if !spec.allows_more(instances.len()) {
            return Err(StoreError::SubformLimit {
                key: slot.to_string(),
                limit: spec.max_instances,
            });
        }
        let id = instances.push();
        let store = self
            .with_subform(slot.clone(), instances)
            .with_records(instance_records(slot, id, spec));
        Ok((store, id))
    }

    /// Removes one subform instance and drops its sub-field answers.
    pub fn remove_subform_instance(
        &self,
        slot: &ResponseKey,
        instance: u32,
        spec: &SubformSpec,
    ) -> Result<Self, StoreError> {
        let mut instances = self
            .subform(slot.as_str())
            .cloned()
            .ok_or_else(|| StoreError::UnknownKey {
                key: slot.to_string(),
            })?;
        if !instances.contains(instance) {
            return Err(StoreError::UnknownInstance {
                key: slot.to_string(),
                instance,
            });
        }
        if instances.len() <= spec.min_instances {
            return Err(StoreError::SubformMinimum {
                key: slot.to_string(),
                minimum: spec.min_instances,
            });
        }
        instances.remove(instance);

        let mut records = (*self.records).clone();
        for field in &spec.fields {
            records.remove(instance_key(slot, instance, &field.name).as_str());
        }
        let mut subforms = (*self.subforms).clone();
        subforms.insert(slot.clone(), instances);
        Ok(Self {
            records: Arc::new(records),
            subforms: Arc::new(subforms),
        })
    }

    /// Creates the instance list of a freshly materialized subform slot.
    pub(crate) fn seed_subform(&self, slot: &ResponseKey, spec: &SubformSpec) -> Self {
        if self.subforms.contains_key(slot) {
            return self.clone();
        }
        let instances = SubformInstances::with_minimum(spec.min_instances);
        let records: Vec<_> = instances
            .ids()
            .iter()
            .flat_map(|&id| instance_records(slot, id, spec))
            .collect();
        self.with_subform(slot.clone(), instances)
            .with_records(records)
    }
}

fn instance_records(
    slot: &ResponseKey,
    instance: u32,
    spec: &SubformSpec,
) -> Vec<(ResponseKey, ResponseRecord)> {
    spec.fields
        .iter()
        .map(|field| {
            (
                instance_key(slot, instance, &field.name),
                ResponseRecord::empty(None, field.types.primary()),
            )
        })
        .collect()
}

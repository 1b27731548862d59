use super::{ResponseKey, ResponseRecord, ResponseStore, SubformInstances};
use crate::error::StoreError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A saved, not yet submitted inspection.
///
/// Holds every record of the store, including answers of branches that are
/// currently inactive, so resuming a draft brings them back when the branch
/// is selected again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub form_id: u64,
    pub doc_number: Option<String>,
    pub records: Vec<(ResponseKey, ResponseRecord)>,
    pub subforms: Vec<(ResponseKey, SubformInstances)>,
}

impl Draft {
    /// Captures a store; entries are sorted by key so equal stores give equal bytes.
    pub fn capture(form_id: u64, doc_number: Option<String>, store: &ResponseStore) -> Self {
        let records = store
            .iter()
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();
        let mut subforms: Vec<_> = store
            .subforms()
            .map(|(key, instances)| (key.clone(), instances.clone()))
            .collect();
        subforms.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            form_id,
            doc_number,
            records,
            subforms,
        }
    }

    /// Rebuilds the store held by this draft.
    pub fn restore(&self) -> ResponseStore {
        self.subforms.iter().fold(
            ResponseStore::new().with_records(self.records.iter().cloned()),
            |store, (key, instances)| store.with_subform(key.clone(), instances.clone()),
        )
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        encode_to_vec(self, standard()).map_err(|e| StoreError::DraftEncoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let (draft, _) = decode_from_slice(bytes, standard())
            .map_err(|e| StoreError::DraftEncoding(e.to_string()))?;
        Ok(draft)
    }

    /// Writes the bincode snapshot to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()?).map_err(|e| io_error(path, e))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
        Self::from_bytes(&bytes)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::DraftIo {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

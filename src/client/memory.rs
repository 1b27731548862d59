use super::{InspectionBackend, InspectionStatus};
use crate::error::ClientError;
use crate::schema::Form;
use crate::submission::InspectionCreate;
use ahash::AHashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredInspection {
    pub id: u64,
    pub payload: InspectionCreate,
    pub status: InspectionStatus,
}

#[derive(Debug, Default)]
struct State {
    forms: AHashMap<u64, Form>,
    inspections: Vec<StoredInspection>,
}

/// An in-process backend keeping everything in memory.
#[derive(Debug)]
pub struct MemoryBackend {
    year: i32,
    state: Mutex<State>,
}

impl MemoryBackend {
    /// `year` is the calendar year stamped into document numbers.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_form(self, form: Form) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.forms.insert(form.id, form);
        }
        self
    }

    pub fn inspection(&self, id: u64) -> Result<StoredInspection, ClientError> {
        self.lock()?
            .inspections
            .iter()
            .find(|stored| stored.id == id)
            .cloned()
            .ok_or(ClientError::InspectionNotFound(id))
    }

    pub fn inspections(&self) -> Result<Vec<StoredInspection>, ClientError> {
        Ok(self.lock()?.inspections.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ClientError> {
        self.state
            .lock()
            .map_err(|_| ClientError::Transport("backend state lock poisoned".to_string()))
    }
}

/// Upper-cased first three letters of each word, at most six characters.
fn abbreviation(form_name: &str) -> String {
    form_name
        .split_whitespace()
        .flat_map(|word| word.chars().take(3))
        .flat_map(char::to_uppercase)
        .take(6)
        .collect()
}

impl InspectionBackend for MemoryBackend {
    async fn fetch_form(&self, form_id: u64) -> Result<Form, ClientError> {
        self.lock()?
            .forms
            .get(&form_id)
            .cloned()
            .ok_or(ClientError::FormNotFound(form_id))
    }

    /// Numbers run `<ABBR>-<year><seq:04>`, continuing after the highest
    /// number already used in a stored inspection of the same form.
    async fn next_doc_number(&self, form_id: u64) -> Result<String, ClientError> {
        let state = self.lock()?;
        let form = state
            .forms
            .get(&form_id)
            .ok_or(ClientError::FormNotFound(form_id))?;
        let prefix = format!("{}-{}", abbreviation(&form.name), self.year);
        let last = state
            .inspections
            .iter()
            .filter(|stored| stored.payload.form_id == form_id)
            .flat_map(|stored| &stored.payload.responses)
            .filter_map(|response| response.response_value.as_deref())
            .filter_map(|value| value.strip_prefix(prefix.as_str()))
            .filter_map(|seq| seq.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Ok(format!("{}{:04}", prefix, last + 1))
    }

    async fn create_inspection(&self, payload: &InspectionCreate) -> Result<u64, ClientError> {
        let mut state = self.lock()?;
        if !state.forms.contains_key(&payload.form_id) {
            return Err(ClientError::FormNotFound(payload.form_id));
        }
        let id = state.inspections.len() as u64 + 1;
        state.inspections.push(StoredInspection {
            id,
            payload: payload.clone(),
            status: InspectionStatus::Draft,
        });
        Ok(id)
    }

    async fn submit_inspection(&self, inspection_id: u64) -> Result<(), ClientError> {
        let mut state = self.lock()?;
        let stored = state
            .inspections
            .iter_mut()
            .find(|stored| stored.id == inspection_id)
            .ok_or(ClientError::InspectionNotFound(inspection_id))?;
        stored.status = InspectionStatus::Submitted;
        Ok(())
    }
}

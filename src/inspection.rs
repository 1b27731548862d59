//! One inspection in progress: a form and the answers captured for it.
//!
//! Every edit builds a new store value, re-walks the tree and materializes
//! records for fields that just became active, then swaps the result in.

use crate::error::{StoreError, SubmissionError};
use crate::key::ResponseKey;
use crate::measurement::auto_status;
use crate::schema::{AnswerKind, FieldType, Form, MeasurementSpec, SubformSpec};
use crate::store::{Answer, Draft, PassHold, ResponseStore, parse_instance_key};
use crate::submission::{self, Submission, SubmitMode};
use crate::walker::{ActiveTree, DisplayTree, Prefill, TreeWalker};
use log::debug;

/// Name fragments marking the document-number field.
pub const DEFAULT_DOC_FIELD_PATTERNS: [&str; 2] = ["no doc", "no. doc"];

#[derive(Debug, Clone, PartialEq)]
pub struct InspectionConfig {
    /// Lower-case fragments; a field whose lower-cased name contains one of
    /// them receives the document number.
    pub doc_field_patterns: Vec<String>,
    /// Enforce required answers on final submission.
    pub strict_required: bool,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            doc_field_patterns: DEFAULT_DOC_FIELD_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            strict_required: true,
        }
    }
}

pub struct InspectionBuilder {
    form: Form,
    doc_number: Option<String>,
    config: InspectionConfig,
}

impl InspectionBuilder {
    pub fn new(form: Form) -> Self {
        Self {
            form,
            doc_number: None,
            config: InspectionConfig::default(),
        }
    }

    pub fn doc_number(mut self, doc_number: impl Into<String>) -> Self {
        self.doc_number = Some(doc_number.into());
        self
    }

    pub fn doc_field_patterns<S: Into<String>>(mut self, patterns: impl IntoIterator<Item = S>) -> Self {
        self.config.doc_field_patterns = patterns
            .into_iter()
            .map(|p| p.into().to_lowercase())
            .collect();
        self
    }

    pub fn strict_required(mut self, strict: bool) -> Self {
        self.config.strict_required = strict;
        self
    }

    pub fn build(self) -> Inspection {
        let mut inspection = Inspection {
            form: self.form,
            store: ResponseStore::new(),
            doc_number: self.doc_number,
            config: self.config,
        };
        inspection.commit(ResponseStore::new());
        inspection
    }
}

/// Where an editable slot lives and how it is answered.
struct SlotInfo {
    field_type: FieldType,
    measurement: Option<MeasurementSpec>,
}

#[derive(Debug, Clone)]
pub struct Inspection {
    form: Form,
    store: ResponseStore,
    doc_number: Option<String>,
    config: InspectionConfig,
}

impl Inspection {
    pub fn new(form: Form) -> Self {
        InspectionBuilder::new(form).build()
    }

    pub fn builder(form: Form) -> InspectionBuilder {
        InspectionBuilder::new(form)
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    /// The current store. Cloning it is cheap and gives a snapshot later edits
    /// will not touch.
    pub fn store(&self) -> &ResponseStore {
        &self.store
    }

    pub fn config(&self) -> &InspectionConfig {
        &self.config
    }

    pub fn doc_number(&self) -> Option<&str> {
        self.doc_number.as_deref()
    }

    pub fn active(&self) -> ActiveTree<'_> {
        TreeWalker::new(&self.form).walk(&self.store)
    }

    /// The active tree with its current answers, one field per line.
    pub fn render(&self) -> String {
        let tree = self.active();
        DisplayTree {
            tree: &tree,
            store: &self.store,
        }
        .to_string()
    }

    /// Captures a text answer: free text, a chosen option, a file name, a date.
    pub fn set_text(&mut self, key: &str, text: impl Into<String>) -> Result<(), StoreError> {
        let slot = self.resolve(key)?;
        if slot.field_type.answer_kind() != AnswerKind::Text {
            return Err(mismatch(key, slot.field_type));
        }
        let text = text.into();
        let next = self.store.update(key, |record| {
            record.answer = Answer::Text(text);
            Ok(())
        })?;
        self.commit(next);
        Ok(())
    }

    /// Sets a pass/hold decision. On a measurement slot this overrides the
    /// computed status until the reading changes.
    pub fn set_status(&mut self, key: &str, status: PassHold) -> Result<(), StoreError> {
        let slot = self.resolve(key)?;
        let next = match slot.field_type {
            FieldType::Button => self.store.update(key, |record| {
                record.answer = Answer::Status(status);
                Ok(())
            })?,
            FieldType::Measurement => self.store.update(key, |record| {
                let value = record.answer.measurement();
                record.answer = Answer::Measurement {
                    value,
                    status: Some(status),
                };
                Ok(())
            })?,
            other => return Err(mismatch(key, other)),
        };
        self.commit(next);
        Ok(())
    }

    /// Records a reading and recomputes its status; `None` clears both.
    /// NaN and infinite readings count as no reading.
    pub fn set_measurement(&mut self, key: &str, value: Option<f64>) -> Result<(), StoreError> {
        let slot = self.resolve(key)?;
        if slot.field_type != FieldType::Measurement {
            return Err(mismatch(key, slot.field_type));
        }
        let value = value.filter(|v| v.is_finite());
        let status = match (value, slot.measurement) {
            (Some(v), Some(spec)) => auto_status(&spec, v),
            _ => None,
        };
        debug!("Measurement '{}' set to {:?}, status {:?}", key, value, status);
        let next = self.store.update(key, |record| {
            record.answer = match value {
                Some(_) => Answer::Measurement { value, status },
                None => Answer::Empty,
            };
            Ok(())
        })?;
        self.commit(next);
        Ok(())
    }

    pub fn clear(&mut self, key: &str) -> Result<(), StoreError> {
        self.resolve(key)?;
        let next = self.store.update(key, |record| {
            record.answer = Answer::Empty;
            Ok(())
        })?;
        self.commit(next);
        Ok(())
    }

    pub fn add_subform_instance(&mut self, slot: &str) -> Result<u32, StoreError> {
        let spec = self.subform_spec(slot)?;
        let (next, id) = self
            .store
            .add_subform_instance(&ResponseKey::from(slot), &spec)?;
        self.commit(next);
        Ok(id)
    }

    pub fn remove_subform_instance(&mut self, slot: &str, instance: u32) -> Result<(), StoreError> {
        let spec = self.subform_spec(slot)?;
        let next = self
            .store
            .remove_subform_instance(&ResponseKey::from(slot), instance, &spec)?;
        self.commit(next);
        Ok(())
    }

    /// Whether any field of the form wants the document number.
    pub fn needs_doc_number(&self) -> bool {
        let mut found = false;
        self.form.visit(|_, node| {
            found |= node.is_doc_number_field(&self.config.doc_field_patterns);
        });
        found
    }

    /// Adopts a document number and fills every empty active doc text slot.
    pub fn set_doc_number(&mut self, doc_number: impl Into<String>) {
        let doc_number = doc_number.into();
        let targets: Vec<ResponseKey> = self
            .active()
            .nodes()
            .iter()
            .filter(|active| active.node.is_doc_number_field(&self.config.doc_field_patterns))
            .filter_map(|active| active.key_for(FieldType::Text).cloned())
            .filter(|key| !self.store.get(key.as_str()).is_some_and(|r| r.has_value()))
            .collect();
        let next = self.store.with_records(targets.into_iter().filter_map(|key| {
            let record = self.store.get(key.as_str())?.clone().with_text(doc_number.clone());
            Some((key, record))
        }));
        self.doc_number = Some(doc_number);
        self.commit(next);
    }

    pub fn draft(&self) -> Draft {
        Draft::capture(self.form.id, self.doc_number.clone(), &self.store)
    }

    /// Replaces the current answers with those of a draft of the same form.
    pub fn restore(&mut self, draft: &Draft) -> Result<(), StoreError> {
        if draft.form_id != self.form.id {
            return Err(StoreError::FormMismatch {
                expected: self.form.id,
                found: draft.form_id,
            });
        }
        if draft.doc_number.is_some() {
            self.doc_number = draft.doc_number.clone();
        }
        self.commit(draft.restore());
        Ok(())
    }

    /// Validates (in final mode, when configured) and flattens the active answers.
    pub fn prepare(&self, mode: SubmitMode) -> Result<Submission, SubmissionError> {
        let tree = self.active();
        submission::prepare(
            self.form.id,
            &tree,
            &self.store,
            mode,
            self.config.strict_required,
        )
    }

    fn commit(&mut self, next: ResponseStore) {
        let prefill = Prefill {
            doc_number: self.doc_number.as_deref(),
            doc_field_patterns: &self.config.doc_field_patterns,
        };
        let synced = TreeWalker::new(&self.form).sync(&next, &prefill);
        self.store = synced;
    }

    /// Resolves an active slot key or a sub-answer key of an active subform.
    fn resolve(&self, key: &str) -> Result<SlotInfo, StoreError> {
        let tree = self.active();
        if let Some((active, field_type)) = tree.slot(key) {
            return Ok(SlotInfo {
                field_type,
                measurement: active.node.measurement,
            });
        }

        for active in tree.nodes() {
            let (Some(slot), Some(spec)) = (
                active.key_for(FieldType::Subform),
                active.node.options.subform.as_ref(),
            ) else {
                continue;
            };
            let Some((instance, name)) = parse_instance_key(slot, key) else {
                continue;
            };
            let live = self
                .store
                .subform(slot.as_str())
                .is_some_and(|instances| instances.contains(instance));
            if !live || !self.store.contains(key) {
                continue;
            }
            if let Some(field) = spec.fields.iter().find(|field| field.name == name) {
                return Ok(SlotInfo {
                    field_type: field.types.primary(),
                    measurement: field.measurement,
                });
            }
        }

        Err(StoreError::UnknownKey {
            key: key.to_string(),
        })
    }

    fn subform_spec(&self, slot: &str) -> Result<SubformSpec, StoreError> {
        let tree = self.active();
        let (active, field_type) = tree.slot(slot).ok_or_else(|| StoreError::UnknownKey {
            key: slot.to_string(),
        })?;
        if field_type != FieldType::Subform {
            return Err(mismatch(slot, field_type));
        }
        Ok(active.node.options.subform.clone().unwrap_or_default())
    }
}

fn mismatch(key: &str, field_type: FieldType) -> StoreError {
    StoreError::AnswerMismatch {
        key: key.to_string(),
        field_type,
    }
}

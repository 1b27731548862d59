//! Turning the live store into the create-inspection request.
//!
//! Only active slots are considered. A slot reaches the payload when it holds
//! a value and its field has a persisted id; active answers without an id are
//! listed in [`Submission::unpersisted`] instead, and answers left behind in
//! inactive branches are listed in [`Submission::orphaned`].

use crate::error::SubmissionError;
use crate::flag::{self, FlagReason};
use crate::key::ResponseKey;
use crate::schema::{AnswerKind, FieldNode, FieldType, SubformSpec};
use crate::store::{Answer, ResponseStore, instance_key, parse_instance_key};
use crate::walker::{ActiveNode, ActiveTree};
use log::{info, warn};
use serde_json::json;
use std::fmt;

mod payload;

pub use payload::{InspectionCreate, InspectionResponse};

/// Whether required answers are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// Saved for later; required answers may be missing.
    Draft,
    #[default]
    Final,
}

/// A required slot without an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingAnswer {
    pub key: ResponseKey,
    pub field_name: String,
    pub field_type: FieldType,
}

impl fmt::Display for MissingAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({}, {})", self.field_name, self.field_type, self.key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedAnswer {
    pub key: ResponseKey,
    pub field_name: String,
    pub reason: FlagReason,
}

/// A prepared submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: SubmitMode,
    pub payload: InspectionCreate,
    pub has_flags: bool,
    pub flags: Vec<FlaggedAnswer>,
    /// Active answers whose field has no persisted id and so cannot be sent.
    pub unpersisted: Vec<ResponseKey>,
    /// Non-empty answers of fields that are no longer active.
    pub orphaned: Vec<ResponseKey>,
}

/// Lists every required active slot that has no answer.
///
/// Subform slots count as answered once they hold their minimum number of
/// instances; required template fields are checked in every instance.
pub fn validate_required(tree: &ActiveTree<'_>, store: &ResponseStore) -> Vec<MissingAnswer> {
    let mut missing = Vec::new();
    for active in tree.nodes() {
        for (field_type, key) in &active.slots {
            match field_type.answer_kind() {
                AnswerKind::Instruction => {}
                AnswerKind::Subform => {
                    if let Some(spec) = &active.node.options.subform {
                        check_subform(active.node, key, spec, store, &mut missing);
                    }
                }
                _ => {
                    let answered = store.get(key.as_str()).is_some_and(|r| r.has_value());
                    if active.node.required && !answered {
                        missing.push(MissingAnswer {
                            key: key.clone(),
                            field_name: active.node.name.clone(),
                            field_type: *field_type,
                        });
                    }
                }
            }
        }
    }
    missing
}

fn check_subform(
    node: &FieldNode,
    slot: &ResponseKey,
    spec: &SubformSpec,
    store: &ResponseStore,
    missing: &mut Vec<MissingAnswer>,
) {
    let ids = store
        .subform(slot.as_str())
        .map(|instances| instances.ids().to_vec())
        .unwrap_or_default();
    if ids.len() < spec.min_instances || (node.required && ids.is_empty()) {
        missing.push(MissingAnswer {
            key: slot.clone(),
            field_name: node.name.clone(),
            field_type: FieldType::Subform,
        });
    }
    for id in ids {
        let required = spec
            .fields
            .iter()
            .filter(|f| f.required && f.types.primary().answer_kind() != AnswerKind::Instruction);
        for field in required {
            let key = instance_key(slot, id, &field.name);
            if !store.get(key.as_str()).is_some_and(|r| r.has_value()) {
                missing.push(MissingAnswer {
                    key,
                    field_name: field.name.clone(),
                    field_type: field.types.primary(),
                });
            }
        }
    }
}

/// Builds the submission for the active tree without enforcing required answers.
pub fn flatten(
    form_id: u64,
    tree: &ActiveTree<'_>,
    store: &ResponseStore,
    mode: SubmitMode,
) -> Submission {
    let mut responses = Vec::new();
    let mut flags = Vec::new();
    let mut unpersisted = Vec::new();

    for active in tree.nodes() {
        for (field_type, key) in &active.slots {
            let Some(record) = store.get(key.as_str()) else {
                continue;
            };
            let reason = flag::evaluate(active.node, *field_type, &record.answer);
            if let Some(reason) = &reason {
                flags.push(FlaggedAnswer {
                    key: key.clone(),
                    field_name: active.node.name.clone(),
                    reason: reason.clone(),
                });
            }

            let Some(mut response) = slot_response(active, *field_type, key, &record.answer, store)
            else {
                continue;
            };
            match record.field_id {
                Some(field_id) => {
                    response.field_id = field_id;
                    response.is_flagged = reason.is_some();
                    responses.push(response);
                }
                None => {
                    warn!("Answer '{}' has no persisted field and is not submitted", key);
                    unpersisted.push(key.clone());
                }
            }
        }
    }

    let orphaned = orphaned_keys(tree, store);
    if !orphaned.is_empty() {
        info!("{} answer(s) in inactive branches are retained but not submitted", orphaned.len());
    }

    Submission {
        mode,
        payload: InspectionCreate { form_id, responses },
        has_flags: !flags.is_empty(),
        flags,
        unpersisted,
        orphaned,
    }
}

/// Validates (in final mode) and flattens.
pub fn prepare(
    form_id: u64,
    tree: &ActiveTree<'_>,
    store: &ResponseStore,
    mode: SubmitMode,
    strict_required: bool,
) -> Result<Submission, SubmissionError> {
    if mode == SubmitMode::Final && strict_required {
        let missing = validate_required(tree, store);
        if !missing.is_empty() {
            return Err(SubmissionError::MissingRequired(missing));
        }
    }
    let submission = flatten(form_id, tree, store, mode);
    info!(
        "Prepared {:?} submission for form {}: {} response(s), {} flagged",
        mode,
        form_id,
        submission.payload.responses.len(),
        submission.flags.len()
    );
    Ok(submission)
}

/// The wire response for one slot, or `None` when the slot holds nothing to send.
/// The returned response's `field_id` is filled in by the caller.
fn slot_response(
    active: &ActiveNode<'_>,
    field_type: FieldType,
    key: &ResponseKey,
    answer: &Answer,
    store: &ResponseStore,
) -> Option<InspectionResponse> {
    let mut response = InspectionResponse::new(0);
    match (field_type.answer_kind(), answer) {
        (AnswerKind::Instruction, _) => return None,
        (AnswerKind::Subform, _) => {
            let spec = active.node.options.subform.as_ref()?;
            let instances = store.subform(key.as_str()).filter(|i| !i.is_empty())?;
            let entries: Vec<_> = instances
                .ids()
                .iter()
                .map(|&id| {
                    let data: serde_json::Map<_, _> = spec
                        .fields
                        .iter()
                        .map(|field| {
                            let value = store
                                .get(instance_key(key, id, &field.name).as_str())
                                .map(|r| r.answer.to_json())
                                .unwrap_or(serde_json::Value::Null);
                            (field.name.clone(), value)
                        })
                        .collect();
                    json!({ "id": id, "data": data })
                })
                .collect();
            response.response_value = Some(serde_json::Value::Array(entries).to_string());
        }
        (_, Answer::Empty) => return None,
        (_, Answer::Text(text)) if text.is_empty() => return None,
        (_, Answer::Text(text)) => response.response_value = Some(text.clone()),
        (_, Answer::Status(status)) => response.pass_hold_status = Some(*status),
        (_, Answer::Measurement { value, status }) => {
            if value.is_none() && status.is_none() {
                return None;
            }
            response.measurement_value = *value;
            response.pass_hold_status = *status;
        }
    }
    Some(response)
}

/// Non-empty records outside the active tree, sorted, excluding subform sub-answers.
fn orphaned_keys(tree: &ActiveTree<'_>, store: &ResponseStore) -> Vec<ResponseKey> {
    let slots: Vec<&ResponseKey> = store.subforms().map(|(slot, _)| slot).collect();
    store
        .iter()
        .filter(|(key, record)| record.has_value() && !tree.is_active(key.as_str()))
        .filter(|(key, _)| {
            !slots
                .iter()
                .any(|slot| parse_instance_key(slot, key.as_str()).is_some())
        })
        .map(|(key, _)| key.clone())
        .collect()
}

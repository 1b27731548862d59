use crate::schema::FieldType;
use crate::submission::MissingAnswer;
use thiserror::Error;

/// Errors that can occur while converting or validating a form schema.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    #[error("Failed to parse form JSON: {0}")]
    JsonParseError(String),

    #[error("Field at {context} has no name")]
    MissingName { context: String },

    #[error(
        "Field '{field}' carries conditional rules, but its primary type '{field_type}' is not a choice type"
    )]
    ConditionalOnNonChoice { field: String, field_type: FieldType },

    #[error("Choice field '{field}' has no options defined")]
    MissingChoices { field: String },

    #[error("Response key '{key}' is synthesized for more than one answer slot")]
    DuplicateKey { key: String },
}

/// Errors raised when a `FieldPath` does not address what an edit expects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("No field exists at path '{path}'")]
    NodeNotFound { path: String },

    #[error("Field at path '{path}' has no conditional rule #{rule}")]
    RuleNotFound { path: String, rule: usize },

    #[error("Field at path '{path}' has primary type '{field_type}', which cannot branch")]
    NotChoice { path: String, field_type: FieldType },
}

/// Errors that can occur while editing the response store or handling drafts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Response key '{key}' does not belong to an active field")]
    UnknownKey { key: String },

    #[error("Response key '{key}' is a '{field_type}' slot and cannot take this kind of answer")]
    AnswerMismatch { key: String, field_type: FieldType },

    #[error("Subform '{key}' already holds the maximum of {limit} instance(s)")]
    SubformLimit { key: String, limit: usize },

    #[error("Subform '{key}' must keep at least {minimum} instance(s)")]
    SubformMinimum { key: String, minimum: usize },

    #[error("Subform '{key}' has no instance with id {instance}")]
    UnknownInstance { key: String, instance: u32 },

    #[error("Draft belongs to form {found}, but the inspection uses form {expected}")]
    FormMismatch { expected: u64, found: u64 },

    #[error("Could not access draft file '{path}': {message}")]
    DraftIo { path: String, message: String },

    #[error("Draft is not a valid snapshot: {0}")]
    DraftEncoding(String),
}

/// Errors that can occur when preparing or sending an inspection.
#[derive(Error, Debug, Clone)]
pub enum SubmissionError {
    #[error("{} required answer(s) missing: {}", .0.len(), summarize(.0))]
    MissingRequired(Vec<MissingAnswer>),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors reported by the remote collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Form {0} not found")]
    FormNotFound(u64),

    #[error("Inspection {0} not found")]
    InspectionNotFound(u64),

    #[error("Backend request failed: {0}")]
    Transport(String),
}

fn summarize(missing: &[MissingAnswer]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

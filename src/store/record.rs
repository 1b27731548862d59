use crate::schema::{AnswerKind, FieldType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pass/hold decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassHold {
    Pass,
    Hold,
}

impl PassHold {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassHold::Pass => "pass",
            PassHold::Hold => "hold",
        }
    }
}

impl fmt::Display for PassHold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured answer. Which variant a slot holds is fixed by its field type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Answer {
    #[default]
    Empty,
    Text(String),
    Status(PassHold),
    Measurement {
        value: Option<f64>,
        status: Option<PassHold>,
    },
}

impl Answer {
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Empty => true,
            Answer::Text(text) => text.is_empty(),
            Answer::Status(_) => false,
            Answer::Measurement { value, status } => value.is_none() && status.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<PassHold> {
        match self {
            Answer::Status(status) => Some(*status),
            Answer::Measurement { status, .. } => *status,
            _ => None,
        }
    }

    pub fn measurement(&self) -> Option<f64> {
        match self {
            Answer::Measurement { value, .. } => *value,
            _ => None,
        }
    }

    /// The answer as a JSON value, `null` when empty. Measurements keep their
    /// status next to the reading: `{"value": .., "status": ..}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Answer::Empty => serde_json::Value::Null,
            Answer::Text(text) => serde_json::Value::String(text.clone()),
            Answer::Status(status) => serde_json::Value::String(status.to_string()),
            Answer::Measurement {
                value: None,
                status: None,
            } => serde_json::Value::Null,
            Answer::Measurement { value, status } => {
                serde_json::json!({ "value": value, "status": status })
            }
        }
    }
}

/// The captured state of one answer slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Persisted id of the owning field; `None` for fields that only exist
    /// inside a conditional branch or a subform.
    pub field_id: Option<u64>,
    pub field_type: FieldType,
    pub answer: Answer,
}

impl ResponseRecord {
    pub fn empty(field_id: Option<u64>, field_type: FieldType) -> Self {
        Self {
            field_id,
            field_type,
            answer: Answer::Empty,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.answer = Answer::Text(text.into());
        self
    }

    pub fn has_value(&self) -> bool {
        !self.answer.is_empty()
    }

    pub fn kind(&self) -> AnswerKind {
        self.field_type.answer_kind()
    }
}

use super::field::FieldNode;
use serde::{Deserialize, Serialize};

/// Type-specific configuration of a field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldOptions {
    /// Options offered by dropdown and search dropdown slots.
    pub choices: Vec<String>,
    pub buttons: Vec<ButtonOption>,
    /// Text shown by notes slots.
    pub instructions: Option<String>,
    pub reference_photo: Option<String>,
    pub max_size_mb: Option<u32>,
    pub photo_quality: Option<String>,
    pub subform: Option<SubformSpec>,
    /// Anything the form designer stored that has no typed counterpart.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonOption {
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Template and instance bounds of a repeatable sub-form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubformSpec {
    pub fields: Vec<FieldNode>,
    pub min_instances: usize,
    /// Zero means unlimited.
    pub max_instances: usize,
}

impl SubformSpec {
    pub fn allows_more(&self, current: usize) -> bool {
        self.max_instances == 0 || current < self.max_instances
    }
}

/// How a measurement reading is compared against its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    #[default]
    Between,
    Higher,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasurementSpec {
    pub mode: MeasurementMode,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MeasurementSpec {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            mode: MeasurementMode::Between,
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn higher_than(min: f64) -> Self {
        Self {
            mode: MeasurementMode::Higher,
            min: Some(min),
            max: None,
        }
    }

    pub fn lower_than(max: f64) -> Self {
        Self {
            mode: MeasurementMode::Lower,
            min: None,
            max: Some(max),
        }
    }

    /// The bounds the comparison mode actually uses, as `(min, max)`.
    pub fn effective_bounds(&self) -> (Option<f64>, Option<f64>) {
        match self.mode {
            MeasurementMode::Between => (self.min, self.max),
            MeasurementMode::Higher => (self.min, None),
            MeasurementMode::Lower => (None, self.max),
        }
    }
}

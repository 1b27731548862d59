use serde::{Deserialize, Serialize};

/// Declares which answers of a field count as abnormal.
///
/// Accepts both the designer's shape (`dropdown_values`, `button_values`,
/// `use_measurement_settings`) and the review shape (`abnormal_values`,
/// `normal_values`, `required`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagConditions {
    pub enabled: bool,
    pub dropdown_value: Option<String>,
    pub dropdown_values: Vec<String>,
    pub button_values: Vec<String>,
    pub abnormal_values: Vec<String>,
    pub normal_values: Vec<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub use_measurement_settings: bool,
    pub required: bool,
}

impl Default for FlagConditions {
    fn default() -> Self {
        Self {
            enabled: true,
            dropdown_value: None,
            dropdown_values: Vec::new(),
            button_values: Vec::new(),
            abnormal_values: Vec::new(),
            normal_values: Vec::new(),
            min_value: None,
            max_value: None,
            use_measurement_settings: false,
            required: false,
        }
    }
}

impl FlagConditions {
    pub fn abnormal_choices<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            dropdown_values: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn abnormal_buttons<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            button_values: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min_value: min,
            max_value: max,
            ..Self::default()
        }
    }

    pub fn from_measurement_settings() -> Self {
        Self {
            use_measurement_settings: true,
            ..Self::default()
        }
    }

    /// Every value listed as abnormal for choice slots.
    pub(crate) fn abnormal_choice_values(&self) -> impl Iterator<Item = &String> {
        self.dropdown_value
            .iter()
            .chain(&self.dropdown_values)
            .chain(&self.abnormal_values)
    }

    pub(crate) fn abnormal_button_values(&self) -> impl Iterator<Item = &String> {
        self.button_values.iter().chain(&self.abnormal_values)
    }
}

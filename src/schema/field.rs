use super::flag::FlagConditions;
use super::options::{FieldOptions, MeasurementSpec};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter;

/// The kind of input a field slot collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Dropdown,
    SearchDropdown,
    Button,
    Photo,
    Signature,
    Measurement,
    Notes,
    Date,
    Datetime,
    Time,
    Subform,
}

/// How a slot of a given `FieldType` is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    /// Free text, a chosen option, a file name or an encoded signature.
    Text,
    /// A pass/hold decision.
    Status,
    /// A numeric reading with a derived pass/hold status.
    Measurement,
    /// A list of repeated sub-form instances.
    Subform,
    /// Instructional text only; never answered.
    Instruction,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Dropdown => "dropdown",
            FieldType::SearchDropdown => "search_dropdown",
            FieldType::Button => "button",
            FieldType::Photo => "photo",
            FieldType::Signature => "signature",
            FieldType::Measurement => "measurement",
            FieldType::Notes => "notes",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Time => "time",
            FieldType::Subform => "subform",
        }
    }

    /// Only choice types may drive conditional branches.
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Dropdown | FieldType::SearchDropdown)
    }

    pub fn answer_kind(&self) -> AnswerKind {
        match self {
            FieldType::Button => AnswerKind::Status,
            FieldType::Measurement => AnswerKind::Measurement,
            FieldType::Subform => AnswerKind::Subform,
            FieldType::Notes => AnswerKind::Instruction,
            _ => AnswerKind::Text,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ordered set of types carried by one field.
///
/// The primary type is the one whose answer drives conditional matching; the
/// secondary types are answered independently under the same field and never
/// influence branching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypes {
    primary: FieldType,
    secondary: Vec<FieldType>,
}

impl FieldTypes {
    pub fn single(primary: FieldType) -> Self {
        Self {
            primary,
            secondary: Vec::new(),
        }
    }

    /// Builds a type set, dropping duplicates and any repeat of the primary type
    /// while keeping the declared order.
    pub fn new(primary: FieldType, secondary: impl IntoIterator<Item = FieldType>) -> Self {
        let secondary = secondary
            .into_iter()
            .filter(|t| *t != primary)
            .unique()
            .collect();
        Self { primary, secondary }
    }

    pub fn primary(&self) -> FieldType {
        self.primary
    }

    pub fn secondary(&self) -> &[FieldType] {
        &self.secondary
    }

    /// Iterates all types, primary first.
    pub fn iter(&self) -> impl Iterator<Item = FieldType> + '_ {
        iter::once(self.primary).chain(self.secondary.iter().copied())
    }

    pub fn len(&self) -> usize {
        1 + self.secondary.len()
    }

    pub fn is_multi(&self) -> bool {
        !self.secondary.is_empty()
    }

    pub fn contains(&self, field_type: FieldType) -> bool {
        self.iter().any(|t| t == field_type)
    }
}

/// One trigger value and the fields it reveals.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalRule {
    pub trigger: String,
    pub children: Vec<FieldNode>,
}

impl ConditionalRule {
    pub fn new(trigger: impl Into<String>, children: Vec<FieldNode>) -> Self {
        Self {
            trigger: trigger.into(),
            children,
        }
    }
}

/// A single question of a form, possibly multi-typed, possibly revealing
/// further questions depending on its answer.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Persisted identifier; only fields stored directly under a form carry one.
    pub id: Option<u64>,
    pub name: String,
    pub types: FieldTypes,
    pub options: FieldOptions,
    pub measurement: Option<MeasurementSpec>,
    pub required: bool,
    pub order: i32,
    pub has_conditional: bool,
    pub rules: Vec<ConditionalRule>,
    pub flag_conditions: Option<FlagConditions>,
}

impl FieldNode {
    pub fn new(name: impl Into<String>, types: FieldTypes) -> Self {
        Self {
            id: None,
            name: name.into(),
            types,
            options: FieldOptions::default(),
            measurement: None,
            required: false,
            order: 0,
            has_conditional: false,
            rules: Vec::new(),
            flag_conditions: None,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_choices<S: Into<String>>(mut self, choices: impl IntoIterator<Item = S>) -> Self {
        self.options.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_measurement(mut self, spec: MeasurementSpec) -> Self {
        self.measurement = Some(spec);
        self
    }

    pub fn with_flags(mut self, conditions: FlagConditions) -> Self {
        self.flag_conditions = Some(conditions);
        self
    }

    /// Appends a conditional rule and marks the field as conditional.
    pub fn with_rule(mut self, trigger: impl Into<String>, children: Vec<FieldNode>) -> Self {
        self.has_conditional = true;
        self.rules.push(ConditionalRule::new(trigger, children));
        self
    }

    /// The rules that traversal may honor.
    ///
    /// Empty unless the field is flagged conditional and its primary type is a
    /// choice type, whatever `rules` holds.
    pub fn branches(&self) -> &[ConditionalRule] {
        if self.has_conditional && self.types.primary().is_choice() {
            &self.rules
        } else {
            &[]
        }
    }

    /// Finds the first rule whose trigger equals the captured primary answer.
    ///
    /// An absent or empty answer matches nothing.
    pub fn matching_rule(&self, captured: Option<&str>) -> Option<(usize, &ConditionalRule)> {
        let value = captured.filter(|v| !v.is_empty())?;
        self.branches()
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.trigger == value)
    }

    /// Whether the field's name marks it as the document-number field.
    pub fn is_doc_number_field(&self, patterns: &[String]) -> bool {
        let name = self.name.to_lowercase();
        patterns.iter().any(|p| name.contains(p.as_str()))
    }
}

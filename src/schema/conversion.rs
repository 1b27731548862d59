use super::field::{ConditionalRule, FieldNode, FieldType, FieldTypes};
use super::flag::FlagConditions;
use super::form::Form;
use super::options::{ButtonOption, FieldOptions, MeasurementMode, MeasurementSpec, SubformSpec};
use crate::error::SchemaError;
use log::warn;
use serde::{Deserialize, Serialize};

/// A trait for custom schema formats that can be converted into a kensa `Form`.
///
/// `WireForm` implements it for the inspection backend's JSON shape. Other
/// sources (spreadsheets, legacy exports) can implement it the same way.
///
/// # Example
///
/// ```rust,no_run
/// use kensa::prelude::*;
///
/// struct Checklist { id: u64, items: Vec<String> }
///
/// impl IntoForm for Checklist {
///     fn into_form(self) -> std::result::Result<Form, SchemaError> {
///         let mut form = Form::new(self.id, "Checklist");
///         for (order, item) in self.items.into_iter().enumerate() {
///             form.fields.push(
///                 FieldNode::new(item, FieldTypes::single(FieldType::Button))
///                     .with_id(order as u64 + 1)
///                     .with_order(order as i32),
///             );
///         }
///         Ok(form)
///     }
/// }
/// ```
pub trait IntoForm {
    /// Consumes the object and converts it into a kensa form.
    fn into_form(self) -> Result<Form, SchemaError>;
}

/// A form exactly as the backend serves it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireForm {
    pub id: u64,
    pub form_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<WireField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_types: Option<Vec<FieldType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_options: Option<WireOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_type: Option<MeasurementMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_max: Option<f64>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub field_order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_conditional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_rules: Option<Vec<WireRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag_conditions: Option<FlagConditions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireRule {
    pub condition_value: String,
    #[serde(default)]
    pub next_fields: Vec<WireField>,
}

/// The free-form `field_options` bag. Some designers nest the conditional
/// settings and the type list here instead of on the field itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WireOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub button_options: Vec<ButtonOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_mb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subform_fields: Vec<WireField>,
    pub min_instances: usize,
    pub max_instances: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_types: Option<Vec<FieldType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_conditional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional_rules: Option<Vec<WireRule>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IntoForm for WireForm {
    fn into_form(self) -> Result<Form, SchemaError> {
        let fields = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(idx, field)| convert_field(field, &format!("fields[{}]", idx)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Form {
            id: self.id,
            name: self.form_name,
            description: self.description,
            fields,
        })
    }
}

/// Normalizes one wire field and, recursively, everything beneath it.
fn convert_field(field: WireField, context: &str) -> Result<FieldNode, SchemaError> {
    if field.field_name.trim().is_empty() {
        return Err(SchemaError::MissingName {
            context: context.to_string(),
        });
    }

    let mut options = field.field_options.unwrap_or_default();
    let listed_types = field
        .field_types
        .or(options.field_types.take())
        .unwrap_or_default();

    let primary = match field.field_type.or_else(|| listed_types.first().copied()) {
        Some(primary) => primary,
        None => {
            warn!(
                "Field '{}' at {} declares no type; treating it as text",
                field.field_name, context
            );
            FieldType::Text
        }
    };
    let types = FieldTypes::new(primary, listed_types);

    let has_conditional = field
        .has_conditional
        .or(options.has_conditional.take())
        .unwrap_or(false);
    let rules = field
        .conditional_rules
        .or(options.conditional_rules.take())
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(rule_idx, rule)| -> Result<ConditionalRule, SchemaError> {
            let children = rule
                .next_fields
                .into_iter()
                .enumerate()
                .map(|(child_idx, child)| {
                    convert_field(
                        child,
                        &format!("{}.rule[{}].field[{}]", context, rule_idx, child_idx),
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ConditionalRule {
                trigger: rule.condition_value,
                children,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let measurement = types.contains(FieldType::Measurement).then(|| MeasurementSpec {
        mode: field.measurement_type.unwrap_or_default(),
        min: field.measurement_min,
        max: field.measurement_max,
    });

    let subform = if types.contains(FieldType::Subform) {
        let fields = std::mem::take(&mut options.subform_fields)
            .into_iter()
            .enumerate()
            .map(|(idx, sub)| convert_field(sub, &format!("{}.subform[{}]", context, idx)))
            .collect::<Result<Vec<_>, _>>()?;
        Some(SubformSpec {
            fields,
            min_instances: options.min_instances,
            max_instances: options.max_instances,
        })
    } else {
        None
    };

    Ok(FieldNode {
        id: field.id,
        name: field.field_name,
        types,
        options: FieldOptions {
            choices: options.options,
            buttons: options.button_options,
            instructions: field.placeholder_text.or(options.placeholder_text),
            reference_photo: options.reference_photo,
            max_size_mb: options.max_size_mb,
            photo_quality: options.quality,
            subform,
            extra: options.extra,
        },
        measurement,
        required: field.is_required,
        order: field.field_order,
        has_conditional,
        rules,
        flag_conditions: field.flag_conditions,
    })
}

//! Common test utilities for building forms.
use kensa::prelude::*;
use kensa::schema::{FieldOptions, SubformSpec};

pub const DEFECT: &str = "1";
pub const DESCRIPTION: &str = "1-rule0-field0-Defect_Description";
pub const SEVERITY: &str = "1-rule0-field1-Severity";
pub const HOLD_TAG: &str = "1-rule0-field1-Severity-rule0-field0-Hold_Tag";
pub const SURFACE_DROPDOWN: &str = "2-dropdown";
pub const SURFACE_PHOTO: &str = "2-photo";
pub const THICKNESS: &str = "3";
pub const DOC_NUMBER: &str = "4";
pub const NOTES: &str = "5";

/// A receiving form exercising branches, multi-typed fields and measurements.
///
/// ```text
/// 1 Defect Found? (dropdown)          Yes -> Defect Description (text, required)
///                                            Severity (dropdown)  High -> Hold Tag (button)
/// 2 Surface (dropdown + photo)
/// 3 Thickness (measurement 10..20, required, flagged outside bounds)
/// 4 No. Doc (text)
/// 5 Instructions (notes)
/// ```
#[allow(dead_code)]
pub fn receiving_form() -> Form {
    let hold_tag = FieldNode::new("Hold Tag", FieldTypes::single(FieldType::Button))
        .with_flags(FlagConditions::abnormal_buttons(["Hold"]));
    let severity = FieldNode::new("Severity", FieldTypes::single(FieldType::Dropdown))
        .with_choices(["Low", "High"])
        .with_rule("High", vec![hold_tag]);
    let description =
        FieldNode::new("Defect Description", FieldTypes::single(FieldType::Text)).required();

    Form::new(10, "Goods Receiving")
        .with_field(
            FieldNode::new("Defect Found?", FieldTypes::single(FieldType::Dropdown))
                .with_id(1)
                .with_order(0)
                .required()
                .with_choices(["Yes", "No"])
                .with_rule("Yes", vec![description, severity])
                .with_flags(FlagConditions::abnormal_choices(["Yes"])),
        )
        .with_field(
            FieldNode::new(
                "Surface",
                FieldTypes::new(FieldType::Dropdown, [FieldType::Photo]),
            )
            .with_id(2)
            .with_order(1)
            .with_choices(["Clean", "Dirty"]),
        )
        .with_field(
            FieldNode::new("Thickness", FieldTypes::single(FieldType::Measurement))
                .with_id(3)
                .with_order(2)
                .required()
                .with_measurement(MeasurementSpec::between(10.0, 20.0))
                .with_flags(FlagConditions::from_measurement_settings()),
        )
        .with_field(
            FieldNode::new("No. Doc", FieldTypes::single(FieldType::Text))
                .with_id(4)
                .with_order(3),
        )
        .with_field(
            FieldNode::new("Instructions", FieldTypes::single(FieldType::Notes))
                .with_id(5)
                .with_order(4),
        )
}

/// A form with one subform slot (`"20"`) holding 1..=3 reject entries,
/// each with a code and a quantity measured against 1..5.
#[allow(dead_code)]
pub fn subform_form() -> Form {
    let spec = SubformSpec {
        fields: vec![
            FieldNode::new("Reject Code", FieldTypes::single(FieldType::Text)).required(),
            FieldNode::new("Qty", FieldTypes::single(FieldType::Measurement))
                .with_measurement(MeasurementSpec::between(1.0, 5.0)),
        ],
        min_instances: 1,
        max_instances: 3,
    };
    Form::new(20, "Reject Log").with_field(
        FieldNode::new("Rejects", FieldTypes::single(FieldType::Subform))
            .with_id(20)
            .with_options(FieldOptions {
                subform: Some(spec),
                ..FieldOptions::default()
            }),
    )
}

/// The same shape as `receiving_form` in the backend's JSON format, with the
/// conditional settings and type list nested in `field_options` the way some
/// designers save them.
#[allow(dead_code)]
pub const RECEIVING_FORM_JSON: &str = r#"
{
  "id": 10,
  "form_name": "Goods Receiving",
  "fields": [
    {
      "id": 1,
      "field_name": "Defect Found?",
      "field_type": "dropdown",
      "is_required": true,
      "field_order": 0,
      "field_options": {
        "options": ["Yes", "No"],
        "has_conditional": true,
        "conditional_rules": [
          {
            "condition_value": "Yes",
            "next_fields": [
              { "field_name": "Defect Description", "field_type": "text", "is_required": true },
              {
                "field_name": "Severity",
                "field_type": "dropdown",
                "field_options": { "options": ["Low", "High"] },
                "has_conditional": true,
                "conditional_rules": [
                  {
                    "condition_value": "High",
                    "next_fields": [{ "field_name": "Hold Tag", "field_type": "button" }]
                  }
                ]
              }
            ]
          }
        ]
      },
      "flag_conditions": { "enabled": true, "abnormal_values": ["Yes"] }
    },
    {
      "id": 2,
      "field_name": "Surface",
      "field_type": "dropdown",
      "field_order": 1,
      "field_options": {
        "options": ["Clean", "Dirty"],
        "field_types": ["dropdown", "photo", "photo"],
        "quality": "medium"
      }
    },
    {
      "id": 3,
      "field_name": "Thickness",
      "field_type": "measurement",
      "measurement_type": "between",
      "measurement_min": 10,
      "measurement_max": 20,
      "is_required": true,
      "field_order": 2,
      "flag_conditions": { "use_measurement_settings": true }
    },
    { "id": 4, "field_name": "No. Doc", "field_type": "text", "field_order": 3 },
    {
      "id": 5,
      "field_name": "Instructions",
      "field_type": "notes",
      "field_order": 4,
      "placeholder_text": "Wear gloves",
      "field_options": { "color": "amber" }
    }
  ]
}
"#;

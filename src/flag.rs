//! Abnormal-answer detection.
//!
//! Flags are evaluated against a slot's own answer only. They are reported
//! alongside the submission and never influence which fields are active.

use crate::measurement::out_of_bounds;
use crate::schema::{FieldNode, FieldType, FlagConditions};
use crate::store::Answer;
use std::fmt;

/// Why an answer was flagged.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagReason {
    /// The value is listed as abnormal.
    AbnormalValue(String),
    /// A list of normal values exists and the value is not in it.
    NotNormal(String),
    BelowMinimum { value: f64, min: f64 },
    AboveMaximum { value: f64, max: f64 },
    /// The conditions require a reading and none was captured.
    MissingMeasurement,
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagReason::AbnormalValue(value) => write!(f, "'{}' is marked abnormal", value),
            FlagReason::NotNormal(value) => write!(f, "'{}' is not a normal value", value),
            FlagReason::BelowMinimum { value, min } => {
                write!(f, "{} is below the minimum of {}", value, min)
            }
            FlagReason::AboveMaximum { value, max } => {
                write!(f, "{} is above the maximum of {}", value, max)
            }
            FlagReason::MissingMeasurement => write!(f, "measurement is required but missing"),
        }
    }
}

/// Evaluates the flag conditions of `node` against the answer of one of its slots.
pub fn evaluate(node: &FieldNode, field_type: FieldType, answer: &Answer) -> Option<FlagReason> {
    let conditions = node.flag_conditions.as_ref().filter(|c| c.enabled)?;
    match field_type {
        FieldType::Dropdown | FieldType::SearchDropdown => {
            let value = answer.as_text().filter(|v| !v.is_empty())?;
            match_listed(
                value,
                conditions.abnormal_choice_values(),
                &conditions.normal_values,
                |a, b| a == b,
            )
        }
        FieldType::Button => {
            let status = answer.status()?;
            match_listed(
                status.as_str(),
                conditions.abnormal_button_values(),
                &conditions.normal_values,
                |a, b| a.eq_ignore_ascii_case(b),
            )
        }
        FieldType::Measurement => evaluate_measurement(node, conditions, answer.measurement()),
        _ => None,
    }
}

fn match_listed<'c>(
    value: &str,
    mut abnormal: impl Iterator<Item = &'c String>,
    normal: &[String],
    eq: impl Fn(&str, &str) -> bool,
) -> Option<FlagReason> {
    if abnormal.any(|listed| eq(listed.as_str(), value)) {
        return Some(FlagReason::AbnormalValue(value.to_string()));
    }
    if !normal.is_empty() && !normal.iter().any(|listed| eq(listed.as_str(), value)) {
        return Some(FlagReason::NotNormal(value.to_string()));
    }
    None
}

fn evaluate_measurement(
    node: &FieldNode,
    conditions: &FlagConditions,
    value: Option<f64>,
) -> Option<FlagReason> {
    let Some(value) = value else {
        return conditions
            .required
            .then_some(FlagReason::MissingMeasurement);
    };
    let (min, max) = if conditions.use_measurement_settings {
        node.measurement
            .map(|spec| spec.effective_bounds())
            .unwrap_or((None, None))
    } else {
        (conditions.min_value, conditions.max_value)
    };
    if !out_of_bounds(value, min, max) {
        return None;
    }
    match (min, max) {
        (Some(min), _) if value < min => Some(FlagReason::BelowMinimum { value, min }),
        (_, Some(max)) => Some(FlagReason::AboveMaximum { value, max }),
        _ => None,
    }
}

//! Measurement status, flag and submission tests
mod common;
use common::*;
use kensa::flag::FlagReason;
use kensa::prelude::*;
use kensa::schema::{FieldOptions, SubformSpec};
use kensa::store::instance_key;

fn filled_receiving() -> Inspection {
    let mut inspection = Inspection::new(receiving_form());
    inspection.set_text(DEFECT, "No").unwrap();
    inspection.set_measurement(THICKNESS, Some(15.0)).unwrap();
    inspection
}

#[cfg(test)]
mod measurement_tests {
    use super::*;

    fn status(inspection: &Inspection) -> Option<PassHold> {
        inspection.store().get(THICKNESS).unwrap().answer.status()
    }

    #[test]
    fn test_auto_status_follows_every_value_change() {
        let mut inspection = Inspection::new(receiving_form());

        inspection.set_measurement(THICKNESS, Some(15.0)).unwrap();
        assert_eq!(status(&inspection), Some(PassHold::Pass));

        inspection.set_measurement(THICKNESS, Some(25.0)).unwrap();
        assert_eq!(status(&inspection), Some(PassHold::Hold));

        inspection.set_status(THICKNESS, PassHold::Pass).unwrap();
        assert_eq!(status(&inspection), Some(PassHold::Pass));
        assert_eq!(
            inspection.store().get(THICKNESS).unwrap().answer.measurement(),
            Some(25.0)
        );

        inspection.set_status(THICKNESS, PassHold::Hold).unwrap();
        inspection.set_measurement(THICKNESS, Some(12.0)).unwrap();
        assert_eq!(status(&inspection), Some(PassHold::Pass));
    }

    #[test]
    fn test_non_finite_readings_count_as_no_reading() {
        let mut inspection = filled_receiving();
        inspection.set_measurement(THICKNESS, Some(f64::NAN)).unwrap();
        let record = inspection.store().get(THICKNESS).unwrap();
        assert!(!record.has_value());
        assert_eq!(record.answer.status(), None);

        // A required reading that is not a number is reported as missing.
        let err = inspection.prepare(SubmitMode::Final).unwrap_err();
        assert!(err.to_string().contains("Thickness"));

        inspection
            .set_measurement(THICKNESS, Some(f64::INFINITY))
            .unwrap();
        let submission = inspection.prepare(SubmitMode::Draft).unwrap();
        assert!(submission.payload.responses.iter().all(|r| r.field_id != 3));
    }

    #[test]
    fn test_clearing_the_value_clears_the_status() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_measurement(THICKNESS, Some(25.0)).unwrap();
        inspection.set_measurement(THICKNESS, None).unwrap();
        let record = inspection.store().get(THICKNESS).unwrap();
        assert!(!record.has_value());
        assert_eq!(record.answer.status(), None);
    }
}

#[cfg(test)]
mod submission_tests {
    use super::*;

    #[test]
    fn test_payload_contains_only_persisted_non_empty_answers() {
        let mut inspection = filled_receiving();
        inspection.set_text(SURFACE_PHOTO, "surface.jpg").unwrap();

        let submission = inspection.prepare(SubmitMode::Final).unwrap();
        let responses = &submission.payload.responses;
        assert_eq!(submission.payload.form_id, 10);
        assert_eq!(responses.len(), 3);

        assert_eq!(responses[0].field_id, 1);
        assert_eq!(responses[0].response_value.as_deref(), Some("No"));
        assert_eq!(responses[1].field_id, 2);
        assert_eq!(responses[1].response_value.as_deref(), Some("surface.jpg"));
        assert_eq!(responses[2].field_id, 3);
        assert_eq!(responses[2].measurement_value, Some(15.0));
        assert_eq!(responses[2].pass_hold_status, Some(PassHold::Pass));
        assert!(!submission.has_flags);
    }

    #[test]
    fn test_branch_answers_without_id_never_reach_the_payload() {
        let mut inspection = filled_receiving();
        inspection.set_text(DEFECT, "Yes").unwrap();
        inspection.set_text(DESCRIPTION, "Bent flange").unwrap();
        inspection.set_text(SEVERITY, "High").unwrap();
        inspection.set_status(HOLD_TAG, PassHold::Hold).unwrap();

        let submission = inspection.prepare(SubmitMode::Final).unwrap();
        assert!(
            submission
                .payload
                .responses
                .iter()
                .all(|r| r.field_id == 1 || r.field_id == 3)
        );
        let unpersisted: Vec<_> = submission.unpersisted.iter().map(|k| k.as_str()).collect();
        assert_eq!(unpersisted, vec![DESCRIPTION, SEVERITY, HOLD_TAG]);

        // Flags are still evaluated for unpersisted answers.
        assert!(submission.flags.iter().any(|f| f.key.as_str() == HOLD_TAG));
        assert!(submission.payload.responses[0].is_flagged);
    }

    #[test]
    fn test_orphaned_answers_are_reported_not_submitted() {
        let mut inspection = filled_receiving();
        inspection.set_text(DEFECT, "Yes").unwrap();
        inspection.set_text(DESCRIPTION, "Stale").unwrap();
        inspection.set_text(DEFECT, "No").unwrap();

        let submission = inspection.prepare(SubmitMode::Final).unwrap();
        assert_eq!(submission.orphaned, vec![ResponseKey::from(DESCRIPTION)]);
        assert!(submission.unpersisted.is_empty());
        assert!(
            submission
                .payload
                .responses
                .iter()
                .all(|r| r.response_value.as_deref() != Some("Stale"))
        );
    }

    #[test]
    fn test_missing_required_answers_block_final_submission() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(DEFECT, "Yes").unwrap();

        let err = inspection.prepare(SubmitMode::Final).unwrap_err();
        let missing = match err {
            SubmissionError::MissingRequired(missing) => missing,
            other => panic!("expected missing answers, got {other}"),
        };
        let keys: Vec<_> = missing.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(keys, vec![DESCRIPTION, THICKNESS]);
        assert_eq!(missing[0].field_name, "Defect Description");
    }

    #[test]
    fn test_inactive_required_fields_are_not_demanded() {
        let mut inspection = filled_receiving();
        inspection.set_text(DEFECT, "Yes").unwrap();
        inspection.set_text(DEFECT, "No").unwrap();
        assert!(inspection.prepare(SubmitMode::Final).is_ok());
    }

    #[test]
    fn test_draft_mode_and_lenient_config_skip_validation() {
        let inspection = Inspection::new(receiving_form());
        let draft = inspection.prepare(SubmitMode::Draft).unwrap();
        assert!(draft.payload.responses.is_empty());
        assert_eq!(draft.mode, SubmitMode::Draft);

        let lenient = Inspection::builder(receiving_form())
            .strict_required(false)
            .build();
        assert!(lenient.prepare(SubmitMode::Final).is_ok());
    }

    #[test]
    fn test_flags_mark_abnormal_answers() {
        let mut inspection = filled_receiving();
        inspection.set_measurement(THICKNESS, Some(22.5)).unwrap();

        let submission = inspection.prepare(SubmitMode::Final).unwrap();
        assert!(submission.has_flags);
        assert_eq!(submission.flags.len(), 1);
        assert_eq!(
            submission.flags[0].reason,
            FlagReason::AboveMaximum {
                value: 22.5,
                max: 20.0
            }
        );
        let thickness = submission
            .payload
            .responses
            .iter()
            .find(|r| r.field_id == 3)
            .unwrap();
        assert!(thickness.is_flagged);
        assert_eq!(thickness.pass_hold_status, Some(PassHold::Hold));
    }

    #[test]
    fn test_subform_payload_and_required_template_fields() {
        let mut inspection = Inspection::new(subform_form());
        let slot = ResponseKey::from("20");

        let err = inspection.prepare(SubmitMode::Final).unwrap_err();
        assert!(err.to_string().contains("Reject Code"));

        inspection
            .set_text(instance_key(&slot, 0, "Reject Code").as_str(), "R-01")
            .unwrap();
        inspection
            .set_measurement(instance_key(&slot, 0, "Qty").as_str(), Some(3.0))
            .unwrap();
        let second = inspection.add_subform_instance("20").unwrap();
        inspection
            .set_text(instance_key(&slot, second, "Reject Code").as_str(), "R-09")
            .unwrap();
        inspection
            .set_measurement(instance_key(&slot, second, "Qty").as_str(), Some(9.0))
            .unwrap();

        let submission = inspection.prepare(SubmitMode::Final).unwrap();
        assert_eq!(submission.payload.responses.len(), 1);
        let value: serde_json::Value = serde_json::from_str(
            submission.payload.responses[0]
                .response_value
                .as_deref()
                .unwrap(),
        )
        .unwrap();
        // Each reading travels with the status the inspector saw.
        assert_eq!(
            value,
            serde_json::json!([
                {
                    "id": 0,
                    "data": { "Reject Code": "R-01", "Qty": { "value": 3.0, "status": "pass" } }
                },
                {
                    "id": 1,
                    "data": { "Reject Code": "R-09", "Qty": { "value": 9.0, "status": "hold" } }
                }
            ])
        );
        assert!(submission.orphaned.is_empty());
    }

    #[test]
    fn test_manual_status_of_subform_reading_is_submitted() {
        let mut inspection = Inspection::new(subform_form());
        let slot = ResponseKey::from("20");
        let qty = instance_key(&slot, 0, "Qty");
        inspection
            .set_text(instance_key(&slot, 0, "Reject Code").as_str(), "R-03")
            .unwrap();
        inspection.set_measurement(qty.as_str(), Some(9.0)).unwrap();
        inspection.set_status(qty.as_str(), PassHold::Pass).unwrap();

        let submission = inspection.prepare(SubmitMode::Final).unwrap();
        let value: serde_json::Value = serde_json::from_str(
            submission.payload.responses[0]
                .response_value
                .as_deref()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            value[0]["data"]["Qty"],
            serde_json::json!({ "value": 9.0, "status": "pass" })
        );
    }

    #[test]
    fn test_required_notes_in_subform_template_are_not_demanded() {
        let spec = SubformSpec {
            fields: vec![
                FieldNode::new("Read me", FieldTypes::single(FieldType::Notes)).required(),
                FieldNode::new("Lot", FieldTypes::single(FieldType::Text)).required(),
            ],
            min_instances: 1,
            max_instances: 0,
        };
        let form = Form::new(30, "Lots").with_field(
            FieldNode::new("Lots", FieldTypes::single(FieldType::Subform))
                .with_id(30)
                .with_options(FieldOptions {
                    subform: Some(spec),
                    ..FieldOptions::default()
                }),
        );
        let mut inspection = Inspection::new(form);
        let slot = ResponseKey::from("30");

        let err = inspection.prepare(SubmitMode::Final).unwrap_err();
        let missing = match err {
            SubmissionError::MissingRequired(missing) => missing,
            other => panic!("expected missing answers, got {other}"),
        };
        let names: Vec<_> = missing.iter().map(|m| m.field_name.as_str()).collect();
        assert_eq!(names, vec!["Lot"]);

        inspection
            .set_text(instance_key(&slot, 0, "Lot").as_str(), "L-42")
            .unwrap();
        assert!(inspection.prepare(SubmitMode::Final).is_ok());
    }

    #[test]
    fn test_payload_json_shape() {
        let submission = filled_receiving().prepare(SubmitMode::Final).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&submission.payload.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "form_id": 10,
                "responses": [
                    { "field_id": 1, "response_value": "No", "is_flagged": false },
                    {
                        "field_id": 3,
                        "measurement_value": 15.0,
                        "pass_hold_status": "pass",
                        "is_flagged": false
                    }
                ]
            })
        );
    }
}

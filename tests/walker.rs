//! Traversal tests: which fields are active for a given set of answers.
mod common;
use common::*;
use kensa::prelude::*;
use kensa::walker::Prefill;

fn active_keys(inspection: &Inspection) -> Vec<String> {
    inspection.active().keys().map(|k| k.to_string()).collect()
}

#[cfg(test)]
mod walker_tests {
    use super::*;

    #[test]
    fn test_roots_are_active_and_materialized() {
        let inspection = Inspection::new(receiving_form());
        assert_eq!(
            active_keys(&inspection),
            vec![DEFECT, SURFACE_DROPDOWN, SURFACE_PHOTO, THICKNESS, DOC_NUMBER, NOTES]
        );
        for key in active_keys(&inspection) {
            let record = inspection.store().get(&key).expect("record exists");
            assert!(!record.has_value());
        }
        assert!(!inspection.store().contains(DESCRIPTION));
    }

    #[test]
    fn test_matching_answer_activates_branch() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(DEFECT, "Yes").unwrap();

        let tree = inspection.active();
        let description = tree.slot(DESCRIPTION).expect("description active").0;
        assert_eq!(description.depth, 1);
        assert_eq!(description.node.id, None);
        assert_eq!(tree.find_by_path(&FieldPath::root(0)).unwrap().matched_rule, Some(0));
        assert!(inspection.store().contains(DESCRIPTION));
        assert!(inspection.store().contains(SEVERITY));
        assert!(!tree.is_active(HOLD_TAG));

        // Exactly one new record per revealed slot.
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_nested_branch_and_deactivation() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(DEFECT, "Yes").unwrap();
        inspection.set_text(SEVERITY, "High").unwrap();
        assert!(inspection.active().is_active(HOLD_TAG));

        inspection.set_text(DEFECT, "No").unwrap();
        let tree = inspection.active();
        assert!(!tree.is_active(DESCRIPTION));
        assert!(!tree.is_active(SEVERITY));
        assert!(!tree.is_active(HOLD_TAG));
        // Records outlive their branch.
        assert!(inspection.store().contains(HOLD_TAG));
    }

    #[test]
    fn test_toggling_back_restores_retained_answer() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(DEFECT, "Yes").unwrap();
        inspection.set_text(DESCRIPTION, "Scratch on lid").unwrap();

        inspection.set_text(DEFECT, "No").unwrap();
        assert!(!inspection.active().is_active(DESCRIPTION));
        assert_eq!(inspection.store().text(DESCRIPTION), Some("Scratch on lid"));

        inspection.set_text(DEFECT, "Yes").unwrap();
        assert!(inspection.active().is_active(DESCRIPTION));
        assert_eq!(inspection.store().text(DESCRIPTION), Some("Scratch on lid"));
    }

    #[test]
    fn test_empty_or_unknown_answer_matches_nothing() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(DEFECT, "").unwrap();
        assert_eq!(inspection.active().len(), 5);
        inspection.set_text(DEFECT, "yes").unwrap();
        assert_eq!(inspection.active().len(), 5);
        inspection.set_text(DEFECT, "Maybe").unwrap();
        assert_eq!(inspection.active().len(), 5);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let form = Form::new(1, "Twice").with_field(
            FieldNode::new("Pick", FieldTypes::single(FieldType::Dropdown))
                .with_id(1)
                .with_choices(["Go"])
                .with_rule(
                    "Go",
                    vec![FieldNode::new("First", FieldTypes::single(FieldType::Text))],
                )
                .with_rule(
                    "Go",
                    vec![FieldNode::new("Second", FieldTypes::single(FieldType::Text))],
                ),
        );
        let mut inspection = Inspection::new(form);
        inspection.set_text("1", "Go").unwrap();

        let tree = inspection.active();
        assert_eq!(tree.len(), 2);
        assert!(tree.is_active("1-rule0-field0-First"));
        assert!(!tree.is_active("1-rule1-field0-Second"));
        assert_eq!(tree.nodes()[0].matched_rule, Some(0));
    }

    #[test]
    fn test_rules_ignored_without_conditional_flag() {
        let mut form = receiving_form();
        form.fields[0].has_conditional = false;
        let mut inspection = Inspection::new(form);
        inspection.set_text(DEFECT, "Yes").unwrap();
        assert!(!inspection.active().is_active(DESCRIPTION));
        assert!(!inspection.store().contains(DESCRIPTION));
    }

    #[test]
    fn test_rules_ignored_on_non_choice_primary() {
        let mut field = FieldNode::new("Free", FieldTypes::new(FieldType::Text, [FieldType::Dropdown]))
            .with_id(1)
            .with_choices(["Go"]);
        field.has_conditional = true;
        field.rules.push(ConditionalRule::new(
            "Go",
            vec![FieldNode::new("Never", FieldTypes::single(FieldType::Text))],
        ));
        let mut inspection = Inspection::new(Form::new(1, "Typed").with_field(field));

        inspection.set_text("1-text", "Go").unwrap();
        inspection.set_text("1-dropdown", "Go").unwrap();
        assert_eq!(inspection.active().len(), 1);
    }

    #[test]
    fn test_secondary_type_does_not_drive_branching() {
        let field = FieldNode::new("Result", FieldTypes::new(FieldType::Dropdown, [FieldType::Text]))
            .with_id(1)
            .with_choices(["Bad"])
            .with_rule(
                "Bad",
                vec![FieldNode::new("Why", FieldTypes::single(FieldType::Text))],
            );
        let mut inspection = Inspection::new(Form::new(1, "Secondary").with_field(field));

        inspection.set_text("1-text", "Bad").unwrap();
        assert_eq!(inspection.active().len(), 1);
        inspection.set_text("1-dropdown", "Bad").unwrap();
        assert_eq!(inspection.active().len(), 2);
        assert_eq!(inspection.store().text("1-text"), Some("Bad"));
    }

    #[test]
    fn test_multi_typed_slots_are_independent() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(SURFACE_DROPDOWN, "Dirty").unwrap();
        inspection.set_text(SURFACE_PHOTO, "surface_01.jpg").unwrap();
        inspection.set_text(SURFACE_DROPDOWN, "Clean").unwrap();

        assert_eq!(inspection.store().text(SURFACE_DROPDOWN), Some("Clean"));
        assert_eq!(inspection.store().text(SURFACE_PHOTO), Some("surface_01.jpg"));
    }

    #[test]
    fn test_walk_is_a_pure_function_of_the_snapshot() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(DEFECT, "Yes").unwrap();
        let snapshot = inspection.store().clone();
        let form = inspection.form().clone();

        let walker = TreeWalker::new(&form);
        let first: Vec<_> = walker.walk(&snapshot).keys().cloned().collect();
        inspection.set_text(DEFECT, "No").unwrap();
        let second: Vec<_> = walker.walk(&snapshot).keys().cloned().collect();
        assert_eq!(first, second);
        assert!(first.iter().any(|k| k.as_str() == DESCRIPTION));
    }

    #[test]
    fn test_sync_without_missing_records_keeps_the_store() {
        let inspection = Inspection::new(receiving_form());
        let form = inspection.form().clone();
        let store = inspection.store().clone();

        let synced = TreeWalker::new(&form).sync(&store, &Prefill::none());
        assert!(synced.same_as(&store));
    }

    #[test]
    fn test_sync_prefills_doc_number_into_new_records_only() {
        let form = receiving_form();
        let patterns = vec!["no. doc".to_string()];
        let prefill = Prefill {
            doc_number: Some("GOORE-20250001"),
            doc_field_patterns: &patterns,
        };
        let walker = TreeWalker::new(&form);

        let store = walker.sync(&ResponseStore::new(), &prefill);
        assert_eq!(store.text(DOC_NUMBER), Some("GOORE-20250001"));

        let edited = store
            .update(DOC_NUMBER, |r| {
                r.answer = Answer::Text("MANUAL-1".into());
                Ok(())
            })
            .unwrap();
        let resynced = walker.sync(&edited, &prefill);
        assert_eq!(resynced.text(DOC_NUMBER), Some("MANUAL-1"));
    }

    #[test]
    fn test_tree_display_shows_branches_and_answers() {
        let mut inspection = Inspection::new(receiving_form());
        inspection.set_text(DEFECT, "Yes").unwrap();
        inspection.set_text(DESCRIPTION, "Dent").unwrap();

        let rendered = inspection.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("├── Defect Found? * [dropdown: \"Yes\"] -> rule #0"));
        assert!(lines[1].starts_with("│   ├── Defect Description * [text: \"Dent\"]"));
        assert!(lines[2].starts_with("│   └── Severity [dropdown: -]"));
        assert!(lines[6].starts_with("└── Instructions [notes: -]"));
    }
}

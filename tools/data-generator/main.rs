use clap::Parser;
use kensa::prelude::*;
use kensa::schema::{WireField, WireOptions, WireRule};
use rand::{Rng, rngs::ThreadRng};
use serde::Serialize;
use std::fs;

/// A CLI tool to generate deep conditional inspection forms for stress testing
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated form JSON to
    #[arg(short, long, default_value = "generated_form.json")]
    output: String,

    /// Also fill the form at random and write the edits to this path
    #[arg(short, long)]
    answers: Option<String>,

    /// Number of root fields
    #[arg(long, default_value_t = 12)]
    roots: usize,

    /// Maximum nesting depth of conditional branches
    #[arg(long, default_value_t = 4)]
    depth: usize,

    /// Maximum number of fields revealed by one rule
    #[arg(long, default_value_t = 3)]
    fanout: usize,
}

const CHOICES: [&str; 4] = ["OK", "Minor", "Major", "N/A"];

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rand::rng();

    if cli.fanout == 0 {
        eprintln!("Error: --fanout must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating form (roots: {}, depth: {}, fanout: {})...",
        cli.roots, cli.depth, cli.fanout
    );

    let mut generated = 0usize;
    let fields = (0..cli.roots)
        .map(|idx| {
            let name = format!("Check {}", idx + 1);
            let mut field = generate_field(&mut rng, &name, cli.depth, cli.fanout, &mut generated);
            field.id = Some(idx as u64 + 1);
            field.field_order = idx as i32;
            field
        })
        .collect();

    let wire = WireForm {
        id: 1,
        form_name: "Generated Inspection".to_string(),
        description: Some("Randomly generated conditional form".to_string()),
        fields,
    };

    let json_output = serde_json::to_string_pretty(&wire)?;
    fs::write(&cli.output, &json_output)?;
    println!("-> Wrote {} field(s) to '{}'", generated, cli.output);

    if let Some(path) = &cli.answers {
        let form = Form::from_json(&json_output)?;
        let edits = fill_at_random(&mut rng, form)?;
        fs::write(path, serde_json::to_string_pretty(&edits)?)?;
        println!("-> Wrote {} edit(s) to '{}'", edits.len(), path);
    }

    Ok(())
}

/// Builds one field; choice fields get rules down to `depth`.
fn generate_field(
    rng: &mut ThreadRng,
    name: &str,
    depth: usize,
    fanout: usize,
    generated: &mut usize,
) -> WireField {
    *generated += 1;
    let field_type = match rng.random_range(0..10) {
        0..=3 if depth > 0 => FieldType::Dropdown,
        0..=1 => FieldType::Text,
        2..=3 => FieldType::Button,
        4..=6 => FieldType::Measurement,
        7 => FieldType::Date,
        _ => FieldType::Text,
    };

    let mut field = WireField {
        field_name: name.to_string(),
        field_type: Some(field_type),
        is_required: rng.random_bool(0.3),
        ..WireField::default()
    };

    match field_type {
        FieldType::Dropdown => {
            let rules = CHOICES
                .iter()
                .filter(|_| rng.random_bool(0.5))
                .map(|trigger| WireRule {
                    condition_value: trigger.to_string(),
                    next_fields: Vec::new(),
                })
                .collect::<Vec<_>>();
            let rules = rules
                .into_iter()
                .map(|mut rule| {
                    let count = rng.random_range(1..=fanout);
                    rule.next_fields = (0..count)
                        .map(|i| {
                            let child_name = format!("{} / {} {}", name, rule.condition_value, i + 1);
                            generate_field(rng, &child_name, depth - 1, fanout, generated)
                        })
                        .collect();
                    rule
                })
                .collect::<Vec<_>>();
            field.has_conditional = Some(!rules.is_empty());
            field.conditional_rules = Some(rules);
            field.field_options = Some(WireOptions {
                options: CHOICES.iter().map(|c| c.to_string()).collect(),
                ..WireOptions::default()
            });
            if rng.random_bool(0.3) {
                field.field_types = Some(vec![FieldType::Dropdown, FieldType::Photo]);
            }
        }
        FieldType::Measurement => {
            let min = rng.random_range(0.0..50.0_f64).round();
            field.measurement_min = Some(min);
            field.measurement_max = Some(min + rng.random_range(5.0..50.0_f64).round());
            if rng.random_bool(0.5) {
                field.flag_conditions = Some(FlagConditions::from_measurement_settings());
            }
        }
        _ => {}
    }

    field
}

#[derive(Serialize)]
struct Edit {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    measurement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<PassHold>,
}

/// Answers every empty active slot until no new field opens up.
fn fill_at_random(rng: &mut ThreadRng, form: Form) -> std::result::Result<Vec<Edit>, StoreError> {
    let mut inspection = Inspection::new(form);
    let mut edits = Vec::new();

    loop {
        let pending: Vec<(ResponseKey, FieldType, Vec<String>)> = {
            let tree = inspection.active();
            tree.nodes()
                .iter()
                .flat_map(|active| {
                    active.slots.iter().map(|(field_type, key)| {
                        (key.clone(), *field_type, active.node.options.choices.clone())
                    })
                })
                .filter(|(key, _, _)| {
                    !inspection
                        .store()
                        .get(key.as_str())
                        .is_some_and(|r| r.has_value())
                })
                .collect()
        };
        let before = edits.len();

        for (key, field_type, choices) in pending {
            let mut edit = Edit {
                key: key.to_string(),
                text: None,
                measurement: None,
                status: None,
            };
            match field_type {
                FieldType::Dropdown | FieldType::SearchDropdown if !choices.is_empty() => {
                    let choice = choices[rng.random_range(0..choices.len())].clone();
                    inspection.set_text(key.as_str(), choice.as_str())?;
                    edit.text = Some(choice);
                }
                FieldType::Measurement => {
                    let value = rng.random_range(0.0..100.0_f64).round();
                    inspection.set_measurement(key.as_str(), Some(value))?;
                    edit.measurement = Some(value);
                }
                FieldType::Button => {
                    let status = if rng.random_bool(0.8) {
                        PassHold::Pass
                    } else {
                        PassHold::Hold
                    };
                    inspection.set_status(key.as_str(), status)?;
                    edit.status = Some(status);
                }
                FieldType::Photo => {
                    let name = format!("photo_{}.jpg", rng.random_range(1000..9999));
                    inspection.set_text(key.as_str(), name.as_str())?;
                    edit.text = Some(name);
                }
                FieldType::Date => {
                    let date = format!(
                        "2025-{:02}-{:02}",
                        rng.random_range(1..=12),
                        rng.random_range(1..=28)
                    );
                    inspection.set_text(key.as_str(), date.as_str())?;
                    edit.text = Some(date);
                }
                FieldType::Text => {
                    let text = format!("Remark {}", rng.random_range(1..100));
                    inspection.set_text(key.as_str(), text.as_str())?;
                    edit.text = Some(text);
                }
                _ => continue,
            }
            edits.push(edit);
        }

        if edits.len() == before {
            break;
        }
    }

    Ok(edits)
}

use clap::Parser;
use kensa::prelude::*;
use serde::Deserialize;
use std::fs;
use std::time::Instant;

// --- Answer File Format ---
// One entry per edit, replayed in order so that branch answers can target
// fields revealed by earlier entries.

#[derive(Deserialize, Debug)]
struct RawEdit {
    key: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    measurement: Option<f64>,
    #[serde(default)]
    status: Option<PassHold>,
    /// Appends this many instances to a subform slot.
    #[serde(default)]
    add_instances: usize,
    #[serde(default)]
    clear: bool,
}

/// Replays captured answers against an inspection form and prints the result
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the form JSON file (backend shape)
    form_path: String,
    /// Optional path to a JSON list of answer edits
    answers_path: Option<String>,

    /// Prepare a draft: required answers are not enforced
    #[arg(short, long)]
    draft: bool,

    /// Document number to pre-fill into the document field
    #[arg(long)]
    doc_number: Option<String>,

    /// Write a bincode draft snapshot to this path
    #[arg(long)]
    save_draft: Option<String>,

    /// Resume from a bincode draft snapshot before replaying answers
    #[arg(long)]
    resume: Option<String>,

    /// List every key the form can ever produce and exit
    #[arg(long)]
    keys: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let total_start = Instant::now();

    // --- 1. Form Loading ---
    let form_json = fs::read_to_string(&cli.form_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read form file '{}': {}",
            &cli.form_path, e
        ))
    });
    let form = Form::from_json(&form_json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load form: {}", e)));
    if let Err(e) = form.validate() {
        exit_with_error(&format!("Form is invalid: {}", e));
    }
    println!(
        "Loaded form '{}' (#{}) with {} root field(s)",
        form.name,
        form.id,
        form.fields.len()
    );

    if cli.keys {
        print_catalog(&form);
        return;
    }

    // --- 2. Inspection Setup ---
    let mut builder = Inspection::builder(form);
    if let Some(number) = &cli.doc_number {
        builder = builder.doc_number(number);
    }
    let mut inspection = builder.build();

    if let Some(path) = &cli.resume {
        let draft = Draft::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load draft: {}", e)));
        inspection
            .restore(&draft)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to resume draft: {}", e)));
        println!("Resumed draft from '{}'", path);
    }

    // --- 3. Answer Replay ---
    if let Some(path) = &cli.answers_path {
        let answers_json = fs::read_to_string(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to read answers file '{}': {}", path, e))
        });
        let edits: Vec<RawEdit> = serde_json::from_str(&answers_json)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse answers JSON: {}", e)));
        let replay_start = Instant::now();
        for edit in &edits {
            if let Err(e) = apply(&mut inspection, edit) {
                exit_with_error(&format!("Edit of '{}' failed: {}", edit.key, e));
            }
        }
        println!(
            "Replayed {} edit(s) in {:?}",
            edits.len(),
            replay_start.elapsed()
        );
    }

    // --- 4. Active Tree ---
    println!("\n--- Active Fields ---");
    print!("{}", inspection.render());

    if let Some(path) = &cli.save_draft {
        inspection
            .draft()
            .save(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save draft: {}", e)));
        println!("\nDraft saved to '{}'", path);
    }

    // --- 5. Submission ---
    let mode = if cli.draft {
        SubmitMode::Draft
    } else {
        SubmitMode::Final
    };
    let submission = inspection
        .prepare(mode)
        .unwrap_or_else(|e| exit_with_error(&format!("Submission rejected: {}", e)));

    if submission.has_flags {
        println!("\n--- Flagged Answers ---");
        for flagged in &submission.flags {
            println!("  -> {} ({}): {}", flagged.field_name, flagged.key, flagged.reason);
        }
    }
    if !submission.unpersisted.is_empty() {
        println!("\n--- Answers Without A Persisted Field ---");
        for key in &submission.unpersisted {
            println!("  -> {}", key);
        }
    }
    if !submission.orphaned.is_empty() {
        println!("\n--- Retained Answers Of Inactive Fields ---");
        for key in &submission.orphaned {
            println!("  -> {}", key);
        }
    }

    println!("\n--- Payload ---");
    let payload = submission
        .payload
        .to_json()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize payload: {}", e)));
    println!("{}", payload);

    println!("\nTotal Execution: {:?}", total_start.elapsed());
}

fn apply(inspection: &mut Inspection, edit: &RawEdit) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if edit.clear {
        inspection.clear(&edit.key)?;
        return Ok(());
    }
    for _ in 0..edit.add_instances {
        let id = inspection.add_subform_instance(&edit.key)?;
        println!("Added instance {} to '{}'", id, edit.key);
    }
    if let Some(text) = &edit.text {
        inspection.set_text(&edit.key, text.as_str())?;
    }
    if let Some(value) = edit.measurement {
        inspection.set_measurement(&edit.key, Some(value))?;
    }
    // Applied after the reading so an explicit status acts as an override.
    if let Some(status) = edit.status {
        inspection.set_status(&edit.key, status)?;
    }
    Ok(())
}

fn print_catalog(form: &Form) {
    let catalog = KeyCatalog::build(form);
    println!("\n--- Response Keys ({}) ---", catalog.len());
    for entry in catalog.entries() {
        println!(
            "{:<48} {:<16} {} @ {}",
            entry.key.as_str(),
            entry.field_type.as_str(),
            entry.field_name,
            entry.path
        );
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}

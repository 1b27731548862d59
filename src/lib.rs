//! # Kensa - Conditional Inspection Form Engine
//!
//! **Kensa** models quality-inspection forms whose fields branch: a dropdown
//! answer can reveal further fields, which can branch again, to any depth.
//! It assigns every answer slot a stable key, decides which fields are active
//! for the answers captured so far, and flattens the active answers into the
//! request an inspection backend accepts.
//!
//! ## Core Workflow
//!
//! 1.  **Load a Form**: Parse the backend's JSON with `Form::from_json`, or implement
//!     `IntoForm` for your own schema format.
//! 2.  **Start an Inspection**: `Inspection::new(form)` materializes an empty record for
//!     every root field. `InspectionBuilder` adjusts document numbering and validation.
//! 3.  **Capture Answers**: Every edit produces a new `ResponseStore` and re-walks the
//!     tree, so fields revealed by a branch get their records immediately. Answers in
//!     branches that close again are kept, and come back when the branch reopens.
//! 4.  **Submit**: `Inspection::prepare` validates required answers and builds the
//!     payload, or `client::submit_inspection` sends it through an `InspectionBackend`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kensa::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let form_json = std::fs::read_to_string("path/to/form.json")?;
//!     let form = Form::from_json(&form_json)?;
//!     form.validate()?;
//!
//!     let mut inspection = Inspection::builder(form)
//!         .doc_number("GRF-20250001")
//!         .build();
//!
//!     // Keys of root fields are their persisted ids.
//!     inspection.set_text("1", "Yes")?;
//!     inspection.set_measurement("2", Some(15.0))?;
//!
//!     println!("{}", inspection.render());
//!
//!     let submission = inspection.prepare(SubmitMode::Final)?;
//!     println!("{}", submission.payload.to_json()?);
//!     for key in &submission.unpersisted {
//!         println!("not persisted: {}", key);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod flag;
pub mod inspection;
pub mod key;
pub mod measurement;
pub mod prelude;
pub mod schema;
pub mod store;
pub mod submission;
pub mod walker;

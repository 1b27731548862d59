//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kensa crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kensa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let form = Form::from_json(&std::fs::read_to_string("path/to/form.json")?)?;
//! let mut inspection = Inspection::new(form);
//! inspection.set_status("3", PassHold::Hold)?;
//!
//! let submission = inspection.prepare(SubmitMode::Draft)?;
//! println!("Flagged: {}", submission.has_flags);
//! # Ok(())
//! # }
//! ```

// Schema
pub use crate::schema::{
    ConditionalRule, FieldNode, FieldPath, FieldType, FieldTypes, FlagConditions, Form,
    IntoForm, MeasurementMode, MeasurementSpec, WireForm,
};

// Keys, store and traversal
pub use crate::key::{KeyCatalog, ResponseKey};
pub use crate::store::{Answer, Draft, PassHold, ResponseRecord, ResponseStore};
pub use crate::walker::{ActiveTree, DisplayTree, TreeWalker};

// Inspections and submission
pub use crate::inspection::{Inspection, InspectionBuilder};
pub use crate::submission::{InspectionCreate, Submission, SubmitMode};
pub use crate::client::{InspectionBackend, MemoryBackend};

// Error types
pub use crate::error::{ClientError, PathError, SchemaError, StoreError, SubmissionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

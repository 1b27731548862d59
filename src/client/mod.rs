//! The remote collaborator: form retrieval, inspection persistence and
//! document numbering.

use crate::error::{ClientError, SubmissionError};
use crate::inspection::Inspection;
use crate::schema::Form;
use crate::submission::{InspectionCreate, Submission, SubmitMode};
use log::{info, warn};
use serde::{Deserialize, Serialize};

mod memory;

pub use memory::{MemoryBackend, StoredInspection};

/// Review state of a stored inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionStatus {
    Draft,
    Submitted,
    Accepted,
    Rejected,
}

/// Calls the backend answers. Implementations decide transport and timeouts.
#[allow(async_fn_in_trait)]
pub trait InspectionBackend {
    async fn fetch_form(&self, form_id: u64) -> Result<Form, ClientError>;

    /// The next document number for inspections of `form_id`.
    async fn next_doc_number(&self, form_id: u64) -> Result<String, ClientError>;

    /// Stores a new inspection in draft state and returns its id.
    async fn create_inspection(&self, payload: &InspectionCreate) -> Result<u64, ClientError>;

    /// Moves a draft inspection to submitted.
    async fn submit_inspection(&self, inspection_id: u64) -> Result<(), ClientError>;
}

/// What the backend recorded for a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub inspection_id: u64,
    pub status: InspectionStatus,
    pub submission: Submission,
}

/// Fetches a form and starts an inspection on it.
///
/// When the form has a document-number field, the next number is requested;
/// a failure there is logged and the inspection starts without one.
pub async fn open_inspection<B: InspectionBackend>(
    backend: &B,
    form_id: u64,
) -> Result<Inspection, ClientError> {
    let form = backend.fetch_form(form_id).await?;
    let mut inspection = Inspection::new(form);
    if inspection.needs_doc_number() {
        match backend.next_doc_number(form_id).await {
            Ok(number) => inspection.set_doc_number(number),
            Err(e) => warn!("Failed to fetch document number for form {}: {}", form_id, e),
        }
    }
    Ok(inspection)
}

/// Prepares and sends an inspection. Drafts are created only; final
/// submissions are created and then submitted.
pub async fn submit_inspection<B: InspectionBackend>(
    backend: &B,
    inspection: &Inspection,
    mode: SubmitMode,
) -> Result<SubmissionReceipt, SubmissionError> {
    let submission = inspection.prepare(mode)?;
    let inspection_id = backend.create_inspection(&submission.payload).await?;
    let status = match mode {
        SubmitMode::Draft => InspectionStatus::Draft,
        SubmitMode::Final => {
            backend.submit_inspection(inspection_id).await?;
            InspectionStatus::Submitted
        }
    };
    info!(
        "Inspection {} stored as {:?} with {} response(s)",
        inspection_id,
        status,
        submission.payload.responses.len()
    );
    Ok(SubmissionReceipt {
        inspection_id,
        status,
        submission,
    })
}

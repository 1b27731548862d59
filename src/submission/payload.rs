use crate::store::PassHold;
use serde::{Deserialize, Serialize};

/// One persisted answer in the create-inspection request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionResponse {
    pub field_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_hold_status: Option<PassHold>,
    #[serde(default)]
    pub is_flagged: bool,
}

impl InspectionResponse {
    pub fn new(field_id: u64) -> Self {
        Self {
            field_id,
            response_value: None,
            measurement_value: None,
            pass_hold_status: None,
            is_flagged: false,
        }
    }
}

/// The create-inspection request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionCreate {
    pub form_id: u64,
    pub responses: Vec<InspectionResponse>,
}

impl InspectionCreate {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

//! Public lead-intake DTOs.
//!
//! The lead body is intentionally thin: intake only acknowledges the
//! submission after rate-limit admission; CRM processing happens
//! elsewhere.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request body for POST /api/v1/leads
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLeadRequest {
    #[validate(length(min = 1, max = 120, message = "Name required"))]
    pub name: String,

    #[validate(length(min = 8, max = 16, message = "Invalid phone length"))]
    pub phone: String,

    /// Free-form note from the web form
    #[validate(length(max = 2000, message = "Note too long"))]
    #[serde(default)]
    pub note: Option<String>,
}

/// Acknowledgement for an accepted lead submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadAcceptedResponse {
    /// Tracking reference handed back to the web form
    pub reference: Uuid,
    pub message: String,
}

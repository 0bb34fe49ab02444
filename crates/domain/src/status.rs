//! Status values and the transitions allowed between them.

use serde::{Deserialize, Serialize};

use crate::error::MSG_INVALID_TRANSITION;
use crate::models::text_enum;
use crate::DomainError;

text_enum! {
    /// Daily work report (작업일지) lifecycle.
    ReportStatus, "report status" {
        Draft => "draft",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl ReportStatus {
    /// The author may still edit the report body.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    pub fn transition(self, to: ReportStatus) -> Result<ReportStatus, DomainError> {
        use ReportStatus::*;
        match (self, to) {
            (Draft, Submitted) | (Rejected, Submitted) | (Submitted, Approved) | (Submitted, Rejected) => {
                Ok(to)
            }
            _ => Err(DomainError::conflict(MSG_INVALID_TRANSITION)),
        }
    }
}

text_enum! {
    MaterialRequestStatus, "material request status" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Delivered => "delivered",
    }
}

impl MaterialRequestStatus {
    pub fn transition(self, to: MaterialRequestStatus) -> Result<MaterialRequestStatus, DomainError> {
        use MaterialRequestStatus::*;
        match (self, to) {
            (Pending, Approved) | (Pending, Rejected) | (Approved, Delivered) => Ok(to),
            _ => Err(DomainError::conflict(MSG_INVALID_TRANSITION)),
        }
    }
}

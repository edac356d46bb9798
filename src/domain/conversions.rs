//! Lead conversion types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Request DTO for converting a lead
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversionRequest {
    #[serde(default)]
    pub create_deal: bool,
    /// Coerced to a non-negative number; never rejected.
    #[serde(default)]
    pub deal_value: Value,
}

impl ConversionRequest {
    pub fn without_deal() -> Self {
        Self::default()
    }

    pub fn with_deal(value: Value) -> Self {
        Self {
            create_deal: true,
            deal_value: value,
        }
    }
}

/// Ids produced by a successful conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub account_id: Uuid,
    pub contact_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<Uuid>,
}

/// Audit entry linking a converted lead to what it produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRecord {
    pub lead_id: Uuid,
    pub account_id: Uuid,
    pub contact_id: Uuid,
    pub deal_id: Option<Uuid>,
    /// Whether this conversion created the account rather than reusing it.
    pub account_created: bool,
    pub converted_by: Uuid,
    pub converted_at: DateTime<Utc>,
}

//! Bulk operation types
//!
//! A bulk call applies one operation to many leads, each in isolation, and
//! reports per-id outcomes instead of failing as a whole.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{EngineError, EngineResult};
use super::leads::{clean, Lead, LeadStatus};
use super::notices::Notice;

/// Operation applied to every id of a batch
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BulkOperation {
    /// Patch restricted to [`BulkLeadPatch::ALLOWED_FIELDS`].
    Update {
        #[serde(default)]
        fields: Map<String, Value>,
    },
    Delete,
    /// Move the lead to `Qualified`.
    Approve,
    MarkJunk,
    Email(EmailMessage),
    Tag {
        #[serde(default)]
        add: Vec<String>,
        #[serde(default)]
        remove: Vec<String>,
    },
    Campaign {
        campaign_id: String,
    },
    Convert {
        #[serde(default)]
        create_deal: bool,
        #[serde(default)]
        deal_value: Value,
    },
}

impl BulkOperation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Update { .. } => "update",
            Self::Delete => "delete",
            Self::Approve => "approve",
            Self::MarkJunk => "mark_junk",
            Self::Email(_) => "email",
            Self::Tag { .. } => "tag",
            Self::Campaign { .. } => "campaign",
            Self::Convert { .. } => "convert",
        }
    }
}

/// Mass email content; template rendering happens outside the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

/// The only fields a mass update may touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkLeadPatch {
    pub lead_status: Option<LeadStatus>,
    /// `Some(None)` clears the field.
    pub lead_source: Option<Option<String>>,
    pub industry: Option<Option<String>>,
}

impl BulkLeadPatch {
    pub const ALLOWED_FIELDS: [&'static str; 3] = ["lead_status", "lead_source", "industry"];

    /// Parse a raw field map, rejecting anything outside the allowed set.
    pub fn from_fields(fields: &Map<String, Value>) -> EngineResult<Self> {
        if fields.is_empty() {
            return Err(EngineError::validation("update has no fields"));
        }

        let mut rejected: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|key| !Self::ALLOWED_FIELDS.contains(key))
            .collect();
        if !rejected.is_empty() {
            rejected.sort_unstable();
            return Err(EngineError::validation(format!(
                "fields not allowed in bulk update: {}",
                rejected.join(", ")
            )));
        }

        let mut patch = Self::default();
        for (key, value) in fields {
            match key.as_str() {
                "lead_status" => {
                    let raw = value
                        .as_str()
                        .ok_or_else(|| EngineError::validation("lead_status must be a string"))?;
                    patch.lead_status = Some(raw.parse()?);
                }
                "lead_source" => patch.lead_source = Some(text(key, value)?),
                "industry" => patch.industry = Some(text(key, value)?),
                _ => {}
            }
        }

        Ok(patch)
    }

    pub fn apply(&self, lead: &mut Lead) -> EngineResult<()> {
        lead.ensure_mutable()?;

        if let Some(status) = self.lead_status {
            lead.set_status(status);
        }
        if let Some(source) = &self.lead_source {
            lead.lead_source = source.clone();
        }
        if let Some(industry) = &self.industry {
            lead.industry = industry.clone();
        }
        Ok(())
    }
}

fn text(key: &str, value: &Value) -> EngineResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(clean(Some(s.clone()))),
        _ => Err(EngineError::validation(format!("{key} must be a string"))),
    }
}

/// One failed id of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub id: Uuid,
    pub code: String,
    pub reason: String,
}

/// Per-id outcome of a batch. Both lists are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkResult {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<BulkFailure>,
    /// Ids never attempted because the batch was cancelled between chunks.
    pub skipped: Vec<Uuid>,
}

impl BulkResult {
    pub fn record(&mut self, id: Uuid, outcome: EngineResult<()>) {
        match outcome {
            Ok(()) => self.succeeded.push(id),
            Err(err) => self.failed.push(BulkFailure {
                id,
                code: err.code().to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// A non-empty `failed` list means partial success, not a hard error.
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty() && !self.succeeded.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len() + self.skipped.len()
    }

    pub fn notice(&self) -> Notice {
        let reasons: Vec<String> = self.failed.iter().map(|f| f.reason.clone()).collect();
        Notice::batch(self.succeeded.len(), &reasons, self.skipped.len())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn patch_accepts_allowed_fields() -> TestResult {
        let patch = BulkLeadPatch::from_fields(&fields(json!({
            "lead_status": "contacted",
            "lead_source": " Webinar ",
            "industry": null,
        })))?;

        assert_eq!(patch.lead_status, Some(LeadStatus::Contacted));
        assert_eq!(patch.lead_source, Some(Some("Webinar".to_string())));
        assert_eq!(patch.industry, Some(None));

        Ok(())
    }

    #[test]
    fn patch_rejects_identity_fields() {
        let result = BulkLeadPatch::from_fields(&fields(json!({
            "lead_status": "new",
            "email": "x@y.com",
            "company": "Other",
        })));

        match result {
            Err(EngineError::Validation(message)) => {
                assert!(message.contains("company, email"), "got {message}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(BulkLeadPatch::from_fields(&Map::new()).is_err());
    }

    #[test]
    fn operations_deserialize_from_tagged_json() -> TestResult {
        let op: BulkOperation = serde_json::from_value(json!({
            "type": "convert",
            "create_deal": true,
            "deal_value": "1500",
        }))?;
        assert_eq!(op.name(), "convert");

        let op: BulkOperation = serde_json::from_value(json!({
            "type": "email",
            "subject": "Hello",
            "body": "Welcome aboard",
        }))?;
        assert!(matches!(op, BulkOperation::Email(_)));

        Ok(())
    }

    #[test]
    fn result_records_both_outcomes() {
        let mut result = BulkResult::default();
        let ok = Uuid::now_v7();
        let bad = Uuid::now_v7();

        result.record(ok, Ok(()));
        result.record(bad, Err(EngineError::LeadLocked(bad)));

        assert_eq!(result.succeeded, vec![ok]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].code, "LEAD_LOCKED");
        assert!(result.is_partial());
        assert_eq!(result.notice().title, "Partial Success");
    }
}

//! Lead domain types
//!
//! A lead is a prospective contact that has not yet been validated as a
//! business relationship. Defaults are set by the constructor; the derived
//! `is_qualified` flag is only ever written through [`Lead::set_status`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::errors::{EngineError, EngineResult};
use super::numbers::{coerce_count, coerce_non_negative};
use crate::store::Record;

/// Lead qualification status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Unqualified,
}

impl Default for LeadStatus {
    fn default() -> Self {
        Self::New
    }
}

impl LeadStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::Unqualified => "Unqualified",
        }
    }

    /// Statuses that still belong on an open worklist.
    pub fn is_open(self) -> bool {
        matches!(self, Self::New | Self::Contacted | Self::Qualified)
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeadStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "qualified" => Ok(Self::Qualified),
            "unqualified" => Ok(Self::Unqualified),
            other => Err(EngineError::validation(format!(
                "unknown lead status '{other}'"
            ))),
        }
    }
}

/// Lead entity
#[derive(Debug, Clone, Serialize)]
pub struct Lead {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub lead_source: Option<String>,
    pub industry: Option<String>,
    pub annual_revenue: Decimal,
    pub number_of_employees: u32,
    lead_status: LeadStatus,
    is_converted: bool,
    pub is_locked: bool,
    pub is_junk: bool,
    pub is_unread: bool,
    pub is_unsubscribed: bool,
    is_qualified: bool,
    pub tags: BTreeSet<String>,
    pub campaign_ids: BTreeSet<String>,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Build a lead from a creation request, enforcing the required-field rule
    /// (`last_name` and `company`).
    pub fn new(actor: Uuid, req: NewLead) -> EngineResult<Self> {
        let last_name = required("last_name", &req.last_name)?;
        let company = required("company", &req.company)?;

        let mut lead = Self {
            id: Uuid::nil(),
            first_name: req.first_name.trim().to_string(),
            last_name,
            company,
            email: clean(req.email),
            phone: clean(req.phone),
            lead_source: clean(req.lead_source),
            industry: clean(req.industry),
            annual_revenue: coerce_non_negative(&req.annual_revenue),
            number_of_employees: coerce_count(&req.number_of_employees),
            lead_status: LeadStatus::New,
            is_converted: false,
            is_locked: false,
            is_junk: false,
            is_unread: true,
            is_unsubscribed: req.is_unsubscribed,
            is_qualified: false,
            tags: clean_set(req.tags),
            campaign_ids: BTreeSet::new(),
            owner: req.owner.unwrap_or(actor),
            created_at: DateTime::<Utc>::MIN_UTC,
            updated_at: DateTime::<Utc>::MIN_UTC,
        };
        lead.set_status(req.lead_status);

        Ok(lead)
    }

    pub fn status(&self) -> LeadStatus {
        self.lead_status
    }

    pub fn is_converted(&self) -> bool {
        self.is_converted
    }

    pub fn is_qualified(&self) -> bool {
        self.is_qualified
    }

    pub fn set_status(&mut self, status: LeadStatus) {
        self.lead_status = status;
        self.is_qualified = status == LeadStatus::Qualified;
    }

    /// Converted leads stay locked for good.
    pub(crate) fn mark_converted(&mut self) {
        self.is_converted = true;
        self.is_locked = true;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Fails unless general field edits are allowed. Tags and campaigns bypass this.
    pub fn ensure_mutable(&self) -> EngineResult<()> {
        if self.is_converted || self.is_locked {
            return Err(EngineError::LeadLocked(self.id));
        }
        Ok(())
    }
}

impl Record for Lead {
    const KIND: &'static str = "lead";

    fn id(&self) -> Uuid {
        self.id
    }

    fn assign(&mut self, id: Uuid, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
        self.updated_at = now;
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Request DTO for creating a lead
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLead {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub annual_revenue: Value,
    #[serde(default)]
    pub number_of_employees: Value,
    #[serde(default)]
    pub lead_status: LeadStatus,
    #[serde(default)]
    pub is_unsubscribed: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Defaults to the creating actor.
    #[serde(default)]
    pub owner: Option<Uuid>,
}

/// Request DTO for editing a single lead
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub annual_revenue: Option<Value>,
    #[serde(default)]
    pub number_of_employees: Option<Value>,
    #[serde(default)]
    pub lead_status: Option<LeadStatus>,
    #[serde(default)]
    pub is_junk: Option<bool>,
    #[serde(default)]
    pub is_unsubscribed: Option<bool>,
    #[serde(default)]
    pub owner: Option<Uuid>,
}

impl LeadUpdate {
    /// Apply to a lead that has already passed [`Lead::ensure_mutable`].
    pub fn apply(&self, lead: &mut Lead) -> EngineResult<()> {
        if let Some(first_name) = &self.first_name {
            lead.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = &self.last_name {
            lead.last_name = required("last_name", last_name)?;
        }
        if let Some(company) = &self.company {
            lead.company = required("company", company)?;
        }
        if self.email.is_some() {
            lead.email = clean(self.email.clone());
        }
        if self.phone.is_some() {
            lead.phone = clean(self.phone.clone());
        }
        if self.lead_source.is_some() {
            lead.lead_source = clean(self.lead_source.clone());
        }
        if self.industry.is_some() {
            lead.industry = clean(self.industry.clone());
        }
        if let Some(revenue) = &self.annual_revenue {
            lead.annual_revenue = coerce_non_negative(revenue);
        }
        if let Some(employees) = &self.number_of_employees {
            lead.number_of_employees = coerce_count(employees);
        }
        if let Some(status) = self.lead_status {
            lead.set_status(status);
        }
        if let Some(is_junk) = self.is_junk {
            lead.is_junk = is_junk;
        }
        if let Some(is_unsubscribed) = self.is_unsubscribed {
            lead.is_unsubscribed = is_unsubscribed;
        }
        if let Some(owner) = self.owner {
            lead.owner = owner;
        }
        Ok(())
    }
}

fn required(field: &str, value: &str) -> EngineResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trim optional text; blank becomes `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn clean_set(values: impl IntoIterator<Item = String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

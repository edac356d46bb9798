//! Account domain types
//!
//! Accounts are company-level records, unique by normalized name.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::store::Record;

/// Account entity
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub contact_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// A fresh account for a company seen for the first time. The stored name
    /// keeps its original casing.
    pub fn new(name: &str, phone: Option<String>, industry: Option<String>) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.trim().to_string(),
            website: None,
            phone,
            industry,
            contact_count: 0,
            created_at: DateTime::<Utc>::MIN_UTC,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_company(&self.name)
    }
}

impl Record for Account {
    const KIND: &'static str = "account";

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

/// Comparison key for company names: trimmed, inner whitespace collapsed, case-folded.
pub fn normalize_company(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

//! Contact domain types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::leads::Lead;
use crate::store::Record;

/// A person at an account. Created once per successful conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Denormalized account name
    pub company: String,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn from_lead(lead: &Lead, account_id: Uuid, account_name: &str) -> Self {
        Self {
            id: Uuid::nil(),
            name: lead.full_name(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            company: account_name.to_string(),
            account_id,
            created_at: DateTime::<Utc>::MIN_UTC,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

impl Record for Contact {
    const KIND: &'static str = "contact";

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

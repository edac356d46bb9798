//! Deal domain types
//!
//! Optional sales opportunities created alongside a conversion.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Record;

/// Deal pipeline stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DealStage {
    Qualification,
    NeedsAnalysis,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl Default for DealStage {
    fn default() -> Self {
        Self::Qualification
    }
}

/// Deal entity
#[derive(Debug, Clone, Serialize)]
pub struct Deal {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    /// Never negative; inputs go through the numeric coercion helper.
    pub value: Decimal,
    pub stage: DealStage,
    pub close_date: DateTime<Utc>,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    pub fn opening(
        title: String,
        company: &str,
        value: Decimal,
        close_date: DateTime<Utc>,
        account_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::nil(),
            title,
            company: company.to_string(),
            value: value.max(Decimal::ZERO),
            stage: DealStage::default(),
            close_date,
            account_id,
            created_at: DateTime::<Utc>::MIN_UTC,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}

impl Record for Deal {
    const KIND: &'static str = "deal";

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

//! Outbound mail queue
//!
//! Mass email only queues messages. Delivery and template rendering belong to
//! whatever drains the outbox.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{EmailMessage, EngineError, EngineResult, Lead};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub lead_id: Uuid,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

impl OutboundEmail {
    /// Address a message to a lead. Fails for leads without an email or that
    /// have unsubscribed.
    pub fn to_lead(lead: &Lead, message: &EmailMessage, now: DateTime<Utc>) -> EngineResult<Self> {
        if lead.is_unsubscribed {
            return Err(EngineError::validation(format!(
                "lead {} has unsubscribed",
                lead.id
            )));
        }
        let to = lead
            .email
            .clone()
            .ok_or_else(|| EngineError::validation(format!("lead {} has no email", lead.id)))?;

        Ok(Self {
            lead_id: lead.id,
            to,
            subject: message.subject.clone(),
            body: message.body.clone(),
            queued_at: now,
        })
    }
}

pub trait MailOutbox: Send + Sync {
    fn enqueue(&self, email: OutboundEmail) -> EngineResult<()>;

    /// Messages queued and not yet handed to a sender.
    fn pending(&self) -> Vec<OutboundEmail>;
}

#[derive(Debug, Default)]
pub struct InMemoryOutbox {
    queue: Mutex<Vec<OutboundEmail>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MailOutbox for InMemoryOutbox {
    fn enqueue(&self, email: OutboundEmail) -> EngineResult<()> {
        tracing::info!(
            lead_id = %email.lead_id,
            subject = %email.subject,
            "Email queued"
        );
        self.queue.lock().push(email);
        Ok(())
    }

    fn pending(&self) -> Vec<OutboundEmail> {
        self.queue.lock().clone()
    }
}

//! Bulk operation processor
//!
//! Applies one operation to many leads. Each id is attempted on its own: a
//! failure is recorded in the result and the batch moves on. Long batches can
//! be split into chunks with a cancel check between chunks; chunks already
//! processed stay committed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::conversion::ConversionService;
use super::mail::{MailOutbox, OutboundEmail};
use super::tags::{CampaignAssociator, TagEdit, TagManager};
use crate::clock::Clock;
use crate::domain::{
    BulkLeadPatch, BulkOperation, BulkResult, ConversionRequest, EmailMessage, EngineError,
    EngineResult, Lead, LeadStatus,
};
use crate::store::Repository;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_MAX_IDS: usize = 5000;

/// Shared cancel flag checked between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An operation after request-level parsing, ready to run per id.
enum Prepared<'a> {
    Update(BulkLeadPatch),
    Delete,
    Approve,
    MarkJunk,
    Email(&'a EmailMessage),
    Tag(TagEdit),
    Campaign(&'a str),
    Convert(ConversionRequest),
    /// The operation itself is invalid; every id fails with this error.
    Rejected(EngineError),
}

impl<'a> Prepared<'a> {
    fn from_operation(op: &'a BulkOperation) -> Self {
        match op {
            BulkOperation::Update { fields } => match BulkLeadPatch::from_fields(fields) {
                Ok(patch) => Self::Update(patch),
                Err(err) => Self::Rejected(err),
            },
            BulkOperation::Delete => Self::Delete,
            BulkOperation::Approve => Self::Approve,
            BulkOperation::MarkJunk => Self::MarkJunk,
            BulkOperation::Email(message) => Self::Email(message),
            BulkOperation::Tag { add, remove } => Self::Tag(TagEdit::new(add, remove)),
            BulkOperation::Campaign { campaign_id } => Self::Campaign(campaign_id),
            BulkOperation::Convert {
                create_deal,
                deal_value,
            } => Self::Convert(ConversionRequest {
                create_deal: *create_deal,
                deal_value: deal_value.clone(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct BulkOperationProcessor {
    leads: Arc<dyn Repository<Lead>>,
    tags: TagManager,
    campaigns: CampaignAssociator,
    conversions: ConversionService,
    outbox: Arc<dyn MailOutbox>,
    clock: Arc<dyn Clock>,
    max_ids: usize,
}

impl BulkOperationProcessor {
    pub fn new(
        leads: Arc<dyn Repository<Lead>>,
        conversions: ConversionService,
        outbox: Arc<dyn MailOutbox>,
        clock: Arc<dyn Clock>,
        max_ids: usize,
    ) -> Self {
        Self {
            tags: TagManager::new(leads.clone()),
            campaigns: CampaignAssociator::new(leads.clone()),
            leads,
            conversions,
            outbox,
            clock,
            max_ids,
        }
    }

    /// Run `op` over every id in one pass.
    pub fn apply(&self, actor: Uuid, ids: &[Uuid], op: &BulkOperation) -> EngineResult<BulkResult> {
        self.apply_chunked(actor, ids, op, ids.len().max(1), &CancelToken::new())
    }

    /// Run `op` over `ids` in chunks of `chunk_size`, stopping between chunks
    /// once `cancel` is set. Ids never reached are reported as skipped.
    #[tracing::instrument(skip(self, ids, op, cancel), fields(op = op.name(), count = ids.len()))]
    pub fn apply_chunked(
        &self,
        actor: Uuid,
        ids: &[Uuid],
        op: &BulkOperation,
        chunk_size: usize,
        cancel: &CancelToken,
    ) -> EngineResult<BulkResult> {
        if ids.len() > self.max_ids {
            return Err(EngineError::validation(format!(
                "batch of {} ids exceeds the limit of {}",
                ids.len(),
                self.max_ids
            )));
        }

        let prepared = Prepared::from_operation(op);
        let mut result = BulkResult::default();

        for (index, chunk) in ids.chunks(chunk_size.max(1)).enumerate() {
            if cancel.is_cancelled() {
                let done = index * chunk_size.max(1);
                result.skipped.extend_from_slice(&ids[done..]);
                tracing::warn!(skipped = result.skipped.len(), "Bulk operation cancelled");
                break;
            }

            for &id in chunk {
                let outcome = self.apply_one(actor, id, &prepared);
                if let Err(err) = &outcome {
                    tracing::debug!(lead_id = %id, error = %err, "Bulk item failed");
                }
                result.record(id, outcome);
            }
        }

        tracing::info!(
            succeeded = result.succeeded.len(),
            failed = result.failed.len(),
            skipped = result.skipped.len(),
            "Bulk operation finished"
        );

        Ok(result)
    }

    fn apply_one(&self, actor: Uuid, id: Uuid, op: &Prepared<'_>) -> EngineResult<()> {
        match op {
            Prepared::Rejected(err) => Err(err.clone()),
            Prepared::Update(patch) => self.patch(id, &mut |lead| patch.apply(lead)),
            Prepared::Approve => self.patch(id, &mut |lead| {
                lead.ensure_mutable()?;
                lead.set_status(LeadStatus::Qualified);
                Ok(())
            }),
            Prepared::MarkJunk => self.patch(id, &mut |lead| {
                lead.ensure_mutable()?;
                lead.is_junk = true;
                Ok(())
            }),
            Prepared::Delete => self.leads.delete_if(id, &|lead: &Lead| {
                if lead.is_locked {
                    Err(EngineError::LeadLocked(lead.id))
                } else {
                    Ok(())
                }
            }),
            Prepared::Email(message) => {
                let lead = self.leads.get(id)?;
                let email = OutboundEmail::to_lead(&lead, message, self.clock.now())?;
                self.outbox.enqueue(email)
            }
            Prepared::Tag(edit) => self.tags.tag(id, edit),
            Prepared::Campaign(campaign_id) => self.campaigns.link(id, campaign_id).map(|_| ()),
            Prepared::Convert(request) => self.conversions.convert(actor, id, request).map(|_| ()),
        }
    }

    fn patch(&self, id: Uuid, patch: &mut dyn FnMut(&mut Lead) -> EngineResult<()>) -> EngineResult<()> {
        self.leads.update(id, patch).map(|_| ())
    }
}

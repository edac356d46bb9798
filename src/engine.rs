//! Engine composition root
//!
//! Wires the services to one store, one clock and one outbox. There is no
//! global state: every consumer is handed an [`Engine`] (or a clone of it).

use std::sync::Arc;

use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::domain::{BulkOperation, BulkResult, EngineResult};
use crate::services::bulk::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_IDS};
use crate::services::conversion::DEFAULT_DEAL_CLOSE_DAYS;
use crate::services::{
    BulkOperationProcessor, CampaignAssociator, CancelToken, ConversionService,
    DeduplicationEngine, InMemoryOutbox, LeadService, MailOutbox, TagManager, ViewFilterEngine,
};
use crate::store::{Store, StoreStats};

/// Tunables read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Ids per committed chunk in a bulk call.
    pub bulk_chunk_size: usize,
    /// Larger batches are rejected before any work is done.
    pub max_bulk_ids: usize,
    /// Close date offset for deals created by a conversion.
    pub deal_close_days: i64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            bulk_chunk_size: DEFAULT_CHUNK_SIZE,
            max_bulk_ids: DEFAULT_MAX_IDS,
            deal_close_days: DEFAULT_DEAL_CLOSE_DAYS,
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    pub store: Store,
    pub clock: Arc<dyn Clock>,
    pub outbox: Arc<dyn MailOutbox>,
    pub options: EngineOptions,
    pub leads: LeadService,
    pub views: ViewFilterEngine,
    pub duplicates: DeduplicationEngine,
    pub tags: TagManager,
    pub campaigns: CampaignAssociator,
    pub conversions: ConversionService,
    pub bulk: BulkOperationProcessor,
}

impl Engine {
    pub fn new(
        store: Store,
        clock: Arc<dyn Clock>,
        outbox: Arc<dyn MailOutbox>,
        options: EngineOptions,
    ) -> Self {
        let conversions =
            ConversionService::new(store.clone(), clock.clone(), options.deal_close_days);
        let bulk = BulkOperationProcessor::new(
            store.leads.clone(),
            conversions.clone(),
            outbox.clone(),
            clock.clone(),
            options.max_bulk_ids,
        );

        Self {
            leads: LeadService::new(store.leads.clone()),
            views: ViewFilterEngine::new(store.leads.clone(), clock.clone()),
            duplicates: DeduplicationEngine::new(store.leads.clone()),
            tags: TagManager::new(store.leads.clone()),
            campaigns: CampaignAssociator::new(store.leads.clone()),
            conversions,
            bulk,
            store,
            clock,
            outbox,
            options,
        }
    }

    /// In-memory store on the wall clock.
    pub fn in_memory(options: EngineOptions) -> Self {
        Self::with_clock(Arc::new(SystemClock), options)
    }

    /// In-memory store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>, options: EngineOptions) -> Self {
        let store = Store::in_memory(clock.clone());
        Self::new(store, clock, Arc::new(InMemoryOutbox::new()), options)
    }

    /// Bulk call chunked by the configured chunk size.
    pub fn bulk_apply(
        &self,
        actor: Uuid,
        ids: &[Uuid],
        op: &BulkOperation,
        cancel: &CancelToken,
    ) -> EngineResult<BulkResult> {
        self.bulk
            .apply_chunked(actor, ids, op, self.options.bulk_chunk_size, cancel)
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }
}

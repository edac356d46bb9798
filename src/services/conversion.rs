//! Lead conversion
//!
//! Promotes a lead into an account (resolved by company name or created), a
//! contact, and optionally a deal, then retires the lead. The whole thing
//! runs under the lead's record lock; account resolution additionally runs
//! under a lock keyed on the normalized company name so two conversions for
//! the same new company cannot both create an account.
//!
//! Failure after the account step is undone with compensating writes: created
//! contacts and deals are deleted and the account is decremented, or deleted
//! if this conversion created it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::numbers::coerce_non_negative;
use crate::domain::{
    normalize_company, Account, Contact, ConversionOutcome, ConversionRecord, ConversionRequest,
    Deal, EngineError, EngineResult, Lead,
};
use crate::store::Store;

pub const DEFAULT_DEAL_CLOSE_DAYS: i64 = 30;
pub const MAX_DEAL_CLOSE_DAYS: i64 = 36_500;

/// Mutexes keyed by normalized company name.
#[derive(Debug, Default)]
struct NameLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NameLocks {
    fn handle(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the entry once nobody else holds a handle.
    fn release(&self, key: &str) {
        let mut locks = self.locks.lock();
        if locks
            .get(key)
            .is_some_and(|handle| Arc::strong_count(handle) == 1)
        {
            locks.remove(key);
        }
    }
}

/// What a conversion wrote before the lead itself was committed.
#[derive(Debug, Clone, Copy)]
struct Produced {
    outcome: ConversionOutcome,
    account_created: bool,
}

#[derive(Clone)]
pub struct ConversionService {
    store: Store,
    clock: Arc<dyn Clock>,
    deal_close_days: i64,
    name_locks: Arc<NameLocks>,
    audit: Arc<RwLock<HashMap<Uuid, ConversionRecord>>>,
}

impl ConversionService {
    pub fn new(store: Store, clock: Arc<dyn Clock>, deal_close_days: i64) -> Self {
        Self {
            store,
            clock,
            deal_close_days,
            name_locks: Arc::new(NameLocks::default()),
            audit: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[tracing::instrument(skip(self, request), fields(create_deal = request.create_deal))]
    pub fn convert(
        &self,
        actor: Uuid,
        lead_id: Uuid,
        request: &ConversionRequest,
    ) -> EngineResult<ConversionOutcome> {
        let deal_value = request
            .create_deal
            .then(|| coerce_non_negative(&request.deal_value));
        let mut produced: Option<Produced> = None;

        let committed = self.store.leads.update(lead_id, &mut |lead| {
            if lead.is_converted() {
                return Err(EngineError::AlreadyConverted(lead.id));
            }
            produced = Some(self.produce(lead, deal_value)?);
            lead.mark_converted();
            Ok(())
        });

        match (committed, produced) {
            (Ok(_), Some(done)) => {
                self.record(actor, lead_id, done);
                tracing::info!(
                    lead_id = %lead_id,
                    account_id = %done.outcome.account_id,
                    contact_id = %done.outcome.contact_id,
                    deal_id = ?done.outcome.deal_id,
                    account_created = done.account_created,
                    "Lead converted"
                );
                Ok(done.outcome)
            }
            (Err(err), Some(done)) => {
                // Everything was written but the lead itself did not commit.
                self.compensate(&done);
                Err(err)
            }
            (Err(err), None) => {
                tracing::warn!(lead_id = %lead_id, error = %err, "Conversion rejected");
                Err(err)
            }
            (Ok(_), None) => Err(EngineError::Storage(format!(
                "conversion of lead {lead_id} committed without output"
            ))),
        }
    }

    /// Audit entry for a converted lead.
    pub fn conversion_for(&self, lead_id: Uuid) -> EngineResult<ConversionRecord> {
        self.audit
            .read()
            .get(&lead_id)
            .cloned()
            .ok_or(EngineError::NotFound {
                kind: "conversion",
                id: lead_id,
            })
    }

    /// Steps 1-3: account, contact, optional deal.
    fn produce(&self, lead: &Lead, deal_value: Option<Decimal>) -> EngineResult<Produced> {
        let key = normalize_company(&lead.company);
        let handle = self.name_locks.handle(&key);

        let result = {
            let _company = handle.lock();
            self.produce_locked(lead, &key, deal_value)
        };

        drop(handle);
        self.name_locks.release(&key);
        result
    }

    fn produce_locked(
        &self,
        lead: &Lead,
        key: &str,
        deal_value: Option<Decimal>,
    ) -> EngineResult<Produced> {
        let close_date = deal_value.map(|_| self.close_date()).transpose()?;
        let (account, account_created) = self.resolve_account(lead, key)?;

        let contact = Contact::from_lead(lead, account.id, &account.name);
        let contact_id = match self.store.contacts.create(contact) {
            Ok(id) => id,
            Err(err) => {
                self.undo_account(account.id, account_created);
                return Err(err);
            }
        };

        let deal_id = match deal_value.zip(close_date) {
            None => None,
            Some((value, close_date)) => {
                let deal = Deal::opening(
                    format!("{} - {}", account.name, lead.full_name()),
                    &account.name,
                    value,
                    close_date,
                    account.id,
                );
                match self.store.deals.create(deal) {
                    Ok(id) => Some(id),
                    Err(err) => {
                        self.undo_contact(contact_id);
                        self.undo_account(account.id, account_created);
                        return Err(err);
                    }
                }
            }
        };

        Ok(Produced {
            outcome: ConversionOutcome {
                account_id: account.id,
                contact_id,
                deal_id,
            },
            account_created,
        })
    }

    fn close_date(&self) -> EngineResult<DateTime<Utc>> {
        Duration::try_days(self.deal_close_days)
            .and_then(|offset| self.clock.now().checked_add_signed(offset))
            .ok_or_else(|| {
                EngineError::validation(format!(
                    "deal close date {} days out is out of range",
                    self.deal_close_days
                ))
            })
    }

    /// Reuse the account with the same normalized name, or create it.
    /// Caller holds the name lock for `key`.
    fn resolve_account(&self, lead: &Lead, key: &str) -> EngineResult<(Account, bool)> {
        let same_name = |account: &Account| account.normalized_name() == key;
        let existing = self.store.accounts.query(&same_name).next();

        match existing {
            Some(account) => {
                let account = self.store.accounts.update(account.id, &mut |account| {
                    account.contact_count += 1;
                    Ok(())
                })?;
                Ok((account, false))
            }
            None => {
                let mut account = Account::new(&lead.company, None, lead.industry.clone());
                account.contact_count = 1;
                let id = self.store.accounts.create(account)?;
                Ok((self.store.accounts.get(id)?, true))
            }
        }
    }

    fn compensate(&self, produced: &Produced) {
        if let Some(deal_id) = produced.outcome.deal_id {
            if let Err(err) = self.store.deals.delete(deal_id) {
                tracing::error!(deal_id = %deal_id, error = %err, "Failed to roll back deal");
            }
        }
        self.undo_contact(produced.outcome.contact_id);
        self.undo_account(produced.outcome.account_id, produced.account_created);
    }

    fn undo_contact(&self, contact_id: Uuid) {
        if let Err(err) = self.store.contacts.delete(contact_id) {
            tracing::error!(contact_id = %contact_id, error = %err, "Failed to roll back contact");
        }
    }

    fn undo_account(&self, account_id: Uuid, created: bool) {
        let undone = if created {
            self.store.accounts.delete(account_id)
        } else {
            self.store
                .accounts
                .update(account_id, &mut |account| {
                    account.contact_count = account.contact_count.saturating_sub(1);
                    Ok(())
                })
                .map(|_| ())
        };

        if let Err(err) = undone {
            tracing::error!(account_id = %account_id, error = %err, "Failed to roll back account");
        }
    }

    fn record(&self, actor: Uuid, lead_id: Uuid, produced: Produced) {
        let record = ConversionRecord {
            lead_id,
            account_id: produced.outcome.account_id,
            contact_id: produced.outcome.contact_id,
            deal_id: produced.outcome.deal_id,
            account_created: produced.account_created,
            converted_by: actor,
            converted_at: self.clock.now(),
        };
        self.audit.write().insert(lead_id, record);
    }
}

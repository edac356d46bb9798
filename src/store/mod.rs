//! Repository contract and the store that bundles the four entity repositories.
//!
//! Every write goes through [`Repository::update`], which runs the patch as a
//! read-modify-write under the record's own lock. A patch that returns an error
//! leaves the stored record untouched.

mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::{Account, Contact, Deal, EngineResult, Lead};

pub use memory::MemoryRepository;

/// A stored entity with a server-assigned id and audit timestamps.
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity name used in `NotFound` errors.
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    /// Called once by `create`: sets the id and both audit timestamps.
    fn assign(&mut self, id: Uuid, now: DateTime<Utc>);

    /// Called after every successful write.
    fn touch(&mut self, now: DateTime<Utc>);
}

pub trait Repository<T: Record>: Send + Sync {
    fn create(&self, entity: T) -> EngineResult<Uuid>;

    fn get(&self, id: Uuid) -> EngineResult<T>;

    fn update(
        &self,
        id: Uuid,
        patch: &mut dyn FnMut(&mut T) -> EngineResult<()>,
    ) -> EngineResult<T>;

    /// Remove the record if `guard` accepts it. The guard runs under the record lock.
    fn delete_if(&self, id: Uuid, guard: &dyn Fn(&T) -> EngineResult<()>) -> EngineResult<()>;

    /// Lazily yields matching records. Each call re-reads the store.
    fn query<'a>(
        &'a self,
        predicate: &'a dyn Fn(&T) -> bool,
    ) -> Box<dyn Iterator<Item = T> + 'a>;

    fn len(&self) -> usize;

    fn delete(&self, id: Uuid) -> EngineResult<()> {
        self.delete_if(id, &|_: &T| Ok(()))
    }

    fn all(&self) -> Vec<T> {
        self.query(&|_: &T| true).collect()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record counts reported by the health endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStats {
    pub leads: usize,
    pub accounts: usize,
    pub contacts: usize,
    pub deals: usize,
}

/// The single logical store. Cloning shares the underlying repositories.
#[derive(Clone)]
pub struct Store {
    pub leads: Arc<dyn Repository<Lead>>,
    pub accounts: Arc<dyn Repository<Account>>,
    pub contacts: Arc<dyn Repository<Contact>>,
    pub deals: Arc<dyn Repository<Deal>>,
}

impl Store {
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            leads: Arc::new(MemoryRepository::new(clock.clone())),
            accounts: Arc::new(MemoryRepository::new(clock.clone())),
            contacts: Arc::new(MemoryRepository::new(clock.clone())),
            deals: Arc::new(MemoryRepository::new(clock)),
        }
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            leads: self.leads.len(),
            accounts: self.accounts.len(),
            contacts: self.contacts.len(),
            deals: self.deals.len(),
        }
    }
}

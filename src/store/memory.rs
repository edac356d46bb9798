//! In-memory repository with per-record locks.
//!
//! The map lock is only held long enough to look up or insert a slot. Reads and
//! writes of a record happen under that record's own mutex, so writers to
//! different ids never wait on each other. A deleted slot is emptied before it
//! leaves the map, which makes a concurrent writer holding the old handle see
//! `NotFound` instead of writing into a detached record.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use super::{Record, Repository};
use crate::clock::Clock;
use crate::domain::{EngineError, EngineResult};

type Slot<T> = Arc<Mutex<Option<T>>>;

pub struct MemoryRepository<T> {
    records: RwLock<BTreeMap<Uuid, Slot<T>>>,
    clock: Arc<dyn Clock>,
}

impl<T> std::fmt::Debug for MemoryRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("len", &self.records.read().len())
            .finish()
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    fn slot(&self, id: Uuid) -> EngineResult<Slot<T>> {
        self.records
            .read()
            .get(&id)
            .cloned()
            .ok_or(EngineError::NotFound { kind: T::KIND, id })
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn create(&self, mut entity: T) -> EngineResult<Uuid> {
        let id = Uuid::now_v7();
        entity.assign(id, self.clock.now());

        self.records
            .write()
            .insert(id, Arc::new(Mutex::new(Some(entity))));

        Ok(id)
    }

    fn get(&self, id: Uuid) -> EngineResult<T> {
        let slot = self.slot(id)?;
        let guard = slot.lock();
        guard.clone().ok_or(EngineError::NotFound { kind: T::KIND, id })
    }

    fn update(
        &self,
        id: Uuid,
        patch: &mut dyn FnMut(&mut T) -> EngineResult<()>,
    ) -> EngineResult<T> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock();
        let current = guard
            .as_ref()
            .ok_or(EngineError::NotFound { kind: T::KIND, id })?;

        // Patch a copy so a rejected patch leaves the stored record as it was.
        let mut next = current.clone();
        patch(&mut next)?;
        next.touch(self.clock.now());

        *guard = Some(next.clone());
        Ok(next)
    }

    fn delete_if(&self, id: Uuid, check: &dyn Fn(&T) -> EngineResult<()>) -> EngineResult<()> {
        let slot = self.slot(id)?;

        {
            let mut guard = slot.lock();
            let current = guard
                .as_ref()
                .ok_or(EngineError::NotFound { kind: T::KIND, id })?;
            check(current)?;
            *guard = None;
        }

        let mut records = self.records.write();
        if records
            .get(&id)
            .is_some_and(|existing| Arc::ptr_eq(existing, &slot))
        {
            records.remove(&id);
        }

        Ok(())
    }

    fn query<'a>(&'a self, predicate: &'a dyn Fn(&T) -> bool) -> Box<dyn Iterator<Item = T> + 'a> {
        let slots: Vec<Slot<T>> = self.records.read().values().cloned().collect();

        Box::new(slots.into_iter().filter_map(move |slot| {
            let record = slot.lock().clone()?;
            predicate(&record).then_some(record)
        }))
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use testresult::TestResult;

    use super::*;
    use crate::clock::ManualClock;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: Uuid,
        body: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    }

    impl Note {
        fn new(body: &str) -> Self {
            Self {
                id: Uuid::nil(),
                body: body.to_string(),
                created_at: DateTime::<Utc>::MIN_UTC,
                updated_at: DateTime::<Utc>::MIN_UTC,
            }
        }
    }

    impl Record for Note {
        const KIND: &'static str = "note";

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

    fn repo() -> (Arc<ManualClock>, MemoryRepository<Note>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap(),
        ));
        let repository = MemoryRepository::new(clock.clone());
        (clock, repository)
    }

    #[test]
    fn create_assigns_id_and_timestamps() -> TestResult {
        let (clock, repo) = repo();

        let id = repo.create(Note::new("hello"))?;
        let note = repo.get(id)?;

        assert_eq!(note.id, id);
        assert_eq!(note.created_at, clock.now());
        assert_eq!(note.updated_at, clock.now());

        Ok(())
    }

    #[test]
    fn update_sets_updated_at_only() -> TestResult {
        let (clock, repo) = repo();
        let id = repo.create(Note::new("draft"))?;
        let created = clock.now();

        clock.advance(Duration::minutes(5));
        let note = repo.update(id, &mut |note| {
            note.body = "final".to_string();
            Ok(())
        })?;

        assert_eq!(note.body, "final");
        assert_eq!(note.created_at, created);
        assert_eq!(note.updated_at, created + Duration::minutes(5));

        Ok(())
    }

    #[test]
    fn rejected_patch_leaves_record_untouched() -> TestResult {
        let (_clock, repo) = repo();
        let id = repo.create(Note::new("keep"))?;

        let result = repo.update(id, &mut |note| {
            note.body = "lost".to_string();
            Err(EngineError::validation("nope"))
        });

        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert_eq!(repo.get(id)?.body, "keep");

        Ok(())
    }

    #[test]
    fn missing_ids_are_not_found() {
        let (_clock, repo) = repo();
        let id = Uuid::now_v7();

        assert!(matches!(
            repo.get(id),
            Err(EngineError::NotFound { kind: "note", .. })
        ));
        assert!(matches!(
            repo.update(id, &mut |_| Ok(())),
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(repo.delete(id), Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn delete_guard_can_veto() -> TestResult {
        let (_clock, repo) = repo();
        let id = repo.create(Note::new("pinned"))?;

        let vetoed = repo.delete_if(id, &|_: &Note| Err(EngineError::LeadLocked(id)));
        assert!(matches!(vetoed, Err(EngineError::LeadLocked(_))));
        assert_eq!(repo.len(), 1);

        repo.delete(id)?;
        assert!(repo.is_empty());

        Ok(())
    }

    #[test]
    fn query_reevaluates_on_each_call() -> TestResult {
        let (_clock, repo) = repo();
        repo.create(Note::new("alpha"))?;
        let beta = repo.create(Note::new("beta"))?;

        let starts_with_b = |note: &Note| note.body.starts_with('b');
        assert_eq!(repo.query(&starts_with_b).count(), 1);

        repo.delete(beta)?;
        assert_eq!(repo.query(&starts_with_b).count(), 0);

        Ok(())
    }

    #[test]
    fn concurrent_updates_do_not_lose_writes() -> TestResult {
        let (_clock, repo) = repo();
        let repo = Arc::new(repo);
        let id = repo.create(Note::new(""))?;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let written = repo.update(id, &mut |note| {
                            note.body.push('x');
                            Ok(())
                        });
                        assert!(written.is_ok(), "update failed: {written:?}");
                    }
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().is_ok(), "writer thread panicked");
        }

        assert_eq!(repo.get(id)?.body.len(), 400);

        Ok(())
    }
}

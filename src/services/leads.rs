//! Single-record lead operations

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{EngineError, EngineResult, Lead, LeadUpdate, NewLead};
use crate::store::Repository;

#[derive(Clone)]
pub struct LeadService {
    leads: Arc<dyn Repository<Lead>>,
}

impl LeadService {
    pub fn new(leads: Arc<dyn Repository<Lead>>) -> Self {
        Self { leads }
    }

    #[tracing::instrument(skip(self, req))]
    pub fn create(&self, actor: Uuid, req: NewLead) -> EngineResult<Lead> {
        let lead = Lead::new(actor, req)?;
        let id = self.leads.create(lead)?;

        tracing::info!(lead_id = %id, "Lead created");
        self.leads.get(id)
    }

    pub fn get(&self, id: Uuid) -> EngineResult<Lead> {
        self.leads.get(id)
    }

    /// Open a lead, clearing its unread flag. Converted leads are returned as is.
    pub fn view(&self, id: Uuid) -> EngineResult<Lead> {
        let lead = self.leads.get(id)?;
        if !lead.is_unread || lead.is_converted() {
            return Ok(lead);
        }

        self.leads.update(id, &mut |lead| {
            if !lead.is_converted() {
                lead.is_unread = false;
            }
            Ok(())
        })
    }

    #[tracing::instrument(skip(self, update))]
    pub fn update(&self, id: Uuid, update: &LeadUpdate) -> EngineResult<Lead> {
        let lead = self.leads.update(id, &mut |lead| {
            lead.ensure_mutable()?;
            update.apply(lead)
        })?;

        tracing::info!(lead_id = %id, "Lead updated");
        Ok(lead)
    }

    pub fn set_locked(&self, id: Uuid, locked: bool) -> EngineResult<Lead> {
        let lead = self.leads.update(id, &mut |lead| {
            if lead.is_converted() {
                return Err(EngineError::LeadLocked(lead.id));
            }
            lead.is_locked = locked;
            Ok(())
        })?;

        tracing::info!(lead_id = %id, locked, "Lead lock changed");
        Ok(lead)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> EngineResult<()> {
        self.leads.delete_if(id, &|lead: &Lead| {
            if lead.is_locked {
                Err(EngineError::LeadLocked(lead.id))
            } else {
                Ok(())
            }
        })?;

        tracing::info!(lead_id = %id, "Lead deleted");
        Ok(())
    }
}

//! Tag manager and campaign associator
//!
//! Both only touch set-valued fields, so they are allowed on converted and
//! locked leads.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::leads::clean_set;
use crate::domain::{EngineError, EngineResult, Lead, Notice};
use crate::store::Repository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagUpdate {
    pub updated: usize,
    pub missing: Vec<Uuid>,
}

impl TagUpdate {
    pub fn notice(&self) -> Notice {
        Notice::counted("Tags", self.updated, self.updated + self.missing.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignUpdate {
    /// Leads newly linked by this call.
    pub added: usize,
    /// Leads that were already in the campaign.
    pub unchanged: usize,
    pub missing: Vec<Uuid>,
}

impl CampaignUpdate {
    pub fn notice(&self) -> Notice {
        let linked = self.added + self.unchanged;
        Notice::counted("Campaign", linked, linked + self.missing.len())
    }
}

/// Normalized tag edit. A tag present in both lists stays: adds win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEdit {
    add: BTreeSet<String>,
    remove: BTreeSet<String>,
}

impl TagEdit {
    pub fn new(add: &[String], remove: &[String]) -> Self {
        let add = clean_set(add.iter().cloned());
        let remove = clean_set(remove.iter().cloned())
            .into_iter()
            .filter(|tag| !add.contains(tag))
            .collect();
        Self { add, remove }
    }

    pub fn apply(&self, lead: &mut Lead) {
        lead.tags.extend(self.add.iter().cloned());
        lead.tags.retain(|tag| !self.remove.contains(tag));
    }
}

#[derive(Clone)]
pub struct TagManager {
    leads: Arc<dyn Repository<Lead>>,
}

impl TagManager {
    pub fn new(leads: Arc<dyn Repository<Lead>>) -> Self {
        Self { leads }
    }

    pub fn tag(&self, id: Uuid, edit: &TagEdit) -> EngineResult<()> {
        self.leads
            .update(id, &mut |lead| {
                edit.apply(lead);
                Ok(())
            })
            .map(|_| ())
    }

    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn manage_tags(&self, ids: &[Uuid], add: &[String], remove: &[String]) -> TagUpdate {
        let edit = TagEdit::new(add, remove);
        let mut result = TagUpdate::default();

        for &id in ids {
            match self.tag(id, &edit) {
                Ok(()) => result.updated += 1,
                Err(_) => result.missing.push(id),
            }
        }

        tracing::info!(updated = result.updated, missing = result.missing.len(), "Tags updated");
        result
    }
}

#[derive(Clone)]
pub struct CampaignAssociator {
    leads: Arc<dyn Repository<Lead>>,
}

impl CampaignAssociator {
    pub fn new(leads: Arc<dyn Repository<Lead>>) -> Self {
        Self { leads }
    }

    /// Link one lead. Returns whether the link is new.
    pub fn link(&self, id: Uuid, campaign_id: &str) -> EngineResult<bool> {
        let campaign_id = campaign_key(campaign_id)?;
        let mut inserted = false;

        self.leads.update(id, &mut |lead| {
            inserted = lead.campaign_ids.insert(campaign_id.clone());
            Ok(())
        })?;

        Ok(inserted)
    }

    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn add_to_campaign(&self, ids: &[Uuid], campaign_id: &str) -> EngineResult<CampaignUpdate> {
        campaign_key(campaign_id)?;
        let mut result = CampaignUpdate::default();

        for &id in ids {
            match self.link(id, campaign_id) {
                Ok(true) => result.added += 1,
                Ok(false) => result.unchanged += 1,
                Err(_) => result.missing.push(id),
            }
        }

        tracing::info!(added = result.added, unchanged = result.unchanged, "Leads added to campaign");
        Ok(result)
    }
}

fn campaign_key(campaign_id: &str) -> EngineResult<String> {
    let trimmed = campaign_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::validation("campaign_id is required"));
    }
    Ok(trimmed.to_string())
}

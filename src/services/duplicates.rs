//! Deduplication engine
//!
//! Leads are grouped when any enabled criterion's key matches (union across
//! criteria, transitive). Each group keeps one survivor: a converted member if
//! there is one, otherwise the earliest created, ties broken by lowest id.
//! Converted leads are never deleted.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    CriteriaSet, DedupSummary, DuplicateGroup, EngineError, EngineResult, Lead,
};
use crate::store::Repository;

#[derive(Clone)]
pub struct DeduplicationEngine {
    leads: Arc<dyn Repository<Lead>>,
}

impl DeduplicationEngine {
    pub fn new(leads: Arc<dyn Repository<Lead>>) -> Self {
        Self { leads }
    }

    pub fn find_duplicates(&self, criteria: &CriteriaSet) -> EngineResult<Vec<DuplicateGroup>> {
        if criteria.is_empty() {
            return Err(EngineError::NoCriteriaSelected);
        }

        let leads = self.leads.all();
        Ok(group(&leads, criteria))
    }

    #[tracing::instrument(skip(self))]
    pub fn deduplicate(&self, criteria: &CriteriaSet) -> EngineResult<DedupSummary> {
        // Rejected up front so an empty selection can never delete anything.
        let groups = self.find_duplicates(criteria)?;

        let mut summary = DedupSummary {
            kept: groups.len(),
            ..DedupSummary::default()
        };

        for group in &groups {
            for &id in group.lead_ids.iter().filter(|&&id| id != group.retained) {
                summary.duplicates_found += 1;

                let outcome = self.leads.delete_if(id, &|lead: &Lead| {
                    if lead.is_converted() {
                        Err(EngineError::AlreadyConverted(lead.id))
                    } else {
                        Ok(())
                    }
                });

                match outcome {
                    Ok(()) => summary.deleted += 1,
                    Err(EngineError::AlreadyConverted(_)) => summary.protected += 1,
                    Err(EngineError::NotFound { .. }) => {
                        tracing::debug!(lead_id = %id, "Duplicate already gone");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        tracing::info!(
            groups = summary.kept,
            duplicates_found = summary.duplicates_found,
            deleted = summary.deleted,
            protected = summary.protected,
            "Leads deduplicated"
        );

        Ok(summary)
    }
}

/// Group `leads` by shared keys. Singletons are dropped.
pub fn group(leads: &[Lead], criteria: &CriteriaSet) -> Vec<DuplicateGroup> {
    let mut sets = DisjointSet::new(leads.len());

    for criterion in criteria {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for (index, lead) in leads.iter().enumerate() {
            if let Some(key) = criterion.key(lead) {
                match first_seen.get(&key) {
                    Some(&other) => sets.union(other, index),
                    None => {
                        first_seen.insert(key, index);
                    }
                }
            }
        }
    }

    let mut members: HashMap<usize, Vec<&Lead>> = HashMap::new();
    for (index, lead) in leads.iter().enumerate() {
        members.entry(sets.find(index)).or_default().push(lead);
    }

    let mut groups: Vec<(&Lead, DuplicateGroup)> = members
        .into_values()
        .filter(|members| members.len() > 1)
        .filter_map(|members| {
            let retained = members.iter().copied().min_by_key(|lead| survivor_rank(lead))?;
            Some((
                retained,
                DuplicateGroup {
                    retained: retained.id,
                    lead_ids: members.iter().map(|lead| lead.id).collect(),
                },
            ))
        })
        .collect();

    groups.sort_by_key(|(retained, _)| survivor_rank(retained));
    groups.into_iter().map(|(_, group)| group).collect()
}

/// Lower ranks survive: converted first, then earliest created, then lowest id.
fn survivor_rank(lead: &Lead) -> (bool, chrono::DateTime<chrono::Utc>, Uuid) {
    (!lead.is_converted(), lead.created_at, lead.id)
}

/// Union-find over lead indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            self.parent[index] = self.parent[self.parent[index]];
            index = self.parent[index];
        }
        index
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            self.parent[root_b.max(root_a)] = root_a.min(root_b);
        }
    }
}

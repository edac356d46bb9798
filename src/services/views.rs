//! View filter engine
//!
//! Turns a named view, custom filters and a free-text search into a worklist.
//! Every stage is a pure predicate over a lead, applied in a fixed order:
//! view, then filters, then search.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::domain::{CustomFilters, Lead, ViewName};
use crate::store::Repository;

const RECENTLY_CREATED_DAYS: i64 = 7;
const RECENTLY_MODIFIED_DAYS: i64 = 2;

#[derive(Clone)]
pub struct ViewFilterEngine {
    leads: Arc<dyn Repository<Lead>>,
    clock: Arc<dyn Clock>,
}

impl ViewFilterEngine {
    pub fn new(leads: Arc<dyn Repository<Lead>>, clock: Arc<dyn Clock>) -> Self {
        Self { leads, clock }
    }

    #[tracing::instrument(skip(self, filters))]
    pub fn evaluate(&self, view: ViewName, filters: &CustomFilters, search: &str) -> Vec<Lead> {
        let now = self.clock.now();
        let term = search.trim().to_lowercase();

        let predicate = |lead: &Lead| {
            view_matches(view, lead, now)
                && filters_match(filters, lead, now)
                && search_matches(&term, lead)
        };

        let leads: Vec<Lead> = self.leads.query(&predicate).collect();
        tracing::debug!(matched = leads.len(), "View evaluated");
        leads
    }
}

pub fn view_matches(view: ViewName, lead: &Lead, now: DateTime<Utc>) -> bool {
    match view {
        ViewName::All => true,
        ViewName::Locked => lead.is_locked,
        ViewName::Converted => lead.is_converted(),
        ViewName::Junk => lead.is_junk,
        ViewName::NotQualified => !lead.is_qualified(),
        ViewName::Open => lead.status().is_open(),
        ViewName::RecentlyCreated => lead.created_at > now - Duration::days(RECENTLY_CREATED_DAYS),
        ViewName::RecentlyModified => {
            lead.updated_at > now - Duration::days(RECENTLY_MODIFIED_DAYS)
        }
        ViewName::Today => lead.created_at.date_naive() == now.date_naive(),
        ViewName::Unread => lead.is_unread,
        ViewName::Unsubscribed => lead.is_unsubscribed,
    }
}

pub fn filters_match(filters: &CustomFilters, lead: &Lead, now: DateTime<Utc>) -> bool {
    if let Some(status) = filters.status {
        if lead.status() != status {
            return false;
        }
    }
    if !text_matches(filters.source.as_deref(), lead.lead_source.as_deref()) {
        return false;
    }
    if !text_matches(filters.industry.as_deref(), lead.industry.as_deref()) {
        return false;
    }
    if let Some(range) = filters.date_range {
        if !range.contains(now, lead.created_at) {
            return false;
        }
    }
    true
}

/// Case-insensitive equality; a blank filter matches everything.
fn text_matches(filter: Option<&str>, value: Option<&str>) -> bool {
    let wanted = match filter.map(str::trim) {
        None | Some("") => return true,
        Some(wanted) => wanted,
    };
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case(wanted))
}

/// `term` must already be trimmed and lower-cased.
pub fn search_matches(term: &str, lead: &Lead) -> bool {
    if term.is_empty() {
        return true;
    }

    let hit = |field: &str| field.to_lowercase().contains(term);

    hit(&lead.first_name)
        || hit(&lead.last_name)
        || hit(&lead.company)
        || lead.email.as_deref().is_some_and(hit)
        || lead.phone.as_deref().is_some_and(hit)
        || lead.tags.iter().any(|tag| hit(tag))
}

//! Deduplication criteria and results

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::leads::Lead;

/// A key two leads must share to count as duplicates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DedupCriterion {
    Email,
    Phone,
    /// first name + last name + company
    NameCompany,
}

impl DedupCriterion {
    /// Normalized key for this criterion, or `None` when the lead has nothing to match on.
    pub fn key(self, lead: &Lead) -> Option<String> {
        match self {
            Self::Email => normalized(lead.email.as_deref().unwrap_or_default()),
            Self::Phone => normalized(lead.phone.as_deref().unwrap_or_default()),
            Self::NameCompany => {
                let parts = [
                    normalize(&lead.first_name),
                    normalize(&lead.last_name),
                    normalize(&lead.company),
                ];
                if parts.iter().all(String::is_empty) {
                    None
                } else {
                    Some(parts.join("|"))
                }
            }
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalized(value: &str) -> Option<String> {
    Some(normalize(value)).filter(|key| !key.is_empty())
}

pub type CriteriaSet = BTreeSet<DedupCriterion>;

/// Leads sharing at least one enabled key, transitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// The member that survives a merge.
    pub retained: Uuid,
    /// Every member, retained one included, in store order.
    pub lead_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupSummary {
    /// Group members other than the retained one.
    pub duplicates_found: usize,
    /// One per group.
    pub kept: usize,
    pub deleted: usize,
    /// Converted members left in place.
    pub protected: usize,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::domain::NewLead;

    fn lead(first: &str, last: &str, company: &str, email: Option<&str>) -> TestResult<Lead> {
        Ok(Lead::new(
            Uuid::now_v7(),
            NewLead {
                first_name: first.to_string(),
                last_name: last.to_string(),
                company: company.to_string(),
                email: email.map(str::to_string),
                ..NewLead::default()
            },
        )?)
    }

    #[test]
    fn email_keys_ignore_case_and_whitespace() -> TestResult {
        let a = lead("Ann", "Lee", "Acme", Some("a@x.com"))?;
        let b = lead("Ann", "Lee", "Acme", Some("A@X.com "))?;

        assert_eq!(DedupCriterion::Email.key(&a), DedupCriterion::Email.key(&b));

        Ok(())
    }

    #[test]
    fn missing_fields_produce_no_key() -> TestResult {
        let a = lead("Ann", "Lee", "Acme", None)?;

        assert_eq!(DedupCriterion::Email.key(&a), None);
        assert_eq!(DedupCriterion::Phone.key(&a), None);

        Ok(())
    }

    #[test]
    fn compound_key_joins_all_three_parts() -> TestResult {
        let a = lead(" Ann", "LEE", "Acme ", None)?;

        assert_eq!(
            DedupCriterion::NameCompany.key(&a).as_deref(),
            Some("ann|lee|acme")
        );

        Ok(())
    }
}

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use testresult::TestResult;
use uuid::Uuid;

use leadflow_backend::clock::{Clock, ManualClock};
use leadflow_backend::domain::{
    BulkOperation, ConversionRequest, CriteriaSet, CustomFilters, DealStage, DedupCriterion,
    EngineError, LeadStatus, LeadUpdate, NewLead, ViewName,
};
use leadflow_backend::store::Repository;
use leadflow_backend::{Engine, EngineOptions};

struct Harness {
    clock: Arc<ManualClock>,
    engine: Engine,
    actor: Uuid,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 9, 14, 10, 0, 0).unwrap(),
    ));
    let engine = Engine::with_clock(clock.clone(), EngineOptions::default());
    Harness {
        clock,
        engine,
        actor: Uuid::now_v7(),
    }
}

fn lead(last_name: &str, company: &str) -> NewLead {
    NewLead {
        last_name: last_name.to_string(),
        company: company.to_string(),
        ..NewLead::default()
    }
}

fn create(h: &Harness, req: NewLead) -> TestResult<Uuid> {
    Ok(h.engine.leads.create(h.actor, req)?.id)
}

#[test]
fn converted_lead_rejects_every_update() -> TestResult {
    let h = harness();
    let id = create(&h, lead("Doe", "Globex"))?;
    h.engine
        .conversions
        .convert(h.actor, id, &ConversionRequest::without_deal())?;

    let patches = [
        LeadUpdate {
            first_name: Some("Jane".to_string()),
            ..LeadUpdate::default()
        },
        LeadUpdate {
            lead_status: Some(LeadStatus::Contacted),
            ..LeadUpdate::default()
        },
        LeadUpdate::default(),
    ];

    for patch in &patches {
        let result = h.engine.leads.update(id, patch);
        assert!(
            matches!(result, Err(EngineError::LeadLocked(locked)) if locked == id),
            "got {result:?}"
        );
    }

    Ok(())
}

#[test]
fn shared_company_yields_one_account() -> TestResult {
    let h = harness();
    let first = create(&h, lead("One", "Acme"))?;
    let second = create(&h, lead("Two", "  aCME  "))?;

    let a = h
        .engine
        .conversions
        .convert(h.actor, first, &ConversionRequest::without_deal())?;
    let b = h
        .engine
        .conversions
        .convert(h.actor, second, &ConversionRequest::without_deal())?;

    assert_eq!(a.account_id, b.account_id);
    let accounts = h.engine.store.accounts.all();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].contact_count, 2);

    Ok(())
}

#[test]
fn double_conversion_fails_without_duplicate_contact() -> TestResult {
    let h = harness();
    let id = create(&h, lead("Doe", "Globex"))?;

    h.engine
        .conversions
        .convert(h.actor, id, &ConversionRequest::without_deal())?;
    let second = h
        .engine
        .conversions
        .convert(h.actor, id, &ConversionRequest::without_deal());

    assert!(matches!(second, Err(EngineError::AlreadyConverted(_))));
    assert_eq!(h.engine.store.contacts.len(), 1);

    Ok(())
}

#[test]
fn dedup_keeps_earliest_email_match() -> TestResult {
    let h = harness();
    let first = create(
        &h,
        NewLead {
            email: Some("a@x.com".to_string()),
            ..lead("First", "Hooli")
        },
    )?;
    h.clock.advance(Duration::minutes(5));
    let second = create(
        &h,
        NewLead {
            email: Some("A@X.com ".to_string()),
            ..lead("Second", "Hooli")
        },
    )?;

    let criteria: CriteriaSet = [DedupCriterion::Email].into_iter().collect();
    let summary = h.engine.duplicates.deduplicate(&criteria)?;

    assert_eq!(summary.duplicates_found, 1);
    assert!(h.engine.leads.get(first).is_ok());
    assert!(matches!(
        h.engine.leads.get(second),
        Err(EngineError::NotFound { .. })
    ));

    Ok(())
}

#[test]
fn dedup_never_deletes_converted_lead() -> TestResult {
    let h = harness();
    let earliest = create(
        &h,
        NewLead {
            phone: Some("555-0100".to_string()),
            ..lead("Early", "Pied Piper")
        },
    )?;
    h.clock.advance(Duration::hours(1));
    let converted = create(
        &h,
        NewLead {
            phone: Some("555-0100".to_string()),
            ..lead("Late", "Pied Piper")
        },
    )?;
    h.engine
        .conversions
        .convert(h.actor, converted, &ConversionRequest::without_deal())?;

    let criteria: CriteriaSet = [DedupCriterion::Phone].into_iter().collect();
    let groups = h.engine.duplicates.find_duplicates(&criteria)?;
    assert_eq!(groups[0].retained, converted);

    h.engine.duplicates.deduplicate(&criteria)?;

    assert!(h.engine.leads.get(converted)?.is_converted());
    assert!(h.engine.leads.get(earliest).is_err());

    Ok(())
}

#[test]
fn empty_criteria_never_deletes() -> TestResult {
    let h = harness();
    create(&h, lead("Same", "Same"))?;
    create(&h, lead("Same", "Same"))?;

    let result = h.engine.duplicates.deduplicate(&CriteriaSet::new());

    assert!(matches!(result, Err(EngineError::NoCriteriaSelected)));
    assert_eq!(h.engine.store.leads.len(), 2);

    Ok(())
}

#[test]
fn open_view_is_status_only() -> TestResult {
    let h = harness();
    let mut expected = Vec::new();
    for status in [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Unqualified,
    ] {
        let id = create(
            &h,
            NewLead {
                lead_status: status,
                ..lead(status.label(), "Initech")
            },
        )?;
        if status.is_open() {
            expected.push(id);
        }
    }
    // Flags do not matter to the open view.
    h.engine.bulk.apply(h.actor, &expected[..1], &BulkOperation::MarkJunk)?;
    h.engine.leads.set_locked(expected[1], true)?;

    let mut open: Vec<Uuid> = h
        .engine
        .views
        .evaluate(ViewName::Open, &CustomFilters::default(), "")
        .into_iter()
        .map(|lead| lead.id)
        .collect();
    open.sort();
    expected.sort();

    assert_eq!(open, expected);

    Ok(())
}

#[test]
fn bulk_delete_survives_middle_failure() -> TestResult {
    let h = harness();
    let valid = create(&h, lead("A", "Acme"))?;
    let valid2 = create(&h, lead("B", "Acme"))?;
    let invalid = Uuid::now_v7();

    let result = h
        .engine
        .bulk
        .apply(h.actor, &[valid, invalid, valid2], &BulkOperation::Delete)?;

    assert_eq!(result.succeeded, vec![valid, valid2]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].id, invalid);
    assert_eq!(result.failed[0].code, "NOT_FOUND");

    let notice = result.notice();
    assert_eq!(notice.title, "Partial Success");
    assert!(notice.message.starts_with("2 of 3 succeeded, 1 failed: "));

    Ok(())
}

#[test]
fn tag_add_wins_over_remove() -> TestResult {
    let h = harness();
    let id = create(&h, lead("Tagged", "Acme"))?;

    let hot = vec!["hot".to_string()];
    let result = h.engine.tags.manage_tags(&[id], &hot, &hot);

    assert_eq!(result.updated, 1);
    assert!(h.engine.leads.get(id)?.tags.contains("hot"));

    Ok(())
}

#[test]
fn end_to_end_conversion_with_negative_deal_value() -> TestResult {
    let h = harness();
    let id = create(&h, lead("Doe", "Globex"))?;

    let outcome = h
        .engine
        .conversions
        .convert(h.actor, id, &ConversionRequest::with_deal(json!(-50)))?;

    let deal = h.engine.store.deals.get(outcome.deal_id.expect("deal requested"))?;
    assert_eq!(deal.value, Decimal::ZERO);
    assert_eq!(deal.stage, DealStage::Qualification);
    assert_eq!(deal.close_date, h.clock.now() + Duration::days(30));
    assert_eq!(serde_json::to_value(deal.stage)?, json!("qualification"));

    let account = h.engine.store.accounts.get(outcome.account_id)?;
    assert_eq!(account.name, "Globex");
    assert_eq!(account.contact_count, 1);

    let record = h.engine.conversions.conversion_for(id)?;
    assert_eq!(record.deal_id, outcome.deal_id);

    Ok(())
}

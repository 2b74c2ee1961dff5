//! In-memory integration tests for bulk transitions.

use super::helpers::Engine;
use eyre::{Result, ensure};
use leadline::lifecycle::{
    config::LifecycleConfig,
    domain::{IdempotencyKey, Lead, LeadStatus},
    ports::AuditSink,
    services::{
        BulkTransitionError, BulkTransitionRequest, TransitionErrorKind, TransitionRequest,
    },
};
use leadline::scope::domain::{OrgId, Role};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn bulk_move_reports_each_lead_in_order() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default().with_bulk_concurrency(3));
    let org_id = OrgId::new();
    let rep = engine.enrol(org_id, Role::SalesRep);
    let statuses = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Negotiation,
        LeadStatus::New,
        LeadStatus::Disqualified,
        LeadStatus::Contacted,
    ];
    let mut leads: Vec<Lead> = Vec::new();
    for status in statuses {
        leads.push(engine.seed(rep, Some(org_id), status).await?);
    }

    let result = engine
        .bulk
        .transition_all(
            &engine.context_for(rep).await?,
            BulkTransitionRequest::new(leads.iter().map(Lead::id), LeadStatus::Qualified),
        )
        .await?;

    ensure!(result.total == 6, "total {}", result.total);
    ensure!(result.succeeded == 4, "succeeded {}", result.succeeded);
    ensure!(result.failed == 2, "failed {}", result.failed);
    ensure!(
        result.items.iter().map(|item| item.lead_id).eq(leads.iter().map(Lead::id)),
        "items should follow request order"
    );
    for (item, status) in result.items.iter().zip(statuses) {
        let expected_failure = status.ordinal() >= LeadStatus::Qualified.ordinal();
        ensure!(
            item.failure() == expected_failure.then_some(TransitionErrorKind::InvalidTransition),
            "unexpected outcome {item:?} for lead at {status}"
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replayed_batch_skips_committed_items_and_retries_failed_ones() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default());
    let org_id = OrgId::new();
    let rep = engine.enrol(org_id, Role::SalesRep);
    let manager = engine.enrol(org_id, Role::Manager);
    let fresh = engine.seed(rep, Some(org_id), LeadStatus::New).await?;
    let advanced = engine.seed(rep, Some(org_id), LeadStatus::Proposal).await?;
    let request = BulkTransitionRequest::new([fresh.id(), advanced.id()], LeadStatus::Contacted)
        .with_idempotency_key(IdempotencyKey::new("import-2026-07")?);

    let rep_context = engine.context_for(rep).await?;

    let first = engine.bulk.transition_all(&rep_context, request.clone()).await?;
    ensure!(first.succeeded == 1 && first.failed == 1, "{first:?}");

    engine
        .service
        .transition(
            &engine.context_for(manager).await?,
            TransitionRequest::new(advanced.id(), LeadStatus::New),
        )
        .await?;
    let retried = engine.bulk.transition_all(&rep_context, request).await?;
    ensure!(retried.succeeded == 2, "{retried:?}");
    ensure!(
        engine.audit.history(fresh.id()).await?.len() == 1,
        "the committed item must not be written twice"
    );
    ensure!(
        engine.stored_status(&advanced).await? == LeadStatus::Contacted,
        "the failed item should run again on retry"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn oversized_batches_touch_nothing() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default().with_max_batch_size(1));
    let org_id = OrgId::new();
    let rep = engine.enrol(org_id, Role::SalesRep);
    let first = engine.seed(rep, Some(org_id), LeadStatus::New).await?;
    let second = engine.seed(rep, Some(org_id), LeadStatus::New).await?;

    let outcome = engine
        .bulk
        .transition_all(
            &engine.context_for(rep).await?,
            BulkTransitionRequest::new([first.id(), second.id()], LeadStatus::Contacted),
        )
        .await;

    ensure!(
        outcome == Err(BulkTransitionError::BatchTooLarge { requested: 2, max: 1 }),
        "{outcome:?}"
    );
    ensure!(engine.stored_status(&first).await? == LeadStatus::New, "untouched");
    Ok(())
}

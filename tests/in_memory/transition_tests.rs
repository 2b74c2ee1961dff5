//! In-memory integration tests for single-lead transitions.

use super::helpers::Engine;
use chrono::Duration;
use eyre::{Result, ensure};
use leadline::lifecycle::{
    config::LifecycleConfig,
    domain::{DecisionReason, EnforcementMode, IdempotencyKey, LeadStatus, TransitionMetadata},
    ports::AuditSink,
    services::{TransitionError, TransitionErrorKind, TransitionRequest},
};
use leadline::scope::domain::{OrgId, Role};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lead_walks_the_pipeline_and_history_follows() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default());
    let org_id = OrgId::new();
    let rep = engine.enrol(org_id, Role::SalesRep);
    let lead = engine.seed(rep, Some(org_id), LeadStatus::New).await?;
    let actor = engine.context_for(rep).await?;

    for target in [
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Proposal,
        LeadStatus::Converted,
    ] {
        engine.clock.advance(Duration::hours(2));
        let outcome = engine
            .service
            .transition(
                &actor,
                TransitionRequest::new(lead.id(), target)
                    .with_metadata(TransitionMetadata::new().with("stage", target.as_str())),
            )
            .await?;
        ensure!(outcome.status() == target, "expected {target}, got {}", outcome.status());
    }

    let history = engine.audit.history(lead.id()).await?;
    let moves: Vec<_> = history
        .iter()
        .map(|record| (record.previous_status(), record.new_status()))
        .collect();
    ensure!(
        moves
            == vec![
                (LeadStatus::New, LeadStatus::Contacted),
                (LeadStatus::Contacted, LeadStatus::Qualified),
                (LeadStatus::Qualified, LeadStatus::Proposal),
                (LeadStatus::Proposal, LeadStatus::Converted),
            ],
        "unexpected history {moves:?}"
    );
    ensure!(
        history.windows(2).all(|pair| match pair {
            [earlier, later] => earlier.occurred_at() < later.occurred_at(),
            _ => true,
        }),
        "history should be ordered by time"
    );
    ensure!(engine.notifier.sent().len() == 4, "one notification per move");
    ensure!(
        engine.stored_status(&lead).await? == LeadStatus::Converted,
        "final status should be stored"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manager_reopens_a_converted_lead() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default());
    let org_id = OrgId::new();
    let rep = engine.enrol(org_id, Role::SalesRep);
    let manager = engine.enrol(org_id, Role::Manager);
    let lead = engine.seed(rep, Some(org_id), LeadStatus::Converted).await?;

    let rep_attempt = engine
        .service
        .transition(
            &engine.context_for(rep).await?,
            TransitionRequest::new(lead.id(), LeadStatus::Negotiation),
        )
        .await;
    ensure!(
        matches!(rep_attempt, Err(TransitionError::InvalidTransition { .. })),
        "sales rep should not move backward: {rep_attempt:?}"
    );

    let outcome = engine
        .service
        .transition(
            &engine.context_for(manager).await?,
            TransitionRequest::new(lead.id(), LeadStatus::Negotiation),
        )
        .await?;
    ensure!(
        matches!(outcome.record().reason(), DecisionReason::Overridden(_)),
        "override should be recorded"
    );
    ensure!(
        engine.notifier.sent().first().map(|(owner, _)| *owner) == Some(rep),
        "owner should be notified"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn log_only_mode_permits_backward_moves() -> Result<()> {
    let engine =
        Engine::new(LifecycleConfig::default().with_enforcement_mode(EnforcementMode::LogOnly));
    let org_id = OrgId::new();
    let rep = engine.enrol(org_id, Role::SalesRep);
    let lead = engine.seed(rep, Some(org_id), LeadStatus::Proposal).await?;

    let outcome = engine
        .service
        .transition(
            &engine.context_for(rep).await?,
            TransitionRequest::new(lead.id(), LeadStatus::New),
        )
        .await?;

    ensure!(outcome.status() == LeadStatus::New, "move should be permitted");
    ensure!(
        matches!(outcome.record().reason(), DecisionReason::LoggedViolation(_)),
        "violation should be flagged"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn colleagues_in_other_orgs_cannot_see_the_lead() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default());
    let home = OrgId::new();
    let rep = engine.enrol(home, Role::SalesRep);
    let stranger = engine.enrol(OrgId::new(), Role::Admin);
    let lead = engine.seed(rep, Some(home), LeadStatus::New).await?;

    let err = engine
        .service
        .transition(
            &engine.context_for(stranger).await?,
            TransitionRequest::new(lead.id(), LeadStatus::Contacted),
        )
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("stranger should not move the lead"))?;

    ensure!(err.kind() == TransitionErrorKind::NotFound, "got {err}");
    ensure!(engine.audit.history(lead.id()).await?.is_empty(), "no audit");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn retried_request_replays_within_retention_only() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default());
    let org_id = OrgId::new();
    let rep = engine.enrol(org_id, Role::SalesRep);
    let lead = engine.seed(rep, Some(org_id), LeadStatus::New).await?;
    let actor = engine.context_for(rep).await?;
    let request = TransitionRequest::new(lead.id(), LeadStatus::Contacted)
        .with_idempotency_key(IdempotencyKey::new("form-submit-42")?);

    let first = engine.service.transition(&actor, request.clone()).await?;
    engine.clock.advance(Duration::hours(23));
    let replay = engine.service.transition(&actor, request.clone()).await?;
    ensure!(first == replay, "replay inside retention should match");
    ensure!(engine.audit.history(lead.id()).await?.len() == 1, "one write");

    engine.clock.advance(Duration::hours(1));
    let expired = engine.service.transition(&actor, request).await;
    ensure!(
        matches!(expired, Err(TransitionError::InvalidTransition { .. })),
        "expired key should be evaluated afresh: {expired:?}"
    );
    Ok(())
}

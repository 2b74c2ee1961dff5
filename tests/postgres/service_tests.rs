//! `PostgreSQL` integration tests for the transition service.

use std::sync::Arc;

use super::helpers::{PgContext, fixed_clock};
use eyre::{Result, ensure, eyre};
use leadline::lifecycle::{
    adapters::memory::RecordingNotificationChannel,
    config::LifecycleConfig,
    domain::{IdempotencyKey, Lead, LeadStatus},
    ports::{AuditSink, LeadRepository},
    services::{
        ActorContext, BulkTransitionCoordinator, BulkTransitionRequest, LifecycleTransitionService,
        TransitionRequest,
    },
};
use leadline::scope::domain::{ActorId, AuthorizationScope, MembershipRecord, OrgId, Role};
use mockable::Clock;
use rstest::rstest;

#[rstest]
#[ignore = "requires LEADLINE_TEST_DATABASE_URL"]
#[tokio::test(flavor = "multi_thread")]
async fn service_commits_through_postgres() -> Result<()> {
    let context = PgContext::create().await?;
    let clock = Arc::new(fixed_clock());
    let org_id = OrgId::new();
    let actor_id = ActorId::new();
    let actor = ActorContext::new(
        actor_id,
        AuthorizationScope::from_record(
            &MembershipRecord::new(actor_id, org_id, Role::SalesRep),
            clock.utc(),
        ),
    );
    let service = Arc::new(LifecycleTransitionService::new(
        Arc::clone(&context.repository),
        Arc::clone(&context.audit),
        Arc::new(RecordingNotificationChannel::new()),
        Arc::clone(&clock),
        LifecycleConfig::default(),
    ));
    let mut leads = Vec::new();
    for _ in 0..3 {
        let lead = Lead::new(actor_id, Some(org_id), &*clock);
        context.repository.store(&lead).await?;
        leads.push(lead);
    }

    let first_id = leads
        .first()
        .map(Lead::id)
        .ok_or_else(|| eyre!("three leads were seeded"))?;
    let single = service
        .transition(
            &actor,
            TransitionRequest::new(first_id, LeadStatus::Qualified)
                .with_idempotency_key(IdempotencyKey::new("pg-single")?),
        )
        .await?;
    ensure!(single.status() == LeadStatus::Qualified, "single move committed");

    let result = BulkTransitionCoordinator::new(Arc::clone(&service))
        .transition_all(
            &actor,
            BulkTransitionRequest::new(leads.iter().map(Lead::id), LeadStatus::Proposal),
        )
        .await?;
    ensure!(result.succeeded == 3, "{result:?}");

    for lead in &leads {
        let history = context.audit.history(lead.id()).await?;
        ensure!(
            history.last().map(|record| record.new_status()) == Some(LeadStatus::Proposal),
            "latest audit entry should record the bulk move"
        );
    }
    Ok(())
}

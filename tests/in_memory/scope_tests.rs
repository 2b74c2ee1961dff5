//! In-memory integration tests for scope resolution feeding the lifecycle
//! services.

use super::helpers::{Engine, start_of_quarter};
use chrono::Duration;
use eyre::{Result, ensure};
use leadline::lifecycle::{
    config::LifecycleConfig,
    domain::LeadStatus,
    services::{BulkTransitionError, BulkTransitionRequest, TransitionError, TransitionRequest},
};
use leadline::scope::{
    adapters::memory::InMemoryMembershipSource,
    domain::{ActorId, LicenseStatus, MembershipRecord, MembershipStatus, OrgId, Role},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unprovisioned_memberships_fall_back_to_personal_scope() -> Result<()> {
    let engine = Engine::with_memberships(
        LifecycleConfig::default(),
        InMemoryMembershipSource::unprovisioned(),
    );
    let solo = ActorId::new();
    let own = engine.seed(solo, None, LeadStatus::New).await?;
    let foreign = engine.seed(ActorId::new(), Some(OrgId::new()), LeadStatus::New).await?;
    let actor = engine.context_for(solo).await?;

    ensure!(
        actor.scope().license_status() == LicenseStatus::Unaffiliated,
        "scope should be unaffiliated"
    );
    let outcome = engine
        .service
        .transition(&actor, TransitionRequest::new(own.id(), LeadStatus::Contacted))
        .await?;
    ensure!(outcome.status() == LeadStatus::Contacted, "own lead should move");

    let blocked = engine
        .service
        .transition(&actor, TransitionRequest::new(foreign.id(), LeadStatus::Contacted))
        .await;
    ensure!(
        matches!(blocked, Err(TransitionError::NotFound(_))),
        "org leads stay invisible: {blocked:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn license_expiry_is_judged_at_resolution_time() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default());
    let org_id = OrgId::new();
    let admin = ActorId::new();
    engine.memberships.insert(
        MembershipRecord::new(admin, org_id, Role::Admin)
            .licensed(Some(start_of_quarter() + Duration::days(30))),
    );
    let lead = engine.seed(admin, Some(org_id), LeadStatus::New).await?;

    let licensed = engine.context_for(admin).await?;
    engine
        .service
        .transition(&licensed, TransitionRequest::new(lead.id(), LeadStatus::Contacted))
        .await?;

    engine.clock.advance(Duration::days(31));
    let lapsed = engine.context_for(admin).await?;
    ensure!(
        lapsed.scope().license_status() == LicenseStatus::LicenseExpired,
        "license should have lapsed"
    );
    let single = engine
        .service
        .transition(&lapsed, TransitionRequest::new(lead.id(), LeadStatus::Qualified))
        .await;
    ensure!(
        matches!(
            single,
            Err(TransitionError::LicenseBlocked(LicenseStatus::LicenseExpired))
        ),
        "{single:?}"
    );
    let bulk = engine
        .bulk
        .transition_all(
            &lapsed,
            BulkTransitionRequest::new([lead.id()], LeadStatus::Qualified),
        )
        .await;
    ensure!(
        bulk == Err(BulkTransitionError::LicenseBlocked(LicenseStatus::LicenseExpired)),
        "{bulk:?}"
    );
    ensure!(
        engine.stored_status(&lead).await? == LeadStatus::Contacted,
        "blocked calls must not write"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn disabled_memberships_are_skipped() -> Result<()> {
    let engine = Engine::new(LifecycleConfig::default());
    let actor_id = ActorId::new();
    let former = OrgId::new();
    let current = OrgId::new();
    engine.memberships.insert(
        MembershipRecord::new(actor_id, former, Role::Owner).with_status(MembershipStatus::Disabled),
    );
    engine
        .memberships
        .insert(MembershipRecord::new(actor_id, current, Role::Viewer));

    let actor = engine.context_for(actor_id).await?;

    ensure!(actor.scope().org_id() == Some(current), "active membership wins");
    ensure!(actor.scope().role() == Some(Role::Viewer), "role follows membership");
    ensure!(!actor.scope().is_org_admin(), "viewer is not an org admin");
    Ok(())
}

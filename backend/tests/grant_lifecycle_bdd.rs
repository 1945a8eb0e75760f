//! Behavioural tests for the grant application lifecycle endpoints.

#[path = "support/doubles.rs"]
mod doubles;
#[path = "support/harness.rs"]
mod harness;

use chrono::{Duration, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use backend::domain::Principal;
use backend::domain::cycle::{CycleType, GrantCycle};
use backend::domain::draft::ApplicationDraft;
use backend::test_support::fixtures::{sample_organization, standard_cycle_detail};
use harness::{Request, WorldFixture, dispatch, last_body, last_status};

const ORGANIZATION_IDENTITY: &str = "org@example.org";
const COMPETING_IDENTITY: &str = "treasurer@example.org";
const SCHEDULER_TOKEN: &str = "shared-secret";

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

#[given("an open standard cycle")]
fn an_open_standard_cycle(world: &WorldFixture) {
    let world = world.world();
    let detail = standard_cycle_detail();
    let mut ctx = world.borrow_mut();
    ctx.cycle_id = Some(detail.cycle.id);
    ctx.cycles.push(detail.cycle.clone());
    ctx.detail = Some(detail);
}

#[given("a private open cycle")]
fn a_private_open_cycle(world: &WorldFixture) {
    let world = world.world();
    let now = Utc::now();
    let cycle = GrantCycle::builder("Board Discretionary", CycleType::Seed)
        .open_time(now - Duration::days(1))
        .close_time(now + Duration::days(13))
        .private(true)
        .build();
    world.borrow_mut().cycles.push(cycle);
}

#[given("a registered organization with a usable profile")]
fn a_registered_organization_with_a_usable_profile(world: &WorldFixture) {
    let world = world.world();
    let mut organization = sample_organization();
    organization.profile.mission = "Feed the river valley".to_owned();
    organization.profile.email_address = ORGANIZATION_IDENTITY.to_owned();
    world.borrow_mut().organizations.push(organization);
}

#[given("the organization holds a draft for the cycle")]
fn the_organization_holds_a_draft_for_the_cycle(world: &WorldFixture) {
    let world = world.world();
    let mut ctx = world.borrow_mut();
    if ctx.organizations.is_empty() {
        ctx.organizations.push(sample_organization());
    }
    let organization_id = ctx.organizations.first().expect("an organization").id;
    let cycle_id = ctx.cycle_id.expect("a cycle was given");
    let draft = ApplicationDraft::builder(organization_id, cycle_id)
        .field("mission", "Original mission")
        .build();
    ctx.draft_id = Some(draft.id);
    ctx.drafts.push(draft);
}

#[given("another editor saved the draft moments ago")]
fn another_editor_saved_the_draft_moments_ago(world: &WorldFixture) {
    let world = world.world();
    let mut ctx = world.borrow_mut();
    let draft = ctx.drafts.last_mut().expect("a draft was given");
    draft.modified = Utc::now();
    draft.modified_by = Some(COMPETING_IDENTITY.to_owned());
}

#[given("the client is logged in as the organization")]
fn the_client_is_logged_in_as_the_organization(world: &WorldFixture) {
    let world = world.world();
    let mut ctx = world.borrow_mut();
    let organization_id = ctx
        .organizations
        .first()
        .expect("an organization was given")
        .id;
    ctx.principal = Some(Principal::organization(
        ORGANIZATION_IDENTITY,
        organization_id,
    ));
}

#[given("a configured scheduler token")]
fn a_configured_scheduler_token(world: &WorldFixture) {
    let world = world.world();
    world.borrow_mut().scheduler_token = Some(SCHEDULER_TOKEN.to_owned());
}

#[given("the scheduler presents the correct token")]
fn the_scheduler_presents_the_correct_token(world: &WorldFixture) {
    let world = world.world();
    world.borrow_mut().presented_token = Some(SCHEDULER_TOKEN.to_owned());
}

#[given("the scheduler presents a wrong token")]
fn the_scheduler_presents_a_wrong_token(world: &WorldFixture) {
    let world = world.world();
    world.borrow_mut().presented_token = Some("not-the-secret".to_owned());
}

#[when("the client lists cycles")]
fn the_client_lists_cycles(world: &WorldFixture) {
    let world = world.world();
    dispatch(&world, Request::get("/api/cycles"));
}

#[when("the client requests the application form without a session")]
fn the_client_requests_the_application_form_without_a_session(world: &WorldFixture) {
    let world = world.world();
    let cycle_id = world.borrow().cycle_id.expect("a cycle was given");
    dispatch(&world, Request::get(format!("/api/cycles/{cycle_id}/application")));
}

#[when("the client requests the application form")]
fn the_client_requests_the_application_form(world: &WorldFixture) {
    let world = world.world();
    let cycle_id = world.borrow().cycle_id.expect("a cycle was given");
    dispatch(&world, Request::get(format!("/api/cycles/{cycle_id}/application")));
}

#[when("the client autosaves new contents")]
fn the_client_autosaves_new_contents(world: &WorldFixture) {
    let world = world.world();
    let draft_id = world.borrow().draft_id.expect("a draft was given");
    dispatch(
        &world,
        Request::put(
            format!("/api/drafts/{draft_id}"),
            json!({ "contents": { "mission": "Updated mission" } }),
        ),
    );
}

#[when("the scheduler triggers the draft warning job")]
fn the_scheduler_triggers_the_draft_warning_job(world: &WorldFixture) {
    let world = world.world();
    dispatch(&world, Request::post("/api/jobs/draft-warnings"));
}

#[then("the response is ok")]
fn the_response_is_ok(world: &WorldFixture) {
    let world = world.world();
    assert_eq!(last_status(&world), 200);
}

#[then("the response is unauthorised")]
fn the_response_is_unauthorised(world: &WorldFixture) {
    let world = world.world();
    assert_eq!(last_status(&world), 401);
    let body = last_body(&world);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("unauthorized")
    );
}

#[then("the listing contains only the open cycle")]
fn the_listing_contains_only_the_open_cycle(world: &WorldFixture) {
    let world = world.world();
    let body = last_body(&world);
    let cycles = body.as_array().expect("a cycle array");
    assert_eq!(cycles.len(), 1, "the private cycle must stay hidden");
    let first = cycles.first().expect("one cycle");
    assert_eq!(
        first.get("title").and_then(Value::as_str),
        Some("Economic Justice Fund")
    );
}

#[then("the draft was created with the profile mission")]
fn the_draft_was_created_with_the_profile_mission(world: &WorldFixture) {
    let world = world.world();
    let body = last_body(&world);
    assert_eq!(body.get("created").and_then(Value::as_bool), Some(true));
    let mission = body
        .get("draft")
        .and_then(|draft| draft.get("contents"))
        .and_then(|contents| contents.get("mission"))
        .and_then(Value::as_str);
    assert_eq!(mission, Some("Feed the river valley"));
}

#[then("the saved draft records the editor")]
fn the_saved_draft_records_the_editor(world: &WorldFixture) {
    let world = world.world();
    let body = last_body(&world);
    let mission = body
        .get("contents")
        .and_then(|contents| contents.get("mission"))
        .and_then(Value::as_str);
    assert_eq!(mission, Some("Updated mission"));
    assert_eq!(
        body.get("modifiedBy").and_then(Value::as_str),
        Some(ORGANIZATION_IDENTITY)
    );
}

#[then("the response is a conflict with staleness details")]
fn the_response_is_a_conflict_with_staleness_details(world: &WorldFixture) {
    let world = world.world();
    assert_eq!(last_status(&world), 409);
    let body = last_body(&world);
    assert_eq!(body.get("code").and_then(Value::as_str), Some("conflict"));
    let details = body
        .get("details")
        .and_then(Value::as_object)
        .expect("staleness details");
    assert_eq!(
        details.get("modifiedBy").and_then(Value::as_str),
        Some(COMPETING_IDENTITY)
    );
    assert!(details.contains_key("stalenessWindowSeconds"));
}

#[then("the job report names the draft warning job")]
fn the_job_report_names_the_draft_warning_job(world: &WorldFixture) {
    let world = world.world();
    let body = last_body(&world);
    assert_eq!(
        body.get("kind").and_then(Value::as_str),
        Some("draft-warnings")
    );
    assert_eq!(body.get("skipped").and_then(Value::as_bool), Some(false));
}

#[scenario(path = "tests/features/grant_lifecycle.feature")]
fn grant_lifecycle(world: WorldFixture) {
    let _ = world;
}

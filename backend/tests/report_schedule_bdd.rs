//! Behavioural tests for the award report schedule endpoint.

#[path = "support/doubles.rs"]
mod doubles;
#[path = "support/harness.rs"]
mod harness;

use chrono::NaiveDate;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use uuid::Uuid;

use backend::domain::Principal;
use backend::domain::award::Award;
use backend::test_support::fixtures::{sample_application, sample_organization};
use harness::{Request, WorldFixture, dispatch, last_body, last_status};

const ORGANIZATION_IDENTITY: &str = "org@example.org";
const FIRST_REPORT_DUE: &str = "2025-03-01";
const SECOND_REPORT_DUE: &str = "2026-03-01";

#[fixture]
fn world() -> WorldFixture {
    harness::world()
}

fn due_date(value: &str) -> NaiveDate {
    value.parse().expect("a valid due date")
}

#[given("a submitted application from the organization")]
fn a_submitted_application_from_the_organization(world: &WorldFixture) {
    let world = world.world();
    let organization = sample_organization();
    let mut application = sample_application();
    application.organization_id = organization.id;
    let mut ctx = world.borrow_mut();
    ctx.organizations.push(organization);
    ctx.applications.push(application);
}

#[given("a one-year award on the application")]
fn a_one_year_award_on_the_application(world: &WorldFixture) {
    let world = world.world();
    let mut ctx = world.borrow_mut();
    let application_id = ctx.applications.first().expect("an application").id;
    let award = Award::builder(application_id, 15_000, due_date(FIRST_REPORT_DUE)).build();
    ctx.award_id = Some(award.id);
    ctx.awards.push(award);
}

#[given("a two-year award on the application")]
fn a_two_year_award_on_the_application(world: &WorldFixture) {
    let world = world.world();
    let mut ctx = world.borrow_mut();
    let application_id = ctx.applications.first().expect("an application").id;
    let award = Award::builder(application_id, 15_000, due_date(FIRST_REPORT_DUE))
        .second_year(10_000, due_date(SECOND_REPORT_DUE))
        .build();
    ctx.award_id = Some(award.id);
    ctx.awards.push(award);
}

#[given("the grantee has filed one report")]
fn the_grantee_has_filed_one_report(world: &WorldFixture) {
    let world = world.world();
    world.borrow_mut().reports_submitted = 1;
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

#[given("the client is logged in as another organization")]
fn the_client_is_logged_in_as_another_organization(world: &WorldFixture) {
    let world = world.world();
    world.borrow_mut().principal = Some(Principal::organization(
        "treasurer@elsewhere.org",
        Uuid::new_v4(),
    ));
}

#[when("the client fetches the award")]
fn the_client_fetches_the_award(world: &WorldFixture) {
    let world = world.world();
    let award_id = world.borrow().award_id.expect("an award was given");
    dispatch(&world, Request::get(format!("/api/awards/{award_id}")));
}

#[then("the response is ok")]
fn the_response_is_ok(world: &WorldFixture) {
    let world = world.world();
    assert_eq!(last_status(&world), 200);
}

#[then("the response is forbidden")]
fn the_response_is_forbidden(world: &WorldFixture) {
    let world = world.world();
    assert_eq!(last_status(&world), 403);
    let body = last_body(&world);
    assert_eq!(body.get("code").and_then(Value::as_str), Some("forbidden"));
}

#[then("the schedule expects report 1 on the first due date")]
fn the_schedule_expects_report_1_on_the_first_due_date(world: &WorldFixture) {
    let world = world.world();
    let body = last_body(&world);
    assert_eq!(body.get("reportsSubmitted").and_then(Value::as_u64), Some(0));
    assert_eq!(body.get("nextReportNumber").and_then(Value::as_u64), Some(1));
    assert_eq!(
        body.get("nextReportDue").and_then(Value::as_str),
        Some(FIRST_REPORT_DUE)
    );
}

#[then("the schedule expects report 2 on the second due date")]
fn the_schedule_expects_report_2_on_the_second_due_date(world: &WorldFixture) {
    let world = world.world();
    let body = last_body(&world);
    assert_eq!(body.get("reportsSubmitted").and_then(Value::as_u64), Some(1));
    assert_eq!(body.get("nextReportNumber").and_then(Value::as_u64), Some(2));
    assert_eq!(
        body.get("nextReportDue").and_then(Value::as_str),
        Some(SECOND_REPORT_DUE)
    );
    assert_eq!(
        body.get("award")
            .and_then(|award| award.get("grantLength"))
            .and_then(Value::as_u64),
        Some(2)
    );
}

#[then("the schedule shows no outstanding report")]
fn the_schedule_shows_no_outstanding_report(world: &WorldFixture) {
    let world = world.world();
    let body = last_body(&world);
    assert_eq!(body.get("reportsSubmitted").and_then(Value::as_u64), Some(1));
    assert!(
        body.get("nextReportNumber")
            .is_some_and(Value::is_null),
        "no further report number should be offered"
    );
    assert!(
        body.get("nextReportDue").is_some_and(Value::is_null),
        "no further due date should be offered"
    );
}

#[scenario(path = "tests/features/report_schedule.feature")]
fn report_schedule(world: WorldFixture) {
    let _ = world;
}

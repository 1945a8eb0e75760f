//! Shared world and in-process HTTP driver for the behavioural suites.
//!
//! Each request builds a fresh Actix test service around stub-backed
//! services. Because the session cookie key lives inside the middleware,
//! an authenticated step logs in against the same service instance before
//! issuing its real request and carries the returned cookie across.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpResponse, test, web};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;
use uuid::Uuid;

use backend::domain::application::SubmittedApplication;
use backend::domain::award::Award;
use backend::domain::cycle::{CycleDetail, GrantCycle};
use backend::domain::draft::ApplicationDraft;
use backend::domain::organization::Organization;
use backend::domain::ports::{
    FixtureBlobStore, FixtureEmailSender, FixtureJobRunRepository, FixtureNotificationRepository,
    FixtureQuestionRepository,
};
use backend::domain::{Error, Principal};
use backend::inbound::http::awards::award_detail;
use backend::inbound::http::cycles::{cycle_detail, list_cycles};
use backend::inbound::http::drafts::{application_form, autosave_draft};
use backend::inbound::http::jobs::{SCHEDULER_TOKEN_HEADER, trigger_job};
use backend::inbound::http::session::SessionContext;
use backend::inbound::http::state::{HttpState, HttpStatePorts};

use crate::doubles::{
    StubApplicationRepository, StubAwardRepository, StubCycleRepository, StubDraftRepository,
    StubOrganizationRepository, StubReportRepository,
};

/// Mutable state the steps of one scenario build up and assert against.
#[derive(Default)]
pub(crate) struct GrantsWorld {
    pub(crate) cycles: Vec<GrantCycle>,
    pub(crate) detail: Option<CycleDetail>,
    pub(crate) drafts: Vec<ApplicationDraft>,
    pub(crate) organizations: Vec<Organization>,
    pub(crate) applications: Vec<SubmittedApplication>,
    pub(crate) awards: Vec<Award>,
    pub(crate) reports_submitted: u32,
    pub(crate) scheduler_token: Option<String>,
    pub(crate) presented_token: Option<String>,
    pub(crate) principal: Option<Principal>,
    pub(crate) cycle_id: Option<Uuid>,
    pub(crate) draft_id: Option<Uuid>,
    pub(crate) award_id: Option<Uuid>,
    pub(crate) last_status: Option<u16>,
    pub(crate) last_body: Option<Value>,
}

pub(crate) type SharedWorld = Rc<RefCell<GrantsWorld>>;

pub(crate) struct WorldFixture {
    world: SharedWorld,
}

impl WorldFixture {
    pub(crate) fn world(&self) -> SharedWorld {
        self.world.clone()
    }
}

#[fixture]
pub(crate) fn world() -> WorldFixture {
    WorldFixture {
        world: Rc::new(RefCell::new(GrantsWorld::default())),
    }
}

/// HTTP method for a dispatched request.
#[derive(Clone, Copy)]
pub(crate) enum Method {
    Get,
    Put,
    Post,
}

/// One request for the driver to perform.
pub(crate) struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) json: Option<Value>,
}

impl Request {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            json: None,
        }
    }

    pub(crate) fn put(path: impl Into<String>, json: Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            json: Some(json),
        }
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            json: None,
        }
    }
}

async fn login(
    session: SessionContext,
    principal: web::Json<Principal>,
) -> Result<HttpResponse, Error> {
    session.persist_principal(&principal)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Perform one request against a freshly built service and record the
/// response on the world.
pub(crate) fn dispatch(world: &SharedWorld, request: Request) {
    let (ports, scheduler_token, principal, presented_token) = {
        let ctx = world.borrow();
        let ports = HttpStatePorts {
            drafts: Arc::new(StubDraftRepository::new(ctx.drafts.clone())),
            cycles: Arc::new(StubCycleRepository::new(
                ctx.cycles.clone(),
                ctx.detail.clone(),
            )),
            questions: Arc::new(FixtureQuestionRepository),
            organizations: Arc::new(StubOrganizationRepository::new(ctx.organizations.clone())),
            applications: Arc::new(StubApplicationRepository::new(ctx.applications.clone())),
            awards: Arc::new(StubAwardRepository::new(ctx.awards.clone())),
            reports: Arc::new(StubReportRepository::new(ctx.reports_submitted)),
            job_runs: Arc::new(FixtureJobRunRepository),
            notifications: Arc::new(FixtureNotificationRepository),
            emails: Arc::new(FixtureEmailSender),
            blobs: Arc::new(FixtureBlobStore),
            clock: Arc::new(DefaultClock),
        };
        (
            ports,
            ctx.scheduler_token.clone(),
            ctx.principal.clone(),
            ctx.presented_token.clone(),
        )
    };

    let (status, body) = actix_rt::System::new().block_on(async move {
        let state = web::Data::new(HttpState::new(ports, scheduler_token));
        let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
            .cookie_name("session".into())
            .cookie_secure(false)
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_same_site(SameSite::Lax)
            .session_lifecycle(
                PersistentSession::default().session_ttl(CookieDuration::hours(2)),
            )
            .build();
        let app = test::init_service(
            App::new().app_data(state).service(
                web::scope("/api")
                    .wrap(session)
                    .route("/test/login", web::post().to(login))
                    .service(list_cycles)
                    .service(cycle_detail)
                    .service(application_form)
                    .service(autosave_draft)
                    .service(award_detail)
                    .service(trigger_job),
            ),
        )
        .await;

        let mut session_cookie = None;
        if let Some(principal) = principal {
            let login_response = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/test/login")
                    .set_json(&principal)
                    .to_request(),
            )
            .await;
            assert!(
                login_response.status().is_success(),
                "login should succeed"
            );
            session_cookie = login_response
                .response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .map(|cookie| cookie.into_owned());
        }

        let mut builder = match request.method {
            Method::Get => test::TestRequest::get(),
            Method::Put => test::TestRequest::put(),
            Method::Post => test::TestRequest::post(),
        }
        .uri(&request.path);
        if let Some(cookie) = session_cookie {
            builder = builder.cookie(cookie);
        }
        if let Some(token) = presented_token {
            builder = builder.insert_header((SCHEDULER_TOKEN_HEADER, token));
        }
        if let Some(json) = &request.json {
            builder = builder.set_json(json);
        }

        let response = test::call_service(&app, builder.to_request()).await;
        let status = response.status().as_u16();
        let bytes = test::read_body(response).await;
        let body = serde_json::from_slice::<Value>(&bytes).ok();
        (status, body)
    });

    let mut ctx = world.borrow_mut();
    ctx.last_status = Some(status);
    ctx.last_body = body;
}

pub(crate) fn last_status(world: &SharedWorld) -> u16 {
    world.borrow().last_status.expect("a request was made")
}

pub(crate) fn last_body(world: &SharedWorld) -> Value {
    world
        .borrow()
        .last_body
        .clone()
        .expect("the response carried a body")
}

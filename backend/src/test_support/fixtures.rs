//! Canonical sample entities shared across test suites.
//!
//! The standard cycle carries the nine-question narrative set that real
//! standard cycles ship with, and `submission_ready_draft` fills every form
//! key the way a browser post would, so validation and conversion tests
//! exercise realistic data instead of minimal stubs.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::application::{SubmittedApplication, SupportType};
use crate::domain::cycle::{
    AssembledQuestion, AssembledReportQuestion, CycleDetail, CycleType, GrantCycle,
};
use crate::domain::draft::{ApplicationDraft, DraftFileField};
use crate::domain::organization::{Organization, OrganizationProfile};
use crate::domain::question::{Question, ReportInputType, ReportQuestion};

/// An open standard cycle: opened yesterday, closes in thirteen days.
pub fn standard_cycle() -> GrantCycle {
    let now = Utc::now();
    GrantCycle::builder("Economic Justice Fund", CycleType::Standard)
        .open_time(now - Duration::days(1))
        .close_time(now + Duration::days(13))
        .build()
}

fn narrative(order: u32, name: &str, version: &str, word_limit: Option<u32>) -> AssembledQuestion {
    AssembledQuestion {
        cycle_question_id: Uuid::new_v4(),
        order,
        question: Question {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            version: version.to_owned(),
            text: format!("<p>{name}</p>"),
            word_limit,
            archived: None,
            created: Utc::now(),
        },
    }
}

/// The standard nine-question narrative set in display order.
pub fn standard_questions() -> Vec<AssembledQuestion> {
    vec![
        narrative(1, "describe_mission", "standard", Some(300)),
        narrative(2, "most_impacted", "standard", Some(200)),
        narrative(3, "root_causes", "standard", Some(450)),
        narrative(4, "workplan", "standard", Some(300)),
        narrative(5, "timeline", "five_quarter", None),
        narrative(6, "racial_justice", "standard", Some(450)),
        narrative(7, "racial_justice_references", "standard", None),
        narrative(8, "collaboration", "standard", Some(300)),
        narrative(9, "collaboration_references", "standard", None),
    ]
}

fn report_question(
    order: u32,
    name: &str,
    input_type: ReportInputType,
    required: bool,
) -> AssembledReportQuestion {
    AssembledReportQuestion {
        cycle_report_question_id: Uuid::new_v4(),
        order,
        required,
        question: ReportQuestion {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            version: "standard".to_owned(),
            text: format!("<p>{name}</p>"),
            input_type,
            word_limit: 750,
            archived: None,
            created: Utc::now(),
        },
    }
}

/// A small report question set: a narrative, a number, and an optional photo.
pub fn standard_report_questions() -> Vec<AssembledReportQuestion> {
    vec![
        report_question(1, "lessons_learned", ReportInputType::Text, true),
        report_question(2, "total_spent", ReportInputType::Number, true),
        report_question(3, "event_photo", ReportInputType::Photo, false),
    ]
}

/// The standard cycle with both question sets attached.
pub fn standard_cycle_detail() -> CycleDetail {
    CycleDetail {
        cycle: standard_cycle(),
        questions: standard_questions(),
        report_questions: standard_report_questions(),
    }
}

/// A registered organization with an empty profile.
pub fn sample_organization() -> Organization {
    Organization {
        id: Uuid::new_v4(),
        name: "River Valley Collective".to_owned(),
        email: Some("org@example.org".to_owned()),
        profile: OrganizationProfile::default(),
    }
}

/// A complete typed application with no fiscal sponsor and no files.
pub fn sample_application() -> SubmittedApplication {
    SubmittedApplication {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        cycle_id: Uuid::new_v4(),
        submission_time: Utc::now(),
        address: "123 Main St".to_owned(),
        city: "Seattle".to_owned(),
        state: "WA".to_owned(),
        zip: "98101".to_owned(),
        telephone_number: "206-555-0100".to_owned(),
        fax_number: None,
        email_address: "info@rivervalley.org".to_owned(),
        website: None,
        status: "501c3".to_owned(),
        ein: "91-1234567".to_owned(),
        founded: 1994,
        mission: "Organizing for economic justice in the river valley.".to_owned(),
        previous_grants: None,
        start_year: "January".to_owned(),
        budget_last: 150_000,
        budget_current: 180_000,
        grant_request: "General operating support for our organizing programme.".to_owned(),
        contact_person: "Jordan Rivers".to_owned(),
        contact_person_title: "Executive Director".to_owned(),
        grant_period: None,
        amount_requested: 15_000,
        support_type: Some(SupportType::General),
        project_title: None,
        project_budget: None,
        fiscal_org: None,
        fiscal_person: None,
        fiscal_telephone: None,
        fiscal_email: None,
        fiscal_address: None,
        fiscal_city: None,
        fiscal_state: None,
        fiscal_zip: None,
        files: BTreeMap::new(),
    }
}

/// Draft contents covering every key a full standard-cycle form post sends,
/// valid against [`standard_cycle_detail`].
pub fn submission_ready_contents() -> BTreeMap<String, String> {
    let mut contents = BTreeMap::new();
    let mut put = |name: &str, value: &str| {
        contents.insert(name.to_owned(), value.to_owned());
    };

    put("address", "123 Main St");
    put("city", "Seattle");
    put("state", "WA");
    put("zip", "98101");
    put("telephone_number", "206-555-0100");
    put("fax_number", "");
    put("email_address", "info@rivervalley.org");
    put("website", "");
    put("status", "501c3");
    put("ein", "91-1234567");
    put("founded", "1994");
    put(
        "mission",
        "Organizing for economic justice in the river valley.",
    );
    put("previous_grants", "");
    put("start_year", "January");
    put("budget_last", "150000");
    put("budget_current", "180000");
    put(
        "grant_request",
        "General operating support for our organizing programme.",
    );
    put("contact_person", "Jordan Rivers");
    put("contact_person_title", "Executive Director");
    put("grant_period", "");
    put("amount_requested", "15000");
    put("support_type", "General support");
    put("project_title", "");
    put("project_budget", "");
    put("fiscal_org", "");
    put("fiscal_person", "");
    put("fiscal_telephone", "");
    put("fiscal_email", "");
    put("fiscal_address", "");
    put("fiscal_city", "");
    put("fiscal_state", "");
    put("fiscal_zip", "");

    put(
        "describe_mission",
        "We organize tenants and low-wage workers across the river valley.",
    );
    put(
        "most_impacted",
        "Tenants facing eviction and workers without union protection.",
    );
    put(
        "root_causes",
        "Concentrated land ownership and weak labour enforcement.",
    );
    put(
        "workplan",
        "Door knocking, leadership schools, and coalition campaigns.",
    );
    put(
        "racial_justice",
        "Our leadership is majority people of colour and every campaign centres racial justice.",
    );
    put(
        "collaboration",
        "We coordinate with the valley labour council and two tenant unions.",
    );

    put("timeline_0", "Jan");
    put("timeline_1", "Outreach");
    put("timeline_2", "Grow list");
    for index in 3..15 {
        put(&format!("timeline_{index}"), "");
    }

    put("collaboration_references_0", "Sam Alder");
    put("collaboration_references_1", "Valley Labour Council");
    put("collaboration_references_2", "206-555-0199");
    put("collaboration_references_3", "");
    for index in 4..8 {
        put(&format!("collaboration_references_{index}"), "");
    }
    for index in 0..8 {
        put(&format!("racial_justice_references_{index}"), "");
    }

    contents
}

/// A draft ready to submit against [`standard_cycle_detail`]: full contents
/// plus the five file uploads a standard cycle requires.
pub fn submission_ready_draft(organization_id: Uuid, cycle_id: Uuid) -> ApplicationDraft {
    ApplicationDraft::builder(organization_id, cycle_id)
        .contents(submission_ready_contents())
        .file(DraftFileField::Demographics, "blobs/demographics.xlsx")
        .file(DraftFileField::FundingSources, "blobs/funding.xlsx")
        .file(DraftFileField::Budget1, "blobs/budget1.xlsx")
        .file(DraftFileField::Budget2, "blobs/budget2.xlsx")
        .file(DraftFileField::Budget3, "blobs/budget3.xlsx")
        .build()
}

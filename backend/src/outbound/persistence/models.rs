//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations. Repositories convert between
//! rows and domain entities at their edges.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    application_drafts, applications, awards, cycle_questions, cycle_report_questions,
    grant_cycles, grantee_reports, job_runs, narrative_answers, notification_records,
    organizations, questions, report_answers, report_drafts, report_questions,
};

/// Row struct for the organizations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub profile: serde_json::Value,
}

/// Changeset refreshing an organization's cached profile.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = organizations)]
pub(crate) struct OrganizationProfileUpdate {
    pub profile: serde_json::Value,
}

/// Row struct for the questions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuestionRow {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub text: String,
    pub word_limit: Option<i32>,
    pub archived: Option<NaiveDate>,
    pub created: DateTime<Utc>,
}

/// Row struct for the report_questions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = report_questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportQuestionRow {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub text: String,
    pub input_type: String,
    pub word_limit: i32,
    pub archived: Option<NaiveDate>,
    pub created: DateTime<Utc>,
}

/// Row struct for the grant_cycles table, readable and insertable.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = grant_cycles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GrantCycleRow {
    pub id: Uuid,
    pub title: String,
    pub cycle_type: String,
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub info_url: Option<String>,
    pub private: bool,
    pub amount_note: Option<String>,
}

/// Row struct for the cycle_questions join table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cycle_questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CycleQuestionRow {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub question_id: Uuid,
    pub position: i32,
}

/// Row struct for the cycle_report_questions join table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = cycle_report_questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CycleReportQuestionRow {
    pub id: Uuid,
    pub cycle_id: Uuid,
    pub report_question_id: Uuid,
    pub position: i32,
    pub required: bool,
}

/// Row struct for the application_drafts table. Saves go through upsert, so
/// the same struct reads, inserts, and updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = application_drafts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationDraftRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub cycle_id: Uuid,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub modified_by: Option<String>,
    pub contents: serde_json::Value,
    pub files: serde_json::Value,
    pub extended_deadline: Option<DateTime<Utc>>,
}

/// Row struct for the applications table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub cycle_id: Uuid,
    pub submission_time: DateTime<Utc>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub telephone_number: String,
    pub fax_number: Option<String>,
    pub email_address: String,
    pub website: Option<String>,
    pub status: String,
    pub ein: String,
    pub founded: i32,
    pub mission: String,
    pub previous_grants: Option<String>,
    pub start_year: String,
    pub budget_last: i32,
    pub budget_current: i32,
    pub grant_request: String,
    pub contact_person: String,
    pub contact_person_title: String,
    pub grant_period: Option<String>,
    pub amount_requested: i32,
    pub support_type: Option<String>,
    pub project_title: Option<String>,
    pub project_budget: Option<i32>,
    pub fiscal_org: Option<String>,
    pub fiscal_person: Option<String>,
    pub fiscal_telephone: Option<String>,
    pub fiscal_email: Option<String>,
    pub fiscal_address: Option<String>,
    pub fiscal_city: Option<String>,
    pub fiscal_state: Option<String>,
    pub fiscal_zip: Option<String>,
    pub files: serde_json::Value,
}

/// Row struct for the narrative_answers table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = narrative_answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NarrativeAnswerRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub cycle_question_id: Uuid,
    pub text: String,
}

/// Row struct for the awards table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = awards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AwardRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub created: DateTime<Utc>,
    pub amount: i32,
    pub check_number: Option<i32>,
    pub check_mailed: Option<NaiveDate>,
    pub second_amount: Option<i32>,
    pub second_check_number: Option<i32>,
    pub second_check_mailed: Option<NaiveDate>,
    pub agreement_mailed: Option<NaiveDate>,
    pub agreement_returned: Option<NaiveDate>,
    pub approved: Option<NaiveDate>,
    pub first_report_due: NaiveDate,
    pub second_report_due: Option<NaiveDate>,
}

/// Row struct for the report_drafts table. Saves go through upsert, so the
/// same struct reads, inserts, and updates.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = report_drafts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportDraftRow {
    pub id: Uuid,
    pub award_id: Uuid,
    pub report_number: i32,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub modified_by: Option<String>,
    pub contents: serde_json::Value,
    pub files: serde_json::Value,
}

/// Row struct for the grantee_reports table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = grantee_reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GranteeReportRow {
    pub id: Uuid,
    pub award_id: Uuid,
    pub report_number: i32,
    pub submitted: DateTime<Utc>,
}

/// Row struct for the report_answers table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = report_answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportAnswerRow {
    pub id: Uuid,
    pub grantee_report_id: Uuid,
    pub cycle_report_question_id: Uuid,
    pub text: String,
}

/// Row struct for the job_runs ledger table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = job_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JobRunRow {
    pub id: Uuid,
    pub kind: String,
    pub run_date: NaiveDate,
    pub started_at: DateTime<Utc>,
    pub outcome: String,
}

/// Row struct for the notification_records ledger table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notification_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRecordRow {
    pub id: Uuid,
    pub recipient: String,
    pub kind: String,
    pub due_date: NaiveDate,
    pub sent_at: DateTime<Utc>,
}

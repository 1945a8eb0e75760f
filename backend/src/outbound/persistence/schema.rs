//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Grantee organizations with their cached profiles.
    organizations (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique display name.
        name -> Varchar,
        /// Login email; null for staff-created, unregistered organizations.
        email -> Nullable<Varchar>,
        /// Cached profile from the latest submission, as JSONB.
        profile -> Jsonb,
    }
}

diesel::table! {
    /// Narrative question catalogue.
    questions (id) {
        id -> Uuid,
        /// Stable field key, e.g. `mission`.
        name -> Varchar,
        /// Variant label distinguishing rewordings.
        version -> Varchar,
        /// Display text, raw HTML.
        text -> Text,
        /// Word limit for prose answers; null disables the check.
        word_limit -> Nullable<Int4>,
        /// Date the question was withdrawn from new cycle assembly.
        archived -> Nullable<Date>,
        created -> Timestamptz,
    }
}

diesel::table! {
    /// Grantee-report question catalogue.
    report_questions (id) {
        id -> Uuid,
        name -> Varchar,
        version -> Varchar,
        text -> Text,
        /// Input widget: text, number, file, or photo.
        input_type -> Varchar,
        word_limit -> Int4,
        archived -> Nullable<Date>,
        created -> Timestamptz,
    }
}

diesel::table! {
    /// Application windows.
    grant_cycles (id) {
        id -> Uuid,
        title -> Varchar,
        /// Stored category: standard, rapid, or seed.
        cycle_type -> Varchar,
        open_time -> Timestamptz,
        close_time -> Timestamptz,
        info_url -> Nullable<Varchar>,
        /// Hidden from the open listing when true.
        private -> Bool,
        amount_note -> Nullable<Text>,
    }
}

diesel::table! {
    /// Join rows attaching narrative questions to cycles at a position.
    cycle_questions (id) {
        id -> Uuid,
        cycle_id -> Uuid,
        question_id -> Uuid,
        /// 1-based display position, unique within the cycle.
        position -> Int4,
    }
}

diesel::table! {
    /// Join rows attaching report questions to cycles at a position.
    cycle_report_questions (id) {
        id -> Uuid,
        cycle_id -> Uuid,
        report_question_id -> Uuid,
        position -> Int4,
        required -> Bool,
    }
}

diesel::table! {
    /// Mutable application drafts, one per `(organization, cycle)`.
    application_drafts (id) {
        id -> Uuid,
        organization_id -> Uuid,
        cycle_id -> Uuid,
        created -> Timestamptz,
        modified -> Timestamptz,
        /// Identity that performed the most recent autosave.
        modified_by -> Nullable<Varchar>,
        /// Flat form answers keyed by field name, as JSONB.
        contents -> Jsonb,
        /// Blob references keyed by file slot name, as JSONB.
        files -> Jsonb,
        /// Per-draft deadline override granted by staff.
        extended_deadline -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Typed, immutable submitted applications.
    applications (id) {
        id -> Uuid,
        organization_id -> Uuid,
        cycle_id -> Uuid,
        submission_time -> Timestamptz,
        address -> Varchar,
        city -> Varchar,
        state -> Varchar,
        zip -> Varchar,
        telephone_number -> Varchar,
        fax_number -> Nullable<Varchar>,
        email_address -> Varchar,
        website -> Nullable<Varchar>,
        status -> Varchar,
        ein -> Varchar,
        founded -> Int4,
        mission -> Text,
        previous_grants -> Nullable<Text>,
        start_year -> Varchar,
        budget_last -> Int4,
        budget_current -> Int4,
        grant_request -> Text,
        contact_person -> Varchar,
        contact_person_title -> Varchar,
        grant_period -> Nullable<Varchar>,
        amount_requested -> Int4,
        /// Stored support-type string; null outside standard cycles.
        support_type -> Nullable<Varchar>,
        project_title -> Nullable<Varchar>,
        project_budget -> Nullable<Int4>,
        fiscal_org -> Nullable<Varchar>,
        fiscal_person -> Nullable<Varchar>,
        fiscal_telephone -> Nullable<Varchar>,
        fiscal_email -> Nullable<Varchar>,
        fiscal_address -> Nullable<Varchar>,
        fiscal_city -> Nullable<Varchar>,
        fiscal_state -> Nullable<Varchar>,
        fiscal_zip -> Nullable<Varchar>,
        /// Blob references keyed by file slot name, as JSONB.
        files -> Jsonb,
    }
}

diesel::table! {
    /// Narrative answers, one per `(application, cycle question)`.
    narrative_answers (id) {
        id -> Uuid,
        application_id -> Uuid,
        cycle_question_id -> Uuid,
        text -> Text,
    }
}

diesel::table! {
    /// Awards, one per funded application.
    awards (id) {
        id -> Uuid,
        application_id -> Uuid,
        created -> Timestamptz,
        /// First-year amount, whole dollars.
        amount -> Int4,
        check_number -> Nullable<Int4>,
        check_mailed -> Nullable<Date>,
        /// Second-year amount; present iff this is a two-year grant.
        second_amount -> Nullable<Int4>,
        second_check_number -> Nullable<Int4>,
        second_check_mailed -> Nullable<Date>,
        agreement_mailed -> Nullable<Date>,
        agreement_returned -> Nullable<Date>,
        approved -> Nullable<Date>,
        first_report_due -> Date,
        second_report_due -> Nullable<Date>,
    }
}

diesel::table! {
    /// Mutable grantee report drafts, one per `(award, report number)`.
    report_drafts (id) {
        id -> Uuid,
        award_id -> Uuid,
        report_number -> Int4,
        created -> Timestamptz,
        modified -> Timestamptz,
        modified_by -> Nullable<Varchar>,
        /// Flat answers keyed by report-question name, as JSONB.
        contents -> Jsonb,
        /// Blob references keyed by report-question name, as JSONB.
        files -> Jsonb,
    }
}

diesel::table! {
    /// Submitted grantee reports, one per `(award, report number)`.
    grantee_reports (id) {
        id -> Uuid,
        award_id -> Uuid,
        report_number -> Int4,
        submitted -> Timestamptz,
    }
}

diesel::table! {
    /// Report answers, one per `(report, cycle report question)`.
    report_answers (id) {
        id -> Uuid,
        grantee_report_id -> Uuid,
        cycle_report_question_id -> Uuid,
        text -> Text,
    }
}

diesel::table! {
    /// Scheduled-job run ledger, one row per `(kind, run date)`.
    job_runs (id) {
        id -> Uuid,
        /// Job kind: auto-cycles, draft-warnings, or report-reminders.
        kind -> Varchar,
        run_date -> Date,
        started_at -> Timestamptz,
        /// Short outcome summary, e.g. `notified 3 of 5`.
        outcome -> Varchar,
    }
}

diesel::table! {
    /// Notification send ledger, one row per `(recipient, kind, due date)`.
    notification_records (id) {
        id -> Uuid,
        recipient -> Varchar,
        /// Notification kind: draft_warning or a report reminder.
        kind -> Varchar,
        due_date -> Date,
        sent_at -> Timestamptz,
    }
}

diesel::joinable!(cycle_questions -> grant_cycles (cycle_id));
diesel::joinable!(cycle_questions -> questions (question_id));
diesel::joinable!(cycle_report_questions -> grant_cycles (cycle_id));
diesel::joinable!(cycle_report_questions -> report_questions (report_question_id));
diesel::joinable!(application_drafts -> organizations (organization_id));
diesel::joinable!(application_drafts -> grant_cycles (cycle_id));
diesel::joinable!(applications -> organizations (organization_id));
diesel::joinable!(applications -> grant_cycles (cycle_id));
diesel::joinable!(narrative_answers -> applications (application_id));
diesel::joinable!(narrative_answers -> cycle_questions (cycle_question_id));
diesel::joinable!(awards -> applications (application_id));
diesel::joinable!(report_drafts -> awards (award_id));
diesel::joinable!(grantee_reports -> awards (award_id));
diesel::joinable!(report_answers -> grantee_reports (grantee_report_id));
diesel::joinable!(report_answers -> cycle_report_questions (cycle_report_question_id));

diesel::allow_tables_to_appear_in_same_query!(
    organizations,
    questions,
    report_questions,
    grant_cycles,
    cycle_questions,
    cycle_report_questions,
    application_drafts,
    applications,
    narrative_answers,
    awards,
    report_drafts,
    grantee_reports,
    report_answers,
    job_runs,
    notification_records,
);

//! PostgreSQL-backed `ApplicationRepository` implementation using Diesel.
//!
//! Submit and revert are the two transactional edges of the application
//! lifecycle. Submit inserts the typed application with its answers, deletes
//! the source draft, and refreshes the organization's cached profile in the
//! same transaction; revert is the exact inverse. The unique index on
//! `(organization_id, cycle_id)` turns a concurrent double submit into a
//! duplicate error.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{exists, not};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{QueryFragment, QueryId};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::application::{NarrativeAnswer, SubmittedApplication, SupportType};
use crate::domain::convert::ConvertedSubmission;
use crate::domain::draft::ApplicationDraft;
use crate::domain::organization::OrganizationProfile;
use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};

use super::diesel_helpers::{
    cast_count, cast_count_for_db, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_draft_repository::draft_to_row;
use super::json_serializers::{file_map_to_json, json_to_file_map, profile_to_json};
use super::models::{ApplicationRow, NarrativeAnswerRow, OrganizationProfileUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{application_drafts, applications, cycle_questions, narrative_answers, organizations};

/// Diesel-backed implementation of the `ApplicationRepository` port.
#[derive(Clone)]
pub struct DieselApplicationRepository {
    pool: DbPool,
}

impl DieselApplicationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ApplicationRepositoryError {
    map_basic_pool_error(error, ApplicationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ApplicationRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return ApplicationRepositoryError::duplicate(
            "this organization already submitted to this cycle",
        );
    }
    map_basic_diesel_error(
        error,
        ApplicationRepositoryError::query,
        ApplicationRepositoryError::connection,
    )
}

pub(super) fn row_to_application(row: ApplicationRow) -> Result<SubmittedApplication, String> {
    let support_type = row
        .support_type
        .as_deref()
        .map(SupportType::from_str)
        .transpose()
        .map_err(|e| format!("application {}: {e}", row.id))?;
    Ok(SubmittedApplication {
        id: row.id,
        organization_id: row.organization_id,
        cycle_id: row.cycle_id,
        submission_time: row.submission_time,
        address: row.address,
        city: row.city,
        state: row.state,
        zip: row.zip,
        telephone_number: row.telephone_number,
        fax_number: row.fax_number,
        email_address: row.email_address,
        website: row.website,
        status: row.status,
        ein: row.ein,
        founded: cast_count(row.founded),
        mission: row.mission,
        previous_grants: row.previous_grants,
        start_year: row.start_year,
        budget_last: cast_count(row.budget_last),
        budget_current: cast_count(row.budget_current),
        grant_request: row.grant_request,
        contact_person: row.contact_person,
        contact_person_title: row.contact_person_title,
        grant_period: row.grant_period,
        amount_requested: cast_count(row.amount_requested),
        support_type,
        project_title: row.project_title,
        project_budget: row.project_budget.map(cast_count),
        fiscal_org: row.fiscal_org,
        fiscal_person: row.fiscal_person,
        fiscal_telephone: row.fiscal_telephone,
        fiscal_email: row.fiscal_email,
        fiscal_address: row.fiscal_address,
        fiscal_city: row.fiscal_city,
        fiscal_state: row.fiscal_state,
        fiscal_zip: row.fiscal_zip,
        files: json_to_file_map(row.files)?,
    })
}

fn application_to_row(application: &SubmittedApplication) -> ApplicationRow {
    ApplicationRow {
        id: application.id,
        organization_id: application.organization_id,
        cycle_id: application.cycle_id,
        submission_time: application.submission_time,
        address: application.address.clone(),
        city: application.city.clone(),
        state: application.state.clone(),
        zip: application.zip.clone(),
        telephone_number: application.telephone_number.clone(),
        fax_number: application.fax_number.clone(),
        email_address: application.email_address.clone(),
        website: application.website.clone(),
        status: application.status.clone(),
        ein: application.ein.clone(),
        founded: cast_count_for_db(application.founded),
        mission: application.mission.clone(),
        previous_grants: application.previous_grants.clone(),
        start_year: application.start_year.clone(),
        budget_last: cast_count_for_db(application.budget_last),
        budget_current: cast_count_for_db(application.budget_current),
        grant_request: application.grant_request.clone(),
        contact_person: application.contact_person.clone(),
        contact_person_title: application.contact_person_title.clone(),
        grant_period: application.grant_period.clone(),
        amount_requested: cast_count_for_db(application.amount_requested),
        support_type: application.support_type.map(|s| s.as_str().to_owned()),
        project_title: application.project_title.clone(),
        project_budget: application.project_budget.map(cast_count_for_db),
        fiscal_org: application.fiscal_org.clone(),
        fiscal_person: application.fiscal_person.clone(),
        fiscal_telephone: application.fiscal_telephone.clone(),
        fiscal_email: application.fiscal_email.clone(),
        fiscal_address: application.fiscal_address.clone(),
        fiscal_city: application.fiscal_city.clone(),
        fiscal_state: application.fiscal_state.clone(),
        fiscal_zip: application.fiscal_zip.clone(),
        files: file_map_to_json(&application.files),
    }
}

fn row_to_answer(row: NarrativeAnswerRow) -> NarrativeAnswer {
    NarrativeAnswer {
        id: row.id,
        application_id: row.application_id,
        cycle_question_id: row.cycle_question_id,
        text: row.text,
    }
}

fn answer_to_row(answer: &NarrativeAnswer) -> NarrativeAnswerRow {
    NarrativeAnswerRow {
        id: answer.id,
        application_id: answer.application_id,
        cycle_question_id: answer.cycle_question_id,
        text: answer.text.clone(),
    }
}

/// Refresh the cached profile only when this submission is still the
/// organization's latest. Under concurrent submits the commit order can
/// differ from `submission_time` order, so the guard lives in the same
/// statement rather than a separate read.
fn profile_refresh(
    organization_id: Uuid,
    submission_time: DateTime<Utc>,
    update: OrganizationProfileUpdate,
) -> impl QueryFragment<Pg> + QueryId + Send {
    let later_submission = applications::table
        .filter(applications::organization_id.eq(organization_id))
        .filter(applications::submission_time.gt(submission_time));
    diesel::update(
        organizations::table
            .filter(organizations::id.eq(organization_id))
            .filter(not(exists(later_submission))),
    )
    .set(update)
}

#[async_trait]
impl ApplicationRepository for DieselApplicationRepository {
    async fn find(
        &self,
        application_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ApplicationRow> = applications::table
            .filter(applications::id.eq(application_id))
            .select(ApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_application)
            .transpose()
            .map_err(ApplicationRepositoryError::query)
    }

    async fn find_for(
        &self,
        organization_id: Uuid,
        cycle_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ApplicationRow> = applications::table
            .filter(applications::organization_id.eq(organization_id))
            .filter(applications::cycle_id.eq(cycle_id))
            .select(ApplicationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_application)
            .transpose()
            .map_err(ApplicationRepositoryError::query)
    }

    async fn answers(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<NarrativeAnswer>, ApplicationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NarrativeAnswerRow> = narrative_answers::table
            .inner_join(cycle_questions::table)
            .filter(narrative_answers::application_id.eq(application_id))
            .order_by(cycle_questions::position.asc())
            .select(NarrativeAnswerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_answer).collect())
    }

    async fn submit(
        &self,
        submission: &ConvertedSubmission,
        draft_id: Uuid,
        profile: &OrganizationProfile,
    ) -> Result<(), ApplicationRepositoryError> {
        let application_row = application_to_row(&submission.application);
        let answer_rows: Vec<NarrativeAnswerRow> =
            submission.answers.iter().map(answer_to_row).collect();
        let organization_id = submission.application.organization_id;
        let submission_time = submission.application.submission_time;
        let profile_update = OrganizationProfileUpdate {
            profile: profile_to_json(profile).map_err(ApplicationRepositoryError::query)?,
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(applications::table)
                    .values(&application_row)
                    .execute(conn)
                    .await?;

                if !answer_rows.is_empty() {
                    diesel::insert_into(narrative_answers::table)
                        .values(&answer_rows)
                        .execute(conn)
                        .await?;
                }

                diesel::delete(
                    application_drafts::table.filter(application_drafts::id.eq(draft_id)),
                )
                .execute(conn)
                .await?;

                profile_refresh(organization_id, submission_time, profile_update)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn revert(
        &self,
        application_id: Uuid,
        draft: &ApplicationDraft,
    ) -> Result<(), ApplicationRepositoryError> {
        let draft_row = draft_to_row(draft);

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    narrative_answers::table
                        .filter(narrative_answers::application_id.eq(application_id)),
                )
                .execute(conn)
                .await?;

                diesel::delete(applications::table.filter(applications::id.eq(application_id)))
                    .execute(conn)
                    .await?;

                diesel::insert_into(application_drafts::table)
                    .values(&draft_row)
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::draft::DraftFileField;
    use crate::test_support::fixtures::{sample_application, sample_organization};
    use rstest::rstest;

    #[rstest]
    fn applications_round_trip_through_rows() {
        let mut application = sample_application();
        application.support_type = Some(SupportType::Project);
        application.project_title = Some("Tenant hotline".to_owned());
        application.project_budget = Some(8_000);
        application
            .files
            .insert(DraftFileField::Budget1, "blobs/budget.xlsx".to_owned());

        let decoded =
            row_to_application(application_to_row(&application)).expect("valid row");
        assert_eq!(decoded, application);
    }

    #[rstest]
    fn unknown_support_types_fail_decoding() {
        let mut row = application_to_row(&sample_application());
        row.support_type = Some("Capital support".to_owned());
        let err = row_to_application(row).expect_err("bad support type");
        assert!(err.contains("Capital support"));
    }

    #[rstest]
    fn profiles_encode_into_the_organization_changeset() {
        let mut organization = sample_organization();
        organization.profile.city = "Spokane".to_owned();
        let update = OrganizationProfileUpdate {
            profile: profile_to_json(&organization.profile)
                .map_err(ApplicationRepositoryError::query)
                .expect("profile encodes"),
        };
        assert_eq!(
            update.profile.get("city").and_then(serde_json::Value::as_str),
            Some("Spokane")
        );
    }

    #[rstest]
    fn profile_refresh_yields_to_a_later_submission() {
        let update = OrganizationProfileUpdate {
            profile: serde_json::json!({}),
        };
        let statement = profile_refresh(Uuid::new_v4(), Utc::now(), update);
        let sql = diesel::debug_query::<Pg, _>(&statement).to_string();
        assert!(sql.contains("NOT (EXISTS"), "update must carry the guard: {sql}");
        assert!(sql.contains("\"submission_time\" > "), "guard must compare submission times: {sql}");
    }

    #[rstest]
    fn unique_violations_become_duplicates() {
        let err = map_diesel_error(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        ));
        assert!(matches!(err, ApplicationRepositoryError::Duplicate { .. }));
    }
}

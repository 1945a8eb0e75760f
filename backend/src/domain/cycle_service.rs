//! Cycle listing, detail, and staff creation with question assembly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::auth::Principal;
use crate::domain::cycle::{
    CycleDetail, CycleQuestion, CycleReportQuestion, CycleType, GrantCycle,
    orders_form_permutation,
};
use crate::domain::ports::{
    CycleRepository, CycleRepositoryError, QuestionRepository, QuestionRepositoryError,
};
use crate::domain::validation::FieldErrors;
use crate::domain::Error;

/// A narrative question picked for a new cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAssignment {
    /// Catalogue question id.
    pub question_id: Uuid,
    /// 1-based display position.
    pub order: u32,
}

/// A report question picked for a new cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuestionAssignment {
    /// Catalogue report question id.
    pub report_question_id: Uuid,
    /// 1-based display position.
    pub order: u32,
    /// Whether grantees must answer it.
    pub required: bool,
}

/// Staff request to open a new cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCycleRequest {
    /// Display title.
    pub title: String,
    /// Explicit type; inferred from the title when absent.
    pub cycle_type: Option<CycleType>,
    /// Moment applications open.
    pub open_time: DateTime<Utc>,
    /// Moment applications close.
    pub close_time: DateTime<Utc>,
    /// Optional information page.
    pub info_url: Option<String>,
    /// Hide from the open listing.
    pub private: bool,
    /// Free-text award amount note.
    pub amount_note: Option<String>,
    /// Narrative questions with their positions.
    pub questions: Vec<QuestionAssignment>,
    /// Report questions with their positions.
    pub report_questions: Vec<ReportQuestionAssignment>,
}

/// Read and staff-write operations on grant cycles.
#[derive(Clone)]
pub struct CycleService {
    cycles: Arc<dyn CycleRepository>,
    questions: Arc<dyn QuestionRepository>,
    clock: Arc<dyn Clock>,
}

impl CycleService {
    /// Create a new service over the given ports.
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        questions: Arc<dyn QuestionRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            questions,
            clock,
        }
    }

    pub(crate) fn map_cycle_error(error: CycleRepositoryError) -> Error {
        match error {
            CycleRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("cycle repository unavailable: {message}"))
            }
            CycleRepositoryError::Query { message } => {
                Error::internal(format!("cycle repository error: {message}"))
            }
        }
    }

    fn map_question_error(error: QuestionRepositoryError) -> Error {
        match error {
            QuestionRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("question repository unavailable: {message}"))
            }
            QuestionRepositoryError::Query { message } => {
                Error::internal(format!("question repository error: {message}"))
            }
        }
    }

    /// Cycles currently open to applicants, excluding private ones.
    pub async fn list_open(&self) -> Result<Vec<GrantCycle>, Error> {
        self.cycles
            .list_open(self.clock.utc())
            .await
            .map_err(Self::map_cycle_error)
    }

    /// A cycle with its ordered questions.
    pub async fn detail(&self, cycle_id: Uuid) -> Result<CycleDetail, Error> {
        self.cycles
            .detail(cycle_id)
            .await
            .map_err(Self::map_cycle_error)?
            .ok_or_else(|| Error::not_found("No such cycle"))
    }

    /// Create a cycle with its assembled question sets.
    ///
    /// Rejects malformed windows, archived or unknown questions, duplicate
    /// picks, and order sets that are not a permutation of `1..=N`.
    pub async fn create(
        &self,
        principal: &Principal,
        request: CreateCycleRequest,
    ) -> Result<GrantCycle, Error> {
        principal.require_staff()?;
        Self::validate_request(&request)?;

        let narrative_ids: Vec<Uuid> =
            request.questions.iter().map(|pick| pick.question_id).collect();
        let report_ids: Vec<Uuid> = request
            .report_questions
            .iter()
            .map(|pick| pick.report_question_id)
            .collect();

        let known = if narrative_ids.is_empty() {
            Vec::new()
        } else {
            self.questions
                .find_questions(&narrative_ids)
                .await
                .map_err(Self::map_question_error)?
        };
        let known_reports = if report_ids.is_empty() {
            Vec::new()
        } else {
            self.questions
                .find_report_questions(&report_ids)
                .await
                .map_err(Self::map_question_error)?
        };

        let mut errors = FieldErrors::new();
        for id in &narrative_ids {
            match known.iter().find(|question| question.id == *id) {
                None => errors.insert("questions", format!("Unknown question: {id}")),
                Some(question) if question.archived.is_some() => {
                    errors.insert("questions", format!("Question is archived: {}", question.name));
                }
                Some(_) => {}
            }
        }
        for id in &report_ids {
            match known_reports.iter().find(|question| question.id == *id) {
                None => errors.insert("reportQuestions", format!("Unknown report question: {id}")),
                Some(question) if question.archived.is_some() => {
                    errors.insert(
                        "reportQuestions",
                        format!("Report question is archived: {}", question.name),
                    );
                }
                Some(_) => {}
            }
        }
        errors.into_result()?;

        let cycle_type = request
            .cycle_type
            .unwrap_or_else(|| CycleType::infer_from_title(&request.title));
        let mut builder = GrantCycle::builder(request.title, cycle_type)
            .open_time(request.open_time)
            .close_time(request.close_time)
            .private(request.private);
        if let Some(url) = request.info_url {
            builder = builder.info_url(url);
        }
        if let Some(note) = request.amount_note {
            builder = builder.amount_note(note);
        }
        let cycle = builder.build();

        let joins: Vec<CycleQuestion> = request
            .questions
            .iter()
            .map(|pick| CycleQuestion {
                id: Uuid::new_v4(),
                cycle_id: cycle.id,
                question_id: pick.question_id,
                order: pick.order,
            })
            .collect();
        let report_joins: Vec<CycleReportQuestion> = request
            .report_questions
            .iter()
            .map(|pick| CycleReportQuestion {
                id: Uuid::new_v4(),
                cycle_id: cycle.id,
                report_question_id: pick.report_question_id,
                order: pick.order,
                required: pick.required,
            })
            .collect();

        self.cycles
            .create(&cycle, &joins, &report_joins)
            .await
            .map_err(Self::map_cycle_error)?;
        info!(cycle_id = %cycle.id, cycle_type = %cycle.cycle_type, "cycle created");
        Ok(cycle)
    }

    fn validate_request(request: &CreateCycleRequest) -> Result<(), Error> {
        let mut errors = FieldErrors::new();
        if request.title.trim().is_empty() {
            errors.insert("title", "This field is required.");
        }
        if request.close_time <= request.open_time {
            errors.insert("closeTime", "Close must fall after open.");
        }

        let orders: Vec<u32> = request.questions.iter().map(|pick| pick.order).collect();
        if !orders_form_permutation(&orders) {
            errors.insert("questions", "Question orders must run 1..N without gaps.");
        }
        let report_orders: Vec<u32> = request
            .report_questions
            .iter()
            .map(|pick| pick.order)
            .collect();
        if !orders_form_permutation(&report_orders) {
            errors.insert(
                "reportQuestions",
                "Report question orders must run 1..N without gaps.",
            );
        }

        let mut seen = std::collections::BTreeSet::new();
        if request
            .questions
            .iter()
            .any(|pick| !seen.insert(pick.question_id))
        {
            errors.insert("questions", "A question may appear only once.");
        }
        let mut seen_reports = std::collections::BTreeSet::new();
        if request
            .report_questions
            .iter()
            .any(|pick| !seen_reports.insert(pick.report_question_id))
        {
            errors.insert("reportQuestions", "A report question may appear only once.");
        }
        errors.into_result()
    }
}

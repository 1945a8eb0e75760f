//! Port for the versioned question catalogue.
//!
//! Narrative and report questions are created by staff tooling and attached
//! to cycles through join rows. Cycle creation loads the referenced
//! questions here to validate the assembly before writing anything.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::question::{Question, ReportQuestion};

use super::define_port_error;

define_port_error! {
    /// Errors raised by question repository adapters.
    pub enum QuestionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "question repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "question repository query failed: {message}",
    }
}

/// Port for reading the question catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Load narrative questions by id, in no particular order. Unknown ids
    /// are simply absent from the result.
    async fn find_questions(
        &self,
        question_ids: &[Uuid],
    ) -> Result<Vec<Question>, QuestionRepositoryError>;

    /// Load report questions by id, in no particular order. Unknown ids are
    /// simply absent from the result.
    async fn find_report_questions(
        &self,
        report_question_ids: &[Uuid],
    ) -> Result<Vec<ReportQuestion>, QuestionRepositoryError>;
}

/// Fixture implementation for tests that do not touch the catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureQuestionRepository;

#[async_trait]
impl QuestionRepository for FixtureQuestionRepository {
    async fn find_questions(
        &self,
        _question_ids: &[Uuid],
    ) -> Result<Vec<Question>, QuestionRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_report_questions(
        &self,
        _report_question_ids: &[Uuid],
    ) -> Result<Vec<ReportQuestion>, QuestionRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_lookups_return_empty() {
        let repo = FixtureQuestionRepository;
        let questions = repo
            .find_questions(&[Uuid::new_v4()])
            .await
            .expect("fixture lookup succeeds");
        assert!(questions.is_empty());
        let report_questions = repo
            .find_report_questions(&[Uuid::new_v4()])
            .await
            .expect("fixture lookup succeeds");
        assert!(report_questions.is_empty());
    }

    #[rstest]
    fn query_error_formats_message() {
        let err = QuestionRepositoryError::query("bad join");
        assert!(err.to_string().contains("bad join"));
    }
}

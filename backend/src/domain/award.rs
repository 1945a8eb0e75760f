//! Grant awards and their report schedule.
//!
//! An award is tied to exactly one submitted application. A second-year
//! amount turns it into a two-year grant with a second report due; all
//! schedule math derives from those two facts plus how many reports the
//! grantee has submitted so far.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days the grantee has to return a mailed agreement.
pub const AGREEMENT_GRACE_DAYS: i64 = 30;

/// A one- or two-year grant awarded against an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Award {
    /// Award row id.
    pub id: Uuid,
    /// The application this award funds; one award per application.
    pub application_id: Uuid,
    /// Record creation time.
    pub created: DateTime<Utc>,
    /// First-year amount, whole dollars.
    pub amount: u32,
    /// First check number, once cut.
    pub check_number: Option<u32>,
    /// Date the first check was mailed.
    pub check_mailed: Option<NaiveDate>,
    /// Second-year amount; present iff this is a two-year grant.
    pub second_amount: Option<u32>,
    /// Second check number, once cut.
    pub second_check_number: Option<u32>,
    /// Date the second check was mailed.
    pub second_check_mailed: Option<NaiveDate>,
    /// Date the grant agreement was mailed out.
    pub agreement_mailed: Option<NaiveDate>,
    /// Date the signed agreement came back.
    pub agreement_returned: Option<NaiveDate>,
    /// Date of final approval.
    pub approved: Option<NaiveDate>,
    /// Due date of the first grantee report.
    pub first_report_due: NaiveDate,
    /// Due date of the second grantee report, for two-year grants.
    pub second_report_due: Option<NaiveDate>,
}

impl Award {
    /// Create a builder for constructing an award incrementally.
    pub fn builder(
        application_id: Uuid,
        amount: u32,
        first_report_due: NaiveDate,
    ) -> AwardBuilder {
        AwardBuilder::new(application_id, amount, first_report_due)
    }

    /// Grant duration in years; only 1 and 2 are supported.
    #[must_use]
    pub fn grant_length(&self) -> u32 {
        if self.second_amount.is_some() { 2 } else { 1 }
    }

    /// Total awarded over the whole grant, whole dollars.
    #[must_use]
    pub fn total_amount(&self) -> u32 {
        self.amount + self.second_amount.unwrap_or(0)
    }

    /// When the mailed agreement falls due, if it has been mailed.
    #[must_use]
    pub fn agreement_due(&self) -> Option<NaiveDate> {
        self.agreement_mailed
            .map(|mailed| mailed + Duration::days(AGREEMENT_GRACE_DAYS))
    }

    /// The due date of the next outstanding report, given how many reports
    /// the grantee has already submitted.
    #[must_use]
    pub fn next_report_due(&self, reports_submitted: u32) -> Option<NaiveDate> {
        match reports_submitted {
            0 => Some(self.first_report_due),
            1 => self.second_report_due,
            _ => None,
        }
    }

    /// The report number the grantee should file next, if any remain.
    #[must_use]
    pub fn next_report_number(&self, reports_submitted: u32) -> Option<u32> {
        match reports_submitted {
            0 => Some(1),
            1 if self.grant_length() == 2 => Some(2),
            _ => None,
        }
    }

    /// Whether every owed check has been mailed.
    #[must_use]
    pub fn fully_paid(&self) -> bool {
        if self.check_mailed.is_none() {
            return false;
        }
        if self.second_amount.is_some() && self.second_check_mailed.is_none() {
            return false;
        }
        true
    }
}

/// Builder for constructing [`Award`] incrementally.
#[derive(Debug, Clone)]
pub struct AwardBuilder {
    id: Uuid,
    application_id: Uuid,
    created: Option<DateTime<Utc>>,
    amount: u32,
    check_number: Option<u32>,
    check_mailed: Option<NaiveDate>,
    second_amount: Option<u32>,
    second_check_number: Option<u32>,
    second_check_mailed: Option<NaiveDate>,
    agreement_mailed: Option<NaiveDate>,
    agreement_returned: Option<NaiveDate>,
    approved: Option<NaiveDate>,
    first_report_due: NaiveDate,
    second_report_due: Option<NaiveDate>,
}

impl AwardBuilder {
    /// Create a new builder for a one-year grant.
    pub fn new(application_id: Uuid, amount: u32, first_report_due: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            application_id,
            created: None,
            amount,
            check_number: None,
            check_mailed: None,
            second_amount: None,
            second_check_number: None,
            second_check_mailed: None,
            agreement_mailed: None,
            agreement_returned: None,
            approved: None,
            first_report_due,
            second_report_due: None,
        }
    }

    /// Set the award id.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the creation timestamp.
    pub fn created(mut self, ts: DateTime<Utc>) -> Self {
        self.created = Some(ts);
        self
    }

    /// Add a second year, making this a two-year grant.
    pub fn second_year(mut self, amount: u32, report_due: NaiveDate) -> Self {
        self.second_amount = Some(amount);
        self.second_report_due = Some(report_due);
        self
    }

    /// Record the first check.
    pub fn check(mut self, number: u32, mailed: NaiveDate) -> Self {
        self.check_number = Some(number);
        self.check_mailed = Some(mailed);
        self
    }

    /// Record the second check.
    pub fn second_check(mut self, number: u32, mailed: NaiveDate) -> Self {
        self.second_check_number = Some(number);
        self.second_check_mailed = Some(mailed);
        self
    }

    /// Set the agreement mailing date.
    pub fn agreement_mailed(mut self, date: NaiveDate) -> Self {
        self.agreement_mailed = Some(date);
        self
    }

    /// Set the agreement return date.
    pub fn agreement_returned(mut self, date: NaiveDate) -> Self {
        self.agreement_returned = Some(date);
        self
    }

    /// Set the approval date.
    pub fn approved(mut self, date: NaiveDate) -> Self {
        self.approved = Some(date);
        self
    }

    /// Build the final [`Award`].
    pub fn build(self) -> Award {
        Award {
            id: self.id,
            application_id: self.application_id,
            created: self.created.unwrap_or_else(Utc::now),
            amount: self.amount,
            check_number: self.check_number,
            check_mailed: self.check_mailed,
            second_amount: self.second_amount,
            second_check_number: self.second_check_number,
            second_check_mailed: self.second_check_mailed,
            agreement_mailed: self.agreement_mailed,
            agreement_returned: self.agreement_returned,
            approved: self.approved,
            first_report_due: self.first_report_due,
            second_report_due: self.second_report_due,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn one_year_award() -> Award {
        Award::builder(Uuid::new_v4(), 15_000, date(2024, 3, 1)).build()
    }

    fn two_year_award() -> Award {
        Award::builder(Uuid::new_v4(), 15_000, date(2024, 3, 1))
            .second_year(10_000, date(2025, 3, 1))
            .build()
    }

    #[rstest]
    fn one_year_schedule_runs_out_after_one_report() {
        let award = one_year_award();
        assert_eq!(award.grant_length(), 1);
        assert_eq!(award.total_amount(), 15_000);
        assert_eq!(award.next_report_due(0), Some(date(2024, 3, 1)));
        assert_eq!(award.next_report_due(1), None);
        assert_eq!(award.next_report_number(0), Some(1));
        assert_eq!(award.next_report_number(1), None);
    }

    #[rstest]
    fn two_year_schedule_has_two_reports() {
        let award = two_year_award();
        assert_eq!(award.grant_length(), 2);
        assert_eq!(award.total_amount(), 25_000);
        assert_eq!(award.next_report_due(0), Some(date(2024, 3, 1)));
        assert_eq!(award.next_report_due(1), Some(date(2025, 3, 1)));
        assert_eq!(award.next_report_due(2), None);
        assert_eq!(award.next_report_number(1), Some(2));
        assert_eq!(award.next_report_number(2), None);
    }

    #[rstest]
    fn agreement_is_due_thirty_days_after_mailing() {
        let mut award = one_year_award();
        assert_eq!(award.agreement_due(), None);

        award.agreement_mailed = Some(date(2024, 1, 15));
        assert_eq!(award.agreement_due(), Some(date(2024, 2, 14)));
    }

    #[rstest]
    fn payment_tracks_both_checks() {
        let mut award = two_year_award();
        assert!(!award.fully_paid());

        award.check_number = Some(1101);
        award.check_mailed = Some(date(2024, 1, 20));
        assert!(!award.fully_paid());

        award.second_check_number = Some(1188);
        award.second_check_mailed = Some(date(2025, 1, 20));
        assert!(award.fully_paid());
    }

    #[rstest]
    fn one_year_award_is_paid_after_the_first_check() {
        let award = Award::builder(Uuid::new_v4(), 8_000, date(2024, 6, 1))
            .check(1042, date(2024, 2, 2))
            .build();
        assert!(award.fully_paid());
    }
}

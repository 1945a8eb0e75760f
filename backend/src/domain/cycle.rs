//! Grant cycles: application windows with a type and an ordered question set.
//!
//! The cycle type is an explicit column chosen at creation. Historically it
//! was inferred from the title on every read; [`CycleType::infer_from_title`]
//! keeps that inference available as a creation-time default for untyped
//! input, after which only the stored type is consulted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::draft::DraftFileField;
use super::question::{Question, ReportQuestion};

/// The category of a grant cycle, controlling form shape and recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CycleType {
    /// Full application with all budget uploads and project-support fields.
    #[default]
    Standard,
    /// Rapid-response cycle; short form, demographics upload only.
    Rapid,
    /// Seed cycle; short form, no required uploads.
    Seed,
}

impl CycleType {
    /// Returns the database string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::cycle::CycleType;
    /// assert_eq!(CycleType::Rapid.as_str(), "rapid");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Rapid => "rapid",
            Self::Seed => "seed",
        }
    }

    /// Classifies a title the way legacy data was classified.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::cycle::CycleType;
    /// assert_eq!(
    ///     CycleType::infer_from_title("Rapid Response 1.2.2024 - 1.16.2024"),
    ///     CycleType::Rapid,
    /// );
    /// assert_eq!(CycleType::infer_from_title("Economic Justice Fund"), CycleType::Standard);
    /// ```
    #[must_use]
    pub fn infer_from_title(title: &str) -> Self {
        if title.contains("Rapid Response") {
            Self::Rapid
        } else if title.contains("Seed") {
            Self::Seed
        } else {
            Self::Standard
        }
    }

    /// File slots a draft must fill before submission.
    #[must_use]
    pub fn required_file_fields(&self) -> &'static [DraftFileField] {
        match self {
            Self::Standard => &[
                DraftFileField::Demographics,
                DraftFileField::FundingSources,
                DraftFileField::Budget1,
                DraftFileField::Budget2,
                DraftFileField::Budget3,
            ],
            Self::Rapid => &[DraftFileField::Demographics],
            Self::Seed => &[],
        }
    }

    /// Whether the application form offers the project-support fields.
    #[must_use]
    pub fn shows_project_support(&self) -> bool {
        matches!(self, Self::Standard)
    }

    /// Title prefix used when the auto-creation job clones a closed cycle.
    ///
    /// Standard cycles do not recur automatically.
    #[must_use]
    pub fn recurring_title_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Rapid => Some("Rapid Response"),
            Self::Seed => Some("Seed Grant"),
        }
    }
}

impl std::fmt::Display for CycleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown cycle type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCycleTypeError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseCycleTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown cycle type: {}", self.input)
    }
}

impl std::error::Error for ParseCycleTypeError {}

impl std::str::FromStr for CycleType {
    type Err = ParseCycleTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "rapid" => Ok(Self::Rapid),
            "seed" => Ok(Self::Seed),
            _ => Err(ParseCycleTypeError {
                input: s.to_owned(),
            }),
        }
    }
}

/// An application window for one grant programme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct GrantCycle {
    /// Cycle row id.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Stored category; never re-inferred after creation.
    pub cycle_type: CycleType,
    /// Moment applications open.
    pub open_time: DateTime<Utc>,
    /// Moment applications close.
    pub close_time: DateTime<Utc>,
    /// Optional information page shown before the form.
    pub info_url: Option<String>,
    /// Hidden from the open listing when set; direct access still works.
    pub private: bool,
    /// Free-text note about award amounts, shown on the form.
    pub amount_note: Option<String>,
}

impl GrantCycle {
    /// Create a builder with a fortnight window opening immediately.
    pub fn builder(title: impl Into<String>, cycle_type: CycleType) -> GrantCycleBuilder {
        GrantCycleBuilder::new(title, cycle_type)
    }

    /// Whether applications are accepted at `now`.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.open_time < now && now < self.close_time
    }

    /// Whether the window has already closed at `now`.
    #[must_use]
    pub fn is_closed(&self, now: DateTime<Utc>) -> bool {
        self.close_time <= now
    }
}

/// Builder for constructing [`GrantCycle`] incrementally.
#[derive(Debug, Clone)]
pub struct GrantCycleBuilder {
    id: Uuid,
    title: String,
    cycle_type: CycleType,
    open_time: Option<DateTime<Utc>>,
    close_time: Option<DateTime<Utc>>,
    info_url: Option<String>,
    private: bool,
    amount_note: Option<String>,
}

impl GrantCycleBuilder {
    /// Create a new builder for the given title and type.
    pub fn new(title: impl Into<String>, cycle_type: CycleType) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            cycle_type,
            open_time: None,
            close_time: None,
            info_url: None,
            private: false,
            amount_note: None,
        }
    }

    /// Set the cycle id.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the opening moment.
    pub fn open_time(mut self, ts: DateTime<Utc>) -> Self {
        self.open_time = Some(ts);
        self
    }

    /// Set the closing moment.
    pub fn close_time(mut self, ts: DateTime<Utc>) -> Self {
        self.close_time = Some(ts);
        self
    }

    /// Set the information page URL.
    pub fn info_url(mut self, url: impl Into<String>) -> Self {
        self.info_url = Some(url.into());
        self
    }

    /// Hide the cycle from the open listing.
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Set the award amount note.
    pub fn amount_note(mut self, note: impl Into<String>) -> Self {
        self.amount_note = Some(note.into());
        self
    }

    /// Build the final [`GrantCycle`].
    pub fn build(self) -> GrantCycle {
        let open_time = self.open_time.unwrap_or_else(Utc::now);
        GrantCycle {
            id: self.id,
            title: self.title,
            cycle_type: self.cycle_type,
            open_time,
            close_time: self.close_time.unwrap_or(open_time + Duration::days(14)),
            info_url: self.info_url,
            private: self.private,
            amount_note: self.amount_note,
        }
    }
}

/// Join row attaching a narrative question to a cycle at a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct CycleQuestion {
    /// Join row id; narrative answers reference it.
    pub id: Uuid,
    /// Cycle the question belongs to.
    pub cycle_id: Uuid,
    /// Catalogue question; unique together with the cycle.
    pub question_id: Uuid,
    /// 1-based display position, unique within the cycle.
    pub order: u32,
}

/// Join row attaching a report question to a cycle at a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct CycleReportQuestion {
    /// Join row id; report answers reference it.
    pub id: Uuid,
    /// Cycle the question belongs to.
    pub cycle_id: Uuid,
    /// Catalogue report question.
    pub report_question_id: Uuid,
    /// 1-based display position, unique within the cycle.
    pub order: u32,
    /// Whether an answer is mandatory.
    pub required: bool,
}

/// A narrative question resolved into its cycle position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct AssembledQuestion {
    /// Join row id; narrative answers reference it.
    pub cycle_question_id: Uuid,
    /// 1-based display position.
    pub order: u32,
    /// The catalogue question at that position.
    pub question: Question,
}

/// A report question resolved into its cycle position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct AssembledReportQuestion {
    /// Join row id; report answers reference it.
    pub cycle_report_question_id: Uuid,
    /// 1-based display position.
    pub order: u32,
    /// Whether an answer is mandatory.
    pub required: bool,
    /// The catalogue report question at that position.
    pub question: ReportQuestion,
}

/// A cycle together with its ordered question sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct CycleDetail {
    /// The cycle row.
    pub cycle: GrantCycle,
    /// Narrative questions in display order.
    pub questions: Vec<AssembledQuestion>,
    /// Report questions in display order.
    pub report_questions: Vec<AssembledReportQuestion>,
}

/// Checks that `orders` is a permutation of `1..=N`.
///
/// # Examples
///
/// ```
/// # use backend::domain::cycle::orders_form_permutation;
/// assert!(orders_form_permutation(&[3, 1, 2]));
/// assert!(!orders_form_permutation(&[1, 2, 2]));
/// assert!(!orders_form_permutation(&[1, 3]));
/// ```
#[must_use]
pub fn orders_form_permutation(orders: &[u32]) -> bool {
    let mut sorted: Vec<u32> = orders.to_vec();
    sorted.sort_unstable();
    sorted
        .into_iter()
        .zip(1..)
        .all(|(order, expected)| order == expected)
}

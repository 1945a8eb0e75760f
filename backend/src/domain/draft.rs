//! Draft applications and the autosave collision rules.
//!
//! A draft is the mutable working copy of an application, keyed by
//! `(organization, cycle)`. Everything the form posts lands in the untyped
//! `contents` map; uploaded files are tracked separately as opaque blob
//! references. Autosave is last-writer-wins, softened by a short staleness
//! window in which a write from a different identity is rejected until the
//! caller confirms the overwrite.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cycle::GrantCycle;

/// Seconds after a save during which a competing editor gets a conflict.
pub const STALENESS_WINDOW_SECONDS: i64 = 35;

/// The staleness window as a duration.
#[must_use]
pub fn staleness_window() -> Duration {
    Duration::seconds(STALENESS_WINDOW_SECONDS)
}

/// Named file-attachment slots on a draft application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DraftFileField {
    /// Demographic breakdown of staff and board.
    Demographics,
    /// Funding sources spreadsheet.
    FundingSources,
    /// Budget for the most recent complete year.
    Budget1,
    /// Budget for the current year.
    Budget2,
    /// Projected budget for the coming year.
    Budget3,
    /// Project-specific budget, required for project support requests.
    ProjectBudgetFile,
    /// Fiscal sponsorship letter.
    FiscalLetter,
}

impl DraftFileField {
    /// Every slot, in form display order.
    pub const ALL: [Self; 7] = [
        Self::Demographics,
        Self::FundingSources,
        Self::Budget1,
        Self::Budget2,
        Self::Budget3,
        Self::ProjectBudgetFile,
        Self::FiscalLetter,
    ];

    /// Returns the form field key.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::draft::DraftFileField;
    /// assert_eq!(DraftFileField::FundingSources.as_str(), "funding_sources");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Demographics => "demographics",
            Self::FundingSources => "funding_sources",
            Self::Budget1 => "budget1",
            Self::Budget2 => "budget2",
            Self::Budget3 => "budget3",
            Self::ProjectBudgetFile => "project_budget_file",
            Self::FiscalLetter => "fiscal_letter",
        }
    }
}

impl std::fmt::Display for DraftFileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown draft file field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDraftFileFieldError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseDraftFileFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown draft file field: {}", self.input)
    }
}

impl std::error::Error for ParseDraftFileFieldError {}

impl std::str::FromStr for DraftFileField {
    type Err = ParseDraftFileFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ParseDraftFileFieldError {
                input: s.to_owned(),
            })
    }
}

/// A mutable, partially filled application for one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ApplicationDraft {
    /// Draft row id.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Cycle the draft targets; unique together with the organization.
    pub cycle_id: Uuid,
    /// Creation time, fixed at first form visit.
    pub created: DateTime<Utc>,
    /// Time of the most recent autosave.
    pub modified: DateTime<Utc>,
    /// Identity that performed the most recent autosave.
    pub modified_by: Option<String>,
    /// Flat form contents keyed by field name.
    pub contents: BTreeMap<String, String>,
    /// Opaque blob references keyed by attachment slot.
    pub files: BTreeMap<DraftFileField, String>,
    /// Per-draft grace period allowing edits past the cycle close.
    pub extended_deadline: Option<DateTime<Utc>>,
}

impl ApplicationDraft {
    /// Create a builder for constructing a draft incrementally.
    pub fn builder(organization_id: Uuid, cycle_id: Uuid) -> ApplicationDraftBuilder {
        ApplicationDraftBuilder::new(organization_id, cycle_id)
    }

    /// Whether an autosave landed within the staleness window before `now`.
    #[must_use]
    pub fn recently_edited(&self, now: DateTime<Utc>) -> bool {
        now < self.modified + staleness_window()
    }

    /// Whether a save by `editor` collides with a fresher save from someone
    /// else.
    ///
    /// A collision needs a recent save, a recorded last writer, and a
    /// different identity; a tab re-saving its own work never conflicts.
    #[must_use]
    pub fn conflicts_with(&self, editor: &str, now: DateTime<Utc>) -> bool {
        self.recently_edited(now)
            && self
                .modified_by
                .as_deref()
                .is_some_and(|last| last != editor)
    }

    /// Whether the draft accepts edits and submission at `now`.
    ///
    /// True while the cycle is open, or while an extended deadline is still
    /// in the future.
    #[must_use]
    pub fn editable(&self, cycle: &GrantCycle, now: DateTime<Utc>) -> bool {
        cycle.is_open(now) || self.extended_deadline.is_some_and(|deadline| deadline > now)
    }

    /// Returns the stored value for a field, or empty when unset.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.contents.get(name).map_or("", String::as_str)
    }
}

/// Builder for constructing [`ApplicationDraft`] incrementally.
#[derive(Debug, Clone)]
pub struct ApplicationDraftBuilder {
    id: Uuid,
    organization_id: Uuid,
    cycle_id: Uuid,
    created: Option<DateTime<Utc>>,
    modified: Option<DateTime<Utc>>,
    modified_by: Option<String>,
    contents: BTreeMap<String, String>,
    files: BTreeMap<DraftFileField, String>,
    extended_deadline: Option<DateTime<Utc>>,
}

impl ApplicationDraftBuilder {
    /// Create a new builder for the given owner and cycle.
    pub fn new(organization_id: Uuid, cycle_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            organization_id,
            cycle_id,
            created: None,
            modified: None,
            modified_by: None,
            contents: BTreeMap::new(),
            files: BTreeMap::new(),
            extended_deadline: None,
        }
    }

    /// Set the draft id.
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Set the creation timestamp.
    pub fn created(mut self, ts: DateTime<Utc>) -> Self {
        self.created = Some(ts);
        self
    }

    /// Set the last-modified timestamp.
    pub fn modified(mut self, ts: DateTime<Utc>) -> Self {
        self.modified = Some(ts);
        self
    }

    /// Set the last-writer identity.
    pub fn modified_by(mut self, editor: impl Into<String>) -> Self {
        self.modified_by = Some(editor.into());
        self
    }

    /// Replace the whole contents map.
    pub fn contents(mut self, contents: BTreeMap<String, String>) -> Self {
        self.contents = contents;
        self
    }

    /// Set one contents field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.contents.insert(name.into(), value.into());
        self
    }

    /// Attach a blob reference to a file slot.
    pub fn file(mut self, field: DraftFileField, reference: impl Into<String>) -> Self {
        self.files.insert(field, reference.into());
        self
    }

    /// Replace the whole file-reference map.
    pub fn files(mut self, files: BTreeMap<DraftFileField, String>) -> Self {
        self.files = files;
        self
    }

    /// Set the extended deadline.
    pub fn extended_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.extended_deadline = Some(deadline);
        self
    }

    /// Build the final [`ApplicationDraft`].
    pub fn build(self) -> ApplicationDraft {
        let created = self.created.unwrap_or_else(Utc::now);
        ApplicationDraft {
            id: self.id,
            organization_id: self.organization_id,
            cycle_id: self.cycle_id,
            created,
            modified: self.modified.unwrap_or(created),
            modified_by: self.modified_by,
            contents: self.contents,
            files: self.files,
            extended_deadline: self.extended_deadline,
        }
    }
}

//! Versioned question catalogue for application and report forms.
//!
//! Questions are identified by `(name, version)`: the name is the stable
//! field key a form posts under (e.g. `mission`, `racial_justice_references`)
//! and the version distinguishes rewordings over time. Archiving a question
//! removes it from new cycle assembly without touching historical cycles,
//! because submitted answers reference the question row forever.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Default word limit applied to report questions when none is configured.
pub const DEFAULT_REPORT_WORD_LIMIT: u32 = 750;

/// Returns `true` for field names whose answers are composite structures
/// rather than prose.
///
/// The timeline and the `*_references` fields store JSON once submitted and
/// flat indexed keys while drafted; word limits never apply to them.
///
/// # Examples
///
/// ```
/// # use backend::domain::question::is_composite_field;
/// assert!(is_composite_field("timeline"));
/// assert!(is_composite_field("racial_justice_references"));
/// assert!(!is_composite_field("mission"));
/// ```
#[must_use]
pub fn is_composite_field(name: &str) -> bool {
    name == "timeline" || name.ends_with("_references")
}

/// A narrative question available for cycle assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Question {
    /// Catalogue row id.
    pub id: Uuid,
    /// Stable field key, e.g. `mission` or `timeline`.
    pub name: String,
    /// Variant label distinguishing rewordings, e.g. `standard` or `rapid`.
    pub version: String,
    /// Display text, raw HTML without a question number.
    pub text: String,
    /// Word limit for prose answers; `None` disables the check.
    pub word_limit: Option<u32>,
    /// Date the question was withdrawn from new cycle assembly.
    pub archived: Option<NaiveDate>,
    /// Catalogue insertion time.
    pub created: DateTime<Utc>,
}

impl Question {
    /// Whether the word limit applies to answers for this question.
    ///
    /// Composite questions carry their limit for the record but never
    /// enforce it.
    #[must_use]
    pub fn uses_word_limit(&self) -> bool {
        !is_composite_field(&self.name)
    }

    /// Whether the question is withdrawn from new cycle assembly.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.archived.is_some()
    }

    /// Human-readable name derived from the field key.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::question::Question;
    /// # use chrono::Utc;
    /// # use uuid::Uuid;
    /// let question = Question {
    ///     id: Uuid::new_v4(),
    ///     name: "racial_justice".into(),
    ///     version: "standard".into(),
    ///     text: String::new(),
    ///     word_limit: Some(150),
    ///     archived: None,
    ///     created: Utc::now(),
    /// };
    /// assert_eq!(question.display_name(), "Racial Justice");
    /// ```
    #[must_use]
    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }
}

/// Input widget used to answer a report question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportInputType {
    /// Free text, word-limited.
    #[default]
    Text,
    /// A numeric value.
    Number,
    /// A document upload.
    File,
    /// An image upload restricted to photo extensions.
    Photo,
}

impl ReportInputType {
    /// Returns the database string representation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::question::ReportInputType;
    /// assert_eq!(ReportInputType::Photo.as_str(), "photo");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::File => "file",
            Self::Photo => "photo",
        }
    }

    /// Whether answers arrive through the file-upload flow.
    #[must_use]
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::File | Self::Photo)
    }
}

impl std::fmt::Display for ReportInputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown report input type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseReportInputTypeError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseReportInputTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown report input type: {}", self.input)
    }
}

impl std::error::Error for ParseReportInputTypeError {}

impl std::str::FromStr for ReportInputType {
    type Err = ParseReportInputTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "file" => Ok(Self::File),
            "photo" => Ok(Self::Photo),
            _ => Err(ParseReportInputTypeError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A grantee-report question available for cycle assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ReportQuestion {
    /// Catalogue row id.
    pub id: Uuid,
    /// Stable field key.
    pub name: String,
    /// Variant label distinguishing rewordings.
    pub version: String,
    /// Display text, raw HTML without a question number.
    pub text: String,
    /// Widget used to collect the answer.
    pub input_type: ReportInputType,
    /// Word limit for text answers.
    pub word_limit: u32,
    /// Date the question was withdrawn from new cycle assembly.
    pub archived: Option<NaiveDate>,
    /// Catalogue insertion time.
    pub created: DateTime<Utc>,
}

impl ReportQuestion {
    /// Whether the question is withdrawn from new cycle assembly.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.archived.is_some()
    }

    /// Human-readable name derived from the field key.
    #[must_use]
    pub fn display_name(&self) -> String {
        title_case(&self.name)
    }
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn question(name: &str, word_limit: Option<u32>) -> Question {
        Question {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            version: "standard".to_owned(),
            text: format!("<p>{name}</p>"),
            word_limit,
            archived: None,
            created: Utc::now(),
        }
    }

    #[rstest]
    #[case::timeline("timeline", true)]
    #[case::references("collaboration_references", true)]
    #[case::more_references("racial_justice_references", true)]
    #[case::prose("mission", false)]
    #[case::prose_with_suffixish_name("timeline_notes", false)]
    fn composite_fields_are_recognised(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_composite_field(name), expected);
    }

    #[rstest]
    #[case::prose("grant_request", true)]
    #[case::timeline("timeline", false)]
    #[case::references("collaboration_references", false)]
    fn word_limit_applies_to_prose_only(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(question(name, Some(100)).uses_word_limit(), expected);
    }

    #[rstest]
    fn archival_is_a_date_flag() {
        let mut q = question("mission", None);
        assert!(!q.is_archived());
        q.archived = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert!(q.is_archived());
    }

    #[rstest]
    #[case::single("mission", "Mission")]
    #[case::underscored("racial_justice", "Racial Justice")]
    #[case::already_spaced("timeline", "Timeline")]
    fn display_name_title_cases(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(question(name, None).display_name(), expected);
    }

    #[rstest]
    #[case::text("text", ReportInputType::Text)]
    #[case::number("number", ReportInputType::Number)]
    #[case::file("file", ReportInputType::File)]
    #[case::photo("photo", ReportInputType::Photo)]
    fn report_input_type_parses_valid_strings(
        #[case] input: &str,
        #[case] expected: ReportInputType,
    ) {
        let parsed: ReportInputType = input.parse().expect("valid input type");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case::unknown("textarea")]
    #[case::empty("")]
    #[case::capitalised("Text")]
    fn report_input_type_rejects_invalid_strings(#[case] input: &str) {
        let result: Result<ReportInputType, _> = input.parse();
        assert!(result.is_err());
    }

    #[rstest]
    fn report_input_type_as_str_matches_parse() {
        for input_type in [
            ReportInputType::Text,
            ReportInputType::Number,
            ReportInputType::File,
            ReportInputType::Photo,
        ] {
            let parsed: ReportInputType = input_type.as_str().parse().expect("round-trip");
            assert_eq!(parsed, input_type);
        }
    }

    #[rstest]
    #[case::text(ReportInputType::Text, false)]
    #[case::number(ReportInputType::Number, false)]
    #[case::file(ReportInputType::File, true)]
    #[case::photo(ReportInputType::Photo, true)]
    fn upload_types_are_flagged(#[case] input_type: ReportInputType, #[case] expected: bool) {
        assert_eq!(input_type.is_upload(), expected);
    }
}

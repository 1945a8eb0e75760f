//! The project-timeline composite field.
//!
//! A timeline covers up to five quarters, each with three columns: a date
//! range, planned activities, and goals or objectives. The draft-time flat
//! form uses fifteen keys `timeline_0`..`timeline_14` in quarter-major order
//! (`_0`..`_2` are quarter one); the submitted-time answer is a JSON array of
//! fifteen strings in the same order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DecodeError;
use crate::flat;

/// Number of quarters a timeline can cover.
pub const QUARTERS: usize = 5;
/// Columns per quarter: date range, activities, goals.
pub const COLUMNS: usize = 3;
/// Total flat cells (`QUARTERS * COLUMNS`).
pub const CELLS: usize = QUARTERS * COLUMNS;

/// One quarter of a project timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineQuarter {
    /// Date range the quarter covers.
    pub date: String,
    /// Activities planned for the quarter.
    pub activities: String,
    /// Goals or objectives for the quarter.
    pub goals: String,
}

impl TimelineQuarter {
    /// True when every column is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.date.is_empty() && self.activities.is_empty() && self.goals.is_empty()
    }

    /// True when every column is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.date.is_empty() && !self.activities.is_empty() && !self.goals.is_empty()
    }
}

/// Canonical structured timeline value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    quarters: [TimelineQuarter; QUARTERS],
}

impl Timeline {
    /// Build a timeline from explicit quarters.
    #[must_use]
    pub const fn new(quarters: [TimelineQuarter; QUARTERS]) -> Self {
        Self { quarters }
    }

    /// Read the flat-key cells of `field` out of a draft contents map.
    ///
    /// Missing cells decode as empty strings.
    #[must_use]
    pub fn from_flat(contents: &BTreeMap<String, String>, field: &str) -> Self {
        let mut quarters: [TimelineQuarter; QUARTERS] = Default::default();
        for (slot, quarter) in quarters.iter_mut().enumerate() {
            let base = slot * COLUMNS;
            quarter.date = flat::value(contents, field, base);
            quarter.activities = flat::value(contents, field, base + 1);
            quarter.goals = flat::value(contents, field, base + 2);
        }
        Self { quarters }
    }

    /// Expand into the draft-time flat-key form.
    ///
    /// Always emits all [`CELLS`] keys so a rendered form shows every cell.
    #[must_use]
    pub fn to_flat(&self, field: &str) -> BTreeMap<String, String> {
        let mut contents = BTreeMap::new();
        for (slot, quarter) in self.quarters.iter().enumerate() {
            let base = slot * COLUMNS;
            contents.insert(flat::key(field, base), quarter.date.clone());
            contents.insert(flat::key(field, base + 1), quarter.activities.clone());
            contents.insert(flat::key(field, base + 2), quarter.goals.clone());
        }
        contents
    }

    /// Decode the submitted-time JSON answer.
    ///
    /// Empty text decodes as a blank timeline; arrays shorter than [`CELLS`]
    /// pad with empty cells and longer arrays are truncated.
    ///
    /// # Errors
    /// Returns [`DecodeError`] when the text is neither empty nor a JSON
    /// array of strings.
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cells: Vec<String> = serde_json::from_str(text)?;
        Ok(Self::from_cells(&cells))
    }

    /// Encode as the submitted-time JSON answer: an array of [`CELLS`]
    /// strings in quarter-major order.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::Value::from(self.cells()).to_string()
    }

    /// The quarters in order.
    #[must_use]
    pub const fn quarters(&self) -> &[TimelineQuarter; QUARTERS] {
        &self.quarters
    }

    /// True when no quarter has any content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.quarters.iter().all(TimelineQuarter::is_blank)
    }

    fn from_cells(cells: &[String]) -> Self {
        let mut quarters: [TimelineQuarter; QUARTERS] = Default::default();
        for (slot, quarter) in quarters.iter_mut().enumerate() {
            let base = slot * COLUMNS;
            quarter.date = cell(cells, base);
            quarter.activities = cell(cells, base + 1);
            quarter.goals = cell(cells, base + 2);
        }
        Self { quarters }
    }

    fn cells(&self) -> Vec<String> {
        self.quarters
            .iter()
            .flat_map(|quarter| {
                [
                    quarter.date.clone(),
                    quarter.activities.clone(),
                    quarter.goals.clone(),
                ]
            })
            .collect()
    }
}

fn cell(cells: &[String], index: usize) -> String {
    cells.get(index).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn quarter_one() -> Timeline {
        let mut quarters: [TimelineQuarter; QUARTERS] = Default::default();
        if let Some(first) = quarters.first_mut() {
            *first = TimelineQuarter {
                date: "Jan".to_owned(),
                activities: "Outreach".to_owned(),
                goals: "Grow list".to_owned(),
            };
        }
        Timeline::new(quarters)
    }

    #[rstest]
    fn flat_round_trip_preserves_cells(quarter_one: Timeline) {
        let flat = quarter_one.to_flat("timeline");
        assert_eq!(flat.len(), CELLS);
        assert_eq!(flat.get("timeline_0").map(String::as_str), Some("Jan"));
        assert_eq!(flat.get("timeline_14").map(String::as_str), Some(""));

        assert_eq!(Timeline::from_flat(&flat, "timeline"), quarter_one);
    }

    #[rstest]
    fn json_matches_legacy_fifteen_cell_array(quarter_one: Timeline) {
        let json = quarter_one.to_json();
        let cells: Vec<String> = serde_json::from_str(&json).expect("decode");
        assert_eq!(cells.len(), CELLS);
        assert_eq!(
            cells.first().map(String::as_str),
            Some("Jan"),
            "first cell is quarter one's date"
        );

        assert_eq!(Timeline::from_json(&json).expect("decode"), quarter_one);
    }

    #[rstest]
    #[case("", Timeline::default())]
    #[case("[]", Timeline::default())]
    #[case(
        r#"["Jan","Outreach","Grow list"]"#,
        quarter_one()
    )]
    fn short_or_empty_json_pads_with_blanks(#[case] text: &str, #[case] expected: Timeline) {
        assert_eq!(Timeline::from_json(text).expect("decode"), expected);
    }

    #[rstest]
    fn overflow_cells_are_ignored() {
        let cells: Vec<String> = (0..20).map(|index| index.to_string()).collect();
        let json = serde_json::Value::from(cells).to_string();
        let timeline = Timeline::from_json(&json).expect("decode");
        let last = timeline
            .quarters()
            .last()
            .map(|quarter| quarter.goals.clone());
        assert_eq!(last.as_deref(), Some("14"));
    }

    #[rstest]
    fn malformed_json_is_rejected() {
        assert!(Timeline::from_json("{\"oops\":").is_err());
        assert!(Timeline::from_json("{\"not\":\"an array\"}").is_err());
    }

    #[rstest]
    fn missing_flat_keys_decode_as_blank() {
        let contents = BTreeMap::new();
        let timeline = Timeline::from_flat(&contents, "timeline");
        assert!(timeline.is_blank());
    }

    #[rstest]
    #[case(TimelineQuarter::default(), true, false)]
    #[case(
        TimelineQuarter {
            date: "Q1".to_owned(),
            activities: String::new(),
            goals: String::new(),
        },
        false,
        false
    )]
    #[case(
        TimelineQuarter {
            date: "Q1".to_owned(),
            activities: "March".to_owned(),
            goals: "Sign up".to_owned(),
        },
        false,
        true
    )]
    fn quarter_blank_and_complete(
        #[case] quarter: TimelineQuarter,
        #[case] blank: bool,
        #[case] complete: bool,
    ) {
        assert_eq!(quarter.is_blank(), blank);
        assert_eq!(quarter.is_complete(), complete);
    }
}

//! Behaviour tests for the composite field codecs.
//!
//! These scenarios exercise the three-representation contract: canonical
//! values, draft-time flat keys, and submitted-time JSON answers must stay
//! interchangeable without losing cell content.

use std::cell::RefCell;
use std::collections::BTreeMap;

use formenc::{flat, references, timeline, Reference, ReferenceList, Timeline, TimelineQuarter};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

const TIMELINE_FIELD: &str = "timeline";
const REFERENCES_FIELD: &str = "racial_justice_references";

struct CompositeWorld {
    timeline: RefCell<Timeline>,
    references: RefCell<ReferenceList>,
    contents: RefCell<BTreeMap<String, String>>,
    answer: RefCell<String>,
}

impl CompositeWorld {
    fn new() -> Self {
        Self {
            timeline: RefCell::new(Timeline::default()),
            references: RefCell::new(ReferenceList::default()),
            contents: RefCell::new(BTreeMap::new()),
            answer: RefCell::new(String::new()),
        }
    }

    fn cell(&self, field: &str, index: usize) -> String {
        flat::value(&self.contents.borrow(), field, index)
    }
}

fn quarter_one_timeline() -> Timeline {
    let mut quarters: [TimelineQuarter; timeline::QUARTERS] = Default::default();
    if let Some(first) = quarters.first_mut() {
        *first = TimelineQuarter {
            date: "Jan".to_owned(),
            activities: "Outreach".to_owned(),
            goals: "Grow list".to_owned(),
        };
    }
    Timeline::new(quarters)
}

fn single_contact_references() -> ReferenceList {
    ReferenceList::new([
        Reference {
            name: "A".to_owned(),
            org: "Org1".to_owned(),
            phone: "555".to_owned(),
            email: String::new(),
        },
        Reference::default(),
    ])
}

#[fixture]
fn world() -> CompositeWorld {
    CompositeWorld::new()
}

#[given("a timeline whose first quarter is filled in")]
fn a_timeline_with_quarter_one(world: &CompositeWorld) {
    *world.timeline.borrow_mut() = quarter_one_timeline();
}

#[given("draft contents holding only the first timeline cell")]
fn draft_contents_with_one_timeline_cell(world: &CompositeWorld) {
    let mut contents = world.contents.borrow_mut();
    contents.insert(flat::key(TIMELINE_FIELD, 0), "Jan".to_owned());
}

#[given("the stored answer for a single-contact reference list")]
fn the_single_contact_reference_answer(world: &CompositeWorld) {
    *world.answer.borrow_mut() = single_contact_references().to_json();
}

#[given("draft contents for one reference reachable by phone")]
fn draft_contents_for_one_phone_reference(world: &CompositeWorld) {
    let mut contents = world.contents.borrow_mut();
    contents.insert(flat::key(REFERENCES_FIELD, 0), "A".to_owned());
    contents.insert(flat::key(REFERENCES_FIELD, 1), "Org1".to_owned());
    contents.insert(flat::key(REFERENCES_FIELD, 2), "555".to_owned());
    for index in 3..references::CELLS {
        contents.insert(flat::key(REFERENCES_FIELD, index), String::new());
    }
}

#[when("the timeline is stored as a submitted answer")]
fn the_timeline_is_stored(world: &CompositeWorld) {
    *world.answer.borrow_mut() = world.timeline.borrow().to_json();
}

#[when("the draft timeline cells are decoded")]
fn the_draft_timeline_is_decoded(world: &CompositeWorld) {
    let decoded = Timeline::from_flat(&world.contents.borrow(), TIMELINE_FIELD);
    *world.timeline.borrow_mut() = decoded;
}

#[when("the reference answer is expanded into draft contents")]
fn the_reference_answer_is_expanded(world: &CompositeWorld) {
    let decoded = ReferenceList::from_json(&world.answer.borrow())
        .expect("stored reference answer should decode");
    *world.contents.borrow_mut() = decoded.to_flat(REFERENCES_FIELD);
}

#[when("the draft references are decoded and re-encoded")]
fn the_draft_references_round_trip(world: &CompositeWorld) {
    let decoded = ReferenceList::from_flat(&world.contents.borrow(), REFERENCES_FIELD);
    *world.references.borrow_mut() = decoded;
}

#[then("the stored answer is a JSON array of fifteen cells")]
fn the_stored_answer_has_fifteen_cells(world: &CompositeWorld) {
    let cells: Vec<String> =
        serde_json::from_str(&world.answer.borrow()).expect("answer should be a JSON array");
    assert_eq!(cells.len(), timeline::CELLS);
}

#[then("the leading cells carry the first quarter in column order")]
fn the_leading_cells_match_quarter_one(world: &CompositeWorld) {
    let cells: Vec<String> =
        serde_json::from_str(&world.answer.borrow()).expect("answer should be a JSON array");
    let leading: Vec<&str> = cells.iter().take(3).map(String::as_str).collect();
    assert_eq!(leading, ["Jan", "Outreach", "Grow list"]);
}

#[then("decoding the stored answer restores the timeline")]
fn decoding_the_answer_restores_the_timeline(world: &CompositeWorld) {
    let decoded =
        Timeline::from_json(&world.answer.borrow()).expect("stored answer should decode");
    assert_eq!(decoded, *world.timeline.borrow());
}

#[then("the decoded timeline has a date in quarter one only")]
fn the_decoded_timeline_has_quarter_one_date(world: &CompositeWorld) {
    let timeline = world.timeline.borrow();
    let first = timeline.quarters().first().expect("quarter one");
    assert_eq!(first.date, "Jan");
    assert!(first.activities.is_empty());
    assert!(first.goals.is_empty());
}

#[then("every later quarter is blank")]
fn every_later_quarter_is_blank(world: &CompositeWorld) {
    let timeline = world.timeline.borrow();
    assert!(timeline.quarters().iter().skip(1).all(TimelineQuarter::is_blank));
}

#[then("the first record cells carry the contact in column order")]
fn the_first_record_cells_match(world: &CompositeWorld) {
    assert_eq!(world.cell(REFERENCES_FIELD, 0), "A");
    assert_eq!(world.cell(REFERENCES_FIELD, 1), "Org1");
    assert_eq!(world.cell(REFERENCES_FIELD, 2), "555");
    assert_eq!(world.cell(REFERENCES_FIELD, 3), "");
}

#[then("the second record cells are all blank")]
fn the_second_record_cells_are_blank(world: &CompositeWorld) {
    for index in references::COLUMNS..references::CELLS {
        assert_eq!(world.cell(REFERENCES_FIELD, index), "");
    }
}

#[then("the re-encoded contents equal the original draft contents")]
fn the_re_encoded_contents_match(world: &CompositeWorld) {
    let re_encoded = world.references.borrow().to_flat(REFERENCES_FIELD);
    assert_eq!(re_encoded, *world.contents.borrow());
}

#[scenario(path = "tests/features/composite_encodings.feature")]
fn composite_encoding_scenarios(world: CompositeWorld) {
    drop(world);
}

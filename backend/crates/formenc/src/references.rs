//! Reference-list composite fields.
//!
//! Collaboration and racial-justice reference questions collect two contact
//! records of name, organisation, phone, and email. The draft-time flat form
//! uses eight keys `<field>_0`..`<field>_7` in record-major order (`_0`..`_3`
//! belong to the first record, in the column order name, org, phone, email);
//! the submitted-time answer is a JSON array of two objects with those keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DecodeError;
use crate::flat;

/// Number of reference records per field.
pub const SLOTS: usize = 2;
/// Columns per record: name, org, phone, email.
pub const COLUMNS: usize = 4;
/// Total flat cells (`SLOTS * COLUMNS`).
pub const CELLS: usize = SLOTS * COLUMNS;

/// One reference contact record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Contact name.
    #[serde(default)]
    pub name: String,
    /// Contact's organisation.
    #[serde(default)]
    pub org: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Contact email address.
    #[serde(default)]
    pub email: String,
}

impl Reference {
    /// True when every column is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.org.is_empty() && self.phone.is_empty() && self.email.is_empty()
    }

    /// True when the record carries at least one way to reach the contact.
    #[must_use]
    pub fn has_contact_method(&self) -> bool {
        !self.phone.is_empty() || !self.email.is_empty()
    }
}

/// Canonical structured reference list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceList {
    references: [Reference; SLOTS],
}

impl ReferenceList {
    /// Build a list from explicit records.
    #[must_use]
    pub const fn new(references: [Reference; SLOTS]) -> Self {
        Self { references }
    }

    /// Read the flat-key cells of `field` out of a draft contents map.
    ///
    /// Missing cells decode as empty strings.
    #[must_use]
    pub fn from_flat(contents: &BTreeMap<String, String>, field: &str) -> Self {
        let mut references: [Reference; SLOTS] = Default::default();
        for (slot, reference) in references.iter_mut().enumerate() {
            let base = slot * COLUMNS;
            reference.name = flat::value(contents, field, base);
            reference.org = flat::value(contents, field, base + 1);
            reference.phone = flat::value(contents, field, base + 2);
            reference.email = flat::value(contents, field, base + 3);
        }
        Self { references }
    }

    /// Expand into the draft-time flat-key form.
    ///
    /// Always emits all [`CELLS`] keys so a rendered form shows every cell.
    #[must_use]
    pub fn to_flat(&self, field: &str) -> BTreeMap<String, String> {
        let mut contents = BTreeMap::new();
        for (slot, reference) in self.references.iter().enumerate() {
            let base = slot * COLUMNS;
            contents.insert(flat::key(field, base), reference.name.clone());
            contents.insert(flat::key(field, base + 1), reference.org.clone());
            contents.insert(flat::key(field, base + 2), reference.phone.clone());
            contents.insert(flat::key(field, base + 3), reference.email.clone());
        }
        contents
    }

    /// Decode the submitted-time JSON answer.
    ///
    /// Empty text decodes as a blank list; arrays shorter than [`SLOTS`] pad
    /// with blank records and longer arrays are truncated. Object keys other
    /// than name/org/phone/email are ignored.
    ///
    /// # Errors
    /// Returns [`DecodeError`] when the text is neither empty nor a JSON
    /// array of objects.
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let records: Vec<Reference> = serde_json::from_str(text)?;
        let mut references: [Reference; SLOTS] = Default::default();
        for (slot, reference) in references.iter_mut().enumerate() {
            if let Some(record) = records.get(slot) {
                *reference = record.clone();
            }
        }
        Ok(Self { references })
    }

    /// Encode as the submitted-time JSON answer: an array of [`SLOTS`]
    /// objects keyed name/org/phone/email.
    #[must_use]
    pub fn to_json(&self) -> String {
        let records: Vec<serde_json::Value> = self
            .references
            .iter()
            .map(|reference| {
                serde_json::json!({
                    "name": reference.name,
                    "org": reference.org,
                    "phone": reference.phone,
                    "email": reference.email,
                })
            })
            .collect();
        serde_json::Value::from(records).to_string()
    }

    /// The records in order.
    #[must_use]
    pub const fn references(&self) -> &[Reference; SLOTS] {
        &self.references
    }

    /// True when no record has any content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.references.iter().all(Reference::is_blank)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn single_entry() -> ReferenceList {
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

    #[rstest]
    fn flat_cells_follow_name_org_phone_email_order(single_entry: ReferenceList) {
        let flat = single_entry.to_flat("racial_justice_references");
        assert_eq!(flat.len(), CELLS);
        assert_eq!(
            flat.get("racial_justice_references_0").map(String::as_str),
            Some("A")
        );
        assert_eq!(
            flat.get("racial_justice_references_1").map(String::as_str),
            Some("Org1")
        );
        assert_eq!(
            flat.get("racial_justice_references_2").map(String::as_str),
            Some("555")
        );
        for index in 3..CELLS {
            let key = flat::key("racial_justice_references", index);
            assert_eq!(flat.get(&key).map(String::as_str), Some(""));
        }
    }

    #[rstest]
    fn flat_round_trip_preserves_records(single_entry: ReferenceList) {
        let flat = single_entry.to_flat("collaboration_references");
        assert_eq!(
            ReferenceList::from_flat(&flat, "collaboration_references"),
            single_entry
        );
    }

    #[rstest]
    fn json_round_trip_preserves_records(single_entry: ReferenceList) {
        let json = single_entry.to_json();
        assert_eq!(ReferenceList::from_json(&json).expect("decode"), single_entry);
    }

    #[rstest]
    fn legacy_answer_decodes(single_entry: ReferenceList) {
        let legacy = concat!(
            r#"[{"name":"A","org":"Org1","phone":"555","email":""},"#,
            r#"{"name":"","org":"","phone":"","email":""}]"#
        );
        assert_eq!(ReferenceList::from_json(legacy).expect("decode"), single_entry);
    }

    #[rstest]
    #[case("")]
    #[case("[]")]
    #[case(r#"[{}]"#)]
    fn sparse_json_pads_with_blank_records(#[case] text: &str) {
        let decoded = ReferenceList::from_json(text).expect("decode");
        assert!(decoded.is_blank());
    }

    #[rstest]
    fn unknown_object_keys_are_ignored() {
        let text = r#"[{"name":"A","org":"B","fax":"unused"}]"#;
        let decoded = ReferenceList::from_json(text).expect("decode");
        let first = decoded.references().first().cloned().unwrap_or_default();
        assert_eq!(first.name, "A");
        assert_eq!(first.org, "B");
        assert_eq!(first.phone, "");
    }

    #[rstest]
    #[case(Reference::default(), true, false)]
    #[case(
        Reference { name: "A".to_owned(), ..Reference::default() },
        false,
        false
    )]
    #[case(
        Reference { email: "a@example.org".to_owned(), ..Reference::default() },
        false,
        true
    )]
    fn blank_and_contact_method_checks(
        #[case] reference: Reference,
        #[case] blank: bool,
        #[case] has_contact: bool,
    ) {
        assert_eq!(reference.is_blank(), blank);
        assert_eq!(reference.has_contact_method(), has_contact);
    }
}

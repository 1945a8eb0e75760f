//! Flat-key naming shared by the composite codecs.
//!
//! Multi-widget form rendering splits a composite field named `f` into inputs
//! `f_0`, `f_1`, ... in a fixed cell order. The codecs in this crate own the
//! cell order; this module owns only the key syntax.

use std::collections::BTreeMap;

/// Build the flat key for one cell of a composite field.
///
/// # Examples
/// ```
/// assert_eq!(formenc::flat::key("timeline", 4), "timeline_4");
/// ```
#[must_use]
pub fn key(field: &str, index: usize) -> String {
    format!("{field}_{index}")
}

/// Read one cell of a composite field, treating a missing key as empty.
#[must_use]
pub fn value(contents: &BTreeMap<String, String>, field: &str, index: usize) -> String {
    contents.get(&key(field, index)).cloned().unwrap_or_default()
}

/// True when `candidate` is a flat key of `field` within `cells` cells.
///
/// Used to recognise which draft-contents entries belong to a composite
/// field without enumerating every index at the call site.
#[must_use]
pub fn is_key_of(field: &str, cells: usize, candidate: &str) -> bool {
    (0..cells).any(|index| key(field, index) == candidate)
}

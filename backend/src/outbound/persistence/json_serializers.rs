//! Shared JSON serialization helpers for outbound Diesel adapters.
//!
//! Draft contents, file maps, and the cached organization profile persist
//! as JSONB. Encode helpers convert domain types to `serde_json::Value`;
//! decode helpers reverse this for read-side adapters, validating through
//! domain parsers so malformed payloads surface as typed errors rather
//! than silent data corruption.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::domain::draft::DraftFileField;
use crate::domain::organization::OrganizationProfile;

pub(super) fn string_map_to_json(map: &BTreeMap<String, String>) -> Value {
    let object = map
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect::<Map<_, _>>();
    Value::Object(object)
}

pub(super) fn file_map_to_json(files: &BTreeMap<DraftFileField, String>) -> Value {
    let object = files
        .iter()
        .map(|(field, reference)| (field.as_str().to_owned(), Value::String(reference.clone())))
        .collect::<Map<_, _>>();
    Value::Object(object)
}

pub(super) fn profile_to_json(profile: &OrganizationProfile) -> Result<Value, String> {
    serde_json::to_value(profile).map_err(|e| format!("profile encode: {e}"))
}

// ---------------------------------------------------------------------------
// Decode helpers (JSONB → domain)
// ---------------------------------------------------------------------------

pub(super) fn json_to_string_map(value: Value) -> Result<BTreeMap<String, String>, String> {
    serde_json::from_value(value).map_err(|e| format!("contents decode: {e}"))
}

/// Decode a JSONB file map, validating every key against the known file
/// slots.
pub(super) fn json_to_file_map(value: Value) -> Result<BTreeMap<DraftFileField, String>, String> {
    let raw: BTreeMap<String, String> =
        serde_json::from_value(value).map_err(|e| format!("file map decode: {e}"))?;
    raw.into_iter()
        .map(|(key, reference)| {
            DraftFileField::from_str(&key)
                .map(|field| (field, reference))
                .map_err(|_| format!("file map decode: unknown slot {key}"))
        })
        .collect()
}

pub(super) fn json_to_profile(value: Value) -> Result<OrganizationProfile, String> {
    serde_json::from_value(value).map_err(|e| format!("profile decode: {e}"))
}

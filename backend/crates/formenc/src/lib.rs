//! Encodings for composite grant-application form fields.
//!
//! Two composite field families exist: the project timeline (five quarters of
//! date/activities/goals) and reference lists (two records of
//! name/org/phone/email). Each has three representations that must stay in
//! lockstep:
//!
//! - the canonical structured value ([`timeline::Timeline`],
//!   [`references::ReferenceList`]);
//! - the draft-time flat-key form (`timeline_0`..`timeline_14`,
//!   `collaboration_references_0`..`_7`) produced by multi-widget form
//!   rendering;
//! - the submitted-time JSON string stored on a narrative answer.
//!
//! Conversions tolerate missing flat keys and short JSON arrays (both read as
//! empty cells) and ignore material beyond the canonical size, so decoding
//! then re-encoding always yields the canonical shape.

mod error;
pub mod flat;
pub mod references;
pub mod timeline;

pub use error::DecodeError;
pub use references::{Reference, ReferenceList};
pub use timeline::{Timeline, TimelineQuarter};

//! Word counting for length-limited narrative answers.
//!
//! Counts words the same way the paper-era review process did: ASCII
//! punctuation and non-ASCII characters are removed before splitting on
//! whitespace, so `"end.Start"` counts as one word and smart quotes vanish
//! entirely. Stored answers were validated under this rule, so changing it
//! would retroactively push archived submissions over their limits.

/// Counts the words in `text` under the legacy stripping rule.
///
/// Characters outside printable ASCII and ASCII punctuation are deleted
/// (not replaced with spaces), then the remainder is split on whitespace.
///
/// # Examples
///
/// ```
/// use backend::domain::wordcount::word_count;
///
/// assert_eq!(word_count("a mission, clearly stated."), 4);
/// assert_eq!(word_count("end.Start"), 1);
/// ```
#[must_use]
pub fn word_count(text: &str) -> usize {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_punctuation())
        .collect();
    stripped.split_whitespace().count()
}

/// Returns `true` when `text` is within `limit` words.
#[must_use]
pub fn within_limit(text: &str, limit: usize) -> bool {
    word_count(text) <= limit
}

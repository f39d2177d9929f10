//! Duplicate-incident heuristic.
//!
//! Two descriptions collide when their signatures are equal. The signature is
//! the lower-cased description cut down to its first [`SIGNATURE_TOKENS`]
//! whitespace-separated tokens, joined by single spaces. It is a crude prefix
//! match, not a similarity measure: unrelated reports that open with the same
//! four words are flagged, and a shorter report never matches a longer one.

/// Number of leading tokens that make up a signature.
pub const SIGNATURE_TOKENS: usize = 4;

/// Compute the comparison signature of a description.
pub fn signature(description: &str) -> String {
    description
        .to_lowercase()
        .split_whitespace()
        .take(SIGNATURE_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Does `description` collide with any of the `existing` active descriptions?
pub fn would_duplicate<I, S>(description: &str, existing: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let candidate = signature(description);
    existing
        .into_iter()
        .any(|other| signature(other.as_ref()) == candidate)
}

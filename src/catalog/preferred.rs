//! Preferred-version tie-break
//!
//! A read that resolves "latest" can structurally match more than one row,
//! e.g. when two writers raced before a recomputation landed. This picks a
//! single winner at read time: the maintainer-flagged preferred row if one
//! exists, otherwise the first candidate. Callers rank candidates most
//! recent first, so "first" is deterministic.

/// Reduce a ranked candidate set to at most one row.
pub fn pick_preferred<T>(candidates: Vec<T>, is_preferred: impl Fn(&T) -> bool) -> Option<T> {
    if candidates.len() <= 1 {
        return candidates.into_iter().next();
    }

    let preferred_at = candidates.iter().position(&is_preferred);
    let index = preferred_at.unwrap_or(0);
    candidates.into_iter().nth(index)
}

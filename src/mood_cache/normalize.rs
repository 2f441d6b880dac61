/// Canonicalize a free-text mood so that trivially different spellings of
/// the same mood share one cache key. Lowercases, strips everything that is
/// not alphanumeric or whitespace, and collapses whitespace runs.
pub fn normalize_mood(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

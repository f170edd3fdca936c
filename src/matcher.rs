use strsim::normalized_levenshtein;

use crate::spotify::Artist;

const SIMILARITY_THRESHOLD: f64 = 0.4;

/// How strictly a search result's name must match the requested artist name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Similarity above the threshold is enough.
    #[default]
    Fuzzy,
    /// Names must be equal ignoring case.
    Exact,
}

/// Similarity between two artist names in `0.0..=1.0`, ignoring case and
/// surrounding whitespace.
pub fn name_similarity(query: &str, candidate: &str) -> f64 {
    normalized_levenshtein(
        &query.trim().to_lowercase(),
        &candidate.trim().to_lowercase(),
    )
}

pub fn names_equal(query: &str, candidate: &str) -> bool {
    query.trim().to_lowercase() == candidate.trim().to_lowercase()
}

/// Whether a search result is a plausible match for `query`.
/// Artists without followers are placeholders and never match.
pub fn is_candidate(query: &str, artist: &Artist, policy: MatchPolicy) -> bool {
    if artist.followers == 0 {
        return false;
    }

    match policy {
        MatchPolicy::Fuzzy => name_similarity(query, &artist.name) > SIMILARITY_THRESHOLD,
        MatchPolicy::Exact => names_equal(query, &artist.name),
    }
}

//! Duplicate decision procedure.
//!
//! Turns the ranked output of a similarity search into a verdict. The search
//! collaborator's ordering is trusted verbatim: nothing here re-sorts or
//! breaks ties.

use crate::dedup::domain::workout::{DuplicateVerdict, MatchCandidate};
use crate::dedup::defaults;

/// Nearest-neighbour query sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    /// How many candidates the index examines internally.
    pub candidate_pool: usize,
    /// How many of the best candidates are returned.
    pub limit: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            candidate_pool: defaults::CANDIDATE_POOL_SIZE,
            limit: defaults::RESULT_LIMIT,
        }
    }
}

/// Keep every candidate scoring strictly above `threshold`, in the order given.
pub fn decide(candidates: Vec<MatchCandidate>, threshold: f32) -> DuplicateVerdict {
    let matches: Vec<MatchCandidate> = candidates
        .into_iter()
        .filter(|c| c.similarity > threshold)
        .collect();

    if matches.is_empty() {
        return DuplicateVerdict::unique();
    }
    DuplicateVerdict {
        is_duplicate: true,
        matches,
    }
}

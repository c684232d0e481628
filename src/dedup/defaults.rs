//! Default tuning values shared by configuration and the service.

/// Candidates must score strictly above this to count as duplicates.
pub const SIMILARITY_THRESHOLD: f32 = 0.85;

/// Breadth of the approximate nearest-neighbour search.
pub const CANDIDATE_POOL_SIZE: usize = 100;

/// Upper bound pgvector accepts for `hnsw.ef_search`.
pub const MAX_CANDIDATE_POOL_SIZE: usize = 1000;

/// Maximum number of matches returned by a check.
pub const RESULT_LIMIT: usize = 5;

pub const CHECK_DUPLICATE_MESSAGE: &str = "Possible duplicate workout found!";
pub const CHECK_UNIQUE_MESSAGE: &str = "No duplicate found.";
pub const ADD_MESSAGE: &str = "Workout saved";

pub const GRAMMAR_BASE_URL: &str = "https://api.languagetool.org";
pub const GRAMMAR_LANGUAGE: &str = "en-US";

pub const TRANSLATION_BASE_URL: &str = "https://translation.googleapis.com";
pub const TRANSLATION_TARGET_LANGUAGE: &str = "en";

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "embedding-001";

pub const FASTEMBED_MODEL: &str = "all-minilm-l6-v2";

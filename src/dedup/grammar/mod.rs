//! Grammar and typo checking collaborators.

pub mod languagetool;

use crate::dedup::domain::grammar::GrammarFinding;
use anyhow::Result;
use async_trait::async_trait;

pub use languagetool::LanguageToolChecker;

/// Forwards text to an external checker and returns its findings unmodified.
#[async_trait]
pub trait GrammarChecker: Send + Sync + std::fmt::Debug {
    async fn check(&self, text: &str) -> Result<Vec<GrammarFinding>>;
}

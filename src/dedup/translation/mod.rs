//! Best-effort translation of free text before embedding.

pub mod google;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

pub use google::GoogleTranslator;

/// Translates text into the configured target language.
#[async_trait]
pub trait Translator: Send + Sync + std::fmt::Debug {
    async fn translate(&self, text: &str) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// Translate `text`, falling back to the original on any failure.
///
/// Blank input short-circuits to an empty string without calling out.
pub async fn translate_or_original(translator: Option<&dyn Translator>, text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let Some(translator) = translator else {
        return text.to_string();
    };

    match translator.translate(text).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => text.to_string(),
        Err(e) => {
            warn!(
                name: "translation.degraded",
                translator = translator.name(),
                error = %e,
                "Translation failed, using original text"
            );
            metrics::counter!("translation_fallbacks_total").increment(1);
            text.to_string()
        }
    }
}

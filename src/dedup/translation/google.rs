//! Google Cloud Translation (v2 REST) client.

use super::Translator;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
    #[serde(default)]
    detected_source_language: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    base_url: Url,
    api_key: String,
    target_language: String,
}

impl GoogleTranslator {
    pub fn new(
        base_url: &str,
        api_key: String,
        target_language: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            bail!("Google translator requires an API key");
        }
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?,
            base_url: Url::parse(base_url).context("Invalid translation base URL")?,
            api_key,
            target_language: target_language.into(),
        })
    }

    fn parse_response(body: &str) -> Result<Translation> {
        let response: TranslateResponse =
            serde_json::from_str(body).context("Failed to parse translation response")?;
        response
            .data
            .translations
            .into_iter()
            .next()
            .context("Translation response contained no translations")
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let url = self.base_url.join("language/translate/v2")?;
        let request = TranslateRequest {
            q: text,
            target: &self.target_language,
            format: "text",
        };

        let response = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach translation API: {}", e))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("Translation API returned {}: {}", status, body);
        }

        let translation = Self::parse_response(&body)?;
        tracing::debug!(
            source = ?translation.detected_source_language,
            target = %self.target_language,
            "Translated text"
        );
        Ok(translation.translated_text)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

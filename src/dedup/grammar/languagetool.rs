//! LanguageTool HTTP API client.
//!
//! `POST {base_url}/v2/check` with form fields `text` and `language`.

use super::GrammarChecker;
use crate::dedup::domain::grammar::GrammarFinding;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<GrammarFinding>,
}

#[derive(Debug, Clone)]
pub struct LanguageToolChecker {
    client: Client,
    base_url: Url,
    language: String,
}

impl LanguageToolChecker {
    pub fn new(base_url: &str, language: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .context("Failed to build HTTP client")?,
            base_url: Url::parse(base_url).context("Invalid grammar checker base URL")?,
            language: language.into(),
        })
    }

    fn parse_response(body: &str) -> Result<Vec<GrammarFinding>> {
        let response: CheckResponse =
            serde_json::from_str(body).context("Failed to parse LanguageTool response")?;
        Ok(response.matches)
    }
}

#[async_trait]
impl GrammarChecker for LanguageToolChecker {
    async fn check(&self, text: &str) -> Result<Vec<GrammarFinding>> {
        let url = self.base_url.join("v2/check")?;

        let response = self
            .client
            .post(url)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(|e| anyhow!("Failed to connect to grammar service: {}", e))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("Grammar service returned error {}: {}", status, body);
        }

        Self::parse_response(&body)
    }
}

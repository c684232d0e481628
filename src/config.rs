use crate::dedup::defaults;
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path (YAML, TOML or JSON)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Catalog backend: postgres or memory
    #[arg(long)]
    pub persistence_provider: Option<String>,

    /// Enable rate limiting
    #[arg(long, env = "RATE_LIMIT_ENABLED")]
    pub rate_limit_enabled: Option<bool>,

    /// Disable timeout middleware
    #[arg(long, env = "TIMEOUT_DISABLED")]
    pub timeout_disabled: Option<bool>,

    /// Matches must score strictly above this to be reported
    #[arg(long)]
    pub similarity_threshold: Option<f32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub resilience: ResilienceConfig,
    pub persistence: PersistenceConfig,
    pub embedding: EmbeddingConfig,
    pub translation: TranslationConfig,
    pub grammar: GrammarConfig,
    pub dedup: DedupConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResilienceConfig {
    pub rate_limit_enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
    pub timeout_disabled: bool,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistenceConfig {
    /// `postgres` or `memory`.
    pub provider: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// `fastembed`, `gemini` or `hashing`.
    pub provider: String,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Vector length for the `hashing` provider.
    pub dimensions: Option<usize>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub provider: String,
    pub target_language: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrammarConfig {
    pub base_url: String,
    pub language: String,
    /// Translate lint input before checking it.
    pub translate_input: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DedupConfig {
    pub similarity_threshold: f32,
    pub candidate_pool_size: usize,
    pub result_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    pub json_logs: bool,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_args(std::env::args())
    }

    /// Priority: CLI flag > `DEDUP_` environment > config file > defaults.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(|e| ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder()
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("resilience.rate_limit_enabled", true)?
            .set_default("resilience.requests_per_second", 20)?
            .set_default("resilience.burst_size", 40)?
            .set_default("resilience.timeout_disabled", false)?
            .set_default("resilience.request_timeout_secs", 30)?
            .set_default("persistence.provider", "postgres")?
            .set_default("persistence.max_connections", 5)?
            .set_default("embedding.provider", "fastembed")?
            .set_default("embedding.timeout_secs", 30)?
            .set_default("translation.enabled", false)?
            .set_default("translation.provider", "google")?
            .set_default(
                "translation.target_language",
                defaults::TRANSLATION_TARGET_LANGUAGE,
            )?
            .set_default("translation.base_url", defaults::TRANSLATION_BASE_URL)?
            .set_default("translation.timeout_secs", 10)?
            .set_default("grammar.base_url", defaults::GRAMMAR_BASE_URL)?
            .set_default("grammar.language", defaults::GRAMMAR_LANGUAGE)?
            .set_default("grammar.translate_input", false)?
            .set_default("grammar.timeout_secs", 10)?
            .set_default(
                "dedup.similarity_threshold",
                f64::from(defaults::SIMILARITY_THRESHOLD),
            )?
            .set_default("dedup.candidate_pool_size", defaults::CANDIDATE_POOL_SIZE as i64)?
            .set_default("dedup.result_limit", defaults::RESULT_LIMIT as i64)?
            .set_default("telemetry.json_logs", false)?
            .set_default("telemetry.metrics_enabled", true)?;

        // Conventional unprefixed variables only fill gaps.
        if let Ok(key) = env::var("GOOGLE_API_KEY") {
            if !key.trim().is_empty() {
                builder = builder
                    .set_default("embedding.api_key", key.clone())?
                    .set_default("translation.api_key", key)?;
            }
        }
        if let Ok(url) = env::var("DATABASE_URL") {
            builder = builder.set_default("persistence.database_url", url)?;
        }

        // Explicit file, else ./config.{yaml,toml,json} if present
        builder = match &cli.config {
            Some(path) => builder.add_source(File::from(PathBuf::from(path)).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // E.g. DEDUP_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("DEDUP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(provider) = cli.persistence_provider {
            builder = builder.set_override("persistence.provider", provider)?;
        }
        if let Some(rl) = cli.rate_limit_enabled {
            builder = builder.set_override("resilience.rate_limit_enabled", rl)?;
        }
        if let Some(td) = cli.timeout_disabled {
            builder = builder.set_override("resilience.timeout_disabled", td)?;
        }
        if let Some(threshold) = cli.similarity_threshold {
            builder = builder.set_override("dedup.similarity_threshold", f64::from(threshold))?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make similarity search meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dedup = &self.dedup;
        if !(0.0..=1.0).contains(&dedup.similarity_threshold) {
            return Err(ConfigError::Message(format!(
                "dedup.similarity_threshold must be within [0, 1], got {}",
                dedup.similarity_threshold
            )));
        }
        if dedup.result_limit == 0 {
            return Err(ConfigError::Message(
                "dedup.result_limit must be at least 1".to_string(),
            ));
        }
        if dedup.candidate_pool_size < dedup.result_limit {
            return Err(ConfigError::Message(format!(
                "dedup.candidate_pool_size ({}) must be >= dedup.result_limit ({})",
                dedup.candidate_pool_size, dedup.result_limit
            )));
        }
        if dedup.candidate_pool_size > defaults::MAX_CANDIDATE_POOL_SIZE {
            return Err(ConfigError::Message(format!(
                "dedup.candidate_pool_size must be at most {}, got {}",
                defaults::MAX_CANDIDATE_POOL_SIZE,
                dedup.candidate_pool_size
            )));
        }
        if !self.resilience.timeout_disabled && self.resilience.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "resilience.request_timeout_secs must be positive (or set timeout_disabled)"
                    .to_string(),
            ));
        }
        if self.persistence.provider == "postgres" && self.persistence.database_url.is_none() {
            return Err(ConfigError::Message(
                "persistence.database_url (or DATABASE_URL) is required for the postgres provider"
                    .to_string(),
            ));
        }
        if self.resilience.requests_per_second == 0 || self.resilience.burst_size == 0 {
            return Err(ConfigError::Message(
                "resilience.requests_per_second and burst_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

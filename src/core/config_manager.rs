// src/core/config_manager.rs
//! Configuration loading: optional `config.yaml` sections overridden by environment variables

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_JOOBLE_URL: &str = "https://jooble.org/api";
const DEFAULT_IDENTITY_KEYS_URL: &str =
    "https://www.googleapis.com/robot/v1/metadata/x509/securetoken@system.gserviceaccount.com";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub identity: IdentityConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub port: u16,
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Expected `iss` claim of identity provider session tokens
    pub issuer: String,
    /// Expected `aud` claim, if the provider sets one
    pub audience: Option<String>,
    /// Endpoint returning a `kid -> PEM` map of signing keys
    pub keys_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Gemini,
    Groq,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub llm_provider: LlmProvider,
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub jooble_api_key: Option<String>,
    pub jooble_api_url: String,
    pub timeout_seconds: u64,
}

/// Per-environment overrides read from `config.yaml`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSection {
    port: Option<u16>,
    database_path: Option<PathBuf>,
    identity_issuer: Option<String>,
    identity_audience: Option<String>,
    identity_keys_url: Option<String>,
    llm_provider: Option<LlmProvider>,
    jooble_api_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    local: FileSection,
    production: FileSection,
}

impl ConfigManager {
    /// Load configuration from `config.yaml` (if present) and the environment
    pub fn load() -> Result<Self> {
        let name = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string());
        info!("Loading configuration for environment: {}", name);

        let section = Self::load_file_section(Path::new("config.yaml"), &name)?;
        Self::from_parts(name, section, |key| std::env::var(key).ok())
    }

    fn load_file_section(path: &Path, environment: &str) -> Result<FileSection> {
        if !path.exists() {
            return Ok(FileSection::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_file_section(&content, environment)
    }

    fn parse_file_section(content: &str, environment: &str) -> Result<FileSection> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        Ok(match environment {
            "production" => file.production,
            _ => file.local,
        })
    }

    fn from_parts<F>(name: String, section: FileSection, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match env("ROCKET_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?,
            None => section.port.unwrap_or(DEFAULT_PORT),
        };

        let base_dir = if name == "production" {
            PathBuf::from("/app")
        } else {
            PathBuf::from(".")
        };

        let database_path = env("DATABASE_PATH")
            .map(PathBuf::from)
            .or(section.database_path)
            .unwrap_or_else(|| base_dir.join("data").join("job_matcher.db"));

        let issuer = env("IDENTITY_ISSUER")
            .or(section.identity_issuer)
            .ok_or_else(|| anyhow::anyhow!("IDENTITY_ISSUER environment variable not set"))?;

        let llm_provider = match env("LLM_PROVIDER") {
            Some(raw) => match raw.to_lowercase().as_str() {
                "gemini" => LlmProvider::Gemini,
                "groq" => LlmProvider::Groq,
                other => anyhow::bail!("Unsupported LLM_PROVIDER: {}. Use gemini or groq", other),
            },
            None => section.llm_provider.unwrap_or(LlmProvider::Gemini),
        };

        let timeout_seconds = match env("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
            None => section.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            environment: EnvironmentConfig {
                name,
                port,
                database_path,
            },
            identity: IdentityConfig {
                issuer,
                audience: env("IDENTITY_AUDIENCE").or(section.identity_audience),
                keys_url: env("IDENTITY_KEYS_URL")
                    .or(section.identity_keys_url)
                    .unwrap_or_else(|| DEFAULT_IDENTITY_KEYS_URL.to_string()),
            },
            service: ServiceConfig {
                llm_provider,
                gemini_api_key: env("GEMINI_API_KEY"),
                groq_api_key: env("GROQ_API_KEY"),
                jooble_api_key: env("JOOBLE_API_KEY"),
                jooble_api_url: env("JOOBLE_API_URL")
                    .or(section.jooble_api_url)
                    .unwrap_or_else(|| DEFAULT_JOOBLE_URL.to_string()),
                timeout_seconds,
            },
        })
    }

    /// Ensure the database directory exists
    pub async fn ensure_directories(&self) -> Result<()> {
        if let Some(parent) = self.environment.database_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_issuer_is_set() {
        let config = ConfigManager::from_parts(
            "local".to_string(),
            FileSection::default(),
            env_from(&[("IDENTITY_ISSUER", "https://clerk.example.com")]),
        )
        .unwrap();

        assert_eq!(config.environment.port, DEFAULT_PORT);
        assert_eq!(
            config.environment.database_path,
            PathBuf::from("./data/job_matcher.db")
        );
        assert_eq!(config.service.llm_provider, LlmProvider::Gemini);
        assert_eq!(config.service.jooble_api_url, DEFAULT_JOOBLE_URL);
        assert_eq!(config.service.timeout_seconds, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn missing_issuer_is_an_error() {
        let result =
            ConfigManager::from_parts("local".to_string(), FileSection::default(), env_from(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn environment_overrides_file_section() {
        let yaml = r#"
local:
  port: 9000
  identity_issuer: https://file-issuer
  llm_provider: groq
production:
  port: 80
"#;
        let section = ConfigManager::parse_file_section(yaml, "local").unwrap();
        let config = ConfigManager::from_parts(
            "local".to_string(),
            section,
            env_from(&[("ROCKET_PORT", "9100"), ("GROQ_API_KEY", "gk")]),
        )
        .unwrap();

        assert_eq!(config.environment.port, 9100);
        assert_eq!(config.identity.issuer, "https://file-issuer");
        assert_eq!(config.service.llm_provider, LlmProvider::Groq);
        assert_eq!(config.service.groq_api_key.as_deref(), Some("gk"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = ConfigManager::from_parts(
            "local".to_string(),
            FileSection::default(),
            env_from(&[("IDENTITY_ISSUER", "x"), ("ROCKET_PORT", "not-a-port")]),
        );
        assert!(result.is_err());
    }
}

use serde::Deserialize;
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "SIGMA_AGENT_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const ENV_RULES_DIR: &str = "SIGMA_RULES_DIR";

const DEFAULT_RULES_DIR: &str = "all_sigma_rules";
const DEFAULT_RETRIEVAL_TOP_K: usize = 5;

/// Configuration errors, fatal at startup
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    MissingCredential(&'static str),
}

/// Rule corpus configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    /// Directory holding the example Sigma rule files
    #[serde(default = "default_rules_dir")]
    pub rules_dir: String,
    /// Number of example rules retrieved per synthesis request
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_rules_dir() -> String {
    DEFAULT_RULES_DIR.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_RETRIEVAL_TOP_K
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            rules_dir: default_rules_dir(),
            top_k: default_top_k(),
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub corpus: Option<CorpusConfig>,
}

/// Application configuration
///
/// Both model-provider API keys are required; startup fails without them.
/// Everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub corpus: CorpusConfig,
    pub port: u16,
    pub host: String,
}

impl Config {
    /// Load configuration from environment and config file
    ///
    /// Fails fast when either model-provider credential is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let anthropic_api_key = std::env::var(ENV_ANTHROPIC_API_KEY)
            .map_err(|_| ConfigError::MissingCredential(ENV_ANTHROPIC_API_KEY))?;

        let openai_api_key = std::env::var(ENV_OPENAI_API_KEY)
            .map_err(|_| ConfigError::MissingCredential(ENV_OPENAI_API_KEY))?;

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        // Load config file
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut corpus = Self::load_config_file(&config_path)
            .and_then(|cf| cf.corpus)
            .unwrap_or_default();

        // Env var takes precedence over the config file
        if let Ok(dir) = std::env::var(ENV_RULES_DIR) {
            corpus.rules_dir = dir;
        }

        Ok(Self {
            anthropic_api_key,
            openai_api_key,
            corpus,
            port,
            host,
        })
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Handle empty file
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_config_defaults() {
        let corpus = CorpusConfig::default();
        assert_eq!(corpus.rules_dir, DEFAULT_RULES_DIR);
        assert_eq!(corpus.top_k, DEFAULT_RETRIEVAL_TOP_K);
    }

    #[test]
    fn test_config_file_partial_corpus() {
        let cf: ConfigFile = serde_yaml::from_str("corpus:\n  rules_dir: /srv/rules\n").unwrap();
        let corpus = cf.corpus.unwrap();
        assert_eq!(corpus.rules_dir, "/srv/rules");
        assert_eq!(corpus.top_k, DEFAULT_RETRIEVAL_TOP_K);
    }
}

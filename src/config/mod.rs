//! Configuration management for docsearch
//!
//! Configuration is loaded from a TOML file, overridden from `DOCSEARCH_*`
//! environment variables and validated before use.

use crate::error::{DocsearchError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Pipeline name registered on the OpenSearch cluster for native hybrid search
pub const DEFAULT_HYBRID_PIPELINE: &str = "hybrid-search-pipeline";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub server: ServerConfig,
    pub opensearch: OpenSearchConfig,
    pub embedding: EmbeddingConfig,
    pub reranker: RerankerConfig,
    pub search: SearchConfig,
    pub ingest: IngestConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// OpenSearch connection and index field layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSearchConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Field holding the chunk embedding (`knn_vector`)
    pub vector_field: String,
    /// Field holding the chunk text used for BM25 and reranking
    pub text_field: String,
}

/// Embedding model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    pub batch_size: usize,
}

/// Cross-encoder reranker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    pub model: String,
}

/// Search orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Index every search mode queries
    pub index_name: String,
    /// OpenSearch search pipeline used by native hybrid search
    pub hybrid_pipeline: String,
    /// Reranked hybrid over-fetch factor applied to `top_k`
    pub candidate_multiplier: usize,
    /// Lower bound on candidates fetched per signal before reranking
    pub min_candidates: usize,
}

/// Document ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_name: "master_index".to_string(),
            hybrid_pipeline: DEFAULT_HYBRID_PIPELINE.to_string(),
            candidate_multiplier: 3,
            min_candidates: 30,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DocsearchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| DocsearchError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| DocsearchError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Build a configuration from defaults plus `DOCSEARCH_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Defaults with the given `DOCSEARCH_*` overrides applied, then validated
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Config::default();
        config.apply_overrides(vars);

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Apply environment variable overrides
    /// Environment variables in format: DOCSEARCH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    fn apply_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("DOCSEARCH_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "SERVER__BIND_ADDR" => {
                self.server.bind_addr = value.to_string();
            }
            "OPENSEARCH__URL" => {
                self.opensearch.url = value.to_string();
            }
            "OPENSEARCH__USERNAME" => {
                self.opensearch.username = Some(value.to_string());
            }
            "OPENSEARCH__PASSWORD" => {
                self.opensearch.password = Some(value.to_string());
            }
            "OPENSEARCH__VECTOR_FIELD" => {
                self.opensearch.vector_field = value.to_string();
            }
            "OPENSEARCH__TEXT_FIELD" => {
                self.opensearch.text_field = value.to_string();
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "EMBEDDING__BATCH_SIZE" => {
                self.embedding.batch_size = parse_usize(path, value)?;
            }
            "RERANKER__MODEL" => {
                self.reranker.model = value.to_string();
            }
            "SEARCH__INDEX_NAME" => {
                self.search.index_name = value.to_string();
            }
            "SEARCH__HYBRID_PIPELINE" => {
                self.search.hybrid_pipeline = value.to_string();
            }
            "SEARCH__CANDIDATE_MULTIPLIER" => {
                self.search.candidate_multiplier = parse_usize(path, value)?;
            }
            "SEARCH__MIN_CANDIDATES" => {
                self.search.min_candidates = parse_usize(path, value)?;
            }
            "INGEST__CHUNK_SIZE" => {
                self.ingest.chunk_size = parse_usize(path, value)?;
            }
            "INGEST__CHUNK_OVERLAP" => {
                self.ingest.chunk_overlap = parse_usize(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            DocsearchError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("docsearch").join("config.toml"))
    }
}

fn parse_usize(path: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| DocsearchError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}' as integer", value),
        })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            server: ServerConfig {
                bind_addr: "127.0.0.1:8000".to_string(),
            },
            opensearch: OpenSearchConfig {
                url: "http://localhost:9200".to_string(),
                username: None,
                password: None,
                vector_field: "embedding".to_string(),
                text_field: "text".to_string(),
            },
            embedding: EmbeddingConfig {
                model: "multilingual-e5-small".to_string(),
                batch_size: 32,
            },
            reranker: RerankerConfig {
                model: "BAAI/bge-reranker-v2-m3".to_string(),
            },
            search: SearchConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

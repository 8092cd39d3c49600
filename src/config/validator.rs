use crate::config::Config;
use crate::error::{DocsearchError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, reporting every failing key at once
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_server(config, &mut errors);
        Self::validate_opensearch(config, &mut errors);
        Self::validate_models(config, &mut errors);
        Self::validate_search(config, &mut errors);
        Self::validate_ingest(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DocsearchError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_server(config: &Config, errors: &mut Vec<ValidationError>) {
        if config
            .server
            .bind_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            errors.push(ValidationError::new(
                "server.bind_addr",
                format!("Invalid socket address: {}", config.server.bind_addr),
            ));
        }
    }

    fn validate_opensearch(config: &Config, errors: &mut Vec<ValidationError>) {
        let url = &config.opensearch.url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ValidationError::new(
                "opensearch.url",
                format!("URL must start with http:// or https://, got '{}'", url),
            ));
        }

        if config.opensearch.username.is_some() != config.opensearch.password.is_some() {
            errors.push(ValidationError::new(
                "opensearch.username",
                "Username and password must be set together",
            ));
        }

        if config.opensearch.vector_field.is_empty() {
            errors.push(ValidationError::new(
                "opensearch.vector_field",
                "Vector field name cannot be empty",
            ));
        }

        if config.opensearch.text_field.is_empty() {
            errors.push(ValidationError::new(
                "opensearch.text_field",
                "Text field name cannot be empty",
            ));
        }
    }

    fn validate_models(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.reranker.model.is_empty() {
            errors.push(ValidationError::new(
                "reranker.model",
                "Model name cannot be empty",
            ));
        }
    }

    fn validate_search(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.search.index_name.is_empty() {
            errors.push(ValidationError::new(
                "search.index_name",
                "Index name cannot be empty",
            ));
        }

        if config.search.hybrid_pipeline.is_empty() {
            errors.push(ValidationError::new(
                "search.hybrid_pipeline",
                "Pipeline name cannot be empty",
            ));
        }

        if config.search.candidate_multiplier == 0 {
            errors.push(ValidationError::new(
                "search.candidate_multiplier",
                "Candidate multiplier must be greater than 0",
            ));
        }

        if config.search.min_candidates == 0 {
            errors.push(ValidationError::new(
                "search.min_candidates",
                "Minimum candidates must be greater than 0",
            ));
        }
    }

    fn validate_ingest(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.ingest.chunk_size == 0 {
            errors.push(ValidationError::new(
                "ingest.chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        if config.ingest.chunk_overlap >= config.ingest.chunk_size {
            errors.push(ValidationError::new(
                "ingest.chunk_overlap",
                format!(
                    "Chunk overlap ({}) must be less than chunk size ({})",
                    config.ingest.chunk_overlap, config.ingest.chunk_size
                ),
            ));
        }
    }
}

use docsearch::cli::{Cli, Commands, ConfigAction};
use docsearch::config::Config;
use docsearch::error::{DocsearchError, Result};
use docsearch::ingest::IngestRequest;
use docsearch::retrieval::{SearchMode, SearchRequest};
use docsearch::server::{self, Collaborators};
use std::path::{Path, PathBuf};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Handle commands
    match cli.command {
        Commands::Serve { bind } => {
            cmd_serve(cli.config, bind).await?;
        }
        Commands::Search {
            query,
            mode,
            top_k,
            json,
        } => {
            cmd_search(cli.config, &query, mode, top_k, json).await?;
        }
        Commands::Ingest {
            file,
            doc_id,
            index,
        } => {
            cmd_ingest(cli.config, &file, doc_id, index).await?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docsearch=info"));

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn cmd_serve(config_path: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    tracing::info!("Starting docsearch server...");

    let config = load_config(config_path)?;
    let bind_addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());

    let collaborators = Collaborators::from_config(&config)?;
    let state = server::build_state(&config, collaborators)?;

    server::serve(state, &bind_addr).await
}

async fn cmd_search(
    config_path: Option<PathBuf>,
    query: &str,
    mode: SearchMode,
    top_k: usize,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let state = server::build_state(&config, Collaborators::from_config(&config)?)?;

    let request = SearchRequest::new(query, top_k);
    let response = state.search.search(mode, &request).await?;

    if json {
        let out = serde_json::to_string_pretty(&response).map_err(|e| DocsearchError::Json {
            source: e,
            context: "Failed to serialize search response".to_string(),
        })?;
        println!("{}", out);
        return Ok(());
    }

    if response.is_empty() {
        println!("No results");
        return Ok(());
    }

    println!("{} results ({} search)", response.len(), mode);
    for (i, result) in response.results.iter().enumerate() {
        let text = result
            .text_field(&config.opensearch.text_field)
            .unwrap_or_default();
        println!(
            "\n{}. {} #{} (score {:.4})",
            i + 1,
            result.doc_id,
            result.chunk_index,
            result.score
        );
        println!("   {}", preview(text, 200));
    }

    Ok(())
}

async fn cmd_ingest(
    config_path: Option<PathBuf>,
    file: &Path,
    doc_id: Option<String>,
    index: Option<String>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let state = server::build_state(&config, Collaborators::from_config(&config)?)?;

    let text = std::fs::read_to_string(file).map_err(|e| DocsearchError::Io {
        source: e,
        context: format!("Failed to read document: {:?}", file),
    })?;

    let mut request = IngestRequest::new(text);
    request.doc_id = doc_id;
    request.index_name = index;
    if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
        request
            .metadata
            .insert("file_name".to_string(), serde_json::Value::from(name));
    }

    let response = state.ingest.ingest(request).await?;

    println!(
        "✓ Indexed {} chunks of {} into '{}'",
        response.chunks_indexed, response.doc_id, response.index_name
    );
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let out = toml::to_string_pretty(&config)?;
            println!("{}", out);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| DocsearchError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'docsearch config init' to create one."
        );
        return Config::from_env();
    }

    Config::load(&path)
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    match flat.char_indices().nth(max_chars) {
        Some((offset, _)) => format!("{}...", &flat[..offset]),
        None => flat,
    }
}

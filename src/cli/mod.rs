//! CLI command definitions and parsing
use crate::retrieval::SearchMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "docsearch",
    version,
    about = "Document ingestion and hybrid retrieval over OpenSearch",
    long_about = "docsearch indexes text documents into OpenSearch and serves vector, keyword, \
                  engine-native hybrid and cross-encoder reranked hybrid search over HTTP."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/docsearch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to listen on (overrides server.bind_addr)
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Run a single search and print the results
    Search {
        /// Search query text
        query: String,

        /// Retrieval mode: vector, keyword, hybrid or hybrid-reranked
        #[arg(short, long, default_value = "hybrid-reranked")]
        mode: SearchMode,

        /// Maximum number of results to return
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Chunk, embed and index a text file
    Ingest {
        /// Text file to index
        file: PathBuf,

        /// Document ID (defaults to a random UUID)
        #[arg(long)]
        doc_id: Option<String>,

        /// Target index (defaults to search.index_name)
        #[arg(short, long)]
        index: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Validate a configuration file
    Validate {
        /// Config file to validate (defaults to the global config path)
        file: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tagsearch",
    version,
    about = "Keyword-tagged report search with exact, fuzzy, BM25 and hybrid strategies",
    long_about = "Tagsearch serves free-text queries over a CSV corpus of keyword-tagged records. \
                  Each search version selects a strategy: exact keyword match, lemma-reduced match, \
                  edit-distance correction, bigram expansion, BM25 ranking, or a hybrid of BM25 \
                  and embedding similarity."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/tagsearch/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP search server
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Run one search against a freshly loaded corpus
    Query {
        /// Search query text
        query: String,

        /// Search version (v0, v1, v1.1, v1.2, v1.3, v1.4, v2, v2.1)
        #[arg(short, long = "strategy-version", default_value = "v2")]
        strategy: String,

        /// Print the response envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show corpus snapshot statistics
    Stats,

    /// Build a bigram suggestion table from a reference text
    Bigrams {
        /// Plain-text input
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON table
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_query_defaults_to_bm25() {
        let cli = Cli::try_parse_from(["tagsearch", "query", "network security"]).unwrap();
        match cli.command {
            Commands::Query {
                query,
                strategy,
                json,
            } => {
                assert_eq!(query, "network security");
                assert_eq!(strategy, "v2");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tagsearch",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--config",
            "/etc/tagsearch.toml",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/tagsearch.toml")));
        assert!(matches!(cli.command, Commands::Serve { bind: Some(b) } if b == "0.0.0.0:9000"));
    }
}

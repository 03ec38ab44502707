use std::path::{Path, PathBuf};
use tagsearch::cli::{Cli, Commands, ConfigAction};
use tagsearch::config::Config;
use tagsearch::corpus::{CorpusSource, Snapshot, SnapshotBuilder};
use tagsearch::error::{Result, TagsearchError};
use tagsearch::retrieval::{SearchEngine, SearchResponse, Strategy, UnknownStrategy};
use tagsearch::server::{self, AppState};
use tagsearch::suggest::BigramTable;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Serve { bind } => {
            cmd_serve(cli.config.as_deref(), bind)?;
        }
        Commands::Query {
            query,
            strategy,
            json,
        } => {
            cmd_query(cli.config.as_deref(), &query, &strategy, json)?;
        }
        Commands::Stats => {
            cmd_stats(cli.config.as_deref())?;
        }
        Commands::Bigrams { input, output } => {
            cmd_bigrams(&input, &output)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config.as_deref(), action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "tagsearch=debug" } else { "tagsearch=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_serve(config_path: Option<&Path>, bind: Option<String>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    tracing::info!("Loading corpus from {}", config.corpus.reports_path.display());
    let state = AppState::from_config(&config)?;

    let runtime = tokio::runtime::Runtime::new().map_err(|e| TagsearchError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })?;
    runtime.block_on(server::run(&bind, state))
}

/// Load one snapshot plus the collaborators needed to query it
fn load_snapshot(config: &Config) -> Result<(Snapshot, SearchEngine)> {
    let embedder = tagsearch::embedding::from_config(&config.embedding)?;
    let builder = SnapshotBuilder::new(CorpusSource::from_config(&config.corpus), embedder.clone());
    let snapshot = builder.build(1)?;
    let engine = SearchEngine::from_config(config, embedder)?;
    Ok((snapshot, engine))
}

fn cmd_query(config_path: Option<&Path>, query: &str, version: &str, json: bool) -> Result<()> {
    let strategy: Strategy = version
        .parse()
        .map_err(|e: UnknownStrategy| TagsearchError::Other(e.into()))?;
    let config = Config::load_or_default(config_path)?;
    let (snapshot, engine) = load_snapshot(&config)?;

    let outcome = engine.search(&snapshot, strategy, query);
    let response = SearchResponse::from_outcome(&snapshot, &outcome);

    if json {
        let body = serde_json::to_string_pretty(&response).map_err(|e| TagsearchError::Json {
            source: e,
            context: "Failed to serialize search response".to_string(),
        })?;
        println!("{}", body);
        return Ok(());
    }

    if let Some(error) = &response.error {
        println!("Query '{}': embedding unavailable ({})", response.query, error.reason);
        return Ok(());
    }

    println!(
        "Query '{}' ({}): {} result(s)",
        response.query, strategy, response.total
    );
    let id_column = &config.corpus.id_column;
    for hit in outcome.hits() {
        let id = snapshot
            .record(hit.position)
            .and_then(|record| record.field(id_column))
            .unwrap_or("-");
        match hit.score {
            Some(score) => println!("  {}\t{:.4}", id, score),
            None => println!("  {}", id),
        }
    }

    Ok(())
}

fn cmd_stats(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let (snapshot, _) = load_snapshot(&config)?;
    let stats = snapshot.stats();

    println!("Corpus statistics");
    if let Some(source) = &stats.source {
        println!("  Source:            {}", source.display());
    }
    println!("  Records:           {}", stats.records);
    println!("  Malformed rows:    {}", stats.malformed_rows);
    println!("  Vocabulary:        {}", stats.vocabulary);
    match stats.semantic_keywords {
        Some(count) => println!("  Embedded keywords: {}", count),
        None => println!("  Embedded keywords: unavailable"),
    }
    println!("  Fingerprint:       {}", stats.fingerprint);

    Ok(())
}

fn cmd_bigrams(input: &Path, output: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input).map_err(|e| TagsearchError::Io {
        source: e,
        context: format!("Failed to read {}", input.display()),
    })?;

    let table = BigramTable::from_text(&text);
    table.save(output)?;

    println!(
        "✓ Bigram table with {} tokens written to {}",
        table.len(),
        output.display()
    );
    Ok(())
}

fn cmd_config(config_path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| TagsearchError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = resolve_config_path(file.as_deref().or(config_path))?;
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Corpus:         {}", config.corpus.reports_path.display());
            println!("  Embedding:      {}", config.embedding.backend);
        }
        ConfigAction::Init { force } => {
            let path = resolve_config_path(config_path)?;

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn resolve_config_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path(),
    }
}

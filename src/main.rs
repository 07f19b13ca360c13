//! renter-aid — search renting law from the command line.
//!
//! Usage:
//!   renter-aid search "no hot water" --top-k 3
//!   renter-aid search "noise" --ingest https://example.org/page
//!   renter-aid ingest https://example.org/page
//!   renter-aid sources

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use renter_aid_config::Settings;
use renter_aid_knowledge::{law_sources, CaseCategory};
use renter_aid_llm::{LlmClient, TextGenerator};
use renter_aid_retriever::expander::QueryExpander;
use renter_aid_retriever::{LawRetriever, PageIngestor};

/// Fetch timeout for runtime ingestion.
const INGEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "renter-aid", about = "Renting law retrieval for Victorian renters")]
struct Cli {
    /// Settings file (YAML). Environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the LLM and expand queries with the built-in synonym table.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank law sources against a query.
    Search {
        query: String,

        /// Maximum number of results (defaults to the configured top_k).
        #[arg(long)]
        top_k: Option<usize>,

        /// Advisory issue category, e.g. repairs_urgent.
        #[arg(long)]
        category: Option<CaseCategory>,

        /// Pages to ingest before searching.
        #[arg(long = "ingest", value_name = "URL")]
        ingest: Vec<String>,
    },
    /// Fetch a page and show what would be added to the corpus.
    Ingest { url: String },
    /// List the curated static sources.
    Sources,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn build_retriever(settings: &Settings, offline: bool) -> Result<LawRetriever> {
    let generator: Option<Arc<dyn TextGenerator>> = if offline {
        None
    } else {
        let client = LlmClient::from_settings(&settings.llm).context("failed to build LLM client")?;
        info!(mode = ?client.mode(), model = %settings.llm.model, "query expansion enabled");
        Some(Arc::new(client))
    };
    let expander = QueryExpander::with_settings(generator, &settings.retrieval);
    Ok(LawRetriever::new(expander))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    match cli.command {
        Command::Search {
            query,
            top_k,
            category,
            ingest,
        } => {
            let retriever = build_retriever(&settings, cli.offline)?;
            if !ingest.is_empty() {
                let ingestor = PageIngestor::new(INGEST_TIMEOUT)?;
                for url in &ingest {
                    if let Err(e) = ingestor.ingest(&retriever, url).await {
                        warn!("skipping {url}: {e}");
                    }
                }
            }

            let top_k = top_k.unwrap_or(settings.retrieval.default_top_k);
            let context = retriever.retrieve(&query, category, top_k).await;
            info!(strategy = ?context.strategy, "search complete");
            println!("{}", serde_json::to_string_pretty(&context.results)?);
        }
        Command::Ingest { url } => {
            let retriever = build_retriever(&settings, true)?;
            let ingestor = PageIngestor::new(INGEST_TIMEOUT)?;
            let response = ingestor
                .ingest(&retriever, &url)
                .await
                .with_context(|| format!("failed to ingest {url}"))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Sources => {
            for source in law_sources() {
                println!("{}  {}\n    {}", source.as_of, source.title, source.url);
                for point in source.bullet_points {
                    println!("    - {point}");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_search_with_category() {
        let cli = Cli::try_parse_from([
            "renter-aid",
            "search",
            "no hot water",
            "--top-k",
            "3",
            "--category",
            "repairs_urgent",
            "--ingest",
            "https://example.org/a",
        ])
        .unwrap();
        match cli.command {
            Command::Search {
                query,
                top_k,
                category,
                ingest,
            } => {
                assert_eq!(query, "no hot water");
                assert_eq!(top_k, Some(3));
                assert_eq!(category, Some(CaseCategory::RepairsUrgent));
                assert_eq!(ingest, vec!["https://example.org/a".to_string()]);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn rejects_unknown_category() {
        assert!(Cli::try_parse_from(["renter-aid", "search", "q", "--category", "parking"]).is_err());
    }

    #[test]
    fn offline_retriever_builds_without_llm() {
        let settings = Settings::default();
        let retriever = build_retriever(&settings, true).unwrap();
        assert_eq!(retriever.corpus_len(), law_sources().len());
    }

    #[test]
    fn config_flag_loads_yaml() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retrieval:\n  default_top_k: 2").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["renter-aid", "--config", &path, "sources"]).unwrap();
        let settings = Settings::from_file(cli.config.as_deref().unwrap()).unwrap();
        assert_eq!(settings.retrieval.default_top_k, 2);
    }
}

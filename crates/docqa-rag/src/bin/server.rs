//! Document Q&A server binary
//!
//! Run with: cargo run -p docqa-rag --bin docqa-rag-server -- --config docqa.toml

use clap::Parser;
use docqa_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "docqa-rag-server", version, about = "Document Q&A server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = RagConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if args.print_config {
        let mut shown = config.clone();
        if shown.llm.api_key.is_some() {
            shown.llm.api_key = Some("<redacted>".to_string());
        }
        println!("{}", toml::to_string_pretty(&shown)?);
        return Ok(());
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Storage root: {}", config.storage.root.display());
    tracing::info!("  - Embeddings: {:?} ({}, {} dims)", config.embeddings.provider, config.embeddings.model, config.embeddings.dimensions);
    tracing::info!("  - LLM: {:?} ({} at {})", config.llm.provider, config.llm.generate_model, config.llm.base_url);
    tracing::info!("  - Chunk size: {} chars", config.chunking.chunk_size);
    tracing::info!("  - Distance: {:?}", config.storage.distance);

    let server = RagServer::new(config).await?;

    let state = server.state();
    match state.assistant().llm().health_check().await {
        Ok(true) => tracing::info!("LLM provider is reachable"),
        _ => tracing::warn!(
            "LLM provider {} not reachable; uploads work but answers will fail until it is",
            state.assistant().llm().name()
        ),
    }
    if !state.store().embedder().health_check().await.unwrap_or(false) {
        tracing::warn!("Embedding provider {} not reachable", state.store().embedder().name());
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/v1/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

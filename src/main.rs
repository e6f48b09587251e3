use anyhow::Context;
use clap::Parser;
use docsearch::{
    api, chat::OllamaChatClient, config, logging, search::SearchService, store::FsDocumentStore,
};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Document search assistant: upload files, then search them with an LLM relevance judge.
#[derive(Parser)]
#[command(name = "docsearch", version)]
struct Cli {
    /// Port to listen on (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
    /// Directory holding uploaded documents (overrides `DOCUMENTS_DIR`).
    #[arg(long)]
    documents_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    config::init_config(|config| {
        if let Some(port) = cli.port {
            config.server_port = port;
        }
        if let Some(dir) = cli.documents_dir {
            config.documents_dir = dir;
        }
    })
    .context("Failed to load config from environment")?;
    let config = config::get_config();
    logging::init_tracing(config.log_file.as_deref());
    config.log_loaded();

    let store = FsDocumentStore::open(&config.documents_dir).with_context(|| {
        format!(
            "Failed to prepare document directory {}",
            config.documents_dir.display()
        )
    })?;
    let client = OllamaChatClient::from_config(config).context("Failed to build chat client")?;
    tracing::info!(
        model = %config.chat_model,
        ollama_url = %config.ollama_url,
        documents_dir = %config.documents_dir.display(),
        "Search service initialized"
    );
    let service = Arc::new(SearchService::new(Arc::new(store), Arc::new(client)));
    let app = api::create_router(service, config.max_upload_bytes);

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.server_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.server_port))?;
    tracing::info!("Listening on http://0.0.0.0:{}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

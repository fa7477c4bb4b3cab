use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

use listing_import::config::{apply_env_overrides, load_config};
use listing_import::mcp::server::ImportMcpServer;
use listing_import::pipeline::importer::ListingImporter;

fn find_config_path() -> PathBuf {
    // Check common locations for config file
    let candidates = [
        PathBuf::from("config.yaml"),
        dirs_next().join("config.yaml"),
    ];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn dirs_next() -> PathBuf {
    // Look in the directory where the binary is
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting listing-import server");

    let config_path = find_config_path();
    let mut config = load_config(&config_path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    if config.browser.enabled && !cfg!(feature = "browser") {
        tracing::warn!("Browser fetch requested but this build lacks the `browser` feature");
    }
    if config.ai.enabled && config.ai.api_key.is_none() {
        tracing::warn!(
            "AI fallback enabled without {}; imports needing it will fail",
            listing_import::config::GEMINI_API_KEY_ENV
        );
    }

    let importer = ListingImporter::from_config(&config)?;
    let server = ImportMcpServer::new(Arc::new(importer));

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}

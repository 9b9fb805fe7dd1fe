//! Server binary for doculens.
//!
//! A thin shim over the library crate: load configuration, build the
//! analyzer and router, serve until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use doculens::{Analyzer, AppConfig};
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"ENDPOINTS:
  POST /api/v1/analyze       multipart file + optional language  -> full analysis
  POST /api/v1/extract-text  multipart file                      -> OCR-style text
  POST /api/v1/describe      multipart file + optional language  -> description
  POST /api/v1/query         multipart file + query + language   -> answer
  GET  /health               liveness

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY          Vision-model API key (required)
  DOCULENS_MODEL             Model id (default: claude-sonnet-4-5-20250929)
  DOCULENS_API_BASE_URL      Provider base URL
  DOCULENS_MAX_UPLOAD_MB     Upload ceiling in MB (default: 20)
  DOCULENS_MAX_PDF_PAGES     PDF page cap (default: 20)
  DOCULENS_MAX_IMAGE_DIM     Longest image edge in px (default: 1568)
  DOCULENS_MAX_TOKENS        Max model output tokens (default: 4096)
  DOCULENS_API_TIMEOUT_SECS  Provider call timeout (default: 120)
  DOCULENS_CONNECT_TIMEOUT_SECS  Provider connect timeout (default: 10)

SETUP:
  1. Set the API key:  export ANTHROPIC_API_KEY=sk-ant-...
  2. Run the server:   doculens --port 8000
  3. Analyze a file:   curl -F file=@invoice.pdf localhost:8000/api/v1/extract-text

  PDF rasterisation needs the pdfium shared library, either installed
  system-wide or placed next to the binary.
"#;

/// Vision-model analysis service for images, PDFs, and Word documents.
#[derive(Parser, Debug)]
#[command(
    name = "doculens",
    version,
    about = "Analyze uploaded documents and images with a vision language model",
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "DOCULENS_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "DOCULENS_PORT", default_value_t = 8000)]
    port: u16,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCULENS_VERBOSE")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A local .env is a convenience for development; absence is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        model = %config.model,
        max_upload_mb = config.max_upload_bytes / 1024 / 1024,
        max_pdf_pages = config.max_pdf_pages,
        max_image_dim = config.max_image_dim,
        "configuration loaded"
    );

    let analyzer = Arc::new(Analyzer::new(config).context("Failed to build analyzer")?);
    let app = doculens::api::router(analyzer);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "server ready and accepting connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Resolve on Ctrl+C (SIGINT) or SIGTERM so in-flight requests can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

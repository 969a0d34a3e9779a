//! CLI binary for the kokorod synthesis server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use kokorod::server::HttpServer;
use kokorod::server::types::HealthResponse;
use kokorod::tts::voices::VOICE_CATALOG;
use kokorod::{ServerConfig, startup};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Local Kokoro-82M text-to-speech HTTP server.
#[derive(Parser)]
#[command(name = "kokorod", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind/check host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind/check port.
    #[arg(long)]
    port: Option<u16>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Download the model if needed, then serve until Ctrl-C.
    Serve,

    /// Poll the server's /health endpoint until it answers or a deadline passes.
    Check {
        /// Seconds to keep retrying before giving up.
        #[arg(long, default_value_t = 5)]
        wait_secs: u64,
    },

    /// List the published voice catalog.
    Voices,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Suppress noisy dependency logs by default; RUST_LOG overrides.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kokorod=info,ort=warn,hf_hub=warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_serve(config).await,
        Command::Check { wait_secs } => run_check(&config, wait_secs).await,
        Command::Voices => {
            for name in VOICE_CATALOG {
                println!("{name}");
            }
            Ok(())
        }
    }
}

/// Load config from `--config`, else the default path if present, else defaults.
fn load_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = if let Some(ref path) = cli.config {
        ServerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
    } else {
        let default_path = ServerConfig::default_config_path();
        if default_path.exists() {
            ServerConfig::from_file(&default_path)
                .with_context(|| format!("failed to load config {}", default_path.display()))?
        } else {
            ServerConfig::default()
        }
    };

    if let Some(ref host) = cli.host {
        config.http.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.http.port = port;
    }
    Ok(config)
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    println!("kokorod v{}", env!("CARGO_PKG_VERSION"));

    // Phase 1: download & load the model before binding the port.
    let service = startup::initialize_engine(&config).await?;

    // Phase 2: serve.
    let server = HttpServer::start(Arc::new(service), &config.http).await?;
    println!(
        "\nListening on http://{} — open it in a browser to try the test page. \
         Press Ctrl+C to stop.\n",
        server.addr()
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C, shutting down...");
    server.shutdown();

    Ok(())
}

/// The startup smoke check: wait for /health to answer on the configured port.
async fn run_check(config: &ServerConfig, wait_secs: u64) -> anyhow::Result<()> {
    let url = format!("http://{}:{}/health", config.http.host, config.http.port);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
        .context("failed to build HTTP client")?;

    let deadline = Instant::now() + Duration::from_secs(wait_secs);
    loop {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let health: HealthResponse =
                    resp.json().await.context("malformed /health response")?;
                println!(
                    "{} — status={}, voice={}, up {}s",
                    url, health.status, health.voice, health.uptime_secs
                );
                return Ok(());
            }
            Ok(resp) => info!("health check: HTTP {}", resp.status()),
            Err(e) => info!("health check: {e}"),
        }

        if Instant::now() >= deadline {
            anyhow::bail!(
                "no server listening on {}:{} after {wait_secs}s — if one should be \
                 running, stop any stale instance and start it again",
                config.http.host,
                config.http.port,
            );
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}

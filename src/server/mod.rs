//! HTTP surface of the synthesis server.
//!
//! ## Endpoints
//!
//! - `GET /` — HTML test page
//! - `POST /tts` — synthesize text, returns `audio/wav`
//! - `GET /health` — liveness + readiness
//! - `GET /voices` — voice catalog

pub mod page;
mod routes;
pub mod types;

use crate::config::HttpConfig;
use crate::error::{Result, SynthError};
use crate::tts::SharedSynthesizer;
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

/// Shared state for axum handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The synthesis engine behind its trait seam.
    pub synth: SharedSynthesizer,
    /// When the server started serving, for uptime reporting.
    pub started: Instant,
}

/// The running HTTP server.
///
/// Serves from a background task; the task is aborted on [`shutdown`]
/// (or drop), which releases the port.
///
/// [`shutdown`]: HttpServer::shutdown
pub struct HttpServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl HttpServer {
    /// Bind `{config.host}:{config.port}` and begin serving.
    ///
    /// Port 0 auto-assigns; the bound address is available via [`Self::addr`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(synth: SharedSynthesizer, config: &HttpConfig) -> Result<Self> {
        let state = AppState {
            synth,
            started: Instant::now(),
        };

        let app = Router::new()
            .route("/", get(routes::handle_index))
            .route("/tts", post(routes::handle_synthesize))
            .route("/health", get(routes::handle_health))
            .route("/voices", get(routes::handle_voices))
            .with_state(state);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                SynthError::Server(format!(
                    "{bind_addr} is already in use — a stale server instance is likely \
                     still running; stop it and retry"
                ))
            } else {
                SynthError::Server(format!("failed to bind {bind_addr}: {e}"))
            }
        })?;

        let addr = listener
            .local_addr()
            .map_err(|e| SynthError::Server(format!("failed to get local addr: {e}")))?;

        info!("synthesis server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// The address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Stop serving and release the port.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

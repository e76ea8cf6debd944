//! Fixture web server
//!
//! Serves the static pages and the sample download that scenarios point
//! the browser at.

pub mod pages;

pub use pages::sample_payload;

use std::net::SocketAddr;

use tokio::task::JoinHandle;
use tracing::info;

use crate::harness::HarnessError;

/// Local HTTP server the scenarios navigate against. Binds an ephemeral
/// localhost port so parallel test processes never collide.
pub struct FixtureServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl FixtureServer {
    pub async fn start() -> Result<Self, HarnessError> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = pages::router();
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Fixture server stopped: {}", e);
            }
        });
        info!("Fixture server listening on http://{}", addr);
        Ok(Self { addr, task })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

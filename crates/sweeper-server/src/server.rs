//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Binds the configured address/port.
//! - Spawns the single session task that owns the game.
//! - Accepts TCP connections and spawns one task per connection.
//! - Stops accepting when the session closes or shutdown is requested.
//!
//! The per-connection logic and the session loop live in `client`
//! and `session_task` respectively.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use sweeper_core::Session;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::client;
use crate::config::Config;
use crate::session_task;
use crate::types::{SessionRequest, SESSION_QUEUE_CAPACITY};

/// Back-off after a failed `accept`, so persistent errors (e.g. out of
/// file descriptors) do not spin.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A bound listener plus the session it will serve.
///
/// The listener is owned here and released when the server is dropped,
/// whichever way `run_until` exits.
pub struct Server {
    listener: TcpListener,
    session: Session,
    config: Config,
}

impl Server {
    /// Validate the game settings and bind the listening socket.
    pub async fn bind(config: Config) -> Result<Self> {
        let session = Session::new(config.session_config()).context("invalid game configuration")?;
        Server::with_session(config, session).await
    }

    /// Bind using a pre-built session (e.g. one with a fixed mine layout).
    pub async fn with_session(config: Config, session: Session) -> Result<Self> {
        let addr = config.socket_addr_string();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        Ok(Server {
            listener,
            session,
            config,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("listener has no local address")
    }

    /// Serve until `shutdown` resolves or the session closes itself.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let Server {
            listener,
            session,
            config,
        } = self;
        let settings = config.connection_settings();

        // Channel from connections → session task.
        let (session_tx, session_rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        let (closed_tx, mut closed_rx) = watch::channel(false);
        let client_closed = closed_rx.clone();

        let session_handle = tokio::spawn(session_task::run_session_loop(
            session,
            session_rx,
            closed_tx,
        ));

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(peer = %peer, "accepted connection");
                        let session_tx = session_tx.clone();
                        let settings = settings.clone();
                        let closed = client_closed.clone();
                        tokio::spawn(async move {
                            if let Err(e) = client::run_client(stream, peer, session_tx, settings, closed).await {
                                warn!(peer = %peer, error = %e, "connection error");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
                _ = closed_rx.changed() => {
                    info!("session closed, no longer accepting connections");
                    break;
                }
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    let _ = session_tx.send(SessionRequest::Shutdown).await;
                    break;
                }
            }
        }

        drop(listener);
        drop(session_tx);

        if let Err(e) = session_handle.await {
            error!(error = %e, "session task failed");
        }
        Ok(())
    }
}

/// Bind per `config` and serve until Ctrl+C.
pub async fn run(config: Config) -> Result<()> {
    let server = Server::bind(config).await?;
    info!(addr = %server.local_addr()?, "listening");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "cannot listen for Ctrl+C, running until the session closes");
                std::future::pending::<()>().await;
            }
        })
        .await
}

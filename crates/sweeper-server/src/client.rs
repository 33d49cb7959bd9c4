// crates/sweeper-server/src/client.rs

//! Per-connection I/O.
//!
//! Lifecycle of one socket:
//! 1. optional password line, bounded by the login timeout and by the
//!    session closing,
//! 2. join request to the session (rejection: one line, then close),
//! 3. a writer task draining the player's outbound queue onto the socket,
//!    while this task reads lines and forwards decoded commands,
//! 4. on `QUIT`, EOF, read error or writer failure (including a write
//!    stalled past the write timeout, or the session dropping the queue):
//!    send `Quit` to the session. That is the only way a player leaves.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use sweeper_core::{Command, Event, PlayerId};
use sweeper_protocol::{format_event, parse_command_line};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::types::{ConnectionSettings, OutboundRx, SessionRequest, SessionTx};

/// How long to let the writer flush queued events after the player left.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run the I/O loop for a single connection.
pub async fn run_client(
    stream: TcpStream,
    peer: SocketAddr,
    session_tx: SessionTx,
    settings: ConnectionSettings,
    mut closed: watch::Receiver<bool>,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    if let Some(expected) = settings.password.as_deref() {
        let offered = tokio::select! {
            read = timeout(settings.login_timeout, lines.next_line()) => match read {
                Ok(line) => line.context("reading password")?,
                Err(_) => {
                    info!(peer = %peer, "no password before login timeout");
                    let _ = write_half.shutdown().await;
                    return Ok(());
                }
            },
            _ = async { closed.wait_for(|done| *done).await.map(|_| ()) } => {
                debug!(peer = %peer, "session closed during login");
                let _ = write_half.shutdown().await;
                return Ok(());
            }
        };
        if offered.as_deref().map(str::trim) != Some(expected) {
            warn!(peer = %peer, "wrong password");
            write_event(&mut write_half, &Event::PasswordRejected).await?;
            let _ = write_half.shutdown().await;
            return Ok(());
        }
        write_event(&mut write_half, &Event::PasswordAccepted).await?;
    }

    let (out_tx, out_rx) = mpsc::channel(settings.outbound_capacity);
    let (reply_tx, reply_rx) = oneshot::channel();
    session_tx
        .send(SessionRequest::Join {
            outbound: out_tx,
            reply: reply_tx,
        })
        .await
        .context("session is no longer running")?;

    let player = match reply_rx.await.context("session dropped the join request")? {
        Ok(player) => player,
        Err(rejection) => {
            info!(peer = %peer, reason = %rejection, "join rejected");
            write_event(&mut write_half, &Event::from(rejection)).await?;
            let _ = write_half.shutdown().await;
            return Ok(());
        }
    };
    debug!(player = %player, peer = %peer, "connection bound to player");

    let mut writer = tokio::spawn(run_writer(write_half, out_rx, settings.write_timeout));

    let writer_finished = tokio::select! {
        result = run_reader(&mut lines, player, &session_tx) => {
            if let Err(e) = result {
                debug!(player = %player, error = %e, "read failed");
            }
            false
        }
        result = &mut writer => {
            match result {
                Ok(Err(e)) => debug!(player = %player, error = %e, "write failed"),
                Err(e) => warn!(player = %player, error = %e, "writer task panicked"),
                Ok(Ok(())) => debug!(player = %player, "outbound closed by session"),
            }
            true
        }
    };

    // Sole disconnect path; the session may already be gone.
    let _ = session_tx
        .send(SessionRequest::Command {
            player,
            command: Command::Quit,
        })
        .await;

    // The session drops our sender on quit, so the writer ends after
    // flushing whatever is still queued.
    if !writer_finished && timeout(DRAIN_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
    }

    info!(player = %player, peer = %peer, "disconnected");
    Ok(())
}

/// Read lines and forward decoded commands until `QUIT`, EOF or error.
async fn run_reader(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    player: PlayerId,
    session_tx: &SessionTx,
) -> io::Result<()> {
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_command_line(trimmed) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                debug!(player = %player, ?command, "received");
                let req = SessionRequest::Command { player, command };
                if session_tx.send(req).await.is_err() {
                    debug!("session channel closed");
                    break;
                }
            }
            Err(e) => {
                warn!(player = %player, line = %trimmed, error = %e, "ignoring malformed line");
            }
        }
    }
    Ok(())
}

/// Drain the outbound queue onto the socket, one line per event.
///
/// Each batch is flushed as a whole. Every individual write must make
/// progress within `write_timeout`.
async fn run_writer(
    stream: OwnedWriteHalf,
    mut out_rx: OutboundRx,
    write_timeout: Duration,
) -> io::Result<()> {
    let mut stream = BufWriter::new(stream);
    while let Some(batch) = out_rx.recv().await {
        for event in &batch {
            let mut line = format_event(event);
            line.push('\n');
            within(write_timeout, stream.write_all(line.as_bytes())).await?;
        }
        within(write_timeout, stream.flush()).await?;
    }
    stream.shutdown().await
}

async fn within<F>(limit: Duration, write: F) -> io::Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    match timeout(limit, write).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "peer stalled")),
    }
}

async fn write_event(stream: &mut OwnedWriteHalf, event: &Event) -> io::Result<()> {
    let mut line = format_event(event);
    line.push('\n');
    stream.write_all(line.as_bytes()).await?;
    stream.flush().await
}

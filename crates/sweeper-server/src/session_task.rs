//! Central session loop.
//!
//! This task owns the `Session` and the map from player to outbound
//! channel, and processes every `SessionRequest` coming from
//! connections one at a time. That makes it the single writer for the
//! board, the roster and the turn order.
//!
//! Routing policy:
//! - rejections, query replies, `WAITING_FOR_PLAYERS`, `SCORE_UPDATE`
//!   and `CURRENT_PLAYER_NUMBER`: sent **only** to the originating player.
//! - everything else: broadcast to **all** joined players.
//!
//! The events one request produces reach each player as a single
//! batch. Delivery uses `try_send`. A player whose queue is full is evicted:
//! its sender is dropped, its writer drains and exits, and the
//! connection then comes back through the normal quit path.

use std::collections::HashMap;

use sweeper_core::{Command, Event, PlayerId, Session};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::types::{OutboundBatch, OutboundTx, SessionRequest, SessionRx};

type Registry = HashMap<PlayerId, OutboundTx>;

/// Run the central session processing loop.
///
/// - `requests`: receives requests from all connection tasks.
/// - `closed`: set to `true` once the session stops, so the accept loop
///   can stop too.
pub async fn run_session_loop(
    mut session: Session,
    mut requests: SessionRx,
    closed: watch::Sender<bool>,
) {
    let mut clients: Registry = HashMap::new();

    while let Some(req) = requests.recv().await {
        match req {
            SessionRequest::Join { outbound, reply } => match session.join() {
                Ok((player, events)) => {
                    clients.insert(player, outbound);
                    if reply.send(Ok(player)).is_err() {
                        // Connection vanished while waiting for its seat.
                        clients.remove(&player);
                        let events = session.quit(player);
                        route_events(Some(player), events, &mut clients);
                    } else {
                        info!(player = %player, players = session.roster().len(), "player joined");
                        route_events(Some(player), events, &mut clients);
                    }
                }
                Err(rejection) => {
                    debug!(reason = %rejection, "join rejected");
                    let _ = reply.send(Err(rejection));
                }
            },
            SessionRequest::Command { player, command } => {
                if command == Command::Quit && clients.remove(&player).is_some() {
                    info!(player = %player, "player left");
                }
                let events = session.process(player, command);
                route_events(Some(player), events, &mut clients);
            }
            SessionRequest::Shutdown => {
                info!("session shutting down");
                let events = session.shutdown();
                route_events(None, events, &mut clients);
            }
        }

        if session.is_closed() {
            break;
        }
    }

    // Dropping the senders ends every writer, which closes each socket.
    clients.clear();
    let _ = closed.send(true);
    info!("session loop finished");
}

/// Who receives an event.
enum Audience {
    Origin,
    Everyone,
}

fn audience(event: &Event) -> Audience {
    match event {
        Event::WaitingForPlayers { .. }
        | Event::ScoreUpdate(_)
        | Event::NotYourTurn
        | Event::RoundNotActive
        | Event::OutOfBounds { .. }
        | Event::AlreadyRevealed { .. }
        | Event::FlagRejected { .. }
        | Event::CurrentPlayerNumber(_)
        | Event::GameStartedStatus(_)
        | Event::ActivePlayerStatus(_)
        | Event::NeighborCount { .. }
        | Event::PlayerCount(_)
        | Event::ServerFull
        | Event::RoundInProgress
        | Event::PasswordAccepted
        | Event::PasswordRejected => Audience::Origin,

        Event::PlayersConnected(_)
        | Event::GameStarted
        | Event::TurnChanged(_)
        | Event::CellUpdate { .. }
        | Event::FlagUpdate { .. }
        | Event::GameOver(_)
        | Event::FinalScore { .. }
        | Event::PlayerQuit(_)
        | Event::PlayerHitMine(_)
        | Event::GameReset
        | Event::ServerClosing => Audience::Everyone,
    }
}

/// Split one request's events into per-player batches, keeping order,
/// and hand each player its batch in a single send.
///
/// `origin` is `None` for events with no requesting player; those can
/// only be broadcasts.
fn route_events(origin: Option<PlayerId>, events: Vec<Event>, clients: &mut Registry) {
    let mut batches: HashMap<PlayerId, OutboundBatch> = HashMap::new();
    for event in events {
        match audience(&event) {
            Audience::Origin => {
                if let Some(player) = origin.filter(|p| clients.contains_key(p)) {
                    batches.entry(player).or_default().push(event);
                }
            }
            Audience::Everyone => {
                for player in clients.keys() {
                    batches.entry(*player).or_default().push(event.clone());
                }
            }
        }
    }

    for (player, batch) in batches {
        let delivered = match clients.get(&player) {
            Some(tx) => deliver(player, tx, batch),
            None => continue,
        };
        if !delivered {
            clients.remove(&player);
        }
    }
}

/// Returns false when the player should be dropped from the registry.
fn deliver(player: PlayerId, tx: &OutboundTx, batch: OutboundBatch) -> bool {
    match tx.try_send(batch) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(player = %player, "outbound queue full, disconnecting slow client");
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!(player = %player, "outbound channel already closed");
            false
        }
    }
}

//! Shared types for the game TCP server.
//!
//! This module defines:
//! - channel aliases between connections and the session task
//! - `SessionRequest`: messages flowing from connections to the session
//! - `ConnectionSettings`: per-connection knobs taken from `Config`

use std::sync::Arc;
use std::time::Duration;

use sweeper_core::{Command, Event, JoinRejection, PlayerId};
use tokio::sync::{mpsc, oneshot};

/// Outbound events from the session to one connection.
///
/// One message is the whole batch a single request produced for that
/// player, so the bound counts requests the client is behind on, not
/// board cells. Bounded: the session never waits on a slow socket, it
/// evicts instead.
pub type OutboundBatch = Vec<Event>;
pub type OutboundTx = mpsc::Sender<OutboundBatch>;
pub type OutboundRx = mpsc::Receiver<OutboundBatch>;

pub type JoinReply = Result<PlayerId, JoinRejection>;

/// Message flowing from a connection task into the session task.
#[derive(Debug)]
pub enum SessionRequest {
    /// Ask for a seat. `outbound` is registered only if the join succeeds.
    Join {
        outbound: OutboundTx,
        reply: oneshot::Sender<JoinReply>,
    },

    Command { player: PlayerId, command: Command },

    /// Operator shutdown: broadcast `SERVER_CLOSING` and stop.
    Shutdown,
}

/// Channel from connections → session task.
pub type SessionTx = mpsc::Sender<SessionRequest>;
pub type SessionRx = mpsc::Receiver<SessionRequest>;

pub const SESSION_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// When set, the first line a client sends must match.
    pub password: Option<Arc<str>>,

    pub outbound_capacity: usize,

    /// A single socket write stalling longer than this drops the player.
    pub write_timeout: Duration,

    /// How long a new connection may take to send its password line.
    pub login_timeout: Duration,
}

//! Message types used by the game core.
//!
//! These are **transport-agnostic** logical messages:
//! - [`Command`]: what a connected player asks for.
//! - [`Event`]: what the session emits in response.
//!
//! Text encoding lives in the `sweeper-protocol` crate; who receives
//! which event (one player or all) is decided by the server.

use thiserror::Error;

use crate::cell::CellView;
use crate::player::PlayerId;

/// A decoded player intent.
///
/// Coordinates are signed so that negative input reaches the board and
/// is rejected as out of bounds instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ready,
    Move { x: i32, y: i32 },
    Flag { x: i32, y: i32, flagged: bool },
    Quit,

    /// Start a rematch once a round is over.
    Reset,

    // Queries. Answered to the asking player only, never change state.
    WhoAmI,
    IsGameStarted,
    IsCurrentPlayer,
    NeighborCount { x: i32, y: i32 },
    PlayerCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Won,
    Lost,
}

/// Something the session wants one or all players to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PlayersConnected(usize),
    WaitingForPlayers { ready: usize, total: usize },
    GameStarted,
    TurnChanged(PlayerId),
    CellUpdate { x: usize, y: usize, view: CellView },
    FlagUpdate { x: usize, y: usize, flagged: bool },
    GameOver(GameResult),
    FinalScore { player: PlayerId, score: i32 },
    PlayerQuit(PlayerId),
    PlayerHitMine(PlayerId),
    ScoreUpdate(i32),
    GameReset,
    ServerClosing,

    // Policy rejections.
    NotYourTurn,
    RoundNotActive,
    OutOfBounds { x: i32, y: i32 },
    AlreadyRevealed { x: i32, y: i32 },
    FlagRejected { x: i32, y: i32 },

    // Query replies.
    CurrentPlayerNumber(PlayerId),
    GameStartedStatus(bool),
    ActivePlayerStatus(bool),
    NeighborCount { x: usize, y: usize, count: u8 },
    PlayerCount(usize),

    // Connection lifecycle, emitted by the server before a player exists.
    ServerFull,
    RoundInProgress,
    PasswordAccepted,
    PasswordRejected,
}

/// Why a join was refused. The connection is closed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinRejection {
    #[error("server is full")]
    ServerFull,

    #[error("a round is already in progress")]
    RoundInProgress,
}

impl From<JoinRejection> for Event {
    fn from(rejection: JoinRejection) -> Self {
        match rejection {
            JoinRejection::ServerFull => Event::ServerFull,
            JoinRejection::RoundInProgress => Event::RoundInProgress,
        }
    }
}

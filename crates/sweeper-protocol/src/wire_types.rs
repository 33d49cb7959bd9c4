//! Wire tokens and constants.
//!
//! This module defines:
//! - the command tokens a client may send, with their arities,
//! - the event tokens the server writes back.
//!
//! The actual encode/decode logic lives in `text_codec`.

/// Command tokens (client → server).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandToken {
    Ready,
    Move,
    Flag,
    Quit,
    Reset,
    GetCurrentPlayerNumber,
    IsGameStarted,
    IsCurrentActivePlayer,
    RequestNeighboringMinesCount,
    UpdatePlayerCount,
}

impl CommandToken {
    /// Case-insensitive lookup of the first token on a line.
    pub fn from_token(token: &str) -> Option<Self> {
        ALL_COMMANDS
            .iter()
            .copied()
            .find(|command| command.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandToken::Ready => "READY",
            CommandToken::Move => "MOVE",
            CommandToken::Flag => "FLAG",
            CommandToken::Quit => "QUIT",
            CommandToken::Reset => "RESET",
            CommandToken::GetCurrentPlayerNumber => "GET_CURRENT_PLAYER_NUMBER",
            CommandToken::IsGameStarted => "IS_GAME_STARTED",
            CommandToken::IsCurrentActivePlayer => "IS_CURRENT_ACTIVE_PLAYER",
            CommandToken::RequestNeighboringMinesCount => "REQUEST_NEIGHBORING_MINES_COUNT",
            CommandToken::UpdatePlayerCount => "UPDATE_PLAYER_COUNT",
        }
    }

    /// Number of arguments following the token.
    pub fn arity(self) -> usize {
        match self {
            CommandToken::Move | CommandToken::RequestNeighboringMinesCount => 2,
            CommandToken::Flag => 3,
            _ => 0,
        }
    }
}

const ALL_COMMANDS: [CommandToken; 10] = [
    CommandToken::Ready,
    CommandToken::Move,
    CommandToken::Flag,
    CommandToken::Quit,
    CommandToken::Reset,
    CommandToken::GetCurrentPlayerNumber,
    CommandToken::IsGameStarted,
    CommandToken::IsCurrentActivePlayer,
    CommandToken::RequestNeighboringMinesCount,
    CommandToken::UpdatePlayerCount,
];

// Event tokens (server → client).
pub const PLAYERS_CONNECTED: &str = "PLAYERS_CONNECTED";
pub const WAITING_FOR_PLAYERS: &str = "WAITING_FOR_PLAYERS";
pub const GAME_STARTED: &str = "GAME_STARTED";
pub const TURN_CHANGED: &str = "TURN_CHANGED";
pub const CELL_UPDATE: &str = "CELL_UPDATE";
pub const FLAG_UPDATE: &str = "FLAG_UPDATE";
pub const GAMEOVER: &str = "GAMEOVER";
pub const FINAL_SCORE: &str = "FINAL_SCORE";
pub const PLAYER_QUIT: &str = "PLAYER_QUIT";
pub const PLAYER_HIT_MINE: &str = "PLAYER_HIT_MINE";
pub const SCORE_UPDATE: &str = "SCORE_UPDATE";
pub const GAME_RESET: &str = "GAME_RESET";
pub const SERVER_CLOSING: &str = "SERVER_CLOSING";

pub const NOT_YOUR_TURN: &str = "NOT_YOUR_TURN";
pub const ROUND_NOT_ACTIVE: &str = "ROUND_NOT_ACTIVE";
pub const OUT_OF_BOUNDS: &str = "OUT_OF_BOUNDS";
pub const ALREADY_REVEALED: &str = "ALREADY_REVEALED";
pub const FLAG_REJECTED: &str = "FLAG_REJECTED";

pub const CURRENT_PLAYER_NUMBER: &str = "CURRENT_PLAYER_NUMBER";
pub const IS_GAME_STARTED: &str = "IS_GAME_STARTED";
pub const IS_CURRENT_ACTIVE_PLAYER: &str = "IS_CURRENT_ACTIVE_PLAYER";
pub const NEIGHBORING_MINES_COUNT_RESPONSE: &str = "NEIGHBORING_MINES_COUNT_RESPONSE";
pub const UPDATE_PLAYER_COUNT: &str = "UPDATE_PLAYER_COUNT";

pub const SERVER_FULL: &str = "SERVER_FULL";
pub const ROUND_IN_PROGRESS: &str = "ROUND_IN_PROGRESS";
pub const PASSWORD_ACCEPTED: &str = "PASSWORD_ACCEPTED";
pub const PASSWORD_REJECTED: &str = "PASSWORD_REJECTED";

/// `CELL_UPDATE` payload for a revealed mine.
pub const MINE: &str = "mine";

pub const WON: &str = "WON";
pub const LOST: &str = "LOST";

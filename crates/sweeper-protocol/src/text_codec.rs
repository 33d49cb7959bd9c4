// crates/sweeper-protocol/src/text_codec.rs

//! Text line codec.
//!
//! Input format (line → `Command`), tokens separated by whitespace,
//! command token case-insensitive:
//!
//! - `READY`
//! - `MOVE x y`
//! - `FLAG x y 0|1` (`true` / `false` also accepted)
//! - `QUIT`
//! - `RESET`
//! - `GET_CURRENT_PLAYER_NUMBER`
//! - `IS_GAME_STARTED`
//! - `IS_CURRENT_ACTIVE_PLAYER`
//! - `REQUEST_NEIGHBORING_MINES_COUNT x y`
//! - `UPDATE_PLAYER_COUNT`
//!
//! Output format (`Event` → line), without the trailing newline:
//!
//! - `CELL_UPDATE x y true mine` | `CELL_UPDATE x y true n` | `CELL_UPDATE x y false`
//! - `WAITING_FOR_PLAYERS ready/total`
//! - `GAMEOVER WON` | `GAMEOVER LOST`
//! - everything else: token followed by its arguments, booleans as `true`/`false`.

use std::num::ParseIntError;

use sweeper_core::{CellView, Command, Event, GameResult};
use thiserror::Error;

use crate::wire_types::{self, CommandToken};

/// Why a client line could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty line")]
    Empty,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("{command} takes {expected} argument(s), got {found}")]
    WrongArity {
        command: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid number `{value}`: {source}")]
    InvalidNumber {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid flag value `{0}`, expected 0, 1, true or false")]
    InvalidFlag(String),
}

/// Parse a single client line into a `Command`.
pub fn parse_command_line(line: &str) -> Result<Command, ProtocolError> {
    let mut tokens = line.split_whitespace();
    let head = tokens.next().ok_or(ProtocolError::Empty)?;
    let token = CommandToken::from_token(head)
        .ok_or_else(|| ProtocolError::UnknownCommand(head.to_string()))?;

    let args: Vec<&str> = tokens.collect();
    if args.len() != token.arity() {
        return Err(ProtocolError::WrongArity {
            command: token.as_str(),
            expected: token.arity(),
            found: args.len(),
        });
    }

    let command = match token {
        CommandToken::Ready => Command::Ready,
        CommandToken::Move => Command::Move {
            x: parse_coord(args[0])?,
            y: parse_coord(args[1])?,
        },
        CommandToken::Flag => Command::Flag {
            x: parse_coord(args[0])?,
            y: parse_coord(args[1])?,
            flagged: parse_flag(args[2])?,
        },
        CommandToken::Quit => Command::Quit,
        CommandToken::Reset => Command::Reset,
        CommandToken::GetCurrentPlayerNumber => Command::WhoAmI,
        CommandToken::IsGameStarted => Command::IsGameStarted,
        CommandToken::IsCurrentActivePlayer => Command::IsCurrentPlayer,
        CommandToken::RequestNeighboringMinesCount => Command::NeighborCount {
            x: parse_coord(args[0])?,
            y: parse_coord(args[1])?,
        },
        CommandToken::UpdatePlayerCount => Command::PlayerCount,
    };
    Ok(command)
}

fn parse_coord(s: &str) -> Result<i32, ProtocolError> {
    s.parse::<i32>().map_err(|source| ProtocolError::InvalidNumber {
        value: s.to_string(),
        source,
    })
}

fn parse_flag(s: &str) -> Result<bool, ProtocolError> {
    match s {
        "1" => Ok(true),
        "0" => Ok(false),
        _ if s.eq_ignore_ascii_case("true") => Ok(true),
        _ if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ProtocolError::InvalidFlag(s.to_string())),
    }
}

/// Render a `Command` as the canonical client line (no trailing newline).
pub fn format_command(command: &Command) -> String {
    match *command {
        Command::Ready => CommandToken::Ready.as_str().to_string(),
        Command::Move { x, y } => format!("{} {} {}", CommandToken::Move.as_str(), x, y),
        Command::Flag { x, y, flagged } => format!(
            "{} {} {} {}",
            CommandToken::Flag.as_str(),
            x,
            y,
            u8::from(flagged)
        ),
        Command::Quit => CommandToken::Quit.as_str().to_string(),
        Command::Reset => CommandToken::Reset.as_str().to_string(),
        Command::WhoAmI => CommandToken::GetCurrentPlayerNumber.as_str().to_string(),
        Command::IsGameStarted => CommandToken::IsGameStarted.as_str().to_string(),
        Command::IsCurrentPlayer => CommandToken::IsCurrentActivePlayer.as_str().to_string(),
        Command::NeighborCount { x, y } => format!(
            "{} {} {}",
            CommandToken::RequestNeighboringMinesCount.as_str(),
            x,
            y
        ),
        Command::PlayerCount => CommandToken::UpdatePlayerCount.as_str().to_string(),
    }
}

/// Render an `Event` as a single server line (no trailing newline).
pub fn format_event(event: &Event) -> String {
    match event {
        Event::PlayersConnected(n) => format!("{} {}", wire_types::PLAYERS_CONNECTED, n),
        Event::WaitingForPlayers { ready, total } => {
            format!("{} {}/{}", wire_types::WAITING_FOR_PLAYERS, ready, total)
        }
        Event::GameStarted => wire_types::GAME_STARTED.to_string(),
        Event::TurnChanged(player) => format!("{} {}", wire_types::TURN_CHANGED, player),
        Event::CellUpdate { x, y, view } => match view {
            CellView::Hidden => format!("{} {} {} false", wire_types::CELL_UPDATE, x, y),
            CellView::Mine => {
                format!("{} {} {} true {}", wire_types::CELL_UPDATE, x, y, wire_types::MINE)
            }
            CellView::Clear(n) => format!("{} {} {} true {}", wire_types::CELL_UPDATE, x, y, n),
        },
        Event::FlagUpdate { x, y, flagged } => {
            format!("{} {} {} {}", wire_types::FLAG_UPDATE, x, y, flagged)
        }
        Event::GameOver(result) => {
            let result = match result {
                GameResult::Won => wire_types::WON,
                GameResult::Lost => wire_types::LOST,
            };
            format!("{} {}", wire_types::GAMEOVER, result)
        }
        Event::FinalScore { player, score } => {
            format!("{} {} {}", wire_types::FINAL_SCORE, player, score)
        }
        Event::PlayerQuit(player) => format!("{} {}", wire_types::PLAYER_QUIT, player),
        Event::PlayerHitMine(player) => format!("{} {}", wire_types::PLAYER_HIT_MINE, player),
        Event::ScoreUpdate(score) => format!("{} {}", wire_types::SCORE_UPDATE, score),
        Event::GameReset => wire_types::GAME_RESET.to_string(),
        Event::ServerClosing => wire_types::SERVER_CLOSING.to_string(),

        Event::NotYourTurn => wire_types::NOT_YOUR_TURN.to_string(),
        Event::RoundNotActive => wire_types::ROUND_NOT_ACTIVE.to_string(),
        Event::OutOfBounds { x, y } => format!("{} {} {}", wire_types::OUT_OF_BOUNDS, x, y),
        Event::AlreadyRevealed { x, y } => {
            format!("{} {} {}", wire_types::ALREADY_REVEALED, x, y)
        }
        Event::FlagRejected { x, y } => format!("{} {} {}", wire_types::FLAG_REJECTED, x, y),

        Event::CurrentPlayerNumber(player) => {
            format!("{} {}", wire_types::CURRENT_PLAYER_NUMBER, player)
        }
        Event::GameStartedStatus(started) => {
            format!("{} {}", wire_types::IS_GAME_STARTED, started)
        }
        Event::ActivePlayerStatus(active) => {
            format!("{} {}", wire_types::IS_CURRENT_ACTIVE_PLAYER, active)
        }
        Event::NeighborCount { x, y, count } => format!(
            "{} {} {} {}",
            wire_types::NEIGHBORING_MINES_COUNT_RESPONSE,
            x,
            y,
            count
        ),
        Event::PlayerCount(n) => format!("{} {}", wire_types::UPDATE_PLAYER_COUNT, n),

        Event::ServerFull => wire_types::SERVER_FULL.to_string(),
        Event::RoundInProgress => wire_types::ROUND_IN_PROGRESS.to_string(),
        Event::PasswordAccepted => wire_types::PASSWORD_ACCEPTED.to_string(),
        Event::PasswordRejected => wire_types::PASSWORD_REJECTED.to_string(),
    }
}

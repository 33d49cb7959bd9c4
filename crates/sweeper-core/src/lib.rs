//! sweeper-core
//!
//! Pure game logic for turn-based multiplayer Minesweeper:
//! - cells and the board engine (mine placement, flood fill, win/loss)
//! - the player roster
//! - messages (commands in, events out)
//! - the session state machine that ties them together

pub mod cell;
pub mod board;
pub mod player;
pub mod messages;
pub mod session;
pub mod error;

pub use cell::{Cell, CellView, Contents};
pub use board::{Board, BoardSpec, Point, RevealOutcome};
pub use player::{Player, PlayerId, Roster};

pub use messages::{
    Command,
    Event,
    GameResult,
    JoinRejection,
};

pub use session::{Phase, Session, SessionConfig};
pub use error::SweeperError;

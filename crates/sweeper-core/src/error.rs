//! Error types for the game core.
//!
//! Gameplay itself is infallible: rejected moves come back as
//! [`Event`](crate::Event)s. Only construction can fail.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweeperError {
    /// Board or session parameters that can never produce a playable game.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

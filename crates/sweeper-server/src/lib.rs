//! sweeper-server
//!
//! Multi-client async TCP server for turn-based Minesweeper.

pub mod config;
pub mod types;
pub mod server;

// these are internal modules, not re-exported
mod client;
mod session_task;

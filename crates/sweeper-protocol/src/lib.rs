//! sweeper-protocol
//!
//! Wire-level encoding/decoding for the Minesweeper server.
//!
//! One message per newline-terminated line, space-separated tokens:
//! - client lines decode into `sweeper_core::Command`,
//! - `sweeper_core::Event`s encode into server lines.
//!
//! - [`wire_types`] : command / event tokens
//! - [`text_codec`] : parse and format

pub mod wire_types;
pub mod text_codec;

pub use text_codec::{
    ProtocolError,
    format_command,
    format_event,
    parse_command_line,
};

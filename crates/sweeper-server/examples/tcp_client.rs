//! Interactive line client for manual play.
//!
//!     cargo run -p sweeper-server --example tcp_client
//!
//! `SWEEPER_CLIENT_ADDR` overrides the server address and
//! `SWEEPER_PASSWORD`, when set, is sent as the first line.

use std::env;

use anyhow::{Context, Result};
use sweeper_core::Command;
use sweeper_protocol::{format_command, parse_command_line};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<()> {
    // Where to connect: env override or default.
    let addr = env::var("SWEEPER_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:2805".to_string());

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("connecting to {addr}"))?;
    println!("Connected.");
    println!("Commands:");
    println!("  READY");
    println!("  MOVE x y");
    println!("  FLAG x y 0|1");
    println!("  RESET                       (after a round ends)");
    println!("  IS_GAME_STARTED, UPDATE_PLAYER_COUNT, ...");
    println!("  QUIT\n");

    let (read_half, mut write_half) = stream.into_split();

    if let Ok(password) = env::var("SWEEPER_PASSWORD") {
        write_half.write_all(format!("{password}\n").as_bytes()).await?;
    }

    // Server lines arrive whenever anyone plays, not just in reply to us.
    let printer = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            println!("<< {}", line);
        }
        println!("Server closed the connection.");
    });

    let mut stdin = BufReader::new(io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let command = match parse_command_line(trimmed) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("Not sent: {}", e);
                continue;
            }
        };

        let wire = format!("{}\n", format_command(&command));
        if write_half.write_all(wire.as_bytes()).await.is_err() {
            break;
        }
        if command == Command::Quit || printer.is_finished() {
            break;
        }
    }

    let _ = write_half.shutdown().await;
    let _ = printer.await;
    Ok(())
}

//! TCP game server binary.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sweeper_server::config::Config;
use sweeper_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "sweeper-server")]
#[clap(about = "Turn-based multiplayer Minesweeper server")]
struct Cli {
    /// TOML config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind
    #[clap(long)]
    bind_addr: Option<String>,

    /// TCP port
    #[clap(short, long)]
    port: Option<u16>,

    #[clap(long)]
    max_players: Option<usize>,

    /// Players required before a round can start
    #[clap(long)]
    min_players: Option<usize>,

    #[clap(long)]
    width: Option<usize>,

    #[clap(long)]
    height: Option<usize>,

    #[clap(short, long)]
    mines: Option<usize>,

    /// Revealed mines that end the round
    #[clap(long)]
    loss_threshold: Option<usize>,

    /// Require clients to send this as their first line
    #[clap(long)]
    password: Option<String>,

    /// Seed for reproducible boards
    #[clap(long)]
    seed: Option<u64>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

impl Cli {
    /// Command-line flags win over file and environment.
    fn apply(self, mut config: Config) -> Config {
        if let Some(bind_addr) = self.bind_addr {
            config.bind_addr = bind_addr;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max_players) = self.max_players {
            config.max_players = max_players;
        }
        if let Some(min_players) = self.min_players {
            config.min_players = min_players;
        }
        if let Some(width) = self.width {
            config.board.width = width;
        }
        if let Some(height) = self.height {
            config.board.height = height;
        }
        if let Some(mines) = self.mines {
            config.board.mine_count = mines;
        }
        if let Some(loss_threshold) = self.loss_threshold {
            config.board.loss_threshold = loss_threshold;
        }
        if self.password.is_some() {
            config.password = self.password;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(cli.config.as_deref())?;
    let config = cli.apply(config);

    info!(
        addr = %config.socket_addr_string(),
        max_players = config.max_players,
        width = config.board.width,
        height = config.board.height,
        mines = config.board.mine_count,
        "starting sweeper-server"
    );

    server::run(config).await
}

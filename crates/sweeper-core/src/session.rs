//! Session coordinator.
//!
//! The lobby / turn state machine and the only writer of the board and
//! the roster. Every operation takes `&mut self`, so whoever owns the
//! `Session` (one task in the server) serializes all mutations.
//!
//! Phases: `Lobby` -> `Active` -> `Over`, with `reset` taking `Over`
//! back to `Lobby` for a rematch.
//!
//! Each call returns the events it produced, in order. Routing them to
//! one player or to everyone is left to the caller.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::{Board, BoardSpec, Point, RevealOutcome};
use crate::error::SweeperError;
use crate::messages::{Command, Event, GameResult, JoinRejection};
use crate::player::{PlayerId, Roster};

pub const DEFAULT_MAX_PLAYERS: usize = 4;
pub const DEFAULT_MIN_PLAYERS: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub board: BoardSpec,

    /// Joins beyond this are rejected with `ServerFull`.
    pub max_players: usize,

    /// A round starts only once everyone is ready and at least this many
    /// players are connected.
    pub min_players: usize,

    /// Seed for mine placement. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            board: BoardSpec::default(),
            max_players: DEFAULT_MAX_PLAYERS,
            min_players: DEFAULT_MIN_PLAYERS,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SweeperError> {
        self.board.validate()?;
        if self.max_players == 0 {
            return Err(SweeperError::InvalidConfiguration(
                "max_players must be at least 1".to_string(),
            ));
        }
        if self.min_players == 0 || self.min_players > self.max_players {
            return Err(SweeperError::InvalidConfiguration(format!(
                "min_players must be between 1 and max_players ({}), got {}",
                self.max_players, self.min_players
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Active,
    Over,
}

/// Where the next round's mines come from.
#[derive(Debug)]
enum MineLayout {
    Random(StdRng),

    /// Pristine copy, replayed every round.
    Fixed(Board),
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    board: Board,
    layout: MineLayout,
    roster: Roster,
    turn_index: usize,
    phase: Phase,
    closed: bool,
}

impl Session {
    /// Create a session with randomly placed mines.
    pub fn new(config: SessionConfig) -> Result<Self, SweeperError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let board = Board::initialize(&config.board, &mut rng)?;
        Ok(Session::assemble(config, board, MineLayout::Random(rng)))
    }

    /// Create a session whose every round uses exactly these mines.
    ///
    /// `config.board.mine_count` is replaced by `mines.len()`.
    pub fn with_mines(mut config: SessionConfig, mines: &[Point]) -> Result<Self, SweeperError> {
        config.board.mine_count = mines.len();
        config.validate()?;
        let board = Board::with_mines(
            config.board.width,
            config.board.height,
            mines,
            config.board.loss_threshold,
        )?;
        let layout = MineLayout::Fixed(board.clone());
        Ok(Session::assemble(config, board, layout))
    }

    fn assemble(config: SessionConfig, board: Board, layout: MineLayout) -> Self {
        Session {
            config,
            board,
            layout,
            roster: Roster::new(),
            turn_index: 0,
            phase: Phase::Lobby,
            closed: false,
        }
    }

    /// Admit a new player.
    ///
    /// On success the joiner's number comes first (meant for the joiner
    /// alone), followed by the new player count.
    pub fn join(&mut self) -> Result<(PlayerId, Vec<Event>), JoinRejection> {
        if self.roster.len() >= self.config.max_players {
            return Err(JoinRejection::ServerFull);
        }
        if self.phase != Phase::Lobby {
            return Err(JoinRejection::RoundInProgress);
        }

        let id = self.roster.add();
        let events = vec![
            Event::CurrentPlayerNumber(id),
            Event::PlayersConnected(self.roster.len()),
        ];
        Ok((id, events))
    }

    /// Apply one command from `player`.
    ///
    /// Commands from ids not in the roster are dropped.
    pub fn process(&mut self, player: PlayerId, command: Command) -> Vec<Event> {
        if self.roster.position(player).is_none() {
            return Vec::new();
        }

        match command {
            Command::Ready => self.set_ready(player),
            Command::Move { x, y } => self.play_move(player, x, y),
            Command::Flag { x, y, flagged } => self.flag(player, x, y, flagged),
            Command::Quit => self.quit(player),
            Command::Reset => self.reset(),
            Command::WhoAmI => vec![Event::CurrentPlayerNumber(player)],
            Command::IsGameStarted => vec![Event::GameStartedStatus(self.phase == Phase::Active)],
            Command::IsCurrentPlayer => {
                vec![Event::ActivePlayerStatus(self.current_player() == Some(player))]
            }
            Command::NeighborCount { x, y } => match self.board.point(x, y) {
                Some(point) => {
                    let count = self.board.neighbor_mine_count(x, y).unwrap_or_default();
                    vec![Event::NeighborCount {
                        x: point.x,
                        y: point.y,
                        count,
                    }]
                }
                None => vec![Event::OutOfBounds { x, y }],
            },
            Command::PlayerCount => vec![Event::PlayerCount(self.roster.len())],
        }
    }

    /// Mark a player ready and start the round once everyone is.
    pub fn set_ready(&mut self, player: PlayerId) -> Vec<Event> {
        if self.phase != Phase::Lobby {
            return Vec::new();
        }
        match self.roster.get_mut(player) {
            Some(p) if !p.ready => p.ready = true,
            _ => return Vec::new(),
        }

        match self.try_start() {
            Some(events) => events,
            None => vec![Event::WaitingForPlayers {
                ready: self.roster.ready_count(),
                total: self.roster.len(),
            }],
        }
    }

    fn try_start(&mut self) -> Option<Vec<Event>> {
        let total = self.roster.len();
        if total == 0 || total < self.config.min_players || self.roster.ready_count() < total {
            return None;
        }

        self.phase = Phase::Active;
        self.turn_index = 0;
        self.roster.reset_scores();
        self.deal();
        self.board.start();

        let first = self.roster.at(0)?.id;
        Some(vec![Event::GameStarted, Event::TurnChanged(first)])
    }

    /// Fresh mines for a random layout, the pristine board for a fixed one.
    fn deal(&mut self) {
        match &mut self.layout {
            MineLayout::Random(rng) => self.board.reset(rng),
            MineLayout::Fixed(pristine) => self.board = pristine.clone(),
        }
    }

    fn check_turn(&self, player: PlayerId) -> Option<Event> {
        if self.phase != Phase::Active {
            return Some(Event::RoundNotActive);
        }
        if self.current_player() != Some(player) {
            return Some(Event::NotYourTurn);
        }
        None
    }

    /// Reveal a cell on behalf of the current player.
    pub fn play_move(&mut self, player: PlayerId, x: i32, y: i32) -> Vec<Event> {
        if let Some(rejection) = self.check_turn(player) {
            return vec![rejection];
        }

        match self.board.reveal(x, y) {
            RevealOutcome::OutOfBounds => vec![Event::OutOfBounds { x, y }],
            RevealOutcome::AlreadyRevealed => vec![Event::AlreadyRevealed { x, y }],
            RevealOutcome::Finished => vec![Event::RoundNotActive],
            RevealOutcome::HitMine(point) => {
                let mut events = vec![
                    self.cell_update(point),
                    Event::PlayerHitMine(player),
                    Event::ScoreUpdate(self.add_score(player, -1)),
                ];
                if self.board.is_lost() {
                    events.extend(self.finish(GameResult::Lost));
                } else {
                    events.extend(self.advance_turn());
                }
                events
            }
            RevealOutcome::Cleared(points) => {
                let gained = i32::try_from(points.len()).unwrap_or(i32::MAX);
                let mut events: Vec<Event> =
                    points.into_iter().map(|point| self.cell_update(point)).collect();
                events.push(Event::ScoreUpdate(self.add_score(player, gained)));
                if self.board.is_won() {
                    events.extend(self.finish(GameResult::Won));
                } else {
                    events.extend(self.advance_turn());
                }
                events
            }
        }
    }

    /// Set or clear a flag. Does not use up the player's turn.
    pub fn flag(&mut self, player: PlayerId, x: i32, y: i32, flagged: bool) -> Vec<Event> {
        if let Some(rejection) = self.check_turn(player) {
            return vec![rejection];
        }

        let Some(point) = self.board.point(x, y) else {
            return vec![Event::OutOfBounds { x, y }];
        };
        if self.board.toggle_flag(x, y, flagged) {
            vec![Event::FlagUpdate {
                x: point.x,
                y: point.y,
                flagged,
            }]
        } else {
            vec![Event::FlagRejected { x, y }]
        }
    }

    /// Pass the turn to the next player in join order.
    pub fn advance_turn(&mut self) -> Vec<Event> {
        if self.roster.is_empty() {
            self.teardown();
            return Vec::new();
        }
        self.turn_index = (self.turn_index + 1) % self.roster.len();
        self.turn_changed()
    }

    /// Remove a player. Explicit `QUIT` and dropped connections both end here.
    pub fn quit(&mut self, player: PlayerId) -> Vec<Event> {
        let Some((index, _)) = self.roster.remove(player) else {
            return Vec::new();
        };

        let mut events = vec![
            Event::PlayerQuit(player),
            Event::PlayersConnected(self.roster.len()),
        ];

        match self.phase {
            Phase::Lobby => {
                // The departing player may have been the last one not ready.
                if let Some(start) = self.try_start() {
                    events.extend(start);
                }
            }
            Phase::Active => {
                if self.roster.is_empty() {
                    self.teardown();
                } else if index < self.turn_index {
                    self.turn_index -= 1;
                } else if index == self.turn_index {
                    // The next player has slid into the vacated slot.
                    self.turn_index %= self.roster.len();
                    events.extend(self.turn_changed());
                }
            }
            Phase::Over => {
                if self.roster.is_empty() {
                    self.teardown();
                }
            }
        }
        events
    }

    /// Rematch: `Over` back to `Lobby` with a fresh board.
    pub fn reset(&mut self) -> Vec<Event> {
        match self.phase {
            Phase::Lobby => Vec::new(),
            Phase::Active => vec![Event::RoundInProgress],
            Phase::Over => {
                self.deal();
                self.roster.clear_ready();
                self.roster.reset_scores();
                self.turn_index = 0;
                self.phase = Phase::Lobby;
                vec![Event::GameReset, Event::PlayersConnected(self.roster.len())]
            }
        }
    }

    /// Operator shutdown. The session accepts nothing afterwards.
    pub fn shutdown(&mut self) -> Vec<Event> {
        self.teardown();
        vec![Event::ServerClosing]
    }

    fn finish(&mut self, result: GameResult) -> Vec<Event> {
        self.phase = Phase::Over;
        self.board.finish();

        let mut events = vec![Event::GameOver(result)];
        events.extend(self.roster.iter().map(|p| Event::FinalScore {
            player: p.id,
            score: p.score,
        }));
        events
    }

    fn teardown(&mut self) {
        self.phase = Phase::Over;
        self.board.finish();
        self.closed = true;
    }

    fn turn_changed(&self) -> Vec<Event> {
        self.current_player()
            .map(Event::TurnChanged)
            .into_iter()
            .collect()
    }

    fn cell_update(&self, point: Point) -> Event {
        Event::CellUpdate {
            x: point.x,
            y: point.y,
            view: self.board.view(point),
        }
    }

    fn add_score(&mut self, player: PlayerId, delta: i32) -> i32 {
        match self.roster.get_mut(player) {
            Some(p) => {
                p.score = p.score.saturating_add(delta);
                p.score
            }
            None => 0,
        }
    }

    /// Whose move is accepted right now. `None` outside `Active`.
    pub fn current_player(&self) -> Option<PlayerId> {
        if self.phase != Phase::Active {
            return None;
        }
        self.roster.at(self.turn_index).map(|p| p.id)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once the last player has left a started round, or after
    /// [`shutdown`](Self::shutdown). The hosting server should stop.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

//! Player roster.
//!
//! Join order is turn order. Ids are handed out sequentially from 1 and
//! never recycled for the lifetime of a session.

use std::fmt;

/// Stable player number, assigned at join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub ready: bool,
    pub score: i32,
}

impl Player {
    fn new(id: PlayerId) -> Self {
        Player {
            id,
            ready: false,
            score: 0,
        }
    }
}

/// Ordered list of connected players.
///
/// The ready count is derived from the players' flags rather than kept
/// as a separate counter.
#[derive(Debug, Clone)]
pub struct Roster {
    players: Vec<Player>,
    next_id: u32,
}

impl Default for Roster {
    fn default() -> Self {
        Roster {
            players: Vec::new(),
            next_id: 1,
        }
    }
}

impl Roster {
    pub fn new() -> Self {
        Roster::default()
    }

    /// Append a new player with the next id.
    pub fn add(&mut self) -> PlayerId {
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.players.push(Player::new(id));
        id
    }

    /// Remove a player, returning the index it occupied.
    pub fn remove(&mut self, id: PlayerId) -> Option<(usize, Player)> {
        let index = self.position(id)?;
        Some((index, self.players.remove(index)))
    }

    pub fn position(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.players.iter().filter(|p| p.ready).count()
    }

    pub fn clear_ready(&mut self) {
        self.players.iter_mut().for_each(|p| p.ready = false);
    }

    pub fn reset_scores(&mut self) {
        self.players.iter_mut().for_each(|p| p.score = 0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }
}

//! A single grid position.

/// What lies under a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contents {
    /// No mine. Carries the number of adjacent mines (0..=8).
    Empty(u8),
    Mine,
}

impl Default for Contents {
    fn default() -> Self {
        Contents::Empty(0)
    }
}

impl Contents {
    pub fn plant(self) -> Self {
        Contents::Mine
    }

    pub fn increment(self) -> Self {
        match self {
            Contents::Empty(n) => Contents::Empty(n + 1),
            Contents::Mine => Contents::Mine,
        }
    }

    pub fn is_mine(&self) -> bool {
        matches!(self, Contents::Mine)
    }
}

/// One cell of the board: contents plus the two player-visible flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub(crate) contents: Contents,
    pub(crate) flagged: bool,
    pub(crate) revealed: bool,
}

impl Cell {
    pub fn contents(&self) -> Contents {
        self.contents
    }

    pub fn is_mine(&self) -> bool {
        self.contents.is_mine()
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Adjacent mine count. Meaningless for a mine; reported as 0.
    pub fn neighbor_mines(&self) -> u8 {
        match self.contents {
            Contents::Empty(n) => n,
            Contents::Mine => 0,
        }
    }

    /// What every player is allowed to see of this cell.
    pub fn view(&self) -> CellView {
        match (self.revealed, self.contents) {
            (false, _) => CellView::Hidden,
            (true, Contents::Mine) => CellView::Mine,
            (true, Contents::Empty(n)) => CellView::Clear(n),
        }
    }
}

/// Public projection of a cell, as sent in board deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Mine,
    Clear(u8),
}

//! Board engine.
//!
//! Owns the grid of cells and the rules that operate on it:
//! - random (or fixed) mine placement plus adjacency counts,
//! - reveal with zero-expansion flood fill,
//! - flag toggling,
//! - win / loss checks.
//!
//! No I/O and no locking here; the session is the only caller and it
//! serializes access.

use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::Deserialize;

use crate::cell::{Cell, CellView};
use crate::error::SweeperError;

pub const DEFAULT_WIDTH: usize = 16;
pub const DEFAULT_HEIGHT: usize = 16;
pub const DEFAULT_MINE_COUNT: usize = 32;

/// Revealed mines tolerated before the round is lost. 1 means the first
/// mine ends it.
pub const DEFAULT_LOSS_THRESHOLD: usize = 1;

/// Dimensions and rules of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoardSpec {
    pub width: usize,
    pub height: usize,
    pub mine_count: usize,
    pub loss_threshold: usize,
}

impl Default for BoardSpec {
    fn default() -> Self {
        BoardSpec {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            mine_count: DEFAULT_MINE_COUNT,
            loss_threshold: DEFAULT_LOSS_THRESHOLD,
        }
    }
}

impl BoardSpec {
    pub fn validate(&self) -> Result<(), SweeperError> {
        if self.width == 0 || self.height == 0 {
            return Err(SweeperError::InvalidConfiguration(format!(
                "board must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        let cells = self.width.checked_mul(self.height).ok_or_else(|| {
            SweeperError::InvalidConfiguration("board dimensions overflow".to_string())
        })?;
        if self.mine_count >= cells {
            return Err(SweeperError::InvalidConfiguration(format!(
                "{} mines do not fit on a {}x{} board",
                self.mine_count, self.width, self.height
            )));
        }
        if self.loss_threshold == 0 {
            return Err(SweeperError::InvalidConfiguration(
                "loss threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// In-bounds grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub fn new(x: usize, y: usize) -> Self {
        Point { x, y }
    }
}

/// Result of [`Board::reveal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    OutOfBounds,

    /// Nothing changed.
    AlreadyRevealed,

    /// The board is finished. Nothing changed.
    Finished,

    /// The revealed cell was a mine. No flood fill from mines.
    HitMine(Point),

    /// Every cell revealed by this move, in reveal order.
    Cleared(Vec<Point>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    spec: BoardSpec,
    cells: Vec<Cell>,
    started: bool,
    over: bool,
    mines_exploded: usize,
}

impl Index<Point> for Board {
    type Output = Cell;

    fn index(&self, point: Point) -> &Self::Output {
        &self.cells[point.y * self.spec.width + point.x]
    }
}

impl IndexMut<Point> for Board {
    fn index_mut(&mut self, point: Point) -> &mut Self::Output {
        &mut self.cells[point.y * self.spec.width + point.x]
    }
}

impl Board {
    /// Build a board and scatter `spec.mine_count` mines uniformly at random.
    pub fn initialize<R: Rng>(spec: &BoardSpec, rng: &mut R) -> Result<Self, SweeperError> {
        spec.validate()?;
        let mut board = Board::empty(*spec);
        board.place_random(rng);
        Ok(board)
    }

    /// Build a board with mines at exactly the given points.
    pub fn with_mines(
        width: usize,
        height: usize,
        mines: &[Point],
        loss_threshold: usize,
    ) -> Result<Self, SweeperError> {
        let spec = BoardSpec {
            width,
            height,
            mine_count: mines.len(),
            loss_threshold,
        };
        spec.validate()?;

        let mut board = Board::empty(spec);
        for &mine in mines {
            if mine.x >= width || mine.y >= height {
                return Err(SweeperError::InvalidConfiguration(format!(
                    "mine ({}, {}) is outside the {}x{} board",
                    mine.x, mine.y, width, height
                )));
            }
            if board[mine].is_mine() {
                return Err(SweeperError::InvalidConfiguration(format!(
                    "duplicate mine at ({}, {})",
                    mine.x, mine.y
                )));
            }
            board.plant(mine);
        }
        Ok(board)
    }

    fn empty(spec: BoardSpec) -> Self {
        Board {
            spec,
            cells: vec![Cell::default(); spec.width * spec.height],
            started: false,
            over: false,
            mines_exploded: 0,
        }
    }

    /// Clear every cell and counter, then re-roll the mine field.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.cells.iter_mut().for_each(|cell| *cell = Cell::default());
        self.started = false;
        self.over = false;
        self.mines_exploded = 0;
        self.place_random(rng);
    }

    // Rejection sampling; validate() guarantees at least one free cell.
    fn place_random<R: Rng>(&mut self, rng: &mut R) {
        let mut placed = 0;
        while placed < self.spec.mine_count {
            let point = Point {
                x: rng.gen_range(0..self.spec.width),
                y: rng.gen_range(0..self.spec.height),
            };
            if self[point].is_mine() {
                continue;
            }
            self.plant(point);
            placed += 1;
        }
    }

    fn plant(&mut self, point: Point) {
        self[point].contents = self[point].contents.plant();
        for neighbor in self.neighbors(point) {
            self[neighbor].contents = self[neighbor].contents.increment();
        }
    }

    /// Map signed wire coordinates onto the grid.
    pub fn point(&self, x: i32, y: i32) -> Option<Point> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.spec.width && y < self.spec.height).then_some(Point { x, y })
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.point(x, y).map(|point| &self[point])
    }

    pub fn view(&self, point: Point) -> CellView {
        self[point].view()
    }

    /// The up-to-8 Moore neighbours of `point`.
    pub fn neighbors(&self, point: Point) -> Vec<Point> {
        let mut neighbors = Vec::with_capacity(8);
        let min_x = point.x.saturating_sub(1);
        let min_y = point.y.saturating_sub(1);
        let max_x = (point.x + 1).min(self.spec.width - 1);
        let max_y = (point.y + 1).min(self.spec.height - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if x == point.x && y == point.y {
                    continue;
                }
                neighbors.push(Point { x, y });
            }
        }
        neighbors
    }

    /// Reveal a cell, flooding outward from zero-count cells.
    ///
    /// Flags do not stop the flood: a flagged cell reached by the
    /// cascade is revealed and loses its flag. A finished board is left
    /// untouched.
    pub fn reveal(&mut self, x: i32, y: i32) -> RevealOutcome {
        if self.over {
            return RevealOutcome::Finished;
        }
        let Some(start) = self.point(x, y) else {
            return RevealOutcome::OutOfBounds;
        };
        if self[start].revealed {
            return RevealOutcome::AlreadyRevealed;
        }

        if self[start].is_mine() {
            let cell = &mut self[start];
            cell.revealed = true;
            cell.flagged = false;
            self.mines_exploded += 1;
            return RevealOutcome::HitMine(start);
        }

        let mut revealed = Vec::new();
        let mut pending = vec![start];
        while let Some(point) = pending.pop() {
            let expand = {
                let cell = &mut self[point];
                if cell.revealed || cell.is_mine() {
                    continue;
                }
                cell.revealed = true;
                cell.flagged = false;
                cell.neighbor_mines() == 0
            };
            revealed.push(point);
            if expand {
                pending.extend(self.neighbors(point));
            }
        }
        RevealOutcome::Cleared(revealed)
    }

    /// Set or clear a flag. Returns false (and changes nothing) when the
    /// cell is out of bounds, already revealed, or the board is over.
    pub fn toggle_flag(&mut self, x: i32, y: i32, flagged: bool) -> bool {
        if self.over {
            return false;
        }
        let Some(point) = self.point(x, y) else {
            return false;
        };
        let cell = &mut self[point];
        if cell.revealed {
            return false;
        }
        cell.flagged = flagged;
        true
    }

    /// True iff every non-mine cell is revealed.
    pub fn is_won(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_mine() || cell.revealed)
    }

    pub fn is_lost(&self) -> bool {
        self.mines_exploded >= self.spec.loss_threshold
    }

    /// Mines around `(x, y)`, counted fresh so it also answers for mine cells.
    pub fn neighbor_mine_count(&self, x: i32, y: i32) -> Option<u8> {
        let point = self.point(x, y)?;
        let count = self
            .neighbors(point)
            .into_iter()
            .filter(|&neighbor| self[neighbor].is_mine())
            .count();
        Some(count as u8)
    }

    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn finish(&mut self) {
        self.over = true;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn spec(&self) -> &BoardSpec {
        &self.spec
    }

    pub fn width(&self) -> usize {
        self.spec.width
    }

    pub fn height(&self) -> usize {
        self.spec.height
    }

    pub fn mine_count(&self) -> usize {
        self.spec.mine_count
    }

    pub fn mines_exploded(&self) -> usize {
        self.mines_exploded
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.revealed).count()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Point, &Cell)> + '_ {
        let width = self.spec.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (Point { x: index % width, y: index / width }, cell))
    }
}

//! Rectangular dungeon grids.
//!
//! A [`Grid`] is a flat row-major buffer of [`Symbol`]s addressed by
//! `row * cols + col`. The same type backs the static dungeon, the live world
//! and every player's visibility grid, so all three always share dimensions.
//!
//! Bounds are strict: there is no sentinel border. Any coordinate outside
//! `rows x cols` reads as `None` and is never treated as walkable or
//! transparent.

use rand::Rng;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use super::player::PlayerId;

/// A `(row, col)` coordinate inside a grid.
pub type Position = (usize, usize);

/// One cell of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Solid rock. Also what a viewer holds for cells it has never seen.
    Wall,
    HorizontalBoundary,
    VerticalBoundary,
    CornerBoundary,
    RoomFloor,
    Passage,
    GoldPile,
    PlayerMarker(PlayerId),
    /// A viewer's own position, only ever written into visibility grids.
    SelfMarker,
}

impl Symbol {
    pub fn from_char(ch: char) -> Option<Self> {
        let symbol = match ch {
            ' ' => Symbol::Wall,
            '-' => Symbol::HorizontalBoundary,
            '|' => Symbol::VerticalBoundary,
            '+' => Symbol::CornerBoundary,
            '.' => Symbol::RoomFloor,
            '#' => Symbol::Passage,
            '*' => Symbol::GoldPile,
            '@' => Symbol::SelfMarker,
            other => return PlayerId::new(other).map(Symbol::PlayerMarker),
        };
        Some(symbol)
    }

    pub fn to_char(self) -> char {
        match self {
            Symbol::Wall => ' ',
            Symbol::HorizontalBoundary => '-',
            Symbol::VerticalBoundary => '|',
            Symbol::CornerBoundary => '+',
            Symbol::RoomFloor => '.',
            Symbol::Passage => '#',
            Symbol::GoldPile => '*',
            Symbol::PlayerMarker(id) => id.as_char(),
            Symbol::SelfMarker => '@',
        }
    }

    /// Only room floor lets line-of-sight through; passages are opaque.
    pub fn is_transparent(self) -> bool {
        matches!(self, Symbol::RoomFloor)
    }

    /// Rock and room boundaries cannot be stepped onto.
    pub fn blocks_movement(self) -> bool {
        matches!(
            self,
            Symbol::Wall
                | Symbol::HorizontalBoundary
                | Symbol::VerticalBoundary
                | Symbol::CornerBoundary
        )
    }
}

/// Errors raised while building, loading or seeding a grid.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive (got {rows}x{cols})")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("unable to read map {path}: {source}")]
    UnreadableSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("map contains no usable rows or columns")]
    EmptyMap,

    #[error("unknown map symbol {ch:?} at row {row}, column {col}")]
    UnknownSymbol { row: usize, col: usize, ch: char },

    #[error("invalid gold pile range {min}..={max}")]
    InvalidPileRange { min: usize, max: usize },

    #[error("not enough room floor for {wanted} gold piles ({available} floor cells)")]
    InsufficientFloorSpace { wanted: usize, available: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Symbol>,
}

impl Grid {
    /// Create a grid of solid rock.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            cells: vec![Symbol::Wall; rows * cols],
        })
    }

    /// A grid with the same shape as `other`, every cell set to `fill`.
    pub fn filled_like(other: &Grid, fill: Symbol) -> Self {
        Self {
            rows: other.rows,
            cols: other.cols,
            cells: vec![fill; other.cells.len()],
        }
    }

    /// Load a map file. Sizing follows the text's bounding box.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GridError::UnreadableSource {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse line-oriented map text. Short lines are padded with rock.
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = text.lines().collect();
        let rows = lines.len();
        let cols = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyMap);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate() {
            let mut width = 0;
            for (col, ch) in line.chars().enumerate() {
                let symbol =
                    Symbol::from_char(ch).ok_or(GridError::UnknownSymbol { row, col, ch })?;
                cells.push(symbol);
                width += 1;
            }
            cells.extend(std::iter::repeat(Symbol::Wall).take(cols - width));
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Overwrite one cell. Returns `false` (and changes nothing) when out of bounds.
    pub fn set(&mut self, row: usize, col: usize, symbol: Symbol) -> bool {
        match self.index(row, col) {
            Some(i) => {
                self.cells[i] = symbol;
                true
            }
            None => false,
        }
    }

    /// Step from `from` by a signed delta, staying inside the grid.
    pub fn offset(&self, from: Position, delta: (isize, isize)) -> Option<Position> {
        let row = from.0.checked_add_signed(delta.0)?;
        let col = from.1.checked_add_signed(delta.1)?;
        self.index(row, col).map(|_| (row, col))
    }

    pub fn count(&self, symbol: Symbol) -> usize {
        self.cells.iter().filter(|s| **s == symbol).count()
    }

    /// Every coordinate in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    /// Rejection-sample a uniformly random cell holding `want`.
    pub fn random_cell_matching<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        want: Symbol,
        max_attempts: usize,
    ) -> Option<Position> {
        for _ in 0..max_attempts {
            let row = rng.gen_range(0..self.rows);
            let col = rng.gen_range(0..self.cols);
            if self.get(row, col) == Some(want) {
                return Some((row, col));
            }
        }
        None
    }

    /// Drop between `min_piles` and `max_piles` (inclusive) gold piles on
    /// room floor. Returns how many were placed. On error the grid is left
    /// untouched.
    pub fn scatter_gold<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        min_piles: usize,
        max_piles: usize,
        max_attempts: usize,
    ) -> Result<usize, GridError> {
        if min_piles > max_piles {
            return Err(GridError::InvalidPileRange {
                min: min_piles,
                max: max_piles,
            });
        }
        let wanted = rng.gen_range(min_piles..=max_piles);
        let available = self.count(Symbol::RoomFloor);
        if available < wanted {
            return Err(GridError::InsufficientFloorSpace { wanted, available });
        }

        let mut seeded = self.clone();
        let mut placed = 0;
        let mut attempts = 0;
        while placed < wanted {
            if attempts == max_attempts {
                return Err(GridError::InsufficientFloorSpace { wanted, available });
            }
            attempts += 1;
            let row = rng.gen_range(0..self.rows);
            let col = rng.gen_range(0..self.cols);
            if seeded.get(row, col) == Some(Symbol::RoomFloor) {
                seeded.set(row, col, Symbol::GoldPile);
                placed += 1;
            }
        }
        *self = seeded;
        Ok(placed)
    }

    /// Row-major text, one newline after every row.
    pub fn serialize(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in self.cells.chunks(self.cols) {
            out.extend(row.iter().map(|s| s.to_char()));
            out.push('\n');
        }
        out
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

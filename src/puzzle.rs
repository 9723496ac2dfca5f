//! Board representation for the 3x3 sliding-tile puzzle.
//!
//! A `Board` is an immutable permutation of 0..8 in row-major order, 0 being
//! the blank. Every transformation returns a new board; the only way to build
//! one from outside data is through validation, so a `Board` value is always
//! a permutation.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{PuzzleError, Result};

/// Side length of the grid
pub const SIZE: usize = 3;
/// Number of cells
pub const CELLS: usize = SIZE * SIZE;

/// Tiles 1..8 in reading order, blank last.
pub const GOAL: Board = Board([1, 2, 3, 4, 5, 6, 7, 8, 0]);

/// Direction the blank travels (not the tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "U")]
    Up,
    #[serde(rename = "D")]
    Down,
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Move {
    /// Stable enumeration order; downstream tie-breaking depends on it.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn opposite(self) -> Move {
        match self {
            Move::Up => Move::Down,
            Move::Down => Move::Up,
            Move::Left => Move::Right,
            Move::Right => Move::Left,
        }
    }

    pub fn label(self) -> char {
        match self {
            Move::Up => 'U',
            Move::Down => 'D',
            Move::Left => 'L',
            Move::Right => 'R',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Row/column of a cell. Derived from an index, never stored on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn of(index: usize) -> Self {
        Self {
            row: index / SIZE,
            col: index % SIZE,
        }
    }

    pub fn index(self) -> usize {
        self.row * SIZE + self.col
    }

    pub fn manhattan(self, other: Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// A 3x3 board, row-major, 0 = blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u8>")]
pub struct Board([u8; CELLS]);

impl Board {
    /// Validate a flat sequence of integers into a board.
    pub fn from_slice(values: &[i64]) -> Result<Self> {
        if values.len() != CELLS {
            return Err(PuzzleError::InvalidBoard(format!(
                "board must have {} numbers, got {}",
                CELLS,
                values.len()
            )));
        }

        let mut seen = [false; CELLS];
        let mut cells = [0u8; CELLS];
        for (i, &v) in values.iter().enumerate() {
            if v < 0 || v >= CELLS as i64 || seen[v as usize] {
                return Err(PuzzleError::InvalidBoard(
                    "board must contain numbers 0..8 exactly once".to_string(),
                ));
            }
            seen[v as usize] = true;
            cells[i] = v as u8;
        }
        Ok(Self(cells))
    }

    pub fn tiles(&self) -> &[u8; CELLS] {
        &self.0
    }

    pub fn tile(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn to_grid(&self) -> [[u8; SIZE]; SIZE] {
        let mut grid = [[0u8; SIZE]; SIZE];
        for (i, &t) in self.0.iter().enumerate() {
            let pos = Position::of(i);
            grid[pos.row][pos.col] = t;
        }
        grid
    }

    pub fn blank_index(&self) -> usize {
        // A board is always a permutation, so the blank is always present.
        self.0.iter().position(|&t| t == 0).unwrap_or(CELLS - 1)
    }

    /// Index of every tile value: `positions()[tile] == index of tile`.
    pub fn positions(&self) -> [usize; CELLS] {
        let mut pos = [0usize; CELLS];
        for (i, &t) in self.0.iter().enumerate() {
            pos[t as usize] = i;
        }
        pos
    }

    pub fn is_goal(&self) -> bool {
        *self == GOAL
    }

    /// Slide the blank one cell, or `None` if it is already at that boundary.
    pub fn apply(&self, mv: Move) -> Option<Board> {
        let blank = self.blank_index();
        let Position { row, col } = Position::of(blank);

        let target = match mv {
            Move::Up if row > 0 => blank - SIZE,
            Move::Down if row < SIZE - 1 => blank + SIZE,
            Move::Left if col > 0 => blank - 1,
            Move::Right if col < SIZE - 1 => blank + 1,
            _ => return None,
        };

        let mut cells = self.0;
        cells.swap(blank, target);
        Some(Board(cells))
    }

    /// Every legal successor with the move that produced it, in `Move::ALL` order.
    pub fn neighbors(&self) -> SmallVec<[(Board, Move); 4]> {
        Move::ALL
            .iter()
            .filter_map(|&mv| self.apply(mv).map(|next| (next, mv)))
            .collect()
    }

    /// Pairs of non-blank tiles out of order in reading order.
    pub fn inversion_count(&self) -> usize {
        let tiles: SmallVec<[u8; CELLS]> = self.0.iter().copied().filter(|&t| t != 0).collect();
        tiles
            .iter()
            .enumerate()
            .map(|(i, &a)| tiles[i + 1..].iter().filter(|&&b| b < a).count())
            .sum()
    }

    /// On a 3x3 grid the goal's component is exactly the even permutations.
    pub fn is_solvable(&self) -> bool {
        self.inversion_count() % 2 == 0
    }
}

impl Default for Board {
    fn default() -> Self {
        GOAL
    }
}

impl TryFrom<Vec<i64>> for Board {
    type Error = PuzzleError;

    fn try_from(values: Vec<i64>) -> Result<Self> {
        Board::from_slice(&values)
    }
}

impl From<Board> for Vec<u8> {
    fn from(board: Board) -> Self {
        board.to_vec()
    }
}

/// Accepts `1,2,3,4,5,6,7,8,0`, whitespace-separated numbers, or `123456780`.
impl FromStr for Board {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let values: Vec<i64> = if s.contains(|c: char| c == ',' || c.is_whitespace()) {
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<i64>().map_err(|_| {
                        PuzzleError::InvalidBoard(format!("'{}' is not a number", part))
                    })
                })
                .collect::<Result<_>>()?
        } else {
            s.chars()
                .map(|c| {
                    c.to_digit(10).map(i64::from).ok_or_else(|| {
                        PuzzleError::InvalidBoard(format!("'{}' is not a digit", c))
                    })
                })
                .collect::<Result<_>>()?
        };
        Board::from_slice(&values)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_grid() {
            let cells: Vec<String> = row
                .iter()
                .map(|&t| if t == 0 { "  ".to_string() } else { format!("{:>2}", t) })
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Random legal walk of `depth` moves from `goal`, reproducible from `seed`.
pub fn shuffle(goal: Board, depth: usize, seed: u64) -> Board {
    let mut rng = StdRng::seed_from_u64(seed);
    shuffle_with(goal, depth, &mut rng)
}

/// Walk driven by a caller-supplied RNG. Never steps straight back to the
/// state it just left; longer cycles are allowed.
pub fn shuffle_with<R: Rng + ?Sized>(goal: Board, depth: usize, rng: &mut R) -> Board {
    let mut current = goal;
    let mut previous: Option<Board> = None;

    for _ in 0..depth {
        let candidates: SmallVec<[Board; 4]> = current
            .neighbors()
            .into_iter()
            .map(|(next, _)| next)
            .filter(|next| Some(*next) != previous)
            .collect();

        // Every cell has at least two neighbors, so one always survives the filter.
        let Some(&next) = candidates.choose(rng) else {
            break;
        };
        previous = Some(current);
        current = next;
    }

    current
}

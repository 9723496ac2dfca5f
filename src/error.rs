//! Error taxonomy shared by the state model, the search engine and the facade.

use crate::puzzle::{Board, Move};

/// Everything that can go wrong between receiving a board and returning a path.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// Wrong length, or not a permutation of 0..8.
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    /// Structurally valid but in the other parity class.
    #[error("board is not solvable")]
    Unsolvable,
    #[error("invalid move '{mv}' from state {board:?}")]
    InvalidMove { mv: Move, board: Board },
    /// Frontier emptied in a search that should always reach the goal.
    #[error("{algorithm} exhausted the search space after {expanded} expansions")]
    SearchExhausted {
        algorithm: &'static str,
        expanded: usize,
    },
    #[error("depth limit {limit} reached after {expanded} expansions")]
    DepthLimitReached { limit: usize, expanded: usize },
    #[error("search budget exceeded after {expanded} expansions")]
    LimitExceeded { expanded: usize },
}

impl PuzzleError {
    /// Only a depth cutoff is worth retrying (with a larger limit).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PuzzleError::DepthLimitReached { .. })
    }

    /// Short machine-readable name, used in the CLI's JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            PuzzleError::InvalidBoard(_) => "invalid_board",
            PuzzleError::Unsolvable => "unsolvable",
            PuzzleError::InvalidMove { .. } => "invalid_move",
            PuzzleError::SearchExhausted { .. } => "search_exhausted",
            PuzzleError::DepthLimitReached { .. } => "depth_limit_reached",
            PuzzleError::LimitExceeded { .. } => "limit_exceeded",
        }
    }
}

pub type Result<T> = std::result::Result<T, PuzzleError>;

//! 8-puzzle solver library.
//!
//! This crate searches the graph of 3x3 sliding-tile boards for a shortest
//! sequence of blank moves to the goal `1 2 3 / 4 5 6 / 7 8 _`. It provides
//! the board model, admissible heuristics, and A*, BFS and depth-limited DFS
//! traversals, plus a small facade over the flat 9-integer wire format.

pub mod api;
pub mod error;
pub mod heuristics;
pub mod puzzle;
pub mod replay;
pub mod solver;

// Re-export main types
pub use api::{generate_start, solve, validate, SolveRequest, Validation};
pub use error::{PuzzleError, Result};
pub use heuristics::{manhattan, manhattan_linear_conflict, misplaced_tiles, HeuristicKind};
pub use puzzle::{shuffle, Board, Move, Position, GOAL};
pub use replay::{apply_moves, verify_solution, Replay};
pub use solver::{astar, bfs, dfs, Algorithm, SearchResult, SolverConfig};

//! Entry points for callers that speak the flat 9-integer board format
//! (the CLI, or any serving layer built on top of this crate).

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::heuristics::HeuristicKind;
use crate::puzzle::{shuffle_with, Board, GOAL};
use crate::solver::{search, Algorithm, SearchResult, SolverConfig, DEFAULT_DEPTH_LIMIT};

/// Default number of random moves used to build a start board
pub const DEFAULT_SHUFFLE_DEPTH: usize = 40;

/// A solve request as it arrives over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub start: Vec<i64>,
    #[serde(default, rename = "algo")]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub heuristic: HeuristicKind,
    #[serde(default = "default_depth_limit")]
    pub depth_limit: usize,
}

fn default_depth_limit() -> usize {
    DEFAULT_DEPTH_LIMIT
}

impl SolveRequest {
    pub fn new(start: Vec<i64>) -> Self {
        Self {
            start,
            algorithm: Algorithm::default(),
            heuristic: HeuristicKind::default(),
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

/// Outcome of `validate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A solvable, non-goal board from a seeded random walk away from the goal.
///
/// With `seed == None` the walk is seeded from OS entropy.
pub fn generate_start(depth: usize, seed: Option<u64>) -> Board {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut board = shuffle_with(GOAL, depth, &mut rng);
    if board == GOAL {
        debug!("walk of depth {} returned to the goal, walking again", depth);
        board = shuffle_with(GOAL, depth + 1, &mut rng);
    }
    if board == GOAL {
        // The goal always has neighbors.
        board = GOAL.neighbors().first().map_or(GOAL, |&(next, _)| next);
    }
    board
}

/// Structural (and optionally parity) check returning the typed board.
pub fn check(values: &[i64], require_solvable: bool) -> Result<Board> {
    let board = Board::from_slice(values)?;
    if require_solvable && !board.is_solvable() {
        return Err(PuzzleError::Unsolvable);
    }
    Ok(board)
}

pub fn validate(values: &[i64], require_solvable: bool) -> Validation {
    match check(values, require_solvable) {
        Ok(_) => Validation {
            ok: true,
            error: None,
        },
        Err(e) => Validation {
            ok: false,
            error: Some(e.to_string()),
        },
    }
}

/// Validate, then search. Solvability is required unless the algorithm is DFS.
pub fn solve(
    values: &[i64],
    algorithm: Algorithm,
    heuristic: HeuristicKind,
    depth_limit: usize,
) -> Result<SearchResult> {
    solve_with_config(
        values,
        algorithm,
        heuristic,
        depth_limit,
        &SolverConfig::default(),
    )
}

pub fn solve_with_config(
    values: &[i64],
    algorithm: Algorithm,
    heuristic: HeuristicKind,
    depth_limit: usize,
    config: &SolverConfig,
) -> Result<SearchResult> {
    let start = check(values, algorithm.requires_solvable())?;
    debug!(
        "solving {:?} with {} (heuristic={}, depth_limit={})",
        start.tiles(),
        algorithm,
        heuristic,
        depth_limit
    );
    search(algorithm, start, GOAL, heuristic, depth_limit, config)
}

pub fn solve_request(request: &SolveRequest, config: &SolverConfig) -> Result<SearchResult> {
    solve_with_config(
        &request.start,
        request.algorithm,
        request.heuristic,
        request.depth_limit,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_start_is_solvable_non_goal() {
        for seed in 0..20 {
            for depth in [0, 1, 2, 10, 40] {
                let board = generate_start(depth, Some(seed));
                assert_ne!(board, GOAL);
                assert!(board.is_solvable());
            }
        }
        assert_eq!(generate_start(30, Some(9)), generate_start(30, Some(9)));
    }

    #[test]
    fn test_validate_messages() {
        assert_eq!(
            validate(&[1, 2, 3, 4, 5, 6, 7, 8, 0], true),
            Validation {
                ok: true,
                error: None
            }
        );
        let v = validate(&[1, 2, 3], true);
        assert!(!v.ok);
        assert_eq!(
            v.error.as_deref(),
            Some("invalid board: board must have 9 numbers, got 3")
        );
        let v = validate(&[1, 1, 3, 4, 5, 6, 7, 8, 0], false);
        assert_eq!(
            v.error.as_deref(),
            Some("invalid board: board must contain numbers 0..8 exactly once")
        );
        let unsolvable = [2, 1, 3, 4, 5, 6, 7, 8, 0];
        assert_eq!(
            validate(&unsolvable, true).error.as_deref(),
            Some("board is not solvable")
        );
        assert!(validate(&unsolvable, false).ok);
    }

    #[test]
    fn test_solve_gates_on_solvability() {
        let unsolvable = [2, 1, 3, 4, 5, 6, 7, 8, 0];
        assert_eq!(
            solve(&unsolvable, Algorithm::Astar, HeuristicKind::Manhattan, 50),
            Err(PuzzleError::Unsolvable)
        );
        assert_eq!(
            solve(&unsolvable, Algorithm::Bfs, HeuristicKind::Manhattan, 50),
            Err(PuzzleError::Unsolvable)
        );
        // DFS bypasses the gate and fails inside the search instead.
        let err = solve(&unsolvable, Algorithm::Dfs, HeuristicKind::Manhattan, 3).unwrap_err();
        assert!(matches!(err, PuzzleError::DepthLimitReached { limit: 3, .. }));
    }

    #[test]
    fn test_solve_request_defaults() {
        let request: SolveRequest =
            serde_json::from_str(r#"{"start": [1, 2, 3, 4, 5, 6, 7, 0, 8]}"#).unwrap();
        assert_eq!(request, SolveRequest::new(vec![1, 2, 3, 4, 5, 6, 7, 0, 8]));

        let request: SolveRequest = serde_json::from_str(
            r#"{"start": [1, 2, 3, 4, 5, 6, 0, 7, 8], "algo": "bfs", "heuristic": "misplaced", "depth_limit": 7}"#,
        )
        .unwrap();
        assert_eq!(request.algorithm, Algorithm::Bfs);
        assert_eq!(request.heuristic, HeuristicKind::Misplaced);
        assert_eq!(request.depth_limit, 7);

        let result = solve_request(&request, &SolverConfig::default()).unwrap();
        assert_eq!(result.move_string(), "RR");
    }
}

//! Search engine over the implicit puzzle graph.
//!
//! Three traversals share one result shape: A* (optimal with an admissible
//! heuristic), BFS (optimal by move count, used as ground truth) and
//! depth-limited DFS (a baseline, not optimal). Every map and queue lives
//! inside a single call; nothing is shared between searches.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};
use crate::heuristics::HeuristicKind;
use crate::puzzle::{Board, Move};

/// Default DFS depth limit
pub const DEFAULT_DEPTH_LIMIT: usize = 50;

/// Optional budget applied between dequeue and expansion
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Stop after this many expansions
    pub max_expansions: Option<usize>,
    /// Stop once this much wall-clock time has passed
    pub timeout: Option<Duration>,
}

impl SolverConfig {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Traversal strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Astar,
    Bfs,
    Dfs,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Astar => "astar",
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
        }
    }

    /// DFS may run on any permutation; the others need a solvable start.
    pub fn requires_solvable(self) -> bool {
        !matches!(self, Algorithm::Dfs)
    }
}

impl std::str::FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "astar" => Ok(Algorithm::Astar),
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            other => Err(format!("unknown algorithm '{}' (astar, bfs, dfs)", other)),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a successful search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub moves: Vec<Move>,
    /// Always `moves.len()`
    pub cost: usize,
    /// Nodes popped from the frontier and expanded
    pub expanded: usize,
    /// Start to goal inclusive
    pub states: Vec<Board>,
}

impl SearchResult {
    fn trivial(start: Board) -> Self {
        Self {
            moves: Vec::new(),
            cost: 0,
            expanded: 0,
            states: vec![start],
        }
    }

    /// Moves as a compact string, e.g. `"UURDDR"`.
    pub fn move_string(&self) -> String {
        self.moves.iter().map(|m| m.label()).collect()
    }
}

/// Tracks the optional expansion / time budget for one search
struct Budget {
    max_expansions: Option<usize>,
    deadline: Option<Instant>,
}

impl Budget {
    fn new(config: &SolverConfig) -> Self {
        Self {
            max_expansions: config.max_expansions,
            deadline: config.timeout.map(|t| Instant::now() + t),
        }
    }

    fn check(&self, expanded: usize) -> Result<()> {
        let over_count = self.max_expansions.is_some_and(|max| expanded >= max);
        let over_time = self.deadline.is_some_and(|d| Instant::now() > d);
        if over_count || over_time {
            warn!("search budget exhausted after {} expansions", expanded);
            return Err(PuzzleError::LimitExceeded { expanded });
        }
        Ok(())
    }
}

/// Walk parent links back from `goal` and return the forward path.
fn reconstruct(
    parents: &HashMap<Board, (Board, Move)>,
    goal: Board,
    expanded: usize,
) -> SearchResult {
    let mut moves = Vec::new();
    let mut states = vec![goal];
    let mut current = goal;

    while let Some(&(prev, mv)) = parents.get(&current) {
        moves.push(mv);
        states.push(prev);
        current = prev;
    }

    moves.reverse();
    states.reverse();
    SearchResult {
        cost: moves.len(),
        moves,
        expanded,
        states,
    }
}

/// A* frontier entry. Lowest `f` first, earliest insertion on ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    f: usize,
    seq: usize,
    board: Board,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both keys.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* with lazy deletion: stale frontier entries for closed boards are
/// skipped on pop, never removed in place, and closed boards never reopen.
pub fn astar(
    start: Board,
    goal: Board,
    heuristic: HeuristicKind,
    config: &SolverConfig,
) -> Result<SearchResult> {
    if start == goal {
        return Ok(SearchResult::trivial(start));
    }

    let budget = Budget::new(config);
    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<Board, usize> = HashMap::new();
    let mut parents: HashMap<Board, (Board, Move)> = HashMap::new();
    let mut closed: HashSet<Board> = HashSet::new();
    let mut expanded = 0usize;
    let mut seq = 0usize;

    g_score.insert(start, 0);
    open.push(FrontierEntry {
        f: heuristic.estimate(&start, &goal),
        seq,
        board: start,
    });
    seq += 1;

    while let Some(FrontierEntry { board, .. }) = open.pop() {
        if !closed.insert(board) {
            continue;
        }
        budget.check(expanded)?;
        expanded += 1;

        if board == goal {
            let result = reconstruct(&parents, board, expanded);
            debug!(
                "astar({}) solved: cost={} expanded={} frontier={}",
                heuristic,
                result.cost,
                expanded,
                open.len()
            );
            return Ok(result);
        }

        let tentative = g_score.get(&board).copied().unwrap_or(0) + 1;
        for (next, mv) in board.neighbors() {
            let improves = g_score.get(&next).map_or(true, |&g| tentative < g);
            if improves {
                g_score.insert(next, tentative);
                parents.insert(next, (board, mv));
                open.push(FrontierEntry {
                    f: tentative + heuristic.estimate(&next, &goal),
                    seq,
                    board: next,
                });
                seq += 1;
            }
        }
    }

    debug!("astar({}) exhausted after {} expansions", heuristic, expanded);
    Err(PuzzleError::SearchExhausted {
        algorithm: "astar",
        expanded,
    })
}

/// Breadth-first search. Boards are marked seen when enqueued.
pub fn bfs(start: Board, goal: Board, config: &SolverConfig) -> Result<SearchResult> {
    if start == goal {
        return Ok(SearchResult::trivial(start));
    }

    let budget = Budget::new(config);
    let mut queue: VecDeque<Board> = VecDeque::new();
    let mut parents: HashMap<Board, (Board, Move)> = HashMap::new();
    let mut seen: HashSet<Board> = HashSet::new();
    let mut expanded = 0usize;

    queue.push_back(start);
    seen.insert(start);

    while let Some(board) = queue.pop_front() {
        budget.check(expanded)?;
        expanded += 1;

        if board == goal {
            let result = reconstruct(&parents, board, expanded);
            debug!("bfs solved: cost={} expanded={}", result.cost, expanded);
            return Ok(result);
        }

        for (next, mv) in board.neighbors() {
            if seen.insert(next) {
                parents.insert(next, (board, mv));
                queue.push_back(next);
            }
        }
    }

    debug!("bfs exhausted after {} expansions", expanded);
    Err(PuzzleError::SearchExhausted {
        algorithm: "bfs",
        expanded,
    })
}

/// Depth-limited DFS. Boards are marked seen when pushed, so the goal can be
/// missed if its only short route runs through a board first reached deeper.
/// Running dry after cutting off at the limit is `DepthLimitReached`; running
/// dry without ever hitting the limit means the whole component was explored.
pub fn dfs(
    start: Board,
    goal: Board,
    depth_limit: usize,
    config: &SolverConfig,
) -> Result<SearchResult> {
    if start == goal {
        return Ok(SearchResult::trivial(start));
    }

    let budget = Budget::new(config);
    let mut stack: Vec<(Board, usize)> = vec![(start, 0)];
    let mut parents: HashMap<Board, (Board, Move)> = HashMap::new();
    let mut seen: HashSet<Board> = HashSet::new();
    let mut expanded = 0usize;
    let mut cut_off = false;

    seen.insert(start);

    while let Some((board, depth)) = stack.pop() {
        budget.check(expanded)?;
        expanded += 1;

        if board == goal {
            let result = reconstruct(&parents, board, expanded);
            debug!(
                "dfs(limit={}) solved: cost={} expanded={}",
                depth_limit, result.cost, expanded
            );
            return Ok(result);
        }

        if depth >= depth_limit {
            cut_off = true;
            continue;
        }

        for (next, mv) in board.neighbors() {
            if seen.insert(next) {
                parents.insert(next, (board, mv));
                stack.push((next, depth + 1));
            }
        }
    }

    debug!(
        "dfs(limit={}) failed after {} expansions (cut_off={})",
        depth_limit, expanded, cut_off
    );
    if cut_off {
        Err(PuzzleError::DepthLimitReached {
            limit: depth_limit,
            expanded,
        })
    } else {
        Err(PuzzleError::SearchExhausted {
            algorithm: "dfs",
            expanded,
        })
    }
}

/// Run one algorithm. `heuristic` is only consulted by A*, `depth_limit`
/// only by DFS.
pub fn search(
    algorithm: Algorithm,
    start: Board,
    goal: Board,
    heuristic: HeuristicKind,
    depth_limit: usize,
    config: &SolverConfig,
) -> Result<SearchResult> {
    match algorithm {
        Algorithm::Astar => astar(start, goal, heuristic, config),
        Algorithm::Bfs => bfs(start, goal, config),
        Algorithm::Dfs => dfs(start, goal, depth_limit, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::GOAL;
    use crate::replay::replay_all;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    fn unbounded() -> SolverConfig {
        SolverConfig::unbounded()
    }

    #[test]
    fn test_start_is_goal() {
        for algorithm in [Algorithm::Astar, Algorithm::Bfs, Algorithm::Dfs] {
            let result = search(
                algorithm,
                GOAL,
                GOAL,
                HeuristicKind::Manhattan,
                0,
                &unbounded(),
            )
            .unwrap();
            assert_eq!(result, SearchResult::trivial(GOAL));
        }
    }

    #[test]
    fn test_one_move_from_goal() {
        let start = board("123456708");
        let result = astar(start, GOAL, HeuristicKind::Manhattan, &unbounded()).unwrap();
        assert_eq!(result.moves, vec![Move::Right]);
        assert_eq!(result.cost, 1);
        assert_eq!(result.expanded, 2);
        assert_eq!(result.states, vec![start, GOAL]);
    }

    #[test]
    fn test_known_optimal_paths() {
        let start = board("413726058");
        let a = astar(start, GOAL, HeuristicKind::Manhattan, &unbounded()).unwrap();
        assert_eq!(a.move_string(), "UURDDR");
        assert_eq!(a.expanded, 7);

        let b = bfs(start, GOAL, &unbounded()).unwrap();
        assert_eq!(b.move_string(), "UURDDR");
        assert_eq!(b.expanded, 53);
    }

    #[test]
    fn test_astar_matches_bfs_on_hard_board() {
        let start = board("813402765");
        let bfs_result = bfs(start, GOAL, &unbounded()).unwrap();
        assert_eq!(bfs_result.cost, 14);
        for kind in HeuristicKind::ALL {
            let result = astar(start, GOAL, kind, &unbounded()).unwrap();
            assert_eq!(result.cost, bfs_result.cost, "heuristic {}", kind);
            assert_eq!(replay_all(start, &result.moves).unwrap(), result.states);
        }
    }

    #[test]
    fn test_astar_hardest_board() {
        let start = board("867254301");
        let result = astar(
            start,
            GOAL,
            HeuristicKind::ManhattanLinearConflict,
            &unbounded(),
        )
        .unwrap();
        assert_eq!(result.cost, 31);
        assert_eq!(result.states.last(), Some(&GOAL));
    }

    #[test]
    fn test_unsolvable_exhausts() {
        let start = board("213456780");
        assert!(!start.is_solvable());
        let err = astar(start, GOAL, HeuristicKind::Manhattan, &unbounded()).unwrap_err();
        assert!(matches!(
            err,
            PuzzleError::SearchExhausted {
                algorithm: "astar",
                expanded: 181_440
            }
        ));
        let err = bfs(start, GOAL, &unbounded()).unwrap_err();
        assert!(matches!(err, PuzzleError::SearchExhausted { algorithm: "bfs", .. }));
    }

    #[test]
    fn test_dfs_paths() {
        let start = board("123456708");
        let result = dfs(start, GOAL, 5, &unbounded()).unwrap();
        assert_eq!(result.moves, vec![Move::Right]);
        assert_eq!(result.expanded, 2);

        // Not optimal: the optimal answer is "DR".
        let start = board("123406758");
        let result = dfs(start, GOAL, 10, &unbounded()).unwrap();
        assert_eq!(result.move_string(), "RDLURDLURD");
        assert_eq!(result.cost, 10);
        assert_eq!(result.expanded, 61);
    }

    #[test]
    fn test_dfs_depth_limit() {
        let start = board("123456708");
        let err = dfs(start, GOAL, 0, &unbounded()).unwrap_err();
        assert_eq!(
            err,
            PuzzleError::DepthLimitReached {
                limit: 0,
                expanded: 1
            }
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_expansion_budget() {
        let config = SolverConfig {
            max_expansions: Some(3),
            timeout: None,
        };
        let start = board("867254301");
        let err = astar(start, GOAL, HeuristicKind::Manhattan, &config).unwrap_err();
        assert_eq!(err, PuzzleError::LimitExceeded { expanded: 3 });
        let err = bfs(start, GOAL, &config).unwrap_err();
        assert_eq!(err, PuzzleError::LimitExceeded { expanded: 3 });
    }

    #[test]
    fn test_algorithm_names() {
        for algorithm in [Algorithm::Astar, Algorithm::Bfs, Algorithm::Dfs] {
            assert_eq!(algorithm.name().parse::<Algorithm>(), Ok(algorithm));
        }
        assert!("idastar".parse::<Algorithm>().is_err());
        assert!(!Algorithm::Dfs.requires_solvable());
    }

    #[test]
    fn test_frontier_tie_break_is_fifo() {
        let mut heap = BinaryHeap::new();
        heap.push(FrontierEntry { f: 5, seq: 2, board: GOAL });
        heap.push(FrontierEntry { f: 5, seq: 0, board: GOAL });
        heap.push(FrontierEntry { f: 4, seq: 3, board: GOAL });
        heap.push(FrontierEntry { f: 5, seq: 1, board: GOAL });
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.seq)).collect();
        assert_eq!(order, vec![3, 0, 1, 2]);
    }
}

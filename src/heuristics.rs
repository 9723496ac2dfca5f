//! Admissible lower bounds on the number of moves left to reach a goal.
//!
//! Every estimator is a pure function of `(board, goal)` that ignores the
//! blank. All three are consistent, and they are ordered by strength:
//! `misplaced_tiles <= manhattan <= manhattan_linear_conflict`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::puzzle::{Board, Position, CELLS, SIZE};

/// Closed set of heuristics selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    #[default]
    Manhattan,
    Misplaced,
    ManhattanLinearConflict,
}

impl HeuristicKind {
    pub const ALL: [HeuristicKind; 3] = [
        HeuristicKind::Misplaced,
        HeuristicKind::Manhattan,
        HeuristicKind::ManhattanLinearConflict,
    ];

    pub fn estimate(self, board: &Board, goal: &Board) -> usize {
        match self {
            HeuristicKind::Manhattan => manhattan(board, goal),
            HeuristicKind::Misplaced => misplaced_tiles(board, goal),
            HeuristicKind::ManhattanLinearConflict => manhattan_linear_conflict(board, goal),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HeuristicKind::Manhattan => "manhattan",
            HeuristicKind::Misplaced => "misplaced",
            HeuristicKind::ManhattanLinearConflict => "manhattan_linear_conflict",
        }
    }
}

impl std::str::FromStr for HeuristicKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HeuristicKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown heuristic '{}'", s))
    }
}

impl std::fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Non-blank cells whose tile differs from the goal's.
pub fn misplaced_tiles(board: &Board, goal: &Board) -> usize {
    board
        .tiles()
        .iter()
        .zip(goal.tiles())
        .filter(|&(&t, &g)| t != 0 && t != g)
        .count()
}

/// Sum over non-blank tiles of the grid distance to their goal cell.
pub fn manhattan(board: &Board, goal: &Board) -> usize {
    let goal_index = goal.positions();
    board
        .tiles()
        .iter()
        .enumerate()
        .filter(|&(_, &t)| t != 0)
        .map(|(i, &t)| Position::of(i).manhattan(Position::of(goal_index[t as usize])))
        .sum()
}

/// Manhattan distance plus two moves for every tile that has to leave its
/// row or column to let the others in that line pass.
pub fn manhattan_linear_conflict(board: &Board, goal: &Board) -> usize {
    let goal_index = goal.positions();
    manhattan(board, goal) + 2 * (row_conflicts(board, &goal_index) + col_conflicts(board, &goal_index))
}

fn row_conflicts(board: &Board, goal_index: &[usize; CELLS]) -> usize {
    (0..SIZE)
        .map(|row| {
            let offsets: SmallVec<[usize; SIZE]> = (0..SIZE)
                .map(|col| board.tile(Position { row, col }.index()))
                .filter(|&t| t != 0)
                .map(|t| Position::of(goal_index[t as usize]))
                .filter(|target| target.row == row)
                .map(|target| target.col)
                .collect();
            tiles_to_remove(&offsets)
        })
        .sum()
}

fn col_conflicts(board: &Board, goal_index: &[usize; CELLS]) -> usize {
    (0..SIZE)
        .map(|col| {
            let offsets: SmallVec<[usize; SIZE]> = (0..SIZE)
                .map(|row| board.tile(Position { row, col }.index()))
                .filter(|&t| t != 0)
                .map(|t| Position::of(goal_index[t as usize]))
                .filter(|target| target.col == col)
                .map(|target| target.row)
                .collect();
            tiles_to_remove(&offsets)
        })
        .sum()
}

/// Fewest tiles that must leave a line so the rest are in goal order:
/// the line's length minus its longest increasing run of goal offsets.
/// Counting every inverted pair instead would overestimate a fully
/// reversed line of three.
fn tiles_to_remove(offsets: &[usize]) -> usize {
    let mut longest: SmallVec<[usize; SIZE]> = SmallVec::new();
    for (i, &offset) in offsets.iter().enumerate() {
        let best = (0..i)
            .filter(|&j| offsets[j] < offset)
            .map(|j| longest[j] + 1)
            .max()
            .unwrap_or(1);
        longest.push(best);
    }
    offsets.len() - longest.iter().copied().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::GOAL;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn test_goal_is_zero() {
        for kind in HeuristicKind::ALL {
            assert_eq!(kind.estimate(&GOAL, &GOAL), 0);
        }
    }

    #[test]
    fn test_known_values() {
        let b = board("813402765");
        assert_eq!(misplaced_tiles(&b, &GOAL), 5);
        assert_eq!(manhattan(&b, &GOAL), 10);
        assert_eq!(manhattan_linear_conflict(&b, &GOAL), 10);

        // Hardest 8-puzzle board, 31 moves from the goal.
        let b = board("867254301");
        assert_eq!(misplaced_tiles(&b, &GOAL), 7);
        assert_eq!(manhattan(&b, &GOAL), 21);
        assert_eq!(manhattan_linear_conflict(&b, &GOAL), 23);

        let b = board("012345678");
        assert_eq!(misplaced_tiles(&b, &GOAL), 8);
        assert_eq!(manhattan(&b, &GOAL), 12);
    }

    #[test]
    fn test_row_and_column_conflicts() {
        // 2/1 swapped in the top row and 8/7 in the bottom row.
        let b = board("213456870");
        assert_eq!(manhattan(&b, &GOAL), 4);
        assert_eq!(manhattan_linear_conflict(&b, &GOAL), 8);

        // Column 0 holds 1, 7, 4: one tile has to step out.
        let b = board("123756480");
        assert_eq!(manhattan(&b, &GOAL), 2);
        assert_eq!(manhattan_linear_conflict(&b, &GOAL), 4);

        // A fully reversed row needs two tiles out of the line, not three pairs.
        let b = board("321456780");
        assert_eq!(manhattan_linear_conflict(&b, &GOAL), 4 + 2 * 2);
    }

    #[test]
    fn test_tiles_to_remove() {
        assert_eq!(tiles_to_remove(&[]), 0);
        assert_eq!(tiles_to_remove(&[0, 1, 2]), 0);
        assert_eq!(tiles_to_remove(&[1, 0]), 1);
        assert_eq!(tiles_to_remove(&[1, 2, 0]), 1);
        assert_eq!(tiles_to_remove(&[2, 1, 0]), 2);
    }

    #[test]
    fn test_custom_goal() {
        let goal = board("012345678");
        let b = board("102345678");
        assert_eq!(misplaced_tiles(&b, &goal), 1);
        assert_eq!(manhattan(&b, &goal), 1);
        assert_eq!(manhattan_linear_conflict(&b, &goal), 1);
    }

    #[test]
    fn test_names_round_trip_through_serde() {
        for kind in HeuristicKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
            let back: HeuristicKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
            assert_eq!(kind.name().parse::<HeuristicKind>(), Ok(kind));
        }
        assert!("euclid".parse::<HeuristicKind>().is_err());
    }
}

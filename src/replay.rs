//! Move-sequence replay.
//!
//! Replays a list of blank moves from a start board one state at a time. The
//! iterator yields the start board first, then one board per move, and stops
//! with an `InvalidMove` error at the first move that is not legal.

use crate::error::{PuzzleError, Result};
use crate::puzzle::{Board, Move, GOAL};

/// Lazy replay of `moves` from a start board
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    current: Board,
    moves: std::slice::Iter<'a, Move>,
    started: bool,
    failed: bool,
}

impl Iterator for Replay<'_> {
    type Item = Result<Board>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(Ok(self.current));
        }

        let &mv = self.moves.next()?;
        match self.current.apply(mv) {
            Some(next) => {
                self.current = next;
                Some(Ok(next))
            }
            None => {
                self.failed = true;
                Some(Err(PuzzleError::InvalidMove {
                    mv,
                    board: self.current,
                }))
            }
        }
    }
}

/// Replay `moves` from `start`, one state at a time.
pub fn apply_moves(start: Board, moves: &[Move]) -> Replay<'_> {
    Replay {
        current: start,
        moves: moves.iter(),
        started: false,
        failed: false,
    }
}

/// Eagerly replay and collect every state, start included.
pub fn replay_all(start: Board, moves: &[Move]) -> Result<Vec<Board>> {
    apply_moves(start, moves).collect()
}

/// Does `moves` take `start` to the goal?
pub fn verify_solution(start: Board, moves: &[Move]) -> bool {
    match apply_moves(start, moves).last() {
        Some(Ok(end)) => end == GOAL,
        _ => false,
    }
}

use std::cmp::Reverse;

use crate::models::{Code, ScoreTable};

/// Outcome of narrowing a tied candidate field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrowing {
    /// Field of two or fewer; the heuristic stays out of it. A strict
    /// two-way tie is always settled by the player, never by math.
    Unchanged(Vec<Code>),
    /// Field of three or more cut to the two strongest candidates.
    Narrowed {
        survivors: [Code; 2],
        eliminated: Vec<Code>,
    },
}

/// Combined score of the two hexagon neighbors, read from the full
/// original table. Codes that already hold a rank still count as
/// neighbors; the heuristic measures where on the hexagon the whole run
/// leaned, not just the unresolved remainder.
pub fn adjacent_sum(table: &ScoreTable, code: Code) -> u32 {
    let (left, right) = code.neighbors();
    table.get(left) + table.get(right)
}

fn sorted_by_strength(table: &ScoreTable, candidates: &[Code]) -> Vec<Code> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by_key(|&code| (Reverse(adjacent_sum(table, code)), code.index()));
    ordered
}

/// Cut a tie of three or more down to exactly two survivors, ordered
/// strongest first. Smaller fields come back unchanged.
pub fn narrow(table: &ScoreTable, candidates: &[Code]) -> Narrowing {
    if candidates.len() <= 2 {
        return Narrowing::Unchanged(candidates.to_vec());
    }
    let ordered = sorted_by_strength(table, candidates);
    Narrowing::Narrowed {
        survivors: [ordered[0], ordered[1]],
        eliminated: ordered[2..].to_vec(),
    }
}

/// Single best candidate by adjacent sum, then default priority order.
/// This is the whole of the third-rank decision; no mission is ever
/// staged for it.
pub fn collapse(table: &ScoreTable, candidates: &[Code]) -> Option<Code> {
    sorted_by_strength(table, candidates).first().copied()
}

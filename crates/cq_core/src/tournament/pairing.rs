use std::cmp::Reverse;

use crate::models::{Code, CodePair};

/// Every unordered pair over the candidate field, in staging priority
/// order: hexagon distance descending (opposite pairs sit at distance 3,
/// so they lead automatically), then the pair whose priority-order-first
/// member comes earliest, then the remaining member. Deterministic for
/// any input order.
pub fn ranked_pairs(candidates: &[Code]) -> Vec<CodePair> {
    let mut pairs = Vec::with_capacity(candidates.len() * (candidates.len().saturating_sub(1)) / 2);
    for (i, &a) in candidates.iter().enumerate() {
        for &b in &candidates[i + 1..] {
            if let Some(pair) = CodePair::new(a, b) {
                pairs.push(pair);
            }
        }
    }
    pairs.sort_by_key(|pair| {
        (
            Reverse(pair.distance()),
            pair.priority_lead().index(),
            pair.priority_tail().index(),
        )
    });
    pairs
}

use thiserror::Error;

use crate::models::Code;
use crate::tournament::types::{Rank, ResolutionPhase};

/// Failures that terminate a resolution run. None of these are retried;
/// the orchestrator parks in its failed phase and the caller surfaces the
/// diagnostic. A rank is never fabricated to paper over one.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TournamentError {
    /// No authored tie mission matched any candidate pair, in priority
    /// order. A content-authoring defect: the catalog must cover every
    /// pair a run can produce.
    #[error(
        "no tie mission covers any rank-{} pair (candidates: {}; attempted keys: {})",
        rank.number(),
        join_codes(candidates),
        attempted.join(", ")
    )]
    MissionCoverage {
        rank: Rank,
        candidates: Vec<Code>,
        attempted: Vec<String>,
    },

    /// The candidate field for an unresolved rank came back with too few
    /// codes to proceed. A programming error, not a content problem.
    #[error("rank-{} resolution reached an unworkable field of {size}", rank.number())]
    EmptyField { rank: Rank, size: usize },

    /// A choice arrived while no mission was staged.
    #[error("choice submitted in phase '{phase}', expected awaiting-choice")]
    NotAwaitingChoice { phase: ResolutionPhase },

    /// `start` called on a resolver that already ran.
    #[error("resolution already started (phase '{phase}')")]
    AlreadyStarted { phase: ResolutionPhase },
}

impl TournamentError {
    /// True for defects in authored content, false for programming or
    /// call-order errors.
    pub fn is_content_error(&self) -> bool {
        matches!(self, TournamentError::MissionCoverage { .. })
    }
}

fn join_codes(codes: &[Code]) -> String {
    codes
        .iter()
        .map(|code| code.letter().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

use crate::catalog::ContentCatalog;
use crate::models::{Code, CodePair, OptionKey, TieMission};
use crate::tournament::error::TournamentError;
use crate::tournament::pairing::ranked_pairs;
use crate::tournament::types::Rank;

/// Winner-stays elimination over one contested rank.
///
/// Each round stages the highest-priority pair the catalog has a mission
/// for; the chosen option's code wins the round and the other code leaves
/// the field. When one code remains it takes the contested rank, and the
/// loser of that last round takes the next rank outright. The field only
/// ever shrinks; a removed code is never reconsidered.
#[derive(Debug, Clone)]
pub struct RankTournament {
    rank: Rank,
    field: Vec<Code>,
    staged: TieMission,
    attempted: Vec<String>,
}

/// What one decided round leads to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundOutcome {
    /// More contenders remain; call [`RankTournament::restage`] next.
    Continuing,
    /// The rank is decided, and the round's loser holds the next rank.
    Resolved { winner: Code, runner_up: Code },
}

/// Everything the caller needs to record about one decided round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub pair: CodePair,
    pub mission_id: String,
    pub winner: Code,
    pub loser: Code,
    pub outcome: RoundOutcome,
}

impl RankTournament {
    /// Open the tournament over a field of at least two contenders and
    /// stage its first mission.
    pub fn open(
        rank: Rank,
        candidates: &[Code],
        catalog: &ContentCatalog,
    ) -> Result<RankTournament, TournamentError> {
        if candidates.len() < 2 {
            return Err(TournamentError::EmptyField {
                rank,
                size: candidates.len(),
            });
        }
        let field = candidates.to_vec();
        let mut attempted = Vec::new();
        let staged = stage_mission(rank, &field, catalog, &mut attempted)?;
        tracing::debug!(
            rank = rank.number(),
            contenders = field.len(),
            pair = %staged.pair.key(),
            "tie-break opened"
        );
        Ok(RankTournament {
            rank,
            field,
            staged,
            attempted,
        })
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Mission currently waiting on a choice.
    pub fn staged(&self) -> &TieMission {
        &self.staged
    }

    pub fn field(&self) -> &[Code] {
        &self.field
    }

    /// Pair keys tried against the catalog without a hit so far.
    pub fn attempted(&self) -> &[String] {
        &self.attempted
    }

    /// Apply one choice to the staged mission and shrink the field. Never
    /// fails: the round is decided by the choice alone. When the outcome
    /// is [`RoundOutcome::Continuing`], follow up with
    /// [`RankTournament::restage`]; its failure mode must not swallow the
    /// round that was just decided.
    pub fn apply(&mut self, key: OptionKey) -> RoundReport {
        let (chosen, rejected) = self.staged.split(key);
        let winner = chosen.code;
        let loser = rejected.code;
        let pair = self.staged.pair;
        let mission_id = self.staged.id.clone();

        self.field.retain(|&code| code != loser);
        tracing::debug!(
            rank = self.rank.number(),
            pair = %pair.key(),
            winner = %winner,
            loser = %loser,
            remaining = self.field.len(),
            "round decided"
        );

        let outcome = if self.field.len() == 1 {
            RoundOutcome::Resolved {
                winner,
                runner_up: loser,
            }
        } else {
            RoundOutcome::Continuing
        };

        RoundReport {
            pair,
            mission_id,
            winner,
            loser,
            outcome,
        }
    }

    /// Stage the next round's mission over the shrunken field.
    pub fn restage(&mut self, catalog: &ContentCatalog) -> Result<TieMission, TournamentError> {
        let staged = stage_mission(self.rank, &self.field, catalog, &mut self.attempted)?;
        self.staged = staged.clone();
        Ok(staged)
    }
}

/// First pair in priority order the catalog can actually back with a
/// mission. Misses land in `attempted` so a total failure can report
/// exactly what was tried.
fn stage_mission(
    rank: Rank,
    field: &[Code],
    catalog: &ContentCatalog,
    attempted: &mut Vec<String>,
) -> Result<TieMission, TournamentError> {
    for pair in ranked_pairs(field) {
        match catalog.tie_mission(pair) {
            Some(mission) => return Ok(mission.clone()),
            None => attempted.push(pair.key()),
        }
    }
    tracing::error!(
        rank = rank.number(),
        field = ?field,
        "no tie mission covers the contested field"
    );
    Err(TournamentError::MissionCoverage {
        rank,
        candidates: field.to_vec(),
        attempted: attempted.clone(),
    })
}

use chrono::Utc;

use crate::catalog::ContentCatalog;
use crate::models::{Code, OptionKey, ScoreTable, TieMission};
use crate::scoring::{collapse, leaders, narrow, Narrowing};
use crate::tournament::engine::{RankTournament, RoundOutcome, RoundReport};
use crate::tournament::error::TournamentError;
use crate::tournament::types::{
    Rank, ResolutionPhase, ResolutionUpdate, ResolvedRanks, TournamentComparison,
};

/// Drives one run's rank resolution from a sealed score table to three
/// assigned ranks.
///
/// Owns the machine state for exactly one run: phase, assigned ranks, the
/// active tournament, the comparison trace, and the pool of codes set
/// aside when a three-plus first-rank tie was narrowed (those seed the
/// third rank directly, skipping the second entirely). The catalog is
/// borrowed per transition and never stored.
///
/// Transitions are synchronous and total: current state plus one input
/// yields the next state, with no I/O and no randomness. Feeding the same
/// table and the same choice sequence always produces the same ranks and
/// the same trace ordinals.
#[derive(Debug, Clone)]
pub struct RankResolver {
    table: ScoreTable,
    phase: ResolutionPhase,
    ranks: ResolvedRanks,
    narrowing_pool: Vec<Code>,
    active: Option<RankTournament>,
    trace: Vec<TournamentComparison>,
    failure: Option<TournamentError>,
}

impl RankResolver {
    /// Fresh resolver over a completed score table.
    pub fn new(table: ScoreTable) -> Self {
        RankResolver {
            table,
            phase: ResolutionPhase::Pending,
            ranks: ResolvedRanks::default(),
            narrowing_pool: Vec::new(),
            active: None,
            trace: Vec::new(),
            failure: None,
        }
    }

    pub fn phase(&self) -> ResolutionPhase {
        self.phase
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    pub fn ranks(&self) -> &ResolvedRanks {
        &self.ranks
    }

    pub fn trace(&self) -> &[TournamentComparison] {
        &self.trace
    }

    /// Mission waiting on a choice, when the phase is awaiting one.
    pub fn staged_mission(&self) -> Option<&TieMission> {
        self.active.as_ref().map(|tournament| tournament.staged())
    }

    /// Codes eliminated by first-rank narrowing, still holding a claim on
    /// the third rank.
    pub fn narrowing_pool(&self) -> &[Code] {
        &self.narrowing_pool
    }

    /// Terminal error, once the resolver has failed.
    pub fn failure(&self) -> Option<&TournamentError> {
        self.failure.as_ref()
    }

    /// Begin resolution. Auto-resolvable ranks are assigned on the spot;
    /// the first genuine tie stages a mission and waits.
    pub fn start(&mut self, catalog: &ContentCatalog) -> Result<ResolutionUpdate, TournamentError> {
        if self.phase != ResolutionPhase::Pending {
            return Err(TournamentError::AlreadyStarted { phase: self.phase });
        }

        let candidates = leaders(&self.table, &[]);
        tracing::debug!(
            candidates = ?candidates,
            "rank 1 field selected"
        );
        match candidates.len() {
            0 => self.fail(TournamentError::EmptyField {
                rank: Rank::First,
                size: 0,
            }),
            1 => {
                self.assign(Rank::First, candidates[0]);
                self.derive_rank2(catalog)
            }
            2 => self.open_tournament(Rank::First, &candidates, catalog),
            _ => match narrow(&self.table, &candidates) {
                Narrowing::Narrowed {
                    survivors,
                    eliminated,
                } => {
                    tracing::debug!(
                        survivors = ?survivors,
                        eliminated = ?eliminated,
                        "rank 1 field narrowed"
                    );
                    self.narrowing_pool = eliminated;
                    self.open_tournament(Rank::First, &survivors, catalog)
                }
                Narrowing::Unchanged(field) => self.open_tournament(Rank::First, &field, catalog),
            },
        }
    }

    /// Apply the player's answer to the staged mission.
    pub fn submit_choice(
        &mut self,
        key: OptionKey,
        catalog: &ContentCatalog,
    ) -> Result<ResolutionUpdate, TournamentError> {
        if !matches!(self.phase, ResolutionPhase::AwaitingChoice { .. }) {
            return Err(TournamentError::NotAwaitingChoice { phase: self.phase });
        }
        let mut tournament = match self.active.take() {
            Some(tournament) => tournament,
            None => {
                return Err(TournamentError::NotAwaitingChoice { phase: self.phase });
            }
        };

        let rank = tournament.rank();
        let report = tournament.apply(key);
        self.record(rank, &report);

        match report.outcome {
            RoundOutcome::Resolved { winner, runner_up } => {
                self.after_tournament(rank, winner, runner_up)
            }
            RoundOutcome::Continuing => match tournament.restage(catalog) {
                Ok(mission) => {
                    self.active = Some(tournament);
                    self.phase = ResolutionPhase::AwaitingChoice { rank };
                    Ok(ResolutionUpdate::AwaitingChoice { rank, mission })
                }
                Err(err) => self.fail(err),
            },
        }
    }

    /// A tournament settled rank `rank`; its last-round loser takes the
    /// following rank outright.
    fn after_tournament(
        &mut self,
        rank: Rank,
        winner: Code,
        runner_up: Code,
    ) -> Result<ResolutionUpdate, TournamentError> {
        self.assign(rank, winner);
        if let Some(next) = rank.next() {
            self.assign(next, runner_up);
        }

        match rank {
            Rank::First if !self.narrowing_pool.is_empty() => {
                // Narrowing losers contest the third rank directly; the
                // second rank is already taken by the cascade.
                let pool = std::mem::take(&mut self.narrowing_pool);
                match collapse(&self.table, &pool) {
                    Some(third) => {
                        self.assign(Rank::Third, third);
                        self.complete()
                    }
                    None => self.fail(TournamentError::EmptyField {
                        rank: Rank::Third,
                        size: 0,
                    }),
                }
            }
            Rank::First => self.derive_rank3(),
            _ => self.complete(),
        }
    }

    /// Second-rank derivation for runs whose first rank was assigned
    /// without a tournament.
    fn derive_rank2(
        &mut self,
        catalog: &ContentCatalog,
    ) -> Result<ResolutionUpdate, TournamentError> {
        let candidates = leaders(&self.table, &self.ranks.assigned());
        tracing::debug!(candidates = ?candidates, "rank 2 field selected");
        match candidates.len() {
            0 => self.fail(TournamentError::EmptyField {
                rank: Rank::Second,
                size: 0,
            }),
            1 => {
                self.assign(Rank::Second, candidates[0]);
                self.derive_rank3()
            }
            2 => self.open_tournament(Rank::Second, &candidates, catalog),
            _ => match narrow(&self.table, &candidates) {
                Narrowing::Narrowed { survivors, .. } => {
                    // Codes cut here hold no later claim; if the coming
                    // tournament resolves, its loser takes the third rank.
                    self.open_tournament(Rank::Second, &survivors, catalog)
                }
                Narrowing::Unchanged(field) => self.open_tournament(Rank::Second, &field, catalog),
            },
        }
    }

    /// Third-rank derivation: pure scoring math, never a mission.
    fn derive_rank3(&mut self) -> Result<ResolutionUpdate, TournamentError> {
        let candidates = leaders(&self.table, &self.ranks.assigned());
        tracing::debug!(candidates = ?candidates, "rank 3 field selected");
        match candidates.len() {
            0 => self.fail(TournamentError::EmptyField {
                rank: Rank::Third,
                size: 0,
            }),
            1 => {
                self.assign(Rank::Third, candidates[0]);
                self.complete()
            }
            _ => match collapse(&self.table, &candidates) {
                Some(third) => {
                    self.assign(Rank::Third, third);
                    self.complete()
                }
                None => self.fail(TournamentError::EmptyField {
                    rank: Rank::Third,
                    size: 0,
                }),
            },
        }
    }

    fn open_tournament(
        &mut self,
        rank: Rank,
        candidates: &[Code],
        catalog: &ContentCatalog,
    ) -> Result<ResolutionUpdate, TournamentError> {
        match RankTournament::open(rank, candidates, catalog) {
            Ok(tournament) => {
                let mission = tournament.staged().clone();
                self.active = Some(tournament);
                self.phase = ResolutionPhase::AwaitingChoice { rank };
                Ok(ResolutionUpdate::AwaitingChoice { rank, mission })
            }
            Err(err) => self.fail(err),
        }
    }

    fn assign(&mut self, rank: Rank, code: Code) {
        tracing::info!(rank = rank.number(), code = %code, "rank assigned");
        self.ranks.assign(rank, code);
    }

    fn record(&mut self, rank: Rank, report: &RoundReport) {
        self.trace.push(TournamentComparison {
            seq: self.trace.len() as u32,
            rank,
            pair: report.pair,
            mission_id: report.mission_id.clone(),
            winner: report.winner,
            loser: report.loser,
            decided_at: Utc::now(),
        });
    }

    fn complete(&mut self) -> Result<ResolutionUpdate, TournamentError> {
        match self.ranks.as_complete() {
            Some(ranks) => {
                self.phase = ResolutionPhase::Complete;
                tracing::info!(
                    rank1 = %ranks[0],
                    rank2 = %ranks[1],
                    rank3 = %ranks[2],
                    comparisons = self.trace.len(),
                    "resolution complete"
                );
                Ok(ResolutionUpdate::Complete { ranks })
            }
            None => {
                let missing = [Rank::First, Rank::Second, Rank::Third]
                    .into_iter()
                    .find(|&rank| self.ranks.get(rank).is_none())
                    .unwrap_or(Rank::Third);
                self.fail(TournamentError::EmptyField {
                    rank: missing,
                    size: 0,
                })
            }
        }
    }

    fn fail(&mut self, err: TournamentError) -> Result<ResolutionUpdate, TournamentError> {
        tracing::error!(error = %err, "rank resolution failed");
        self.phase = ResolutionPhase::Failed;
        self.failure = Some(err.clone());
        self.active = None;
        Err(err)
    }
}

//! One player's run from avatar pick to summary.
//!
//! [`GameSession`] is the integration surface the presentation shell
//! talks to. It walks the phase machine, tallies main-mission picks into
//! the score table, hands the sealed table to the rank resolver, and
//! gates the summary behind lead capture. All game semantics below it
//! are pure; the session adds identity, timestamps, and phase guards.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Avatar, CodeSummary, ContentCatalog};
use crate::error::{CoreError, Result};
use crate::models::{Code, Lead, MainMission, OptionKey, ScoreTable, TieMission};
use crate::tournament::{
    RankResolver, ResolutionUpdate, ResolvedRanks, TournamentComparison, TournamentError,
};

/// Display bonus added to the three ranked codes on the summary screen,
/// first rank first. Presentation data only.
pub const DISPLAY_BONUS: [u32; 3] = [30, 20, 10];

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum GamePhase {
    AvatarSelect,
    Intro,
    MainMissions { index: usize },
    TieBreak,
    LeadCapture,
    Summary,
    Failed,
}

/// One recorded main-mission decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionPick {
    pub mission_id: String,
    pub key: OptionKey,
    pub code: Code,
}

/// One line of the final ranking with its summary copy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedCode {
    pub rank: u8,
    pub code: Code,
    pub title: String,
    pub description: String,
    pub careers: Vec<String>,
    pub display_score: u32,
}

/// Everything the summary screen renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub session_id: Uuid,
    pub avatar_id: Option<String>,
    pub ranked: Vec<RankedCode>,
    pub raw_scores: ScoreTable,
    pub display_scores: ScoreTable,
    pub picks: Vec<MissionPick>,
    pub trace: Vec<TournamentComparison>,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    id: Uuid,
    catalog: Arc<ContentCatalog>,
    phase: GamePhase,
    avatar_id: Option<String>,
    table: ScoreTable,
    picks: Vec<MissionPick>,
    resolver: Option<RankResolver>,
    lead: Option<Lead>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl GameSession {
    pub fn new(catalog: Arc<ContentCatalog>) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session = %id, "session created");
        GameSession {
            id,
            catalog,
            phase: GamePhase::AvatarSelect,
            avatar_id: None,
            table: ScoreTable::new(),
            picks: Vec::new(),
            resolver: None,
            lead: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn avatar(&self) -> Option<&Avatar> {
        self.avatar_id
            .as_deref()
            .and_then(|id| self.catalog.avatar(id))
    }

    pub fn table(&self) -> &ScoreTable {
        &self.table
    }

    pub fn picks(&self) -> &[MissionPick] {
        &self.picks
    }

    pub fn lead(&self) -> Option<&Lead> {
        self.lead.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn resolver(&self) -> Option<&RankResolver> {
        self.resolver.as_ref()
    }

    pub fn ranks(&self) -> Option<&ResolvedRanks> {
        self.resolver.as_ref().map(|resolver| resolver.ranks())
    }

    /// Terminal resolution error, when the run failed.
    pub fn failure(&self) -> Option<&TournamentError> {
        self.resolver.as_ref().and_then(|resolver| resolver.failure())
    }

    /// (answered, total) over the main sequence.
    pub fn main_progress(&self) -> (usize, usize) {
        (self.picks.len(), self.catalog.main_missions.len())
    }

    pub fn current_main_mission(&self) -> Option<&MainMission> {
        match self.phase {
            GamePhase::MainMissions { index } => self.catalog.main_missions.get(index),
            _ => None,
        }
    }

    pub fn staged_tie_mission(&self) -> Option<&TieMission> {
        match self.phase {
            GamePhase::TieBreak => self
                .resolver
                .as_ref()
                .and_then(|resolver| resolver.staged_mission()),
            _ => None,
        }
    }

    pub fn choose_avatar(&mut self, avatar_id: &str) -> Result<()> {
        if self.phase != GamePhase::AvatarSelect {
            return Err(CoreError::PhaseViolation(format!(
                "avatar can only be chosen at the start, current phase {:?}",
                self.phase
            )));
        }
        if self.catalog.avatar(avatar_id).is_none() {
            return Err(CoreError::NotFound(format!(
                "avatar '{}' is not in the catalog",
                avatar_id
            )));
        }
        self.avatar_id = Some(avatar_id.to_string());
        self.phase = GamePhase::Intro;
        tracing::info!(session = %self.id, avatar = avatar_id, "avatar chosen");
        Ok(())
    }

    /// Leave the intro screen and begin the main sequence.
    pub fn begin(&mut self) -> Result<()> {
        if self.phase != GamePhase::Intro {
            return Err(CoreError::PhaseViolation(format!(
                "begin is only valid from the intro, current phase {:?}",
                self.phase
            )));
        }
        if self.catalog.main_missions.is_empty() {
            return self.seal_scores();
        }
        self.phase = GamePhase::MainMissions { index: 0 };
        Ok(())
    }

    /// Answer whatever mission is on screen, main or tie-break.
    pub fn choose(&mut self, key: OptionKey) -> Result<()> {
        match self.phase {
            GamePhase::MainMissions { index } => self.choose_main(index, key),
            GamePhase::TieBreak => self.choose_tie(key),
            _ => Err(CoreError::PhaseViolation(format!(
                "no mission awaits a choice in phase {:?}",
                self.phase
            ))),
        }
    }

    fn choose_main(&mut self, index: usize, key: OptionKey) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let mission = catalog.main_missions.get(index).ok_or_else(|| {
            CoreError::PhaseViolation(format!("main mission index {} out of range", index))
        })?;
        let code = mission.option(key).code;

        self.table.record(code);
        self.picks.push(MissionPick {
            mission_id: mission.id.clone(),
            key,
            code,
        });
        tracing::debug!(
            session = %self.id,
            mission = %mission.id,
            code = %code,
            "main mission answered"
        );

        if index + 1 < catalog.main_missions.len() {
            self.phase = GamePhase::MainMissions { index: index + 1 };
            Ok(())
        } else {
            self.seal_scores()
        }
    }

    fn choose_tie(&mut self, key: OptionKey) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let resolver = self.resolver.as_mut().ok_or_else(|| {
            CoreError::PhaseViolation("tie-break phase without an active resolver".to_string())
        })?;
        match resolver.submit_choice(key, &catalog) {
            Ok(ResolutionUpdate::AwaitingChoice { .. }) => Ok(()),
            Ok(ResolutionUpdate::Complete { .. }) => {
                self.phase = GamePhase::LeadCapture;
                tracing::info!(session = %self.id, "tie-break complete, awaiting lead");
                Ok(())
            }
            Err(err) => {
                if resolver.failure().is_some() {
                    self.phase = GamePhase::Failed;
                }
                Err(err.into())
            }
        }
    }

    /// Main sequence over: freeze the table and hand it to the resolver.
    fn seal_scores(&mut self) -> Result<()> {
        let catalog = Arc::clone(&self.catalog);
        let mut resolver = RankResolver::new(self.table.clone());
        let outcome = resolver.start(&catalog);
        self.resolver = Some(resolver);
        match outcome {
            Ok(ResolutionUpdate::AwaitingChoice { .. }) => {
                self.phase = GamePhase::TieBreak;
                tracing::info!(session = %self.id, "scores sealed, tie-break staged");
                Ok(())
            }
            Ok(ResolutionUpdate::Complete { .. }) => {
                self.phase = GamePhase::LeadCapture;
                tracing::info!(session = %self.id, "scores sealed, ranks auto-resolved");
                Ok(())
            }
            Err(err) => {
                self.phase = GamePhase::Failed;
                Err(err.into())
            }
        }
    }

    /// Attach a validated lead and unlock the summary.
    pub fn submit_lead(&mut self, lead: Lead) -> Result<()> {
        if self.phase != GamePhase::LeadCapture {
            return Err(CoreError::PhaseViolation(format!(
                "lead capture is not open in phase {:?}",
                self.phase
            )));
        }
        lead.ensure_valid()?;
        self.lead = Some(lead);
        self.completed_at = Some(Utc::now());
        self.phase = GamePhase::Summary;
        tracing::info!(session = %self.id, "lead captured, summary unlocked");
        Ok(())
    }

    /// The final screen's data. Only available once the run reached the
    /// summary phase.
    pub fn summary(&self) -> Result<RunSummary> {
        if self.phase != GamePhase::Summary {
            return Err(CoreError::PhaseViolation(format!(
                "summary is not available in phase {:?}",
                self.phase
            )));
        }
        let resolver = self.resolver.as_ref().ok_or_else(|| {
            CoreError::PhaseViolation("summary phase without a resolver".to_string())
        })?;
        let ranks = resolver.ranks().as_complete().ok_or_else(|| {
            CoreError::PhaseViolation("summary phase with unresolved ranks".to_string())
        })?;

        let display_scores = self.table.bonus_adjusted(ranks, DISPLAY_BONUS);
        let ranked = ranks
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                let summary = self
                    .catalog
                    .summary(code)
                    .cloned()
                    .unwrap_or_else(|| CodeSummary {
                        title: code.to_string(),
                        description: String::new(),
                        careers: vec![],
                    });
                RankedCode {
                    rank: i as u8 + 1,
                    code,
                    title: summary.title,
                    description: summary.description,
                    careers: summary.careers,
                    display_score: display_scores.get(code),
                }
            })
            .collect();

        Ok(RunSummary {
            session_id: self.id,
            avatar_id: self.avatar_id.clone(),
            ranked,
            raw_scores: self.table.clone(),
            display_scores,
            picks: self.picks.clone(),
            trace: resolver.trace().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_fixtures;

    fn session() -> GameSession {
        GameSession::new(Arc::new(test_fixtures::catalog()))
    }

    fn valid_lead() -> Lead {
        Lead {
            full_name: "נועה לוי".into(),
            phone: "050-1234567".into(),
            email: "noa@example.com".into(),
        }
    }

    fn answer_mains(session: &mut GameSession, keys: &[OptionKey]) {
        for &key in keys {
            session.choose(key).unwrap();
        }
    }

    #[test]
    fn test_full_run_through_a_two_way_tie() {
        let mut session = session();
        assert_eq!(session.phase(), GamePhase::AvatarSelect);

        session.choose_avatar("explorer").unwrap();
        assert_eq!(session.phase(), GamePhase::Intro);
        session.begin().unwrap();
        assert_eq!(session.phase(), GamePhase::MainMissions { index: 0 });

        // All-A picks land on r:3 i:3 a:1 s:1 e:1 c:1.
        answer_mains(&mut session, &[OptionKey::A; 10]);
        assert_eq!(session.phase(), GamePhase::TieBreak);
        assert_eq!(session.table().get(Code::Realistic), 3);
        assert_eq!(session.table().get(Code::Investigative), 3);
        let staged = session.staged_tie_mission().unwrap();
        assert_eq!(staged.pair.key(), "ir");

        // Side A scores i; cascade puts r second, math puts a third.
        session.choose(OptionKey::A).unwrap();
        assert_eq!(session.phase(), GamePhase::LeadCapture);

        session.submit_lead(valid_lead()).unwrap();
        assert_eq!(session.phase(), GamePhase::Summary);

        let summary = session.summary().unwrap();
        let codes: Vec<Code> = summary.ranked.iter().map(|r| r.code).collect();
        assert_eq!(
            codes,
            vec![Code::Investigative, Code::Realistic, Code::Artistic]
        );
        assert_eq!(summary.ranked[0].display_score, 33);
        assert_eq!(summary.ranked[1].display_score, 23);
        assert_eq!(summary.ranked[2].display_score, 11);
        assert_eq!(summary.picks.len(), 10);
        assert_eq!(summary.trace.len(), 1);
        assert_eq!(summary.raw_scores.get(Code::Investigative), 3);
        assert_eq!(summary.display_scores.get(Code::Investigative), 33);
    }

    #[test]
    fn test_unique_leaders_skip_the_tie_break_entirely() {
        let mut session = session();
        session.choose_avatar("builder").unwrap();
        session.begin().unwrap();

        // Divert mission 8 from s to r: r:4 i:3 a:1 e:1 c:1 s:0.
        let mut keys = [OptionKey::A; 10];
        keys[7] = OptionKey::B;
        answer_mains(&mut session, &keys);

        // No tie mission was ever staged.
        assert_eq!(session.phase(), GamePhase::LeadCapture);
        assert!(session.resolver().unwrap().trace().is_empty());

        session.submit_lead(valid_lead()).unwrap();
        let summary = session.summary().unwrap();
        let codes: Vec<Code> = summary.ranked.iter().map(|r| r.code).collect();
        // Third place: a, e, c all hold 1; c's neighbors e+r sum highest.
        assert_eq!(
            codes,
            vec![Code::Realistic, Code::Investigative, Code::Conventional]
        );
    }

    #[test]
    fn test_phase_guards() {
        let mut session = session();

        assert!(session.begin().is_err());
        assert!(session.choose(OptionKey::A).is_err());
        assert!(session.submit_lead(valid_lead()).is_err());
        assert!(session.summary().is_err());

        assert!(session.choose_avatar("nobody").is_err());
        session.choose_avatar("explorer").unwrap();
        assert!(session.choose_avatar("builder").is_err());

        session.begin().unwrap();
        assert!(session.begin().is_err());
        assert!(session.submit_lead(valid_lead()).is_err());
    }

    #[test]
    fn test_invalid_lead_keeps_the_gate_closed() {
        let mut session = session();
        session.choose_avatar("explorer").unwrap();
        session.begin().unwrap();
        answer_mains(&mut session, &[OptionKey::A; 10]);
        session.choose(OptionKey::A).unwrap();
        assert_eq!(session.phase(), GamePhase::LeadCapture);

        let bad = Lead {
            full_name: "N".into(),
            phone: "123".into(),
            email: "nope".into(),
        };
        assert!(session.submit_lead(bad).is_err());
        assert_eq!(session.phase(), GamePhase::LeadCapture);
        assert!(session.summary().is_err());

        session.submit_lead(valid_lead()).unwrap();
        assert_eq!(session.phase(), GamePhase::Summary);
    }

    #[test]
    fn test_content_gap_fails_the_run() {
        let mut broken = test_fixtures::catalog();
        broken.tie_missions.clear();
        let mut session = GameSession::new(Arc::new(broken));
        session.choose_avatar("explorer").unwrap();
        session.begin().unwrap();

        let mut keys = Vec::new();
        keys.extend([OptionKey::A; 9]);
        for key in keys {
            session.choose(key).unwrap();
        }
        // The last main pick seals scores; resolution hits the catalog gap.
        let err = session.choose(OptionKey::A).unwrap_err();
        assert!(matches!(err, CoreError::ResolutionError(_)));
        assert_eq!(session.phase(), GamePhase::Failed);
        let failure = session.failure().unwrap();
        assert!(failure.is_content_error());
    }

    #[test]
    fn test_picks_are_recorded_in_order() {
        let mut session = session();
        session.choose_avatar("explorer").unwrap();
        session.begin().unwrap();
        session.choose(OptionKey::B).unwrap();
        session.choose(OptionKey::A).unwrap();

        let picks = session.picks();
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0].mission_id, "m1");
        assert_eq!(picks[0].key, OptionKey::B);
        assert_eq!(picks[0].code, Code::Social);
        assert_eq!(picks[1].mission_id, "m2");
        assert_eq!(picks[1].code, Code::Realistic);
        assert_eq!(session.main_progress(), (2, 10));
    }
}

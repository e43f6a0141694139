//! Completed-run report for the counseling team.
//!
//! [`AnalysisReport`] is the wire artifact handed off once a run reaches
//! the summary: lead details, the resolved ranking, raw scores, every
//! mission pick, and the tie-break trace. The shape is frozen by a JSON
//! schema so downstream tooling can validate files independently.
//! Timestamps travel as RFC 3339 strings.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::models::Code;
use crate::session::GameSession;

/// Schema metadata for analysis report files.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
pub struct AnalysisSchemaInfo {
    pub name: String,    // "cq_analysis"
    pub version: u32,    // 1
}

impl Default for AnalysisSchemaInfo {
    fn default() -> Self {
        Self {
            name: "cq_analysis".to_string(),
            version: 1,
        }
    }
}

/// Raw tally per code at the moment scores were sealed.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub r: u32,
    pub i: u32,
    pub a: u32,
    pub s: u32,
    pub e: u32,
    pub c: u32,
}

/// One line of the final ranking.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
pub struct RankedEntry {
    pub rank: u8,
    pub code: String, // single letter, lowercase
    pub raw_score: u32,
    pub display_score: u32,
}

/// One main-mission decision, in play order.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
pub struct PickRecord {
    pub mission_id: String,
    pub key: String,  // "a" | "b"
    pub code: String, // code the pick scored
}

/// One decided tie-break comparison, in decision order.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
pub struct ComparisonRecord {
    pub seq: u32,
    pub rank: u8, // rank the comparison was resolving
    pub pair: String,
    pub mission_id: String,
    pub winner: String,
    pub loser: String,
    pub decided_at: String, // RFC 3339
}

/// Contact details the player left behind.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
pub struct LeadRecord {
    pub full_name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema)]
pub struct AnalysisReport {
    pub schema: AnalysisSchemaInfo,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
    pub started_at: String,   // RFC 3339
    pub completed_at: String, // RFC 3339
    pub lead: LeadRecord,
    pub ranked: Vec<RankedEntry>,
    pub raw_scores: ScoreBreakdown,
    pub picks: Vec<PickRecord>,
    pub tie_trace: Vec<ComparisonRecord>,
}

impl AnalysisReport {
    /// Build the report for a run that reached the summary. Fails with a
    /// phase violation for any earlier (or failed) run.
    pub fn from_session(session: &GameSession) -> Result<AnalysisReport> {
        let summary = session.summary()?;
        let lead = session.lead().ok_or_else(|| {
            CoreError::PhaseViolation("summary phase without a captured lead".to_string())
        })?;
        let completed_at = session.completed_at().ok_or_else(|| {
            CoreError::PhaseViolation("summary phase without a completion time".to_string())
        })?;

        let ranked = summary
            .ranked
            .iter()
            .map(|entry| RankedEntry {
                rank: entry.rank,
                code: entry.code.to_string(),
                raw_score: summary.raw_scores.get(entry.code),
                display_score: entry.display_score,
            })
            .collect();

        let picks = summary
            .picks
            .iter()
            .map(|pick| PickRecord {
                mission_id: pick.mission_id.clone(),
                key: pick.key.to_string(),
                code: pick.code.to_string(),
            })
            .collect();

        let tie_trace = summary
            .trace
            .iter()
            .map(|comparison| ComparisonRecord {
                seq: comparison.seq,
                rank: comparison.rank.number(),
                pair: comparison.pair.key(),
                mission_id: comparison.mission_id.clone(),
                winner: comparison.winner.to_string(),
                loser: comparison.loser.to_string(),
                decided_at: comparison.decided_at.to_rfc3339(),
            })
            .collect();

        Ok(AnalysisReport {
            schema: AnalysisSchemaInfo::default(),
            session_id: summary.session_id.to_string(),
            avatar_id: summary.avatar_id.clone(),
            started_at: session.started_at().to_rfc3339(),
            completed_at: completed_at.to_rfc3339(),
            lead: LeadRecord {
                full_name: lead.full_name.clone(),
                phone: lead.phone.clone(),
                email: lead.email.clone(),
            },
            ranked,
            raw_scores: breakdown(session),
            picks,
            tie_trace,
        })
    }

    /// Generate the JSON schema for report files.
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisReport)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<AnalysisReport> {
        Ok(serde_json::from_str(json)?)
    }

    /// When the report was completed, parsed back from the wire form.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.completed_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

fn breakdown(session: &GameSession) -> ScoreBreakdown {
    let table = session.table();
    ScoreBreakdown {
        r: table.get(Code::Realistic),
        i: table.get(Code::Investigative),
        a: table.get(Code::Artistic),
        s: table.get(Code::Social),
        e: table.get(Code::Enterprising),
        c: table.get(Code::Conventional),
    }
}

/// Where finished reports go. The engine builds reports; delivery lives
/// behind this seam so shells can swap transports without touching game
/// logic. Delivery failures must not fail the run.
pub trait AnalysisSink {
    fn deliver(&self, report: &AnalysisReport) -> Result<()>;
}

/// Sink that writes the report to the structured log. Default for
/// development builds and the terminal runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl AnalysisSink for LogSink {
    fn deliver(&self, report: &AnalysisReport) -> Result<()> {
        let payload = serde_json::to_string(report)?;
        info!(
            session = %report.session_id,
            bytes = payload.len(),
            "analysis report ready: {}",
            payload
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_fixtures;
    use crate::models::{Lead, OptionKey};
    use std::sync::Arc;

    fn completed_session() -> GameSession {
        let mut session = GameSession::new(Arc::new(test_fixtures::catalog()));
        session.choose_avatar("explorer").unwrap();
        session.begin().unwrap();
        for _ in 0..10 {
            session.choose(OptionKey::A).unwrap();
        }
        session.choose(OptionKey::A).unwrap();
        session
            .submit_lead(Lead {
                full_name: "נועה לוי".into(),
                phone: "0501234567".into(),
                email: "noa@example.com".into(),
            })
            .unwrap();
        session
    }

    #[test]
    fn test_report_requires_the_summary_phase() {
        let session = GameSession::new(Arc::new(test_fixtures::catalog()));
        let err = AnalysisReport::from_session(&session).unwrap_err();
        assert!(matches!(err, CoreError::PhaseViolation(_)));
    }

    #[test]
    fn test_report_captures_the_whole_run() {
        let session = completed_session();
        let report = AnalysisReport::from_session(&session).unwrap();

        assert_eq!(report.schema, AnalysisSchemaInfo::default());
        assert_eq!(report.session_id, session.id().to_string());
        assert_eq!(report.avatar_id.as_deref(), Some("explorer"));
        assert_eq!(report.lead.full_name, "נועה לוי");

        let codes: Vec<&str> = report.ranked.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["i", "r", "a"]);
        assert_eq!(report.ranked[0].raw_score, 3);
        assert_eq!(report.ranked[0].display_score, 33);
        assert_eq!(
            report.raw_scores,
            ScoreBreakdown {
                r: 3,
                i: 3,
                a: 1,
                s: 1,
                e: 1,
                c: 1
            }
        );

        assert_eq!(report.picks.len(), 10);
        assert_eq!(report.picks[0].mission_id, "m1");
        assert_eq!(report.picks[0].key, "a");
        assert_eq!(report.picks[0].code, "r");

        assert_eq!(report.tie_trace.len(), 1);
        let comparison = &report.tie_trace[0];
        assert_eq!(comparison.seq, 0);
        assert_eq!(comparison.rank, 1);
        assert_eq!(comparison.pair, "ir");
        assert_eq!(comparison.winner, "i");
        assert_eq!(comparison.loser, "r");
        assert!(DateTime::parse_from_rfc3339(&comparison.decided_at).is_ok());
        assert!(report.completed_at().is_some());
    }

    #[test]
    fn test_report_survives_the_wire() {
        let report = AnalysisReport::from_session(&completed_session()).unwrap();
        let json = report.to_json_pretty().unwrap();
        let parsed = AnalysisReport::from_json(&json).unwrap();
        assert_eq!(parsed.session_id, report.session_id);
        assert_eq!(parsed.ranked.len(), 3);
        assert_eq!(parsed.raw_scores, report.raw_scores);
    }

    #[test]
    fn test_schema_describes_the_report() {
        let schema = AnalysisReport::json_schema();
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["title"], "AnalysisReport");
        assert!(value["properties"]["tie_trace"].is_object());
        assert!(value["properties"]["lead"].is_object());
    }

    #[test]
    fn test_log_sink_accepts_a_report() {
        let report = AnalysisReport::from_session(&completed_session()).unwrap();
        assert!(LogSink.deliver(&report).is_ok());
    }
}

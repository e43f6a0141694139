//! JSON API for driving a session.
//!
//! The browser shell talks to the engine through two calls: a snapshot of
//! what to render now, and a command channel for the player's inputs.
//! Both speak JSON strings so the embedding layer stays trivial. The
//! session is passed in explicitly; the engine keeps no global state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Lead, OptionKey};
use crate::session::{GamePhase, GameSession, RunSummary};

/// API version for schema compatibility.
pub const API_VERSION: &str = "v1";

/// Standard API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Structured API error with codes and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn from_core_error(err: &CoreError) -> Self {
        let code = match err {
            CoreError::InvalidParameter(_) => "INVALID_PARAMETER",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::PhaseViolation(_) => "PHASE_VIOLATION",
            CoreError::ValidationError(_) => "VALIDATION_FAILED",
            CoreError::SerializationError(_) | CoreError::DeserializationError(_) => "INVALID_JSON",
            CoreError::ResolutionError(inner) if inner.is_content_error() => "CONTENT_INTEGRITY",
            CoreError::ResolutionError(_) => "INVARIANT_VIOLATION",
        };
        Self::new(code, &err.to_string())
    }
}

/// One renderable avatar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarView {
    pub id: String,
    pub name: String,
    pub asset: String,
}

/// One renderable mission option. Deliberately code-free: the player must
/// never see which code an option scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionView {
    pub asset: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    Main,
    TieBreak,
}

/// The mission currently on screen, main or tie-break.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionView {
    pub id: String,
    pub kind: MissionKind,
    pub task: String,
    pub option_a: OptionView,
    pub option_b: OptionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressView {
    pub answered: usize,
    pub total: usize,
    pub tie_comparisons: usize,
}

/// Everything the shell needs to render the current screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: GamePhase,
    pub avatar: Option<AvatarView>,
    pub avatars: Vec<AvatarView>,
    pub intro_title: String,
    pub intro_body: String,
    pub mission: Option<MissionView>,
    pub progress: ProgressView,
    pub summary: Option<RunSummary>,
    pub failure: Option<String>,
}

/// Player inputs, tagged by command name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    ChooseAvatar { avatar_id: String },
    Begin,
    Choose { key: OptionKey },
    SubmitLead { lead: Lead },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCommandRequest {
    pub schema_version: Option<String>,
    #[serde(flatten)]
    pub command: SessionCommand,
}

fn avatar_view(avatar: &crate::catalog::Avatar) -> AvatarView {
    AvatarView {
        id: avatar.id.clone(),
        name: avatar.name.clone(),
        asset: avatar.asset.clone(),
    }
}

fn build_snapshot(session: &GameSession) -> SessionSnapshot {
    let catalog = session.catalog();

    let mission = if let Some(main) = session.current_main_mission() {
        Some(MissionView {
            id: main.id.clone(),
            kind: MissionKind::Main,
            task: main.task.clone(),
            option_a: OptionView {
                asset: main.option_a.asset.clone(),
                tooltip: main.option_a.tooltip.clone(),
            },
            option_b: OptionView {
                asset: main.option_b.asset.clone(),
                tooltip: main.option_b.tooltip.clone(),
            },
        })
    } else {
        session.staged_tie_mission().map(|tie| MissionView {
            id: tie.id.clone(),
            kind: MissionKind::TieBreak,
            task: tie.task.clone(),
            option_a: OptionView {
                asset: tie.side_a.asset.clone(),
                tooltip: tie.side_a.tooltip.clone(),
            },
            option_b: OptionView {
                asset: tie.side_b.asset.clone(),
                tooltip: tie.side_b.tooltip.clone(),
            },
        })
    };

    let (answered, total) = session.main_progress();
    let tie_comparisons = session
        .resolver()
        .map(|resolver| resolver.trace().len())
        .unwrap_or(0);

    SessionSnapshot {
        session_id: session.id(),
        phase: session.phase(),
        avatar: session.avatar().map(avatar_view),
        avatars: catalog.avatars.iter().map(avatar_view).collect(),
        intro_title: catalog.intro.title.clone(),
        intro_body: catalog.intro.body.clone(),
        mission,
        progress: ProgressView {
            answered,
            total,
            tie_comparisons,
        },
        summary: session.summary().ok(),
        failure: session.failure().map(|err| err.to_string()),
    }
}

fn to_json<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string())
}

/// Render-state snapshot as an `ApiResponse<SessionSnapshot>` JSON string.
pub fn session_snapshot_json(session: &GameSession) -> String {
    debug!(session = %session.id(), phase = ?session.phase(), "building session snapshot");
    to_json(&ApiResponse::success(build_snapshot(session)))
}

/// Apply one command and respond with the refreshed snapshot.
pub fn process_session_command_json(session: &mut GameSession, request_json: &str) -> String {
    let request: SessionCommandRequest = match serde_json::from_str(request_json) {
        Ok(request) => request,
        Err(err) => {
            error!("failed to parse session command: {}", err);
            let response: ApiResponse<SessionSnapshot> = ApiResponse::error(ApiError::new(
                "INVALID_JSON",
                &format!("Invalid JSON format: {}", err),
            ));
            return to_json(&response);
        }
    };

    info!(session = %session.id(), command = ?command_name(&request.command), "processing session command");
    let outcome = match request.command {
        SessionCommand::ChooseAvatar { avatar_id } => session.choose_avatar(&avatar_id),
        SessionCommand::Begin => session.begin(),
        SessionCommand::Choose { key } => session.choose(key),
        SessionCommand::SubmitLead { lead } => session.submit_lead(lead),
    };

    match outcome {
        Ok(()) => to_json(&ApiResponse::success(build_snapshot(session))),
        Err(err) => {
            warn!(session = %session.id(), error = %err, "session command rejected");
            let response: ApiResponse<SessionSnapshot> =
                ApiResponse::error(ApiError::from_core_error(&err));
            to_json(&response)
        }
    }
}

fn command_name(command: &SessionCommand) -> &'static str {
    match command {
        SessionCommand::ChooseAvatar { .. } => "choose_avatar",
        SessionCommand::Begin => "begin",
        SessionCommand::Choose { .. } => "choose",
        SessionCommand::SubmitLead { .. } => "submit_lead",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_fixtures;
    use std::sync::Arc;

    fn session() -> GameSession {
        GameSession::new(Arc::new(test_fixtures::catalog()))
    }

    fn command(session: &mut GameSession, json: &str) -> serde_json::Value {
        serde_json::from_str(&process_session_command_json(session, json)).unwrap()
    }

    #[test]
    fn test_snapshot_starts_at_avatar_select() {
        let session = session();
        let snapshot: serde_json::Value =
            serde_json::from_str(&session_snapshot_json(&session)).unwrap();
        assert_eq!(snapshot["success"], true);
        assert_eq!(snapshot["data"]["phase"]["phase"], "avatar_select");
        assert_eq!(snapshot["data"]["avatars"].as_array().unwrap().len(), 2);
        assert!(snapshot["data"]["mission"].is_null());
        assert_eq!(snapshot["schema_version"], "v1");
    }

    #[test]
    fn test_command_flow_reaches_a_mission() {
        let mut session = session();
        let response = command(
            &mut session,
            r#"{"command":"choose_avatar","avatar_id":"explorer"}"#,
        );
        assert_eq!(response["success"], true);
        assert_eq!(response["data"]["phase"]["phase"], "intro");
        assert_eq!(response["data"]["avatar"]["id"], "explorer");

        let response = command(&mut session, r#"{"command":"begin"}"#);
        assert_eq!(response["data"]["phase"]["phase"], "main_missions");
        let mission = &response["data"]["mission"];
        assert_eq!(mission["kind"], "main");
        assert_eq!(mission["id"], "m1");
        // Options never reveal their codes.
        assert!(mission["option_a"].get("code").is_none());
    }

    #[test]
    fn test_full_run_over_the_wire() {
        let mut session = session();
        command(
            &mut session,
            r#"{"command":"choose_avatar","avatar_id":"explorer"}"#,
        );
        command(&mut session, r#"{"command":"begin"}"#);
        for _ in 0..9 {
            let response = command(&mut session, r#"{"command":"choose","key":"a"}"#);
            assert_eq!(response["success"], true);
        }
        let response = command(&mut session, r#"{"command":"choose","key":"a"}"#);
        assert_eq!(response["data"]["phase"]["phase"], "tie_break");
        assert_eq!(response["data"]["mission"]["kind"], "tie_break");
        assert_eq!(response["data"]["progress"]["answered"], 10);

        let response = command(&mut session, r#"{"command":"choose","key":"a"}"#);
        assert_eq!(response["data"]["phase"]["phase"], "lead_capture");

        let response = command(
            &mut session,
            r#"{"command":"submit_lead","lead":{"full_name":"Noa Levi","phone":"0501234567","email":"noa@example.com"}}"#,
        );
        assert_eq!(response["data"]["phase"]["phase"], "summary");
        let summary = &response["data"]["summary"];
        assert_eq!(summary["ranked"][0]["code"], "i");
        assert_eq!(summary["ranked"][1]["code"], "r");
        assert_eq!(summary["ranked"][2]["code"], "a");
        assert_eq!(summary["ranked"][0]["display_score"], 33);
    }

    #[test]
    fn test_malformed_json_yields_structured_error() {
        let mut session = session();
        let response = command(&mut session, "not json at all");
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "INVALID_JSON");
        assert!(response["data"].is_null());
    }

    #[test]
    fn test_phase_violation_yields_structured_error() {
        let mut session = session();
        let response = command(&mut session, r#"{"command":"begin"}"#);
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "PHASE_VIOLATION");
    }

    #[test]
    fn test_unknown_avatar_yields_not_found() {
        let mut session = session();
        let response = command(
            &mut session,
            r#"{"command":"choose_avatar","avatar_id":"nobody"}"#,
        );
        assert_eq!(response["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn test_invalid_lead_yields_validation_error() {
        let mut session = session();
        command(
            &mut session,
            r#"{"command":"choose_avatar","avatar_id":"explorer"}"#,
        );
        command(&mut session, r#"{"command":"begin"}"#);
        for _ in 0..10 {
            command(&mut session, r#"{"command":"choose","key":"a"}"#);
        }
        command(&mut session, r#"{"command":"choose","key":"a"}"#);

        let response = command(
            &mut session,
            r#"{"command":"submit_lead","lead":{"full_name":"N","phone":"1","email":"x"}}"#,
        );
        assert_eq!(response["success"], false);
        assert_eq!(response["error"]["code"], "VALIDATION_FAILED");
    }
}

//! Integration surfaces: the JSON command/snapshot channel for shells
//! and the analysis report for the counseling team.

pub mod analysis;
pub mod session_json;

pub use analysis::{AnalysisReport, AnalysisSink, LogSink};
pub use session_json::{
    process_session_command_json, session_snapshot_json, ApiError, ApiResponse, SessionCommand,
    SessionSnapshot, API_VERSION,
};

use std::fmt;

use crate::tournament::TournamentError;

#[derive(Debug)]
pub enum CoreError {
    InvalidParameter(String),
    NotFound(String),
    PhaseViolation(String),
    ValidationError(String),
    SerializationError(String),
    DeserializationError(String),
    ResolutionError(TournamentError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoreError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            CoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CoreError::PhaseViolation(msg) => write!(f, "Phase violation: {}", msg),
            CoreError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            CoreError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            CoreError::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            CoreError::ResolutionError(err) => write!(f, "Resolution error: {}", err),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::ResolutionError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            CoreError::DeserializationError(err.to_string())
        } else {
            CoreError::SerializationError(err.to_string())
        }
    }
}

impl From<TournamentError> for CoreError {
    fn from(err: TournamentError) -> Self {
        CoreError::ResolutionError(err)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

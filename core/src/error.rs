use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("no category match: {0}")]
    NoCategoryMatch(String),

    #[error("empty listing result: {0}")]
    EmptyListingResult(String),

    #[error("malformed generation output: {0}")]
    MalformedGenerationOutput(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("inactive subscription: {0}")]
    InactiveSubscription(String),

    #[error("workflow transition error: {0}")]
    WorkflowTransition(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Serializable reason attached to a failed batch item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UpstreamUnavailable,
    NoCategoryMatch,
    EmptyListingResult,
    MalformedGenerationOutput,
    InsufficientBalance,
    InactiveSubscription,
    InvalidInput,
    Internal,
}

impl CoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CoreError::UpstreamUnavailable(_) => FailureKind::UpstreamUnavailable,
            CoreError::NoCategoryMatch(_) => FailureKind::NoCategoryMatch,
            CoreError::EmptyListingResult(_) => FailureKind::EmptyListingResult,
            CoreError::MalformedGenerationOutput(_) => FailureKind::MalformedGenerationOutput,
            CoreError::InsufficientBalance(_) => FailureKind::InsufficientBalance,
            CoreError::InactiveSubscription(_) => FailureKind::InactiveSubscription,
            CoreError::InvalidInput(_) => FailureKind::InvalidInput,
            CoreError::Config(_)
            | CoreError::WorkflowTransition(_)
            | CoreError::Io(_)
            | CoreError::Json(_)
            | CoreError::Csv(_) => FailureKind::Internal,
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CoreError::UpstreamUnavailable(format!("request timed out: {}", e))
        } else if e.is_decode() {
            CoreError::UpstreamUnavailable(format!("unparsable upstream payload: {}", e))
        } else {
            CoreError::UpstreamUnavailable(e.to_string())
        }
    }
}

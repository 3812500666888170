use std::fmt;

use thiserror::Error;

/// Identifies one batch; bumped on every `Coordinator::start`.
pub type BatchId = u64;

/// One URL of a batch, tagged with its position in the caller's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub url: String,
}

impl WorkItem {
    pub fn new(index: usize, url: impl Into<String>) -> Self {
        Self {
            index,
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Checking,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub batch_id: BatchId,
    pub index: usize,
    pub phase: Phase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEvent {
    pub batch_id: BatchId,
    pub index: usize,
    pub url: String,
    pub alive: bool,
    pub status_code: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub total_items: usize,
    pub completed_items: usize,
    /// True when at least one worker halted on a stop request.
    pub stopped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Status(StatusEvent),
    Result(ResultEvent),
    BatchCompleted(BatchSummary),
}

impl EngineEvent {
    pub fn batch_id(&self) -> BatchId {
        match self {
            EngineEvent::Status(event) => event.batch_id,
            EngineEvent::Result(event) => event.batch_id,
            EngineEvent::BatchCompleted(summary) => summary.batch_id,
        }
    }
}

/// Result of a single liveness probe. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status_code: Option<u16>,
    pub error: Option<ProbeError>,
    pub alive: bool,
}

impl ProbeOutcome {
    pub fn from_status(status_code: u16, accepted: &[u16]) -> Self {
        Self {
            status_code: Some(status_code),
            error: None,
            alive: accepted.contains(&status_code),
        }
    }

    pub fn failed(error: ProbeError) -> Self {
        Self {
            status_code: None,
            error: Some(error),
            alive: false,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|err| err.message.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeError {
    pub kind: ProbeFailure,
    pub message: String,
}

impl ProbeError {
    pub fn new(kind: ProbeFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    Timeout,
    InvalidUrl,
    Transport,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Timeout => write!(f, "timeout"),
            ProbeFailure::InvalidUrl => write!(f, "invalid url"),
            ProbeFailure::Transport => write!(f, "transport error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
    #[error("failed to start engine: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("engine thread is no longer running")]
    EngineStopped,
}

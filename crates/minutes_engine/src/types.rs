use serde::Deserialize;
use thiserror::Error;

/// One decoded event from the upload progress stream.
///
/// The wire field is `step`; the vocabulary is open-ended and mapping to
/// known stages happens in the core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StageFrame {
    #[serde(rename = "step")]
    pub stage: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Accepted script submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptResponse {
    #[serde(default)]
    pub redirect_url: Option<String>,
    pub meeting_id: String,
}

/// The newest job the registry knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub meeting_id: String,
    pub meeting_date: String,
    pub created_at_ms: u64,
}

/// Events the engine worker reports back to the platform loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StageFrame(StageFrame),
    UploadFailed { message: String },
    ScriptAccepted(ScriptResponse),
    ScriptFailed { message: String },
    ChatAnswer { result: Result<String, String> },
    LatestNote { latest: Option<RegistryEntry> },
    LatestNoteUnavailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    /// A corrupt protocol frame cannot be partially trusted; the stream is
    /// abandoned as a whole.
    #[error("malformed stream frame: {0}")]
    Protocol(String),
    /// The server answered with a well-formed error payload.
    #[error("{0}")]
    Server(String),
}

use crate::{ChatMessage, JobMarker, RegistryEntry, SubmissionMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Session started: persisted marker (if any) and the current time.
    Started {
        marker: Option<JobMarker>,
        now_ms: u64,
    },
    /// Registry reconciliation answer for the duplicate-submission guard.
    LatestNoteFetched { latest: Option<RegistryEntry> },
    /// Registry query failed; the guard fails open.
    LatestNoteUnavailable,
    /// User switched between audio upload and transcript entry.
    ModeChanged(SubmissionMode),
    /// User edited the title field.
    TitleChanged(String),
    /// User selected a file (path), or cleared the selection.
    FileChosen(Option<String>),
    /// User edited the transcript text.
    TranscriptChanged(String),
    /// User submitted the form.
    SubmitClicked { now_ms: u64 },
    /// One decoded frame from the progress stream.
    StageFrameReceived {
        stage: String,
        message: String,
        icon: Option<String>,
        redirect: Option<String>,
    },
    /// The upload transfer failed at the transport or protocol level.
    UploadFailed { message: String },
    /// Script submission accepted by the server.
    ScriptAccepted {
        redirect_url: Option<String>,
        meeting_id: String,
    },
    /// Script submission rejected or the request failed.
    ScriptFailed { message: String },
    /// User chose to retry after a terminal error.
    RetryClicked { now_ms: u64 },
    /// User dismissed the terminal error without retrying.
    ErrorDismissed,
    /// User force-cancelled a blocked session. Clears client trust state
    /// only; any server-side job keeps running.
    ForceCancelClicked,
    /// Restore previously persisted chat messages.
    ChatHistoryRestored(Vec<ChatMessage>),
    /// User sent a chat message.
    ChatSendClicked { text: String, now_iso: String },
    /// Chat request finished, one way or the other.
    ChatAnswerReceived {
        result: Result<String, String>,
        now_iso: String,
    },
    /// The deferred navigation fired; the page is gone.
    NavigatedAway,
    /// UI tick; drives the synthetic script progress animation.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

use crate::ChatMessage;

/// Side effects requested by `update`, executed by the platform adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the job marker (session store port).
    SaveJobMarker { started_at_ms: u64 },
    /// Remove the job marker. Idempotent at the store.
    ClearJobMarker,
    /// Ask the registry for the most recently created job.
    FetchLatestNote,
    /// Install the best-effort confirm-before-leaving prompt.
    InstallUnloadGuard,
    /// Remove the confirm-before-leaving prompt.
    RemoveUnloadGuard,
    /// Start the streaming audio upload.
    BeginUpload { title: String, file: String },
    /// Start the request/response transcript submission.
    BeginScriptSubmit { title: String, transcript: String },
    /// Navigate to `target` after `delay_ms`.
    Navigate { target: String, delay_ms: u64 },
    /// Issue one chat request.
    SendChat { query: String },
    /// Persist the chat transcript snapshot.
    PersistChat { messages: Vec<ChatMessage> },
}

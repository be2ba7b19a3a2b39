use crate::{ChatRole, Stage, SubmissionMode};

/// Declarative UI snapshot; rendering is a pure projection of this.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UiViewModel {
    pub input_enabled: bool,
    /// Blocking advisory: a job is already in flight; force-cancel offered.
    pub blocked: bool,
    pub validation_message: Option<String>,
    pub mode: SubmissionMode,
    pub title: String,
    pub file: Option<String>,
    pub has_transcript: bool,
    pub progress_visible: bool,
    pub steps: Vec<StepView>,
    pub status_message: String,
    pub status_icon: String,
    /// Synthetic percentage; only present on the script path.
    pub script_percent: Option<u8>,
    /// Terminal error for this attempt; retry/close offered.
    pub failed: bool,
    pub finished: bool,
    pub chat: ChatView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub stage: Stage,
    pub label: &'static str,
    pub active: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatView {
    pub messages: Vec<ChatMessageView>,
    pub sending: bool,
    pub pending_placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessageView {
    pub role: ChatRole,
    pub content: String,
    pub is_source_annotation: bool,
}

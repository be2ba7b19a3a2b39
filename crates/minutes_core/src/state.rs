use crate::view_model::{ChatMessageView, ChatView, StepView, UiViewModel};
use crate::{ChatSession, ProgressState, Stage, PIPELINE};

/// Which submission path the form is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionMode {
    /// Audio file upload; progress comes from the server-push stream.
    #[default]
    Audio,
    /// Transcript text; progress is a synthetic animation until the
    /// response arrives.
    Script,
}

/// Coordinator lifecycle. One attempt at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for `Msg::Started`.
    #[default]
    Loading,
    /// A fresh marker was found; reconciling against the job registry.
    CheckingRegistry { started_at_ms: u64 },
    /// A job is genuinely in flight elsewhere; input is locked behind the
    /// force-cancel escape hatch.
    Blocked { started_at_ms: u64 },
    /// Ready for a submission.
    Idle,
    /// A submission is running.
    InFlight { mode: SubmissionMode },
    /// The attempt ended in a terminal error; retry or dismiss.
    Failed { message: String },
    /// The attempt succeeded; navigation is pending or done.
    Completed,
    /// Navigation fired; this session is over.
    NavigatedAway,
}

/// Synthetic script-mode progress: ramp to 95% over 60 s at a 100 ms tick,
/// display capped at 99% until the server answers.
pub const SCRIPT_TICK_MS: u64 = 100;
pub const SCRIPT_RAMP_MS: u64 = 60_000;
pub const SCRIPT_TARGET_PERCENT: f64 = 95.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) phase: Phase,
    pub(crate) mode: SubmissionMode,
    pub(crate) title: String,
    pub(crate) file: Option<String>,
    pub(crate) transcript: String,
    pub(crate) validation: Option<String>,
    pub(crate) progress: ProgressState,
    pub(crate) script_percent: f64,
    pub(crate) chat: ChatSession,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Whether the user may edit the form and submit.
    pub fn input_enabled(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Failed { .. })
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns and clears the dirty flag; the render loop redraws only when
    /// this was set.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn script_display_percent(&self) -> u8 {
        if matches!(self.progress.current(), Some(Stage::Complete)) {
            return 100;
        }
        (self.script_percent.round() as u8).min(99)
    }

    pub fn view(&self) -> UiViewModel {
        let steps = PIPELINE
            .iter()
            .map(|stage| StepView {
                stage: *stage,
                label: stage.label(),
                active: self.progress.current() == Some(*stage),
                completed: self.progress.is_completed(*stage),
            })
            .collect();

        let script_percent = match (&self.phase, self.mode) {
            (Phase::InFlight { mode: SubmissionMode::Script }, _)
            | (Phase::Completed, SubmissionMode::Script) => Some(self.script_display_percent()),
            _ => None,
        };

        UiViewModel {
            input_enabled: self.input_enabled(),
            blocked: matches!(self.phase, Phase::Blocked { .. }),
            validation_message: self.validation.clone(),
            mode: self.mode,
            title: self.title.clone(),
            file: self.file.clone(),
            has_transcript: !self.transcript.trim().is_empty(),
            progress_visible: matches!(
                self.phase,
                Phase::InFlight { .. } | Phase::Failed { .. } | Phase::Completed
            ),
            steps,
            status_message: self.progress.message().to_string(),
            status_icon: self.progress.icon().to_string(),
            script_percent,
            failed: matches!(self.phase, Phase::Failed { .. }),
            finished: matches!(self.phase, Phase::Completed | Phase::NavigatedAway),
            chat: ChatView {
                messages: self
                    .chat
                    .messages()
                    .map(|message| ChatMessageView {
                        role: message.role,
                        content: message.content.clone(),
                        is_source_annotation: message.is_source_annotation,
                    })
                    .collect(),
                sending: self.chat.is_sending(),
                pending_placeholder: self.chat.has_pending_placeholder(),
            },
            dirty: self.dirty,
        }
    }
}

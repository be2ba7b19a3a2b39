/// One observable phase of the server-side ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Transcribe,
    Summarize,
    Mindmap,
    Complete,
    Error,
}

/// The non-terminal pipeline stages in canonical order.
pub const PIPELINE: [Stage; 4] = [
    Stage::Upload,
    Stage::Transcribe,
    Stage::Summarize,
    Stage::Mindmap,
];

impl Stage {
    /// Maps a wire stage name to a known stage.
    ///
    /// The deployed server emits the short names `stt` and `summary`; newer
    /// servers use `transcribe` and `summarize`. Unknown names return `None`
    /// so the caller can ignore them (the vocabulary may grow server-side).
    pub fn from_wire(name: &str) -> Option<Stage> {
        match name {
            "upload" => Some(Stage::Upload),
            "stt" | "transcribe" => Some(Stage::Transcribe),
            "summary" | "summarize" => Some(Stage::Summarize),
            "mindmap" => Some(Stage::Mindmap),
            "complete" => Some(Stage::Complete),
            "error" => Some(Stage::Error),
            _ => None,
        }
    }

    /// Position within `PIPELINE`, or `None` for the terminal stages.
    fn pipeline_index(self) -> Option<usize> {
        PIPELINE.iter().position(|stage| *stage == self)
    }

    /// Icon shown when a frame does not carry one.
    pub fn default_icon(self) -> &'static str {
        match self {
            Stage::Upload => "\u{1F4E4}",
            Stage::Transcribe => "\u{1F3A4}",
            Stage::Summarize => "\u{1F4DD}",
            Stage::Mindmap => "\u{1F5FA}\u{FE0F}",
            Stage::Complete => "\u{2705}",
            Stage::Error => "\u{274C}",
        }
    }

    /// Short human label for rendering.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Upload => "Upload",
            Stage::Transcribe => "Transcribe",
            Stage::Summarize => "Summarize",
            Stage::Mindmap => "Mind map",
            Stage::Complete => "Complete",
            Stage::Error => "Error",
        }
    }
}

/// Declarative progress snapshot for one submission attempt.
///
/// Derived purely from the ordered application of stage frames. Completed
/// flags are sticky: a frame for stage S marks everything strictly before S
/// completed and never un-marks anything short of an explicit [`reset`].
///
/// [`reset`]: ProgressState::reset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressState {
    current: Option<Stage>,
    completed: [bool; PIPELINE.len()],
    terminal: bool,
    message: String,
    icon: String,
    redirect: Option<String>,
}

impl ProgressState {
    pub fn current(&self) -> Option<Stage> {
        self.current
    }

    pub fn is_completed(&self, stage: Stage) -> bool {
        stage
            .pipeline_index()
            .is_some_and(|index| self.completed[index])
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn redirect(&self) -> Option<&str> {
        self.redirect.as_deref()
    }

    /// Applies one stage frame. No-op once terminal.
    pub fn apply(&mut self, stage: Stage, message: &str, icon: Option<&str>) {
        if self.terminal {
            return;
        }

        match stage {
            Stage::Error => {
                self.current = Some(Stage::Error);
                self.terminal = true;
            }
            Stage::Complete => {
                self.completed = [true; PIPELINE.len()];
                self.current = Some(Stage::Complete);
                self.terminal = true;
            }
            _ => {
                if let Some(index) = stage.pipeline_index() {
                    for flag in &mut self.completed[..index] {
                        *flag = true;
                    }
                    self.current = Some(stage);
                }
            }
        }

        self.message = message.to_string();
        self.icon = icon
            .filter(|value| !value.is_empty())
            .unwrap_or(stage.default_icon())
            .to_string();
    }

    pub(crate) fn set_redirect(&mut self, target: String) {
        self.redirect = Some(target);
    }

    /// Reinitializes the snapshot for a retry.
    pub fn reset(&mut self) {
        *self = ProgressState::default();
    }
}

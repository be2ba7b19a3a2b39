//! Minutes core: pure submission/progress state machine and view-model helpers.
mod chat;
mod effect;
mod guard;
mod msg;
mod progress;
mod state;
mod update;
mod view_model;

pub use chat::{ChatMessage, ChatRole, ChatSession, CHAT_CAPACITY};
pub use effect::Effect;
pub use guard::{check_marker, reconcile, JobMarker, MarkerCheck, ReconcileOutcome, RegistryEntry, STALE_MARKER_MS};
pub use msg::Msg;
pub use progress::{ProgressState, Stage, PIPELINE};
pub use state::{AppState, Phase, SubmissionMode, SCRIPT_RAMP_MS, SCRIPT_TARGET_PERCENT, SCRIPT_TICK_MS};
pub use update::update;
pub use view_model::{ChatMessageView, ChatView, StepView, UiViewModel};

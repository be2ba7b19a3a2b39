use crate::{
    check_marker, reconcile, AppState, ChatMessage, ChatRole, Effect, MarkerCheck, Msg, Phase,
    ReconcileOutcome, Stage, SubmissionMode, SCRIPT_RAMP_MS, SCRIPT_TARGET_PERCENT, SCRIPT_TICK_MS,
};

/// Audio files the upload form accepts, matched case-insensitively.
const ALLOWED_AUDIO_EXTENSIONS: [&str; 5] = [".wav", ".mp3", ".m4a", ".flac", ".mp4"];

/// Delay before navigating after a terminal success, so the completed
/// indicator registers visually.
const NAVIGATE_DELAY_MS: u64 = 1000;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started { marker, now_ms } => {
            if !matches!(state.phase, Phase::Loading) {
                return (state, Vec::new());
            }
            match check_marker(marker, now_ms) {
                MarkerCheck::NoMarker => {
                    state.phase = Phase::Idle;
                    state.mark_dirty();
                    Vec::new()
                }
                MarkerCheck::Stale => {
                    // Abandoned marker; clearing it prevents permanent lockout
                    // from a crashed session.
                    state.phase = Phase::Idle;
                    state.mark_dirty();
                    vec![Effect::ClearJobMarker]
                }
                MarkerCheck::MaybeInFlight { started_at_ms } => {
                    state.phase = Phase::CheckingRegistry { started_at_ms };
                    state.mark_dirty();
                    vec![Effect::FetchLatestNote]
                }
            }
        }
        Msg::LatestNoteFetched { latest } => {
            let Phase::CheckingRegistry { started_at_ms } = state.phase else {
                return (state, Vec::new());
            };
            match reconcile(started_at_ms, latest.as_ref()) {
                ReconcileOutcome::JobFinished { meeting_id } => {
                    // The client missed the completion signal; recovery, not a
                    // fresh submission, so no prompt.
                    state.phase = Phase::Completed;
                    state.mark_dirty();
                    vec![
                        Effect::ClearJobMarker,
                        Effect::Navigate {
                            target: format!("/view/{meeting_id}"),
                            delay_ms: 0,
                        },
                    ]
                }
                ReconcileOutcome::StillInFlight => {
                    state.phase = Phase::Blocked { started_at_ms };
                    state.mark_dirty();
                    Vec::new()
                }
            }
        }
        Msg::LatestNoteUnavailable => {
            // Fail open: never block the user on a reconciliation failure.
            // The marker stays; a later load may still reconcile it.
            if matches!(state.phase, Phase::CheckingRegistry { .. }) {
                state.phase = Phase::Idle;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ModeChanged(mode) => {
            if state.input_enabled() && state.mode != mode {
                state.mode = mode;
                state.validation = None;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TitleChanged(title) => {
            if state.input_enabled() {
                state.title = title;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FileChosen(file) => {
            if !state.input_enabled() {
                return (state, Vec::new());
            }
            match file {
                Some(name) if !has_allowed_extension(&name) => {
                    state.file = None;
                    state.validation = Some("Unsupported file type.".to_string());
                }
                other => {
                    state.file = other;
                    state.validation = None;
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::TranscriptChanged(text) => {
            if state.input_enabled() {
                state.transcript = text;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SubmitClicked { now_ms } => {
            if matches!(state.phase, Phase::Idle) {
                begin_submission(&mut state, now_ms)
            } else {
                Vec::new()
            }
        }
        Msg::StageFrameReceived {
            stage,
            message,
            icon,
            redirect,
        } => {
            if !matches!(state.phase, Phase::InFlight { mode: SubmissionMode::Audio }) {
                return (state, Vec::new());
            }
            // Unknown stage names are a forward-compatible no-op.
            let Some(stage) = Stage::from_wire(&stage) else {
                return (state, Vec::new());
            };
            match stage {
                Stage::Error => fail_attempt(&mut state, message),
                Stage::Complete => match redirect {
                    Some(target) => {
                        state.progress.apply(Stage::Complete, &message, icon.as_deref());
                        state.progress.set_redirect(target.clone());
                        complete_attempt(&mut state, target)
                    }
                    // A complete frame must carry a redirect; a frame without
                    // one cannot be trusted.
                    None => fail_attempt(
                        &mut state,
                        "The server reported completion without a destination.".to_string(),
                    ),
                },
                _ => {
                    state.progress.apply(stage, &message, icon.as_deref());
                    state.mark_dirty();
                    Vec::new()
                }
            }
        }
        Msg::UploadFailed { message } => {
            if matches!(state.phase, Phase::InFlight { .. }) {
                fail_attempt(&mut state, message)
            } else {
                Vec::new()
            }
        }
        Msg::ScriptAccepted {
            redirect_url,
            meeting_id,
        } => {
            if !matches!(state.phase, Phase::InFlight { mode: SubmissionMode::Script }) {
                return (state, Vec::new());
            }
            state.script_percent = 100.0;
            state
                .progress
                .apply(Stage::Complete, "Done! Opening the note...", None);
            let target = redirect_url.unwrap_or_else(|| format!("/view/{meeting_id}"));
            state.progress.set_redirect(target.clone());
            complete_attempt(&mut state, target)
        }
        Msg::ScriptFailed { message } => {
            if matches!(state.phase, Phase::InFlight { mode: SubmissionMode::Script }) {
                fail_attempt(&mut state, message)
            } else {
                Vec::new()
            }
        }
        Msg::RetryClicked { now_ms } => {
            if matches!(state.phase, Phase::Failed { .. }) {
                state.phase = Phase::Idle;
                state.progress.reset();
                begin_submission(&mut state, now_ms)
            } else {
                Vec::new()
            }
        }
        Msg::ErrorDismissed => {
            if matches!(state.phase, Phase::Failed { .. }) {
                state.phase = Phase::Idle;
                state.progress.reset();
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ForceCancelClicked => {
            // Client trust state only; any server-side job keeps running.
            if matches!(state.phase, Phase::Blocked { .. }) {
                state.phase = Phase::Idle;
                state.mark_dirty();
                vec![Effect::ClearJobMarker]
            } else {
                Vec::new()
            }
        }
        Msg::ChatHistoryRestored(messages) => {
            state.chat.restore(messages);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ChatSendClicked { text, now_iso } => {
            let text = text.trim().to_string();
            if text.is_empty() {
                // Empty input is rejected without touching the lock.
                return (state, Vec::new());
            }
            if !state.chat.begin_send() {
                // Single-flight: a send is outstanding; drop this one silently.
                return (state, Vec::new());
            }
            state.chat.push(ChatMessage {
                role: ChatRole::User,
                content: text.clone(),
                is_source_annotation: false,
                timestamp_iso: now_iso,
            });
            state.mark_dirty();
            vec![
                Effect::SendChat { query: text },
                Effect::PersistChat {
                    messages: state.chat.snapshot(),
                },
            ]
        }
        Msg::ChatAnswerReceived { result, now_iso } => {
            if !state.chat.is_sending() {
                return (state, Vec::new());
            }
            // Lock and placeholder are released on every exit path.
            state.chat.finish_send();
            let content = match result {
                Ok(answer) => answer,
                Err(error) => format!("Error: {error}"),
            };
            state.chat.push(ChatMessage {
                role: ChatRole::Assistant,
                content,
                is_source_annotation: false,
                timestamp_iso: now_iso,
            });
            state.mark_dirty();
            vec![Effect::PersistChat {
                messages: state.chat.snapshot(),
            }]
        }
        Msg::NavigatedAway => {
            state.phase = Phase::NavigatedAway;
            state.mark_dirty();
            Vec::new()
        }
        Msg::Tick => {
            advance_script_progress(&mut state);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Validates the form and, on success, starts the transfer. The marker
/// write, input lock, and unload guard land in the same update so the UI
/// never observes a half-started submission.
fn begin_submission(state: &mut AppState, now_ms: u64) -> Vec<Effect> {
    if let Some(message) = validate(state) {
        state.validation = Some(message);
        state.mark_dirty();
        return Vec::new();
    }

    state.validation = None;
    state.progress.reset();
    state.script_percent = 0.0;
    state.phase = Phase::InFlight { mode: state.mode };

    let transfer = match state.mode {
        SubmissionMode::Audio => {
            // The upload step shows active before the first frame arrives.
            state
                .progress
                .apply(Stage::Upload, "Uploading the file...", None);
            Effect::BeginUpload {
                title: state.title.trim().to_string(),
                file: state.file.clone().unwrap_or_default(),
            }
        }
        SubmissionMode::Script => {
            state
                .progress
                .apply(Stage::Upload, "Analyzing the transcript...", None);
            Effect::BeginScriptSubmit {
                title: state.title.trim().to_string(),
                transcript: state.transcript.clone(),
            }
        }
    };
    state.mark_dirty();

    vec![
        Effect::SaveJobMarker {
            started_at_ms: now_ms,
        },
        Effect::InstallUnloadGuard,
        transfer,
    ]
}

fn validate(state: &AppState) -> Option<String> {
    if state.title.trim().is_empty() {
        return Some("Please enter a title.".to_string());
    }
    match state.mode {
        SubmissionMode::Audio => match state.file.as_deref() {
            None => Some("Please choose a file to upload.".to_string()),
            Some(name) if !has_allowed_extension(name) => {
                Some("Unsupported file type.".to_string())
            }
            Some(_) => None,
        },
        SubmissionMode::Script => {
            if state.transcript.trim().is_empty() {
                Some("Please enter the transcript text.".to_string())
            } else {
                None
            }
        }
    }
}

fn has_allowed_extension(file_name: &str) -> bool {
    let lowered = file_name.to_ascii_lowercase();
    ALLOWED_AUDIO_EXTENSIONS
        .iter()
        .any(|extension| lowered.ends_with(extension))
}

/// Single exit point for every terminal error: marker cleared, unload guard
/// removed, input re-enabled through `Phase::Failed`.
fn fail_attempt(state: &mut AppState, message: String) -> Vec<Effect> {
    state.progress.apply(Stage::Error, &message, None);
    state.phase = Phase::Failed { message };
    state.mark_dirty();
    vec![Effect::ClearJobMarker, Effect::RemoveUnloadGuard]
}

/// Single exit point for terminal success. Input is not re-enabled; the
/// session is about to navigate away.
fn complete_attempt(state: &mut AppState, target: String) -> Vec<Effect> {
    state.phase = Phase::Completed;
    state.mark_dirty();
    vec![
        Effect::ClearJobMarker,
        Effect::RemoveUnloadGuard,
        Effect::Navigate {
            target,
            delay_ms: NAVIGATE_DELAY_MS,
        },
    ]
}

fn advance_script_progress(state: &mut AppState) {
    if !matches!(state.phase, Phase::InFlight { mode: SubmissionMode::Script }) {
        return;
    }
    if state.progress.is_terminal() {
        return;
    }
    let ticks = (SCRIPT_RAMP_MS / SCRIPT_TICK_MS) as f64;
    let increment = SCRIPT_TARGET_PERCENT / ticks;
    let before = state.view().script_percent;
    state.script_percent = (state.script_percent + increment).min(SCRIPT_TARGET_PERCENT);
    if state.view().script_percent != before {
        state.mark_dirty();
    }
}

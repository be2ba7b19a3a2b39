use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use client_logging::{client_info, client_warn};
use minutes_core::{Effect, Msg, RegistryEntry};
use minutes_engine::{ApiError, ClientSettings, EngineEvent, EngineHandle};

use super::session::SessionStore;
use super::LoopEvent;

/// Executes `Effect`s against the engine, the session store, and the loop's
/// navigation/unload ports, and feeds engine events back as `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
    session: SessionStore,
    unload_guard: Arc<AtomicBool>,
    event_tx: mpsc::Sender<LoopEvent>,
}

impl EffectRunner {
    pub fn new(
        event_tx: mpsc::Sender<LoopEvent>,
        session: SessionStore,
        unload_guard: Arc<AtomicBool>,
    ) -> Result<Self, ApiError> {
        let mut settings = ClientSettings::default();
        if let Ok(base_url) = std::env::var("MINUTES_SERVER_URL") {
            settings.base_url = base_url;
        }

        let engine = EngineHandle::new(settings)?;
        let runner = Self {
            engine,
            session,
            unload_guard,
            event_tx,
        };
        runner.spawn_event_loop();
        Ok(runner)
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SaveJobMarker { started_at_ms } => {
                    self.session.save_marker(started_at_ms);
                }
                Effect::ClearJobMarker => {
                    self.session.clear_marker();
                }
                Effect::FetchLatestNote => {
                    self.engine.fetch_latest_note();
                }
                Effect::InstallUnloadGuard => {
                    self.unload_guard.store(true, Ordering::Relaxed);
                }
                Effect::RemoveUnloadGuard => {
                    self.unload_guard.store(false, Ordering::Relaxed);
                }
                Effect::BeginUpload { title, file } => {
                    client_info!("BeginUpload title={:?} file={:?}", title, file);
                    self.engine.upload(title, file);
                }
                Effect::BeginScriptSubmit { title, transcript } => {
                    client_info!(
                        "BeginScriptSubmit title={:?} transcript_len={}",
                        title,
                        transcript.len()
                    );
                    self.engine.submit_script(title, transcript);
                }
                Effect::Navigate { target, delay_ms } => {
                    let event_tx = self.event_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(delay_ms));
                        client_info!("Opening {}", target);
                        println!("-> {target}");
                        let _ = event_tx.send(LoopEvent::Core(Msg::NavigatedAway));
                    });
                }
                Effect::SendChat { query } => {
                    self.engine.chat(query);
                }
                Effect::PersistChat { messages } => {
                    self.session.save_chat(&messages);
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let event_tx = self.event_tx.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                let msg = map_engine_event(event);
                if event_tx.send(LoopEvent::Core(msg)).is_err() {
                    return;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_engine_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StageFrame(frame) => Msg::StageFrameReceived {
            stage: frame.stage,
            message: frame.message,
            icon: frame.icon,
            redirect: frame.redirect,
        },
        EngineEvent::UploadFailed { message } => {
            client_warn!("Upload failed: {}", message);
            Msg::UploadFailed { message }
        }
        EngineEvent::ScriptAccepted(response) => Msg::ScriptAccepted {
            redirect_url: response.redirect_url,
            meeting_id: response.meeting_id,
        },
        EngineEvent::ScriptFailed { message } => {
            client_warn!("Script submission failed: {}", message);
            Msg::ScriptFailed { message }
        }
        EngineEvent::ChatAnswer { result } => Msg::ChatAnswerReceived {
            result,
            now_iso: Utc::now().to_rfc3339(),
        },
        EngineEvent::LatestNote { latest } => Msg::LatestNoteFetched {
            latest: latest.map(|entry| RegistryEntry {
                meeting_id: entry.meeting_id,
                created_at_ms: entry.created_at_ms,
            }),
        },
        EngineEvent::LatestNoteUnavailable { message } => {
            // Reconciliation failure is logged, never surfaced; the guard
            // fails open.
            client_warn!("Could not reconcile against the registry: {}", message);
            Msg::LatestNoteUnavailable
        }
    }
}

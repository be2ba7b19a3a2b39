use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use crate::client::{ApiClient, ClientSettings, FrameSink, NoteApi};
use crate::{ApiError, EngineEvent};

enum EngineCommand {
    Upload { title: String, file: PathBuf },
    SubmitScript { title: String, transcript: String },
    Chat { query: String },
    FetchLatestNote,
}

/// Handle to the engine worker: a tokio runtime on a dedicated thread,
/// commands in and events out over std channels so the platform loop stays
/// synchronous.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let api = Arc::new(ApiClient::new(settings)?);

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn upload(&self, title: impl Into<String>, file: impl Into<PathBuf>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload {
            title: title.into(),
            file: file.into(),
        });
    }

    pub fn submit_script(&self, title: impl Into<String>, transcript: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::SubmitScript {
            title: title.into(),
            transcript: transcript.into(),
        });
    }

    pub fn chat(&self, query: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Chat {
            query: query.into(),
        });
    }

    pub fn fetch_latest_note(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchLatestNote);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

struct ChannelFrameSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl FrameSink for ChannelFrameSink {
    fn emit(&self, frame: crate::StageFrame) {
        let _ = self.tx.send(EngineEvent::StageFrame(frame));
    }
}

async fn handle_command(
    api: &dyn NoteApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload { title, file } => {
            let file_name = display_name(&file);
            let bytes = match tokio::fs::read(&file).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let _ = event_tx.send(EngineEvent::UploadFailed {
                        message: format!("could not read {file_name}: {err}"),
                    });
                    return;
                }
            };
            let sink = ChannelFrameSink {
                tx: event_tx.clone(),
            };
            if let Err(err) = api.upload(&title, &file_name, bytes, &sink).await {
                let _ = event_tx.send(EngineEvent::UploadFailed {
                    message: err.to_string(),
                });
            }
        }
        EngineCommand::SubmitScript { title, transcript } => {
            let event = match api.submit_script(&title, &transcript).await {
                Ok(response) => EngineEvent::ScriptAccepted(response),
                Err(err) => EngineEvent::ScriptFailed {
                    message: err.to_string(),
                },
            };
            let _ = event_tx.send(event);
        }
        EngineCommand::Chat { query } => {
            let result = api.chat(&query).await.map_err(|err| err.to_string());
            let _ = event_tx.send(EngineEvent::ChatAnswer { result });
        }
        EngineCommand::FetchLatestNote => {
            let event = match api.latest_note().await {
                Ok(latest) => EngineEvent::LatestNote { latest },
                Err(err) => EngineEvent::LatestNoteUnavailable {
                    message: err.to_string(),
                },
            };
            let _ = event_tx.send(event);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

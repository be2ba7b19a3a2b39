//! Session store: the reload-surviving marker and chat transcript.
//!
//! Stands in for the browser's tab-scoped session storage. A missing or
//! corrupt file is treated identically to an empty session.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use client_logging::{client_error, client_warn};
use minutes_core::{ChatMessage, ChatRole, JobMarker};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const SESSION_FILENAME: &str = ".minutes_session.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSession {
    marker: Option<PersistedMarker>,
    chat: Vec<PersistedChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedMarker {
    started_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedChatMessage {
    role: PersistedRole,
    content: String,
    is_source_annotation: bool,
    timestamp_iso: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum PersistedRole {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SESSION_FILENAME),
        }
    }

    pub fn load_marker(&self) -> Option<JobMarker> {
        self.read()
            .marker
            .map(|marker| JobMarker {
                started_at_ms: marker.started_at_ms,
            })
    }

    pub fn load_chat(&self) -> Vec<ChatMessage> {
        self.read()
            .chat
            .into_iter()
            .map(|message| ChatMessage {
                role: match message.role {
                    PersistedRole::User => ChatRole::User,
                    PersistedRole::Assistant => ChatRole::Assistant,
                },
                content: message.content,
                is_source_annotation: message.is_source_annotation,
                timestamp_iso: message.timestamp_iso,
            })
            .collect()
    }

    pub fn save_marker(&self, started_at_ms: u64) {
        let mut session = self.read();
        session.marker = Some(PersistedMarker { started_at_ms });
        self.write(&session);
    }

    /// Idempotent: clearing an absent marker is a no-op.
    pub fn clear_marker(&self) {
        let mut session = self.read();
        if session.marker.take().is_some() {
            self.write(&session);
        }
    }

    pub fn save_chat(&self, messages: &[ChatMessage]) {
        let mut session = self.read();
        session.chat = messages
            .iter()
            .map(|message| PersistedChatMessage {
                role: match message.role {
                    ChatRole::User => PersistedRole::User,
                    ChatRole::Assistant => PersistedRole::Assistant,
                },
                content: message.content.clone(),
                is_source_annotation: message.is_source_annotation,
                timestamp_iso: message.timestamp_iso.clone(),
            })
            .collect();
        self.write(&session);
    }

    fn read(&self) -> PersistedSession {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return PersistedSession::default();
            }
            Err(err) => {
                client_warn!("Failed to read session file {:?}: {}", self.path, err);
                return PersistedSession::default();
            }
        };

        match ron::from_str(&content) {
            Ok(session) => session,
            Err(err) => {
                client_warn!("Failed to parse session file {:?}: {}", self.path, err);
                PersistedSession::default()
            }
        }
    }

    fn write(&self, session: &PersistedSession) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(session, pretty) {
            Ok(text) => text,
            Err(err) => {
                client_error!("Failed to serialize session state: {}", err);
                return;
            }
        };

        if let Err(err) = self.write_atomic(&content) {
            client_error!("Failed to write session file {:?}: {}", self.path, err);
        }
    }

    // Temp file + rename so a crash mid-write never corrupts the session.
    fn write_atomic(&self, content: &str) -> std::io::Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

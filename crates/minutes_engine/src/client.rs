use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use client_logging::client_warn;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::sse::FrameReader;
use crate::{ApiError, RegistryEntry, ScriptResponse, StageFrame};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Receives decoded frames as the upload stream produces them.
pub trait FrameSink: Send + Sync {
    fn emit(&self, frame: StageFrame);
}

/// The server operations the coordinator depends on. The worker loop talks
/// to this seam so tests can substitute a fake.
#[async_trait::async_trait]
pub trait NoteApi: Send + Sync {
    async fn upload(
        &self,
        title: &str,
        file_name: &str,
        bytes: Vec<u8>,
        sink: &dyn FrameSink,
    ) -> Result<(), ApiError>;

    async fn submit_script(&self, title: &str, transcript: &str)
        -> Result<ScriptResponse, ApiError>;

    async fn chat(&self, query: &str) -> Result<String, ApiError>;

    async fn latest_note(&self) -> Result<Option<RegistryEntry>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    settings: ClientSettings,
    http: reqwest::Client,
}

impl ApiClient {
    /// Builds the client. Only a connect timeout is set: the progress stream
    /// deliberately waits indefinitely for the server to close it or emit a
    /// terminal frame.
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { settings, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl NoteApi for ApiClient {
    /// Streaming upload: POSTs the file, then decodes the event-stream body,
    /// emitting each frame to `sink` as it completes.
    async fn upload(
        &self,
        title: &str,
        file_name: &str,
        bytes: Vec<u8>,
        sink: &dyn FrameSink,
    ) -> Result<(), ApiError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new()
            .text("title", title.to_string())
            .part("file", part);

        let response = self
            .http
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !content_type.contains("text/event-stream") {
            return Err(ApiError::UnexpectedResponse(format!(
                "expected an event stream, got {content_type:?}"
            )));
        }

        let mut reader = FrameReader::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            for frame in reader.push(&chunk)? {
                sink.emit(frame);
            }
        }
        Ok(())
    }

    /// Request/response transcript submission.
    async fn submit_script(
        &self,
        title: &str,
        transcript: &str,
    ) -> Result<ScriptResponse, ApiError> {
        let form = Form::new()
            .text("title", title.to_string())
            .text("script_text", transcript.to_string());

        let response = self
            .http
            .post(self.url("/upload_script"))
            .header("X-Requested-With", "XMLHttpRequest")
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<ScriptResponse>()
                .await
                .map_err(|err| ApiError::UnexpectedResponse(err.to_string()))
        } else {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            match body.error {
                Some(message) => Err(ApiError::Server(message)),
                None => Err(ApiError::HttpStatus(status.as_u16())),
            }
        }
    }

    /// One assistant-chat request.
    async fn chat(&self, query: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.url("/api/chat"))
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let body: ChatBody = response
            .json()
            .await
            .map_err(|err| ApiError::UnexpectedResponse(err.to_string()))?;
        if body.success {
            body.answer
                .ok_or_else(|| ApiError::UnexpectedResponse("answer missing".to_string()))
        } else {
            Err(ApiError::Server(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    /// The most recently created job, used only for guard reconciliation.
    async fn latest_note(&self) -> Result<Option<RegistryEntry>, ApiError> {
        let response = self
            .http
            .get(self.url("/notes_json"))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let body: NotesBody = response
            .json()
            .await
            .map_err(|err| ApiError::UnexpectedResponse(err.to_string()))?;

        // Entries arrive most-recent-first; only the newest matters.
        let Some(meeting) = body.meetings.into_iter().next() else {
            return Ok(None);
        };
        let meeting_id = meeting.meeting_id();
        match parse_meeting_date(&meeting.meeting_date) {
            Some(created_at_ms) => Ok(Some(RegistryEntry {
                meeting_id,
                meeting_date: meeting.meeting_date,
                created_at_ms,
            })),
            None => {
                client_warn!(
                    "Unparseable meeting_date {:?} for meeting {}",
                    meeting.meeting_date,
                    meeting_id
                );
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    success: bool,
    answer: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NotesBody {
    #[serde(default)]
    meetings: Vec<MeetingRow>,
}

#[derive(Debug, Deserialize)]
struct MeetingRow {
    meeting_id: serde_json::Value,
    meeting_date: String,
}

impl MeetingRow {
    fn meeting_id(&self) -> String {
        match &self.meeting_id {
            serde_json::Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }
}

/// The server stores dates either as RFC 3339 or as a bare
/// `YYYY-MM-DD HH:MM:SS` string, depending on its age.
fn parse_meeting_date(raw: &str) -> Option<u64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return u64::try_from(parsed.timestamp_millis()).ok();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return u64::try_from(parsed.and_utc().timestamp_millis()).ok();
    }
    None
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if let Some(status) = err.status() {
        return ApiError::HttpStatus(status.as_u16());
    }
    ApiError::Network(err.to_string())
}

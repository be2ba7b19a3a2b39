use std::sync::{Arc, Mutex};

use minutes_engine::{ApiClient, ApiError, ClientSettings, FrameSink, NoteApi, StageFrame};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    frames: Arc<Mutex<Vec<StageFrame>>>,
}

impl TestSink {
    fn new() -> Self {
        Self {
            frames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn take(&self) -> Vec<StageFrame> {
        self.frames.lock().unwrap().drain(..).collect()
    }
}

impl FrameSink for TestSink {
    fn emit(&self, frame: StageFrame) {
        self.frames.lock().unwrap().push(frame);
    }
}

fn client_for(server: &MockServer) -> ApiClient {
    let settings = ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    };
    ApiClient::new(settings).expect("client")
}

#[tokio::test]
async fn upload_emits_each_frame_from_the_event_stream() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"step\": \"upload\", \"message\": \"Uploading...\"}\n\n",
        "data: {\"step\": \"stt\", \"message\": \"Transcribing...\"}\n\n",
        "data: {\"step\": \"complete\", \"message\": \"Done\", \"redirect\": \"/view/5\"}\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sink = TestSink::new();

    client
        .upload("Weekly sync", "notes.mp3", b"riff".to_vec(), &sink)
        .await
        .expect("upload ok");

    let frames = sink.take();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].stage, "upload");
    assert_eq!(frames[1].stage, "stt");
    assert_eq!(frames[2].redirect.as_deref(), Some("/view/5"));
}

#[tokio::test]
async fn upload_rejects_a_non_stream_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sink = TestSink::new();

    let err = client
        .upload("Weekly sync", "notes.mp3", b"riff".to_vec(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::UnexpectedResponse(_)), "got {err:?}");
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn upload_maps_http_failure_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sink = TestSink::new();

    let err = client
        .upload("Weekly sync", "notes.mp3", b"riff".to_vec(), &sink)
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::HttpStatus(500));
}

#[tokio::test]
async fn upload_aborts_on_a_malformed_frame() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"step\": \"upload\", \"message\": \"Uploading...\"}\n\n",
        "data: not json\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let sink = TestSink::new();

    let err = client
        .upload("Weekly sync", "notes.mp3", b"riff".to_vec(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn submit_script_returns_the_accepted_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_script"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "redirect_url": "/view/12",
            "meeting_id": "12",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .submit_script("Weekly sync", "we discussed things")
        .await
        .expect("accepted");

    assert_eq!(response.redirect_url.as_deref(), Some("/view/12"));
    assert_eq!(response.meeting_id, "12");
}

#[tokio::test]
async fn submit_script_surfaces_the_server_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_script"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "script text is required",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.submit_script("Weekly sync", "").await.unwrap_err();

    assert_eq!(err, ApiError::Server("script text is required".to_string()));
}

#[tokio::test]
async fn submit_script_without_an_error_body_falls_back_to_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_script"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.submit_script("Weekly sync", "text").await.unwrap_err();

    assert_eq!(err, ApiError::HttpStatus(500));
}

#[tokio::test]
async fn chat_returns_the_answer_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "answer": "We agreed on Tuesday.",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let answer = client.chat("What was decided?").await.expect("answer");

    assert_eq!(answer, "We agreed on Tuesday.");
}

#[tokio::test]
async fn chat_surfaces_an_application_level_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": "no note selected",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.chat("What was decided?").await.unwrap_err();

    assert_eq!(err, ApiError::Server("no note selected".to_string()));
}

#[tokio::test]
async fn latest_note_returns_the_newest_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "meetings": [
                { "meeting_id": "9", "meeting_date": "2024-03-01T10:00:00+00:00" },
                { "meeting_id": "8", "meeting_date": "2024-02-28T09:00:00+00:00" },
            ],
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let latest = client.latest_note().await.expect("registry").expect("entry");

    assert_eq!(latest.meeting_id, "9");
    assert_eq!(latest.created_at_ms, 1_709_287_200_000);
}

#[tokio::test]
async fn latest_note_accepts_numeric_ids_and_bare_dates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "meetings": [
                { "meeting_id": 42, "meeting_date": "2024-03-01 10:00:00" },
            ],
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let latest = client.latest_note().await.expect("registry").expect("entry");

    assert_eq!(latest.meeting_id, "42");
    assert_eq!(latest.created_at_ms, 1_709_287_200_000);
}

#[tokio::test]
async fn latest_note_is_none_for_an_empty_registry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes_json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "meetings": [] })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let latest = client.latest_note().await.expect("registry");

    assert_eq!(latest, None);
}

#[tokio::test]
async fn latest_note_with_an_unparseable_date_is_treated_as_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "meetings": [
                { "meeting_id": "9", "meeting_date": "yesterday-ish" },
            ],
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let latest = client.latest_note().await.expect("registry");

    assert_eq!(latest, None);
}

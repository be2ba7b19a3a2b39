//! Minutes engine: HTTP transfer, stream decoding, and effect execution.
mod client;
mod engine;
mod sse;
mod types;

pub use client::{ApiClient, ClientSettings, FrameSink, NoteApi};
pub use engine::EngineHandle;
pub use sse::FrameReader;
pub use types::{ApiError, EngineEvent, RegistryEntry, ScriptResponse, StageFrame};

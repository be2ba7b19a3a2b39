use std::collections::VecDeque;

/// Maximum number of transcript entries kept; oldest are evicted first.
pub const CHAT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub is_source_annotation: bool,
    pub timestamp_iso: String,
}

/// Assistant chat: bounded persisted transcript plus a single-flight lock.
///
/// The lock is in-memory only; concurrent sends are a pacing concern, not a
/// correctness one. The in-flight placeholder is never part of the
/// persistable transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatSession {
    messages: VecDeque<ChatMessage>,
    sending: bool,
    pending: bool,
}

impl ChatSession {
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Whether a placeholder answer bubble should be shown.
    pub fn has_pending_placeholder(&self) -> bool {
        self.pending
    }

    /// Replaces the transcript with previously persisted messages.
    pub fn restore(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages.into_iter().collect();
        self.evict();
    }

    /// Appends a message, evicting the oldest beyond capacity.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        self.evict();
    }

    fn evict(&mut self) {
        while self.messages.len() > CHAT_CAPACITY {
            self.messages.pop_front();
        }
    }

    /// Takes the lock and shows the placeholder. Returns false if a send is
    /// already outstanding.
    pub fn begin_send(&mut self) -> bool {
        if self.sending {
            return false;
        }
        self.sending = true;
        self.pending = true;
        true
    }

    /// Releases the lock and removes the placeholder. Runs on every exit
    /// path of a send, success or failure.
    pub fn finish_send(&mut self) {
        self.sending = false;
        self.pending = false;
    }

    /// Snapshot of the persistable transcript (placeholder excluded by
    /// construction).
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }
}

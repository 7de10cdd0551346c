use async_trait::async_trait;
use resiply_types::{ChatRequest, ChatResponse, RemoteThread};

use crate::error::Result;

/// Remote chat surface: conversation history and the assistant endpoint.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Thread history for a member (`GET /recommendations/chat/logs`).
    async fn chat_logs(&self, member_id: &str) -> Result<Vec<RemoteThread>>;

    /// One assistant round-trip (`POST /recommendations/chat`).
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Keystroke-driven ingredient/recipe suggestions.
#[async_trait]
pub trait SuggestBackend: Send + Sync {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

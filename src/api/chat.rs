use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::user_path;
use crate::error::ApiResult;
use crate::gateway::Gateway;
use crate::transport::Transport;
use crate::types::ConversationId;

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omitted to start a new conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<ConversationId>,
}

/// Assistant reply plus the tool invocations it made (task edits etc.).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: ConversationId,
    pub response: String,
    #[serde(default)]
    pub tool_calls: Vec<JsonValue>,
}

pub async fn send_message<T: Transport>(
    gateway: &Gateway<T>,
    message: impl Into<String>,
    conversation_id: Option<ConversationId>,
) -> ApiResult<ChatResponse> {
    let user_id = gateway.require_user()?;
    let request = ChatRequest {
        message: message.into(),
        conversation_id,
    };
    gateway.post(&user_path(&user_id, "chat"), &request).await
}

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::types::{MessagingCapabilities, OutgoingMessage},
    Result,
};

/// Cross-messenger port.
///
/// The bot core only produces [`OutgoingMessage`] values; adapters decide how markup
/// and keyboards are rendered on their platform.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send `msg` to `chat_id`, quoting `reply_to` when the message asks for it.
    async fn send(
        &self,
        chat_id: ChatId,
        reply_to: Option<MessageId>,
        msg: &OutgoingMessage,
    ) -> Result<MessageRef>;
}

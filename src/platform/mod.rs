pub mod telegram;

/// A decoded chat message from any platform. The label fields feed logging
/// and metrics only; `channel_id` is the routing key for dispatch.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    /// The free-form message text.
    pub content: String,
    /// Platform-specific chat/channel ID as string.
    pub channel_id: String,
    /// Display name of the chat or group (or "private").
    pub chat_label: String,
    /// Kind of channel the message arrived on.
    pub channel_label: String,
    /// Display name of the sender.
    pub author_label: String,
    /// Whether an automated account authored the message.
    pub from_bot: bool,
}

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::Chat;
use tracing::{info, warn};

use crate::metrics::{self, MetricsSink};
use crate::pipeline::Pipeline;
use crate::platform::MessageEvent;

/// Run the Telegram platform: decode every incoming message into a
/// [`MessageEvent`] and hand it to the dispatch pipeline.
pub async fn run(
    pipeline: Arc<Pipeline>,
    bot_token: &str,
    sink: Arc<dyn MetricsSink>,
) -> Result<()> {
    let bot = Bot::new(bot_token);

    let me = bot.get_me().await?;
    info!("Logged in as @{}", me.username());
    sink.increment_counter(metrics::READY_EVENTS_TOTAL, &[]);
    sink.set_gauge(metrics::CONNECTED, 1.0, &[]);

    let handler = Update::filter_message().endpoint(handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![pipeline])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    sink.set_gauge(metrics::CONNECTED, 0.0, &[]);

    Ok(())
}

async fn handle_message(msg: Message, pipeline: Arc<Pipeline>) -> ResponseResult<()> {
    if let Some(event) = decode(&msg) {
        // Fire and forget: the pipeline contains every failure, and there is
        // no chat-visible response on any path.
        pipeline.handle_message(&event).await;
    }
    Ok(())
}

/// Map a Telegram message onto the platform-agnostic event shape. Messages
/// without text or caption (stickers, joins, ...) are skipped here.
fn decode(msg: &Message) -> Option<MessageEvent> {
    let content = msg.text().or_else(|| msg.caption())?.to_string();
    let from = msg.from.as_ref();

    Some(MessageEvent {
        content,
        channel_id: msg.chat.id.to_string(),
        chat_label: msg
            .chat
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| "private".to_string()),
        channel_label: chat_kind(&msg.chat).to_string(),
        author_label: from
            .map(|u| u.username.clone().unwrap_or_else(|| u.full_name()))
            .unwrap_or_else(|| "unknown".to_string()),
        from_bot: from.map(|u| u.is_bot).unwrap_or(false),
    })
}

fn chat_kind(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else if chat.is_channel() {
        "channel"
    } else {
        "unknown"
    }
}

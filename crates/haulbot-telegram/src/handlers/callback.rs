use std::sync::Arc;

use teloxide::prelude::*;

use haulbot_core::domain::{ChatId, MessageId};

use crate::router::AppState;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        // Inline-mode callbacks carry no message; nothing to anchor a menu
        // to, so just close the spinner.
        let _ = bot.answer_callback_query(q.id).await;
        return Ok(());
    };

    let chat_id = ChatId(message.chat.id.0);
    let origin = MessageId(message.id.0);
    let payload = q.data.clone().unwrap_or_default();

    // Serialize handling per chat; see router::ChatLocks.
    let _guard = state.chat_locks.lock_chat(chat_id.0).await;

    if let Err(e) = state
        .engine
        .handle_callback(chat_id, origin, &q.id, &payload)
        .await
    {
        tracing::error!(chat = chat_id.0, payload = %payload, error = %e, "callback failed");
    }

    Ok(())
}

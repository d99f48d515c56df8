use std::sync::Arc;

use teloxide::prelude::*;

use haulbot_core::{domain::ChatId, navigation::Menu};

use crate::router::AppState;

/// Plain messages: `/start` (re)opens the main menu; free-form text is
/// captured by the step-specific input handlers behind the engine's ports.
pub async fn handle_message(
    _bot: Bot,
    msg: Message,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let chat_id = ChatId(msg.chat.id.0);
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if text.trim() != "/start" {
        tracing::debug!(chat = chat_id.0, "text input outside a prompt, ignoring");
        return Ok(());
    }

    let _guard = state.chat_locks.lock_chat(chat_id.0).await;

    let deps = state.engine.deps();
    let user = match deps.directory.lookup_user(chat_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(chat = chat_id.0, "unknown account on /start");
            return Ok(());
        }
        Err(e) => {
            tracing::error!(chat = chat_id.0, error = %e, "lookup failed on /start");
            return Ok(());
        }
    };

    match deps.screens.render(chat_id, None, &user, &Menu::Main).await {
        Ok(menu_id) => {
            deps.sessions.clear_state(chat_id).await;
            deps.sessions
                .update_form_draft(chat_id, |d| d.active_message_id = Some(menu_id))
                .await;
        }
        Err(e) => {
            tracing::error!(chat = chat_id.0, error = %e, "main menu render failed");
        }
    }

    Ok(())
}

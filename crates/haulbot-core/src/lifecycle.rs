//! Single-active-message bookkeeping.
//!
//! Every chat has exactly one live menu message. Before dispatch, stale
//! ephemeral and media messages are swept; after dispatch, the superseded
//! menu is deleted so the conversation appears to advance in place. All
//! deletions are best-effort: cleanup must never block or fail the primary
//! response.

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    engine::Deps,
    steps,
};

/// Commands whose origin message must survive dispatch: no-ops leave the
/// menu untouched, export generation answers out-of-band, and the delivery
/// receipt must keep the notification visible.
pub fn is_delete_exempt(identifier: &str) -> bool {
    identifier == "noop"
        || identifier == "noop_informational"
        || identifier.starts_with("excel_generate_")
        || identifier == "exec_notified"
}

/// Delete a message unless a delete was already issued for it, and remember
/// the attempt either way. Failures are logged and swallowed.
pub async fn delete_best_effort(deps: &Deps, chat_id: ChatId, message_id: MessageId) {
    let already = deps
        .sessions
        .with(chat_id, |s| {
            let seen = s.is_deleted(message_id);
            s.mark_deleted(message_id);
            seen
        })
        .await;
    if already {
        return;
    }

    let msg = MessageRef { chat_id, message_id };
    if let Err(e) = deps.messenger.delete_message(msg).await {
        tracing::warn!(chat = chat_id.0, message = message_id.0, error = %e, "delete failed");
    }
}

/// Entry sweep: drop tracked ephemeral messages, and when the incoming
/// message is the form flow's tracked menu, treat all other tracked media
/// messages as stale.
pub async fn pre_dispatch(deps: &Deps, chat_id: ChatId, origin: MessageId) {
    let ephemerals = deps
        .sessions
        .with(chat_id, |s| std::mem::take(&mut s.ephemeral_message_ids))
        .await;
    for id in ephemerals {
        if id != origin {
            delete_best_effort(deps, chat_id, id).await;
        }
    }

    let stale_media = deps
        .sessions
        .with(chat_id, |s| {
            if !steps::is_form_flow(&s.current_step) {
                return Vec::new();
            }
            if s.form_draft.active_message_id != Some(origin) || s.media_message_ids.is_empty() {
                return Vec::new();
            }
            let stale: Vec<MessageId> = s
                .media_message_ids
                .iter()
                .copied()
                .filter(|id| *id != origin && !s.is_deleted(*id))
                .collect();
            s.media_message_ids = vec![origin];
            stale
        })
        .await;
    for id in stale_media {
        delete_best_effort(deps, chat_id, id).await;
    }
}

/// Exit reconciliation: decide the new active message and delete the
/// superseded origin. Preference order: the id the handler reported, the id
/// tracked in the namespace-appropriate draft, the origin itself.
pub async fn post_dispatch(
    deps: &Deps,
    chat_id: ChatId,
    origin: MessageId,
    identifier: &str,
    handler_active: Option<MessageId>,
) -> MessageId {
    let draft_active = deps.sessions.with(chat_id, |s| s.active_message_id()).await;
    let active = handler_active.or(draft_active).unwrap_or(origin);

    if active != origin && !is_delete_exempt(identifier) {
        tracing::debug!(
            chat = chat_id.0,
            old = origin.0,
            new = active.0,
            "menu advanced, deleting superseded message"
        );
        delete_best_effort(deps, chat_id, origin).await;
    }

    active
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exemptions_cover_noops_exports_and_receipts() {
        assert!(is_delete_exempt("noop"));
        assert!(is_delete_exempt("noop_informational"));
        assert!(is_delete_exempt("excel_generate_orders"));
        assert!(is_delete_exempt("exec_notified"));
        assert!(!is_delete_exempt("staff_menu"));
    }
}

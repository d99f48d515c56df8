//! Per-chat conversation state.
//!
//! The store hands out one lock per chat key, so unrelated chats never
//! contend while reads/modifications for a single chat are serialized.
//! Nothing here is persisted across process restarts; the session shape is
//! serde-serializable for callers that want to snapshot it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    domain::{ChatId, MessageId},
    drafts::{FormDraft, SettlementDraft},
    steps,
};

/// Upper bound on the history stack. Repeatedly entering and backing out of
/// nested flows must not grow memory without limit; the oldest entries are
/// dropped first.
pub const HISTORY_CAP: usize = 64;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSession {
    pub current_step: String,
    /// Meaningful steps only, most recent last. The current step sits on
    /// top while a flow is active; `idle` and confirmation dialogs are never
    /// pushed.
    pub history: Vec<String>,
    pub form_draft: FormDraft,
    pub settlement_draft: SettlementDraft,
    /// Auxiliary media messages belonging to the current form step.
    pub media_message_ids: Vec<MessageId>,
    /// Short-lived messages deleted on the next interaction.
    pub ephemeral_message_ids: Vec<MessageId>,
    /// Ids we already issued a delete for; suppresses repeat API calls.
    #[serde(skip)]
    deleted: HashSet<i32>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self {
            current_step: steps::IDLE.to_string(),
            history: Vec::new(),
            form_draft: FormDraft::default(),
            settlement_draft: SettlementDraft::default(),
            media_message_ids: Vec::new(),
            ephemeral_message_ids: Vec::new(),
            deleted: HashSet::new(),
        }
    }
}

impl ChatSession {
    /// Transition to `step`, pushing the step being left onto history.
    ///
    /// Idle and confirmation-dialog steps are never pushed (resuming into
    /// them is meaningless), and a step is not pushed twice in a row.
    pub fn set_step(&mut self, step: &str) {
        let old = std::mem::replace(&mut self.current_step, step.to_string());
        if old == step || !steps::is_meaningful(&old) {
            return;
        }
        if self.history.last() == Some(&old) {
            return;
        }
        if self.history.len() == HISTORY_CAP {
            self.history.remove(0);
        }
        self.history.push(old);
    }

    /// Pop the most recent prior step and make it current. An empty stack
    /// yields the idle step rather than failing.
    pub fn pop_step(&mut self) -> String {
        self.current_step = self
            .history
            .pop()
            .unwrap_or_else(|| steps::IDLE.to_string());
        self.current_step.clone()
    }

    /// Reset to idle: clears history and both drafts.
    pub fn clear(&mut self) {
        self.current_step = steps::IDLE.to_string();
        self.history.clear();
        self.form_draft = FormDraft::default();
        self.settlement_draft = SettlementDraft::default();
        self.media_message_ids.clear();
    }

    /// The draft-tracked active menu message for the current step's
    /// namespace.
    pub fn active_message_id(&self) -> Option<MessageId> {
        if steps::is_settlement_step(&self.current_step) {
            self.settlement_draft.active_message_id
        } else {
            self.form_draft.active_message_id
        }
    }

    pub fn set_active_message_id(&mut self, id: MessageId) {
        if steps::is_settlement_step(&self.current_step) {
            self.settlement_draft.active_message_id = Some(id);
        } else {
            self.form_draft.active_message_id = Some(id);
        }
    }

    pub fn mark_deleted(&mut self, id: MessageId) {
        self.deleted.insert(id.0);
    }

    pub fn is_deleted(&self, id: MessageId) -> bool {
        self.deleted.contains(&id.0)
    }
}

/// Thread-safe session repository, keyed by chat id.
///
/// Injected as a constructor dependency everywhere it is needed; there is no
/// global singleton.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<i64, Arc<Mutex<ChatSession>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, chat_id: ChatId) -> Arc<Mutex<ChatSession>> {
        let mut map = self.inner.lock().await;
        map.entry(chat_id.0)
            .or_insert_with(|| Arc::new(Mutex::new(ChatSession::default())))
            .clone()
    }

    /// Read-modify-write under the chat's lock.
    pub async fn with<R>(&self, chat_id: ChatId, f: impl FnOnce(&mut ChatSession) -> R) -> R {
        let entry = self.entry(chat_id).await;
        let mut session = entry.lock().await;
        f(&mut session)
    }

    pub async fn state(&self, chat_id: ChatId) -> String {
        self.with(chat_id, |s| s.current_step.clone()).await
    }

    pub async fn set_state(&self, chat_id: ChatId, step: &str) {
        self.with(chat_id, |s| s.set_step(step)).await
    }

    pub async fn pop_history(&self, chat_id: ChatId) -> String {
        self.with(chat_id, |s| s.pop_step()).await
    }

    pub async fn history(&self, chat_id: ChatId) -> Vec<String> {
        self.with(chat_id, |s| s.history.clone()).await
    }

    pub async fn clear_state(&self, chat_id: ChatId) {
        self.with(chat_id, |s| s.clear()).await
    }

    pub async fn form_draft(&self, chat_id: ChatId) -> FormDraft {
        self.with(chat_id, |s| s.form_draft.clone()).await
    }

    pub async fn update_form_draft(
        &self,
        chat_id: ChatId,
        f: impl FnOnce(&mut FormDraft),
    ) {
        self.with(chat_id, |s| f(&mut s.form_draft)).await
    }

    pub async fn clear_form_draft(&self, chat_id: ChatId) {
        self.with(chat_id, |s| s.form_draft = FormDraft::default())
            .await
    }

    pub async fn settlement_draft(&self, chat_id: ChatId) -> SettlementDraft {
        self.with(chat_id, |s| s.settlement_draft.clone()).await
    }

    pub async fn update_settlement_draft(
        &self,
        chat_id: ChatId,
        f: impl FnOnce(&mut SettlementDraft),
    ) {
        self.with(chat_id, |s| f(&mut s.settlement_draft)).await
    }

    pub async fn clear_settlement_draft(&self, chat_id: ChatId) {
        self.with(chat_id, |s| s.settlement_draft = SettlementDraft::default())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ChatId = ChatId(77);

    #[tokio::test]
    async fn default_state_is_idle() {
        let store = SessionStore::new();
        assert_eq!(store.state(CHAT).await, steps::IDLE);
    }

    #[tokio::test]
    async fn transitions_push_and_pop() {
        let store = SessionStore::new();
        store.set_state(CHAT, steps::ORDER_CATEGORY).await;
        store.set_state(CHAT, steps::ORDER_SUBCATEGORY).await;

        assert_eq!(store.state(CHAT).await, steps::ORDER_SUBCATEGORY);
        assert_eq!(store.history(CHAT).await, vec![steps::ORDER_CATEGORY]);

        assert_eq!(store.pop_history(CHAT).await, steps::ORDER_CATEGORY);
        assert_eq!(store.state(CHAT).await, steps::ORDER_CATEGORY);
        assert!(store.history(CHAT).await.is_empty());
    }

    #[tokio::test]
    async fn pop_on_empty_history_yields_idle() {
        let store = SessionStore::new();
        assert_eq!(store.pop_history(CHAT).await, steps::IDLE);
        assert_eq!(store.pop_history(CHAT).await, steps::IDLE);
    }

    #[tokio::test]
    async fn idle_and_confirm_dialogs_stay_out_of_history() {
        let store = SessionStore::new();
        store.set_state(CHAT, steps::ORDER_DATE).await;
        store.set_state(CHAT, steps::CONFIRM_CANCEL_ORDER).await;
        store.set_state(CHAT, steps::IDLE).await;

        assert_eq!(store.history(CHAT).await, vec![steps::ORDER_DATE]);
    }

    #[tokio::test]
    async fn consecutive_duplicates_collapse() {
        let store = SessionStore::new();
        store.set_state(CHAT, steps::ORDER_PHOTO).await;
        store.set_state(CHAT, steps::ORDER_DATE).await;
        store.set_state(CHAT, steps::ORDER_DATE).await;
        store.set_state(CHAT, steps::ORDER_TIME).await;
        assert_eq!(
            store.history(CHAT).await,
            vec![steps::ORDER_PHOTO, steps::ORDER_DATE]
        );
    }

    #[tokio::test]
    async fn history_is_capped_dropping_oldest() {
        let store = SessionStore::new();
        // Alternate two meaningful steps to defeat duplicate collapsing.
        for i in 0..(HISTORY_CAP + 10) {
            let step = if i % 2 == 0 { steps::ORDER_DATE } else { steps::ORDER_TIME };
            store.set_state(CHAT, step).await;
        }
        assert_eq!(store.history(CHAT).await.len(), HISTORY_CAP);
    }

    #[tokio::test]
    async fn clear_resets_drafts_and_history() {
        let store = SessionStore::new();
        store.set_state(CHAT, steps::SETTLE_INPUT_FUEL).await;
        store
            .update_settlement_draft(CHAT, |d| d.fuel_expense = 900.0)
            .await;

        store.clear_state(CHAT).await;

        assert_eq!(store.state(CHAT).await, steps::IDLE);
        assert!(store.history(CHAT).await.is_empty());
        assert_eq!(store.settlement_draft(CHAT).await.fuel_expense, 0.0);
    }

    #[tokio::test]
    async fn active_message_follows_step_namespace() {
        let store = SessionStore::new();
        store
            .update_form_draft(CHAT, |d| d.active_message_id = Some(MessageId(10)))
            .await;
        store
            .update_settlement_draft(CHAT, |d| d.active_message_id = Some(MessageId(20)))
            .await;

        store.set_state(CHAT, steps::ORDER_PHOTO).await;
        assert_eq!(
            store.with(CHAT, |s| s.active_message_id()).await,
            Some(MessageId(10))
        );

        store.set_state(CHAT, steps::SETTLE_LOADERS_MENU).await;
        assert_eq!(
            store.with(CHAT, |s| s.active_message_id()).await,
            Some(MessageId(20))
        );
    }

    #[tokio::test]
    async fn chats_do_not_interfere() {
        let store = Arc::new(SessionStore::new());
        let mut tasks = Vec::new();
        for chat in 0..8i64 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..50 {
                    store.set_state(ChatId(chat), steps::ORDER_DATE).await;
                    store.set_state(ChatId(chat), steps::ORDER_TIME).await;
                    store.pop_history(ChatId(chat)).await;
                }
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
        for chat in 0..8i64 {
            assert_eq!(store.state(ChatId(chat)).await, steps::ORDER_DATE);
        }
    }
}

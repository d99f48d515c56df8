//! Polling router.
//!
//! Besides wiring teloxide's dispatcher, this owns the per-chat locks that
//! serialize payload handling for one chat: two rapid taps on the same menu
//! are processed one after the other, never interleaved. Unrelated chats
//! proceed in parallel.

use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio::sync::{Mutex, OwnedMutexGuard};

use haulbot_core::{
    access::Policy,
    config::Config,
    engine::{Deps, Engine},
    messaging::port::MessagingPort,
    ports::{Directory, Orders, ScreenPort, Settlements},
    session::SessionStore,
    Result,
};

use crate::{handlers, screens::TelegramScreens, TelegramMessenger};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub chat_locks: Arc<ChatLocks>,
}

#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Build the engine over the Telegram adapters and run long polling.
pub async fn run_polling(
    cfg: Arc<Config>,
    directory: Arc<dyn Directory>,
    orders: Arc<dyn Orders>,
    settlements: Arc<dyn Settlements>,
) -> Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());
    if let Ok(me) = bot.get_me().await {
        tracing::info!(username = %me.username(), "haulbot started");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let screens: Arc<dyn ScreenPort> = Arc::new(TelegramScreens::new(
        messenger.clone(),
        orders.clone(),
        settlements.clone(),
    ));

    let engine = Arc::new(Engine::new(Deps {
        cfg,
        sessions: Arc::new(SessionStore::new()),
        screens,
        directory,
        orders,
        settlements,
        messenger,
        policy: Policy::standard(),
    }));

    let state = Arc::new(AppState {
        engine,
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

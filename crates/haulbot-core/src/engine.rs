//! The callback pipeline: resolve → gate → dispatch → reconcile.
//!
//! One inbound payload is handled start-to-finish here; the caller (the
//! platform adapter) serializes payloads per chat, so within a chat these
//! steps never interleave.

use std::sync::Arc;

use crate::{
    access::{Decision, Policy},
    command::{self, Command, RawCommand},
    config::Config,
    domain::{ChatId, MessageId, Role, UserRecord},
    errors::Error,
    features,
    lifecycle,
    messaging::port::MessagingPort,
    navigation::{self, Menu},
    ports::{Directory, Orders, ScreenPort, Settlements},
    session::SessionStore,
    steps,
    Result,
};

/// Shared collaborators, injected once at startup.
#[derive(Clone)]
pub struct Deps {
    pub cfg: Arc<Config>,
    pub sessions: Arc<SessionStore>,
    pub screens: Arc<dyn ScreenPort>,
    pub directory: Arc<dyn Directory>,
    pub orders: Arc<dyn Orders>,
    pub settlements: Arc<dyn Settlements>,
    pub messenger: Arc<dyn MessagingPort>,
    pub policy: Policy,
}

/// Per-payload context handed to feature flows.
#[derive(Clone, Debug)]
pub struct CallbackCtx {
    pub chat_id: ChatId,
    /// The message carrying the button the user pressed.
    pub origin: MessageId,
    pub callback_id: String,
    pub user: UserRecord,
}

pub struct Engine {
    deps: Deps,
}

impl Engine {
    pub fn new(deps: Deps) -> Self {
        Self { deps }
    }

    pub fn deps(&self) -> &Deps {
        &self.deps
    }

    /// Handle one inbound callback payload end to end.
    ///
    /// Every path out of this function leaves the chat with exactly one live
    /// menu message; errors are turned into corrective replies, not
    /// propagated to the transport.
    pub async fn handle_callback(
        &self,
        chat_id: ChatId,
        origin: MessageId,
        callback_id: &str,
        payload: &str,
    ) -> Result<()> {
        let deps = &self.deps;

        let raw = match command::resolve(payload) {
            Ok(raw) => raw,
            Err(_) => {
                tracing::warn!(chat = chat_id.0, payload, "malformed payload");
                self.ack(callback_id, None).await;
                if let Some(user) = self.lookup(chat_id).await? {
                    deps.screens
                        .render(chat_id, Some(origin), &user, &Menu::InvalidRequest)
                        .await?;
                }
                return Ok(());
            }
        };

        // Acknowledge the callback up front; the delivery receipt answers
        // after its handler so it can report per-executor text.
        if raw.identifier != "exec_notified" {
            let ack_text = (raw.identifier == "noop_informational").then_some("✅");
            self.ack(callback_id, ack_text).await;
        }

        lifecycle::pre_dispatch(deps, chat_id, origin).await;

        let Some(user) = self.lookup(chat_id).await? else {
            tracing::error!(chat = chat_id.0, payload, "no account for chat");
            let _ = deps
                .messenger
                .send_html(chat_id, "Account problem, try /start.")
                .await;
            return Ok(());
        };
        let ctx = CallbackCtx {
            chat_id,
            origin,
            callback_id: callback_id.to_string(),
            user,
        };

        if ctx.user.blocked {
            tracing::warn!(chat = chat_id.0, "blocked account, callback ignored");
            deps.screens
                .render(
                    chat_id,
                    Some(origin),
                    &ctx.user,
                    &Menu::ErrorNotice { text: "Your account is blocked.".to_string() },
                )
                .await?;
            return Ok(());
        }

        // Gate on the identifier before decoding parameters: an unauthorized
        // caller gets the denial, not a parameter error.
        if deps.policy.check(&raw.identifier, ctx.user.role) == Decision::Denied {
            deps.screens
                .render(chat_id, Some(origin), &ctx.user, &Menu::AccessDenied)
                .await?;
            return Ok(());
        }

        let cmd = match Command::decode(&raw) {
            Ok(cmd) => cmd,
            Err(e) => return self.reply_decode_error(&ctx, e).await,
        };

        let dispatched = self.dispatch(&ctx, &raw, cmd).await;
        let handler_active = match dispatched {
            Ok(active) => active,
            Err(e) => return self.reply_dispatch_error(&ctx, &raw, e).await,
        };

        lifecycle::post_dispatch(deps, chat_id, origin, &raw.identifier, handler_active).await;
        Ok(())
    }

    async fn dispatch(
        &self,
        ctx: &CallbackCtx,
        raw: &RawCommand,
        cmd: Command,
    ) -> Result<Option<MessageId>> {
        let deps = &self.deps;
        tracing::debug!(
            chat = ctx.chat_id.0,
            identifier = %raw.identifier,
            params = ?raw.params,
            "dispatching"
        );

        match cmd {
            Command::Noop { .. } => Ok(None),
            Command::ContinueInBot => {
                let id = features::render_into(deps, ctx, &Menu::Main).await?;
                Ok(Some(id))
            }
            Command::Back { tokens } => self.handle_back(ctx, &tokens).await,
            Command::ResumeFlow { step_message } => self.handle_resume(ctx, step_message).await,
            Command::AskCancelOrder => {
                // Operators skip the confirmation and land on the main menu.
                if ctx.user.role.is_at_least(Role::Operator) {
                    deps.sessions.clear_state(ctx.chat_id).await;
                    let id = features::render_into(deps, ctx, &Menu::Main).await?;
                    return Ok(Some(id));
                }
                // The dialog step pushes the step being left, so a declined
                // cancel can find it again.
                deps.sessions
                    .set_state(ctx.chat_id, steps::CONFIRM_CANCEL_ORDER)
                    .await;
                let menu = Menu::ConfirmCancelOrder { resume_message: ctx.origin };
                let id = features::render_into(deps, ctx, &menu).await?;
                Ok(Some(id))
            }
            Command::AskCancelSettlement => {
                deps.sessions
                    .set_state(ctx.chat_id, steps::CONFIRM_CANCEL_SETTLEMENT)
                    .await;
                let menu = Menu::ConfirmCancelSettlement { resume_message: ctx.origin };
                let id = features::render_into(deps, ctx, &menu).await?;
                Ok(Some(id))
            }
            Command::ConfirmCancelAll => {
                deps.sessions.clear_state(ctx.chat_id).await;
                let id = features::render_into(deps, ctx, &Menu::Main).await?;
                Ok(Some(id))
            }
            Command::Order(cmd) => features::orders::handle(deps, ctx, cmd).await,
            Command::Manage(cmd) => features::manage::handle(deps, ctx, cmd).await,
            Command::Staff(cmd) => features::staff::handle(deps, ctx, cmd).await,
            Command::Block(cmd) => features::staff::handle_block(deps, ctx, cmd).await,
            Command::Stats(cmd) => features::stats::handle(deps, ctx, cmd).await,
            Command::Info(cmd) => features::info::handle(deps, ctx, cmd).await,
            Command::Salary(cmd) => features::salary::handle(deps, ctx, cmd).await,
            Command::OwnerCash(cmd) => features::settlement::handle_owner(deps, ctx, cmd).await,
            Command::Settle(cmd) => features::settlement::handle_driver(deps, ctx, cmd).await,
        }
    }

    /// Back: discard the step being left, decode the destination, re-render
    /// it. Unknown or context-less destinations degrade to the main menu.
    async fn handle_back(
        &self,
        ctx: &CallbackCtx,
        tokens: &[String],
    ) -> Result<Option<MessageId>> {
        let deps = &self.deps;

        // Leaving a step that may have a reply keyboard up: drop it with a
        // throwaway message that the next interaction sweeps away.
        let leaving = deps.sessions.state(ctx.chat_id).await;
        if leaving == steps::ORDER_PHONE || leaving == steps::ORDER_ADDRESS {
            if let Ok(sent) = deps.messenger.send_html(ctx.chat_id, "⌨️").await {
                deps.sessions
                    .with(ctx.chat_id, |s| s.ephemeral_message_ids.push(sent.message_id))
                    .await;
            }
        }

        deps.sessions.pop_history(ctx.chat_id).await;

        let menu = match navigation::parse_back_destination(tokens) {
            Menu::Main => {
                deps.sessions.clear_state(ctx.chat_id).await;
                Menu::Main
            }
            Menu::SubcategoryMenu { category: None } => {
                // The payload does not carry the category; recover it from
                // the draft, or re-pick it when the draft lost it.
                match deps.sessions.form_draft(ctx.chat_id).await.category {
                    Some(c) => Menu::SubcategoryMenu { category: Some(c) },
                    None => Menu::CategoryMenu,
                }
            }
            Menu::OpConfirmOptions { order_id: None } => {
                match deps.sessions.form_draft(ctx.chat_id).await.order_id {
                    Some(id) => Menu::OpConfirmOptions { order_id: Some(id) },
                    None => Menu::Main,
                }
            }
            Menu::OpCostInput { order_id: None } => {
                match deps.sessions.form_draft(ctx.chat_id).await.order_id {
                    Some(id) => Menu::OpCostInput { order_id: Some(id) },
                    None => Menu::Main,
                }
            }
            Menu::OpAssignExec { order_id: None } => {
                match deps.sessions.form_draft(ctx.chat_id).await.order_id {
                    Some(id) => Menu::OpAssignExec { order_id: Some(id) },
                    None => Menu::Main,
                }
            }
            other => other,
        };

        let id = features::render_into(deps, ctx, &menu).await?;
        Ok(Some(id))
    }

    /// Resume after a declined cancel prompt: find the last meaningful step,
    /// make it current and re-render it into the message id carried by the
    /// payload. The confirmation dialog itself gets deleted by the exit
    /// reconciliation once the step message becomes active again.
    async fn handle_resume(
        &self,
        ctx: &CallbackCtx,
        step_message: MessageId,
    ) -> Result<Option<MessageId>> {
        let deps = &self.deps;

        // Reclaim the last meaningful step: it leaves history and becomes
        // current again, exactly as if the cancel prompt never happened.
        let resumed = deps
            .sessions
            .with(ctx.chat_id, |s| {
                let idx = s.history.iter().rposition(|h| steps::is_meaningful(h))?;
                let step = s.history.remove(idx);
                s.history.truncate(idx);
                s.current_step = step.clone();
                Some(step)
            })
            .await;
        let Some(step) = resumed else {
            // Nothing to resume; restart the settlement flow if that is
            // where the user was, otherwise go home.
            let settlement = deps
                .sessions
                .with(ctx.chat_id, |s| steps::is_settlement_step(&s.current_step))
                .await;
            let menu = if settlement { Menu::SettleMenu } else { Menu::Main };
            let id = features::render_into(deps, ctx, &menu).await?;
            return Ok(Some(id));
        };

        deps.sessions
            .with(ctx.chat_id, |s| {
                if steps::is_settlement_step(&step) {
                    s.settlement_draft.active_message_id = Some(step_message);
                } else {
                    s.form_draft.active_message_id = Some(step_message);
                    if !s.media_message_ids.contains(&step_message) {
                        s.media_message_ids.push(step_message);
                    }
                }
            })
            .await;

        let mut menu = navigation::menu_for_step(&step).unwrap_or(Menu::Main);
        if let Menu::SubcategoryMenu { category } = &mut menu {
            *category = deps.sessions.form_draft(ctx.chat_id).await.category;
        }

        let id = deps
            .screens
            .render(ctx.chat_id, Some(step_message), &ctx.user, &menu)
            .await?;
        Ok(Some(id))
    }

    async fn reply_decode_error(&self, ctx: &CallbackCtx, err: Error) -> Result<()> {
        let deps = &self.deps;
        match err {
            Error::UnknownCommand(id) => {
                // A resolver/table gap: log loudly for diagnosis.
                tracing::warn!(chat = ctx.chat_id.0, identifier = %id, "unknown command");
                deps.screens
                    .render(ctx.chat_id, Some(ctx.origin), &ctx.user, &Menu::UnknownCommand)
                    .await?;
            }
            Error::InvalidParameter { identifier, reason, recover } => {
                tracing::warn!(
                    chat = ctx.chat_id.0,
                    identifier = %identifier,
                    reason = %reason,
                    "parameter error"
                );
                // Tell the user, then put the menu they were using back.
                let notice = deps
                    .screens
                    .render(
                        ctx.chat_id,
                        None,
                        &ctx.user,
                        &Menu::ErrorNotice { text: "Invalid request, please retry.".to_string() },
                    )
                    .await?;
                deps.sessions
                    .with(ctx.chat_id, |s| s.ephemeral_message_ids.push(notice))
                    .await;
                deps.screens
                    .render(ctx.chat_id, Some(ctx.origin), &ctx.user, &recover)
                    .await?;
            }
            other => return Err(other),
        }
        Ok(())
    }

    async fn reply_dispatch_error(
        &self,
        ctx: &CallbackCtx,
        raw: &RawCommand,
        err: Error,
    ) -> Result<()> {
        tracing::error!(
            chat = ctx.chat_id.0,
            identifier = %raw.identifier,
            error = %err,
            "handler failed"
        );
        // Keep the active-message pointer where it was: edit the origin in
        // place so the user is not stranded on a dangling reference.
        self.deps
            .screens
            .render(
                ctx.chat_id,
                Some(ctx.origin),
                &ctx.user,
                &Menu::ErrorNotice { text: "Something went wrong, please retry.".to_string() },
            )
            .await?;
        Ok(())
    }

    async fn lookup(&self, chat_id: ChatId) -> Result<Option<UserRecord>> {
        self.deps.directory.lookup_user(chat_id).await
    }

    async fn ack(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self
            .deps
            .messenger
            .answer_callback_query(callback_id, text)
            .await
        {
            tracing::warn!(callback_id, error = %e, "callback ack failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use crate::domain::MessageRef;
    use crate::messaging::types::{InlineKeyboard, MessagingCapabilities};
    use crate::ports::{
        OrderRecord, OrderStatus, Orders, ScreenPort, SettlementRecord, SettlementStatus,
        Settlements,
    };

    const CHAT: ChatId = ChatId(1);
    const ORIGIN: MessageId = MessageId(10);

    #[derive(Default)]
    struct FakeMessenger {
        next_id: StdMutex<i32>,
        deletes: StdMutex<Vec<i32>>,
        acks: StdMutex<Vec<(String, Option<String>)>>,
        sends: StdMutex<Vec<String>>,
    }

    impl FakeMessenger {
        fn alloc(&self, chat_id: ChatId) -> MessageRef {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            MessageRef { chat_id, message_id: MessageId(500 + *next) }
        }

        fn deleted(&self) -> Vec<i32> {
            self.deletes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl crate::messaging::port::MessagingPort for FakeMessenger {
        fn capabilities(&self) -> MessagingCapabilities {
            MessagingCapabilities {
                supports_html: true,
                supports_edit: true,
                supports_inline_keyboards: true,
                max_message_len: 4096,
            }
        }

        async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
            self.sends.lock().unwrap().push(html.to_string());
            Ok(self.alloc(chat_id))
        }

        async fn edit_html(&self, _msg: MessageRef, _html: &str) -> Result<()> {
            Ok(())
        }

        async fn delete_message(&self, msg: MessageRef) -> Result<()> {
            self.deletes.lock().unwrap().push(msg.message_id.0);
            Ok(())
        }

        async fn send_keyboard(
            &self,
            chat_id: ChatId,
            html: &str,
            _keyboard: InlineKeyboard,
        ) -> Result<MessageRef> {
            self.sends.lock().unwrap().push(html.to_string());
            Ok(self.alloc(chat_id))
        }

        async fn edit_keyboard(
            &self,
            _msg: MessageRef,
            _html: &str,
            _keyboard: InlineKeyboard,
        ) -> Result<()> {
            Ok(())
        }

        async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
            self.acks
                .lock()
                .unwrap()
                .push((callback_id.to_string(), text.map(str::to_string)));
            Ok(())
        }
    }

    /// Screen fake. With `fresh_ids` it behaves like a renderer that always
    /// sends a new message; otherwise it edits in place.
    struct FakeScreens {
        fresh_ids: bool,
        next_id: StdMutex<i32>,
        calls: StdMutex<Vec<(Option<i32>, Menu)>>,
    }

    impl FakeScreens {
        fn new(fresh_ids: bool) -> Self {
            Self { fresh_ids, next_id: StdMutex::new(1000), calls: StdMutex::new(Vec::new()) }
        }

        fn rendered(&self) -> Vec<Menu> {
            self.calls.lock().unwrap().iter().map(|(_, m)| m.clone()).collect()
        }

        fn last_rendered(&self) -> Option<Menu> {
            self.rendered().last().cloned()
        }
    }

    #[async_trait]
    impl ScreenPort for FakeScreens {
        async fn render(
            &self,
            _chat_id: ChatId,
            edit: Option<MessageId>,
            _user: &UserRecord,
            menu: &Menu,
        ) -> Result<MessageId> {
            self.calls.lock().unwrap().push((edit.map(|m| m.0), menu.clone()));
            match edit {
                Some(id) if !self.fresh_ids => Ok(id),
                _ => {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    Ok(MessageId(*next))
                }
            }
        }
    }

    struct FakeDirectory {
        users: StdMutex<HashMap<i64, UserRecord>>,
    }

    impl FakeDirectory {
        fn with_user(user: UserRecord) -> Self {
            let mut users = HashMap::new();
            users.insert(user.chat_id.0, user);
            Self { users: StdMutex::new(users) }
        }
    }

    #[async_trait]
    impl Directory for FakeDirectory {
        async fn lookup_user(&self, chat_id: ChatId) -> Result<Option<UserRecord>> {
            Ok(self.users.lock().unwrap().get(&chat_id.0).cloned())
        }

        async fn set_role(&self, chat_id: ChatId, role: Role) -> Result<()> {
            if let Some(u) = self.users.lock().unwrap().get_mut(&chat_id.0) {
                u.role = role;
            }
            Ok(())
        }

        async fn set_blocked(
            &self,
            chat_id: ChatId,
            blocked: bool,
            _reason: Option<&str>,
        ) -> Result<()> {
            if let Some(u) = self.users.lock().unwrap().get_mut(&chat_id.0) {
                u.blocked = blocked;
            }
            Ok(())
        }

        async fn remove(&self, chat_id: ChatId) -> Result<()> {
            self.users.lock().unwrap().remove(&chat_id.0);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeOrders {
        orders: StdMutex<HashMap<i64, OrderRecord>>,
        next_id: StdMutex<i64>,
    }

    #[async_trait]
    impl Orders for FakeOrders {
        async fn create_draft(&self, _draft: &crate::drafts::FormDraft) -> Result<i64> {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let id = *next;
            self.orders.lock().unwrap().insert(
                id,
                OrderRecord {
                    id,
                    client_chat_id: CHAT.0,
                    status: OrderStatus::Draft,
                    cost: None,
                    executors: Vec::new(),
                },
            );
            Ok(id)
        }

        async fn find(&self, order_id: i64) -> Result<Option<OrderRecord>> {
            Ok(self.orders.lock().unwrap().get(&order_id).cloned())
        }

        async fn set_status(&self, order_id: i64, status: OrderStatus) -> Result<()> {
            if let Some(o) = self.orders.lock().unwrap().get_mut(&order_id) {
                o.status = status;
            }
            Ok(())
        }

        async fn assign_executor(&self, order_id: i64, executor: i64) -> Result<()> {
            if let Some(o) = self.orders.lock().unwrap().get_mut(&order_id) {
                o.executors.push(executor);
            }
            Ok(())
        }

        async fn unassign_executor(&self, order_id: i64, executor: i64) -> Result<()> {
            if let Some(o) = self.orders.lock().unwrap().get_mut(&order_id) {
                o.executors.retain(|e| *e != executor);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSettlements {
        records: StdMutex<HashMap<i64, SettlementRecord>>,
        next_id: StdMutex<i64>,
    }

    impl FakeSettlements {
        fn count(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Settlements for FakeSettlements {
        async fn save(&self, mut record: SettlementRecord) -> Result<i64> {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            record.id = *next;
            self.records.lock().unwrap().insert(*next, record);
            Ok(*next)
        }

        async fn find(&self, settlement_id: i64) -> Result<Option<SettlementRecord>> {
            Ok(self.records.lock().unwrap().get(&settlement_id).cloned())
        }

        async fn set_status(&self, settlement_id: i64, status: SettlementStatus) -> Result<()> {
            if let Some(r) = self.records.lock().unwrap().get_mut(&settlement_id) {
                r.status = status;
            }
            Ok(())
        }

        async fn set_deposited(&self, settlement_id: i64, deposited: bool) -> Result<()> {
            if let Some(r) = self.records.lock().unwrap().get_mut(&settlement_id) {
                r.money_deposited = deposited;
            }
            Ok(())
        }

        async fn set_salary_paid(&self, settlement_id: i64, paid: bool) -> Result<()> {
            if let Some(r) = self.records.lock().unwrap().get_mut(&settlement_id) {
                r.salary_paid = paid;
            }
            Ok(())
        }

        async fn mark_all_salary_paid(&self, driver_chat_id: i64) -> Result<()> {
            for r in self.records.lock().unwrap().values_mut() {
                if r.driver_chat_id == driver_chat_id {
                    r.salary_paid = true;
                }
            }
            Ok(())
        }

        async fn mark_all_deposited(&self, driver_chat_id: i64) -> Result<()> {
            for r in self.records.lock().unwrap().values_mut() {
                if r.driver_chat_id == driver_chat_id {
                    r.money_deposited = true;
                }
            }
            Ok(())
        }
    }

    struct Fixture {
        engine: Engine,
        screens: Arc<FakeScreens>,
        messenger: Arc<FakeMessenger>,
        settlements: Arc<FakeSettlements>,
        sessions: Arc<SessionStore>,
    }

    fn fixture(role: Role) -> Fixture {
        fixture_with(role, false)
    }

    fn fixture_with(role: Role, fresh_ids: bool) -> Fixture {
        let screens = Arc::new(FakeScreens::new(fresh_ids));
        let messenger = Arc::new(FakeMessenger::default());
        let settlements = Arc::new(FakeSettlements::default());
        let sessions = Arc::new(SessionStore::new());
        let user = UserRecord {
            chat_id: CHAT,
            first_name: "Test".to_string(),
            role,
            blocked: false,
        };

        let deps = Deps {
            cfg: Arc::new(Config::default()),
            sessions: sessions.clone(),
            screens: screens.clone(),
            directory: Arc::new(FakeDirectory::with_user(user)),
            orders: Arc::new(FakeOrders::default()),
            settlements: settlements.clone(),
            messenger: messenger.clone(),
            policy: Policy::standard(),
        };

        Fixture { engine: Engine::new(deps), screens, messenger, settlements, sessions }
    }

    async fn press(fix: &Fixture, origin: MessageId, payload: &str) {
        fix.engine
            .handle_callback(CHAT, origin, "cb", payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn noop_never_mutates_or_deletes() {
        let fix = fixture(Role::User);
        fix.sessions.set_state(CHAT, steps::ORDER_DATE).await;
        let before_history = fix.sessions.history(CHAT).await;

        press(&fix, ORIGIN, "noop").await;

        assert_eq!(fix.sessions.state(CHAT).await, steps::ORDER_DATE);
        assert_eq!(fix.sessions.history(CHAT).await, before_history);
        assert!(fix.messenger.deleted().is_empty());
        assert!(fix.screens.rendered().is_empty());
    }

    #[tokio::test]
    async fn lowest_tier_gets_access_denied_for_staff_menu() {
        let fix = fixture(Role::User);

        press(&fix, ORIGIN, "staff_menu").await;

        assert_eq!(fix.screens.last_rendered(), Some(Menu::AccessDenied));
        assert!(!fix.screens.rendered().contains(&Menu::StaffMenu));
    }

    #[tokio::test]
    async fn senior_operator_reaches_staff_menu() {
        let fix = fixture(Role::SeniorOperator);

        press(&fix, ORIGIN, "staff_menu").await;

        assert_eq!(fix.screens.last_rendered(), Some(Menu::StaffMenu));
        assert!(fix.messenger.deleted().is_empty());
    }

    #[tokio::test]
    async fn back_round_trip_restores_previous_renderer() {
        let fix = fixture(Role::User);

        press(&fix, ORIGIN, "op_create_new_order").await;
        press(&fix, ORIGIN, "category_waste").await;
        assert_eq!(fix.sessions.state(CHAT).await, steps::ORDER_SUBCATEGORY);
        assert_eq!(fix.sessions.history(CHAT).await, vec![steps::ORDER_CATEGORY]);

        press(&fix, ORIGIN, "back_to_category").await;

        assert_eq!(fix.screens.last_rendered(), Some(Menu::CategoryMenu));
        assert_eq!(fix.sessions.state(CHAT).await, steps::ORDER_CATEGORY);
        assert!(fix.sessions.history(CHAT).await.is_empty());
    }

    #[tokio::test]
    async fn back_to_subcategory_recovers_category_from_draft() {
        let fix = fixture(Role::User);

        press(&fix, ORIGIN, "op_create_new_order").await;
        press(&fix, ORIGIN, "category_demolition").await;
        press(&fix, ORIGIN, "subcategory_walls").await;

        press(&fix, ORIGIN, "back_to_subcategory").await;

        assert_eq!(
            fix.screens.last_rendered(),
            Some(Menu::SubcategoryMenu { category: Some("demolition".to_string()) })
        );
    }

    #[tokio::test]
    async fn single_live_message_across_interactions() {
        let fix = fixture_with(Role::SeniorOperator, true);

        press(&fix, MessageId(10), "staff_menu").await;
        // The renderer sent a fresh message; the pressed menu is gone.
        assert_eq!(fix.messenger.deleted(), vec![10]);

        press(&fix, MessageId(1001), "staff_list_menu").await;
        assert_eq!(fix.messenger.deleted(), vec![10, 1001]);
    }

    #[tokio::test]
    async fn repeat_deletes_are_suppressed() {
        let fix = fixture_with(Role::SeniorOperator, true);

        press(&fix, MessageId(10), "staff_menu").await;
        press(&fix, MessageId(10), "staff_menu").await;

        // Second interaction resolves the same superseded id; only one
        // delete call goes out.
        assert_eq!(fix.messenger.deleted(), vec![10]);
    }

    #[tokio::test]
    async fn malformed_numeric_param_recovers_the_menu() {
        let fix = fixture(Role::SeniorOperator);

        press(&fix, ORIGIN, "staff_info_notanumber").await;

        let rendered = fix.screens.rendered();
        assert!(rendered.iter().any(|m| matches!(m, Menu::ErrorNotice { .. })));
        assert_eq!(rendered.last(), Some(&Menu::StaffMenu));
        // The notice is ephemeral: swept on the next interaction.
        let ephemerals = fix
            .sessions
            .with(CHAT, |s| s.ephemeral_message_ids.clone())
            .await;
        assert_eq!(ephemerals.len(), 1);
    }

    #[tokio::test]
    async fn unknown_command_gets_generic_reply() {
        let fix = fixture(Role::User);

        press(&fix, ORIGIN, "frobnicate_1_2").await;

        assert_eq!(fix.screens.last_rendered(), Some(Menu::UnknownCommand));
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_with_invalid_request() {
        let fix = fixture(Role::User);

        press(&fix, ORIGIN, "").await;

        assert_eq!(fix.screens.last_rendered(), Some(Menu::InvalidRequest));
    }

    #[tokio::test]
    async fn blocked_account_gets_notice_only() {
        let fix = fixture(Role::User);
        fix.engine.deps().directory.set_blocked(CHAT, true, None).await.unwrap();

        press(&fix, ORIGIN, "manage_orders").await;

        assert!(matches!(
            fix.screens.last_rendered(),
            Some(Menu::ErrorNotice { .. })
        ));
        assert!(!fix.screens.rendered().contains(&Menu::ManageOrders));
    }

    #[tokio::test]
    async fn declined_cancel_resumes_the_interrupted_step() {
        let fix = fixture(Role::User);

        press(&fix, ORIGIN, "op_create_new_order").await;
        press(&fix, ORIGIN, "category_waste").await;
        press(&fix, ORIGIN, "back_to_main_confirm_cancel_order").await;
        assert_eq!(fix.sessions.state(CHAT).await, steps::CONFIRM_CANCEL_ORDER);

        press(&fix, MessageId(77), "resume_order_creation_10").await;

        assert_eq!(fix.sessions.state(CHAT).await, steps::ORDER_SUBCATEGORY);
        assert_eq!(
            fix.screens.last_rendered(),
            Some(Menu::SubcategoryMenu { category: Some("waste".to_string()) })
        );
        // The dialog message is superseded by the restored step message.
        assert!(fix.messenger.deleted().contains(&77));
    }

    #[tokio::test]
    async fn operator_cancel_skips_confirmation() {
        let fix = fixture(Role::Operator);

        press(&fix, ORIGIN, "op_create_new_order").await;
        press(&fix, ORIGIN, "back_to_main_confirm_cancel_order").await;

        assert_eq!(fix.screens.last_rendered(), Some(Menu::Main));
        assert_eq!(fix.sessions.state(CHAT).await, steps::IDLE);
    }

    #[tokio::test]
    async fn confirmed_cancel_clears_everything() {
        let fix = fixture(Role::User);

        press(&fix, ORIGIN, "op_create_new_order").await;
        press(&fix, ORIGIN, "category_waste").await;
        fix.sessions
            .update_settlement_draft(CHAT, |d| d.fuel_expense = 5.0)
            .await;

        press(&fix, ORIGIN, "back_to_main_confirmed_cancel_final").await;

        assert_eq!(fix.sessions.state(CHAT).await, steps::IDLE);
        assert!(fix.sessions.history(CHAT).await.is_empty());
        assert!(fix.sessions.form_draft(CHAT).await.category.is_none());
        assert_eq!(fix.sessions.settlement_draft(CHAT).await.fuel_expense, 0.0);
        assert_eq!(fix.screens.last_rendered(), Some(Menu::Main));
    }

    #[tokio::test]
    async fn export_generation_keeps_the_menu_alive() {
        let fix = fixture(Role::Owner);

        press(&fix, ORIGIN, "excel_generate_orders").await;

        assert!(fix.messenger.deleted().is_empty());
        assert!(fix
            .screens
            .rendered()
            .iter()
            .any(|m| matches!(m, Menu::ExcelQueued { .. })));
    }

    #[tokio::test]
    async fn stats_custom_day_renders_single_day_period() {
        let fix = fixture(Role::Owner);

        press(&fix, ORIGIN, "stats_select_day_custom_date_2025_6_15").await;

        assert_eq!(
            fix.screens.last_rendered(),
            Some(Menu::StatsResult { label: "2025-06-15".to_string() })
        );
    }

    #[tokio::test]
    async fn driver_saves_settlement_with_recomputed_totals() {
        let fix = fixture(Role::Driver);

        press(&fix, ORIGIN, "settle_start").await;
        fix.sessions
            .update_settlement_draft(CHAT, |d| {
                d.covered_orders_revenue = 10_000.0;
                d.fuel_expense = 1_000.0;
                d.loader_payments.push(crate::drafts::LoaderPayment {
                    loader: "petya".to_string(),
                    amount: 2_000.0,
                });
            })
            .await;

        press(&fix, ORIGIN, "settle_save").await;

        assert_eq!(fix.settlements.count(), 1);
        let record = fix.settlements.find(1).await.unwrap().unwrap();
        let net = 10_000.0 - 1_000.0 - 2_000.0;
        assert!((record.driver_salary - net * 0.35).abs() < 1e-9);
        assert!((record.amount_to_cashier - net * 0.65).abs() < 1e-9);
        assert_eq!(record.status, SettlementStatus::Pending);
        assert_eq!(fix.sessions.state(CHAT).await, steps::IDLE);
    }

    #[tokio::test]
    async fn settlement_flow_is_denied_to_loaders() {
        let fix = fixture(Role::Loader);

        press(&fix, ORIGIN, "settle_start").await;

        assert_eq!(fix.screens.last_rendered(), Some(Menu::AccessDenied));
    }

    #[tokio::test]
    async fn ephemeral_messages_are_swept_on_next_interaction() {
        let fix = fixture(Role::User);
        fix.sessions
            .with(CHAT, |s| {
                s.ephemeral_message_ids.push(MessageId(300));
                s.ephemeral_message_ids.push(MessageId(301));
            })
            .await;

        press(&fix, ORIGIN, "manage_orders").await;

        let deleted = fix.messenger.deleted();
        assert!(deleted.contains(&300) && deleted.contains(&301));
        let left = fix
            .sessions
            .with(CHAT, |s| s.ephemeral_message_ids.clone())
            .await;
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn stale_form_media_is_reconciled_on_entry() {
        let fix = fixture(Role::User);
        fix.sessions.set_state(CHAT, steps::ORDER_PHOTO).await;
        fix.sessions
            .with(CHAT, |s| {
                s.form_draft.active_message_id = Some(ORIGIN);
                s.media_message_ids = vec![MessageId(70), ORIGIN, MessageId(71)];
            })
            .await;

        press(&fix, ORIGIN, "view_uploaded_media").await;

        let deleted = fix.messenger.deleted();
        assert!(deleted.contains(&70) && deleted.contains(&71));
        let media = fix.sessions.with(CHAT, |s| s.media_message_ids.clone()).await;
        assert_eq!(media, vec![ORIGIN]);
    }
}

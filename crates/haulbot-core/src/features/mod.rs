//! Feature flows invoked by the dispatch router.
//!
//! Each flow mutates the chat's session/drafts and asks the screen port for
//! the next menu; pricing, rendering content and persistence internals stay
//! behind the ports.

use crate::{
    domain::MessageId,
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    Result,
};

pub mod info;
pub mod manage;
pub mod orders;
pub mod salary;
pub mod settlement;
pub mod staff;
pub mod stats;

/// Render a menu into the origin message and record it as the flow's active
/// menu message.
pub async fn render_into(deps: &Deps, ctx: &CallbackCtx, menu: &Menu) -> Result<MessageId> {
    let id = deps
        .screens
        .render(ctx.chat_id, Some(ctx.origin), &ctx.user, menu)
        .await?;
    deps.sessions
        .with(ctx.chat_id, |s| s.set_active_message_id(id))
        .await;
    Ok(id)
}

/// Transition to `step`, then render its menu.
pub async fn advance(
    deps: &Deps,
    ctx: &CallbackCtx,
    step: &str,
    menu: &Menu,
) -> Result<Option<MessageId>> {
    deps.sessions.set_state(ctx.chat_id, step).await;
    let id = render_into(deps, ctx, menu).await?;
    Ok(Some(id))
}

/// Replace the menu with a contextual error notice.
pub async fn notice(deps: &Deps, ctx: &CallbackCtx, text: &str) -> Result<Option<MessageId>> {
    let menu = Menu::ErrorNotice { text: text.to_string() };
    let id = render_into(deps, ctx, &menu).await?;
    Ok(Some(id))
}

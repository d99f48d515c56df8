//! Info and communications: referrals, contact options, chat history.

use crate::{
    command::InfoCommand,
    domain::MessageId,
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    steps,
    Result,
};

use super::{advance, render_into};

pub async fn handle(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: InfoCommand,
) -> Result<Option<MessageId>> {
    use InfoCommand::*;

    let menu = match cmd {
        InviteFriend => Menu::InviteFriend,
        ContactOperator => {
            return advance(deps, ctx, steps::CONTACT_METHOD, &Menu::ContactOperator).await;
        }
        ContactChat => {
            return advance(deps, ctx, steps::CHAT_MESSAGE_INPUT, &Menu::ContactChat).await;
        }
        ContactPhoneOptions => Menu::ContactPhoneOptions,
        RequestCall => {
            tracing::info!(chat = ctx.chat_id.0, "call-back requested");
            Menu::ContactPhoneOptions
        }
        CallSelf => Menu::ContactPhoneOptions,
        ReferralLink => Menu::ReferralLink,
        ReferralQr => Menu::ReferralQr,
        ReferralMy => Menu::ReferralMy,
        ReferralDetails { referral_id } => Menu::ReferralDetails { referral_id },
        RequestReferralPayout => {
            tracing::info!(chat = ctx.chat_id.0, "referral payout requested");
            Menu::ReferralMy
        }
        ViewChatHistory { chat_id } => Menu::ChatHistory { chat_id },
    };

    let id = render_into(deps, ctx, &menu).await?;
    Ok(Some(id))
}

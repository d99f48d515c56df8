//! Staff administration and user blocking.

use std::sync::OnceLock;

use regex::Regex;

use crate::{
    command::{BlockCommand, StaffCommand, StaffField},
    domain::{ChatId, MessageId, Role},
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    steps,
    Result,
};

use super::{advance, notice, render_into};

impl StaffField {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffField::Name => "name",
            StaffField::Surname => "surname",
            StaffField::Nickname => "nickname",
            StaffField::Phone => "phone",
            StaffField::CardNumber => "card_number",
            StaffField::Role => "role",
        }
    }
}

pub fn parse_role(s: &str) -> Option<Role> {
    match s {
        "user" => Some(Role::User),
        "loader" => Some(Role::Loader),
        "driver" => Some(Role::Driver),
        "operator" => Some(Role::Operator),
        "senior" | "senior_operator" => Some(Role::SeniorOperator),
        "owner" => Some(Role::Owner),
        _ => None,
    }
}

/// 16-19 digits, spaces allowed. The deeper Luhn check stays with the
/// payment collaborator.
pub fn is_valid_card_number(card: &str) -> bool {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let digits = DIGITS.get_or_init(|| Regex::new(r"^[0-9]{16,19}$").expect("static regex"));
    digits.is_match(&card.replace(' ', ""))
}

pub async fn handle(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: StaffCommand,
) -> Result<Option<MessageId>> {
    use StaffCommand::*;

    match cmd {
        StaffCommand::Menu => {
            let id = render_into(deps, ctx, &Menu::StaffMenu).await?;
            Ok(Some(id))
        }
        ListMenu => {
            let id = render_into(deps, ctx, &Menu::StaffListMenu).await?;
            Ok(Some(id))
        }
        ListByRole { role, page } => {
            if parse_role(&role).is_none() {
                return notice(deps, ctx, "Unknown role.").await;
            }
            let id = render_into(deps, ctx, &Menu::StaffListByRole { role, page }).await?;
            Ok(Some(id))
        }
        Info { chat_id } => staff_info(deps, ctx, chat_id).await,
        AddPromptName => {
            deps.sessions.clear_form_draft(ctx.chat_id).await;
            advance(
                deps,
                ctx,
                steps::STAFF_ADD_NAME,
                &Menu::StaffAddPrompt { step: steps::STAFF_ADD_NAME.to_string() },
            )
            .await
        }
        AddPromptCardNumber => {
            advance(
                deps,
                ctx,
                steps::STAFF_ADD_CARD_NUMBER,
                &Menu::StaffAddPrompt { step: steps::STAFF_ADD_CARD_NUMBER.to_string() },
            )
            .await
        }
        AddRoleFinal { role } => {
            let Some(role) = parse_role(&role) else {
                return notice(deps, ctx, "Unknown role.").await;
            };
            let draft = deps.sessions.form_draft(ctx.chat_id).await;
            if let Some(target) = draft.staff_target {
                deps.directory.set_role(ChatId(target), role).await?;
            }
            deps.sessions.clear_form_draft(ctx.chat_id).await;
            deps.sessions.clear_state(ctx.chat_id).await;
            let id = render_into(deps, ctx, &Menu::StaffMenu).await?;
            Ok(Some(id))
        }
        EditMenu { chat_id } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.staff_target = Some(chat_id))
                .await;
            let id = render_into(deps, ctx, &Menu::StaffEditMenu { chat_id }).await?;
            Ok(Some(id))
        }
        EditField { field, chat_id } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| {
                    d.staff_target = Some(chat_id);
                    d.editing_field = Some(field.as_str().to_string());
                })
                .await;
            advance(
                deps,
                ctx,
                steps::STAFF_EDIT_FIELD,
                &Menu::StaffAddPrompt { step: format!("staff_edit_{}", field.as_str()) },
            )
            .await
        }
        EditRoleFinal { role, chat_id } => {
            let Some(role) = parse_role(&role) else {
                return notice(deps, ctx, "Unknown role.").await;
            };
            deps.directory.set_role(ChatId(chat_id), role).await?;
            staff_info(deps, ctx, chat_id).await
        }
        BlockReasonPrompt { chat_id } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.staff_target = Some(chat_id))
                .await;
            advance(
                deps,
                ctx,
                steps::STAFF_BLOCK_REASON,
                &Menu::StaffAddPrompt { step: steps::STAFF_BLOCK_REASON.to_string() },
            )
            .await
        }
        UnblockConfirm { chat_id } => {
            deps.directory.set_blocked(ChatId(chat_id), false, None).await?;
            staff_info(deps, ctx, chat_id).await
        }
        DeleteConfirm { chat_id } => {
            deps.directory.remove(ChatId(chat_id)).await?;
            let id = render_into(deps, ctx, &Menu::StaffListMenu).await?;
            Ok(Some(id))
        }
    }
}

async fn staff_info(deps: &Deps, ctx: &CallbackCtx, chat_id: i64) -> Result<Option<MessageId>> {
    match deps.directory.lookup_user(ChatId(chat_id)).await? {
        Some(_) => {
            let id = render_into(deps, ctx, &Menu::StaffInfo { chat_id }).await?;
            Ok(Some(id))
        }
        None => notice(deps, ctx, "Employee not found.").await,
    }
}

pub async fn handle_block(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: BlockCommand,
) -> Result<Option<MessageId>> {
    use BlockCommand::*;

    match cmd {
        BlockCommand::Menu => {
            let id = render_into(deps, ctx, &Menu::BlockUserMenu).await?;
            Ok(Some(id))
        }
        ListForBlocking => {
            let id = render_into(deps, ctx, &Menu::BlockUserList).await?;
            Ok(Some(id))
        }
        ListForUnblocking => {
            let id = render_into(deps, ctx, &Menu::UnblockUserList).await?;
            Ok(Some(id))
        }
        Info { chat_id } => {
            let id = render_into(deps, ctx, &Menu::BlockUserInfo { chat_id }).await?;
            Ok(Some(id))
        }
        ReasonPrompt { chat_id } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.staff_target = Some(chat_id))
                .await;
            advance(
                deps,
                ctx,
                steps::BLOCK_REASON,
                &Menu::StaffAddPrompt { step: steps::BLOCK_REASON.to_string() },
            )
            .await
        }
        BlockFinal { chat_id } => {
            let reason = deps.sessions.form_draft(ctx.chat_id).await.pending_text;
            deps.directory
                .set_blocked(ChatId(chat_id), true, reason.as_deref())
                .await?;
            deps.sessions.clear_form_draft(ctx.chat_id).await;
            let id = render_into(deps, ctx, &Menu::BlockUserMenu).await?;
            Ok(Some(id))
        }
        UnblockInfo { chat_id } => {
            let id = render_into(deps, ctx, &Menu::UnblockUserInfo { chat_id }).await?;
            Ok(Some(id))
        }
        UnblockFinal { chat_id } => {
            deps.directory.set_blocked(ChatId(chat_id), false, None).await?;
            let id = render_into(deps, ctx, &Menu::BlockUserMenu).await?;
            Ok(Some(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_numbers_are_16_to_19_digits() {
        assert!(is_valid_card_number("1234567812345678"));
        assert!(is_valid_card_number("1234 5678 1234 5678"));
        assert!(is_valid_card_number("1234567812345678901"));
        assert!(!is_valid_card_number("123456781234567"));
        assert!(!is_valid_card_number("12345678123456789012"));
        assert!(!is_valid_card_number("1234abcd12345678"));
    }

    #[test]
    fn role_slugs_round_trip() {
        assert_eq!(parse_role("driver"), Some(Role::Driver));
        assert_eq!(parse_role("senior_operator"), Some(Role::SeniorOperator));
        assert_eq!(parse_role("janitor"), None);
    }
}

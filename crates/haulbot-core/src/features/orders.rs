//! Order creation flow: the classic category → … → confirm chain, the
//! field-level edit menu, and the operator/driver creation variants.

use chrono::Days;

use crate::{
    command::{OrderCommand, OrderField},
    domain::MessageId,
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    ports::OrderStatus,
    steps,
    Result,
};

use super::{advance, notice, render_into};

impl OrderField {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderField::Description => "description",
            OrderField::Name => "name",
            OrderField::Subcategory => "subcategory",
            OrderField::Date => "date",
            OrderField::Time => "time",
            OrderField::Phone => "phone",
            OrderField::Address => "address",
            OrderField::Media => "media",
            OrderField::Payment => "payment",
        }
    }
}

pub async fn handle(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: OrderCommand,
) -> Result<Option<MessageId>> {
    use OrderCommand::*;

    match cmd {
        StartByOperator | StartByDriver => {
            deps.sessions.clear_state(ctx.chat_id).await;
            advance(deps, ctx, steps::ORDER_CATEGORY, &Menu::CategoryMenu).await
        }
        Category(category) => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| {
                    d.category = Some(category.as_str().to_string());
                    d.subcategory = None;
                })
                .await;
            let menu = Menu::SubcategoryMenu { category: Some(category.as_str().to_string()) };
            advance(deps, ctx, steps::ORDER_SUBCATEGORY, &menu).await
        }
        Subcategory(slug) => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.subcategory = Some(slug))
                .await;
            advance(deps, ctx, steps::ORDER_DESCRIPTION, &Menu::DescriptionInput).await
        }
        ConfirmDescription | SkipDescription => {
            advance(deps, ctx, steps::ORDER_NAME, &Menu::NameInput).await
        }
        UseProfileName => {
            let name = ctx.user.first_name.clone();
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.contact_name = Some(name))
                .await;
            advance(deps, ctx, steps::ORDER_DATE, &Menu::DateSelection { page: 0 }).await
        }
        EnterAnotherName => advance(deps, ctx, steps::ORDER_NAME, &Menu::NameInput).await,
        ConfirmName => advance(deps, ctx, steps::ORDER_DATE, &Menu::DateSelection { page: 0 }).await,
        SelectDateAsap => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.date = Some("asap".to_string()))
                .await;
            advance(deps, ctx, steps::ORDER_TIME, &Menu::TimeSelection).await
        }
        SelectDate { day_offset } => {
            let date = chrono::Utc::now()
                .date_naive()
                .checked_add_days(Days::new(day_offset as u64));
            let Some(date) = date else {
                return notice(deps, ctx, "That date is out of range.").await;
            };
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.date = Some(date.to_string()))
                .await;
            advance(deps, ctx, steps::ORDER_TIME, &Menu::TimeSelection).await
        }
        DatePage { page } => {
            let id = render_into(deps, ctx, &Menu::DateSelection { page }).await?;
            Ok(Some(id))
        }
        SelectHour { hour } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.selected_hour = Some(hour))
                .await;
            advance(deps, ctx, steps::ORDER_MINUTE, &Menu::MinuteSelection { hour }).await
        }
        SelectTime { time } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| {
                    d.time = Some(time);
                    d.selected_hour = None;
                })
                .await;
            advance(deps, ctx, steps::ORDER_PHONE, &Menu::PhoneInput).await
        }
        ConfirmPhone => advance(deps, ctx, steps::ORDER_ADDRESS, &Menu::AddressInput).await,
        ChangePhone => advance(deps, ctx, steps::ORDER_PHONE, &Menu::PhoneInput).await,
        SkipPhotoInitial | FinishPhotoUpload => {
            advance(deps, ctx, steps::ORDER_PAYMENT, &Menu::PaymentSelection).await
        }
        ResetPhotoUpload => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.photo_file_ids.clear())
                .await;
            advance(deps, ctx, steps::ORDER_PHOTO, &Menu::PhotoInput).await
        }
        ViewUploadedMedia => {
            let id = render_into(deps, ctx, &Menu::PhotoInput).await?;
            Ok(Some(id))
        }
        PaymentNow => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.pay_on_completion = false)
                .await;
            advance(deps, ctx, steps::ORDER_CONFIRM, &Menu::OrderConfirm).await
        }
        PaymentLater => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.pay_on_completion = true)
                .await;
            advance(deps, ctx, steps::ORDER_CONFIRM, &Menu::OrderConfirm).await
        }
        ConfirmFinal { order_id } => {
            let id = ensure_order(deps, ctx, order_id).await?;
            deps.orders.set_status(id, OrderStatus::New).await?;
            deps.sessions.clear_state(ctx.chat_id).await;
            let id = render_into(deps, ctx, &Menu::Main).await?;
            Ok(Some(id))
        }
        EditMenu { order_id } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.order_id = Some(order_id))
                .await;
            advance(deps, ctx, steps::ORDER_EDIT, &Menu::OrderEditMenu).await
        }
        EditField { field, order_id } => edit_field(deps, ctx, field, order_id).await,
        AcceptCost { order_id } => {
            deps.orders.set_status(order_id, OrderStatus::InProgress).await?;
            let id = render_into(deps, ctx, &Menu::ViewOrder { order_id }).await?;
            Ok(Some(id))
        }
        RejectCost { order_id } => {
            deps.orders.set_status(order_id, OrderStatus::Canceled).await?;
            let id = render_into(deps, ctx, &Menu::ViewOrder { order_id }).await?;
            Ok(Some(id))
        }
        PayOrder { order_id } => {
            let id = render_into(deps, ctx, &Menu::ViewOrder { order_id }).await?;
            Ok(Some(id))
        }
        CancelByOperator { order_id } => {
            deps.orders.set_status(order_id, OrderStatus::Canceled).await?;
            let id = render_into(deps, ctx, &Menu::ManageOrders).await?;
            Ok(Some(id))
        }
        CancelConfirm { order_id } => {
            deps.orders.set_status(order_id, OrderStatus::Canceled).await?;
            deps.sessions.clear_state(ctx.chat_id).await;
            let id = render_into(deps, ctx, &Menu::Main).await?;
            Ok(Some(id))
        }
        OpConfirmSimple { order_id } => {
            let id = ensure_order(deps, ctx, order_id).await?;
            deps.orders.set_status(id, OrderStatus::New).await?;
            advance(
                deps,
                ctx,
                steps::OP_ORDER_CONFIRM_OPTIONS,
                &Menu::OpConfirmOptions { order_id: Some(id) },
            )
            .await
        }
        OpConfirmSetCost { order_id } => {
            let id = ensure_order(deps, ctx, order_id).await?;
            advance(
                deps,
                ctx,
                steps::OP_ORDER_COST_INPUT,
                &Menu::OpCostInput { order_id: Some(id) },
            )
            .await
        }
        OpConfirmAssignExec { order_id } | OpSkipCost { order_id } => {
            let id = ensure_order(deps, ctx, order_id).await?;
            advance(
                deps,
                ctx,
                steps::OP_ORDER_ASSIGN_EXEC,
                &Menu::OpAssignExec { order_id: Some(id) },
            )
            .await
        }
        OpSkipAssignExec { order_id } => {
            ensure_order(deps, ctx, order_id).await?;
            advance(deps, ctx, steps::OP_ORDER_FINAL_CONFIRM, &Menu::OrderConfirm).await
        }
        OpFinalize { order_id } => {
            let id = ensure_order(deps, ctx, order_id).await?;
            deps.orders.set_status(id, OrderStatus::New).await?;
            deps.sessions.clear_state(ctx.chat_id).await;
            let id = render_into(deps, ctx, &Menu::Main).await?;
            Ok(Some(id))
        }
    }
}

/// The draft's order id wins over the payload when both exist; a zero id in
/// the payload means "not created yet".
async fn ensure_order(deps: &Deps, ctx: &CallbackCtx, payload_id: i64) -> Result<i64> {
    let draft = deps.sessions.form_draft(ctx.chat_id).await;
    if let Some(id) = draft.order_id {
        return Ok(id);
    }
    if payload_id != 0 {
        deps.sessions
            .update_form_draft(ctx.chat_id, |d| d.order_id = Some(payload_id))
            .await;
        return Ok(payload_id);
    }
    let id = deps.orders.create_draft(&draft).await?;
    deps.sessions
        .update_form_draft(ctx.chat_id, |d| d.order_id = Some(id))
        .await;
    Ok(id)
}

async fn edit_field(
    deps: &Deps,
    ctx: &CallbackCtx,
    field: OrderField,
    order_id: i64,
) -> Result<Option<MessageId>> {
    deps.sessions
        .update_form_draft(ctx.chat_id, |d| {
            d.order_id = Some(order_id);
            d.editing_field = Some(field.as_str().to_string());
        })
        .await;

    let (step, menu) = match field {
        OrderField::Description => (steps::ORDER_DESCRIPTION, Menu::DescriptionInput),
        OrderField::Name => (steps::ORDER_NAME, Menu::NameInput),
        OrderField::Subcategory => {
            let category = deps.sessions.form_draft(ctx.chat_id).await.category;
            (steps::ORDER_SUBCATEGORY, Menu::SubcategoryMenu { category })
        }
        OrderField::Date => (steps::ORDER_DATE, Menu::DateSelection { page: 0 }),
        OrderField::Time => (steps::ORDER_TIME, Menu::TimeSelection),
        OrderField::Phone => (steps::ORDER_PHONE, Menu::PhoneInput),
        OrderField::Address => (steps::ORDER_ADDRESS, Menu::AddressInput),
        OrderField::Media => (steps::ORDER_PHOTO, Menu::PhotoInput),
        OrderField::Payment => (steps::ORDER_PAYMENT, Menu::PaymentSelection),
    };
    advance(deps, ctx, step, &menu).await
}

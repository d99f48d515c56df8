//! Order view/management for operators and clients: status lists, order
//! detail, cost and executor assignment, completion.

use crate::{
    command::{ManageCommand, OrderList},
    domain::MessageId,
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    ports::OrderStatus,
    steps,
    Result,
};

use super::{advance, notice, render_into};

impl OrderList {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderList::New => "new",
            OrderList::AwaitingConfirmation => "awaiting_confirmation",
            OrderList::InProgress => "in_progress",
            OrderList::Completed => "completed",
            OrderList::Canceled => "canceled",
        }
    }
}

pub async fn handle(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: ManageCommand,
) -> Result<Option<MessageId>> {
    use ManageCommand::*;

    match cmd {
        ManageCommand::Menu => {
            let id = render_into(deps, ctx, &Menu::ManageOrders).await?;
            Ok(Some(id))
        }
        ViewOrder { order_id } => view_order(deps, ctx, order_id).await,
        SetCost { order_id } | SetFinalCost { order_id } | EditCost { order_id } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.order_id = Some(order_id))
                .await;
            advance(
                deps,
                ctx,
                steps::COST_INPUT,
                &Menu::OpCostInput { order_id: Some(order_id) },
            )
            .await
        }
        AssignExecutors { order_id } | EditExecutors { order_id } => {
            let id = render_into(deps, ctx, &Menu::OpAssignExec { order_id: Some(order_id) })
                .await?;
            Ok(Some(id))
        }
        AssignDriver { order_id, executor } | AssignLoader { order_id, executor } => {
            deps.orders.assign_executor(order_id, executor).await?;
            let id = render_into(deps, ctx, &Menu::OpAssignExec { order_id: Some(order_id) })
                .await?;
            Ok(Some(id))
        }
        UnassignExecutor { order_id, executor } => {
            deps.orders.unassign_executor(order_id, executor).await?;
            let id = render_into(deps, ctx, &Menu::OpAssignExec { order_id: Some(order_id) })
                .await?;
            Ok(Some(id))
        }
        MyOrdersPage { page } => {
            let id = render_into(deps, ctx, &Menu::MyOrders { page }).await?;
            Ok(Some(id))
        }
        List { list, page } => {
            let menu = Menu::OperatorOrderList { list: list.as_str().to_string(), page };
            let id = render_into(deps, ctx, &menu).await?;
            Ok(Some(id))
        }
        MarkDone { order_id } => {
            deps.orders.set_status(order_id, OrderStatus::Completed).await?;
            view_order(deps, ctx, order_id).await
        }
        ResumeDraft { order_id } => {
            deps.sessions
                .update_form_draft(ctx.chat_id, |d| d.order_id = Some(order_id))
                .await;
            advance(deps, ctx, steps::ORDER_CONFIRM, &Menu::OrderConfirm).await
        }
        ExecutorNotified { order_id, executor } => {
            // Delivery receipt: acknowledge without touching the menu so the
            // notification stays on screen.
            tracing::debug!(order_id, executor, "executor confirmed notification");
            if let Err(e) = deps
                .messenger
                .answer_callback_query(&ctx.callback_id, Some("✅"))
                .await
            {
                tracing::warn!(error = %e, "receipt ack failed");
            }
            Ok(None)
        }
    }
}

async fn view_order(deps: &Deps, ctx: &CallbackCtx, order_id: i64) -> Result<Option<MessageId>> {
    match deps.orders.find(order_id).await? {
        Some(_) => {
            let id = render_into(deps, ctx, &Menu::ViewOrder { order_id }).await?;
            Ok(Some(id))
        }
        None => notice(deps, ctx, "Order not found.").await,
    }
}

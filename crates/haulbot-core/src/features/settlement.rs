//! Driver settlement composition and the owner's cash management.
//!
//! The driver builds a settlement (fuel, itemized other expenses, loader
//! payments) in the settlement draft; totals are recomputed on every change
//! with the configured driver share. The owner side walks saved settlements
//! and flips their paid/deposited flags.

use chrono::Utc;

use crate::{
    command::{OwnerCashCommand, SettleCommand, SettlementView},
    domain::MessageId,
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    ports::{SettlementRecord, SettlementStatus},
    steps,
    Result,
};

use super::{advance, notice, render_into};

pub async fn handle_driver(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: SettleCommand,
) -> Result<Option<MessageId>> {
    use SettleCommand::*;

    match cmd {
        Start => {
            deps.sessions.clear_settlement_draft(ctx.chat_id).await;
            advance(deps, ctx, steps::SETTLE_MENU, &Menu::SettleMenu).await
        }
        SettleCommand::Menu => advance(deps, ctx, steps::SETTLE_MENU, &Menu::SettleMenu).await,
        SetFuel => advance(deps, ctx, steps::SETTLE_INPUT_FUEL, &Menu::SettleFuelPrompt).await,
        ExpensesMenu => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| {
                    d.editing_expense = None;
                    d.pending_expense_description = None;
                })
                .await;
            advance(deps, ctx, steps::SETTLE_EXPENSES_MENU, &Menu::SettleExpensesMenu).await
        }
        AddExpense => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| d.editing_expense = None)
                .await;
            advance(
                deps,
                ctx,
                steps::SETTLE_INPUT_EXPENSE_DESCRIPTION,
                &Menu::SettleExpenseDescriptionPrompt,
            )
            .await
        }
        EditExpense { index } => {
            let valid = deps
                .sessions
                .with(ctx.chat_id, |s| {
                    index < s.settlement_draft.other_expenses.len()
                })
                .await;
            if !valid {
                return notice(deps, ctx, "That expense no longer exists.").await;
            }
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| d.editing_expense = Some(index))
                .await;
            advance(
                deps,
                ctx,
                steps::SETTLE_INPUT_EXPENSE_DESCRIPTION,
                &Menu::SettleExpenseDescriptionPrompt,
            )
            .await
        }
        DeleteExpenseAsk { index } => {
            deps.sessions
                .set_state(ctx.chat_id, steps::SETTLE_CONFIRM_DELETE_EXPENSE)
                .await;
            let id = render_into(deps, ctx, &Menu::SettleConfirmDeleteExpense { index }).await?;
            Ok(Some(id))
        }
        DeleteExpense { index } => {
            let share = deps.cfg.driver_share;
            let removed = deps
                .sessions
                .with(ctx.chat_id, |s| {
                    let d = &mut s.settlement_draft;
                    if index >= d.other_expenses.len() {
                        return false;
                    }
                    d.other_expenses.remove(index);
                    d.recalculate_totals(share);
                    true
                })
                .await;
            if !removed {
                return notice(deps, ctx, "That expense no longer exists.").await;
            }
            advance(deps, ctx, steps::SETTLE_EXPENSES_MENU, &Menu::SettleExpensesMenu).await
        }
        LoadersMenu => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| {
                    d.editing_loader = None;
                    d.pending_loader_name = None;
                })
                .await;
            advance(deps, ctx, steps::SETTLE_LOADERS_MENU, &Menu::SettleLoadersMenu).await
        }
        AddLoader => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| d.editing_loader = None)
                .await;
            advance(
                deps,
                ctx,
                steps::SETTLE_INPUT_LOADER_NAME,
                &Menu::SettleLoaderNamePrompt,
            )
            .await
        }
        EditLoader { index } => {
            let valid = deps
                .sessions
                .with(ctx.chat_id, |s| {
                    index < s.settlement_draft.loader_payments.len()
                })
                .await;
            if !valid {
                return notice(deps, ctx, "That loader entry no longer exists.").await;
            }
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| d.editing_loader = Some(index))
                .await;
            advance(
                deps,
                ctx,
                steps::SETTLE_EDIT_LOADER_SALARY,
                &Menu::SettleLoaderSalaryPrompt,
            )
            .await
        }
        DeleteLoaderAsk { index } => {
            deps.sessions
                .set_state(ctx.chat_id, steps::SETTLE_CONFIRM_DELETE_LOADER)
                .await;
            let id = render_into(deps, ctx, &Menu::SettleConfirmDeleteLoader { index }).await?;
            Ok(Some(id))
        }
        DeleteLoader { index } => {
            let share = deps.cfg.driver_share;
            let removed = deps
                .sessions
                .with(ctx.chat_id, |s| {
                    let d = &mut s.settlement_draft;
                    if index >= d.loader_payments.len() {
                        return false;
                    }
                    d.loader_payments.remove(index);
                    d.recalculate_totals(share);
                    true
                })
                .await;
            if !removed {
                return notice(deps, ctx, "That loader entry no longer exists.").await;
            }
            advance(deps, ctx, steps::SETTLE_LOADERS_MENU, &Menu::SettleLoadersMenu).await
        }
        Save => {
            let share = deps.cfg.driver_share;
            let record = deps
                .sessions
                .with(ctx.chat_id, |s| {
                    s.settlement_draft.recalculate_totals(share);
                    let d = &s.settlement_draft;
                    SettlementRecord {
                        id: d.editing_settlement_id.unwrap_or(0),
                        driver_chat_id: ctx.chat_id.0,
                        revenue: d.covered_orders_revenue,
                        fuel_expense: d.fuel_expense,
                        other_expenses: d.other_expenses.clone(),
                        loader_payments: d.loader_payments.clone(),
                        driver_salary: d.driver_salary,
                        amount_to_cashier: d.amount_to_cashier,
                        status: SettlementStatus::Pending,
                        money_deposited: false,
                        salary_paid: false,
                        created_at: Utc::now(),
                    }
                })
                .await;
            let settlement_id = deps.settlements.save(record).await?;
            tracing::info!(chat = ctx.chat_id.0, settlement_id, "settlement saved");

            deps.sessions.clear_state(ctx.chat_id).await;
            let id = render_into(deps, ctx, &Menu::Main).await?;
            Ok(Some(id))
        }
        Cancel => {
            let menu = Menu::ConfirmCancelSettlement { resume_message: ctx.origin };
            let id = render_into(deps, ctx, &menu).await?;
            Ok(Some(id))
        }
    }
}

pub async fn handle_owner(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: OwnerCashCommand,
) -> Result<Option<MessageId>> {
    use OwnerCashCommand::*;

    match cmd {
        OwnerCashCommand::Menu => {
            advance(deps, ctx, steps::OWNER_CASH_MENU, &Menu::OwnerCashMenu).await
        }
        StaffPayoutMenu => {
            let id = render_into(deps, ctx, &Menu::OwnerStaffPayout { page: 0 }).await?;
            Ok(Some(id))
        }
        StaffPayoutPage { page } => {
            let id = render_into(deps, ctx, &Menu::OwnerStaffPayout { page }).await?;
            Ok(Some(id))
        }
        StaffPayoutSelect { chat_id } | StaffPayoutConfirm { chat_id } => {
            tracing::info!(target_chat = chat_id, "staff payout step");
            let id = render_into(deps, ctx, &Menu::OwnerStaffPayout { page: 0 }).await?;
            Ok(Some(id))
        }
        FinancialsMenu => {
            let id = render_into(deps, ctx, &Menu::OwnerFinancials).await?;
            Ok(Some(id))
        }
        FinancialsDate { .. } => {
            let id = render_into(deps, ctx, &Menu::OwnerFinancials).await?;
            Ok(Some(id))
        }
        FinancialsView { settlement_id } => settlement_detail(deps, ctx, settlement_id).await,
        FinancialsEditField { field, settlement_id } => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| {
                    d.editing_settlement_id = Some(settlement_id);
                })
                .await;
            tracing::debug!(settlement_id, field = %field, "owner editing settlement field");
            deps.sessions
                .set_state(ctx.chat_id, steps::OWNER_CASH_EDIT_FIELD)
                .await;
            settlement_detail(deps, ctx, settlement_id).await
        }
        FinancialsSaveSettlement { settlement_id } => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| d.editing_settlement_id = None)
                .await;
            settlement_detail(deps, ctx, settlement_id).await
        }
        ActualList { page } => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| {
                    d.back_view = Some(SettlementView::Actual.as_str().to_string());
                    d.back_page = page;
                })
                .await;
            advance(
                deps,
                ctx,
                steps::OWNER_CASH_ACTUAL_LIST,
                &Menu::OwnerCashActualList { page },
            )
            .await
        }
        SettledList { page } => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| {
                    d.back_view = Some(SettlementView::Settled.as_str().to_string());
                    d.back_page = page;
                })
                .await;
            advance(
                deps,
                ctx,
                steps::OWNER_CASH_SETTLED_LIST,
                &Menu::OwnerCashSettledList { page },
            )
            .await
        }
        MarkPaid { settlement_id } => {
            deps.settlements.set_deposited(settlement_id, true).await?;
            rerender_cash_list(deps, ctx).await
        }
        MarkUnpaid { settlement_id } => {
            deps.settlements.set_deposited(settlement_id, false).await?;
            rerender_cash_list(deps, ctx).await
        }
        ViewDriverSettlements { driver, view, page } => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| {
                    d.back_driver = Some(driver);
                    d.back_view = Some(view.as_str().to_string());
                    d.back_page = page;
                })
                .await;
            let menu = Menu::OwnerDriverSettlements { driver, view, page };
            let id = render_into(deps, ctx, &menu).await?;
            Ok(Some(id))
        }
        EditSettlement { settlement_id } => {
            deps.sessions
                .update_settlement_draft(ctx.chat_id, |d| {
                    d.editing_settlement_id = Some(settlement_id);
                })
                .await;
            deps.sessions
                .set_state(ctx.chat_id, steps::OWNER_CASH_EDIT_FIELD)
                .await;
            settlement_detail(deps, ctx, settlement_id).await
        }
        MarkSalaryPaid { settlement_id } => {
            deps.settlements.set_salary_paid(settlement_id, true).await?;
            rerender_driver_list(deps, ctx).await
        }
        MarkSalaryUnpaid { settlement_id } => {
            deps.settlements.set_salary_paid(settlement_id, false).await?;
            rerender_driver_list(deps, ctx).await
        }
        MarkAllSalaryPaid { driver } => {
            deps.settlements.mark_all_salary_paid(driver).await?;
            rerender_driver_list(deps, ctx).await
        }
        MarkAllDeposited { driver } => {
            deps.settlements.mark_all_deposited(driver).await?;
            rerender_driver_list(deps, ctx).await
        }
        OperatorViewSettlement { settlement_id } => {
            settlement_detail(deps, ctx, settlement_id).await
        }
        Approve { settlement_id } => {
            deps.settlements
                .set_status(settlement_id, SettlementStatus::Approved)
                .await?;
            settlement_detail(deps, ctx, settlement_id).await
        }
        Reject { settlement_id } => {
            deps.settlements
                .set_status(settlement_id, SettlementStatus::Rejected)
                .await?;
            settlement_detail(deps, ctx, settlement_id).await
        }
    }
}

async fn settlement_detail(
    deps: &Deps,
    ctx: &CallbackCtx,
    settlement_id: i64,
) -> Result<Option<MessageId>> {
    match deps.settlements.find(settlement_id).await? {
        Some(_) => {
            let id = render_into(deps, ctx, &Menu::SettlementDetail { settlement_id }).await?;
            Ok(Some(id))
        }
        None => notice(deps, ctx, "Settlement not found.").await,
    }
}

/// After flipping a deposit flag, land back on the list the owner came from.
async fn rerender_cash_list(deps: &Deps, ctx: &CallbackCtx) -> Result<Option<MessageId>> {
    let draft = deps.sessions.settlement_draft(ctx.chat_id).await;
    let menu = match draft.back_view.as_deref() {
        Some("settled") => Menu::OwnerCashSettledList { page: draft.back_page },
        _ => Menu::OwnerCashActualList { page: draft.back_page },
    };
    let id = render_into(deps, ctx, &menu).await?;
    Ok(Some(id))
}

/// After a salary flip, return to the per-driver list when its context is
/// still in the draft, otherwise to the cash menu.
async fn rerender_driver_list(deps: &Deps, ctx: &CallbackCtx) -> Result<Option<MessageId>> {
    let draft = deps.sessions.settlement_draft(ctx.chat_id).await;
    let menu = match (draft.back_driver, draft.back_view.as_deref()) {
        (Some(driver), Some(view)) => match SettlementView::parse(view) {
            Some(view) => Menu::OwnerDriverSettlements { driver, view, page: draft.back_page },
            None => Menu::OwnerCashMenu,
        },
        _ => Menu::OwnerCashMenu,
    };
    let id = render_into(deps, ctx, &menu).await?;
    Ok(Some(id))
}

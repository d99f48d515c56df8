//! Back/resume navigation.
//!
//! `Menu` is the typed catalogue of render targets. Back-destination
//! payloads decode into it with the same longest-match algorithm the command
//! resolver uses (destinations also carry variable-length parameters); the
//! screen adapter is the registry mapping each variant to its render
//! function.

use std::sync::OnceLock;

use crate::{command::SettlementView, domain::MessageId, steps};

/// Every screen the engine can ask a renderer to draw.
#[derive(Clone, Debug, PartialEq)]
pub enum Menu {
    Main,
    AccessDenied,
    UnknownCommand,
    InvalidRequest,
    ErrorNotice { text: String },
    ConfirmCancelOrder { resume_message: MessageId },
    ConfirmCancelSettlement { resume_message: MessageId },
    // Order creation.
    CategoryMenu,
    SubcategoryMenu { category: Option<String> },
    DescriptionInput,
    NameInput,
    DateSelection { page: u32 },
    TimeSelection,
    MinuteSelection { hour: u8 },
    PhoneInput,
    AddressInput,
    PhotoInput,
    PaymentSelection,
    OrderConfirm,
    OrderEditMenu,
    OpConfirmOptions { order_id: Option<i64> },
    OpCostInput { order_id: Option<i64> },
    OpAssignExec { order_id: Option<i64> },
    // Order view / management.
    ManageOrders,
    ViewOrder { order_id: i64 },
    OperatorOrderList { list: String, page: u32 },
    MyOrders { page: u32 },
    // Staff.
    StaffMenu,
    StaffListMenu,
    StaffListByRole { role: String, page: u32 },
    StaffInfo { chat_id: i64 },
    StaffEditMenu { chat_id: i64 },
    StaffAddPrompt { step: String },
    // Statistics and exports.
    StatsMenu,
    StatsBasicPeriods,
    StatsResult { label: String },
    StatsYearNav { context: String, year: i32 },
    StatsMonthDays { context: String, year: i32, month: u32 },
    ExcelMenu,
    ExcelQueued { report: String },
    // User blocking.
    BlockUserMenu,
    BlockUserList,
    UnblockUserList,
    BlockUserInfo { chat_id: i64 },
    UnblockUserInfo { chat_id: i64 },
    // Info / communications.
    InviteFriend,
    ContactOperator,
    ContactChat,
    ContactPhoneOptions,
    ReferralMy,
    ReferralLink,
    ReferralQr,
    ReferralDetails { referral_id: i64 },
    ChatHistory { chat_id: i64 },
    // Salary.
    MySalary,
    SalaryOwed { page: u32 },
    SalaryEarned { page: u32 },
    // Owner.
    OwnerStaffPayout { page: u32 },
    OwnerFinancials,
    OwnerCashMenu,
    OwnerCashActualList { page: u32 },
    OwnerCashSettledList { page: u32 },
    OwnerDriverSettlements { driver: i64, view: SettlementView, page: u32 },
    SettlementDetail { settlement_id: i64 },
    // Settlement flow.
    SettleMenu,
    SettleFuelPrompt,
    SettleExpensesMenu,
    SettleExpenseDescriptionPrompt,
    SettleExpenseAmountPrompt,
    SettleConfirmDeleteExpense { index: usize },
    SettleLoadersMenu,
    SettleLoaderNamePrompt,
    SettleLoaderSalaryPrompt,
    SettleConfirmDeleteLoader { index: usize },
}

/// Known back destinations: `(identifier, part count)`.
///
/// Like command signatures these are not prefix-free, so matching is by
/// specificity: part count descending, identifier length descending.
const BACK_DESTINATIONS: &[(&str, usize)] = &[
    ("main", 1),
    ("category", 1),
    ("subcategory", 1),
    ("description", 1),
    ("name", 1),
    ("date", 1),
    ("time", 1),
    ("phone", 1),
    ("address", 1),
    ("photo", 1),
    ("payment", 1),
    ("confirm", 1),
    ("edit_menu", 2),
    ("staff_menu", 2),
    ("staff_list_menu", 3),
    ("staff_info", 2),
    ("staff_edit_menu", 3),
    ("stats_menu", 2),
    ("stats_basic_periods", 3),
    ("block_user_menu", 3),
    ("block_user_list_prompt", 4),
    ("unblock_user_list_prompt", 4),
    ("contact_operator", 2),
    ("contact_phone_options", 3),
    ("invite_friend", 2),
    ("referral_my", 2),
    ("manage_orders", 2),
    ("my_salary", 2),
    ("owner_staff_payout", 3),
    ("owner_financials", 2),
    ("owner_cash_main", 3),
    ("owner_cash_actual_list", 4),
    ("owner_cash_settled_list", 4),
    ("owner_cash_view_driver_settlements", 5),
    ("settle_menu", 2),
    ("settle_expenses_menu", 3),
    ("settle_loaders_menu", 3),
    ("op_confirm_options", 3),
    ("op_cost_input", 3),
    ("op_assign_exec", 3),
];

fn destinations_by_specificity() -> &'static [(&'static str, usize)] {
    static SORTED: OnceLock<Vec<(&'static str, usize)>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut dests = BACK_DESTINATIONS.to_vec();
        dests.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.len().cmp(&a.0.len())));
        dests
    })
}

/// Decode the tokens captured after the `back_to_` marker.
///
/// Unknown destinations and malformed parameters both land on the main
/// menu: backing out must always succeed somewhere.
pub fn parse_back_destination(tokens: &[String]) -> Menu {
    if tokens.is_empty() {
        return Menu::Main;
    }

    for &(identifier, parts) in destinations_by_specificity() {
        if tokens.len() < parts {
            continue;
        }
        if tokens[..parts].join("_") != identifier {
            continue;
        }
        let params = &tokens[parts..];
        match build_destination(identifier, params) {
            Some(menu) => return menu,
            None => {
                tracing::warn!(identifier, ?params, "bad back-destination params");
                return Menu::Main;
            }
        }
    }

    tracing::warn!(destination = tokens.join("_"), "unknown back destination");
    Menu::Main
}

fn build_destination(identifier: &str, params: &[String]) -> Option<Menu> {
    let i64_at = |idx: usize| params.get(idx).and_then(|p| p.parse::<i64>().ok());
    let u32_at = |idx: usize| params.get(idx).and_then(|p| p.parse::<u32>().ok());

    let menu = match identifier {
        "main" => Menu::Main,
        "category" => Menu::CategoryMenu,
        // Category itself is not encoded in the payload; the engine fills it
        // from the form draft before rendering.
        "subcategory" => Menu::SubcategoryMenu { category: None },
        "description" => Menu::DescriptionInput,
        "name" => Menu::NameInput,
        "date" => Menu::DateSelection { page: 0 },
        "time" => Menu::TimeSelection,
        "phone" => Menu::PhoneInput,
        "address" => Menu::AddressInput,
        "photo" => Menu::PhotoInput,
        "payment" => Menu::PaymentSelection,
        "confirm" => Menu::OrderConfirm,
        "edit_menu" => Menu::OrderEditMenu,
        "staff_menu" => Menu::StaffMenu,
        "staff_list_menu" => Menu::StaffListMenu,
        "staff_info" => Menu::StaffInfo { chat_id: i64_at(0)? },
        "staff_edit_menu" => Menu::StaffEditMenu { chat_id: i64_at(0)? },
        "stats_menu" => Menu::StatsMenu,
        "stats_basic_periods" => Menu::StatsBasicPeriods,
        "block_user_menu" => Menu::BlockUserMenu,
        "block_user_list_prompt" => Menu::BlockUserList,
        "unblock_user_list_prompt" => Menu::UnblockUserList,
        "contact_operator" => Menu::ContactOperator,
        "contact_phone_options" => Menu::ContactPhoneOptions,
        "invite_friend" => Menu::InviteFriend,
        "referral_my" => Menu::ReferralMy,
        "manage_orders" => Menu::ManageOrders,
        "my_salary" => Menu::MySalary,
        "owner_staff_payout" => Menu::OwnerStaffPayout { page: u32_at(0).unwrap_or(0) },
        "owner_financials" => Menu::OwnerFinancials,
        "owner_cash_main" => Menu::OwnerCashMenu,
        "owner_cash_actual_list" => Menu::OwnerCashActualList { page: u32_at(0).unwrap_or(0) },
        "owner_cash_settled_list" => Menu::OwnerCashSettledList { page: u32_at(0).unwrap_or(0) },
        "owner_cash_view_driver_settlements" => Menu::OwnerDriverSettlements {
            driver: i64_at(0)?,
            view: SettlementView::parse(params.get(1)?)?,
            page: u32_at(2)?,
        },
        "settle_menu" => Menu::SettleMenu,
        "settle_expenses_menu" => Menu::SettleExpensesMenu,
        "settle_loaders_menu" => Menu::SettleLoadersMenu,
        // Order id falls back to the draft when absent from the payload.
        "op_confirm_options" => Menu::OpConfirmOptions { order_id: i64_at(0) },
        "op_cost_input" => Menu::OpCostInput { order_id: i64_at(0) },
        "op_assign_exec" => Menu::OpAssignExec { order_id: i64_at(0) },
        _ => return None,
    };
    Some(menu)
}

/// The screen that re-renders a given step on resume.
pub fn menu_for_step(step: &str) -> Option<Menu> {
    let menu = match step {
        steps::ORDER_CATEGORY => Menu::CategoryMenu,
        steps::ORDER_SUBCATEGORY => Menu::SubcategoryMenu { category: None },
        steps::ORDER_DESCRIPTION => Menu::DescriptionInput,
        steps::ORDER_NAME => Menu::NameInput,
        steps::ORDER_DATE => Menu::DateSelection { page: 0 },
        steps::ORDER_TIME => Menu::TimeSelection,
        steps::ORDER_MINUTE => Menu::TimeSelection,
        steps::ORDER_PHONE => Menu::PhoneInput,
        steps::ORDER_ADDRESS => Menu::AddressInput,
        steps::ORDER_PHOTO => Menu::PhotoInput,
        steps::ORDER_PAYMENT => Menu::PaymentSelection,
        steps::ORDER_CONFIRM => Menu::OrderConfirm,
        steps::ORDER_EDIT => Menu::OrderEditMenu,
        steps::OP_ORDER_CONFIRM_OPTIONS => Menu::OpConfirmOptions { order_id: None },
        steps::OP_ORDER_COST_INPUT => Menu::OpCostInput { order_id: None },
        steps::OP_ORDER_ASSIGN_EXEC => Menu::OpAssignExec { order_id: None },
        steps::OP_ORDER_FINAL_CONFIRM => Menu::OrderConfirm,
        steps::SETTLE_MENU => Menu::SettleMenu,
        steps::SETTLE_INPUT_FUEL => Menu::SettleFuelPrompt,
        steps::SETTLE_EXPENSES_MENU => Menu::SettleExpensesMenu,
        steps::SETTLE_INPUT_EXPENSE_DESCRIPTION => Menu::SettleExpenseDescriptionPrompt,
        steps::SETTLE_INPUT_EXPENSE_AMOUNT => Menu::SettleExpenseAmountPrompt,
        steps::SETTLE_LOADERS_MENU => Menu::SettleLoadersMenu,
        steps::SETTLE_INPUT_LOADER_NAME => Menu::SettleLoaderNamePrompt,
        steps::SETTLE_INPUT_LOADER_SALARY => Menu::SettleLoaderSalaryPrompt,
        steps::SETTLE_EDIT_LOADER_SALARY => Menu::SettleLoaderSalaryPrompt,
        steps::SETTLE_CONFIRM_DELETE_EXPENSE => Menu::SettleExpensesMenu,
        steps::SETTLE_CONFIRM_DELETE_LOADER => Menu::SettleLoadersMenu,
        steps::CONTACT_METHOD => Menu::ContactOperator,
        steps::STATS_MENU => Menu::StatsMenu,
        _ => return None,
    };
    Some(menu)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split('_').map(str::to_string).collect()
    }

    #[test]
    fn empty_remainder_lands_on_main() {
        assert_eq!(parse_back_destination(&[]), Menu::Main);
    }

    #[test]
    fn simple_destination_parses() {
        assert_eq!(parse_back_destination(&toks("category")), Menu::CategoryMenu);
        assert_eq!(parse_back_destination(&toks("staff_menu")), Menu::StaffMenu);
    }

    #[test]
    fn parameterized_destination_parses() {
        assert_eq!(
            parse_back_destination(&toks("staff_info_123456789")),
            Menu::StaffInfo { chat_id: 123456789 }
        );
        assert_eq!(
            parse_back_destination(&toks("owner_cash_view_driver_settlements_42_settled_3")),
            Menu::OwnerDriverSettlements {
                driver: 42,
                view: SettlementView::Settled,
                page: 3,
            }
        );
    }

    #[test]
    fn longer_destination_beats_shared_prefix() {
        assert_eq!(
            parse_back_destination(&toks("owner_cash_actual_list_2")),
            Menu::OwnerCashActualList { page: 2 }
        );
        assert_eq!(
            parse_back_destination(&toks("owner_cash_main")),
            Menu::OwnerCashMenu
        );
    }

    #[test]
    fn unknown_destination_falls_back_to_main() {
        assert_eq!(parse_back_destination(&toks("warp_core")), Menu::Main);
    }

    #[test]
    fn malformed_params_fall_back_to_main() {
        assert_eq!(parse_back_destination(&toks("staff_info_notanumber")), Menu::Main);
    }

    #[test]
    fn every_input_step_has_a_resume_screen() {
        for step in [
            steps::ORDER_DATE,
            steps::ORDER_PHONE,
            steps::SETTLE_INPUT_FUEL,
            steps::SETTLE_INPUT_LOADER_SALARY,
            steps::OP_ORDER_COST_INPUT,
        ] {
            assert!(menu_for_step(step).is_some(), "no resume screen for {step}");
        }
        assert_eq!(menu_for_step("no_such_step"), None);
    }
}

//! Callback payload resolution.
//!
//! A payload is a single short string of `_`-joined tokens. Resolution runs
//! in two stages: [`resolve`] recovers `(identifier, params)` using the
//! exact/back/prefix/fallback rules, and [`Command::decode`] turns that raw
//! pair into a typed command, validating parameter arity and types up front
//! so handlers never re-parse strings.

use std::sync::OnceLock;

use crate::{
    domain::MessageId,
    errors::Error,
    navigation::Menu,
    Result,
};

pub const DELIMITER: char = '_';

/// Marker for navigation-back payloads (`back_to_<destination>`).
pub const BACK_MARKER: &str = "back_to_";

/// Raw resolution output: identifier plus ordered textual params.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCommand {
    pub identifier: String,
    pub params: Vec<String>,
}

/// Commands that are complete fixed strings carrying zero parameters.
///
/// Checked before everything else: an exact entry wins even when a prefix
/// signature (or the back marker) would also match.
const EXACT_COMMANDS: &[&str] = &[
    "noop",
    "noop_informational",
    "continue_in_bot",
    // Cancel-confirmation dialogs. These begin with the back marker but are
    // complete commands, which is exactly why exact matching runs first.
    "back_to_main_confirm_cancel_order",
    "back_to_main_confirm_cancel_settlement",
    "back_to_main_confirmed_cancel_final",
    // Order creation.
    "category_waste",
    "category_demolition",
    "subcategory_construction",
    "subcategory_household",
    "subcategory_metal",
    "subcategory_junk",
    "subcategory_greenery",
    "subcategory_tires",
    "subcategory_walls",
    "subcategory_floors",
    "subcategory_plumbing",
    "subcategory_other",
    "use_profile_name_for_order",
    "enter_another_name_for_order",
    "confirm_order_name",
    "confirm_order_phone",
    "change_order_phone",
    "confirm_order_description",
    "skip_order_description",
    "select_date_asap",
    "skip_photo_initial",
    "finish_photo_upload",
    "reset_photo_upload",
    "view_uploaded_media",
    "payment_now",
    "payment_later",
    "op_create_new_order",
    "driver_create_order",
    "manage_orders",
    // Staff management.
    "staff_menu",
    "staff_list_menu",
    "staff_add_prompt_name",
    "staff_add_prompt_card_number",
    // Statistics and exports.
    "stats_menu",
    "stats_basic_periods",
    "stats_get_today",
    "stats_get_yesterday",
    "stats_get_current_week",
    "stats_get_current_month",
    "stats_get_last_week",
    "stats_get_last_month",
    "stats_select_custom_date",
    "stats_select_custom_period",
    "send_excel_menu",
    "excel_generate_orders",
    "excel_generate_referrals",
    "excel_generate_salaries",
    // User blocking.
    "block_user_menu",
    "block_user_list_prompt",
    "unblock_user_list_prompt",
    // Info / communications.
    "invite_friend",
    "contact_operator",
    "contact_chat",
    "contact_phone_options",
    "phone_action_request_call",
    "phone_action_call_self",
    "referral_link",
    "referral_qr",
    "referral_my",
    "request_referral_payout",
    // Salary and owner menus.
    "my_salary",
    "owner_staff_payout",
    "owner_financials",
    "owner_cash_main",
    // Settlement flow.
    "settle_start",
    "settle_menu",
    "settle_set_fuel",
    "settle_expenses_menu",
    "settle_add_expense",
    "settle_loaders_menu",
    "settle_add_loader",
    "settle_save",
    "settle_cancel",
];

/// Prefix signatures: `(identifier, expected part count)`.
///
/// The part count is the number of delimiter-separated tokens forming the
/// identifier itself; everything after it is parameters. Signatures are not
/// prefix-free (`settle_delete_expense` vs `settle_delete_expense_ask`), so
/// matching tries the most specific signature first: part count descending,
/// then identifier length descending.
const PREFIX_SIGNATURES: &[(&str, usize)] = &[
    // Order creation.
    ("confirm_order_final", 3),
    ("select_date", 2),
    ("select_hour", 2),
    ("select_time", 2),
    ("date_page", 2),
    ("edit_order", 2),
    ("edit_field_description", 3),
    ("edit_field_name", 3),
    ("edit_field_subcategory", 3),
    ("edit_field_date", 3),
    ("edit_field_time", 3),
    ("edit_field_phone", 3),
    ("edit_field_address", 3),
    ("edit_field_media", 3),
    ("edit_field_payment", 3),
    ("accept_cost", 2),
    ("reject_cost", 2),
    ("pay_order", 2),
    ("cancel_order_operator", 3),
    ("cancel_order_confirm", 3),
    ("resume_order_creation", 3),
    // Operator order-creation variant.
    ("op_confirm_simple", 3),
    ("op_confirm_set_cost", 4),
    ("op_confirm_assign_exec", 4),
    ("op_skip_cost", 3),
    ("op_skip_assign_exec", 4),
    ("op_finalize_creation", 3),
    ("op_edit_order_cost", 4),
    ("op_edit_order_execs", 4),
    // Order view / management.
    ("view_order", 2),
    ("set_cost", 2),
    ("assign_executors", 2),
    ("assign_driver", 2),
    ("assign_loader", 2),
    ("unassign_executor", 2),
    ("my_orders_page", 3),
    ("operator_orders_new", 3),
    ("operator_orders_awaiting_confirmation", 4),
    ("operator_orders_in_progress", 4),
    ("operator_orders_completed", 3),
    ("operator_orders_canceled", 3),
    ("mark_order_done", 3),
    ("order_set_final_cost", 4),
    ("order_resume", 2),
    ("exec_notified", 2),
    // Staff management.
    ("staff_info", 2),
    ("staff_edit_menu", 3),
    ("staff_list_by_role", 4),
    ("staff_add_role_final", 4),
    ("staff_edit_field_name", 4),
    ("staff_edit_field_surname", 4),
    ("staff_edit_field_nickname", 4),
    ("staff_edit_field_phone", 4),
    ("staff_edit_field_card_number", 5),
    ("staff_edit_field_role", 4),
    ("staff_edit_role_final", 4),
    ("staff_block_reason_prompt", 4),
    ("staff_unblock_confirm", 3),
    ("staff_delete_confirm", 3),
    // Statistics.
    ("stats_select_month", 3),
    ("stats_select_day", 3),
    ("stats_year_nav", 3),
    // User blocking.
    ("block_user_info", 3),
    ("block_user_reason_prompt", 4),
    ("block_user_final", 3),
    ("unblock_user_info", 3),
    ("unblock_user_final", 3),
    // Info / communications.
    ("referral_details", 2),
    ("view_chat_history", 3),
    // Salary.
    ("my_salary_owed", 3),
    ("my_salary_earned_stats", 4),
    // Owner payouts and financials.
    ("owner_staff_payout_page", 4),
    ("owner_staff_payout_select", 4),
    ("owner_staff_payout_confirm", 4),
    ("owner_financials_date", 3),
    ("owner_financials_view", 3),
    ("owner_financials_edit_field", 4),
    ("owner_financials_save_settlement", 4),
    // Owner cash management.
    ("owner_cash_actual_list", 4),
    ("owner_cash_settled_list", 4),
    ("owner_cash_mark_paid", 4),
    ("owner_cash_mark_unpaid", 4),
    ("owner_cash_view_driver_settlements", 5),
    ("owner_cash_edit_settlement", 4),
    ("owner_cash_mark_salary_paid", 5),
    ("owner_cash_mark_salary_unpaid", 5),
    ("owner_mark_all_salary_paid", 5),
    ("owner_mark_all_deposited", 4),
    // Settlement review and settlement flow items.
    ("operator_view_settlement", 3),
    ("settlement_approve", 2),
    ("settlement_reject", 2),
    ("settle_edit_expense", 3),
    ("settle_delete_expense_ask", 4),
    ("settle_delete_expense", 3),
    ("settle_edit_loader", 3),
    ("settle_delete_loader_ask", 4),
    ("settle_delete_loader", 3),
];

fn signatures_by_specificity() -> &'static [(&'static str, usize)] {
    static SORTED: OnceLock<Vec<(&'static str, usize)>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut sigs = PREFIX_SIGNATURES.to_vec();
        sigs.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.len().cmp(&a.0.len())));
        sigs
    })
}

/// Resolve a raw payload into `(identifier, params)`.
///
/// Deterministic; the same payload always yields the same output. Strictly
/// ordered rules: exact match, back marker, prefix table by specificity,
/// first-token fallback. The fallback never fails: genuinely unknown
/// commands surface as an identifier no dispatcher knows, so the error path
/// can answer rather than crash.
pub fn resolve(payload: &str) -> Result<RawCommand> {
    if payload.is_empty() {
        return Err(Error::MalformedPayload);
    }

    if EXACT_COMMANDS.contains(&payload) {
        return Ok(RawCommand {
            identifier: payload.to_string(),
            params: Vec::new(),
        });
    }

    if let Some(rest) = payload.strip_prefix(BACK_MARKER) {
        let params = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(DELIMITER).map(str::to_string).collect()
        };
        return Ok(RawCommand {
            identifier: "back".to_string(),
            params,
        });
    }

    let tokens: Vec<&str> = payload.split(DELIMITER).collect();
    for &(identifier, parts) in signatures_by_specificity() {
        if tokens.len() < parts {
            continue;
        }
        if tokens[..parts].join("_") == identifier {
            return Ok(RawCommand {
                identifier: identifier.to_string(),
                params: tokens[parts..].iter().map(|t| t.to_string()).collect(),
            });
        }
    }

    Ok(RawCommand {
        identifier: tokens[0].to_string(),
        params: tokens[1..].iter().map(|t| t.to_string()).collect(),
    })
}

/// Order category selected on the first creation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Waste,
    Demolition,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Waste => "waste",
            Category::Demolition => "demolition",
        }
    }
}

/// Which order field the edit menu targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderField {
    Description,
    Name,
    Subcategory,
    Date,
    Time,
    Phone,
    Address,
    Media,
    Payment,
}

/// Which staff field an edit prompt targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaffField {
    Name,
    Surname,
    Nickname,
    Phone,
    CardNumber,
    Role,
}

/// Operator order lists, one per order status bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderList {
    New,
    AwaitingConfirmation,
    InProgress,
    Completed,
    Canceled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderCommand {
    StartByOperator,
    StartByDriver,
    Category(Category),
    Subcategory(String),
    ConfirmDescription,
    SkipDescription,
    UseProfileName,
    EnterAnotherName,
    ConfirmName,
    ConfirmPhone,
    ChangePhone,
    SelectDateAsap,
    SelectDate { day_offset: u32 },
    DatePage { page: u32 },
    SelectHour { hour: u8 },
    SelectTime { time: String },
    SkipPhotoInitial,
    FinishPhotoUpload,
    ResetPhotoUpload,
    ViewUploadedMedia,
    PaymentNow,
    PaymentLater,
    ConfirmFinal { order_id: i64 },
    EditMenu { order_id: i64 },
    EditField { field: OrderField, order_id: i64 },
    AcceptCost { order_id: i64 },
    RejectCost { order_id: i64 },
    PayOrder { order_id: i64 },
    CancelByOperator { order_id: i64 },
    CancelConfirm { order_id: i64 },
    OpConfirmSimple { order_id: i64 },
    OpConfirmSetCost { order_id: i64 },
    OpConfirmAssignExec { order_id: i64 },
    OpSkipCost { order_id: i64 },
    OpSkipAssignExec { order_id: i64 },
    OpFinalize { order_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManageCommand {
    Menu,
    ViewOrder { order_id: i64 },
    SetCost { order_id: i64 },
    AssignExecutors { order_id: i64 },
    AssignDriver { order_id: i64, executor: i64 },
    AssignLoader { order_id: i64, executor: i64 },
    UnassignExecutor { order_id: i64, executor: i64 },
    MyOrdersPage { page: u32 },
    List { list: OrderList, page: u32 },
    MarkDone { order_id: i64 },
    SetFinalCost { order_id: i64 },
    ResumeDraft { order_id: i64 },
    EditCost { order_id: i64 },
    EditExecutors { order_id: i64 },
    ExecutorNotified { order_id: i64, executor: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StaffCommand {
    Menu,
    ListMenu,
    ListByRole { role: String, page: u32 },
    Info { chat_id: i64 },
    AddPromptName,
    AddPromptCardNumber,
    AddRoleFinal { role: String },
    EditMenu { chat_id: i64 },
    EditField { field: StaffField, chat_id: i64 },
    EditRoleFinal { role: String, chat_id: i64 },
    BlockReasonPrompt { chat_id: i64 },
    UnblockConfirm { chat_id: i64 },
    DeleteConfirm { chat_id: i64 },
}

/// Fixed reporting periods for the statistics menus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsPeriod {
    Today,
    Yesterday,
    CurrentWeek,
    CurrentMonth,
    LastWeek,
    LastMonth,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsCommand {
    Menu,
    BasicPeriods,
    GetPeriod(StatsPeriod),
    SelectCustomDate,
    SelectCustomPeriod,
    SelectMonth { context: String, year: i32, month: u32 },
    SelectDay { context: String, date: chrono::NaiveDate },
    YearNav { context: String, year: i32 },
    ExcelMenu,
    ExcelGenerate { report: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockCommand {
    Menu,
    ListForBlocking,
    ListForUnblocking,
    Info { chat_id: i64 },
    ReasonPrompt { chat_id: i64 },
    BlockFinal { chat_id: i64 },
    UnblockInfo { chat_id: i64 },
    UnblockFinal { chat_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InfoCommand {
    InviteFriend,
    ContactOperator,
    ContactChat,
    ContactPhoneOptions,
    RequestCall,
    CallSelf,
    ReferralLink,
    ReferralQr,
    ReferralMy,
    ReferralDetails { referral_id: i64 },
    RequestReferralPayout,
    ViewChatHistory { chat_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SalaryCommand {
    Menu,
    Owed { page: u32 },
    EarnedStats { page: u32 },
}

/// Which of the owner's settlement lists a command targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettlementView {
    Actual,
    Settled,
}

impl SettlementView {
    pub fn as_str(self) -> &'static str {
        match self {
            SettlementView::Actual => "actual",
            SettlementView::Settled => "settled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "actual" => Some(SettlementView::Actual),
            "settled" => Some(SettlementView::Settled),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerCashCommand {
    Menu,
    StaffPayoutMenu,
    StaffPayoutPage { page: u32 },
    StaffPayoutSelect { chat_id: i64 },
    StaffPayoutConfirm { chat_id: i64 },
    FinancialsMenu,
    FinancialsDate { date: String },
    FinancialsView { settlement_id: i64 },
    FinancialsEditField { field: String, settlement_id: i64 },
    FinancialsSaveSettlement { settlement_id: i64 },
    ActualList { page: u32 },
    SettledList { page: u32 },
    MarkPaid { settlement_id: i64 },
    MarkUnpaid { settlement_id: i64 },
    ViewDriverSettlements { driver: i64, view: SettlementView, page: u32 },
    EditSettlement { settlement_id: i64 },
    MarkSalaryPaid { settlement_id: i64 },
    MarkSalaryUnpaid { settlement_id: i64 },
    MarkAllSalaryPaid { driver: i64 },
    MarkAllDeposited { driver: i64 },
    OperatorViewSettlement { settlement_id: i64 },
    Approve { settlement_id: i64 },
    Reject { settlement_id: i64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettleCommand {
    Start,
    Menu,
    SetFuel,
    ExpensesMenu,
    AddExpense,
    EditExpense { index: usize },
    DeleteExpenseAsk { index: usize },
    DeleteExpense { index: usize },
    LoadersMenu,
    AddLoader,
    EditLoader { index: usize },
    DeleteLoaderAsk { index: usize },
    DeleteLoader { index: usize },
    Save,
    Cancel,
}

/// Fully typed command, grouped by the feature that handles it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Noop { informational: bool },
    ContinueInBot,
    /// `back_to_*`: raw destination tokens, decoded by the navigation table.
    Back { tokens: Vec<String> },
    /// Decline on a cancel-confirmation dialog; carries the menu message id
    /// of the step being resumed.
    ResumeFlow { step_message: MessageId },
    AskCancelOrder,
    AskCancelSettlement,
    ConfirmCancelAll,
    Order(OrderCommand),
    Manage(ManageCommand),
    Staff(StaffCommand),
    Stats(StatsCommand),
    Block(BlockCommand),
    Info(InfoCommand),
    Salary(SalaryCommand),
    OwnerCash(OwnerCashCommand),
    Settle(SettleCommand),
}

struct Params<'a> {
    raw: &'a RawCommand,
    recover: Menu,
}

impl<'a> Params<'a> {
    fn new(raw: &'a RawCommand, recover: Menu) -> Self {
        Self { raw, recover }
    }

    fn err(&self, reason: impl Into<String>) -> Error {
        Error::InvalidParameter {
            identifier: self.raw.identifier.clone(),
            reason: reason.into(),
            recover: self.recover.clone(),
        }
    }

    fn arity(&self, n: usize) -> Result<()> {
        if self.raw.params.len() != n {
            return Err(self.err(format!(
                "expected {n} parameter(s), got {}",
                self.raw.params.len()
            )));
        }
        Ok(())
    }

    fn str(&self, idx: usize) -> Result<&'a str> {
        self.raw
            .params
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| self.err(format!("missing parameter {idx}")))
    }

    fn i64(&self, idx: usize) -> Result<i64> {
        let s = self.str(idx)?;
        s.parse()
            .map_err(|_| self.err(format!("parameter {idx} is not a numeric id: {s:?}")))
    }

    fn u32(&self, idx: usize) -> Result<u32> {
        let s = self.str(idx)?;
        s.parse()
            .map_err(|_| self.err(format!("parameter {idx} is not a number: {s:?}")))
    }

    fn usize(&self, idx: usize) -> Result<usize> {
        let s = self.str(idx)?;
        s.parse()
            .map_err(|_| self.err(format!("parameter {idx} is not an index: {s:?}")))
    }
}

impl Command {
    /// Decode a raw resolution into a typed command.
    ///
    /// Arity and numeric parameters are validated here, per the design rule
    /// that string re-parsing must not leak into feature handlers. Errors
    /// carry the menu to re-render so the user is never left stranded.
    pub fn decode(raw: &RawCommand) -> Result<Command> {
        use Command::*;

        let id = raw.identifier.as_str();
        match id {
            "noop" => Ok(Noop { informational: false }),
            "noop_informational" => Ok(Noop { informational: true }),
            "continue_in_bot" => Ok(ContinueInBot),
            "back" => Ok(Back { tokens: raw.params.clone() }),
            "resume_order_creation" => {
                let p = Params::new(raw, Menu::Main);
                p.arity(1)?;
                Ok(ResumeFlow {
                    step_message: MessageId(p.i64(0)? as i32),
                })
            }
            "back_to_main_confirm_cancel_order" => Ok(AskCancelOrder),
            "back_to_main_confirm_cancel_settlement" => Ok(AskCancelSettlement),
            "back_to_main_confirmed_cancel_final" => Ok(ConfirmCancelAll),

            _ if id.starts_with("category_")
                || id.starts_with("subcategory_")
                || is_order_creation(id) =>
            {
                decode_order(raw).map(Order)
            }
            _ if is_order_manage(id) => decode_manage(raw).map(Manage),
            _ if id.starts_with("staff_") => decode_staff(raw).map(Staff),
            _ if id.starts_with("stats_") || id == "send_excel_menu" || id.starts_with("excel_generate_") => {
                decode_stats(raw).map(Stats)
            }
            _ if id.starts_with("block_user_") || id.starts_with("unblock_user_") => {
                decode_block(raw).map(Block)
            }
            _ if is_info(id) => decode_info(raw).map(Info),
            _ if id.starts_with("my_salary") => decode_salary(raw).map(Salary),
            _ if is_owner_cash(id) => decode_owner_cash(raw).map(OwnerCash),
            _ if id.starts_with("settle_") => decode_settle(raw).map(Settle),

            _ => Err(Error::UnknownCommand(raw.identifier.clone())),
        }
    }
}

fn is_order_creation(id: &str) -> bool {
    matches!(
        id,
        "op_create_new_order"
            | "driver_create_order"
            | "confirm_order_description"
            | "skip_order_description"
            | "use_profile_name_for_order"
            | "enter_another_name_for_order"
            | "confirm_order_name"
            | "confirm_order_phone"
            | "change_order_phone"
            | "select_date_asap"
            | "select_date"
            | "date_page"
            | "select_hour"
            | "select_time"
            | "skip_photo_initial"
            | "finish_photo_upload"
            | "reset_photo_upload"
            | "view_uploaded_media"
            | "payment_now"
            | "payment_later"
            | "confirm_order_final"
            | "edit_order"
            | "accept_cost"
            | "reject_cost"
            | "pay_order"
            | "cancel_order_operator"
            | "cancel_order_confirm"
    ) || id.starts_with("edit_field_")
        || id.starts_with("op_confirm_")
        || id.starts_with("op_skip_")
        || id == "op_finalize_creation"
}

fn is_order_manage(id: &str) -> bool {
    matches!(
        id,
        "manage_orders"
            | "view_order"
            | "set_cost"
            | "assign_executors"
            | "assign_driver"
            | "assign_loader"
            | "unassign_executor"
            | "my_orders_page"
            | "mark_order_done"
            | "order_set_final_cost"
            | "order_resume"
            | "exec_notified"
            | "op_edit_order_cost"
            | "op_edit_order_execs"
    ) || id.starts_with("operator_orders_")
}

fn is_info(id: &str) -> bool {
    matches!(
        id,
        "invite_friend"
            | "contact_operator"
            | "contact_chat"
            | "contact_phone_options"
            | "phone_action_request_call"
            | "phone_action_call_self"
            | "referral_link"
            | "referral_qr"
            | "referral_my"
            | "referral_details"
            | "request_referral_payout"
            | "view_chat_history"
    )
}

fn is_owner_cash(id: &str) -> bool {
    id.starts_with("owner_cash_")
        || id.starts_with("owner_mark_all_")
        || id.starts_with("owner_staff_payout")
        || id.starts_with("owner_financials")
        || id == "operator_view_settlement"
        || id == "settlement_approve"
        || id == "settlement_reject"
}

fn decode_order(raw: &RawCommand) -> Result<OrderCommand> {
    use OrderCommand::*;

    let id = raw.identifier.as_str();
    if let Some(slug) = id.strip_prefix("subcategory_") {
        return Ok(Subcategory(slug.to_string()));
    }

    let p = Params::new(raw, Menu::Main);
    match id {
        "op_create_new_order" => Ok(StartByOperator),
        "driver_create_order" => Ok(StartByDriver),
        "category_waste" => Ok(OrderCommand::Category(Category::Waste)),
        "category_demolition" => Ok(OrderCommand::Category(Category::Demolition)),
        "confirm_order_description" => Ok(ConfirmDescription),
        "skip_order_description" => Ok(SkipDescription),
        "use_profile_name_for_order" => Ok(UseProfileName),
        "enter_another_name_for_order" => Ok(EnterAnotherName),
        "confirm_order_name" => Ok(ConfirmName),
        "confirm_order_phone" => Ok(ConfirmPhone),
        "change_order_phone" => Ok(ChangePhone),
        "select_date_asap" => Ok(SelectDateAsap),
        "select_date" => {
            let p = Params::new(raw, Menu::DateSelection { page: 0 });
            p.arity(1)?;
            Ok(SelectDate { day_offset: p.u32(0)? })
        }
        "date_page" => {
            let p = Params::new(raw, Menu::DateSelection { page: 0 });
            p.arity(1)?;
            Ok(DatePage { page: p.u32(0)? })
        }
        "select_hour" => {
            let p = Params::new(raw, Menu::TimeSelection);
            p.arity(1)?;
            let hour = p.u32(0)?;
            if hour > 23 {
                return Err(p.err(format!("hour out of range: {hour}")));
            }
            Ok(SelectHour { hour: hour as u8 })
        }
        "select_time" => {
            let p = Params::new(raw, Menu::TimeSelection);
            p.arity(1)?;
            Ok(SelectTime { time: p.str(0)?.to_string() })
        }
        "skip_photo_initial" => Ok(SkipPhotoInitial),
        "finish_photo_upload" => Ok(FinishPhotoUpload),
        "reset_photo_upload" => Ok(ResetPhotoUpload),
        "view_uploaded_media" => Ok(ViewUploadedMedia),
        "payment_now" => Ok(PaymentNow),
        "payment_later" => Ok(PaymentLater),
        "confirm_order_final" => {
            let p = Params::new(raw, Menu::OrderConfirm);
            p.arity(1)?;
            Ok(ConfirmFinal { order_id: p.i64(0)? })
        }
        "edit_order" => {
            let p = Params::new(raw, Menu::OrderConfirm);
            p.arity(1)?;
            Ok(EditMenu { order_id: p.i64(0)? })
        }
        "accept_cost" => {
            p.arity(1)?;
            Ok(AcceptCost { order_id: p.i64(0)? })
        }
        "reject_cost" => {
            p.arity(1)?;
            Ok(RejectCost { order_id: p.i64(0)? })
        }
        "pay_order" => {
            p.arity(1)?;
            Ok(PayOrder { order_id: p.i64(0)? })
        }
        "cancel_order_operator" => {
            p.arity(1)?;
            Ok(CancelByOperator { order_id: p.i64(0)? })
        }
        "cancel_order_confirm" => {
            p.arity(1)?;
            Ok(CancelConfirm { order_id: p.i64(0)? })
        }
        "op_confirm_simple" => {
            p.arity(1)?;
            Ok(OpConfirmSimple { order_id: p.i64(0)? })
        }
        "op_confirm_set_cost" => {
            p.arity(1)?;
            Ok(OpConfirmSetCost { order_id: p.i64(0)? })
        }
        "op_confirm_assign_exec" => {
            p.arity(1)?;
            Ok(OpConfirmAssignExec { order_id: p.i64(0)? })
        }
        "op_skip_cost" => {
            p.arity(1)?;
            Ok(OpSkipCost { order_id: p.i64(0)? })
        }
        "op_skip_assign_exec" => {
            p.arity(1)?;
            Ok(OpSkipAssignExec { order_id: p.i64(0)? })
        }
        "op_finalize_creation" => {
            p.arity(1)?;
            Ok(OpFinalize { order_id: p.i64(0)? })
        }
        _ if id.starts_with("edit_field_") => {
            let field = match id {
                "edit_field_description" => OrderField::Description,
                "edit_field_name" => OrderField::Name,
                "edit_field_subcategory" => OrderField::Subcategory,
                "edit_field_date" => OrderField::Date,
                "edit_field_time" => OrderField::Time,
                "edit_field_phone" => OrderField::Phone,
                "edit_field_address" => OrderField::Address,
                "edit_field_media" => OrderField::Media,
                "edit_field_payment" => OrderField::Payment,
                other => return Err(Error::UnknownCommand(other.to_string())),
            };
            let p = Params::new(raw, Menu::OrderEditMenu);
            p.arity(1)?;
            Ok(EditField { field, order_id: p.i64(0)? })
        }
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

fn decode_manage(raw: &RawCommand) -> Result<ManageCommand> {
    use ManageCommand::*;

    let p = Params::new(raw, Menu::ManageOrders);
    match raw.identifier.as_str() {
        "manage_orders" => Ok(ManageCommand::Menu),
        "view_order" => {
            p.arity(1)?;
            Ok(ViewOrder { order_id: p.i64(0)? })
        }
        "set_cost" => {
            p.arity(1)?;
            Ok(SetCost { order_id: p.i64(0)? })
        }
        "assign_executors" => {
            p.arity(1)?;
            Ok(AssignExecutors { order_id: p.i64(0)? })
        }
        "assign_driver" => {
            p.arity(2)?;
            Ok(AssignDriver { order_id: p.i64(0)?, executor: p.i64(1)? })
        }
        "assign_loader" => {
            p.arity(2)?;
            Ok(AssignLoader { order_id: p.i64(0)?, executor: p.i64(1)? })
        }
        "unassign_executor" => {
            p.arity(2)?;
            Ok(UnassignExecutor { order_id: p.i64(0)?, executor: p.i64(1)? })
        }
        "my_orders_page" => {
            p.arity(1)?;
            Ok(MyOrdersPage { page: p.u32(0)? })
        }
        "mark_order_done" => {
            p.arity(1)?;
            Ok(MarkDone { order_id: p.i64(0)? })
        }
        "order_set_final_cost" => {
            p.arity(1)?;
            Ok(SetFinalCost { order_id: p.i64(0)? })
        }
        "order_resume" => {
            p.arity(1)?;
            Ok(ResumeDraft { order_id: p.i64(0)? })
        }
        "op_edit_order_cost" => {
            p.arity(1)?;
            Ok(EditCost { order_id: p.i64(0)? })
        }
        "op_edit_order_execs" => {
            p.arity(1)?;
            Ok(EditExecutors { order_id: p.i64(0)? })
        }
        "exec_notified" => {
            p.arity(2)?;
            Ok(ExecutorNotified { order_id: p.i64(0)?, executor: p.i64(1)? })
        }
        id if id.starts_with("operator_orders_") => {
            let list = match id {
                "operator_orders_new" => OrderList::New,
                "operator_orders_awaiting_confirmation" => OrderList::AwaitingConfirmation,
                "operator_orders_in_progress" => OrderList::InProgress,
                "operator_orders_completed" => OrderList::Completed,
                "operator_orders_canceled" => OrderList::Canceled,
                other => return Err(Error::UnknownCommand(other.to_string())),
            };
            p.arity(1)?;
            Ok(List { list, page: p.u32(0)? })
        }
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

fn decode_staff(raw: &RawCommand) -> Result<StaffCommand> {
    use StaffCommand::*;

    let p = Params::new(raw, Menu::StaffMenu);
    match raw.identifier.as_str() {
        "staff_menu" => Ok(StaffCommand::Menu),
        "staff_list_menu" => Ok(ListMenu),
        "staff_list_by_role" => {
            p.arity(2)?;
            Ok(ListByRole { role: p.str(0)?.to_string(), page: p.u32(1)? })
        }
        "staff_info" => {
            p.arity(1)?;
            Ok(Info { chat_id: p.i64(0)? })
        }
        "staff_add_prompt_name" => Ok(AddPromptName),
        "staff_add_prompt_card_number" => Ok(AddPromptCardNumber),
        "staff_add_role_final" => {
            p.arity(1)?;
            Ok(AddRoleFinal { role: p.str(0)?.to_string() })
        }
        "staff_edit_menu" => {
            p.arity(1)?;
            Ok(EditMenu { chat_id: p.i64(0)? })
        }
        "staff_edit_role_final" => {
            p.arity(2)?;
            Ok(EditRoleFinal { role: p.str(0)?.to_string(), chat_id: p.i64(1)? })
        }
        "staff_block_reason_prompt" => {
            p.arity(1)?;
            Ok(BlockReasonPrompt { chat_id: p.i64(0)? })
        }
        "staff_unblock_confirm" => {
            p.arity(1)?;
            Ok(UnblockConfirm { chat_id: p.i64(0)? })
        }
        "staff_delete_confirm" => {
            p.arity(1)?;
            Ok(DeleteConfirm { chat_id: p.i64(0)? })
        }
        id if id.starts_with("staff_edit_field_") => {
            let field = match id {
                "staff_edit_field_name" => StaffField::Name,
                "staff_edit_field_surname" => StaffField::Surname,
                "staff_edit_field_nickname" => StaffField::Nickname,
                "staff_edit_field_phone" => StaffField::Phone,
                "staff_edit_field_card_number" => StaffField::CardNumber,
                "staff_edit_field_role" => StaffField::Role,
                other => return Err(Error::UnknownCommand(other.to_string())),
            };
            p.arity(1)?;
            Ok(EditField { field, chat_id: p.i64(0)? })
        }
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

fn decode_stats(raw: &RawCommand) -> Result<StatsCommand> {
    use StatsCommand::*;

    let p = Params::new(raw, Menu::StatsMenu);
    match raw.identifier.as_str() {
        "stats_menu" => Ok(StatsCommand::Menu),
        "stats_basic_periods" => Ok(BasicPeriods),
        "stats_get_today" => Ok(GetPeriod(StatsPeriod::Today)),
        "stats_get_yesterday" => Ok(GetPeriod(StatsPeriod::Yesterday)),
        "stats_get_current_week" => Ok(GetPeriod(StatsPeriod::CurrentWeek)),
        "stats_get_current_month" => Ok(GetPeriod(StatsPeriod::CurrentMonth)),
        "stats_get_last_week" => Ok(GetPeriod(StatsPeriod::LastWeek)),
        "stats_get_last_month" => Ok(GetPeriod(StatsPeriod::LastMonth)),
        "stats_select_custom_date" => Ok(SelectCustomDate),
        "stats_select_custom_period" => Ok(SelectCustomPeriod),
        // The context slug may itself contain the delimiter (e.g.
        // "custom_date"), so numeric parts are taken from the right and
        // whatever precedes them is rejoined into the context.
        "stats_select_month" => {
            let (context, nums) = split_context(&p, 2)?;
            let year = nums[0].parse::<i32>().map_err(|_| p.err("bad year"))?;
            let month: u32 = nums[1].parse().map_err(|_| p.err("bad month"))?;
            if !(1..=12).contains(&month) {
                return Err(p.err(format!("month out of range: {month}")));
            }
            Ok(SelectMonth { context, year, month })
        }
        "stats_select_day" => {
            // The handler needs a real calendar date, so validate it here.
            let (context, nums) = split_context(&p, 3)?;
            let year = nums[0].parse::<i32>().map_err(|_| p.err("bad year"))?;
            let month: u32 = nums[1].parse().map_err(|_| p.err("bad month"))?;
            let day: u32 = nums[2].parse().map_err(|_| p.err("bad day"))?;
            let date = chrono::NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| p.err(format!("no such date: {year}-{month}-{day}")))?;
            Ok(SelectDay { context, date })
        }
        "stats_year_nav" => {
            let (context, nums) = split_context(&p, 1)?;
            let year = nums[0].parse::<i32>().map_err(|_| p.err("bad year"))?;
            Ok(YearNav { context, year })
        }
        "send_excel_menu" => Ok(ExcelMenu),
        id if id.starts_with("excel_generate_") => Ok(ExcelGenerate {
            report: id.trim_start_matches("excel_generate_").to_string(),
        }),
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

/// Split trailing numeric-ish params off, rejoining the leading tokens into
/// one context string. Errors when fewer than `trailing` params are present
/// or the context would be empty.
fn split_context(p: &Params<'_>, trailing: usize) -> Result<(String, Vec<String>)> {
    let params = &p.raw.params;
    if params.len() <= trailing {
        return Err(p.err(format!(
            "expected a context plus {trailing} value(s), got {} parameter(s)",
            params.len()
        )));
    }
    let split = params.len() - trailing;
    let context = params[..split].join("_");
    Ok((context, params[split..].to_vec()))
}

fn decode_block(raw: &RawCommand) -> Result<BlockCommand> {
    use BlockCommand::*;

    let p = Params::new(raw, Menu::BlockUserMenu);
    match raw.identifier.as_str() {
        "block_user_menu" => Ok(BlockCommand::Menu),
        "block_user_list_prompt" => Ok(ListForBlocking),
        "unblock_user_list_prompt" => Ok(ListForUnblocking),
        "block_user_info" => {
            p.arity(1)?;
            Ok(Info { chat_id: p.i64(0)? })
        }
        "block_user_reason_prompt" => {
            p.arity(1)?;
            Ok(ReasonPrompt { chat_id: p.i64(0)? })
        }
        "block_user_final" => {
            p.arity(1)?;
            Ok(BlockFinal { chat_id: p.i64(0)? })
        }
        "unblock_user_info" => {
            p.arity(1)?;
            Ok(UnblockInfo { chat_id: p.i64(0)? })
        }
        "unblock_user_final" => {
            p.arity(1)?;
            Ok(UnblockFinal { chat_id: p.i64(0)? })
        }
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

fn decode_info(raw: &RawCommand) -> Result<InfoCommand> {
    use InfoCommand::*;

    let p = Params::new(raw, Menu::Main);
    match raw.identifier.as_str() {
        "invite_friend" => Ok(InviteFriend),
        "contact_operator" => Ok(ContactOperator),
        "contact_chat" => Ok(ContactChat),
        "contact_phone_options" => Ok(ContactPhoneOptions),
        "phone_action_request_call" => Ok(RequestCall),
        "phone_action_call_self" => Ok(CallSelf),
        "referral_link" => Ok(ReferralLink),
        "referral_qr" => Ok(ReferralQr),
        "referral_my" => Ok(ReferralMy),
        "referral_details" => {
            let p = Params::new(raw, Menu::ReferralMy);
            p.arity(1)?;
            Ok(ReferralDetails { referral_id: p.i64(0)? })
        }
        "request_referral_payout" => Ok(RequestReferralPayout),
        "view_chat_history" => {
            p.arity(1)?;
            Ok(ViewChatHistory { chat_id: p.i64(0)? })
        }
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

fn decode_salary(raw: &RawCommand) -> Result<SalaryCommand> {
    use SalaryCommand::*;

    let p = Params::new(raw, Menu::MySalary);
    match raw.identifier.as_str() {
        "my_salary" => Ok(SalaryCommand::Menu),
        "my_salary_owed" => {
            p.arity(1)?;
            Ok(Owed { page: p.u32(0)? })
        }
        "my_salary_earned_stats" => {
            p.arity(1)?;
            Ok(EarnedStats { page: p.u32(0)? })
        }
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

fn decode_owner_cash(raw: &RawCommand) -> Result<OwnerCashCommand> {
    use OwnerCashCommand::*;

    let p = Params::new(raw, Menu::OwnerCashMenu);
    match raw.identifier.as_str() {
        "owner_cash_main" => Ok(OwnerCashCommand::Menu),
        "owner_staff_payout" => Ok(StaffPayoutMenu),
        "owner_staff_payout_page" => {
            p.arity(1)?;
            Ok(StaffPayoutPage { page: p.u32(0)? })
        }
        "owner_staff_payout_select" => {
            p.arity(1)?;
            Ok(StaffPayoutSelect { chat_id: p.i64(0)? })
        }
        "owner_staff_payout_confirm" => {
            p.arity(1)?;
            Ok(StaffPayoutConfirm { chat_id: p.i64(0)? })
        }
        "owner_financials" => Ok(FinancialsMenu),
        "owner_financials_date" => {
            p.arity(1)?;
            Ok(FinancialsDate { date: p.str(0)?.to_string() })
        }
        "owner_financials_view" => {
            p.arity(1)?;
            Ok(FinancialsView { settlement_id: p.i64(0)? })
        }
        "owner_financials_edit_field" => {
            p.arity(2)?;
            Ok(FinancialsEditField {
                field: p.str(0)?.to_string(),
                settlement_id: p.i64(1)?,
            })
        }
        "owner_financials_save_settlement" => {
            p.arity(1)?;
            Ok(FinancialsSaveSettlement { settlement_id: p.i64(0)? })
        }
        "owner_cash_actual_list" => {
            p.arity(1)?;
            Ok(ActualList { page: p.u32(0)? })
        }
        "owner_cash_settled_list" => {
            p.arity(1)?;
            Ok(SettledList { page: p.u32(0)? })
        }
        "owner_cash_mark_paid" => {
            p.arity(1)?;
            Ok(MarkPaid { settlement_id: p.i64(0)? })
        }
        "owner_cash_mark_unpaid" => {
            p.arity(1)?;
            Ok(MarkUnpaid { settlement_id: p.i64(0)? })
        }
        "owner_cash_view_driver_settlements" => {
            p.arity(3)?;
            let view = SettlementView::parse(p.str(1)?)
                .ok_or_else(|| p.err(format!("unknown view kind: {:?}", p.str(1)?)))?;
            Ok(ViewDriverSettlements { driver: p.i64(0)?, view, page: p.u32(2)? })
        }
        "owner_cash_edit_settlement" => {
            p.arity(1)?;
            Ok(EditSettlement { settlement_id: p.i64(0)? })
        }
        "owner_cash_mark_salary_paid" => {
            p.arity(1)?;
            Ok(MarkSalaryPaid { settlement_id: p.i64(0)? })
        }
        "owner_cash_mark_salary_unpaid" => {
            p.arity(1)?;
            Ok(MarkSalaryUnpaid { settlement_id: p.i64(0)? })
        }
        "owner_mark_all_salary_paid" => {
            p.arity(1)?;
            Ok(MarkAllSalaryPaid { driver: p.i64(0)? })
        }
        "owner_mark_all_deposited" => {
            p.arity(1)?;
            Ok(MarkAllDeposited { driver: p.i64(0)? })
        }
        "operator_view_settlement" => {
            p.arity(1)?;
            Ok(OperatorViewSettlement { settlement_id: p.i64(0)? })
        }
        "settlement_approve" => {
            p.arity(1)?;
            Ok(Approve { settlement_id: p.i64(0)? })
        }
        "settlement_reject" => {
            p.arity(1)?;
            Ok(Reject { settlement_id: p.i64(0)? })
        }
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

fn decode_settle(raw: &RawCommand) -> Result<SettleCommand> {
    use SettleCommand::*;

    match raw.identifier.as_str() {
        "settle_start" => Ok(Start),
        "settle_menu" => Ok(SettleCommand::Menu),
        "settle_set_fuel" => Ok(SetFuel),
        "settle_expenses_menu" => Ok(ExpensesMenu),
        "settle_add_expense" => Ok(AddExpense),
        "settle_edit_expense" => {
            let p = Params::new(raw, Menu::SettleExpensesMenu);
            p.arity(1)?;
            Ok(EditExpense { index: p.usize(0)? })
        }
        "settle_delete_expense_ask" => {
            let p = Params::new(raw, Menu::SettleExpensesMenu);
            p.arity(1)?;
            Ok(DeleteExpenseAsk { index: p.usize(0)? })
        }
        "settle_delete_expense" => {
            let p = Params::new(raw, Menu::SettleExpensesMenu);
            p.arity(1)?;
            Ok(DeleteExpense { index: p.usize(0)? })
        }
        "settle_loaders_menu" => Ok(LoadersMenu),
        "settle_add_loader" => Ok(AddLoader),
        "settle_edit_loader" => {
            let p = Params::new(raw, Menu::SettleLoadersMenu);
            p.arity(1)?;
            Ok(EditLoader { index: p.usize(0)? })
        }
        "settle_delete_loader_ask" => {
            let p = Params::new(raw, Menu::SettleLoadersMenu);
            p.arity(1)?;
            Ok(DeleteLoaderAsk { index: p.usize(0)? })
        }
        "settle_delete_loader" => {
            let p = Params::new(raw, Menu::SettleLoadersMenu);
            p.arity(1)?;
            Ok(DeleteLoader { index: p.usize(0)? })
        }
        "settle_save" => Ok(Save),
        "settle_cancel" => Ok(Cancel),
        other => Err(Error::UnknownCommand(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(payload: &str) -> RawCommand {
        resolve(payload).unwrap()
    }

    #[test]
    fn empty_payload_is_malformed() {
        assert!(matches!(resolve(""), Err(Error::MalformedPayload)));
    }

    #[test]
    fn resolution_is_deterministic() {
        for payload in [
            "noop",
            "staff_edit_field_role_123456789",
            "back_to_owner_cash_actual_list_2",
            "totally_unknown_thing_1_2",
        ] {
            assert_eq!(resolve(payload).unwrap(), resolve(payload).unwrap());
        }
    }

    #[test]
    fn exact_match_wins_with_empty_params() {
        let r = raw("staff_menu");
        assert_eq!(r.identifier, "staff_menu");
        assert!(r.params.is_empty());
    }

    #[test]
    fn exact_match_beats_prefix_signature() {
        // "select_date_asap" is registered exact, and the "select_date"
        // signature would otherwise claim it with params ["asap"].
        let r = raw("select_date_asap");
        assert_eq!(r.identifier, "select_date_asap");
        assert!(r.params.is_empty());

        let r = raw("select_date_2");
        assert_eq!(r.identifier, "select_date");
        assert_eq!(r.params, vec!["2"]);
    }

    #[test]
    fn exact_match_beats_back_marker() {
        // Registered as a complete command even though it starts with the
        // navigation marker.
        let r = raw("back_to_main_confirm_cancel_order");
        assert_eq!(r.identifier, "back_to_main_confirm_cancel_order");
        assert!(r.params.is_empty());
    }

    #[test]
    fn back_marker_splits_remainder() {
        let r = raw("back_to_staff_info_123");
        assert_eq!(r.identifier, "back");
        assert_eq!(r.params, vec!["staff", "info", "123"]);

        let r = raw("back_to_");
        assert_eq!(r.identifier, "back");
        assert!(r.params.is_empty());
    }

    #[test]
    fn most_specific_signature_wins() {
        let r = raw("owner_cash_mark_salary_paid_777");
        assert_eq!(r.identifier, "owner_cash_mark_salary_paid");
        assert_eq!(r.params, vec!["777"]);

        // 4-part signature shares the 3-part one's textual prefix; the longer
        // one must win for its own payloads and lose for the shorter's.
        let r = raw("settle_delete_expense_ask_2");
        assert_eq!(r.identifier, "settle_delete_expense_ask");
        assert_eq!(r.params, vec!["2"]);

        let r = raw("settle_delete_expense_2");
        assert_eq!(r.identifier, "settle_delete_expense");
        assert_eq!(r.params, vec!["2"]);
    }

    #[test]
    fn unknown_payload_falls_back_to_first_token() {
        let r = raw("frobnicate_1_2");
        assert_eq!(r.identifier, "frobnicate");
        assert_eq!(r.params, vec!["1", "2"]);
    }

    #[test]
    fn signature_part_counts_match_their_identifiers() {
        for &(id, parts) in PREFIX_SIGNATURES {
            assert_eq!(
                id.split(DELIMITER).count(),
                parts,
                "part count mismatch for {id}"
            );
        }
    }

    #[test]
    fn stats_select_day_builds_a_calendar_date() {
        let cmd = Command::decode(&raw("stats_select_day_custom_date_2025_6_15")).unwrap();
        match cmd {
            Command::Stats(StatsCommand::SelectDay { context, date }) => {
                assert_eq!(context, "custom_date");
                assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_id_is_a_parameter_error_with_recovery() {
        let err = Command::decode(&raw("staff_info_notanumber")).unwrap_err();
        match err {
            Error::InvalidParameter { identifier, recover, .. } => {
                assert_eq!(identifier, "staff_info");
                assert_eq!(recover, Menu::StaffMenu);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn impossible_date_is_rejected_at_decode() {
        let err = Command::decode(&raw("stats_select_day_custom_date_2025_2_30")).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn staff_edit_field_role_decodes_target_chat() {
        let cmd = Command::decode(&raw("staff_edit_field_role_123456789")).unwrap();
        assert_eq!(
            cmd,
            Command::Staff(StaffCommand::EditField {
                field: StaffField::Role,
                chat_id: 123456789,
            })
        );
    }

    #[test]
    fn driver_settlement_back_target_decodes_view_kind() {
        let cmd =
            Command::decode(&raw("owner_cash_view_driver_settlements_42_actual_3")).unwrap();
        assert_eq!(
            cmd,
            Command::OwnerCash(OwnerCashCommand::ViewDriverSettlements {
                driver: 42,
                view: SettlementView::Actual,
                page: 3,
            })
        );
    }

    #[test]
    fn unknown_identifier_surfaces_as_unknown_command() {
        let err = Command::decode(&raw("frobnicate_1")).unwrap_err();
        assert!(matches!(err, Error::UnknownCommand(id) if id == "frobnicate"));
    }
}

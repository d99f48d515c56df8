//! Concrete menu renderers.
//!
//! This is the registry the navigation layer points into: every `Menu`
//! variant maps to one screen composed here. Screens edit the active menu
//! message in place and fall back to sending a fresh message when the edit
//! target is gone.

use std::sync::Arc;

use async_trait::async_trait;

use haulbot_core::{
    command::SettlementView,
    domain::{ChatId, MessageId, MessageRef, Role, UserRecord},
    messaging::{
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    navigation::Menu,
    ports::{Orders, ScreenPort, Settlements},
    Result,
};

pub struct TelegramScreens {
    messenger: Arc<dyn MessagingPort>,
    orders: Arc<dyn Orders>,
    settlements: Arc<dyn Settlements>,
}

fn btn(label: &str, data: impl Into<String>) -> InlineButton {
    InlineButton::new(label, data.into())
}

fn back(destination: &str) -> InlineButton {
    btn("⬅️ Back", format!("back_to_{destination}"))
}

impl TelegramScreens {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        orders: Arc<dyn Orders>,
        settlements: Arc<dyn Settlements>,
    ) -> Self {
        Self { messenger, orders, settlements }
    }

    async fn compose(&self, user: &UserRecord, menu: &Menu) -> Result<(String, InlineKeyboard)> {
        let screen = match menu {
            Menu::Main => self.main_menu(user),
            Menu::AccessDenied => (
                "❌ You do not have access to this action.".to_string(),
                InlineKeyboard::one_per_row(vec![btn("🏠 Main menu", "back_to_main")]),
            ),
            Menu::UnknownCommand => (
                "Unknown command.".to_string(),
                InlineKeyboard::one_per_row(vec![btn("🏠 Main menu", "back_to_main")]),
            ),
            Menu::InvalidRequest => (
                "❌ Invalid request.".to_string(),
                InlineKeyboard::one_per_row(vec![btn("🏠 Main menu", "back_to_main")]),
            ),
            Menu::ErrorNotice { text } => (
                format!("⚠️ {text}"),
                InlineKeyboard::one_per_row(vec![btn("🏠 Main menu", "back_to_main")]),
            ),
            Menu::ConfirmCancelOrder { resume_message } => (
                "Cancel this order and return to the main menu?\n\n⚠️ Everything entered so far will be lost.".to_string(),
                InlineKeyboard::new(vec![vec![
                    btn("✅ Yes, cancel", "back_to_main_confirmed_cancel_final"),
                    btn("❌ No, continue", format!("resume_order_creation_{}", resume_message.0)),
                ]]),
            ),
            Menu::ConfirmCancelSettlement { resume_message } => (
                "Discard this report and return to the main menu?\n\n⚠️ Everything entered so far will be lost.".to_string(),
                InlineKeyboard::new(vec![vec![
                    btn("✅ Yes, cancel", "back_to_main_confirmed_cancel_final"),
                    btn("❌ No, continue", format!("resume_order_creation_{}", resume_message.0)),
                ]]),
            ),
            Menu::CategoryMenu => (
                "What needs to be done?".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("🗑 Waste removal", "category_waste")],
                    vec![btn("🔨 Demolition", "category_demolition")],
                    vec![back("main")],
                ]),
            ),
            Menu::SubcategoryMenu { category } => self.subcategory_menu(category.as_deref()),
            Menu::DescriptionInput => (
                "Describe the job, or continue without a description.".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("➡️ Skip", "skip_order_description")],
                    vec![back("subcategory")],
                ]),
            ),
            Menu::NameInput => (
                "How should we address you?".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("👤 Use profile name", "use_profile_name_for_order")],
                    vec![btn("✏️ Enter another name", "enter_another_name_for_order")],
                    vec![back("description")],
                ]),
            ),
            Menu::DateSelection { page } => self.date_menu(*page),
            Menu::TimeSelection => self.time_menu(),
            Menu::MinuteSelection { hour } => self.minute_menu(*hour),
            Menu::PhoneInput => (
                "Send a phone number for the order, or confirm the one on file.".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("✅ Keep current number", "confirm_order_phone")],
                    vec![btn("✏️ Change number", "change_order_phone")],
                    vec![back("time")],
                ]),
            ),
            Menu::AddressInput => (
                "Send the address as text or share a location.".to_string(),
                InlineKeyboard::one_per_row(vec![back("phone")]),
            ),
            Menu::PhotoInput => (
                "Attach photos or videos of the job (optional).".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("✅ Done", "finish_photo_upload")],
                    vec![btn("👀 View uploaded", "view_uploaded_media")],
                    vec![btn("🔄 Reset", "reset_photo_upload"), btn("➡️ Skip", "skip_photo_initial")],
                    vec![back("address")],
                ]),
            ),
            Menu::PaymentSelection => (
                "When would you like to pay?".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("💳 Pay now", "payment_now")],
                    vec![btn("🕓 Pay on completion", "payment_later")],
                    vec![back("photo")],
                ]),
            ),
            Menu::OrderConfirm => (
                "Please check the order and confirm.".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("✅ Confirm", "confirm_order_final_0")],
                    vec![btn("✏️ Edit", "edit_order_0")],
                    vec![back("payment")],
                ]),
            ),
            Menu::OrderEditMenu => (
                "Which field do you want to change?".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("Description", "edit_field_description_0"), btn("Name", "edit_field_name_0")],
                    vec![btn("Date", "edit_field_date_0"), btn("Time", "edit_field_time_0")],
                    vec![btn("Phone", "edit_field_phone_0"), btn("Address", "edit_field_address_0")],
                    vec![btn("Media", "edit_field_media_0"), btn("Payment", "edit_field_payment_0")],
                    vec![back("confirm")],
                ]),
            ),
            Menu::OpConfirmOptions { order_id } => {
                let id = order_id.unwrap_or(0);
                (
                    format!("Order #{id}: create it as is, or add details first?"),
                    InlineKeyboard::new(vec![
                        vec![btn("✅ Create", format!("op_confirm_simple_{id}"))],
                        vec![btn("💰 Set cost", format!("op_confirm_set_cost_{id}"))],
                        vec![btn("👷 Assign executors", format!("op_confirm_assign_exec_{id}"))],
                        vec![btn("🏁 Finalize", format!("op_finalize_creation_{id}"))],
                        vec![back("main")],
                    ]),
                )
            }
            Menu::OpCostInput { order_id } => {
                let id = order_id.unwrap_or(0);
                (
                    format!("Send the cost for order #{id} as a number, or skip."),
                    InlineKeyboard::new(vec![
                        vec![btn("➡️ Skip", format!("op_skip_cost_{id}"))],
                        vec![back(&format!("op_confirm_options_{id}"))],
                    ]),
                )
            }
            Menu::OpAssignExec { order_id } => {
                let id = order_id.unwrap_or(0);
                (
                    format!("Assign executors to order #{id}."),
                    InlineKeyboard::new(vec![
                        vec![btn("➡️ Skip", format!("op_skip_assign_exec_{id}"))],
                        vec![back(&format!("op_cost_input_{id}"))],
                    ]),
                )
            }
            Menu::ManageOrders => (
                "Order management".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("🆕 New", "operator_orders_new_0")],
                    vec![btn("⏳ Awaiting confirmation", "operator_orders_awaiting_confirmation_0")],
                    vec![btn("🚚 In progress", "operator_orders_in_progress_0")],
                    vec![btn("✅ Completed", "operator_orders_completed_0"), btn("🚫 Canceled", "operator_orders_canceled_0")],
                    vec![back("main")],
                ]),
            ),
            Menu::ViewOrder { order_id } => self.view_order(*order_id).await?,
            Menu::OperatorOrderList { list, page } => (
                format!("Orders: {list}, page {}", page + 1),
                InlineKeyboard::new(vec![
                    vec![
                        btn("⬅️", format!("operator_orders_{list}_{}", page.saturating_sub(1))),
                        btn("➡️", format!("operator_orders_{list}_{}", page + 1)),
                    ],
                    vec![back("manage_orders")],
                ]),
            ),
            Menu::MyOrders { page } => (
                format!("Your orders, page {}", page + 1),
                InlineKeyboard::new(vec![
                    vec![
                        btn("⬅️", format!("my_orders_page_{}", page.saturating_sub(1))),
                        btn("➡️", format!("my_orders_page_{}", page + 1)),
                    ],
                    vec![back("main")],
                ]),
            ),
            Menu::StaffMenu => (
                "Staff management".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("📋 Staff list", "staff_list_menu")],
                    vec![btn("➕ Add employee", "staff_add_prompt_name")],
                    vec![back("main")],
                ]),
            ),
            Menu::StaffListMenu => (
                "Staff by role".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("🚚 Drivers", "staff_list_by_role_driver_0")],
                    vec![btn("💪 Loaders", "staff_list_by_role_loader_0")],
                    vec![btn("🎧 Operators", "staff_list_by_role_operator_0")],
                    vec![back("staff_menu")],
                ]),
            ),
            Menu::StaffListByRole { role, page } => (
                format!("Staff: {role}, page {}", page + 1),
                InlineKeyboard::new(vec![
                    vec![
                        btn("⬅️", format!("staff_list_by_role_{role}_{}", page.saturating_sub(1))),
                        btn("➡️", format!("staff_list_by_role_{role}_{}", page + 1)),
                    ],
                    vec![back("staff_list_menu")],
                ]),
            ),
            Menu::StaffInfo { chat_id } => (
                format!("Employee {chat_id}"),
                InlineKeyboard::new(vec![
                    vec![btn("✏️ Edit", format!("staff_edit_menu_{chat_id}"))],
                    vec![
                        btn("🚫 Block", format!("staff_block_reason_prompt_{chat_id}")),
                        btn("🗑 Delete", format!("staff_delete_confirm_{chat_id}")),
                    ],
                    vec![back("staff_list_menu")],
                ]),
            ),
            Menu::StaffEditMenu { chat_id } => (
                format!("Edit employee {chat_id}"),
                InlineKeyboard::new(vec![
                    vec![
                        btn("Name", format!("staff_edit_field_name_{chat_id}")),
                        btn("Surname", format!("staff_edit_field_surname_{chat_id}")),
                    ],
                    vec![
                        btn("Nickname", format!("staff_edit_field_nickname_{chat_id}")),
                        btn("Phone", format!("staff_edit_field_phone_{chat_id}")),
                    ],
                    vec![
                        btn("Card", format!("staff_edit_field_card_number_{chat_id}")),
                        btn("Role", format!("staff_edit_field_role_{chat_id}")),
                    ],
                    vec![back(&format!("staff_info_{chat_id}"))],
                ]),
            ),
            Menu::StaffAddPrompt { step } => (
                staff_prompt_text(step).to_string(),
                InlineKeyboard::one_per_row(vec![back("staff_menu")]),
            ),
            Menu::StatsMenu => (
                "Statistics".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("📆 Fixed periods", "stats_basic_periods")],
                    vec![btn("📅 Custom date", "stats_select_custom_date")],
                    vec![btn("📅 Custom period", "stats_select_custom_period")],
                    vec![back("main")],
                ]),
            ),
            Menu::StatsBasicPeriods => (
                "Pick a period".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("Today", "stats_get_today"), btn("Yesterday", "stats_get_yesterday")],
                    vec![btn("This week", "stats_get_current_week"), btn("This month", "stats_get_current_month")],
                    vec![btn("Last week", "stats_get_last_week"), btn("Last month", "stats_get_last_month")],
                    vec![back("stats_menu")],
                ]),
            ),
            Menu::StatsResult { label } => (
                format!("📊 Statistics for {label}"),
                InlineKeyboard::one_per_row(vec![back("stats_menu")]),
            ),
            Menu::StatsYearNav { context, year } => (
                format!("Pick a month of {year}"),
                InlineKeyboard::new(vec![
                    (1..=6u32)
                        .map(|m| btn(&m.to_string(), format!("stats_select_month_{context}_{year}_{m}")))
                        .collect(),
                    (7..=12u32)
                        .map(|m| btn(&m.to_string(), format!("stats_select_month_{context}_{year}_{m}")))
                        .collect(),
                    vec![
                        btn("«", format!("stats_year_nav_{context}_{}", year - 1)),
                        btn("»", format!("stats_year_nav_{context}_{}", year + 1)),
                    ],
                    vec![back("stats_menu")],
                ]),
            ),
            Menu::StatsMonthDays { context, year, month } => (
                format!("Pick a day of {year}-{month:02}"),
                InlineKeyboard::new(vec![
                    (1..=10u32)
                        .map(|d| btn(&d.to_string(), format!("stats_select_day_{context}_{year}_{month}_{d}")))
                        .collect(),
                    (11..=20u32)
                        .map(|d| btn(&d.to_string(), format!("stats_select_day_{context}_{year}_{month}_{d}")))
                        .collect(),
                    (21..=31u32)
                        .map(|d| btn(&d.to_string(), format!("stats_select_day_{context}_{year}_{month}_{d}")))
                        .collect(),
                    vec![back("stats_menu")],
                ]),
            ),
            Menu::ExcelMenu => (
                "Which export do you need?".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("📦 Orders", "excel_generate_orders")],
                    vec![btn("🤝 Referrals", "excel_generate_referrals")],
                    vec![btn("💰 Salaries", "excel_generate_salaries")],
                    vec![back("main")],
                ]),
            ),
            Menu::ExcelQueued { report } => (
                format!("📄 Generating the {report} export, it will arrive shortly."),
                InlineKeyboard::new(vec![]),
            ),
            Menu::BlockUserMenu => (
                "User blocking".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("🚫 Block a user", "block_user_list_prompt")],
                    vec![btn("✅ Unblock a user", "unblock_user_list_prompt")],
                    vec![back("main")],
                ]),
            ),
            Menu::BlockUserList => (
                "Pick a user to block.".to_string(),
                InlineKeyboard::one_per_row(vec![back("block_user_menu")]),
            ),
            Menu::UnblockUserList => (
                "Pick a user to unblock.".to_string(),
                InlineKeyboard::one_per_row(vec![back("block_user_menu")]),
            ),
            Menu::BlockUserInfo { chat_id } => (
                format!("Block user {chat_id}?"),
                InlineKeyboard::new(vec![
                    vec![btn("🚫 Block", format!("block_user_reason_prompt_{chat_id}"))],
                    vec![back("block_user_list_prompt")],
                ]),
            ),
            Menu::UnblockUserInfo { chat_id } => (
                format!("Unblock user {chat_id}?"),
                InlineKeyboard::new(vec![
                    vec![btn("✅ Unblock", format!("unblock_user_final_{chat_id}"))],
                    vec![back("unblock_user_list_prompt")],
                ]),
            ),
            Menu::InviteFriend => (
                "Invite a friend and earn a referral bonus.".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("🔗 My link", "referral_link"), btn("🔲 QR code", "referral_qr")],
                    vec![btn("👥 My referrals", "referral_my")],
                    vec![back("main")],
                ]),
            ),
            Menu::ContactOperator => (
                "How would you like to reach us?".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("💬 Chat", "contact_chat")],
                    vec![btn("📞 Phone", "contact_phone_options")],
                    vec![back("main")],
                ]),
            ),
            Menu::ContactChat => (
                "Type your message, an operator will reply here.".to_string(),
                InlineKeyboard::one_per_row(vec![back("contact_operator")]),
            ),
            Menu::ContactPhoneOptions => (
                "Phone options".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("📲 Request a call", "phone_action_request_call")],
                    vec![back("contact_operator")],
                ]),
            ),
            Menu::ReferralMy => (
                "Your referrals".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("💸 Request payout", "request_referral_payout")],
                    vec![back("invite_friend")],
                ]),
            ),
            Menu::ReferralLink => (
                "Your personal invite link is below.".to_string(),
                InlineKeyboard::one_per_row(vec![back("invite_friend")]),
            ),
            Menu::ReferralQr => (
                "Your invite QR code.".to_string(),
                InlineKeyboard::one_per_row(vec![back("invite_friend")]),
            ),
            Menu::ReferralDetails { referral_id } => (
                format!("Referral #{referral_id}"),
                InlineKeyboard::one_per_row(vec![back("referral_my")]),
            ),
            Menu::ChatHistory { chat_id } => (
                format!("Chat history with {chat_id}"),
                InlineKeyboard::one_per_row(vec![back("main")]),
            ),
            Menu::MySalary => (
                "Your salary".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("💵 Owed to you", "my_salary_owed_0")],
                    vec![btn("📈 Earned", "my_salary_earned_stats_0")],
                    vec![back("main")],
                ]),
            ),
            Menu::SalaryOwed { page } => (
                format!("Owed to you, page {}", page + 1),
                InlineKeyboard::new(vec![
                    vec![
                        btn("⬅️", format!("my_salary_owed_{}", page.saturating_sub(1))),
                        btn("➡️", format!("my_salary_owed_{}", page + 1)),
                    ],
                    vec![back("my_salary")],
                ]),
            ),
            Menu::SalaryEarned { page } => (
                format!("Earned, page {}", page + 1),
                InlineKeyboard::new(vec![
                    vec![
                        btn("⬅️", format!("my_salary_earned_stats_{}", page.saturating_sub(1))),
                        btn("➡️", format!("my_salary_earned_stats_{}", page + 1)),
                    ],
                    vec![back("my_salary")],
                ]),
            ),
            Menu::OwnerStaffPayout { page } => (
                format!("Staff payouts, page {}", page + 1),
                InlineKeyboard::new(vec![
                    vec![
                        btn("⬅️", format!("owner_staff_payout_page_{}", page.saturating_sub(1))),
                        btn("➡️", format!("owner_staff_payout_page_{}", page + 1)),
                    ],
                    vec![back("main")],
                ]),
            ),
            Menu::OwnerFinancials => (
                "Financial reports".to_string(),
                InlineKeyboard::one_per_row(vec![back("main")]),
            ),
            Menu::OwnerCashMenu => (
                "Cash management".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("📥 Outstanding", "owner_cash_actual_list_0")],
                    vec![btn("📤 Settled", "owner_cash_settled_list_0")],
                    vec![back("main")],
                ]),
            ),
            Menu::OwnerCashActualList { page } => {
                self.cash_list(SettlementView::Actual, *page)
            }
            Menu::OwnerCashSettledList { page } => {
                self.cash_list(SettlementView::Settled, *page)
            }
            Menu::OwnerDriverSettlements { driver, view, page } => (
                format!("Driver {driver}: {} settlements, page {}", view.as_str(), page + 1),
                InlineKeyboard::new(vec![
                    vec![btn(
                        "💰 Mark all salaries paid",
                        format!("owner_mark_all_salary_paid_{driver}"),
                    )],
                    vec![btn(
                        "🏦 Mark all money deposited",
                        format!("owner_mark_all_deposited_{driver}"),
                    )],
                    vec![back("owner_cash_main")],
                ]),
            ),
            Menu::SettlementDetail { settlement_id } => {
                self.settlement_detail(*settlement_id).await?
            }
            Menu::SettleMenu => (
                "Shift report".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("⛽ Fuel", "settle_set_fuel")],
                    vec![btn("🧾 Other expenses", "settle_expenses_menu")],
                    vec![btn("💪 Loaders", "settle_loaders_menu")],
                    vec![btn("💾 Save report", "settle_save")],
                    vec![btn("🚫 Cancel", "settle_cancel")],
                ]),
            ),
            Menu::SettleFuelPrompt => (
                "⛽ Send the fuel amount as a number.".to_string(),
                InlineKeyboard::one_per_row(vec![back("settle_menu")]),
            ),
            Menu::SettleExpensesMenu => (
                "Other expenses".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("➕ Add expense", "settle_add_expense")],
                    vec![back("settle_menu")],
                ]),
            ),
            Menu::SettleExpenseDescriptionPrompt => (
                "📝 What was the expense for?".to_string(),
                InlineKeyboard::one_per_row(vec![back("settle_expenses_menu")]),
            ),
            Menu::SettleExpenseAmountPrompt => (
                "💵 Send the amount as a number.".to_string(),
                InlineKeyboard::one_per_row(vec![back("settle_expenses_menu")]),
            ),
            Menu::SettleConfirmDeleteExpense { index } => (
                "Delete this expense?".to_string(),
                InlineKeyboard::new(vec![vec![
                    btn("✅ Delete", format!("settle_delete_expense_{index}")),
                    btn("❌ Keep", "settle_expenses_menu"),
                ]]),
            ),
            Menu::SettleLoadersMenu => (
                "Loader payments".to_string(),
                InlineKeyboard::new(vec![
                    vec![btn("➕ Add loader", "settle_add_loader")],
                    vec![back("settle_menu")],
                ]),
            ),
            Menu::SettleLoaderNamePrompt => (
                "👤 Who was the loader?".to_string(),
                InlineKeyboard::one_per_row(vec![back("settle_loaders_menu")]),
            ),
            Menu::SettleLoaderSalaryPrompt => (
                "💵 Send the loader's pay as a number.".to_string(),
                InlineKeyboard::one_per_row(vec![back("settle_loaders_menu")]),
            ),
            Menu::SettleConfirmDeleteLoader { index } => (
                "Delete this loader entry?".to_string(),
                InlineKeyboard::new(vec![vec![
                    btn("✅ Delete", format!("settle_delete_loader_{index}")),
                    btn("❌ Keep", "settle_loaders_menu"),
                ]]),
            ),
        };
        Ok(screen)
    }

    fn main_menu(&self, user: &UserRecord) -> (String, InlineKeyboard) {
        let mut rows: Vec<Vec<InlineButton>> = Vec::new();

        match user.role {
            Role::User | Role::Loader => {
                rows.push(vec![btn("📦 My orders", "my_orders_page_0")]);
            }
            Role::Driver => {
                rows.push(vec![btn("🧾 Shift report", "settle_start")]);
                rows.push(vec![btn("➕ New order", "driver_create_order")]);
            }
            Role::Operator | Role::SeniorOperator | Role::Owner => {
                rows.push(vec![btn("➕ New order", "op_create_new_order")]);
                rows.push(vec![btn("📦 Orders", "manage_orders")]);
            }
        }
        if user.role.is_staff() {
            rows.push(vec![btn("💰 My salary", "my_salary")]);
        }
        if user.role.is_at_least(Role::Operator) {
            rows.push(vec![btn("🚫 Blocking", "block_user_menu")]);
        }
        if user.role.is_at_least(Role::SeniorOperator) {
            rows.push(vec![btn("👷 Staff", "staff_menu"), btn("📊 Statistics", "stats_menu")]);
            rows.push(vec![btn("📄 Exports", "send_excel_menu")]);
        }
        if user.role == Role::Owner {
            rows.push(vec![btn("🏦 Cash", "owner_cash_main"), btn("💸 Payouts", "owner_staff_payout")]);
        }
        rows.push(vec![btn("🤝 Invite a friend", "invite_friend")]);
        rows.push(vec![btn("📞 Contact us", "contact_operator")]);

        (
            format!("Hello, {}! What would you like to do?", user.first_name),
            InlineKeyboard::new(rows),
        )
    }

    fn subcategory_menu(&self, category: Option<&str>) -> (String, InlineKeyboard) {
        let rows = match category {
            Some("demolition") => vec![
                vec![btn("🧱 Walls", "subcategory_walls"), btn("🪵 Floors", "subcategory_floors")],
                vec![btn("🚿 Plumbing", "subcategory_plumbing"), btn("❓ Other", "subcategory_other")],
                vec![back("category")],
            ],
            _ => vec![
                vec![btn("🏗 Construction", "subcategory_construction"), btn("🛋 Household", "subcategory_household")],
                vec![btn("🔩 Metal", "subcategory_metal"), btn("🗑 Junk", "subcategory_junk")],
                vec![btn("🌿 Greenery", "subcategory_greenery"), btn("🛞 Tires", "subcategory_tires")],
                vec![back("category")],
            ],
        };
        ("Pick a subcategory.".to_string(), InlineKeyboard::new(rows))
    }

    fn date_menu(&self, page: u32) -> (String, InlineKeyboard) {
        let base = page * 7;
        let days: Vec<InlineButton> = (base..base + 7)
            .map(|offset| btn(&format!("+{offset}d"), format!("select_date_{offset}")))
            .collect();

        let mut rows = vec![vec![btn("🚀 As soon as possible", "select_date_asap")]];
        rows.extend(days.chunks(4).map(|c| c.to_vec()));
        rows.push(vec![
            btn("«", format!("date_page_{}", page.saturating_sub(1))),
            btn("»", format!("date_page_{}", page + 1)),
        ]);
        rows.push(vec![back("name")]);
        ("When should we arrive?".to_string(), InlineKeyboard::new(rows))
    }

    fn time_menu(&self) -> (String, InlineKeyboard) {
        let rows: Vec<Vec<InlineButton>> = (8..22u8)
            .collect::<Vec<_>>()
            .chunks(5)
            .map(|hours| {
                hours
                    .iter()
                    .map(|h| btn(&format!("{h:02}:00"), format!("select_hour_{h}")))
                    .collect()
            })
            .chain(std::iter::once(vec![back("date")]))
            .collect();
        ("Pick an hour.".to_string(), InlineKeyboard::new(rows))
    }

    fn minute_menu(&self, hour: u8) -> (String, InlineKeyboard) {
        let rows = vec![
            [0u8, 15, 30, 45]
                .iter()
                .map(|m| btn(&format!("{hour:02}:{m:02}"), format!("select_time_{hour:02}:{m:02}")))
                .collect(),
            vec![back("time")],
        ];
        ("Pick the minutes.".to_string(), InlineKeyboard::new(rows))
    }

    async fn view_order(&self, order_id: i64) -> Result<(String, InlineKeyboard)> {
        let status = self
            .orders
            .find(order_id)
            .await?
            .map(|o| format!("{:?}", o.status).to_lowercase())
            .unwrap_or_else(|| "unknown".to_string());
        Ok((
            format!("Order #{order_id} ({status})"),
            InlineKeyboard::new(vec![
                vec![btn("💰 Cost", format!("set_cost_{order_id}")), btn("👷 Executors", format!("assign_executors_{order_id}"))],
                vec![btn("✅ Done", format!("mark_order_done_{order_id}"))],
                vec![btn("🚫 Cancel", format!("cancel_order_operator_{order_id}"))],
                vec![back("manage_orders")],
            ]),
        ))
    }

    fn cash_list(&self, view: SettlementView, page: u32) -> (String, InlineKeyboard) {
        let slug = match view {
            SettlementView::Actual => "owner_cash_actual_list",
            SettlementView::Settled => "owner_cash_settled_list",
        };
        let title = match view {
            SettlementView::Actual => "Outstanding settlements",
            SettlementView::Settled => "Settled payments",
        };
        (
            format!("{title}, page {}", page + 1),
            InlineKeyboard::new(vec![
                vec![
                    btn("⬅️", format!("{slug}_{}", page.saturating_sub(1))),
                    btn("➡️", format!("{slug}_{}", page + 1)),
                ],
                vec![back("owner_cash_main")],
            ]),
        )
    }

    async fn settlement_detail(&self, settlement_id: i64) -> Result<(String, InlineKeyboard)> {
        let Some(record) = self.settlements.find(settlement_id).await? else {
            return Ok((
                format!("Settlement #{settlement_id} was not found."),
                InlineKeyboard::one_per_row(vec![back("owner_cash_main")]),
            ));
        };

        let text = format!(
            "Settlement #{settlement_id}\nRevenue: {:.2}\nFuel: {:.2}\nOther: {:.2}\nLoaders: {:.2}\nDriver salary: {:.2}\nTo cashier: {:.2}",
            record.revenue,
            record.fuel_expense,
            record.other_expenses.iter().map(|e| e.amount).sum::<f64>(),
            record.loader_payments.iter().map(|l| l.amount).sum::<f64>(),
            record.driver_salary,
            record.amount_to_cashier,
        );
        Ok((
            text,
            InlineKeyboard::new(vec![
                vec![
                    btn("✅ Approve", format!("settlement_approve_{settlement_id}")),
                    btn("🚫 Reject", format!("settlement_reject_{settlement_id}")),
                ],
                vec![
                    btn("💰 Salary paid", format!("owner_cash_mark_salary_paid_{settlement_id}")),
                    btn("🏦 Deposited", format!("owner_cash_mark_paid_{settlement_id}")),
                ],
                vec![back("owner_cash_main")],
            ]),
        ))
    }
}

fn staff_prompt_text(step: &str) -> &'static str {
    match step {
        "staff_add_name" => "👤 Send the employee's first name.",
        "staff_add_surname" => "👤 Send the employee's surname.",
        "staff_add_nickname" => "📛 Send a nickname, or '-' to skip.",
        "staff_add_phone" => "📱 Send the employee's phone number.",
        "staff_add_chat_id" => "🆔 Send the employee's Telegram chat id.",
        "staff_add_card_number" => "💳 Send the card number (16-19 digits), or '-'.",
        "staff_edit_name" => "✏️ Send the new first name.",
        "staff_edit_surname" => "✏️ Send the new surname.",
        "staff_edit_nickname" => "✏️ Send the new nickname.",
        "staff_edit_phone" => "✏️ Send the new phone number.",
        "staff_edit_card_number" => "✏️ Send the new card number (16-19 digits).",
        "staff_edit_role" => "✏️ Send the new role.",
        "staff_block_reason" => "📝 Send the reason for blocking.",
        "block_reason" => "📝 Send the reason for blocking.",
        _ => "✏️ Send a value.",
    }
}

#[async_trait]
impl ScreenPort for TelegramScreens {
    async fn render(
        &self,
        chat_id: ChatId,
        edit: Option<MessageId>,
        user: &UserRecord,
        menu: &Menu,
    ) -> Result<MessageId> {
        let (text, keyboard) = self.compose(user, menu).await?;

        if let Some(message_id) = edit {
            let msg = MessageRef { chat_id, message_id };
            match self.messenger.edit_keyboard(msg, &text, keyboard.clone()).await {
                Ok(()) => return Ok(message_id),
                Err(e) => {
                    // The target may be gone (already deleted, too old).
                    // Fall through to sending a fresh message.
                    tracing::warn!(
                        chat = chat_id.0,
                        message = message_id.0,
                        error = %e,
                        "edit failed, sending new message"
                    );
                }
            }
        }

        let sent = self.messenger.send_keyboard(chat_id, &text, keyboard).await?;
        Ok(sent.message_id)
    }
}

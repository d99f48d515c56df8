//! Step identifiers for the conversation state machine.
//!
//! Steps are opaque strings; these constants are the vocabulary shared by the
//! session store, the feature flows and the back/resume machine. `IDLE` is
//! both the initial and the resting state.

pub const IDLE: &str = "idle";

// Order creation flow.
pub const ORDER_CATEGORY: &str = "order_category";
pub const ORDER_SUBCATEGORY: &str = "order_subcategory";
pub const ORDER_DESCRIPTION: &str = "order_description";
pub const ORDER_NAME: &str = "order_name";
pub const ORDER_DATE: &str = "order_date";
pub const ORDER_TIME: &str = "order_time";
pub const ORDER_MINUTE: &str = "order_minute";
pub const ORDER_PHONE: &str = "order_phone";
pub const ORDER_ADDRESS: &str = "order_address";
pub const ORDER_PHOTO: &str = "order_photo";
pub const ORDER_PAYMENT: &str = "order_payment";
pub const ORDER_CONFIRM: &str = "order_confirm";
pub const ORDER_EDIT: &str = "order_edit";

// Operator order-creation variant.
pub const OP_ORDER_CONFIRM_OPTIONS: &str = "op_order_confirm_options";
pub const OP_ORDER_COST_INPUT: &str = "op_order_cost_input";
pub const OP_ORDER_ASSIGN_EXEC: &str = "op_order_assign_exec";
pub const OP_ORDER_FINAL_CONFIRM: &str = "op_order_final_confirm";

// Cost entry for an existing order (operator).
pub const COST_INPUT: &str = "cost_input";

// Staff management.
pub const STAFF_MENU: &str = "staff_menu";
pub const STAFF_ADD_NAME: &str = "staff_add_name";
pub const STAFF_ADD_SURNAME: &str = "staff_add_surname";
pub const STAFF_ADD_NICKNAME: &str = "staff_add_nickname";
pub const STAFF_ADD_PHONE: &str = "staff_add_phone";
pub const STAFF_ADD_CHAT_ID: &str = "staff_add_chat_id";
pub const STAFF_ADD_CARD_NUMBER: &str = "staff_add_card_number";
pub const STAFF_EDIT_FIELD: &str = "staff_edit_field";
pub const STAFF_BLOCK_REASON: &str = "staff_block_reason";

// User blocking.
pub const BLOCK_REASON: &str = "block_reason";

// Statistics.
pub const STATS_MENU: &str = "stats_menu";
pub const STATS_CUSTOM_DATE: &str = "stats_custom_date";
pub const STATS_CUSTOM_PERIOD: &str = "stats_custom_period";

// Info / communications.
pub const CONTACT_METHOD: &str = "contact_method";
pub const CHAT_MESSAGE_INPUT: &str = "chat_message_input";

// Settlement flow (driver report).
pub const SETTLE_MENU: &str = "settle_menu";
pub const SETTLE_INPUT_FUEL: &str = "settle_input_fuel";
pub const SETTLE_EXPENSES_MENU: &str = "settle_expenses_menu";
pub const SETTLE_INPUT_EXPENSE_DESCRIPTION: &str = "settle_input_expense_description";
pub const SETTLE_INPUT_EXPENSE_AMOUNT: &str = "settle_input_expense_amount";
pub const SETTLE_CONFIRM_DELETE_EXPENSE: &str = "settle_confirm_delete_expense";
pub const SETTLE_LOADERS_MENU: &str = "settle_loaders_menu";
pub const SETTLE_INPUT_LOADER_NAME: &str = "settle_input_loader_name";
pub const SETTLE_INPUT_LOADER_SALARY: &str = "settle_input_loader_salary";
pub const SETTLE_EDIT_LOADER_SALARY: &str = "settle_edit_loader_salary";
pub const SETTLE_CONFIRM_DELETE_LOADER: &str = "settle_confirm_delete_loader";

// Owner cash management.
pub const OWNER_CASH_MENU: &str = "owner_cash_menu";
pub const OWNER_CASH_ACTUAL_LIST: &str = "owner_cash_actual_list";
pub const OWNER_CASH_SETTLED_LIST: &str = "owner_cash_settled_list";
pub const OWNER_CASH_EDIT_FIELD: &str = "owner_cash_edit_field";

// Confirmation dialogs (never pushed to history).
pub const CONFIRM_CANCEL_ORDER: &str = "confirm_cancel_order";
pub const CONFIRM_CANCEL_SETTLEMENT: &str = "confirm_cancel_settlement";

/// True for steps whose scratch data lives in the settlement draft rather
/// than the generic form draft. Decides which draft's `active_message_id`
/// is authoritative after dispatch.
pub fn is_settlement_step(step: &str) -> bool {
    step.starts_with("settle_") || step.starts_with("owner_cash_")
}

/// Steps a "back"/"resume" may land on. Confirmation dialogs and idle are
/// transit-only: resuming into them would strand the user.
pub fn is_meaningful(step: &str) -> bool {
    step != IDLE
        && step != SETTLE_CONFIRM_DELETE_EXPENSE
        && step != SETTLE_CONFIRM_DELETE_LOADER
        && !step.starts_with("confirm_cancel_")
}

/// True while the generic multi-step form flow owns the active menu message
/// (order creation and its operator/driver variants, field edits).
pub fn is_form_flow(step: &str) -> bool {
    step.starts_with("order_") || step.starts_with("op_order_") || step.starts_with("staff_add_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settlement_namespace_covers_owner_cash() {
        assert!(is_settlement_step(SETTLE_INPUT_FUEL));
        assert!(is_settlement_step(OWNER_CASH_EDIT_FIELD));
        assert!(!is_settlement_step(ORDER_PHOTO));
    }

    #[test]
    fn confirmation_dialogs_are_not_meaningful() {
        assert!(!is_meaningful(IDLE));
        assert!(!is_meaningful(CONFIRM_CANCEL_ORDER));
        assert!(!is_meaningful(SETTLE_CONFIRM_DELETE_LOADER));
        assert!(is_meaningful(ORDER_DATE));
        assert!(is_meaningful(SETTLE_LOADERS_MENU));
    }
}

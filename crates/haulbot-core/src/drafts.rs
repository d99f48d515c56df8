//! Scratch data for in-progress multi-field flows.
//!
//! Two drafts per chat: the generic form draft (order being built, staff
//! being added/edited, any text awaiting capture) and the settlement draft.
//! Which draft's `active_message_id` is authoritative at any moment is
//! decided by the current step's namespace (`steps::is_settlement_step`).

use serde::{Deserialize, Serialize};

use crate::domain::MessageId;

/// Generic multi-step form draft.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FormDraft {
    /// The menu message currently being edited for this flow.
    pub active_message_id: Option<MessageId>,
    /// Order id once a draft order exists server-side.
    pub order_id: Option<i64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Hour picked on the hour screen while the minute screen is up.
    pub selected_hour: Option<u8>,
    pub pay_on_completion: bool,
    pub photo_file_ids: Vec<String>,
    /// Which field an `edit_field_*` command is rewriting, if any.
    pub editing_field: Option<String>,
    /// Staff member being added/edited, block reason being typed, etc.
    pub staff_target: Option<i64>,
    pub pending_text: Option<String>,
}

/// One itemized non-fuel expense on a settlement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub description: String,
    pub amount: f64,
}

/// One loader payment line on a settlement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoaderPayment {
    pub loader: String,
    pub amount: f64,
}

/// Driver settlement being composed or edited.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementDraft {
    pub active_message_id: Option<MessageId>,
    /// Set when the owner is editing an already-saved settlement.
    pub editing_settlement_id: Option<i64>,
    pub covered_orders_revenue: f64,
    pub covered_orders_count: u32,
    pub fuel_expense: f64,
    pub other_expenses: Vec<ExpenseItem>,
    pub loader_payments: Vec<LoaderPayment>,
    /// Index of the expense/loader line currently being edited, if any.
    pub editing_expense: Option<usize>,
    pub editing_loader: Option<usize>,
    /// Expense description captured while waiting for the amount.
    pub pending_expense_description: Option<String>,
    pub pending_loader_name: Option<String>,
    // Computed on every change.
    pub driver_salary: f64,
    pub amount_to_cashier: f64,
    // Where "back" out of a per-driver list should land.
    pub back_driver: Option<i64>,
    pub back_view: Option<String>,
    pub back_page: u32,
}

impl Default for SettlementDraft {
    fn default() -> Self {
        Self {
            active_message_id: None,
            editing_settlement_id: None,
            covered_orders_revenue: 0.0,
            covered_orders_count: 0,
            fuel_expense: 0.0,
            other_expenses: Vec::new(),
            loader_payments: Vec::new(),
            editing_expense: None,
            editing_loader: None,
            pending_expense_description: None,
            pending_loader_name: None,
            driver_salary: 0.0,
            amount_to_cashier: 0.0,
            back_driver: None,
            back_view: None,
            back_page: 0,
        }
    }
}

impl SettlementDraft {
    /// Recompute the driver's salary and the cash owed to the cashier.
    ///
    /// net = revenue − fuel − other expenses − loader payments; the driver
    /// keeps `driver_share` of net, the rest goes to the cashier.
    pub fn recalculate_totals(&mut self, driver_share: f64) {
        let other: f64 = self.other_expenses.iter().map(|e| e.amount).sum();
        let loaders: f64 = self.loader_payments.iter().map(|l| l.amount).sum();
        let net = self.covered_orders_revenue - self.fuel_expense - other - loaders;
        self.driver_salary = net * driver_share;
        self.amount_to_cashier = net - self.driver_salary;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_split_net_by_driver_share() {
        let mut draft = SettlementDraft {
            covered_orders_revenue: 10_000.0,
            fuel_expense: 1_500.0,
            other_expenses: vec![
                ExpenseItem { description: "parking".into(), amount: 300.0 },
                ExpenseItem { description: "toll".into(), amount: 200.0 },
            ],
            loader_payments: vec![LoaderPayment { loader: "vasya".into(), amount: 2_000.0 }],
            ..Default::default()
        };

        draft.recalculate_totals(0.35);

        let net = 10_000.0 - 1_500.0 - 500.0 - 2_000.0;
        assert!((draft.driver_salary - net * 0.35).abs() < f64::EPSILON);
        assert!((draft.amount_to_cashier - net * 0.65).abs() < f64::EPSILON);
    }

    #[test]
    fn totals_track_item_removal() {
        let mut draft = SettlementDraft {
            covered_orders_revenue: 1_000.0,
            other_expenses: vec![ExpenseItem { description: "x".into(), amount: 400.0 }],
            ..Default::default()
        };
        draft.recalculate_totals(0.5);
        assert!((draft.driver_salary - 300.0).abs() < f64::EPSILON);

        draft.other_expenses.clear();
        draft.recalculate_totals(0.5);
        assert!((draft.driver_salary - 500.0).abs() < f64::EPSILON);
    }
}

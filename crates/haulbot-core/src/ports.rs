//! Hexagonal ports for the engine's external collaborators.
//!
//! Screens (menu rendering), the user directory and the order/settlement
//! stores are all consumed through these traits; the engine never talks to
//! Telegram or a database directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{ChatId, MessageId, Role, UserRecord},
    drafts::{ExpenseItem, FormDraft, LoaderPayment},
    navigation::Menu,
    Result,
};

/// Renders one screen, editing `edit` in place when given, sending a new
/// message otherwise. Returns the id of the message now showing the screen.
#[async_trait]
pub trait ScreenPort: Send + Sync {
    async fn render(
        &self,
        chat_id: ChatId,
        edit: Option<MessageId>,
        user: &UserRecord,
        menu: &Menu,
    ) -> Result<MessageId>;
}

/// Known-accounts lookup and staff mutations.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn lookup_user(&self, chat_id: ChatId) -> Result<Option<UserRecord>>;
    async fn set_role(&self, chat_id: ChatId, role: Role) -> Result<()>;
    async fn set_blocked(&self, chat_id: ChatId, blocked: bool, reason: Option<&str>)
        -> Result<()>;
    async fn remove(&self, chat_id: ChatId) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    New,
    AwaitingConfirmation,
    InProgress,
    Completed,
    Canceled,
    Calculated,
    Settled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub client_chat_id: i64,
    pub status: OrderStatus,
    pub cost: Option<f64>,
    pub executors: Vec<i64>,
}

/// Order persistence. Returns `None` for unknown ids (the not-found signal).
#[async_trait]
pub trait Orders: Send + Sync {
    async fn create_draft(&self, draft: &FormDraft) -> Result<i64>;
    async fn find(&self, order_id: i64) -> Result<Option<OrderRecord>>;
    async fn set_status(&self, order_id: i64, status: OrderStatus) -> Result<()>;
    async fn assign_executor(&self, order_id: i64, executor: i64) -> Result<()>;
    async fn unassign_executor(&self, order_id: i64, executor: i64) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: i64,
    pub driver_chat_id: i64,
    pub revenue: f64,
    pub fuel_expense: f64,
    pub other_expenses: Vec<ExpenseItem>,
    pub loader_payments: Vec<LoaderPayment>,
    pub driver_salary: f64,
    pub amount_to_cashier: f64,
    pub status: SettlementStatus,
    pub money_deposited: bool,
    pub salary_paid: bool,
    pub created_at: DateTime<Utc>,
}

/// Settlement persistence.
#[async_trait]
pub trait Settlements: Send + Sync {
    /// Persist a new settlement, returning its id.
    async fn save(&self, record: SettlementRecord) -> Result<i64>;
    async fn find(&self, settlement_id: i64) -> Result<Option<SettlementRecord>>;
    async fn set_status(&self, settlement_id: i64, status: SettlementStatus) -> Result<()>;
    async fn set_deposited(&self, settlement_id: i64, deposited: bool) -> Result<()>;
    async fn set_salary_paid(&self, settlement_id: i64, paid: bool) -> Result<()>;
    async fn mark_all_salary_paid(&self, driver_chat_id: i64) -> Result<()>;
    async fn mark_all_deposited(&self, driver_chat_id: i64) -> Result<()>;
}

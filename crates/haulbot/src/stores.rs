//! In-memory implementations of the persistence ports.
//!
//! Good enough for single-process deployments and for trying the bot out;
//! a database-backed implementation can replace these without touching the
//! engine.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use haulbot_core::{
    domain::{ChatId, Role, UserRecord},
    drafts::FormDraft,
    ports::{
        Directory, OrderRecord, OrderStatus, Orders, SettlementRecord, SettlementStatus,
        Settlements,
    },
    Result,
};

pub struct MemoryDirectory {
    owner_chat_id: Option<i64>,
    users: Mutex<HashMap<i64, UserRecord>>,
}

impl MemoryDirectory {
    pub fn new(owner_chat_id: Option<i64>) -> Self {
        Self {
            owner_chat_id,
            users: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn lookup_user(&self, chat_id: ChatId) -> Result<Option<UserRecord>> {
        let mut users = self.users.lock().await;
        let record = users.entry(chat_id.0).or_insert_with(|| {
            let role = if self.owner_chat_id == Some(chat_id.0) {
                Role::Owner
            } else {
                Role::User
            };
            UserRecord {
                chat_id,
                first_name: "there".to_string(),
                role,
                blocked: false,
            }
        });
        Ok(Some(record.clone()))
    }

    async fn set_role(&self, chat_id: ChatId, role: Role) -> Result<()> {
        if let Some(u) = self.users.lock().await.get_mut(&chat_id.0) {
            u.role = role;
        }
        Ok(())
    }

    async fn set_blocked(
        &self,
        chat_id: ChatId,
        blocked: bool,
        reason: Option<&str>,
    ) -> Result<()> {
        if let Some(u) = self.users.lock().await.get_mut(&chat_id.0) {
            u.blocked = blocked;
            if blocked {
                tracing::info!(chat = chat_id.0, reason = reason.unwrap_or("-"), "user blocked");
            }
        }
        Ok(())
    }

    async fn remove(&self, chat_id: ChatId) -> Result<()> {
        self.users.lock().await.remove(&chat_id.0);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryOrders {
    orders: Mutex<HashMap<i64, OrderRecord>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl Orders for MemoryOrders {
    async fn create_draft(&self, draft: &FormDraft) -> Result<i64> {
        let mut next = self.next_id.lock().await;
        *next += 1;
        let id = *next;
        self.orders.lock().await.insert(
            id,
            OrderRecord {
                id,
                client_chat_id: draft.staff_target.unwrap_or(0),
                status: OrderStatus::Draft,
                cost: None,
                executors: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn find(&self, order_id: i64) -> Result<Option<OrderRecord>> {
        Ok(self.orders.lock().await.get(&order_id).cloned())
    }

    async fn set_status(&self, order_id: i64, status: OrderStatus) -> Result<()> {
        if let Some(o) = self.orders.lock().await.get_mut(&order_id) {
            o.status = status;
        }
        Ok(())
    }

    async fn assign_executor(&self, order_id: i64, executor: i64) -> Result<()> {
        if let Some(o) = self.orders.lock().await.get_mut(&order_id) {
            if !o.executors.contains(&executor) {
                o.executors.push(executor);
            }
        }
        Ok(())
    }

    async fn unassign_executor(&self, order_id: i64, executor: i64) -> Result<()> {
        if let Some(o) = self.orders.lock().await.get_mut(&order_id) {
            o.executors.retain(|e| *e != executor);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySettlements {
    records: Mutex<HashMap<i64, SettlementRecord>>,
    next_id: Mutex<i64>,
}

#[async_trait]
impl Settlements for MemorySettlements {
    async fn save(&self, mut record: SettlementRecord) -> Result<i64> {
        let mut next = self.next_id.lock().await;
        *next += 1;
        record.id = *next;
        self.records.lock().await.insert(*next, record);
        Ok(*next)
    }

    async fn find(&self, settlement_id: i64) -> Result<Option<SettlementRecord>> {
        Ok(self.records.lock().await.get(&settlement_id).cloned())
    }

    async fn set_status(&self, settlement_id: i64, status: SettlementStatus) -> Result<()> {
        if let Some(r) = self.records.lock().await.get_mut(&settlement_id) {
            r.status = status;
        }
        Ok(())
    }

    async fn set_deposited(&self, settlement_id: i64, deposited: bool) -> Result<()> {
        if let Some(r) = self.records.lock().await.get_mut(&settlement_id) {
            r.money_deposited = deposited;
        }
        Ok(())
    }

    async fn set_salary_paid(&self, settlement_id: i64, paid: bool) -> Result<()> {
        if let Some(r) = self.records.lock().await.get_mut(&settlement_id) {
            r.salary_paid = paid;
        }
        Ok(())
    }

    async fn mark_all_salary_paid(&self, driver_chat_id: i64) -> Result<()> {
        for r in self.records.lock().await.values_mut() {
            if r.driver_chat_id == driver_chat_id {
                r.salary_paid = true;
            }
        }
        Ok(())
    }

    async fn mark_all_deposited(&self, driver_chat_id: i64) -> Result<()> {
        for r in self.records.lock().await.values_mut() {
            if r.driver_chat_id == driver_chat_id {
                r.money_deposited = true;
            }
        }
        Ok(())
    }
}

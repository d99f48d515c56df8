use serde::{Deserialize, Serialize};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Privilege level of a known account.
///
/// Loader and driver share one tier: neither outranks the other, both outrank
/// plain users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Loader,
    Driver,
    Operator,
    SeniorOperator,
    Owner,
}

impl Role {
    pub fn tier(self) -> u8 {
        match self {
            Role::User => 0,
            Role::Loader | Role::Driver => 1,
            Role::Operator => 2,
            Role::SeniorOperator => 3,
            Role::Owner => 4,
        }
    }

    pub fn is_at_least(self, other: Role) -> bool {
        self.tier() >= other.tier()
    }

    /// Drivers, loaders and everyone above them.
    pub fn is_staff(self) -> bool {
        self.tier() >= Role::Driver.tier()
    }
}

/// The identity the directory supplies per chat. Onboarding happens
/// elsewhere; by the time a callback arrives, a chat maps to a known
/// account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub chat_id: ChatId,
    pub first_name: String,
    pub role: Role,
    pub blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tiers_are_ordered() {
        assert!(Role::Owner.is_at_least(Role::SeniorOperator));
        assert!(Role::SeniorOperator.is_at_least(Role::Operator));
        assert!(Role::Operator.is_at_least(Role::Driver));
        assert!(!Role::User.is_at_least(Role::Loader));
    }

    #[test]
    fn driver_and_loader_share_a_tier() {
        assert!(Role::Driver.is_at_least(Role::Loader));
        assert!(Role::Loader.is_at_least(Role::Driver));
        assert!(!Role::Loader.is_at_least(Role::Operator));
    }
}

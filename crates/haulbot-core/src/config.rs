use std::env;

use crate::{errors::Error, Result};

/// Typed runtime configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    /// Chat that gets the owner role on first contact.
    pub owner_chat_id: Option<i64>,

    /// Fraction of a settlement's net the driver keeps.
    pub driver_share: f64,

    // Pagination.
    pub orders_per_page: u32,
    pub staff_per_page: u32,
    pub payouts_per_page: u32,
    pub cash_records_per_page: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let driver_share = env_parse("DRIVER_SHARE", 0.35)?;
        if !(0.0..=1.0).contains(&driver_share) {
            return Err(Error::Config(format!(
                "DRIVER_SHARE must be within [0, 1], got {driver_share}"
            )));
        }

        let owner_chat_id = match env_str("OWNER_CHAT_ID") {
            None => None,
            Some(v) => Some(v.parse().map_err(|_| {
                Error::Config(format!("OWNER_CHAT_ID has an invalid value: {v:?}"))
            })?),
        };

        Ok(Self {
            telegram_bot_token,
            owner_chat_id,
            driver_share,
            orders_per_page: env_parse("ORDERS_PER_PAGE", 10)?,
            staff_per_page: env_parse("STAFF_PER_PAGE", 10)?,
            payouts_per_page: env_parse("PAYOUTS_PER_PAGE", 10)?,
            cash_records_per_page: env_parse("CASH_RECORDS_PER_PAGE", 10)?,
        })
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: "test-token".to_string(),
            owner_chat_id: None,
            driver_share: 0.35,
            orders_per_page: 10,
            staff_per_page: 10,
            payouts_per_page: 10,
            cash_records_per_page: 10,
        }
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env_str(key) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| Error::Config(format!("{key} has an invalid value: {v:?}"))),
    }
}

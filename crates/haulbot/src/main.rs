use std::sync::Arc;

use haulbot_core::config::Config;

mod stores;

#[tokio::main]
async fn main() -> Result<(), haulbot_core::Error> {
    haulbot_core::logging::init("haulbot")?;

    let cfg = Arc::new(Config::load()?);

    let directory = Arc::new(stores::MemoryDirectory::new(cfg.owner_chat_id));
    let orders = Arc::new(stores::MemoryOrders::default());
    let settlements = Arc::new(stores::MemorySettlements::default());

    haulbot_telegram::router::run_polling(cfg, directory, orders, settlements).await?;

    Ok(())
}

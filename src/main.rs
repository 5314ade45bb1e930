use mimalloc::MiMalloc;
use stockpile::service::inventory::is_low_stock;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = stockpile::Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        max_connections = cfg.max_connections,
        loglevel = %cfg.loglevel,
        alert_policy = ?cfg.alerts.policy,
        webhook_url = %cfg.alerts.webhook_url.as_ref().map(|u| u.as_str()).unwrap_or("<none>")
    );

    let app = stockpile::Stockpile::open(&cfg).await?;

    // One full scan: reports the inventory and fires any low-stock alerts.
    let items = app.inventory.list_all().await?;
    let low = items.iter().filter(|i| is_low_stock(i.quantity)).count();
    info!(items = items.len(), low_stock = low, "inventory scan complete");
    Ok(())
}

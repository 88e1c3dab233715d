//! Load a JSON fuel table into the vessel database.
//!
//! Usage: `import_fuel_table <path>`. The database location comes from the
//! same environment variables the server reads.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vessel_server::config::Config;
use vessel_server::persistence::{self, fuel_samples};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("vessel_server=info".parse()?))
        .init();

    let config = Config::from_env();
    let path = std::env::args()
        .nth(1)
        .or_else(|| config.fuel_table_path.clone())
        .context("usage: import_fuel_table <fuel-table.json>")?;

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await
        .context("failed to initialize database")?;

    let samples = fuel_samples::load_fuel_table(&path)?;
    let inserted = fuel_samples::insert_fuel_samples(db.pool(), &samples).await?;
    tracing::info!(
        "Imported {} fuel samples from {} into {}",
        inserted,
        path,
        config.database_path
    );

    Ok(())
}

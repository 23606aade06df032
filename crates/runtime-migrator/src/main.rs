//! Runtime migrator CLI

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use runtime_migrator::{MigratorArgs, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = MigratorArgs::parse();
    let stats = runtime_migrator::run(&args).await?;
    info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        "migration completed"
    );
    Ok(())
}

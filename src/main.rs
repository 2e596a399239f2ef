use std::{sync::Arc, time::Duration};

use anyhow::Result;
use featured_listings::{
    application::usecases::featured_expiry::ExpireFeaturedListingsUseCase,
    background_worker::featured_expiry_worker,
    config::config_loader,
    domain::{clock::SystemClock, repositories::listings::ListingRepository},
    infrastructure::{
        axum_http::http_serve,
        postgres::{postgres_connection, repositories::listings::ListingPostgres},
    },
    observability,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("featured-listings exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("featured-listings")?;

    let dotenvy_env = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = Arc::new(postgres_connection::establish_connection(
        &dotenvy_env.database.url,
    )?);
    info!("Postgres connection has been established");

    let sweep_interval_secs = dotenvy_env.featured.sweep_interval_secs;
    if sweep_interval_secs > 0 {
        let repository: Arc<dyn ListingRepository + Send + Sync> =
            Arc::new(ListingPostgres::new(Arc::clone(&postgres_pool)));
        let usecase = Arc::new(ExpireFeaturedListingsUseCase::new(
            repository,
            Arc::new(SystemClock),
        ));
        tokio::spawn(featured_expiry_worker::run_featured_expiry_loop(
            usecase,
            Duration::from_secs(sweep_interval_secs),
        ));
    } else {
        info!("Featured expiry sweep disabled; expiry happens on status reads");
    }

    http_serve::start(dotenvy_env, postgres_pool).await?;

    Ok(())
}

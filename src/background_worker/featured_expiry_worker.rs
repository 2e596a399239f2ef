use std::{sync::Arc, time::Duration};

use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::application::usecases::featured_expiry::ExpireFeaturedListingsUseCase;

/// Never returns; a failed sweep is logged and the next tick tries again.
pub async fn run_featured_expiry_loop(usecase: Arc<ExpireFeaturedListingsUseCase>, every: Duration) {
    info!(interval_secs = every.as_secs(), "featured_expiry_worker: starting sweep loop");

    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if let Err(err) = usecase.run().await {
            error!(error = ?err, "featured_expiry_worker: sweep failed");
        }
    }
}

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::{
    clock::Clock,
    repositories::listings::ListingRepository,
    value_objects::{enums::listing_kinds::ListingCollection, featured::ExpirySweepReport},
};

/// Scheduled counterpart of the lazy expiry done on status reads.
pub struct ExpireFeaturedListingsUseCase {
    repository: Arc<dyn ListingRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
}

impl ExpireFeaturedListingsUseCase {
    pub fn new(repository: Arc<dyn ListingRepository + Send + Sync>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub async fn run(&self) -> Result<ExpirySweepReport> {
        let now = self.clock.now();
        let mut report = ExpirySweepReport::default();

        for collection in ListingCollection::ALL {
            let stale_ids = self
                .repository
                .list_stale_featured_ids(collection, now)
                .await?;
            report.scanned += stale_ids.len();

            for listing_id in stale_ids {
                match self
                    .repository
                    .clear_featured(collection, listing_id, now)
                    .await
                {
                    Ok(()) => report.expired += 1,
                    Err(err) => {
                        error!(
                            %listing_id,
                            %collection,
                            db_error = ?err,
                            "featured_expiry: failed to clear expired promotion"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            expired = report.expired,
            failed = report.failed,
            "featured_expiry: sweep completed"
        );

        Ok(report)
    }
}

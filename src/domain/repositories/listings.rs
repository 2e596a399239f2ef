use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::listings::{FeaturedPromotionEntity, ListingEntity},
    value_objects::enums::listing_kinds::ListingCollection,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ListingRepository {
    async fn find_by_id(
        &self,
        collection: ListingCollection,
        listing_id: Uuid,
    ) -> Result<Option<ListingEntity>>;

    /// Marks the listing featured and stamps the plan metadata with `payment_status = completed`.
    async fn apply_promotion(
        &self,
        collection: ListingCollection,
        listing_id: Uuid,
        promotion: FeaturedPromotionEntity,
    ) -> Result<()>;

    /// Resets the promotion columns and sets `payment_status = expired`, but
    /// only while the window is still closed as of `now`.
    async fn clear_featured(
        &self,
        collection: ListingCollection,
        listing_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Rows whose stored `featured` flag is set, regardless of expiry.
    async fn list_flagged_featured(
        &self,
        collection: ListingCollection,
    ) -> Result<Vec<ListingEntity>>;

    async fn list_all(&self, collection: ListingCollection) -> Result<Vec<ListingEntity>>;

    async fn list_stale_featured_ids(
        &self,
        collection: ListingCollection,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>>;
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    application::usecases::{
        featured_errors::{FeaturedError, UseCaseResult},
        ranking,
    },
    domain::{
        clock::Clock,
        entities::listings::{FeaturedPromotionEntity, ListingEntity},
        repositories::listings::ListingRepository,
        value_objects::{
            enums::listing_kinds::{ListingCollection, ListingKind},
            featured::{FeaturedStatusDto, PromotionReceipt, RankedListingDto},
            featured_plans::{FeaturedPlan, find_featured_plan},
        },
    },
};

pub struct FeaturedListingsUseCase<R>
where
    R: ListingRepository + Send + Sync + 'static,
{
    listing_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> FeaturedListingsUseCase<R>
where
    R: ListingRepository + Send + Sync + 'static,
{
    pub fn new(listing_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            listing_repo,
            clock,
        }
    }

    /// Finds the table that actually holds `listing_id`, probing the kind's
    /// candidate tables in order.
    pub async fn resolve_listing(
        &self,
        listing_id: Uuid,
        kind: ListingKind,
    ) -> UseCaseResult<(ListingCollection, ListingEntity)> {
        for &collection in kind.candidate_collections() {
            let found = self
                .listing_repo
                .find_by_id(collection, listing_id)
                .await
                .map_err(|err| {
                    error!(
                        %listing_id,
                        %collection,
                        db_error = ?err,
                        "featured: failed to load listing"
                    );
                    FeaturedError::RemoteStore(err)
                })?;

            if let Some(listing) = found {
                debug!(%listing_id, %collection, "featured: listing resolved");
                return Ok((collection, listing));
            }
        }

        let err = FeaturedError::NotFound;
        warn!(
            %listing_id,
            listing_kind = %kind,
            status = err.status_code().as_u16(),
            "featured: listing not found in any candidate collection"
        );
        Err(err)
    }

    /// Applies a promotion. Running it again simply restarts the window.
    pub async fn promote_listing(
        &self,
        listing_id: Uuid,
        kind: ListingKind,
        plan_id: &str,
    ) -> UseCaseResult<PromotionReceipt> {
        info!(%listing_id, listing_kind = %kind, plan_id, "featured: promote requested");

        let plan = Self::lookup_plan(listing_id, plan_id)?;
        let (collection, _) = self.resolve_listing(listing_id, kind).await?;

        self.apply_plan(collection, listing_id, plan).await
    }

    /// Promotion bought through a checkout session created at `paid_since`.
    /// Returns `None` when the listing already carries a promotion applied at
    /// or after that moment, so redelivered events do not extend the window.
    pub async fn promote_paid_listing(
        &self,
        listing_id: Uuid,
        kind: ListingKind,
        plan_id: &str,
        paid_since: Option<DateTime<Utc>>,
    ) -> UseCaseResult<Option<PromotionReceipt>> {
        info!(
            %listing_id,
            listing_kind = %kind,
            plan_id,
            paid_since = ?paid_since,
            "featured: paid promotion requested"
        );

        let plan = Self::lookup_plan(listing_id, plan_id)?;
        let (collection, listing) = self.resolve_listing(listing_id, kind).await?;

        if let (Some(paid_since), Some(featured_at)) = (paid_since, listing.featured_at) {
            if featured_at >= paid_since {
                info!(
                    %listing_id,
                    %collection,
                    %featured_at,
                    %paid_since,
                    "featured: checkout already applied, skipping"
                );
                return Ok(None);
            }
        }

        self.apply_plan(collection, listing_id, plan).await.map(Some)
    }

    fn lookup_plan(listing_id: Uuid, plan_id: &str) -> UseCaseResult<&'static FeaturedPlan> {
        find_featured_plan(plan_id).ok_or_else(|| {
            let err = FeaturedError::InvalidPlan(plan_id.to_string());
            warn!(
                %listing_id,
                plan_id,
                status = err.status_code().as_u16(),
                "featured: unknown plan"
            );
            err
        })
    }

    async fn apply_plan(
        &self,
        collection: ListingCollection,
        listing_id: Uuid,
        plan: &FeaturedPlan,
    ) -> UseCaseResult<PromotionReceipt> {
        let featured_at = self.clock.now();
        let featured_until = featured_at + plan.duration();
        let promotion = FeaturedPromotionEntity {
            featured_at,
            featured_until,
            featured_plan: plan.id,
            featured_price: plan.price_minor,
        };

        self.listing_repo
            .apply_promotion(collection, listing_id, promotion)
            .await
            .map_err(|err| {
                error!(
                    %listing_id,
                    %collection,
                    plan_id = %plan.id,
                    db_error = ?err,
                    "featured: failed to apply promotion"
                );
                FeaturedError::RemoteStore(err)
            })?;

        info!(
            %listing_id,
            %collection,
            plan_id = %plan.id,
            %featured_until,
            "featured: listing promoted"
        );

        Ok(PromotionReceipt {
            listing_id,
            collection,
            plan_id: plan.id,
            featured_at,
            featured_until,
        })
    }

    /// Not a pure read: a listing whose window has closed gets its stored flag
    /// cleared here. A failed correction is logged and retried by the next read.
    pub async fn check_featured_status(
        &self,
        listing_id: Uuid,
        kind: ListingKind,
    ) -> UseCaseResult<FeaturedStatusDto> {
        let (collection, listing) = self.resolve_listing(listing_id, kind).await?;
        let now = self.clock.now();

        if listing.has_stale_featured_flag(now) {
            info!(
                %listing_id,
                %collection,
                featured_until = ?listing.featured_until,
                "featured: promotion window closed, clearing flag"
            );
            if let Err(err) = self.listing_repo.clear_featured(collection, listing_id, now).await {
                warn!(
                    %listing_id,
                    %collection,
                    db_error = ?err,
                    "featured: lazy expiry write failed; will retry on next read"
                );
            }

            return Ok(FeaturedStatusDto {
                listing_id,
                featured: false,
                featured_until: None,
                featured_plan: listing.featured_plan,
            });
        }

        Ok(FeaturedStatusDto {
            listing_id,
            featured: listing.is_featured_at(now),
            featured_until: listing.featured_until,
            featured_plan: listing.featured_plan,
        })
    }

    pub async fn list_featured(&self, kind: ListingKind) -> UseCaseResult<Vec<ListingEntity>> {
        let collection = kind.primary_collection();
        let flagged = self
            .listing_repo
            .list_flagged_featured(collection)
            .await
            .map_err(|err| {
                error!(%collection, db_error = ?err, "featured: failed to list featured listings");
                FeaturedError::RemoteStore(err)
            })?;

        let flagged_count = flagged.len();
        let featured = ranking::currently_featured(flagged, self.clock.now());
        debug!(
            %collection,
            flagged_count,
            featured_count = featured.len(),
            "featured: featured set loaded"
        );

        Ok(featured)
    }

    pub async fn list_ranked(&self, kind: ListingKind) -> UseCaseResult<Vec<RankedListingDto>> {
        let collection = kind.primary_collection();
        let listings = self.listing_repo.list_all(collection).await.map_err(|err| {
            error!(%collection, db_error = ?err, "featured: failed to list listings");
            FeaturedError::RemoteStore(err)
        })?;

        let listing_count = listings.len();
        let ranked = ranking::rank_listings(listings, self.clock.now());
        debug!(%collection, listing_count, "featured: ranked listings built");

        Ok(ranked)
    }
}

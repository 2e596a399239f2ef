use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use tokio::task;
use uuid::Uuid;

use crate::{
    domain::{
        entities::listings::{FeaturedPromotionEntity, ListingEntity},
        repositories::listings::ListingRepository,
        value_objects::enums::{
            listing_kinds::ListingCollection, payment_statuses::PaymentStatus,
        },
    },
    infrastructure::postgres::postgres_connection::PgPoolSquad,
};

/// Runs `$body` with `$table` bound to the schema module of `$collection`.
/// The three listing tables share one column layout.
macro_rules! with_listing_table {
    ($collection:expr, $table:ident => $body:expr) => {
        match $collection {
            ListingCollection::Billboards => {
                use crate::infrastructure::postgres::schema::billboards as $table;
                $body
            }
            ListingCollection::DigitalScreens => {
                use crate::infrastructure::postgres::schema::digital_screens as $table;
                $body
            }
            ListingCollection::Jobs => {
                use crate::infrastructure::postgres::schema::jobs as $table;
                $body
            }
        }
    };
}

macro_rules! listing_columns {
    ($table:ident) => {
        (
            $table::id,
            $table::owner_id,
            $table::title,
            $table::city,
            $table::price_minor,
            $table::photos,
            $table::featured,
            $table::featured_until,
            $table::featured_at,
            $table::featured_plan,
            $table::featured_price,
            $table::payment_status,
            $table::created_at,
        )
    };
}

pub struct ListingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ListingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

// Diesel is synchronous; every query runs on the blocking threadpool.
#[async_trait]
impl ListingRepository for ListingPostgres {
    async fn find_by_id(
        &self,
        collection: ListingCollection,
        listing_id: Uuid,
    ) -> Result<Option<ListingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Option<ListingEntity>> {
            let mut conn = db_pool.get()?;

            let listing = with_listing_table!(collection, t => {
                t::table
                    .filter(t::id.eq(listing_id))
                    .select(listing_columns!(t))
                    .first::<ListingEntity>(&mut conn)
                    .optional()?
            });

            Ok(listing)
        })
        .await?
    }

    async fn apply_promotion(
        &self,
        collection: ListingCollection,
        listing_id: Uuid,
        promotion: FeaturedPromotionEntity,
    ) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            let updated = with_listing_table!(collection, t => {
                update(t::table.filter(t::id.eq(listing_id)))
                    .set((
                        t::featured.eq(true),
                        t::featured_until.eq(Some(promotion.featured_until)),
                        t::featured_at.eq(Some(promotion.featured_at)),
                        t::featured_plan.eq(Some(promotion.featured_plan.as_str())),
                        t::featured_price.eq(Some(promotion.featured_price)),
                        t::payment_status.eq(Some(PaymentStatus::Completed.as_str())),
                    ))
                    .execute(&mut conn)?
            });

            if updated == 0 {
                bail!("listing {listing_id} vanished from {collection} before promotion");
            }

            Ok(())
        })
        .await?
    }

    async fn clear_featured(
        &self,
        collection: ListingCollection,
        listing_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<()> {
            let mut conn = db_pool.get()?;

            // A promotion renewed since the caller's read keeps its new window.
            with_listing_table!(collection, t => {
                update(
                    t::table
                        .filter(t::id.eq(listing_id))
                        .filter(t::featured.eq(true))
                        .filter(t::featured_until.is_null().or(t::featured_until.le(now))),
                )
                .set((
                    t::featured.eq(false),
                    t::featured_until.eq(None::<DateTime<Utc>>),
                    t::featured_at.eq(None::<DateTime<Utc>>),
                    t::payment_status.eq(Some(PaymentStatus::Expired.as_str())),
                ))
                .execute(&mut conn)?
            });

            Ok(())
        })
        .await?
    }

    async fn list_flagged_featured(
        &self,
        collection: ListingCollection,
    ) -> Result<Vec<ListingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<ListingEntity>> {
            let mut conn = db_pool.get()?;

            let listings = with_listing_table!(collection, t => {
                t::table
                    .filter(t::featured.eq(true))
                    .order(t::featured_at.desc())
                    .select(listing_columns!(t))
                    .load::<ListingEntity>(&mut conn)?
            });

            Ok(listings)
        })
        .await?
    }

    async fn list_all(&self, collection: ListingCollection) -> Result<Vec<ListingEntity>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<ListingEntity>> {
            let mut conn = db_pool.get()?;

            let listings = with_listing_table!(collection, t => {
                t::table
                    .order(t::created_at.desc())
                    .select(listing_columns!(t))
                    .load::<ListingEntity>(&mut conn)?
            });

            Ok(listings)
        })
        .await?
    }

    async fn list_stale_featured_ids(
        &self,
        collection: ListingCollection,
        now: DateTime<Utc>,
    ) -> Result<Vec<Uuid>> {
        let db_pool = Arc::clone(&self.db_pool);

        task::spawn_blocking(move || -> Result<Vec<Uuid>> {
            let mut conn = db_pool.get()?;

            let ids = with_listing_table!(collection, t => {
                t::table
                    .filter(t::featured.eq(true))
                    .filter(t::featured_until.is_null().or(t::featured_until.le(now)))
                    .select(t::id)
                    .load::<Uuid>(&mut conn)?
            });

            Ok(ids)
        })
        .await?
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::listings::ListingEntity,
    value_objects::{
        enums::listing_kinds::{ListingCollection, ListingKind},
        featured_plans::{FeaturedPlan, FeaturedPlanId},
    },
};

#[derive(Debug, Serialize, PartialEq)]
pub struct FeaturedPlanDto {
    pub id: FeaturedPlanId,
    pub name: String,
    pub duration_days: i64,
    pub price_minor: i64,
    pub price_display: String,
    pub duration_display: String,
    pub popular: bool,
}

impl FeaturedPlanDto {
    pub fn from_plan(plan: &FeaturedPlan, currency: &str) -> Self {
        Self {
            id: plan.id,
            name: plan.name.to_string(),
            duration_days: plan.duration_days(),
            price_minor: plan.price_minor,
            price_display: plan.format_price(currency),
            duration_display: plan.format_duration(),
            popular: plan.popular,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromotionReceipt {
    pub listing_id: Uuid,
    pub collection: ListingCollection,
    pub plan_id: FeaturedPlanId,
    pub featured_at: DateTime<Utc>,
    pub featured_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeaturedStatusDto {
    pub listing_id: Uuid,
    pub featured: bool,
    pub featured_until: Option<DateTime<Utc>>,
    pub featured_plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedListingDto {
    #[serde(flatten)]
    pub listing: ListingEntity,
    pub is_featured: bool,
}

#[derive(Debug, Deserialize)]
pub struct PromoteListingRequest {
    pub listing_id: Uuid,
    pub listing_kind: ListingKind,
    pub plan_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCheckoutRequest {
    pub listing_id: Uuid,
    pub listing_kind: ListingKind,
    pub plan_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    pub checkout_url: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExpirySweepReport {
    pub scanned: usize,
    pub expired: usize,
    pub failed: usize,
}

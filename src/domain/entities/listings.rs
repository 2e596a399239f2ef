use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::value_objects::featured_plans::FeaturedPlanId;

/// Row shape shared by the `billboards`, `digital_screens` and `jobs` tables.
/// For jobs `price_minor` carries the offered salary.
#[derive(Debug, Clone, PartialEq, Queryable, Serialize)]
pub struct ListingEntity {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub city: Option<String>,
    pub price_minor: Option<i64>,
    pub photos: serde_json::Value,
    pub featured: bool,
    pub featured_until: Option<DateTime<Utc>>,
    pub featured_at: Option<DateTime<Utc>>,
    pub featured_plan: Option<String>,
    pub featured_price: Option<i64>,
    pub payment_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ListingEntity {
    /// The stored flag only counts while `featured_until` is strictly in the future.
    pub fn is_featured_at(&self, now: DateTime<Utc>) -> bool {
        self.featured && self.featured_until.is_some_and(|until| until > now)
    }

    /// Flag still set but the promotion window is over (or was never recorded).
    pub fn has_stale_featured_flag(&self, now: DateTime<Utc>) -> bool {
        self.featured && !self.is_featured_at(now)
    }
}

/// Columns written when a promotion is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturedPromotionEntity {
    pub featured_at: DateTime<Utc>,
    pub featured_until: DateTime<Utc>,
    pub featured_plan: FeaturedPlanId,
    pub featured_price: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn listing(featured: bool, featured_until: Option<DateTime<Utc>>) -> ListingEntity {
        ListingEntity {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Billboard".to_string(),
            city: None,
            price_minor: None,
            photos: serde_json::json!([]),
            featured,
            featured_until,
            featured_at: None,
            featured_plan: None,
            featured_price: None,
            payment_status: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn featured_only_while_window_is_open() {
        let now = Utc::now();

        assert!(listing(true, Some(now + Duration::seconds(1))).is_featured_at(now));
        assert!(!listing(true, Some(now)).is_featured_at(now));
        assert!(!listing(true, Some(now - Duration::days(1))).is_featured_at(now));
        assert!(!listing(true, None).is_featured_at(now));
        assert!(!listing(false, Some(now + Duration::days(1))).is_featured_at(now));
    }

    #[test]
    fn stale_flag_requires_the_stored_boolean() {
        let now = Utc::now();

        assert!(listing(true, Some(now - Duration::hours(1))).has_stale_featured_flag(now));
        assert!(listing(true, None).has_stale_featured_flag(now));
        assert!(!listing(false, Some(now - Duration::hours(1))).has_stale_featured_flag(now));
        assert!(!listing(true, Some(now + Duration::hours(1))).has_stale_featured_flag(now));
    }
}

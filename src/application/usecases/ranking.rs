use chrono::{DateTime, Utc};

use crate::domain::{
    entities::listings::ListingEntity, value_objects::featured::RankedListingDto,
};

/// Every 7th displayed position goes to a featured listing while any remain.
pub const FEATURED_SLOT_INTERVAL: usize = 7;

/// Places one `featured` item at each position that is a multiple of `interval`
/// (1-indexed) and fills the rest from `regular`. Featured items left over once
/// `regular` runs out are appended in their given order.
pub fn interleave_featured<T>(regular: Vec<T>, featured: Vec<T>, interval: usize) -> Vec<T> {
    let mut output = Vec::with_capacity(regular.len() + featured.len());
    let mut regular = regular.into_iter().peekable();
    let mut featured = featured.into_iter();

    while regular.peek().is_some() {
        let position = output.len() + 1;
        if interval > 0 && position % interval == 0 {
            if let Some(item) = featured.next() {
                output.push(item);
                continue;
            }
        }
        if let Some(item) = regular.next() {
            output.push(item);
        }
    }

    output.extend(featured);
    output
}

pub fn sort_newest_first(listings: &mut [ListingEntity]) {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Splits into `(featured, regular)` by the live promotion window.
pub fn partition_featured(
    listings: Vec<ListingEntity>,
    now: DateTime<Utc>,
) -> (Vec<ListingEntity>, Vec<ListingEntity>) {
    listings
        .into_iter()
        .partition(|listing| listing.is_featured_at(now))
}

/// Drops listings whose window has closed and orders the rest by promotion
/// start, most recent first. Rows without `featured_at` sort last.
pub fn currently_featured(listings: Vec<ListingEntity>, now: DateTime<Utc>) -> Vec<ListingEntity> {
    let mut featured: Vec<ListingEntity> = listings
        .into_iter()
        .filter(|listing| listing.is_featured_at(now))
        .collect();
    featured.sort_by(|a, b| b.featured_at.cmp(&a.featured_at));
    featured
}

pub fn rank_listings(listings: Vec<ListingEntity>, now: DateTime<Utc>) -> Vec<RankedListingDto> {
    let (mut featured, mut regular) = partition_featured(listings, now);
    sort_newest_first(&mut featured);
    sort_newest_first(&mut regular);

    let featured = featured
        .into_iter()
        .map(|listing| RankedListingDto {
            listing,
            is_featured: true,
        })
        .collect();
    let regular = regular
        .into_iter()
        .map(|listing| RankedListingDto {
            listing,
            is_featured: false,
        })
        .collect();

    interleave_featured(regular, featured, FEATURED_SLOT_INTERVAL)
}

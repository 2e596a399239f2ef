pub mod featured_checkout;
pub mod featured_errors;
pub mod featured_expiry;
pub mod featured_listings;
pub mod ranking;

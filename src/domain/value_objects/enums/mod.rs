pub mod listing_kinds;
pub mod payment_statuses;
